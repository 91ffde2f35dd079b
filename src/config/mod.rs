//! Configuration module for the Topicflow gateway.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key for API authentication (required in production)
    pub api_psk: Option<String>,
    /// Base URL of the upstream topic/AI backend
    pub upstream_url: String,
    /// Timeout for upstream requests
    pub upstream_timeout: Duration,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let api_psk = env::var("TOPICFLOW_API_PSK").ok();

        let upstream_url = env::var("TOPICFLOW_UPSTREAM_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:9000".to_string())
            .trim_end_matches('/')
            .to_string();

        let upstream_timeout = env::var("TOPICFLOW_UPSTREAM_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(15));

        let bind_addr = env::var("TOPICFLOW_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid TOPICFLOW_BIND_ADDR format");

        let log_level = env::var("TOPICFLOW_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Self {
            api_psk,
            upstream_url,
            upstream_timeout,
            bind_addr,
            log_level,
        }
    }
}
