//! HTTP client for the upstream topic/AI backend.
//!
//! Owns the request/response contracts at the backend boundary and the
//! normalization of loose payloads into the strict model shapes. No call
//! here is retried automatically; failures surface to the caller.

pub mod wire;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::errors::AppError;
use crate::models::{
    DuplicateCheckResult, ModificationProposal, ReviewerAssignmentRequest, ReviewerCandidate,
    TopicDetail, TopicDraftSnapshot,
};

/// Filters accepted by the recommended-reviewer endpoint.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendationFilters {
    pub min_skill_score: Option<f64>,
    pub max_workload: Option<u32>,
}

/// Outcome of a bulk assignment dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentOutcome {
    #[serde(default)]
    pub created_count: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BulkAssignmentBody<'a> {
    assignments: &'a [ReviewerAssignmentRequest],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitTopicBody {
    phase_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedTopic {
    #[serde(default)]
    pub topic_id: Option<i64>,
}

/// Client for all outbound backend calls.
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
}

impl UpstreamClient {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            base_url: config.upstream_url.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Run the AI duplicate check for a draft.
    pub async fn duplicate_check(
        &self,
        draft: &TopicDraftSnapshot,
    ) -> Result<(DuplicateCheckResult, Option<ModificationProposal>), AppError> {
        let response = self
            .http
            .post(self.url("/ai/duplicate-check"))
            .json(draft)
            .send()
            .await?;
        let raw: wire::RawDuplicateCheckResponse = Self::decode(response).await?;
        wire::normalize_duplicate_check(raw)
    }

    /// Fetch the unscored available-reviewer list for a submission.
    pub async fn available_reviewers(
        &self,
        submission_id: i64,
    ) -> Result<Vec<ReviewerCandidate>, AppError> {
        let response = self
            .http
            .get(self.url("/reviewers/available"))
            .query(&[("submissionId", submission_id)])
            .send()
            .await?;
        let raw: Vec<wire::RawReviewerCandidate> = Self::decode(response).await?;
        Ok(wire::normalize_candidates(raw))
    }

    /// Fetch the AI-scored recommended-reviewer list for a submission.
    pub async fn recommended_reviewers(
        &self,
        submission_id: i64,
        filters: RecommendationFilters,
    ) -> Result<Vec<ReviewerCandidate>, AppError> {
        let mut request = self
            .http
            .get(self.url("/reviewers/recommended"))
            .query(&[("submissionId", submission_id)]);
        if let Some(score) = filters.min_skill_score {
            request = request.query(&[("minSkillScore", score)]);
        }
        if let Some(workload) = filters.max_workload {
            request = request.query(&[("maxWorkload", workload)]);
        }
        let raw: Vec<wire::RawReviewerCandidate> = Self::decode(request.send().await?).await?;
        Ok(wire::normalize_candidates(raw))
    }

    /// Dispatch an assignment batch as one bulk request; atomic from the
    /// gateway's perspective.
    pub async fn bulk_assign(
        &self,
        assignments: &[ReviewerAssignmentRequest],
    ) -> Result<AssignmentOutcome, AppError> {
        let response = self
            .http
            .post(self.url("/reviewer-assignments/bulk"))
            .json(&BulkAssignmentBody { assignments })
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Fetch the status fields consumed by the workflow gate.
    pub async fn topic_detail(&self, topic_id: i64) -> Result<Option<TopicDetail>, AppError> {
        let response = self
            .http
            .get(self.url(&format!("/topics/{}", topic_id)))
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let raw: wire::RawTopicDetail = Self::decode(response).await?;
        wire::normalize_topic_detail(raw).map(Some)
    }

    /// Fetch the category display-name lookup.
    pub async fn categories(&self) -> Result<HashMap<i64, String>, AppError> {
        self.id_name_lookup("/categories").await
    }

    /// Fetch the semester display-name lookup.
    pub async fn semesters(&self) -> Result<HashMap<i64, String>, AppError> {
        self.id_name_lookup("/semesters").await
    }

    async fn id_name_lookup(&self, path: &str) -> Result<HashMap<i64, String>, AppError> {
        let response = self.http.get(self.url(path)).send().await?;
        let raw: Vec<wire::RawIdName> = Self::decode(response).await?;
        Ok(raw
            .into_iter()
            .filter_map(|entry| Some((entry.id.as_i64()?, entry.name?)))
            .collect())
    }

    /// Create or save a topic from the confirmed draft.
    pub async fn save_topic(&self, draft: &TopicDraftSnapshot) -> Result<SavedTopic, AppError> {
        let response = match draft.topic_id {
            Some(topic_id) => {
                self.http
                    .put(self.url(&format!("/topics/{}", topic_id)))
                    .json(draft)
                    .send()
                    .await?
            }
            None => self.http.post(self.url("/topics")).json(draft).send().await?,
        };
        Self::decode(response).await
    }

    /// Submit a topic into a phase.
    pub async fn submit_topic(&self, topic_id: i64, phase_id: i64) -> Result<(), AppError> {
        let response = self
            .http
            .post(self.url(&format!("/topics/{}/submit", topic_id)))
            .json(&SubmitTopicBody { phase_id })
            .send()
            .await?;
        Self::ensure_success(&response)?;
        Ok(())
    }

    fn ensure_success(response: &reqwest::Response) -> Result<(), AppError> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(AppError::Upstream(format!(
                "Upstream returned {}",
                status
            )))
        }
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        Self::ensure_success(&response)?;
        response
            .json::<T>()
            .await
            .map_err(|e| AppError::Upstream(format!("Invalid upstream response: {}", e)))
    }
}
