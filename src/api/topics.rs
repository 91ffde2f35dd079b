//! Topic gate endpoints: submit/edit permission checks and gated submit.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::{success, ApiResult};
use crate::engine::gate;
use crate::errors::AppError;
use crate::models::SubmissionStatus;
use crate::AppState;

/// Query parameters for gate checks, mirroring the navigation query string.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateQuery {
    /// Phase id as carried in the navigation query string
    #[serde(default)]
    pub phase_id: Option<String>,
    /// Whether the edit target is a new version rather than the original
    #[serde(default)]
    pub new_version: Option<bool>,
}

/// Gate decision for a topic.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicGateView {
    pub can_submit: bool,
    pub can_edit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_submission_status: Option<SubmissionStatus>,
}

/// GET /api/topics/:id/gate - Submit/edit permissions for a topic.
pub async fn topic_gate(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<GateQuery>,
) -> ApiResult<TopicGateView> {
    let topic = state
        .upstream
        .topic_detail(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Topic {} not found", id)))?;

    let phase_id = gate::resolve_phase_id(None, query.phase_id.as_deref());
    let editing_original = !query.new_version.unwrap_or(false);

    success(TopicGateView {
        can_submit: gate::can_submit(Some(&topic), phase_id, false),
        can_edit: gate::can_edit(&topic, editing_original),
        phase_id,
        latest_submission_status: topic.latest_submission_status,
    })
}

/// Request body for submitting a topic.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTopicRequest {
    /// Explicit phase id; wins over the query-string value
    #[serde(default)]
    pub phase_id: Option<i64>,
}

/// Outcome of a topic submission.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTopicResponse {
    pub submitted: bool,
    pub phase_id: i64,
}

/// POST /api/topics/:id/submit - Submit a topic into a phase.
///
/// An unresolved phase id blocks with an explicit missing-phase error
/// rather than defaulting to any phase.
pub async fn submit_topic(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<GateQuery>,
    Json(request): Json<SubmitTopicRequest>,
) -> ApiResult<SubmitTopicResponse> {
    let phase_id = gate::ensure_phase_id(gate::resolve_phase_id(
        request.phase_id,
        query.phase_id.as_deref(),
    ))?;

    let topic = state
        .upstream
        .topic_detail(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Topic {} not found", id)))?;

    if !gate::can_submit(Some(&topic), Some(phase_id), false) {
        return Err(AppError::Precondition(format!(
            "Topic {} cannot be submitted in its current state",
            id
        )));
    }

    state.upstream.submit_topic(id, phase_id).await?;
    tracing::info!("Topic {} submitted into phase {}", id, phase_id);
    success(SubmitTopicResponse {
        submitted: true,
        phase_id,
    })
}
