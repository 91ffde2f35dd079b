//! Reviewer selection endpoints: open session, list candidates, toggle,
//! confirm.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{success, ApiResult};
use crate::engine::reviewers::filter_candidates;
use crate::errors::AppError;
use crate::models::{AssignmentCapacity, AssignmentType, ReviewerCandidate};
use crate::session::SelectionSession;
use crate::upstream::{AssignmentOutcome, RecommendationFilters};
use crate::AppState;

/// Request body for opening a selection session.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSelectionRequest {
    pub submission_ids: Vec<i64>,
    pub capacity: AssignmentCapacity,
}

/// Serializable view of a selection session.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionView {
    pub id: Uuid,
    pub submission_ids: Vec<i64>,
    pub remaining_slots: u32,
    pub selected: Vec<i64>,
    pub can_confirm: bool,
    pub created_at: DateTime<Utc>,
}

impl SelectionView {
    fn from_session(session: &SelectionSession) -> Self {
        let remaining_slots = session.capacity.remaining_slots();
        Self {
            id: session.id,
            submission_ids: session.submission_ids.clone(),
            remaining_slots,
            selected: session.selection.ids().collect(),
            can_confirm: session.selection.can_confirm(remaining_slots, false, false),
            created_at: session.created_at,
        }
    }
}

/// POST /api/selections - Open a reviewer-selection session.
pub async fn create_selection(
    State(state): State<AppState>,
    Json(request): Json<CreateSelectionRequest>,
) -> ApiResult<SelectionView> {
    if request.submission_ids.is_empty() {
        return Err(AppError::Validation(
            "At least one submission id is required".to_string(),
        ));
    }
    if let Some(override_value) = request.capacity.remaining_override {
        let derived = request.capacity.derived_slots();
        if override_value > derived {
            tracing::warn!(
                "Remaining-slots override {} exceeds derived capacity {}",
                override_value,
                derived
            );
        }
    }

    let session = state
        .sessions
        .create_selection(request.submission_ids, request.capacity)
        .await;
    tracing::info!("Opened selection session {}", session.id);
    success(SelectionView::from_session(&session))
}

/// GET /api/selections/:id - Fetch selection state.
pub async fn get_selection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<SelectionView> {
    match state.sessions.get_selection(id).await {
        Some(session) => success(SelectionView::from_session(&session)),
        None => Err(AppError::NotFound(format!(
            "Selection session {} not found",
            id
        ))),
    }
}

/// DELETE /api/selections/:id - Discard a selection session.
pub async fn discard_selection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    if state.sessions.discard_selection(id).await {
        success(())
    } else {
        Err(AppError::NotFound(format!(
            "Selection session {} not found",
            id
        )))
    }
}

/// Query parameters for the candidate list.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateQuery {
    /// "available" (default) or "recommended"
    #[serde(default)]
    pub mode: Option<String>,
    /// Case-insensitive substring filter over name and id
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default)]
    pub min_skill_score: Option<f64>,
    #[serde(default)]
    pub max_workload: Option<u32>,
}

/// GET /api/selections/:id/candidates - Candidate reviewer list.
///
/// Narrowing by the filter never affects the selection set.
pub async fn list_candidates(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<CandidateQuery>,
) -> ApiResult<Vec<ReviewerCandidate>> {
    let session = state
        .sessions
        .get_selection(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Selection session {} not found", id)))?;
    // Candidate lists are fetched against the first submission in scope
    let submission_id = session.submission_ids[0];

    let candidates = match query.mode.as_deref() {
        None | Some("available") => state.upstream.available_reviewers(submission_id).await?,
        Some("recommended") => {
            state
                .upstream
                .recommended_reviewers(
                    submission_id,
                    RecommendationFilters {
                        min_skill_score: query.min_skill_score,
                        max_workload: query.max_workload,
                    },
                )
                .await?
        }
        Some(other) => {
            return Err(AppError::BadRequest(format!(
                "Unknown candidate mode: {}",
                other
            )))
        }
    };

    let visible = match query.filter.as_deref() {
        Some(filter) => filter_candidates(&candidates, filter),
        None => candidates,
    };
    success(visible)
}

/// Request body for toggling a reviewer.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleRequest {
    pub reviewer_id: i64,
    pub checked: bool,
}

/// POST /api/selections/:id/toggle - Select or deselect a reviewer.
///
/// A capacity-exceeded toggle is rejected with the selection unchanged.
pub async fn toggle_reviewer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ToggleRequest>,
) -> ApiResult<SelectionView> {
    let result = state
        .sessions
        .with_selection(id, |session| {
            let remaining = session.capacity.remaining_slots();
            session
                .selection
                .toggle(request.reviewer_id, request.checked, remaining)
                .map(|_| SelectionView::from_session(session))
        })
        .await
        .ok_or_else(|| AppError::NotFound(format!("Selection session {} not found", id)))?;

    success(result?)
}

/// Request body for confirming the selection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmSelectionRequest {
    pub assignment_type: AssignmentType,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    /// When set, a missing deadline disables confirmation
    #[serde(default)]
    pub deadline_required: bool,
}

/// POST /api/selections/:id/confirm - Build and dispatch the assignment
/// batch.
///
/// The batch goes out as a single bulk request; partial upstream failures
/// are treated as an overall failure with no client-side compensation.
pub async fn confirm_selection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ConfirmSelectionRequest>,
) -> ApiResult<AssignmentOutcome> {
    let session = state
        .sessions
        .get_selection(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Selection session {} not found", id)))?;

    let remaining = session.capacity.remaining_slots();
    let disabled = request.deadline_required && request.deadline.is_none();

    if !session.selection.can_confirm(remaining, false, disabled) {
        if session.selection.is_empty() {
            return Err(AppError::Validation("No reviewers selected".to_string()));
        }
        if disabled {
            return Err(AppError::Validation(
                "A deadline is required before confirming".to_string(),
            ));
        }
        return Err(AppError::Capacity {
            message: format!(
                "Selection of {} reviewer(s) exceeds the {} remaining slot(s)",
                session.selection.len(),
                remaining
            ),
            remaining_slots: remaining,
        });
    }

    let batch = session.selection.build_assignment_batch(
        &session.submission_ids,
        request.assignment_type,
        request.deadline,
    );
    tracing::info!(
        "Dispatching {} assignment(s) for selection session {}",
        batch.len(),
        id
    );
    let outcome = state.upstream.bulk_assign(&batch).await?;

    // Selection consumed on successful dispatch
    state.sessions.discard_selection(id).await;
    success(outcome)
}
