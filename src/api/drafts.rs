//! Draft workflow endpoints: open, check, apply suggestion, confirm.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{success, ApiResult};
use crate::engine::duplicate::{classify, merge_suggestion, NameLookup};
use crate::errors::AppError;
use crate::models::TopicDraftSnapshot;
use crate::session::{CheckOutcome, DraftSession};
use crate::AppState;

/// POST /api/drafts - Open a draft session.
pub async fn create_draft(
    State(state): State<AppState>,
    Json(draft): Json<TopicDraftSnapshot>,
) -> ApiResult<DraftSession> {
    // Validate required fields before anything else touches the draft
    if draft.title.trim().is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }
    if draft.max_students < 1 {
        return Err(AppError::Validation(
            "Max students must be at least 1".to_string(),
        ));
    }

    let session = state.sessions.create_draft(draft).await;
    tracing::info!("Opened draft session {}", session.id);
    success(session)
}

/// GET /api/drafts/:id - Fetch a draft session.
pub async fn get_draft(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<DraftSession> {
    match state.sessions.get_draft(id).await {
        Some(session) => success(session),
        None => Err(AppError::NotFound(format!("Draft session {} not found", id))),
    }
}

/// DELETE /api/drafts/:id - Discard a draft session.
///
/// Models navigation away: any duplicate-check result still in flight for
/// this session is dropped when it arrives.
pub async fn discard_draft(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<()> {
    if state.sessions.discard_draft(id).await {
        success(())
    } else {
        Err(AppError::NotFound(format!("Draft session {} not found", id)))
    }
}

/// POST /api/drafts/:id/check - Run the AI duplicate check.
///
/// A failed or timed-out check leaves the session with no stored outcome,
/// so gating never defaults to allow.
pub async fn run_duplicate_check(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<CheckOutcome> {
    let (draft, generation) = state
        .sessions
        .begin_check(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Draft session {} not found", id)))?;

    let (result, proposal) = state.upstream.duplicate_check(&draft).await?;
    let outcome = CheckOutcome {
        decision: classify(result.status),
        result,
        proposal,
    };

    if !state
        .sessions
        .complete_check(id, generation, outcome.clone())
        .await
    {
        // Session discarded or superseded while the check was in flight
        return Err(AppError::NotFound(format!(
            "Draft session {} is no longer active",
            id
        )));
    }
    success(outcome)
}

/// POST /api/drafts/:id/suggestion - Apply the stored AI proposal.
pub async fn apply_suggestion(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<DraftSession> {
    let session = state
        .sessions
        .get_draft(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Draft session {} not found", id)))?;

    let proposal = session
        .outcome
        .as_ref()
        .and_then(|outcome| outcome.proposal.clone())
        .ok_or_else(|| {
            AppError::Precondition(
                "No modification proposal is available for this draft".to_string(),
            )
        })?;

    // Display-name lookups are cosmetic; merge falls back to the original
    // names when a lookup cannot be fetched
    let names = NameLookup {
        categories: state.upstream.categories().await.unwrap_or_else(|e| {
            tracing::warn!("Category lookup unavailable: {}", e);
            Default::default()
        }),
        semesters: state.upstream.semesters().await.unwrap_or_else(|e| {
            tracing::warn!("Semester lookup unavailable: {}", e);
            Default::default()
        }),
    };

    let merged = merge_suggestion(&session.draft, &proposal, &names)?;
    let updated = state
        .sessions
        .apply_suggestion(id, merged)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Draft session {} not found", id)))?;
    success(updated)
}

/// Request body for the gated confirm action.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmDraftRequest {
    /// Explicit user confirmation for the potential-duplicate path
    #[serde(default)]
    pub confirmed: bool,
}

/// Outcome of a confirm action.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmDraftResponse {
    pub dispatched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<i64>,
}

/// POST /api/drafts/:id/confirm - Gated create/save of the draft.
///
/// Classification gates the dispatch: duplicate_found blocks outright,
/// potential_duplicate needs the explicit confirmation flag (declining
/// aborts with no side effects), no_duplicate dispatches directly. A draft
/// with an accepted suggestion and no newer check dispatches without
/// re-checking; a stored outcome always gates, even after a suggestion
/// was accepted earlier.
pub async fn confirm_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ConfirmDraftRequest>,
) -> ApiResult<ConfirmDraftResponse> {
    let session = state
        .sessions
        .get_draft(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Draft session {} not found", id)))?;

    if session.draft.topic_id.is_none() {
        return Err(AppError::Precondition(
            "Draft has no topic id; cannot confirm creation".to_string(),
        ));
    }

    match session.outcome.as_ref() {
        Some(outcome) => {
            if outcome.decision.blocks_creation {
                return Err(AppError::Precondition(
                    "A duplicate was found; apply the suggested revision or edit and re-check"
                        .to_string(),
                ));
            }
            if outcome.decision.requires_confirmation && !request.confirmed {
                // Declined: abort with no side effects, draft preserved
                tracing::info!("Draft {} confirmation declined by user", id);
                return success(ConfirmDraftResponse {
                    dispatched: false,
                    topic_id: None,
                });
            }
        }
        None if session.suggestion_applied => {
            // Accepted suggestion with no newer check: dispatch directly
        }
        None => {
            return Err(AppError::Precondition(
                "Run a duplicate check before confirming this draft".to_string(),
            ));
        }
    }

    let saved = state.upstream.save_topic(&session.draft).await?;
    // Lifecycle: the snapshot is destroyed on successful save
    state.sessions.discard_draft(id).await;
    tracing::info!("Draft session {} confirmed and saved", id);

    success(ConfirmDraftResponse {
        dispatched: true,
        topic_id: saved.topic_id.or(session.draft.topic_id),
    })
}
