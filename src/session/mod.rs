//! In-memory workflow session store.
//!
//! Holds draft and reviewer-selection sessions between routed workflow
//! steps. Process-local by contract: sessions are lost on restart, and a
//! discarded session drops any in-flight check result on arrival.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::engine::duplicate::DuplicateDecision;
use crate::engine::reviewers::ReviewerSelection;
use crate::models::{
    AssignmentCapacity, DuplicateCheckResult, ModificationProposal, TopicDraftSnapshot,
};

/// Stored outcome of the most recent completed duplicate check.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutcome {
    pub result: DuplicateCheckResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposal: Option<ModificationProposal>,
    pub decision: DuplicateDecision,
}

/// A topic draft moving through edit, duplicate-check, suggestion-review
/// and confirm.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSession {
    pub id: Uuid,
    pub draft: TopicDraftSnapshot,
    /// Absent until a check completes; a failed check leaves this unset so
    /// gating never defaults to allow
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<CheckOutcome>,
    /// Set once the AI proposal has been applied to the draft
    pub suggestion_applied: bool,
    #[serde(skip)]
    pub check_generation: u64,
    pub created_at: DateTime<Utc>,
}

/// An in-progress reviewer selection against one or more submissions.
#[derive(Debug, Clone)]
pub struct SelectionSession {
    pub id: Uuid,
    pub submission_ids: Vec<i64>,
    pub capacity: AssignmentCapacity,
    pub selection: ReviewerSelection,
    pub created_at: DateTime<Utc>,
}

/// Owner of all ephemeral workflow state.
#[derive(Default)]
pub struct SessionStore {
    drafts: RwLock<HashMap<Uuid, DraftSession>>,
    selections: RwLock<HashMap<Uuid, SelectionSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create_draft(&self, draft: TopicDraftSnapshot) -> DraftSession {
        let session = DraftSession {
            id: Uuid::new_v4(),
            draft,
            outcome: None,
            suggestion_applied: false,
            check_generation: 0,
            created_at: Utc::now(),
        };
        self.drafts
            .write()
            .await
            .insert(session.id, session.clone());
        session
    }

    pub async fn get_draft(&self, id: Uuid) -> Option<DraftSession> {
        self.drafts.read().await.get(&id).cloned()
    }

    pub async fn discard_draft(&self, id: Uuid) -> bool {
        self.drafts.write().await.remove(&id).is_some()
    }

    /// Start a new duplicate check: bumps the generation and clears the
    /// previous outcome and any accepted suggestion, so a stale decision
    /// can never gate the draft. The fresh check's outcome governs from
    /// here on.
    pub async fn begin_check(&self, id: Uuid) -> Option<(TopicDraftSnapshot, u64)> {
        let mut drafts = self.drafts.write().await;
        let session = drafts.get_mut(&id)?;
        session.check_generation += 1;
        session.outcome = None;
        session.suggestion_applied = false;
        Some((session.draft.clone(), session.check_generation))
    }

    /// Store a completed check outcome, unless the session is gone or a
    /// newer check superseded this one. Returns whether it was applied.
    pub async fn complete_check(&self, id: Uuid, generation: u64, outcome: CheckOutcome) -> bool {
        let mut drafts = self.drafts.write().await;
        match drafts.get_mut(&id) {
            Some(session) if session.check_generation == generation => {
                session.outcome = Some(outcome);
                true
            }
            Some(_) => {
                tracing::debug!("Discarding superseded duplicate-check result for draft {}", id);
                false
            }
            None => {
                tracing::debug!("Discarding duplicate-check result for discarded draft {}", id);
                false
            }
        }
    }

    /// Replace the draft with the merged suggestion and mark it accepted.
    ///
    /// The check outcome that produced the proposal is cleared: it
    /// described the pre-merge draft, and leaving it in place would serve
    /// a blocking decision alongside the accepted revision.
    pub async fn apply_suggestion(&self, id: Uuid, merged: TopicDraftSnapshot) -> Option<DraftSession> {
        let mut drafts = self.drafts.write().await;
        let session = drafts.get_mut(&id)?;
        session.draft = merged;
        session.suggestion_applied = true;
        session.outcome = None;
        Some(session.clone())
    }

    pub async fn create_selection(
        &self,
        submission_ids: Vec<i64>,
        capacity: AssignmentCapacity,
    ) -> SelectionSession {
        let session = SelectionSession {
            id: Uuid::new_v4(),
            submission_ids,
            capacity,
            selection: ReviewerSelection::new(),
            created_at: Utc::now(),
        };
        self.selections
            .write()
            .await
            .insert(session.id, session.clone());
        session
    }

    pub async fn get_selection(&self, id: Uuid) -> Option<SelectionSession> {
        self.selections.read().await.get(&id).cloned()
    }

    pub async fn discard_selection(&self, id: Uuid) -> bool {
        self.selections.write().await.remove(&id).is_some()
    }

    /// Mutate a selection session under the write lock.
    ///
    /// The closure's error leaves the session untouched only if the closure
    /// itself did not mutate; `ReviewerSelection::toggle` guarantees no
    /// mutation on rejection.
    pub async fn with_selection<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut SelectionSession) -> T,
    ) -> Option<T> {
        let mut selections = self.selections.write().await;
        selections.get_mut(&id).map(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::duplicate::classify;
    use crate::models::DuplicateStatus;

    fn draft() -> TopicDraftSnapshot {
        TopicDraftSnapshot {
            topic_id: Some(1),
            title: "T".to_string(),
            english_title: None,
            abbreviation: None,
            problem: None,
            context: None,
            content: None,
            description: None,
            objectives: None,
            category_id: None,
            category_name: None,
            semester_id: None,
            semester_name: None,
            supervisor_id: None,
            max_students: 1,
            file_id: None,
        }
    }

    fn outcome() -> CheckOutcome {
        CheckOutcome {
            result: DuplicateCheckResult {
                status: DuplicateStatus::NoDuplicate,
                similarity_score: 0.1,
                threshold: 0.6,
                similar_topics: vec![],
                message: None,
                recommendations: vec![],
            },
            proposal: None,
            decision: classify(DuplicateStatus::NoDuplicate),
        }
    }

    #[tokio::test]
    async fn test_stale_check_result_discarded() {
        let store = SessionStore::new();
        let session = store.create_draft(draft()).await;

        let (_, first_generation) = store.begin_check(session.id).await.unwrap();
        // A second check starts before the first resolves
        let (_, second_generation) = store.begin_check(session.id).await.unwrap();

        assert!(!store
            .complete_check(session.id, first_generation, outcome())
            .await);
        assert!(store.get_draft(session.id).await.unwrap().outcome.is_none());

        assert!(store
            .complete_check(session.id, second_generation, outcome())
            .await);
        assert!(store.get_draft(session.id).await.unwrap().outcome.is_some());
    }

    #[tokio::test]
    async fn test_result_for_discarded_session_dropped() {
        let store = SessionStore::new();
        let session = store.create_draft(draft()).await;
        let (_, generation) = store.begin_check(session.id).await.unwrap();

        assert!(store.discard_draft(session.id).await);
        assert!(!store.complete_check(session.id, generation, outcome()).await);
    }

    #[tokio::test]
    async fn test_begin_check_clears_previous_outcome() {
        let store = SessionStore::new();
        let session = store.create_draft(draft()).await;
        let (_, generation) = store.begin_check(session.id).await.unwrap();
        store.complete_check(session.id, generation, outcome()).await;

        store.begin_check(session.id).await.unwrap();
        assert!(store.get_draft(session.id).await.unwrap().outcome.is_none());
    }

    #[tokio::test]
    async fn test_begin_check_supersedes_accepted_suggestion() {
        let store = SessionStore::new();
        let session = store.create_draft(draft()).await;
        store.apply_suggestion(session.id, draft()).await.unwrap();
        assert!(store.get_draft(session.id).await.unwrap().suggestion_applied);

        // A new check takes over gating from the accepted suggestion
        store.begin_check(session.id).await.unwrap();
        assert!(!store.get_draft(session.id).await.unwrap().suggestion_applied);
    }

    #[tokio::test]
    async fn test_apply_suggestion_clears_stale_outcome() {
        let store = SessionStore::new();
        let session = store.create_draft(draft()).await;
        let (_, generation) = store.begin_check(session.id).await.unwrap();
        store.complete_check(session.id, generation, outcome()).await;

        let updated = store.apply_suggestion(session.id, draft()).await.unwrap();
        assert!(updated.suggestion_applied);
        // The pre-merge decision no longer describes the draft
        assert!(updated.outcome.is_none());
    }
}
