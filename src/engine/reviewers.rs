//! Reviewer selection constraint engine.
//!
//! Maintains a selection set bounded by remaining capacity and builds the
//! assignment batch dispatched on confirmation.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{AssignmentType, ReviewerAssignmentRequest, ReviewerCandidate};

/// In-progress reviewer selection for one selection session.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReviewerSelection {
    selected: BTreeSet<i64>,
}

impl ReviewerSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.selected.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn contains(&self, id: i64) -> bool {
        self.selected.contains(&id)
    }

    /// Select or deselect a reviewer.
    ///
    /// Selecting a new reviewer while the selection is already at capacity
    /// is rejected without mutation. Re-selecting a present id and
    /// deselecting an absent id are no-ops.
    pub fn toggle(&mut self, id: i64, checked: bool, remaining_slots: u32) -> Result<(), AppError> {
        if !checked {
            self.selected.remove(&id);
            return Ok(());
        }
        if self.selected.contains(&id) {
            return Ok(());
        }
        if self.selected.len() >= remaining_slots as usize {
            return Err(AppError::Capacity {
                message: format!(
                    "Cannot select more than {} reviewer(s) for this submission",
                    remaining_slots
                ),
                remaining_slots,
            });
        }
        self.selected.insert(id);
        Ok(())
    }

    /// Whether a confirm action is currently valid.
    ///
    /// False when nothing is selected, a list fetch is in flight, the
    /// caller disabled confirmation (e.g. a required deadline is unset),
    /// no capacity remains, or the selection exceeds capacity.
    pub fn can_confirm(&self, remaining_slots: u32, list_loading: bool, disabled: bool) -> bool {
        !(self.selected.is_empty()
            || list_loading
            || disabled
            || remaining_slots == 0
            || self.selected.len() > remaining_slots as usize)
    }

    /// Build one assignment request per (submission, reviewer) pair.
    ///
    /// With multiple submission ids this is a deliberate cross-product
    /// fan-out; every request carries the same type and deadline.
    pub fn build_assignment_batch(
        &self,
        submission_ids: &[i64],
        assignment_type: AssignmentType,
        deadline: Option<DateTime<Utc>>,
    ) -> Vec<ReviewerAssignmentRequest> {
        submission_ids
            .iter()
            .flat_map(|&submission_id| {
                self.selected
                    .iter()
                    .map(move |&reviewer_id| ReviewerAssignmentRequest {
                        submission_id,
                        reviewer_id,
                        assignment_type,
                        deadline,
                    })
            })
            .collect()
    }
}

/// Narrow the visible candidate list by a case-insensitive substring match
/// over display name and stringified id.
///
/// Filtering never affects the selection; a selected reviewer filtered out
/// of view stays selected.
pub fn filter_candidates(candidates: &[ReviewerCandidate], query: &str) -> Vec<ReviewerCandidate> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return candidates.to_vec();
    }
    candidates
        .iter()
        .filter(|c| {
            c.display_name.to_lowercase().contains(&needle) || c.id.to_string().contains(&needle)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: i64, name: &str) -> ReviewerCandidate {
        ReviewerCandidate {
            id,
            display_name: name.to_string(),
            current_assignment_count: 0,
            match_score: None,
            ineligibility_reasons: vec![],
        }
    }

    #[test]
    fn test_toggle_adds_and_removes() {
        let mut selection = ReviewerSelection::new();
        selection.toggle(1, true, 3).unwrap();
        selection.toggle(2, true, 3).unwrap();
        assert_eq!(selection.len(), 2);

        selection.toggle(1, false, 3).unwrap();
        assert!(!selection.contains(1));
        assert!(selection.contains(2));
    }

    #[test]
    fn test_toggle_rejected_at_capacity() {
        let mut selection = ReviewerSelection::new();
        selection.toggle(1, true, 2).unwrap();
        selection.toggle(2, true, 2).unwrap();

        let result = selection.toggle(3, true, 2);
        assert!(matches!(result, Err(AppError::Capacity { .. })));
        assert_eq!(selection.len(), 2);
        assert!(!selection.contains(3));
    }

    #[test]
    fn test_toggle_idempotent() {
        let mut selection = ReviewerSelection::new();
        selection.toggle(1, true, 1).unwrap();
        // Re-selecting a present id is a no-op even at capacity
        selection.toggle(1, true, 1).unwrap();
        assert_eq!(selection.len(), 1);
        // Deselecting an absent id is a no-op
        selection.toggle(9, false, 1).unwrap();
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn test_can_confirm_false_on_empty_selection() {
        let selection = ReviewerSelection::new();
        assert!(!selection.can_confirm(5, false, false));
    }

    #[test]
    fn test_can_confirm_false_while_loading_or_disabled() {
        let mut selection = ReviewerSelection::new();
        selection.toggle(1, true, 2).unwrap();
        assert!(selection.can_confirm(2, false, false));
        assert!(!selection.can_confirm(2, true, false));
        assert!(!selection.can_confirm(2, false, true));
        assert!(!selection.can_confirm(0, false, false));
    }

    #[test]
    fn test_can_confirm_false_when_selection_exceeds_capacity() {
        let mut selection = ReviewerSelection::new();
        selection.toggle(1, true, 3).unwrap();
        selection.toggle(2, true, 3).unwrap();
        // Capacity shrank after selection was made
        assert!(!selection.can_confirm(1, false, false));
    }

    #[test]
    fn test_batch_single_submission() {
        let mut selection = ReviewerSelection::new();
        selection.toggle(1, true, 3).unwrap();
        selection.toggle(2, true, 3).unwrap();

        let batch = selection.build_assignment_batch(&[10], AssignmentType::Secondary, None);
        assert_eq!(batch.len(), 2);
        assert!(batch.iter().all(|r| r.submission_id == 10));
        assert!(batch
            .iter()
            .all(|r| r.assignment_type == AssignmentType::Secondary));
    }

    #[test]
    fn test_batch_bulk_cross_product() {
        let mut selection = ReviewerSelection::new();
        selection.toggle(1, true, 4).unwrap();
        selection.toggle(2, true, 4).unwrap();

        let batch = selection.build_assignment_batch(&[10, 20], AssignmentType::Primary, None);
        assert_eq!(batch.len(), 4);
        for submission_id in [10, 20] {
            for reviewer_id in [1, 2] {
                assert!(batch
                    .iter()
                    .any(|r| r.submission_id == submission_id && r.reviewer_id == reviewer_id));
            }
        }
        assert!(batch
            .iter()
            .all(|r| r.assignment_type == AssignmentType::Primary));
    }

    #[test]
    fn test_filter_matches_name_and_id() {
        let candidates = vec![
            candidate(101, "Alice Nguyen"),
            candidate(202, "Bob Tran"),
            candidate(310, "Carol Pham"),
        ];

        let by_name = filter_candidates(&candidates, "aLiCe");
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].id, 101);

        let by_id = filter_candidates(&candidates, "20");
        assert_eq!(by_id.len(), 1);
        assert_eq!(by_id[0].id, 202);

        let all = filter_candidates(&candidates, "  ");
        assert_eq!(all.len(), 3);
    }
}
