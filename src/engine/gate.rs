//! Submission workflow gate.
//!
//! Decides whether topic submit/edit actions are currently permitted from
//! status flags fetched from the backend.

use crate::errors::AppError;
use crate::models::{SubmissionStatus, TopicDetail};

/// Resolve the target phase id.
///
/// An explicit caller-supplied value wins over one parsed from the
/// navigation query string. `None` means submission must be blocked with a
/// missing-phase error, never silently defaulted.
pub fn resolve_phase_id(explicit: Option<i64>, query: Option<&str>) -> Option<i64> {
    explicit.or_else(|| query.and_then(|q| q.trim().parse::<i64>().ok()))
}

/// Turn an unresolved phase id into a blocking precondition error.
pub fn ensure_phase_id(phase_id: Option<i64>) -> Result<i64, AppError> {
    phase_id.ok_or_else(|| {
        AppError::Precondition("No submission phase could be resolved for this action".to_string())
    })
}

/// Whether a topic may be submitted right now.
///
/// Requires a present topic, a resolved phase id, no submit already in
/// flight, and a topic not already in a blocking (submitted) state.
pub fn can_submit(topic: Option<&TopicDetail>, phase_id: Option<i64>, submit_in_flight: bool) -> bool {
    let Some(topic) = topic else {
        return false;
    };
    if submit_in_flight || phase_id.is_none() {
        return false;
    }
    !topic.has_submitted
}

/// Whether a topic may be edited in place.
///
/// False when the latest submission status requires a new version and the
/// edit target is the original version; the forward action there is
/// creating a new version, not editing in place.
pub fn can_edit(topic: &TopicDetail, editing_original_version: bool) -> bool {
    match topic.latest_submission_status {
        Some(status) if status.requires_new_version() => !editing_original_version,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic(has_submitted: bool, status: Option<SubmissionStatus>) -> TopicDetail {
        TopicDetail {
            id: 42,
            has_submitted,
            latest_submission_status: status,
            latest_submitted_at: None,
        }
    }

    #[test]
    fn test_resolve_phase_explicit_wins() {
        assert_eq!(resolve_phase_id(Some(5), Some("9")), Some(5));
        assert_eq!(resolve_phase_id(None, Some("9")), Some(9));
        assert_eq!(resolve_phase_id(None, Some("not-a-number")), None);
        assert_eq!(resolve_phase_id(None, None), None);
    }

    #[test]
    fn test_ensure_phase_id_blocks_when_unresolved() {
        assert!(matches!(
            ensure_phase_id(None),
            Err(AppError::Precondition(_))
        ));
        assert_eq!(ensure_phase_id(Some(3)).unwrap(), 3);
    }

    #[test]
    fn test_can_submit_requires_topic() {
        assert!(!can_submit(None, Some(1), false));
    }

    #[test]
    fn test_can_submit_requires_phase_and_idle() {
        let t = topic(false, None);
        assert!(can_submit(Some(&t), Some(1), false));
        assert!(!can_submit(Some(&t), None, false));
        assert!(!can_submit(Some(&t), Some(1), true));
    }

    #[test]
    fn test_can_submit_blocked_after_submission() {
        let t = topic(true, Some(SubmissionStatus::Pending));
        assert!(!can_submit(Some(&t), Some(1), false));
    }

    #[test]
    fn test_can_edit_locked_by_revision_required() {
        let locked = topic(true, Some(SubmissionStatus::RevisionRequired));
        assert!(!can_edit(&locked, true));
        // Editing as a new version is the allowed forward path
        assert!(can_edit(&locked, false));

        let open = topic(false, Some(SubmissionStatus::Unsubmitted));
        assert!(can_edit(&open, true));
    }
}
