//! Submission lifecycle states and the topic status fields behind the
//! workflow gate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a topic submission, derived read-only from backend
/// status strings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Unsubmitted,
    Pending,
    UnderReview,
    Duplicate,
    RevisionRequired,
    EscalatedToModerator,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Unsubmitted => "unsubmitted",
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::UnderReview => "under_review",
            SubmissionStatus::Duplicate => "duplicate",
            SubmissionStatus::RevisionRequired => "revision_required",
            SubmissionStatus::EscalatedToModerator => "escalated_to_moderator",
            SubmissionStatus::Approved => "approved",
            SubmissionStatus::Rejected => "rejected",
        }
    }

    /// Parse a backend status label. Tolerates case and separator variations.
    pub fn parse(s: &str) -> Option<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "unsubmitted" => Some(SubmissionStatus::Unsubmitted),
            "pending" => Some(SubmissionStatus::Pending),
            "underreview" => Some(SubmissionStatus::UnderReview),
            "duplicate" => Some(SubmissionStatus::Duplicate),
            "revisionrequired" => Some(SubmissionStatus::RevisionRequired),
            "escalatedtomoderator" => Some(SubmissionStatus::EscalatedToModerator),
            "approved" => Some(SubmissionStatus::Approved),
            "rejected" => Some(SubmissionStatus::Rejected),
            _ => None,
        }
    }

    /// States reachable from this one in the submission lifecycle.
    ///
    /// `RevisionRequired` loops back to `Pending` only through creation of
    /// a new version, never through resubmission of the same version.
    pub fn transitions(&self) -> &'static [SubmissionStatus] {
        match self {
            SubmissionStatus::Unsubmitted => &[SubmissionStatus::Pending],
            SubmissionStatus::Pending => &[SubmissionStatus::UnderReview],
            SubmissionStatus::UnderReview => &[
                SubmissionStatus::Duplicate,
                SubmissionStatus::RevisionRequired,
                SubmissionStatus::EscalatedToModerator,
                SubmissionStatus::Approved,
                SubmissionStatus::Rejected,
            ],
            SubmissionStatus::RevisionRequired => &[SubmissionStatus::Pending],
            SubmissionStatus::Duplicate
            | SubmissionStatus::EscalatedToModerator
            | SubmissionStatus::Approved
            | SubmissionStatus::Rejected => &[],
        }
    }

    /// Whether no further transition is offered from this state.
    pub fn is_terminal(&self) -> bool {
        self.transitions().is_empty()
    }

    /// Whether the only forward action is creating a new version.
    pub fn requires_new_version(&self) -> bool {
        matches!(self, SubmissionStatus::RevisionRequired)
    }
}

/// Topic status fields consumed by the workflow gate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TopicDetail {
    pub id: i64,
    #[serde(default)]
    pub has_submitted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_submission_status: Option<SubmissionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_submitted_at: Option<DateTime<Utc>>,
}
