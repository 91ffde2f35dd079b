//! Reviewer candidates, assignment capacity and assignment requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role classification of a reviewer on a submission.
///
/// Serialized as its numeric code on the wire.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(into = "i32", try_from = "i32")]
pub enum AssignmentType {
    Primary,
    Secondary,
    Additional,
}

impl AssignmentType {
    pub fn code(&self) -> i32 {
        match self {
            AssignmentType::Primary => 1,
            AssignmentType::Secondary => 2,
            AssignmentType::Additional => 3,
        }
    }
}

impl From<AssignmentType> for i32 {
    fn from(value: AssignmentType) -> Self {
        value.code()
    }
}

impl TryFrom<i32> for AssignmentType {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(AssignmentType::Primary),
            2 => Ok(AssignmentType::Secondary),
            3 => Ok(AssignmentType::Additional),
            other => Err(format!("Unknown assignment type code: {}", other)),
        }
    }
}

/// A reviewer eligible for assignment, from either the available (unscored)
/// or recommended (AI-scored) upstream list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewerCandidate {
    pub id: i64,
    pub display_name: String,
    #[serde(default)]
    pub current_assignment_count: u32,
    /// Present only in recommended mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_score: Option<f64>,
    #[serde(default)]
    pub ineligibility_reasons: Vec<String>,
}

/// Capacity model for reviewer assignment on a submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentCapacity {
    /// Target reviewer headcount for the submission
    pub required_reviewers: u32,
    /// Already-confirmed assignments
    #[serde(default)]
    pub assigned_count: u32,
    /// Explicit override; wins over the derived value when supplied
    #[serde(default)]
    pub remaining_override: Option<u32>,
}

impl AssignmentCapacity {
    /// Count of additional reviewers that may still be assigned.
    ///
    /// The explicit override wins unconditionally; otherwise
    /// `max(0, required - assigned)`.
    pub fn remaining_slots(&self) -> u32 {
        match self.remaining_override {
            Some(override_value) => override_value,
            None => self.derived_slots(),
        }
    }

    /// Remaining capacity derived from required minus assigned.
    pub fn derived_slots(&self) -> u32 {
        self.required_reviewers.saturating_sub(self.assigned_count)
    }
}

/// One reviewer-to-submission assignment, constructed per confirm action
/// and never mutated after dispatch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewerAssignmentRequest {
    pub submission_id: i64,
    pub reviewer_id: i64,
    pub assignment_type: AssignmentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignment_type_codes() {
        assert_eq!(AssignmentType::Primary.code(), 1);
        assert_eq!(AssignmentType::Secondary.code(), 2);
        assert_eq!(AssignmentType::Additional.code(), 3);
        assert_eq!(AssignmentType::try_from(2), Ok(AssignmentType::Secondary));
        assert!(AssignmentType::try_from(4).is_err());
    }

    #[test]
    fn test_remaining_slots_derived() {
        let capacity = AssignmentCapacity {
            required_reviewers: 3,
            assigned_count: 1,
            remaining_override: None,
        };
        assert_eq!(capacity.remaining_slots(), 2);
    }

    #[test]
    fn test_remaining_slots_never_negative() {
        let capacity = AssignmentCapacity {
            required_reviewers: 2,
            assigned_count: 5,
            remaining_override: None,
        };
        assert_eq!(capacity.remaining_slots(), 0);
    }

    #[test]
    fn test_remaining_slots_override_wins() {
        let capacity = AssignmentCapacity {
            required_reviewers: 3,
            assigned_count: 1,
            remaining_override: Some(5),
        };
        assert_eq!(capacity.remaining_slots(), 5);
    }
}
