//! Duplicate-check contracts matching the upstream AI response, normalized.

use serde::{Deserialize, Serialize};

/// Mutually exclusive classification of an AI duplicate-check response.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateStatus {
    NoDuplicate,
    PotentialDuplicate,
    DuplicateFound,
}

impl DuplicateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DuplicateStatus::NoDuplicate => "no_duplicate",
            DuplicateStatus::PotentialDuplicate => "potential_duplicate",
            DuplicateStatus::DuplicateFound => "duplicate_found",
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
            "noduplicate" => Some(DuplicateStatus::NoDuplicate),
            "potentialduplicate" => Some(DuplicateStatus::PotentialDuplicate),
            "duplicatefound" => Some(DuplicateStatus::DuplicateFound),
            _ => None,
        }
    }
}

/// Reference to an existing topic flagged as similar to the checked draft.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SimilarTopicRef {
    pub topic_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<i64>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub english_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semester_id: Option<i64>,
    pub similarity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Normalized duplicate-check result.
///
/// `status` is trusted as computed by the backend; the gateway never
/// recomputes it from `similarity_score` and `threshold`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateCheckResult {
    pub status: DuplicateStatus,
    /// Highest similarity observed among candidates, in [0,1]
    pub similarity_score: f64,
    /// Cutoff the backend used to classify `status`, in [0,1]
    pub threshold: f64,
    /// Sorted by descending similarity at the decode boundary
    #[serde(default)]
    pub similar_topics: Vec<SimilarTopicRef>,
    /// Advisory text, no control-flow effect
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

/// Partial topic field set proposed by the AI to resolve a duplicate.
///
/// Absent fields preserve the original draft's values on merge.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModifiedTopicFields {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub english_title: Option<String>,
    #[serde(default)]
    pub abbreviation: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub objectives: Option<String>,
    #[serde(default)]
    pub problem: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub semester_id: Option<i64>,
    #[serde(default)]
    pub supervisor_id: Option<i64>,
    #[serde(default)]
    pub max_students: Option<i32>,
}

/// Optional companion to a duplicate-check result carrying the AI rewrite.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModificationProposal {
    pub modified_topic: ModifiedTopicFields,
    /// Advisory, no control-flow effect
    #[serde(default)]
    pub modifications_made: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_improvement: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_variants() {
        assert_eq!(
            DuplicateStatus::parse("no_duplicate"),
            Some(DuplicateStatus::NoDuplicate)
        );
        assert_eq!(
            DuplicateStatus::parse("PotentialDuplicate"),
            Some(DuplicateStatus::PotentialDuplicate)
        );
        assert_eq!(
            DuplicateStatus::parse("DUPLICATE-FOUND"),
            Some(DuplicateStatus::DuplicateFound)
        );
        assert_eq!(DuplicateStatus::parse("unknown"), None);
        assert_eq!(DuplicateStatus::DuplicateFound.as_str(), "duplicate_found");
    }
}
