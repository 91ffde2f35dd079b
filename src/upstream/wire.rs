//! Loose wire shapes for upstream payloads and their normalization.
//!
//! The backend's responses carry optionally-present fields and ids that may
//! arrive as strings or numbers. Everything is normalized into the strict
//! model shapes here, before any decision logic runs.

use serde::Deserialize;

use crate::errors::AppError;
use crate::models::{
    DuplicateCheckResult, DuplicateStatus, ModificationProposal, ModifiedTopicFields,
    ReviewerCandidate, SimilarTopicRef, SubmissionStatus, TopicDetail,
};

/// An id that may arrive as a number or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LooseId {
    Int(i64),
    Float(f64),
    Text(String),
}

impl LooseId {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            LooseId::Int(v) => Some(*v),
            LooseId::Float(v) if v.is_finite() && v.fract() == 0.0 => Some(*v as i64),
            LooseId::Float(_) => None,
            LooseId::Text(s) => s.trim().parse::<i64>().ok(),
        }
    }
}

fn loose_i64(value: &Option<LooseId>) -> Option<i64> {
    value.as_ref().and_then(LooseId::as_i64)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSimilarTopic {
    #[serde(default, alias = "topic_id", alias = "id")]
    pub topic_id: Option<LooseId>,
    #[serde(default, alias = "version_id")]
    pub version_id: Option<LooseId>,
    #[serde(default, alias = "vN_title", alias = "vnTitle")]
    pub title: Option<String>,
    #[serde(default, alias = "english_title", alias = "eN_title")]
    pub english_title: Option<String>,
    #[serde(default, alias = "category_id")]
    pub category_id: Option<LooseId>,
    #[serde(default, alias = "semester_id")]
    pub semester_id: Option<LooseId>,
    #[serde(default, alias = "similarity_score", alias = "similarityScore", alias = "score")]
    pub similarity: Option<f64>,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawModifiedTopic {
    #[serde(default, alias = "vN_title", alias = "vnTitle")]
    pub title: Option<String>,
    #[serde(default, alias = "english_title", alias = "eN_title")]
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
    #[serde(default, alias = "category_id")]
    pub category_id: Option<LooseId>,
    #[serde(default, alias = "semester_id")]
    pub semester_id: Option<LooseId>,
    #[serde(default, alias = "supervisor_id")]
    pub supervisor_id: Option<LooseId>,
    #[serde(default, alias = "max_students")]
    pub max_students: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDuplicateCheckResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "similarity_score")]
    pub similarity_score: Option<f64>,
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default, alias = "similar_topics")]
    pub similar_topics: Vec<RawSimilarTopic>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default, alias = "modified_topic")]
    pub modified_topic: Option<RawModifiedTopic>,
    #[serde(default, alias = "modifications_made")]
    pub modifications_made: Vec<String>,
    #[serde(default)]
    pub rationale: Option<String>,
    #[serde(default, alias = "similarity_improvement")]
    pub similarity_improvement: Option<f64>,
}

/// Normalize a raw duplicate-check response into the strict result and
/// optional proposal.
///
/// Scores are clamped into [0,1], candidates without a usable topic id are
/// dropped, and the similar-topic list is sorted by descending similarity
/// since upstream ordering is not guaranteed.
pub fn normalize_duplicate_check(
    raw: RawDuplicateCheckResponse,
) -> Result<(DuplicateCheckResult, Option<ModificationProposal>), AppError> {
    let status_label = raw
        .status
        .as_deref()
        .ok_or_else(|| AppError::Upstream("Duplicate-check response has no status".to_string()))?;
    let status = DuplicateStatus::parse(status_label).ok_or_else(|| {
        AppError::Upstream(format!(
            "Unrecognized duplicate-check status: {}",
            status_label
        ))
    })?;

    let mut similar_topics: Vec<SimilarTopicRef> = raw
        .similar_topics
        .into_iter()
        .filter_map(|raw_topic| {
            let Some(topic_id) = loose_i64(&raw_topic.topic_id) else {
                tracing::warn!("Dropping similar-topic entry without a usable topic id");
                return None;
            };
            Some(SimilarTopicRef {
                topic_id,
                version_id: loose_i64(&raw_topic.version_id),
                title: raw_topic.title.unwrap_or_default(),
                english_title: raw_topic.english_title,
                category_id: loose_i64(&raw_topic.category_id),
                semester_id: loose_i64(&raw_topic.semester_id),
                similarity: clamp_score(raw_topic.similarity.unwrap_or(0.0)),
                source: raw_topic.source,
            })
        })
        .collect();
    similar_topics.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let result = DuplicateCheckResult {
        status,
        similarity_score: clamp_score(raw.similarity_score.unwrap_or(0.0)),
        threshold: clamp_score(raw.threshold.unwrap_or(0.0)),
        similar_topics,
        message: raw.message,
        recommendations: raw.recommendations,
    };

    let proposal = raw.modified_topic.map(|fields| ModificationProposal {
        modified_topic: ModifiedTopicFields {
            title: fields.title,
            english_title: fields.english_title,
            abbreviation: fields.abbreviation,
            description: fields.description,
            objectives: fields.objectives,
            problem: fields.problem,
            context: fields.context,
            content: fields.content,
            category_id: loose_i64(&fields.category_id),
            semester_id: loose_i64(&fields.semester_id),
            supervisor_id: loose_i64(&fields.supervisor_id),
            max_students: fields.max_students,
        },
        modifications_made: raw.modifications_made,
        rationale: raw.rationale,
        similarity_improvement: raw.similarity_improvement,
    });

    Ok((result, proposal))
}

fn clamp_score(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReviewerCandidate {
    #[serde(default, alias = "reviewer_id", alias = "reviewerId")]
    pub id: Option<LooseId>,
    #[serde(default, alias = "display_name", alias = "name", alias = "fullName")]
    pub display_name: Option<String>,
    #[serde(default, alias = "current_assignment_count", alias = "workload")]
    pub current_assignment_count: Option<u32>,
    #[serde(default, alias = "match_score", alias = "skillMatchScore")]
    pub match_score: Option<f64>,
    #[serde(default, alias = "ineligibility_reasons")]
    pub ineligibility_reasons: Vec<String>,
}

/// Normalize raw reviewer entries, dropping any without a usable id.
pub fn normalize_candidates(raw: Vec<RawReviewerCandidate>) -> Vec<ReviewerCandidate> {
    raw.into_iter()
        .filter_map(|candidate| {
            let Some(id) = loose_i64(&candidate.id) else {
                tracing::warn!("Dropping reviewer entry without a usable id");
                return None;
            };
            Some(ReviewerCandidate {
                id,
                display_name: candidate.display_name.unwrap_or_default(),
                current_assignment_count: candidate.current_assignment_count.unwrap_or(0),
                match_score: candidate.match_score,
                ineligibility_reasons: candidate.ineligibility_reasons,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTopicDetail {
    pub id: LooseId,
    #[serde(default, alias = "has_submitted")]
    pub has_submitted: bool,
    #[serde(default, alias = "latest_submission_status")]
    pub latest_submission_status: Option<String>,
    #[serde(default, alias = "latest_submitted_at")]
    pub latest_submitted_at: Option<String>,
}

/// Normalize a raw topic detail into the gate's strict shape.
pub fn normalize_topic_detail(raw: RawTopicDetail) -> Result<TopicDetail, AppError> {
    let id = raw
        .id
        .as_i64()
        .ok_or_else(|| AppError::Upstream("Topic detail has no usable id".to_string()))?;
    let latest_submission_status = match raw.latest_submission_status.as_deref() {
        Some(label) => {
            let parsed = SubmissionStatus::parse(label);
            if parsed.is_none() {
                tracing::warn!("Unrecognized submission status from upstream: {}", label);
            }
            parsed
        }
        None => None,
    };
    let latest_submitted_at = raw
        .latest_submitted_at
        .as_deref()
        .and_then(|ts| chrono::DateTime::parse_from_rfc3339(ts).ok())
        .map(|ts| ts.with_timezone(&chrono::Utc));

    Ok(TopicDetail {
        id,
        has_submitted: raw.has_submitted,
        latest_submission_status,
        latest_submitted_at,
    })
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawIdName {
    pub id: LooseId,
    #[serde(default, alias = "display_name")]
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_loose_id_forms() {
        assert_eq!(LooseId::Int(7).as_i64(), Some(7));
        assert_eq!(LooseId::Float(7.0).as_i64(), Some(7));
        assert_eq!(LooseId::Float(7.5).as_i64(), None);
        assert_eq!(LooseId::Text(" 42 ".to_string()).as_i64(), Some(42));
        assert_eq!(LooseId::Text("abc".to_string()).as_i64(), None);
    }

    #[test]
    fn test_normalize_sorts_similar_topics_descending() {
        let raw: RawDuplicateCheckResponse = serde_json::from_value(json!({
            "status": "potential_duplicate",
            "similarityScore": 0.65,
            "threshold": 0.6,
            "similarTopics": [
                { "topicId": "1", "title": "low", "similarity": 0.2 },
                { "topicId": 2, "title": "high", "similarity": 0.9 },
                { "title": "no id", "similarity": 0.5 }
            ]
        }))
        .unwrap();

        let (result, proposal) = normalize_duplicate_check(raw).unwrap();
        assert_eq!(result.status, DuplicateStatus::PotentialDuplicate);
        assert_eq!(result.similar_topics.len(), 2);
        assert_eq!(result.similar_topics[0].topic_id, 2);
        assert_eq!(result.similar_topics[1].topic_id, 1);
        assert!(proposal.is_none());
    }

    #[test]
    fn test_normalize_rejects_unknown_status() {
        let raw: RawDuplicateCheckResponse =
            serde_json::from_value(json!({ "status": "maybe" })).unwrap();
        assert!(matches!(
            normalize_duplicate_check(raw),
            Err(AppError::Upstream(_))
        ));
    }

    #[test]
    fn test_normalize_clamps_scores() {
        let raw: RawDuplicateCheckResponse = serde_json::from_value(json!({
            "status": "no_duplicate",
            "similarityScore": 1.7,
            "threshold": -0.2
        }))
        .unwrap();
        let (result, _) = normalize_duplicate_check(raw).unwrap();
        assert_eq!(result.similarity_score, 1.0);
        assert_eq!(result.threshold, 0.0);
    }

    #[test]
    fn test_normalize_candidates_drops_unusable_ids() {
        let raw: Vec<RawReviewerCandidate> = serde_json::from_value(json!([
            { "id": "12", "displayName": "Alice" },
            { "displayName": "No Id" }
        ]))
        .unwrap();
        let candidates = normalize_candidates(raw);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id, 12);
        assert_eq!(candidates[0].display_name, "Alice");
    }

    #[test]
    fn test_normalize_topic_detail_loose_status() {
        let raw: RawTopicDetail = serde_json::from_value(json!({
            "id": "42",
            "hasSubmitted": true,
            "latestSubmissionStatus": "RevisionRequired",
            "latestSubmittedAt": "2025-10-01T08:00:00Z"
        }))
        .unwrap();
        let detail = normalize_topic_detail(raw).unwrap();
        assert_eq!(detail.id, 42);
        assert!(detail.has_submitted);
        assert_eq!(
            detail.latest_submission_status,
            Some(SubmissionStatus::RevisionRequired)
        );
        assert!(detail.latest_submitted_at.is_some());
    }
}
