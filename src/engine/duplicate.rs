//! Duplicate-check decision engine.
//!
//! Classifies a normalized duplicate-check result into a gating decision
//! and merges an AI modification proposal into the user's draft.

use std::collections::HashMap;

use serde::Serialize;

use crate::errors::AppError;
use crate::models::{DuplicateStatus, ModificationProposal, TopicDraftSnapshot};

/// UI tone category for a duplicate-check outcome.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Success,
    Warning,
    Danger,
}

/// Gating decision for topic creation or save.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateDecision {
    pub tone: Tone,
    pub can_create_directly: bool,
    pub requires_confirmation: bool,
    pub blocks_creation: bool,
}

/// Classify a duplicate-check status into a gating decision.
///
/// Total over the status enum: every value maps to exactly one outcome.
pub fn classify(status: DuplicateStatus) -> DuplicateDecision {
    match status {
        DuplicateStatus::NoDuplicate => DuplicateDecision {
            tone: Tone::Success,
            can_create_directly: true,
            requires_confirmation: false,
            blocks_creation: false,
        },
        DuplicateStatus::PotentialDuplicate => DuplicateDecision {
            tone: Tone::Warning,
            can_create_directly: false,
            requires_confirmation: true,
            blocks_creation: false,
        },
        DuplicateStatus::DuplicateFound => DuplicateDecision {
            tone: Tone::Danger,
            can_create_directly: false,
            requires_confirmation: false,
            blocks_creation: true,
        },
    }
}

/// Display-name lookup tables for category and semester ids.
#[derive(Debug, Clone, Default)]
pub struct NameLookup {
    pub categories: HashMap<i64, String>,
    pub semesters: HashMap<i64, String>,
}

/// Merge an AI modification proposal into the original draft.
///
/// Present and non-empty proposal fields override; absent fields retain the
/// original values unchanged. Overridden category/semester ids get their
/// display names re-resolved from `names`; an unknown id keeps the original
/// name rather than blanking it. Topic id, file reference and max-students
/// defaults are carried forward unless explicitly overridden.
///
/// Returns a precondition error when the original draft has no topic id.
pub fn merge_suggestion(
    original: &TopicDraftSnapshot,
    proposal: &ModificationProposal,
    names: &NameLookup,
) -> Result<TopicDraftSnapshot, AppError> {
    if original.topic_id.is_none() {
        return Err(AppError::Precondition(
            "Draft has no topic id; cannot apply the suggested revision".to_string(),
        ));
    }

    let fields = &proposal.modified_topic;

    let category_id = fields.category_id.or(original.category_id);
    let category_name = match fields.category_id {
        Some(id) => names
            .categories
            .get(&id)
            .cloned()
            .or_else(|| original.category_name.clone()),
        None => original.category_name.clone(),
    };

    let semester_id = fields.semester_id.or(original.semester_id);
    let semester_name = match fields.semester_id {
        Some(id) => names
            .semesters
            .get(&id)
            .cloned()
            .or_else(|| original.semester_name.clone()),
        None => original.semester_name.clone(),
    };

    Ok(TopicDraftSnapshot {
        topic_id: original.topic_id,
        title: override_required(&original.title, &fields.title),
        english_title: override_text(&original.english_title, &fields.english_title),
        abbreviation: override_text(&original.abbreviation, &fields.abbreviation),
        problem: override_text(&original.problem, &fields.problem),
        context: override_text(&original.context, &fields.context),
        content: override_text(&original.content, &fields.content),
        description: override_text(&original.description, &fields.description),
        objectives: override_text(&original.objectives, &fields.objectives),
        category_id,
        category_name,
        semester_id,
        semester_name,
        supervisor_id: fields.supervisor_id.or(original.supervisor_id),
        max_students: fields.max_students.unwrap_or(original.max_students),
        file_id: original.file_id.clone(),
    })
}

/// A present, non-empty proposal value wins; anything else keeps the current
/// value (never cleared).
fn override_text(current: &Option<String>, proposed: &Option<String>) -> Option<String> {
    match proposed {
        Some(value) if !value.trim().is_empty() => Some(value.clone()),
        _ => current.clone(),
    }
}

fn override_required(current: &str, proposed: &Option<String>) -> String {
    match proposed {
        Some(value) if !value.trim().is_empty() => value.clone(),
        _ => current.to_string(),
    }
}
