//! Topic draft snapshot carried across the check/suggest/confirm workflow.

use serde::{Deserialize, Serialize};

fn default_max_students() -> i32 {
    1
}

/// All editable topic fields, as captured when a supervisor opens a
/// create/edit form.
///
/// Held only in the in-memory session store between the edit,
/// duplicate-check, suggestion-review and confirm steps; destroyed on
/// successful save or on session discard. Lost on process restart by
/// contract.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TopicDraftSnapshot {
    /// Originating topic id; required for the use-suggestion and
    /// confirm-create transitions
    #[serde(default)]
    pub topic_id: Option<i64>,
    pub title: String,
    #[serde(default)]
    pub english_title: Option<String>,
    #[serde(default)]
    pub abbreviation: Option<String>,
    #[serde(default)]
    pub problem: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub objectives: Option<String>,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub semester_id: Option<i64>,
    #[serde(default)]
    pub semester_name: Option<String>,
    #[serde(default)]
    pub supervisor_id: Option<i64>,
    #[serde(default = "default_max_students")]
    pub max_students: i32,
    /// Attached file reference, carried through unchanged
    #[serde(default)]
    pub file_id: Option<String>,
}
