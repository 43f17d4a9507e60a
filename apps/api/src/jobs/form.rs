//! Conversion between the human-editable job form and normalized job fields.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{JobFields, JobRecord, JobType};

/// Editable form state. Requirements and tags are a single comma-separated string.
/// `editing` is the id of the record being edited; `None` means a new listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(rename = "type", default)]
    pub job_type: JobType,
    #[serde(default)]
    pub salary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requirements: String,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub editing: Option<Uuid>,
}

/// Splits on commas, trims every token and drops the empty ones.
pub fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Normalizes a draft into insertable fields. Never fails.
pub fn to_record(draft: &FormDraft, acting_user_id: Uuid) -> JobFields {
    JobFields {
        title: draft.title.clone(),
        company: draft.company.clone(),
        location: draft.location.clone(),
        job_type: draft.job_type,
        salary: draft.salary.clone(),
        description: draft.description.clone(),
        requirements: split_list(&draft.requirements),
        tags: split_list(&draft.tags),
        posted_by: acting_user_id,
    }
}

/// Builds an edit-mode draft from a stored record.
pub fn from_record(record: &JobRecord) -> FormDraft {
    FormDraft {
        title: record.title.clone(),
        company: record.company.clone(),
        location: record.location.clone(),
        job_type: record.job_type,
        salary: record.salary.clone(),
        description: record.description.clone(),
        requirements: record.requirements.join(", "),
        tags: record.tags.join(", "),
        editing: Some(record.id),
    }
}
