use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Employment type offered by a listing. Stored as its display label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobType {
    #[default]
    #[serde(rename = "Full-time")]
    FullTime,
    #[serde(rename = "Part-time")]
    PartTime,
    Contract,
    Freelance,
    Internship,
}

impl JobType {
    pub const ALL: [JobType; 5] = [
        JobType::FullTime,
        JobType::PartTime,
        JobType::Contract,
        JobType::Freelance,
        JobType::Internship,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::FullTime => "Full-time",
            JobType::PartTime => "Part-time",
            JobType::Contract => "Contract",
            JobType::Freelance => "Freelance",
            JobType::Internship => "Internship",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown job type '{s}'"))
    }
}

/// A persisted job listing. `id`, `created_at` and `updated_at` are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub salary: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub tags: Vec<String>,
    pub posted_by: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row shape of the `jobs` table. `type` is kept as text and parsed into [`JobType`].
#[derive(Debug, Clone, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: String,
    #[sqlx(rename = "type")]
    pub job_type: String,
    pub salary: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub tags: Vec<String>,
    pub posted_by: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<JobRow> for JobRecord {
    type Error = String;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        Ok(JobRecord {
            job_type: row.job_type.parse()?,
            id: row.id,
            title: row.title,
            company: row.company,
            location: row.location,
            salary: row.salary,
            description: row.description,
            requirements: row.requirements,
            tags: row.tags,
            posted_by: row.posted_by,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// The editable fields of a listing, as written on insert or full update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobFields {
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub salary: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub tags: Vec<String>,
    pub posted_by: Uuid,
}

/// A change applied to an existing listing.
#[derive(Debug, Clone, PartialEq)]
pub enum JobPatch {
    /// Replace every editable field.
    Fields(JobFields),
    /// Flip only the `is_active` column.
    Active(bool),
}

/// Narrows a listing query. The default filter matches every record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct JobFilter {
    #[serde(default)]
    pub active_only: bool,
    pub search: Option<String>,
}

impl JobFilter {
    /// The search term, trimmed, or `None` when blank.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> JobRecord {
        let now = Utc::now();
        JobRecord {
            id: Uuid::new_v4(),
            title: "Senior Frontend Developer".to_string(),
            company: "TechCorp".to_string(),
            location: "San Francisco, CA".to_string(),
            job_type: JobType::FullTime,
            salary: "$120k - $160k".to_string(),
            description: String::new(),
            requirements: vec!["React".to_string()],
            tags: vec!["Remote".to_string(), "Tech".to_string()],
            posted_by: Uuid::new_v4(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_job_type_uses_display_labels_on_the_wire() {
        let json = serde_json::to_string(&JobType::PartTime).unwrap();
        assert_eq!(json, "\"Part-time\"");
        let parsed: JobType = serde_json::from_str("\"Full-time\"").unwrap();
        assert_eq!(parsed, JobType::FullTime);
    }

    #[test]
    fn test_job_type_from_str_rejects_unknown_label() {
        assert_eq!("Internship".parse::<JobType>(), Ok(JobType::Internship));
        assert!("full time".parse::<JobType>().is_err());
    }

    #[test]
    fn test_record_serializes_type_field_name() {
        let value = serde_json::to_value(record()).unwrap();
        assert_eq!(value["type"], "Full-time");
        assert!(value.get("job_type").is_none());
    }

    #[test]
    fn test_search_term_is_trimmed_and_blank_is_none() {
        let filter = JobFilter {
            active_only: false,
            search: Some("  remote ".to_string()),
        };
        assert_eq!(filter.search_term(), Some("remote"));

        let blank = JobFilter {
            active_only: false,
            search: Some("   ".to_string()),
        };
        assert!(blank.search_term().is_none());
    }
}
