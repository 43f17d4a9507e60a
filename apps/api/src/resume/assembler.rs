//! Résumé assembly: turns structured AI output into a display-ready document.
//!
//! Candidate JSON is deserialized into the typed document before anything is
//! adopted. A rejected candidate never touches the held document.

use std::collections::HashSet;
use std::fmt::Write as _;

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::{EducationItem, ExperienceItem, PersonalInfo, ResumeDocument};

/// Holds the session's current résumé, if one has been generated.
#[derive(Debug, Clone, Default)]
pub struct ResumeAssembler {
    held: Option<ResumeDocument>,
}

impl ResumeAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the held document wholesale.
    pub fn merge(&mut self, document: ResumeDocument) {
        self.held = Some(document);
    }

    /// Validates `candidate` and, only if it is well formed, makes it the held document.
    pub fn adopt(&mut self, candidate: &Value) -> Result<ResumeDocument, AppError> {
        let document = from_generated(candidate)?;
        info!(
            "Adopted generated résumé: {} experience, {} education, {} skills",
            document.experience.len(),
            document.education.len(),
            document.skills.len()
        );
        self.merge(document.clone());
        Ok(document)
    }

    /// The held document, or the baseline template when nothing was generated.
    pub fn current(&self) -> ResumeDocument {
        self.held.clone().unwrap_or_else(default_template)
    }

    pub fn is_generated(&self) -> bool {
        self.held.is_some()
    }
}

/// Schema-validates AI output into a [`ResumeDocument`].
pub fn from_generated(candidate: &Value) -> Result<ResumeDocument, AppError> {
    let mut document = ResumeDocument::deserialize(candidate).map_err(|e| {
        warn!("Rejected generated résumé: {e}");
        AppError::MalformedContent(e.to_string())
    })?;
    document.skills = dedup_preserving_order(document.skills);
    Ok(document)
}

fn dedup_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// Baseline résumé shown whenever no generated document exists.
pub fn default_template() -> ResumeDocument {
    ResumeDocument {
        personal_info: PersonalInfo {
            name: "John Doe".to_string(),
            email: "john@example.com".to_string(),
            phone: "+1 (555) 123-4567".to_string(),
            location: "San Francisco, CA".to_string(),
            summary: "Passionate frontend developer with 5+ years of experience building \
                      responsive web applications..."
                .to_string(),
        },
        experience: vec![
            ExperienceItem {
                title: "Senior Frontend Developer".to_string(),
                company: "TechCorp Inc.".to_string(),
                duration: "2021 - Present".to_string(),
                description: "Led development of responsive web applications using React \
                              and TypeScript..."
                    .to_string(),
            },
            ExperienceItem {
                title: "Frontend Developer".to_string(),
                company: "StartupXYZ".to_string(),
                duration: "2019 - 2021".to_string(),
                description: "Developed and maintained user interfaces for web applications..."
                    .to_string(),
            },
        ],
        education: vec![EducationItem {
            degree: "Bachelor of Computer Science".to_string(),
            school: "University of California".to_string(),
            year: "2015 - 2019".to_string(),
        }],
        skills: ["React", "TypeScript", "JavaScript", "HTML/CSS", "Node.js", "Git", "Figma"]
            .into_iter()
            .map(str::to_string)
            .collect(),
    }
}

/// Plain-text rendering used for résumé downloads.
pub fn render_text(document: &ResumeDocument) -> String {
    let info = &document.personal_info;
    let mut out = String::new();

    let _ = writeln!(out, "{}", info.name);
    let _ = writeln!(out, "{} • {} • {}", info.email, info.phone, info.location);

    if !info.summary.is_empty() {
        let _ = writeln!(out, "\nPROFESSIONAL SUMMARY\n{}", info.summary);
    }

    if !document.experience.is_empty() {
        out.push_str("\nEXPERIENCE\n");
        for exp in &document.experience {
            let _ = writeln!(out, "{} — {} ({})", exp.title, exp.company, exp.duration);
            if !exp.description.is_empty() {
                let _ = writeln!(out, "  {}", exp.description);
            }
        }
    }

    if !document.education.is_empty() {
        out.push_str("\nEDUCATION\n");
        for edu in &document.education {
            let _ = writeln!(out, "{}, {} ({})", edu.degree, edu.school, edu.year);
        }
    }

    if !document.skills.is_empty() {
        let _ = writeln!(out, "\nSKILLS\n{}", document.skills.join(", "));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn candidate() -> Value {
        json!({
            "personalInfo": {
                "name": "Ada Lovelace",
                "email": "ada@example.com",
                "phone": "+44 20 0000 0000",
                "location": "London",
                "summary": "Analyst and writer."
            },
            "experience": [
                {"title": "Analyst", "company": "Engine Co", "duration": "1842 - 1843", "description": "Wrote notes."}
            ],
            "education": [
                {"degree": "Private tutoring", "school": "Home", "year": "1830"}
            ],
            "skills": ["Mathematics", "Writing", "Mathematics"]
        })
    }

    #[test]
    fn test_well_formed_candidate_is_accepted() {
        let doc = from_generated(&candidate()).unwrap();
        assert_eq!(doc.personal_info.name, "Ada Lovelace");
        assert_eq!(doc.experience.len(), 1);
        assert_eq!(doc.education[0].school, "Home");
    }

    #[test]
    fn test_skills_are_deduplicated_in_insertion_order() {
        let doc = from_generated(&candidate()).unwrap();
        assert_eq!(doc.skills, vec!["Mathematics", "Writing"]);
    }

    #[test]
    fn test_missing_email_is_malformed_and_leaves_held_document() {
        let mut assembler = ResumeAssembler::new();
        assembler.adopt(&candidate()).unwrap();
        let before = assembler.current();

        let mut bad = candidate();
        bad["personalInfo"].as_object_mut().unwrap().remove("email");
        let err = assembler.adopt(&bad).unwrap_err();

        match err {
            AppError::MalformedContent(reason) => assert!(reason.contains("email"), "{reason}"),
            other => panic!("expected MalformedContent, got {other:?}"),
        }
        assert_eq!(assembler.current(), before);
    }

    #[test]
    fn test_wrong_types_are_rejected() {
        let mut bad = candidate();
        bad["skills"] = json!(["Rust", 7]);
        assert!(matches!(
            from_generated(&bad),
            Err(AppError::MalformedContent(_))
        ));

        let mut bad = candidate();
        bad["experience"] = json!({"title": "not a list"});
        assert!(from_generated(&bad).is_err());

        let mut bad = candidate();
        bad["education"][0]["year"] = json!(2019);
        assert!(from_generated(&bad).is_err());

        assert!(from_generated(&json!("just text")).is_err());
    }

    #[test]
    fn test_merge_replaces_whole_document() {
        let mut assembler = ResumeAssembler::new();
        assembler.adopt(&candidate()).unwrap();

        let mut replacement = default_template();
        replacement.skills = vec!["Only".to_string()];
        assembler.merge(replacement.clone());

        assert_eq!(assembler.current(), replacement);
    }

    #[test]
    fn test_current_falls_back_to_default_template() {
        let assembler = ResumeAssembler::new();
        assert!(!assembler.is_generated());
        assert_eq!(assembler.current(), default_template());
    }

    #[test]
    fn test_default_template_shape() {
        let doc = default_template();
        assert_eq!(doc.experience.len(), 2);
        assert_eq!(doc.education.len(), 1);
        assert_eq!(doc.skills.len(), 7);
        assert_eq!(doc.experience[0].company, "TechCorp Inc.");
    }

    #[test]
    fn test_render_text_contains_every_section() {
        let text = render_text(&default_template());
        assert!(text.starts_with("John Doe\n"));
        assert!(text.contains("EXPERIENCE"));
        assert!(text.contains("Frontend Developer — StartupXYZ (2019 - 2021)"));
        assert!(text.contains("Bachelor of Computer Science, University of California"));
        assert!(text.contains("React, TypeScript, JavaScript"));
    }
}
