//! AI content assistant: gates and invokes the generation engine.
//!
//! Flow: precondition check → fixed prompt → exactly one engine call →
//! classify failure as transient (overloaded) or permanent.
//!
//! The assistant does not deduplicate concurrent calls. Single-flight per
//! form is the caller's job.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::errors::AppError;
use crate::generation::prompts::{self, DESCRIPTION_PROMPT_TEMPLATE, RESUME_PROMPT_TEMPLATE};
use crate::jobs::form::FormDraft;
use crate::llm_client::{strip_json_fences, GenerationEngine, LlmError};
use crate::models::{JobType, ResumeDocument};
use crate::notify::NotificationCenter;
use crate::resume::assembler::from_generated;

pub const MSG_MISSING_FIELDS: &str =
    "Please fill in job title, company, location, and salary range first";
pub const MSG_OVERLOADED: &str =
    "The AI model is currently overloaded. Please try again in a few moments.";
pub const MSG_DESCRIPTION_FAILED: &str = "Failed to generate job description. Please try again.";
pub const MSG_DESCRIPTION_GENERATED: &str = "Job description generated successfully!";
pub const MSG_MISSING_BRIEF: &str = "Please describe your background before generating a résumé";
pub const MSG_RESUME_FAILED: &str = "Failed to generate résumé. Please try again.";
pub const MSG_RESUME_MALFORMED: &str =
    "The AI returned a résumé in an unexpected format. Please try again.";
pub const MSG_RESUME_GENERATED: &str = "Résumé generated successfully!";

/// The draft fields a description is generated from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptionInput {
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: String,
    #[serde(rename = "type", default)]
    pub job_type: JobType,
}

impl From<&FormDraft> for DescriptionInput {
    fn from(draft: &FormDraft) -> Self {
        DescriptionInput {
            title: draft.title.clone(),
            company: draft.company.clone(),
            location: draft.location.clone(),
            salary: draft.salary.clone(),
            job_type: draft.job_type,
        }
    }
}

impl DescriptionInput {
    fn is_complete(&self) -> bool {
        [&self.title, &self.company, &self.location, &self.salary]
            .iter()
            .all(|field| !field.trim().is_empty())
    }

    fn prompt(&self) -> String {
        prompts::fill(
            DESCRIPTION_PROMPT_TEMPLATE,
            &[
                ("title", self.title.as_str()),
                ("company", self.company.as_str()),
                ("location", self.location.as_str()),
                ("salary", self.salary.as_str()),
                ("job_type", self.job_type.as_str()),
            ],
        )
    }
}

#[derive(Clone)]
pub struct AiContentAssistant {
    engine: Arc<dyn GenerationEngine>,
}

impl AiContentAssistant {
    pub fn new(engine: Arc<dyn GenerationEngine>) -> Self {
        Self { engine }
    }

    /// Generates a listing description. Never contacts the engine when a
    /// required field is blank.
    pub async fn generate_description(&self, input: &DescriptionInput) -> Result<String, AppError> {
        if !input.is_complete() {
            return Err(AppError::Validation(MSG_MISSING_FIELDS.to_string()));
        }

        info!("Generating description for '{}' at {}", input.title, input.company);
        let text = self
            .engine
            .generate(&input.prompt())
            .await
            .map_err(|e| classify(e, MSG_DESCRIPTION_FAILED))?;

        Ok(text.trim().to_string())
    }

    /// Generates into `draft.description`, overwriting whatever was there.
    /// Every other draft field is left untouched. Posts the outcome.
    pub async fn fill_draft(
        &self,
        draft: &mut FormDraft,
        notifications: &NotificationCenter,
    ) -> Result<(), AppError> {
        match self.generate_description(&DescriptionInput::from(&*draft)).await {
            Ok(description) => {
                draft.description = description;
                notifications.success(MSG_DESCRIPTION_GENERATED);
                Ok(())
            }
            Err(e) => {
                notifications.error(user_message(&e));
                Err(e)
            }
        }
    }

    /// AI résumé builder: one engine call, then schema validation of the JSON reply.
    pub async fn generate_resume(
        &self,
        brief: &str,
        notifications: &NotificationCenter,
    ) -> Result<ResumeDocument, AppError> {
        let result = self.build_resume(brief).await;
        match &result {
            Ok(_) => notifications.success(MSG_RESUME_GENERATED),
            Err(e) => notifications.error(user_message(e)),
        }
        result
    }

    async fn build_resume(&self, brief: &str) -> Result<ResumeDocument, AppError> {
        if brief.trim().is_empty() {
            return Err(AppError::Validation(MSG_MISSING_BRIEF.to_string()));
        }

        let prompt = prompts::fill(RESUME_PROMPT_TEMPLATE, &[("brief", brief.trim())]);

        let text = self
            .engine
            .generate(&prompt)
            .await
            .map_err(|e| classify(e, MSG_RESUME_FAILED))?;

        let candidate: serde_json::Value =
            serde_json::from_str(strip_json_fences(&text)).map_err(|e| {
                error!("Résumé reply was not JSON: {e}");
                AppError::MalformedContent(format!("reply is not valid JSON: {e}"))
            })?;

        from_generated(&candidate)
    }
}

/// Maps an engine failure to the transient or permanent generation error.
fn classify(err: LlmError, permanent_message: &str) -> AppError {
    error!("Generation failed: {err}");
    if err.is_overloaded() {
        AppError::TransientGeneration(MSG_OVERLOADED.to_string())
    } else {
        AppError::Generation(permanent_message.to_string())
    }
}

fn user_message(err: &AppError) -> String {
    match err {
        AppError::Validation(msg)
        | AppError::TransientGeneration(msg)
        | AppError::Generation(msg) => msg.clone(),
        AppError::MalformedContent(_) => MSG_RESUME_MALFORMED.to_string(),
        other => other.to_string(),
    }
}
