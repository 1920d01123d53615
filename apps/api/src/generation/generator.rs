//! Content generation: prompt building, offline/live completion, and response repair.
//!
//! The mode is chosen once from configuration and injected at construction.
//! A live request is a single model call; its text is parsed as JSON, with one
//! recovery pass that keeps only the outermost `{...}`. Anything that still does
//! not yield a non-blank `summary` is rejected whole, with the raw text kept for
//! diagnostics.

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::generation::prompts::{
    GENERATION_PROMPT_TEMPLATE, OFFLINE_DEFAULT_FOUNDATION, OFFLINE_DEFAULT_ROLE,
    OFFLINE_EXPERIENCE_BULLETS, OFFLINE_PROJECT_BULLETS,
};
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{CompletionBackend, LlmError};
use crate::models::resume::{AiOverlay, ResumeFields};
use crate::resume::merge::skills_or_sample;
use crate::resume::normalize::split_skills;

/// How many skills the offline summary names.
const SUMMARY_SKILL_COUNT: usize = 3;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    /// Deterministic, network-free stand-in for the model.
    Offline,
    Live,
}

/// The raw fields the generator reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationInput {
    pub full_name: String,
    pub headline: String,
    pub education: String,
    pub skills: String,
    pub experience: String,
    pub projects: String,
}

impl From<&ResumeFields> for GenerationInput {
    fn from(fields: &ResumeFields) -> Self {
        GenerationInput {
            full_name: fields.full_name.clone(),
            headline: fields.headline.clone(),
            education: fields.education.clone(),
            skills: fields.skills.clone(),
            experience: fields.experience.clone(),
            projects: fields.projects.clone(),
        }
    }
}

/// Validated generation output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedContent {
    pub summary: String,
    #[serde(default)]
    pub experience_bullets: Vec<String>,
    #[serde(default)]
    pub project_bullets: Vec<String>,
    #[serde(default)]
    pub skills_clean: Vec<String>,
}

impl GeneratedContent {
    /// Replaces the whole overlay; raw fields are never touched.
    pub fn into_overlay(self) -> AiOverlay {
        AiOverlay {
            ai_summary: Some(self.summary),
            ai_experience_bullets: Some(self.experience_bullets),
            ai_project_bullets: Some(self.project_bullets),
            ai_skills_clean: Some(self.skills_clean),
        }
    }
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("{0}")]
    Validation(String),

    #[error("Missing ANTHROPIC_API_KEY")]
    MissingCredential,

    #[error("{0}")]
    Upstream(#[from] LlmError),

    #[error("AI response invalid: {reason}")]
    Malformed { reason: String, raw: String },
}

/// Flat `{"error": ...}` body used by the generation endpoint.
impl IntoResponse for GenerationError {
    fn into_response(self) -> Response {
        match &self {
            GenerationError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
            }
            GenerationError::Malformed { reason, raw } => {
                warn!("Generation response rejected: {reason}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "AI response invalid", "raw": raw })),
                )
                    .into_response()
            }
            GenerationError::MissingCredential | GenerationError::Upstream(_) => {
                tracing::error!("Generation failed: {self}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": self.to_string() })),
                )
                    .into_response()
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Generator
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct ContentGenerator {
    mode: GenerationMode,
    backend: Option<Arc<dyn CompletionBackend>>,
}

impl ContentGenerator {
    /// `backend` is `None` when no credential is configured; live requests then fail.
    pub fn new(mode: GenerationMode, backend: Option<Arc<dyn CompletionBackend>>) -> Self {
        Self { mode, backend }
    }

    pub fn mode(&self) -> GenerationMode {
        self.mode
    }

    pub async fn request_completion(
        &self,
        input: &GenerationInput,
    ) -> Result<GeneratedContent, GenerationError> {
        if input.full_name.trim().is_empty() {
            return Err(GenerationError::Validation(
                "fullName is required".to_string(),
            ));
        }

        match self.mode {
            GenerationMode::Offline => Ok(offline_completion(input)),
            GenerationMode::Live => {
                let backend = self
                    .backend
                    .as_ref()
                    .ok_or(GenerationError::MissingCredential)?;

                let prompt = build_prompt(input);
                info!("Requesting live generation ({} prompt chars)", prompt.len());
                let text = backend.complete(&prompt, JSON_ONLY_SYSTEM).await?;
                parse_completion(&text)
            }
        }
    }
}

/// Fills the generation template. Substitution is single-pass, so braces
/// inside user text are copied through untouched.
pub fn build_prompt(input: &GenerationInput) -> String {
    fill_template(
        GENERATION_PROMPT_TEMPLATE,
        &[
            ("full_name", &input.full_name),
            ("headline", &input.headline),
            ("education", &input.education),
            ("skills", &input.skills),
            ("experience", &input.experience),
            ("projects", &input.projects),
        ],
    )
}

fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        let hit = values.iter().find_map(|(key, value)| {
            let placeholder_len = key.len() + 2;
            (tail.len() >= placeholder_len
                && tail[1..].starts_with(key)
                && tail[1 + key.len()..].starts_with('}'))
            .then_some((placeholder_len, *value))
        });
        match hit {
            Some((len, value)) => {
                out.push_str(value);
                rest = &tail[len..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Deterministic output computed from the input alone.
pub fn offline_completion(input: &GenerationInput) -> GeneratedContent {
    let role = match input.headline.trim() {
        "" => OFFLINE_DEFAULT_ROLE,
        headline => headline,
    };

    let skills = split_skills(&input.skills);
    let foundation = if skills.is_empty() {
        OFFLINE_DEFAULT_FOUNDATION.to_string()
    } else {
        skills
            .iter()
            .take(SUMMARY_SKILL_COUNT)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    };

    GeneratedContent {
        summary: format!(
            "Motivated {role} with a strong foundation in {foundation}. \
             Looking for opportunities to contribute to real projects and grow fast in a team environment."
        ),
        experience_bullets: OFFLINE_EXPERIENCE_BULLETS
            .iter()
            .map(|s| s.to_string())
            .collect(),
        project_bullets: OFFLINE_PROJECT_BULLETS
            .iter()
            .map(|s| s.to_string())
            .collect(),
        skills_clean: skills_or_sample(&input.skills),
    }
}

/// Parses model output, recovering an object embedded in surrounding prose.
pub fn parse_completion(text: &str) -> Result<GeneratedContent, GenerationError> {
    let malformed = |reason: &str| GenerationError::Malformed {
        reason: reason.to_string(),
        raw: text.to_string(),
    };

    let value = match serde_json::from_str::<Value>(text) {
        Ok(value) => value,
        Err(_) => {
            let embedded = extract_braced(text).ok_or_else(|| malformed("no JSON object found"))?;
            serde_json::from_str::<Value>(embedded)
                .map_err(|e| malformed(&format!("embedded object did not parse: {e}")))?
        }
    };

    let has_summary = value
        .get("summary")
        .and_then(Value::as_str)
        .is_some_and(|s| !s.trim().is_empty());
    if !has_summary {
        return Err(malformed("missing summary"));
    }

    serde_json::from_value(value).map_err(|e| malformed(&format!("unexpected shape: {e}")))
}

/// The substring from the first `{` to the last `}`, inclusive.
fn extract_braced(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
