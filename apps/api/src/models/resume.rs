use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Title given to a record created on the user's first editor visit.
pub const DEFAULT_TITLE: &str = "My Resume";

/// Optional generated content layered over the user's own input.
///
/// Flattened into the stored JSON as `aiSummary`, `aiExperienceBullets`, ...
/// Only `resume::merge` decides when these win over the raw fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiOverlay {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_experience_bullets: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_project_bullets: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_skills_clean: Option<Vec<String>>,
}

/// Everything the user types into the editor, plus the AI overlay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeFields {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub headline: String,

    pub linkedin: String,
    pub github: String,
    pub portfolio: String,

    /// One entry per line.
    pub education: String,
    /// One bullet per line.
    pub experience: String,
    /// Blank-line separated blocks: heading line, then `- bullet` lines.
    pub projects: String,
    /// Comma separated.
    pub skills: String,

    #[serde(flatten)]
    pub ai: AiOverlay,
}

/// The single persisted resume per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub fields: ResumeFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row shape of the `resumes` table. `data` holds `ResumeFields` as JSONB.
#[derive(Debug, Clone, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub data: Json<ResumeFields>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ResumeRow> for ResumeRecord {
    fn from(row: ResumeRow) -> Self {
        ResumeRecord {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            fields: row.data.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Partial update issued by a save action. `None` leaves the value as stored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResumeUpdate {
    pub title: Option<String>,
    pub fields: Option<ResumeFields>,
}

impl ResumeRecord {
    /// Applies a save action in place (last write wins, no field-level merge).
    pub fn apply_update(&mut self, update: ResumeUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(fields) = update.fields {
            self.fields = fields;
        }
    }
}
