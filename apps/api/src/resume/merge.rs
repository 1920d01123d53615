//! Content merger: the one place that knows the AI-over-raw precedence rule.
//!
//! For every display section: non-empty generated content wins, otherwise the
//! normalized user input, otherwise a fixed placeholder string. Sample data is
//! never produced here except through `skills_or_sample`, which only the
//! offline generator calls.

use serde::Serialize;

use crate::models::resume::ResumeFields;
use crate::resume::normalize::{split_lines, split_project_blocks, split_skills, ProjectBlock};

pub const NAME_PLACEHOLDER: &str = "Your Name";
pub const HEADLINE_PLACEHOLDER: &str = "Headline";
pub const SUMMARY_PLACEHOLDER: &str = "Add your summary using AI generator.";
pub const SKILLS_PLACEHOLDER: &str = "Add skills";
pub const EXPERIENCE_PLACEHOLDER: &str = "Add experience or generate with AI.";
pub const PROJECTS_PLACEHOLDER: &str = "Add projects or generate with AI.";
pub const EDUCATION_PLACEHOLDER: &str = "Add education";

/// Example skills shown only by offline generation when the user listed none.
pub const SAMPLE_SKILLS: [&str; 5] = ["React", "Next.js", "Tailwind", "Supabase", "Git"];

/// Where a section's value came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", content = "value", rename_all = "snake_case")]
pub enum Resolved<T> {
    Generated(T),
    UserInput(T),
    Placeholder(&'static str),
}

/// Project content is either generated flat bullets or the user's own blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectContent {
    Bullets(Vec<String>),
    Blocks(Vec<ProjectBlock>),
}

/// One resolved value per display section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergedResume {
    pub summary: Resolved<String>,
    pub skills: Resolved<Vec<String>>,
    pub experience: Resolved<Vec<String>>,
    pub projects: Resolved<ProjectContent>,
    pub education: Resolved<Vec<String>>,
}

pub fn merge(fields: &ResumeFields) -> MergedResume {
    MergedResume {
        summary: resolve_summary(fields),
        skills: resolve_skills(fields),
        experience: resolve_experience(fields),
        projects: resolve_projects(fields),
        education: resolve_education(fields),
    }
}

pub fn resolve_summary(fields: &ResumeFields) -> Resolved<String> {
    match non_blank(fields.ai.ai_summary.as_deref()) {
        Some(summary) => Resolved::Generated(summary.to_string()),
        None => Resolved::Placeholder(SUMMARY_PLACEHOLDER),
    }
}

pub fn resolve_skills(fields: &ResumeFields) -> Resolved<Vec<String>> {
    overlay_or_raw(
        fields.ai.ai_skills_clean.as_ref(),
        split_skills(&fields.skills),
        SKILLS_PLACEHOLDER,
    )
}

pub fn resolve_experience(fields: &ResumeFields) -> Resolved<Vec<String>> {
    overlay_or_raw(
        fields.ai.ai_experience_bullets.as_ref(),
        split_lines(&fields.experience),
        EXPERIENCE_PLACEHOLDER,
    )
}

pub fn resolve_projects(fields: &ResumeFields) -> Resolved<ProjectContent> {
    if let Some(bullets) = non_empty_list(fields.ai.ai_project_bullets.as_ref()) {
        return Resolved::Generated(ProjectContent::Bullets(bullets));
    }
    let blocks = split_project_blocks(&fields.projects);
    if blocks.is_empty() {
        Resolved::Placeholder(PROJECTS_PLACEHOLDER)
    } else {
        Resolved::UserInput(ProjectContent::Blocks(blocks))
    }
}

pub fn resolve_education(fields: &ResumeFields) -> Resolved<Vec<String>> {
    overlay_or_raw(None, split_lines(&fields.education), EDUCATION_PLACEHOLDER)
}

/// Skill list that is never empty: the user's skills, or `SAMPLE_SKILLS`.
pub fn skills_or_sample(raw: &str) -> Vec<String> {
    let skills = split_skills(raw);
    if skills.is_empty() {
        SAMPLE_SKILLS.iter().map(|s| s.to_string()).collect()
    } else {
        skills
    }
}

fn overlay_or_raw(
    overlay: Option<&Vec<String>>,
    raw: Vec<String>,
    placeholder: &'static str,
) -> Resolved<Vec<String>> {
    if let Some(items) = non_empty_list(overlay) {
        Resolved::Generated(items)
    } else if !raw.is_empty() {
        Resolved::UserInput(raw)
    } else {
        Resolved::Placeholder(placeholder)
    }
}

/// Blank overlay entries are dropped; an overlay with nothing left counts as absent.
fn non_empty_list(items: Option<&Vec<String>>) -> Option<Vec<String>> {
    let items: Vec<String> = items?
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    (!items.is_empty()).then_some(items)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
