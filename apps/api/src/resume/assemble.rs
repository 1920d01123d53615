//! Document assembler: turns a record into an ordered, renderer-agnostic section list.
//!
//! Section order is fixed: Header, Summary, Skills, Experience, Projects, Education.
//! The downloadable document truncates education to `DOCUMENT_EDUCATION_LIMIT`
//! lines and flat bullet lists to `DOCUMENT_BULLET_LIMIT`; the on-screen preview
//! shows everything.

use serde::{Deserialize, Serialize};

use crate::models::resume::{ResumeFields, ResumeRecord};
use crate::resume::merge::{
    merge, ProjectContent, Resolved, HEADLINE_PLACEHOLDER, NAME_PLACEHOLDER,
};
use crate::resume::normalize::ProjectBlock;

pub const DOCUMENT_EDUCATION_LIMIT: usize = 6;
pub const DOCUMENT_BULLET_LIMIT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderTarget {
    /// The downloadable file.
    #[default]
    Document,
    /// The in-app text preview.
    Preview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Header,
    Summary,
    Skills,
    Experience,
    Projects,
    Education,
}

impl SectionKind {
    pub fn title(self) -> &'static str {
        match self {
            SectionKind::Header => "Header",
            SectionKind::Summary => "Summary",
            SectionKind::Skills => "Skills",
            SectionKind::Experience => "Experience",
            SectionKind::Projects => "Projects",
            SectionKind::Education => "Education",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub headline: String,
    /// `email | phone`, whichever are present.
    pub contact: Option<String>,
    /// Omitted from rendering when empty.
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum SectionBody {
    Header(Header),
    Paragraph(String),
    Bullets(Vec<String>),
    /// Heading + nested bullets per entry.
    Composite(Vec<ProjectBlock>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub kind: SectionKind,
    pub body: SectionBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentModel {
    pub target: RenderTarget,
    pub title: String,
    pub sections: Vec<Section>,
}

/// Assembles the section list for `record`. Pure: equal inputs give equal output.
pub fn assemble(record: &ResumeRecord, target: RenderTarget) -> DocumentModel {
    DocumentModel {
        target,
        title: record.title.clone(),
        sections: assemble_fields(&record.fields, target),
    }
}

pub fn assemble_fields(fields: &ResumeFields, target: RenderTarget) -> Vec<Section> {
    let merged = merge(fields);
    let bullet_limit = match target {
        RenderTarget::Document => Some(DOCUMENT_BULLET_LIMIT),
        RenderTarget::Preview => None,
    };
    let education_limit = match target {
        RenderTarget::Document => Some(DOCUMENT_EDUCATION_LIMIT),
        RenderTarget::Preview => None,
    };

    vec![
        Section {
            kind: SectionKind::Header,
            body: SectionBody::Header(build_header(fields)),
        },
        Section {
            kind: SectionKind::Summary,
            body: SectionBody::Paragraph(match merged.summary {
                Resolved::Generated(text) | Resolved::UserInput(text) => text,
                Resolved::Placeholder(text) => text.to_string(),
            }),
        },
        Section {
            kind: SectionKind::Skills,
            body: SectionBody::Paragraph(match merged.skills {
                Resolved::Generated(skills) | Resolved::UserInput(skills) => skills.join(", "),
                Resolved::Placeholder(text) => text.to_string(),
            }),
        },
        Section {
            kind: SectionKind::Experience,
            body: bullets_or_placeholder(merged.experience, bullet_limit),
        },
        Section {
            kind: SectionKind::Projects,
            body: match merged.projects {
                Resolved::Generated(content) | Resolved::UserInput(content) => match content {
                    ProjectContent::Bullets(bullets) => {
                        SectionBody::Bullets(truncate(bullets, bullet_limit))
                    }
                    ProjectContent::Blocks(blocks) => SectionBody::Composite(blocks),
                },
                Resolved::Placeholder(text) => SectionBody::Paragraph(text.to_string()),
            },
        },
        Section {
            kind: SectionKind::Education,
            body: bullets_or_placeholder(merged.education, education_limit),
        },
    ]
}

fn build_header(fields: &ResumeFields) -> Header {
    let contact = [fields.email.trim(), fields.phone.trim()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" | ");

    let links = [
        ("LinkedIn", &fields.linkedin),
        ("GitHub", &fields.github),
        ("Portfolio", &fields.portfolio),
    ]
    .into_iter()
    .filter(|(_, url)| !url.trim().is_empty())
    .map(|(label, url)| Link {
        label: label.to_string(),
        url: url.trim().to_string(),
    })
    .collect();

    Header {
        name: or_placeholder(&fields.full_name, NAME_PLACEHOLDER),
        headline: or_placeholder(&fields.headline, HEADLINE_PLACEHOLDER),
        contact: (!contact.is_empty()).then_some(contact),
        links,
    }
}

fn bullets_or_placeholder(resolved: Resolved<Vec<String>>, limit: Option<usize>) -> SectionBody {
    match resolved {
        Resolved::Generated(items) | Resolved::UserInput(items) => {
            SectionBody::Bullets(truncate(items, limit))
        }
        Resolved::Placeholder(text) => SectionBody::Paragraph(text.to_string()),
    }
}

fn truncate(mut items: Vec<String>, limit: Option<usize>) -> Vec<String> {
    if let Some(limit) = limit {
        items.truncate(limit);
    }
    items
}

fn or_placeholder(value: &str, placeholder: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    }
}
