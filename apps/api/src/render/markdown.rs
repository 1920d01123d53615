use crate::render::{DocumentRenderer, RenderError};
use crate::resume::assemble::{DocumentModel, SectionBody};

/// Plain Markdown export of the assembled document.
pub struct MarkdownRenderer;

impl DocumentRenderer for MarkdownRenderer {
    fn content_type(&self) -> &'static str {
        "text/markdown; charset=utf-8"
    }

    fn extension(&self) -> &'static str {
        "md"
    }

    fn render(&self, doc: &DocumentModel) -> Result<Vec<u8>, RenderError> {
        Ok(render_markdown(doc).into_bytes())
    }
}

pub fn render_markdown(doc: &DocumentModel) -> String {
    let mut md = String::new();

    for section in &doc.sections {
        match &section.body {
            SectionBody::Header(header) => {
                md.push_str(&format!("# {}\n\n", header.name));
                md.push_str(&format!("{}\n", header.headline));
                if let Some(contact) = &header.contact {
                    md.push_str(&format!("\n{contact}\n"));
                }
                if !header.links.is_empty() {
                    let links = header
                        .links
                        .iter()
                        .map(|l| format!("[{}]({})", l.label, l.url))
                        .collect::<Vec<_>>()
                        .join(" | ");
                    md.push_str(&format!("\n{links}\n"));
                }
                md.push('\n');
                continue;
            }
            SectionBody::Paragraph(text) => {
                md.push_str(&format!("## {}\n\n{}\n", section.kind.title(), text));
            }
            SectionBody::Bullets(items) => {
                md.push_str(&format!("## {}\n\n", section.kind.title()));
                for item in items {
                    md.push_str(&format!("- {item}\n"));
                }
            }
            SectionBody::Composite(blocks) => {
                md.push_str(&format!("## {}\n\n", section.kind.title()));
                for block in blocks {
                    md.push_str(&format!("### {}\n", block.heading));
                    for bullet in &block.bullets {
                        md.push_str(&format!("- {bullet}\n"));
                    }
                    md.push('\n');
                }
                continue;
            }
        }
        md.push('\n');
    }

    md
}
