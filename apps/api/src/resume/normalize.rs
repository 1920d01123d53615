//! Text normalizer: turns loosely formatted editor text into clean lists.
//!
//! Every function here is total: any input, including empty or whitespace-only
//! strings, produces a (possibly empty) result.

use serde::{Deserialize, Serialize};

/// Maximum number of skills kept from a comma-separated list.
pub const MAX_SKILLS: usize = 8;

/// A project paragraph: the first line is the heading, the rest are bullets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectBlock {
    pub heading: String,
    pub bullets: Vec<String>,
}

/// Splits a comma-separated skill list, keeping at most `MAX_SKILLS` non-empty entries.
pub fn split_skills(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(MAX_SKILLS)
        .map(str::to_string)
        .collect()
}

/// Splits on line breaks, trimming each line and dropping blank ones.
pub fn split_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Splits blank-line separated paragraphs into heading + bullet blocks.
///
/// Leading `-` markers on bullet lines are stripped. A heading with no bullet
/// lines yields an empty `bullets` list.
pub fn split_project_blocks(raw: &str) -> Vec<ProjectBlock> {
    let mut blocks = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            push_block(&mut blocks, &mut paragraph);
        } else {
            paragraph.push(line);
        }
    }
    push_block(&mut blocks, &mut paragraph);

    blocks
}

fn push_block(blocks: &mut Vec<ProjectBlock>, paragraph: &mut Vec<&str>) {
    let mut lines = paragraph.drain(..);
    let Some(heading) = lines.next() else {
        return;
    };

    let bullets = lines
        .map(strip_bullet_marker)
        .filter(|b| !b.is_empty())
        .map(str::to_string)
        .collect();

    blocks.push(ProjectBlock {
        heading: heading.to_string(),
        bullets,
    });
}

fn strip_bullet_marker(line: &str) -> &str {
    line.trim_start_matches('-').trim()
}
