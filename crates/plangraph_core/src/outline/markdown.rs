//! Markdown to outline entries.
//!
//! Line-oriented: each non-blank line becomes one entry. Headings map to
//! `header-<n>` blocks, bullets and numbered items to list items with a
//! depth taken from their indentation, anything else to `unstyled`.
//!
//! Keys are `line-<n>` (1-based source line), so re-importing an unchanged
//! file yields the same task ids and persisted status keeps matching.

use crate::model::outline::{
    OutlineEntry, BLOCK_ORDERED_LIST_ITEM, BLOCK_UNORDERED_LIST_ITEM, BLOCK_UNSTYLED,
};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

static HEADING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^ {0,3}(#{1,6})[ \t]+(.*?)(?:[ \t]+#+)?[ \t]*$").expect("valid heading regex")
});
static BULLET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([ \t]*)[-*+][ \t]+(.*)$").expect("valid bullet regex"));
static ORDERED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([ \t]*)\d{1,9}[.)][ \t]+(.*)$").expect("valid ordered regex"));

const HEADER_BLOCKS: [&str; 6] = [
    "header-one",
    "header-two",
    "header-three",
    "header-four",
    "header-five",
    "header-six",
];

#[derive(Debug)]
pub enum OutlineImportError {
    InvalidIndentWidth(usize),
    Io { path: PathBuf, source: std::io::Error },
}

impl Display for OutlineImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidIndentWidth(width) => {
                write!(f, "indent width must be at least 1, got {width}")
            }
            Self::Io { path, source } => {
                write!(f, "failed to read outline `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for OutlineImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::InvalidIndentWidth(_) => None,
        }
    }
}

/// Markdown import settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkdownImportOptions {
    /// Spaces per nesting level. A tab always counts as one level.
    pub indent_width: usize,
}

impl Default for MarkdownImportOptions {
    fn default() -> Self {
        Self { indent_width: 2 }
    }
}

/// Parses with default options.
pub fn parse_markdown(text: &str) -> Vec<OutlineEntry> {
    parse_lines(text, MarkdownImportOptions::default().indent_width)
}

/// Parses with explicit options.
///
/// # Errors
/// [`OutlineImportError::InvalidIndentWidth`] for a zero indent width.
pub fn parse_markdown_with(
    text: &str,
    options: &MarkdownImportOptions,
) -> Result<Vec<OutlineEntry>, OutlineImportError> {
    if options.indent_width == 0 {
        return Err(OutlineImportError::InvalidIndentWidth(0));
    }
    Ok(parse_lines(text, options.indent_width))
}

/// Reads and parses a markdown file.
pub fn read_markdown_file(
    path: impl AsRef<Path>,
    options: &MarkdownImportOptions,
) -> Result<Vec<OutlineEntry>, OutlineImportError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| OutlineImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_markdown_with(&text, options)
}

fn parse_lines(text: &str, indent_width: usize) -> Vec<OutlineEntry> {
    let entries: Vec<OutlineEntry> = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| parse_line(format!("line-{}", idx + 1), line, indent_width))
        .collect();
    debug!(
        "event=outline_import module=outline status=ok entries={}",
        entries.len()
    );
    entries
}

fn parse_line(key: String, line: &str, indent_width: usize) -> OutlineEntry {
    if let Some(caps) = HEADING_RE.captures(line) {
        let level = caps[1].len();
        return OutlineEntry::new(key, HEADER_BLOCKS[level - 1], caps[2].trim(), 0);
    }
    if let Some(caps) = BULLET_RE.captures(line) {
        let depth = indent_depth(&caps[1], indent_width);
        return OutlineEntry::new(key, BLOCK_UNORDERED_LIST_ITEM, caps[2].trim(), depth);
    }
    if let Some(caps) = ORDERED_RE.captures(line) {
        let depth = indent_depth(&caps[1], indent_width);
        return OutlineEntry::new(key, BLOCK_ORDERED_LIST_ITEM, caps[2].trim(), depth);
    }
    OutlineEntry::new(key, BLOCK_UNSTYLED, line.trim(), 0)
}

fn indent_depth(indent: &str, indent_width: usize) -> u32 {
    let columns: usize = indent
        .chars()
        .map(|ch| if ch == '\t' { indent_width } else { 1 })
        .sum();
    u32::try_from(columns / indent_width).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::{parse_markdown, parse_markdown_with, MarkdownImportOptions, OutlineImportError};

    fn shape(text: &str) -> Vec<(String, String, String, u32)> {
        parse_markdown(text)
            .into_iter()
            .map(|entry| (entry.key, entry.block_type, entry.text, entry.depth))
            .collect()
    }

    #[test]
    fn headings_bullets_and_text_are_classified() {
        let text = concat!(
            "# Plan\n\nIntro text\n## Tasks ##\n",
            "- Task 1\n  * Task 1.1\n1. Task 2\n\t2) Task 2.1\n",
        );
        let entries = shape(text);
        let expected = vec![
            ("line-1", "header-one", "Plan", 0),
            ("line-3", "unstyled", "Intro text", 0),
            ("line-4", "header-two", "Tasks", 0),
            ("line-5", "unordered-list-item", "Task 1", 0),
            ("line-6", "unordered-list-item", "Task 1.1", 1),
            ("line-7", "ordered-list-item", "Task 2", 0),
            ("line-8", "ordered-list-item", "Task 2.1", 1),
        ];
        let expected: Vec<(String, String, String, u32)> = expected
            .into_iter()
            .map(|(k, b, t, d)| (k.to_string(), b.to_string(), t.to_string(), d))
            .collect();
        assert_eq!(entries, expected);
    }

    #[test]
    fn rules_and_hashtags_are_not_structure() {
        let entries = parse_markdown("---\n#hashtag\n-not a bullet");
        assert!(entries.iter().all(|entry| entry.block_type == "unstyled"));
    }

    #[test]
    fn indent_width_is_configurable() {
        let options = MarkdownImportOptions { indent_width: 4 };
        let entries = parse_markdown_with("- a\n    - b\n  - c", &options).expect("valid options");
        let depths: Vec<u32> = entries.iter().map(|entry| entry.depth).collect();
        assert_eq!(depths, vec![0, 1, 0]);

        assert!(matches!(
            parse_markdown_with("- a", &MarkdownImportOptions { indent_width: 0 }),
            Err(OutlineImportError::InvalidIndentWidth(0))
        ));
    }
}
