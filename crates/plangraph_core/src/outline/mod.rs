//! Outline sources.

pub mod markdown;

pub use markdown::{
    parse_markdown, parse_markdown_with, read_markdown_file, MarkdownImportOptions,
    OutlineImportError,
};
