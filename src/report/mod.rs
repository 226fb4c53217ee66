//! Report Formatters
//!
//! Markdown for people, JSON for the presentation shell.

pub mod markdown;
pub mod json;

pub use markdown::MarkdownFormatter;
pub use json::JsonFormatter;
