//! Report generation.
//!
//! Renders a refined payload as JSON (for downstream consumers) or as
//! a Markdown summary (for humans checking a scan).

pub mod generator;

pub use generator::{generate_json_report, generate_markdown_report, RunInfo};
