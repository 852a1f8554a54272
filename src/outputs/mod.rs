//! Output generation for a rendered search outcome.
//!
//! # Submodules
//!
//! - [`text`]: Plain terminal listing
//! - [`markdown`]: Markdown document with one section per article
//! - [`json`]: Pretty-printed JSON of the outcome, plus file writing
//!
//! Every formatter makes errors and the empty result visibly different from
//! a successful listing.

use crate::error::NewsResult;
use crate::models::SearchRequest;
use crate::render::SearchOutcome;
use clap::ValueEnum;

pub mod json;
pub mod markdown;
pub mod text;

pub use json::write_output;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Markdown,
    Json,
}

/// Format `outcome` for display. `request` supplies the header context.
pub fn format_outcome(
    outcome: &SearchOutcome,
    request: &SearchRequest,
    format: OutputFormat,
) -> NewsResult<String> {
    match format {
        OutputFormat::Text => Ok(text::outcome_to_text(outcome)),
        OutputFormat::Markdown => Ok(markdown::outcome_to_markdown(outcome, request)),
        OutputFormat::Json => json::outcome_to_json(outcome, request),
    }
}
