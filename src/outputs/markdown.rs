//! Markdown rendering of a search outcome.
//!
//! The document opens with the query and date range, followed by either the
//! numbered article sections, an informational quote for an empty result, or
//! an error quote.

use crate::models::SearchRequest;
use crate::render::SearchOutcome;
use std::fmt::Write;

pub fn outcome_to_markdown(outcome: &SearchOutcome, request: &SearchRequest) -> String {
    let mut md = String::new();

    let _ = writeln!(md, "# News search: {}\n", escape_inline(&request.query));
    let _ = writeln!(
        md,
        "_{} to {}, sorted by {}_\n",
        request.from_date,
        request.to_date,
        request.sort_by.as_str()
    );

    match outcome {
        SearchOutcome::Articles {
            total_results,
            articles,
        } => {
            let _ = writeln!(md, "**Total results:** {total_results}\n");
            for article in articles {
                let _ = writeln!(md, "## {}. {}\n", article.index, escape_inline(&article.title));
                let _ = writeln!(md, "- **Source:** {}", escape_inline(&article.source_name));
                let _ = writeln!(md, "- **Published:** {}\n", article.published_at);
                if !article.description.is_empty() {
                    let _ = writeln!(md, "{}\n", article.description.trim());
                }
                if let Some(link) = &article.link {
                    let _ = writeln!(md, "[Read more]({link})\n");
                }
            }
        }
        SearchOutcome::NoArticles { .. } => {
            let _ = writeln!(md, "> {}", outcome.headline());
        }
        SearchOutcome::TransportFailure { detail, .. } => {
            let _ = writeln!(md, "> **Error:** {}", outcome.headline());
            if let Some(detail) = detail {
                let _ = writeln!(md, ">\n> {detail}");
            }
        }
        SearchOutcome::ApplicationError { .. } | SearchOutcome::MalformedResponse { .. } => {
            let _ = writeln!(md, "> **Error:** {}", outcome.headline());
        }
    }

    md
}

/// Escape characters that would start Markdown emphasis or links inside a heading or list item.
fn escape_inline(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '*' | '_' | '[' | ']' | '`' | '#') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
