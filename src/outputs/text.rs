//! Plain-text rendering for the terminal.

use crate::render::SearchOutcome;
use std::fmt::Write;

pub fn outcome_to_text(outcome: &SearchOutcome) -> String {
    let mut out = String::new();
    match outcome {
        SearchOutcome::Articles { articles, .. } => {
            let _ = writeln!(out, "{}", outcome.headline());
            for article in articles {
                let _ = writeln!(out);
                let _ = writeln!(out, "{}. {}", article.index, article.title);
                let _ = writeln!(
                    out,
                    "   Source: {} | Published: {}",
                    article.source_name, article.published_at
                );
                if !article.description.is_empty() {
                    let _ = writeln!(out, "   {}", article.description);
                }
                if let Some(url) = article.link.as_ref().or(article.url.as_ref()) {
                    let _ = writeln!(out, "   Read more: {url}");
                }
            }
        }
        SearchOutcome::NoArticles { .. } => {
            let _ = writeln!(out, "Info: {}", outcome.headline());
        }
        SearchOutcome::TransportFailure { detail, .. } => {
            let _ = writeln!(out, "Error: {}", outcome.headline());
            if let Some(detail) = detail {
                let _ = writeln!(out, "  {detail}");
            }
        }
        SearchOutcome::ApplicationError { .. } | SearchOutcome::MalformedResponse { .. } => {
            let _ = writeln!(out, "Error: {}", outcome.headline());
        }
    }
    out
}
