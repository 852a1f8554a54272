//! JSON output and file writing.
//!
//! # Output Structure
//!
//! ```json
//! {
//!   "request": { "q": "apple", "from": "2024-01-01", "to": "2024-02-01", ... },
//!   "result": { "outcome": "articles", "total_results": 42, "articles": [ ... ] }
//! }
//! ```
//!
//! The request block never contains the API key.

use crate::error::NewsResult;
use crate::models::SearchRequest;
use crate::render::SearchOutcome;
use crate::utils::ensure_writable_dir;
use serde_json::json;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

pub fn outcome_to_json(outcome: &SearchOutcome, request: &SearchRequest) -> NewsResult<String> {
    let doc = json!({
        "request": {
            "q": request.query,
            "searchIn": request.search_in.iter().map(|f| f.as_str()).collect::<Vec<_>>(),
            "sources": request.sources,
            "domains": request.domains,
            "excludeDomains": request.exclude_domains,
            "from": request.from_date.to_string(),
            "to": request.to_date.to_string(),
            "language": request.language.map(|l| l.as_str()),
            "sortBy": request.sort_by.as_str(),
            "pageSize": request.page_size,
            "page": request.page,
        },
        "result": outcome,
    });
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// Write formatted output to `path`, creating the parent directory first.
///
/// # Returns
///
/// `Ok(())` on success, or an error if directory creation or file writing fails.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_output(path: &Path, contents: &str) -> NewsResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = ensure_writable_dir(parent).await {
            error!(dir = %parent.display(), error = %e, "Output directory is not writable");
            return Err(e);
        }
    }

    fs::write(path, contents).await?;
    info!(bytes = contents.len(), "Wrote output file");
    Ok(())
}
