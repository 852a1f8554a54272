//! Query-parameter construction for the `everything` endpoint.
//!
//! [`build_query`] translates a [`SearchRequest`] into the exact keys the
//! upstream API expects and leaves out every optional field that is unset or
//! blank. It is a pure function: the same request and key always produce the
//! same [`QueryParameters`].
//!
//! # Key translation
//!
//! | Request field | Query key | Presence |
//! |---------------|-----------|----------|
//! | api key | `apiKey` | always |
//! | `query` | `q` | non-blank |
//! | `search_in` | `searchIn` | non-empty, comma-joined |
//! | `sources` | `sources` | non-empty, comma-joined |
//! | `domains` | `domains` | non-blank |
//! | `exclude_domains` | `excludeDomains` | non-blank |
//! | `from_date` / `to_date` | `from` / `to` | always, `YYYY-MM-DD` |
//! | `language` | `language` | only when selected |
//! | `sort_by` | `sortBy` | always |
//! | `page_size` / `page` | `pageSize` / `page` | always, clamped |

use crate::error::{NewsError, NewsResult};
use crate::models::{MAX_PAGE_SIZE, SearchRequest};
use crate::utils::mask_api_key;
use chrono::NaiveDate;
use itertools::Itertools;
use std::collections::BTreeMap;

/// Flat string-keyed mapping sent as the HTTP query string.
///
/// Backed by a `BTreeMap` so iteration (and therefore logging and the
/// rendered query string) is stable across builds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParameters {
    inner: BTreeMap<&'static str, String>,
}

impl QueryParameters {
    fn insert(&mut self, key: &'static str, value: impl Into<String>) {
        self.inner.insert(key, value.into());
    }

    fn insert_non_blank(&mut self, key: &'static str, value: Option<&str>) {
        if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
            self.insert(key, v);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.inner.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.inner.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Pairs in the shape `reqwest::RequestBuilder::query` takes.
    pub fn as_pairs(&self) -> Vec<(&'static str, &str)> {
        self.iter().collect()
    }

    /// URL-encoded query string, keys in sorted order.
    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }

    /// Same as [`to_query_string`](Self::to_query_string) with `apiKey` masked.
    pub fn to_log_string(&self) -> String {
        let mut masked = self.clone();
        if let Some(key) = masked.inner.get_mut("apiKey") {
            *key = mask_api_key(key);
        }
        masked.to_query_string()
    }
}

/// Build the parameters for one `everything` search.
///
/// Performs no validation; call [`SearchRequest::validate`] first.
pub fn build_query(request: &SearchRequest, api_key: &str) -> QueryParameters {
    let mut params = QueryParameters::default();

    params.insert("apiKey", api_key);
    params.insert_non_blank("q", Some(request.query.as_str()));

    if !request.search_in.is_empty() {
        let fields = request
            .search_in
            .iter()
            .unique()
            .map(|f| f.as_str())
            .join(",");
        params.insert("searchIn", fields);
    }

    let sources = request
        .sources
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .unique()
        .join(",");
    params.insert_non_blank("sources", Some(sources.as_str()));

    params.insert_non_blank("domains", request.domains.as_deref());
    params.insert_non_blank("excludeDomains", request.exclude_domains.as_deref());

    params.insert("from", request.from_date.format("%Y-%m-%d").to_string());
    params.insert("to", request.to_date.format("%Y-%m-%d").to_string());

    if let Some(language) = request.language {
        params.insert("language", language.as_str());
    }

    params.insert("sortBy", request.sort_by.as_str());
    params.insert("pageSize", clamp_page_size(request.page_size).to_string());
    params.insert("page", request.page.max(1).to_string());

    params
}

pub fn clamp_page_size(page_size: u32) -> u32 {
    page_size.clamp(1, MAX_PAGE_SIZE)
}

impl SearchRequest {
    /// Check the date invariant `from_date <= to_date <= today`.
    pub fn validate(&self, today: NaiveDate) -> NewsResult<()> {
        if self.from_date > self.to_date {
            return Err(NewsError::InvalidRequest(format!(
                "from date {} is after to date {}",
                self.from_date, self.to_date
            )));
        }
        if self.to_date > today {
            return Err(NewsError::InvalidRequest(format!(
                "to date {} is in the future (today is {})",
                self.to_date, today
            )));
        }
        Ok(())
    }
}
