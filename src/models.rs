//! Data models for search requests, upstream records, and their display projections.
//!
//! This module defines the core data structures used throughout the application:
//! - [`SearchRequest`]: The filter values chosen for one submission
//! - [`ArticleRecord`] / [`SourceRecord`]: Records as returned by the upstream API
//! - [`ArticleView`]: The fixed display shape of one search result
//! - Enumerations for the closed upstream vocabularies: [`SortBy`], [`Language`], [`SearchField`]
//!
//! Wire records keep every field optional. The upstream API omits or nulls
//! fields freely and a single odd record must never sink a whole response.

use chrono::{Duration, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Window covered by the default date range, counted back from today.
pub const DEFAULT_LOOKBACK_DAYS: i64 = 120;
/// Page size used when none is configured.
pub const DEFAULT_PAGE_SIZE: u32 = 20;
/// Largest page size the upstream API accepts.
pub const MAX_PAGE_SIZE: u32 = 100;
/// Keywords pre-filled when no query is given.
pub const DEFAULT_QUERY: &str = "apple";

/// Ordering applied by the upstream API to search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    /// Newest articles first.
    #[value(name = "publishedAt")]
    PublishedAt,
    /// Articles more closely related to `q` first.
    #[value(name = "relevancy")]
    Relevancy,
    /// Articles from popular sources and publishers first.
    #[default]
    #[value(name = "popularity")]
    Popularity,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::PublishedAt => "publishedAt",
            SortBy::Relevancy => "relevancy",
            SortBy::Popularity => "popularity",
        }
    }
}

/// Two-letter language codes accepted by the `language` parameter.
///
/// Leaving the language unset means "all languages"; there is no variant for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Ar,
    De,
    En,
    Es,
    Fr,
    He,
    It,
    Nl,
    No,
    Pt,
    Ru,
    Sv,
    Ud,
    Zh,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Ar => "ar",
            Language::De => "de",
            Language::En => "en",
            Language::Es => "es",
            Language::Fr => "fr",
            Language::He => "he",
            Language::It => "it",
            Language::Nl => "nl",
            Language::No => "no",
            Language::Pt => "pt",
            Language::Ru => "ru",
            Language::Sv => "sv",
            Language::Ud => "ud",
            Language::Zh => "zh",
        }
    }
}

/// Article fields the keyword search can be restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
    Title,
    Description,
    Content,
}

impl SearchField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchField::Title => "title",
            SearchField::Description => "description",
            SearchField::Content => "content",
        }
    }
}

/// The set of user-chosen filter values for a single submission.
///
/// Built fresh for every submission and dropped once the request completes.
/// Dates must satisfy `from_date <= to_date <= today`; see
/// [`SearchRequest::validate`](crate::params).
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    /// Keywords or phrases to search for.
    pub query: String,
    /// Fields the keywords must appear in; empty means all fields.
    pub search_in: Vec<SearchField>,
    /// Source identifiers to restrict results to.
    pub sources: Vec<String>,
    /// Comma-separated domains to restrict results to.
    pub domains: Option<String>,
    /// Comma-separated domains to remove from results.
    pub exclude_domains: Option<String>,
    /// Oldest publication date, inclusive.
    pub from_date: NaiveDate,
    /// Newest publication date, inclusive.
    pub to_date: NaiveDate,
    /// Restrict to one language; `None` searches all languages.
    pub language: Option<Language>,
    pub sort_by: SortBy,
    pub page_size: u32,
    pub page: u32,
}

impl SearchRequest {
    /// A request pre-filled with the default form values relative to `today`.
    pub fn with_defaults(today: NaiveDate) -> Self {
        Self {
            query: DEFAULT_QUERY.to_string(),
            search_in: Vec::new(),
            sources: Vec::new(),
            domains: None,
            exclude_domains: None,
            from_date: today - Duration::days(DEFAULT_LOOKBACK_DAYS),
            to_date: today,
            language: None,
            sort_by: SortBy::default(),
            page_size: DEFAULT_PAGE_SIZE,
            page: 1,
        }
    }
}

/// The `source` object nested in every article record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceRef {
    pub name: Option<String>,
}

/// One article as returned by the `everything` endpoint.
///
/// Only the fields the result list shows are decoded; the rest are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArticleRecord {
    pub source: Option<SourceRef>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub published_at: Option<String>,
}

/// One entry of the `sources` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SourceRecord {
    pub id: Option<String>,
}

/// Body of the `sources` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SourcesResponse {
    pub status: Option<String>,
    pub message: Option<String>,
    pub sources: Vec<SourceRecord>,
}

/// Placeholder shown for an article without a title.
pub const UNTITLED: &str = "Untitled";
/// Placeholder shown for an article without a source name.
pub const UNKNOWN_SOURCE: &str = "Unknown source";

/// Read-only display projection of one search result.
///
/// Exposes exactly what the result list shows. Missing upstream fields are
/// replaced by placeholders (title, source) or left empty (timestamp,
/// description), and `link` is only set when the URL parses as http(s).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleView {
    /// 1-based position in the result list.
    pub index: usize,
    pub title: String,
    pub source_name: String,
    pub published_at: String,
    pub description: String,
    pub url: Option<String>,
    pub link: Option<String>,
}

impl ArticleView {
    pub fn from_record(index: usize, record: ArticleRecord) -> Self {
        let url = non_blank(record.url);
        let link = url.as_deref().and_then(article_link);
        Self {
            index,
            title: non_blank(record.title).unwrap_or_else(|| UNTITLED.to_string()),
            source_name: record
                .source
                .and_then(|s| non_blank(s.name))
                .unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
            published_at: record.published_at.unwrap_or_default(),
            description: record.description.unwrap_or_default(),
            url,
            link,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn article_link(raw: &str) -> Option<String> {
    url::Url::parse(raw.trim())
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https"))
        .map(String::from)
}
