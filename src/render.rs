//! Interpretation of a search response into a displayable outcome.
//!
//! The checks run in a fixed order:
//! 1. Transport: connection failures and non-2xx statuses (426 gets its own message)
//! 2. Body: must be a JSON object
//! 3. Application: `status` must be `"ok"`, otherwise the upstream `message` is reported
//! 4. Results: `totalResults` and `articles`, each article projected to an [`ArticleView`]
//!
//! Zero articles with `status: "ok"` is a success ([`SearchOutcome::NoArticles`]),
//! never an error.

use crate::api::RawResponse;
use crate::error::NewsResult;
use crate::models::{ArticleRecord, ArticleView, SourceRef};
use crate::utils::truncate_for_log;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Prefix shared by connection failures and every non-2xx status other than 426.
pub const HTTP_ERROR_MESSAGE: &str = "HTTP error occurred";
/// Message shown for HTTP 426.
pub const UPGRADE_REQUIRED_MESSAGE: &str = "Upgrade Required (HTTP 426): your NewsAPI plan does not allow this request. \
     Narrow the date range or upgrade the plan.";
/// Fallback when an error body carries no `message`.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

/// Result of one submission, ready to be formatted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// At least one article was returned.
    Articles {
        total_results: u64,
        articles: Vec<ArticleView>,
    },
    /// `status` was `"ok"` but the article list is empty.
    NoArticles { total_results: u64 },
    /// The request failed at the HTTP layer.
    TransportFailure {
        status: Option<u16>,
        message: String,
        detail: Option<String>,
    },
    /// HTTP succeeded but the body reported `status: "error"` (or no `"ok"`).
    ApplicationError {
        code: Option<String>,
        message: String,
    },
    /// A 2xx response whose body is not a JSON object.
    MalformedResponse { message: String },
}

impl SearchOutcome {
    pub fn from_response(response: NewsResult<RawResponse>) -> Self {
        let raw = match response {
            Ok(raw) => raw,
            Err(e) => {
                return SearchOutcome::TransportFailure {
                    status: None,
                    message: format!("{HTTP_ERROR_MESSAGE}: {e}"),
                    detail: None,
                };
            }
        };

        if !raw.is_success() {
            return transport_failure(&raw);
        }

        let body: Value = match serde_json::from_str(&raw.body) {
            Ok(v @ Value::Object(_)) => v,
            Ok(_) => {
                return SearchOutcome::MalformedResponse {
                    message: "response body is not a JSON object".to_string(),
                };
            }
            Err(e) => {
                warn!(error = %e, body = %truncate_for_log(&raw.body, 200), "Unparseable response body");
                return SearchOutcome::MalformedResponse {
                    message: format!("response body is not valid JSON: {e}"),
                };
            }
        };

        if body.get("status").and_then(Value::as_str) != Some("ok") {
            return SearchOutcome::ApplicationError {
                code: string_field(&body, "code"),
                message: string_field(&body, "message")
                    .unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string()),
            };
        }

        let total_results = body
            .get("totalResults")
            .and_then(Value::as_u64)
            .unwrap_or(0);
        let records = body
            .get("articles")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        if records.is_empty() {
            return SearchOutcome::NoArticles { total_results };
        }

        let articles = records
            .iter()
            .enumerate()
            .map(|(i, v)| ArticleView::from_record(i + 1, article_record(v)))
            .collect::<Vec<_>>();
        debug!(total_results, rendered = articles.len(), "Rendered articles");

        SearchOutcome::Articles {
            total_results,
            articles,
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(
            self,
            SearchOutcome::Articles { .. } | SearchOutcome::NoArticles { .. }
        )
    }

    /// Short stable name, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SearchOutcome::Articles { .. } => "articles",
            SearchOutcome::NoArticles { .. } => "no_articles",
            SearchOutcome::TransportFailure { .. } => "transport_failure",
            SearchOutcome::ApplicationError { .. } => "application_error",
            SearchOutcome::MalformedResponse { .. } => "malformed_response",
        }
    }

    /// One-line banner describing the outcome.
    pub fn headline(&self) -> String {
        match self {
            SearchOutcome::Articles { total_results, .. } => {
                format!("Total results: {total_results}")
            }
            SearchOutcome::NoArticles { .. } => "No articles found.".to_string(),
            SearchOutcome::TransportFailure { message, .. } => message.clone(),
            SearchOutcome::ApplicationError { message, .. } => format!("API error: {message}"),
            SearchOutcome::MalformedResponse { message } => {
                format!("Unexpected response: {message}")
            }
        }
    }
}

fn transport_failure(raw: &RawResponse) -> SearchOutcome {
    let message = if raw.status == 426 {
        UPGRADE_REQUIRED_MESSAGE.to_string()
    } else {
        let reason = reqwest::StatusCode::from_u16(raw.status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("");
        format!("{HTTP_ERROR_MESSAGE}: {} {reason}", raw.status)
            .trim_end()
            .to_string()
    };
    let detail = serde_json::from_str::<Value>(&raw.body)
        .ok()
        .and_then(|v| string_field(&v, "message"));
    warn!(status = raw.status, ?detail, "Non-success HTTP status");
    SearchOutcome::TransportFailure {
        status: Some(raw.status),
        message,
        detail,
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(String::from)
}

/// Decode one article, falling back to field-by-field extraction when the
/// record has unexpected types so the rest of the list still renders.
fn article_record(value: &Value) -> ArticleRecord {
    match serde_json::from_value::<ArticleRecord>(value.clone()) {
        Ok(record) => record,
        Err(e) => {
            warn!(error = %e, "Article record has unexpected shape; extracting known fields");
            ArticleRecord {
                source: value.get("source").map(|s| SourceRef {
                    name: string_field(s, "name"),
                }),
                title: string_field(value, "title"),
                description: string_field(value, "description"),
                url: string_field(value, "url"),
                published_at: string_field(value, "publishedAt"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NewsError;
    use crate::models::{UNKNOWN_SOURCE, UNTITLED};

    fn ok(body: &str) -> NewsResult<RawResponse> {
        Ok(RawResponse {
            status: 200,
            body: body.to_string(),
        })
    }

    fn status(code: u16, body: &str) -> NewsResult<RawResponse> {
        Ok(RawResponse {
            status: code,
            body: body.to_string(),
        })
    }

    #[test]
    fn test_empty_result_is_informational() {
        let outcome = SearchOutcome::from_response(ok(r#"{"status":"ok","totalResults":0,"articles":[]}"#));
        assert_eq!(outcome, SearchOutcome::NoArticles { total_results: 0 });
        assert!(!outcome.is_error());
        assert_eq!(outcome.headline(), "No articles found.");
    }

    #[test]
    fn test_application_error_uses_upstream_message() {
        let outcome = SearchOutcome::from_response(ok(
            r#"{"status":"error","code":"apiKeyInvalid","message":"Invalid API key."}"#,
        ));
        match &outcome {
            SearchOutcome::ApplicationError { code, message } => {
                assert_eq!(message, "Invalid API key.");
                assert_eq!(code.as_deref(), Some("apiKeyInvalid"));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(outcome.is_error());
        assert!(outcome.headline().contains("Invalid API key."));
    }

    #[test]
    fn test_application_error_without_message() {
        let outcome = SearchOutcome::from_response(ok(r#"{"status":"error"}"#));
        assert_eq!(
            outcome,
            SearchOutcome::ApplicationError {
                code: None,
                message: UNKNOWN_ERROR_MESSAGE.to_string()
            }
        );
    }

    #[test]
    fn test_missing_status_is_application_error() {
        let outcome = SearchOutcome::from_response(ok(r#"{"articles":[]}"#));
        assert!(matches!(outcome, SearchOutcome::ApplicationError { .. }));
    }

    #[test]
    fn test_upgrade_required_message() {
        let outcome = SearchOutcome::from_response(status(426, ""));
        match outcome {
            SearchOutcome::TransportFailure { status, message, .. } => {
                assert_eq!(status, Some(426));
                assert_eq!(message, UPGRADE_REQUIRED_MESSAGE);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_server_error_generic_message() {
        let outcome = SearchOutcome::from_response(status(500, "oops"));
        match outcome {
            SearchOutcome::TransportFailure { status, message, detail } => {
                assert_eq!(status, Some(500));
                assert!(message.starts_with(HTTP_ERROR_MESSAGE));
                assert!(message.contains("500"));
                assert!(!message.contains("Upgrade"));
                assert!(detail.is_none());
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_unauthorized_keeps_upstream_detail() {
        let outcome = SearchOutcome::from_response(status(
            401,
            r#"{"status":"error","code":"apiKeyMissing","message":"Your API key is missing."}"#,
        ));
        match outcome {
            SearchOutcome::TransportFailure { message, detail, .. } => {
                assert_eq!(message, "HTTP error occurred: 401 Unauthorized");
                assert_eq!(detail.as_deref(), Some("Your API key is missing."));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_connection_error_is_transport_failure() {
        let outcome = SearchOutcome::from_response(Err(NewsError::Transport("timed out".into())));
        match outcome {
            SearchOutcome::TransportFailure { status, message, .. } => {
                assert!(status.is_none());
                assert!(message.starts_with(HTTP_ERROR_MESSAGE));
                assert!(message.contains("timed out"));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let outcome = SearchOutcome::from_response(ok("<html>"));
        assert!(matches!(outcome, SearchOutcome::MalformedResponse { .. }));
        assert!(outcome.is_error());

        let outcome = SearchOutcome::from_response(ok("[1, 2]"));
        assert!(matches!(outcome, SearchOutcome::MalformedResponse { .. }));
    }

    #[test]
    fn test_articles_projected_in_order() {
        let body = r#"{
            "status": "ok",
            "totalResults": 42,
            "articles": [
                {"source": {"id": null, "name": "First"}, "title": "One", "description": "d1",
                 "url": "https://a.example/1", "publishedAt": "2024-01-02T00:00:00Z"},
                {"source": {"id": null, "name": "Second"}, "title": "Two", "description": "d2",
                 "url": "https://a.example/2", "publishedAt": "2024-01-03T00:00:00Z"}
            ]
        }"#;
        let outcome = SearchOutcome::from_response(ok(body));
        let SearchOutcome::Articles { total_results, articles } = outcome else {
            panic!("expected articles");
        };
        assert_eq!(total_results, 42);
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].index, 1);
        assert_eq!(articles[0].title, "One");
        assert_eq!(articles[1].index, 2);
        assert_eq!(articles[1].source_name, "Second");
    }

    #[test]
    fn test_missing_description_does_not_abort() {
        let body = r#"{
            "status": "ok",
            "totalResults": 2,
            "articles": [
                {"source": {"name": "Wire"}, "title": "No description here",
                 "url": "https://a.example/1", "publishedAt": "2024-01-02T00:00:00Z"},
                {"source": {"name": "Wire"}, "title": "Second", "description": "present"}
            ]
        }"#;
        let SearchOutcome::Articles { articles, .. } = SearchOutcome::from_response(ok(body)) else {
            panic!("expected articles");
        };
        assert_eq!(articles[0].description, "");
        assert_eq!(articles[1].description, "present");
    }

    #[test]
    fn test_mistyped_article_fields_tolerated() {
        let body = r#"{
            "status": "ok",
            "totalResults": 2,
            "articles": [
                {"source": "not-an-object", "title": 17, "description": "kept"},
                {"title": "Fine"}
            ]
        }"#;
        let SearchOutcome::Articles { articles, .. } = SearchOutcome::from_response(ok(body)) else {
            panic!("expected articles");
        };
        assert_eq!(articles[0].title, UNTITLED);
        assert_eq!(articles[0].source_name, UNKNOWN_SOURCE);
        assert_eq!(articles[0].description, "kept");
        assert_eq!(articles[1].title, "Fine");
    }

    #[test]
    fn test_missing_total_and_articles_default() {
        let outcome = SearchOutcome::from_response(ok(r#"{"status":"ok"}"#));
        assert_eq!(outcome, SearchOutcome::NoArticles { total_results: 0 });
    }

    #[test]
    fn test_outcome_serializes_with_tag() {
        let json = serde_json::to_string(&SearchOutcome::NoArticles { total_results: 0 }).unwrap();
        assert_eq!(json, r#"{"outcome":"no_articles","total_results":0}"#);
    }
}
