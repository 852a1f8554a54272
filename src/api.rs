//! HTTP access to the upstream news API.
//!
//! # Architecture
//!
//! The module uses a trait-based design so the transport can be swapped out:
//! - [`HttpGet`]: Core trait defining one async GET returning status and body
//! - [`ReqwestGet`]: Production implementation on top of `reqwest`
//! - [`NewsApi`]: Endpoint wrapper that knows the base URL and the two paths
//!   the tool uses (`everything` and `sources`)
//!
//! Exactly one request is issued per submission. There is no retry; a failed
//! call is reported once and the user resubmits.

use crate::error::{NewsError, NewsResult};
use crate::models::SearchRequest;
use crate::params::{QueryParameters, build_query};
use crate::render::SearchOutcome;
use crate::utils::{mask_api_key, truncate_for_log};
use chrono::NaiveDate;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Default base URL of the upstream API.
pub const DEFAULT_BASE_URL: &str = "https://newsapi.org/v2";

/// Status code and body of a completed HTTP exchange.
///
/// Non-2xx statuses are still `RawResponse`s; only connection-level failures
/// surface as errors from [`HttpGet::get`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for issuing a single HTTP GET.
///
/// Implementors send `query` as the URL query string and return the status
/// and body without interpreting either.
pub trait HttpGet {
    async fn get(&self, url: &str, query: &[(&str, &str)]) -> NewsResult<RawResponse>;
}

/// [`HttpGet`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestGet {
    client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestGet {
    pub fn new(timeout: Duration, user_agent: &str) -> NewsResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client, timeout })
    }
}

impl HttpGet for ReqwestGet {
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn get(&self, url: &str, query: &[(&str, &str)]) -> NewsResult<RawResponse> {
        let t0 = Instant::now();
        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NewsError::Transport(format!("no response within {}s", self.timeout.as_secs()))
                } else {
                    NewsError::Http(e)
                }
            })?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        debug!(
            status,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            body_preview = %truncate_for_log(&body, 200),
            "GET completed"
        );
        Ok(RawResponse { status, body })
    }
}

/// Wrapper around the upstream endpoints the tool talks to.
#[derive(Debug)]
pub struct NewsApi<C> {
    client: C,
    base_url: String,
}

impl<C: HttpGet> NewsApi<C> {
    pub fn new(client: C, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    /// `GET {base}/everything` with prebuilt parameters.
    #[instrument(level = "info", skip_all, fields(query = %params.to_log_string()))]
    pub async fn everything(&self, params: &QueryParameters) -> NewsResult<RawResponse> {
        let url = self.endpoint("everything");
        self.client.get(&url, &params.as_pairs()).await
    }

    /// `GET {base}/sources` with only the API key.
    #[instrument(level = "info", skip_all, fields(api_key = %mask_api_key(api_key)))]
    pub async fn sources(&self, api_key: &str) -> NewsResult<RawResponse> {
        let url = self.endpoint("sources");
        self.client.get(&url, &[("apiKey", api_key)]).await
    }

    /// Run one form submission end to end.
    ///
    /// Configuration problems (no key, bad date range) are returned as `Err`
    /// before anything is sent. Everything after the request is issued,
    /// including transport failures, comes back as a [`SearchOutcome`].
    pub async fn search(
        &self,
        request: &SearchRequest,
        api_key: Option<&str>,
        today: NaiveDate,
    ) -> NewsResult<SearchOutcome> {
        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(NewsError::MissingApiKey)?;
        request.validate(today)?;

        let params = build_query(request, api_key);
        if !params.contains_key("q") {
            debug!("No keywords given; searching by filters only");
        }
        info!(
            keys = params.len(),
            sort_by = params.get("sortBy").unwrap_or_default(),
            "Fetching articles"
        );

        let t0 = Instant::now();
        let response = self.everything(&params).await;
        if let Err(e) = &response {
            warn!(error = %e, "everything request failed before a response arrived");
        }

        let outcome = SearchOutcome::from_response(response);
        info!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            outcome = outcome.kind(),
            "Search finished"
        );
        Ok(outcome)
    }
}
