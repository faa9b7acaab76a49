//! HTTP client for the Google Trends web API
//!
//! One query costs, in order:
//! - a cookie-priming GET of the explore page (best effort)
//! - the explore call handing out widget tokens
//! - one multiline call for interest over time
//! - one related-searches call per keyword, issued sequentially
//!
//! Nothing is retried and no rate limiting is applied; a 429 surfaces as
//! [`FetchError::RateLimit`].

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, USER_AGENT},
    Client, RequestBuilder,
};

use super::payload::{self, TrendsPayload, Widget};
use super::TrendsApi;
use crate::config::TrendsConfig;
use crate::models::{InterestTable, QueryRequest, RelatedQueryResult};
use crate::utils::error::{FetchError, QueryError};

/// Public endpoint of the trends web API
pub const DEFAULT_BASE_URL: &str = "https://trends.google.com/trends";

/// Trends client configured with a fixed locale and timezone offset
pub struct GoogleTrendsClient {
    /// HTTP client with cookie store, timeout and compression
    client: Client,

    /// Base URL, overridable for mock servers
    base_url: String,

    /// Host language, e.g. `es-ES`
    hl: String,

    /// Timezone offset in minutes, e.g. `360`
    tz: i32,
}

impl GoogleTrendsClient {
    /// Create a client for the public endpoint
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn new(hl: &str, tz: i32) -> Result<Self, FetchError> {
        Self::from_config(&TrendsConfig {
            hl: hl.to_string(),
            tz,
            ..TrendsConfig::default()
        })
    }

    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidUrl` for an unparsable base URL and
    /// `FetchError::Http` if the HTTP client cannot be created
    pub fn from_config(config: &TrendsConfig) -> Result<Self, FetchError> {
        url::Url::parse(&config.base_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {e}", config.base_url)))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/javascript, */*;q=0.1"),
        );
        if let Ok(language) = HeaderValue::from_str(&config.hl) {
            headers.insert(ACCEPT_LANGUAGE, language);
        }
        if let Ok(agent) = HeaderValue::from_str(&config.user_agent) {
            headers.insert(USER_AGENT, agent);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .gzip(true)
            .cookie_store(true)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            hl: config.hl.clone(),
            tz: config.tz,
        })
    }

    /// Create a client pointed at a custom base URL for testing
    ///
    /// # Errors
    ///
    /// Same as [`GoogleTrendsClient::from_config`]
    pub fn with_base_url(base_url: &str, hl: &str, tz: i32) -> Result<Self, FetchError> {
        Self::from_config(&TrendsConfig {
            base_url: base_url.to_string(),
            hl: hl.to_string(),
            tz,
            ..TrendsConfig::default()
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn hl(&self) -> &str {
        &self.hl
    }

    pub fn tz(&self) -> i32 {
        self.tz
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Geo used for cookie priming: the region part of the host language
    fn cookie_geo(&self) -> &str {
        let len = self.hl.len();
        self.hl.get(len.saturating_sub(2)..).unwrap_or_default()
    }

    /// Visit the explore page so the cookie store holds a session cookie
    async fn prime_cookies(&self) {
        let url = self.url("/explore/");
        match self
            .client
            .get(&url)
            .query(&[("geo", self.cookie_geo())])
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                tracing::debug!(url = %url, "Session cookie primed");
            }
            Ok(response) => {
                tracing::warn!(url = %url, status = %response.status(), "Cookie priming rejected");
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Cookie priming failed");
            }
        }
    }

    /// Send a request and return the body of a successful JSON response
    ///
    /// # Errors
    ///
    /// - `FetchError::RateLimit` on 429
    /// - `FetchError::ServerError` on any other non-success status
    /// - `FetchError::UnexpectedContentType` when the body is not JSON/JavaScript
    /// - `FetchError::Timeout` / `FetchError::Http` on transport failure
    async fn send_json(&self, request: RequestBuilder) -> Result<String, FetchError> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Http(e)
            }
        })?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(FetchError::RateLimit);
        }
        if !status.is_success() {
            return Err(FetchError::ServerError(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_lowercase())
            .unwrap_or_default();
        if !Self::is_json_content_type(&content_type) {
            return Err(FetchError::UnexpectedContentType(content_type));
        }

        response.text().await.map_err(|e| FetchError::Decode(e.to_string()))
    }

    fn is_json_content_type(content_type: &str) -> bool {
        ["application/json", "application/javascript", "text/javascript"]
            .iter()
            .any(|t| content_type.contains(t))
    }

    /// Request for the data behind one widget
    fn widget_request(&self, path: &str, widget: &Widget) -> Result<RequestBuilder, QueryError> {
        let req = serde_json::to_string(&widget.request)?;
        let tz = self.tz.to_string();
        Ok(self.client.get(self.url(path)).query(&[
            ("req", req.as_str()),
            ("token", widget.token.as_str()),
            ("tz", tz.as_str()),
        ]))
    }
}

#[async_trait]
impl TrendsApi for GoogleTrendsClient {
    async fn build_payload(&self, request: &QueryRequest) -> Result<TrendsPayload, QueryError> {
        self.prime_cookies().await;

        let req = payload::explore_request_json(request)?;
        let tz = self.tz.to_string();
        let body = self
            .send_json(self.client.post(self.url("/api/explore")).query(&[
                ("hl", self.hl.as_str()),
                ("tz", tz.as_str()),
                ("req", req.as_str()),
            ]))
            .await?;

        let payload = TrendsPayload::from_explore(request.clone(), &body)?;
        tracing::debug!(
            keywords = ?request.keywords,
            related_widgets = payload.related.len(),
            "Built trends payload"
        );
        Ok(payload)
    }

    async fn interest_over_time(&self, payload: &TrendsPayload) -> Result<InterestTable, QueryError> {
        let request = self.widget_request("/api/widgetdata/multiline", &payload.timeseries)?;
        let body = self.send_json(request).await?;

        let table = payload::parse_timeline(&body, &payload.request.keywords)?;
        tracing::debug!(rows = table.len(), "Fetched interest over time");
        Ok(table)
    }

    async fn related_queries(
        &self,
        payload: &TrendsPayload,
    ) -> Result<HashMap<String, RelatedQueryResult>, QueryError> {
        let mut results = HashMap::with_capacity(payload.related.len());

        for widget in &payload.related {
            let keyword = widget.related_keyword();
            let request = self.widget_request("/api/widgetdata/relatedsearches", widget)?;
            let body = self.send_json(request).await?;
            let top = payload::parse_related(&body)?;

            tracing::debug!(
                keyword = %keyword,
                entries = top.as_ref().map_or(0, Vec::len),
                "Fetched related queries"
            );
            results.insert(keyword, top);
        }

        Ok(results)
    }
}
