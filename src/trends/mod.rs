//! Trend query client
//!
//! The [`TrendsApi`] trait is the seam to the external trends service;
//! [`query`] only sequences its three calls for one submission:
//!
//! ```text
//! build_payload ──▶ interest_over_time ──┬─ empty ──▶ QueryOutcome::NoData
//!                                        └─ rows  ──▶ related_queries ──▶ QueryOutcome::Data
//! ```

pub mod client;
pub mod payload;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::models::{InterestTable, QueryRequest, RelatedQueries, RelatedQueryResult};
use crate::utils::error::QueryError;

pub use client::GoogleTrendsClient;
pub use payload::{TrendsPayload, Widget};

/// Operations consumed from the trends service
#[async_trait]
pub trait TrendsApi: Send + Sync {
    /// Build the query payload (keywords, category, timeframe, geo)
    async fn build_payload(&self, request: &QueryRequest) -> Result<TrendsPayload, QueryError>;

    /// Fetch the interest-over-time table for a payload
    async fn interest_over_time(&self, payload: &TrendsPayload) -> Result<InterestTable, QueryError>;

    /// Fetch the raw related-query lookup, keyed by keyword
    async fn related_queries(
        &self,
        payload: &TrendsPayload,
    ) -> Result<HashMap<String, RelatedQueryResult>, QueryError>;
}

/// Result of a query that reached the service
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// The service answered with an empty table
    NoData,

    /// Interest table and related queries of the same query
    Data {
        table: InterestTable,
        related: RelatedQueries,
    },
}

/// Run one query: payload, interest over time, then related queries
///
/// # Errors
///
/// Any `QueryError` of the underlying calls; an empty table is
/// `QueryOutcome::NoData`, not an error.
pub async fn query(api: &dyn TrendsApi, request: &QueryRequest) -> Result<QueryOutcome, QueryError> {
    tracing::info!(
        keywords = ?request.keywords,
        timeframe = %request.timeframe,
        geo = %request.geo,
        "Querying trends"
    );

    let payload = api.build_payload(request).await?;
    let table = api.interest_over_time(&payload).await?;

    if table.is_empty() {
        tracing::info!("Trends query returned no rows");
        return Ok(QueryOutcome::NoData);
    }

    let raw = api.related_queries(&payload).await?;
    let related = collect_related(&request.keywords, raw);

    tracing::info!(
        rows = table.len(),
        related_keywords = related.len(),
        "Trends query complete"
    );
    Ok(QueryOutcome::Data { table, related })
}

/// Select the related queries of the requested keywords, in request order
///
/// Keywords without a lookup, or whose "top" ranking is absent or empty,
/// are left out.
pub fn collect_related(
    keywords: &[String],
    mut raw: HashMap<String, RelatedQueryResult>,
) -> RelatedQueries {
    let mut related = RelatedQueries::new();

    for keyword in keywords {
        match raw.remove(keyword).flatten() {
            Some(top) if !top.is_empty() => related.insert(keyword.clone(), top),
            _ => tracing::debug!(keyword = %keyword, "No related queries"),
        }
    }

    related
}
