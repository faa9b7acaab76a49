//! Common test utilities

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::json;

use tendencia::models::{
    InterestRow, InterestTable, QueryRequest, RankedQuery, RelatedQueryResult,
};
use tendencia::trends::{TrendsApi, TrendsPayload, Widget};
use tendencia::utils::error::{FetchError, QueryError};

/// Midnight of a day in May 2024
#[allow(dead_code)]
pub fn may(day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, day)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Three days of interest for the given keywords, last row partial
#[allow(dead_code)]
pub fn interest_table(keywords: &[&str]) -> InterestTable {
    let columns: Vec<String> = keywords.iter().map(|k| k.to_string()).collect();
    let rows = (1..=3)
        .map(|day| InterestRow {
            date: may(day),
            values: (0..columns.len() as u32).map(|i| day * 10 + i).collect(),
            is_partial: day == 3,
        })
        .collect();
    InterestTable::from_rows(columns, rows).unwrap()
}

/// Ranking with `n` entries, highest value first
#[allow(dead_code)]
pub fn ranked(n: u32) -> Vec<RankedQuery> {
    (0..n)
        .map(|i| RankedQuery {
            query: format!("related {i}"),
            value: 100 - i,
        })
        .collect()
}

// ============================================================================
// Wire fixtures
// ============================================================================

#[allow(dead_code)]
fn related_widget(index: usize, keyword: &str) -> serde_json::Value {
    json!({
        "id": format!("RELATED_QUERIES_{index}"),
        "request": {
            "restriction": {
                "complexKeywordsRestriction": {
                    "keyword": [{"type": "BROAD", "value": keyword}]
                }
            }
        },
        "token": format!("rq-{index}")
    })
}

/// Explore response with the `)]}'` guard
#[allow(dead_code)]
pub fn explore_body(keywords: &[&str]) -> String {
    let mut widgets = vec![json!({
        "id": "TIMESERIES",
        "request": {"time": "2024-05-01 2024-05-03", "resolution": "DAY"},
        "token": "ts-token"
    })];
    widgets.extend(keywords.iter().enumerate().map(|(i, k)| related_widget(i, k)));
    widgets.push(json!({"id": "GEO_MAP", "request": {}, "token": "geo-token"}));

    format!(")]}}'\n{}", json!({ "widgets": widgets }))
}

/// Multiline response with the `)]}',` guard; one row per (epoch, values)
#[allow(dead_code)]
pub fn multiline_body(points: &[(i64, Vec<u32>, bool)]) -> String {
    let data: Vec<serde_json::Value> = points
        .iter()
        .map(|(time, values, partial)| {
            let mut point = json!({
                "time": time.to_string(),
                "formattedTime": "",
                "value": values,
            });
            if *partial {
                point["isPartial"] = json!(true);
            }
            point
        })
        .collect();

    format!(")]}}',{}", json!({ "default": { "timelineData": data } }))
}

/// Related-searches response; `None` yields an empty "top" list
#[allow(dead_code)]
pub fn related_body(top: Option<&[RankedQuery]>) -> String {
    let top = top.unwrap_or_default();
    format!(
        ")]}}',{}",
        json!({
            "default": {
                "rankedList": [
                    { "rankedKeyword": top },
                    { "rankedKeyword": [{"query": "rising", "value": 5000}] }
                ]
            }
        })
    )
}

/// 2024-05-01 00:00:00 UTC
#[allow(dead_code)]
pub const MAY_1: i64 = 1_714_521_600;

/// Seconds per day
#[allow(dead_code)]
pub const DAY: i64 = 86_400;

// ============================================================================
// Scripted trends API
// ============================================================================

/// In-memory [`TrendsApi`] returning scripted results and counting calls
#[allow(dead_code)]
#[derive(Default)]
pub struct FakeTrends {
    pub table: InterestTable,
    pub related: HashMap<String, RelatedQueryResult>,
    /// Status of a `ServerError` returned by `interest_over_time`
    pub fail_status: Option<u16>,
    pub payload_calls: AtomicUsize,
    pub interest_calls: AtomicUsize,
    pub related_calls: AtomicUsize,
}

#[allow(dead_code)]
impl FakeTrends {
    pub fn with_table(table: InterestTable) -> Self {
        Self {
            table,
            ..Self::default()
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            fail_status: Some(status),
            ..Self::default()
        }
    }

    pub fn related(mut self, keyword: &str, top: RelatedQueryResult) -> Self {
        self.related.insert(keyword.to_string(), top);
        self
    }

    pub fn calls(&self) -> (usize, usize, usize) {
        (
            self.payload_calls.load(Ordering::SeqCst),
            self.interest_calls.load(Ordering::SeqCst),
            self.related_calls.load(Ordering::SeqCst),
        )
    }
}

#[async_trait]
impl TrendsApi for FakeTrends {
    async fn build_payload(&self, request: &QueryRequest) -> Result<TrendsPayload, QueryError> {
        self.payload_calls.fetch_add(1, Ordering::SeqCst);
        Ok(TrendsPayload {
            request: request.clone(),
            timeseries: Widget::new("TIMESERIES", json!({}), "ts-token"),
            related: Vec::new(),
        })
    }

    async fn interest_over_time(&self, _payload: &TrendsPayload) -> Result<InterestTable, QueryError> {
        self.interest_calls.fetch_add(1, Ordering::SeqCst);
        match self.fail_status {
            Some(status) => Err(QueryError::Fetch(FetchError::ServerError(status))),
            None => Ok(self.table.clone()),
        }
    }

    async fn related_queries(
        &self,
        _payload: &TrendsPayload,
    ) -> Result<HashMap<String, RelatedQueryResult>, QueryError> {
        self.related_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.related.clone())
    }
}
