//! Wire types of the trends web API
//!
//! Every response from the API starts with an anti-XSSI guard (`)]}'` for
//! the explore call, `)]}',` for widget data) that must be removed before
//! the body is valid JSON.

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{InterestRow, InterestTable, QueryRequest, RankedQuery, RelatedQueryResult};
use crate::utils::error::QueryError;

/// Widget id of the interest-over-time data
pub const TIMESERIES_WIDGET: &str = "TIMESERIES";

/// Widget id prefix of the related-queries data (suffixed per keyword)
pub const RELATED_QUERIES_WIDGET: &str = "RELATED_QUERIES";

/// Remove the anti-XSSI guard in front of a JSON body
pub fn strip_xssi_prefix(body: &str) -> &str {
    let trimmed = body.trim_start();
    match trimmed.strip_prefix(")]}'") {
        Some(rest) => rest.strip_prefix(',').unwrap_or(rest),
        None => trimmed,
    }
}

// ============================================================================
// Explore (payload) call
// ============================================================================

#[derive(Debug, Serialize)]
struct ComparisonItem<'a> {
    keyword: &'a str,
    time: &'a str,
    geo: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExploreRequest<'a> {
    comparison_item: Vec<ComparisonItem<'a>>,
    category: u32,
    property: &'a str,
}

/// JSON `req` parameter of the explore call
pub fn explore_request_json(request: &QueryRequest) -> Result<String, QueryError> {
    let body = ExploreRequest {
        comparison_item: request
            .keywords
            .iter()
            .map(|kw| ComparisonItem {
                keyword: kw,
                time: request.timeframe.as_str(),
                geo: &request.geo,
            })
            .collect(),
        category: request.category,
        property: "",
    };

    Ok(serde_json::to_string(&body)?)
}

/// A data widget: opaque request object plus the token authorizing it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    pub id: String,
    #[serde(default)]
    pub request: Value,
    #[serde(default)]
    pub token: String,
}

impl Widget {
    pub fn new(id: impl Into<String>, request: Value, token: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            request,
            token: token.into(),
        }
    }

    /// Keyword a related-queries widget was issued for ("" when absent)
    pub fn related_keyword(&self) -> String {
        self.request
            .pointer("/restriction/complexKeywordsRestriction/keyword/0/value")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }
}

#[derive(Debug, Deserialize)]
struct ExploreResponse {
    #[serde(default)]
    widgets: Vec<Widget>,
}

/// Query payload: the request plus the widgets the explore call handed out
#[derive(Debug, Clone, PartialEq)]
pub struct TrendsPayload {
    pub request: QueryRequest,
    pub timeseries: Widget,
    pub related: Vec<Widget>,
}

impl TrendsPayload {
    /// Build the payload from a (guard-stripped) explore response body
    pub fn from_explore(request: QueryRequest, body: &str) -> Result<Self, QueryError> {
        let response: ExploreResponse = serde_json::from_str(strip_xssi_prefix(body))?;

        let mut timeseries = None;
        let mut related = Vec::new();
        for widget in response.widgets {
            if widget.id == TIMESERIES_WIDGET {
                timeseries = Some(widget);
            } else if widget.id.contains(RELATED_QUERIES_WIDGET) {
                related.push(widget);
            }
        }

        Ok(Self {
            request,
            timeseries: timeseries.ok_or(QueryError::MissingWidget(TIMESERIES_WIDGET))?,
            related,
        })
    }
}

// ============================================================================
// Interest over time
// ============================================================================

#[derive(Debug, Deserialize)]
struct MultilineResponse {
    default: TimelineBody,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimelineBody {
    #[serde(default)]
    timeline_data: Vec<TimelinePoint>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimelinePoint {
    time: Value,
    #[serde(default)]
    value: Vec<u32>,
    #[serde(default)]
    is_partial: bool,
}

fn epoch_seconds(time: &Value) -> Option<i64> {
    match time {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_i64(),
        _ => None,
    }
}

/// Parse a multiline widget body into an interest table
///
/// Values are positional: the n-th value belongs to the n-th keyword.
pub fn parse_timeline(body: &str, keywords: &[String]) -> Result<InterestTable, QueryError> {
    let response: MultilineResponse = serde_json::from_str(strip_xssi_prefix(body))?;

    let mut rows = Vec::with_capacity(response.default.timeline_data.len());
    for point in response.default.timeline_data {
        let secs = epoch_seconds(&point.time)
            .ok_or_else(|| QueryError::MalformedResponse(format!("invalid time: {}", point.time)))?;
        let date = DateTime::from_timestamp(secs, 0)
            .ok_or_else(|| QueryError::MalformedResponse(format!("time out of range: {secs}")))?
            .naive_utc();

        rows.push(InterestRow {
            date,
            values: point.value,
            is_partial: point.is_partial,
        });
    }

    InterestTable::from_rows(keywords.to_vec(), rows)
        .map_err(|e| QueryError::MalformedResponse(e.to_string()))
}

// ============================================================================
// Related queries
// ============================================================================

#[derive(Debug, Deserialize)]
struct RelatedResponse {
    default: RankedBody,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RankedBody {
    #[serde(default)]
    ranked_list: Vec<RankedList>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RankedList {
    #[serde(default)]
    ranked_keyword: Vec<RankedQuery>,
}

/// Parse a related-searches widget body, keeping only the "top" ranking
///
/// The first ranked list is "top", the second "rising". A missing or empty
/// top list yields `None`.
pub fn parse_related(body: &str) -> Result<RelatedQueryResult, QueryError> {
    let response: RelatedResponse = serde_json::from_str(strip_xssi_prefix(body))?;

    Ok(response
        .default
        .ranked_list
        .into_iter()
        .next()
        .map(|top| top.ranked_keyword)
        .filter(|top| !top.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Timeframe;
    use serde_json::json;

    fn request() -> QueryRequest {
        QueryRequest::new(
            vec!["air fryer".to_string(), "sneakers".to_string()],
            Timeframe::LastYear,
            "MX",
        )
    }

    #[test]
    fn test_strip_xssi_prefix() {
        assert_eq!(strip_xssi_prefix(")]}'\n{\"a\":1}"), "\n{\"a\":1}");
        assert_eq!(strip_xssi_prefix(")]}',{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_xssi_prefix("{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn test_explore_request_json() {
        let json: Value = serde_json::from_str(&explore_request_json(&request()).unwrap()).unwrap();
        assert_eq!(json["category"], 0);
        assert_eq!(json["property"], "");
        assert_eq!(json["comparisonItem"][0]["keyword"], "air fryer");
        assert_eq!(json["comparisonItem"][1]["time"], "today 12-m");
        assert_eq!(json["comparisonItem"][1]["geo"], "MX");
    }

    #[test]
    fn test_payload_from_explore() {
        let body = format!(
            ")]}}'\n{}",
            json!({
                "widgets": [
                    {"id": "TIMESERIES", "request": {"time": "today 12-m"}, "token": "t1"},
                    {"id": "GEO_MAP", "request": {}, "token": "g"},
                    {"id": "RELATED_QUERIES_0", "token": "r0", "request": {
                        "restriction": {"complexKeywordsRestriction": {"keyword": [{"type": "BROAD", "value": "air fryer"}]}}
                    }},
                    {"id": "RELATED_QUERIES_1", "token": "r1", "request": {}}
                ]
            })
        );

        let payload = TrendsPayload::from_explore(request(), &body).unwrap();
        assert_eq!(payload.timeseries.token, "t1");
        assert_eq!(payload.related.len(), 2);
        assert_eq!(payload.related[0].related_keyword(), "air fryer");
        assert_eq!(payload.related[1].related_keyword(), "");
    }

    #[test]
    fn test_payload_without_timeseries() {
        let result = TrendsPayload::from_explore(request(), ")]}'{\"widgets\": []}");
        assert!(matches!(result, Err(QueryError::MissingWidget(TIMESERIES_WIDGET))));
    }

    #[test]
    fn test_parse_timeline() {
        let body = format!(
            ")]}}',{}",
            json!({"default": {"timelineData": [
                {"time": "1704585600", "value": [40, 10], "hasData": [true, true]},
                {"time": "1703980800", "value": [55, 12]},
                {"time": "1705190400", "value": [60, 9], "isPartial": true}
            ]}})
        );

        let keywords = request().keywords;
        let table = parse_timeline(&body, &keywords).unwrap();
        assert_eq!(table.columns(), keywords.as_slice());
        assert_eq!(table.len(), 3);
        assert_eq!(table.column("air fryer"), Some(vec![55, 40, 60]));
        assert_eq!(table.rows()[0].date.to_string(), "2023-12-31 00:00:00");
        assert!(!table.rows()[1].is_partial);
        assert!(table.rows()[2].is_partial);
    }

    #[test]
    fn test_parse_timeline_empty() {
        let table = parse_timeline(")]}',{\"default\": {\"timelineData\": []}}", &request().keywords).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_parse_timeline_value_mismatch() {
        let body = ")]}',{\"default\": {\"timelineData\": [{\"time\": \"1704585600\", \"value\": [1]}]}}";
        assert!(matches!(
            parse_timeline(body, &request().keywords),
            Err(QueryError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_parse_related_top_only() {
        let body = format!(
            ")]}}',{}",
            json!({"default": {"rankedList": [
                {"rankedKeyword": [
                    {"query": "air fryer recipes", "value": 100, "formattedValue": "100"},
                    {"query": "best air fryer", "value": 80}
                ]},
                {"rankedKeyword": [{"query": "ninja air fryer", "value": 250}]}
            ]}})
        );

        let top = parse_related(&body).unwrap().unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].query, "air fryer recipes");
        assert_eq!(top[1].value, 80);
    }

    #[test]
    fn test_parse_related_missing_top() {
        assert_eq!(parse_related(")]}',{\"default\": {\"rankedList\": []}}").unwrap(), None);
        assert_eq!(
            parse_related(")]}',{\"default\": {\"rankedList\": [{\"rankedKeyword\": []}]}}").unwrap(),
            None
        );
    }
}
