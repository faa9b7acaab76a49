//! Input normalization for dashboard submissions
//!
//! Turns the raw form fields into an immutable [`QueryRequest`]:
//! - comma-separated keywords are trimmed, emptied entries dropped,
//!   and the list capped at [`MAX_KEYWORDS`] without reordering or dedup
//! - a non-empty region override wins over the selected country

use serde::{Deserialize, Serialize};

use crate::models::{Country, QueryRequest, Timeframe, MAX_KEYWORDS};

/// Keywords prefilled in the dashboard form
pub const DEFAULT_KEYWORDS: &str = "air fryer, sneakers";

/// Split a comma list into at most five keywords and resolve the geo code
///
/// Never fails: an input with no usable keywords yields an empty list,
/// which is passed on to the API unchanged.
pub fn normalize(raw_keywords: &str, country: &str, region_override: &str) -> (Vec<String>, String) {
    let keywords: Vec<String> = raw_keywords
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .take(MAX_KEYWORDS)
        .map(str::to_string)
        .collect();

    let region = region_override.trim();
    let geo = if region.is_empty() {
        country.to_string()
    } else {
        region.to_string()
    };

    if keywords.is_empty() {
        tracing::warn!(raw = %raw_keywords, "No keywords after normalization, querying anyway");
    }

    (keywords, geo)
}

/// Form submission as typed by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryForm {
    /// Free-text, comma-separated keywords
    pub keywords: String,

    /// Selected country
    pub country: Country,

    /// Selected time window
    pub timeframe: Timeframe,

    /// Optional sub-national region code, e.g. `MX-NLE`
    pub region: String,
}

impl Default for QueryForm {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_KEYWORDS.to_string(),
            country: Country::default(),
            timeframe: Timeframe::default(),
            region: String::new(),
        }
    }
}

impl QueryForm {
    /// Normalize the form into the request sent to the trends API
    pub fn to_request(&self) -> QueryRequest {
        let (keywords, geo) = normalize(&self.keywords, self.country.code(), &self.region);
        QueryRequest::new(keywords, self.timeframe, geo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_basic() {
        let (keywords, geo) = normalize("air fryer, sneakers", "MX", "");
        assert_eq!(keywords, vec!["air fryer", "sneakers"]);
        assert_eq!(geo, "MX");
    }

    #[test]
    fn test_normalize_truncates_to_five() {
        let (keywords, geo) = normalize("a,b,c,d,e,f", "US", "");
        assert_eq!(keywords, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(geo, "US");
    }

    #[test]
    fn test_region_override_wins() {
        let (_, geo) = normalize("x", "MX", "MX-NLE");
        assert_eq!(geo, "MX-NLE");

        let (_, geo) = normalize("x", "MX", "   ");
        assert_eq!(geo, "MX");
    }

    #[test]
    fn test_drops_empty_entries_without_dedup() {
        let (keywords, _) = normalize(" , robot ,, robot ,", "ES", "");
        assert_eq!(keywords, vec!["robot", "robot"]);
    }

    #[test]
    fn test_empty_input_passes_through() {
        let (keywords, geo) = normalize(" , ,", "AR", "");
        assert!(keywords.is_empty());
        assert_eq!(geo, "AR");
    }

    #[test]
    fn test_form_to_request() {
        let form = QueryForm {
            keywords: "air fryer, sneakers, robot aspiradora".to_string(),
            country: Country::CO,
            timeframe: Timeframe::LastFiveYears,
            region: String::new(),
        };
        let request = form.to_request();
        assert_eq!(request.keywords.len(), 3);
        assert_eq!(request.geo, "CO");
        assert_eq!(request.category, 0);
        assert_eq!(request.timeframe, Timeframe::LastFiveYears);
    }

    #[test]
    fn test_form_defaults() {
        let form = QueryForm::default();
        assert_eq!(form.keywords, DEFAULT_KEYWORDS);
        assert_eq!(form.country, Country::MX);
        assert_eq!(form.timeframe, Timeframe::LastWeek);
        assert!(form.region.is_empty());
    }

    proptest! {
        #[test]
        fn prop_normalize_invariants(raw in "[a-z ,]{0,60}") {
            let (keywords, _) = normalize(&raw, "MX", "");
            prop_assert!(keywords.len() <= MAX_KEYWORDS);
            for kw in &keywords {
                prop_assert!(!kw.is_empty());
                prop_assert_eq!(kw.trim(), kw.as_str());
            }

            let expected: Vec<String> = raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .take(MAX_KEYWORDS)
                .collect();
            prop_assert_eq!(keywords, expected);
        }
    }
}
