// Core data structures for the trends dashboard

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Search category sent with every query (0 = all categories)
pub const DEFAULT_CATEGORY: u32 = 0;

/// Maximum number of keywords a single query may compare
pub const MAX_KEYWORDS: usize = 5;

/// Maximum number of related queries kept per keyword
pub const MAX_RELATED_QUERIES: usize = 10;

/// Name of the marker column flagging incomplete (still collecting) rows
pub const PARTIAL_COLUMN: &str = "isPartial";

/// Time window of a trends query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Timeframe {
    #[default]
    #[serde(rename = "now 7-d")]
    LastWeek,
    #[serde(rename = "today 3-m")]
    LastThreeMonths,
    #[serde(rename = "today 12-m")]
    LastYear,
    #[serde(rename = "today 5-y")]
    LastFiveYears,
}

impl Timeframe {
    /// All supported timeframes in display order
    pub const ALL: [Self; 4] = [
        Self::LastWeek,
        Self::LastThreeMonths,
        Self::LastYear,
        Self::LastFiveYears,
    ];

    /// Value understood by the trends API
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LastWeek => "now 7-d",
            Self::LastThreeMonths => "today 3-m",
            Self::LastYear => "today 12-m",
            Self::LastFiveYears => "today 5-y",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| {
                format!(
                    "Unknown timeframe: {s}. Expected one of: {}",
                    Self::ALL.map(|t| t.as_str()).join(", ")
                )
            })
    }
}

/// Countries offered by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Country {
    #[default]
    MX,
    US,
    ES,
    AR,
    CO,
}

impl Country {
    /// All supported countries in display order
    pub const ALL: [Self; 5] = [Self::MX, Self::US, Self::ES, Self::AR, Self::CO];

    /// ISO 3166-1 alpha-2 code used as geo code
    pub fn code(&self) -> &'static str {
        match self {
            Self::MX => "MX",
            Self::US => "US",
            Self::ES => "ES",
            Self::AR => "AR",
            Self::CO => "CO",
        }
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Country {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|c| c.code() == upper)
            .ok_or_else(|| {
                format!(
                    "Unknown country: {s}. Expected one of: {}",
                    Self::ALL.map(|c| c.code()).join(", ")
                )
            })
    }
}

/// Immutable query built once per submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Keywords in the order the user typed them
    pub keywords: Vec<String>,

    /// Search category
    pub category: u32,

    /// Time window
    pub timeframe: Timeframe,

    /// Effective geo code (region override or country)
    pub geo: String,
}

impl QueryRequest {
    /// Create a request for the default category
    pub fn new(keywords: Vec<String>, timeframe: Timeframe, geo: impl Into<String>) -> Self {
        Self {
            keywords,
            category: DEFAULT_CATEGORY,
            timeframe,
            geo: geo.into(),
        }
    }
}

/// One dated row of the interest-over-time table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestRow {
    pub date: NaiveDateTime,
    /// One value per table column, positional
    pub values: Vec<u32>,
    pub is_partial: bool,
}

/// Interest-over-time table: date index, one column per keyword, partial marker
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InterestTable {
    columns: Vec<String>,
    rows: Vec<InterestRow>,
}

/// Rows that do not line up with the table columns
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("row {row} has {found} values for {expected} columns")]
pub struct TableShapeError {
    pub row: usize,
    pub expected: usize,
    pub found: usize,
}

impl InterestTable {
    /// Build a table from rows, sorting them chronologically
    ///
    /// Every row must carry exactly one value per column.
    pub fn from_rows(
        columns: Vec<String>,
        mut rows: Vec<InterestRow>,
    ) -> Result<Self, TableShapeError> {
        if let Some((row, r)) = rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.values.len() != columns.len())
        {
            return Err(TableShapeError {
                row,
                expected: columns.len(),
                found: r.values.len(),
            });
        }

        rows.sort_by_key(|r| r.date);
        Ok(Self { columns, rows })
    }

    /// Keyword column names (the partial marker is not included)
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[InterestRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Position of a keyword column
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Values of one column in row order
    pub fn column(&self, name: &str) -> Option<Vec<u32>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| r.values[idx]).collect())
    }
}

/// A ranked related query with its relative score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedQuery {
    pub query: String,
    pub value: u32,
}

/// Raw related-query lookup for one keyword: `None` when the API has no "top" ranking
pub type RelatedQueryResult = Option<Vec<RankedQuery>>;

/// Related queries of one keyword
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRelated {
    pub keyword: String,
    pub top: Vec<RankedQuery>,
}

/// Ordered keyword → top related queries map
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelatedQueries {
    entries: Vec<KeywordRelated>,
}

impl RelatedQueries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the ranking of a keyword, keeping at most the top entries
    pub fn insert(&mut self, keyword: impl Into<String>, mut top: Vec<RankedQuery>) {
        top.truncate(MAX_RELATED_QUERIES);
        let keyword = keyword.into();
        match self.entries.iter_mut().find(|e| e.keyword == keyword) {
            Some(entry) => entry.top = top,
            None => self.entries.push(KeywordRelated { keyword, top }),
        }
    }

    pub fn get(&self, keyword: &str) -> Option<&[RankedQuery]> {
        self.entries
            .iter()
            .find(|e| e.keyword == keyword)
            .map(|e| e.top.as_slice())
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.get(keyword).is_some()
    }

    /// Keywords present in the map, in insertion order
    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.keyword.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeywordRelated> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
