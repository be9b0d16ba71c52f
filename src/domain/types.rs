use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// A single scalar decoded from a result row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl RowValue {
    /// Variant name used in type mismatch diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            RowValue::Null => "null",
            RowValue::Bool(_) => "boolean",
            RowValue::Integer(_) => "integer",
            RowValue::Float(_) => "float",
            RowValue::Text(_) => "string",
            RowValue::Timestamp(_) => "timestamp",
        }
    }
}

impl fmt::Display for RowValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowValue::Null => write!(f, "NULL"),
            RowValue::Bool(b) => write!(f, "{}", b),
            RowValue::Integer(i) => write!(f, "{}", i),
            RowValue::Float(x) => write!(f, "{}", x),
            RowValue::Text(s) => write!(f, "{}", s),
            RowValue::Timestamp(ts) => write!(f, "{}", format_timestamp(ts)),
        }
    }
}

impl Serialize for RowValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RowValue::Null => serializer.serialize_unit(),
            RowValue::Bool(b) => serializer.serialize_bool(*b),
            RowValue::Integer(i) => serializer.serialize_i64(*i),
            RowValue::Float(x) => serializer.serialize_f64(*x),
            RowValue::Text(s) => serializer.serialize_str(s),
            RowValue::Timestamp(ts) => serializer.serialize_str(&format_timestamp(ts)),
        }
    }
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parse RFC 3339, `YYYY-MM-DD HH:MM:SS[.f]` or a bare `YYYY-MM-DD`.
///
/// Layouts without an offset are taken as UTC; a bare date is its midnight.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

/// One result row, columns kept in cursor order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultRow {
    columns: Vec<(String, RowValue)>,
}

impl ResultRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: RowValue) {
        let column = column.into();
        match self.columns.iter_mut().find(|(name, _)| *name == column) {
            Some(slot) => slot.1 = value,
            None => self.columns.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&RowValue> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, RowValue)> for ResultRow {
    fn from_iter<I: IntoIterator<Item = (K, RowValue)>>(iter: I) -> Self {
        let mut row = ResultRow::new();
        for (column, value) in iter {
            row.insert(column, value);
        }
        row
    }
}

/// A gauge observation ready for ingestion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataPoint {
    pub metric: String,
    pub value: f64,
    pub dimensions: BTreeMap<String, RowValue>,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

/// Request body accepted by the datapoint ingest API
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GaugeBatch {
    pub gauge: Vec<DataPoint>,
}

impl GaugeBatch {
    pub fn new(gauge: Vec<DataPoint>) -> Self {
        Self { gauge }
    }

    pub fn len(&self) -> usize {
        self.gauge.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gauge.is_empty()
    }
}

/// What happened to one configured query during a run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryOutcome {
    /// 1-based position in the configuration
    pub query: usize,
    pub rows: usize,
    pub datapoints: usize,
    pub response_status: Option<u16>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub queries: Vec<QueryOutcome>,
}

impl RunSummary {
    pub fn failures(&self) -> usize {
        self.queries.iter().filter(|q| q.error.is_some()).count()
    }

    pub fn datapoints(&self) -> usize {
        self.queries.iter().map(|q| q.datapoints).sum()
    }

    pub fn is_success(&self) -> bool {
        self.failures() == 0
    }
}
