use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

//==============================================================================
// Caller-supplied values
//==============================================================================

/// One scalar from the caller's grid
///
/// Tool arguments arrive as JSON, so every cell is one of the four JSON
/// scalar kinds. Arrays and objects are rejected at decode time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

impl CellValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

/// Rows of cells, mapped positionally onto a range
pub type ValueGrid = Vec<Vec<CellValue>>;

//==============================================================================
// Classification
//==============================================================================

/// A point in time recognised from an ISO 8601 string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamp {
    /// `2026-02-03T10:30:00Z`
    Utc(DateTime<Utc>),
    /// `2026-02-03T10:30:00+02:00`, offset kept as written
    Offset(DateTime<FixedOffset>),
    /// `2026-02-03T10:30:00`
    Naive(NaiveDateTime),
    /// `2026-02-03`
    Date(NaiveDate),
}

impl Timestamp {
    /// Wall-clock date and time as written by the caller.
    ///
    /// Spreadsheet cells carry no zone, so offsets are dropped rather than
    /// converted: `10:30:00+02:00` lands in the cell as 10:30.
    pub fn wall_clock(&self) -> NaiveDateTime {
        match self {
            Timestamp::Utc(dt) => dt.naive_utc(),
            Timestamp::Offset(dt) => dt.naive_local(),
            Timestamp::Naive(dt) => *dt,
            Timestamp::Date(d) => d.and_time(NaiveTime::MIN),
        }
    }

    pub fn has_time(&self) -> bool {
        !matches!(self, Timestamp::Date(_))
    }
}

/// How one grid value is handed to the worksheet
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifiedValue {
    /// Formula source, including the leading `=`
    Formula(String),
    Date(Timestamp),
    /// Anything else, passed through untouched
    Literal(CellValue),
}

impl ClassifiedValue {
    pub fn is_formula(&self) -> bool {
        matches!(self, ClassifiedValue::Formula(_))
    }
}

impl fmt::Display for ClassifiedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifiedValue::Formula(src) => write!(f, "formula {}", src),
            ClassifiedValue::Date(ts) => write!(f, "date {}", ts.wall_clock()),
            ClassifiedValue::Literal(v) => write!(f, "literal {:?}", v),
        }
    }
}

//==============================================================================
// Write requests and outcomes
//==============================================================================

/// Arguments of the write-grid operation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteRequest {
    pub file_absolute_path: PathBuf,
    pub sheet_name: String,
    #[serde(default)]
    pub new_sheet: bool,
    pub range: String,
    pub values: ValueGrid,
}

/// What happened during one grid write
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOutcome {
    pub any_formula_written: bool,
    pub cells_written: usize,
}
