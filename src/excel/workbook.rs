//! Workbook and worksheet contract used by the grid writer
//!
//! The writer only talks to these traits. [`XlsxWorkbook`](super::XlsxWorkbook)
//! is the file-backed implementation; tests plug in recording fakes.

use crate::error::SheetResult;
use crate::types::{CellValue, Timestamp};
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;
use std::ops::{Deref, DerefMut};

/// A value as the workbook stores it
#[derive(Debug, Clone, PartialEq)]
pub enum SheetValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl SheetValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, SheetValue::Empty)
    }
}

impl From<CellValue> for SheetValue {
    fn from(value: CellValue) -> Self {
        match value {
            CellValue::Null => SheetValue::Empty,
            CellValue::Bool(b) => SheetValue::Bool(b),
            CellValue::Number(n) => SheetValue::Number(n),
            CellValue::String(s) => SheetValue::Text(s),
        }
    }
}

impl From<Timestamp> for SheetValue {
    fn from(ts: Timestamp) -> Self {
        match ts {
            Timestamp::Date(d) => SheetValue::Date(d),
            other => SheetValue::DateTime(other.wall_clock()),
        }
    }
}

impl fmt::Display for SheetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetValue::Empty => Ok(()),
            SheetValue::Text(s) => write!(f, "{}", s),
            SheetValue::Number(n) => write!(f, "{}", format_number(*n)),
            SheetValue::Bool(true) => write!(f, "TRUE"),
            SheetValue::Bool(false) => write!(f, "FALSE"),
            SheetValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            SheetValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// Integers without a trailing `.0`, everything else as Rust prints it
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// An open workbook
pub trait Workbook {
    type Sheet: Worksheet;

    /// Identifies the storage backend in reports
    fn backend_name(&self) -> &str;

    fn sheet_names(&self) -> Vec<String>;

    fn create_sheet(&mut self, name: &str) -> SheetResult<()>;

    /// Acquire a handle to an existing sheet; `SheetNotFound` if absent
    fn find_sheet(&mut self, name: &str) -> SheetResult<Self::Sheet>;

    /// Persist every pending change
    fn save(&mut self) -> SheetResult<()>;
}

/// A handle to one sheet of an open workbook
pub trait Worksheet {
    fn name(&self) -> &str;

    fn set_value(&mut self, cell: &str, value: SheetValue) -> SheetResult<()>;

    /// `formula` keeps its leading `=`
    fn set_formula(&mut self, cell: &str, formula: &str) -> SheetResult<()>;

    /// Display text of a cell (cached result for formula cells, blank if none)
    fn value(&self, cell: &str) -> SheetResult<String>;

    fn formula(&self, cell: &str) -> SheetResult<Option<String>>;

    /// Smallest range covering every non-empty cell, `None` for a blank sheet
    fn used_range(&self) -> SheetResult<Option<super::CellRange>>;

    /// Give the handle back; further calls may fail
    fn release(&mut self);
}

/// Holds a worksheet handle and releases it when dropped
///
/// Every exit path out of the scope that acquired the sheet, `?` included,
/// runs `release` exactly once.
pub struct SheetGuard<S: Worksheet> {
    sheet: S,
}

impl<S: Worksheet> SheetGuard<S> {
    pub fn new(sheet: S) -> Self {
        Self { sheet }
    }
}

impl<S: Worksheet> Deref for SheetGuard<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.sheet
    }
}

impl<S: Worksheet> DerefMut for SheetGuard<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.sheet
    }
}

impl<S: Worksheet> Drop for SheetGuard<S> {
    fn drop(&mut self) {
        tracing::debug!(sheet = self.sheet.name(), "releasing worksheet handle");
        self.sheet.release();
    }
}
