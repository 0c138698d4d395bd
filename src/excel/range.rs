//! A1-style cell addresses and ranges

use crate::error::{SheetError, SheetResult};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Last column Excel addresses (XFD)
pub const MAX_COLUMNS: u32 = 16_384;
/// Last row Excel addresses
pub const MAX_ROWS: u32 = 1_048_576;

fn range_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\$?([A-Za-z]+)\$?(\d+):\$?([A-Za-z]+)\$?(\d+)$").expect("valid range regex")
    })
}

fn cell_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\$?([A-Za-z]+)\$?(\d+)$").expect("valid cell regex"))
}

/// Inclusive rectangle of cells, 1-based on both axes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub start_col: u32,
    pub start_row: u32,
    pub end_col: u32,
    pub end_row: u32,
}

impl CellRange {
    pub fn new(start_col: u32, start_row: u32, end_col: u32, end_row: u32) -> SheetResult<Self> {
        for (col, row) in [(start_col, start_row), (end_col, end_row)] {
            check_bounds(col, row).map_err(SheetError::InvalidRange)?;
        }
        if start_col > end_col || start_row > end_row {
            return Err(SheetError::InvalidRange(format!(
                "range start {} is after range end {}",
                cell_name_unchecked(start_col, start_row),
                cell_name_unchecked(end_col, end_row)
            )));
        }
        Ok(Self {
            start_col,
            start_row,
            end_col,
            end_row,
        })
    }

    /// Parse `A1:C10` (case-insensitive, `$` markers ignored)
    pub fn parse(expr: &str) -> SheetResult<Self> {
        let trimmed = expr.trim();
        let caps = range_pattern().captures(trimmed).ok_or_else(|| {
            SheetError::InvalidRange(format!(
                "'{}' is not a range like \"A1:C10\"",
                expr
            ))
        })?;

        let start_col = column_letter_to_number(&caps[1])?;
        let start_row = parse_row(&caps[2])?;
        let end_col = column_letter_to_number(&caps[3])?;
        let end_row = parse_row(&caps[4])?;

        Self::new(start_col, start_row, end_col, end_row)
    }

    pub fn row_size(&self) -> usize {
        (self.end_row - self.start_row + 1) as usize
    }

    pub fn col_size(&self) -> usize {
        (self.end_col - self.start_col + 1) as usize
    }

    pub fn cell_count(&self) -> usize {
        self.row_size() * self.col_size()
    }

    /// Absolute 1-based (col, row) for a 0-based offset into the range
    pub fn offset(&self, row_offset: usize, col_offset: usize) -> (u32, u32) {
        (
            self.start_col + col_offset as u32,
            self.start_row + row_offset as u32,
        )
    }

    pub fn columns(&self) -> std::ops::RangeInclusive<u32> {
        self.start_col..=self.end_col
    }

    pub fn rows(&self) -> std::ops::RangeInclusive<u32> {
        self.start_row..=self.end_row
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            cell_name_unchecked(self.start_col, self.start_row),
            cell_name_unchecked(self.end_col, self.end_row)
        )
    }
}

fn check_bounds(col: u32, row: u32) -> Result<(), String> {
    if col == 0 || col > MAX_COLUMNS {
        return Err(format!("column {} is outside 1..={}", col, MAX_COLUMNS));
    }
    if row == 0 || row > MAX_ROWS {
        return Err(format!("row {} is outside 1..={}", row, MAX_ROWS));
    }
    Ok(())
}

fn parse_row(digits: &str) -> SheetResult<u32> {
    digits
        .parse::<u32>()
        .map_err(|_| SheetError::InvalidRange(format!("row '{}' is out of range", digits)))
}

/// Convert a 1-based column number to letters
///
/// Examples:
/// - 1 → A
/// - 26 → Z
/// - 27 → AA
/// - 16384 → XFD
pub fn column_number_to_letter(col: u32) -> String {
    let mut letters = Vec::new();
    let mut n = col;
    while n > 0 {
        n -= 1;
        letters.push((b'A' + (n % 26) as u8) as char);
        n /= 26;
    }
    letters.iter().rev().collect()
}

/// Convert column letters (any case) to a 1-based column number
pub fn column_letter_to_number(letters: &str) -> SheetResult<u32> {
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(SheetError::InvalidRange(format!(
            "'{}' is not a column name",
            letters
        )));
    }
    let mut col: u32 = 0;
    for c in letters.chars() {
        let digit = (c.to_ascii_uppercase() as u8 - b'A' + 1) as u32;
        col = col
            .checked_mul(26)
            .and_then(|v| v.checked_add(digit))
            .filter(|v| *v <= MAX_COLUMNS)
            .ok_or_else(|| {
                SheetError::InvalidRange(format!("column '{}' is beyond XFD", letters))
            })?;
    }
    Ok(col)
}

fn cell_name_unchecked(col: u32, row: u32) -> String {
    format!("{}{}", column_number_to_letter(col), row)
}

/// Address of a 1-based (col, row) pair, e.g. (2, 3) → "B3"
pub fn cell_name(col: u32, row: u32) -> SheetResult<String> {
    check_bounds(col, row).map_err(SheetError::Address)?;
    Ok(cell_name_unchecked(col, row))
}

/// Split "B3" into 1-based (col, row)
pub fn parse_cell_name(cell: &str) -> SheetResult<(u32, u32)> {
    let caps = cell_pattern()
        .captures(cell.trim())
        .ok_or_else(|| SheetError::Address(format!("'{}' is not a cell address", cell)))?;
    let col = column_letter_to_number(&caps[1]).map_err(|e| SheetError::Address(e.to_string()))?;
    let row = caps[2]
        .parse::<u32>()
        .map_err(|_| SheetError::Address(format!("'{}' has an invalid row", cell)))?;
    check_bounds(col, row).map_err(SheetError::Address)?;
    Ok((col, row))
}
