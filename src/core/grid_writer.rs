//! Writes a validated value grid into a worksheet range
//!
//! Order of work for one request:
//! 1. parse the range and check the grid shape (nothing touched yet)
//! 2. create the sheet if asked, then acquire it
//! 3. classify and write every cell, row by row
//! 4. save the workbook
//! 5. render the range as a value table, or a formula table if any
//!    formula was written
//!
//! The first failure aborts the request. Unsaved edits are dropped with the
//! in-memory workbook, so the file on disk is either fully updated or left
//! as it was.

use super::classifier::classify;
use super::grid_validator::validate_grid;
use crate::error::{ErrorKind, SheetError, SheetResult};
use crate::excel::{
    cell_name, render_formula_table, render_values_table, CellRange, SheetGuard, SheetValue,
    Workbook, Worksheet, XlsxWorkbook,
};
use crate::types::{CellValue, ClassifiedValue, WriteOutcome, WriteRequest};
use std::fmt;
use tracing::{info, trace, warn};

/// Confirmation of a completed write
#[derive(Debug, Clone)]
pub struct WriteReport {
    /// Rendered HTML table of the written range
    pub table: String,
    /// Whether `table` shows formulas instead of values
    pub formula_mode: bool,
    pub backend: String,
    pub sheet_name: String,
    /// Range expression exactly as the caller sent it
    pub range: String,
    pub outcome: WriteOutcome,
}

impl fmt::Display for WriteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "<h2>Written Sheet</h2>")?;
        writeln!(f, "{}", self.table)?;
        writeln!(f, "<h2>Metadata</h2>")?;
        writeln!(f, "<ul>")?;
        writeln!(f, "<li>backend: {}</li>", self.backend)?;
        writeln!(f, "<li>sheet name: {}</li>", self.sheet_name)?;
        writeln!(f, "<li>read range: {}</li>", self.range)?;
        writeln!(f, "</ul>")?;
        writeln!(f, "<h2>Notice</h2>")?;
        writeln!(f, "<p>Values wrote successfully.</p>")
    }
}

/// Open the request's workbook file and write the grid into it
pub fn write_to_file(request: &WriteRequest) -> SheetResult<WriteReport> {
    let mut workbook = XlsxWorkbook::open(&request.file_absolute_path)?;
    write_grid(&mut workbook, request)
}

/// Write `request.values` into an already open workbook and save it
pub fn write_grid<W: Workbook>(workbook: &mut W, request: &WriteRequest) -> SheetResult<WriteReport> {
    let range = CellRange::parse(&request.range)?;
    validate_grid(&request.values, &range)?;

    if request.new_sheet {
        workbook
            .create_sheet(&request.sheet_name)
            .map_err(|e| as_internal(e, SheetError::SheetCreate))?;
    }

    let mut sheet = SheetGuard::new(workbook.find_sheet(&request.sheet_name)?);

    let outcome = write_cells(&mut *sheet, &range, &request.values).inspect_err(|e| {
        warn!(sheet = %request.sheet_name, range = %request.range, error = %e, "grid write aborted")
    })?;

    workbook
        .save()
        .map_err(|e| as_internal(e, SheetError::Save))?;

    let table = if outcome.any_formula_written {
        render_formula_table(&*sheet, &range)
    } else {
        render_values_table(&*sheet, &range)
    }
    .map_err(|e| as_internal(e, SheetError::Render))?;

    info!(
        sheet = %request.sheet_name,
        range = %request.range,
        cells = outcome.cells_written,
        formulas = outcome.any_formula_written,
        "grid written"
    );

    Ok(WriteReport {
        table,
        formula_mode: outcome.any_formula_written,
        backend: workbook.backend_name().to_string(),
        sheet_name: request.sheet_name.clone(),
        range: request.range.clone(),
        outcome,
    })
}

/// Row-major pass over a grid whose shape already matches `range`
fn write_cells<S: Worksheet>(
    sheet: &mut S,
    range: &CellRange,
    grid: &[Vec<CellValue>],
) -> SheetResult<WriteOutcome> {
    let mut outcome = WriteOutcome::default();

    for (i, row) in grid.iter().enumerate() {
        for (j, raw) in row.iter().enumerate() {
            let (col, row_number) = range.offset(i, j);
            let cell = cell_name(col, row_number)?;
            let classified = classify(raw);
            trace!(cell = %cell, value = %classified, "writing cell");

            let written = match classified {
                ClassifiedValue::Formula(formula) => {
                    outcome.any_formula_written = true;
                    sheet.set_formula(&cell, &formula)
                }
                ClassifiedValue::Date(ts) => sheet.set_value(&cell, SheetValue::from(ts)),
                ClassifiedValue::Literal(value) => sheet.set_value(&cell, SheetValue::from(value)),
            };
            written.map_err(|e| match e.kind() {
                ErrorKind::Internal => e,
                ErrorKind::InvalidArgument => SheetError::CellWrite {
                    cell: cell.clone(),
                    message: e.to_string(),
                },
            })?;
            outcome.cells_written += 1;
        }
    }

    Ok(outcome)
}

/// Collaborator failures after validation are never the caller's fault
fn as_internal(err: SheetError, wrap: fn(String) -> SheetError) -> SheetError {
    match err.kind() {
        ErrorKind::Internal => err,
        ErrorKind::InvalidArgument => wrap(err.to_string()),
    }
}
