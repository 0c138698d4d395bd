//! Read-back of sheet contents and workbook layout

use crate::error::{SheetError, SheetResult};
use crate::excel::{
    render_formula_table, render_values_table, CellRange, SheetGuard, Workbook, Worksheet,
    XlsxWorkbook,
};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

/// Cells rendered per read unless configured otherwise
pub const DEFAULT_PAGING_CELLS_LIMIT: usize = 4000;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadRequest {
    pub file_absolute_path: PathBuf,
    pub sheet_name: String,
    /// Defaults to the sheet's used range
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub show_formula: bool,
}

#[derive(Debug, Clone)]
pub struct ReadReport {
    pub table: String,
    pub backend: String,
    pub sheet_name: String,
    pub range: CellRange,
}

impl fmt::Display for ReadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "<h2>Read Sheet</h2>")?;
        writeln!(f, "{}", self.table)?;
        writeln!(f, "<h2>Metadata</h2>")?;
        writeln!(f, "<ul>")?;
        writeln!(f, "<li>backend: {}</li>", self.backend)?;
        writeln!(f, "<li>sheet name: {}</li>", self.sheet_name)?;
        writeln!(f, "<li>read range: {}</li>", self.range)?;
        writeln!(f, "</ul>")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetSummary {
    pub name: String,
    /// `None` for a blank sheet
    pub used_range: Option<CellRange>,
}

#[derive(Debug, Clone)]
pub struct WorkbookSummary {
    pub backend: String,
    pub sheets: Vec<SheetSummary>,
}

impl fmt::Display for WorkbookSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "<h2>Sheets</h2>")?;
        writeln!(f, "<ul>")?;
        for sheet in &self.sheets {
            match &sheet.used_range {
                Some(range) => writeln!(f, "<li>{}: used range {}</li>", sheet.name, range)?,
                None => writeln!(f, "<li>{}: empty</li>", sheet.name)?,
            }
        }
        writeln!(f, "</ul>")?;
        writeln!(f, "<h2>Metadata</h2>")?;
        writeln!(f, "<ul>")?;
        writeln!(f, "<li>backend: {}</li>", self.backend)?;
        writeln!(f, "</ul>")
    }
}

fn require_existing(path: &Path) -> SheetResult<()> {
    if path.is_absolute() && !path.exists() {
        return Err(SheetError::InvalidArgument(format!(
            "file not found: {}",
            path.display()
        )));
    }
    Ok(())
}

pub fn read_from_file(request: &ReadRequest, cells_limit: usize) -> SheetResult<ReadReport> {
    require_existing(&request.file_absolute_path)?;
    let mut workbook = XlsxWorkbook::open(&request.file_absolute_path)?;
    read_sheet(&mut workbook, request, cells_limit)
}

/// Render a range of one sheet, refusing ranges above `cells_limit`
pub fn read_sheet<W: Workbook>(
    workbook: &mut W,
    request: &ReadRequest,
    cells_limit: usize,
) -> SheetResult<ReadReport> {
    let requested = request.range.as_deref().map(CellRange::parse).transpose()?;
    let sheet = SheetGuard::new(workbook.find_sheet(&request.sheet_name)?);

    let range = match requested {
        Some(range) => range,
        None => sheet
            .used_range()?
            .map_or_else(|| CellRange::new(1, 1, 1, 1), Ok)?,
    };

    if range.cell_count() > cells_limit {
        return Err(SheetError::InvalidArgument(format!(
            "range {} has {} cells, more than the limit of {}; request a smaller range",
            range,
            range.cell_count(),
            cells_limit
        )));
    }

    let table = if request.show_formula {
        render_formula_table(&*sheet, &range)?
    } else {
        render_values_table(&*sheet, &range)?
    };

    info!(sheet = %request.sheet_name, range = %range, "sheet read");
    Ok(ReadReport {
        table,
        backend: workbook.backend_name().to_string(),
        sheet_name: sheet.name().to_string(),
        range,
    })
}

pub fn describe_file(path: &Path) -> SheetResult<WorkbookSummary> {
    require_existing(path)?;
    let mut workbook = XlsxWorkbook::open(path)?;
    describe_sheets(&mut workbook)
}

/// Every sheet in workbook order with its used range
pub fn describe_sheets<W: Workbook>(workbook: &mut W) -> SheetResult<WorkbookSummary> {
    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let sheet = SheetGuard::new(workbook.find_sheet(&name)?);
        sheets.push(SheetSummary {
            used_range: sheet.used_range()?,
            name,
        });
    }
    Ok(WorkbookSummary {
        backend: workbook.backend_name().to_string(),
        sheets,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::excel::SheetValue;
    use tempfile::TempDir;

    fn sample(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("sample.xlsx");
        let mut book = XlsxWorkbook::open(&path).unwrap();
        book.create_sheet("Data").unwrap();
        book.create_sheet("Blank").unwrap();
        {
            let mut sheet = book.find_sheet("Data").unwrap();
            sheet.set_value("B2", SheetValue::Number(2.0)).unwrap();
            sheet.set_formula("C3", "=B2*2").unwrap();
        }
        book.save().unwrap();
        path
    }

    fn request(path: &Path, range: Option<&str>, show_formula: bool) -> ReadRequest {
        ReadRequest {
            file_absolute_path: path.to_path_buf(),
            sheet_name: "Data".to_string(),
            range: range.map(String::from),
            show_formula,
        }
    }

    #[test]
    fn test_read_defaults_to_used_range() {
        let dir = TempDir::new().unwrap();
        let path = sample(&dir);
        let report = read_from_file(&request(&path, None, false), 100).unwrap();
        assert_eq!(report.range.to_string(), "B2:C3");
        assert!(report.table.contains("<td>2</td>"));
        assert!(report.to_string().contains("<li>read range: B2:C3</li>"));
    }

    #[test]
    fn test_read_with_formulas() {
        let dir = TempDir::new().unwrap();
        let path = sample(&dir);
        let report = read_from_file(&request(&path, Some("A1:C3"), true), 100).unwrap();
        assert!(report.table.contains("<td>=B2*2</td>"));
    }

    #[test]
    fn test_read_limit() {
        let dir = TempDir::new().unwrap();
        let path = sample(&dir);
        let err = read_from_file(&request(&path, Some("A1:J10"), false), 50).unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(err.to_string().contains("100 cells"));
    }

    #[test]
    fn test_read_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope.xlsx");
        let err = read_from_file(&request(&path, None, false), 100).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_describe_sheets() {
        let dir = TempDir::new().unwrap();
        let path = sample(&dir);
        let summary = describe_file(&path).unwrap();
        assert_eq!(
            summary.sheets,
            vec![
                SheetSummary {
                    name: "Data".to_string(),
                    used_range: Some(CellRange::parse("B2:C3").unwrap()),
                },
                SheetSummary {
                    name: "Blank".to_string(),
                    used_range: None,
                },
            ]
        );
        let text = summary.to_string();
        assert!(text.contains("<li>Data: used range B2:C3</li>"));
        assert!(text.contains("<li>Blank: empty</li>"));
    }
}
