//! File-backed workbook on umya-spreadsheet
//!
//! The package is loaded whole and edited in place: cells a request does not
//! touch keep their values, and the workbook keeps its styles, merged ranges,
//! defined names and other parts. `save` writes a sibling temp file and
//! renames it over the target, so a failed save never leaves a half-written
//! workbook behind.

use super::range::{parse_cell_name, CellRange};
use super::workbook::{SheetValue, Workbook, Worksheet};
use crate::error::{SheetError, SheetResult};
use chrono::{Datelike, NaiveDateTime, NaiveTime, Timelike};
use rust_xlsxwriter::ExcelDateTime;
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, info};
use umya_spreadsheet::{Cell, Spreadsheet};

pub const BACKEND_NAME: &str = "umya-spreadsheet";

const MAX_SHEET_NAME_LEN: usize = 31;
const INVALID_SHEET_NAME_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];
const DATE_FORMAT: &str = "yyyy-mm-dd";
const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// An .xlsx workbook held in memory
pub struct XlsxWorkbook {
    path: PathBuf,
    book: Rc<RefCell<Spreadsheet>>,
}

impl XlsxWorkbook {
    /// Open `path`, or start an empty workbook if it does not exist yet
    pub fn open<P: AsRef<Path>>(path: P) -> SheetResult<Self> {
        let path = path.as_ref();
        check_path(path)?;

        let book = if path.exists() {
            let book = umya_spreadsheet::reader::xlsx::read(path)
                .map_err(|e| SheetError::Open(format!("{}: {}", path.display(), e)))?;
            info!(
                path = %path.display(),
                sheets = book.get_sheet_collection().len(),
                "opened workbook"
            );
            book
        } else {
            debug!(path = %path.display(), "workbook does not exist, starting empty");
            umya_spreadsheet::new_file_empty_worksheet()
        };

        Ok(Self {
            path: path.to_path_buf(),
            book: Rc::new(RefCell::new(book)),
        })
    }

    /// Stored spelling of a sheet name, matched case-insensitively
    fn stored_name(&self, name: &str) -> Option<String> {
        self.book
            .borrow()
            .get_sheet_collection()
            .iter()
            .map(|sheet| sheet.get_name())
            .find(|stored| stored.eq_ignore_ascii_case(name))
            .map(str::to_string)
    }
}

impl Workbook for XlsxWorkbook {
    type Sheet = XlsxSheet;

    fn backend_name(&self) -> &str {
        BACKEND_NAME
    }

    fn sheet_names(&self) -> Vec<String> {
        self.book
            .borrow()
            .get_sheet_collection()
            .iter()
            .map(|sheet| sheet.get_name().to_string())
            .collect()
    }

    fn create_sheet(&mut self, name: &str) -> SheetResult<()> {
        validate_sheet_name(name)?;
        if self.stored_name(name).is_some() {
            return Err(SheetError::SheetCreate(format!(
                "sheet '{}' already exists",
                name
            )));
        }
        self.book
            .borrow_mut()
            .new_sheet(name)
            .map(|_| ())
            .map_err(|e| SheetError::SheetCreate(format!("{}: {}", name, e)))?;
        debug!(sheet = name, "created sheet");
        Ok(())
    }

    fn find_sheet(&mut self, name: &str) -> SheetResult<XlsxSheet> {
        let name = self
            .stored_name(name)
            .ok_or_else(|| SheetError::SheetNotFound(name.to_string()))?;
        Ok(XlsxSheet {
            name,
            book: Rc::clone(&self.book),
            released: false,
        })
    }

    fn save(&mut self) -> SheetResult<()> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let tmp = tempfile::Builder::new()
            .prefix(".sheetforge-")
            .suffix(".xlsx")
            .tempfile_in(dir)
            .map_err(|e| SheetError::Save(format!("{}: {}", dir.display(), e)))?;

        umya_spreadsheet::writer::xlsx::write(&*self.book.borrow(), tmp.path())
            .map_err(|e| SheetError::Save(e.to_string()))?;

        // The temp file is created 0600; an existing workbook keeps its mode.
        if let Ok(metadata) = fs::metadata(&self.path) {
            fs::set_permissions(tmp.path(), metadata.permissions())
                .map_err(|e| SheetError::Save(format!("{}: {}", self.path.display(), e)))?;
        }

        tmp.persist(&self.path)
            .map_err(|e| SheetError::Save(format!("{}: {}", self.path.display(), e)))?;

        info!(path = %self.path.display(), "saved workbook");
        Ok(())
    }
}

/// Handle to one sheet of an [`XlsxWorkbook`]
pub struct XlsxSheet {
    name: String,
    book: Rc<RefCell<Spreadsheet>>,
    released: bool,
}

impl XlsxSheet {
    fn ensure_live(&self) -> Result<(), String> {
        if self.released {
            Err(format!("worksheet handle '{}' already released", self.name))
        } else {
            Ok(())
        }
    }

    fn read<R>(&self, f: impl FnOnce(&umya_spreadsheet::Worksheet) -> R) -> SheetResult<R> {
        self.ensure_live().map_err(SheetError::Render)?;
        let book = self.book.borrow();
        let sheet = book
            .get_sheet_by_name(&self.name)
            .ok_or_else(|| SheetError::SheetNotFound(self.name.clone()))?;
        Ok(f(sheet))
    }

    fn edit<R>(
        &mut self,
        cell: &str,
        f: impl FnOnce(&mut umya_spreadsheet::Worksheet) -> R,
    ) -> SheetResult<R> {
        self.ensure_live().map_err(|message| SheetError::CellWrite {
            cell: cell.to_string(),
            message,
        })?;
        let mut book = self.book.borrow_mut();
        let sheet = book
            .get_sheet_by_name_mut(&self.name)
            .ok_or_else(|| SheetError::SheetNotFound(self.name.clone()))?;
        Ok(f(sheet))
    }
}

impl Worksheet for XlsxSheet {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_value(&mut self, cell: &str, value: SheetValue) -> SheetResult<()> {
        let coordinate = parse_cell_name(cell)?;
        let text = value.to_string();
        self.edit(cell, |sheet| {
            let target = reset_cell(sheet, coordinate);
            match value {
                SheetValue::Empty => {}
                SheetValue::Text(s) => {
                    target.set_value_string(s);
                }
                SheetValue::Number(n) => {
                    target.set_value_number(n);
                }
                SheetValue::Bool(b) => {
                    target.set_value_bool(b);
                }
                SheetValue::Date(d) => {
                    write_timestamp(target, d.and_time(NaiveTime::MIN), DATE_FORMAT, text)
                }
                SheetValue::DateTime(dt) => write_timestamp(target, dt, DATETIME_FORMAT, text),
            }
        })
    }

    fn set_formula(&mut self, cell: &str, formula: &str) -> SheetResult<()> {
        let coordinate = parse_cell_name(cell)?;
        let body = formula.strip_prefix('=').unwrap_or(formula).to_string();
        // No cached result: readers show the cell blank until Excel recalculates.
        self.edit(cell, |sheet| {
            reset_cell(sheet, coordinate).set_formula(body);
        })
    }

    fn value(&self, cell: &str) -> SheetResult<String> {
        let coordinate = parse_cell_name(cell)?;
        self.read(|sheet| {
            sheet
                .get_cell(coordinate)
                .map(|c| read_value(c).to_string())
                .unwrap_or_default()
        })
    }

    fn formula(&self, cell: &str) -> SheetResult<Option<String>> {
        let coordinate = parse_cell_name(cell)?;
        self.read(|sheet| {
            sheet
                .get_cell(coordinate)
                .map(|c| c.get_formula().to_string())
                .filter(|f| !f.is_empty())
                .map(|f| format!("={}", f))
        })
    }

    fn used_range(&self) -> SheetResult<Option<CellRange>> {
        let bounds = self.read(|sheet| {
            let mut bounds: Option<(u32, u32, u32, u32)> = None;
            for cell in sheet.get_cell_collection() {
                if cell.get_value().is_empty() && cell.get_formula().is_empty() {
                    continue;
                }
                let col: u32 = cell.get_coordinate().get_col_num().to_owned();
                let row: u32 = cell.get_coordinate().get_row_num().to_owned();
                bounds = Some(match bounds {
                    None => (col, row, col, row),
                    Some((c0, r0, c1, r1)) => {
                        (c0.min(col), r0.min(row), c1.max(col), r1.max(row))
                    }
                });
            }
            bounds
        })?;
        bounds
            .map(|(c0, r0, c1, r1)| CellRange::new(c0, r0, c1, r1))
            .transpose()
    }

    fn release(&mut self) {
        self.released = true;
    }
}

/// Drop a cell's contents but keep its style, and hand back the fresh cell
fn reset_cell(sheet: &mut umya_spreadsheet::Worksheet, coordinate: (u32, u32)) -> &mut Cell {
    let style = sheet.get_cell(coordinate).map(|c| c.get_style().clone());
    sheet.remove_cell(coordinate);
    let cell = sheet.get_cell_mut(coordinate);
    if let Some(style) = style {
        cell.set_style(style);
    }
    cell
}

/// Dates Excel can hold become serials with a date format; earlier ones
/// are kept as text
fn write_timestamp(cell: &mut Cell, dt: NaiveDateTime, format: &str, text: String) {
    match datetime_to_serial(dt) {
        Some(serial) => {
            cell.set_value_number(serial);
            cell.get_style_mut()
                .get_number_format_mut()
                .set_format_code(format);
        }
        None => {
            cell.set_value_string(text);
        }
    }
}

fn read_value(cell: &Cell) -> SheetValue {
    let raw = cell.get_value();
    if raw.is_empty() {
        return SheetValue::Empty;
    }
    match cell.get_value_number() {
        Some(n) if has_date_format(cell) => serial_to_value(n),
        Some(n) => SheetValue::Number(n),
        None => SheetValue::Text(raw.to_string()),
    }
}

fn has_date_format(cell: &Cell) -> bool {
    cell.get_style()
        .get_number_format()
        .map(|nf| is_date_format(nf.get_format_code()))
        .unwrap_or(false)
}

/// A number format shows a date when, outside quoted text and `[...]`
/// sections, it uses a year, day or hour token
fn is_date_format(code: &str) -> bool {
    let mut in_quotes = false;
    let mut in_brackets = false;
    for c in code.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            '[' if !in_quotes => in_brackets = true,
            ']' if !in_quotes => in_brackets = false,
            _ if in_quotes || in_brackets => {}
            'y' | 'Y' | 'd' | 'D' | 'h' | 'H' => return true,
            _ => {}
        }
    }
    false
}

fn check_path(path: &Path) -> SheetResult<()> {
    if !path.is_absolute() {
        return Err(SheetError::InvalidArgument(format!(
            "file path must be absolute: {}",
            path.display()
        )));
    }
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match extension.as_deref() {
        Some("xlsx") => Ok(()),
        _ => Err(SheetError::InvalidArgument(format!(
            "unsupported file type (expected .xlsx): {}",
            path.display()
        ))),
    }
}

fn validate_sheet_name(name: &str) -> SheetResult<()> {
    if name.trim().is_empty() {
        return Err(SheetError::SheetCreate("sheet name is empty".to_string()));
    }
    if name.chars().count() > MAX_SHEET_NAME_LEN {
        return Err(SheetError::SheetCreate(format!(
            "sheet name '{}' is longer than {} characters",
            name, MAX_SHEET_NAME_LEN
        )));
    }
    if let Some(c) = name.chars().find(|c| INVALID_SHEET_NAME_CHARS.contains(c)) {
        return Err(SheetError::SheetCreate(format!(
            "sheet name '{}' contains '{}'",
            name, c
        )));
    }
    if name.starts_with('\'') || name.ends_with('\'') {
        return Err(SheetError::SheetCreate(format!(
            "sheet name '{}' cannot start or end with an apostrophe",
            name
        )));
    }
    Ok(())
}

/// Excel serial number in the 1900 date system, `None` outside 1900-9999
pub fn datetime_to_serial(dt: NaiveDateTime) -> Option<f64> {
    let year = u16::try_from(dt.year()).ok()?;
    ExcelDateTime::from_ymd(year, dt.month() as u8, dt.day() as u8)
        .and_then(|date| date.and_hms(dt.hour() as u16, dt.minute() as u8, dt.second()))
        .map(|date| date.to_excel())
        .ok()
}

/// Whole serials become dates, fractional ones date-times
pub fn serial_to_value(serial: f64) -> SheetValue {
    let datetime =
        calamine::ExcelDateTime::new(serial, calamine::ExcelDateTimeType::DateTime, false)
            .as_datetime();
    match datetime {
        Some(dt) if dt.time() == NaiveTime::MIN => SheetValue::Date(dt.date()),
        Some(dt) => SheetValue::DateTime(dt),
        None => SheetValue::Number(serial),
    }
}
