//! Excel workbook access
//!
//! - `range`: A1 addresses and `A1:C10` ranges
//! - `workbook`: the workbook/worksheet contract and scoped sheet handles
//! - `xlsx`: .xlsx backend (umya-spreadsheet, edited in place)
//! - `html`: value and formula tables for reports

pub mod html;
pub mod range;
pub mod workbook;
pub mod xlsx;

pub use html::{render_formula_table, render_values_table};
pub use range::{cell_name, column_number_to_letter, parse_cell_name, CellRange};
pub use workbook::{SheetGuard, SheetValue, Workbook, Worksheet};
pub use xlsx::{XlsxSheet, XlsxWorkbook};
