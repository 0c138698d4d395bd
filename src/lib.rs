//! Sheetforge - write JSON value grids into Excel ranges
//!
//! A caller supplies a workbook path, a sheet name, an A1-style range and a
//! 2-D grid of JSON scalars. Each cell is classified as a formula (`=...`),
//! an ISO 8601 date, or a literal, checked against the range shape, written
//! in row-major order, saved, and echoed back as an HTML table.
//!
//! # Example
//!
//! ```no_run
//! use sheetforge::core::write_to_file;
//! use sheetforge::types::{CellValue, WriteRequest};
//!
//! let request = WriteRequest {
//!     file_absolute_path: "/tmp/book.xlsx".into(),
//!     sheet_name: "Data".to_string(),
//!     new_sheet: true,
//!     range: "A1:B2".to_string(),
//!     values: vec![
//!         vec![CellValue::from("Name"), CellValue::from("Age")],
//!         vec![CellValue::from("Alice"), CellValue::from(30i64)],
//!     ],
//! };
//! let report = write_to_file(&request)?;
//! println!("{}", report);
//! # Ok::<(), sheetforge::error::SheetError>(())
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod excel;
pub mod mcp;
pub mod types;

// Re-export commonly used types
pub use error::{ErrorKind, SheetError, SheetResult};
pub use types::{CellValue, ClassifiedValue, Timestamp, ValueGrid, WriteOutcome, WriteRequest};
