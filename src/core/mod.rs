//! Grid-to-range writing: classification, shape checks, orchestration,
//! plus read-back of what a sheet holds

pub mod classifier;
pub mod grid_validator;
pub mod grid_writer;
pub mod sheet_reader;

pub use classifier::{classify, parse_iso_timestamp};
pub use grid_validator::validate_grid;
pub use grid_writer::{write_grid, write_to_file, WriteReport};
pub use sheet_reader::{
    describe_file, describe_sheets, read_from_file, read_sheet, ReadReport, ReadRequest,
    SheetSummary, WorkbookSummary, DEFAULT_PAGING_CELLS_LIMIT,
};
