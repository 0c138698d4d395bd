use thiserror::Error;

pub type SheetResult<T> = Result<T, SheetError>;

/// How an error is surfaced to the caller of a tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller-correctable: bad range, wrong grid shape, unknown sheet, bad arguments
    InvalidArgument,
    /// Anything that went wrong after validation passed
    Internal,
}

#[derive(Error, Debug)]
pub enum SheetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid range: {0}")]
    InvalidRange(String),

    #[error("number of rows in data ({actual}) does not match range size ({expected})")]
    RowCountMismatch { expected: usize, actual: usize },

    #[error("number of columns in row {row} ({actual}) does not match range size ({expected})")]
    ColumnCountMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("sheet not found: {0}")]
    SheetNotFound(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("failed to open workbook: {0}")]
    Open(String),

    #[error("failed to create sheet: {0}")]
    SheetCreate(String),

    #[error("invalid cell address: {0}")]
    Address(String),

    #[error("failed to write cell {cell}: {message}")]
    CellWrite { cell: String, message: String },

    #[error("failed to save workbook: {0}")]
    Save(String),

    #[error("failed to render table: {0}")]
    Render(String),

    #[error("invalid tool schema: {0}")]
    Schema(String),
}

impl SheetError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SheetError::InvalidRange(_)
            | SheetError::RowCountMismatch { .. }
            | SheetError::ColumnCountMismatch { .. }
            | SheetError::SheetNotFound(_)
            | SheetError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            SheetError::Io(_)
            | SheetError::Json(_)
            | SheetError::Open(_)
            | SheetError::SheetCreate(_)
            | SheetError::Address(_)
            | SheetError::CellWrite { .. }
            | SheetError::Save(_)
            | SheetError::Render(_)
            | SheetError::Schema(_) => ErrorKind::Internal,
        }
    }

    pub fn is_invalid_argument(&self) -> bool {
        self.kind() == ErrorKind::InvalidArgument
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_errors_are_invalid_argument() {
        let err = SheetError::RowCountMismatch {
            expected: 2,
            actual: 1,
        };
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(
            err.to_string(),
            "number of rows in data (1) does not match range size (2)"
        );

        let err = SheetError::ColumnCountMismatch {
            row: 3,
            expected: 4,
            actual: 5,
        };
        assert!(err.is_invalid_argument());
        assert!(err.to_string().contains("row 3"));
    }

    #[test]
    fn test_write_failures_are_internal() {
        let err = SheetError::CellWrite {
            cell: "B2".to_string(),
            message: "handle released".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.to_string(), "failed to write cell B2: handle released");
        assert_eq!(SheetError::Save("disk full".into()).kind(), ErrorKind::Internal);
        assert_eq!(SheetError::SheetCreate("dup".into()).kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_sheet_not_found_is_invalid_argument() {
        let err = SheetError::SheetNotFound("Missing".to_string());
        assert!(err.is_invalid_argument());
        assert_eq!(err.to_string(), "sheet not found: Missing");
    }
}
