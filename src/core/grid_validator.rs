//! Grid shape validation against a target range

use crate::error::{SheetError, SheetResult};
use crate::excel::CellRange;
use crate::types::CellValue;

/// Check that `grid` has exactly the range's rows, and each row exactly its
/// columns. Stops at the first mismatch.
pub fn validate_grid(grid: &[Vec<CellValue>], range: &CellRange) -> SheetResult<()> {
    let expected_rows = range.row_size();
    if grid.len() != expected_rows {
        return Err(SheetError::RowCountMismatch {
            expected: expected_rows,
            actual: grid.len(),
        });
    }

    let expected_cols = range.col_size();
    for (row, values) in grid.iter().enumerate() {
        if values.len() != expected_cols {
            return Err(SheetError::ColumnCountMismatch {
                row,
                expected: expected_cols,
                actual: values.len(),
            });
        }
    }

    Ok(())
}
