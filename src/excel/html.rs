//! HTML tables of a worksheet range

use super::range::{cell_name, column_number_to_letter, CellRange};
use super::workbook::Worksheet;
use crate::error::{SheetError, SheetResult};

/// Values as the workbook displays them
pub fn render_values_table<S: Worksheet + ?Sized>(
    worksheet: &S,
    range: &CellRange,
) -> SheetResult<String> {
    render_table(worksheet, range, |sheet, cell| sheet.value(cell))
}

/// Formulas where a cell has one, values elsewhere
pub fn render_formula_table<S: Worksheet + ?Sized>(
    worksheet: &S,
    range: &CellRange,
) -> SheetResult<String> {
    render_table(worksheet, range, |sheet, cell| match sheet.formula(cell)? {
        Some(formula) => Ok(formula),
        None => sheet.value(cell),
    })
}

fn render_table<S, F>(worksheet: &S, range: &CellRange, cell_text: F) -> SheetResult<String>
where
    S: Worksheet + ?Sized,
    F: Fn(&S, &str) -> SheetResult<String>,
{
    let mut out = String::from("<table>\n<tr><th></th>");
    for col in range.columns() {
        out.push_str(&format!("<th>{}</th>", column_number_to_letter(col)));
    }
    out.push_str("</tr>\n");

    for row in range.rows() {
        out.push_str(&format!("<tr><th>{}</th>", row));
        for col in range.columns() {
            let cell = cell_name(col, row).map_err(|e| SheetError::Render(e.to_string()))?;
            let text = cell_text(worksheet, &cell)?;
            out.push_str(&format!("<td>{}</td>", escape_html(&text)));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</table>");
    Ok(out)
}

pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
