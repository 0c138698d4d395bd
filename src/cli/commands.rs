use crate::core::{describe_file, read_from_file, write_to_file, ReadRequest};
use crate::error::{SheetError, SheetResult};
use crate::types::{ValueGrid, WriteRequest};
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

/// Where the grid for `write` comes from
#[derive(Debug, Clone)]
pub enum ValuesSource {
    Inline(String),
    File(PathBuf),
}

/// Resolve `path` against the working directory; the workbook layer only
/// accepts absolute paths
fn absolute(path: PathBuf) -> SheetResult<PathBuf> {
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

fn load_values(source: &ValuesSource) -> SheetResult<ValueGrid> {
    let (text, origin) = match source {
        ValuesSource::Inline(text) => (text.clone(), "--values".to_string()),
        ValuesSource::File(path) => (fs::read_to_string(path)?, path.display().to_string()),
    };
    serde_json::from_str(&text).map_err(|e| {
        SheetError::InvalidArgument(format!(
            "{} must be a JSON array of rows: {}",
            origin, e
        ))
    })
}

/// Execute the write command
pub fn write(
    file: PathBuf,
    sheet: String,
    range: String,
    values: ValuesSource,
    new_sheet: bool,
) -> SheetResult<()> {
    let file = absolute(file)?;
    println!("{}", "📝 Sheetforge - Writing values".bold().green());
    println!("   File:  {}", file.display());
    println!("   Sheet: {}", sheet.bright_blue().bold());
    println!("   Range: {}", range.cyan());
    println!();

    let request = WriteRequest {
        file_absolute_path: file,
        sheet_name: sheet,
        new_sheet,
        range,
        values: load_values(&values)?,
    };
    let report = write_to_file(&request)?;

    let mode = if report.formula_mode {
        "formulas"
    } else {
        "values"
    };
    println!(
        "{}",
        format!("✅ Wrote {} cells (showing {})", report.outcome.cells_written, mode)
            .bold()
            .green()
    );
    println!("{}", report.table);
    print_backend(&report.backend);
    Ok(())
}

/// Execute the read command
pub fn read(
    file: PathBuf,
    sheet: String,
    range: Option<String>,
    formulas: bool,
    cells_limit: usize,
) -> SheetResult<()> {
    let file = absolute(file)?;
    println!("{}", "📖 Sheetforge - Reading sheet".bold().green());
    println!("   File:  {}", file.display());
    println!("   Sheet: {}", sheet.bright_blue().bold());
    println!();

    let report = read_from_file(
        &ReadRequest {
            file_absolute_path: file,
            sheet_name: sheet,
            range,
            show_formula: formulas,
        },
        cells_limit,
    )?;

    println!("   Range: {}", report.range.to_string().cyan());
    println!("{}", report.table);
    print_backend(&report.backend);
    Ok(())
}

/// Execute the sheets command
pub fn sheets(file: PathBuf) -> SheetResult<()> {
    let file = absolute(file)?;
    println!("{}", "📋 Sheetforge - Sheets".bold().green());
    println!("   File: {}", file.display());
    println!();

    let summary = describe_file(&file)?;
    for sheet in &summary.sheets {
        match &sheet.used_range {
            Some(range) => println!(
                "   {} {}",
                sheet.name.bright_blue().bold(),
                range.to_string().cyan()
            ),
            None => println!("   {} {}", sheet.name.bright_blue().bold(), "(empty)".dimmed()),
        }
    }
    if summary.sheets.is_empty() {
        println!("   {}", "(no sheets)".dimmed());
    }
    println!();
    print_backend(&summary.backend);
    Ok(())
}

fn print_backend(backend: &str) {
    println!("   Backend: {}", backend.dimmed());
}
