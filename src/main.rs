use anyhow::Context;
use clap::{ArgGroup, Parser, Subcommand};
use sheetforge::cli::{self, ValuesSource};
use sheetforge::config::{init_logging, DEFAULT_LOG_FILTER};
use sheetforge::core::DEFAULT_PAGING_CELLS_LIMIT;
use sheetforge::error::SheetError;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sheetforge")]
#[command(about = "Write JSON value grids into Excel ranges")]
#[command(long_about = "Sheetforge - write JSON value grids into Excel ranges

Strings starting with '=' are written as formulas. ISO 8601 dates
(2026-02-03, 2026-02-03T10:30:00, 2026-02-03T10:30:00Z) are written as
dates. null clears a cell. Everything else is written as-is.

COMMANDS:
  write   - Write a 2-D JSON grid into a range
  read    - Print a range as an HTML table
  sheets  - List sheets with their used ranges

EXAMPLES:
  sheetforge write book.xlsx --sheet Data --range A1:B2 \\
      --values '[[\"Name\",\"Age\"],[\"Alice\",30]]' --new-sheet
  sheetforge read book.xlsx --sheet Data --formulas
  sheetforge sheets book.xlsx")]
#[command(version)]
struct Cli {
    /// Tracing filter for stderr logs (RUST_LOG takes precedence)
    #[arg(long, global = true, env = "SHEETFORGE_LOG", default_value = DEFAULT_LOG_FILTER)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Write a 2-D JSON grid into a range.

The grid must have exactly as many rows as the range and every row exactly
as many entries as the range has columns. Nothing is written when the
shape is wrong.

If any written value is a formula the printed table shows formulas,
otherwise it shows computed values.")]
    /// Write a 2-D JSON grid into a range
    #[command(group(ArgGroup::new("source").required(true).args(["values", "values_file"])))]
    Write {
        /// Path to the .xlsx file (created if missing)
        file: PathBuf,

        /// Sheet to write into
        #[arg(short, long)]
        sheet: String,

        /// Target range, e.g. A1:C10
        #[arg(short, long)]
        range: String,

        /// Grid as a JSON array of rows
        #[arg(long)]
        values: Option<String>,

        /// Read the grid from a JSON file instead
        #[arg(long)]
        values_file: Option<PathBuf>,

        /// Create the sheet before writing
        #[arg(short, long)]
        new_sheet: bool,
    },

    /// Print a range of a sheet as an HTML table
    Read {
        /// Path to the .xlsx file
        file: PathBuf,

        /// Sheet to read
        #[arg(short, long)]
        sheet: String,

        /// Range to read (defaults to the used range)
        #[arg(short, long)]
        range: Option<String>,

        /// Show formulas instead of values
        #[arg(short, long)]
        formulas: bool,

        /// Maximum number of cells to render
        #[arg(long, env = "EXCEL_MCP_PAGING_CELLS_LIMIT", default_value_t = DEFAULT_PAGING_CELLS_LIMIT)]
        paging_cells_limit: usize,
    },

    /// List sheets with their used ranges
    Sheets {
        /// Path to the .xlsx file
        file: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match cli.command {
        Commands::Write {
            file,
            sheet,
            range,
            values,
            values_file,
            new_sheet,
        } => {
            let source = match (values, values_file) {
                (Some(text), _) => ValuesSource::Inline(text),
                (None, Some(path)) => ValuesSource::File(path),
                (None, None) => {
                    return Err(SheetError::InvalidArgument(
                        "one of --values or --values-file is required".to_string(),
                    )
                    .into())
                }
            };
            let target = file.display().to_string();
            cli::write(file, sheet, range, source, new_sheet)
                .with_context(|| format!("write to {} failed", target))
        }

        Commands::Read {
            file,
            sheet,
            range,
            formulas,
            paging_cells_limit,
        } => Ok(cli::read(file, sheet, range, formulas, paging_cells_limit)?),

        Commands::Sheets { file } => Ok(cli::sheets(file)?),
    }
}
