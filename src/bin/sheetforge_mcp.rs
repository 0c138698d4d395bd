//! Sheetforge MCP Server binary
//!
//! Run with: `sheetforge-mcp`
//!
//! Configure in MCP clients:
//! ```json
//! {
//!   "mcpServers": {
//!     "sheetforge": {
//!       "command": "sheetforge-mcp",
//!       "env": { "EXCEL_MCP_PAGING_CELLS_LIMIT": "4000" }
//!     }
//!   }
//! }
//! ```

use clap::Parser;
use sheetforge::config::{ServerConfig, DEFAULT_LOG_FILTER};
use sheetforge::core::DEFAULT_PAGING_CELLS_LIMIT;
use sheetforge::mcp::run_mcp_server_sync;

#[derive(Parser)]
#[command(name = "sheetforge-mcp")]
#[command(about = "MCP server for writing and reading Excel sheets over stdio")]
#[command(version)]
struct Args {
    /// Tracing filter for stderr logs (RUST_LOG takes precedence)
    #[arg(long, env = "SHEETFORGE_LOG", default_value = DEFAULT_LOG_FILTER)]
    log_level: String,

    /// Maximum number of cells rendered by one read
    #[arg(long, env = "EXCEL_MCP_PAGING_CELLS_LIMIT", default_value_t = DEFAULT_PAGING_CELLS_LIMIT)]
    paging_cells_limit: usize,
}

fn main() {
    let args = Args::parse();
    run_mcp_server_sync(ServerConfig {
        log_filter: args.log_level,
        paging_cells_limit: args.paging_cells_limit,
    });
}
