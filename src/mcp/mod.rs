//! Sheetforge MCP Server
//!
//! Model Context Protocol server that lets AI agents write JSON value grids
//! into Excel ranges and read sheets back.
//!
//! ## Tools
//!
//! - `excel_write_to_sheet` - Write a 2-D grid of values, formulas and dates into a range
//! - `excel_read_sheet` - Render a range (values or formulas) as an HTML table
//! - `excel_describe_sheets` - List sheets with their used ranges
//!
//! ## Usage
//!
//! Configure in your MCP client:
//! ```json
//! {
//!   "mcpServers": {
//!     "sheetforge": {
//!       "command": "sheetforge-mcp"
//!     }
//!   }
//! }
//! ```

pub mod server;

pub use server::run_mcp_server_sync;
pub use server::SheetforgeMcpServer;
