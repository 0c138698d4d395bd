//! Runtime settings shared by the binaries

use crate::core::DEFAULT_PAGING_CELLS_LIMIT;

/// Tracing filter used when neither `--log-level` nor `RUST_LOG` is set
pub const DEFAULT_LOG_FILTER: &str = "sheetforge=info";

/// MCP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `tracing_subscriber::EnvFilter` directive
    pub log_filter: String,
    /// Upper bound on cells rendered by one read
    pub paging_cells_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            paging_cells_limit: DEFAULT_PAGING_CELLS_LIMIT,
        }
    }
}

/// Install a stderr tracing subscriber; stdout belongs to the protocol.
///
/// `RUST_LOG` wins over `filter` when set. Safe to call more than once.
pub fn init_logging(filter: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}
