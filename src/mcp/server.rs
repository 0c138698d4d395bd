//! Sheetforge MCP Server implementation
//!
//! Provides the MCP server that AI agents use to write and read Excel sheets.
//! Implements the Model Context Protocol over stdin/stdout using JSON-RPC.

use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::core::{describe_file, read_from_file, write_to_file, ReadRequest};
use crate::error::{SheetError, SheetResult};
use crate::types::WriteRequest;

pub const WRITE_TOOL: &str = "excel_write_to_sheet";
pub const READ_TOOL: &str = "excel_read_sheet";
pub const DESCRIBE_TOOL: &str = "excel_describe_sheets";

const PARSE_ERROR: i32 = -32700;
const METHOD_NOT_FOUND: i32 = -32601;
const INTERNAL_ERROR: i32 = -32603;

/// JSON-RPC request
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    #[allow(dead_code)]
    jsonrpc: String,
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Value,
}

/// JSON-RPC response
#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    jsonrpc: String,
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    fn result(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    fn error(id: Value, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// JSON-RPC error
#[derive(Debug, Serialize)]
struct JsonRpcError {
    code: i32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

/// MCP Tool definition
#[derive(Debug, Serialize)]
struct Tool {
    name: String,
    description: String,
    #[serde(rename = "inputSchema")]
    input_schema: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DescribeArgs {
    file_absolute_path: PathBuf,
}

/// Sheetforge MCP Server
pub struct SheetforgeMcpServer {
    config: ServerConfig,
}

impl SheetforgeMcpServer {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Handle one line of input; `None` when no reply is due (notifications,
    /// blank lines)
    pub fn handle_line(&self, line: &str) -> Option<String> {
        if line.trim().is_empty() {
            return None;
        }

        let response = match serde_json::from_str::<JsonRpcRequest>(line) {
            Ok(request) => self.handle_request(&request)?,
            Err(e) => JsonRpcResponse::error(
                Value::Null,
                JsonRpcError {
                    code: PARSE_ERROR,
                    message: format!("Parse error: {}", e),
                    data: None,
                },
            ),
        };

        match serde_json::to_string(&response) {
            Ok(text) => Some(text),
            Err(e) => {
                error!(error = %e, "failed to serialize response");
                None
            }
        }
    }

    /// Handle a JSON-RPC request
    fn handle_request(&self, request: &JsonRpcRequest) -> Option<JsonRpcResponse> {
        let id = request.id.clone().unwrap_or(Value::Null);

        match request.method.as_str() {
            "initialize" => Some(JsonRpcResponse::result(
                id,
                json!({
                    "protocolVersion": "2024-11-05",
                    "capabilities": {
                        "tools": {
                            "listChanged": false
                        }
                    },
                    "serverInfo": {
                        "name": "sheetforge-mcp",
                        "version": env!("CARGO_PKG_VERSION")
                    },
                    "instructions": "Sheetforge MCP Server - write JSON value grids into Excel ranges. Strings starting with '=' are written as formulas, ISO 8601 dates (2026-02-03, 2026-02-03T10:30:00Z) as dates. Read sheets back as HTML tables."
                }),
            )),
            "notifications/initialized" => None, // No response for notifications
            "tools/list" => Some(JsonRpcResponse::result(
                id,
                json!({
                    "tools": get_tools()
                }),
            )),
            "tools/call" => {
                let tool_name = request
                    .params
                    .get("name")
                    .and_then(|v| v.as_str())
                    .unwrap_or("");
                let arguments = request
                    .params
                    .get("arguments")
                    .cloned()
                    .unwrap_or(json!({}));

                Some(match self.call_tool(tool_name, &arguments) {
                    Ok(result) => JsonRpcResponse::result(id, result),
                    Err(error) => JsonRpcResponse::error(id, error),
                })
            }
            "ping" => Some(JsonRpcResponse::result(id, json!({}))),
            _ => Some(JsonRpcResponse::error(
                id,
                JsonRpcError {
                    code: METHOD_NOT_FOUND,
                    message: format!("Method not found: {}", request.method),
                    data: None,
                },
            )),
        }
    }

    /// Call a tool by name
    ///
    /// Caller mistakes come back as a tool result with `isError`; anything
    /// else becomes a JSON-RPC internal error.
    fn call_tool(&self, name: &str, arguments: &Value) -> Result<Value, JsonRpcError> {
        info!(tool = name, "tool call");
        let outcome = match name {
            WRITE_TOOL => decode_arguments::<WriteRequest>(name, arguments)
                .and_then(|request| write_to_file(&request))
                .map(|report| report.to_string()),
            READ_TOOL => decode_arguments::<ReadRequest>(name, arguments)
                .and_then(|request| read_from_file(&request, self.config.paging_cells_limit))
                .map(|report| report.to_string()),
            DESCRIBE_TOOL => decode_arguments::<DescribeArgs>(name, arguments)
                .and_then(|args| describe_file(&args.file_absolute_path))
                .map(|summary| summary.to_string()),
            _ => return Ok(tool_text(format!("Unknown tool: {}", name), true)),
        };

        match outcome {
            Ok(text) => Ok(tool_text(text, false)),
            Err(e) if e.is_invalid_argument() => {
                warn!(tool = name, error = %e, "invalid tool arguments");
                Ok(tool_text(e.to_string(), true))
            }
            Err(e) => {
                error!(tool = name, error = %e, "tool failed");
                Err(JsonRpcError {
                    code: INTERNAL_ERROR,
                    message: e.to_string(),
                    data: None,
                })
            }
        }
    }
}

impl Default for SheetforgeMcpServer {
    fn default() -> Self {
        Self::new(ServerConfig::default())
    }
}

fn tool_text(text: String, is_error: bool) -> Value {
    json!({
        "content": [{
            "type": "text",
            "text": text
        }],
        "isError": is_error
    })
}

/// Check `arguments` against the tool's declared schema, then decode them
fn decode_arguments<T: DeserializeOwned>(tool: &str, arguments: &Value) -> SheetResult<T> {
    let schema = get_tools()
        .into_iter()
        .find(|t| t.name == tool)
        .map(|t| t.input_schema)
        .ok_or_else(|| SheetError::InvalidArgument(format!("unknown tool: {}", tool)))?;

    let compiled = jsonschema::JSONSchema::compile(&schema)
        .map_err(|e| SheetError::Schema(format!("{}: {}", tool, e)))?;
    if let Err(errors) = compiled.validate(arguments) {
        let messages: Vec<String> = errors
            .map(|e| {
                let path = e.instance_path.to_string();
                if path.is_empty() {
                    e.to_string()
                } else {
                    format!("{}: {}", path, e)
                }
            })
            .collect();
        return Err(SheetError::InvalidArgument(messages.join("; ")));
    }

    serde_json::from_value(arguments.clone()).map_err(|e| SheetError::InvalidArgument(e.to_string()))
}

/// Get all available tools
fn get_tools() -> Vec<Tool> {
    vec![
        Tool {
            name: WRITE_TOOL.to_string(),
            description: "Write values to the Excel sheet".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "fileAbsolutePath": {
                        "type": "string",
                        "description": "Absolute path to the Excel file"
                    },
                    "sheetName": {
                        "type": "string",
                        "description": "Sheet name in the Excel file"
                    },
                    "newSheet": {
                        "type": "boolean",
                        "description": "Create a new sheet if true, otherwise write to the existing sheet",
                        "default": false
                    },
                    "range": {
                        "type": "string",
                        "description": "Range of cells in the Excel sheet (e.g., \"A1:C10\")"
                    },
                    "values": {
                        "type": "array",
                        "description": "Values to write to the Excel sheet. If the value is a formula, it should start with \"=\"",
                        "items": {
                            "type": "array",
                            "items": {
                                "anyOf": [
                                    { "type": "string" },
                                    { "type": "number" },
                                    { "type": "boolean" },
                                    { "type": "null" }
                                ]
                            }
                        }
                    }
                },
                "required": ["fileAbsolutePath", "sheetName", "newSheet", "range", "values"]
            }),
        },
        Tool {
            name: READ_TOOL.to_string(),
            description: "Read values from the Excel sheet as an HTML table".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "fileAbsolutePath": {
                        "type": "string",
                        "description": "Absolute path to the Excel file"
                    },
                    "sheetName": {
                        "type": "string",
                        "description": "Sheet name in the Excel file"
                    },
                    "range": {
                        "type": "string",
                        "description": "Range of cells to read (e.g., \"A1:C10\"). Defaults to the used range of the sheet"
                    },
                    "showFormula": {
                        "type": "boolean",
                        "description": "Show formulas instead of values",
                        "default": false
                    }
                },
                "required": ["fileAbsolutePath", "sheetName"]
            }),
        },
        Tool {
            name: DESCRIBE_TOOL.to_string(),
            description: "List all sheets in the Excel file with their used ranges".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "fileAbsolutePath": {
                        "type": "string",
                        "description": "Absolute path to the Excel file"
                    }
                },
                "required": ["fileAbsolutePath"]
            }),
        },
    ]
}

/// Run the MCP server synchronously over stdin/stdout
///
/// Reads until EOF, so it is not unit tested; request handling is covered
/// through `SheetforgeMcpServer::handle_line`.
#[cfg(not(coverage))]
pub fn run_mcp_server_sync(config: ServerConfig) {
    crate::config::init_logging(&config.log_filter);
    info!(
        version = env!("CARGO_PKG_VERSION"),
        paging_cells_limit = config.paging_cells_limit,
        "sheetforge MCP server starting on stdio"
    );

    let server = SheetforgeMcpServer::new(config);
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    let reader = BufReader::new(stdin.lock());

    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                error!(error = %e, "stdin closed with error");
                break;
            }
        };

        if let Some(response) = server.handle_line(&line) {
            let _ = writeln!(stdout, "{}", response);
            let _ = stdout.flush();
        }
    }

    info!("sheetforge MCP server stopped");
}

/// Stub for coverage builds
#[cfg(coverage)]
pub fn run_mcp_server_sync(_config: ServerConfig) {}
