//! Stdio server module
//!
//! Line-delimited JSON-RPC 2.0 over stdin/stdout exposing the `match` and
//! `filter` tools.

use crate::config::Config;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader as AsyncBufReader};
use tracing::{debug, error, info};

/// Server context shared by all requests of a session
#[derive(Clone)]
pub struct ServerContext {
    pub config: Config,
    pub client_info: Option<ClientInfo>,
}

impl ServerContext {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            client_info: None,
        }
    }

    pub fn get_client_name(&self) -> String {
        self.client_info
            .as_ref()
            .and_then(|info| info.name.as_ref())
            .cloned()
            .unwrap_or_else(|| "Unknown Client".to_string())
    }
}

/// JSON-RPC 2.0 request structure
#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    #[allow(dead_code)]
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub method: String,
    pub params: Option<Value>,
}

/// Initialize request parameters
#[derive(Debug, Deserialize)]
pub struct InitializeParams {
    #[serde(rename = "clientInfo")]
    pub client_info: Option<ClientInfo>,
}

/// Client information
#[derive(Debug, Deserialize, Clone)]
pub struct ClientInfo {
    pub name: Option<String>,
    #[allow(dead_code)]
    pub version: Option<String>,
}

/// JSON-RPC 2.0 response structure
#[derive(Debug, Serialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

/// Error structure
#[derive(Debug, Serialize)]
pub struct RpcError {
    pub code: String,
    pub message: String,
}

/// Tool call arguments
#[derive(Debug, Deserialize)]
pub struct ToolCallArgs {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

/// Content item
#[derive(Debug, Serialize)]
pub struct ContentItem {
    pub r#type: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// Tool result
#[derive(Debug, Serialize)]
pub struct ToolResult {
    pub content: Vec<ContentItem>,
}

impl RpcResponse {
    /// Create a successful response
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response
    pub fn error(id: Option<Value>, code: &str, message: &str) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(RpcError {
                code: code.to_string(),
                message: message.to_string(),
            }),
        }
    }

    /// Wrap a tool result, reporting serialization failures as internal errors
    pub fn from_tool_result(id: Option<Value>, content: &ToolResult) -> Self {
        match serde_json::to_value(content) {
            Ok(value) => Self::success(id, value),
            Err(e) => Self::error(id, "internal_error", &format!("Failed to encode result: {}", e)),
        }
    }
}

impl ToolResult {
    /// Create a result from explicit content items
    pub fn from_items(content: Vec<ContentItem>) -> Self {
        Self { content }
    }
}

impl ContentItem {
    /// Text content with structured metadata attached
    pub fn with_metadata(content: impl Into<String>, metadata: Value) -> Self {
        Self {
            r#type: "text".to_string(),
            text: content.into(),
            metadata: Some(metadata),
        }
    }
}

/// Parse request from JSON string
pub fn parse_request(json: &str) -> Result<RpcRequest> {
    let request: RpcRequest = serde_json::from_str(json)?;
    Ok(request)
}

/// Serialize response to JSON string
pub fn serialize_response(response: &RpcResponse) -> Result<String> {
    Ok(serde_json::to_string(response)?)
}

/// Handle stdio communication
pub async fn handle_stdio(config: Config) -> Result<()> {
    info!("Starting fuzzyfind server on stdio");

    let stdin = AsyncBufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();

    serve(stdin, stdout, config).await
}

/// Serve requests line by line until the reader is exhausted
pub async fn serve<R, W>(mut reader: R, mut writer: W, config: Config) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut context = ServerContext::new(config);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }

        let response = match std::str::from_utf8(&buf) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => {
                debug!("Received request: {}", line.trim_end());
                match parse_request(line) {
                    Ok(request) => handle_request(request, &mut context).await,
                    Err(e) => {
                        error!("Failed to parse request: {}", e);
                        RpcResponse::error(None, "parse_error", &format!("Invalid JSON: {}", e))
                    }
                }
            }
            Err(e) => {
                error!("Request is not valid UTF-8: {}", e);
                RpcResponse::error(None, "parse_error", &format!("Invalid UTF-8: {}", e))
            }
        };

        let response_json = serialize_response(&response)?;
        debug!("Sending response: {}", response_json);

        writer.write_all(response_json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }

    info!("Input closed, stopping server");
    Ok(())
}

/// Handle a single request
pub async fn handle_request(request: RpcRequest, context: &mut ServerContext) -> RpcResponse {
    match request.method.as_str() {
        "initialize" => handle_initialize(request, context).await,
        "tools/call" => handle_tool_call(request, context).await,
        "tools/list" => handle_tools_list(request).await,
        _ => RpcResponse::error(
            request.id,
            "method_not_found",
            &format!("Method '{}' not found", request.method),
        ),
    }
}

/// Handle tools/call method
async fn handle_tool_call(request: RpcRequest, context: &ServerContext) -> RpcResponse {
    let args: ToolCallArgs = match serde_json::from_value(request.params.unwrap_or_default()) {
        Ok(args) => args,
        Err(e) => {
            return RpcResponse::error(
                request.id.clone(),
                "invalid_params",
                &format!("Invalid parameters: {}", e),
            )
        }
    };

    match args.name.as_str() {
        "match" => crate::tools::score::handle_match(request.id, args.arguments, context).await,
        "filter" => crate::tools::filter::handle_filter(request.id, args.arguments, context).await,
        _ => RpcResponse::error(
            request.id,
            "tool_not_found",
            &format!("Tool '{}' not found", args.name),
        ),
    }
}

/// Handle tools/list method
async fn handle_tools_list(request: RpcRequest) -> RpcResponse {
    let tools = build_tools_array();

    RpcResponse::success(request.id, serde_json::json!({ "tools": tools }))
}

/// Handle initialize method
async fn handle_initialize(request: RpcRequest, context: &mut ServerContext) -> RpcResponse {
    if let Some(params) = request.params {
        if let Ok(init_params) = serde_json::from_value::<InitializeParams>(params) {
            context.client_info = init_params.client_info;
            info!("Client connected: {}", context.get_client_name());
        }
    }

    let tools = build_tools_array();
    let result = serde_json::json!({
        "serverInfo": {
            "name": "fuzzyfind",
            "version": env!("CARGO_PKG_VERSION"),
        },
        "capabilities": {
            "tools": { "list": true, "call": true }
        },
        "tools": tools
    });
    RpcResponse::success(request.id, result)
}

/// Build the tools array returned from tools/list and initialize
fn build_tools_array() -> Value {
    use crate::cli::{FilterArgs, MatchArgs};
    use schemars::schema_for;

    // Generate JSON schemas from the CLI argument structs
    let match_schema = schema_for!(MatchArgs);
    let filter_schema = schema_for!(FilterArgs);

    serde_json::json!([
        {
            "name": "match",
            "description": "Test whether a query fuzzy-matches one candidate and score it",
            "inputSchema": match_schema
        },
        {
            "name": "filter",
            "description": "Rank candidate strings against a fuzzy query, best first",
            "inputSchema": filter_schema
        }
    ])
}
