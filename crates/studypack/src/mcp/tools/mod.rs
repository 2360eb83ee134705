mod study;

use serde::{Deserialize, Serialize};

// Re-export types needed by tool handlers
pub use super::{JsonRpcError, ServerState, Tool};

// MCP Protocol types for tools
#[derive(Debug, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct ServerCapabilities {
    pub tools: Option<ToolsCapability>,
}

#[derive(Debug, Serialize)]
pub struct ToolsCapability {}

#[derive(Debug, Serialize)]
pub struct InitializeResult {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
}

#[derive(Debug, Serialize)]
pub struct ToolsList {
    pub tools: Vec<Tool>,
}

#[derive(Debug, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    pub arguments: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct CallToolResult {
    pub content: Vec<Content>,
    #[serde(rename = "isError", skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum Content {
    #[serde(rename = "text")]
    Text { text: String },
}

pub fn handle_initialize() -> Result<serde_json::Value, JsonRpcError> {
    let result = InitializeResult {
        protocol_version: "2024-11-05".to_string(),
        capabilities: ServerCapabilities {
            tools: Some(ToolsCapability {}),
        },
        server_info: ServerInfo {
            name: "studypack".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    };

    serde_json::to_value(result).map_err(|e| JsonRpcError {
        code: -32603,
        message: format!("Internal error: {e}"),
        data: None,
    })
}

fn session_id_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "string",
        "description": "Session ID returned by study_process"
    })
}

pub fn handle_tools_list() -> Result<serde_json::Value, JsonRpcError> {
    let tools = vec![
        Tool {
            name: "study_process".to_string(),
            description: "Extract the text of a PDF, split it into chapters and rank each chapter by study priority (High, Medium, Low). Stores the result and returns a sessionId for the other study_* tools, along with the ranked topics.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Path to the PDF file"
                    }
                },
                "required": ["path"]
            }),
        },
        Tool {
            name: "study_topics".to_string(),
            description: "Return the ranked topics (title, score, raw_score, weightage, snippet) of a processed document, in chapter order.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "sessionId": session_id_schema()
                },
                "required": ["sessionId"]
            }),
        },
        Tool {
            name: "study_chapters".to_string(),
            description: "Return the chapters (title and content) of a processed document.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "sessionId": session_id_schema()
                },
                "required": ["sessionId"]
            }),
        },
        Tool {
            name: "study_text".to_string(),
            description: "Return the full text of a processed document, either as extracted or after normalization.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "sessionId": session_id_schema(),
                    "clean": {
                        "type": "boolean",
                        "description": "Return the normalized text instead of the raw extraction (default: false)"
                    }
                },
                "required": ["sessionId"]
            }),
        },
        Tool {
            name: "study_clear".to_string(),
            description: "Forget a processed document and free its session.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "sessionId": session_id_schema()
                },
                "required": ["sessionId"]
            }),
        },
    ];

    serde_json::to_value(ToolsList { tools }).map_err(|e| JsonRpcError {
        code: -32603,
        message: format!("Internal error: {e}"),
        data: None,
    })
}

pub async fn handle_tools_call(
    params: Option<serde_json::Value>,
    state: &ServerState,
) -> Result<serde_json::Value, JsonRpcError> {
    let params: CallToolParams = serde_json::from_value(params.unwrap_or(serde_json::Value::Null))
        .map_err(|e| JsonRpcError {
            code: -32602,
            message: format!("Invalid params: {e}"),
            data: None,
        })?;

    match params.name.as_str() {
        "study_process" => study::handle_study_process(params.arguments, state).await,
        "study_topics" => study::handle_study_topics(params.arguments, state),
        "study_chapters" => study::handle_study_chapters(params.arguments, state),
        "study_text" => study::handle_study_text(params.arguments, state),
        "study_clear" => study::handle_study_clear(params.arguments, state),
        _ => Err(JsonRpcError {
            code: -32602,
            message: format!("Unknown tool: {}", params.name),
            data: None,
        }),
    }
}
