use super::{CallToolResult, Content, JsonRpcError, ServerState};
use crate::error::Error;
use crate::pipeline::{extract_and_prioritize, Source};
use crate::session::Session;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

const INVALID_PARAMS: i32 = -32602;
const INTERNAL_ERROR: i32 = -32603;

#[derive(Deserialize)]
struct SessionArgs {
    #[serde(rename = "sessionId")]
    session_id: String,
}

fn parse_args<T: serde::de::DeserializeOwned>(
    arguments: Option<serde_json::Value>,
) -> Result<T, JsonRpcError> {
    serde_json::from_value(arguments.unwrap_or(serde_json::Value::Null)).map_err(|e| JsonRpcError {
        code: INVALID_PARAMS,
        message: format!("Invalid arguments: {e}"),
        data: None,
    })
}

fn invalid_params(message: String) -> JsonRpcError {
    JsonRpcError {
        code: INVALID_PARAMS,
        message,
        data: None,
    }
}

fn internal_err(message: String) -> JsonRpcError {
    JsonRpcError {
        code: INTERNAL_ERROR,
        message,
        data: None,
    }
}

/// Bad input from the client is an invalid-params error; anything else is ours.
fn pdf_err(e: pdf::PdfError) -> JsonRpcError {
    match e {
        pdf::PdfError::MalformedInput(_) | pdf::PdfError::Io(_) => {
            invalid_params(format!("PDF error: {e}"))
        }
        _ => internal_err(format!("PDF error: {e}")),
    }
}

fn lookup(state: &ServerState, session_id: &str) -> Result<Session, JsonRpcError> {
    state.sessions.get(session_id).map_err(|e: Error| {
        let data = serde_json::to_value(&e).ok();
        JsonRpcError {
            code: INVALID_PARAMS,
            message: e.to_string(),
            data,
        }
    })
}

fn to_text_result(value: &impl serde::Serialize) -> Result<serde_json::Value, JsonRpcError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| internal_err(format!("Serialization error: {e}")))?;

    serde_json::to_value(CallToolResult {
        content: vec![Content::Text { text: json }],
        is_error: None,
    })
    .map_err(|e| internal_err(format!("Internal error: {e}")))
}

async fn run_blocking<T, F>(f: F) -> Result<T, JsonRpcError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, JsonRpcError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| internal_err(format!("Task join error: {e}")))?
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

pub async fn handle_study_process(
    arguments: Option<serde_json::Value>,
    state: &ServerState,
) -> Result<serde_json::Value, JsonRpcError> {
    #[derive(Deserialize)]
    struct Args {
        path: String,
    }

    let args: Args = parse_args(arguments)?;
    let config = state.config.clone();

    let document = run_blocking(move || {
        extract_and_prioritize(&Source::Path(args.path.into()), &config).map_err(pdf_err)
    })
    .await?;

    let session = state.sessions.insert(document);
    let doc = &session.document;

    to_text_result(&serde_json::json!({
        "sessionId": session.id,
        "createdAt": session.created_at,
        "source": doc.source,
        "metadata": doc.metadata,
        "chapterCount": doc.output.chapters.len(),
        "topics": doc.output.topics,
    }))
}

pub fn handle_study_topics(
    arguments: Option<serde_json::Value>,
    state: &ServerState,
) -> Result<serde_json::Value, JsonRpcError> {
    let args: SessionArgs = parse_args(arguments)?;
    let session = lookup(state, &args.session_id)?;

    to_text_result(&serde_json::json!({
        "sessionId": session.id,
        "topics": session.document.output.topics,
    }))
}

pub fn handle_study_chapters(
    arguments: Option<serde_json::Value>,
    state: &ServerState,
) -> Result<serde_json::Value, JsonRpcError> {
    let args: SessionArgs = parse_args(arguments)?;
    let session = lookup(state, &args.session_id)?;

    to_text_result(&serde_json::json!({
        "sessionId": session.id,
        "chapters": session.document.output.chapters,
    }))
}

pub fn handle_study_text(
    arguments: Option<serde_json::Value>,
    state: &ServerState,
) -> Result<serde_json::Value, JsonRpcError> {
    #[derive(Deserialize)]
    struct Args {
        #[serde(rename = "sessionId")]
        session_id: String,
        #[serde(default)]
        clean: bool,
    }

    let args: Args = parse_args(arguments)?;
    let session = lookup(state, &args.session_id)?;
    let output = &session.document.output;
    let text = if args.clean {
        &output.clean_text
    } else {
        &output.raw_text
    };

    to_text_result(&serde_json::json!({
        "sessionId": session.id,
        "clean": args.clean,
        "text": text,
    }))
}

pub fn handle_study_clear(
    arguments: Option<serde_json::Value>,
    state: &ServerState,
) -> Result<serde_json::Value, JsonRpcError> {
    let args: SessionArgs = parse_args(arguments)?;

    if !state.sessions.remove(&args.session_id) {
        return Err(invalid_params(
            Error::SessionNotFound(args.session_id).to_string(),
        ));
    }

    to_text_result(&serde_json::json!({
        "sessionId": args.session_id,
        "cleared": true,
    }))
}
