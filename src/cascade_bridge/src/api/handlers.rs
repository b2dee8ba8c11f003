use super::sse::{encode_chunk, DONE_EVENT};
use super::translate::build_outbound_text;
use super::types::{
    ChatCompletion, ChatCompletionChunk, ChatCompletionRequest, Choice, ChunkChoice, Delta,
    HealthResponse, ModelListing, ModelsList, ResponseMessage, ResponseToolCall,
    ResponseToolCallFunction,
};
use crate::cascade::run_cascade_session;
use crate::core::{ApiError, SharedState};
use crate::planner::{build_planner_prompt, parse_tool_plan};
use crate::registry;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bridge_types::prelude::ToolCallPlan;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tracing::{info, instrument};
use uuid::Uuid;

fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}

pub async fn health(State(state): State<SharedState>) -> impl IntoResponse {
    let windsurf = state.credentials.resolve().await.is_ok();
    Json(HealthResponse { ok: true, windsurf })
}

pub async fn not_found() -> impl IntoResponse {
    let body = serde_json::json!({
        "error": {
            "message": "not found",
            "type": "windsurf_error",
            "param": null,
            "code": null,
        }
    });
    (StatusCode::NOT_FOUND, Json(body))
}

pub async fn list_models() -> impl IntoResponse {
    let created = now_unix();
    let data = registry::list_models()
        .into_iter()
        .map(|(id, variants)| ModelListing {
            id,
            object: "model",
            created,
            owned_by: "windsurf",
            variants,
        })
        .collect();
    Json(ModelsList {
        object: "list",
        data,
    })
}

#[instrument(skip_all, fields(model = %request.model, stream = request.stream, tools = request.tools.len()))]
pub async fn chat_completions(
    State(state): State<SharedState>,
    Json(request): Json<ChatCompletionRequest>,
) -> Result<Response, ApiError> {
    if request.messages.is_empty() {
        return Err(ApiError(bridge_types::prelude::BridgeError::BadRequest(
            "messages must not be empty".into(),
        )));
    }

    let credentials = state.credentials.resolve().await?;
    let resolved = registry::resolve(&request.model, request.variant_override());

    let prompt_text = if request.wants_tool_planning() {
        build_planner_prompt(&request.messages, &request.tools)
    } else {
        build_outbound_text(&request.messages)
    };

    info!(canonical_model = %resolved.canonical_id, variant = ?resolved.variant, "dispatching cascade session");

    if request.stream {
        Ok(stream_response(state, credentials, request, resolved, prompt_text).await)
    } else {
        non_stream_response(state, credentials, request, resolved, prompt_text).await
    }
}

async fn non_stream_response(
    state: SharedState,
    credentials: bridge_types::prelude::Credentials,
    request: ChatCompletionRequest,
    resolved: bridge_types::prelude::ResolvedModel,
    prompt_text: String,
) -> Result<Response, ApiError> {
    let reply = run_cascade_session(
        &state,
        &credentials,
        &prompt_text,
        &resolved.canonical_id,
        resolved.variant.as_deref(),
        resolved.enum_value,
        resolved.model_uid.as_deref(),
    )
    .await?;

    let (message, finish_reason) = if request.wants_tool_planning() {
        match parse_tool_plan(&reply) {
            Some(ToolCallPlan::ToolCall { calls }) => (
                ResponseMessage {
                    role: "assistant",
                    content: None,
                    tool_calls: Some(
                        calls
                            .into_iter()
                            .enumerate()
                            .map(|(i, c)| to_response_tool_call(i, c))
                            .collect(),
                    ),
                },
                "tool_calls",
            ),
            Some(ToolCallPlan::Final { content }) => (
                ResponseMessage {
                    role: "assistant",
                    content: Some(content),
                    tool_calls: None,
                },
                "stop",
            ),
            None => (
                ResponseMessage {
                    role: "assistant",
                    content: Some(reply),
                    tool_calls: None,
                },
                "stop",
            ),
        }
    } else {
        (
            ResponseMessage {
                role: "assistant",
                content: Some(reply),
                tool_calls: None,
            },
            "stop",
        )
    };

    let completion = ChatCompletion {
        id: format!("chatcmpl-{}", Uuid::new_v4()),
        object: "chat.completion",
        created: now_unix(),
        model: request.model,
        choices: vec![Choice {
            index: 0,
            message,
            finish_reason,
        }],
        usage: None,
    };

    Ok(Json(completion).into_response())
}

fn to_response_tool_call(index: usize, call: bridge_types::prelude::ToolCall) -> ResponseToolCall {
    ResponseToolCall {
        id: format!("call-{index}-{}", Uuid::new_v4()),
        kind: "function",
        function: ResponseToolCallFunction {
            name: call.name,
            arguments: serde_json::to_string(&call.arguments).unwrap_or_else(|_| "{}".to_string()),
        },
    }
}

async fn stream_response(
    state: SharedState,
    credentials: bridge_types::prelude::Credentials,
    request: ChatCompletionRequest,
    resolved: bridge_types::prelude::ResolvedModel,
    prompt_text: String,
) -> Response {
    let (tx, rx) = mpsc::channel::<String>(8);
    let response_id = format!("chatcmpl-{}", Uuid::new_v4());
    let model_echo = request.model.clone();
    let wants_tools = request.wants_tool_planning();

    tokio::spawn(async move {
        let result = run_cascade_session(
            &state,
            &credentials,
            &prompt_text,
            &resolved.canonical_id,
            resolved.variant.as_deref(),
            resolved.enum_value,
            resolved.model_uid.as_deref(),
        )
        .await;

        let reply = match result {
            Ok(text) => text,
            Err(err) => {
                let chunk = error_chunk(&response_id, &model_echo, &err.to_string());
                let _ = tx.send(encode_chunk(&chunk)).await;
                let _ = tx.send(DONE_EVENT.to_string()).await;
                return;
            }
        };

        if wants_tools {
            match parse_tool_plan(&reply) {
                Some(ToolCallPlan::ToolCall { calls }) => {
                    let tool_calls: Vec<ResponseToolCall> = calls
                        .into_iter()
                        .enumerate()
                        .map(|(i, c)| to_response_tool_call(i, c))
                        .collect();
                    let chunk = ChatCompletionChunk {
                        id: response_id.clone(),
                        object: "chat.completion.chunk",
                        created: now_unix(),
                        model: model_echo.clone(),
                        choices: vec![ChunkChoice {
                            index: 0,
                            delta: Delta {
                                role: Some("assistant"),
                                tool_calls: Some(tool_calls),
                                ..Default::default()
                            },
                            finish_reason: Some("tool_calls"),
                        }],
                    };
                    let _ = tx.send(encode_chunk(&chunk)).await;
                }
                Some(ToolCallPlan::Final { content }) => {
                    send_content_then_stop(&tx, &response_id, &model_echo, content).await;
                }
                None => {
                    send_content_then_stop(&tx, &response_id, &model_echo, reply).await;
                }
            }
        } else {
            send_content_then_stop(&tx, &response_id, &model_echo, reply).await;
        }

        let _ = tx.send(DONE_EVENT.to_string()).await;
    });

    let stream = ReceiverStream::new(rx).map(|line| {
        Ok::<_, std::convert::Infallible>(axum::body::Bytes::from(line))
    });

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from_stream(stream))
        .expect("building SSE response cannot fail")
}

async fn send_content_then_stop(
    tx: &mpsc::Sender<String>,
    response_id: &str,
    model_echo: &str,
    content: String,
) {
    let content_chunk = ChatCompletionChunk {
        id: response_id.to_string(),
        object: "chat.completion.chunk",
        created: now_unix(),
        model: model_echo.to_string(),
        choices: vec![ChunkChoice {
            index: 0,
            delta: Delta {
                role: Some("assistant"),
                content: Some(content),
                ..Default::default()
            },
            finish_reason: None,
        }],
    };
    if tx.send(encode_chunk(&content_chunk)).await.is_err() {
        return;
    }
    let stop_chunk = ChatCompletionChunk {
        id: response_id.to_string(),
        object: "chat.completion.chunk",
        created: now_unix(),
        model: model_echo.to_string(),
        choices: vec![ChunkChoice {
            index: 0,
            delta: Delta::default(),
            finish_reason: Some("stop"),
        }],
    };
    let _ = tx.send(encode_chunk(&stop_chunk)).await;
}

fn error_chunk(response_id: &str, model_echo: &str, message: &str) -> ChatCompletionChunk {
    ChatCompletionChunk {
        id: response_id.to_string(),
        object: "chat.completion.chunk",
        created: now_unix(),
        model: model_echo.to_string(),
        choices: vec![ChunkChoice {
            index: 0,
            delta: Delta {
                content: Some(format!("[error] {message}")),
                ..Default::default()
            },
            finish_reason: Some("stop"),
        }],
    }
}
