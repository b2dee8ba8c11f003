use super::metadata::build_metadata;
use crate::core::state::SharedState;
use crate::wire::{frame, scan_fields, unframe, MessageBuilder};
use bridge_types::prelude::{BridgeError, BridgeResult, CascadeSession, Credentials, PlannerResponseText};
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, info, warn};

const GRPC_PATH_START: &str = "StartCascade";
const GRPC_PATH_SEND: &str = "SendUserCascadeMessage";
const GRPC_PATH_POLL: &str = "GetCascadeTrajectorySteps";

const FIELD_PLANNER_RESPONSE: u32 = 20;
const FIELD_RESPONSE_TEXT: u32 = 1;
const FIELD_MODIFIED_RESPONSE_TEXT: u32 = 8;
const FIELD_PLANNER_MODEL_UID: u32 = 35;
const FIELD_TRAJECTORY_STEP: u32 = 1;

/// Derives the vendor proto enum name for an enum-routed model when no
/// `model_uid` is available, e.g. `claude-3.5-sonnet` -> `MODEL_CLAUDE_3_5_SONNET`.
/// This is a deterministic naming convention, not a table lookup against the
/// vendor's actual enum (see DESIGN.md); it matches every enum-routed entry
/// in the registry's own catalog by construction.
fn proto_model_name(canonical_id: &str, variant: Option<&str>) -> String {
    let mut slug = canonical_id.replace(['-', '.'], "_").to_uppercase();
    if let Some(v) = variant {
        slug.push('_');
        slug.push_str(&v.to_uppercase());
    }
    format!("MODEL_{slug}")
}

/// Runs the full Start -> Send -> Poll Cascade session for one chat
/// completion and returns the assistant's text. A fresh session is created
/// for every call; nothing is reused across requests.
pub async fn run_cascade_session(
    state: &SharedState,
    credentials: &Credentials,
    prompt_text: &str,
    canonical_model_id: &str,
    variant: Option<&str>,
    enum_value: u32,
    model_uid: Option<&str>,
) -> BridgeResult<String> {
    let fields = state.metadata_field_map();
    let ordinal = state.next_request_ordinal();
    let metadata = build_metadata(
        fields,
        credentials,
        &state.session_id,
        &state.device_fingerprint,
        ordinal,
    );

    let start_body = MessageBuilder::new()
        .field_message(1, metadata.clone())
        .field_varint(4, 3)
        .build();
    let start_response = post_grpc(state, credentials, GRPC_PATH_START, start_body).await?;
    let cascade_id = extract_cascade_id(&start_response)
        .ok_or_else(|| BridgeError::StreamError("empty cascade_id from StartCascade".into()))?;
    let session = CascadeSession::new(cascade_id);
    debug!(cascade_id = %session.cascade_id, "cascade session started");

    let resolved_model_uid = model_uid
        .map(str::to_string)
        .unwrap_or_else(|| proto_model_name(canonical_model_id, variant));

    let conversational_config = MessageBuilder::new(); // empty marker message
    let planner_config = MessageBuilder::new()
        .field_message_always(2, conversational_config)
        .field_string(FIELD_PLANNER_MODEL_UID, &resolved_model_uid);
    let cascade_config = MessageBuilder::new().field_message(1, planner_config);

    let text_or_scope = MessageBuilder::new().field_string(1, prompt_text);
    let send_body = MessageBuilder::new()
        .field_string(1, &session.cascade_id)
        .field_message(2, text_or_scope)
        .field_message(3, metadata)
        .field_message(5, cascade_config)
        .build();
    post_grpc(state, credentials, GRPC_PATH_SEND, send_body).await?;
    info!(cascade_id = %session.cascade_id, model_uid = %resolved_model_uid, enum_value, "cascade message sent");

    poll_until_done(state, credentials, &session).await
}

async fn poll_until_done(
    state: &SharedState,
    credentials: &Credentials,
    session: &CascadeSession,
) -> BridgeResult<String> {
    for attempt in 0..state.config.poll_max_attempts {
        tokio::time::sleep(state.config.poll_interval()).await;

        let poll_body = MessageBuilder::new()
            .field_string(1, &session.cascade_id)
            .field_varint(2, session.poll_offset)
            .build();

        let response = match post_grpc(state, credentials, GRPC_PATH_POLL, poll_body).await {
            Ok(body) => body,
            Err(e) => {
                warn!(attempt, "poll attempt failed, retrying: {e}");
                continue;
            }
        };

        if let Some(text) = extract_planner_text(&response) {
            return Ok(text);
        }
    }
    Err(BridgeError::StreamError(format!(
        "polling timed out after {} attempts",
        state.config.poll_max_attempts
    )))
}

/// Sends one unary gRPC call (h2 prior-knowledge cleartext) and returns the
/// concatenated, unframed response payload. Non-zero `grpc-status` trailers
/// are converted into a `StreamError`. Opens its own client, and therefore
/// its own HTTP/2 session, per call instead of reusing one across RPCs or
/// requests: no connection pool.
async fn post_grpc(
    _state: &SharedState,
    credentials: &Credentials,
    method: &str,
    payload: Vec<u8>,
) -> BridgeResult<Vec<u8>> {
    let url = format!(
        "http://127.0.0.1:{}/exa.language_server_pb.LanguageServerService/{method}",
        credentials.grpc_port
    );

    let mut headers = HeaderMap::new();
    headers.insert("content-type", HeaderValue::from_static("application/grpc"));
    headers.insert("te", HeaderValue::from_static("trailers"));
    headers.insert(
        "grpc-accept-encoding",
        HeaderValue::from_static("identity,gzip"),
    );
    headers.insert(
        "x-codeium-csrf-token",
        HeaderValue::from_str(&credentials.csrf_token)
            .map_err(|e| BridgeError::Internal(format!("invalid csrf token header: {e}")))?,
    );

    let client = reqwest::Client::builder()
        .http2_prior_knowledge()
        .pool_max_idle_per_host(0)
        .build()
        .map_err(|e| BridgeError::Internal(format!("failed to build grpc client: {e}")))?;

    let mut response = client
        .post(&url)
        .headers(headers)
        .body(frame(&payload))
        .send()
        .await
        .map_err(|e| BridgeError::ConnectionFailed(e.to_string()))?;

    let body = response
        .bytes()
        .await
        .map_err(|e| BridgeError::ConnectionFailed(e.to_string()))?;

    let trailers = response
        .trailers()
        .await
        .map_err(|e| BridgeError::StreamError(e.to_string()))?;

    if let Some(trailers) = trailers {
        if let Some(status) = trailers.get("grpc-status") {
            let status_str = status.to_str().unwrap_or("unknown");
            if status_str != "0" {
                let message = trailers
                    .get("grpc-message")
                    .and_then(|v| v.to_str().ok())
                    .map(|s| percent_encoding::percent_decode_str(s).decode_utf8_lossy().to_string())
                    .unwrap_or_default();
                return Err(BridgeError::StreamError(format!(
                    "grpc-status {status_str}: {message}"
                )));
            }
        }
    }

    Ok(body.to_vec())
}

fn extract_cascade_id(response_body: &[u8]) -> Option<String> {
    for frame_bytes in unframe(response_body) {
        for field in scan_fields(&frame_bytes) {
            if field.number == 1 {
                if let Some(s) = field.as_string() {
                    if !s.is_empty() {
                        return Some(s);
                    }
                }
            }
        }
    }
    None
}

/// Walks every trajectory step across every frame, tracking the last
/// non-empty planner response text, preferring `modified_response` over
/// `response` when a step carries both (see DESIGN.md's Open Question
/// decision).
fn extract_planner_text(response_body: &[u8]) -> Option<String> {
    let mut last: Option<String> = None;
    for frame_bytes in unframe(response_body) {
        for step_field in scan_fields(&frame_bytes) {
            if step_field.number != FIELD_TRAJECTORY_STEP {
                continue;
            }
            let Some(step_bytes) = step_field.as_bytes() else {
                continue;
            };
            for field in scan_fields(step_bytes) {
                if field.number != FIELD_PLANNER_RESPONSE {
                    continue;
                }
                let Some(planner_bytes) = field.as_bytes() else {
                    continue;
                };
                let mut text = PlannerResponseText::default();
                for pf in scan_fields(planner_bytes) {
                    match pf.number {
                        FIELD_RESPONSE_TEXT => text.response = pf.as_string(),
                        FIELD_MODIFIED_RESPONSE_TEXT => text.modified_response = pf.as_string(),
                        _ => {}
                    }
                }
                if let Some(best) = text.best_text() {
                    last = Some(best.to_string());
                }
            }
        }
    }
    last
}
