use cascade_bridge::planner::parse_tool_plan;
use cascade_bridge::registry::resolve;
use cascade_bridge::wire::{frame, scan_fields, unframe, MessageBuilder};
use bridge_types::prelude::ToolCallPlan;

/// Scenario 2 from SPEC_FULL.md §8: a variant with a `model_uid` is routed
/// by string UID, not by enum.
#[test]
fn string_uid_model_routes_correctly_end_to_end() {
    let resolved = resolve("claude-4.6-opus:thinking", None);
    assert!(resolved.is_string_uid_routed());
    assert_eq!(resolved.model_uid.as_deref(), Some("claude-opus-4-6-thinking"));
}

/// Scenario 3: an unrecognized model id falls back to the documented default.
#[test]
fn unknown_model_falls_back_to_documented_default() {
    let resolved = resolve("totally-made-up-model", None);
    assert_eq!(resolved.canonical_id, "claude-3.5-sonnet");
    assert_eq!(resolved.enum_value, 166);
}

/// Scenario 6: a vendor reply mixing prose and a tagged JSON tool call
/// round-trips into a single tool invocation with normalized arguments.
#[test]
fn mixed_prose_tool_call_reply_parses_to_single_invocation() {
    let reply = r#"text before {"action":"tool_call","tool_calls":[{"name":"read_file","arguments":"{\"path\":\"a.txt\"}"}]} text after"#;
    let plan = parse_tool_plan(reply).expect("plan should parse");
    match plan {
        ToolCallPlan::ToolCall { calls } => {
            assert_eq!(calls.len(), 1);
            assert_eq!(calls[0].name, "read_file");
            assert_eq!(
                calls[0].arguments,
                serde_json::json!({"path": "a.txt"})
            );
        }
        other => panic!("expected a tool_call plan, got {other:?}"),
    }
}

/// A full-round wire encode covering a nested message plus a sibling
/// varint field, then gRPC-framed and unframed, mirroring what the
/// Cascade client actually sends.
#[test]
fn nested_message_survives_full_grpc_round_trip() {
    let inner = MessageBuilder::new().field_string(1, "cascade-session-7");
    let outer = MessageBuilder::new()
        .field_message(1, inner)
        .field_varint(4, 3)
        .build();

    let wire = frame(&outer);
    let frames = unframe(&wire);
    assert_eq!(frames.len(), 1);

    let fields = scan_fields(&frames[0]);
    assert_eq!(fields.len(), 2);

    let nested = fields[0].as_bytes().expect("field 1 should be length-delimited");
    let nested_fields = scan_fields(nested);
    assert_eq!(nested_fields[0].as_string().as_deref(), Some("cascade-session-7"));

    assert_eq!(fields[1].as_varint(), Some(3));
}
