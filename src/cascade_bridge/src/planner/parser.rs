use bridge_types::prelude::{ToolCall, ToolCallPlan};
use regex::Regex;
use serde_json::Value;

/// Parses a Cascade reply into a tool-call plan. Tries a direct JSON object
/// first (the common case for a well-behaved model), falling back to a
/// `<tool_call>name {json}</tool_call>`-tagged scan for models that wrap
/// their JSON in prose despite the prompt's instructions. Returns `None`
/// when neither form parses, in which case the caller treats the raw text
/// as a final answer.
pub fn parse_tool_plan(reply: &str) -> Option<ToolCallPlan> {
    if let Some(plan) = parse_json_object(reply) {
        return Some(plan);
    }
    parse_tagged_fallback(reply)
}

fn parse_json_object(reply: &str) -> Option<ToolCallPlan> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    if end < start {
        return None;
    }
    let candidate = &reply[start..=end];
    let value: Value = serde_json::from_str(candidate).ok()?;
    value_to_plan(value)
}

fn value_to_plan(value: Value) -> Option<ToolCallPlan> {
    let action = value.get("action")?.as_str()?;
    match action {
        "final" => {
            let content = value.get("content")?.as_str()?.to_string();
            Some(ToolCallPlan::Final { content })
        }
        "tool_call" => {
            let calls_value = value.get("tool_calls")?.as_array()?;
            let calls: Vec<ToolCall> = calls_value
                .iter()
                .filter_map(|c| {
                    let name = c.get("name")?.as_str()?.to_string();
                    let arguments = normalize_arguments(c.get("arguments").cloned().unwrap_or(Value::Null));
                    Some(ToolCall { name, arguments })
                })
                .collect();
            if calls.is_empty() {
                None
            } else {
                Some(ToolCallPlan::ToolCall { calls })
            }
        }
        _ => None,
    }
}

fn parse_tagged_fallback(reply: &str) -> Option<ToolCallPlan> {
    let tag_re = Regex::new(r"(?s)<tool_call>\s*([A-Za-z0-9_\-]+)\s+(\{.*?\})\s*</tool_call>").ok()?;
    let mut calls = Vec::new();
    for capture in tag_re.captures_iter(reply) {
        let name = capture.get(1)?.as_str().to_string();
        let raw_args = capture.get(2)?.as_str();
        let arguments = serde_json::from_str(raw_args)
            .map(normalize_arguments)
            .unwrap_or(Value::Null);
        calls.push(ToolCall { name, arguments });
    }
    if calls.is_empty() {
        None
    } else {
        Some(ToolCallPlan::ToolCall { calls })
    }
}

/// Recursively parses any string value that "looks like JSON" (starts with
/// `{`/`[`, ends with the matching close, parses cleanly); otherwise the
/// string is left untouched. Conservative by design, see SPEC_FULL.md §9.
fn normalize_arguments(value: Value) -> Value {
    match value {
        Value::String(s) => {
            if looks_like_json(&s) {
                if let Ok(parsed) = serde_json::from_str::<Value>(&s) {
                    return normalize_arguments(parsed);
                }
            }
            Value::String(s)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_arguments).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, normalize_arguments(v)))
                .collect(),
        ),
        other => other,
    }
}

fn looks_like_json(s: &str) -> bool {
    let trimmed = s.trim();
    (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'))
}
