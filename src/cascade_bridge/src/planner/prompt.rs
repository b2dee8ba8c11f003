use bridge_types::prelude::{ChatMessage, Role, ToolDef};

const PREAMBLE: &str = "\
You are an assistant that may call tools on behalf of the user. You do not execute tools \
yourself; you only decide whether to call one or to answer directly.

Respond with exactly one JSON object and nothing else, no surrounding prose, no markdown \
fences. Use one of these two shapes:

{\"action\": \"final\", \"content\": \"<your answer to the user>\"}
{\"action\": \"tool_call\", \"tool_calls\": [{\"name\": \"<tool name>\", \"arguments\": {...}}]}

Tool call arguments must match the tool's parameter schema exactly.";

/// Builds the single prompt string sent to Cascade when tools are in play:
/// a fixed preamble, the tool catalog with pretty-printed schemas, and the
/// conversation rendered as role-labeled lines.
pub fn build_planner_prompt(messages: &[ChatMessage], tools: &[ToolDef]) -> String {
    let mut sections = vec![PREAMBLE.to_string()];

    let system_text: String = messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.text_content())
        .collect::<Vec<_>>()
        .join("\n");
    if !system_text.is_empty() {
        sections.push(system_text);
    }

    if !tools.is_empty() {
        let mut catalog = String::from("Available tools:\n");
        for tool in tools {
            let schema = serde_json::to_string_pretty(&tool.function.parameters)
                .unwrap_or_else(|_| "{}".to_string());
            let description = tool.function.description.clone().unwrap_or_default();
            if description.is_empty() {
                catalog.push_str(&format!("- {}\n{}\n", tool.function.name, schema));
            } else {
                catalog.push_str(&format!("- {}: {}\n{}\n", tool.function.name, description, schema));
            }
        }
        sections.push(catalog);
    }

    let mut conversation = String::from("Conversation:\n");
    for message in messages {
        if message.role == Role::System {
            continue;
        }
        let label = match message.role {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool-result",
            Role::System => unreachable!(),
        };
        conversation.push_str(&format!("{label}: {}\n", message.text_content()));
    }
    sections.push(conversation);

    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user_msg(text: &str) -> ChatMessage {
        ChatMessage {
            role: Role::User,
            content: Some(json!(text)),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    #[test]
    fn prompt_includes_tool_catalog_when_tools_present() {
        let tools = vec![ToolDef {
            kind: "function".into(),
            function: bridge_types::prelude::ToolFunctionDef {
                name: "read_file".into(),
                description: Some("Reads a file".into()),
                parameters: json!({"type": "object", "properties": {"path": {"type": "string"}}}),
            },
        }];
        let prompt = build_planner_prompt(&[user_msg("open a.txt")], &tools);
        assert!(prompt.contains("read_file"));
        assert!(prompt.contains("Reads a file"));
        assert!(prompt.contains("open a.txt"));
    }

    #[test]
    fn prompt_without_tools_omits_catalog_section() {
        let prompt = build_planner_prompt(&[user_msg("hello")], &[]);
        assert!(!prompt.contains("Available tools"));
    }

    #[test]
    fn system_messages_are_surfaced_but_not_in_conversation_body() {
        let system = ChatMessage {
            role: Role::System,
            content: Some(json!("be concise")),
            tool_calls: None,
            tool_call_id: None,
        };
        let prompt = build_planner_prompt(&[system, user_msg("hi")], &[]);
        assert!(prompt.contains("be concise"));
        assert!(!prompt.contains("system: be concise"));
    }
}
