use bridge_types::prelude::{ChatMessage, Role};

/// Builds the plain-text prompt sent to Cascade for the no-tools path:
/// system messages first, then user messages, each separated by a blank
/// line. Assistant and tool messages are dropped — Cascade starts a new
/// session per request and carries no memory of prior turns.
pub fn build_outbound_text(messages: &[ChatMessage]) -> String {
    let systems: Vec<String> = messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.text_content())
        .filter(|s| !s.is_empty())
        .collect();
    let users: Vec<String> = messages
        .iter()
        .filter(|m| m.role == Role::User)
        .map(|m| m.text_content())
        .filter(|s| !s.is_empty())
        .collect();

    let combined: Vec<String> = systems.into_iter().chain(users).collect();
    if combined.is_empty() {
        "Hello".to_string()
    } else {
        combined.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn msg(role: Role, text: &str) -> ChatMessage {
        ChatMessage {
            role,
            content: Some(json!(text)),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    #[test]
    fn systems_come_before_users() {
        let messages = vec![
            msg(Role::User, "question"),
            msg(Role::System, "be terse"),
        ];
        assert_eq!(build_outbound_text(&messages), "be terse\n\nquestion");
    }

    #[test]
    fn assistant_and_tool_messages_are_dropped() {
        let messages = vec![
            msg(Role::User, "question"),
            msg(Role::Assistant, "previous answer"),
            msg(Role::Tool, "tool output"),
        ];
        assert_eq!(build_outbound_text(&messages), "question");
    }

    #[test]
    fn empty_conversation_falls_back_to_hello() {
        assert_eq!(build_outbound_text(&[]), "Hello");
    }
}
