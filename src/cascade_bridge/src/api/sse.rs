use super::types::ChatCompletionChunk;

pub fn encode_chunk(chunk: &ChatCompletionChunk) -> String {
    let json = serde_json::to_string(chunk).expect("chunk serialization cannot fail");
    format!("data: {json}\n\n")
}

pub const DONE_EVENT: &str = "data: [DONE]\n\n";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{ChunkChoice, Delta};

    #[test]
    fn encodes_chunk_as_single_data_line() {
        let chunk = ChatCompletionChunk {
            id: "chatcmpl-1".into(),
            object: "chat.completion.chunk",
            created: 0,
            model: "gpt-4o".into(),
            choices: vec![ChunkChoice {
                index: 0,
                delta: Delta {
                    content: Some("hi".into()),
                    ..Default::default()
                },
                finish_reason: None,
            }],
        };
        let encoded = encode_chunk(&chunk);
        assert!(encoded.starts_with("data: "));
        assert!(encoded.ends_with("\n\n"));
        assert!(encoded.contains("\"content\":\"hi\""));
    }

    #[test]
    fn done_event_is_the_openai_sentinel() {
        assert_eq!(DONE_EVENT, "data: [DONE]\n\n");
    }
}
