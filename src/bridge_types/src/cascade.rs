use serde::{Deserialize, Serialize};

/// Ephemeral session state for a single chat completion. A fresh session is
/// created per request; Cascade sessions are never reused across requests.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CascadeSession {
    pub cascade_id: String,
    pub poll_offset: u64,
}

impl CascadeSession {
    pub fn new(cascade_id: String) -> Self {
        CascadeSession {
            cascade_id,
            poll_offset: 0,
        }
    }
}

/// One trajectory step's planner-response text, both raw fields retained so
/// a future implementer can reconcile `response` vs `modified_response`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlannerResponseText {
    pub response: Option<String>,
    pub modified_response: Option<String>,
}

impl PlannerResponseText {
    /// Prefers `modified_response` when non-empty, else falls back to `response`.
    pub fn best_text(&self) -> Option<&str> {
        match &self.modified_response {
            Some(s) if !s.is_empty() => Some(s.as_str()),
            _ => self.response.as_deref().filter(|s| !s.is_empty()),
        }
    }
}
