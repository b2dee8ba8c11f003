use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A variant of a canonical model, e.g. `claude-4.6-opus:thinking`.
///
/// If `model_uid` is present it takes precedence over `enum_value`: the
/// request is routed by string UID rather than by the legacy enum.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct VariantSpec {
    pub enum_value: Option<u32>,
    pub model_uid: Option<String>,
    pub description: String,
}

/// A model known to the registry, with its aliases and variant catalog.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelDescriptor {
    pub canonical_id: String,
    pub aliases: Vec<String>,
    pub enum_value: Option<u32>,
    pub default_variant: Option<String>,
    pub variants: HashMap<String, VariantSpec>,
}

/// The outcome of resolving a client-supplied model string (+ optional
/// override variant) against the registry. Exactly one of `model_uid` /
/// `enum_value` is the active routing mode: `enum_value == 0` means
/// string-UID routing is in effect and `model_uid` must be non-empty.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolvedModel {
    pub canonical_id: String,
    pub variant: Option<String>,
    pub enum_value: u32,
    pub model_uid: Option<String>,
}

impl ResolvedModel {
    pub fn is_string_uid_routed(&self) -> bool {
        self.enum_value == 0 && self.model_uid.is_some()
    }
}
