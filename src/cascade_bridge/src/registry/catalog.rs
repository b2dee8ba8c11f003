use bridge_types::prelude::{ModelDescriptor, VariantSpec};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Known performance/reasoning tiers a model id may be suffixed with, e.g.
/// `claude-4.6-opus-thinking` or `claude-4.6-opus:thinking`.
pub const KNOWN_VARIANTS: &[&str] = &[
    "low", "medium", "high", "xhigh", "thinking", "fast", "slow", "1m", "minimal",
];

pub const DEFAULT_CANONICAL_ID: &str = "claude-3.5-sonnet";
pub const DEFAULT_ENUM_VALUE: u32 = 166;

fn variant(enum_value: Option<u32>, model_uid: Option<&str>, description: &str) -> VariantSpec {
    VariantSpec {
        enum_value,
        model_uid: model_uid.map(str::to_string),
        description: description.to_string(),
    }
}

/// Model quirks table.
///
/// - `claude-3.5-sonnet` and `gpt-4o` are legacy enum-routed models with no
///   variant catalog: any variant suffix on them is ignored upstream.
/// - `gemini-3.0-pro` is enum-routed per variant (low/medium/high/xhigh).
/// - `claude-4.6-opus` and `claude-4.6-sonnet` are string-UID routed: every
///   variant carries a `model_uid` and `enum_value` is unused (sent as 0).
fn build_descriptors() -> HashMap<&'static str, ModelDescriptor> {
    let mut map = HashMap::new();

    map.insert(
        "claude-3.5-sonnet",
        ModelDescriptor {
            canonical_id: "claude-3.5-sonnet".into(),
            aliases: vec!["claude-3.5".into(), "sonnet-3.5".into()],
            enum_value: Some(166),
            default_variant: None,
            variants: HashMap::new(),
        },
    );

    map.insert(
        "gpt-4o",
        ModelDescriptor {
            canonical_id: "gpt-4o".into(),
            aliases: vec!["gpt4o".into()],
            enum_value: Some(142),
            default_variant: None,
            variants: HashMap::new(),
        },
    );

    let mut gemini_variants = HashMap::new();
    gemini_variants.insert("low".into(), variant(Some(210), None, "fastest, least context"));
    gemini_variants.insert("medium".into(), variant(Some(211), None, "balanced"));
    gemini_variants.insert("high".into(), variant(Some(212), None, "deeper reasoning"));
    gemini_variants.insert("xhigh".into(), variant(Some(213), None, "maximum reasoning effort"));
    map.insert(
        "gemini-3.0-pro",
        ModelDescriptor {
            canonical_id: "gemini-3.0-pro".into(),
            aliases: vec!["gemini-3-pro".into(), "gemini3".into()],
            enum_value: None,
            default_variant: Some("medium".into()),
            variants: gemini_variants,
        },
    );

    let mut opus_variants = HashMap::new();
    opus_variants.insert(
        "thinking".into(),
        variant(None, Some("claude-opus-4-6-thinking"), "extended thinking mode"),
    );
    opus_variants.insert(
        "fast".into(),
        variant(None, Some("claude-opus-4-6-fast"), "low-latency mode"),
    );
    map.insert(
        "claude-4.6-opus",
        ModelDescriptor {
            canonical_id: "claude-4.6-opus".into(),
            aliases: vec!["opus-4.6".into(), "claude-opus-4-6".into()],
            enum_value: None,
            default_variant: Some("thinking".into()),
            variants: opus_variants,
        },
    );

    let mut sonnet46_variants = HashMap::new();
    sonnet46_variants.insert(
        "1m".into(),
        variant(None, Some("claude-sonnet-4-6-1m"), "1M token context window"),
    );
    sonnet46_variants.insert(
        "fast".into(),
        variant(None, Some("claude-sonnet-4-6-fast"), "low-latency mode"),
    );
    map.insert(
        "claude-4.6-sonnet",
        ModelDescriptor {
            canonical_id: "claude-4.6-sonnet".into(),
            aliases: vec!["sonnet-4.6".into(), "claude-sonnet-4-6".into()],
            enum_value: None,
            default_variant: Some("fast".into()),
            variants: sonnet46_variants,
        },
    );

    map
}

fn build_alias_map(descriptors: &HashMap<&'static str, ModelDescriptor>) -> HashMap<String, String> {
    let mut aliases = HashMap::new();
    for descriptor in descriptors.values() {
        for alias in &descriptor.aliases {
            aliases.insert(alias.clone(), descriptor.canonical_id.clone());
        }
    }
    aliases
}

pub struct Catalog {
    pub descriptors: HashMap<&'static str, ModelDescriptor>,
    pub aliases: HashMap<String, String>,
}

static CATALOG: OnceLock<Catalog> = OnceLock::new();

pub fn catalog() -> &'static Catalog {
    CATALOG.get_or_init(|| {
        let descriptors = build_descriptors();
        let aliases = build_alias_map(&descriptors);
        Catalog { descriptors, aliases }
    })
}
