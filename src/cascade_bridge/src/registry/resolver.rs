use super::catalog::{catalog, DEFAULT_CANONICAL_ID, DEFAULT_ENUM_VALUE, KNOWN_VARIANTS};
use bridge_types::prelude::ResolvedModel;

/// Resolves a client-supplied model string (optionally with an explicit
/// override variant, e.g. from `providerOptions.windsurf.variant`) into a
/// concrete routing target. Deterministic: the same input and override
/// always produce the same `ResolvedModel`.
pub fn resolve(input: &str, override_variant: Option<&str>) -> ResolvedModel {
    let (id_part, parsed_variant) = split_variant(input);
    let variant = override_variant.map(str::to_string).or(parsed_variant);

    let cat = catalog();
    let canonical_id = cat
        .aliases
        .get(id_part)
        .cloned()
        .unwrap_or_else(|| id_part.to_string());

    if let Some(descriptor) = cat.descriptors.get(canonical_id.as_str()) {
        if !descriptor.variants.is_empty() {
            let chosen = variant
                .clone()
                .or_else(|| descriptor.default_variant.clone());
            if let Some(variant_name) = &chosen {
                if let Some(spec) = descriptor.variants.get(variant_name) {
                    if let Some(uid) = &spec.model_uid {
                        return ResolvedModel {
                            canonical_id: descriptor.canonical_id.clone(),
                            variant: Some(variant_name.clone()),
                            enum_value: 0,
                            model_uid: Some(uid.clone()),
                        };
                    }
                    return ResolvedModel {
                        canonical_id: descriptor.canonical_id.clone(),
                        variant: Some(variant_name.clone()),
                        enum_value: spec.enum_value.unwrap_or(0),
                        model_uid: None,
                    };
                }
            }
        }
        return ResolvedModel {
            canonical_id: descriptor.canonical_id.clone(),
            variant: None,
            enum_value: descriptor.enum_value.unwrap_or(DEFAULT_ENUM_VALUE),
            model_uid: None,
        };
    }

    ResolvedModel {
        canonical_id: DEFAULT_CANONICAL_ID.to_string(),
        variant: None,
        enum_value: DEFAULT_ENUM_VALUE,
        model_uid: None,
    }
}

/// Splits `id:variant`, or detects a known `-variant` suffix when there is
/// no colon (e.g. `claude-4.6-opus-thinking`).
fn split_variant(input: &str) -> (&str, Option<String>) {
    if let Some((id, variant)) = input.split_once(':') {
        return (id, Some(variant.to_string()));
    }
    for known in KNOWN_VARIANTS {
        let suffix = format!("-{known}");
        if let Some(prefix) = input.strip_suffix(suffix.as_str()) {
            if !prefix.is_empty() {
                return (prefix, Some((*known).to_string()));
            }
        }
    }
    (input, None)
}

/// Listing view for `/v1/models`: canonical id plus its known variant names.
pub fn list_models() -> Vec<(String, Vec<String>)> {
    let cat = catalog();
    let mut out: Vec<(String, Vec<String>)> = cat
        .descriptors
        .values()
        .map(|d| {
            let mut variants: Vec<String> = d.variants.keys().cloned().collect();
            variants.sort();
            (d.canonical_id.clone(), variants)
        })
        .collect();
    out.sort_by(|a, b| a.0.cmp(&b.0));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colon_variant_is_parsed() {
        let resolved = resolve("gemini-3.0-pro:high", None);
        assert_eq!(resolved.canonical_id, "gemini-3.0-pro");
        assert_eq!(resolved.variant.as_deref(), Some("high"));
        assert_eq!(resolved.enum_value, 212);
    }

    #[test]
    fn suffix_variant_without_colon_is_parsed() {
        let resolved = resolve("gemini-3.0-pro-high", None);
        assert_eq!(resolved.canonical_id, "gemini-3.0-pro");
        assert_eq!(resolved.variant.as_deref(), Some("high"));
    }

    #[test]
    fn string_uid_routing_for_opus_thinking() {
        let resolved = resolve("claude-4.6-opus:thinking", None);
        assert_eq!(resolved.enum_value, 0);
        assert_eq!(resolved.model_uid.as_deref(), Some("claude-opus-4-6-thinking"));
    }

    #[test]
    fn enum_routing_has_no_model_uid() {
        let resolved = resolve("gemini-3.0-pro:low", None);
        assert_eq!(resolved.model_uid, None);
        assert_ne!(resolved.enum_value, 0);
    }

    #[test]
    fn unknown_model_falls_back_to_default() {
        let resolved = resolve("unknown-model", None);
        assert_eq!(resolved.canonical_id, "claude-3.5-sonnet");
        assert_eq!(resolved.enum_value, 166);
    }

    #[test]
    fn override_variant_beats_inline_variant() {
        let resolved = resolve("claude-4.6-opus:thinking", Some("fast"));
        assert_eq!(resolved.variant.as_deref(), Some("fast"));
        assert_eq!(resolved.model_uid.as_deref(), Some("claude-opus-4-6-fast"));
    }

    #[test]
    fn alias_resolves_to_canonical() {
        let resolved = resolve("opus-4.6:fast", None);
        assert_eq!(resolved.canonical_id, "claude-4.6-opus");
    }

    #[test]
    fn resolver_is_deterministic() {
        let a = resolve("claude-4.6-sonnet:1m", None);
        let b = resolve("claude-4.6-sonnet:1m", None);
        assert_eq!(a, b);
    }

    #[test]
    fn resolver_round_trips_through_its_own_output() {
        let first = resolve("gemini-3.0-pro", Some("high"));
        let rebuilt = format!("{}:{}", first.canonical_id, first.variant.clone().unwrap());
        let second = resolve(&rebuilt, None);
        assert_eq!(first, second);
    }

    #[test]
    fn models_without_variants_default_to_flat_enum() {
        let resolved = resolve("claude-3.5-sonnet", None);
        assert_eq!(resolved.variant, None);
        assert_eq!(resolved.enum_value, 166);
    }
}
