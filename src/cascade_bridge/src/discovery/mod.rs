use bridge_types::prelude::MetadataFieldMap;
use regex::Regex;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Candidate locations for the vendor's bundled extension asset, per platform.
/// The first existing path wins.
fn candidate_asset_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(home) = dirs::home_dir() {
        #[cfg(target_os = "macos")]
        paths.push(home.join("Applications/Windsurf.app/Contents/Resources/app/extensions/windsurf/dist/extension.js"));
        #[cfg(target_os = "linux")]
        {
            paths.push(home.join(".windsurf/extensions/windsurf.windsurf/dist/extension.js"));
            paths.push(PathBuf::from(
                "/usr/share/windsurf/resources/app/extensions/windsurf/dist/extension.js",
            ));
        }
        #[cfg(target_os = "windows")]
        paths.push(home.join("AppData/Local/Programs/Windsurf/resources/app/extensions/windsurf/dist/extension.js"));
    }
    paths
}

/// Discovers the `Metadata` message field-number map from the vendor's
/// bundled asset. Falls back to `MetadataFieldMap::default()` if the asset
/// cannot be found or the pattern does not match, since field numbers only
/// ever drift, never disappear, between vendor versions.
pub fn discover_metadata_field_map() -> MetadataFieldMap {
    for path in candidate_asset_paths() {
        if let Ok(text) = std::fs::read_to_string(&path) {
            if let Some(map) = extract_metadata_field_map(&text) {
                debug!(path = %path.display(), "discovered metadata field map");
                return map;
            }
        }
    }
    warn!("metadata field map discovery failed, using defaults");
    MetadataFieldMap::default()
}

/// Finds the `newFieldList(() => [...])` block that looks like the
/// `Metadata` message (contains `api_key` and `ide_name`, but not
/// `event_name`, which would indicate a telemetry message instead) and
/// extracts `{no, name}` pairs for the six recognized field names.
fn extract_metadata_field_map(source: &str) -> Option<MetadataFieldMap> {
    let block_re = Regex::new(r"newFieldList\(\(\)\s*=>\s*\[(?s)(.*?)\]\)").ok()?;
    let entry_re = Regex::new(r#"no\s*:\s*(\d+)\s*,\s*name\s*:\s*"([a-zA-Z_]+)""#).ok()?;

    for block in block_re.captures_iter(source) {
        let body = block.get(1)?.as_str();
        if !(body.contains("\"api_key\"") && body.contains("\"ide_name\"")) || body.contains("\"event_name\"") {
            continue;
        }
        let mut map = MetadataFieldMap::default();
        let mut found_any = false;
        for entry in entry_re.captures_iter(body) {
            let no: u32 = entry.get(1)?.as_str().parse().ok()?;
            let name = entry.get(2)?.as_str();
            found_any = true;
            match name {
                "api_key" => map.api_key = no,
                "ide_name" => map.ide_name = no,
                "ide_version" => map.ide_version = no,
                "extension_version" => map.extension_version = no,
                "session_id" => map.session_id = no,
                "locale" => map.locale = no,
                _ => {}
            }
        }
        if found_any {
            return Some(map);
        }
    }
    None
}

/// Names filtered from the model enum listing: telemetry/embedding/tab/
/// preview/BYOK/private/experimental entries are not real chat models.
const ENUM_IGNORE_SUBSTRINGS: &[&str] = &[
    "TELEMETRY", "EMBEDDING", "TAB_", "PREVIEW", "BYOK", "PRIVATE", "EXPERIMENTAL",
];

/// Maintenance-tooling extraction of the vendor's `Model` enum from the same
/// asset. Not wired to any runtime path or CLI subcommand (see DESIGN.md);
/// kept as a library function exercised by its unit test fixture.
pub fn extract_model_enum(source: &str) -> Vec<(u32, String)> {
    let Ok(block_re) = Regex::new(
        r#"setEnumType\(\s*_\s*,\s*"exa\.codeium_common_pb\.Model"\s*,\s*\[(?s)(.*?)\]\s*\)"#,
    ) else {
        return Vec::new();
    };
    let Ok(entry_re) = Regex::new(r#"no\s*:\s*(\d+)\s*,\s*name\s*:\s*"([A-Za-z0-9_]+)""#) else {
        return Vec::new();
    };

    let Some(block) = block_re.captures(source) else {
        return Vec::new();
    };
    let body = block.get(1).map(|m| m.as_str()).unwrap_or_default();

    entry_re
        .captures_iter(body)
        .filter_map(|c| {
            let no: u32 = c.get(1)?.as_str().parse().ok()?;
            let name = c.get(2)?.as_str().to_string();
            if ENUM_IGNORE_SUBSTRINGS.iter().any(|s| name.contains(s)) {
                None
            } else {
                Some((no, name))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_METADATA_BLOCK: &str = r#"
        var Metadata = newFieldList(() => [
            {no: 1, name: "api_key", kind: "scalar"},
            {no: 2, name: "ide_name", kind: "scalar"},
            {no: 3, name: "ide_version", kind: "scalar"},
            {no: 4, name: "extension_version", kind: "scalar"},
            {no: 5, name: "session_id", kind: "scalar"},
            {no: 6, name: "locale", kind: "scalar"},
        ]);
    "#;

    #[test]
    fn extracts_field_map_from_sample_asset() {
        let map = extract_metadata_field_map(SAMPLE_METADATA_BLOCK).unwrap();
        assert_eq!(map, MetadataFieldMap::default());
    }

    #[test]
    fn shifted_field_numbers_are_honored() {
        let shifted = SAMPLE_METADATA_BLOCK.replace("no: 1, name: \"api_key\"", "no: 9, name: \"api_key\"");
        let map = extract_metadata_field_map(&shifted).unwrap();
        assert_eq!(map.api_key, 9);
        assert_eq!(map.ide_name, 2);
    }

    #[test]
    fn telemetry_block_is_rejected() {
        let telemetry = r#"
            var Telemetry = newFieldList(() => [
                {no: 1, name: "api_key"},
                {no: 2, name: "ide_name"},
                {no: 3, name: "event_name"},
            ]);
        "#;
        assert!(extract_metadata_field_map(telemetry).is_none());
    }

    #[test]
    fn missing_asset_falls_back_to_defaults() {
        assert!(extract_metadata_field_map("no matching content here").is_none());
    }

    #[test]
    fn extracts_model_enum_and_filters_ignored_entries() {
        let source = r#"
            setEnumType(_, "exa.codeium_common_pb.Model", [
                {no: 1, name: "MODEL_UNSPECIFIED"},
                {no: 166, name: "MODEL_CLAUDE_3_5_SONNET"},
                {no: 200, name: "MODEL_TAB_COMPLETION_V2"},
                {no: 201, name: "MODEL_EMBEDDING_ADA"},
            ]);
        "#;
        let entries = extract_model_enum(source);
        assert_eq!(
            entries,
            vec![
                (1, "MODEL_UNSPECIFIED".to_string()),
                (166, "MODEL_CLAUDE_3_5_SONNET".to_string()),
            ]
        );
    }
}
