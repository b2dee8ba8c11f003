use rusqlite::Connection;
use serde_json::Value;
use std::path::PathBuf;
use tracing::debug;

const AUTH_STATUS_KEY: &str = "windsurf.codeium/auth/status";

fn state_vscdb_path() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    return dirs::home_dir().map(|h| {
        h.join("Library/Application Support/Windsurf/User/globalStorage/state.vscdb")
    });
    #[cfg(target_os = "linux")]
    return dirs::config_dir().map(|c| c.join("Windsurf/User/globalStorage/state.vscdb"));
    #[cfg(target_os = "windows")]
    return dirs::data_dir().map(|d| d.join("Windsurf/User/globalStorage/state.vscdb"));
    #[allow(unreachable_code)]
    None
}

fn legacy_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".codeium/config.json"))
}

/// Reads the Windsurf API key, preferring the SQLite-backed editor state
/// and falling back to the legacy flat config file.
pub fn read_api_key() -> Option<String> {
    if let Some(path) = state_vscdb_path() {
        if let Some(key) = read_api_key_from_vscdb(&path) {
            return Some(key);
        }
    }
    if let Some(path) = legacy_config_path() {
        if let Some(key) = read_api_key_from_legacy_json(&path) {
            return Some(key);
        }
    }
    None
}

fn read_api_key_from_vscdb(path: &PathBuf) -> Option<String> {
    let conn = Connection::open_with_flags(
        path,
        rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
    )
    .ok()?;
    let value: String = conn
        .query_row(
            "SELECT value FROM ItemTable WHERE key = ?1",
            [AUTH_STATUS_KEY],
            |row| row.get(0),
        )
        .ok()?;
    let parsed: Value = serde_json::from_str(&value).ok()?;
    let key = parsed.get("apiKey")?.as_str()?.to_string();
    debug!(path = %path.display(), "read api key from state.vscdb");
    Some(key)
}

fn read_api_key_from_legacy_json(path: &PathBuf) -> Option<String> {
    let text = std::fs::read_to_string(path).ok()?;
    let parsed: Value = serde_json::from_str(&text).ok()?;
    let key = parsed.get("apiKey")?.as_str()?.to_string();
    debug!(path = %path.display(), "read api key from legacy config.json");
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_json_extracts_api_key() {
        let dir = std::env::temp_dir().join(format!("cascade_bridge_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, r#"{"apiKey": "test-key-123"}"#).unwrap();
        assert_eq!(
            read_api_key_from_legacy_json(&path),
            Some("test-key-123".to_string())
        );
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn legacy_json_missing_key_returns_none() {
        let dir = std::env::temp_dir().join(format!("cascade_bridge_test2_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, r#"{"other": "value"}"#).unwrap();
        assert_eq!(read_api_key_from_legacy_json(&path), None);
        std::fs::remove_dir_all(&dir).ok();
    }
}
