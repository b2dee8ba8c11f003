use crate::wire::MessageBuilder;
use bridge_types::prelude::{Credentials, MetadataFieldMap};

const FIELD_EXTENSION_NAME: u32 = 12;
const FIELD_OS: u32 = 5;
const FIELD_REQUEST_COUNTER: u32 = 9;
const FIELD_DEVICE_FINGERPRINT: u32 = 24;

fn current_os() -> &'static str {
    if cfg!(target_os = "macos") {
        "macos"
    } else if cfg!(target_os = "windows") {
        "windows"
    } else {
        "linux"
    }
}

/// Builds the `Metadata` sub-message sent on every Cascade RPC, using the
/// discovered (or default) field-number map for the version-sensitive
/// fields and fixed field numbers for the ones observed stable across
/// vendor versions.
pub fn build_metadata(
    fields: &MetadataFieldMap,
    credentials: &Credentials,
    session_id: &str,
    device_fingerprint: &str,
    request_ordinal: u64,
) -> MessageBuilder {
    MessageBuilder::new()
        .field_string(fields.api_key, &credentials.api_key)
        .field_string(fields.ide_name, "windsurf")
        .field_string(fields.ide_version, &credentials.version)
        .field_string(fields.extension_version, &credentials.version)
        .field_string(fields.session_id, session_id)
        .field_string(fields.locale, "en")
        .field_string(FIELD_EXTENSION_NAME, "windsurf")
        .field_string(FIELD_OS, current_os())
        .field_varint(FIELD_REQUEST_COUNTER, request_ordinal)
        .field_string(FIELD_DEVICE_FINGERPRINT, device_fingerprint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::scan_fields;

    #[test]
    fn metadata_contains_all_discovered_fields() {
        let fields = MetadataFieldMap::default();
        let creds = Credentials {
            csrf_token: "tok".into(),
            grpc_port: 1234,
            api_key: "key-abc".into(),
            version: "1.2.3".into(),
        };
        let msg = build_metadata(&fields, &creds, "session-1", "fingerprint-hex", 7).build();
        let scanned = scan_fields(&msg);
        let field_numbers: Vec<u32> = scanned.iter().map(|f| f.number).collect();
        assert!(field_numbers.contains(&fields.api_key));
        assert!(field_numbers.contains(&FIELD_DEVICE_FINGERPRINT));
        assert!(field_numbers.contains(&FIELD_REQUEST_COUNTER));
    }

    #[test]
    fn metadata_honors_shifted_field_numbers() {
        let mut fields = MetadataFieldMap::default();
        fields.api_key = 9;
        let creds = Credentials {
            csrf_token: "tok".into(),
            grpc_port: 1234,
            api_key: "key-abc".into(),
            version: "1.2.3".into(),
        };
        let msg = build_metadata(&fields, &creds, "session-1", "fp", 0).build();
        let scanned = scan_fields(&msg);
        let api_key_field = scanned.iter().find(|f| f.number == 9).unwrap();
        assert_eq!(api_key_field.as_string().as_deref(), Some("key-abc"));
    }
}
