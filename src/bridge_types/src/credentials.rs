use serde::{Deserialize, Serialize};

/// Values resolved from the running Windsurf language server.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub csrf_token: String,
    pub grpc_port: u16,
    pub api_key: String,
    pub version: String,
}

/// Protobuf field numbers for the `Metadata` message, as discovered from the
/// installed extension asset. Falls back to `MetadataFieldMap::default()`
/// when discovery fails.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetadataFieldMap {
    pub api_key: u32,
    pub ide_name: u32,
    pub ide_version: u32,
    pub extension_version: u32,
    pub session_id: u32,
    pub locale: u32,
}

impl Default for MetadataFieldMap {
    fn default() -> Self {
        MetadataFieldMap {
            api_key: 1,
            ide_name: 2,
            ide_version: 3,
            extension_version: 4,
            session_id: 5,
            locale: 6,
        }
    }
}
