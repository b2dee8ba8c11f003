use crate::cascade::fingerprint::device_fingerprint;
use crate::core::config::BridgeConfig;
use crate::credentials::CredentialResolver;
use bridge_types::prelude::MetadataFieldMap;
use std::sync::atomic::AtomicU64;
use std::sync::{Arc, OnceLock};

/// Shared state threaded through every request handler.
pub struct AppState {
    pub config: BridgeConfig,
    pub credentials: CredentialResolver,
    pub session_id: String,
    pub device_fingerprint: String,
    pub request_counter: AtomicU64,
    metadata_field_map: OnceLock<MetadataFieldMap>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(config: BridgeConfig) -> Self {
        let credentials = CredentialResolver::new(config.credential_cache_ttl());
        AppState {
            credentials,
            session_id: uuid::Uuid::new_v4().to_string(),
            device_fingerprint: device_fingerprint(),
            request_counter: AtomicU64::new(0),
            metadata_field_map: OnceLock::new(),
            config,
        }
    }

    pub fn metadata_field_map(&self) -> &MetadataFieldMap {
        self.metadata_field_map
            .get_or_init(crate::discovery::discover_metadata_field_map)
    }

    pub fn next_request_ordinal(&self) -> u64 {
        self.request_counter
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed)
    }
}
