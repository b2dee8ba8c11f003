mod auth_store;
mod port;
mod process;

use bridge_types::prelude::{BridgeError, BridgeResult, Credentials};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{info, warn};

struct CachedCredentials {
    value: Credentials,
    fetched_at: Instant,
}

/// Guards a short-lived cache of the last successfully resolved credentials,
/// avoiding a full process/port/SQLite scan on every request.
pub struct CredentialResolver {
    ttl: Duration,
    cache: Mutex<Option<CachedCredentials>>,
}

impl CredentialResolver {
    pub fn new(ttl: Duration) -> Self {
        CredentialResolver {
            ttl,
            cache: Mutex::new(None),
        }
    }

    /// Resolves credentials, using the cache when fresh. Blocking OS work
    /// (process enumeration, socket table parsing, SQLite reads) is run on
    /// a blocking thread so it never stalls the async executor.
    pub async fn resolve(&self) -> BridgeResult<Credentials> {
        if let Some(cached) = self.cached_if_fresh() {
            return Ok(cached);
        }
        let fresh = tokio::task::spawn_blocking(resolve_credentials_blocking)
            .await
            .map_err(|e| BridgeError::Internal(format!("credential resolver task panicked: {e}")))??;

        let mut guard = self.cache.lock().unwrap();
        *guard = Some(CachedCredentials {
            value: fresh.clone(),
            fetched_at: Instant::now(),
        });
        Ok(fresh)
    }

    fn cached_if_fresh(&self) -> Option<Credentials> {
        let guard = self.cache.lock().unwrap();
        let cached = guard.as_ref()?;
        if cached.fetched_at.elapsed() < self.ttl {
            Some(cached.value.clone())
        } else {
            None
        }
    }

    /// Drops the cached value; called by the Cascade client after a
    /// connection failure so the next request re-resolves from scratch.
    pub fn invalidate(&self) {
        let mut guard = self.cache.lock().unwrap();
        *guard = None;
    }
}

fn resolve_credentials_blocking() -> BridgeResult<Credentials> {
    let servers = process::enumerate_language_servers();
    let Some(server) = servers.into_iter().next() else {
        warn!("no running windsurf language server process found");
        return Err(BridgeError::NotRunning);
    };

    if server.csrf_token.is_empty() {
        return Err(BridgeError::CsrfMissing);
    }

    let grpc_port = port::discover_grpc_port(server.pid, server.extension_server_port);

    let api_key = auth_store::read_api_key().ok_or(BridgeError::ApiKeyMissing)?;

    info!(pid = server.pid, grpc_port, "resolved windsurf credentials");
    Ok(Credentials {
        csrf_token: server.csrf_token,
        grpc_port,
        api_key,
        version: server.version,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fresh_cache_entry_is_reused_without_rescanning() {
        let resolver = CredentialResolver::new(Duration::from_secs(60));
        {
            let mut guard = resolver.cache.lock().unwrap();
            *guard = Some(CachedCredentials {
                value: Credentials {
                    csrf_token: "abc".into(),
                    grpc_port: 4242,
                    api_key: "key".into(),
                    version: "1.0.0".into(),
                },
                fetched_at: Instant::now(),
            });
        }
        let resolved = resolver.resolve().await.unwrap();
        assert_eq!(resolved.grpc_port, 4242);
    }

    #[test]
    fn invalidate_clears_cache() {
        let resolver = CredentialResolver::new(Duration::from_secs(60));
        {
            let mut guard = resolver.cache.lock().unwrap();
            *guard = Some(CachedCredentials {
                value: Credentials {
                    csrf_token: "abc".into(),
                    grpc_port: 1,
                    api_key: "k".into(),
                    version: "v".into(),
                },
                fetched_at: Instant::now(),
            });
        }
        resolver.invalidate();
        assert!(resolver.cached_if_fresh().is_none());
    }
}
