use clap::Parser;
use std::time::Duration;

/// Process-wide operational configuration. CLI flags win over the matching
/// environment variable, which wins over the built-in default (`clap`'s
/// `env` attribute resolves that precedence for us).
#[derive(Parser, Debug, Clone)]
#[command(name = "cascade-bridge", about = "OpenAI-compatible bridge for the Windsurf local language server")]
pub struct BridgeConfig {
    #[arg(long, env = "CASCADE_BRIDGE_PORT", default_value_t = 9494)]
    pub listen_port: u16,

    #[arg(long, env = "CASCADE_BRIDGE_LOG_FORMAT", default_value = "compact")]
    pub log_format: String,

    #[arg(long, default_value_t = 5)]
    pub credential_cache_ttl_secs: u64,

    #[arg(long, default_value_t = 1500)]
    pub poll_interval_ms: u64,

    #[arg(long, default_value_t = 60)]
    pub poll_max_attempts: u32,
}

impl BridgeConfig {
    pub fn credential_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.credential_cache_ttl_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn is_json_log_format(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse_with_no_arguments() {
        let config = BridgeConfig::parse_from(["cascade-bridge"]);
        assert_eq!(config.listen_port, 9494);
        assert_eq!(config.log_format, "compact");
        assert_eq!(config.poll_max_attempts, 60);
    }

    #[test]
    fn explicit_flag_overrides_default() {
        let config = BridgeConfig::parse_from(["cascade-bridge", "--listen-port", "8080"]);
        assert_eq!(config.listen_port, 8080);
    }

    #[test]
    fn json_log_format_is_case_insensitive() {
        let mut config = BridgeConfig::parse_from(["cascade-bridge"]);
        config.log_format = "JSON".to_string();
        assert!(config.is_json_log_format());
    }
}
