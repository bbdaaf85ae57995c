//! Configuration for the GoBGP exporter.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::family::AddressFamily;

/// Token that disables authorization when present in the token set.
pub const ANONYMOUS_TOKEN: &str = "anonymous";

/// Upper bound for `timeout_secs`.
pub const MAX_TIMEOUT_SECS: u64 = 300;

/// Upper bound for `poll_interval_secs` (one day).
pub const MAX_POLL_INTERVAL_SECS: u64 = 86_400;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] json5::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Complete exporter configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExporterConfig {
    /// GoBGP API connection settings.
    #[serde(default)]
    pub gobgp: GobgpConfig,

    /// HTTP endpoint settings.
    #[serde(default)]
    pub http: HttpConfig,

    /// Access tokens.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// GoBGP API connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GobgpConfig {
    /// gRPC API address (default: "127.0.0.1:50051").
    #[serde(default = "default_address")]
    pub address: String,

    /// Per-request timeout in seconds (default: 2).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Minimum interval between collections in seconds (default: 15).
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Address families to query routing tables for (default: all).
    #[serde(default = "default_address_families")]
    pub address_families: Vec<AddressFamily>,

    /// TLS settings for the gRPC channel.
    #[serde(default)]
    pub tls: TlsConfig,
}

fn default_address() -> String {
    "127.0.0.1:50051".to_string()
}

fn default_timeout() -> u64 {
    2
}

fn default_poll_interval() -> u64 {
    15
}

fn default_address_families() -> Vec<AddressFamily> {
    AddressFamily::ALL.to_vec()
}

impl Default for GobgpConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            timeout_secs: default_timeout(),
            poll_interval_secs: default_poll_interval(),
            address_families: default_address_families(),
            tls: TlsConfig::default(),
        }
    }
}

impl GobgpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

/// TLS configuration for the GoBGP channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlsConfig {
    /// Enable TLS.
    #[serde(default)]
    pub enabled: bool,

    /// PEM file with CA certificates to trust (default: system roots).
    #[serde(default)]
    pub ca_cert: Option<String>,

    /// Hostname to verify the server certificate against.
    #[serde(default)]
    pub server_name: Option<String>,

    /// PEM client certificate for mutual TLS.
    #[serde(default)]
    pub client_cert: Option<String>,

    /// PEM client key for mutual TLS.
    #[serde(default)]
    pub client_key: Option<String>,
}

/// HTTP endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Address to listen on (default: "0.0.0.0:9474").
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Path for metrics endpoint (default: "/metrics").
    #[serde(default = "default_path")]
    pub path: String,
}

fn default_listen() -> String {
    "0.0.0.0:9474".to_string()
}

fn default_path() -> String {
    "/metrics".to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            path: default_path(),
        }
    }
}

/// Authorization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Accepted tokens; `"anonymous"` allows every request.
    #[serde(default = "default_tokens")]
    pub tokens: Vec<String>,
}

fn default_tokens() -> Vec<String> {
    vec![ANONYMOUS_TOKEN.to_string()]
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            tokens: default_tokens(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format: "text" or "json".
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl ExporterConfig {
    /// Load configuration from a JSON5 file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a JSON5 string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: ExporterConfig = json5::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gobgp.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "timeout_secs must be > 0".to_string(),
            ));
        }

        if self.gobgp.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ConfigError::Validation(format!(
                "timeout_secs must be <= {}",
                MAX_TIMEOUT_SECS
            )));
        }

        if self.gobgp.poll_interval_secs > MAX_POLL_INTERVAL_SECS {
            return Err(ConfigError::Validation(format!(
                "poll_interval_secs must be <= {}",
                MAX_POLL_INTERVAL_SECS
            )));
        }

        if self.gobgp.address_families.is_empty() {
            return Err(ConfigError::Validation(
                "address_families must not be empty".to_string(),
            ));
        }

        let tls = &self.gobgp.tls;
        if tls.client_cert.is_some() != tls.client_key.is_some() {
            return Err(ConfigError::Validation(
                "client_cert and client_key must be set together".to_string(),
            ));
        }

        if self.http.listen.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::Validation(format!(
                "Invalid listen address: {}",
                self.http.listen
            )));
        }

        if !self.http.path.starts_with('/') {
            return Err(ConfigError::Validation(
                "Metrics path must start with /".to_string(),
            ));
        }

        if self.http.path == "/" || self.http.path == "/health" {
            return Err(ConfigError::Validation(format!(
                "Metrics path {} is reserved",
                self.http.path
            )));
        }

        if self.auth.tokens.is_empty() {
            return Err(ConfigError::Validation(
                "at least one auth token is required".to_string(),
            ));
        }

        if self.auth.tokens.iter().any(String::is_empty) {
            return Err(ConfigError::Validation(
                "auth tokens must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let config = ExporterConfig::parse("{}").unwrap();

        assert_eq!(config.gobgp.address, "127.0.0.1:50051");
        assert_eq!(config.gobgp.timeout(), Duration::from_secs(2));
        assert_eq!(config.gobgp.poll_interval(), Duration::from_secs(15));
        assert_eq!(config.gobgp.address_families.len(), 14);
        assert!(!config.gobgp.tls.enabled);
        assert_eq!(config.http.listen, "0.0.0.0:9474");
        assert_eq!(config.http.path, "/metrics");
        assert_eq!(config.auth.tokens, vec!["anonymous"]);
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            gobgp: {
                address: "dns:///gobgp.local:50051",
                timeout_secs: 5,
                poll_interval_secs: 30,
                address_families: ["ipv4", "ipv6", "l2_vpn_flowspec"],
                tls: {
                    enabled: true,
                    ca_cert: "/etc/gobgp/ca.pem",
                    server_name: "gobgp.local",
                    client_cert: "/etc/gobgp/client.pem",
                    client_key: "/etc/gobgp/client.key",
                },
            },
            http: {
                listen: "127.0.0.1:9475",
                path: "/gobgp/metrics",
            },
            auth: { tokens: ["secret", "other"] },
            logging: { level: "debug", format: "json" },
        }"#;

        let config = ExporterConfig::parse(json).unwrap();

        assert_eq!(config.gobgp.address, "dns:///gobgp.local:50051");
        assert_eq!(config.gobgp.timeout_secs, 5);
        assert_eq!(config.gobgp.poll_interval_secs, 30);
        assert_eq!(
            config.gobgp.address_families,
            vec![
                AddressFamily::Ipv4,
                AddressFamily::Ipv6,
                AddressFamily::L2VpnFlowspec
            ]
        );
        assert!(config.gobgp.tls.enabled);
        assert_eq!(config.gobgp.tls.server_name.as_deref(), Some("gobgp.local"));
        assert_eq!(config.http.path, "/gobgp/metrics");
        assert_eq!(config.auth.tokens, vec!["secret", "other"]);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_unknown_family_rejected() {
        let result = ExporterConfig::parse(r#"{ gobgp: { address_families: ["ipv5"] } }"#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_validate_invalid_listen() {
        let result = ExporterConfig::parse(r#"{ http: { listen: "not-an-address" } }"#);
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Invalid listen address")
        );
    }

    #[test]
    fn test_validate_invalid_path() {
        let result = ExporterConfig::parse(r#"{ http: { path: "no-leading-slash" } }"#);
        assert!(result.unwrap_err().to_string().contains("must start with /"));
    }

    #[test]
    fn test_validate_reserved_path() {
        let result = ExporterConfig::parse(r#"{ http: { path: "/health" } }"#);
        assert!(result.unwrap_err().to_string().contains("reserved"));
    }

    #[test]
    fn test_validate_zero_timeout() {
        let result = ExporterConfig::parse(r#"{ gobgp: { timeout_secs: 0 } }"#);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validate_interval_bounds() {
        let result =
            ExporterConfig::parse(r#"{ gobgp: { poll_interval_secs: 18446744073709551615 } }"#);
        assert!(result.unwrap_err().to_string().contains("poll_interval_secs"));

        let result = ExporterConfig::parse(r#"{ gobgp: { timeout_secs: 301 } }"#);
        assert!(result.unwrap_err().to_string().contains("timeout_secs"));

        let config = ExporterConfig::parse(r#"{ gobgp: { poll_interval_secs: 86400 } }"#).unwrap();
        assert_eq!(config.gobgp.poll_interval(), Duration::from_secs(86_400));
    }

    #[test]
    fn test_validate_client_identity_pairs() {
        let result =
            ExporterConfig::parse(r#"{ gobgp: { tls: { client_cert: "/tmp/cert.pem" } } }"#);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validate_tokens() {
        assert!(ExporterConfig::parse(r#"{ auth: { tokens: [] } }"#).is_err());
        assert!(ExporterConfig::parse(r#"{ auth: { tokens: [""] } }"#).is_err());
    }

    #[test]
    fn test_empty_families_rejected() {
        let result = ExporterConfig::parse(r#"{ gobgp: { address_families: [] } }"#);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exporter.json5");
        std::fs::write(&path, "{ gobgp: { poll_interval_secs: 5 } }").unwrap();

        let config = ExporterConfig::load_from_file(&path).unwrap();
        assert_eq!(config.gobgp.poll_interval_secs, 5);

        let missing = ExporterConfig::load_from_file(dir.path().join("missing.json5"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
