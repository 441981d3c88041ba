//! Configuration settings structures.
//!
//! These structs represent the full `rsnmp` configuration tree, matching
//! the keys in `rsnmp.yml` / its environment-variable overlay.

use serde::{Deserialize, Serialize};

use crate::snmp::message::SnmpVersion;

/// Per-call knobs shared by `snmp::client` and `snmp::walk`: community,
/// protocol version, timing, retry budget, and bulk-walk bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientOptions {
    /// Community string used to frame outgoing requests.
    pub community: String,
    /// Default protocol version for targets that don't specify their own.
    #[serde(with = "version_serde")]
    pub version: SnmpVersion,
    /// Per-request timeout, in milliseconds.
    pub timeout_ms: u64,
    /// Number of retries after the first attempt times out.
    pub retries: u32,
    /// Default agent UDP port.
    pub port: u16,
    /// Starting `max-repetitions` for a GetBulk-driven walk.
    pub max_repetitions: u32,
    /// `non-repeaters` for a GetBulk-driven walk.
    pub non_repeaters: u32,
    /// Lower bound the adaptive bulk-sizer will not go below on `tooBig`.
    pub bulk_floor: u32,
    /// Upper bound the adaptive bulk-sizer will not grow past.
    pub bulk_ceiling: u32,
    /// Maximum number of in-flight requests for a multi-target fan-out.
    pub max_concurrent: usize,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            community: "public".into(),
            version: SnmpVersion::V2c,
            timeout_ms: 5_000,
            retries: 3,
            port: 161,
            max_repetitions: 25,
            non_repeaters: 0,
            bulk_floor: 5,
            bulk_ceiling: 100,
            max_concurrent: 50,
        }
    }
}

mod version_serde {
    use super::SnmpVersion;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    enum Wire {
        V1,
        V2c,
    }

    pub fn serialize<S: Serializer>(v: &SnmpVersion, s: S) -> Result<S::Ok, S::Error> {
        let wire = match v {
            SnmpVersion::V1 => Wire::V1,
            SnmpVersion::V2c => Wire::V2c,
        };
        wire.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<SnmpVersion, D::Error> {
        Ok(match Wire::deserialize(d)? {
            Wire::V1 => SnmpVersion::V1,
            Wire::V2c => SnmpVersion::V2c,
        })
    }
}

/// Top-level `rsnmp` configuration: the client defaults plus logging.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RsnmpConfig {
    /// `tracing-subscriber` `EnvFilter` directive, e.g. `"info"` or
    /// `"rsnmp=debug,warn"`.
    pub log: LogConfig,
    pub client: ClientOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: "warn".into() }
    }
}

impl RsnmpConfig {
    /// Apply overrides from a YAML value (an overlay file layered on top
    /// of the built-in defaults).
    pub fn apply_overrides(&mut self, overrides: &serde_yaml::Value) -> crate::error::Result<()> {
        if let Some(log) = overrides.get("log") {
            if let Some(level) = log.get("level").and_then(|v| v.as_str()) {
                self.log.level = level.to_string();
            }
        }
        if let Some(client) = overrides.get("client") {
            if let Some(v) = client.get("community").and_then(|v| v.as_str()) {
                self.client.community = v.to_string();
            }
            if let Some(v) = client.get("timeout_ms").and_then(|v| v.as_u64()) {
                self.client.timeout_ms = v;
            }
            if let Some(v) = client.get("retries").and_then(|v| v.as_u64()) {
                self.client.retries = v as u32;
            }
            if let Some(v) = client.get("port").and_then(|v| v.as_u64()) {
                self.client.port = v as u16;
            }
            if let Some(v) = client.get("max_repetitions").and_then(|v| v.as_u64()) {
                self.client.max_repetitions = v as u32;
            }
            if let Some(v) = client.get("max_concurrent").and_then(|v| v.as_u64()) {
                self.client.max_concurrent = v as usize;
            }
        }
        Ok(())
    }

    /// Apply environment variable overrides (for container deployment).
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("RSNMP_COMMUNITY") {
            self.client.community = v;
        }
        if let Ok(v) = std::env::var("RSNMP_TIMEOUT_MS") {
            if let Ok(n) = v.parse() {
                self.client.timeout_ms = n;
            }
        }
        if let Ok(v) = std::env::var("RSNMP_RETRIES") {
            if let Ok(n) = v.parse() {
                self.client.retries = n;
            }
        }
        if let Ok(v) = std::env::var("RSNMP_LOG") {
            self.log.level = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_specification() {
        let opts = ClientOptions::default();
        assert_eq!(opts.community, "public");
        assert_eq!(opts.version, SnmpVersion::V2c);
        assert_eq!(opts.timeout_ms, 5_000);
        assert_eq!(opts.retries, 3);
        assert_eq!(opts.port, 161);
        assert_eq!(opts.max_repetitions, 25);
        assert_eq!(opts.max_concurrent, 50);
    }

    #[test]
    fn version_round_trips_through_yaml() {
        let opts = ClientOptions {
            version: SnmpVersion::V1,
            ..ClientOptions::default()
        };
        let yaml = serde_yaml::to_string(&opts).unwrap();
        let back: ClientOptions = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.version, SnmpVersion::V1);
    }

    #[test]
    fn apply_overrides_updates_selected_fields_only() {
        let mut cfg = RsnmpConfig::default();
        let overrides: serde_yaml::Value = serde_yaml::from_str("client:\n  community: private\n  retries: 5\n").unwrap();
        cfg.apply_overrides(&overrides).unwrap();
        assert_eq!(cfg.client.community, "private");
        assert_eq!(cfg.client.retries, 5);
        assert_eq!(cfg.client.timeout_ms, 5_000);
    }

    #[test]
    fn env_overrides_take_precedence() {
        std::env::set_var("RSNMP_COMMUNITY", "env-community");
        let mut cfg = RsnmpConfig::default();
        cfg.apply_env_overrides();
        assert_eq!(cfg.client.community, "env-community");
        std::env::remove_var("RSNMP_COMMUNITY");
    }
}
