//! rsnmp - an SNMP v1/v2c toolkit for polling, querying, and walking
//! managed devices at scale.
//!
//! `snmp::client` exposes the single-target get/get-next/set/get-bulk
//! operations, `snmp::walk` the subtree-walking state machine, and
//! `snmp::multi` the bounded-concurrency multi-target driver. `config`
//! layers built-in defaults, an optional YAML file, and environment
//! variables into a single [`config::ClientOptions`].

pub mod config;
pub mod error;
pub mod snmp;

/// Crate version, as declared in `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default SNMP agent UDP port.
pub const DEFAULT_SNMP_PORT: u16 = 161;

/// Default configuration file name searched for by [`config::load`].
pub const DEFAULT_CONFIG_FILE: &str = "rsnmp.yml";

/// Bind a new [`snmp::Engine`] and build a single-target driver with the
/// default [`config::ClientOptions`] -- the common case for a one-off
/// script that just wants to poll a device.
pub async fn default_engine() -> error::Result<snmp::Engine> {
    snmp::Engine::new().await
}
