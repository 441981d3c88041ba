//! Configuration loading: layered the same way the rest of the crate's
//! ancestry does it -- built-in defaults, then an optional YAML file,
//! then environment variable overrides.

pub mod settings;

use std::path::{Path, PathBuf};

use tracing::info;

pub use settings::*;

use crate::error::Result;

/// Load configuration in three layers:
/// 1. Built-in defaults ([`RsnmpConfig::default`])
/// 2. `rsnmp.yml` in `config_dir` (or `$RSNMP_HOME`, or the user's home
///    directory) if present
/// 3. Environment variable overrides
pub fn load(config_dir: Option<&Path>) -> Result<RsnmpConfig> {
    let home = config_dir
        .map(PathBuf::from)
        .or_else(|| std::env::var("RSNMP_HOME").ok().map(PathBuf::from))
        .or_else(dirs::home_dir);

    let mut config = RsnmpConfig::default();

    if let Some(home) = home {
        let config_path = home.join(crate::DEFAULT_CONFIG_FILE);
        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let overrides: serde_yaml::Value = serde_yaml::from_str(&contents).map_err(|e| {
                crate::error::SnmpError::UnsupportedFormat(format!(
                    "failed to parse {}: {e}",
                    config_path.display()
                ))
            })?;
            config.apply_overrides(&overrides)?;
            info!(path = %config_path.display(), "loaded configuration overrides");
        }
    }

    config.apply_env_overrides();
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_with_no_files_returns_defaults() {
        let dir = std::env::temp_dir().join("rsnmp-config-test-empty");
        let _ = std::fs::create_dir_all(&dir);
        let config = load(Some(&dir)).unwrap();
        assert_eq!(config.client.community, "public");
    }

    #[test]
    fn load_applies_yaml_overlay() {
        let dir = std::env::temp_dir().join("rsnmp-config-test-overlay");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("rsnmp.yml"), "client:\n  community: overlaid\n").unwrap();
        let config = load(Some(&dir)).unwrap();
        assert_eq!(config.client.community, "overlaid");
    }
}
