pub mod model;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub use model::{AppConfig, KeyBindings, KeysConfig, LoggingConfig, UiConfig, WalletConfig};

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("crabwallet")
        .join("config.toml")
}

pub fn load_config() -> Result<AppConfig> {
    load_config_from(&config_path())
}

/// Load the config at `path`, or the defaults if there is no file.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    let config: AppConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("crabwallet-no-such-dir/config.toml");
        let config = load_config_from(&path).unwrap();
        assert_eq!(config.wallet.retry_attempts, 5);
    }

    #[test]
    fn test_parse_error_names_file() {
        let dir = std::env::temp_dir().join(format!("crabwallet-cfg-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "[ui\nshow_help_bar = 3").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(format!("{}", err).contains("config.toml"));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
