use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::model::Coordinates;

/// Environment variable that overrides the API key stored on disk.
pub const API_KEY_ENV: &str = "WEATHER_API_KEY";

pub const DEFAULT_LOCATION: &str = "Alexandria";
pub const DEFAULT_API_BASE: &str = "https://api.openweathermap.org";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// default_location = "Alexandria"
///
/// [home]
/// latitude = 31.2
/// longitude = 29.9
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub api_key: Option<String>,

    /// Location looked up when no device position is available.
    pub default_location: Option<String>,

    /// Provider root URL, e.g. for a proxy.
    pub api_base: Option<String>,

    /// Fixed device position used instead of a live geolocation source.
    pub home: Option<Coordinates>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-task", "weather-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Apply overrides from the process environment.
    pub fn with_env(mut self) -> Self {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            self.apply_api_key_override(Some(key));
        }
        self
    }

    fn apply_api_key_override(&mut self, key: Option<String>) {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
    }

    /// The configured key, or an empty string. A missing key is not validated:
    /// requests made with it simply fail at the provider.
    pub fn api_key_or_empty(&self) -> &str {
        self.api_key.as_deref().unwrap_or_default()
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    pub fn default_location(&self) -> &str {
        self.default_location
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_LOCATION)
    }

    pub fn api_base(&self) -> &str {
        self.api_base.as_deref().unwrap_or(DEFAULT_API_BASE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_unset() {
        let cfg = Config::default();

        assert_eq!(cfg.default_location(), "Alexandria");
        assert_eq!(cfg.api_base(), DEFAULT_API_BASE);
        assert_eq!(cfg.api_key_or_empty(), "");
        assert!(!cfg.has_api_key());
    }

    #[test]
    fn blank_default_location_falls_back() {
        let cfg = Config {
            default_location: Some("  ".into()),
            ..Config::default()
        };
        assert_eq!(cfg.default_location(), "Alexandria");
    }

    #[test]
    fn env_key_overrides_file_key() {
        let mut cfg = Config {
            api_key: Some("FILE_KEY".into()),
            ..Config::default()
        };

        cfg.apply_api_key_override(Some("ENV_KEY".into()));
        assert_eq!(cfg.api_key_or_empty(), "ENV_KEY");

        cfg.apply_api_key_override(Some("".into()));
        assert_eq!(cfg.api_key_or_empty(), "ENV_KEY");

        cfg.apply_api_key_override(None);
        assert_eq!(cfg.api_key_or_empty(), "ENV_KEY");
    }

    #[test]
    fn parses_toml_with_home() {
        let cfg: Config = toml::from_str(
            r#"
            api_key = "KEY"
            default_location = "Cairo"

            [home]
            latitude = 31.2
            longitude = 29.9
            "#,
        )
        .expect("valid config");

        assert_eq!(cfg.api_key_or_empty(), "KEY");
        assert_eq!(cfg.default_location(), "Cairo");
        assert_eq!(cfg.home, Some(Coordinates::new(31.2, 29.9)));
    }

    #[test]
    fn save_then_load_from_path() {
        let name = format!("weather-core-cfg-{}", std::process::id());
        let dir = std::env::temp_dir().join(name);
        let path = dir.join("nested").join("config.toml");

        let cfg = Config {
            api_key: Some("KEY".into()),
            ..Config::default()
        };
        cfg.save_to(&path).expect("save");

        let loaded = Config::load_from(&path).expect("load");
        assert_eq!(loaded, cfg);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_loads_default() {
        let path = std::env::temp_dir().join("weather-core-missing.toml");
        let cfg = Config::load_from(&path).expect("default");
        assert_eq!(cfg, Config::default());
    }
}
