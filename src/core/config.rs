//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.weather-today/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct WeatherConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub api_path: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UiConfig {
    pub suggestions: Option<Vec<String>>,
    pub haptics: Option<bool>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_BASE_URL: &str = "http://localhost:8081";
pub const DEFAULT_API_PATH: &str = "/api/chat";
pub const DEFAULT_SUGGESTIONS: &[&str] = &["What's the weather in Belgrade?", "Novi Sad"];

const BASE_URL_ENV: &str = "WEATHER_API_BASE_URL";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub base_url: String,
    pub api_path: String,
    pub suggestions: Vec<String>,
    pub haptics: bool,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_path: DEFAULT_API_PATH.to_string(),
            suggestions: DEFAULT_SUGGESTIONS.iter().map(|s| s.to_string()).collect(),
            haptics: true,
        }
    }
}

/// Values given on the command line. `None` means "not specified".
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub base_url: Option<String>,
    pub api_path: Option<String>,
    pub no_haptics: bool,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.weather-today/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".weather-today").join("config.toml"))
}

/// Load config from `~/.weather-today/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `WeatherConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<WeatherConfig, ConfigError> {
    let Some(path) = config_path() else {
        warn!("Could not determine home directory, using default config");
        return Ok(WeatherConfig::default());
    };
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<WeatherConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(WeatherConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: WeatherConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

fn generate_default_config(path: &Path) {
    let default_content = r#"# Weather Today Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [api]
# base_url = "http://localhost:8081"  # Or set WEATHER_API_BASE_URL env var
# api_path = "/api/chat"

# [ui]
# suggestions = ["What's the weather in Belgrade?", "Novi Sad"]
# haptics = true                      # Terminal bell when a response is ready
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &WeatherConfig, cli: &CliOverrides) -> ResolvedConfig {
    resolve_with_env(config, cli, std::env::var(BASE_URL_ENV).ok())
}

fn resolve_with_env(
    config: &WeatherConfig,
    cli: &CliOverrides,
    env_base_url: Option<String>,
) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    // Base URL: CLI → env → config → default
    let base_url = cli
        .base_url
        .clone()
        .or(env_base_url)
        .or_else(|| config.api.base_url.clone())
        .unwrap_or(defaults.base_url);

    let api_path = cli
        .api_path
        .clone()
        .or_else(|| config.api.api_path.clone())
        .unwrap_or(defaults.api_path);

    // An empty list is allowed: it simply hides the chips
    let suggestions = config
        .ui
        .suggestions
        .clone()
        .unwrap_or(defaults.suggestions);

    let haptics = !cli.no_haptics && config.ui.haptics.unwrap_or(defaults.haptics);

    ResolvedConfig {
        base_url,
        api_path,
        suggestions,
        haptics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let resolved = resolve_with_env(&WeatherConfig::default(), &CliOverrides::default(), None);
        assert_eq!(resolved, ResolvedConfig::default());
        assert_eq!(resolved.api_path, "/api/chat");
        assert_eq!(
            resolved.suggestions,
            vec!["What's the weather in Belgrade?", "Novi Sad"]
        );
        assert!(resolved.haptics);
    }

    #[test]
    fn test_config_values_override_defaults() {
        let config = WeatherConfig {
            api: ApiConfig {
                base_url: Some("http://weather.local".to_string()),
                api_path: Some("/chat".to_string()),
            },
            ui: UiConfig {
                suggestions: Some(vec!["Oslo".to_string()]),
                haptics: Some(false),
            },
        };
        let resolved = resolve_with_env(&config, &CliOverrides::default(), None);
        assert_eq!(resolved.base_url, "http://weather.local");
        assert_eq!(resolved.api_path, "/chat");
        assert_eq!(resolved.suggestions, vec!["Oslo"]);
        assert!(!resolved.haptics);
    }

    #[test]
    fn test_env_wins_over_config_and_cli_wins_over_env() {
        let config = WeatherConfig {
            api: ApiConfig {
                base_url: Some("http://from-config".to_string()),
                api_path: None,
            },
            ..Default::default()
        };
        let env = Some("http://from-env".to_string());

        let resolved = resolve_with_env(&config, &CliOverrides::default(), env.clone());
        assert_eq!(resolved.base_url, "http://from-env");

        let cli = CliOverrides {
            base_url: Some("http://from-cli".to_string()),
            ..Default::default()
        };
        let resolved = resolve_with_env(&config, &cli, env);
        assert_eq!(resolved.base_url, "http://from-cli");
    }

    #[test]
    fn test_no_haptics_flag_wins() {
        let config = WeatherConfig {
            ui: UiConfig {
                haptics: Some(true),
                ..Default::default()
            },
            ..Default::default()
        };
        let cli = CliOverrides {
            no_haptics: true,
            ..Default::default()
        };
        assert!(!resolve_with_env(&config, &cli, None).haptics);
    }

    #[test]
    fn test_sparse_toml_parses() {
        let config: WeatherConfig = toml::from_str(
            r#"
[ui]
haptics = false
"#,
        )
        .unwrap();
        assert_eq!(config.ui.haptics, Some(false));
        assert!(config.ui.suggestions.is_none());
        assert!(config.api.base_url.is_none());
    }

    #[test]
    fn test_full_toml_parses() {
        let config: WeatherConfig = toml::from_str(
            r#"
[api]
base_url = "http://10.0.0.2:8081"
api_path = "/api/chat"

[ui]
suggestions = ["Tokyo", "Lima"]
"#,
        )
        .unwrap();
        assert_eq!(config.api.base_url.as_deref(), Some("http://10.0.0.2:8081"));
        assert_eq!(
            config.ui.suggestions,
            Some(vec!["Tokyo".to_string(), "Lima".to_string()])
        );
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let dir = std::env::temp_dir().join(format!("weather-today-cfg-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        fs::write(&path, "[api\nbase_url = ").unwrap();

        let result = load_config_from(&path);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_file_generates_commented_default() {
        let dir = std::env::temp_dir().join(format!("weather-today-cfg-{}", uuid::Uuid::new_v4()));
        let path = dir.join("config.toml");

        let config = load_config_from(&path).unwrap();
        assert!(config.api.base_url.is_none());
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# Weather Today Configuration"));

        // The generated file parses back to the empty config
        let reparsed = load_config_from(&path).unwrap();
        assert!(reparsed.ui.suggestions.is_none());
        let _ = fs::remove_dir_all(&dir);
    }
}
