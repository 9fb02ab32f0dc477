//! Configuration loader for memorb.
//!
//! Credentials come from the environment (after an optional `.env`), the
//! rest from `config.toml` in the data directory (`~/.memorb/` by default,
//! `$MEMORB_HOME` if set) or an explicit path.

use std::path::{Path, PathBuf};

use secrecy::SecretString;

use memorb_types::config::{AppConfig, LlmCredentials, Settings};
use memorb_types::error::ConfigError;

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const API_BASE_VAR: &str = "OPENAI_API_BASE";
pub const HOME_VAR: &str = "MEMORB_HOME";

/// Data directory: `$MEMORB_HOME`, else `~/.memorb`, else `./.memorb`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(home) = std::env::var(HOME_VAR) {
        if !home.is_empty() {
            return PathBuf::from(home);
        }
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".memorb")
}

/// Read both required credentials through `lookup`. Empty values count as missing.
pub fn credentials_from(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<LlmCredentials, ConfigError> {
    let get = |name: &'static str| {
        lookup(name)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingEnv(name))
    };
    let api_key = get(API_KEY_VAR)?;
    let base_url = get(API_BASE_VAR)?;
    Ok(LlmCredentials {
        api_key: SecretString::from(api_key),
        base_url,
    })
}

/// Read the required credentials from the process environment.
pub fn load_credentials() -> Result<LlmCredentials, ConfigError> {
    credentials_from(|name| std::env::var(name).ok())
}

/// Load `{data_dir}/config.toml`.
///
/// - Missing file: defaults.
/// - Unreadable or malformed file: warning, then defaults.
pub async fn load_settings(data_dir: &Path) -> Settings {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return Settings::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return Settings::default();
        }
    };

    match toml::from_str::<Settings>(&content) {
        Ok(settings) => settings,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            Settings::default()
        }
    }
}

/// Load a config file the operator named explicitly. Any failure is an error.
pub async fn load_settings_strict(path: &Path) -> Result<Settings, ConfigError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
    toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Full startup configuration. Fails fast when a credential is missing.
pub async fn load_app_config(explicit: Option<&Path>) -> Result<AppConfig, ConfigError> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!("Loaded environment from {}", path.display());
    }
    let credentials = load_credentials()?;
    let settings = match explicit {
        Some(path) => load_settings_strict(path).await?,
        None => load_settings(&resolve_data_dir()).await,
    };
    Ok(AppConfig {
        settings,
        credentials,
    })
}
