use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

use crate::config::types::Config;
use crate::view::ViewKind;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl Config {
    /// Returns the path to the configuration file.
    ///
    /// Uses `~/.config/device-view/config.toml` on Unix/macOS,
    /// or equivalent on other platforms via `dirs::config_dir()`.
    /// Falls back to current directory if config_dir is unavailable.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("device-view").join("config.toml")
    }

    /// Loads configuration from the default config file.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Loads configuration from `path`.
    ///
    /// - If the file doesn't exist, returns `Config::default()`.
    /// - If the file exists, parses it as TOML and validates.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - Switch parameter and cookie key are non-empty header-safe tokens
    /// - Every enabled redirect has an absolute http(s) host
    /// - Redirect status codes are 3xx
    ///
    /// Unknown action strings and an unparseable cookie expiry are not
    /// errors; both degrade at request time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.switch_param.is_empty() {
            return Err(invalid("switch_param must not be empty"));
        }

        if self.cookie.key.is_empty() || !is_cookie_token(&self.cookie.key) {
            return Err(invalid(format!(
                "cookie_key '{}' is not a valid cookie name",
                self.cookie.key
            )));
        }

        for (name, value) in [("cookie_path", &self.cookie.path), ("cookie_domain", &self.cookie.domain)] {
            if !value.chars().all(|c| c.is_ascii_graphic() && c != ';') {
                return Err(invalid(format!("{name} '{value}' contains invalid characters")));
            }
        }

        for kind in [ViewKind::Mobile, ViewKind::Tablet, ViewKind::Full] {
            let Some(redirect) = self.redirect.for_kind(kind) else {
                continue;
            };

            if !(300..=399).contains(&redirect.status_code) {
                return Err(invalid(format!(
                    "redirect.{kind}.status_code {} is not a redirect status",
                    redirect.status_code
                )));
            }

            match redirect.host.as_deref() {
                Some(host) if !host.is_empty() => {
                    let parsed = Url::parse(host).map_err(|e| {
                        invalid(format!("redirect.{kind}.host '{host}' is not a URL: {e}"))
                    })?;
                    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
                        return Err(invalid(format!(
                            "redirect.{kind}.host '{host}' must be an absolute http(s) URL"
                        )));
                    }
                }
                _ if redirect.is_enabled => {
                    return Err(invalid(format!(
                        "redirect.{kind} is enabled but has no host"
                    )));
                }
                _ => {}
            }
        }

        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        message: message.into(),
    }
}

/// RFC 6265 cookie-name token.
fn is_cookie_token(name: &str) -> bool {
    name.bytes().all(|b| {
        b.is_ascii_graphic() && !matches!(b, b'(' | b')' | b'<' | b'>' | b'@' | b',' | b';' | b':' | b'\\' | b'"' | b'/' | b'[' | b']' | b'?' | b'=' | b'{' | b'}')
    })
}
