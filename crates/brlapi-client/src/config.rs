//! TOML configuration for connection defaults.
//!
//! Settings are resolved in increasing priority:
//!
//! 1. Built-in defaults (local server 0, key file authentication if the
//!    key file exists).
//! 2. The configuration file.
//! 3. The `BRLAPI_HOST` and `BRLAPI_AUTH` environment variables.
//! 4. Whatever the caller sets explicitly on the returned
//!    [`ConnectionSettings`].
//!
//! Example file:
//!
//! ```toml
//! [connection]
//! host = "braille.local:1"
//! auth = "keyfile:/etc/brlapi.key"
//! ```
//!
//! Every field is optional; a missing file is the same as an empty one.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::settings::{AuthSpec, ConnectionSettings, HostSpec, SettingsError};

/// Environment variable overriding the host specification.
pub const HOST_VARIABLE: &str = "BRLAPI_HOST";

/// Environment variable overriding the authentication specification.
pub const AUTH_VARIABLE: &str = "BRLAPI_AUTH";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// A host or authentication specification is malformed.
    #[error("invalid connection settings: {0}")]
    Settings(#[from] SettingsError),
}

/// Top-level configuration file contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub connection: ConnectionConfig,
}

/// The `[connection]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// `[host][:number]`; absent means the local server 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// `scheme[:operand]+...`; absent means the key file default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<String>,
}

impl ClientConfig {
    /// Loads the configuration from `path`, returning the defaults if the
    /// file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] for file-system errors other than "not
    /// found", and [`ConfigError::Parse`] if the TOML is malformed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                debug!(path = %path.display(), "loaded client configuration");
                Ok(toml::from_str(&content)?)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Overrides fields from the process environment.
    pub fn with_environment(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Overrides fields from `lookup`, which maps a variable name to its value.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(HOST_VARIABLE) {
            debug!(%host, "host overridden from environment");
            self.connection.host = Some(host);
        }

        if let Some(auth) = lookup(AUTH_VARIABLE) {
            debug!("authentication overridden from environment");
            self.connection.auth = Some(auth);
        }

        self
    }

    /// Produces the settings to request when opening a connection.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Settings`] if a specification is malformed.
    pub fn settings(&self) -> Result<ConnectionSettings, ConfigError> {
        let host = match &self.connection.host {
            Some(host) => host.parse()?,
            None => HostSpec::default(),
        };

        let auth = match &self.connection.auth {
            Some(auth) => auth.parse()?,
            None => AuthSpec::default(),
        };

        Ok(ConnectionSettings::new(host, auth))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use crate::settings::AuthScheme;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();

        let config = ClientConfig::load(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_file_values_are_used() {
        // Arrange
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[connection]\nhost = \"braille.local:1\"\nauth = \"none\"").unwrap();

        // Act
        let settings = ClientConfig::load(file.path()).unwrap().settings().unwrap();

        // Assert
        assert_eq!(settings.host.host(), Some("braille.local"));
        assert_eq!(settings.host.number(), 1);
        assert_eq!(settings.auth.entries()[0].scheme, AuthScheme::None);
    }

    #[test]
    fn test_empty_file_is_accepted() {
        let file = tempfile::NamedTempFile::new().unwrap();

        let config = ClientConfig::load(file.path()).unwrap();

        assert_eq!(config.connection, ConnectionConfig::default());
    }

    #[test]
    fn test_malformed_file_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[connection\nhost = ").unwrap();

        let result = ClientConfig::load(file.path());

        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_overrides_take_priority_over_file() {
        let config = ClientConfig {
            connection: ConnectionConfig {
                host: Some("file-host".to_string()),
                auth: Some("none".to_string()),
            },
        };

        let config = config.with_overrides(|name| match name {
            HOST_VARIABLE => Some("env-host:2".to_string()),
            _ => None,
        });

        let settings = config.settings().unwrap();
        assert_eq!(settings.host.host(), Some("env-host"));
        assert_eq!(settings.host.number(), 2);
        assert_eq!(settings.auth.to_string(), "none");
    }

    #[test]
    fn test_invalid_specification_is_reported() {
        let config = ClientConfig {
            connection: ConnectionConfig {
                host: Some("host:500".to_string()),
                auth: None,
            },
        };

        assert!(matches!(config.settings(), Err(ConfigError::Settings(_))));
    }
}
