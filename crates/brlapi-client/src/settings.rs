//! Connection settings: which server to reach and how to authenticate.
//!
//! # Host specification
//!
//! ```text
//! [host][:number]
//! ```
//!
//! - An empty host means the server on this machine, reached through its
//!   local socket.
//! - `number` selects one of several servers (0–99, default 0).  Over TCP the
//!   server listens on port `4101 + number`.
//! - IPv6 hosts must be bracketed: `[::1]:2`.
//!
//! # Authentication specification
//!
//! ```text
//! scheme[:operand]+scheme[:operand]+...
//! ```
//!
//! Schemes are tried in order.  Known schemes are `none`, `keyfile`
//! (operand: path of the shared key), `user`, `group` (operand: the account
//! the server should trust) and `polkit`.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Path of the key file the server shares with trusted clients.
pub const DEFAULT_KEY_FILE: &str = "/etc/brlapi.key";

/// Highest server number a host specification may select.
pub const MAXIMUM_SERVER_NUMBER: u8 = 99;

/// TCP port of server number 0.
pub const BASE_TCP_PORT: u16 = 4101;

/// Errors found while parsing host or authentication specifications.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("invalid server number: {0} (expected 0-99)")]
    InvalidServerNumber(String),

    #[error("invalid host specification: {0}")]
    InvalidHost(String),

    #[error("unknown authentication scheme: {0}")]
    UnknownAuthScheme(String),

    #[error("empty authentication specification")]
    EmptyAuth,
}

// ── Host ──────────────────────────────────────────────────────────────────────

/// A parsed `[host][:number]` specification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostSpec {
    host: Option<String>,
    number: u8,
}

impl HostSpec {
    /// The local server with the given number.
    pub fn local(number: u8) -> Self {
        Self { host: None, number }
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    pub fn is_local(&self) -> bool {
        self.host.is_none()
    }

    /// TCP port for remote hosts; `None` for the local socket.
    pub fn tcp_port(&self) -> Option<u16> {
        self.host.as_ref().map(|_| BASE_TCP_PORT + u16::from(self.number))
    }
}

impl FromStr for HostSpec {
    type Err = SettingsError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.trim();

        let (host, number) = if let Some(rest) = text.strip_prefix('[') {
            let (host, after) = rest
                .split_once(']')
                .ok_or_else(|| SettingsError::InvalidHost(text.to_string()))?;

            let number = match after {
                "" => None,
                after => Some(
                    after
                        .strip_prefix(':')
                        .ok_or_else(|| SettingsError::InvalidHost(text.to_string()))?,
                ),
            };

            (host, number)
        } else {
            match text.rsplit_once(':') {
                Some((host, number)) => (host, Some(number)),
                None => (text, None),
            }
        };

        let number = match number {
            None => 0,
            Some(number) => number
                .parse::<u8>()
                .ok()
                .filter(|n| *n <= MAXIMUM_SERVER_NUMBER)
                .ok_or_else(|| SettingsError::InvalidServerNumber(number.to_string()))?,
        };

        Ok(Self {
            host: (!host.is_empty()).then(|| host.to_string()),
            number,
        })
    }
}

impl fmt::Display for HostSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.host {
            Some(host) if host.contains(':') => write!(f, "[{host}]")?,
            Some(host) => f.write_str(host)?,
            None => {}
        }
        write!(f, ":{}", self.number)
    }
}

// ── Authentication ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthScheme {
    None,
    KeyFile,
    User,
    Group,
    Polkit,
}

impl AuthScheme {
    pub fn keyword(self) -> &'static str {
        match self {
            AuthScheme::None => "none",
            AuthScheme::KeyFile => "keyfile",
            AuthScheme::User => "user",
            AuthScheme::Group => "group",
            AuthScheme::Polkit => "polkit",
        }
    }
}

impl FromStr for AuthScheme {
    type Err = SettingsError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text.to_ascii_lowercase().as_str() {
            "none" => Ok(AuthScheme::None),
            "keyfile" => Ok(AuthScheme::KeyFile),
            "user" => Ok(AuthScheme::User),
            "group" => Ok(AuthScheme::Group),
            "polkit" => Ok(AuthScheme::Polkit),
            _ => Err(SettingsError::UnknownAuthScheme(text.to_string())),
        }
    }
}

/// One `scheme[:operand]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthEntry {
    pub scheme: AuthScheme,
    pub operand: Option<String>,
}

/// An ordered list of authentication methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSpec {
    entries: Vec<AuthEntry>,
}

impl AuthSpec {
    /// `keyfile:<path>` if `key_file` exists, otherwise `none`.
    pub fn default_for_key_file(key_file: &Path) -> Self {
        let entry = if key_file.exists() {
            AuthEntry {
                scheme: AuthScheme::KeyFile,
                operand: Some(key_file.display().to_string()),
            }
        } else {
            AuthEntry {
                scheme: AuthScheme::None,
                operand: None,
            }
        };

        Self {
            entries: vec![entry],
        }
    }

    pub fn entries(&self) -> &[AuthEntry] {
        &self.entries
    }
}

impl Default for AuthSpec {
    fn default() -> Self {
        Self::default_for_key_file(Path::new(DEFAULT_KEY_FILE))
    }
}

impl FromStr for AuthSpec {
    type Err = SettingsError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SettingsError::EmptyAuth);
        }

        let entries = text
            .split('+')
            .map(|entry| {
                let (scheme, operand) = match entry.split_once(':') {
                    Some((scheme, operand)) => (scheme, Some(operand.to_string())),
                    None => (entry, None),
                };

                Ok(AuthEntry {
                    scheme: scheme.parse()?,
                    operand,
                })
            })
            .collect::<Result<Vec<_>, SettingsError>>()?;

        Ok(Self { entries })
    }
}

impl fmt::Display for AuthSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, entry) in self.entries.iter().enumerate() {
            if index > 0 {
                f.write_str("+")?;
            }
            f.write_str(entry.scheme.keyword())?;
            if let Some(operand) = &entry.operand {
                write!(f, ":{operand}")?;
            }
        }
        Ok(())
    }
}

// ── Settings ──────────────────────────────────────────────────────────────────

/// Where to connect and how to authenticate.
///
/// Passed to the transport when opening a connection; the transport answers
/// with the settings it actually used, which the connection keeps for its
/// whole life.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSettings {
    pub host: HostSpec,
    pub auth: AuthSpec,
}

impl ConnectionSettings {
    pub fn new(host: HostSpec, auth: AuthSpec) -> Self {
        Self { host, auth }
    }

    /// Parses both specifications.
    pub fn parse(host: &str, auth: &str) -> Result<Self, SettingsError> {
        Ok(Self {
            host: host.parse()?,
            auth: auth.parse()?,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_host_is_local_server_zero() {
        let spec: HostSpec = "".parse().unwrap();

        assert!(spec.is_local());
        assert_eq!(spec.number(), 0);
        assert_eq!(spec.tcp_port(), None);
    }

    #[test]
    fn test_host_with_number() {
        let spec: HostSpec = "braille.local:3".parse().unwrap();

        assert_eq!(spec.host(), Some("braille.local"));
        assert_eq!(spec.number(), 3);
        assert_eq!(spec.tcp_port(), Some(4104));
        assert_eq!(spec.to_string(), "braille.local:3");
    }

    #[test]
    fn test_local_host_with_number() {
        let spec: HostSpec = ":1".parse().unwrap();

        assert_eq!(spec, HostSpec::local(1));
    }

    #[test]
    fn test_bracketed_ipv6_host() {
        let spec: HostSpec = "[::1]:2".parse().unwrap();

        assert_eq!(spec.host(), Some("::1"));
        assert_eq!(spec.number(), 2);
        assert_eq!(spec.to_string(), "[::1]:2");
    }

    #[test]
    fn test_server_number_out_of_range_is_rejected() {
        assert_eq!(
            "host:100".parse::<HostSpec>(),
            Err(SettingsError::InvalidServerNumber("100".to_string()))
        );
        assert!("host:x".parse::<HostSpec>().is_err());
        assert!("[::1".parse::<HostSpec>().is_err());
    }

    #[test]
    fn test_auth_list_parses_in_order() {
        let spec: AuthSpec = "keyfile:/tmp/key+user:root+none".parse().unwrap();

        let schemes: Vec<AuthScheme> = spec.entries().iter().map(|e| e.scheme).collect();
        assert_eq!(schemes, [AuthScheme::KeyFile, AuthScheme::User, AuthScheme::None]);
        assert_eq!(spec.entries()[0].operand.as_deref(), Some("/tmp/key"));
        assert_eq!(spec.to_string(), "keyfile:/tmp/key+user:root+none");
    }

    #[test]
    fn test_unknown_auth_scheme_is_rejected() {
        assert_eq!(
            "password:x".parse::<AuthSpec>(),
            Err(SettingsError::UnknownAuthScheme("password".to_string()))
        );
        assert_eq!("".parse::<AuthSpec>(), Err(SettingsError::EmptyAuth));
    }

    #[test]
    fn test_default_auth_uses_key_file_only_when_present() {
        let missing = AuthSpec::default_for_key_file(Path::new("/nonexistent/brlapi.key"));
        assert_eq!(missing.to_string(), "none");

        let file = tempfile::NamedTempFile::new().unwrap();
        let present = AuthSpec::default_for_key_file(file.path());
        assert_eq!(present.entries()[0].scheme, AuthScheme::KeyFile);
    }
}
