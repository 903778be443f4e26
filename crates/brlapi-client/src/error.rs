//! Error types of the client library.
//!
//! Three protocol-level kinds exist:
//!
//! - [`ApiError`] – a call failed synchronously.  No connection is marked;
//!   often no connection exists yet (for example a refused `open`).
//! - [`ApiException`] – the server reported later that an earlier request
//!   failed.  Building one marks the owning connection unusable.
//! - [`ConnectionError`] – an unrecoverable connection-level condition,
//!   raised without touching any flag.
//!
//! [`ClientError`] wraps these together with the local validation failures
//! that are detected before any transport call.

use std::fmt;
use std::sync::Arc;

use brlapi_core::{ErrorCode, ParameterId, ValueError, ValueKind};
use thiserror::Error;
use tracing::warn;

use crate::config::ConfigError;
use crate::registry::{ConnectionHandle, ConnectionHandleRegistry, ConnectionState};

// ── Synchronous error ─────────────────────────────────────────────────────────

/// A protocol error returned directly by a failed call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    code: ErrorCode,
    os_error: Option<i32>,
    resolution_error: Option<i32>,
    operation: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, operation: impl Into<String>) -> Self {
        Self {
            code,
            os_error: None,
            resolution_error: None,
            operation: operation.into(),
        }
    }

    /// Attaches the operating system's error number.
    pub fn with_os_error(mut self, errno: i32) -> Self {
        self.os_error = Some(errno);
        self
    }

    /// Attaches the address-resolution (`getaddrinfo`) error number.
    pub fn with_resolution_error(mut self, code: i32) -> Self {
        self.resolution_error = Some(code);
        self
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn os_error(&self) -> Option<i32> {
        self.os_error
    }

    pub fn resolution_error(&self) -> Option<i32> {
        self.resolution_error
    }

    /// Name of the operation that failed.
    pub fn operation(&self) -> &str {
        &self.operation
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.operation, self.code)?;

        match self.code {
            ErrorCode::SystemCall => {
                if let Some(errno) = self.os_error {
                    write!(f, ": {}", std::io::Error::from_raw_os_error(errno))?;
                }
            }
            ErrorCode::AddressResolution => {
                if let Some(code) = self.resolution_error {
                    write!(f, ": resolution error {code}")?;
                }
            }
            _ => {}
        }

        Ok(())
    }
}

impl std::error::Error for ApiError {}

// ── Asynchronous exception ────────────────────────────────────────────────────

/// A failure the server reported after the request that caused it.
///
/// There is no way to build one without marking its connection: the only
/// constructor resolves the handle through the global registry and sets the
/// connection's `unusable` flag before returning.  An unknown handle (the
/// connection was already closed) leaves [`ApiException::connection`] empty.
#[derive(Debug, Clone)]
pub struct ApiException {
    handle: ConnectionHandle,
    connection: Option<Arc<ConnectionState>>,
    code: ErrorCode,
    packet_type: u32,
    packet: Vec<u8>,
}

impl ApiException {
    pub fn new(handle: ConnectionHandle, code: ErrorCode, packet_type: u32, packet: Vec<u8>) -> Self {
        let connection = ConnectionHandleRegistry::global().lookup(handle);

        match &connection {
            Some(state) => {
                if state.mark_unusable() {
                    warn!(%handle, %code, packet_type, "connection marked unusable");
                }
            }
            None => warn!(%handle, %code, packet_type, "exception for unregistered connection"),
        }

        Self {
            handle,
            connection,
            code,
            packet_type,
            packet,
        }
    }

    pub fn handle(&self) -> ConnectionHandle {
        self.handle
    }

    /// The connection this exception was raised against, if it was still
    /// registered.
    pub fn connection(&self) -> Option<&Arc<ConnectionState>> {
        self.connection.as_ref()
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Type of the packet the server rejected.
    pub fn packet_type(&self) -> u32 {
        self.packet_type
    }

    /// Bytes of the packet the server rejected.
    pub fn packet(&self) -> &[u8] {
        &self.packet
    }
}

impl fmt::Display for ApiException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "connection {}: {} (packet type {:#X}, {} bytes)",
            self.handle,
            self.code,
            self.packet_type,
            self.packet.len()
        )
    }
}

impl std::error::Error for ApiException {}

// ── Connection-level error ────────────────────────────────────────────────────

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConnectionError {
    #[error("connection handle {handle} is already registered")]
    DuplicateHandle { handle: ConnectionHandle },

    #[error("connection {handle} is broken: {operation}: {code}")]
    Broken {
        handle: ConnectionHandle,
        code: ErrorCode,
        operation: String,
    },
}

// ── Transport error ───────────────────────────────────────────────────────────

/// What a [`crate::Transport`] call may fail with.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Exception(#[from] ApiException),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// A bounded wait expired.  Leaves every connection flag alone.
    #[error("{operation}: timed out")]
    TimedOut { operation: String },
}

// ── Client error ──────────────────────────────────────────────────────────────

/// Error type of the public client API.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Exception(#[from] ApiException),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error("{operation}: timed out")]
    TimedOut { operation: String },

    #[error("connection {handle} is closed")]
    Closed { handle: ConnectionHandle },

    #[error("unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("parameter is not settable: {parameter}")]
    NotSettable { parameter: ParameterId },

    #[error("invalid value for {parameter}: {source}")]
    InvalidValue {
        parameter: ParameterId,
        #[source]
        source: ValueError,
    },

    #[error("unexpected value for {parameter}: expected {expected}, got {actual}")]
    UnexpectedValue {
        parameter: ParameterId,
        expected: ValueKind,
        actual: ValueKind,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ClientError {
    /// `true` for failures detected locally, before any transport call.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ClientError::Closed { .. }
                | ClientError::UnknownParameter(_)
                | ClientError::NotSettable { .. }
                | ClientError::InvalidValue { .. }
                | ClientError::UnexpectedValue { .. }
        )
    }
}

impl From<TransportError> for ClientError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::Api(e) => ClientError::Api(e),
            TransportError::Exception(e) => ClientError::Exception(e),
            TransportError::Connection(e) => ClientError::Connection(e),
            TransportError::TimedOut { operation } => ClientError::TimedOut { operation },
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
