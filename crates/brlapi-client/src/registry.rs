//! Process-wide table mapping connection handles to live connection state.
//!
//! The transport only ever carries an opaque integer handle.  When it later
//! reports that a request failed, it builds an [`crate::ApiException`] from
//! that integer, and the exception looks the handle up here to mark the
//! owning connection unusable.
//!
//! The table stores [`ConnectionState`] (handle, negotiated settings and the
//! two lifecycle flags) rather than the whole [`crate::Connection`], so an
//! entry never keeps the transport alive on its own.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tracing::{debug, error};

use crate::error::ConnectionError;
use crate::settings::ConnectionSettings;

/// Opaque identifier of an open session, shared with the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionHandle(pub u64);

impl fmt::Display for ConnectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ConnectionHandle {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Shared state of one connection.
///
/// Both flags are monotonic: once set they stay set.  They are independent
/// of each other; a connection may be closed without ever being unusable and
/// vice versa.
#[derive(Debug)]
pub struct ConnectionState {
    handle: ConnectionHandle,
    settings: ConnectionSettings,
    file_descriptor: Option<i32>,
    unusable: AtomicBool,
    closed: AtomicBool,
}

impl ConnectionState {
    pub(crate) fn new(
        handle: ConnectionHandle,
        settings: ConnectionSettings,
        file_descriptor: Option<i32>,
    ) -> Self {
        Self {
            handle,
            settings,
            file_descriptor,
            unusable: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        }
    }

    pub fn handle(&self) -> ConnectionHandle {
        self.handle
    }

    /// The settings the transport actually negotiated.
    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    pub fn file_descriptor(&self) -> Option<i32> {
        self.file_descriptor
    }

    pub fn is_unusable(&self) -> bool {
        self.unusable.load(Ordering::Acquire)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Returns `true` if this call set the flag.
    pub(crate) fn mark_unusable(&self) -> bool {
        !self.unusable.swap(true, Ordering::AcqRel)
    }

    /// Returns `true` if this call set the flag.
    pub(crate) fn mark_closed(&self) -> bool {
        !self.closed.swap(true, Ordering::AcqRel)
    }
}

static GLOBAL: Lazy<ConnectionHandleRegistry> = Lazy::new(ConnectionHandleRegistry::new);

/// A lock-protected `handle → state` map.
///
/// Every operation takes the same lock, so a lookup never observes a
/// half-finished registration or removal.
#[derive(Debug, Default)]
pub struct ConnectionHandleRegistry {
    entries: Mutex<HashMap<ConnectionHandle, Arc<ConnectionState>>>,
}

impl ConnectionHandleRegistry {
    /// The registry used by every connection in this process.
    pub fn global() -> &'static ConnectionHandleRegistry {
        &GLOBAL
    }

    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `state` under its handle.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::DuplicateHandle`] if the handle is already
    /// registered; the existing entry is left untouched.
    pub fn register(&self, state: Arc<ConnectionState>) -> Result<(), ConnectionError> {
        let handle = state.handle();
        let mut entries = self.entries.lock();

        if entries.contains_key(&handle) {
            error!(%handle, "connection handle registered twice");
            return Err(ConnectionError::DuplicateHandle { handle });
        }

        entries.insert(handle, state);
        debug!(%handle, "connection registered");
        Ok(())
    }

    pub fn lookup(&self, handle: ConnectionHandle) -> Option<Arc<ConnectionState>> {
        self.entries.lock().get(&handle).cloned()
    }

    /// Removes the entry for `handle`; a missing entry is not an error.
    pub fn unregister(&self, handle: ConnectionHandle) -> Option<Arc<ConnectionState>> {
        let removed = self.entries.lock().remove(&handle);
        if removed.is_some() {
            debug!(%handle, "connection unregistered");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
