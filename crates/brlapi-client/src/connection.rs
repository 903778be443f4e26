//! An open session with a BrlAPI server.
//!
//! # Lifecycle
//!
//! ```text
//! open ──► registered ──► (unusable?) ──► close ──► unregistered
//! ```
//!
//! - [`Connection::open`] asks the transport for a session and registers the
//!   returned handle in the [`ConnectionHandleRegistry`].
//! - An asynchronous failure reported later marks the connection unusable.
//!   The connection stays open: the caller decides when to close it.
//! - [`Connection::close`] unregisters and closes through the transport.  It
//!   runs once; later calls, and the implicit close on drop, do nothing.
//!
//! Calls issued after close fail with [`ClientError::Closed`] without
//! reaching the transport.  The `unusable` flag is only reported, never
//! enforced.

use std::sync::Arc;

use brlapi_core::keycode::{CommandNames, DriverNames};
use brlapi_core::{CommandKeycode, DriverKeycode, KeycodeSet, ParameterId, ParameterValue};
use once_cell::sync::OnceCell;
use tracing::{debug, error, info, warn};

use crate::error::ClientError;
use crate::parameters::Parameters;
use crate::registry::{ConnectionHandle, ConnectionHandleRegistry, ConnectionState};
use crate::settings::ConnectionSettings;
use crate::transport::{Transport, WatchCallback};

/// What parameters, watchers and the connection itself share.
pub(crate) struct ConnectionInner {
    state: Arc<ConnectionState>,
    transport: Arc<dyn Transport>,
}

impl ConnectionInner {
    pub(crate) fn handle(&self) -> ConnectionHandle {
        self.state.handle()
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.state.is_closed()
    }

    fn ensure_open(&self) -> Result<(), ClientError> {
        if self.state.is_closed() {
            return Err(ClientError::Closed {
                handle: self.handle(),
            });
        }
        Ok(())
    }

    pub(crate) fn get_parameter(
        &self,
        parameter: ParameterId,
        subparam: u64,
        global: bool,
    ) -> Result<Option<ParameterValue>, ClientError> {
        self.ensure_open()?;
        Ok(self
            .transport
            .get_parameter(self.handle(), parameter, subparam, global)?)
    }

    pub(crate) fn set_parameter(
        &self,
        parameter: ParameterId,
        subparam: u64,
        global: bool,
        value: &ParameterValue,
    ) -> Result<(), ClientError> {
        self.ensure_open()?;
        Ok(self
            .transport
            .set_parameter(self.handle(), parameter, subparam, global, value)?)
    }

    pub(crate) fn watch_parameter(
        &self,
        parameter: ParameterId,
        subparam: u64,
        global: bool,
        callback: WatchCallback,
    ) -> Result<u64, ClientError> {
        self.ensure_open()?;
        Ok(self
            .transport
            .watch_parameter(self.handle(), parameter, subparam, global, callback)?)
    }

    pub(crate) fn unwatch_parameter(&self, watch_id: u64) -> Result<(), ClientError> {
        self.ensure_open()?;
        Ok(self.transport.unwatch_parameter(self.handle(), watch_id)?)
    }

    fn resolve_keycode_names(&self, set: KeycodeSet, code: u64) -> Result<Vec<String>, ClientError> {
        self.ensure_open()?;
        Ok(self
            .transport
            .resolve_keycode_names(self.handle(), set, code)?)
    }
}

/// A client session.
pub struct Connection {
    inner: Arc<ConnectionInner>,
    parameters: OnceCell<Parameters>,
}

impl Connection {
    /// Opens a session and registers it.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Api`] if the transport refuses (bad credentials,
    ///   unreachable host, ...).  Nothing is registered.
    /// - [`ClientError::Connection`] if the returned handle is already
    ///   registered.  The transport is left alone, since closing by handle
    ///   would end the session already registered under it.
    pub fn open(
        transport: Arc<dyn Transport>,
        settings: &ConnectionSettings,
    ) -> Result<Self, ClientError> {
        let opened = transport.open_connection(settings)?;
        let handle = opened.handle;

        let state = Arc::new(ConnectionState::new(
            handle,
            opened.settings,
            opened.file_descriptor,
        ));

        if let Err(e) = ConnectionHandleRegistry::global().register(Arc::clone(&state)) {
            error!(%handle, error = %e, "transport returned a handle that is already open");
            return Err(e.into());
        }

        info!(%handle, host = %state.settings().host, "connection opened");

        Ok(Self {
            inner: Arc::new(ConnectionInner { state, transport }),
            parameters: OnceCell::new(),
        })
    }

    /// Opens a connection, runs `f`, and closes the connection whatever `f`
    /// returned.
    ///
    /// An error from `f` takes precedence over an error from closing.
    pub fn scoped<F, R>(
        transport: Arc<dyn Transport>,
        settings: &ConnectionSettings,
        f: F,
    ) -> Result<R, ClientError>
    where
        F: FnOnce(&Connection) -> Result<R, ClientError>,
    {
        let connection = Self::open(transport, settings)?;
        let result = f(&connection);
        let closed = connection.close();

        let value = result?;
        closed?;
        Ok(value)
    }

    /// Closes the session.  Only the first call does anything.
    ///
    /// Safe to call on an unusable connection.  Watchers of this connection
    /// become inert.
    pub fn close(&self) -> Result<(), ClientError> {
        if !self.inner.state.mark_closed() {
            return Ok(());
        }

        let handle = self.handle();
        ConnectionHandleRegistry::global().unregister(handle);
        self.inner.transport.close_connection(handle)?;

        info!(%handle, "connection closed");
        Ok(())
    }

    pub fn handle(&self) -> ConnectionHandle {
        self.inner.handle()
    }

    /// The settings negotiated by the transport.
    pub fn settings(&self) -> &ConnectionSettings {
        self.inner.state.settings()
    }

    pub fn file_descriptor(&self) -> Option<i32> {
        self.inner.state.file_descriptor()
    }

    pub fn is_unusable(&self) -> bool {
        self.inner.state.is_unusable()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.state.is_closed()
    }

    /// The shared state also held by the registry.
    pub fn state(&self) -> &Arc<ConnectionState> {
        &self.inner.state
    }

    /// The parameter catalog, built on first use.
    pub fn parameters(&self) -> &Parameters {
        self.parameters.get_or_init(|| {
            debug!(handle = %self.handle(), "building parameter catalog");
            Parameters::new(Arc::clone(&self.inner))
        })
    }

    /// Resolves the names of a command keycode.  The server is asked at most
    /// once per keycode instance.
    pub fn command_names<'k>(
        &self,
        keycode: &'k CommandKeycode,
    ) -> Result<Option<&'k CommandNames>, ClientError> {
        keycode.names_with(|code| self.inner.resolve_keycode_names(KeycodeSet::Command, code))
    }

    /// Resolves the names of a driver keycode.  The server is asked at most
    /// once per keycode instance.
    pub fn driver_names<'k>(
        &self,
        keycode: &'k DriverKeycode,
    ) -> Result<Option<&'k DriverNames>, ClientError> {
        keycode.names_with(|code| self.inner.resolve_keycode_names(KeycodeSet::Driver, code))
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(handle = %self.handle(), error = %e, "close on drop failed");
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("handle", &self.handle())
            .field("unusable", &self.is_unusable())
            .field("closed", &self.is_closed())
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
