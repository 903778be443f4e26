//! The boundary between this library and whatever speaks the wire protocol.
//!
//! Everything below [`Transport`] (sockets, packet encoding, authentication
//! exchanges) belongs to the implementor.  The library above it only ever
//! passes a [`ConnectionHandle`] across, never a reference to a client-side
//! object.
//!
//! Implementations may invoke watch callbacks from threads they own.  Calls
//! for one subscription must be made in the order the changes happened.
//! When the server reports that an earlier request failed, the implementation
//! builds an [`crate::ApiException`] for the handle, which marks the
//! connection unusable, and returns it as [`TransportError::Exception`].

pub mod mock;

use std::sync::Arc;

use brlapi_core::{KeycodeSet, ParameterId, ParameterValue};

use crate::error::TransportError;
use crate::registry::ConnectionHandle;
use crate::settings::ConnectionSettings;

pub use mock::{MockTransport, TransportCall};

/// Invoked with each new value of a watched parameter.
pub type WatchCallback = Arc<dyn Fn(ParameterValue) + Send + Sync>;

/// What a successful open hands back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedConnection {
    pub handle: ConnectionHandle,
    /// The settings actually used, which may differ from the ones requested.
    pub settings: ConnectionSettings,
    pub file_descriptor: Option<i32>,
}

/// Primitives the client needs from the protocol implementation.
///
/// Every method blocks for the duration of its exchange.  An implementation
/// offering bounded waits reports expiry as [`TransportError::TimedOut`].
pub trait Transport: Send + Sync {
    fn open_connection(&self, desired: &ConnectionSettings)
        -> Result<OpenedConnection, TransportError>;

    fn close_connection(&self, handle: ConnectionHandle) -> Result<(), TransportError>;

    /// Returns `None` if the parameter currently has no value.
    fn get_parameter(
        &self,
        handle: ConnectionHandle,
        parameter: ParameterId,
        subparam: u64,
        global: bool,
    ) -> Result<Option<ParameterValue>, TransportError>;

    fn set_parameter(
        &self,
        handle: ConnectionHandle,
        parameter: ParameterId,
        subparam: u64,
        global: bool,
        value: &ParameterValue,
    ) -> Result<(), TransportError>;

    /// Starts delivering changes to `callback`; returns a non-zero watch id.
    fn watch_parameter(
        &self,
        handle: ConnectionHandle,
        parameter: ParameterId,
        subparam: u64,
        global: bool,
        callback: WatchCallback,
    ) -> Result<u64, TransportError>;

    /// Stops deliveries for `watch_id`.  A delivery already running may
    /// still finish.
    fn unwatch_parameter(&self, handle: ConnectionHandle, watch_id: u64)
        -> Result<(), TransportError>;

    /// Asks the server for the names of `code`.  An empty list means the
    /// server knows no names for it.
    fn resolve_keycode_names(
        &self,
        handle: ConnectionHandle,
        set: KeycodeSet,
        code: u64,
    ) -> Result<Vec<String>, TransportError>;
}
