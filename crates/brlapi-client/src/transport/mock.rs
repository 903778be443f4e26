//! In-memory transport for tests and examples.
//!
//! `MockTransport` records every call in order, stores parameter values in a
//! map, and keeps registered watch callbacks so a test can play the part of
//! the server:
//!
//! ```ignore
//! let transport = Arc::new(MockTransport::new().with_handle(7));
//! let connection = Connection::open(transport.clone(), &settings)?;
//!
//! transport.put_value(ParameterId::DeviceOnline, 0, true, ParameterValue::Boolean(true));
//! transport.notify(ParameterId::DeviceOnline, 0, true, ParameterValue::Boolean(false));
//!
//! assert_eq!(transport.calls().len(), 1);
//! ```
//!
//! # Failure injection
//!
//! [`MockTransport::fail_next`] makes the next call return the given error.
//! [`MockTransport::raise_exception_next`] makes the next call that carries a
//! handle fail with an [`ApiException`] built for that handle, the way a
//! real transport reports a server-side failure.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use brlapi_core::{ErrorCode, KeycodeSet, ParameterId, ParameterValue};
use parking_lot::Mutex;

use super::{OpenedConnection, Transport, WatchCallback};
use crate::error::{ApiException, TransportError};
use crate::registry::ConnectionHandle;
use crate::settings::ConnectionSettings;

/// Handles handed out when no explicit handle was requested.  Shared by all
/// mock instances so they never collide in the global registry.
static NEXT_HANDLE: AtomicU64 = AtomicU64::new(0x0100_0000);

type ValueKey = (ParameterId, u64, bool);

/// One recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    Open {
        desired: ConnectionSettings,
    },
    Close {
        handle: ConnectionHandle,
    },
    Get {
        handle: ConnectionHandle,
        parameter: ParameterId,
        subparam: u64,
        global: bool,
    },
    Set {
        handle: ConnectionHandle,
        parameter: ParameterId,
        subparam: u64,
        global: bool,
        value: ParameterValue,
    },
    Watch {
        handle: ConnectionHandle,
        parameter: ParameterId,
        subparam: u64,
        global: bool,
    },
    Unwatch {
        handle: ConnectionHandle,
        watch_id: u64,
    },
    ResolveNames {
        handle: ConnectionHandle,
        set: KeycodeSet,
        code: u64,
    },
}

struct Watch {
    handle: ConnectionHandle,
    key: ValueKey,
    callback: WatchCallback,
}

/// A transport that answers from memory.
#[derive(Default)]
pub struct MockTransport {
    calls: Mutex<Vec<TransportCall>>,
    values: Mutex<HashMap<ValueKey, ParameterValue>>,
    names: Mutex<HashMap<(KeycodeSet, u64), Vec<String>>>,
    watches: Mutex<HashMap<u64, Watch>>,
    next_watch_id: AtomicU64,
    forced_handle: Mutex<Option<u64>>,
    file_descriptor: Option<i32>,
    pending_error: Mutex<Option<TransportError>>,
    pending_exception: Mutex<Option<(ErrorCode, u32)>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `open_connection` return `handle`.
    pub fn with_handle(self, handle: u64) -> Self {
        *self.forced_handle.lock() = Some(handle);
        self
    }

    pub fn with_file_descriptor(mut self, fd: i32) -> Self {
        self.file_descriptor = Some(fd);
        self
    }

    /// Every call made so far, oldest first.
    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().clone()
    }

    /// Number of recorded `set_parameter` calls.
    pub fn set_count(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, TransportCall::Set { .. }))
            .count()
    }

    /// Stores a value without notifying watchers.
    pub fn put_value(&self, parameter: ParameterId, subparam: u64, global: bool, value: ParameterValue) {
        self.values.lock().insert((parameter, subparam, global), value);
    }

    pub fn value(&self, parameter: ParameterId, subparam: u64, global: bool) -> Option<ParameterValue> {
        self.values.lock().get(&(parameter, subparam, global)).cloned()
    }

    pub fn put_keycode_names(&self, set: KeycodeSet, code: u64, names: Vec<String>) {
        self.names.lock().insert((set, code), names);
    }

    pub fn fail_next(&self, error: TransportError) {
        *self.pending_error.lock() = Some(error);
    }

    pub fn raise_exception_next(&self, code: ErrorCode, packet_type: u32) {
        *self.pending_exception.lock() = Some((code, packet_type));
    }

    /// Number of live watches.
    pub fn watch_count(&self) -> usize {
        self.watches.lock().len()
    }

    /// Runs the callback of `watch_id` with `value` on the calling thread.
    ///
    /// Returns `false` if the watch is not (or no longer) registered.  The
    /// callback runs outside the lock, so an `unwatch` racing with this call
    /// may return before the callback finishes.
    pub fn deliver(&self, watch_id: u64, value: ParameterValue) -> bool {
        let callback = self
            .watches
            .lock()
            .get(&watch_id)
            .map(|watch| WatchCallback::clone(&watch.callback));

        match callback {
            Some(callback) => {
                callback(value);
                true
            }
            None => false,
        }
    }

    /// Stores `value` and delivers it to every matching watch.  Returns the
    /// number of callbacks run.
    pub fn notify(&self, parameter: ParameterId, subparam: u64, global: bool, value: ParameterValue) -> usize {
        let key = (parameter, subparam, global);
        self.values.lock().insert(key, value.clone());

        let mut callbacks: Vec<(u64, WatchCallback)> = self
            .watches
            .lock()
            .iter()
            .filter(|(_, watch)| watch.key == key)
            .map(|(id, watch)| (*id, WatchCallback::clone(&watch.callback)))
            .collect();
        callbacks.sort_by_key(|(id, _)| *id);

        for (_, callback) in &callbacks {
            callback(value.clone());
        }
        callbacks.len()
    }

    fn record(&self, call: TransportCall) {
        self.calls.lock().push(call);
    }

    fn take_failure(&self, handle: Option<ConnectionHandle>) -> Result<(), TransportError> {
        if let Some(error) = self.pending_error.lock().take() {
            return Err(error);
        }

        if let Some(handle) = handle {
            if let Some((code, packet_type)) = self.pending_exception.lock().take() {
                let exception = ApiException::new(handle, code, packet_type, Vec::new());
                return Err(TransportError::Exception(exception));
            }
        }

        Ok(())
    }
}

impl Transport for MockTransport {
    fn open_connection(&self, desired: &ConnectionSettings) -> Result<OpenedConnection, TransportError> {
        self.record(TransportCall::Open {
            desired: desired.clone(),
        });
        self.take_failure(None)?;

        let handle = self
            .forced_handle
            .lock()
            .take()
            .unwrap_or_else(|| NEXT_HANDLE.fetch_add(1, Ordering::Relaxed));

        Ok(OpenedConnection {
            handle: ConnectionHandle(handle),
            settings: desired.clone(),
            file_descriptor: self.file_descriptor,
        })
    }

    fn close_connection(&self, handle: ConnectionHandle) -> Result<(), TransportError> {
        self.record(TransportCall::Close { handle });
        self.take_failure(Some(handle))?;
        self.watches.lock().retain(|_, watch| watch.handle != handle);
        Ok(())
    }

    fn get_parameter(
        &self,
        handle: ConnectionHandle,
        parameter: ParameterId,
        subparam: u64,
        global: bool,
    ) -> Result<Option<ParameterValue>, TransportError> {
        self.record(TransportCall::Get {
            handle,
            parameter,
            subparam,
            global,
        });
        self.take_failure(Some(handle))?;
        Ok(self.value(parameter, subparam, global))
    }

    fn set_parameter(
        &self,
        handle: ConnectionHandle,
        parameter: ParameterId,
        subparam: u64,
        global: bool,
        value: &ParameterValue,
    ) -> Result<(), TransportError> {
        self.record(TransportCall::Set {
            handle,
            parameter,
            subparam,
            global,
            value: value.clone(),
        });
        self.take_failure(Some(handle))?;
        self.notify(parameter, subparam, global, value.clone());
        Ok(())
    }

    fn watch_parameter(
        &self,
        handle: ConnectionHandle,
        parameter: ParameterId,
        subparam: u64,
        global: bool,
        callback: WatchCallback,
    ) -> Result<u64, TransportError> {
        self.record(TransportCall::Watch {
            handle,
            parameter,
            subparam,
            global,
        });
        self.take_failure(Some(handle))?;

        let watch_id = self.next_watch_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.watches.lock().insert(
            watch_id,
            Watch {
                handle,
                key: (parameter, subparam, global),
                callback,
            },
        );
        Ok(watch_id)
    }

    fn unwatch_parameter(&self, handle: ConnectionHandle, watch_id: u64) -> Result<(), TransportError> {
        self.record(TransportCall::Unwatch { handle, watch_id });
        self.take_failure(Some(handle))?;
        self.watches.lock().remove(&watch_id);
        Ok(())
    }

    fn resolve_keycode_names(
        &self,
        handle: ConnectionHandle,
        set: KeycodeSet,
        code: u64,
    ) -> Result<Vec<String>, TransportError> {
        self.record(TransportCall::ResolveNames { handle, set, code });
        self.take_failure(Some(handle))?;
        Ok(self.names.lock().get(&(set, code)).cloned().unwrap_or_default())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
