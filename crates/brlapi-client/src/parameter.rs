//! One typed parameter bound to a connection.

use std::fmt;
use std::sync::Arc;

use brlapi_core::{ParameterDescriptor, ParameterId, ParameterValue, Settable};
use tokio::sync::mpsc;
use tracing::debug;

use crate::connection::ConnectionInner;
use crate::error::{ClientError, ConnectionError};
use crate::watcher::WatcherHandle;

/// A parameter of one connection.
///
/// Reads and watches work for every parameter.  Writes require a
/// [`Settable`] capability and are validated locally, before the transport
/// is involved.
#[derive(Clone)]
pub struct Parameter {
    descriptor: &'static ParameterDescriptor,
    connection: Arc<ConnectionInner>,
}

impl Parameter {
    pub(crate) fn new(descriptor: &'static ParameterDescriptor, connection: Arc<ConnectionInner>) -> Self {
        Self {
            descriptor,
            connection,
        }
    }

    pub fn id(&self) -> ParameterId {
        self.descriptor.id
    }

    /// The lowercase, hyphenated name, e.g. `cursor-blink-period`.
    pub fn name(&self) -> &'static str {
        self.descriptor.name()
    }

    pub fn descriptor(&self) -> &'static ParameterDescriptor {
        self.descriptor
    }

    pub fn is_global(&self) -> bool {
        self.descriptor.global
    }

    pub fn is_hidable(&self) -> bool {
        self.descriptor.hidable
    }

    pub fn settable(&self) -> Option<Settable> {
        self.descriptor.settable
    }

    pub fn get(&self) -> Result<Option<ParameterValue>, ClientError> {
        self.get_at(0)
    }

    /// Reads the value at `subparam`.  `None` means the parameter currently
    /// has no value.
    ///
    /// # Errors
    ///
    /// Besides transport failures, returns [`ClientError::UnexpectedValue`]
    /// if the server answers with a different representation than the one
    /// this parameter declares.
    pub fn get_at(&self, subparam: u64) -> Result<Option<ParameterValue>, ClientError> {
        let value = self
            .connection
            .get_parameter(self.id(), subparam, self.is_global())?;

        if let Some(value) = &value {
            if value.kind() != self.descriptor.kind {
                return Err(ClientError::UnexpectedValue {
                    parameter: self.id(),
                    expected: self.descriptor.kind,
                    actual: value.kind(),
                });
            }
        }

        debug!(parameter = self.name(), subparam, defined = value.is_some(), "parameter read");
        Ok(value)
    }

    pub fn set(&self, value: ParameterValue) -> Result<(), ClientError> {
        self.set_at(0, value)
    }

    /// Writes `value` at `subparam` after checking it against this
    /// parameter's capability.
    pub fn set_at(&self, subparam: u64, value: ParameterValue) -> Result<(), ClientError> {
        let settable = self.capability()?;

        settable
            .check(self.name(), &value)
            .map_err(|source| ClientError::InvalidValue {
                parameter: self.id(),
                source,
            })?;

        self.write(subparam, &value)
    }

    pub fn set_text(&self, text: &str) -> Result<(), ClientError> {
        self.set_text_at(0, text)
    }

    /// Parses `text` into this parameter's representation and writes it.
    ///
    /// Booleans accept `on`/`off`, `yes`/`no`, `true`/`false` and `1`/`0`
    /// (abbreviations included).  Numbers must be unsigned decimals inside
    /// the capability's range, except for dot parameters, which take a dot
    /// list such as `78`.
    pub fn set_text_at(&self, subparam: u64, text: &str) -> Result<(), ClientError> {
        let settable = self.capability()?;

        let value = settable
            .parse_styled(self.descriptor.operand, self.name(), text)
            .map_err(|source| ClientError::InvalidValue {
                parameter: self.id(),
                source,
            })?;

        self.write(subparam, &value)
    }

    /// Registers `callback` for changes at `subparam`.
    ///
    /// The callback runs on a thread owned by the transport.  Closing or
    /// dropping the returned handle stops further deliveries; one already
    /// running may still complete.
    pub fn watch<F>(&self, subparam: u64, callback: F) -> Result<WatcherHandle, ClientError>
    where
        F: Fn(ParameterValue) + Send + Sync + 'static,
    {
        let watch_id = self.connection.watch_parameter(
            self.id(),
            subparam,
            self.is_global(),
            Arc::new(callback),
        )?;

        if watch_id == 0 {
            return Err(ConnectionError::Broken {
                handle: self.connection.handle(),
                code: brlapi_core::ErrorCode::InvalidPacket,
                operation: "watch_parameter".to_string(),
            }
            .into());
        }

        debug!(parameter = self.name(), subparam, watch_id, "watch started");
        Ok(WatcherHandle::new(watch_id, self.id(), Arc::clone(&self.connection)))
    }

    /// Like [`Parameter::watch`], delivering values on a channel instead of
    /// through a callback.
    pub fn watch_channel(
        &self,
        subparam: u64,
    ) -> Result<(WatcherHandle, mpsc::UnboundedReceiver<ParameterValue>), ClientError> {
        let (sender, receiver) = mpsc::unbounded_channel();

        let handle = self.watch(subparam, move |value| {
            // The receiver may be gone; the watch then ends when its handle is closed.
            let _ = sender.send(value);
        })?;

        Ok((handle, receiver))
    }

    fn capability(&self) -> Result<Settable, ClientError> {
        self.descriptor
            .settable
            .ok_or(ClientError::NotSettable { parameter: self.id() })
    }

    fn write(&self, subparam: u64, value: &ParameterValue) -> Result<(), ClientError> {
        self.connection
            .set_parameter(self.id(), subparam, self.is_global(), value)?;

        debug!(parameter = self.name(), subparam, %value, "parameter written");
        Ok(())
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("name", &self.name())
            .field("handle", &self.connection.handle())
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
