//! Subscription handles returned by [`crate::Parameter::watch`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use brlapi_core::ParameterId;
use tracing::{debug, warn};

use crate::connection::ConnectionInner;
use crate::error::ClientError;

/// An active watch.  Closing it (explicitly or by dropping it) stops further
/// deliveries.
///
/// A delivery already running when `close` is called may still complete.
/// After `close` returns, no new delivery for this watch starts.
pub struct WatcherHandle {
    /// Zero once closed.
    id: AtomicU64,
    parameter: ParameterId,
    connection: Arc<ConnectionInner>,
}

impl WatcherHandle {
    pub(crate) fn new(id: u64, parameter: ParameterId, connection: Arc<ConnectionInner>) -> Self {
        Self {
            id: AtomicU64::new(id),
            parameter,
            connection,
        }
    }

    /// The transport's watch id, or `0` after close.
    pub fn id(&self) -> u64 {
        self.id.load(Ordering::Acquire)
    }

    pub fn parameter(&self) -> ParameterId {
        self.parameter
    }

    pub fn is_closed(&self) -> bool {
        self.id() == 0
    }

    /// Cancels the watch.  Once a call succeeds, later calls do nothing.
    ///
    /// If the connection has already been closed the transport has dropped
    /// the watch itself, and nothing is sent.  If the transport fails to
    /// cancel the watch, the handle stays open and `close` may be retried.
    pub fn close(&self) -> Result<(), ClientError> {
        let id = self.id.swap(0, Ordering::AcqRel);
        if id == 0 {
            return Ok(());
        }

        if self.connection.is_closed() {
            debug!(parameter = %self.parameter, watch_id = id, "watch ended with its connection");
            return Ok(());
        }

        if let Err(e) = self.connection.unwatch_parameter(id) {
            self.id.store(id, Ordering::Release);
            return Err(e);
        }
        debug!(parameter = %self.parameter, watch_id = id, "watch stopped");
        Ok(())
    }
}

impl Drop for WatcherHandle {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(parameter = %self.parameter, error = %e, "failed to stop watch on drop");
        }
    }
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("id", &self.id())
            .field("parameter", &self.parameter)
            .finish()
    }
}
