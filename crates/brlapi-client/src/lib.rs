//! # brlapi-client
//!
//! Session layer of the BrlAPI client: connections, the typed parameter
//! catalog, watches, keycode name resolution and the protocol error kinds.
//!
//! The wire protocol itself lives behind the [`Transport`] trait.  This
//! crate never opens a socket; it decides *what* to ask and validates what
//! it sends and receives.
//!
//! # Architecture overview (for beginners)
//!
//! ```text
//!  caller ──► Connection ──► Parameters ──► Parameter ──┐
//!                 │                                      │ get / set / watch
//!                 │ open / close                         ▼
//!                 └──────────────────────────────► Transport ──► server
//!                                                       │
//!      ConnectionHandleRegistry ◄── ApiException ◄──────┘ (late failures)
//! ```
//!
//! - [`Connection::open`] obtains a numeric handle from the transport and
//!   records it in the process-wide [`ConnectionHandleRegistry`].
//! - [`Connection::parameters`] returns the catalog.  Parameters are found by
//!   full name or unique abbreviation (`cursor-blink-perc`).
//! - [`Parameter::set_text`] parses and range-checks locally.  A bad value
//!   never reaches the transport.
//! - When the server reports a failure after the fact, the transport builds an
//!   [`ApiException`].  Building it marks the connection unusable, so callers
//!   can always see which connections are broken.
//!
//! Connection defaults come from [`ClientConfig`]: a TOML file, overridden by
//! the `BRLAPI_HOST` and `BRLAPI_AUTH` environment variables.
//!
//! The library logs through `tracing` and never installs a subscriber.

pub mod config;
pub mod connection;
pub mod error;
pub mod parameter;
pub mod parameters;
pub mod registry;
pub mod settings;
pub mod tool;
pub mod transport;
pub mod watcher;

pub use config::{ClientConfig, ConfigError};
pub use connection::Connection;
pub use error::{ApiError, ApiException, ClientError, ConnectionError, TransportError};
pub use parameter::Parameter;
pub use parameters::Parameters;
pub use registry::{ConnectionHandle, ConnectionHandleRegistry, ConnectionState};
pub use settings::{AuthScheme, AuthSpec, ConnectionSettings, HostSpec, SettingsError};
pub use transport::{MockTransport, OpenedConnection, Transport, TransportCall, WatchCallback};
pub use watcher::WatcherHandle;

pub use brlapi_core::{
    CommandKeycode, DriverKeycode, ErrorCode, KeycodeSet, ParameterId, ParameterValue, Settable,
    ValueKind,
};
