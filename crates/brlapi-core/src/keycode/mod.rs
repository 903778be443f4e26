//! Bit-packed input-event codes.
//!
//! The server reports every key event as a single 64-bit code.  Two
//! decodings exist:
//!
//! - [`CommandKeycode`] – the event after the server has bound it to a
//!   screen-reader command (or a keyboard symbol).
//! - [`DriverKeycode`] – the raw key as the braille device driver saw it,
//!   before any binding.
//!
//! Field extraction is purely local.  Human-readable names are not: they are
//! resolved by the server, once per keycode instance, through a resolver
//! closure supplied by the session layer.  An empty answer is remembered as
//! "no names" and never re-queried.

pub mod command;
pub mod driver;

pub use command::{CommandKeycode, CommandNames};
pub use driver::{DriverKeycode, DriverNames};

/// Which keycode set a name-resolution request refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeycodeSet {
    Command,
    Driver,
}
