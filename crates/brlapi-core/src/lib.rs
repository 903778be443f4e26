//! # brlapi-core
//!
//! Transport-free building blocks of the BrlAPI client library: the keyword
//! dictionary used to resolve abbreviated names, operand parsing, the static
//! parameter table and value model, keycode decoding, and protocol error
//! codes.
//!
//! This crate performs no I/O and starts no threads.  The session layer
//! (`brlapi-client`) builds connections, typed parameters and watchers on
//! top of it.
//!
//! # Architecture overview (for beginners)
//!
//! A BrlAPI server drives a braille display (and sometimes speech) on behalf
//! of screen readers and other applications.  A client talks to it through
//! three kinds of interaction:
//!
//! - **Parameters** – named, typed values such as `display-size` or
//!   `cursor-blink-period` that can be read, sometimes written, and watched
//!   for changes.  See [`param`].
//! - **Key events** – 64-bit codes describing what the user pressed.  See
//!   [`keycode`].
//! - **Errors** – numeric codes the server reports.  See [`error_code`].
//!
//! Users name parameters and operands by typing, so names may be abbreviated
//! as long as the abbreviation is unique.  See [`keyword`].

pub mod error_code;
pub mod keycode;
pub mod keyword;
pub mod param;
pub mod parse;

pub use error_code::ErrorCode;
pub use keycode::{CommandKeycode, DriverKeycode, KeycodeSet};
pub use keyword::KeywordMap;
pub use param::{
    OperandStyle, ParameterDescriptor, ParameterId, ParameterValue, Settable, ValueError, ValueKind,
    PARAMETERS,
};
pub use parse::ParseError;
