//! Command keycodes.
//!
//! Layout (most significant bit first):
//!
//! ```text
//!  63                32 31  29 28          16 15             0
//! +--------------------+------+--------------+----------------+
//! |       flags        | type |   command    |    argument    |
//! +--------------------+------+--------------+----------------+
//! ```
//!
//! For symbol keycodes (type 0) the low 29 bits hold the keyboard symbol
//! rather than a command/argument pair.  The symbol is split at its argument
//! width instead: 8 bits for Latin-1 symbols, 24 bits for Unicode symbols
//! (`0x0100_0000` block).  Any other symbol has no argument and
//! [`CommandKeycode::command`] returns it whole, unshifted.

use std::fmt;

use once_cell::sync::OnceCell;

pub const FLAGS_SHIFT: u32 = 32;
pub const FLAGS_MASK: u64 = 0xFFFF_FFFF_0000_0000;
pub const TYPE_SHIFT: u32 = 29;
pub const TYPE_MASK: u64 = 0x0000_0000_E000_0000;
pub const CODE_MASK: u64 = 0x0000_0000_1FFF_FFFF;
pub const COMMAND_SHIFT: u32 = 16;
pub const COMMAND_MASK: u64 = 0x0000_0000_1FFF_0000;
pub const ARGUMENT_MASK: u64 = 0x0000_0000_0000_FFFF;

const SYMBOL_BLOCK_MASK: u32 = 0xFF00_0000;
const SYMBOL_UNICODE_BLOCK: u32 = 0x0100_0000;
const SYMBOL_PAGE_MASK: u32 = 0x00FF_0000;

/// Keyboard symbol (type field value).
pub const TYPE_SYMBOL: u32 = 0;
/// Screen-reader command (type field value).
pub const TYPE_COMMAND: u32 = 1;

/// Server-resolved names of a command keycode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandNames {
    type_name: String,
    command_name: String,
    flag_names: Vec<String>,
}

impl CommandNames {
    /// Builds names from the resolver's answer: `[type, command, flags...]`.
    ///
    /// Returns `None` when fewer than two names were supplied.
    pub fn from_names(mut names: Vec<String>) -> Option<Self> {
        if names.len() < 2 {
            return None;
        }

        let flag_names = names.split_off(2);
        let command_name = names.pop()?;
        let type_name = names.pop()?;

        Some(Self {
            type_name,
            command_name,
            flag_names,
        })
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn command_name(&self) -> &str {
        &self.command_name
    }

    pub fn flag_names(&self) -> &[String] {
        &self.flag_names
    }
}

/// A decoded command keycode.
#[derive(Debug, Clone)]
pub struct CommandKeycode {
    raw: u64,
    names: OnceCell<Option<CommandNames>>,
}

impl CommandKeycode {
    pub fn new(raw: u64) -> Self {
        Self {
            raw,
            names: OnceCell::new(),
        }
    }

    /// Packs the four fields into a raw code.
    ///
    /// Bits that do not fit a field are discarded.
    pub fn from_fields(kind: u32, command: u32, argument: u32, flags: u32) -> Self {
        let raw = (u64::from(flags) << FLAGS_SHIFT)
            | ((u64::from(kind) << TYPE_SHIFT) & TYPE_MASK)
            | ((u64::from(command) << COMMAND_SHIFT) & COMMAND_MASK)
            | (u64::from(argument) & ARGUMENT_MASK);
        Self::new(raw)
    }

    pub fn raw(&self) -> u64 {
        self.raw
    }

    pub fn kind(&self) -> u32 {
        ((self.raw & TYPE_MASK) >> TYPE_SHIFT) as u32
    }

    pub fn is_command(&self) -> bool {
        self.kind() == TYPE_COMMAND
    }

    /// Low 29 bits: command plus argument, or the keyboard symbol.
    pub fn code(&self) -> u32 {
        (self.raw & CODE_MASK) as u32
    }

    /// Bits of [`CommandKeycode::code`] that form the argument.
    ///
    /// `None` for symbols without an argument and for unknown types.
    pub fn argument_width(&self) -> Option<u32> {
        let code = self.code();

        match self.kind() {
            TYPE_COMMAND => Some(16),
            TYPE_SYMBOL => match code & SYMBOL_BLOCK_MASK {
                0 if code & SYMBOL_PAGE_MASK == 0 => Some(8),
                SYMBOL_UNICODE_BLOCK => Some(24),
                _ => None,
            },
            _ => None,
        }
    }

    /// The command block, shifted down, for commands.  For other types, the
    /// code with its argument bits cleared.
    pub fn command(&self) -> u32 {
        if self.is_command() {
            return ((self.raw & COMMAND_MASK) >> COMMAND_SHIFT) as u32;
        }

        self.code() & !self.argument_mask()
    }

    pub fn argument(&self) -> u32 {
        self.code() & self.argument_mask()
    }

    fn argument_mask(&self) -> u32 {
        match self.argument_width() {
            Some(width) => (1u32 << width) - 1,
            None => 0,
        }
    }

    pub fn flags(&self) -> u32 {
        ((self.raw & FLAGS_MASK) >> FLAGS_SHIFT) as u32
    }

    /// Resolves the human-readable names, at most once per instance.
    ///
    /// `resolve` receives the raw code and returns the server's answer.  An
    /// error is passed through without being remembered, so a later call may
    /// retry; an empty or incomplete answer is remembered as `None`.
    pub fn names_with<F, E>(&self, resolve: F) -> Result<Option<&CommandNames>, E>
    where
        F: FnOnce(u64) -> Result<Vec<String>, E>,
    {
        let names = self
            .names
            .get_or_try_init(|| resolve(self.raw).map(CommandNames::from_names))?;
        Ok(names.as_ref())
    }

    /// Returns the names if they have already been resolved.
    pub fn cached_names(&self) -> Option<Option<&CommandNames>> {
        self.names.get().map(Option::as_ref)
    }
}

impl PartialEq for CommandKeycode {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for CommandKeycode {}

impl From<u64> for CommandKeycode {
    fn from(raw: u64) -> Self {
        Self::new(raw)
    }
}

impl fmt::Display for CommandKeycode {
    /// `0x0000000020320007 (type=0x1 command=0x32 argument=0x7 flags=0x0)`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:#018X} (type={:#X} command={:#X} argument={:#X} flags={:#X})",
            self.raw,
            self.kind(),
            self.command(),
            self.argument(),
            self.flags()
        )
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_decodes_each_field() {
        // Arrange
        let raw = (0x0001_u64 << TYPE_SHIFT) | (0x0032 << COMMAND_SHIFT) | 0x0007;

        // Act
        let keycode = CommandKeycode::new(raw);

        // Assert
        assert_eq!(keycode.kind(), 0x0001);
        assert!(keycode.is_command());
        assert_eq!(keycode.command(), 0x0032);
        assert_eq!(keycode.argument(), 0x0007);
        assert_eq!(keycode.flags(), 0);
        assert_eq!(keycode.code(), 0x0032_0007);
    }

    #[test]
    fn test_display_uses_fixed_format() {
        let keycode = CommandKeycode::from_fields(0x1, 0x32, 0x7, 0x0);

        assert_eq!(keycode.raw(), 0x2032_0007);
        assert_eq!(
            keycode.to_string(),
            "0x0000000020320007 (type=0x1 command=0x32 argument=0x7 flags=0x0)"
        );
    }

    #[test]
    fn test_flags_occupy_the_upper_half() {
        let keycode = CommandKeycode::from_fields(TYPE_COMMAND, 0x1, 0x2, 0x0000_0005);

        assert_eq!(keycode.flags(), 5);
        assert_eq!(keycode.raw() >> 32, 5);
        assert_eq!(keycode.command(), 1);
    }

    #[test]
    fn test_symbols_split_at_their_argument_width() {
        let latin = CommandKeycode::new(0x0000_0041);
        assert_eq!(latin.argument_width(), Some(8));
        assert_eq!((latin.command(), latin.argument()), (0, 0x41));

        let unicode = CommandKeycode::new(0x0100_20AC);
        assert_eq!(unicode.argument_width(), Some(24));
        assert_eq!((unicode.command(), unicode.argument()), (0x0100_0000, 0x20AC));

        let function_key = CommandKeycode::new(0x0000_FF51);
        assert_eq!(function_key.argument_width(), Some(8));
        assert_eq!((function_key.command(), function_key.argument()), (0xFF00, 0x51));

        let other = CommandKeycode::new(0x0004_0001);
        assert_eq!(other.argument_width(), None);
        assert_eq!((other.command(), other.argument()), (0x0004_0001, 0));
        assert_eq!(
            other.to_string(),
            "0x0000000000040001 (type=0x0 command=0x40001 argument=0x0 flags=0x0)"
        );
    }

    #[test]
    fn test_names_are_resolved_once() {
        // Arrange
        let keycode = CommandKeycode::from_fields(TYPE_COMMAND, 0x32, 0x7, 0);
        let calls = Cell::new(0);
        let resolve = |_raw: u64| -> Result<Vec<String>, ()> {
            calls.set(calls.get() + 1);
            Ok(vec!["CMD".into(), "ROUTE".into(), "TOGGLE_ON".into()])
        };

        // Act
        let first = keycode.names_with(resolve).unwrap().cloned();
        let second = keycode.names_with(resolve).unwrap().cloned();

        // Assert
        assert_eq!(calls.get(), 1);
        assert_eq!(first, second);
        let names = first.unwrap();
        assert_eq!(names.type_name(), "CMD");
        assert_eq!(names.command_name(), "ROUTE");
        assert_eq!(names.flag_names(), &["TOGGLE_ON".to_string()]);
    }

    #[test]
    fn test_empty_answer_is_remembered_as_no_names() {
        let keycode = CommandKeycode::new(0);
        let calls = Cell::new(0);
        let resolve = |_raw: u64| -> Result<Vec<String>, ()> {
            calls.set(calls.get() + 1);
            Ok(Vec::new())
        };

        assert_eq!(keycode.names_with(resolve), Ok(None));
        assert_eq!(keycode.names_with(resolve), Ok(None));
        assert_eq!(calls.get(), 1);
        assert_eq!(keycode.cached_names(), Some(None));
    }

    #[test]
    fn test_failed_resolution_is_not_remembered() {
        let keycode = CommandKeycode::new(0);

        let failed: Result<Option<&CommandNames>, &str> = keycode.names_with(|_| Err("timed out"));
        assert_eq!(failed, Err("timed out"));
        assert_eq!(keycode.cached_names(), None);
    }
}
