//! Parameter values and the settable capability.
//!
//! The server hands back one of a small, fixed set of value representations.
//! [`ParameterValue`] is that closed set; [`Settable`] is the (optional)
//! capability a parameter carries for writing, including the inclusive range
//! every numeric write is checked against before it leaves the process.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::parse::{parse_boolean, parse_dots, parse_unsigned, ParseError};

// ── Value kinds ───────────────────────────────────────────────────────────────

/// The representation a parameter's value uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    String,
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Bytes,
    Ints,
    Longs,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::String => "string",
            ValueKind::Boolean => "boolean",
            ValueKind::Byte => "byte",
            ValueKind::Short => "short",
            ValueKind::Int => "int",
            ValueKind::Long => "long",
            ValueKind::Bytes => "byte array",
            ValueKind::Ints => "int array",
            ValueKind::Longs => "long array",
        };
        f.write_str(name)
    }
}

/// A value read from, written to, or reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterValue {
    String(String),
    Boolean(bool),
    Byte(u8),
    Short(u16),
    Int(u32),
    Long(u64),
    Bytes(Vec<u8>),
    Ints(Vec<u32>),
    Longs(Vec<u64>),
}

impl ParameterValue {
    /// Returns the representation of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            ParameterValue::String(_) => ValueKind::String,
            ParameterValue::Boolean(_) => ValueKind::Boolean,
            ParameterValue::Byte(_) => ValueKind::Byte,
            ParameterValue::Short(_) => ValueKind::Short,
            ParameterValue::Int(_) => ValueKind::Int,
            ParameterValue::Long(_) => ValueKind::Long,
            ParameterValue::Bytes(_) => ValueKind::Bytes,
            ParameterValue::Ints(_) => ValueKind::Ints,
            ParameterValue::Longs(_) => ValueKind::Longs,
        }
    }

    /// Returns the numeric value of a scalar integer, widened to `u64`.
    pub fn as_unsigned(&self) -> Option<u64> {
        match self {
            ParameterValue::Byte(v) => Some(u64::from(*v)),
            ParameterValue::Short(v) => Some(u64::from(*v)),
            ParameterValue::Int(v) => Some(u64::from(*v)),
            ParameterValue::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParameterValue::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParameterValue::String(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{item}")?;
            }
            Ok(())
        }

        match self {
            ParameterValue::String(v) => f.write_str(v),
            ParameterValue::Boolean(v) => f.write_str(if *v { "yes" } else { "no" }),
            ParameterValue::Byte(v) => write!(f, "{v}"),
            ParameterValue::Short(v) => write!(f, "{v}"),
            ParameterValue::Int(v) => write!(f, "{v}"),
            ParameterValue::Long(v) => write!(f, "{v}"),
            ParameterValue::Bytes(v) => join(f, v),
            ParameterValue::Ints(v) => join(f, v),
            // Long arrays carry keycodes, which are only readable in hex.
            ParameterValue::Longs(v) => {
                let hex: Vec<String> = v.iter().map(|code| format!("{code:#X}")).collect();
                join(f, &hex)
            }
        }
    }
}

// ── Settable capability ───────────────────────────────────────────────────────

/// Why a value was refused before any transport call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValueError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("wrong value kind: {description}: expected {expected}, got {actual}")]
    WrongKind {
        description: String,
        expected: ValueKind,
        actual: ValueKind,
    },
}

/// How a text operand is written for a parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OperandStyle {
    /// The capability's own syntax: decimal numbers, boolean words, text.
    #[default]
    Plain,
    /// A braille dot list such as `78`, stored as a byte mask.
    Dots,
}

/// The single write capability a parameter may carry.
///
/// Numeric capabilities hold an inclusive `[min, max]` range.  A parameter
/// without a capability is represented as `Option::<Settable>::None` and
/// rejects every write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settable {
    String,
    Boolean,
    Byte { min: u8, max: u8 },
    Short { min: u16, max: u16 },
    Int { min: u32, max: u32 },
    Long { min: u64, max: u64 },
}

impl Settable {
    /// A byte capability covering the full unsigned range.
    pub const fn byte() -> Self {
        Settable::Byte { min: 0, max: u8::MAX }
    }

    pub const fn short() -> Self {
        Settable::Short { min: 0, max: u16::MAX }
    }

    pub const fn int() -> Self {
        Settable::Int { min: 0, max: u32::MAX }
    }

    pub const fn long() -> Self {
        Settable::Long { min: 0, max: u64::MAX }
    }

    /// The value representation this capability writes.
    pub fn kind(&self) -> ValueKind {
        match self {
            Settable::String => ValueKind::String,
            Settable::Boolean => ValueKind::Boolean,
            Settable::Byte { .. } => ValueKind::Byte,
            Settable::Short { .. } => ValueKind::Short,
            Settable::Int { .. } => ValueKind::Int,
            Settable::Long { .. } => ValueKind::Long,
        }
    }

    /// The inclusive numeric range, if this is a numeric capability.
    pub fn range(&self) -> Option<(u64, u64)> {
        match *self {
            Settable::String | Settable::Boolean => None,
            Settable::Byte { min, max } => Some((min.into(), max.into())),
            Settable::Short { min, max } => Some((min.into(), max.into())),
            Settable::Int { min, max } => Some((min.into(), max.into())),
            Settable::Long { min, max } => Some((min, max)),
        }
    }

    /// Parses `operand` into this capability's representation.
    ///
    /// Numeric operands are range-checked; the returned value always
    /// satisfies [`Settable::check`].
    pub fn parse(&self, description: &str, operand: &str) -> Result<ParameterValue, ValueError> {
        let value = match *self {
            Settable::String => ParameterValue::String(operand.to_string()),
            Settable::Boolean => ParameterValue::Boolean(parse_boolean(description, operand)?),
            Settable::Byte { min, max } => {
                let value = parse_unsigned(description, operand, min.into(), max.into())?;
                ParameterValue::Byte(value as u8)
            }
            Settable::Short { min, max } => {
                let value = parse_unsigned(description, operand, min.into(), max.into())?;
                ParameterValue::Short(value as u16)
            }
            Settable::Int { min, max } => {
                let value = parse_unsigned(description, operand, min.into(), max.into())?;
                ParameterValue::Int(value as u32)
            }
            Settable::Long { min, max } => {
                ParameterValue::Long(parse_unsigned(description, operand, min, max)?)
            }
        };

        Ok(value)
    }

    /// Like [`Settable::parse`], reading the operand in `style`.
    ///
    /// Dot lists only apply to byte capabilities; any other pairing falls
    /// back to the plain syntax.
    pub fn parse_styled(
        &self,
        style: OperandStyle,
        description: &str,
        operand: &str,
    ) -> Result<ParameterValue, ValueError> {
        match (style, self) {
            (OperandStyle::Dots, Settable::Byte { .. }) => {
                let value = ParameterValue::Byte(parse_dots(description, operand)?);
                self.check(description, &value)?;
                Ok(value)
            }
            _ => self.parse(description, operand),
        }
    }

    /// Checks a typed value against this capability's kind and range.
    pub fn check(&self, description: &str, value: &ParameterValue) -> Result<(), ValueError> {
        if value.kind() != self.kind() {
            return Err(ValueError::WrongKind {
                description: description.to_string(),
                expected: self.kind(),
                actual: value.kind(),
            });
        }

        if let (Some((min, max)), Some(number)) = (self.range(), value.as_unsigned()) {
            if number < min {
                return Err(ParseError::TooSmall {
                    minimum: min,
                    description: description.to_string(),
                    operand: number.to_string(),
                }
                .into());
            }

            if number > max {
                return Err(ParseError::TooLarge {
                    maximum: max,
                    description: description.to_string(),
                    operand: number.to_string(),
                }
                .into());
            }
        }

        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
