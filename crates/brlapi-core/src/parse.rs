//! Operand parsing for name-driven tools.
//!
//! Every function takes a human-readable `description` (usually the
//! parameter name) that is echoed back in the error so the user can tell
//! which operand was rejected.

use once_cell::sync::Lazy;
use thiserror::Error;

use crate::keyword::KeywordMap;

/// Errors produced while converting an operand string into a value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("not a boolean: {description}: {operand}")]
    NotBoolean { description: String, operand: String },

    #[error("not an integer: {description}: {operand}")]
    NotInteger { description: String, operand: String },

    #[error("less than {minimum}: {description}: {operand}")]
    TooSmall {
        minimum: u64,
        description: String,
        operand: String,
    },

    #[error("greater than {maximum}: {description}: {operand}")]
    TooLarge {
        maximum: u64,
        description: String,
        operand: String,
    },

    #[error("not a dot number: {description}: {operand} ({number})")]
    NotDotNumber {
        description: String,
        operand: String,
        number: char,
    },

    #[error("duplicate dot number: {description}: {operand} ({number})")]
    DuplicateDotNumber {
        description: String,
        operand: String,
        number: char,
    },
}

/// Parses a boolean operand.
///
/// Accepts `true`/`false`, `on`/`off`, `yes`/`no` and `1`/`0`, each of which
/// may be abbreviated as long as the abbreviation is unique (`y`, `tr`, `of`).
pub fn parse_boolean(description: &str, operand: &str) -> Result<bool, ParseError> {
    BOOLEAN_KEYWORDS
        .get(operand.trim())
        .copied()
        .ok_or_else(|| ParseError::NotBoolean {
            description: description.to_string(),
            operand: operand.to_string(),
        })
}

/// Parses an unsigned integer operand and checks it against `[minimum, maximum]`.
///
/// Negative input is reported as [`ParseError::TooSmall`] rather than
/// [`ParseError::NotInteger`], matching what the user meant to type.
pub fn parse_unsigned(
    description: &str,
    operand: &str,
    minimum: u64,
    maximum: u64,
) -> Result<u64, ParseError> {
    let text = operand.trim();

    let value = match text.parse::<u64>() {
        Ok(value) => value,
        Err(_) if text.parse::<i128>().is_ok() => {
            // Either negative or wider than 64 bits.
            return Err(if text.starts_with('-') {
                ParseError::TooSmall {
                    minimum,
                    description: description.to_string(),
                    operand: operand.to_string(),
                }
            } else {
                ParseError::TooLarge {
                    maximum,
                    description: description.to_string(),
                    operand: operand.to_string(),
                }
            });
        }
        Err(_) => {
            return Err(ParseError::NotInteger {
                description: description.to_string(),
                operand: operand.to_string(),
            })
        }
    };

    if value < minimum {
        return Err(ParseError::TooSmall {
            minimum,
            description: description.to_string(),
            operand: operand.to_string(),
        });
    }

    if value > maximum {
        return Err(ParseError::TooLarge {
            maximum,
            description: description.to_string(),
            operand: operand.to_string(),
        });
    }

    Ok(value)
}

/// Parses a braille dot list such as `78` into a dot mask (bit 0 is dot 1).
///
/// Each character must be a dot number from `1` to `8`, used at most once.
/// `0` on its own means no dots.
pub fn parse_dots(description: &str, operand: &str) -> Result<u8, ParseError> {
    let text = operand.trim();
    if text == "0" {
        return Ok(0);
    }

    let mut dots = 0u8;
    for number in text.chars() {
        let index = match number.to_digit(10) {
            Some(digit @ 1..=8) => digit - 1,
            _ => {
                return Err(ParseError::NotDotNumber {
                    description: description.to_string(),
                    operand: operand.to_string(),
                    number,
                })
            }
        };

        let dot = 1u8 << index;
        if dots & dot != 0 {
            return Err(ParseError::DuplicateDotNumber {
                description: description.to_string(),
                operand: operand.to_string(),
                number,
            });
        }
        dots |= dot;
    }

    Ok(dots)
}

static BOOLEAN_KEYWORDS: Lazy<KeywordMap<bool>> = Lazy::new(|| {
    let mut map = KeywordMap::new();

    map.put("false", false);
    map.put("true", true);

    map.put("off", false);
    map.put("on", true);

    map.put("no", false);
    map.put("yes", true);

    map.put("0", false);
    map.put("1", true);

    map
});

// ── Tests ─────────────────────────────────────────────────────────────────────
