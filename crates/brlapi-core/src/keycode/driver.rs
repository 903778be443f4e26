//! Driver keycodes.
//!
//! Layout:
//!
//! ```text
//!   63  62                               16 15       8 7        0
//! +-----+-----------------------------------+----------+----------+
//! |press|              (unused)             |  group   |  number  |
//! +-----+-----------------------------------+----------+----------+
//!       \_____________________ value _____________________________/
//! ```
//!
//! A number of [`NUMBER_ANY`] means "any key in the group" and is used by
//! key bindings rather than by real events.

use std::fmt;

use once_cell::sync::OnceCell;

pub const PRESS_FLAG: u64 = 0x8000_0000_0000_0000;
pub const VALUE_MASK: u64 = 0x7FFF_FFFF_FFFF_FFFF;
pub const GROUP_SHIFT: u32 = 8;
pub const GROUP_MASK: u64 = 0xFF00;
pub const NUMBER_MASK: u64 = 0x00FF;
pub const NUMBER_ANY: u32 = 0xFF;

/// Server-resolved names of a driver keycode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverNames {
    key_name: String,
    group_name: Option<String>,
}

impl DriverNames {
    /// Builds names from the resolver's answer: `[key, group?]`.
    pub fn from_names(names: Vec<String>) -> Option<Self> {
        let mut names = names.into_iter();
        let key_name = names.next()?;

        Some(Self {
            key_name,
            group_name: names.next(),
        })
    }

    pub fn key_name(&self) -> &str {
        &self.key_name
    }

    pub fn group_name(&self) -> Option<&str> {
        self.group_name.as_deref()
    }
}

/// A decoded driver keycode.
#[derive(Debug, Clone)]
pub struct DriverKeycode {
    raw: u64,
    names: OnceCell<Option<DriverNames>>,
}

impl DriverKeycode {
    pub fn new(raw: u64) -> Self {
        Self {
            raw,
            names: OnceCell::new(),
        }
    }

    pub fn from_fields(is_press: bool, group: u32, number: u32) -> Self {
        let mut raw = ((u64::from(group) << GROUP_SHIFT) & GROUP_MASK)
            | (u64::from(number) & NUMBER_MASK);
        if is_press {
            raw |= PRESS_FLAG;
        }
        Self::new(raw)
    }

    pub fn raw(&self) -> u64 {
        self.raw
    }

    pub fn is_press(&self) -> bool {
        self.raw & PRESS_FLAG != 0
    }

    /// Everything except the press bit.
    pub fn value(&self) -> u64 {
        self.raw & VALUE_MASK
    }

    pub fn group(&self) -> u32 {
        ((self.raw & GROUP_MASK) >> GROUP_SHIFT) as u32
    }

    pub fn number(&self) -> u32 {
        (self.raw & NUMBER_MASK) as u32
    }

    pub fn is_any_number(&self) -> bool {
        self.number() == NUMBER_ANY
    }

    /// Resolves the human-readable names, at most once per instance.
    ///
    /// Same contract as [`super::CommandKeycode::names_with`]: errors are not
    /// remembered, empty answers are.
    pub fn names_with<F, E>(&self, resolve: F) -> Result<Option<&DriverNames>, E>
    where
        F: FnOnce(u64) -> Result<Vec<String>, E>,
    {
        let names = self
            .names
            .get_or_try_init(|| resolve(self.raw).map(DriverNames::from_names))?;
        Ok(names.as_ref())
    }

    pub fn cached_names(&self) -> Option<Option<&DriverNames>> {
        self.names.get().map(Option::as_ref)
    }
}

impl PartialEq for DriverKeycode {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for DriverKeycode {}

impl From<u64> for DriverKeycode {
    fn from(raw: u64) -> Self {
        Self::new(raw)
    }
}

impl fmt::Display for DriverKeycode {
    /// `0x8000000000000103 (press=true value=0x103 group=1 number=3)`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:#018X} (press={} value={:#X} group={} number=",
            self.raw,
            self.is_press(),
            self.value(),
            self.group()
        )?;

        if self.is_any_number() {
            f.write_str("any)")
        } else {
            write!(f, "{})", self.number())
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_press_group_and_number() {
        let keycode = DriverKeycode::new(0x8000_0000_0000_0103);

        assert!(keycode.is_press());
        assert_eq!(keycode.value(), 0x103);
        assert_eq!(keycode.group(), 1);
        assert_eq!(keycode.number(), 3);
        assert!(!keycode.is_any_number());
    }

    #[test]
    fn test_release_has_no_press_bit() {
        let keycode = DriverKeycode::from_fields(false, 2, 9);

        assert!(!keycode.is_press());
        assert_eq!(keycode.raw(), 0x0209);
    }

    #[test]
    fn test_display_uses_fixed_format() {
        let press = DriverKeycode::from_fields(true, 1, 3);
        let any = DriverKeycode::from_fields(false, 4, NUMBER_ANY);

        assert_eq!(
            press.to_string(),
            "0x8000000000000103 (press=true value=0x103 group=1 number=3)"
        );
        assert_eq!(
            any.to_string(),
            "0x00000000000004FF (press=false value=0x4FF group=4 number=any)"
        );
    }

    #[test]
    fn test_names_with_optional_group() {
        let keycode = DriverKeycode::from_fields(true, 0, 1);

        let names = keycode
            .names_with(|_| Ok::<_, ()>(vec!["Dot1".to_string()]))
            .unwrap()
            .unwrap();

        assert_eq!(names.key_name(), "Dot1");
        assert_eq!(names.group_name(), None);
    }
}
