//! The protocol's parameter catalog, as static data.
//!
//! Each parameter is identified by a [`ParameterId`] whose numeric value is
//! the identifier used on the wire.  The name users type
//! (`cursor-blink-period`) is derived from the identifier's variant name by
//! `strum`, so there is exactly one place where a parameter is spelled.
//!
//! [`PARAMETERS`] is the explicit, ordered table describing every parameter:
//! its value kind, whether requests target the whole server or only this
//! client's current target, whether general listings should skip it, and the
//! write capability it carries (if any).

pub mod value;

use strum::{EnumCount, EnumIter, IntoEnumIterator, IntoStaticStr};

pub use value::{OperandStyle, ParameterValue, Settable, ValueError, ValueKind};

/// Wire identifiers of all parameters.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, EnumCount, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
#[repr(u32)]
pub enum ParameterId {
    ServerVersion = 0,
    ClientPriority = 1,
    DriverName = 2,
    DriverCode = 3,
    DriverVersion = 4,
    DeviceModel = 5,
    DisplaySize = 6,
    DeviceIdentifier = 7,
    DeviceSpeed = 8,
    DeviceOnline = 9,
    RetainDots = 10,
    ComputerBrailleCellSize = 11,
    LiteraryBraille = 12,
    CursorDots = 13,
    CursorBlinkPeriod = 14,
    CursorBlinkPercentage = 15,
    RenderedCells = 16,
    SkipIdenticalLines = 17,
    AudibleAlerts = 18,
    ClipboardContent = 19,
    BoundCommandKeycodes = 20,
    CommandKeycodeName = 21,
    CommandKeycodeSummary = 22,
    DefinedDriverKeycodes = 23,
    DriverKeycodeName = 24,
    DriverKeycodeSummary = 25,
    ComputerBrailleRowsMask = 26,
    ComputerBrailleRowCells = 27,
    ComputerBrailleTable = 28,
    LiteraryBrailleTable = 29,
    MessageLocale = 30,
    DeviceCellSize = 31,
}

impl ParameterId {
    /// The numeric identifier sent to the server.
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Lowercase, hyphen-separated name, e.g. `"device-online"`.
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Looks up the static description of this parameter.
    pub fn descriptor(self) -> &'static ParameterDescriptor {
        // The table is indexed by code; `descriptor_table_is_indexed_by_code`
        // keeps that true.
        &PARAMETERS[self as usize]
    }

    /// Converts a wire identifier back into a [`ParameterId`].
    pub fn from_code(code: u32) -> Option<Self> {
        ParameterId::iter().find(|id| id.code() == code)
    }
}

impl std::fmt::Display for ParameterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Static description of one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterDescriptor {
    pub id: ParameterId,
    /// Representation of the value returned by the server.
    pub kind: ValueKind,
    /// `true` if requests address the whole server rather than the
    /// connection's currently focused target.
    pub global: bool,
    /// `true` if "list all parameters" should skip this one by default.
    pub hidable: bool,
    /// Write capability, or `None` for read-only parameters.
    pub settable: Option<Settable>,
    /// Syntax of text operands for [`Settable::parse_styled`].
    pub operand: OperandStyle,
}

impl ParameterDescriptor {
    const fn new(id: ParameterId, kind: ValueKind) -> Self {
        Self {
            id,
            kind,
            global: true,
            hidable: false,
            settable: None,
            operand: OperandStyle::Plain,
        }
    }

    const fn local(mut self) -> Self {
        self.global = false;
        self
    }

    const fn hidable(mut self) -> Self {
        self.hidable = true;
        self
    }

    const fn settable(mut self, settable: Settable) -> Self {
        self.settable = Some(settable);
        self
    }

    const fn dots(mut self) -> Self {
        self.operand = OperandStyle::Dots;
        self
    }

    pub fn name(&self) -> &'static str {
        self.id.name()
    }
}

use ParameterId as P;
use ValueKind as K;

/// Every parameter, ordered by wire identifier.
pub static PARAMETERS: [ParameterDescriptor; ParameterId::COUNT] = [
    ParameterDescriptor::new(P::ServerVersion, K::Int),
    ParameterDescriptor::new(P::ClientPriority, K::Int)
        .local()
        .settable(Settable::Int { min: 0, max: 100 }),
    ParameterDescriptor::new(P::DriverName, K::String),
    ParameterDescriptor::new(P::DriverCode, K::String),
    ParameterDescriptor::new(P::DriverVersion, K::String),
    ParameterDescriptor::new(P::DeviceModel, K::String),
    ParameterDescriptor::new(P::DisplaySize, K::Ints),
    ParameterDescriptor::new(P::DeviceIdentifier, K::String),
    ParameterDescriptor::new(P::DeviceSpeed, K::Int),
    ParameterDescriptor::new(P::DeviceOnline, K::Boolean),
    ParameterDescriptor::new(P::RetainDots, K::Boolean)
        .local()
        .settable(Settable::Boolean),
    ParameterDescriptor::new(P::ComputerBrailleCellSize, K::Byte)
        .settable(Settable::Byte { min: 6, max: 8 }),
    ParameterDescriptor::new(P::LiteraryBraille, K::Boolean).settable(Settable::Boolean),
    ParameterDescriptor::new(P::CursorDots, K::Byte)
        .settable(Settable::byte())
        .dots(),
    ParameterDescriptor::new(P::CursorBlinkPeriod, K::Int)
        .settable(Settable::Int { min: 100, max: 10_000 }),
    ParameterDescriptor::new(P::CursorBlinkPercentage, K::Byte)
        .settable(Settable::Byte { min: 0, max: 100 }),
    ParameterDescriptor::new(P::RenderedCells, K::Bytes),
    ParameterDescriptor::new(P::SkipIdenticalLines, K::Boolean).settable(Settable::Boolean),
    ParameterDescriptor::new(P::AudibleAlerts, K::Boolean).settable(Settable::Boolean),
    ParameterDescriptor::new(P::ClipboardContent, K::String).settable(Settable::String),
    ParameterDescriptor::new(P::BoundCommandKeycodes, K::Longs).hidable(),
    ParameterDescriptor::new(P::CommandKeycodeName, K::String).hidable(),
    ParameterDescriptor::new(P::CommandKeycodeSummary, K::String).hidable(),
    ParameterDescriptor::new(P::DefinedDriverKeycodes, K::Longs).hidable(),
    ParameterDescriptor::new(P::DriverKeycodeName, K::String).hidable(),
    ParameterDescriptor::new(P::DriverKeycodeSummary, K::String).hidable(),
    ParameterDescriptor::new(P::ComputerBrailleRowsMask, K::Bytes).hidable(),
    ParameterDescriptor::new(P::ComputerBrailleRowCells, K::Bytes).hidable(),
    ParameterDescriptor::new(P::ComputerBrailleTable, K::String).settable(Settable::String),
    ParameterDescriptor::new(P::LiteraryBrailleTable, K::String).settable(Settable::String),
    ParameterDescriptor::new(P::MessageLocale, K::String).settable(Settable::String),
    ParameterDescriptor::new(P::DeviceCellSize, K::Byte),
];

// ── Tests ─────────────────────────────────────────────────────────────────────
