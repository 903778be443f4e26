//! Protocol error codes reported by the server and the transport.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A protocol error code.
///
/// Codes outside the known range are preserved in [`ErrorCode::Unknown`] so
/// nothing reported by the server is lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    Success,
    NoMemory,
    TtyBusy,
    DeviceBusy,
    UnknownInstruction,
    IllegalInstruction,
    InvalidParameter,
    InvalidPacket,
    ConnectionRefused,
    OperationNotSupported,
    AddressResolution,
    SystemCall,
    UnknownTty,
    ProtocolVersion,
    EndOfFile,
    EmptyKey,
    DriverError,
    Authentication,
    ReadOnlyParameter,
    Unknown(i32),
}

impl ErrorCode {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => ErrorCode::Success,
            1 => ErrorCode::NoMemory,
            2 => ErrorCode::TtyBusy,
            3 => ErrorCode::DeviceBusy,
            4 => ErrorCode::UnknownInstruction,
            5 => ErrorCode::IllegalInstruction,
            6 => ErrorCode::InvalidParameter,
            7 => ErrorCode::InvalidPacket,
            8 => ErrorCode::ConnectionRefused,
            9 => ErrorCode::OperationNotSupported,
            10 => ErrorCode::AddressResolution,
            11 => ErrorCode::SystemCall,
            12 => ErrorCode::UnknownTty,
            13 => ErrorCode::ProtocolVersion,
            14 => ErrorCode::EndOfFile,
            15 => ErrorCode::EmptyKey,
            16 => ErrorCode::DriverError,
            17 => ErrorCode::Authentication,
            18 => ErrorCode::ReadOnlyParameter,
            other => ErrorCode::Unknown(other),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            ErrorCode::Success => 0,
            ErrorCode::NoMemory => 1,
            ErrorCode::TtyBusy => 2,
            ErrorCode::DeviceBusy => 3,
            ErrorCode::UnknownInstruction => 4,
            ErrorCode::IllegalInstruction => 5,
            ErrorCode::InvalidParameter => 6,
            ErrorCode::InvalidPacket => 7,
            ErrorCode::ConnectionRefused => 8,
            ErrorCode::OperationNotSupported => 9,
            ErrorCode::AddressResolution => 10,
            ErrorCode::SystemCall => 11,
            ErrorCode::UnknownTty => 12,
            ErrorCode::ProtocolVersion => 13,
            ErrorCode::EndOfFile => 14,
            ErrorCode::EmptyKey => 15,
            ErrorCode::DriverError => 16,
            ErrorCode::Authentication => 17,
            ErrorCode::ReadOnlyParameter => 18,
            ErrorCode::Unknown(code) => code,
        }
    }

    /// The canonical one-line description of the code.
    pub fn message(self) -> &'static str {
        match self {
            ErrorCode::Success => "success",
            ErrorCode::NoMemory => "insufficient memory",
            ErrorCode::TtyBusy => "tty is busy",
            ErrorCode::DeviceBusy => "device is busy",
            ErrorCode::UnknownInstruction => "unknown instruction",
            ErrorCode::IllegalInstruction => "illegal instruction",
            ErrorCode::InvalidParameter => "invalid parameter",
            ErrorCode::InvalidPacket => "invalid packet",
            ErrorCode::ConnectionRefused => "connection refused",
            ErrorCode::OperationNotSupported => "operation not supported",
            ErrorCode::AddressResolution => "address resolution failed",
            ErrorCode::SystemCall => "system call failed",
            ErrorCode::UnknownTty => "unknown tty",
            ErrorCode::ProtocolVersion => "incompatible protocol version",
            ErrorCode::EndOfFile => "unexpected end of file",
            ErrorCode::EmptyKey => "key file is empty",
            ErrorCode::DriverError => "driver error",
            ErrorCode::Authentication => "authentication failed",
            ErrorCode::ReadOnlyParameter => "parameter cannot be changed",
            ErrorCode::Unknown(_) => "unknown error",
        }
    }
}

impl From<i32> for ErrorCode {
    fn from(code: i32) -> Self {
        ErrorCode::from_code(code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Unknown(code) => write!(f, "unknown error {code}"),
            known => f.write_str(known.message()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for code in 0..=18 {
            assert_eq!(ErrorCode::from_code(code).code(), code);
        }
        assert_eq!(ErrorCode::from_code(77), ErrorCode::Unknown(77));
        assert_eq!(ErrorCode::Unknown(77).code(), 77);
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorCode::Authentication.to_string(), "authentication failed");
        assert_eq!(ErrorCode::Unknown(42).to_string(), "unknown error 42");
    }
}
