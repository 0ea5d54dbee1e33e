//! Driver error types

use core::fmt;

use crate::hal::BusError;

/// Failure reported by a sink EDID parser.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EdidError {
    /// HPD dropped, the sink is gone.
    NoHpd,
    /// Base block does not start with the fixed EDID header.
    BadHeader,
    /// Block bytes do not sum to zero.
    BadChecksum(u8),
    /// Block index past the last block the parser keeps.
    UnsupportedBlock(u8),
}

impl fmt::Display for EdidError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EdidError::NoHpd => write!(f, "no HPD"),
            EdidError::BadHeader => write!(f, "bad EDID header"),
            EdidError::BadChecksum(block) => write!(f, "bad checksum in block {}", block),
            EdidError::UnsupportedBlock(block) => write!(f, "unsupported block {}", block),
        }
    }
}

/// Error type for transmitter operations
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MhlError {
    /// Register access failed
    Bus(BusError),
    /// Downstream HPD is not asserted
    NoHpd,
    /// CBUS command code the encoder does not handle
    UnsupportedCommand(u8),
    /// Incoming timing cannot be carried over the link
    UnsupportedVideoMode(&'static str),
    /// Device id read back is not a supported part
    UnknownDevice(u16),
    /// Requested range falls outside the buffer
    OutOfRange,
    /// No assembled EDID block is left to hand out
    NoEdidBlock,
    /// Sink EDID parsing failed
    Edid(EdidError),
}

impl MhlError {
    /// Converts the error to a numeric error code
    pub fn to_error_code(&self) -> isize {
        match self {
            MhlError::Bus(BusError(code)) => *code as isize,
            MhlError::NoHpd => -6,
            MhlError::UnsupportedCommand(_) => -22,
            MhlError::UnsupportedVideoMode(_) => -95,
            MhlError::UnknownDevice(_) => -19,
            MhlError::OutOfRange => -34,
            MhlError::NoEdidBlock => -61,
            MhlError::Edid(_) => -74,
        }
    }
}

impl fmt::Display for MhlError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MhlError::Bus(e) => write!(f, "{}", e),
            MhlError::NoHpd => write!(f, "no HPD"),
            MhlError::UnsupportedCommand(cmd) => write!(f, "unsupported CBUS command {:#04x}", cmd),
            MhlError::UnsupportedVideoMode(why) => write!(f, "unsupported video mode: {}", why),
            MhlError::UnknownDevice(id) => write!(f, "unknown device id {:#06x}", id),
            MhlError::OutOfRange => write!(f, "range out of bounds"),
            MhlError::NoEdidBlock => write!(f, "no EDID block available"),
            MhlError::Edid(e) => write!(f, "EDID: {}", e),
        }
    }
}

impl From<BusError> for MhlError {
    fn from(e: BusError) -> Self {
        MhlError::Bus(e)
    }
}

impl From<EdidError> for MhlError {
    fn from(e: EdidError) -> Self {
        match e {
            EdidError::NoHpd => MhlError::NoHpd,
            other => MhlError::Edid(other),
        }
    }
}

pub type Result<T> = core::result::Result<T, MhlError>;
