//! Hardware seams for the MHL transmitter
//!
//! The driver core never touches I2C or GPIO directly. Board code provides:
//! - a [`RegisterBus`] for scalar and block register access
//! - a [`Platform`] for VBUS, the reset line and blocking delays

use core::fmt;

/// A chip register address as a `(page, offset)` pair.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegAddr {
    pub page: u8,
    pub offset: u8,
}

impl RegAddr {
    pub const fn new(page: u8, offset: u8) -> Self {
        Self { page, offset }
    }

    /// Address `n` registers further on the same page.
    pub const fn add(self, n: u8) -> Self {
        Self {
            page: self.page,
            offset: self.offset.wrapping_add(n),
        }
    }
}

impl fmt::Display for RegAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}:{:02X}", self.page, self.offset)
    }
}

/// Bus-level failure reported by the register shim.
///
/// Carries the negative errno-style code from the underlying transport.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BusError(pub i32);

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bus error {}", self.0)
    }
}

/// Register access to the transmitter.
pub trait RegisterBus {
    /// Read one register.
    fn read(&mut self, addr: RegAddr) -> Result<u8, BusError>;

    /// Write one register.
    fn write(&mut self, addr: RegAddr, value: u8) -> Result<(), BusError>;

    /// Read `buf.len()` consecutive registers starting at `addr`.
    fn read_block(&mut self, addr: RegAddr, buf: &mut [u8]) -> Result<(), BusError>;

    /// Write `data` to consecutive registers starting at `addr`.
    fn write_block(&mut self, addr: RegAddr, data: &[u8]) -> Result<(), BusError>;

    /// Replace the bits selected by `mask` with the matching bits of `value`.
    fn modify(&mut self, addr: RegAddr, mask: u8, value: u8) -> Result<(), BusError> {
        let old = self.read(addr)?;
        self.write(addr, (old & !mask) | (value & mask))
    }
}

/// Board control signals used by the lifecycle sequences.
pub trait Platform {
    /// Drive the VBUS supply towards the sink.
    fn set_vbus(&mut self, on: bool);

    /// Drive the transmitter reset GPIO.
    fn set_reset_pin(&mut self, high: bool);

    /// Blocking wait. Durations are part of the hardware contract.
    fn delay_ms(&mut self, ms: u32);

    /// Whether the chip should be reset when the driver shuts down.
    fn reset_on_exit_requested(&self) -> bool {
        false
    }
}
