//! Register map of the fan controller and the bus abstraction over it.
//!
//! The controller exposes sixteen contiguous 32-bit words starting at its
//! physical base address:
//!
//! ```text
//! Offset  Register       Access  Encoding
//! ──────  ─────────────  ──────  ─────────────────────────────────────
//!  0      low_temp       R/W     hundredths of °C
//!  1      max_temp       R/W     hundredths of °C
//!  2      smooth         R/W     raw divisor
//!  3      fixed          R/W     bit 12 fixed flag, bits 0-11 duty
//!  4      temp           R/W     hundredths of °C
//!  5      alarm          R/W     raw flag
//!  6      dbg_state      R       fan state 0-3
//!  7      dbg_pwm        R       Q8
//!  8      dbg_use_pwm    R       Q8
//!  9      dbg_last_pwm   R       Q8
//! 10      dbg_real_temp  R       Q8 hundredths of °C
//! 11      dbg_use_temp   R       Q8 hundredths of °C
//! 12      dbg_last_temp  R       Q8 hundredths of °C
//! 13      dbg_temp_error R       Q8 hundredths of °C
//! 14      dbg_linear     R       Q8
//! 15      dbg_max_pwm    R       Q8
//! ```

mod file;
#[cfg(test)]
pub(crate) mod memory;

pub use file::RegisterFile;

use crate::error::{Error, Result};

/// Number of registers in the block.
pub const REGISTER_COUNT: usize = 16;

/// Size of the register block in bytes.
pub const BLOCK_SIZE: usize = REGISTER_COUNT * size_of::<u32>();

/// One register of the fan controller.
///
/// The discriminant is the word offset from the base address, so a value of
/// this type is always inside the block.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter, strum::FromRepr,
)]
#[strum(serialize_all = "snake_case")]
#[repr(usize)]
pub enum Register {
    LowTemp = 0,
    MaxTemp = 1,
    Smooth = 2,
    Fixed = 3,
    Temp = 4,
    Alarm = 5,
    DbgState = 6,
    DbgPwm = 7,
    DbgUsePwm = 8,
    DbgLastPwm = 9,
    DbgRealTemp = 10,
    DbgUseTemp = 11,
    DbgLastTemp = 12,
    DbgTempError = 13,
    DbgLinear = 14,
    DbgMaxPwm = 15,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    ReadWrite,
    ReadOnly,
}

impl Register {
    /// Look up a register by word offset.
    pub fn from_offset(offset: usize) -> Result<Self> {
        Self::from_repr(offset).ok_or(Error::InvalidRegister(offset))
    }

    /// Word offset from the base address.
    pub fn offset(self) -> usize {
        self as usize
    }

    /// Byte offset from the base address.
    pub fn byte_offset(self) -> usize {
        self.offset() * size_of::<u32>()
    }

    pub fn access(self) -> Access {
        if self.offset() <= Register::Alarm.offset() {
            Access::ReadWrite
        } else {
            Access::ReadOnly
        }
    }

    /// Fail with [`Error::ReadOnlyRegister`] unless the register accepts writes.
    pub fn ensure_writable(self) -> Result<()> {
        match self.access() {
            Access::ReadWrite => Ok(()),
            Access::ReadOnly => Err(Error::ReadOnlyRegister(self)),
        }
    }
}

/// Access to the fan controller's register block.
///
/// Implemented by [`RegisterFile`] for the real hardware. Every call is a
/// single access to the device; nothing is cached between calls.
pub trait RegisterBus {
    /// Read one register.
    fn read(&self, register: Register) -> u32;

    /// Write one register.
    ///
    /// Returns [`Error::ReadOnlyRegister`] for the debug registers, leaving
    /// the hardware untouched.
    fn write(&mut self, register: Register, value: u32) -> Result<()>;

    /// Physical address of a register, for diagnostics.
    fn address_of(&self, register: Register) -> u64;
}
