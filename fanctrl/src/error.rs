//! Error types for fanctrl.

use std::io;
use std::path::PathBuf;

use crate::hw::Register;

/// Errors raised by the register layer, the codec and the report loop.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("No base address configured (use --base-address or FANCTRL_BASE_ADDRESS)")]
    MissingBaseAddress,

    #[error("Invalid base address {0}: {1}")]
    InvalidBaseAddress(String, &'static str),

    #[error("Can't open {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("Can't map address {address:#x}: {source}")]
    Map { address: u64, source: io::Error },

    #[error("Register {0} is read-only")]
    ReadOnlyRegister(Register),

    #[error("Register offset {0} is outside the register block")]
    InvalidRegister(usize),

    #[error("Invalid fan state {0} (expected 0-3)")]
    InvalidFanState(u32),

    #[error("Invalid temperature {0} (must be a non-negative number of degrees)")]
    InvalidTemperature(f64),

    #[error("Invalid duty cycle {0} (must be between 0 and 100)")]
    InvalidPercent(f64),

    #[error("Failed to write report: {0}")]
    Output(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
