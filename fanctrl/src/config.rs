use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::hw::Register;

/// Memory device used when none is given.
pub const DEFAULT_DEVICE: &str = "/dev/mem";

/// Base address baked in at build time, if any.
///
/// Set `FANCTRL_BASE_ADDRESS` when building for a fixed bitstream; the
/// command line and the runtime environment still override it.
pub const BUILD_BASE_ADDRESS: Option<&str> = option_env!("FANCTRL_BASE_ADDRESS");

/// Default pause between reports in watch mode.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(1000);

/// Physical address of register 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseAddress(u64);

impl BaseAddress {
    /// Validate a physical base address. Registers are 32-bit words, so the
    /// block must start on a word boundary.
    pub fn new(address: u64) -> Result<Self> {
        if address % 4 != 0 {
            return Err(Error::InvalidBaseAddress(
                format!("{address:#x}"),
                "not aligned to a 32-bit word",
            ));
        }
        Ok(Self(address))
    }

    pub fn get(self) -> u64 {
        self.0
    }

    /// Physical address of `register`.
    pub fn register_address(self, register: Register) -> u64 {
        self.0 + register.byte_offset() as u64
    }

    /// Pick the base address from the command line (or runtime environment),
    /// falling back to the build-time default.
    pub fn resolve(configured: Option<BaseAddress>) -> Result<Self> {
        match configured {
            Some(address) => Ok(address),
            None => BUILD_BASE_ADDRESS
                .ok_or(Error::MissingBaseAddress)?
                .parse(),
        }
    }
}

impl FromStr for BaseAddress {
    type Err = Error;

    /// Accepts `0x`-prefixed hex or decimal.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let parsed = match trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            Some(hex) => u64::from_str_radix(&hex.replace('_', ""), 16),
            None => trimmed.replace('_', "").parse(),
        };
        let address =
            parsed.map_err(|_| Error::InvalidBaseAddress(s.to_string(), "not a number"))?;
        Self::new(address)
    }
}

impl fmt::Display for BaseAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Where the register block lives.
#[derive(Debug, Clone)]
pub struct MapConfig {
    pub device: PathBuf,
    pub base_address: BaseAddress,
}

impl MapConfig {
    pub fn new(base_address: BaseAddress) -> Self {
        Self {
            device: PathBuf::from(DEFAULT_DEVICE),
            base_address,
        }
    }
}

/// How the status report is produced.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Pause between reports in watch mode.
    pub interval: Duration,

    /// Keep reporting until the process is stopped.
    pub watch: bool,

    /// Include the debug registers.
    pub verbose: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            watch: false,
            verbose: false,
        }
    }
}
