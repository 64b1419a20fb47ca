//! Operating state reported by the controller's state debug register.
//!
//! The state machine runs in hardware; this side only decodes what it reports.
//!
//! ```text
//!  OFF ──► PROCESS ──► ON ──► FORCED
//!   ▲                          │
//!   └──────────────────────────┘
//! ```

use serde::Serialize;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display, strum::FromRepr)]
#[repr(u32)]
pub enum FanState {
    #[strum(serialize = "FAN_OFF")]
    #[serde(rename = "FAN_OFF")]
    Off = 0,

    #[strum(serialize = "FAN_PROCESS")]
    #[serde(rename = "FAN_PROCESS")]
    Process = 1,

    #[strum(serialize = "FAN_ON")]
    #[serde(rename = "FAN_ON")]
    On = 2,

    #[strum(serialize = "FAN_FORCED")]
    #[serde(rename = "FAN_FORCED")]
    Forced = 3,
}

impl TryFrom<u32> for FanState {
    type Error = Error;

    fn try_from(raw: u32) -> Result<Self> {
        Self::from_repr(raw).ok_or(Error::InvalidFanState(raw))
    }
}
