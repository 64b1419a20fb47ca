//! Conversions between the controller's register encodings and human units.
//!
//! The hardware uses three encodings:
//!
//! - temperatures in hundredths of a degree Celsius,
//! - Q8 fixed point (`raw / 256`) for PWM values and the debug registers,
//! - a 13-bit duty-cycle command word for the fixed/auto mode register.

use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};

/// Fractional bits of the controller's fixed-point registers.
const Q8_SHIFT: u32 = 8;

/// Set in a duty-cycle command to override the automatic curve.
pub const FIXED_MODE_FLAG: u32 = 0x1000;

/// Mask applied to the duty magnitude before the flag is combined.
pub const DUTY_MASK: u32 = 0x0FFF;

/// Decode a Q8 fixed-point register.
pub fn reg_to_float(raw: u32) -> f64 {
    f64::from(raw) / f64::from(1u32 << Q8_SHIFT)
}

/// Temperature in hundredths of a degree Celsius, as the registers hold it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(into = "f64")]
pub struct Temperature(u32);

impl Temperature {
    /// Encode a threshold given in degrees Celsius.
    ///
    /// Rejects negative and non-finite values, and values the 32-bit
    /// register cannot hold.
    pub fn from_celsius(celsius: f64) -> Result<Self> {
        if !celsius.is_finite() || celsius < 0.0 {
            return Err(Error::InvalidTemperature(celsius));
        }
        let hundredths = (celsius * 100.0).round();
        if hundredths > f64::from(u32::MAX) {
            return Err(Error::InvalidTemperature(celsius));
        }
        Ok(Self(hundredths as u32))
    }

    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn celsius(self) -> f64 {
        f64::from(self.0) / 100.0
    }
}

impl From<Temperature> for f64 {
    fn from(temperature: Temperature) -> f64 {
        temperature.celsius()
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} C", self.celsius())
    }
}

/// A duty cycle in percent, validated to lie in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct DutyPercent(f64);

impl DutyPercent {
    pub fn new(percent: f64) -> Result<Self> {
        if !(0.0..=100.0).contains(&percent) {
            return Err(Error::InvalidPercent(percent));
        }
        Ok(Self(percent))
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl fmt::Display for DutyPercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} %", self.0)
    }
}

/// Value for the duty-cycle register.
///
/// Bit 12 selects fixed mode, bits 0-11 hold the duty magnitude in the
/// controller's PWM units. A zero word hands control back to the hardware
/// curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DutyCycleCommand(u32);

impl DutyCycleCommand {
    /// Automatic mode.
    pub const AUTO: Self = Self(0);

    /// Fixed duty cycle of `percent` of `max_pwm`.
    ///
    /// `max_pwm` is the decoded maximum-PWM debug register. The magnitude is
    /// truncated, then masked to 12 bits.
    pub fn fixed(percent: DutyPercent, max_pwm: f64) -> Self {
        let duty = (max_pwm * (percent.get() / 100.0)).floor() as u32 & DUTY_MASK;
        Self(FIXED_MODE_FLAG | duty)
    }

    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn is_fixed(self) -> bool {
        self.0 & FIXED_MODE_FLAG != 0
    }

    pub fn magnitude(self) -> u32 {
        self.0 & DUTY_MASK
    }

    /// Percentage of `max_pwm` a fixed command drives; `None` in auto mode
    /// or when `max_pwm` is zero.
    pub fn percent(self, max_pwm: f64) -> Option<f64> {
        if !self.is_fixed() || max_pwm <= 0.0 {
            return None;
        }
        Some(100.0 * f64::from(self.magnitude()) / max_pwm)
    }
}

/// Share of the maximum PWM currently driven, in percent.
///
/// `None` when the hardware reports a maximum of zero.
pub fn pwm_percent(pwm: f64, max_pwm: f64) -> Option<f64> {
    (max_pwm > 0.0).then(|| 100.0 * pwm / max_pwm)
}

/// Decode a debug temperature register (Q8-scaled hundredths of a degree).
pub fn debug_celsius(raw: u32) -> f64 {
    reg_to_float(raw) / 100.0
}
