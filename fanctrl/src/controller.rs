//! Applies operator settings to the fan controller.

use crate::codec::{self, DutyCycleCommand, DutyPercent, Temperature};
use crate::error::Result;
use crate::hw::{Register, RegisterBus};
use crate::tracing::prelude::*;

/// Requested duty-cycle mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FanMode {
    /// Hand the duty cycle back to the hardware curve.
    Auto,
    /// Drive the fan at a fixed share of the maximum PWM.
    Fixed(DutyPercent),
}

impl FanMode {
    /// Resolve the mode flags. Auto wins over a fixed percentage.
    pub fn select(auto: bool, fixed: Option<DutyPercent>) -> Option<Self> {
        if auto {
            Some(FanMode::Auto)
        } else {
            fixed.map(FanMode::Fixed)
        }
    }
}

/// Changes to apply; `None` leaves the register alone.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub low_temp: Option<Temperature>,
    pub max_temp: Option<Temperature>,
    pub smooth: Option<u32>,
    pub mode: Option<FanMode>,
}

/// How insistently the status report was asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum ReportLevel {
    /// Show status unless settings were changed.
    #[default]
    Default,
    /// Show status even after changing settings.
    Always,
}

/// Whether the status report should follow `changed` register writes.
///
/// A bare configuration change stays silent; an explicit read request (or an
/// invocation that changed nothing) still reports.
pub fn should_report(changed: usize, level: ReportLevel) -> bool {
    !(changed > 0 && level <= ReportLevel::Default)
}

/// Writes settings to the controller's registers.
#[derive(Debug, Clone)]
pub struct Controller {
    max_pwm: f64,
}

impl Controller {
    /// Capture the hardware's maximum PWM; fixed duty cycles are scaled to it.
    pub fn new(bus: &impl RegisterBus) -> Self {
        let max_pwm = codec::reg_to_float(bus.read(Register::DbgMaxPwm));
        debug!(max_pwm, "Read maximum PWM");
        Self { max_pwm }
    }

    pub fn max_pwm(&self) -> f64 {
        self.max_pwm
    }

    /// Apply `settings`, returning the number of registers written.
    ///
    /// Registers are written in a fixed order: max temperature, low
    /// temperature, smoothing divisor, duty-cycle mode.
    pub fn apply(&self, bus: &mut impl RegisterBus, settings: &Settings) -> Result<usize> {
        let mut changed = 0;

        if let Some(max_temp) = settings.max_temp {
            write(bus, Register::MaxTemp, max_temp.raw())?;
            info!(max_temp = %max_temp, "Set max temperature");
            changed += 1;
        }

        if let Some(low_temp) = settings.low_temp {
            write(bus, Register::LowTemp, low_temp.raw())?;
            info!(low_temp = %low_temp, "Set low temperature");
            changed += 1;
        }

        if let Some(smooth) = settings.smooth {
            write(bus, Register::Smooth, smooth)?;
            info!(smooth, "Set smoothing divisor");
            changed += 1;
        }

        match settings.mode {
            Some(FanMode::Auto) => {
                write(bus, Register::Fixed, DutyCycleCommand::AUTO.raw())?;
                info!("Set automatic duty cycle");
                changed += 1;
            }
            Some(FanMode::Fixed(percent)) => {
                let command = DutyCycleCommand::fixed(percent, self.max_pwm);
                write(bus, Register::Fixed, command.raw())?;
                info!(
                    requested = %percent,
                    magnitude = command.magnitude(),
                    max_pwm = self.max_pwm,
                    "Set fixed duty cycle"
                );
                changed += 1;
            }
            None => {}
        }

        debug!(changed, "Settings applied");
        Ok(changed)
    }
}

fn write(bus: &mut impl RegisterBus, register: Register, value: u32) -> Result<()> {
    debug!(
        register = %register,
        address = format_args!("{:#x}", bus.address_of(register)),
        value = format_args!("{value:#x}"),
        "Register write"
    );
    bus.write(register, value)
}
