//! Point-in-time snapshot of the controller's registers.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::codec::{self, Temperature};
use crate::fan_state::FanState;
use crate::hw::{Register, RegisterBus};

const LABEL_WIDTH: usize = 21;
const VALUE_WIDTH: usize = 13;

/// Decoded state register: either a known state or the raw value that
/// failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateReading {
    Valid(FanState),
    Invalid(u32),
}

impl StateReading {
    pub fn decode(raw: u32) -> Self {
        match FanState::try_from(raw) {
            Ok(state) => StateReading::Valid(state),
            Err(_) => StateReading::Invalid(raw),
        }
    }
}

impl fmt::Display for StateReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateReading::Valid(state) => write!(f, "{state}"),
            StateReading::Invalid(raw) => write!(f, "INVALID({raw})"),
        }
    }
}

impl Serialize for StateReading {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The debug and telemetry registers, decoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebugReport {
    pub state: StateReading,
    pub alarm: u32,
    pub pwm: f64,
    pub use_pwm: f64,
    pub last_pwm: f64,
    pub real_temp: f64,
    pub use_temp: f64,
    pub last_temp: f64,
    pub temp_error: f64,
    pub linear: f64,
    pub max_pwm: f64,
}

impl DebugReport {
    pub fn read(bus: &impl RegisterBus) -> Self {
        Self {
            state: StateReading::decode(bus.read(Register::DbgState)),
            alarm: bus.read(Register::Alarm),
            pwm: codec::reg_to_float(bus.read(Register::DbgPwm)),
            use_pwm: codec::reg_to_float(bus.read(Register::DbgUsePwm)),
            last_pwm: codec::reg_to_float(bus.read(Register::DbgLastPwm)),
            real_temp: codec::debug_celsius(bus.read(Register::DbgRealTemp)),
            use_temp: codec::debug_celsius(bus.read(Register::DbgUseTemp)),
            last_temp: codec::debug_celsius(bus.read(Register::DbgLastTemp)),
            temp_error: codec::debug_celsius(bus.read(Register::DbgTempError)),
            linear: codec::reg_to_float(bus.read(Register::DbgLinear)),
            max_pwm: codec::reg_to_float(bus.read(Register::DbgMaxPwm)),
        }
    }
}

/// Everything one status block shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    pub temperature: Temperature,
    /// Current PWM as a share of the maximum; `None` if the maximum is zero.
    pub duty_percent: Option<f64>,
    pub low_temp: Temperature,
    pub max_temp: Temperature,
    pub smooth: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<DebugReport>,
}

impl StatusReport {
    /// Read a fresh snapshot. `max_pwm` is the maximum PWM captured at
    /// startup; the duty cycle is reported relative to it.
    pub fn read(bus: &impl RegisterBus, max_pwm: f64, verbose: bool) -> Self {
        let temperature = Temperature::from_raw(bus.read(Register::Temp));
        let pwm = codec::reg_to_float(bus.read(Register::DbgPwm));
        Self {
            temperature,
            duty_percent: codec::pwm_percent(pwm, max_pwm),
            low_temp: Temperature::from_raw(bus.read(Register::LowTemp)),
            max_temp: Temperature::from_raw(bus.read(Register::MaxTemp)),
            smooth: bus.read(Register::Smooth),
            debug: verbose.then(|| DebugReport::read(bus)),
        }
    }

    /// Render as fixed-width text lines.
    ///
    /// Values are padded so a shorter reading fully covers a longer one when
    /// the block is redrawn in place.
    pub fn lines(&self) -> Vec<String> {
        let duty = match self.duty_percent {
            Some(percent) => format!("{percent:.2} %"),
            None => "n/a".to_string(),
        };

        let mut lines = vec![
            line("Temperature:", self.temperature),
            line("Fan Duty Cycle:", duty),
            blank(),
            line("Low Temperature:", self.low_temp),
            line("Max Temperature:", self.max_temp),
            line("Smooth Divisor:", self.smooth),
        ];

        if let Some(debug) = &self.debug {
            lines.extend([
                blank(),
                line("(Debug) State:", debug.state),
                line("(Debug) Alarm:", debug.alarm),
                line("(Debug) PWM:", format!("{:.2}", debug.pwm)),
                line("(Debug) Use PWM:", format!("{:.2}", debug.use_pwm)),
                line("(Debug) Last PWM:", format!("{:.2}", debug.last_pwm)),
                line("(Debug) Real Temp:", format!("{:.2} C", debug.real_temp)),
                line("(Debug) Use Temp:", format!("{:.2} C", debug.use_temp)),
                line("(Debug) Last Temp:", format!("{:.2} C", debug.last_temp)),
                line("(Debug) Temp Error:", format!("{:.2}", debug.temp_error)),
                line("(Debug) Linear:", format!("{:.2}", debug.linear)),
                line("(Debug) Max PWM:", format!("{:.2}", debug.max_pwm)),
            ]);
        }

        lines
    }
}

fn line(label: &str, value: impl fmt::Display) -> String {
    format!(
        "{label:<lw$}{value:<vw$}",
        value = value.to_string(),
        lw = LABEL_WIDTH,
        vw = VALUE_WIDTH
    )
}

fn blank() -> String {
    " ".repeat(LABEL_WIDTH + VALUE_WIDTH)
}
