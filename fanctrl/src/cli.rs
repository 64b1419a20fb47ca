//! Command-line surface of the `fanctrl` binary.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::app::Invocation;
use crate::codec::{DutyPercent, Temperature};
use crate::config::{BaseAddress, DEFAULT_DEVICE, MapConfig, MonitorConfig};
use crate::controller::{FanMode, ReportLevel, Settings};
use crate::error::Result;

const READ: &str = "Read Fan State (default)";
const SET: &str = "Set Fan Parameters";
const MISC: &str = "Miscellaneous";

#[derive(Debug, Parser)]
#[command(
    name = "fanctrl",
    version,
    about = "Control and monitor the PWM fan controller",
    allow_negative_numbers = true,
    after_help = "WARNING: misconfiguration can lead to an emergency shutdown or hardware damage!"
)]
pub struct Cli {
    /// Read state, even after changing parameters
    #[arg(short, long, help_heading = READ)]
    pub read: bool,

    /// Continuous read
    #[arg(short, long, help_heading = READ)]
    pub watch: bool,

    /// Update interval in milliseconds
    #[arg(short = 'u', long = "update", value_name = "MS", default_value_t = 1000, help_heading = READ)]
    pub update_ms: u64,

    /// Set low temperature
    #[arg(short, long, value_name = "CELSIUS", value_parser = parse_celsius, help_heading = SET)]
    pub low_temp: Option<Temperature>,

    /// Set max temperature
    #[arg(short, long, value_name = "CELSIUS", value_parser = parse_celsius, help_heading = SET)]
    pub max_temp: Option<Temperature>,

    /// Set smoothing divisor
    #[arg(short, long, value_name = "SMOOTH", help_heading = SET)]
    pub smooth: Option<u32>,

    /// Automatic PWM control
    #[arg(short, long, help_heading = SET)]
    pub auto: bool,

    /// Fixed PWM duty cycle in percent
    #[arg(short, long, value_name = "DUTY_CYCLE", value_parser = parse_percent, help_heading = SET)]
    pub fixed: Option<DutyPercent>,

    /// Much more information
    #[arg(short, long, help_heading = MISC)]
    pub debug: bool,

    /// Print reports as JSON lines
    #[arg(long, help_heading = MISC)]
    pub json: bool,

    /// Physical base address of the register block
    #[arg(long, env = "FANCTRL_BASE_ADDRESS", value_name = "ADDR", help_heading = MISC)]
    pub base_address: Option<BaseAddress>,

    /// Physical memory device
    #[arg(long, value_name = "PATH", default_value = DEFAULT_DEVICE, help_heading = MISC)]
    pub device: PathBuf,
}

impl Cli {
    pub fn invocation(&self) -> Invocation {
        Invocation {
            settings: Settings {
                low_temp: self.low_temp,
                max_temp: self.max_temp,
                smooth: self.smooth,
                mode: FanMode::select(self.auto, self.fixed),
            },
            report: if self.read {
                ReportLevel::Always
            } else {
                ReportLevel::Default
            },
            monitor: MonitorConfig {
                interval: Duration::from_millis(self.update_ms),
                watch: self.watch,
                verbose: self.debug,
            },
        }
    }

    pub fn map_config(&self) -> Result<MapConfig> {
        Ok(MapConfig {
            device: self.device.clone(),
            base_address: BaseAddress::resolve(self.base_address)?,
        })
    }
}

fn parse_celsius(s: &str) -> std::result::Result<Temperature, String> {
    let celsius: f64 = s.trim().parse().map_err(|_| format!("not a number: {s}"))?;
    Temperature::from_celsius(celsius).map_err(|e| e.to_string())
}

fn parse_percent(s: &str) -> std::result::Result<DutyPercent, String> {
    let percent: f64 = s.trim().parse().map_err(|_| format!("not a number: {s}"))?;
    DutyPercent::new(percent).map_err(|e| e.to_string())
}
