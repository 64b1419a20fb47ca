//! One invocation of the tool: apply settings, then maybe report.

use crate::config::MonitorConfig;
use crate::controller::{self, Controller, ReportLevel, Settings};
use crate::error::Result;
use crate::hw::RegisterBus;
use crate::monitor::{Monitor, ReportSink};
use crate::tracing::prelude::*;

/// Everything an invocation asks for, independent of where it came from.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    pub settings: Settings,
    pub report: ReportLevel,
    pub monitor: MonitorConfig,
}

/// Apply the invocation's settings and, unless suppressed, run the monitor.
///
/// Returns the number of registers written. In watch mode this only returns
/// on error; the caller stops it by dropping the future.
pub async fn run(
    bus: &mut impl RegisterBus,
    invocation: &Invocation,
    sink: &mut impl ReportSink,
) -> Result<usize> {
    let controller = Controller::new(&*bus);
    let changed = controller.apply(bus, &invocation.settings)?;

    if !controller::should_report(changed, invocation.report) {
        debug!(changed, "Settings changed, skipping status report");
        return Ok(changed);
    }

    Monitor::new(invocation.monitor.clone(), controller.max_pwm())
        .run(&*bus, sink)
        .await?;
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use tokio::time;

    use crate::codec::{DutyPercent, Temperature};
    use crate::controller::FanMode;
    use crate::hw::Register;
    use crate::hw::memory::MemoryRegisters;
    use crate::monitor::TerminalSink;

    fn hardware() -> MemoryRegisters {
        MemoryRegisters::new()
            .with(Register::Temp, 4512)
            .with(Register::LowTemp, 3000)
            .with(Register::MaxTemp, 6000)
            .with(Register::Smooth, 4)
            .with(Register::DbgPwm, 3 * 256)
            .with(Register::DbgMaxPwm, 2560)
    }

    fn output(sink: TerminalSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[tokio::test]
    async fn no_arguments_reports_once() {
        let mut bus = hardware();
        let mut sink = TerminalSink::new(Vec::new(), true);

        let changed = run(&mut bus, &Invocation::default(), &mut sink)
            .await
            .unwrap();

        let out = output(sink);
        assert_eq!(changed, 0);
        assert!(bus.writes().is_empty());
        assert_eq!(out.lines().count(), 6);
        assert!(out.contains("45.12 C"));
        assert!(out.contains("30.00 %"));
    }

    #[tokio::test]
    async fn thresholds_without_read_are_silent() {
        let mut bus = hardware();
        let mut sink = TerminalSink::new(Vec::new(), true);
        let invocation = Invocation {
            settings: Settings {
                low_temp: Some(Temperature::from_celsius(40.0).unwrap()),
                max_temp: Some(Temperature::from_celsius(70.0).unwrap()),
                ..Default::default()
            },
            ..Default::default()
        };

        let changed = run(&mut bus, &invocation, &mut sink).await.unwrap();

        assert_eq!(changed, 2);
        assert_eq!(
            bus.writes(),
            &[(Register::MaxTemp, 7000), (Register::LowTemp, 4000)]
        );
        assert!(output(sink).is_empty());
    }

    #[tokio::test]
    async fn explicit_read_reports_after_change() {
        let mut bus = hardware();
        let mut sink = TerminalSink::new(Vec::new(), true);
        let invocation = Invocation {
            settings: Settings {
                smooth: Some(12),
                ..Default::default()
            },
            report: ReportLevel::Always,
            ..Default::default()
        };

        let changed = run(&mut bus, &invocation, &mut sink).await.unwrap();

        assert_eq!(changed, 1);
        let out = output(sink);
        assert!(out.contains("Smooth Divisor:      12"));
    }

    #[tokio::test]
    async fn fixed_duty_uses_hardware_max_pwm() {
        let mut bus = hardware();
        let mut sink = TerminalSink::new(Vec::new(), true);
        let invocation = Invocation {
            settings: Settings {
                mode: FanMode::select(false, Some(DutyPercent::new(50.0).unwrap())),
                ..Default::default()
            },
            ..Default::default()
        };

        run(&mut bus, &invocation, &mut sink).await.unwrap();

        assert_eq!(bus.writes(), &[(Register::Fixed, 0x1005)]);
        assert!(output(sink).is_empty());
    }

    #[tokio::test]
    async fn auto_overrides_fixed_duty() {
        let mut bus = hardware().with(Register::Fixed, 0x1005);
        let mut sink = TerminalSink::new(Vec::new(), true);
        let invocation = Invocation {
            settings: Settings {
                mode: FanMode::select(true, Some(DutyPercent::new(80.0).unwrap())),
                ..Default::default()
            },
            ..Default::default()
        };

        run(&mut bus, &invocation, &mut sink).await.unwrap();

        assert_eq!(bus.writes(), &[(Register::Fixed, 0)]);
    }

    #[tokio::test(start_paused = true)]
    async fn watch_redraws_in_place() {
        let mut bus = hardware();
        let mut sink = TerminalSink::new(Vec::new(), true);
        let invocation = Invocation {
            monitor: MonitorConfig {
                interval: Duration::from_millis(500),
                watch: true,
                verbose: false,
            },
            ..Default::default()
        };

        let result = time::timeout(
            Duration::from_millis(1250),
            run(&mut bus, &invocation, &mut sink),
        )
        .await;

        assert!(result.is_err());
        let out = output(sink);
        assert_eq!(out.matches("Fan Duty Cycle:").count(), 3);
        assert_eq!(out.matches("\r\x1b[6A").count(), 2);
    }
}
