//! Status reporting, once or continuously.

mod report;
mod sink;

pub use report::{DebugReport, StateReading, StatusReport};
pub use sink::{JsonSink, ReportSink, TerminalSink};

use crate::config::MonitorConfig;
use crate::error::Result;
use crate::hw::RegisterBus;
use crate::tracing::prelude::*;

/// Reads the controller and renders status reports to a sink.
#[derive(Debug, Clone)]
pub struct Monitor {
    config: MonitorConfig,
    max_pwm: f64,
}

impl Monitor {
    /// `max_pwm` is the maximum PWM captured when the run started.
    pub fn new(config: MonitorConfig, max_pwm: f64) -> Self {
        Self { config, max_pwm }
    }

    /// Read one report from the registers.
    pub fn read(&self, bus: &impl RegisterBus) -> StatusReport {
        StatusReport::read(bus, self.max_pwm, self.config.verbose)
    }

    /// Render the status report.
    ///
    /// Without watch mode this renders once and returns. In watch mode it
    /// loops until the future is dropped: each later report waits for the
    /// configured interval, then overwrites the previous one.
    pub async fn run(&self, bus: &impl RegisterBus, sink: &mut impl ReportSink) -> Result<()> {
        let mut previous: Option<StatusReport> = None;
        let mut lines = 0;

        loop {
            if previous.is_some() {
                tokio::time::sleep(self.config.interval).await;
                sink.rewind(lines)?;
            }

            let report = self.read(bus);
            log_state_change(previous.as_ref(), &report);
            lines = sink.emit(&report)?;
            trace!(lines, "Rendered status report");

            if !self.config.watch {
                return Ok(());
            }
            previous = Some(report);
        }
    }
}

/// Warn when the state register starts or stops holding garbage, rather
/// than on every poll.
fn log_state_change(previous: Option<&StatusReport>, current: &StatusReport) {
    let state = |r: &StatusReport| r.debug.as_ref().map(|d| d.state);
    let current_state = state(current);
    if previous.and_then(state) == current_state {
        return;
    }
    if let Some(StateReading::Invalid(raw)) = current_state {
        warn!(raw, "Fan state register out of range");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::time::Duration;

    use tokio::time::{self, Instant};

    use crate::hw::Register;
    use crate::hw::memory::MemoryRegisters;

    #[derive(Debug, PartialEq)]
    enum Event {
        Emit { at_ms: u128, lines: usize },
        Rewind { at_ms: u128, lines: usize },
    }

    /// Records what the monitor asks of its sink, with timestamps.
    struct RecordingSink {
        start: Instant,
        events: Vec<Event>,
    }

    impl RecordingSink {
        fn new() -> Self {
            Self {
                start: Instant::now(),
                events: Vec::new(),
            }
        }

        fn elapsed_ms(&self) -> u128 {
            self.start.elapsed().as_millis()
        }
    }

    impl ReportSink for RecordingSink {
        fn emit(&mut self, report: &StatusReport) -> io::Result<usize> {
            let lines = report.lines().len();
            let at_ms = self.elapsed_ms();
            self.events.push(Event::Emit { at_ms, lines });
            Ok(lines)
        }

        fn rewind(&mut self, lines: usize) -> io::Result<()> {
            let at_ms = self.elapsed_ms();
            self.events.push(Event::Rewind { at_ms, lines });
            Ok(())
        }
    }

    fn bus() -> MemoryRegisters {
        MemoryRegisters::new()
            .with(Register::Temp, 4000)
            .with(Register::DbgPwm, 256)
            .with(Register::DbgMaxPwm, 2560)
    }

    #[tokio::test(start_paused = true)]
    async fn single_report_without_watch() {
        let bus = bus();
        let monitor = Monitor::new(MonitorConfig::default(), 10.0);
        let mut sink = RecordingSink::new();

        monitor.run(&bus, &mut sink).await.unwrap();

        assert_eq!(sink.events, vec![Event::Emit { at_ms: 0, lines: 6 }]);
    }

    #[tokio::test(start_paused = true)]
    async fn watch_paces_and_overwrites_previous_block() {
        let bus = bus();
        let config = MonitorConfig {
            interval: Duration::from_millis(500),
            watch: true,
            verbose: false,
        };
        let monitor = Monitor::new(config, 10.0);
        let mut sink = RecordingSink::new();

        let result =
            time::timeout(Duration::from_millis(1250), monitor.run(&bus, &mut sink)).await;
        assert!(result.is_err(), "watch mode must not terminate on its own");

        assert_eq!(
            sink.events,
            vec![
                Event::Emit { at_ms: 0, lines: 6 },
                Event::Rewind { at_ms: 500, lines: 6 },
                Event::Emit { at_ms: 500, lines: 6 },
                Event::Rewind { at_ms: 1000, lines: 6 },
                Event::Emit { at_ms: 1000, lines: 6 },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn verbose_watch_rewinds_full_debug_block() {
        let bus = bus();
        let config = MonitorConfig {
            interval: Duration::from_millis(100),
            watch: true,
            verbose: true,
        };
        let monitor = Monitor::new(config, 10.0);
        let mut sink = RecordingSink::new();

        let _ = time::timeout(Duration::from_millis(150), monitor.run(&bus, &mut sink)).await;

        assert_eq!(
            sink.events,
            vec![
                Event::Emit { at_ms: 0, lines: 18 },
                Event::Rewind { at_ms: 100, lines: 18 },
                Event::Emit { at_ms: 100, lines: 18 },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn every_poll_reads_the_registers_again() {
        let bus = bus();
        let config = MonitorConfig {
            interval: Duration::from_millis(10),
            watch: true,
            verbose: true,
        };
        let monitor = Monitor::new(config, 10.0);
        let mut sink = RecordingSink::new();

        let _ = time::timeout(Duration::from_millis(25), monitor.run(&bus, &mut sink)).await;

        let state_reads = bus
            .reads()
            .into_iter()
            .filter(|r| *r == Register::DbgState)
            .count();
        assert_eq!(state_reads, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_state_does_not_stop_the_loop() {
        let bus = bus().with(Register::DbgState, 42);
        let config = MonitorConfig {
            interval: Duration::from_millis(10),
            watch: true,
            verbose: true,
        };
        let monitor = Monitor::new(config, 10.0);
        let mut sink = TerminalSink::new(Vec::new(), true);

        let _ = time::timeout(Duration::from_millis(15), monitor.run(&bus, &mut sink)).await;

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out.matches("INVALID(42)").count(), 2);
        assert_eq!(out.matches("\r\x1b[18A").count(), 1);
    }
}
