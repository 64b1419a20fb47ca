//! Command-line tool for the PWM fan controller.
//!
//! With no arguments it prints the controller's status once. Parameter
//! flags write the corresponding registers and exit silently unless `--read`
//! asks for the status as well.

use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use fanctrl::app::{self, Invocation};
use fanctrl::cli::Cli;
use fanctrl::hw::RegisterFile;
use fanctrl::monitor::{JsonSink, ReportSink, TerminalSink};
use fanctrl::tracing::prelude::*;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    fanctrl::tracing::init_cli(cli.debug);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let map = cli.map_config()?;
    let mut registers = RegisterFile::open(&map).with_context(|| {
        format!(
            "failed to map fan controller registers at {}",
            map.base_address
        )
    })?;

    let invocation = cli.invocation();
    let stdout = io::stdout().lock();

    if cli.json {
        drive(&mut registers, &invocation, JsonSink::new(stdout)).await
    } else {
        let rewind = rustix::termios::isatty(&stdout);
        drive(
            &mut registers,
            &invocation,
            TerminalSink::new(stdout, rewind),
        )
        .await
    }
}

/// Run the invocation until it finishes or the operator interrupts watch
/// mode. Either way `registers` is unmapped by the caller's drop.
async fn drive(
    registers: &mut RegisterFile,
    invocation: &Invocation,
    mut sink: impl ReportSink,
) -> Result<()> {
    tokio::select! {
        result = app::run(registers, invocation, &mut sink) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            debug!("Interrupted");
        }
    }
    Ok(())
}
