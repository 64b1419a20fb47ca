//! Logging setup.
//!
//! Modules pull the macros in with `use crate::tracing::prelude::*`. Logs
//! always go to stderr (or the journal); stdout carries the status report.

use std::env;

use time::macros::format_description;
use tracing_subscriber::{
    EnvFilter, filter::LevelFilter, fmt::time::LocalTime, layer::SubscriberExt,
    util::SubscriberInitExt,
};

pub mod prelude {
    pub use ::tracing::{debug, error, info, trace, warn};
}

/// Install the global subscriber for the command-line tool.
///
/// `RUST_LOG` takes precedence over the default level. When started by
/// systemd (e.g. a oneshot unit applying thresholds at boot) output goes to
/// the journal instead of stderr.
pub fn init_cli(debug: bool) {
    let default_level = if debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let journald = if env::var_os("JOURNAL_STREAM").is_some() {
        tracing_journald::layer().ok()
    } else {
        None
    };

    let fmt = match journald {
        Some(_) => None,
        None => Some(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_timer(LocalTime::new(format_description!(
                    "[hour]:[minute]:[second].[subsecond digits:3]"
                ))),
        ),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(journald)
        .with(fmt)
        .init();
}
