//! Host-side control for a memory-mapped PWM fan controller.
//!
//! The fan controller itself runs in programmable logic: it owns the
//! temperature curve, smoothing filter and thermal protection. This crate is
//! the thin layer in front of it. It maps the controller's sixteen-word
//! register block, writes operating parameters, and renders the live state.
//!
//! ```text
//! Cli ──► Controller ──writes──► RegisterBus ◄──reads── Monitor ──► ReportSink
//!              │                  (RegisterFile)            ▲
//!              └──── suppress display? ─────────────────────┘
//! ```

pub mod app;
pub mod cli;
pub mod codec;
pub mod config;
pub mod controller;
pub mod error;
pub mod fan_state;
pub mod hw;
pub mod monitor;
pub mod tracing;

pub use error::{Error, Result};
