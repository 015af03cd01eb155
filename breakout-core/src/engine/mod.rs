//! Breakout engine: indicator frame plus the signal state machine.
//!
//! A series flows through two stages:
//!
//! 1. [`IndicatorFrame::compute`]: moving averages, ADR%, volume and trend columns
//! 2. [`SignalEngine`]: one causal pass producing a [`SignalRow`] per bar and
//!    the final [`Verdict`] for the last bar

pub mod frame;
pub mod signal;

pub use frame::{IndicatorConfig, IndicatorFrame};
pub use signal::{BasicSignalRule, SignalConfig, SignalEngine, SignalRow, SignalSeries, Verdict};

use thiserror::Error;

/// Errors raised while configuring or running the engine on one series.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("{name} must be >= 1 (got {value})")]
    InvalidPeriod { name: &'static str, value: usize },

    #[error("{name} must be a finite number (got {value})")]
    InvalidThreshold { name: &'static str, value: f64 },
}
