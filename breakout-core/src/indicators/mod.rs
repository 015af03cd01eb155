//! Moving-average and range indicators.
//!
//! Indicators are pure functions: bar history in, numeric column out. Every
//! column has the same length as the input and holds `f64::NAN` where the
//! value is undefined (warmup). No value at bar t depends on bar t+1 or later;
//! `tests/lookahead_test.rs` checks this for every indicator.

pub mod adr;
pub mod ema;
pub mod sma;

pub use adr::{adr_pct, AdrPct};
pub use ema::{ema_of_series, Ema};
pub use sma::{sma_of_series, Sma};

use crate::domain::Bar;
use serde::{Deserialize, Serialize};

/// Trait for indicators computed over a full bar series.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "ema_10", "adr_pct_20").
    fn name(&self) -> &str;

    /// Number of leading bars whose value is undefined.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    ///
    /// Returns a `Vec<f64>` of the same length as `bars`.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// Which bar field a single-series indicator reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceField {
    Close,
    Volume,
}

impl PriceField {
    pub fn extract(self, bars: &[Bar]) -> Vec<f64> {
        match self {
            PriceField::Close => bars.iter().map(|b| b.close).collect(),
            PriceField::Volume => bars.iter().map(|b| b.volume as f64).collect(),
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            PriceField::Close => "",
            PriceField::Volume => "_volume",
        }
    }
}

/// Create synthetic bars from close prices for testing.
///
/// open = prev_close (or close for first bar), high = max(open,close) + 1.0,
/// low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
