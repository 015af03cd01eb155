//! Bar: the fundamental market data unit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// OHLCV bar for a single symbol on a single session (daily) or week (weekly).
///
/// Weekly bars are dated by the first session of the week, which is how the
/// history providers report them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    /// Returns true if any OHLC field is NaN or infinite.
    pub fn is_void(&self) -> bool {
        !(self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite())
    }

    /// A bar the engine can divide by: finite OHLC and a positive close.
    ///
    /// High/low ordering is deliberately not enforced; providers occasionally
    /// report a high below the close on adjusted data and the range ratio is
    /// still meaningful.
    pub fn is_usable(&self) -> bool {
        !self.is_void() && self.close > 0.0
    }

    /// Daily range ratio `(high - low) / close`.
    pub fn range_ratio(&self) -> f64 {
        (self.high - self.low) / self.close
    }
}
