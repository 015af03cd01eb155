//! Breakout signal state machine.
//!
//! Per bar t, reading the indicator frame:
//!
//! ```text
//! basic[t]       = adr_long*mult > dist_fast  (rule-dependent, see BasicSignalRule)
//!                  && ema_fast > ema_slow
//! consecutive[t] = basic[t] && basic[t-1] && basic[t-2]
//! bearish[t]     = ema_fast < ema_slow
//! ref_price[t]   = close[t] if bearish[t] else ref_price[t-1]
//! perf[t]        = (close / ref_price - 1) * 100   only when basic[t]
//! confirmed[t]   = consecutive[t] && perf[t] > min_perf
//! green[t]       = confirmed[t] && adr_long > adr_short && low_volume
//!                  && ema_fast_rising && ema_slow_rising
//! ```
//!
//! The pass is causal and keeps only the last two `basic` values and the
//! current reference price. The one exception is the reference price before
//! the first bearish bar: it is undefined if a bearish bar exists anywhere in
//! the series, and close[0] for the whole series if none does. A pre-scan of
//! the bearish condition settles this before the pass starts.

use super::frame::IndicatorFrame;
use super::EngineError;
use serde::{Deserialize, Serialize};

/// How the ADR% bound on the distance from the fast EMA is applied.
///
/// The daily and weekly setups were written with different conditions and
/// they are kept apart rather than merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BasicSignalRule {
    /// `adr_long * mult > dist_fast`. Daily setup.
    AdrMultiple,
    /// `adr_long > dist_fast && adr_long * mult > dist_fast`. Weekly setup.
    AdrBounded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    pub rule: BasicSignalRule,
    pub adr_multiplier: f64,
    /// Minimum gain over the reference price, in percent, to confirm.
    pub min_perf_since_ref_pct: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            rule: BasicSignalRule::AdrMultiple,
            adr_multiplier: 1.5,
            min_perf_since_ref_pct: 30.0,
        }
    }
}

impl SignalConfig {
    pub fn with_rule(rule: BasicSignalRule) -> Self {
        Self {
            rule,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.adr_multiplier.is_finite() {
            return Err(EngineError::InvalidThreshold {
                name: "adr_multiplier",
                value: self.adr_multiplier,
            });
        }
        if !self.min_perf_since_ref_pct.is_finite() {
            return Err(EngineError::InvalidThreshold {
                name: "min_perf_since_ref_pct",
                value: self.min_perf_since_ref_pct,
            });
        }
        Ok(())
    }
}

/// Signal columns for one bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalRow {
    pub basic: bool,
    /// `basic` held on this bar and the two before it.
    pub consecutive: bool,
    pub bearish: bool,
    pub ref_price: Option<f64>,
    pub perf_since_ref: Option<f64>,
    pub confirmed: bool,
    pub green: bool,
}

/// Final determination for the last bar of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Verdict {
    pub candidate: bool,
    /// Green on the last bar but not on the one before (or there is no bar before).
    pub is_new: bool,
}

impl Verdict {
    fn from_last_two(last: bool, previous: Option<bool>) -> Self {
        Self {
            candidate: last,
            is_new: last && !previous.unwrap_or(false),
        }
    }
}

/// Materialized signal rows, one per bar.
#[derive(Debug, Clone, Default)]
pub struct SignalSeries {
    rows: Vec<SignalRow>,
}

impl SignalSeries {
    pub fn rows(&self) -> &[SignalRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn last(&self) -> Option<&SignalRow> {
        self.rows.last()
    }

    pub fn verdict(&self) -> Verdict {
        match self.rows.as_slice() {
            [] => Verdict::default(),
            [.., previous, last] => Verdict::from_last_two(last.green, Some(previous.green)),
            [last] => Verdict::from_last_two(last.green, None),
        }
    }
}

/// Runs the signal state machine over indicator frames.
#[derive(Debug, Clone)]
pub struct SignalEngine {
    config: SignalConfig,
}

impl SignalEngine {
    pub fn new(config: SignalConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    /// Lazily yields one [`SignalRow`] per bar of the frame.
    pub fn rows<'a>(&'a self, frame: &'a IndicatorFrame) -> SignalRows<'a> {
        let any_bearish = frame
            .ema_fast
            .iter()
            .zip(&frame.ema_slow)
            .any(|(fast, slow)| fast < slow);
        let initial_ref = if any_bearish {
            None
        } else {
            frame.close.first().copied()
        };

        SignalRows {
            engine: self,
            frame,
            index: 0,
            state: SignalState::new(initial_ref),
        }
    }

    pub fn evaluate(&self, frame: &IndicatorFrame) -> SignalSeries {
        SignalSeries {
            rows: self.rows(frame).collect(),
        }
    }

    /// Verdict for the last bar, without keeping the rows around.
    pub fn verdict(&self, frame: &IndicatorFrame) -> Verdict {
        let mut previous = None;
        let mut last = None;
        for row in self.rows(frame) {
            previous = last;
            last = Some(row.green);
        }
        match last {
            Some(green) => Verdict::from_last_two(green, previous),
            None => Verdict::default(),
        }
    }

    fn basic_signal(&self, frame: &IndicatorFrame, t: usize) -> bool {
        let adr = frame.adr_long_pct[t];
        let distance = frame.price_vs_ema_fast_pct[t];
        let within_range = match self.config.rule {
            BasicSignalRule::AdrMultiple => adr * self.config.adr_multiplier > distance,
            BasicSignalRule::AdrBounded => {
                adr > distance && adr * self.config.adr_multiplier > distance
            }
        };
        within_range && frame.ema_fast[t] > frame.ema_slow[t]
    }
}

/// State carried from one bar to the next.
#[derive(Debug, Clone, Copy)]
struct SignalState {
    /// `basic` at t-1 and t-2.
    prev_basic: [bool; 2],
    ref_price: Option<f64>,
}

impl SignalState {
    fn new(ref_price: Option<f64>) -> Self {
        Self {
            prev_basic: [false; 2],
            ref_price,
        }
    }
}

/// Iterator returned by [`SignalEngine::rows`].
pub struct SignalRows<'a> {
    engine: &'a SignalEngine,
    frame: &'a IndicatorFrame,
    index: usize,
    state: SignalState,
}

impl Iterator for SignalRows<'_> {
    type Item = SignalRow;

    fn next(&mut self) -> Option<SignalRow> {
        let t = self.index;
        if t >= self.frame.len() {
            return None;
        }
        self.index += 1;

        let frame = self.frame;
        let config = &self.engine.config;
        let close = frame.close[t];

        let basic = self.engine.basic_signal(frame, t);
        let consecutive = basic && self.state.prev_basic[0] && self.state.prev_basic[1];
        self.state.prev_basic = [basic, self.state.prev_basic[0]];

        let bearish = frame.ema_fast[t] < frame.ema_slow[t];
        if bearish {
            self.state.ref_price = Some(close);
        }
        let ref_price = self.state.ref_price;

        let perf_since_ref = if basic {
            ref_price.map(|reference| (close / reference - 1.0) * 100.0)
        } else {
            None
        };

        let confirmed = consecutive
            && perf_since_ref.is_some_and(|perf| perf > config.min_perf_since_ref_pct);

        let green = confirmed
            && frame.adr_long_pct[t] > frame.adr_short_pct[t]
            && frame.low_volume[t]
            && frame.ema_fast_rising[t]
            && frame.ema_slow_rising[t];

        Some(SignalRow {
            basic,
            consecutive,
            bearish,
            ref_price,
            perf_since_ref,
            confirmed,
            green,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.frame.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}
