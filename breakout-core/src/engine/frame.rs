//! Indicator frame: every derived column the signal engine reads, for one series.
//!
//! Columns are computed once per series, all with the same length as the
//! series. Numeric columns hold NaN where undefined; boolean columns hold
//! `false` where any operand is undefined.

use super::EngineError;
use crate::domain::Series;
use crate::indicators::{AdrPct, Ema, Indicator, PriceField, Sma};
use serde::{Deserialize, Serialize};

/// Periods for the indicator columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub fast_period: usize,
    pub slow_period: usize,
    pub adr_long: usize,
    pub adr_short: usize,
    pub volume_period: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            fast_period: 10,
            slow_period: 20,
            adr_long: 20,
            adr_short: 5,
            volume_period: 20,
        }
    }
}

impl IndicatorConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        let periods = [
            ("fast_period", self.fast_period),
            ("slow_period", self.slow_period),
            ("adr_long", self.adr_long),
            ("adr_short", self.adr_short),
            ("volume_period", self.volume_period),
        ];
        for (name, value) in periods {
            if value == 0 {
                return Err(EngineError::InvalidPeriod { name, value });
            }
        }
        Ok(())
    }
}

/// Derived columns for one series.
#[derive(Debug, Clone)]
pub struct IndicatorFrame {
    pub close: Vec<f64>,
    pub ema_fast: Vec<f64>,
    pub ema_slow: Vec<f64>,
    pub adr_long_pct: Vec<f64>,
    pub adr_short_pct: Vec<f64>,
    pub volume_sma: Vec<f64>,
    pub low_volume: Vec<bool>,
    pub price_vs_ema_fast_pct: Vec<f64>,
    pub ema_fast_rising: Vec<bool>,
    pub ema_slow_rising: Vec<bool>,
}

impl IndicatorFrame {
    pub fn compute(series: &Series, config: &IndicatorConfig) -> Result<Self, EngineError> {
        config.validate()?;

        let close = series.closes();
        let volume = series.volumes();
        let ema_fast = column(series, &Ema::new(config.fast_period));
        let ema_slow = column(series, &Ema::new(config.slow_period));
        let adr_long_pct = column(series, &AdrPct::new(config.adr_long));
        let adr_short_pct = column(series, &AdrPct::new(config.adr_short));
        let volume_sma = column(series, &Sma::of(PriceField::Volume, config.volume_period));

        let low_volume = volume
            .iter()
            .zip(&volume_sma)
            .map(|(v, avg)| v < avg)
            .collect();

        let price_vs_ema_fast_pct = close
            .iter()
            .zip(&ema_fast)
            .map(|(c, ema)| (c - ema).abs() / ema * 100.0)
            .collect();

        Ok(Self {
            low_volume,
            price_vs_ema_fast_pct,
            ema_fast_rising: rising(&ema_fast),
            ema_slow_rising: rising(&ema_slow),
            close,
            ema_fast,
            ema_slow,
            adr_long_pct,
            adr_short_pct,
            volume_sma,
        })
    }

    pub fn len(&self) -> usize {
        self.close.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }
}

fn column(series: &Series, indicator: &dyn Indicator) -> Vec<f64> {
    let bars = series.bars();
    let values = indicator.compute(bars);
    debug_assert_eq!(
        values.len(),
        bars.len(),
        "indicator '{}' produced {} values for {} bars (symbol={})",
        indicator.name(),
        values.len(),
        bars.len(),
        series.symbol()
    );
    values
}

/// `values[t] > values[t-1]`; false at t = 0.
fn rising(values: &[f64]) -> Vec<bool> {
    values
        .iter()
        .enumerate()
        .map(|(t, v)| t > 0 && *v > values[t - 1])
        .collect()
}
