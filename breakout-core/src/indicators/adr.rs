//! Average Daily Range percentage (ADR%).
//!
//! ADR%[t] = 100 * mean over the trailing `period` bars of (high - low) / close.
//! Lookback: period - 1.

use super::sma::sma_of_series;
use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct AdrPct {
    period: usize,
    name: String,
}

impl AdrPct {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ADR period must be >= 1");
        Self {
            period,
            name: format!("adr_pct_{period}"),
        }
    }
}

impl Indicator for AdrPct {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        adr_pct(bars, self.period)
    }
}

/// ADR% column for a bar series.
pub fn adr_pct(bars: &[Bar], period: usize) -> Vec<f64> {
    let ratios: Vec<f64> = bars.iter().map(Bar::range_ratio).collect();
    sma_of_series(&ratios, period)
        .into_iter()
        .map(|mean| mean * 100.0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn adr_known_values() {
        // make_bars: high/low are +/-1 around open/close.
        // closes 10, 10, 20 -> ranges 2, 2, 12 -> ratios 0.2, 0.2, 0.6
        let bars = make_bars(&[10.0, 10.0, 20.0]);
        let result = AdrPct::new(2).compute(&bars);
        assert!(result[0].is_nan());
        assert_approx(result[1], 20.0, DEFAULT_EPSILON);
        assert_approx(result[2], 40.0, DEFAULT_EPSILON);
    }

    #[test]
    fn adr_flat_bars_are_zero() {
        let mut bars = make_bars(&[10.0; 6]);
        for bar in &mut bars {
            bar.high = bar.close;
            bar.low = bar.close;
        }
        let result = adr_pct(&bars, 5);
        assert!(result[..4].iter().all(|v| v.is_nan()));
        assert_eq!(result[4], 0.0);
        assert_eq!(result[5], 0.0);
    }

    #[test]
    fn adr_lookback() {
        assert_eq!(AdrPct::new(20).lookback(), 19);
        assert_eq!(AdrPct::new(5).name(), "adr_pct_5");
    }
}
