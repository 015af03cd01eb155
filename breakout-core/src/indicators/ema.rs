//! Exponential Moving Average (EMA), normalized-weighted form.
//!
//! alpha = 2 / (period + 1). The value at bar t is the weighted mean of every
//! value up to t, with weight (1 - alpha)^(t - i) for the value at bar i:
//!
//! ```text
//! EMA[t] = sum_i (1-alpha)^(t-i) * x[i] / sum_i (1-alpha)^(t-i)
//! ```
//!
//! This is not the seeded recursive EMA: EMA[0] == x[0] and the two only
//! converge once enough history has accumulated. Defined from index 0.

use super::{Indicator, PriceField};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    field: PriceField,
    name: String,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        Self::of(PriceField::Close, period)
    }

    pub fn of(field: PriceField, period: usize) -> Self {
        assert!(period >= 1, "EMA period must be >= 1");
        Self {
            period,
            field,
            name: format!("ema{}_{period}", field.suffix()),
        }
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        ema_of_series(&self.field.extract(bars), self.period)
    }
}

/// Normalized-weighted EMA of an arbitrary series, in one O(n) pass.
///
/// Keeps the running mean and the total weight behind it. Each step decays the
/// old weight by (1 - alpha) and folds the new value in with weight 1. When
/// the new value equals the mean the mean is left as is, so a constant input
/// gives back the constant exactly.
///
/// NaN inputs do not contribute but still decay the older weights; the output
/// repeats the current mean. Leading NaNs stay NaN until the first value.
pub fn ema_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 {
        return result;
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    let decay = 1.0 - alpha;

    let mut mean = f64::NAN;
    let mut old_weight = 0.0;

    for (i, &value) in values.iter().enumerate() {
        let observed = !value.is_nan();

        if mean.is_nan() {
            if observed {
                mean = value;
                old_weight = 1.0;
            }
        } else {
            old_weight *= decay;
            if observed {
                if mean != value {
                    mean = (old_weight * mean + value) / (old_weight + 1.0);
                }
                old_weight += 1.0;
            }
        }

        result[i] = mean;
    }

    result
}
