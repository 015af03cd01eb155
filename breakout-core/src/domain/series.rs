//! Validated, immutable bar series for one symbol.

use super::bar::Bar;
use chrono::NaiveDate;
use thiserror::Error;

/// Reasons a bar list cannot become a [`Series`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("empty series for {symbol}")]
    Empty { symbol: String },

    #[error("{symbol}: bar {index} dated {date} does not follow {previous}")]
    OutOfOrder {
        symbol: String,
        index: usize,
        date: NaiveDate,
        previous: NaiveDate,
    },

    #[error("{symbol}: malformed bar {index} dated {date}")]
    MalformedBar {
        symbol: String,
        index: usize,
        date: NaiveDate,
    },
}

/// Ordered OHLCV history for one symbol.
///
/// Dates are strictly increasing (no duplicates), the list is non-empty and
/// every bar is usable. Gaps between dates are allowed.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    symbol: String,
    bars: Vec<Bar>,
}

impl Series {
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, SeriesError> {
        let symbol = symbol.into();
        if bars.is_empty() {
            return Err(SeriesError::Empty { symbol });
        }

        for (index, bar) in bars.iter().enumerate() {
            if !bar.is_usable() {
                return Err(SeriesError::MalformedBar {
                    symbol,
                    index,
                    date: bar.date,
                });
            }
            if index > 0 {
                let previous = bars[index - 1].date;
                if bar.date <= previous {
                    return Err(SeriesError::OutOfOrder {
                        symbol,
                        index,
                        date: bar.date,
                        previous,
                    });
                }
            }
        }

        Ok(Self { symbol, bars })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false for a constructed series; kept for clippy's `len_without_is_empty`.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> &Bar {
        // Non-empty by construction.
        &self.bars[self.bars.len() - 1]
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume as f64).collect()
    }

    /// A series holding only the first `len` bars. Used by look-ahead checks.
    pub fn truncated(&self, len: usize) -> Result<Self, SeriesError> {
        let len = len.min(self.bars.len());
        Self::new(self.symbol.clone(), self.bars[..len].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(day: u32, close: f64) -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1_000,
        }
    }

    #[test]
    fn accepts_ordered_bars_with_gaps() {
        let series = Series::new("AAPL", vec![bar(1, 10.0), bar(4, 11.0), bar(5, 12.0)]).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.symbol(), "AAPL");
        assert_eq!(series.last().close, 12.0);
        assert_eq!(series.closes(), vec![10.0, 11.0, 12.0]);
    }

    #[test]
    fn rejects_empty() {
        let err = Series::new("AAPL", vec![]).unwrap_err();
        assert_eq!(
            err,
            SeriesError::Empty {
                symbol: "AAPL".into()
            }
        );
    }

    #[test]
    fn rejects_duplicate_date() {
        let err = Series::new("AAPL", vec![bar(1, 10.0), bar(1, 11.0)]).unwrap_err();
        assert!(matches!(err, SeriesError::OutOfOrder { index: 1, .. }));
    }

    #[test]
    fn rejects_descending_date() {
        let err = Series::new("AAPL", vec![bar(2, 10.0), bar(1, 11.0)]).unwrap_err();
        assert!(matches!(err, SeriesError::OutOfOrder { index: 1, .. }));
    }

    #[test]
    fn rejects_malformed_bar() {
        let mut bad = bar(2, 10.0);
        bad.close = f64::NAN;
        let err = Series::new("AAPL", vec![bar(1, 10.0), bad]).unwrap_err();
        assert!(matches!(err, SeriesError::MalformedBar { index: 1, .. }));
    }

    #[test]
    fn truncated_keeps_prefix() {
        let series = Series::new("AAPL", vec![bar(1, 10.0), bar(2, 11.0), bar(3, 12.0)]).unwrap();
        let short = series.truncated(2).unwrap();
        assert_eq!(short.closes(), vec![10.0, 11.0]);
        assert_eq!(series.truncated(10).unwrap().len(), 3);
    }
}
