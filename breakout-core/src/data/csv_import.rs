//! CSV history provider for offline scans.
//!
//! Layout: `<root>/<interval>/<SYMBOL>.csv`, e.g. `data/1wk/AAPL.csv`, each
//! with the header `date,open,high,low,close,volume` and rows in ascending
//! date order. The lookback window is anchored at the last row of the file,
//! not at today, so fixtures stay valid as time passes.

use super::provider::{DataError, HistoryProvider, HistoryRequest};
use crate::domain::{Bar, Interval, Series};
use chrono::{Duration, NaiveDate};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl From<CsvRow> for Bar {
    fn from(row: CsvRow) -> Self {
        Bar {
            date: row.date,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            // exports often write volume as a float
            volume: row.volume.max(0.0).round() as u64,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CsvHistoryProvider {
    root: PathBuf,
}

impl CsvHistoryProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, symbol: &str, interval: Interval) -> PathBuf {
        self.root
            .join(interval.code())
            .join(format!("{}.csv", symbol.to_uppercase()))
    }

    fn read_bars(path: &Path) -> Result<Vec<Bar>, DataError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|source| DataError::Csv {
                path: path.to_path_buf(),
                source,
            })?;

        reader
            .deserialize::<CsvRow>()
            .map(|row| {
                row.map(Bar::from).map_err(|source| DataError::Csv {
                    path: path.to_path_buf(),
                    source,
                })
            })
            .collect()
    }
}

/// Bars dated within `lookback_days` of the last bar.
fn within_lookback(mut bars: Vec<Bar>, lookback_days: u32) -> Vec<Bar> {
    let Some(last) = bars.last().map(|b| b.date) else {
        return bars;
    };
    let start = last - Duration::days(i64::from(lookback_days));
    bars.retain(|bar| bar.date >= start);
    bars
}

impl HistoryProvider for CsvHistoryProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch(&self, symbol: &str, request: &HistoryRequest) -> Result<Series, DataError> {
        let path = self.path_for(symbol, request.interval);
        if !path.is_file() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }

        let bars = within_lookback(Self::read_bars(&path)?, request.lookback_days);
        if bars.is_empty() {
            return Err(DataError::NoData {
                symbol: symbol.to_string(),
                interval: request.interval,
            });
        }

        debug!(symbol, bars = bars.len(), path = %path.display(), "loaded CSV history");
        Ok(Series::new(symbol, bars)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_fixture(root: &Path, interval: &str, symbol: &str, body: &str) {
        let dir = root.join(interval);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(format!("{symbol}.csv")), body).unwrap();
    }

    const HEADER: &str = "date,open,high,low,close,volume\n";

    #[test]
    fn reads_series_for_interval() {
        let tmp = tempfile::tempdir().unwrap();
        let body = format!(
            "{HEADER}2024-01-01,10,11,9,10.5,1000\n2024-01-08,10.5,12,10,11.5,1500.0\n"
        );
        write_fixture(tmp.path(), "1wk", "AAPL", &body);

        let provider = CsvHistoryProvider::new(tmp.path());
        let series = provider
            .fetch("aapl", &HistoryRequest::new(365, Interval::Weekly))
            .unwrap();

        assert_eq!(series.symbol(), "aapl");
        assert_eq!(series.len(), 2);
        assert_eq!(series.last().close, 11.5);
        assert_eq!(series.last().volume, 1500);
    }

    #[test]
    fn window_is_anchored_at_last_bar() {
        let tmp = tempfile::tempdir().unwrap();
        let body = format!(
            "{HEADER}2023-01-02,1,2,0.5,1,10\n2024-06-03,1,2,0.5,1,10\n2024-06-10,1,2,0.5,1,10\n"
        );
        write_fixture(tmp.path(), "1d", "MSFT", &body);

        let provider = CsvHistoryProvider::new(tmp.path());
        let series = provider
            .fetch("MSFT", &HistoryRequest::new(300, Interval::Daily))
            .unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(
            series.bars()[0].date,
            NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
        );
    }

    #[test]
    fn missing_file_is_symbol_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let provider = CsvHistoryProvider::new(tmp.path());
        let err = provider
            .fetch("NOPE", &HistoryRequest::new(300, Interval::Daily))
            .unwrap_err();
        assert!(matches!(err, DataError::SymbolNotFound { .. }));
    }

    #[test]
    fn header_only_is_no_data() {
        let tmp = tempfile::tempdir().unwrap();
        write_fixture(tmp.path(), "1d", "EMPTY", HEADER);
        let provider = CsvHistoryProvider::new(tmp.path());
        let err = provider
            .fetch("EMPTY", &HistoryRequest::new(300, Interval::Daily))
            .unwrap_err();
        assert!(matches!(err, DataError::NoData { .. }));
    }

    #[test]
    fn unparseable_row_is_csv_error() {
        let tmp = tempfile::tempdir().unwrap();
        write_fixture(
            tmp.path(),
            "1d",
            "BAD",
            &format!("{HEADER}2024-01-02,1,2,0.5,not-a-number,10\n"),
        );
        let provider = CsvHistoryProvider::new(tmp.path());
        let err = provider
            .fetch("BAD", &HistoryRequest::new(300, Interval::Daily))
            .unwrap_err();
        assert!(matches!(err, DataError::Csv { .. }));
    }

    #[test]
    fn unordered_rows_are_invalid_series() {
        let tmp = tempfile::tempdir().unwrap();
        write_fixture(
            tmp.path(),
            "1d",
            "UNORD",
            &format!("{HEADER}2024-01-03,1,2,0.5,1,10\n2024-01-02,1,2,0.5,1,10\n"),
        );
        let provider = CsvHistoryProvider::new(tmp.path());
        let err = provider
            .fetch("UNORD", &HistoryRequest::new(300, Interval::Daily))
            .unwrap_err();
        assert!(matches!(err, DataError::InvalidSeries(_)));
    }
}
