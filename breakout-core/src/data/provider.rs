//! Provider traits and structured error types.
//!
//! `HistoryProvider` abstracts over bar sources (Yahoo Finance, CSV import) and
//! `CandidateSource` over symbol lists (TradingView screener, a fixed list), so
//! the scanner can swap implementations and tests can mock both.

use crate::domain::{Candidate, Interval, ScanMode, Series, SeriesError};
use std::path::PathBuf;
use thiserror::Error;

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("no {interval} data for {symbol} in the requested window")]
    NoData { symbol: String, interval: Interval },

    #[error("hard stop: provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("invalid series: {0}")]
    InvalidSeries(#[from] SeriesError),

    #[error("malformed entry: {0}")]
    MalformedEntry(String),

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("data error: {0}")]
    Other(String),
}

/// What to fetch for one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryRequest {
    /// Calendar days of history ending at the most recent bar.
    pub lookback_days: u32,
    pub interval: Interval,
}

impl HistoryRequest {
    pub fn new(lookback_days: u32, interval: Interval) -> Self {
        Self {
            lookback_days,
            interval,
        }
    }
}

/// Source of OHLCV history.
///
/// Implementations return bars in ascending date order with no duplicates
/// (enforced by [`Series::new`]) and fail with [`DataError::NoData`] when the
/// window is empty. Retries, if any, happen inside the provider.
pub trait HistoryProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    fn fetch(&self, symbol: &str, request: &HistoryRequest) -> Result<Series, DataError>;
}

/// Source of the ordered candidate list for a scan mode.
pub trait CandidateSource: Send + Sync {
    fn name(&self) -> &str;

    fn find_candidates(&self, mode: ScanMode) -> Result<Vec<Candidate>, DataError>;
}

/// A fixed symbol list, identical for every mode.
#[derive(Debug, Clone, Default)]
pub struct StaticCandidates {
    candidates: Vec<Candidate>,
}

impl StaticCandidates {
    /// Display names equal the symbols.
    pub fn from_symbols<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let candidates = symbols
            .into_iter()
            .map(|s| s.as_ref().trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .map(|s| Candidate::new(s.clone(), s))
            .collect();
        Self { candidates }
    }

    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self { candidates }
    }
}

impl CandidateSource for StaticCandidates {
    fn name(&self) -> &str {
        "static"
    }

    fn find_candidates(&self, _mode: ScanMode) -> Result<Vec<Candidate>, DataError> {
        Ok(self.candidates.clone())
    }
}
