//! Candidate sources and history providers.

pub mod circuit_breaker;
pub mod csv_import;
pub mod provider;
pub mod screener;
pub mod yahoo;

pub use circuit_breaker::CircuitBreaker;
pub use csv_import::CsvHistoryProvider;
pub use provider::{CandidateSource, DataError, HistoryProvider, HistoryRequest, StaticCandidates};
pub use screener::{RawEntry, ScreenerConfig, TradingViewScreener};
pub use yahoo::YahooProvider;

/// Browser user agent; both TradingView and Yahoo reject the reqwest default.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Blocking HTTP client shared by the screener and the Yahoo provider.
///
/// Timeouts are set per request by each provider.
pub fn http_client() -> Result<reqwest::blocking::Client, DataError> {
    reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))
}
