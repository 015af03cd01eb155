//! TradingView screener candidate source.
//!
//! POSTs a scan query to the unofficial `global/scan` endpoint and maps each
//! returned row to a [`Candidate`]. Rows come back as `{"s": "NASDAQ:AAPL",
//! "d": [...]}` where `d` holds the requested columns in request order; the
//! mapping reads them by column name, never by position.

use super::provider::{CandidateSource, DataError};
use crate::domain::{Candidate, ScanMode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

pub const SCAN_ENDPOINT: &str = "https://scanner.tradingview.com/global/scan";

/// Universe filters shared by both modes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenerConfig {
    pub min_close: f64,
    pub min_market_cap: f64,
    pub min_avg_volume_30d: f64,
    pub markets: Vec<String>,
    pub sort_by: String,
    pub range_limit: u32,
    pub timeout_secs: u64,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            min_close: 2.0,
            min_market_cap: 300_000_000.0,
            min_avg_volume_30d: 1_000_000.0,
            markets: vec!["america".to_string()],
            sort_by: "Perf.6M".to_string(),
            range_limit: 5000,
            timeout_secs: 10,
        }
    }
}

/// Screener column names for the trend filters of a mode.
struct TrendColumns {
    fast: &'static str,
    slow: &'static str,
    trend: &'static str,
}

impl TrendColumns {
    fn for_mode(mode: ScanMode) -> Self {
        match mode {
            ScanMode::Daily => Self {
                fast: "EMA10",
                slow: "EMA20",
                trend: "SMA50",
            },
            ScanMode::Weekly => Self {
                fast: "EMA10|1W",
                slow: "EMA20|1W",
                trend: "SMA30|1W",
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOp {
    Greater,
    Egreater,
    Equal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Filter {
    pub left: String,
    pub operation: FilterOp,
    pub right: Value,
}

impl Filter {
    fn new(left: &str, operation: FilterOp, right: impl Into<Value>) -> Self {
        Self {
            left: left.to_string(),
            operation,
            right: right.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sort {
    #[serde(rename = "sortBy")]
    pub sort_by: String,
    #[serde(rename = "sortOrder")]
    pub sort_order: String,
}

/// Request body for the scan endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanQuery {
    pub columns: Vec<String>,
    pub filter: Vec<Filter>,
    pub ignore_unknown_fields: bool,
    pub options: Value,
    pub range: [u32; 2],
    pub sort: Sort,
    pub symbols: Value,
    pub markets: Vec<String>,
}

impl ScreenerConfig {
    /// Scan query for a mode: liquidity floor plus an up-trending MA stack.
    pub fn query(&self, mode: ScanMode) -> ScanQuery {
        let cols = TrendColumns::for_mode(mode);
        let filter = vec![
            Filter::new("close", FilterOp::Egreater, self.min_close),
            Filter::new("market_cap_basic", FilterOp::Egreater, self.min_market_cap),
            Filter::new(
                "average_volume_30d_calc",
                FilterOp::Greater,
                self.min_avg_volume_30d,
            ),
            Filter::new(cols.fast, FilterOp::Egreater, cols.slow),
            Filter::new(cols.slow, FilterOp::Egreater, cols.trend),
            Filter::new("close", FilterOp::Egreater, cols.slow),
            Filter::new("is_primary", FilterOp::Equal, true),
        ];

        ScanQuery {
            columns: ["name", "close", cols.fast, cols.slow, cols.trend, "exchange"]
                .into_iter()
                .map(String::from)
                .collect(),
            filter,
            ignore_unknown_fields: false,
            options: serde_json::json!({ "lang": "en" }),
            range: [0, self.range_limit],
            sort: Sort {
                sort_by: self.sort_by.clone(),
                sort_order: "desc".to_string(),
            },
            symbols: serde_json::json!({}),
            markets: self.markets.clone(),
        }
    }
}

/// One row of a scan response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawEntry {
    /// Exchange-qualified symbol, e.g. `NASDAQ:AAPL`.
    #[serde(rename = "s")]
    pub symbol_full: String,
    /// Column values in request order.
    #[serde(rename = "d", default)]
    pub fields: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct ScanResponse {
    #[serde(rename = "totalCount", default)]
    total_count: Option<u64>,
    data: Vec<RawEntry>,
}

impl Candidate {
    /// Map a screener row to a candidate. `columns` are the column names the
    /// query requested; the `name` column becomes the symbol and the
    /// exchange-qualified symbol becomes the display name.
    pub fn from_raw(entry: &RawEntry, columns: &[String]) -> Result<Candidate, DataError> {
        let value = columns
            .iter()
            .zip(&entry.fields)
            .find_map(|(column, value)| (column == "name").then_some(value))
            .ok_or_else(|| {
                DataError::MalformedEntry(format!("{}: no `name` column", entry.symbol_full))
            })?;

        match value.as_str().map(str::trim) {
            Some(name) if !name.is_empty() => Ok(Candidate::new(name, entry.symbol_full.clone())),
            _ => Err(DataError::MalformedEntry(format!(
                "{}: `name` is not a symbol: {value}",
                entry.symbol_full
            ))),
        }
    }
}

/// TradingView screener candidate source.
pub struct TradingViewScreener {
    client: reqwest::blocking::Client,
    config: ScreenerConfig,
    endpoint: String,
}

impl TradingViewScreener {
    pub fn new(client: reqwest::blocking::Client, config: ScreenerConfig) -> Self {
        Self {
            client,
            config,
            endpoint: SCAN_ENDPOINT.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn parse_response(body: &str, columns: &[String]) -> Result<Vec<Candidate>, DataError> {
        let response: ScanResponse = serde_json::from_str(body).map_err(|e| {
            DataError::ResponseFormatChanged(format!("failed to parse screener response: {e}"))
        })?;

        debug!(
            total = response.total_count,
            returned = response.data.len(),
            "screener response"
        );

        let candidates = response
            .data
            .iter()
            .filter_map(|entry| match Candidate::from_raw(entry, columns) {
                Ok(candidate) => Some(candidate),
                Err(e) => {
                    warn!(error = %e, "dropping screener entry");
                    None
                }
            })
            .collect();

        Ok(candidates)
    }
}

impl CandidateSource for TradingViewScreener {
    fn name(&self) -> &str {
        "tradingview"
    }

    fn find_candidates(&self, mode: ScanMode) -> Result<Vec<Candidate>, DataError> {
        let query = self.config.query(mode);

        let resp = self
            .client
            .post(&self.endpoint)
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .json(&query)
            .send()
            .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(DataError::RateLimited {
                retry_after_secs: 60,
            });
        }
        if !status.is_success() {
            return Err(DataError::Other(format!("screener returned HTTP {status}")));
        }

        let body = resp
            .text()
            .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;
        Self::parse_response(&body, &query.columns)
    }
}
