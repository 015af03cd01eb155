//! Scan modes, bar intervals and screener candidates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Bar interval requested from a history provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1d")]
    Daily,
    #[serde(rename = "1wk")]
    Weekly,
}

impl Interval {
    /// Provider-facing code (`1d`, `1wk`).
    pub fn code(self) -> &'static str {
        match self {
            Interval::Daily => "1d",
            Interval::Weekly => "1wk",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Which setup is being scanned. Modes differ only by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    Daily,
    Weekly,
}

impl ScanMode {
    pub const ALL: [ScanMode; 2] = [ScanMode::Daily, ScanMode::Weekly];

    pub fn name(self) -> &'static str {
        match self {
            ScanMode::Daily => "daily",
            ScanMode::Weekly => "weekly",
        }
    }

    /// Interval the mode reads its history at.
    pub fn default_interval(self) -> Interval {
        match self {
            ScanMode::Daily => Interval::Daily,
            ScanMode::Weekly => Interval::Weekly,
        }
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A symbol handed out by a candidate source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Symbol passed to the history provider (e.g. `AAPL`).
    pub symbol: String,
    /// Exchange-qualified name for display (e.g. `NASDAQ:AAPL`).
    pub display_name: String,
}

impl Candidate {
    pub fn new(symbol: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            display_name: display_name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_serializes_as_provider_code() {
        assert_eq!(serde_json::to_string(&Interval::Weekly).unwrap(), "\"1wk\"");
        let parsed: Interval = serde_json::from_str("\"1d\"").unwrap();
        assert_eq!(parsed, Interval::Daily);
    }

    #[test]
    fn mode_defaults() {
        assert_eq!(ScanMode::Daily.default_interval(), Interval::Daily);
        assert_eq!(ScanMode::Weekly.default_interval(), Interval::Weekly);
        assert_eq!(ScanMode::Weekly.to_string(), "weekly");
    }
}
