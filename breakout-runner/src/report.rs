//! Scan results and their JSON/text renderings.
//!
//! The JSON shape is consumed by the dashboard backend:
//!
//! ```json
//! {"daily": [{"symbol": "NVDA", "ticker_full_name": "NASDAQ:NVDA", "is_new": true}],
//!  "weekly": [], "dailyCount": 1, "weeklyCount": 0}
//! ```
//!
//! A fatal failure adds `"error"` and empties both lists.

use breakout_core::domain::ScanMode;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// One symbol showing a green signal on its latest bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanHit {
    pub symbol: String,
    #[serde(rename = "ticker_full_name")]
    pub display_name: String,
    pub is_new: bool,
}

/// A symbol skipped after a fetch or analysis failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolFailure {
    pub symbol: String,
    pub message: String,
}

/// Outcome of scanning one mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeReport {
    pub mode: ScanMode,
    /// Hits in candidate-source order.
    pub hits: Vec<ScanHit>,
    /// Candidates handed out by the source.
    pub screened: usize,
    /// Candidates fetched and run through the engine.
    pub analyzed: usize,
    pub failures: Vec<SymbolFailure>,
}

impl ModeReport {
    pub fn new(mode: ScanMode) -> Self {
        Self {
            mode,
            hits: Vec::new(),
            screened: 0,
            analyzed: 0,
            failures: Vec::new(),
        }
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn new_hits(&self) -> usize {
        self.hits.iter().filter(|h| h.is_new).count()
    }
}

/// Reports for the requested modes. Modes not scanned are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub daily: Option<ModeReport>,
    pub weekly: Option<ModeReport>,
}

#[derive(Serialize)]
struct WireOutput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    daily: &'a [ScanHit],
    weekly: &'a [ScanHit],
    #[serde(rename = "dailyCount")]
    daily_count: usize,
    #[serde(rename = "weeklyCount")]
    weekly_count: usize,
}

impl ScanReport {
    pub fn insert(&mut self, report: ModeReport) {
        match report.mode {
            ScanMode::Daily => self.daily = Some(report),
            ScanMode::Weekly => self.weekly = Some(report),
        }
    }

    pub fn get(&self, mode: ScanMode) -> Option<&ModeReport> {
        match mode {
            ScanMode::Daily => self.daily.as_ref(),
            ScanMode::Weekly => self.weekly.as_ref(),
        }
    }

    pub fn hits(&self, mode: ScanMode) -> &[ScanHit] {
        self.get(mode)
            .map(|r| r.hits.as_slice())
            .unwrap_or_default()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let daily = self.hits(ScanMode::Daily);
        let weekly = self.hits(ScanMode::Weekly);
        serde_json::to_string(&WireOutput {
            error: None,
            daily,
            weekly,
            daily_count: daily.len(),
            weekly_count: weekly.len(),
        })
    }

    /// Plain listing: a header, then each mode's count and symbols, with
    /// `(NEW)` marking fresh signals.
    pub fn to_text(&self) -> String {
        let mut out = String::from("Analysis complete!\n");
        for (i, mode) in ScanMode::ALL.into_iter().enumerate() {
            if i > 0 {
                out.push_str("=========================\n");
            }
            let hits = self.hits(mode);
            let _ = writeln!(out, "Found {} {mode} candidates", hits.len());
            for hit in hits {
                let marker = if hit.is_new { " (NEW)" } else { "" };
                let _ = writeln!(out, "{}{marker}", hit.symbol);
            }
        }
        out
    }
}

/// Output for a scan that failed before producing any report.
pub fn error_json(message: &str) -> Result<String, serde_json::Error> {
    serde_json::to_string(&WireOutput {
        error: Some(message),
        daily: &[],
        weekly: &[],
        daily_count: 0,
        weekly_count: 0,
    })
}
