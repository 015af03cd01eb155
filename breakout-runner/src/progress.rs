//! Progress callbacks for scans.

use crate::report::ModeReport;
use crate::scan::SymbolError;
use breakout_core::domain::ScanMode;
use breakout_core::engine::Verdict;
use tracing::{debug, info, warn};

/// Progress callback for multi-symbol scans.
pub trait ScanProgress: Send + Sync {
    /// Called before a symbol is fetched.
    fn on_start(&self, mode: ScanMode, symbol: &str, index: usize, total: usize);

    /// Called when a symbol has been analyzed or skipped.
    fn on_complete(
        &self,
        mode: ScanMode,
        symbol: &str,
        index: usize,
        total: usize,
        result: &Result<Verdict, SymbolError>,
    );

    /// Called when every candidate of a mode has been handled.
    fn on_mode_complete(&self, report: &ModeReport);
}

/// Logs progress through `tracing`: per-symbol lines at debug, failures at
/// warn, the mode summary at info.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ScanProgress for TracingProgress {
    fn on_start(&self, mode: ScanMode, symbol: &str, index: usize, total: usize) {
        debug!(%mode, symbol, "[{}/{}] analyzing", index + 1, total);
    }

    fn on_complete(
        &self,
        mode: ScanMode,
        symbol: &str,
        _index: usize,
        _total: usize,
        result: &Result<Verdict, SymbolError>,
    ) {
        match result {
            Ok(verdict) if verdict.candidate => {
                debug!(%mode, symbol, is_new = verdict.is_new, "green signal")
            }
            Ok(_) => {}
            Err(e) => warn!(%mode, symbol, error = %e, "failed to analyze"),
        }
    }

    fn on_mode_complete(&self, report: &ModeReport) {
        info!(
            mode = %report.mode,
            screened = report.screened,
            analyzed = report.analyzed,
            failed = report.failed(),
            hits = report.hits.len(),
            new = report.new_hits(),
            "scan complete"
        );
    }
}
