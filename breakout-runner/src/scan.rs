//! Scan orchestrator: candidate source -> history provider -> engine -> report.
//!
//! Symbols are handled one at a time, in the order the candidate source
//! returns them. A failure on one symbol is logged and recorded in the mode
//! report; only a candidate source failure aborts the scan.

use crate::config::{ConfigError, ModeConfig};
use crate::progress::ScanProgress;
use crate::report::{ModeReport, ScanHit, ScanReport, SymbolFailure};
use breakout_core::data::{CandidateSource, DataError, HistoryProvider, HistoryRequest};
use breakout_core::domain::{ScanMode, Series};
use breakout_core::engine::{EngineError, IndicatorFrame, SignalEngine, Verdict};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that abort a whole scan.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("candidate source '{source_name}' failed for {mode} scan: {source}")]
    CandidateSource {
        source_name: String,
        mode: ScanMode,
        #[source]
        source: DataError,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors that skip one symbol.
#[derive(Debug, Error)]
pub enum SymbolError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] DataError),

    #[error("analysis failed: {0}")]
    Analysis(#[from] EngineError),
}

/// Run the indicator frame and the signal engine over one series.
pub fn analyze_series(series: &Series, mode: &ModeConfig) -> Result<Verdict, EngineError> {
    let frame = IndicatorFrame::compute(series, &mode.indicators)?;
    let engine = SignalEngine::new(mode.signal.clone())?;
    Ok(engine.verdict(&frame))
}

/// Fixed pause in front of every history request except the first of a mode.
#[derive(Debug, Clone)]
pub struct RequestPacer {
    delay: Duration,
    sent: usize,
    waits: usize,
}

impl RequestPacer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            sent: 0,
            waits: 0,
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// Block until the next request may go out, then mark it sent.
    pub fn pace(&mut self) {
        if self.sent > 0 && !self.delay.is_zero() {
            std::thread::sleep(self.delay);
            self.waits += 1;
        }
        self.sent += 1;
    }

    /// Forget the previous request; the next `pace` returns immediately.
    pub fn reset(&mut self) {
        self.sent = 0;
    }

    /// Number of pauses taken so far.
    pub fn waits(&self) -> usize {
        self.waits
    }
}

pub struct Scanner<'a> {
    candidates: &'a dyn CandidateSource,
    history: &'a dyn HistoryProvider,
    progress: &'a dyn ScanProgress,
    pacer: RequestPacer,
}

impl<'a> Scanner<'a> {
    pub fn new(
        candidates: &'a dyn CandidateSource,
        history: &'a dyn HistoryProvider,
        progress: &'a dyn ScanProgress,
        pacer: RequestPacer,
    ) -> Self {
        Self {
            candidates,
            history,
            progress,
            pacer,
        }
    }

    pub fn pacer(&self) -> &RequestPacer {
        &self.pacer
    }

    /// Scan every mode in order. Stops at the first fatal error.
    pub fn scan(&mut self, modes: &[ModeConfig]) -> Result<ScanReport, ScanError> {
        let mut report = ScanReport::default();
        for mode in modes {
            report.insert(self.scan_mode(mode)?);
        }
        Ok(report)
    }

    pub fn scan_mode(&mut self, config: &ModeConfig) -> Result<ModeReport, ScanError> {
        config.validate()?;
        let mode = config.mode;

        let candidates = self.candidates.find_candidates(mode).map_err(|source| {
            ScanError::CandidateSource {
                source_name: self.candidates.name().to_string(),
                mode,
                source,
            }
        })?;
        info!(
            %mode,
            source = self.candidates.name(),
            history = self.history.name(),
            candidates = candidates.len(),
            "starting scan"
        );

        let request = HistoryRequest::new(config.lookback_days, config.interval);
        let total = candidates.len();
        let mut report = ModeReport::new(mode);
        report.screened = total;
        self.pacer.reset();

        for (index, candidate) in candidates.into_iter().enumerate() {
            self.progress.on_start(mode, &candidate.symbol, index, total);
            self.pacer.pace();

            let result = self
                .history
                .fetch(&candidate.symbol, &request)
                .map_err(SymbolError::from)
                .and_then(|series| analyze_series(&series, config).map_err(SymbolError::from));

            self.progress
                .on_complete(mode, &candidate.symbol, index, total, &result);

            match result {
                Ok(verdict) => {
                    report.analyzed += 1;
                    if verdict.candidate {
                        report.hits.push(ScanHit {
                            symbol: candidate.symbol,
                            display_name: candidate.display_name,
                            is_new: verdict.is_new,
                        });
                    }
                }
                Err(e) => {
                    debug!(symbol = %candidate.symbol, error = %e, "skipping symbol");
                    report.failures.push(SymbolFailure {
                        symbol: candidate.symbol,
                        message: e.to_string(),
                    });
                }
            }
        }

        self.progress.on_mode_complete(&report);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pacer_skips_first_request() {
        let mut pacer = RequestPacer::from_millis(5);
        pacer.pace();
        assert_eq!(pacer.waits(), 0);
        pacer.pace();
        pacer.pace();
        assert_eq!(pacer.waits(), 2);
        pacer.reset();
        pacer.pace();
        assert_eq!(pacer.waits(), 2);
    }

    #[test]
    fn zero_delay_never_waits() {
        let mut pacer = RequestPacer::from_millis(0);
        for _ in 0..5 {
            pacer.pace();
        }
        assert_eq!(pacer.waits(), 0);
    }

    #[test]
    fn symbol_error_messages() {
        let err = SymbolError::from(EngineError::InvalidPeriod {
            name: "fast_period",
            value: 0,
        });
        assert_eq!(
            err.to_string(),
            "analysis failed: fast_period must be >= 1 (got 0)"
        );
    }
}
