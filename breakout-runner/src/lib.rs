//! Breakout Runner: scan orchestration on top of `breakout-core`.
//!
//! This crate provides:
//! - Scan configuration (TOML, per-mode defaults, fingerprinting)
//! - The scan orchestrator with request pacing and per-symbol error isolation
//! - Progress callbacks
//! - Scan reports and their JSON/text renderings

pub mod config;
pub mod progress;
pub mod report;
pub mod scan;

pub use config::{ConfigError, ModeConfig, ScanConfig};
pub use progress::{ScanProgress, TracingProgress};
pub use report::{error_json, ModeReport, ScanHit, ScanReport, SymbolFailure};
pub use scan::{analyze_series, RequestPacer, ScanError, Scanner, SymbolError};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<ScanConfig>();
        assert_sync::<ScanConfig>();
        assert_send::<ModeConfig>();
        assert_sync::<ModeConfig>();
    }

    #[test]
    fn report_types_are_send_sync() {
        assert_send::<ScanReport>();
        assert_sync::<ScanReport>();
        assert_send::<ModeReport>();
        assert_sync::<ModeReport>();
    }

    #[test]
    fn errors_are_send_sync() {
        assert_send::<ScanError>();
        assert_sync::<ScanError>();
        assert_send::<SymbolError>();
        assert_sync::<SymbolError>();
    }
}
