//! Scan configuration loaded from TOML.
//!
//! Every key is optional; a file overrides only what it names. Mode sections
//! fall back to that mode's own defaults, so a partial `[weekly]` section does
//! not inherit daily settings.
//!
//! ```toml
//! request_delay_ms = 500
//!
//! [daily]
//! lookback_days = 300
//! rule = "adr_multiple"
//!
//! [weekly.indicators]
//! adr_long = 20
//!
//! [screener]
//! min_market_cap = 500_000_000
//! ```

use breakout_core::data::ScreenerConfig;
use breakout_core::domain::{Interval, ScanMode};
use breakout_core::engine::{BasicSignalRule, EngineError, IndicatorConfig, SignalConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{mode} scan: {source}")]
    Engine {
        mode: ScanMode,
        #[source]
        source: EngineError,
    },

    #[error("{mode} scan: lookback_days must be >= 1")]
    EmptyLookback { mode: ScanMode },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Everything one scan mode needs: where its history comes from and how it
/// is judged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModeConfig {
    pub mode: ScanMode,
    pub interval: Interval,
    pub lookback_days: u32,
    pub indicators: IndicatorConfig,
    pub signal: SignalConfig,
}

impl ModeConfig {
    /// 300 calendar days of daily bars, ADR-multiple rule.
    pub fn daily() -> Self {
        Self {
            mode: ScanMode::Daily,
            interval: Interval::Daily,
            lookback_days: 300,
            indicators: IndicatorConfig::default(),
            signal: SignalConfig::with_rule(BasicSignalRule::AdrMultiple),
        }
    }

    /// 365 calendar days of weekly bars, ADR-bounded rule.
    pub fn weekly() -> Self {
        Self {
            mode: ScanMode::Weekly,
            interval: Interval::Weekly,
            lookback_days: 365,
            indicators: IndicatorConfig::default(),
            signal: SignalConfig::with_rule(BasicSignalRule::AdrBounded),
        }
    }

    pub fn for_mode(mode: ScanMode) -> Self {
        match mode {
            ScanMode::Daily => Self::daily(),
            ScanMode::Weekly => Self::weekly(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lookback_days == 0 {
            return Err(ConfigError::EmptyLookback { mode: self.mode });
        }
        let engine_err = |source| ConfigError::Engine {
            mode: self.mode,
            source,
        };
        self.indicators.validate().map_err(engine_err)?;
        self.signal.validate().map_err(engine_err)?;
        Ok(())
    }

    fn apply(&mut self, patch: ModePatch) {
        if let Some(lookback_days) = patch.lookback_days {
            self.lookback_days = lookback_days;
        }
        if let Some(indicators) = patch.indicators {
            self.indicators = indicators;
        }
        if let Some(rule) = patch.rule {
            self.signal.rule = rule;
        }
        if let Some(adr_multiplier) = patch.adr_multiplier {
            self.signal.adr_multiplier = adr_multiplier;
        }
        if let Some(min_perf) = patch.min_perf_since_ref_pct {
            self.signal.min_perf_since_ref_pct = min_perf;
        }
    }
}

/// Full scan configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanConfig {
    /// Pause between history requests; 0 disables it.
    pub request_delay_ms: u64,
    pub daily: ModeConfig,
    pub weekly: ModeConfig,
    pub screener: ScreenerConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            request_delay_ms: 500,
            daily: ModeConfig::daily(),
            weekly: ModeConfig::weekly(),
            screener: ScreenerConfig::default(),
        }
    }
}

/// On-disk shape: every key optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ScanConfigFile {
    request_delay_ms: Option<u64>,
    daily: Option<ModePatch>,
    weekly: Option<ModePatch>,
    screener: Option<ScreenerConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ModePatch {
    lookback_days: Option<u32>,
    indicators: Option<IndicatorConfig>,
    rule: Option<BasicSignalRule>,
    adr_multiplier: Option<f64>,
    min_perf_since_ref_pct: Option<f64>,
}

impl ScanConfig {
    /// Load and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let file: ScanConfigFile = toml::from_str(content)?;
        let mut config = Self::default();

        if let Some(delay) = file.request_delay_ms {
            config.request_delay_ms = delay;
        }
        if let Some(patch) = file.daily {
            config.daily.apply(patch);
        }
        if let Some(patch) = file.weekly {
            config.weekly.apply(patch);
        }
        if let Some(screener) = file.screener {
            config.screener = screener;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.daily.validate()?;
        self.weekly.validate()
    }

    pub fn mode(&self, mode: ScanMode) -> &ModeConfig {
        match mode {
            ScanMode::Daily => &self.daily,
            ScanMode::Weekly => &self.weekly,
        }
    }

    /// BLAKE3 hash of the canonical JSON form. Two runs with the same
    /// fingerprint judged symbols identically.
    pub fn fingerprint(&self) -> Result<String, ConfigError> {
        let json = serde_json::to_vec(self)?;
        Ok(blake3::hash(&json).to_hex().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_per_mode() {
        let config = ScanConfig::default();
        assert_eq!(config.daily.interval, Interval::Daily);
        assert_eq!(config.daily.lookback_days, 300);
        assert_eq!(config.daily.signal.rule, BasicSignalRule::AdrMultiple);
        assert_eq!(config.weekly.interval, Interval::Weekly);
        assert_eq!(config.weekly.lookback_days, 365);
        assert_eq!(config.weekly.signal.rule, BasicSignalRule::AdrBounded);
        assert_eq!(config.request_delay_ms, 500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_file_is_default() {
        assert_eq!(ScanConfig::from_toml("").unwrap(), ScanConfig::default());
    }

    #[test]
    fn partial_weekly_keeps_weekly_defaults() {
        let config = ScanConfig::from_toml(
            r#"
            [weekly]
            lookback_days = 500

            [weekly.indicators]
            adr_long = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.weekly.lookback_days, 500);
        assert_eq!(config.weekly.signal.rule, BasicSignalRule::AdrBounded);
        assert_eq!(config.weekly.indicators.adr_long, 10);
        assert_eq!(config.weekly.indicators.fast_period, 10);
        assert_eq!(config.daily, ModeConfig::daily());
    }

    #[test]
    fn rule_and_screener_overrides() {
        let config = ScanConfig::from_toml(
            r#"
            request_delay_ms = 0

            [daily]
            rule = "adr_bounded"
            min_perf_since_ref_pct = 25.0

            [screener]
            min_market_cap = 1_000_000_000
            "#,
        )
        .unwrap();
        assert_eq!(config.request_delay_ms, 0);
        assert_eq!(config.daily.signal.rule, BasicSignalRule::AdrBounded);
        assert_eq!(config.daily.signal.min_perf_since_ref_pct, 25.0);
        assert_eq!(config.daily.signal.adr_multiplier, 1.5);
        assert_eq!(config.screener.min_market_cap, 1_000_000_000.0);
        assert_eq!(config.screener.range_limit, 5000);
    }

    #[test]
    fn zero_period_rejected() {
        let err = ScanConfig::from_toml("[daily.indicators]\nslow_period = 0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Engine {
                mode: ScanMode::Daily,
                source: EngineError::InvalidPeriod {
                    name: "slow_period",
                    ..
                }
            }
        ));
    }

    #[test]
    fn zero_lookback_rejected() {
        let err = ScanConfig::from_toml("[weekly]\nlookback_days = 0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::EmptyLookback {
                mode: ScanMode::Weekly
            }
        ));
    }

    #[test]
    fn unknown_key_rejected() {
        assert!(matches!(
            ScanConfig::from_toml("[daily]\nlookback = 10\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn fingerprint_is_deterministic_and_sensitive() {
        let a = ScanConfig::default();
        let mut b = ScanConfig::default();
        assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
        assert_eq!(a.fingerprint().unwrap().len(), 64);

        b.weekly.signal.adr_multiplier = 2.0;
        assert_ne!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
    }

    #[test]
    fn from_file_reports_missing_path() {
        let err = ScanConfig::from_file(Path::new("/nonexistent/breakout.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
