//! Look-ahead contamination tests for the indicators and the signal engine.
//!
//! Invariant: no value at bar t may depend on price data from bar t+1 or later.
//!
//! Method: compute on a truncated series (bars 0..100) and the full series
//! (bars 0..200). Assert bars 0..100 are identical between both runs. Any
//! difference means future data is leaking into past values.
//!
//! The signal engine has one documented exception: before the first bearish
//! bar the reference price depends on whether a bearish bar exists anywhere.
//! The signal test therefore uses a prefix that already contains a bearish bar.

use breakout_core::domain::{Bar, Series};
use breakout_core::engine::{IndicatorConfig, IndicatorFrame, SignalConfig, SignalEngine};
use breakout_core::indicators::{AdrPct, Ema, Indicator, PriceField, Sma};
use chrono::NaiveDate;

/// Two full sine cycles with a drift, so the fast EMA crosses under the slow
/// one well inside the first 100 bars.
fn make_test_bars(n: usize) -> Vec<Bar> {
    let base_date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    (0..n)
        .map(|i| {
            let t = i as f64;
            let close = 100.0 + 20.0 * (t * 0.1).sin() + t * 0.15;
            let open = close - 0.4 * (t * 0.7).cos();
            Bar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0 + (t * 0.3).sin().abs(),
                low: open.min(close) - 1.0,
                close,
                volume: 1_000 + ((i * 7919) % 900) as u64,
            }
        })
        .collect()
}

fn same(a: f64, b: f64) -> bool {
    (a.is_nan() && b.is_nan()) || a == b
}

fn assert_no_lookahead(indicator: &dyn Indicator, full_bars: &[Bar], truncated_len: usize) {
    let truncated = &full_bars[..truncated_len];
    let full_result = indicator.compute(full_bars);
    let truncated_result = indicator.compute(truncated);

    assert_eq!(truncated_result.len(), truncated_len, "{}", indicator.name());
    assert_eq!(full_result.len(), full_bars.len(), "{}", indicator.name());

    for i in 0..truncated_len {
        assert!(
            same(truncated_result[i], full_result[i]),
            "{}: look-ahead at bar {i}: truncated={}, full={}",
            indicator.name(),
            truncated_result[i],
            full_result[i]
        );
    }
}

#[test]
fn indicators_have_no_lookahead() {
    let bars = make_test_bars(200);
    let indicators: Vec<Box<dyn Indicator>> = vec![
        Box::new(Sma::new(50)),
        Box::new(Sma::of(PriceField::Volume, 20)),
        Box::new(Ema::new(10)),
        Box::new(Ema::new(20)),
        Box::new(AdrPct::new(20)),
        Box::new(AdrPct::new(5)),
    ];
    for indicator in &indicators {
        assert_no_lookahead(indicator.as_ref(), &bars, 100);
    }
}

#[test]
fn frame_columns_have_no_lookahead() {
    let full = Series::new("TEST", make_test_bars(200)).unwrap();
    let truncated = full.truncated(100).unwrap();
    let config = IndicatorConfig::default();

    let full_frame = IndicatorFrame::compute(&full, &config).unwrap();
    let short_frame = IndicatorFrame::compute(&truncated, &config).unwrap();

    for t in 0..100 {
        assert!(same(full_frame.ema_fast[t], short_frame.ema_fast[t]), "ema_fast at {t}");
        assert!(same(full_frame.ema_slow[t], short_frame.ema_slow[t]), "ema_slow at {t}");
        assert!(same(full_frame.adr_long_pct[t], short_frame.adr_long_pct[t]), "adr_long at {t}");
        assert!(same(full_frame.adr_short_pct[t], short_frame.adr_short_pct[t]), "adr_short at {t}");
        assert!(same(full_frame.volume_sma[t], short_frame.volume_sma[t]), "volume_sma at {t}");
        assert!(same(
            full_frame.price_vs_ema_fast_pct[t],
            short_frame.price_vs_ema_fast_pct[t]
        ));
        assert_eq!(full_frame.low_volume[t], short_frame.low_volume[t], "low_volume at {t}");
        assert_eq!(full_frame.ema_fast_rising[t], short_frame.ema_fast_rising[t]);
        assert_eq!(full_frame.ema_slow_rising[t], short_frame.ema_slow_rising[t]);
    }
}

#[test]
fn signal_rows_have_no_lookahead() {
    let full = Series::new("TEST", make_test_bars(200)).unwrap();
    let truncated = full.truncated(100).unwrap();
    let config = IndicatorConfig::default();
    let engine = SignalEngine::new(SignalConfig::default()).unwrap();

    let full_rows = engine.evaluate(&IndicatorFrame::compute(&full, &config).unwrap());
    let short_rows = engine.evaluate(&IndicatorFrame::compute(&truncated, &config).unwrap());

    assert!(
        short_rows.rows().iter().any(|r| r.bearish),
        "fixture must contain a bearish bar in the prefix"
    );
    assert_eq!(&full_rows.rows()[..100], short_rows.rows());
}

#[test]
fn verdict_on_prefix_matches_row_in_full_run() {
    let full = Series::new("TEST", make_test_bars(200)).unwrap();
    let config = IndicatorConfig::default();
    let engine = SignalEngine::new(SignalConfig::default()).unwrap();
    let full_rows = engine.evaluate(&IndicatorFrame::compute(&full, &config).unwrap());

    for len in [60, 90, 120, 200] {
        let prefix = full.truncated(len).unwrap();
        let verdict = engine.verdict(&IndicatorFrame::compute(&prefix, &config).unwrap());
        let rows = full_rows.rows();
        assert_eq!(verdict.candidate, rows[len - 1].green, "len {len}");
        assert_eq!(
            verdict.is_new,
            rows[len - 1].green && !rows[len - 2].green,
            "len {len}"
        );
    }
}
