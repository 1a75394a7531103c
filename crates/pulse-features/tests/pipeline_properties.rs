//! End-to-end properties of the feature stages on synthetic panels.

use approx::assert_abs_diff_eq;
use chrono::{Days, NaiveDate};
use polars::prelude::*;
use pulse_features::frame::{self, date_to_day};
use pulse_features::{
    FeatureComposer, FeatureStage, IndicatorEngine, LabelGenerator, PipelineConfig,
    TimeSeriesAligner,
};

fn panel(assets: &[(&str, &str, usize)], price: impl Fn(usize) -> f64) -> DataFrame {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let (mut dates, mut names, mut classes, mut close) = (vec![], vec![], vec![], vec![]);
    for (asset, class, n) in assets {
        for i in 0..*n {
            dates.push(date_to_day(start + Days::new(i as u64)));
            names.push(asset.to_string());
            classes.push(class.to_string());
            close.push(price(i));
        }
    }
    let volume = vec![1_000.0; close.len()];
    DataFrame::new(vec![
        Series::new("date".into(), dates)
            .cast(&DataType::Date)
            .unwrap()
            .into(),
        Series::new("asset".into(), names).into(),
        Series::new("asset_type".into(), classes).into(),
        Series::new("open".into(), close.clone()).into(),
        Series::new("high".into(), close.clone()).into(),
        Series::new("low".into(), close.clone()).into(),
        Series::new("close".into(), close).into(),
        Series::new("volume".into(), volume).into(),
    ])
    .unwrap()
}

fn wavy(i: usize) -> f64 {
    100.0 + (i as f64 / 4.0).sin() * 5.0 + i as f64 * 0.05
}

#[test]
fn test_rsi_warmup_and_bounds() {
    let out = IndicatorEngine::default()
        .apply(panel(&[("BTC", "crypto", 150)], wavy))
        .unwrap();
    assert_eq!(out.height(), 150);

    let rsi = frame::float_values(&out, "rsi").unwrap();
    assert!(rsi[..13].iter().all(|v| v.is_nan()));
    assert!(rsi[13..].iter().all(|v| (0.0..=100.0).contains(v)));
}

#[test]
fn test_short_asset_never_reaches_indicators() {
    let aligned = TimeSeriesAligner::default()
        .align(vec![panel(
            &[("AAPL", "stock", 120), ("NEW", "stock", 50)],
            wavy,
        )])
        .unwrap();
    assert_eq!(aligned.dropped.len(), 1);
    assert_eq!(aligned.dropped[0].asset, "NEW");

    let out = IndicatorEngine::default().apply(aligned.frame).unwrap();
    let assets = frame::str_values(&out, "asset").unwrap();
    assert!(assets.iter().all(|a| a == "AAPL"));
}

#[test]
fn test_empty_lag_windows_use_neutral_levels() {
    let config = PipelineConfig::default();
    let indicators = IndicatorEngine::default()
        .apply(panel(&[("ETH", "crypto", 110)], wavy))
        .unwrap();
    let out = FeatureComposer::new(&config).apply(indicators).unwrap();

    let sentiment = frame::float_values(&out, "sentiment_mean_7d").unwrap();
    let trends = frame::float_values(&out, "trends_interest_mean_7d").unwrap();
    assert!(sentiment.iter().all(|v| *v == 0.0));
    assert!(trends.iter().all(|v| *v == 50.0));
    let days = frame::float_values(&out, "sentiment_days_7d").unwrap();
    assert!(days.iter().all(|v| *v == 0.0));
}

#[test]
fn test_composer_is_deterministic() {
    let config = PipelineConfig::default();
    let input = IndicatorEngine::default()
        .apply(panel(&[("BTC", "crypto", 120), ("MSFT", "stock", 120)], wavy))
        .unwrap();
    let composer = FeatureComposer::new(&config);
    let first = composer.apply(input.clone()).unwrap();
    let second = composer.apply(input).unwrap();

    assert_eq!(first.get_column_names(), second.get_column_names());
    for column in first.get_columns() {
        let name = column.name().as_str();
        // NaN != NaN, so compare the textual rendering
        let a = column.cast(&DataType::String).unwrap();
        let b = second.column(name).unwrap().cast(&DataType::String).unwrap();
        assert!(
            a.as_materialized_series()
                .equals_missing(b.as_materialized_series()),
            "column {name} differs"
        );
    }
}

#[test]
fn test_constant_price_series() {
    let config = PipelineConfig::default();
    let input = panel(&[("FLAT", "stock", 120)], |_| 100.0);
    let indicators = IndicatorEngine::default().apply(input).unwrap();
    let composed = FeatureComposer::new(&config).apply(indicators).unwrap();
    let out = LabelGenerator::default().apply(composed).unwrap();

    let rsi = frame::float_values(&out, "rsi").unwrap();
    assert!(rsi[13..].iter().all(|v| *v == 100.0));

    let volatility = frame::float_values(&out, "volatility").unwrap();
    assert!(volatility[20..].iter().all(|v| *v == 0.0));

    let width = frame::float_values(&out, "bb_width").unwrap();
    for v in &width[19..] {
        assert_abs_diff_eq!(*v, 0.0, epsilon = 1e-12);
    }

    for name in ["momentum_7d", "momentum_30d"] {
        let momentum = frame::float_values(&out, name).unwrap();
        let defined: Vec<f64> = momentum.into_iter().filter(|v| !v.is_nan()).collect();
        assert!(!defined.is_empty());
        assert!(defined.iter().all(|v| *v == 0.0), "{name}");
    }

    let direction = out.column("target_direction_3d").unwrap().i32().unwrap();
    let defined: Vec<i32> = direction.into_iter().flatten().collect();
    assert_eq!(defined.len(), 117);
    assert!(defined.iter().all(|d| *d == 0));
}

#[test]
fn test_forward_returns_match_closes() {
    let out = LabelGenerator::default()
        .apply(panel(&[("BTC", "crypto", 40)], wavy))
        .unwrap();
    let close = frame::float_values(&out, "close").unwrap();
    let ret = frame::float_values(&out, "target_return_7d").unwrap();
    for t in 0..33 {
        assert_abs_diff_eq!(ret[t], close[t + 7] / close[t] - 1.0, epsilon = 1e-9);
    }
    assert!(ret[33..].iter().all(|v| v.is_nan()));
}
