//! Finalization of a labeled panel built by the feature stages.

use chrono::{Days, NaiveDate};
use polars::prelude::*;
use pulse_features::frame::{self, date_to_day};
use pulse_features::{FeatureComposer, FeatureStage, IndicatorEngine, LabelGenerator, PipelineConfig};
use pulse_output::{DatasetFinalizer, DatasetSummary, OutputError, write_table};

fn labeled_panel(config: &PipelineConfig) -> DataFrame {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let (mut dates, mut assets, mut classes, mut close) = (vec![], vec![], vec![], vec![]);
    for (asset, class, n, phase) in [("BTC", "crypto", 130, 0.0), ("AAPL", "stock", 110, 1.3)] {
        // Reverse order so the finalizer has to sort
        for i in (0..n).rev() {
            dates.push(date_to_day(start + Days::new(i as u64)));
            assets.push(asset);
            classes.push(class);
            close.push(100.0 + (i as f64 / 6.0 + phase).sin() * 8.0 + i as f64 * 0.1);
        }
    }
    let volume: Vec<f64> = (0..close.len()).map(|i| 1_000.0 + (i % 7) as f64 * 50.0).collect();
    let prices = DataFrame::new(vec![
        Series::new("date".into(), dates)
            .cast(&DataType::Date)
            .unwrap()
            .into(),
        Series::new("asset".into(), assets).into(),
        Series::new("asset_type".into(), classes).into(),
        Series::new("open".into(), close.clone()).into(),
        Series::new("high".into(), close.clone()).into(),
        Series::new("low".into(), close.clone()).into(),
        Series::new("close".into(), close).into(),
        Series::new("volume".into(), volume).into(),
    ])
    .unwrap();

    let indicators = IndicatorEngine::with_config(config.indicators.clone())
        .apply(prices)
        .unwrap();
    let composed = FeatureComposer::new(config).apply(indicators).unwrap();
    LabelGenerator::with_config(config.labels.clone())
        .apply(composed)
        .unwrap()
}

#[test]
fn test_final_table_is_complete_and_ordered() {
    let config = PipelineConfig::default();
    let finalizer = DatasetFinalizer::new(&config);
    let out = finalizer.finalize(labeled_panel(&config)).unwrap();

    // Last 14 rows of each asset have no 14-day target
    assert_eq!(out.height(), (130 - 14) + (110 - 14));

    let names: Vec<&str> = out.get_column_names().into_iter().map(|c| c.as_str()).collect();
    assert_eq!(&names[..8], &[
        "date",
        "asset",
        "asset_type",
        "open",
        "high",
        "low",
        "close",
        "volume"
    ]);
    assert_eq!(names[names.len() - 6..], [
        "target_return_3d",
        "target_direction_3d",
        "target_return_7d",
        "target_direction_7d",
        "target_return_14d",
        "target_direction_14d",
    ]);
    assert!(names.contains(&"market_position"));

    let summary = DatasetSummary::from_table(&out, finalizer.catalog()).unwrap();
    assert_eq!(summary.missing_values, 0);
    assert_eq!(summary.class_rows("crypto"), 116);
    assert_eq!(summary.class_rows("stock"), 96);

    let assets = frame::str_values(&out, "asset").unwrap();
    let days = frame::date_days(&out).unwrap();
    assert_eq!(assets.first().map(String::as_str), Some("AAPL"));
    for i in 1..out.height() {
        if assets[i] == assets[i - 1] {
            assert!(days[i] > days[i - 1], "dates must increase within an asset");
        }
    }
}

#[test]
fn test_missing_target_column_is_rejected() {
    let config = PipelineConfig::default();
    let table = df! {
        "date" => [0i32],
        "asset" => ["BTC"],
        "asset_type" => ["crypto"],
        "close" => [1.0],
    }
    .unwrap();
    let err = DatasetFinalizer::new(&config).finalize(table).unwrap_err();
    assert!(matches!(err, OutputError::MissingColumn(c) if c == "target_return_3d"));
}

#[test]
fn test_export_round_trip() {
    let config = PipelineConfig::default();
    let mut out = DatasetFinalizer::new(&config)
        .finalize(labeled_panel(&config))
        .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("features_final.csv");
    write_table(&mut out, &path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let mut lines = text.lines();
    let header = lines.next().unwrap();
    assert!(header.starts_with("date,asset,asset_type,open"));
    assert_eq!(lines.count(), out.height());
}
