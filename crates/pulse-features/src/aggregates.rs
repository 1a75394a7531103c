//! Daily technical aggregates per asset class.
//!
//! One row per date with the mean RSI, daily return and volatility of each
//! class, plus market breadth (assets with a positive daily return).

use polars::prelude::*;
use pulse_data::AssetClass;
use tracing::info;

use crate::{Result, frame};

fn prefix(class: AssetClass) -> &'static str {
    match class {
        AssetClass::Crypto => "crypto",
        AssetClass::Stock => "stocks",
    }
}

fn class_exprs(class: AssetClass) -> Vec<Expr> {
    let in_class = || col("asset_type").eq(lit(class.as_str()));
    let p = prefix(class);
    let mean_of = |name: &str, alias: String| {
        col(name)
            .fill_nan(lit(NULL))
            .filter(in_class())
            .mean()
            .alias(alias)
    };
    vec![
        mean_of("rsi", format!("{p}_avg_rsi")),
        mean_of("returns_1d", format!("{p}_avg_returns_1d")),
        mean_of("volatility", format!("{p}_avg_volatility")),
        col("returns_1d")
            .fill_nan(lit(NULL))
            .gt(lit(0.0))
            .and(in_class())
            .cast(DataType::Int64)
            .sum()
            .alias(format!("{p}_positive_returns")),
    ]
}

/// Aggregate an indicator panel to one row per date
pub fn daily_aggregates(panel: &DataFrame) -> Result<DataFrame> {
    frame::require_columns(
        panel,
        "daily_aggregates",
        &["date", "asset_type", "rsi", "returns_1d", "volatility"],
    )?;

    let mut exprs = Vec::new();
    for class in AssetClass::all() {
        exprs.extend(class_exprs(class));
    }
    let out = panel
        .clone()
        .lazy()
        .group_by([col("date")])
        .agg(exprs)
        .sort(["date"], SortMultipleOptions::default())
        .collect()?;

    info!(days = out.height(), "computed daily technical aggregates");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_class_means_and_breadth() {
        let panel = df! {
            "date" => [2i32, 1, 1, 1],
            "asset_type" => ["crypto", "crypto", "crypto", "stock"],
            "rsi" => [50.0, 40.0, 60.0, 70.0],
            "returns_1d" => [-0.01, 0.02, f64::NAN, 0.01],
            "volatility" => [0.5, 0.4, 0.6, 0.2],
        }
        .unwrap();

        let out = daily_aggregates(&panel).unwrap();
        assert_eq!(out.height(), 2);

        let rsi = out.column("crypto_avg_rsi").unwrap().f64().unwrap().clone();
        assert_relative_eq!(rsi.get(0).unwrap(), 50.0);
        assert_relative_eq!(rsi.get(1).unwrap(), 50.0);

        let returns = out
            .column("crypto_avg_returns_1d")
            .unwrap()
            .f64()
            .unwrap()
            .clone();
        assert_relative_eq!(returns.get(0).unwrap(), 0.02);

        let breadth = out
            .column("crypto_positive_returns")
            .unwrap()
            .i64()
            .unwrap()
            .clone();
        assert_eq!(breadth.get(0), Some(1));
        assert_eq!(breadth.get(1), Some(0));

        let stocks = out.column("stocks_avg_rsi").unwrap().f64().unwrap().clone();
        assert_relative_eq!(stocks.get(0).unwrap(), 70.0);
        assert_eq!(stocks.get(1), None);
    }
}
