//! Features that compare a row against other rows of the panel.

use polars::prelude::*;

use super::LagColumns;
use crate::Result;
use crate::config::EngineeredConfig;

/// Weekly return minus the mean of its (date, asset class) peers
pub const RELATIVE_RETURN: &str = "return_7d_relative";
/// Sentiment above the upper panel quantile
pub const EXTREME_POSITIVE: &str = "sentiment_extreme_positive";
/// Sentiment below the lower panel quantile
pub const EXTREME_NEGATIVE: &str = "sentiment_extreme_negative";
/// Stress above the upper panel quantile
pub const STRESS_HIGH: &str = "sentiment_stress_high";

/// Cross-sectional column names, in output order
pub fn column_names() -> Vec<String> {
    [RELATIVE_RETURN, EXTREME_POSITIVE, EXTREME_NEGATIVE, STRESS_HIGH]
        .map(String::from)
        .to_vec()
}

fn clean(name: &str) -> Expr {
    col(name).fill_nan(lit(NULL))
}

fn flag(condition: Expr, name: &str) -> Expr {
    condition.cast(DataType::Int32).fill_null(lit(0)).alias(name)
}

/// Add peer-relative return and panel-quantile sentiment flags
pub fn add_cross_sectional(
    frame: DataFrame,
    columns: &LagColumns,
    config: &EngineeredConfig,
) -> Result<DataFrame> {
    let upper = lit(config.extreme_upper_quantile);
    let lower = lit(config.extreme_lower_quantile);
    let sentiment = || clean(&columns.sentiment_mean);
    let stress = clean(&columns.stress_index);

    Ok(frame
        .lazy()
        .with_columns([
            (clean("returns_7d")
                - clean("returns_7d")
                    .mean()
                    .over([col("date"), col("asset_type")]))
            .alias(RELATIVE_RETURN),
            flag(
                sentiment().gt(sentiment().quantile(upper.clone(), QuantileMethod::Linear)),
                EXTREME_POSITIVE,
            ),
            flag(
                sentiment().lt(sentiment().quantile(lower, QuantileMethod::Linear)),
                EXTREME_NEGATIVE,
            ),
            flag(
                stress
                    .clone()
                    .gt(stress.quantile(upper, QuantileMethod::Linear)),
                STRESS_HIGH,
            ),
        ])
        .collect()?)
}
