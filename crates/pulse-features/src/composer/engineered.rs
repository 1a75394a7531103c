//! Second-order features derived from indicator and lag-window columns.
//!
//! Row-wise features combine columns of the same row. Temporal features
//! (pct-changes, rolling windows, lags) are evaluated `.over` each asset.
//! Inputs have `NaN` mapped to null and comparisons on null are false, so
//! flags are 0 during warm-up rather than missing.

use polars::prelude::*;

use super::{LagColumns, TRENDS_CURRENT};
use crate::Result;
use crate::config::PipelineConfig;
use crate::indicators::volume::safe_ratio;
use crate::indicators::{CROSSOVER_COLUMN, window};

/// RSI bucket label column
pub const MARKET_POSITION: &str = "market_position";

fn clean(name: &str) -> Expr {
    col(name).cast(DataType::Float64).fill_nan(lit(NULL))
}

fn flag(condition: Expr) -> Expr {
    condition.fill_null(lit(false)).cast(DataType::Int32)
}

fn per_asset(expr: Expr) -> Expr {
    expr.over([col("asset")])
}

fn lag(expr: Expr, periods: usize) -> Expr {
    per_asset(expr.shift(lit(periods as i64)))
}

/// RSI bucket: (0, low] oversold, (low, high] neutral, (high, 100] overbought,
/// null otherwise
pub fn market_position(rsi: Expr, low: f64, high: f64) -> Expr {
    when(rsi.clone().gt(lit(0.0)).and(rsi.clone().lt_eq(lit(low))))
        .then(lit("oversold"))
        .when(rsi.clone().gt(lit(low)).and(rsi.clone().lt_eq(lit(high))))
        .then(lit("neutral"))
        .when(rsi.clone().gt(lit(high)).and(rsi.lt_eq(lit(100.0))))
        .then(lit("overbought"))
        .otherwise(lit(NULL).cast(DataType::String))
}

/// Engineered columns as named expressions, in output order
fn exprs(columns: &LagColumns, config: &PipelineConfig) -> Vec<(String, Expr)> {
    let eng = &config.engineered;
    let ind = &config.indicators;
    let close = || clean("close");
    let volume = || clean("volume");
    let rsi = || clean("rsi");
    let volatility = || clean("volatility");
    let returns_1d = || clean("returns_1d");
    let returns_7d = || clean("returns_7d");
    let volume_ratio = || clean("volume_ratio");
    let bb_position = || clean("bb_position");
    let bb_width = || clean("bb_width");
    let sentiment = || clean(&columns.sentiment_mean);
    let trends = || clean(&columns.trends_mean);
    let mut out: Vec<(String, Expr)> = Vec::new();

    // Interactions
    out.push(("sentiment_rsi_interaction".into(), sentiment() * rsi()));
    out.push((
        "sentiment_volatility_interaction".into(),
        sentiment() * volatility(),
    ));
    out.push((
        "trends_rsi_interaction".into(),
        trends() / lit(100.0) * rsi(),
    ));
    out.push((
        "trends_volatility_interaction".into(),
        trends() / lit(100.0) * volatility(),
    ));
    out.push((
        "trends_momentum_interaction".into(),
        clean(&columns.trends_trend) * returns_7d(),
    ));
    out.push((
        "trends_sentiment_combined".into(),
        trends() / lit(100.0) * sentiment(),
    ));

    // Multi-horizon momentum and realized volatility
    for &h in &eng.momentum_horizons {
        out.push((
            format!("momentum_{h}d"),
            per_asset(close() / close().shift(lit(h as i64)) - lit(1.0)),
        ));
    }
    let realized = |size: usize| {
        per_asset(returns_1d().rolling_std(window(size, 1))).fill_nan(lit(NULL))
    };
    let vol_short = realized(eng.short_vol_window);
    let vol_long = realized(eng.long_vol_window);
    out.push((format!("volatility_{}d", eng.short_vol_window), vol_short.clone()));
    out.push((format!("volatility_{}d", eng.long_vol_window), vol_long.clone()));
    out.push(("volatility_regime".into(), flag(vol_short.gt(vol_long))));

    for ma in [ind.ma_short, ind.ma_medium] {
        let level = clean(&format!("ma_{ma}"));
        out.push((
            format!("price_to_ma{ma}"),
            (close() - level.clone()) / (level + lit(eng.ma_epsilon)),
        ));
    }

    out.push((
        format!("rsi_change_{}d", eng.rsi_change_days),
        rsi() - lag(rsi(), eng.rsi_change_days),
    ));
    out.push((
        "rsi_ma".into(),
        per_asset(rsi().rolling_mean(window(eng.rsi_ma_window, 1))),
    ));

    let trends_current = clean(TRENDS_CURRENT);
    out.push((
        "trends_spike".into(),
        flag(trends_current.gt(trends() * lit(eng.search_spike))),
    ));
    out.push((
        "volume_surge".into(),
        flag(volume_ratio().gt(lit(eng.volume_surge))),
    ));
    out.push((
        "volume_trend".into(),
        per_asset(safe_ratio(
            volume().rolling_mean(window(eng.short_vol_window, 1)),
            volume().rolling_mean(window(eng.long_vol_window, 1)),
        )),
    ));

    let returns_positive = flag(returns_1d().gt(lit(0.0)));
    out.push(("returns_positive".into(), returns_positive.clone()));
    out.push((
        format!("trend_days_{}d", eng.trend_window),
        per_asset(
            returns_positive
                .cast(DataType::Float64)
                .rolling_sum(window(eng.trend_window, 1)),
        ),
    ));

    // Ratios
    let eps = lit(eng.volatility_epsilon);
    out.push((
        "volume_to_volatility".into(),
        volume_ratio() / (volatility() + eps.clone()),
    ));
    out.push((
        "trend_strength".into(),
        returns_7d().abs() / (volatility() + eps),
    ));

    // RSI regimes
    let rsi_prev = lag(rsi(), 1);
    out.push((
        "rsi_extreme_oversold".into(),
        flag(rsi().lt(lit(eng.rsi_extreme_low))),
    ));
    out.push((
        "rsi_extreme_overbought".into(),
        flag(rsi().gt(lit(eng.rsi_extreme_high))),
    ));
    out.push((
        "rsi_recovery".into(),
        flag(
            rsi()
                .gt(lit(eng.rsi_oversold))
                .and(rsi_prev.clone().lt(lit(eng.rsi_oversold))),
        ),
    ));
    out.push((
        "rsi_breakdown".into(),
        flag(
            rsi()
                .lt(lit(eng.rsi_overbought))
                .and(rsi_prev.clone().gt(lit(eng.rsi_overbought))),
        ),
    ));

    // Volume spikes
    for &multiple in &eng.volume_spikes {
        out.push((
            format!("volume_spike_{multiple}x"),
            flag(volume_ratio().gt(lit(multiple))),
        ));
    }
    let surge = || volume_ratio().gt(lit(eng.volume_surge));
    out.push((
        "volume_with_price_up".into(),
        flag(surge().and(returns_1d().gt(lit(0.0)))),
    ));
    out.push((
        "volume_with_price_down".into(),
        flag(surge().and(returns_1d().lt(lit(0.0)))),
    ));

    // Bollinger
    let squeeze_level = per_asset(bb_width().rolling_quantile(
        QuantileMethod::Linear,
        eng.squeeze_quantile,
        window(eng.squeeze_window, 1),
    ));
    out.push((
        "bb_lower_touch".into(),
        flag(bb_position().lt(lit(eng.bb_lower_touch))),
    ));
    out.push((
        "bb_upper_touch".into(),
        flag(bb_position().gt(lit(eng.bb_upper_touch))),
    ));
    out.push((
        "bb_squeeze_extreme".into(),
        flag(bb_width().lt(squeeze_level)),
    ));

    // Lags
    for &k in &eng.return_lags {
        out.push((format!("returns_1d_lag{k}"), lag(returns_1d(), k)));
    }
    out.push(("volatility_lag1".into(), lag(volatility(), 1)));
    out.push(("rsi_lag1".into(), rsi_prev));

    // Composite signals
    out.push((
        "momentum_divergence".into(),
        flag(
            returns_7d()
                .gt(lit(0.0))
                .and(clean("momentum_7d").lt(lit(0.0))),
        ),
    ));
    out.push((
        "bullish_confluence".into(),
        flag(
            rsi()
                .lt(lit(eng.confluence_rsi_low))
                .and(bb_position().lt(lit(eng.confluence_bb_low)))
                .and(returns_7d().lt(lit(-eng.confluence_return))),
        ),
    ));
    out.push((
        "bearish_confluence".into(),
        flag(
            rsi()
                .gt(lit(eng.confluence_rsi_high))
                .and(bb_position().gt(lit(eng.confluence_bb_high)))
                .and(returns_7d().gt(lit(eng.confluence_return))),
        ),
    ));

    let votes = flag(rsi().gt(lit(50.0)))
        + flag(clean("macd").gt(lit(0.0)))
        + flag(clean(CROSSOVER_COLUMN).eq(lit(1.0)));
    out.push((
        "momentum_score".into(),
        votes.cast(DataType::Float64) / lit(3.0),
    ));

    let position = market_position(rsi(), eng.rsi_oversold, eng.rsi_overbought);
    out.push((
        "is_oversold".into(),
        flag(position.clone().eq(lit("oversold"))),
    ));
    out.push((
        "is_overbought".into(),
        flag(position.clone().eq(lit("overbought"))),
    ));
    out.push((MARKET_POSITION.into(), position));
    out
}

/// Engineered column names, in output order
pub fn column_names(config: &PipelineConfig) -> Vec<String> {
    let columns = LagColumns::new(&config.lag_window);
    exprs(&columns, config)
        .into_iter()
        .map(|(name, _)| name)
        .collect()
}

/// Add every engineered column to a panel sorted by (asset, date)
pub fn add_engineered(
    frame: DataFrame,
    columns: &LagColumns,
    config: &PipelineConfig,
) -> Result<DataFrame> {
    let exprs: Vec<Expr> = exprs(columns, config)
        .into_iter()
        .map(|(name, expr)| expr.alias(name))
        .collect();
    Ok(frame.lazy().with_columns(exprs).collect()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LagWindowConfig;
    use approx::assert_relative_eq;

    fn columns() -> LagColumns {
        LagColumns::new(&LagWindowConfig::default())
    }

    /// One asset per entry of `assets`, every input at a neutral level
    fn panel(assets: &[&str]) -> DataFrame {
        let n = assets.len();
        let c = columns();
        let series = |name: &str, v: f64| -> Column { Series::new(name.into(), vec![v; n]).into() };
        DataFrame::new(vec![
            Series::new("asset".into(), assets.to_vec()).into(),
            Series::new(
                "close".into(),
                (0..n).map(|i| 100.0 + i as f64).collect::<Vec<f64>>(),
            )
            .into(),
            series("volume", 1000.0),
            series("rsi", 50.0),
            series("macd", 0.0),
            series("bb_position", 0.5),
            series("bb_width", 0.1),
            series("volatility", 0.2),
            series("returns_1d", 0.01),
            series("returns_7d", 0.07),
            series("momentum_7d", 7.0),
            series("volume_ratio", 1.0),
            series("ma_7", 100.0),
            series("ma_30", 100.0),
            Series::new(CROSSOVER_COLUMN.into(), vec![0i32; n]).into(),
            series(&c.sentiment_mean, 0.0),
            series(&c.trends_mean, 50.0),
            series(&c.trends_trend, 0.0),
            series(TRENDS_CURRENT, 50.0),
        ])
        .unwrap()
    }

    fn with(mut df: DataFrame, name: &str, values: Vec<f64>) -> DataFrame {
        df.with_column(Series::new(name.into(), values)).unwrap();
        df
    }

    fn run(df: DataFrame) -> DataFrame {
        add_engineered(df, &columns(), &PipelineConfig::default()).unwrap()
    }

    fn flags(df: &DataFrame, name: &str) -> Vec<i32> {
        df.column(name)
            .unwrap()
            .i32()
            .unwrap()
            .into_iter()
            .map(|v| v.unwrap())
            .collect()
    }

    fn floats(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
        df.column(name).unwrap().f64().unwrap().into_iter().collect()
    }

    #[test]
    fn test_names_match_computed_columns() {
        let config = PipelineConfig::default();
        let names = column_names(&config);
        for expected in [
            "momentum_3d",
            "volatility_7d",
            "volatility_30d",
            "price_to_ma7",
            "price_to_ma30",
            "rsi_change_3d",
            "trend_days_7d",
            "volume_spike_2x",
            "volume_spike_3x",
            "returns_1d_lag3",
            "market_position",
        ] {
            assert!(names.iter().any(|n| n == expected), "missing {expected}");
        }
        let input = panel(&["A"; 10]);
        let width = input.width();
        let out = run(input);
        assert_eq!(out.width(), width + names.len());
    }

    #[test]
    fn test_confluence_thresholds() {
        let df = panel(&["A", "A"]);
        let df = with(df, "rsi", vec![30.0, 35.0]);
        let df = with(df, "bb_position", vec![0.1, 0.1]);
        let df = with(df, "returns_7d", vec![-0.06, -0.06]);
        let out = run(df);
        assert_eq!(flags(&out, "bullish_confluence"), vec![1, 0]);
        assert_eq!(flags(&out, "bearish_confluence"), vec![0, 0]);
    }

    #[test]
    fn test_momentum_score() {
        let mut df = panel(&["A", "A", "A"]);
        df.with_column(Series::new(CROSSOVER_COLUMN.into(), vec![1i32, 1, 0]))
            .unwrap();
        let df = with(df, "rsi", vec![60.0, 60.0, 40.0]);
        let df = with(df, "macd", vec![1.0, -1.0, -1.0]);
        let score = floats(&run(df), "momentum_score");
        assert_relative_eq!(score[0].unwrap(), 1.0);
        assert_relative_eq!(score[1].unwrap(), 2.0 / 3.0);
        assert_relative_eq!(score[2].unwrap(), 0.0);
    }

    #[test]
    fn test_market_position_buckets() {
        let df = with(
            panel(&["A"; 7]),
            "rsi",
            vec![0.0, 30.0, 30.1, 70.0, 100.0, f64::NAN, 25.0],
        );
        let out = run(df);
        let position: Vec<Option<&str>> = out
            .column(MARKET_POSITION)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(
            position,
            vec![
                None,
                Some("oversold"),
                Some("neutral"),
                Some("neutral"),
                Some("overbought"),
                None,
                Some("oversold"),
            ]
        );
        assert_eq!(flags(&out, "is_oversold"), vec![0, 1, 0, 0, 0, 0, 1]);
        assert_eq!(flags(&out, "is_overbought"), vec![0, 0, 0, 0, 1, 0, 0]);
    }

    #[test]
    fn test_rsi_recovery_uses_previous_row_of_same_asset() {
        let df = with(
            panel(&["A", "A", "B", "B"]),
            "rsi",
            vec![25.0, 35.0, 25.0, 35.0],
        );
        let out = run(df);
        assert_eq!(flags(&out, "rsi_recovery"), vec![0, 1, 0, 1]);
        let lag = floats(&out, "rsi_lag1");
        assert_eq!(lag[2], None);
        assert_eq!(lag[3], Some(25.0));
    }

    #[test]
    fn test_rolling_features_restart_per_asset() {
        let df = with(
            panel(&["A", "A", "A", "B", "B"]),
            "returns_1d",
            vec![0.01, 0.01, 0.01, -0.02, 0.03],
        );
        let out = run(df);
        let trend_days = floats(&out, "trend_days_7d");
        assert_eq!(trend_days[2], Some(3.0));
        assert_eq!(trend_days[3], Some(0.0));
        assert_eq!(trend_days[4], Some(1.0));
        assert_eq!(floats(&out, "momentum_3d")[3], None);
    }

    #[test]
    fn test_empty_windows_leave_neutral_interactions() {
        let out = run(panel(&["A"; 5]));
        assert!(
            floats(&out, "sentiment_rsi_interaction")
                .iter()
                .all(|v| *v == Some(0.0))
        );
        assert!(
            floats(&out, "trends_rsi_interaction")
                .iter()
                .all(|v| *v == Some(25.0))
        );
        assert!(flags(&out, "trends_spike").iter().all(|v| *v == 0));
    }
}
