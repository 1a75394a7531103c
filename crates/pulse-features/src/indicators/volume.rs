//! Volume indicators.

use polars::prelude::*;

use super::window;

/// Rolling mean volume
pub fn volume_ma(volume: Expr, size: usize) -> Expr {
    volume.rolling_mean(window(size, size))
}

/// Ratio of two series; 0 where the denominator is 0, null where either side is
pub fn safe_ratio(numerator: Expr, denominator: Expr) -> Expr {
    when(
        denominator
            .clone()
            .eq(lit(0.0))
            .and(numerator.clone().is_not_null()),
    )
    .then(lit(0.0))
    .otherwise(numerator / denominator)
}

/// On-Balance Volume: cumulative volume signed by the close direction
pub fn obv(close: Expr, volume: Expr) -> Expr {
    let delta = close.clone() - close.shift(lit(1));
    when(delta.clone().gt(lit(0.0)))
        .then(volume.clone())
        .when(delta.lt(lit(0.0)))
        .then(-volume)
        .otherwise(lit(0.0))
        .fill_nan(lit(0.0))
        .fill_null(lit(0.0))
        .cum_sum(false)
}
