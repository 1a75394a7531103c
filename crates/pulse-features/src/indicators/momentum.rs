//! Momentum indicators: RSI, backward returns and price momentum.
//!
//! Builders take the close expression and return an un-partitioned
//! expression; the engine evaluates them `.over` each asset.

use polars::prelude::*;

use super::window;

/// Relative Strength Index.
///
/// Average gain over average loss of daily deltas in a trailing window of
/// `period` rows, the first delta counting as zero. Null for the first
/// `period - 1` rows. A window without losses gives 100.
pub fn rsi(close: Expr, period: usize) -> Expr {
    let delta = (close.clone() - close.shift(lit(1))).fill_null(lit(0.0));
    let gain = when(delta.clone().gt(lit(0.0)))
        .then(delta.clone())
        .otherwise(lit(0.0));
    let loss = when(delta.clone().lt(lit(0.0)))
        .then(-delta)
        .otherwise(lit(0.0));

    let avg_gain = gain.rolling_mean(window(period, period));
    let avg_loss = loss.rolling_mean(window(period, period));
    when(avg_loss.clone().eq(lit(0.0)))
        .then(lit(100.0))
        .otherwise(lit(100.0) - lit(100.0) / (lit(1.0) + avg_gain / avg_loss))
}

/// Backward percentage return over `days` rows
pub fn returns(close: Expr, days: usize) -> Expr {
    close.clone() / close.shift(lit(days as i64)) - lit(1.0)
}

/// Price difference with `days` rows earlier
pub fn momentum(close: Expr, days: usize) -> Expr {
    close.clone() - close.shift(lit(days as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn eval(close: &[f64], expr: Expr) -> Vec<Option<f64>> {
        let df = df! { "close" => close }.unwrap();
        let out = df.lazy().select([expr.alias("out")]).collect().unwrap();
        out.column("out").unwrap().f64().unwrap().into_iter().collect()
    }

    #[test]
    fn test_rsi_warm_up_and_bounds() {
        let close: Vec<f64> = (0..60)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0)
            .collect();
        let out = eval(&close, rsi(col("close"), 14));
        assert!(out[..13].iter().all(Option::is_none));
        assert!(
            out[13..]
                .iter()
                .all(|v| v.is_some_and(|v| (0.0..=100.0).contains(&v)))
        );
    }

    #[test]
    fn test_rsi_without_losses_is_100() {
        let rising: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        assert_relative_eq!(eval(&rising, rsi(col("close"), 14))[19].unwrap(), 100.0);
        let flat = vec![100.0; 20];
        assert_relative_eq!(eval(&flat, rsi(col("close"), 14))[13].unwrap(), 100.0);
    }

    #[test]
    fn test_rsi_balanced_moves() {
        let close: Vec<f64> = (0..15)
            .map(|i| if i % 2 == 0 { 100.0 } else { 101.0 })
            .collect();
        // 7 gains and 7 losses of 1.0 in the last 14 deltas
        assert_relative_eq!(
            eval(&close, rsi(col("close"), 14))[14].unwrap(),
            50.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_returns_and_momentum() {
        let close = [100.0, 110.0, 121.0];
        assert_relative_eq!(
            eval(&close, returns(col("close"), 1))[2].unwrap(),
            0.1,
            epsilon = 1e-12
        );
        let diff = eval(&close, momentum(col("close"), 2));
        assert_relative_eq!(diff[2].unwrap(), 21.0);
        assert_eq!(diff[1], None);
    }
}
