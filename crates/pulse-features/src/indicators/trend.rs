//! Trend indicators: MACD, moving averages and their crossover.

use polars::prelude::*;

use super::window;

/// MACD line, signal line and histogram
#[derive(Debug, Clone)]
pub struct Macd {
    /// Fast EMA minus slow EMA
    pub line: Expr,
    /// EMA of the line
    pub signal: Expr,
    /// Line minus signal
    pub histogram: Expr,
}

/// Exponential moving average with `alpha = 2 / (span + 1)`, seeded with the
/// first observation so there is no warm-up
pub fn ema(values: Expr, span: usize) -> Expr {
    values.ewm_mean(EWMOptions {
        alpha: 2.0 / (span as f64 + 1.0),
        adjust: false,
        bias: false,
        min_periods: 1,
        ignore_nulls: true,
    })
}

/// Moving Average Convergence Divergence
pub fn macd(close: Expr, fast: usize, slow: usize, signal: usize) -> Macd {
    let line = ema(close.clone(), fast) - ema(close, slow);
    let signal = ema(line.clone(), signal);
    let histogram = line.clone() - signal.clone();
    Macd {
        line,
        signal,
        histogram,
    }
}

/// Simple moving average, null until the window is full
pub fn moving_average(close: Expr, size: usize) -> Expr {
    close.rolling_mean(window(size, size))
}

/// 1 when the short average is above the medium one, else 0
pub fn crossover(short: Expr, medium: Expr) -> Expr {
    short
        .gt(medium)
        .fill_null(lit(false))
        .cast(DataType::Int32)
}

/// Percentage distance of the close from a moving average
pub fn distance_from_ma(close: Expr, ma: Expr) -> Expr {
    (close / ma - lit(1.0)) * lit(100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn frame(close: &[f64]) -> LazyFrame {
        df! { "close" => close }.unwrap().lazy()
    }

    fn floats(df: &DataFrame, name: &str) -> Vec<f64> {
        df.column(name)
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect()
    }

    #[test]
    fn test_ema_seeded_from_first() {
        let out = frame(&[10.0, 20.0, 20.0])
            .select([ema(col("close"), 3).alias("ema")])
            .collect()
            .unwrap();
        let ema = floats(&out, "ema");
        assert_relative_eq!(ema[0], 10.0);
        assert_relative_eq!(ema[1], 15.0);
        assert_relative_eq!(ema[2], 17.5);
    }

    #[test]
    fn test_macd_flat_series_is_zero() {
        let m = macd(col("close"), 12, 26, 9);
        let out = frame(&[50.0; 40])
            .select([m.line.alias("line"), m.histogram.alias("histogram")])
            .collect()
            .unwrap();
        assert!(floats(&out, "line").iter().all(|v| v.abs() < 1e-12));
        assert!(floats(&out, "histogram").iter().all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn test_macd_positive_in_uptrend() {
        let close: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let out = frame(&close)
            .select([macd(col("close"), 12, 26, 9).line.alias("line")])
            .collect()
            .unwrap();
        let line = floats(&out, "line");
        assert!(line[59] > 0.0);
        assert_relative_eq!(line[0], 0.0);
    }

    #[test]
    fn test_crossover_undefined_is_zero() {
        let df = df! {
            "short" => [None, Some(2.0), Some(1.0)],
            "medium" => [None, Some(1.0), Some(2.0)],
        }
        .unwrap();
        let out = df
            .lazy()
            .select([crossover(col("short"), col("medium")).alias("cross")])
            .collect()
            .unwrap();
        let cross: Vec<Option<i32>> = out
            .column("cross")
            .unwrap()
            .i32()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(cross, vec![Some(0), Some(1), Some(0)]);
    }

    #[test]
    fn test_distance_from_ma() {
        let out = df! { "close" => [110.0], "ma" => [100.0] }
            .unwrap()
            .lazy()
            .select([distance_from_ma(col("close"), col("ma")).alias("dist")])
            .collect()
            .unwrap();
        assert_relative_eq!(floats(&out, "dist")[0], 10.0, epsilon = 1e-9);
    }
}
