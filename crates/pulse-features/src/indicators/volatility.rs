//! Volatility indicators: Bollinger bands and annualized volatility.

use polars::prelude::*;

use super::momentum::returns;
use super::window;

/// Band width below which the position inside the band is taken as the middle
const FLAT_BAND: f64 = 1e-12;

/// Bollinger bands and derived position/width
#[derive(Debug, Clone)]
pub struct Bands {
    /// Middle plus `k` stddev
    pub upper: Expr,
    /// Rolling mean
    pub middle: Expr,
    /// Middle minus `k` stddev
    pub lower: Expr,
    /// `(upper - lower) / middle`
    pub width: Expr,
    /// `(close - lower) / (upper - lower)`, may leave [0, 1] on breakouts
    pub position: Expr,
}

/// Bollinger bands over a `period` window with sample stddev
pub fn bollinger(close: Expr, period: usize, k: f64) -> Bands {
    let middle = close.clone().rolling_mean(window(period, period));
    let std = close.clone().rolling_std(window(period, period));

    let upper = middle.clone() + lit(k) * std.clone();
    let lower = middle.clone() - lit(k) * std;
    let band = upper.clone() - lower.clone();
    let width = band.clone() / middle.clone();
    let position = when(band.clone().abs().lt(lit(FLAT_BAND)))
        .then(lit(0.5))
        .otherwise((close - lower.clone()) / band);

    Bands {
        upper,
        middle,
        lower,
        width,
        position,
    }
}

/// Rolling sample stddev of daily returns, scaled by `sqrt(periods_per_year)`
pub fn annualized_volatility(close: Expr, size: usize, periods_per_year: f64) -> Expr {
    returns(close, 1).rolling_std(window(size, size)) * lit(periods_per_year.sqrt())
}
