//! Summary statistics over the small `f64` windows of the lag-window join
//! and the daily sentiment index. `NaN` marks a missing observation.

/// Mean of the non-`NaN` values, `NaN` when there are none
pub fn mean(values: &[f64]) -> f64 {
    let (sum, count) = values
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 { f64::NAN } else { sum / count as f64 }
}

fn variance(values: &[f64], ddof: usize) -> f64 {
    let valid: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if valid.len() <= ddof {
        return f64::NAN;
    }
    let m = valid.iter().sum::<f64>() / valid.len() as f64;
    valid.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (valid.len() - ddof) as f64
}

/// Sample standard deviation (ddof = 1), `NaN` below two observations
pub fn sample_std(values: &[f64]) -> f64 {
    variance(values, 1).sqrt()
}

/// Population standard deviation (ddof = 0), `NaN` when empty
pub fn population_std(values: &[f64]) -> f64 {
    variance(values, 0).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_skips_missing() {
        assert_relative_eq!(mean(&[1.0, f64::NAN, 3.0]), 2.0);
        assert!(mean(&[f64::NAN]).is_nan());
    }

    #[test]
    fn test_sample_and_population_std() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(population_std(&values), 2.0);
        assert_relative_eq!(sample_std(&values), 2.138_089_935_299_395, epsilon = 1e-12);
        assert!(sample_std(&[1.0]).is_nan());
        assert!(population_std(&[100.0; 30]) == 0.0);
    }
}
