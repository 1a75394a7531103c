//! Statistics over one lag window.

use crate::stats;

/// Summary of the chronological values inside a lag window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStats {
    /// Mean
    pub mean: f64,
    /// Population stddev, 0 below two points
    pub std: f64,
    /// Minimum
    pub min: f64,
    /// Maximum
    pub max: f64,
    /// Last minus first, 0 below two points
    pub trend: f64,
    /// Last value
    pub current: f64,
    /// Points in the window
    pub count: usize,
}

impl WindowStats {
    /// Stats of a non-empty window, `None` when it is empty
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let (&first, &last) = (values.first()?, values.last()?);
        let multi = values.len() > 1;
        Some(Self {
            mean: stats::mean(values),
            std: if multi {
                stats::population_std(values)
            } else {
                0.0
            },
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            trend: if multi { last - first } else { 0.0 },
            current: last,
            count: values.len(),
        })
    }

    /// Stats standing in for an empty window: every level at `level`,
    /// dispersion and trend at 0
    pub const fn neutral(level: f64) -> Self {
        Self {
            mean: level,
            std: 0.0,
            min: level,
            max: level,
            trend: 0.0,
            current: level,
            count: 0,
        }
    }
}
