use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScoreError};

pub const DEFAULT_GRID_SIZE: usize = 50;
pub const DEFAULT_GRID_MIN: f64 = 0.0001;
pub const DEFAULT_GRID_MAX: f64 = 0.9999;

/// `n` evenly spaced values from `lo` to `hi` inclusive.
pub fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![lo],
        _ => {
            let step = (hi - lo) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { hi } else { lo + step * i as f64 })
                .collect()
        }
    }
}

/// Evenly spaced serve probabilities shared by both axes of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub min: f64,
    pub max: f64,
    pub size: usize,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            min: DEFAULT_GRID_MIN,
            max: DEFAULT_GRID_MAX,
            size: DEFAULT_GRID_SIZE,
        }
    }
}

impl GridSpec {
    pub fn new(min: f64, max: f64, size: usize) -> Result<Self> {
        let spec = Self { min, max, size };
        spec.validate()?;
        Ok(spec)
    }

    /// Interpolation needs at least two strictly increasing knots inside [0, 1].
    pub fn validate(&self) -> Result<()> {
        if self.size < 2 {
            return Err(ScoreError::InvalidGrid(format!(
                "needs at least 2 points, got {}",
                self.size
            )));
        }
        if !(0.0..=1.0).contains(&self.min) || !(0.0..=1.0).contains(&self.max) {
            return Err(ScoreError::InvalidGrid(format!(
                "range [{}, {}] is outside [0, 1]",
                self.min, self.max
            )));
        }
        if self.min >= self.max {
            return Err(ScoreError::InvalidGrid(format!(
                "minimum {} is not below maximum {}",
                self.min, self.max
            )));
        }
        Ok(())
    }

    pub fn points(&self) -> Vec<f64> {
        linspace(self.min, self.max, self.size)
    }
}

// ── Parallel evaluation ──────────────────────────────────────────────────────

/// Evaluate `f` at every x, in parallel.
pub fn evaluate_1d<F>(xs: &[f64], f: F) -> Result<Vec<f64>>
where
    F: Fn(f64) -> Result<f64> + Sync,
{
    xs.par_iter().map(|&x| f(x)).collect()
}

/// Evaluate `f` over the grid `xs × ys`, in parallel by row.
///
/// The result is indexed `[i][j]` for `(xs[i], ys[j])`.
pub fn evaluate_2d<F>(xs: &[f64], ys: &[f64], f: F) -> Result<Vec<Vec<f64>>>
where
    F: Fn(f64, f64) -> Result<f64> + Sync,
{
    xs.par_iter()
        .map(|&x| ys.iter().map(|&y| f(x, y)).collect::<Result<Vec<f64>>>())
        .collect()
}
