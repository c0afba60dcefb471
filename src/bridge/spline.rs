//! Natural cubic splines over strictly increasing knots.

use crate::error::{Result, ScoreError};

/// Index `k` of the knot interval `[xs[k], xs[k+1]]` containing `x`, and the
/// fraction of the way through it. `x` is clamped to the knot range.
pub(crate) fn locate(xs: &[f64], x: f64) -> (usize, f64) {
    let last = xs.len() - 1;
    if last == 0 {
        return (0, 0.0);
    }
    let x = x.clamp(xs[0], xs[last]);
    let k = xs.partition_point(|&knot| knot <= x).clamp(1, last) - 1;
    let width = xs[k + 1] - xs[k];
    let frac = if width > 0.0 { (x - xs[k]) / width } else { 0.0 };
    (k, frac.clamp(0.0, 1.0))
}

pub(crate) fn check_knots(xs: &[f64], ys: &[f64]) -> Result<()> {
    if xs.len() < 2 {
        return Err(ScoreError::InvalidGrid(format!(
            "needs at least 2 knots, got {}",
            xs.len()
        )));
    }
    if xs.len() != ys.len() {
        return Err(ScoreError::InvalidGrid(format!(
            "{} knots but {} values",
            xs.len(),
            ys.len()
        )));
    }
    if xs.windows(2).any(|w| w[1] <= w[0]) {
        return Err(ScoreError::InvalidGrid("knots are not strictly increasing".into()));
    }
    if ys.iter().any(|y| !y.is_finite()) {
        return Err(ScoreError::InvalidGrid("non-finite value".into()));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct CubicSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// Second derivative at each knot (zero at both ends)
    curvature: Vec<f64>,
}

impl CubicSpline {
    pub fn new(xs: &[f64], ys: &[f64]) -> Result<Self> {
        check_knots(xs, ys)?;
        Ok(Self::from_checked(xs, ys))
    }

    /// Knots already validated by the caller.
    pub(crate) fn from_checked(xs: &[f64], ys: &[f64]) -> Self {
        Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            curvature: natural_curvature(xs, ys),
        }
    }

    pub fn eval(&self, x: f64) -> f64 {
        let (k, frac) = locate(&self.xs, x);
        let h = self.xs[k + 1] - self.xs[k];
        let (a, b) = (1.0 - frac, frac);
        let (m0, m1) = (self.curvature[k], self.curvature[k + 1]);
        a * self.ys[k]
            + b * self.ys[k + 1]
            + ((a * a * a - a) * m0 + (b * b * b - b) * m1) * h * h / 6.0
    }
}

/// Solve the tridiagonal system for a natural spline (Thomas algorithm).
fn natural_curvature(xs: &[f64], ys: &[f64]) -> Vec<f64> {
    let n = xs.len();
    let mut m = vec![0.0; n];
    if n < 3 {
        return m;
    }
    let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();

    // Interior rows i = 1..n-1: h[i-1] m[i-1] + 2(h[i-1] + h[i]) m[i] + h[i] m[i+1] = rhs[i]
    let mut diag = vec![0.0; n];
    let mut rhs = vec![0.0; n];
    for i in 1..n - 1 {
        diag[i] = 2.0 * (h[i - 1] + h[i]);
        rhs[i] = 6.0 * ((ys[i + 1] - ys[i]) / h[i] - (ys[i] - ys[i - 1]) / h[i - 1]);
    }

    // Forward sweep
    for i in 2..n - 1 {
        let w = h[i - 1] / diag[i - 1];
        diag[i] -= w * h[i - 1];
        rhs[i] -= w * rhs[i - 1];
    }

    // Back substitution
    m[n - 2] = rhs[n - 2] / diag[n - 2];
    for i in (1..n - 2).rev() {
        m[i] = (rhs[i] - h[i] * m[i + 1]) / diag[i];
    }
    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_passes_through_knots() {
        let xs = [0.0, 0.3, 0.5, 0.9, 1.0];
        let ys = [0.0, 0.2, 0.7, 0.8, 1.0];
        let spline = CubicSpline::new(&xs, &ys).unwrap();
        for (x, y) in xs.iter().zip(ys) {
            assert_relative_eq!(spline.eval(*x), y, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_reproduces_straight_lines() {
        let xs = [0.0, 0.1, 0.4, 0.6, 1.0];
        let ys: Vec<f64> = xs.iter().map(|x| 2.0 * x - 0.5).collect();
        let spline = CubicSpline::new(&xs, &ys).unwrap();
        for x in [0.05, 0.25, 0.77, 0.99] {
            assert_relative_eq!(spline.eval(x), 2.0 * x - 0.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_approximates_smooth_function() {
        let xs: Vec<f64> = (0..=20).map(|i| i as f64 / 20.0).collect();
        let ys: Vec<f64> = xs.iter().map(|x| (3.0 * x).sin()).collect();
        let spline = CubicSpline::new(&xs, &ys).unwrap();
        for x in [0.13, 0.48, 0.71] {
            let err = (spline.eval(x) - (3.0 * x).sin()).abs();
            assert!(err < 1e-3, "spline error at {} too large, got {:.2e}", x, err);
        }
    }

    #[test]
    fn test_clamps_outside_range() {
        let spline = CubicSpline::new(&[0.2, 0.5, 0.8], &[0.1, 0.6, 0.9]).unwrap();
        assert_relative_eq!(spline.eval(0.0), 0.1, epsilon = 1e-12);
        assert_relative_eq!(spline.eval(1.0), 0.9, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_bad_knots() {
        assert!(CubicSpline::new(&[0.0], &[1.0]).is_err());
        assert!(CubicSpline::new(&[0.0, 0.0, 1.0], &[0.0, 0.5, 1.0]).is_err());
        assert!(CubicSpline::new(&[0.0, 1.0], &[0.0]).is_err());
        assert!(CubicSpline::new(&[0.0, 1.0], &[0.0, f64::NAN]).is_err());
    }

    #[test]
    fn test_locate() {
        let xs = [0.0, 0.5, 1.0];
        assert_eq!(locate(&xs, 0.0), (0, 0.0));
        assert_eq!(locate(&xs, 0.25), (0, 0.5));
        assert_eq!(locate(&xs, 0.5), (1, 0.0));
        assert_eq!(locate(&xs, 1.0), (1, 1.0));
        assert_eq!(locate(&xs, 7.0), (1, 1.0));
    }
}
