use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::spline::{check_knots, locate, CubicSpline};
use crate::error::{Result, ScoreError};

/// How values between grid knots are filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    Linear,
    /// Natural cubic splines (tensor product in two dimensions)
    #[default]
    Cubic,
}

// ── Grid data ────────────────────────────────────────────────────────────────

/// Win probabilities sampled at one serve probability per knot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveData {
    pub xs: Vec<f64>,
    pub values: Vec<f64>,
}

/// Win probabilities over `xs × ys`, indexed `values[i][j]` for `(xs[i], ys[j])`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceData {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub values: Vec<Vec<f64>>,
}

/// Either kind of grid, as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GridData {
    Curve(CurveData),
    Surface(SurfaceData),
}

impl GridData {
    pub fn interpolant(&self, method: Interpolation) -> Result<Interpolant> {
        Ok(match self {
            GridData::Curve(data) => Interpolant::Curve(Curve::new(data.clone(), method)?),
            GridData::Surface(data) => Interpolant::Surface(Surface::new(data.clone(), method)?),
        })
    }

    /// Number of sampled values
    pub fn cells(&self) -> usize {
        match self {
            GridData::Curve(data) => data.values.len(),
            GridData::Surface(data) => data.values.iter().map(Vec::len).sum(),
        }
    }
}

// ── Interpolants ─────────────────────────────────────────────────────────────

/// One-dimensional approximation of a win-probability function.
#[derive(Debug, Clone)]
pub struct Curve {
    data: CurveData,
    method: Interpolation,
    spline: Option<CubicSpline>,
}

impl Curve {
    pub fn new(data: CurveData, method: Interpolation) -> Result<Self> {
        check_knots(&data.xs, &data.values)?;
        let spline = match method {
            Interpolation::Linear => None,
            Interpolation::Cubic => Some(CubicSpline::from_checked(&data.xs, &data.values)),
        };
        Ok(Self {
            data,
            method,
            spline,
        })
    }

    /// Approximate value at `x`, clamped to the grid range; result in [0, 1].
    pub fn eval(&self, x: f64) -> f64 {
        let value = match &self.spline {
            Some(spline) => spline.eval(x),
            None => {
                let (k, frac) = locate(&self.data.xs, x);
                self.data.values[k] * (1.0 - frac) + self.data.values[k + 1] * frac
            }
        };
        value.clamp(0.0, 1.0)
    }

    pub fn data(&self) -> &CurveData {
        &self.data
    }

    pub fn method(&self) -> Interpolation {
        self.method
    }
}

/// Two-dimensional approximation of a win-probability function.
#[derive(Debug, Clone)]
pub struct Surface {
    data: SurfaceData,
    method: Interpolation,
    /// Cubic only: one spline along y per x knot
    rows: Vec<CubicSpline>,
}

impl Surface {
    pub fn new(data: SurfaceData, method: Interpolation) -> Result<Self> {
        if data.values.len() != data.xs.len() {
            return Err(ScoreError::InvalidGrid(format!(
                "{} x knots but {} rows",
                data.xs.len(),
                data.values.len()
            )));
        }
        let probe: Vec<f64> = vec![0.0; data.xs.len()];
        check_knots(&data.xs, &probe)?;
        for row in &data.values {
            check_knots(&data.ys, row)?;
        }
        let rows = match method {
            Interpolation::Linear => Vec::new(),
            Interpolation::Cubic => data
                .values
                .iter()
                .map(|row| CubicSpline::from_checked(&data.ys, row))
                .collect(),
        };
        Ok(Self { data, method, rows })
    }

    /// Approximate value at `(x, y)`, clamped to the grid range; result in [0, 1].
    pub fn eval(&self, x: f64, y: f64) -> f64 {
        let value = match self.method {
            Interpolation::Linear => self.bilinear(x, y),
            Interpolation::Cubic => {
                let column: Vec<f64> = self.rows.iter().map(|row| row.eval(y)).collect();
                CubicSpline::from_checked(&self.data.xs, &column).eval(x)
            }
        };
        value.clamp(0.0, 1.0)
    }

    fn bilinear(&self, x: f64, y: f64) -> f64 {
        let (row_lo, row_frac) = locate(&self.data.xs, x);
        let (col_lo, col_frac) = locate(&self.data.ys, y);
        let table = &self.data.values;

        // Interpolate along columns for both rows
        let val_lo =
            table[row_lo][col_lo] * (1.0 - col_frac) + table[row_lo][col_lo + 1] * col_frac;
        let val_hi =
            table[row_lo + 1][col_lo] * (1.0 - col_frac) + table[row_lo + 1][col_lo + 1] * col_frac;

        // Interpolate between rows
        val_lo * (1.0 - row_frac) + val_hi * row_frac
    }

    pub fn data(&self) -> &SurfaceData {
        &self.data
    }

    pub fn method(&self) -> Interpolation {
        self.method
    }
}

#[derive(Debug, Clone)]
pub enum Interpolant {
    Curve(Curve),
    Surface(Surface),
}

impl Interpolant {
    /// Evaluate at serve probabilities `(p1, p2)`; curves ignore `p2`.
    pub fn eval(&self, p1: f64, p2: f64) -> f64 {
        match self {
            Interpolant::Curve(curve) => curve.eval(p1),
            Interpolant::Surface(surface) => surface.eval(p1, p2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::grid::linspace;
    use approx::assert_relative_eq;

    fn plane() -> SurfaceData {
        let xs = linspace(0.0, 1.0, 6);
        let ys = linspace(0.0, 1.0, 5);
        let values = xs
            .iter()
            .map(|x| ys.iter().map(|y| 0.5 * x + 0.25 * y + 0.1).collect())
            .collect();
        SurfaceData { xs, ys, values }
    }

    #[test]
    fn test_linear_curve_midpoint() {
        let data = CurveData {
            xs: vec![0.0, 0.5, 1.0],
            values: vec![0.0, 0.4, 1.0],
        };
        let curve = Curve::new(data, Interpolation::Linear).unwrap();
        assert_relative_eq!(curve.eval(0.25), 0.2, epsilon = 1e-12);
        assert_relative_eq!(curve.eval(0.75), 0.7, epsilon = 1e-12);
    }

    #[test]
    fn test_output_is_clamped() {
        // Overshoot between steep knots must not leave [0, 1]
        let data = CurveData {
            xs: linspace(0.0, 1.0, 5),
            values: vec![0.0, 0.0, 1.0, 1.0, 1.0],
        };
        let curve = Curve::new(data, Interpolation::Cubic).unwrap();
        for i in 0..=100 {
            let v = curve.eval(i as f64 / 100.0);
            assert!((0.0..=1.0).contains(&v), "value out of range, got {:.4}", v);
        }
    }

    #[test]
    fn test_both_methods_reproduce_planes() {
        for method in [Interpolation::Linear, Interpolation::Cubic] {
            let surface = Surface::new(plane(), method).unwrap();
            for (x, y) in [(0.13, 0.77), (0.5, 0.5), (0.91, 0.02)] {
                assert_relative_eq!(surface.eval(x, y), 0.5 * x + 0.25 * y + 0.1, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_surface_hits_knots() {
        let xs = linspace(0.0, 1.0, 4);
        let ys = linspace(0.0, 1.0, 4);
        let values: Vec<Vec<f64>> = xs
            .iter()
            .map(|x| ys.iter().map(|y| x * x * y).collect())
            .collect();
        let data = SurfaceData {
            xs: xs.clone(),
            ys: ys.clone(),
            values: values.clone(),
        };
        let surface = Surface::new(data, Interpolation::Cubic).unwrap();
        assert_relative_eq!(surface.eval(xs[2], ys[1]), values[2][1], epsilon = 1e-12);
    }

    #[test]
    fn test_inputs_are_clamped_to_grid() {
        let surface = Surface::new(plane(), Interpolation::Linear).unwrap();
        assert_relative_eq!(surface.eval(-1.0, 2.0), 0.35, epsilon = 1e-12);
    }

    #[test]
    fn test_ragged_surface_rejected() {
        let mut data = plane();
        data.values[2].pop();
        assert!(Surface::new(data, Interpolation::Linear).is_err());
    }

    #[test]
    fn test_grid_data_json_is_tagged() {
        let grid = GridData::Curve(CurveData {
            xs: vec![0.0, 1.0],
            values: vec![0.0, 1.0],
        });
        let json = serde_json::to_string(&grid).unwrap();
        assert!(json.contains("\"kind\":\"curve\""), "got {}", json);
        let back: GridData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, grid);
        assert_eq!(back.cells(), 2);
    }
}
