//! Interpolation bridge: precomputed grids of exact win probabilities and the
//! cheap approximations built over them.
//!
//! - **grid**: grid spacing and parallel evaluation with rayon
//! - **spline**: natural cubic splines
//! - **surface**: 1-D curves and 2-D surfaces, linear or cubic
//! - **precompute**: per-level starting scores, grid keys and builders
//!
//! The exact engine in [`crate::probability`] stays the source of truth; the
//! bridge only samples it.

pub mod grid;
pub mod precompute;
pub mod spline;
pub mod surface;

pub use grid::{linspace, GridSpec};
pub use precompute::{precompute_level, GridKey, Level, Precomputed, PrecomputeOptions};
pub use surface::{Curve, CurveData, GridData, Interpolant, Interpolation, Surface, SurfaceData};
