//! Solver configuration.
//!
//! Policy
//! - Tolerances live in `GeomCfg` only; `SolverCfg` carries it alongside the
//!   few knobs that are not geometric predicates.

use serde::{Deserialize, Serialize};

use crate::geom::GeomCfg;

/// Paper area used when the dimensions line only fixes a ratio.
pub const DEFAULT_PAPER_AREA: f64 = 1.0;
/// Rotation angle (degrees) for `fold … around …` without an explicit angle.
pub const DEFAULT_ANGLE_DEG: f64 = 180.0;

/// Configuration for one solve; geometric tolerances stay in `geom`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SolverCfg {
    pub geom: GeomCfg,
    /// Area of the generated sheet; width and height follow the parsed ratio.
    pub paper_area: f64,
    /// Angle (degrees) used by `fold … around …` lines that give none.
    pub default_angle_deg: f64,
}

impl Default for SolverCfg {
    fn default() -> Self {
        Self {
            geom: GeomCfg::default(),
            paper_area: DEFAULT_PAPER_AREA,
            default_angle_deg: DEFAULT_ANGLE_DEG,
        }
    }
}

impl SolverCfg {
    #[inline]
    pub fn eps(&self) -> f64 {
        self.geom.eps
    }
}
