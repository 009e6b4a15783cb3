//! Cutting planes for translation and rotation folds.

use nalgebra::Vector3;

use crate::error::{FoldError, FoldResult};
use crate::geom::{project_point_onto_line, unit, Plane};
use crate::topology::Topology;

/// A located fold: the plane (with `from` on its minus side), the `from`
/// position and, for translations, the target position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cut {
    pub plane: Plane,
    pub from: Vector3<f64>,
    pub target: Option<Vector3<f64>>,
}

/// Perpendicular bisector between `from[0]` and the target picked by `to`.
///
/// - `1–1`: target is `to[0]`.
/// - `1–2`: target lies on the ray `to[0] → to[1]`, as far from `to[0]` as `from[0]` is.
/// - `2–2`: target is the projection of `from[0]` onto the line `to[0] to[1]`.
pub fn translation_cut(
    topo: &Topology,
    from: &[String],
    to: &[String],
    eps: f64,
) -> FoldResult<Cut> {
    let f = topo.point(&from[0])?;
    let t0 = topo.point(&to[0])?;
    let target = match (from.len(), to.len()) {
        (1, 1) => t0,
        (1, 2) => {
            let t1 = topo.point(&to[1])?;
            let dir = unit(t1 - t0, eps).ok_or_else(|| {
                FoldError::degenerate(format!("`{}` and `{}` coincide", to[0], to[1]))
            })?;
            t0 + dir * (f - t0).norm()
        }
        (2, 2) => {
            let t1 = topo.point(&to[1])?;
            project_point_onto_line(t0, t1, f, eps).ok_or_else(|| {
                FoldError::degenerate(format!("`{}` and `{}` coincide", to[0], to[1]))
            })?
        }
        (nf, nt) => {
            return Err(FoldError::selection(format!(
                "unsupported selection: {nf} from point(s) onto {nt} target point(s)"
            )))
        }
    };
    let plane = Plane::bisector(f, target, eps).ok_or_else(|| {
        FoldError::degenerate(format!("`{}` already lies on its target", from[0]))
    })?;
    Ok(Cut {
        plane,
        from: f,
        target: Some(target),
    })
}

/// Plane through the axis facing away from `from[0]`.
pub fn rotation_cut(
    topo: &Topology,
    from: &[String],
    axis: &[String; 2],
    eps: f64,
) -> FoldResult<Cut> {
    let f = topo.point(&from[0])?;
    let a0 = topo.point(&axis[0])?;
    let a1 = topo.point(&axis[1])?;
    let foot = project_point_onto_line(a0, a1, f, eps).ok_or_else(|| {
        FoldError::degenerate(format!("axis `{}`–`{}` has zero length", axis[0], axis[1]))
    })?;
    let plane = Plane::new(foot, foot - f, eps).ok_or_else(|| {
        FoldError::degenerate(format!("`{}` lies on the rotation axis", from[0]))
    })?;
    Ok(Cut {
        plane,
        from: f,
        target: None,
    })
}
