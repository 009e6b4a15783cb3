//! One fold: locate the plane, split, rotate the flap, restack.
//!
//! Purpose
//! - Turn a `Topology` and one parsed `Instruction` into the next `Topology`
//!   and a `FoldStep` describing the motion for playback.
//!
//! Pipeline
//! 1. Validate the selection shape and every referenced name (no geometry yet).
//! 2. Locate the cutting plane (`plane`): a perpendicular bisector for
//!    translations, the plane through the axis facing away from `from` for
//!    rotations. `from` is always on the minus side.
//! 3. Split straddling faces (`split`); sub-faces replace their parent in place
//!    and inherit its stacking relations.
//! 4. Flap = minus-side faces. Translations synthesize the axis from the fold
//!    line and the angle from `from`/`target`; rotations take both as given.
//! 5. Reject flaps hinged off the axis, rotate every minus-side point, then
//!    refresh flap/stationary stacking (`rotate`).
//!
//! Conventions
//! - Valley (`top`) folds lift the flap over the reference face's `+z` side,
//!   mountain (`bottom`) folds pass underneath; the sense is encoded in the
//!   direction of the axis, the angle stays in `[0, 360)`.

mod plane;
mod rotate;
mod split;

pub use plane::{rotation_cut, translation_cut, Cut};
pub use rotate::{
    apply_rotation, check_hinge, reference_face, translation_angle, translation_axis,
    update_face_order, Axis,
};
pub use split::{classify_points, split_faces, FaceClass, Split};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cfg::SolverCfg;
use crate::error::{FoldError, FoldResult};
use crate::geom::{coincide3, normalize_deg};
use crate::parser::{Instruction, Motion, Sense};
use crate::topology::{NameSource, Topology};

/// Rigid motion of a group of faces: the outlines as of this fold, the axis
/// point names (`A0 → A1`) and the right-handed angle in degrees.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FaceRotation {
    pub faces: Vec<Vec<String>>,
    pub axis: [String; 2],
    pub angle_deg: f64,
}

/// Record of one fold.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FoldStep {
    pub rotation: FaceRotation,
    pub created_points: Vec<String>,
    pub carry: Vec<String>,
    pub pin: Vec<String>,
}

/// Apply one instruction to `topo`.
pub fn fold(
    topo: Topology,
    ins: &Instruction,
    cfg: &SolverCfg,
    names: &mut dyn NameSource,
) -> FoldResult<(Topology, FoldStep)> {
    let eps = cfg.eps();
    check_selection(&topo, ins)?;

    let cut = match &ins.motion {
        Motion::Translate { to, .. } => translation_cut(&topo, &ins.from, to, eps)?,
        Motion::Rotate { axis, .. } => rotation_cut(&topo, &ins.from, axis, eps)?,
    };

    let Split {
        topology,
        sides,
        created,
    } = split_faces(topo, &cut.plane, eps, names)?;
    let classes: Vec<FaceClass> = topology
        .faces
        .iter()
        .map(|f| FaceClass::of(f, &sides))
        .collect();
    if classes.contains(&FaceClass::Straddle) {
        return Err(FoldError::degenerate("a face still straddles the plane after splitting"));
    }
    let flap: Vec<Vec<String>> = topology
        .faces
        .iter()
        .zip(&classes)
        .filter(|(_, c)| **c == FaceClass::Minus)
        .map(|(f, _)| f.clone())
        .collect();
    if flap.is_empty() {
        return Err(FoldError::degenerate("no paper on the folding side"));
    }

    let (axis, angle_deg) = match &ins.motion {
        Motion::Translate { to, sense } => {
            let reference = reference_face(&topology, &classes, &sides, &to[0])
                .ok_or_else(|| FoldError::degenerate("sheet has no faces"))?;
            let axis = translation_axis(&topology, &sides, reference, &cut.plane, *sense, eps)?;
            let target = cut
                .target
                .ok_or_else(|| FoldError::degenerate("translation without a target"))?;
            let angle = translation_angle(&axis, cut.from, target, eps)?;
            (axis, angle)
        }
        Motion::Rotate {
            axis,
            angle_deg,
            sense,
        } => {
            let raw = angle_deg.unwrap_or(cfg.default_angle_deg);
            let signed = if *sense == Sense::Mountain { -raw } else { raw };
            (Axis::from_names(&topology, axis.clone())?, normalize_deg(signed))
        }
    };

    check_hinge(&topology, &classes, &sides, &axis, eps)?;
    let before = topology.clone();
    let mut after = topology;
    apply_rotation(&mut after, &sides, &axis, angle_deg, eps)?;
    update_face_order(&before, &mut after, &classes, &axis, angle_deg, eps)?;
    report_carry_pin(&before, &after, ins, eps);

    debug!(
        from = ?ins.from,
        axis = ?axis.names,
        angle_deg,
        flap = flap.len(),
        created = created.len(),
        faces = after.faces.len(),
        "fold applied"
    );
    let step = FoldStep {
        rotation: FaceRotation {
            faces: flap,
            axis: axis.names.clone(),
            angle_deg,
        },
        created_points: created,
        carry: ins.carry.clone(),
        pin: ins.pin.clone(),
    };
    Ok((after, step))
}

/// Selection shape and name checks; runs before any geometry.
fn check_selection(topo: &Topology, ins: &Instruction) -> FoldResult<()> {
    if ins.from.is_empty() {
        return Err(FoldError::selection("empty `from` selection"));
    }
    let mut referenced: Vec<&String> = ins.from.iter().collect();
    match &ins.motion {
        Motion::Translate { to, .. } => {
            let shape = (ins.from.len(), to.len());
            if !matches!(shape, (1, 1) | (1, 2) | (2, 2)) {
                return Err(FoldError::selection(format!(
                    "unsupported selection: {} from point(s) onto {} target point(s)",
                    shape.0, shape.1
                )));
            }
            referenced.extend(to);
        }
        Motion::Rotate { axis, .. } => referenced.extend(axis),
    }
    referenced.extend(&ins.carry);
    referenced.extend(&ins.pin);
    match referenced.into_iter().find(|n| !topo.contains(n)) {
        Some(n) => Err(FoldError::selection(format!("unknown point `{n}`"))),
        None => Ok(()),
    }
}

fn report_carry_pin(before: &Topology, after: &Topology, ins: &Instruction, eps: f64) {
    let moved = |n: &str| match (before.points.get(n), after.points.get(n)) {
        (Some(p), Some(q)) => !coincide3(*p, *q, eps),
        _ => false,
    };
    for n in ins.carry.iter().filter(|n| !moved(n)) {
        warn!(point = %n, "carried point did not move");
    }
    for n in ins.pin.iter().filter(|n| moved(n)) {
        warn!(point = %n, "pinned point moved");
    }
}

#[cfg(test)]
mod tests;
