//! Rotation synthesis (axis, angle) and application, plus stacking updates.

use std::collections::BTreeMap;

use nalgebra::{Vector2, Vector3};

use crate::error::{FoldError, FoldResult};
use crate::geom::{
    distance_to_line, polygons_overlap, project_point_onto_line, rotate_about_axis,
    signed_angle_deg, unit, Plane, Side,
};
use crate::parser::Sense;
use crate::topology::Topology;

use super::split::FaceClass;

/// Axis points by name plus their current positions.
#[derive(Clone, Debug, PartialEq)]
pub struct Axis {
    pub names: [String; 2],
    pub origin: Vector3<f64>,
    pub direction: Vector3<f64>,
}

impl Axis {
    pub fn from_names(topo: &Topology, names: [String; 2]) -> FoldResult<Self> {
        let a0 = topo.point(&names[0])?;
        let a1 = topo.point(&names[1])?;
        Ok(Self {
            names,
            origin: a0,
            direction: a1 - a0,
        })
    }

    /// Rotate `p` by `angle_deg` (right-hand rule about `A0 → A1`).
    pub fn rotate(&self, p: Vector3<f64>, angle_deg: f64, eps: f64) -> FoldResult<Vector3<f64>> {
        rotate_about_axis(p, self.origin, self.direction, angle_deg.to_radians(), eps)
            .ok_or_else(|| FoldError::degenerate("rotation axis has zero length"))
    }
}

/// Stationary face used to orient a translation fold.
///
/// Preference: a stationary face containing `anchor`, then any stationary face
/// touching the cut, then the first face.
pub fn reference_face(
    topo: &Topology,
    classes: &[FaceClass],
    sides: &BTreeMap<String, Side>,
    anchor: &str,
) -> Option<usize> {
    let stationary = |i: &usize| classes[*i].is_stationary();
    let on_cut = |i: &usize| {
        topo.faces[*i]
            .iter()
            .any(|n| sides.get(n) == Some(&Side::On))
    };
    let all = 0..topo.faces.len();
    all.clone()
        .filter(stationary)
        .find(|i| topo.faces[*i].iter().any(|n| n == anchor))
        .or_else(|| all.clone().filter(stationary).find(on_cut))
        .or_else(|| all.clone().next())
}

/// Axis for a translation fold: the extreme on-plane vertices along
/// `d = n_ref × n_plane` (negated for mountain folds).
pub fn translation_axis(
    topo: &Topology,
    sides: &BTreeMap<String, Side>,
    reference: usize,
    plane: &Plane,
    sense: Sense,
    eps: f64,
) -> FoldResult<Axis> {
    let mut n_ref = topo
        .loop_normal(&topo.faces[reference], eps)
        .ok_or_else(|| FoldError::degenerate("reference face has no normal"))?;
    if n_ref.z < -eps {
        n_ref = -n_ref;
    }
    let mut d = unit(n_ref.cross(&plane.normal), eps)
        .ok_or_else(|| FoldError::degenerate("cutting plane is parallel to the reference face"))?;
    if sense == Sense::Mountain {
        d = -d;
    }

    let mut lo: Option<(f64, &str)> = None;
    let mut hi: Option<(f64, &str)> = None;
    let on_faces: std::collections::BTreeSet<&str> = topo
        .faces
        .iter()
        .flatten()
        .map(String::as_str)
        .filter(|n| sides.get(*n) == Some(&Side::On))
        .collect();
    for name in on_faces {
        let s = topo.point(name)?.dot(&d);
        if lo.map_or(true, |(b, _)| s < b - eps) {
            lo = Some((s, name));
        }
        if hi.map_or(true, |(b, _)| s > b + eps) {
            hi = Some((s, name));
        }
    }
    match (lo, hi) {
        (Some((s0, a0)), Some((s1, a1))) if s1 - s0 > eps => {
            Axis::from_names(topo, [a0.to_string(), a1.to_string()])
        }
        _ => Err(FoldError::degenerate(
            "fewer than two distinct points on the fold line",
        )),
    }
}

/// Signed angle about the axis carrying `from` onto `target`, in `[0, 360)`.
pub fn translation_angle(
    axis: &Axis,
    from: Vector3<f64>,
    target: Vector3<f64>,
    eps: f64,
) -> FoldResult<f64> {
    let a1 = axis.origin + axis.direction;
    let pf = project_point_onto_line(axis.origin, a1, from, eps)
        .ok_or_else(|| FoldError::degenerate("rotation axis has zero length"))?;
    let pt = project_point_onto_line(axis.origin, a1, target, eps)
        .ok_or_else(|| FoldError::degenerate("rotation axis has zero length"))?;
    signed_angle_deg(from - pf, target - pt, axis.direction, eps)
        .ok_or_else(|| FoldError::degenerate("fold source or target lies on the axis"))
}

/// Every on-plane vertex of a flap face must sit on the axis line.
///
/// On-plane points do not move; a flap vertex on the plane but off the axis
/// would tear its face.
pub fn check_hinge(
    topo: &Topology,
    classes: &[FaceClass],
    sides: &BTreeMap<String, Side>,
    axis: &Axis,
    eps: f64,
) -> FoldResult<()> {
    let a1 = axis.origin + axis.direction;
    let flap = topo
        .faces
        .iter()
        .zip(classes)
        .filter(|(_, c)| **c == FaceClass::Minus)
        .map(|(f, _)| f);
    for face in flap {
        for name in face.iter().filter(|n| sides.get(*n) == Some(&Side::On)) {
            let d = distance_to_line(axis.origin, a1, topo.point(name)?, eps)
                .ok_or_else(|| FoldError::degenerate("rotation axis has zero length"))?;
            if d > eps {
                return Err(FoldError::degenerate(format!(
                    "`{name}` lies on the fold plane {d:.4} away from axis `{}`–`{}`",
                    axis.names[0], axis.names[1]
                )));
            }
        }
    }
    Ok(())
}

/// Rotate every minus-side point about the axis.
pub fn apply_rotation(
    topo: &mut Topology,
    sides: &BTreeMap<String, Side>,
    axis: &Axis,
    angle_deg: f64,
    eps: f64,
) -> FoldResult<()> {
    for (name, p) in topo.points.iter_mut() {
        if sides.get(name) == Some(&Side::Minus) {
            *p = axis.rotate(*p, angle_deg, eps)?;
        }
    }
    Ok(())
}

/// Refresh stacking between flap and stationary faces after a fold.
///
/// `before` is the split topology prior to rotation (used for the mid-rotation
/// probe); `after` receives the new relations. Flap–flap and stationary–stationary
/// entries are kept; old flap–stationary entries are dropped.
pub fn update_face_order(
    before: &Topology,
    after: &mut Topology,
    classes: &[FaceClass],
    axis: &Axis,
    angle_deg: f64,
    eps: f64,
) -> FoldResult<()> {
    let flap = |i: usize| classes.get(i) == Some(&FaceClass::Minus);
    for (&i, row) in after.face_order.iter_mut() {
        row.retain(|&j, _| flap(i) == flap(j));
    }
    after.face_order.retain(|_, row| !row.is_empty());

    let n = after.faces.len();
    for f in (0..n).filter(|&i| flap(i)) {
        let Some(nf) = after.loop_normal(&after.faces[f], eps) else {
            continue;
        };
        let probe = match mid_rotation_probe(before, &before.faces[f], axis, angle_deg, eps)? {
            Some(p) => p,
            None => continue,
        };
        for g in (0..n).filter(|&i| !flap(i)) {
            let Some(ng) = after.loop_normal(&after.faces[g], eps) else {
                continue;
            };
            if !coplanar_overlap(after, f, g, ng, eps)? {
                continue;
            }
            let g0 = after.point(&after.faces[g][0])?;
            let s = Side::of(ng.dot(&(probe - g0)), eps).sign();
            let alignment = if nf.dot(&ng) < 0.0 { -1 } else { 1 };
            after.relate(f, g, s, alignment);
        }
    }
    Ok(())
}

/// Flap vertex farthest from the axis, rotated half-way.
fn mid_rotation_probe(
    topo: &Topology,
    face: &[String],
    axis: &Axis,
    angle_deg: f64,
    eps: f64,
) -> FoldResult<Option<Vector3<f64>>> {
    let a1 = axis.origin + axis.direction;
    let mut best: Option<(f64, Vector3<f64>)> = None;
    for name in face {
        let p = topo.point(name)?;
        let Some(foot) = project_point_onto_line(axis.origin, a1, p, eps) else {
            continue;
        };
        let d = (p - foot).norm();
        if best.map_or(true, |(b, _)| d > b) {
            best = Some((d, p));
        }
    }
    match best {
        Some((d, p)) if d > eps => Ok(Some(axis.rotate(p, 0.5 * angle_deg, eps)?)),
        _ => Ok(None),
    }
}

/// Faces `f` and `g` lie in one plane and overlap with positive area.
fn coplanar_overlap(
    topo: &Topology,
    f: usize,
    g: usize,
    ng: Vector3<f64>,
    eps: f64,
) -> FoldResult<bool> {
    let pf = topo.loop_points(&topo.faces[f])?;
    let pg = topo.loop_points(&topo.faces[g])?;
    let g0 = pg[0];
    if pf.iter().any(|p| ng.dot(&(p - g0)).abs() > eps) {
        return Ok(false);
    }
    // In-plane frame of g.
    let helper = if ng.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let u = ng.cross(&helper).normalize();
    let v = ng.cross(&u);
    let flat = |pts: &[Vector3<f64>]| -> Vec<Vector2<f64>> {
        pts.iter()
            .map(|p| Vector2::new(u.dot(&(p - g0)), v.dot(&(p - g0))))
            .collect()
    };
    Ok(polygons_overlap(&flat(&pf), &flat(&pg), eps))
}
