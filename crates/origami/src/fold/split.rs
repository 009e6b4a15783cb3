//! Classification and splitting of faces by a cutting plane.
//!
//! Splitting works in two passes per straddling face:
//! 1. Insert the plane crossing of every edge whose endpoints lie strictly on
//!    opposite sides. A crossing is reused if the same undirected edge was
//!    already split during this fold, or if a point already sits at the same
//!    pattern coordinate; otherwise it gets a fresh name.
//! 2. Partition the augmented loop with a branch walk in the pattern frame.
//!    Chords join consecutive on-plane vertices (sorted along the cut line)
//!    whose midpoint is strictly inside the face. Walks follow loop edges and
//!    chords, always taking the outgoing edge with the smallest clockwise turn
//!    from the reversed incoming direction; each closed walk is a sub-face.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use nalgebra::Vector2;

use crate::error::{FoldError, FoldResult};
use crate::geom::{contains_strict, cross2, intersect_segment_plane, signed_area, Plane, Side};
use crate::topology::{NameSource, Topology};

/// Side of a face relative to the plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaceClass {
    Minus,
    Plus,
    /// Every vertex lies on the plane; treated as stationary.
    On,
    Straddle,
}

impl FaceClass {
    pub fn of(face: &[String], sides: &BTreeMap<String, Side>) -> Self {
        let side = |n: &String| sides.get(n).copied().unwrap_or(Side::On);
        let minus = face.iter().any(|n| side(n) == Side::Minus);
        let plus = face.iter().any(|n| side(n) == Side::Plus);
        match (minus, plus) {
            (true, true) => FaceClass::Straddle,
            (true, false) => FaceClass::Minus,
            (false, true) => FaceClass::Plus,
            (false, false) => FaceClass::On,
        }
    }

    pub fn is_stationary(self) -> bool {
        matches!(self, FaceClass::Plus | FaceClass::On)
    }
}

/// Side of every point.
pub fn classify_points(topo: &Topology, plane: &Plane, eps: f64) -> BTreeMap<String, Side> {
    topo.points
        .iter()
        .map(|(k, p)| (k.clone(), plane.side(*p, eps)))
        .collect()
}

/// Result of splitting every straddling face.
#[derive(Clone, Debug)]
pub struct Split {
    pub topology: Topology,
    /// Sides after splitting (crossings are `On`).
    pub sides: BTreeMap<String, Side>,
    /// Names created by this split, in creation order.
    pub created: Vec<String>,
}

/// Split all faces straddling `plane`; sub-faces replace their parent in place.
pub fn split_faces(
    mut topo: Topology,
    plane: &Plane,
    eps: f64,
    names: &mut dyn NameSource,
) -> FoldResult<Split> {
    let mut sides = classify_points(&topo, plane, eps);
    let mut created = Vec::new();
    let mut crossings: HashMap<(String, String), String> = HashMap::new();
    let mut replacements: Vec<(usize, Vec<Vec<String>>)> = Vec::new();

    for fi in 0..topo.faces.len() {
        if FaceClass::of(&topo.faces[fi], &sides) != FaceClass::Straddle {
            continue;
        }
        let face = topo.faces[fi].clone();
        let mut augmented = Vec::with_capacity(face.len() + 2);
        for i in 0..face.len() {
            let (u, v) = (&face[i], &face[(i + 1) % face.len()]);
            augmented.push(u.clone());
            if !sides[u].opposes(sides[v]) {
                continue;
            }
            let key = if u <= v {
                (u.clone(), v.clone())
            } else {
                (v.clone(), u.clone())
            };
            let name = match crossings.get(&key) {
                Some(n) => n.clone(),
                None => {
                    let n = insert_crossing(&mut topo, plane, u, v, eps, names, &mut created)?;
                    sides.insert(n.clone(), Side::On);
                    crossings.insert(key, n.clone());
                    n
                }
            };
            augmented.push(name);
        }
        let parts = branch_walk(&topo, &augmented, &sides, eps)?;
        tracing::trace!(face = fi, parts = parts.len(), "split face");
        replacements.push((fi, parts));
    }

    for (fi, parts) in replacements.into_iter().rev() {
        topo.replace_face(fi, parts);
    }
    Ok(Split {
        topology: topo,
        sides,
        created,
    })
}

fn insert_crossing(
    topo: &mut Topology,
    plane: &Plane,
    u: &str,
    v: &str,
    eps: f64,
    names: &mut dyn NameSource,
    created: &mut Vec<String>,
) -> FoldResult<String> {
    let (pu, pv) = (topo.point(u)?, topo.point(v)?);
    let hit = intersect_segment_plane(pu, pv, plane, eps).ok_or_else(|| {
        FoldError::degenerate(format!("edge `{u}`–`{v}` does not cross the plane"))
    })?;
    let (qu, qv) = (topo.pattern_of(u)?, topo.pattern_of(v)?);
    let q = qu + (qv - qu) * hit.t;
    if let Some(existing) = topo.name_at(q, eps) {
        return Ok(existing.to_string());
    }
    let name = topo.fresh_name(names);
    topo.points.insert(name.clone(), hit.point);
    topo.pattern.insert(name.clone(), q);
    created.push(name.clone());
    Ok(name)
}

/// Partition an augmented loop into sub-faces along its on-plane chords.
fn branch_walk(
    topo: &Topology,
    lp: &[String],
    sides: &BTreeMap<String, Side>,
    eps: f64,
) -> FoldResult<Vec<Vec<String>>> {
    let m = lp.len();
    let poly = topo.loop_pattern(lp)?;
    let ccw = signed_area(&poly) >= 0.0;

    // On-plane vertices sorted along the cut line.
    let mut on: Vec<usize> = (0..m).filter(|&i| sides.get(&lp[i]) == Some(&Side::On)).collect();
    if on.len() < 2 {
        return Err(FoldError::degenerate(format!(
            "face {lp:?} straddles the plane but touches it in fewer than two points"
        )));
    }
    let origin = poly[on[0]];
    let far = on
        .iter()
        .map(|&i| poly[i])
        .max_by(|a, b| (a - origin).norm().total_cmp(&(b - origin).norm()))
        .unwrap_or(origin);
    let dir = far - origin;
    on.sort_by(|&a, &b| (poly[a] - origin).dot(&dir).total_cmp(&(poly[b] - origin).dot(&dir)));

    let adjacent = |a: usize, b: usize| (a + 1) % m == b || (b + 1) % m == a;
    let chords: Vec<(usize, usize)> = on
        .windows(2)
        .filter(|w| !adjacent(w[0], w[1]))
        .filter(|w| contains_strict(&poly, (poly[w[0]] + poly[w[1]]) * 0.5, eps))
        .map(|w| (w[0], w[1]))
        .collect();
    if chords.is_empty() {
        return Err(FoldError::degenerate(format!(
            "face {lp:?} straddles the plane but has no interior chord"
        )));
    }

    let mut outgoing: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    let mut edges: Vec<(usize, usize)> = (0..m).map(|i| (i, (i + 1) % m)).collect();
    for &(a, b) in &chords {
        edges.push((a, b));
        edges.push((b, a));
    }
    for &(a, b) in &edges {
        outgoing.entry(a).or_default().push(b);
    }

    let mut used: BTreeSet<(usize, usize)> = BTreeSet::new();
    let mut stack: Vec<(usize, usize)> = edges.iter().rev().copied().collect();
    let mut parts = Vec::new();
    while let Some(start) = stack.pop() {
        if used.contains(&start) {
            continue;
        }
        let mut walk = vec![start.0];
        let mut cur = start;
        used.insert(cur);
        for _ in 0..=edges.len() {
            let (u, v) = cur;
            if v == start.0 {
                break;
            }
            walk.push(v);
            let next = pick_turn(&poly, u, v, &outgoing[&v], &used, ccw)
                .ok_or_else(|| FoldError::degenerate(format!("branch walk stuck in {lp:?}")))?;
            cur = (v, next);
            used.insert(cur);
        }
        if cur.1 != start.0 {
            return Err(FoldError::degenerate(format!(
                "branch walk did not close in {lp:?}"
            )));
        }
        parts.push(walk.into_iter().map(|i| lp[i].clone()).collect::<Vec<_>>());
    }

    let parent = signed_area(&poly);
    let total: f64 = parts
        .iter()
        .map(|p| topo.loop_area(p))
        .sum::<FoldResult<f64>>()?;
    if (total - parent).abs() > eps {
        return Err(FoldError::degenerate(format!(
            "sub-faces of {lp:?} cover area {total}, expected {parent}"
        )));
    }
    Ok(parts)
}

/// Outgoing edge from `v` with the smallest clockwise turn from `v → u`
/// (counter-clockwise when the loop is clockwise). Going straight back is last resort.
fn pick_turn(
    poly: &[Vector2<f64>],
    u: usize,
    v: usize,
    candidates: &[usize],
    used: &BTreeSet<(usize, usize)>,
    ccw: bool,
) -> Option<usize> {
    let back = poly[u] - poly[v];
    let turn = |w: usize| {
        let out = poly[w] - poly[v];
        let ang = cross2(out, back).atan2(out.dot(&back));
        let cw = if ccw { ang } else { -ang };
        let cw = cw.rem_euclid(std::f64::consts::TAU);
        if cw <= 1e-12 {
            std::f64::consts::TAU
        } else {
            cw
        }
    };
    candidates
        .iter()
        .copied()
        .filter(|&w| !used.contains(&(v, w)))
        .min_by(|&a, &b| turn(a).total_cmp(&turn(b)))
}
