//! Map fold outlines onto the final (fully subdivided) faces.
//!
//! An outline is the loop of a flap face at the time of its fold; later folds
//! may have cut it further. Seeds are final faces with a directed edge running
//! along an outline edge (pattern frame, same direction). From the seeds a
//! breadth-first walk crosses shared edges, never one that lies on the outline.
//! The visited faces must cover exactly the outline's area.

use std::collections::{BTreeSet, VecDeque};

use nalgebra::Vector2;

use crate::error::{FoldError, FoldResult};
use crate::geom::{cross2, point_on_segment, segment_within, signed_area};
use crate::topology::{loop_edges, Topology};

type Seg = (Vector2<f64>, Vector2<f64>);

fn pattern_edges(topo: &Topology, face: &[String]) -> FoldResult<Vec<Seg>> {
    loop_edges(face)
        .map(|(a, b)| Ok((topo.pattern_of(a)?, topo.pattern_of(b)?)))
        .collect()
}

/// Segments `s` and `t` overlap with positive length and run in opposite directions.
fn shares_reversed(s: Seg, t: Seg, eps: f64) -> bool {
    let d = s.1 - s.0;
    let len = d.norm();
    if len < eps {
        return false;
    }
    let off = |p: Vector2<f64>| (cross2(d, p - s.0) / len).abs();
    if off(t.0) > eps || off(t.1) > eps || (t.1 - t.0).dot(&d) >= 0.0 {
        return false;
    }
    let along = |p: Vector2<f64>| (p - s.0).dot(&d) / len;
    let (lo, hi) = {
        let (x, y) = (along(t.0), along(t.1));
        (x.min(y), x.max(y))
    };
    hi.min(len) - lo.max(0.0) > eps
}

/// Indices (ascending) of the final faces that make up `outline`.
pub fn reconcile_outline(
    final_topo: &Topology,
    outline: &[String],
    eps: f64,
) -> FoldResult<Vec<usize>> {
    let boundary = pattern_edges(final_topo, outline)?;
    let on_boundary = |s: &Seg| {
        boundary
            .iter()
            .any(|b| point_on_segment(s.0, b.0, b.1, eps) && point_on_segment(s.1, b.0, b.1, eps))
    };
    let faces: Vec<Vec<Seg>> = final_topo
        .faces
        .iter()
        .map(|f| pattern_edges(final_topo, f))
        .collect::<FoldResult<_>>()?;

    let seeds: Vec<usize> = (0..faces.len())
        .filter(|&i| {
            faces[i]
                .iter()
                .any(|e| boundary.iter().any(|b| segment_within(e.0, e.1, b.0, b.1, eps)))
        })
        .collect();
    if seeds.is_empty() {
        return Err(FoldError::reconciliation(format!(
            "no final face runs along outline {outline:?}"
        )));
    }

    let mut visited: BTreeSet<usize> = seeds.iter().copied().collect();
    let mut queue: VecDeque<usize> = seeds.into_iter().collect();
    while let Some(i) = queue.pop_front() {
        for e in faces[i].iter().filter(|e| !on_boundary(e)) {
            for j in 0..faces.len() {
                if visited.contains(&j) {
                    continue;
                }
                if faces[j].iter().any(|t| shares_reversed(*e, *t, eps)) {
                    visited.insert(j);
                    queue.push_back(j);
                }
            }
        }
    }

    let want = signed_area(&final_topo.loop_pattern(outline)?);
    let got: f64 = visited
        .iter()
        .map(|&i| final_topo.loop_area(&final_topo.faces[i]))
        .sum::<FoldResult<f64>>()?;
    if (want - got).abs() > eps {
        return Err(FoldError::reconciliation(format!(
            "faces {visited:?} cover area {got}, outline {outline:?} has {want}"
        )));
    }
    Ok(visited.into_iter().collect())
}
