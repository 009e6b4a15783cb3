//! Renderer-facing outputs: per-face meshes, mesh instructions, reveal lists.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::error::{FoldError, FoldResult};
use crate::fold::FaceRotation;
use crate::geom::{point_on_segment, triangulate};
use crate::topology::{same_loop, Topology};

/// One final face in the flat pattern frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FaceMesh {
    pub names: Vec<String>,
    pub polygon: Vec<Vector2<f64>>,
    /// Indices into `polygon`, same winding.
    pub triangles: Vec<[usize; 3]>,
}

/// Rotation of a set of meshes; `angle` in radians (right-hand rule about `axis[0] → axis[1]`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeshInstruction {
    pub mesh_ids: Vec<usize>,
    pub axis: [String; 2],
    pub angle: f64,
}

/// Names visible after one step, cumulative from the initial sheet.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RevealStep {
    pub points: Vec<String>,
    /// Sorted name pairs of final edges.
    pub edges: Vec<[String; 2]>,
}

pub fn create_face_meshes(topo: &Topology, eps: f64) -> FoldResult<Vec<FaceMesh>> {
    topo.faces
        .iter()
        .map(|face| {
            let polygon = topo.loop_pattern(face)?;
            let triangles = triangulate(&polygon, eps).ok_or_else(|| {
                FoldError::degenerate(format!("face {face:?} is not a simple polygon"))
            })?;
            Ok(FaceMesh {
                names: face.clone(),
                polygon,
                triangles,
            })
        })
        .collect()
}

/// Translate reconciled outlines (face loops) into mesh indices, in fold order.
pub fn create_mesh_instructions(
    faces: &[Vec<String>],
    reconciled: &[FaceRotation],
) -> FoldResult<Vec<MeshInstruction>> {
    reconciled
        .iter()
        .map(|rot| {
            let mesh_ids = rot
                .faces
                .iter()
                .map(|lp| {
                    faces.iter().position(|f| same_loop(f, lp)).ok_or_else(|| {
                        FoldError::reconciliation(format!("face {lp:?} is not a final face"))
                    })
                })
                .collect::<FoldResult<Vec<_>>>()?;
            Ok(MeshInstruction {
                mesh_ids,
                axis: rot.axis.clone(),
                angle: rot.angle_deg.to_radians(),
            })
        })
        .collect()
}

/// Final points and edges already present in `step`.
///
/// A final edge is revealed once its pattern segment lies on some edge of the
/// step's topology.
pub fn reveal_step(final_topo: &Topology, step: &Topology, eps: f64) -> FoldResult<RevealStep> {
    let points = final_topo
        .points
        .keys()
        .filter(|n| step.contains(n))
        .cloned()
        .collect();
    let step_edges = step
        .edges()
        .into_iter()
        .map(|(a, b)| Ok((step.pattern_of(&a)?, step.pattern_of(&b)?)))
        .collect::<FoldResult<Vec<_>>>()?;
    let mut edges = Vec::new();
    for (u, v) in final_topo.edges() {
        let (qu, qv) = (final_topo.pattern_of(&u)?, final_topo.pattern_of(&v)?);
        let present = step_edges
            .iter()
            .any(|(a, b)| point_on_segment(qu, *a, *b, eps) && point_on_segment(qv, *a, *b, eps));
        if present {
            edges.push([u, v]);
        }
    }
    Ok(RevealStep { points, edges })
}
