//! Whole-sequence solving: fold loop, history, reveal lists, reconciliation, meshes.
//!
//! Purpose
//! - Drive `fold::fold` over an instruction text and turn the result into what
//!   a renderer replays: flat face meshes plus one mesh instruction per fold.
//!
//! Flow
//! - The first non-blank line is the dimensions line; it picks the initial sheet.
//! - Each further non-blank line is one fold. A failing fold aborts the solve
//!   with its 0-based line index (blank lines and the dimensions line count).
//! - After the loop every fold's outlines are reconciled against the final
//!   faces, the sheet is laid flat and meshes/instructions are built.
//!
//! References
//! - `fold` for the per-step semantics, `reconcile` for outline matching.

mod mesh;
mod reconcile;

pub use mesh::{
    create_face_meshes, create_mesh_instructions, reveal_step, FaceMesh, MeshInstruction,
    RevealStep,
};
pub use reconcile::reconcile_outline;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cfg::SolverCfg;
use crate::error::{FoldError, SolveError, SolveResult};
use crate::fold::{fold, FaceRotation, FoldStep};
use crate::generator::from_dimensions;
use crate::parser::{parse_dimensions, parse_instruction};
use crate::topology::{LetterNames, NameSource, Topology};

/// One solved fold with its input line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    /// 0-based line index in the input.
    pub index: usize,
    pub line: String,
    pub step: FoldStep,
    /// Topology right after this fold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topology: Option<Topology>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SolveOutput {
    pub meshes: Vec<FaceMesh>,
    pub instructions: Vec<MeshInstruction>,
    /// Index 0 is the initial sheet, `k` the state after fold `k`.
    pub reveal: Vec<RevealStep>,
    pub steps: Vec<StepRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial: Option<Topology>,
    /// Final topology, laid flat.
    pub topology: Topology,
}

impl SolveOutput {
    /// Drop the per-step topology snapshots.
    pub fn without_history(mut self) -> Self {
        self.initial = None;
        for s in &mut self.steps {
            s.topology = None;
        }
        self
    }

    /// Snapshots `[initial, after fold 1, …]` when history was kept.
    pub fn history(&self) -> Vec<&Topology> {
        self.initial
            .iter()
            .chain(self.steps.iter().filter_map(|s| s.topology.as_ref()))
            .collect()
    }
}

/// Solve with the default configuration and letter names.
pub fn solve_origami(text: &str) -> SolveResult<SolveOutput> {
    OrigamiSolver::new(SolverCfg::default()).solve(text)
}

/// Solver with injected configuration and name source.
///
/// `names` is a template: every solve draws from a fresh clone, so repeated
/// solves on one instance name their sheets identically.
pub struct OrigamiSolver<N: NameSource + Clone = LetterNames> {
    pub cfg: SolverCfg,
    names: N,
}

impl OrigamiSolver<LetterNames> {
    pub fn new(cfg: SolverCfg) -> Self {
        Self::with_names(cfg, LetterNames::new())
    }
}

impl<N: NameSource + Clone> OrigamiSolver<N> {
    pub fn with_names(cfg: SolverCfg, names: N) -> Self {
        Self { cfg, names }
    }

    /// Solve a full instruction text (dimensions line first).
    pub fn solve(&self, text: &str) -> SolveResult<SolveOutput> {
        let mut names = self.names.clone();
        let mut lines = text
            .lines()
            .enumerate()
            .filter(|(_, l)| !l.trim().is_empty());
        let Some((index, first)) = lines.next() else {
            return Err(SolveError {
                index: 0,
                line: String::new(),
                source: FoldError::parse("empty input: expected `paper dimensions: [..]`"),
            });
        };
        let dims = parse_dimensions(first).map_err(|source| SolveError {
            index,
            line: first.to_string(),
            source,
        })?;
        let initial = from_dimensions(dims, &self.cfg, &mut names);
        self.run(initial, lines, &mut names)
    }

    /// Solve fold lines (no dimensions line) starting from `initial`.
    pub fn solve_from<S: AsRef<str>>(
        &self,
        initial: Topology,
        lines: &[S],
    ) -> SolveResult<SolveOutput> {
        let lines = lines
            .iter()
            .map(|l| <S as AsRef<str>>::as_ref(l))
            .enumerate()
            .filter(|(_, l)| !l.trim().is_empty());
        self.run(initial, lines, &mut self.names.clone())
    }

    fn run<'a>(
        &self,
        initial: Topology,
        lines: impl Iterator<Item = (usize, &'a str)>,
        names: &mut N,
    ) -> SolveResult<SolveOutput> {
        let eps = self.cfg.eps();
        let mut topo = initial.clone();
        let mut steps: Vec<StepRecord> = Vec::new();
        for (index, line) in lines {
            let wrap = |source| SolveError {
                index,
                line: line.to_string(),
                source,
            };
            let ins = parse_instruction(line).map_err(wrap)?;
            let (next, step) = fold(topo, &ins, &self.cfg, names).map_err(wrap)?;
            topo = next;
            steps.push(StepRecord {
                index,
                line: line.trim().to_string(),
                step,
                topology: Some(topo.clone()),
            });
        }

        let reveal = std::iter::once(&initial)
            .chain(steps.iter().filter_map(|s| s.topology.as_ref()))
            .map(|t| reveal_step(&topo, t, eps))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| SolveError {
                index: 0,
                line: String::new(),
                source,
            })?;

        let mut reconciled: Vec<FaceRotation> = Vec::with_capacity(steps.len());
        for rec in &steps {
            let wrap = |source| SolveError {
                index: rec.index,
                line: rec.line.clone(),
                source,
            };
            let mut ids: Vec<usize> = Vec::new();
            for outline in &rec.step.rotation.faces {
                ids.extend(reconcile_outline(&topo, outline, eps).map_err(wrap)?);
            }
            ids.sort_unstable();
            ids.dedup();
            reconciled.push(FaceRotation {
                faces: ids.iter().map(|&i| topo.faces[i].clone()).collect(),
                axis: rec.step.rotation.axis.clone(),
                angle_deg: rec.step.rotation.angle_deg,
            });
        }

        let flat = topo.flattened();
        let top_level = |source| SolveError {
            index: 0,
            line: String::new(),
            source,
        };
        let meshes = create_face_meshes(&flat, eps).map_err(top_level)?;
        let instructions = create_mesh_instructions(&flat.faces, &reconciled).map_err(top_level)?;
        info!(
            folds = steps.len(),
            faces = flat.faces.len(),
            points = flat.points.len(),
            "solve finished"
        );
        Ok(SolveOutput {
            meshes,
            instructions,
            reveal,
            steps,
            initial: Some(initial),
            topology: flat,
        })
    }
}
