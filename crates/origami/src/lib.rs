//! Origami fold solver.
//!
//! Text instructions in, renderer-ready folds out: the solver parses a fold
//! sequence, splits and rotates faces of a paper sheet step by step, then
//! reconciles every fold with the final face subdivision so that each fold
//! becomes a rigid rotation of a fixed set of flat meshes.
//!
//! Layout
//! - `geom`: vector, plane and polygon primitives (one tolerance, `GeomCfg`).
//! - `parser`: instruction grammar.
//! - `topology`: the sheet state and name sources.
//! - `generator`: initial sheets.
//! - `fold`: one fold step.
//! - `solver`: the whole sequence, reveal lists, reconciliation, meshes.
//! - `playback`: data-only animation state machine.

pub mod cfg;
pub mod error;
pub mod fold;
pub mod generator;
pub mod geom;
pub mod parser;
pub mod playback;
pub mod solver;
pub mod topology;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use cfg::SolverCfg;
pub use error::{FoldError, SolveError};
pub use geom::GeomCfg;
pub use solver::{solve_origami, OrigamiSolver, SolveOutput};
pub use topology::{LetterNames, NameSource, Topology};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::cfg::SolverCfg;
    pub use crate::error::{FoldError, FoldResult, SolveError, SolveResult};
    pub use crate::fold::{fold, FaceRotation, FoldStep};
    pub use crate::generator::{
        from_dimensions, grid, jittered_grid, rectangle, two_panel, Example, JitterCfg,
        ReplayToken,
    };
    pub use crate::geom::GeomCfg;
    pub use crate::parser::{parse_dimensions, parse_instruction, Dimensions, Instruction};
    pub use crate::playback::{Direction, PlayState, Playback};
    pub use crate::solver::{
        solve_origami, FaceMesh, MeshInstruction, OrigamiSolver, RevealStep, SolveOutput,
    };
    pub use crate::topology::{LetterNames, NameSource, Topology};
    pub use nalgebra::{Vector2 as Vec2, Vector3 as Vec3};
}
