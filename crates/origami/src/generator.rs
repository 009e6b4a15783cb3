//! Initial sheets: rectangles, grids, a pre-split two-panel sheet, jittered grids.
//!
//! Model
//! - Every generator returns a flat `Topology` (z = 0, pattern = xy) with CCW
//!   faces and an empty stacking order. Names are drawn from the caller's
//!   `NameSource` in a fixed order, so `LetterNames` gives `a, b, c, …`.
//! - Jittered grids are reproducible from a `ReplayToken` `(seed, index)`
//!   mixed into a single `StdRng`.

use std::collections::BTreeMap;

use nalgebra::{vector, Vector2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::cfg::SolverCfg;
use crate::parser::Dimensions;
use crate::topology::{NameSource, Topology};

/// Build a flat topology from named pattern points and index faces.
fn assemble(
    coords: &[Vector2<f64>],
    faces: &[Vec<usize>],
    names: &mut dyn NameSource,
) -> Topology {
    let mut scratch = Topology::default();
    let mut labels = Vec::with_capacity(coords.len());
    let mut pattern = BTreeMap::new();
    for q in coords {
        let n = scratch.fresh_name(names);
        scratch.points.insert(n.clone(), nalgebra::Vector3::zeros());
        pattern.insert(n.clone(), *q);
        labels.push(n);
    }
    let faces = faces
        .iter()
        .map(|f| f.iter().map(|&i| labels[i].clone()).collect())
        .collect();
    Topology::flat(pattern, faces)
}

/// Axis-aligned rectangle with corners `a(0,0) b(w,0) c(w,h) d(0,h)`.
pub fn rectangle(width: f64, height: f64, names: &mut dyn NameSource) -> Topology {
    let coords = [
        vector![0.0, 0.0],
        vector![width, 0.0],
        vector![width, height],
        vector![0.0, height],
    ];
    assemble(&coords, &[vec![0, 1, 2, 3]], names)
}

/// Width and height for `dims` scaled to area `cfg.paper_area`.
pub fn sheet_size(dims: Dimensions, cfg: &SolverCfg) -> (f64, f64) {
    let r = dims.ratio();
    let a = cfg.paper_area;
    ((a * r).sqrt(), (a / r).sqrt())
}

/// Initial sheet for a parsed dimensions line.
pub fn from_dimensions(dims: Dimensions, cfg: &SolverCfg, names: &mut dyn NameSource) -> Topology {
    let (w, h) = sheet_size(dims, cfg);
    rectangle(w, h, names)
}

/// `nx × ny` grid of CCW quads; points are named row by row from the origin.
pub fn grid(width: f64, height: f64, nx: usize, ny: usize, names: &mut dyn NameSource) -> Topology {
    let (nx, ny) = (nx.max(1), ny.max(1));
    let coords: Vec<Vector2<f64>> = (0..=ny)
        .flat_map(|j| {
            (0..=nx).map(move |i| {
                vector![
                    width * i as f64 / nx as f64,
                    height * j as f64 / ny as f64
                ]
            })
        })
        .collect();
    assemble(&coords, &grid_faces(nx, ny), names)
}

fn grid_faces(nx: usize, ny: usize) -> Vec<Vec<usize>> {
    let at = |i: usize, j: usize| j * (nx + 1) + i;
    let mut faces = Vec::with_capacity(nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            faces.push(vec![at(i, j), at(i + 1, j), at(i + 1, j + 1), at(i, j + 1)]);
        }
    }
    faces
}

/// Rectangle pre-split at `x = w/2`: points `a b c d` (corners) and `e f`
/// (bottom/top midpoints); faces `[a,e,f,d]` and `[e,b,c,f]`.
pub fn two_panel(width: f64, height: f64, names: &mut dyn NameSource) -> Topology {
    let coords = [
        vector![0.0, 0.0],
        vector![width, 0.0],
        vector![width, height],
        vector![0.0, height],
        vector![0.5 * width, 0.0],
        vector![0.5 * width, height],
    ];
    assemble(&coords, &[vec![0, 4, 5, 3], vec![4, 1, 2, 5]], names)
}

/// Replay token to make draws reproducible and indexable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayToken {
    pub seed: u64,
    pub index: u64,
}

impl ReplayToken {
    #[inline]
    pub fn to_std_rng(self) -> StdRng {
        // SplitMix64 finalizer over seed and index.
        fn mix(mut x: u64) -> u64 {
            x ^= x >> 30;
            x = x.wrapping_mul(0xbf58476d1ce4e5b9);
            x ^= x >> 27;
            x = x.wrapping_mul(0x94d049bb133111eb);
            x ^ (x >> 31)
        }
        let k = mix(self.seed ^ mix(self.index.wrapping_add(0x9e3779b97f4a7c15)));
        StdRng::seed_from_u64(k)
    }
}

/// Jittered grid configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct JitterCfg {
    pub width: f64,
    pub height: f64,
    pub nx: usize,
    pub ny: usize,
    /// Interior displacement as a fraction of the cell size. Clamped to `[0, 0.3]`.
    pub jitter: f64,
}

impl Default for JitterCfg {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
            nx: 3,
            ny: 3,
            jitter: 0.2,
        }
    }
}

/// Grid whose interior vertices are displaced by a bounded random offset.
///
/// Boundary vertices stay put (they only slide along their side), so the outline
/// is the plain rectangle and the total area is `width * height`.
pub fn jittered_grid(cfg: JitterCfg, tok: ReplayToken, names: &mut dyn NameSource) -> Topology {
    let (nx, ny) = (cfg.nx.max(1), cfg.ny.max(1));
    let (dx, dy) = (cfg.width / nx as f64, cfg.height / ny as f64);
    let amp = cfg.jitter.clamp(0.0, 0.3);
    let mut rng = tok.to_std_rng();
    let mut coords = Vec::with_capacity((nx + 1) * (ny + 1));
    for j in 0..=ny {
        for i in 0..=nx {
            let mut q = vector![i as f64 * dx, j as f64 * dy];
            if i > 0 && i < nx {
                q.x += (rng.gen::<f64>() * 2.0 - 1.0) * amp * dx;
            }
            if j > 0 && j < ny {
                q.y += (rng.gen::<f64>() * 2.0 - 1.0) * amp * dy;
            }
            coords.push(q);
        }
    }
    assemble(&coords, &grid_faces(nx, ny), names)
}

/// Named starting sheets.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Example {
    Rectangle { ratio: f64 },
    TwoPanel { ratio: f64 },
    Grid { ratio: f64, nx: usize, ny: usize },
    JitteredGrid { cfg: JitterCfg, token: ReplayToken },
}

impl Example {
    /// Build the sheet; ratio-based examples are scaled to `cfg.paper_area`.
    pub fn build(&self, cfg: &SolverCfg, names: &mut dyn NameSource) -> Topology {
        match *self {
            Example::Rectangle { ratio } => from_dimensions(Dimensions::Ratio(ratio), cfg, names),
            Example::TwoPanel { ratio } => {
                let (w, h) = sheet_size(Dimensions::Ratio(ratio), cfg);
                two_panel(w, h, names)
            }
            Example::Grid { ratio, nx, ny } => {
                let (w, h) = sheet_size(Dimensions::Ratio(ratio), cfg);
                grid(w, h, nx, ny, names)
            }
            Example::JitteredGrid { cfg: jc, token } => jittered_grid(jc, token, names),
        }
    }
}
