//! Sheet topology: named points, face loops, the flat pattern and stacking order.
//!
//! Purpose
//! - One value type that every fold consumes and returns. Snapshots are plain
//!   clones; nothing is shared between steps.
//!
//! Model
//! - `points`: 3D coordinates by name. Points are never removed.
//! - `pattern`: fold-invariant 2D coordinate of every point on the unfolded sheet.
//! - `faces`: cyclic name loops, counter-clockwise in the pattern frame.
//! - `face_order[i][j] = +1` if face `i` lies on the positive side of face `j`'s
//!   oriented normal (the normal of its pattern-CCW loop carried into 3D), `-1`
//!   for the negative side. Rigid motions of both faces preserve an entry.
//!
//! Names
//! - Fresh names come from an injected `NameSource`; `LetterNames` yields the
//!   bijective base-26 sequence `a, …, z, aa, ab, …`.

use std::collections::{BTreeMap, BTreeSet};

use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{FoldError, FoldResult};
use crate::geom::{coincide2, lift, signed_area};

/// Face stacking relation, see module docs.
pub type FaceOrder = BTreeMap<usize, BTreeMap<usize, i8>>;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    pub points: BTreeMap<String, Vector3<f64>>,
    pub faces: Vec<Vec<String>>,
    pub pattern: BTreeMap<String, Vector2<f64>>,
    pub face_order: FaceOrder,
}

impl Topology {
    /// Flat topology from pattern coordinates and faces (3D = pattern at `z = 0`).
    pub fn flat(pattern: BTreeMap<String, Vector2<f64>>, faces: Vec<Vec<String>>) -> Self {
        let points = pattern.iter().map(|(k, q)| (k.clone(), lift(*q))).collect();
        Self {
            points,
            faces,
            pattern,
            face_order: FaceOrder::new(),
        }
    }

    /// 3D coordinate of `name`; unknown names are a selection error.
    pub fn point(&self, name: &str) -> FoldResult<Vector3<f64>> {
        self.points
            .get(name)
            .copied()
            .ok_or_else(|| FoldError::selection(format!("unknown point `{name}`")))
    }

    /// Pattern coordinate of `name`; unknown names are a selection error.
    pub fn pattern_of(&self, name: &str) -> FoldResult<Vector2<f64>> {
        self.pattern
            .get(name)
            .copied()
            .ok_or_else(|| FoldError::selection(format!("unknown point `{name}`")))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.points.contains_key(name)
    }

    /// Pattern polygon of a loop of names.
    pub fn loop_pattern(&self, face: &[String]) -> FoldResult<Vec<Vector2<f64>>> {
        face.iter().map(|n| self.pattern_of(n)).collect()
    }

    /// 3D polygon of a loop of names.
    pub fn loop_points(&self, face: &[String]) -> FoldResult<Vec<Vector3<f64>>> {
        face.iter().map(|n| self.point(n)).collect()
    }

    /// Oriented unit normal of a loop in 3D (Newell's method); `None` if degenerate.
    pub fn loop_normal(&self, face: &[String], eps: f64) -> Option<Vector3<f64>> {
        let pts = self.loop_points(face).ok()?;
        let n = pts.len();
        let mut acc = Vector3::zeros();
        for i in 0..n {
            acc += pts[i].cross(&pts[(i + 1) % n]);
        }
        crate::geom::unit(acc, eps * eps)
    }

    /// Pattern-frame area of one loop (positive for CCW).
    pub fn loop_area(&self, face: &[String]) -> FoldResult<f64> {
        Ok(signed_area(&self.loop_pattern(face)?))
    }

    /// Total pattern-frame area of all faces.
    pub fn area(&self) -> FoldResult<f64> {
        self.faces.iter().map(|f| self.loop_area(f)).sum()
    }

    /// Name of an existing point at pattern coordinate `q`, if any.
    pub fn name_at(&self, q: Vector2<f64>, eps: f64) -> Option<&str> {
        self.pattern
            .iter()
            .find(|(_, p)| coincide2(**p, q, eps))
            .map(|(k, _)| k.as_str())
    }

    /// Directed edges `(from, to)` of every face loop.
    pub fn directed_edges(&self) -> Vec<(String, String)> {
        self.faces
            .iter()
            .flat_map(|f| loop_edges(f).map(|(a, b)| (a.to_string(), b.to_string())))
            .collect()
    }

    /// Undirected edges as sorted name pairs.
    pub fn edges(&self) -> BTreeSet<(String, String)> {
        self.directed_edges()
            .into_iter()
            .map(|(a, b)| if a <= b { (a, b) } else { (b, a) })
            .collect()
    }

    /// Indices of faces whose loop contains `name`.
    pub fn faces_with(&self, name: &str) -> Vec<usize> {
        self.faces
            .iter()
            .enumerate()
            .filter(|(_, f)| f.iter().any(|n| n == name))
            .map(|(i, _)| i)
            .collect()
    }

    /// Draw the next name from `names` that is not already a point.
    pub fn fresh_name(&self, names: &mut dyn NameSource) -> String {
        loop {
            let n = names.next_name();
            if !self.contains(&n) {
                return n;
            }
        }
    }

    /// Same sheet laid flat: 3D coordinates from the pattern, stacking order cleared.
    pub fn flattened(&self) -> Self {
        Self::flat(self.pattern.clone(), self.faces.clone())
    }

    /// Record that face `i` lies on side `s` of face `j`, and the mirrored entry.
    ///
    /// `alignment` is the sign of `n_i · n_j` for the two (coplanar) oriented normals.
    pub fn relate(&mut self, i: usize, j: usize, s: i8, alignment: i8) {
        if i == j || s == 0 {
            return;
        }
        self.face_order.entry(i).or_default().insert(j, s);
        let mirrored = if alignment < 0 { s } else { -s };
        self.face_order.entry(j).or_default().insert(i, mirrored);
    }

    /// Replace face `index` by `parts` (in place); the parts inherit its stacking
    /// relations and later face indices shift accordingly.
    pub fn replace_face(&mut self, index: usize, parts: Vec<Vec<String>>) {
        let k = parts.len();
        if k == 0 || index >= self.faces.len() {
            return;
        }
        let remap = |i: usize| -> Vec<usize> {
            if i < index {
                vec![i]
            } else if i == index {
                (index..index + k).collect()
            } else {
                vec![i + k - 1]
            }
        };
        let mut order = FaceOrder::new();
        for (&i, row) in &self.face_order {
            for (&j, &s) in row {
                for ni in remap(i) {
                    for nj in remap(j) {
                        order.entry(ni).or_default().insert(nj, s);
                    }
                }
            }
        }
        self.face_order = order;
        self.faces.splice(index..=index, parts);
    }
}

/// Directed edges of a cyclic loop.
pub fn loop_edges(face: &[String]) -> impl Iterator<Item = (&str, &str)> + '_ {
    let n = face.len();
    (0..n).map(move |i| (face[i].as_str(), face[(i + 1) % n].as_str()))
}

/// Cyclic equality of two loops (same direction, any starting vertex).
pub fn same_loop(a: &[String], b: &[String]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    if a.is_empty() {
        return true;
    }
    (0..b.len()).any(|shift| (0..a.len()).all(|i| a[i] == b[(i + shift) % b.len()]))
}

/// Source of fresh point names.
pub trait NameSource {
    fn next_name(&mut self) -> String;
}

/// Bijective base-26 names: `a … z, aa, ab, …`.
#[derive(Clone, Debug, Default)]
pub struct LetterNames {
    next: usize,
}

impl LetterNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the sequence at position `n` (`0` is `a`).
    pub fn starting_at(n: usize) -> Self {
        Self { next: n }
    }

    pub fn letters(mut n: usize) -> String {
        let mut out = Vec::new();
        loop {
            out.push(b'a' + (n % 26) as u8);
            if n < 26 {
                break;
            }
            n = n / 26 - 1;
        }
        out.reverse();
        String::from_utf8_lossy(&out).into_owned()
    }
}

impl NameSource for LetterNames {
    fn next_name(&mut self) -> String {
        let s = Self::letters(self.next);
        self.next += 1;
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn unit_square() -> Topology {
        let pattern = [
            ("a", vector![0.0, 0.0]),
            ("b", vector![1.0, 0.0]),
            ("c", vector![1.0, 1.0]),
            ("d", vector![0.0, 1.0]),
        ]
        .into_iter()
        .map(|(k, q)| (k.to_string(), q))
        .collect();
        Topology::flat(pattern, vec![names(&["a", "b", "c", "d"])])
    }

    #[test]
    fn letter_names_are_bijective_base26() {
        assert_eq!(LetterNames::letters(0), "a");
        assert_eq!(LetterNames::letters(25), "z");
        assert_eq!(LetterNames::letters(26), "aa");
        assert_eq!(LetterNames::letters(27), "ab");
        assert_eq!(LetterNames::letters(26 + 26 * 26), "aaa");
        let mut src = LetterNames::starting_at(24);
        let got: Vec<_> = (0..3).map(|_| src.next_name()).collect();
        assert_eq!(got, ["y", "z", "aa"]);
    }

    #[test]
    fn fresh_names_skip_existing_points() {
        let topo = unit_square();
        let mut src = LetterNames::new();
        assert_eq!(topo.fresh_name(&mut src), "e");
        assert_eq!(topo.fresh_name(&mut src), "f");
    }

    #[test]
    fn flat_square_normal_area_and_edges() {
        let topo = unit_square();
        assert!((topo.area().unwrap() - 1.0).abs() < 1e-12);
        let n = topo.loop_normal(&topo.faces[0], 1e-4).unwrap();
        assert!((n - vector![0.0, 0.0, 1.0]).norm() < 1e-12);
        assert_eq!(topo.edges().len(), 4);
        assert!(topo.edges().contains(&("a".to_string(), "d".to_string())));
        assert_eq!(topo.name_at(vector![1.0, 1.0 + 1e-6], 1e-4), Some("c"));
        assert!(matches!(topo.point("q"), Err(FoldError::Selection { .. })));
    }

    #[test]
    fn replace_face_inherits_and_shifts_order() {
        let mut topo = unit_square();
        topo.faces.push(names(&["x", "y", "z"]));
        topo.relate(0, 1, 1, 1);
        topo.replace_face(0, vec![names(&["a", "b", "d"]), names(&["b", "c", "d"])]);
        assert_eq!(topo.faces.len(), 3);
        assert_eq!(topo.face_order[&0][&2], 1);
        assert_eq!(topo.face_order[&1][&2], 1);
        assert_eq!(topo.face_order[&2][&0], -1);
        assert_eq!(topo.face_order[&2][&1], -1);
    }

    #[test]
    fn relate_mirrors_by_normal_alignment() {
        let mut topo = Topology::default();
        topo.relate(3, 4, 1, -1);
        assert_eq!(topo.face_order[&3][&4], 1);
        assert_eq!(topo.face_order[&4][&3], 1);
    }

    #[test]
    fn cyclic_loop_equality() {
        let a = names(&["a", "b", "c", "d"]);
        assert!(same_loop(&a, &names(&["c", "d", "a", "b"])));
        assert!(!same_loop(&a, &names(&["d", "c", "b", "a"])));
        assert!(!same_loop(&a, &names(&["a", "b", "c"])));
    }

    #[test]
    fn flattened_clears_order() {
        let mut topo = unit_square();
        topo.points.insert("a".into(), vector![0.0, 0.0, 3.0]);
        topo.face_order.entry(0).or_default().insert(0, 1);
        let flat = topo.flattened();
        assert_eq!(flat.points["a"], vector![0.0, 0.0, 0.0]);
        assert!(flat.face_order.is_empty());
    }
}
