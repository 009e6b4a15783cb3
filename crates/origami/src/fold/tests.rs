use super::*;
use crate::generator::{jittered_grid, rectangle, two_panel, JitterCfg, ReplayToken};
use crate::geom::{signed_area, Plane};
use crate::parser::parse_instruction;
use crate::topology::LetterNames;
use nalgebra::vector;
use proptest::prelude::*;
use std::collections::BTreeSet;

fn run(topo: Topology, line: &str, names: &mut LetterNames) -> FoldResult<(Topology, FoldStep)> {
    let ins = parse_instruction(line)?;
    fold(topo, &ins, &SolverCfg::default(), names)
}

fn panel() -> Topology {
    two_panel(2.0, 1.0, &mut LetterNames::new())
}

fn assert_near(got: nalgebra::Vector3<f64>, want: nalgebra::Vector3<f64>) {
    assert!((got - want).norm() < 1e-9, "got {got:?}, want {want:?}");
}

#[test]
fn two_panel_fold_onto_midpoint_cuts_at_quarter() {
    let mut names = LetterNames::new();
    let (topo, step) = run(panel(), "a to e V", &mut names).unwrap();
    assert_eq!(step.created_points, vec!["g", "h"]);
    assert_eq!(step.rotation.axis, ["g".to_string(), "h".to_string()]);
    assert!((step.rotation.angle_deg - 180.0).abs() < 1e-9);
    assert_eq!(step.rotation.faces, vec![vec!["a", "g", "h", "d"]]);
    assert_eq!(
        topo.faces,
        vec![
            vec!["a", "g", "h", "d"],
            vec!["g", "e", "f", "h"],
            vec!["e", "b", "c", "f"],
        ]
    );
    assert!((topo.pattern["g"] - vector![0.5, 0.0]).norm() < 1e-12);
    assert!((topo.pattern["h"] - vector![0.5, 1.0]).norm() < 1e-12);
    // a lands on e, d on f; the hinge stays.
    assert_near(topo.points["a"], topo.points["e"]);
    assert_near(topo.points["d"], topo.points["f"]);
    assert_near(topo.points["g"], vector![0.5, 0.0, 0.0]);
    assert!((topo.area().unwrap() - 2.0).abs() < 1e-9);
}

#[test]
fn valley_flap_lies_on_top() {
    let (topo, _) = run(panel(), "fold a to top of e", &mut LetterNames::new()).unwrap();
    // face 0 (flap, now facing -z) is on the positive side of face 1 (+z) and vice versa.
    assert_eq!(topo.face_order[&0][&1], 1);
    assert_eq!(topo.face_order[&1][&0], 1);
    assert!(!topo.face_order[&0].contains_key(&2));
}

#[test]
fn mountain_flap_lies_underneath() {
    let (topo, step) = run(panel(), "fold a to bottom of e", &mut LetterNames::new()).unwrap();
    assert_eq!(step.rotation.axis, ["h".to_string(), "g".to_string()]);
    assert!((step.rotation.angle_deg - 180.0).abs() < 1e-9);
    assert_eq!(topo.face_order[&0][&1], -1);
    assert_near(topo.points["a"], topo.points["e"]);
}

#[test]
fn fold_onto_far_corner_uses_existing_crease() {
    let (topo, step) = run(panel(), "a to b V", &mut LetterNames::new()).unwrap();
    assert!(step.created_points.is_empty());
    assert_eq!(step.rotation.axis, ["e".to_string(), "f".to_string()]);
    assert!((step.rotation.angle_deg - 180.0).abs() < 1e-9);
    assert_eq!(topo.faces.len(), 2);
    assert_near(topo.points["a"], vector![2.0, 0.0, 0.0]);
}

#[test]
fn three_point_selection_is_rejected_before_geometry() {
    let start = panel();
    let mut names = LetterNames::new();
    let err = run(start.clone(), "fold [a, b, c] to top of d", &mut names).unwrap_err();
    assert!(matches!(err, FoldError::Selection { .. }));
    let err = run(start.clone(), "fold [a, b] to top of d", &mut names).unwrap_err();
    assert!(matches!(err, FoldError::Selection { .. }));
    // the name source was never consulted
    assert_eq!(start.fresh_name(&mut names), "g");
}

#[test]
fn unknown_names_are_selection_errors() {
    for line in [
        "fold q to top of a",
        "fold a to top of e carry zz",
        "fold a around [e, q] 90",
    ] {
        let err = run(panel(), line, &mut LetterNames::new()).unwrap_err();
        assert!(matches!(err, FoldError::Selection { .. }), "{line}");
    }
}

#[test]
fn degenerate_selections() {
    let err = run(panel(), "fold e to top of e", &mut LetterNames::new()).unwrap_err();
    assert!(matches!(err, FoldError::DegenerateGeometry { .. }));
    let err = run(panel(), "fold e around [e, f]", &mut LetterNames::new()).unwrap_err();
    assert!(matches!(err, FoldError::DegenerateGeometry { .. }));
    let err = run(panel(), "fold a to top of [b, b]", &mut LetterNames::new()).unwrap_err();
    assert!(matches!(err, FoldError::DegenerateGeometry { .. }));
}

#[test]
fn rotation_takes_angle_and_sense() {
    let (topo, step) = run(panel(), "fold a around [e, f] 90", &mut LetterNames::new()).unwrap();
    assert!((step.rotation.angle_deg - 90.0).abs() < 1e-9);
    assert_near(topo.points["a"], vector![1.0, 0.0, 1.0]);
    assert_near(topo.points["b"], vector![2.0, 0.0, 0.0]);

    let (topo, step) = run(panel(), "a around [e, f] M 90", &mut LetterNames::new()).unwrap();
    assert!((step.rotation.angle_deg - 270.0).abs() < 1e-9);
    assert_near(topo.points["a"], vector![1.0, 0.0, -1.0]);

    let (_, step) = run(panel(), "fold a around [e, f]", &mut LetterNames::new()).unwrap();
    assert!((step.rotation.angle_deg - 180.0).abs() < 1e-9);
}

fn assert_rigid(topo: &Topology) {
    for (u, v) in topo.edges() {
        let d3 = (topo.points[&u] - topo.points[&v]).norm();
        let d2 = (topo.pattern[&u] - topo.pattern[&v]).norm();
        assert!((d3 - d2).abs() < 1e-9, "edge {u}-{v}: 3D {d3} vs pattern {d2}");
    }
}

#[test]
fn fold_across_a_bent_panel_is_rejected() {
    let mut names = LetterNames::new();
    let (bent, _) = run(panel(), "fold a around [e, f] 90", &mut names).unwrap();
    // The cut y = 0.5 runs across the upright left panel, away from any usable hinge.
    let err = run(bent, "fold b to top of c", &mut names).unwrap_err();
    assert!(matches!(err, FoldError::DegenerateGeometry { .. }), "{err}");
}

#[test]
fn second_quarter_turn_keeps_faces_rigid() {
    let mut names = LetterNames::new();
    let (bent, _) = run(panel(), "fold a around [e, f] 90", &mut names).unwrap();
    assert_rigid(&bent);
    let (topo, step) = run(bent, "fold c around [e, f] 90", &mut names).unwrap();
    assert!(step.created_points.is_empty());
    assert_eq!(step.rotation.faces, vec![vec!["e", "b", "c", "f"]]);
    assert_near(topo.points["a"], vector![1.0, 0.0, 1.0]);
    assert_near(topo.points["c"], vector![1.0, 1.0, -1.0]);
    assert_near(topo.points["b"], vector![1.0, 0.0, -1.0]);
    assert_rigid(&topo);
}

#[test]
fn selection_shapes_pick_targets() {
    // 1–2: target on the ray d → c at |a − d| = 1 from d, i.e. (1, 1).
    let (topo, _) = run(
        rectangle(2.0, 1.0, &mut LetterNames::new()),
        "fold a to top of [d, c]",
        &mut LetterNames::new(),
    )
    .unwrap();
    assert_near(topo.points["a"], vector![1.0, 1.0, 0.0]);
    // 2–2: target is the projection of b onto line d–c, i.e. c.
    let (topo, _) = run(
        rectangle(2.0, 1.0, &mut LetterNames::new()),
        "fold [b, a] to top of [d, c]",
        &mut LetterNames::new(),
    )
    .unwrap();
    assert_near(topo.points["b"], vector![2.0, 1.0, 0.0]);
    assert_near(topo.points["a"], vector![0.0, 1.0, 0.0]);
}

#[test]
fn consecutive_folds_share_crossings() {
    let mut names = LetterNames::new();
    let square = rectangle(1.0, 1.0, &mut LetterNames::new());
    let (topo, first) = run(square, "fold a to top of b", &mut names).unwrap();
    assert_eq!(first.created_points, vec!["e", "f"]);
    let (topo, second) = run(topo, "fold b to top of c", &mut names).unwrap();
    // e–f is crossed once and shared by both layers; d–a and b–c get one point each.
    assert_eq!(second.created_points, vec!["g", "h", "i"]);
    let with_g = topo.faces_with("g");
    assert_eq!(with_g.len(), 4);
    assert_eq!(topo.faces.len(), 4);
    assert!((topo.area().unwrap() - 1.0).abs() < 1e-9);
    assert_eq!(second.rotation.axis, ["h".to_string(), "g".to_string()]);
    assert!((second.rotation.angle_deg - 180.0).abs() < 1e-9);
    assert_near(topo.points["b"], topo.points["c"]);
    assert_near(topo.points["a"], topo.points["c"]);
}

#[test]
fn carry_and_pin_mismatches_only_warn() {
    let (_, step) = run(
        panel(),
        "fold a to top of e carry b pin a",
        &mut LetterNames::new(),
    )
    .unwrap();
    assert_eq!(step.carry, vec!["b"]);
    assert_eq!(step.pin, vec!["a"]);
}

#[test]
fn branch_walk_splits_concave_face_in_three() {
    // U-shape: the plane y = 0.5 crosses both prongs.
    let pattern = [
        ("a", vector![0.0, 0.0]),
        ("b", vector![3.0, 0.0]),
        ("c", vector![3.0, 1.0]),
        ("d", vector![2.0, 1.0]),
        ("e", vector![2.0, 0.25]),
        ("f", vector![1.0, 0.25]),
        ("g", vector![1.0, 1.0]),
        ("h", vector![0.0, 1.0]),
    ]
    .into_iter()
    .map(|(k, q)| (k.to_string(), q))
    .collect();
    let face: Vec<String> = "abcdefgh".chars().map(String::from).collect();
    let topo = Topology::flat(pattern, vec![face]);
    let plane = Plane::new(vector![0.0, 0.5, 0.0], vector![0.0, 1.0, 0.0], 1e-4).unwrap();
    let split = split_faces(topo, &plane, 1e-4, &mut LetterNames::new()).unwrap();
    assert_eq!(split.created.len(), 4);
    let t = &split.topology;
    assert_eq!(t.faces.len(), 3);
    assert!((t.area().unwrap() - (3.0 - 0.75)).abs() < 1e-9);
    let classes: Vec<_> = t.faces.iter().map(|f| FaceClass::of(f, &split.sides)).collect();
    assert_eq!(classes.iter().filter(|c| **c == FaceClass::Plus).count(), 2);
    assert_eq!(classes.iter().filter(|c| **c == FaceClass::Minus).count(), 1);
}

fn directed_edges_unique(t: &Topology) -> bool {
    let all = t.directed_edges();
    all.iter().collect::<BTreeSet<_>>().len() == all.len()
}

fn pattern_points_distinct(t: &Topology, eps: f64) -> bool {
    let qs: Vec<_> = t.pattern.values().collect();
    (0..qs.len()).all(|i| (i + 1..qs.len()).all(|j| (qs[i] - qs[j]).norm() >= eps))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Splitting a jittered grid by a vertical plane keeps area, edges and points sound.
    #[test]
    fn split_preserves_partition(seed in 0u64..1000, x in 0.05f64..0.95) {
        let cfg = JitterCfg::default();
        let topo = jittered_grid(cfg, ReplayToken { seed, index: 0 }, &mut LetterNames::new());
        let eps = 1e-4;
        let plane = Plane::new(vector![x, 0.0, 0.0], vector![1.0, 0.0, 0.0], eps).unwrap();
        let split = split_faces(topo, &plane, eps, &mut LetterNames::new()).unwrap();
        let t = &split.topology;
        prop_assert!((t.area().unwrap() - 1.0).abs() < 1e-9);
        prop_assert!(directed_edges_unique(t));
        prop_assert!(pattern_points_distinct(t, eps));
        for f in &t.faces {
            prop_assert!(signed_area(&t.loop_pattern(f).unwrap()) > 0.0);
            prop_assert!(FaceClass::of(f, &split.sides) != FaceClass::Straddle);
        }
    }
}
