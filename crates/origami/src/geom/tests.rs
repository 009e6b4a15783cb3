use super::*;
use nalgebra::{vector, Vector2, Vector3};
use proptest::prelude::*;

const EPS: f64 = DEFAULT_EPS;

fn square() -> Vec<Vector2<f64>> {
    vec![
        vector![0.0, 0.0],
        vector![1.0, 0.0],
        vector![1.0, 1.0],
        vector![0.0, 1.0],
    ]
}

#[test]
fn plane_sides_respect_tolerance() {
    let plane = Plane::bisector(vector![0.0, 0.0, 0.0], vector![2.0, 0.0, 0.0], EPS).unwrap();
    assert_eq!(plane.side(vector![0.2, 5.0, 0.0], EPS), Side::Minus);
    assert_eq!(plane.side(vector![1.0 + 0.5 * EPS, 3.0, 1.0], EPS), Side::On);
    assert_eq!(plane.side(vector![1.5, 0.0, 0.0], EPS), Side::Plus);
    assert!(Side::Minus.opposes(Side::Plus));
    assert!(!Side::On.opposes(Side::Plus));
    assert!(Plane::bisector(vector![1.0, 1.0, 1.0], vector![1.0, 1.0, 1.0], EPS).is_none());
}

#[test]
fn segment_plane_crossing_parameter() {
    let plane = Plane::new(vector![0.25, 0.0, 0.0], vector![1.0, 0.0, 0.0], EPS).unwrap();
    let hit = intersect_segment_plane(vector![0.0, 0.0, 0.0], vector![1.0, 2.0, 0.0], &plane, EPS)
        .expect("crossing");
    assert!((hit.t - 0.25).abs() < 1e-12);
    assert!((hit.point - vector![0.25, 0.5, 0.0]).norm() < 1e-12);
    // same side -> none; parallel in-plane -> none
    assert!(
        intersect_segment_plane(vector![0.5, 0.0, 0.0], vector![0.9, 1.0, 0.0], &plane, EPS)
            .is_none()
    );
    assert!(
        intersect_segment_plane(vector![0.25, 0.0, 0.0], vector![0.25, 1.0, 0.0], &plane, EPS)
            .is_none()
    );
}

#[test]
fn signed_angle_full_range() {
    let z = vector![0.0, 0.0, 1.0];
    let x = vector![1.0, 0.0, 0.0];
    let y = vector![0.0, 1.0, 0.0];
    assert!((signed_angle_deg(x, y, z, EPS).unwrap() - 90.0).abs() < 1e-9);
    assert!((signed_angle_deg(y, x, z, EPS).unwrap() - 270.0).abs() < 1e-9);
    assert!((signed_angle_deg(x, -x, z, EPS).unwrap() - 180.0).abs() < 1e-9);
    assert!(signed_angle_deg(x, x, z, EPS).unwrap().abs() < 1e-9);
    // axis components are ignored
    assert!((signed_angle_deg(x + z, y + 3.0 * z, z, EPS).unwrap() - 90.0).abs() < 1e-9);
    assert!(signed_angle_deg(z, x, z, EPS).is_none());
    assert_eq!(normalize_deg(-90.0), 270.0);
    assert_eq!(normalize_deg(720.0), 0.0);
}

#[test]
fn projection_and_rotation() {
    let a = vector![0.0, 0.0, 0.0];
    let b = vector![0.0, 2.0, 0.0];
    let p = project_point_onto_line(a, b, vector![3.0, 1.0, 4.0], EPS).unwrap();
    assert!((p - vector![0.0, 1.0, 0.0]).norm() < 1e-12);
    assert!(project_point_onto_line(a, a, b, EPS).is_none());
    // half turn about +y carries +x onto -x
    let r = rotate_about_axis(vector![1.0, 0.5, 0.0], a, b, std::f64::consts::PI, EPS).unwrap();
    assert!((r - vector![-1.0, 0.5, 0.0]).norm() < 1e-12);
    // quarter turn about +y lifts -x towards +z
    let q = rotate_about_axis(vector![-1.0, 0.0, 0.0], a, b, std::f64::consts::FRAC_PI_2, EPS)
        .unwrap();
    assert!((q - vector![0.0, 0.0, 1.0]).norm() < 1e-12);
}

#[test]
fn polygon_area_and_containment() {
    let sq = square();
    assert!((signed_area(&sq) - 1.0).abs() < 1e-12);
    let rev: Vec<_> = sq.iter().rev().cloned().collect();
    assert!((signed_area(&rev) + 1.0).abs() < 1e-12);
    assert!(contains_strict(&sq, vector![0.5, 0.5], EPS));
    assert!(!contains_strict(&sq, vector![1.0, 0.5], EPS));
    assert!(!contains_strict(&sq, vector![1.5, 0.5], EPS));
    assert!(point_on_segment(vector![0.3, 0.0], sq[0], sq[1], EPS));
    assert!(!point_on_segment(vector![1.3, 0.0], sq[0], sq[1], EPS));
    assert!(segment_within(vector![0.2, 0.0], vector![0.6, 0.0], sq[0], sq[1], EPS));
    assert!(!segment_within(vector![0.6, 0.0], vector![0.2, 0.0], sq[0], sq[1], EPS));
}

#[test]
fn triangulate_concave_with_collinear_vertices() {
    // L-shape with a split vertex on the bottom edge
    let poly = vec![
        vector![0.0, 0.0],
        vector![1.0, 0.0],
        vector![2.0, 0.0],
        vector![2.0, 1.0],
        vector![1.0, 1.0],
        vector![1.0, 2.0],
        vector![0.0, 2.0],
    ];
    let tris = triangulate(&poly, EPS).expect("simple polygon");
    assert_eq!(tris.len(), poly.len() - 2);
    let total: f64 = tris
        .iter()
        .map(|t| signed_area(&[poly[t[0]], poly[t[1]], poly[t[2]]]))
        .sum();
    assert!((total - signed_area(&poly)).abs() < 1e-9);
    assert!(tris
        .iter()
        .all(|t| signed_area(&[poly[t[0]], poly[t[1]], poly[t[2]]]) >= -1e-12));
}

#[test]
fn overlap_needs_positive_area() {
    let sq = square();
    let shifted: Vec<_> = sq.iter().map(|p| p + vector![0.5, 0.5]).collect();
    let touching: Vec<_> = sq.iter().map(|p| p + vector![1.0, 0.0]).collect();
    assert!(polygons_overlap(&sq, &shifted, EPS));
    assert!(polygons_overlap(&sq, &sq, EPS));
    assert!(!polygons_overlap(&sq, &touching, EPS));
}

proptest! {
    /// Rotating by an angle and then by its negative is the identity.
    #[test]
    fn rotation_round_trip(
        p in prop::array::uniform3(-10.0..10.0f64),
        o in prop::array::uniform3(-10.0..10.0f64),
        d in prop::array::uniform3(-1.0..1.0f64),
        angle in -720.0..720.0f64,
    ) {
        let d = Vector3::from(d);
        prop_assume!(d.norm() > 0.1);
        let (p, o) = (Vector3::from(p), Vector3::from(o));
        let a = angle.to_radians();
        let there = rotate_about_axis(p, o, d, a, EPS).unwrap();
        let back = rotate_about_axis(there, o, d, -a, EPS).unwrap();
        prop_assert!((back - p).norm() < 1e-9);
    }

    /// The signed angle about an axis recovers the rotation that produced it.
    #[test]
    fn signed_angle_inverts_rotation(angle in 1.0..359.0f64) {
        let axis = Vector3::new(0.3, -0.2, 0.9);
        let u = Vector3::new(1.0, 1.0, 0.0);
        let v = rotate_about_axis(u, Vector3::zeros(), axis, angle.to_radians(), EPS).unwrap();
        let got = signed_angle_deg(u, v, axis, EPS).unwrap();
        prop_assert!((got - angle).abs() < 1e-7);
    }
}
