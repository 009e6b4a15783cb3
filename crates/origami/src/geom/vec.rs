//! Vector, line and plane primitives.

use nalgebra::{Rotation3, Unit, Vector2, Vector3};

use super::types::Plane;

/// Unit vector of `v`; `None` for vectors shorter than `eps`.
#[inline]
pub fn unit(v: Vector3<f64>, eps: f64) -> Option<Vector3<f64>> {
    let n = v.norm();
    if !n.is_finite() || n < eps {
        return None;
    }
    Some(v / n)
}

/// Scalar 2D cross product `a.x b.y - a.y b.x`.
#[inline]
pub fn cross2(a: Vector2<f64>, b: Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Map any angle in degrees to `[0, 360)`.
pub fn normalize_deg(angle: f64) -> f64 {
    let a = angle.rem_euclid(360.0);
    if 360.0 - a < 1e-9 {
        0.0
    } else {
        a
    }
}

/// Signed angle (degrees, `[0, 360)`) that rotates `u` onto `v` about `axis`
/// (right-hand rule). Components along `axis` are ignored.
///
/// Returns `None` if the axis or either projected vector is shorter than `eps`.
pub fn signed_angle_deg(
    u: Vector3<f64>,
    v: Vector3<f64>,
    axis: Vector3<f64>,
    eps: f64,
) -> Option<f64> {
    let k = unit(axis, eps)?;
    let u_perp = u - k * k.dot(&u);
    let v_perp = v - k * k.dot(&v);
    if u_perp.norm() < eps || v_perp.norm() < eps {
        return None;
    }
    let y = k.dot(&u_perp.cross(&v_perp));
    let x = u_perp.dot(&v_perp);
    Some(normalize_deg(y.atan2(x).to_degrees()))
}

/// Orthogonal projection of `p` onto the line through `a` and `b`.
pub fn project_point_onto_line(
    a: Vector3<f64>,
    b: Vector3<f64>,
    p: Vector3<f64>,
    eps: f64,
) -> Option<Vector3<f64>> {
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 < eps * eps {
        return None;
    }
    Some(a + ab * ((p - a).dot(&ab) / len2))
}

/// Distance from `p` to the line through `a` and `b`.
pub fn distance_to_line(
    a: Vector3<f64>,
    b: Vector3<f64>,
    p: Vector3<f64>,
    eps: f64,
) -> Option<f64> {
    project_point_onto_line(a, b, p, eps).map(|q| (p - q).norm())
}

/// Segment–plane crossing: parameter along `a → b` and the point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentHit {
    pub t: f64,
    pub point: Vector3<f64>,
}

/// Intersect the segment `a → b` with `plane`.
///
/// `None` if both endpoints lie strictly on the same side, or if the segment is
/// parallel to the plane (including lying inside it, where there is no unique
/// crossing).
pub fn intersect_segment_plane(
    a: Vector3<f64>,
    b: Vector3<f64>,
    plane: &Plane,
    eps: f64,
) -> Option<SegmentHit> {
    let da = plane.signed_distance(a);
    let db = plane.signed_distance(b);
    if (da > eps && db > eps) || (da < -eps && db < -eps) {
        return None;
    }
    let denom = da - db;
    if denom.abs() < eps {
        return None;
    }
    let t = (da / denom).clamp(0.0, 1.0);
    Some(SegmentHit {
        t,
        point: a + (b - a) * t,
    })
}

/// Rotate `p` by `angle_rad` about the line through `origin` with `direction`
/// (right-hand rule). `None` for a zero-length direction.
pub fn rotate_about_axis(
    p: Vector3<f64>,
    origin: Vector3<f64>,
    direction: Vector3<f64>,
    angle_rad: f64,
    eps: f64,
) -> Option<Vector3<f64>> {
    let k = Unit::new_normalize(unit(direction, eps)?);
    let rot = Rotation3::from_axis_angle(&k, angle_rad);
    Some(origin + rot * (p - origin))
}

#[inline]
pub fn coincide3(a: Vector3<f64>, b: Vector3<f64>, eps: f64) -> bool {
    (a - b).norm() < eps
}

#[inline]
pub fn coincide2(a: Vector2<f64>, b: Vector2<f64>, eps: f64) -> bool {
    (a - b).norm() < eps
}

/// Lift a pattern coordinate onto the `z = 0` plane.
#[inline]
pub fn lift(p: Vector2<f64>) -> Vector3<f64> {
    Vector3::new(p.x, p.y, 0.0)
}
