//! Simple-polygon helpers in the flat pattern frame.
//!
//! Polygons are vertex slices in cyclic order; either winding is accepted unless
//! stated otherwise. Collinear vertices are common (split vertices sit on old
//! edges) and every routine here tolerates them.

use nalgebra::Vector2;

use super::vec::cross2;

/// Shoelace signed area; positive for counter-clockwise loops.
pub fn signed_area(poly: &[Vector2<f64>]) -> f64 {
    let n = poly.len();
    if n < 3 {
        return 0.0;
    }
    let mut acc = 0.0;
    for i in 0..n {
        acc += cross2(poly[i], poly[(i + 1) % n]);
    }
    0.5 * acc
}

/// True if `p` lies on the closed segment `a–b` (within `eps`).
pub fn point_on_segment(p: Vector2<f64>, a: Vector2<f64>, b: Vector2<f64>, eps: f64) -> bool {
    let ab = b - a;
    let len = ab.norm();
    if len < eps {
        return (p - a).norm() < eps;
    }
    let along = (p - a).dot(&ab) / len;
    if along < -eps || along > len + eps {
        return false;
    }
    (cross2(ab, p - a) / len).abs() < eps
}

/// True if the directed segment `p → q` lies on `a → b` and runs the same way.
pub fn segment_within(
    p: Vector2<f64>,
    q: Vector2<f64>,
    a: Vector2<f64>,
    b: Vector2<f64>,
    eps: f64,
) -> bool {
    point_on_segment(p, a, b, eps)
        && point_on_segment(q, a, b, eps)
        && (q - p).dot(&(b - a)) > 0.0
}

/// Distance from `p` to the polygon boundary.
pub fn boundary_distance(p: Vector2<f64>, poly: &[Vector2<f64>]) -> f64 {
    let n = poly.len();
    let mut best = f64::INFINITY;
    for i in 0..n {
        let a = poly[i];
        let b = poly[(i + 1) % n];
        let ab = b - a;
        let len2 = ab.norm_squared();
        let t = if len2 > 0.0 {
            ((p - a).dot(&ab) / len2).clamp(0.0, 1.0)
        } else {
            0.0
        };
        best = best.min((p - (a + ab * t)).norm());
    }
    best
}

/// Strict interior test: inside by crossing parity and farther than `eps` from
/// the boundary.
pub fn contains_strict(poly: &[Vector2<f64>], p: Vector2<f64>, eps: f64) -> bool {
    if poly.len() < 3 || boundary_distance(p, poly) < eps {
        return false;
    }
    let n = poly.len();
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (poly[i], poly[j]);
        if (a.y > p.y) != (b.y > p.y) {
            let x = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if p.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Ear-clipping triangulation; triangles index into `poly` and share its winding.
///
/// Collinear vertices are clipped as zero-area ears once no proper ear remains.
/// Returns `None` if the loop is not a simple polygon.
pub fn triangulate(poly: &[Vector2<f64>], eps: f64) -> Option<Vec<[usize; 3]>> {
    let n = poly.len();
    if n < 3 {
        return None;
    }
    let orient = if signed_area(poly) >= 0.0 { 1.0 } else { -1.0 };
    let mut idx: Vec<usize> = (0..n).collect();
    let mut out = Vec::with_capacity(n - 2);
    let area_eps = eps * eps;
    while idx.len() > 3 {
        let m = idx.len();
        let mut clipped = false;
        for k in 0..m {
            let (ip, ic, inx) = (idx[(k + m - 1) % m], idx[k], idx[(k + 1) % m]);
            let (a, b, c) = (poly[ip], poly[ic], poly[inx]);
            if orient * cross2(b - a, c - b) <= area_eps {
                continue;
            }
            let blocked = idx.iter().any(|&o| {
                o != ip && o != ic && o != inx && in_triangle_closed(poly[o], a, b, c, eps)
            });
            if !blocked {
                out.push([ip, ic, inx]);
                idx.remove(k);
                clipped = true;
                break;
            }
        }
        if clipped {
            continue;
        }
        // No proper ear: drop a collinear vertex as a degenerate triangle.
        let flat = (0..m).find(|&k| {
            let (ip, ic, inx) = (idx[(k + m - 1) % m], idx[k], idx[(k + 1) % m]);
            cross2(poly[ic] - poly[ip], poly[inx] - poly[ic]).abs() <= area_eps
        })?;
        let (ip, ic, inx) = (idx[(flat + m - 1) % m], idx[flat], idx[(flat + 1) % m]);
        out.push([ip, ic, inx]);
        idx.remove(flat);
    }
    out.push([idx[0], idx[1], idx[2]]);
    Some(out)
}

fn in_triangle_closed(
    p: Vector2<f64>,
    a: Vector2<f64>,
    b: Vector2<f64>,
    c: Vector2<f64>,
    eps: f64,
) -> bool {
    let d1 = cross2(b - a, p - a);
    let d2 = cross2(c - b, p - b);
    let d3 = cross2(a - c, p - c);
    let tol = eps * eps;
    let has_neg = d1 < -tol || d2 < -tol || d3 < -tol;
    let has_pos = d1 > tol || d2 > tol || d3 > tol;
    !(has_neg && has_pos)
}

/// Positive-area overlap of two triangles (separating axis test).
pub fn triangles_overlap(t1: [Vector2<f64>; 3], t2: [Vector2<f64>; 3], eps: f64) -> bool {
    let area = |t: &[Vector2<f64>; 3]| cross2(t[1] - t[0], t[2] - t[0]).abs();
    if area(&t1) <= eps * eps || area(&t2) <= eps * eps {
        return false;
    }
    for tri in [&t1, &t2] {
        for i in 0..3 {
            let e = tri[(i + 1) % 3] - tri[i];
            let axis = Vector2::new(-e.y, e.x);
            let len = axis.norm();
            if len == 0.0 {
                continue;
            }
            let axis = axis / len;
            let (lo1, hi1) = interval(&t1, axis);
            let (lo2, hi2) = interval(&t2, axis);
            if hi1.min(hi2) - lo1.max(lo2) <= eps {
                return false;
            }
        }
    }
    true
}

fn interval(t: &[Vector2<f64>; 3], axis: Vector2<f64>) -> (f64, f64) {
    t.iter()
        .map(|p| p.dot(&axis))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
            (lo.min(x), hi.max(x))
        })
}

/// Positive-area interior overlap of two simple polygons.
///
/// Both polygons are triangulated; a non-simple input falls back to a fan.
pub fn polygons_overlap(a: &[Vector2<f64>], b: &[Vector2<f64>], eps: f64) -> bool {
    let ta = triangulate(a, eps).unwrap_or_else(|| fan(a.len()));
    let tb = triangulate(b, eps).unwrap_or_else(|| fan(b.len()));
    ta.iter().any(|x| {
        let tx = [a[x[0]], a[x[1]], a[x[2]]];
        tb.iter().any(|y| triangles_overlap(tx, [b[y[0]], b[y[1]], b[y[2]]], eps))
    })
}

fn fan(n: usize) -> Vec<[usize; 3]> {
    (1..n.saturating_sub(1)).map(|i| [0, i, i + 1]).collect()
}
