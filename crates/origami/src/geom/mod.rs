//! Vector math for the fold solver (pure, stateless).
//!
//! Purpose
//! - 3D vector/plane/line primitives used to locate cutting planes, split
//!   edges and synthesize rotations.
//! - 2D polygon helpers evaluated in the flat pattern frame (areas, interior
//!   tests, triangulation, overlap), where folding cannot distort lengths.
//!
//! Conventions
//! - Every predicate takes an explicit absolute tolerance `eps` (from
//!   `GeomCfg`); nothing in this module re-declares its own epsilon.
//! - Degenerate inputs (zero-length vectors, parallel segments) return `None`
//!   rather than NaN; callers turn that into a geometry error.
//! - Angles are degrees in `[0, 360)` unless the name says `_rad`.

mod polygon;
mod types;
mod vec;

pub use polygon::{
    boundary_distance, contains_strict, point_on_segment, polygons_overlap, segment_within,
    signed_area, triangles_overlap, triangulate,
};
pub use types::{GeomCfg, Plane, Side, DEFAULT_EPS};
pub use vec::{
    coincide2, coincide3, cross2, distance_to_line, intersect_segment_plane, lift, normalize_deg,
    project_point_onto_line, rotate_about_axis, signed_angle_deg, unit, SegmentHit,
};

#[cfg(test)]
mod tests;
