//! Tolerance configuration, planes and side labels.
//!
//! - `GeomCfg`: the one place the absolute tolerance lives; every predicate in
//!   `geom` takes it (or its `eps`) explicitly.
//! - `Plane`: point + unit normal, signed distances and side tests.
//! - `Side`: three-way plane classification under tolerance.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Default absolute tolerance for equality, collinearity and side tests.
pub const DEFAULT_EPS: f64 = 1e-4;

/// Geometry configuration (tolerances).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeomCfg {
    pub eps: f64,
}

impl Default for GeomCfg {
    fn default() -> Self {
        Self { eps: DEFAULT_EPS }
    }
}

impl GeomCfg {
    #[inline]
    pub fn with_eps(eps: f64) -> Self {
        Self { eps }
    }
    #[inline]
    pub fn is_zero(&self, x: f64) -> bool {
        x.abs() < self.eps
    }
}

/// Side of a point relative to a plane (after tolerance snapping).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Minus,
    On,
    Plus,
}

impl Side {
    /// Classify a signed distance.
    #[inline]
    pub fn of(distance: f64, eps: f64) -> Self {
        if distance < -eps {
            Side::Minus
        } else if distance > eps {
            Side::Plus
        } else {
            Side::On
        }
    }
    #[inline]
    pub fn sign(self) -> i8 {
        match self {
            Side::Minus => -1,
            Side::On => 0,
            Side::Plus => 1,
        }
    }
    /// True for a strict `Minus`/`Plus` pair.
    #[inline]
    pub fn opposes(self, other: Side) -> bool {
        self.sign() * other.sign() < 0
    }
}

/// Plane through `point` with unit `normal`.
///
/// Invariants:
/// - `normal` has unit length (constructors normalize and reject zero vectors).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub point: Vector3<f64>,
    pub normal: Vector3<f64>,
}

impl Plane {
    /// Build a plane from any non-zero normal; `None` if the normal is shorter than `eps`.
    pub fn new(point: Vector3<f64>, normal: Vector3<f64>, eps: f64) -> Option<Self> {
        let normal = super::unit(normal, eps)?;
        Some(Self { point, normal })
    }

    /// Perpendicular bisector of `a → b`; `a` lies on the negative side.
    pub fn bisector(a: Vector3<f64>, b: Vector3<f64>, eps: f64) -> Option<Self> {
        Self::new((a + b) * 0.5, b - a, eps)
    }

    #[inline]
    pub fn signed_distance(&self, p: Vector3<f64>) -> f64 {
        self.normal.dot(&(p - self.point))
    }

    #[inline]
    pub fn side(&self, p: Vector3<f64>, eps: f64) -> Side {
        Side::of(self.signed_distance(p), eps)
    }

    /// Same plane with the normal reversed.
    #[inline]
    pub fn flipped(&self) -> Self {
        Self {
            point: self.point,
            normal: -self.normal,
        }
    }
}
