//! Pixel-space vector math shared by every entity and query.

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Tolerance applied by [`Vector2D::approx_eq`] to absorb floating drift.
pub const POSITION_EPSILON: f32 = 1e-3;

/// Pair of real-valued coordinates expressed in pixel space.
///
/// Values are immutable by convention: every operation yields a new vector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector2D(Vec2);

impl Vector2D {
    /// Vector with both components set to zero.
    pub const ZERO: Self = Self(Vec2::ZERO);

    /// Creates a vector from its components.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self(Vec2::new(x, y))
    }

    /// Horizontal component.
    #[must_use]
    pub fn x(&self) -> f32 {
        self.0.x
    }

    /// Vertical component. Grows downwards, matching screen space.
    #[must_use]
    pub fn y(&self) -> f32 {
        self.0.y
    }

    /// Euclidean length of the vector.
    #[must_use]
    pub fn magnitude(self) -> f32 {
        self.0.length()
    }

    /// Unit vector pointing the same way, or zero for a zero-length input.
    #[must_use]
    pub fn normalize(self) -> Self {
        Self(self.0.normalize_or_zero())
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance_to(self, other: Self) -> f32 {
        self.0.distance(other.0)
    }

    /// Sum of absolute axis differences to `other`.
    #[must_use]
    pub fn manhattan_distance_to(self, other: Self) -> f32 {
        let delta = (self.0 - other.0).abs();
        delta.x + delta.y
    }

    /// Largest absolute axis difference to `other`.
    #[must_use]
    pub fn chebyshev_distance_to(self, other: Self) -> f32 {
        (self.0 - other.0).abs().max_element()
    }

    /// Midpoint between `self` and `other`.
    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        Self((self.0 + other.0) * 0.5)
    }

    /// Component-wise comparison within [`POSITION_EPSILON`].
    #[must_use]
    pub fn approx_eq(self, other: Self) -> bool {
        self.0.abs_diff_eq(other.0, POSITION_EPSILON)
    }

    /// Exposes the underlying `glam` vector.
    #[must_use]
    pub const fn as_vec2(self) -> Vec2 {
        self.0
    }
}

impl From<Vec2> for Vector2D {
    fn from(value: Vec2) -> Self {
        Self(value)
    }
}

impl From<Vector2D> for Vec2 {
    fn from(value: Vector2D) -> Self {
        value.0
    }
}

impl Add for Vector2D {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Vector2D {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Vector2D {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Mul<f32> for Vector2D {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Neg for Vector2D {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}
