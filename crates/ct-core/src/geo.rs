//! Planar coordinate type and heading utilities.
//!
//! The traffic core works on the ground plane only.  `Vec2` stores the
//! horizontal `(x, z)` pair of a world position; the vertical axis belongs to
//! the renderer and never enters the simulation.
//!
//! # Conventions
//!
//! - `+x` is east, `+z` is south (north is `-z`).
//! - A heading `h` (radians) faces along `(sin h, cos h)`, so heading `0`
//!   faces south and heading `π/2` faces east.
//! - A positive heading change is a turn to the left.

use std::f32::consts::{PI, TAU};
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// A point or displacement on the ground plane.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2 {
    pub x: f32,
    pub z: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, z: 0.0 };

    #[inline]
    pub const fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }

    /// Unit vector facing along `heading`.
    #[inline]
    pub fn from_heading(heading: f32) -> Self {
        Self::new(heading.sin(), heading.cos())
    }

    /// Heading of this displacement (`atan2(x, z)`).  Zero vector maps to `0`.
    #[inline]
    pub fn heading(self) -> f32 {
        self.x.atan2(self.z)
    }

    #[inline]
    pub fn dot(self, other: Vec2) -> f32 {
        self.x * other.x + self.z * other.z
    }

    /// Z-component of the 3-D cross product; its magnitude is the
    /// perpendicular distance of `other` from the line along a unit `self`.
    #[inline]
    pub fn cross(self, other: Vec2) -> f32 {
        self.x * other.z - self.z * other.x
    }

    #[inline]
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    #[inline]
    pub fn distance(self, other: Vec2) -> f32 {
        (other - self).length()
    }

    /// Unit vector in the same direction, or `ZERO` for a degenerate input.
    pub fn normalize_or_zero(self) -> Vec2 {
        let len = self.length();
        if len > f32::EPSILON {
            self * (1.0 / len)
        } else {
            Vec2::ZERO
        }
    }

    /// Right-hand normal of a direction vector (rotate −90° about the
    /// vertical axis).  For a vehicle facing east this points south.
    #[inline]
    pub fn right_normal(self) -> Vec2 {
        Vec2::new(-self.z, self.x)
    }

    #[inline]
    pub fn lerp(self, other: Vec2, t: f32) -> Vec2 {
        self + (other - self) * t
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    #[inline]
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.z + rhs.z)
    }
}

impl AddAssign for Vec2 {
    #[inline]
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.z += rhs.z;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    #[inline]
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    #[inline]
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.z * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    #[inline]
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.z)
    }
}

impl std::fmt::Display for Vec2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.z)
    }
}

/// Wrap an angle into `(-π, π]`.
pub fn wrap_angle(angle: f32) -> f32 {
    let mut a = angle % TAU;
    if a <= -PI {
        a += TAU;
    } else if a > PI {
        a -= TAU;
    }
    a
}
