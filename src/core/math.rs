// Math utilities and the 2D vector type shared by the whole engine

use glam::DVec2;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::engine::physics::PhysicsError;

/// Clamp a value between min and max
pub fn clamp<T: PartialOrd>(value: T, min: T, max: T) -> T {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Check if two f64 values are approximately equal
pub fn approx_equal(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

/// Immutable 2D vector in double precision.
///
/// Every operation returns a new value. Equality is exact component equality;
/// use [`Vector2::approx_eq`] when comparing results of float arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2(DVec2);

impl Vector2 {
    pub const ZERO: Self = Self(DVec2::ZERO);

    /// Unit vector along +y, used as the fallback contact normal
    pub const UP: Self = Self(DVec2::Y);

    pub const fn new(x: f64, y: f64) -> Self {
        Self(DVec2::new(x, y))
    }

    pub fn x(&self) -> f64 {
        self.0.x
    }

    pub fn y(&self) -> f64 {
        self.0.y
    }

    pub fn as_tuple(&self) -> (f64, f64) {
        (self.0.x, self.0.y)
    }

    pub fn dot(&self, other: Self) -> f64 {
        self.0.dot(other.0)
    }

    /// 2D pseudo-cross product: `self.x * other.y - self.y * other.x`
    pub fn cross(&self, other: Self) -> f64 {
        self.0.perp_dot(other.0)
    }

    /// Euclidean length, `sqrt(x² + y²)`
    pub fn length(&self) -> f64 {
        self.0.length()
    }

    pub fn length_squared(&self) -> f64 {
        self.0.length_squared()
    }

    /// Unit vector in the same direction, or the zero vector when the length is zero.
    pub fn normalized(&self) -> Self {
        Self(self.0.normalize_or_zero())
    }

    /// Perpendicular vector rotated 90° counter-clockwise: `(-y, x)`
    pub fn perp(&self) -> Self {
        Self(self.0.perp())
    }

    /// Rotate counter-clockwise by `degrees`
    pub fn rotated(&self, degrees: f64) -> Self {
        Self(DVec2::from_angle(degrees.to_radians()).rotate(self.0))
    }

    /// Divide by a scalar, rejecting an exact zero divisor instead of producing inf/NaN.
    pub fn checked_div(&self, scalar: f64) -> Result<Self, PhysicsError> {
        if scalar == 0.0 {
            return Err(PhysicsError::DivisionByZero);
        }
        Ok(Self(self.0 / scalar))
    }

    /// Component-wise comparison within `epsilon`
    pub fn approx_eq(&self, other: Self, epsilon: f64) -> bool {
        approx_equal(self.0.x, other.0.x, epsilon) && approx_equal(self.0.y, other.0.y, epsilon)
    }

    pub fn min(&self, other: Self) -> Self {
        Self(self.0.min(other.0))
    }

    pub fn max(&self, other: Self) -> Self {
        Self(self.0.max(other.0))
    }
}

impl From<DVec2> for Vector2 {
    fn from(v: DVec2) -> Self {
        Self(v)
    }
}

impl From<Vector2> for DVec2 {
    fn from(v: Vector2) -> Self {
        v.0
    }
}

impl From<(f64, f64)> for Vector2 {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl Add for Vector2 {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl Sub for Vector2 {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl Neg for Vector2 {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Mul<f64> for Vector2 {
    type Output = Self;

    fn mul(self, scalar: f64) -> Self {
        Self(self.0 * scalar)
    }
}

impl AddAssign for Vector2 {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl SubAssign for Vector2 {
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl MulAssign<f64> for Vector2 {
    fn mul_assign(&mut self, scalar: f64) {
        self.0 *= scalar;
    }
}
