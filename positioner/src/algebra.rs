//! # Vector and position algebra
//!
//! Minimal 3D value types used by the positioner. A [`Vector`] is a direction
//! or displacement whose frame (sensor body or world) is implied by context, a
//! [`Position`] is an absolute point in a planar metric frame such as UTM.
//! Adding a vector to a position gives a position, there is no way to add two
//! positions.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;

use util::maths::clamp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A direction or displacement in 3D.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// An absolute point in a metric frame.
///
/// Units: meters
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x_m: f64,
    pub y_m: f64,
    pub z_m: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors raised by vector arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum AlgebraError {
    #[error("Attempted to divide a vector by zero")]
    DivisionByZero,

    #[error("A direction was required but the vector {0} has zero norm")]
    ZeroNorm(Vector),

    #[error("The vector {0} has a non-finite component")]
    NonFinite(Vector),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Vector {
    /// The unit X axis, the nominal pole direction in the sensor frame.
    pub const X_AXIS: Vector = Vector { x: 1.0, y: 0.0, z: 0.0 };

    pub const ZERO: Vector = Vector { x: 0.0, y: 0.0, z: 0.0 };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Componentwise sum of two vectors.
    pub fn add(&self, other: &Vector) -> Vector {
        Vector::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    /// Multiply every component by `factor`.
    pub fn scale(&self, factor: f64) -> Vector {
        Vector::new(self.x * factor, self.y * factor, self.z * factor)
    }

    /// Divide every component by `divisor`.
    pub fn divide(&self, divisor: f64) -> Result<Vector, AlgebraError> {
        if divisor == 0.0 {
            return Err(AlgebraError::DivisionByZero);
        }

        Ok(Vector::new(self.x / divisor, self.y / divisor, self.z / divisor))
    }

    pub fn neg(&self) -> Vector {
        Vector::new(-self.x, -self.y, -self.z)
    }

    pub fn dot(&self, other: &Vector) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Largest absolute component.
    fn max_abs(&self) -> f64 {
        self.x.abs().max(self.y.abs()).max(self.z.abs())
    }

    /// Euclidean length of the vector.
    ///
    /// Components are scaled by the largest one before squaring, so the
    /// result neither overflows nor underflows while the length itself is
    /// representable.
    pub fn norm(&self) -> f64 {
        // NaN if any component is NaN, infinite otherwise
        if !self.is_finite() {
            return self.x.abs() + self.y.abs() + self.z.abs();
        }

        let scale = self.max_abs();
        if scale == 0.0 {
            return 0.0;
        }

        let u = Vector::new(self.x / scale, self.y / scale, self.z / scale);

        scale * u.dot(&u).sqrt()
    }

    /// Return the unit vector pointing the same way as this one.
    pub fn normalize(&self) -> Result<Vector, AlgebraError> {
        if !self.is_finite() {
            return Err(AlgebraError::NonFinite(*self));
        }

        let scale = self.max_abs();
        if scale == 0.0 {
            return Err(AlgebraError::ZeroNorm(*self));
        }

        // Largest component is now +/-1, so the norm is in [1, sqrt(3)]
        let u = self.divide(scale)?;

        u.divide(u.dot(&u).sqrt())
    }

    /// How far two vectors are from lying on the same line.
    ///
    /// Returns `1 - |cos(angle)|`, so 0 for parallel or anti-parallel vectors
    /// and 1 for perpendicular ones. The angle is undefined for a zero vector,
    /// which is reported as `AlgebraError::ZeroNorm`, or for a vector with a
    /// non-finite component (`AlgebraError::NonFinite`).
    pub fn colinearity(&self, other: &Vector) -> Result<f64, AlgebraError> {
        let u = self.normalize()?;
        let v = other.normalize()?;

        // Rounding can push |cos| just past 1
        let cos_theta = clamp(u.dot(&v).abs(), 0.0, 1.0);

        Ok(1.0 - cos_theta)
    }

    pub fn to_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl Position {
    pub const fn new(x_m: f64, y_m: f64, z_m: f64) -> Self {
        Self { x_m, y_m, z_m }
    }

    pub const fn origin() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Translate the position by a vector.
    pub fn plus(&self, v: &Vector) -> Position {
        Position::new(self.x_m + v.x, self.y_m + v.y, self.z_m + v.z)
    }

    /// The displacement from this position to `other`.
    pub fn offset_to(&self, other: &Position) -> Vector {
        Vector::new(other.x_m - self.x_m, other.y_m - self.y_m, other.z_m - self.z_m)
    }

    /// Euclidean distance between two positions.
    ///
    /// Coordinates are planar metric (UTM) so this is not a geodesic distance.
    pub fn distance_to(&self, other: &Position) -> f64 {
        self.offset_to(other).norm()
    }

    pub fn to_array(&self) -> [f64; 3] {
        [self.x_m, self.y_m, self.z_m]
    }
}

impl From<[f64; 3]> for Vector {
    fn from(a: [f64; 3]) -> Self {
        Vector::new(a[0], a[1], a[2])
    }
}

impl From<Vector3<f64>> for Vector {
    fn from(v: Vector3<f64>) -> Self {
        Vector::new(v[0], v[1], v[2])
    }
}

impl From<Vector> for Vector3<f64> {
    fn from(v: Vector) -> Self {
        Vector3::new(v.x, v.y, v.z)
    }
}

impl From<[f64; 3]> for Position {
    fn from(a: [f64; 3]) -> Self {
        Position::new(a[0], a[1], a[2])
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V({:+.4}, {:+.4}, {:+.4})", self.x, self.y, self.z)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P({:+.3}, {:+.3}, {:+.3})", self.x_m, self.y_m, self.z_m)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
