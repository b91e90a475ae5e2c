//! # Quaternion rotation
//!
//! Orientation readings arrive as scalar-last quaternions `(i, j, k, w)`,
//! the convention used by the BNO08x family of sensors. Each one encodes the
//! rotation from the sensor's body frame into the world frame.
//!
//! Quaternions are normalised before use, so a reading with a slightly
//! drifted norm still describes a pure rotation. Readings with a zero,
//! near-zero or non-finite norm can't be normalised and are rejected.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{Quaternion as NaQuaternion, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::algebra::Vector;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Smallest quaternion norm accepted for normalisation.
pub const MIN_QUATERNION_NORM: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An orientation reading in scalar-last order.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub i: f64,
    pub j: f64,
    pub k: f64,
    pub w: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum RotationError {
    #[error("Quaternion {0:?} does not encode a rotation (norm {1})")]
    InvalidQuaternion(Quaternion, f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Quaternion {
    /// The identity rotation.
    pub const IDENTITY: Quaternion = Quaternion { i: 0.0, j: 0.0, k: 0.0, w: 1.0 };

    pub const fn new(i: f64, j: f64, k: f64, w: f64) -> Self {
        Self { i, j, k, w }
    }

    pub fn norm(&self) -> f64 {
        (self.i * self.i + self.j * self.j + self.k * self.k + self.w * self.w).sqrt()
    }

    /// Convert into a normalised nalgebra rotation.
    pub fn to_unit(&self) -> Result<UnitQuaternion<f64>, RotationError> {
        let norm = self.norm();

        if !norm.is_finite() || norm < MIN_QUATERNION_NORM {
            return Err(RotationError::InvalidQuaternion(*self, norm));
        }

        // nalgebra takes the scalar part first
        Ok(UnitQuaternion::from_quaternion(NaQuaternion::new(
            self.w, self.i, self.j, self.k,
        )))
    }

    /// Rotate a body frame vector into the world frame.
    pub fn rotate(&self, local: &Vector) -> Result<Vector, RotationError> {
        let rotation = self.to_unit()?;
        let world = rotation.transform_vector(&Vector3::from(*local));

        Ok(Vector::from(world))
    }
}

impl From<UnitQuaternion<f64>> for Quaternion {
    fn from(q: UnitQuaternion<f64>) -> Self {
        Quaternion::new(q.i, q.j, q.k, q.w)
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Rotate `local` from the sensor body frame into the world frame using
/// `quaternion`.
pub fn rotate(quaternion: &Quaternion, local: &Vector) -> Result<Vector, RotationError> {
    quaternion.rotate(local)
}

/// Rotate `local` by every quaternion in turn.
pub fn rotate_all(quaternions: &[Quaternion], local: &Vector) -> Result<Vec<Vector>, RotationError> {
    quaternions.iter().map(|q| q.rotate(local)).collect()
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    /// A spread of rotations, some of which are deliberately not unit length.
    fn sample_quaternions() -> Vec<Quaternion> {
        let mut quats = vec![
            Quaternion::IDENTITY,
            Quaternion::new(0.0, 0.3826834, 0.0, 0.9238795),
            Quaternion::new(0.5, -0.5, 0.5, 0.5),
            Quaternion::new(0.1, 0.2, 0.3, 0.4),
            Quaternion::new(-3.0, 1.0, 2.0, -0.5),
        ];

        for n in 0..20 {
            let t = n as f64 * 0.37;
            quats.push(Quaternion::from(UnitQuaternion::from_euler_angles(
                t.sin(),
                0.5 * t.cos(),
                t,
            )));
        }

        quats
    }

    #[test]
    fn test_identity() {
        let vs = [
            Vector::new(1.0, 0.0, 0.0),
            Vector::new(-2.5, 3.0, 0.125),
            Vector::new(0.0, 0.0, 0.0),
        ];

        for v in vs.iter() {
            assert_eq!(rotate(&Quaternion::IDENTITY, v).unwrap(), *v);
        }
    }

    #[test]
    fn test_unit_norm_preserved() {
        let locals = [
            Vector::new(1.0, 0.0, 0.0),
            Vector::new(0.0, 1.0, 0.0),
            Vector::new(0.6, 0.0, -0.8),
            Vector::new(1.0, 1.0, 1.0).normalize().unwrap(),
        ];

        for q in sample_quaternions().iter() {
            for v in locals.iter() {
                assert_abs_diff_eq!(rotate(q, v).unwrap().norm(), 1.0, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_known_rotations() {
        // 90 degrees about z takes x onto y
        let half = FRAC_PI_4;
        let qz = Quaternion::new(0.0, 0.0, half.sin(), half.cos());
        let v = rotate(&qz, &Vector::new(1.0, 0.0, 0.0)).unwrap();
        assert_abs_diff_eq!(v.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(v.y, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(v.z, 0.0, epsilon = 1e-12);

        // Matches nalgebra's own axis-angle construction
        let qy = Quaternion::from(UnitQuaternion::from_axis_angle(&Vector3::y_axis(), FRAC_PI_2));
        let v = rotate(&qy, &Vector::new(1.0, 0.0, 0.0)).unwrap();
        assert_abs_diff_eq!(v.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(v.z, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_implicit_normalisation() {
        let q = Quaternion::new(0.0, 0.0, FRAC_PI_4.sin(), FRAC_PI_4.cos());
        let scaled = Quaternion::new(q.i * 3.0, q.j * 3.0, q.k * 3.0, q.w * 3.0);
        let v = Vector::new(0.2, -1.0, 0.4);

        let a = rotate(&q, &v).unwrap();
        let b = rotate(&scaled, &v).unwrap();
        assert_abs_diff_eq!(a.x, b.x, epsilon = 1e-12);
        assert_abs_diff_eq!(a.y, b.y, epsilon = 1e-12);
        assert_abs_diff_eq!(a.z, b.z, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_quaternion() {
        let v = Vector::new(1.0, 0.0, 0.0);

        assert!(matches!(
            rotate(&Quaternion::new(0.0, 0.0, 0.0, 0.0), &v),
            Err(RotationError::InvalidQuaternion(_, _))
        ));
        assert!(rotate(&Quaternion::new(1e-12, 0.0, 0.0, 0.0), &v).is_err());
        assert!(rotate(&Quaternion::new(f64::NAN, 0.0, 0.0, 1.0), &v).is_err());
        assert!(rotate(&Quaternion::new(0.0, f64::INFINITY, 0.0, 1.0), &v).is_err());
    }

    #[test]
    fn test_rotate_all() {
        let quats = sample_quaternions();
        let vs = rotate_all(&quats, &Vector::X_AXIS).unwrap();
        assert_eq!(vs.len(), quats.len());

        let mut bad = quats.clone();
        bad.push(Quaternion::new(0.0, 0.0, 0.0, 0.0));
        assert!(rotate_all(&bad, &Vector::X_AXIS).is_err());
    }
}
