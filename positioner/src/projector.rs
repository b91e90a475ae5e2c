//! # Pole-end projector
//!
//! The GPS antenna sits on the near end (A) of a rigid pole and the
//! orientation sensor is fixed to the pole. Given the sensor quaternion and
//! the position of A, the position of the far end (B) is
//!
//! ```text
//! B = A + pole_length * normalise(rotate(q, local_direction))
//! ```
//!
//! where `local_direction` is the pole axis expressed in the sensor's body
//! frame. It is nominally the sensor X axis, and can be estimated more
//! precisely with [`crate::calib::optimal_local_direction`].

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use serde::Serialize;

use crate::algebra::{AlgebraError, Position, Vector};
use crate::rotation::{Quaternion, RotationError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Projects anchor positions to the far end of the pole.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct PoleProjector {
    /// Direction of the pole axis in the sensor body frame.
    local_direction: Vector,

    /// Length of the pole.
    ///
    /// Units: meters
    pole_length_m: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum ProjectorError {
    #[error("Cannot rotate the pole direction: {0}")]
    Rotation(#[from] RotationError),

    #[error("The pole direction is degenerate: {0}")]
    DegenerateDirection(AlgebraError),

    #[error("Pole length must be positive and finite, found {0}")]
    InvalidPoleLength(f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PoleProjector {
    /// Create a new projector for a pole mounted along `local_direction`.
    ///
    /// The direction is stored normalised.
    pub fn new(local_direction: Vector, pole_length_m: f64) -> Result<Self, ProjectorError> {
        check_pole_length(pole_length_m)?;

        let local_direction = local_direction
            .normalize()
            .map_err(ProjectorError::DegenerateDirection)?;

        Ok(Self {
            local_direction,
            pole_length_m,
        })
    }

    /// Projector with the pole along the sensor's X axis.
    pub fn with_default_direction(pole_length_m: f64) -> Result<Self, ProjectorError> {
        Self::new(Vector::X_AXIS, pole_length_m)
    }

    pub fn local_direction(&self) -> Vector {
        self.local_direction
    }

    pub fn pole_length_m(&self) -> f64 {
        self.pole_length_m
    }

    /// Unit direction of the pole in the world frame for this orientation.
    pub fn world_direction(&self, quaternion: &Quaternion) -> Result<Vector, ProjectorError> {
        quaternion
            .rotate(&self.local_direction)?
            .normalize()
            .map_err(ProjectorError::DegenerateDirection)
    }

    /// Position of the far end of the pole.
    pub fn project(
        &self,
        quaternion: &Quaternion,
        anchor: &Position,
    ) -> Result<Position, ProjectorError> {
        let direction = self.world_direction(quaternion)?;

        Ok(self.project_with_direction(&direction, anchor))
    }

    /// Position of the far end of the pole for a world direction already
    /// obtained from [`PoleProjector::world_direction`].
    pub fn project_with_direction(&self, world_direction: &Vector, anchor: &Position) -> Position {
        let end = anchor.plus(&world_direction.scale(self.pole_length_m));

        trace!("Projected {} along {} to {}", anchor, world_direction, end);

        end
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Position of the far end of a pole mounted along the sensor X axis.
pub fn project(
    quaternion: &Quaternion,
    anchor: &Position,
    pole_length_m: f64,
) -> Result<Position, ProjectorError> {
    PoleProjector::with_default_direction(pole_length_m)?.project(quaternion, anchor)
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn check_pole_length(pole_length_m: f64) -> Result<(), ProjectorError> {
    if pole_length_m.is_finite() && pole_length_m > 0.0 {
        Ok(())
    } else {
        Err(ProjectorError::InvalidPoleLength(pole_length_m))
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::UnitQuaternion;

    const ANCHOR: Position = Position::new(100.0, 200.0, 50.0);

    #[test]
    fn test_identity_projection() {
        let end = project(&Quaternion::IDENTITY, &ANCHOR, 2.0).unwrap();

        assert_abs_diff_eq!(end.x_m, 102.0, epsilon = 1e-5);
        assert_abs_diff_eq!(end.y_m, 200.0, epsilon = 1e-5);
        assert_abs_diff_eq!(end.z_m, 50.0, epsilon = 1e-5);
    }

    #[test]
    fn test_45_degree_projection() {
        // 45 degrees about y, so x tilts into the x-z plane
        let q = Quaternion::new(0.0, 0.3826834, 0.0, 0.9238795);
        let end = project(&q, &ANCHOR, 2.0).unwrap();

        let dx = end.x_m - ANCHOR.x_m;
        let dy = end.y_m - ANCHOR.y_m;
        let dz = end.z_m - ANCHOR.z_m;

        assert_abs_diff_eq!(ANCHOR.distance_to(&end), 2.0, epsilon = 1e-5);
        assert_abs_diff_eq!(dy, 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(dx.abs(), dz.abs(), epsilon = 1e-5);
    }

    #[test]
    fn test_distance_invariant() {
        let projectors = [
            PoleProjector::with_default_direction(2.57).unwrap(),
            PoleProjector::new(Vector::new(0.98, 0.15, -0.12), 0.5).unwrap(),
            PoleProjector::new(Vector::new(0.0, 0.0, 3.0), 12.0).unwrap(),
        ];
        let anchors = [
            Position::origin(),
            ANCHOR,
            Position::new(-71552.3, 6686227.6, 100.0),
        ];

        for n in 0..50 {
            let t = n as f64 * 0.29;
            // Not unit length on purpose
            let q = Quaternion::from(UnitQuaternion::from_euler_angles(t, -0.7 * t, 1.3 * t.cos()));
            let q = Quaternion::new(q.i * 1.01, q.j * 1.01, q.k * 1.01, q.w * 1.01);

            for p in projectors.iter() {
                for a in anchors.iter() {
                    let end = p.project(&q, a).unwrap();
                    assert_abs_diff_eq!(a.distance_to(&end), p.pole_length_m(), epsilon = 1e-5);
                }
            }
        }
    }

    #[test]
    fn test_custom_direction() {
        // A pole along the sensor's Z axis with no rotation points straight up
        let p = PoleProjector::new(Vector::new(0.0, 0.0, 5.0), 2.0).unwrap();
        assert_eq!(p.local_direction(), Vector::new(0.0, 0.0, 1.0));

        let end = p.project(&Quaternion::IDENTITY, &ANCHOR).unwrap();
        assert_eq!(end, Position::new(100.0, 200.0, 52.0));
    }

    #[test]
    fn test_project_with_direction() {
        let p = PoleProjector::new(Vector::new(0.98, 0.15, -0.12), 2.57).unwrap();
        let q = Quaternion::from(UnitQuaternion::from_euler_angles(0.3, -1.1, 2.0));

        let dir = p.world_direction(&q).unwrap();
        assert_eq!(p.project_with_direction(&dir, &ANCHOR), p.project(&q, &ANCHOR).unwrap());

        // The direction is used as given
        let end = p.project_with_direction(&Vector::new(0.0, -1.0, 0.0), &ANCHOR);
        assert_eq!(end, Position::new(100.0, 200.0 - 2.57, 50.0));
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            PoleProjector::new(Vector::ZERO, 2.0),
            Err(ProjectorError::DegenerateDirection(AlgebraError::ZeroNorm(Vector::ZERO)))
        );
        assert_eq!(
            PoleProjector::with_default_direction(0.0),
            Err(ProjectorError::InvalidPoleLength(0.0))
        );
        assert!(PoleProjector::with_default_direction(-1.0).is_err());
        assert!(PoleProjector::with_default_direction(f64::NAN).is_err());

        assert!(matches!(
            project(&Quaternion::new(0.0, 0.0, 0.0, 0.0), &ANCHOR, 2.0),
            Err(ProjectorError::Rotation(_))
        ));
    }
}
