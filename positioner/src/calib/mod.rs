//! # Mounting calibration
//!
//! The orientation sensor is never mounted perfectly along the pole, so the
//! pole axis in the sensor's body frame is unknown. While the pole is held
//! still every reading should map the true axis onto the same world
//! direction. Calibration searches for the body-frame direction which makes
//! the rotated directions of a static batch of readings as close to parallel
//! as possible.
//!
//! The search runs over spherical coordinates `(theta, phi)` so that every
//! candidate is a unit vector, and uses the `argmin` Nelder-Mead solver
//! since the objective has no convenient derivative.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod optimise;
mod params;
mod spherical;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use optimise::*;
pub use params::*;
pub use spherical::*;

use crate::algebra::AlgebraError;
use crate::rotation::RotationError;
use crate::stats::StatsError;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Fewest samples for which the objective is meaningful. A single rotated
/// vector is trivially parallel to itself whatever the candidate direction.
pub const MIN_CALIB_SAMPLES: usize = 2;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during calibration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalibError {
    #[error("Calibration needs at least {required} samples, found {found}")]
    InsufficientData { found: usize, required: usize },

    #[error("The initial direction is invalid: {0}")]
    InvalidInitialDirection(AlgebraError),

    #[error("A calibration sample could not be rotated: {0}")]
    Rotation(#[from] RotationError),

    #[error("The calibration objective could not be evaluated: {0}")]
    Objective(#[from] StatsError),

    #[error("The calibration objective is not finite at theta = {theta_rad}, phi = {phi_rad}")]
    NonFiniteCost { theta_rad: f64, phi_rad: f64 },

    #[error(
        "Calibration did not converge after {iterations} iterations and {evaluations} \
         evaluations (best cost {cost})"
    )]
    NotConverged {
        iterations: u64,
        evaluations: u64,
        cost: f64,
    },

    #[error("The optimiser failed: {0}")]
    Optimiser(String),
}
