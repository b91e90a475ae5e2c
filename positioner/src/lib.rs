//! # Pole positioner
//!
//! Geometric core of the pole survey system. An orientation sensor and a GPS
//! antenna are fixed to a rigid pole. This crate turns the sensor's
//! quaternion and the antenna position into the position of the far end of
//! the pole, and calibrates how the sensor is mounted on the pole.
//!
//! All operations are pure functions over `Copy` values, so they can be run
//! from any thread without coordination.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod algebra;
pub mod calib;
pub mod projector;
pub mod rotation;
pub mod stats;

// ---------------------------------------------------------------------------
// REEXPORTS
// ---------------------------------------------------------------------------

pub use algebra::{AlgebraError, Position, Vector};
pub use calib::{optimal_local_direction, CalibError, CalibParams, Calibration};
pub use projector::{project, PoleProjector, ProjectorError};
pub use rotation::{rotate, Quaternion, RotationError};
pub use stats::{average, dispersion, Dispersion, StatsError};
