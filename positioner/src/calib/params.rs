//! Parameters structure for calibration

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the mounting calibration.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibParams {
    /// Starting guess for the pole axis.
    ///
    /// Frame: Sensor body
    pub initial_direction: [f64; 3],

    /// The search stops once the standard deviation of the summed
    /// colinearity over the simplex vertices drops below this.
    pub sd_tolerance: f64,

    /// Maximum number of optimiser iterations. Reaching it is an error.
    pub max_iterations: u64,
}

impl Default for CalibParams {
    fn default() -> Self {
        Self {
            initial_direction: [1.0, 0.0, 0.0],
            sd_tolerance: 1e-10,
            max_iterations: 400,
        }
    }
}
