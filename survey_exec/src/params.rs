//! Parameters structure for the survey executable

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use positioner::{CalibParams, PoleProjector, ProjectorError, Vector};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the survey executable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecParams {
    /// Distance from the GPS antenna to the far end of the pole.
    ///
    /// Units: meters
    pub pole_length_m: f64,

    /// Pole axis in the sensor body frame.
    ///
    /// Frame: Sensor body
    #[serde(default = "default_local_direction")]
    pub local_direction: [f64; 3],

    #[serde(default)]
    pub calib: CalibParams,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ExecParams {
    /// Build the projector described by these parameters.
    pub fn projector(&self) -> Result<PoleProjector, ProjectorError> {
        PoleProjector::new(Vector::from(self.local_direction), self.pole_length_m)
    }
}

fn default_local_direction() -> [f64; 3] {
    Vector::X_AXIS.to_array()
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_exec_params() {
        let p: ExecParams = util::params::from_str(
            r#"
            pole_length_m = 2.57
            local_direction = [0.0, 0.0, 2.0]

            [calib]
            max_iterations = 100
            "#,
        )
        .unwrap();

        assert_eq!(p.pole_length_m, 2.57);
        assert_eq!(p.calib.max_iterations, 100);
        assert_eq!(p.calib.initial_direction, [1.0, 0.0, 0.0]);

        let proj = p.projector().unwrap();
        assert_eq!(proj.local_direction(), Vector::new(0.0, 0.0, 1.0));

        // Only the pole length is required
        let p: ExecParams = util::params::from_str("pole_length_m = 1.5").unwrap();
        assert_eq!(p.local_direction, [1.0, 0.0, 0.0]);
        assert_eq!(p.calib, CalibParams::default());

        assert!(util::params::from_str::<ExecParams>("local_direction = [1.0, 0.0, 0.0]").is_err());

        let p = ExecParams {
            pole_length_m: -1.0,
            ..p
        };
        assert!(p.projector().is_err());
    }
}
