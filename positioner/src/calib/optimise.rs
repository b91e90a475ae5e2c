//! Search for the optimal local pole direction

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use argmin::core::{CostFunction, Error, Executor, State, TerminationReason};
use argmin::solver::neldermead::NelderMead;
use log::{debug, trace};
use serde::Serialize;

use super::{cartesian_to_spherical, spherical_to_cartesian, CalibError, CalibParams, MIN_CALIB_SAMPLES};
use crate::algebra::Vector;
use crate::rotation::{rotate_all, Quaternion};
use crate::stats::total_colinearity;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Relative step of the initial simplex along a non-zero coordinate.
const SIMPLEX_NONZERO_STEP: f64 = 0.05;

/// Absolute step of the initial simplex along a zero coordinate.
///
/// Units: radians
const SIMPLEX_ZERO_STEP_RAD: f64 = 0.00025;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Result of a successful calibration.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Calibration {
    /// Calibrated pole axis, unit length.
    ///
    /// Frame: Sensor body
    pub local_direction: Vector,

    /// Polar angle of `local_direction`.
    pub theta_rad: f64,

    /// Azimuth of `local_direction`.
    pub phi_rad: f64,

    /// Objective value at the initial direction.
    pub initial_cost: f64,

    /// Objective value at the calibrated direction.
    pub cost: f64,

    pub iterations: u64,
    pub evaluations: u64,
    pub num_samples: usize,
}

/// The calibration objective over `[theta, phi]`, for the optimiser.
#[derive(Debug, Clone)]
struct ColinearityProblem {
    quaternions: Vec<Quaternion>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CostFunction for ColinearityProblem {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, p: &Self::Param) -> Result<Self::Output, Error> {
        let (theta_rad, phi_rad) = (p[0], p[1]);
        let cost = colinearity_cost(&self.quaternions, &spherical_to_cartesian(theta_rad, phi_rad))?;

        if !cost.is_finite() {
            return Err(CalibError::NonFiniteCost { theta_rad, phi_rad }.into());
        }

        trace!("theta = {:+.6}, phi = {:+.6}: cost {:.6e}", theta_rad, phi_rad, cost);

        Ok(cost)
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Calibration objective for a candidate body-frame direction.
///
/// Rotates `local_direction` by every sample and sums the colinearity of each
/// result with their average. Lower is better, zero means every sample maps
/// the direction onto the same line.
pub fn colinearity_cost(quaternions: &[Quaternion], local_direction: &Vector) -> Result<f64, CalibError> {
    let vectors = rotate_all(quaternions, local_direction)?;

    Ok(total_colinearity(&vectors)?)
}

/// Estimate the pole axis in the sensor body frame from samples recorded
/// while the pole was static.
pub fn optimal_local_direction(
    quaternions: &[Quaternion],
    params: &CalibParams,
) -> Result<Calibration, CalibError> {
    if quaternions.len() < MIN_CALIB_SAMPLES {
        return Err(CalibError::InsufficientData {
            found: quaternions.len(),
            required: MIN_CALIB_SAMPLES,
        });
    }

    let initial = Vector::from(params.initial_direction)
        .normalize()
        .map_err(CalibError::InvalidInitialDirection)?;
    let initial_cost = colinearity_cost(quaternions, &initial)?;
    let (theta_0, phi_0) = cartesian_to_spherical(&initial);

    debug!(
        "Calibrating over {} samples from {} (cost {:.6e})",
        quaternions.len(),
        initial,
        initial_cost
    );

    let problem = ColinearityProblem {
        quaternions: quaternions.to_vec(),
    };
    let solver = NelderMead::new(initial_simplex(&[theta_0, phi_0]))
        .with_sd_tolerance(params.sd_tolerance)
        .map_err(optimiser_error)?;

    let res = Executor::new(problem, solver)
        .configure(|state| state.max_iters(params.max_iterations))
        .run()
        .map_err(optimiser_error)?;

    let state = res.state();
    let iterations = state.get_iter();
    let evaluations = state.get_func_counts().get("cost_count").copied().unwrap_or(0);
    let cost = state.get_best_cost();

    if matches!(state.get_termination_reason(), Some(TerminationReason::MaxItersReached)) {
        return Err(CalibError::NotConverged {
            iterations,
            evaluations,
            cost,
        });
    }

    let best = state
        .get_best_param()
        .ok_or_else(|| CalibError::Optimiser("no best parameter after the search".into()))?;
    let local_direction = spherical_to_cartesian(best[0], best[1]);
    let (theta_rad, phi_rad) = cartesian_to_spherical(&local_direction);

    debug!(
        "Calibration converged to {} (cost {:.6e}) after {} iterations",
        local_direction, cost, iterations
    );

    Ok(Calibration {
        local_direction,
        theta_rad,
        phi_rad,
        initial_cost,
        cost,
        iterations,
        evaluations,
        num_samples: quaternions.len(),
    })
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Simplex made of `x0` and one vertex per coordinate, that coordinate moved
/// by 5%, or by 0.00025 if it is zero.
fn initial_simplex(x0: &[f64]) -> Vec<Vec<f64>> {
    let mut simplex = Vec::with_capacity(x0.len() + 1);
    simplex.push(x0.to_vec());

    for i in 0..x0.len() {
        let mut v = x0.to_vec();
        v[i] = if v[i] != 0.0 {
            (1.0 + SIMPLEX_NONZERO_STEP) * v[i]
        } else {
            SIMPLEX_ZERO_STEP_RAD
        };
        simplex.push(v);
    }

    simplex
}

/// Recover our own error from the optimiser's, if the objective raised it.
fn optimiser_error(e: Error) -> CalibError {
    match e.downcast::<CalibError>() {
        Ok(e) => e,
        Err(e) => CalibError::Optimiser(e.to_string()),
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
