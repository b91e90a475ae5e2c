//! Mounting calibration over recorded samples
//!
//! Runs the calibration on the samples of one interval, then measures on any
//! number of intervals how tightly the pole ends cluster with the initial
//! direction compared with the calibrated one.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;
use thiserror::Error;

// Internal
use crate::measure::TimeWindow;
use crate::replay::{select_quaternions, QuaternionSample, ReplayError};
use positioner::{
    calib::optimal_local_direction,
    rotation::rotate_all,
    stats::pole_end_dispersion,
    AlgebraError, CalibError, CalibParams, Calibration, Dispersion, RotationError, StatsError,
    Vector,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Everything produced by a calibration run, saved to the session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalibReport {
    pub calib_start: Option<DateTime<Utc>>,
    pub calib_end: Option<DateTime<Utc>>,

    pub calibration: Calibration,

    pub evaluations: Vec<IntervalEvaluation>,
}

/// Pole-end dispersion over one interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IntervalEvaluation {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,

    pub num_samples: usize,

    /// Dispersion using the initial direction.
    pub initial: Dispersion,

    /// Dispersion using the calibrated direction.
    pub calibrated: Dispersion,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SurveyCalibError {
    #[error(transparent)]
    Replay(#[from] ReplayError),

    #[error("Calibration failed: {0}")]
    Calib(#[from] CalibError),

    #[error("Invalid initial direction: {0}")]
    InitialDirection(AlgebraError),

    #[error("Cannot evaluate {window:?}: {source}")]
    Evaluation {
        window: TimeWindow,
        source: EvaluationError,
    },

    #[error("Expected an interval as START,END, found {0:?}")]
    InvalidInterval(String),

    #[error("Invalid interval bound {0:?}: {1}")]
    InvalidIntervalBound(String, chrono::ParseError),
}

#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error(transparent)]
    Rotation(#[from] RotationError),

    #[error(transparent)]
    Stats(#[from] StatsError),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Parse a `START,END` interval.
pub fn parse_interval(value: &str) -> Result<TimeWindow, SurveyCalibError> {
    let mut parts = value.split(',');

    let (start, end) = match (parts.next(), parts.next(), parts.next()) {
        (Some(s), Some(e), None) => (s.trim(), e.trim()),
        _ => return Err(SurveyCalibError::InvalidInterval(value.to_string())),
    };

    let bound = |b: &str| {
        crate::measure::parse_timestamp(b)
            .map_err(|e| SurveyCalibError::InvalidIntervalBound(b.to_string(), e))
    };

    Ok(TimeWindow::new(Some(bound(start)?), Some(bound(end)?)))
}

/// Pole-end dispersion of `quaternions` for two body-frame directions.
pub fn evaluate(
    quaternions: &[positioner::Quaternion],
    initial_direction: &Vector,
    calibrated_direction: &Vector,
    pole_length_m: f64,
) -> Result<(Dispersion, Dispersion), EvaluationError> {
    let initial = pole_end_dispersion(&rotate_all(quaternions, initial_direction)?, pole_length_m)?;
    let calibrated = pole_end_dispersion(&rotate_all(quaternions, calibrated_direction)?, pole_length_m)?;

    Ok((initial, calibrated))
}

/// Calibrate on the samples in `calib_window` and evaluate the result on
/// each of `eval_windows`.
pub fn run(
    samples: &[QuaternionSample],
    calib_window: &TimeWindow,
    eval_windows: &[TimeWindow],
    params: &CalibParams,
    pole_length_m: f64,
) -> Result<CalibReport, SurveyCalibError> {
    let quats = select_quaternions(samples, calib_window)?;
    info!("Calibrating on {} samples", quats.len());

    let calibration = optimal_local_direction(&quats, params)?;
    info!(
        "Calibrated local direction {} (theta = {:.6} rad, phi = {:.6} rad)",
        calibration.local_direction, calibration.theta_rad, calibration.phi_rad
    );
    info!(
        "Cost {:.6e} -> {:.6e} after {} iterations",
        calibration.initial_cost, calibration.cost, calibration.iterations
    );

    let initial_direction = Vector::from(params.initial_direction)
        .normalize()
        .map_err(SurveyCalibError::InitialDirection)?;

    let mut evaluations = Vec::with_capacity(eval_windows.len());

    for window in eval_windows {
        let quats = select_quaternions(samples, window)?;

        let (initial, calibrated) = evaluate(
            &quats,
            &initial_direction,
            &calibration.local_direction,
            pole_length_m,
        )
        .map_err(|source| SurveyCalibError::Evaluation {
            window: *window,
            source,
        })?;

        info!(
            "Interval {:?} to {:?} ({} samples):",
            window.start,
            window.end,
            quats.len()
        );
        info!(
            "    dispersion with {}: {:.4} m +/- {:.4} m",
            initial_direction, initial.mean_m, initial.std_m
        );
        info!(
            "    dispersion with {}: {:.4} m +/- {:.4} m",
            calibration.local_direction, calibrated.mean_m, calibrated.std_m
        );

        evaluations.push(IntervalEvaluation {
            start: window.start,
            end: window.end,
            num_samples: quats.len(),
            initial,
            calibrated,
        });
    }

    Ok(CalibReport {
        calib_start: calib_window.start,
        calib_end: calib_window.end,
        calibration,
        evaluations,
    })
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::measure::parse_timestamp;
    use chrono::Duration;
    use positioner::Quaternion;
    use nalgebra::{Unit, UnitQuaternion, Vector3};

    /// Two static sessions ten minutes apart, both with the pole mounted
    /// along `axis` in the sensor frame.
    fn samples(axis: &Vector) -> Vec<QuaternionSample> {
        let t0 = parse_timestamp("2024-06-01T12:00:00").unwrap();
        let mount = UnitQuaternion::from_euler_angles(0.2, -0.4, 1.1);
        let spin_axis = Unit::new_normalize(Vector3::from(*axis));

        let mut out = Vec::new();
        for session in 0..2 {
            for k in 0..20 {
                let t = k as f64;
                let spin = UnitQuaternion::from_axis_angle(&spin_axis, 0.31 * t + session as f64);
                let noise = UnitQuaternion::from_euler_angles(
                    1e-3 * (1.7 * t).sin(),
                    1e-3 * (2.3 * t).cos(),
                    1e-3 * (0.9 * t).sin(),
                );

                out.push(QuaternionSample {
                    timestamp: Some(t0 + Duration::minutes(10 * session) + Duration::seconds(k)),
                    quaternion: Quaternion::from(noise * mount * spin),
                });
            }
        }

        out
    }

    #[test]
    fn test_parse_interval() {
        let w = parse_interval("2024-06-01T12:00:00, 2024-06-01T12:01:00").unwrap();
        assert_eq!(w.start, Some(parse_timestamp("2024-06-01T12:00:00").unwrap()));
        assert_eq!(w.end, Some(parse_timestamp("2024-06-01T12:01:00").unwrap()));

        assert!(matches!(
            parse_interval("2024-06-01T12:00:00"),
            Err(SurveyCalibError::InvalidInterval(_))
        ));
        assert!(matches!(
            parse_interval("a,b,c"),
            Err(SurveyCalibError::InvalidInterval(_))
        ));
        assert!(matches!(
            parse_interval("2024-06-01T12:00:00,later"),
            Err(SurveyCalibError::InvalidIntervalBound(_, _))
        ));
    }

    #[test]
    fn test_run() {
        let axis = Vector::new(0.9, 0.35, -0.25).normalize().unwrap();
        let samples = samples(&axis);

        let calib_window = parse_interval("2024-06-01T12:00:00,2024-06-01T12:01:00").unwrap();
        let eval_windows = [
            calib_window,
            parse_interval("2024-06-01T12:10:00,2024-06-01T12:11:00").unwrap(),
        ];

        let report = run(&samples, &calib_window, &eval_windows, &CalibParams::default(), 2.57).unwrap();

        assert_eq!(report.calibration.num_samples, 20);
        assert!(report.calibration.local_direction.dot(&axis).abs() > 0.999);
        assert_eq!(report.evaluations.len(), 2);

        // The calibrated direction also holds on the unseen interval
        for e in report.evaluations.iter() {
            assert_eq!(e.num_samples, 20);
            assert!(e.calibrated.mean_m < e.initial.mean_m);
        }
    }

    #[test]
    fn test_run_errors() {
        let samples = samples(&Vector::X_AXIS);

        // No samples in the window
        let empty = parse_interval("2030-01-01T00:00:00,2030-01-01T00:01:00").unwrap();
        assert!(matches!(
            run(&samples, &empty, &[], &CalibParams::default(), 2.0),
            Err(SurveyCalibError::Calib(CalibError::InsufficientData { found: 0, .. }))
        ));

        // Empty evaluation interval
        assert!(matches!(
            run(&samples, &TimeWindow::default(), &[empty], &CalibParams::default(), 2.0),
            Err(SurveyCalibError::Evaluation { .. })
        ));
    }

    #[test]
    fn test_evaluate() {
        // Every sample points the same way
        let quats = vec![Quaternion::IDENTITY; 5];
        let (a, b) = evaluate(&quats, &Vector::X_AXIS, &Vector::new(0.0, 1.0, 0.0), 2.0).unwrap();
        assert_eq!(a.mean_m, 0.0);
        assert_eq!(b.mean_m, 0.0);

        assert!(matches!(
            evaluate(&[], &Vector::X_AXIS, &Vector::X_AXIS, 2.0),
            Err(EvaluationError::Stats(StatsError::EmptyInput))
        ));
    }
}
