//! # Aggregate statistics
//!
//! Averages and dispersion measures over batches of vectors and positions.
//! These quantify how tightly a set of pole directions or endpoint estimates
//! cluster, which is what calibration minimises.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;
use std::collections::VecDeque;

use util::maths::mean_and_std;

use crate::algebra::{AlgebraError, Position, Vector};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Mean and population standard deviation of a set of distances.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Dispersion {
    /// Units: meters
    pub mean_m: f64,

    /// Units: meters
    pub std_m: f64,
}

/// A bounded first-in first-out window of positions.
///
/// Used to watch how stable the GPS anchor is: once the window is full each
/// new fix can be compared against the average of the previous ones.
#[derive(Debug, Clone)]
pub struct PositionWindow {
    capacity: usize,
    positions: VecDeque<Position>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum StatsError {
    #[error("Cannot compute statistics of an empty sequence")]
    EmptyInput,

    #[error(transparent)]
    Algebra(#[from] AlgebraError),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Componentwise mean of the vectors.
///
/// The result is not renormalised.
pub fn average(vectors: &[Vector]) -> Result<Vector, StatsError> {
    if vectors.is_empty() {
        return Err(StatsError::EmptyInput);
    }

    let sum = vectors
        .iter()
        .fold(Vector::ZERO, |acc, v| acc.add(v));

    Ok(sum.divide(vectors.len() as f64)?)
}

/// Componentwise mean of the positions.
pub fn centroid(positions: &[Position]) -> Result<Position, StatsError> {
    let offsets: Vec<Vector> = positions
        .iter()
        .map(|p| Position::origin().offset_to(p))
        .collect();

    Ok(Position::origin().plus(&average(&offsets)?))
}

/// Mean and standard deviation of the distances from each position to
/// `centroid`.
pub fn dispersion(positions: &[Position], centroid: &Position) -> Result<Dispersion, StatsError> {
    let distances: Vec<f64> = positions
        .iter()
        .map(|p| centroid.distance_to(p))
        .collect();

    match mean_and_std(&distances) {
        Some((mean_m, std_m)) => Ok(Dispersion { mean_m, std_m }),
        None => Err(StatsError::EmptyInput),
    }
}

/// Dispersion of the pole ends implied by a set of world directions.
///
/// Each direction is scaled to `pole_length_m` from a common origin, and the
/// spread is measured around the end of the (unnormalised) average direction.
pub fn pole_end_dispersion(vectors: &[Vector], pole_length_m: f64) -> Result<Dispersion, StatsError> {
    let origin = Position::origin();
    let avg_end = origin.plus(&average(vectors)?.scale(pole_length_m));

    let ends: Vec<Position> = vectors
        .iter()
        .map(|v| origin.plus(&v.scale(pole_length_m)))
        .collect();

    dispersion(&ends, &avg_end)
}

/// Sum of the colinearity of every vector with the average vector.
///
/// Zero when all vectors lie on one line, growing as they fan out.
pub fn total_colinearity(vectors: &[Vector]) -> Result<f64, StatsError> {
    let avg = average(vectors)?;

    let mut total = 0.0;
    for v in vectors {
        total += avg.colinearity(v)?;
    }

    Ok(total)
}

/// Mean colinearity of every vector with the average vector.
pub fn mean_colinearity(vectors: &[Vector]) -> Result<f64, StatsError> {
    Ok(total_colinearity(vectors)? / vectors.len() as f64)
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PositionWindow {
    /// Create an empty window holding at most `capacity` positions.
    ///
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);

        Self {
            capacity,
            positions: VecDeque::with_capacity(capacity),
        }
    }

    /// Add a position, dropping the oldest one if the window is full.
    pub fn push(&mut self, position: Position) {
        if self.positions.len() == self.capacity {
            self.positions.pop_front();
        }
        self.positions.push_back(position);
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.positions.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Average of the positions currently in the window.
    pub fn average(&self) -> Result<Position, StatsError> {
        let positions: Vec<Position> = self.positions.iter().copied().collect();
        centroid(&positions)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_average() {
        let v = Vector::new(0.3, -1.2, 4.5);
        assert_eq!(average(&[v]).unwrap(), v);

        let vs = [
            Vector::new(1.0, 0.0, 0.0),
            Vector::new(0.0, 1.0, 0.0),
            Vector::new(0.0, 0.0, 1.0),
            Vector::new(1.0, 1.0, 1.0),
        ];
        assert_eq!(average(&vs).unwrap(), Vector::new(0.5, 0.5, 0.5));

        // Opposite vectors average to zero rather than being renormalised
        let opposite = [Vector::X_AXIS, Vector::X_AXIS.neg()];
        assert_eq!(average(&opposite).unwrap().norm(), 0.0);

        assert_eq!(average(&[]), Err(StatsError::EmptyInput));
    }

    #[test]
    fn test_centroid_and_dispersion() {
        let ps = [
            Position::new(1.0, 0.0, 10.0),
            Position::new(-1.0, 0.0, 10.0),
            Position::new(0.0, 3.0, 10.0),
            Position::new(0.0, -3.0, 10.0),
        ];

        let c = centroid(&ps).unwrap();
        assert_eq!(c, Position::new(0.0, 0.0, 10.0));

        // Distances are 1, 1, 3, 3
        let d = dispersion(&ps, &c).unwrap();
        assert_abs_diff_eq!(d.mean_m, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(d.std_m, 1.0, epsilon = 1e-12);

        assert_eq!(centroid(&[]), Err(StatsError::EmptyInput));
        assert_eq!(dispersion(&[], &c), Err(StatsError::EmptyInput));
    }

    #[test]
    fn test_pole_end_dispersion() {
        // Identical directions have no spread
        let same = vec![Vector::new(0.6, 0.0, 0.8); 5];
        let d = pole_end_dispersion(&same, 2.0).unwrap();
        assert_abs_diff_eq!(d.mean_m, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(d.std_m, 0.0, epsilon = 1e-12);

        // Two directions symmetric about x, each 0.1 away from the average
        // in y once scaled
        let pair = [Vector::new(1.0, 0.05, 0.0), Vector::new(1.0, -0.05, 0.0)];
        let d = pole_end_dispersion(&pair, 2.0).unwrap();
        assert_abs_diff_eq!(d.mean_m, 0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(d.std_m, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_colinearity_measures() {
        let parallel = [
            Vector::new(1.0, 1.0, 0.0),
            Vector::new(2.0, 2.0, 0.0),
            Vector::new(0.5, 0.5, 0.0),
        ];
        assert_abs_diff_eq!(total_colinearity(&parallel).unwrap(), 0.0, epsilon = 1e-12);

        let fanned = [
            Vector::new(1.0, 0.1, 0.0),
            Vector::new(1.0, -0.1, 0.0),
            Vector::new(1.0, 0.0, 0.1),
            Vector::new(1.0, 0.0, -0.1),
        ];
        let total = total_colinearity(&fanned).unwrap();
        assert!(total > 0.0);
        assert_abs_diff_eq!(mean_colinearity(&fanned).unwrap(), total / 4.0, epsilon = 1e-15);

        // The average of opposite vectors has no direction
        let opposite = [Vector::X_AXIS, Vector::X_AXIS.neg()];
        assert!(matches!(
            total_colinearity(&opposite),
            Err(StatsError::Algebra(AlgebraError::ZeroNorm(_)))
        ));
    }

    #[test]
    fn test_position_window() {
        let mut w = PositionWindow::new(3);
        assert!(w.is_empty());
        assert_eq!(w.average(), Err(StatsError::EmptyInput));

        w.push(Position::new(0.0, 0.0, 0.0));
        w.push(Position::new(3.0, 0.0, 0.0));
        assert!(!w.is_full());
        assert_eq!(w.average().unwrap(), Position::new(1.5, 0.0, 0.0));

        w.push(Position::new(6.0, 0.0, 0.0));
        w.push(Position::new(9.0, 3.0, -3.0));
        assert!(w.is_full());
        assert_eq!(w.len(), 3);
        assert_eq!(w.average().unwrap(), Position::new(6.0, 1.0, -1.0));

        assert_eq!(PositionWindow::new(0).capacity(), 1);
    }
}
