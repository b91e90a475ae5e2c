//! Anchor stability tracking
//!
//! While the pole is held on a point the GPS fix should stay put. Each new
//! fix is compared with the average of the fixes before it.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::measure::SurveyMeasure;
use positioner::{stats::PositionWindow, Position, StatsError};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Default number of fixes averaged.
pub const DEFAULT_WINDOW_SIZE: usize = 20;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Rolling comparison of new anchors against the recent average.
#[derive(Debug, Clone)]
pub struct AnchorFollower {
    window: PositionWindow,
}

/// Distance of one anchor from the average of the ones before it.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct AnchorDeviation {
    pub timestamp: DateTime<Utc>,

    pub anchor: Position,

    pub average: Position,

    /// Units: meters
    pub distance_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl AnchorFollower {
    pub fn new(window_size: usize) -> Self {
        Self {
            window: PositionWindow::new(window_size),
        }
    }

    /// Feed a measure in.
    ///
    /// Measures without a fix are ignored. Once the window is full, returns
    /// the deviation of the new anchor from the window average, computed
    /// before the anchor is added.
    pub fn push(&mut self, measure: &SurveyMeasure) -> Result<Option<AnchorDeviation>, StatsError> {
        let anchor = match measure.anchor {
            Some(a) => a,
            None => return Ok(None),
        };

        let deviation = if self.window.is_full() {
            let average = self.window.average()?;

            Some(AnchorDeviation {
                timestamp: measure.timestamp,
                anchor,
                average,
                distance_m: average.distance_to(&anchor),
            })
        } else {
            None
        };

        self.window.push(anchor);

        Ok(deviation)
    }
}

impl Default for AnchorFollower {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SIZE)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::measure::parse_timestamp;
    use approx::assert_abs_diff_eq;
    use chrono::Duration;
    use positioner::Quaternion;

    fn measure(n: i64, anchor: Option<Position>) -> SurveyMeasure {
        SurveyMeasure {
            timestamp: parse_timestamp("2024-06-01T12:00:00").unwrap() + Duration::seconds(n),
            quaternion: Quaternion::IDENTITY,
            anchor,
        }
    }

    #[test]
    fn test_follow() {
        let mut f = AnchorFollower::new(3);

        for n in 0..3 {
            let m = measure(n, Some(Position::new(n as f64, 0.0, 0.0)));
            assert_eq!(f.push(&m).unwrap(), None);
        }

        // Unfixed measures neither report nor enter the window
        assert_eq!(f.push(&measure(3, None)).unwrap(), None);

        // Average of 0, 1, 2 is 1
        let d = f
            .push(&measure(4, Some(Position::new(1.0, 4.0, 0.0))))
            .unwrap()
            .unwrap();
        assert_eq!(d.average, Position::new(1.0, 0.0, 0.0));
        assert_abs_diff_eq!(d.distance_m, 4.0, epsilon = 1e-12);

        // The oldest fix has now been dropped, average of (1,0,0), (2,0,0), (1,4,0)
        let d = f
            .push(&measure(5, Some(Position::new(0.0, 0.0, 0.0))))
            .unwrap()
            .unwrap();
        assert_abs_diff_eq!(d.average.x_m, 4.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(d.average.y_m, 4.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_default_window() {
        let mut f = AnchorFollower::default();
        let p = Some(Position::new(500000.0, 6600000.0, 100.0));

        for n in 0..DEFAULT_WINDOW_SIZE as i64 {
            assert!(f.push(&measure(n, p)).unwrap().is_none());
        }

        let d = f.push(&measure(20, p)).unwrap().unwrap();
        assert_abs_diff_eq!(d.distance_m, 0.0, epsilon = 1e-6);
    }
}
