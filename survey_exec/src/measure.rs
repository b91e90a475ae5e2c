//! Survey measures and the time window used to select them

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

// Internal
use positioner::{Position, Quaternion};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Accepted layouts for timestamps without a UTC offset, which are read as
/// UTC.
const NAIVE_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One row of a survey recording as it appears in the CSV file.
///
/// The UTM cells are empty when the GPS had no fix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureRecord {
    pub timestamp: String,
    pub quat_i: f64,
    pub quat_j: f64,
    pub quat_k: f64,
    pub quat_real: f64,
    pub utm_x: Option<f64>,
    pub utm_y: Option<f64>,
    pub utm_z: Option<f64>,
}

/// A sensor orientation and, if the GPS had a fix, the antenna position.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SurveyMeasure {
    pub timestamp: DateTime<Utc>,

    /// Orientation of the sensor.
    pub quaternion: Quaternion,

    /// Position of the antenna at the near end of the pole.
    ///
    /// Units: meters,
    /// Frame: UTM
    pub anchor: Option<Position>,
}

/// A measure together with the pole end it projects to.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct ProjectedMeasure {
    pub timestamp: DateTime<Utc>,

    pub utm_x: f64,
    pub utm_y: f64,
    pub utm_z: f64,

    pub proj_x: f64,
    pub proj_y: f64,
    pub proj_z: f64,
}

/// A time interval from `start` to `end`. A missing bound is unbounded.
///
/// Measures are replayed over `[start, end)`, calibration samples over
/// `[start, end]`.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct TimeWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SurveyMeasure {
    /// Build a measure from a CSV row.
    pub fn from_record(record: &MeasureRecord) -> Result<Self, chrono::ParseError> {
        let anchor = match (record.utm_x, record.utm_y, record.utm_z) {
            (Some(x), Some(y), Some(z)) => Some(Position::new(x, y, z)),
            _ => None,
        };

        Ok(Self {
            timestamp: parse_timestamp(&record.timestamp)?,
            quaternion: Quaternion::new(
                record.quat_i,
                record.quat_j,
                record.quat_k,
                record.quat_real,
            ),
            anchor,
        })
    }

    /// True when every field is present, i.e. the GPS had a fix.
    pub fn is_defined(&self) -> bool {
        self.anchor.is_some()
    }
}

impl ProjectedMeasure {
    pub fn new(timestamp: DateTime<Utc>, anchor: &Position, end: &Position) -> Self {
        Self {
            timestamp,
            utm_x: anchor.x_m,
            utm_y: anchor.y_m,
            utm_z: anchor.z_m,
            proj_x: end.x_m,
            proj_y: end.y_m,
            proj_z: end.z_m,
        }
    }

    pub fn anchor(&self) -> Position {
        Position::new(self.utm_x, self.utm_y, self.utm_z)
    }

    pub fn pole_end(&self) -> Position {
        Position::new(self.proj_x, self.proj_y, self.proj_z)
    }
}

impl TimeWindow {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    /// Parse a window from optional timestamp strings.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, chrono::ParseError> {
        Ok(Self {
            start: start.map(parse_timestamp).transpose()?,
            end: end.map(parse_timestamp).transpose()?,
        })
    }

    pub fn contains(&self, timestamp: &DateTime<Utc>) -> bool {
        if let Some(ref s) = self.start {
            if timestamp < s {
                return false;
            }
        }

        if let Some(ref e) = self.end {
            if timestamp >= e {
                return false;
            }
        }

        true
    }

    /// Like [`TimeWindow::contains`] but also includes `end` itself.
    pub fn contains_inclusive(&self, timestamp: &DateTime<Utc>) -> bool {
        self.contains(timestamp) || self.end.as_ref() == Some(timestamp)
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Parse an ISO-8601 timestamp.
///
/// Timestamps with an offset are converted to UTC, those without one are
/// taken to already be UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    let value = value.trim();

    let rfc_err = match DateTime::parse_from_rfc3339(value) {
        Ok(t) => return Ok(t.with_timezone(&Utc)),
        Err(e) => e,
    };

    for fmt in NAIVE_TIMESTAMP_FORMATS.iter() {
        if let Ok(t) = NaiveDateTime::parse_from_str(value, fmt) {
            return Ok(Utc.from_utc_datetime(&t));
        }
    }

    Err(rfc_err)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
