//! Loading of recorded survey data
//!
//! Two CSV layouts are understood:
//!
//! - Survey recordings with the header
//!   `timestamp,quat_i,quat_j,quat_k,quat_real,utm_x,utm_y,utm_z`.
//! - Bare orientation samples with the header `i,j,k,w`, as captured while
//!   the pole is held still for calibration.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use chrono::{DateTime, Utc};
use log::debug;
use serde::Deserialize;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Internal
use crate::measure::{parse_timestamp, MeasureRecord, SurveyMeasure, TimeWindow};
use positioner::Quaternion;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Header of a survey recording.
pub const MEASURE_HEADER: [&str; 8] = [
    "timestamp", "quat_i", "quat_j", "quat_k", "quat_real", "utm_x", "utm_y", "utm_z",
];

/// Header of an orientation sample file.
pub const QUATERNION_HEADER: [&str; 4] = ["i", "j", "k", "w"];

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An orientation reading, timestamped if it came from a survey recording.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct QuaternionSample {
    pub timestamp: Option<DateTime<Utc>>,
    pub quaternion: Quaternion,
}

#[derive(Debug, Deserialize)]
struct QuaternionRecord {
    i: f64,
    j: f64,
    k: f64,
    w: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("Cannot open {0:?}: {1}")]
    CannotOpen(PathBuf, io::Error),

    #[error("Cannot read the CSV header: {0}")]
    InvalidHeader(csv::Error),

    #[error("Unrecognised CSV header {0:?}, expected {1:?} or {2:?}")]
    UnknownLayout(Vec<String>, [&'static str; 8], [&'static str; 4]),

    #[error("Invalid record on row {row}: {source}")]
    InvalidRecord { row: usize, source: csv::Error },

    #[error("Invalid timestamp {value:?} on row {row}: {source}")]
    InvalidTimestamp {
        row: usize,
        value: String,
        source: chrono::ParseError,
    },

    #[error("The samples carry no timestamps so cannot be limited to {0:?}")]
    Untimed(TimeWindow),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Load every measure from a survey recording.
pub fn load_measures<R: io::Read>(reader: R) -> Result<Vec<SurveyMeasure>, ReplayError> {
    let mut rdr = csv::Reader::from_reader(reader);

    let layout = header_of(&mut rdr)?;
    if !is_layout(&layout, &MEASURE_HEADER) {
        return Err(unknown_layout(layout));
    }

    read_measures(rdr)
}

/// Load every measure from the survey recording at `path`.
pub fn load_measures_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<SurveyMeasure>, ReplayError> {
    load_measures(open(path.as_ref())?)
}

/// Keep the measures inside `window`, optionally only those with a GPS fix.
pub fn select(measures: &[SurveyMeasure], window: &TimeWindow, defined_only: bool) -> Vec<SurveyMeasure> {
    let selected: Vec<SurveyMeasure> = measures
        .iter()
        .filter(|m| window.contains(&m.timestamp))
        .filter(|m| !defined_only || m.is_defined())
        .copied()
        .collect();

    debug!(
        "Selected {} of {} measures in {:?}",
        selected.len(),
        measures.len(),
        window
    );

    selected
}

/// Load orientation samples from either CSV layout.
pub fn load_quaternions<R: io::Read>(reader: R) -> Result<Vec<QuaternionSample>, ReplayError> {
    let mut rdr = csv::Reader::from_reader(reader);

    let layout = header_of(&mut rdr)?;

    if is_layout(&layout, &MEASURE_HEADER) {
        Ok(read_measures(rdr)?
            .into_iter()
            .map(|m| QuaternionSample {
                timestamp: Some(m.timestamp),
                quaternion: m.quaternion,
            })
            .collect())
    } else if is_layout(&layout, &QUATERNION_HEADER) {
        let mut samples = Vec::new();

        for (idx, result) in rdr.deserialize::<QuaternionRecord>().enumerate() {
            let r = result.map_err(|source| ReplayError::InvalidRecord { row: idx + 2, source })?;

            samples.push(QuaternionSample {
                timestamp: None,
                quaternion: Quaternion::new(r.i, r.j, r.k, r.w),
            });
        }

        Ok(samples)
    } else {
        Err(unknown_layout(layout))
    }
}

/// Load orientation samples from the file at `path`.
pub fn load_quaternions_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<QuaternionSample>, ReplayError> {
    load_quaternions(open(path.as_ref())?)
}

/// Quaternions of the samples inside `window`, end included.
///
/// Untimed samples can only be selected by an unbounded window.
pub fn select_quaternions(
    samples: &[QuaternionSample],
    window: &TimeWindow,
) -> Result<Vec<Quaternion>, ReplayError> {
    let bounded = window.start.is_some() || window.end.is_some();

    let mut quats = Vec::with_capacity(samples.len());
    for s in samples {
        match s.timestamp {
            Some(ref t) if !window.contains_inclusive(t) => (),
            Some(_) => quats.push(s.quaternion),
            None if bounded => return Err(ReplayError::Untimed(*window)),
            None => quats.push(s.quaternion),
        }
    }

    Ok(quats)
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn open(path: &Path) -> Result<std::fs::File, ReplayError> {
    std::fs::File::open(path).map_err(|e| ReplayError::CannotOpen(path.to_path_buf(), e))
}

fn header_of<R: io::Read>(rdr: &mut csv::Reader<R>) -> Result<Vec<String>, ReplayError> {
    Ok(rdr
        .headers()
        .map_err(ReplayError::InvalidHeader)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect())
}

fn is_layout(header: &[String], expected: &[&str]) -> bool {
    header.len() == expected.len() && header.iter().zip(expected.iter()).all(|(h, e)| h == e)
}

fn unknown_layout(header: Vec<String>) -> ReplayError {
    ReplayError::UnknownLayout(header, MEASURE_HEADER, QUATERNION_HEADER)
}

fn read_measures<R: io::Read>(mut rdr: csv::Reader<R>) -> Result<Vec<SurveyMeasure>, ReplayError> {
    let mut measures = Vec::new();

    for (idx, result) in rdr.deserialize::<MeasureRecord>().enumerate() {
        // Row 1 is the header
        let row = idx + 2;

        let record = result.map_err(|source| ReplayError::InvalidRecord { row, source })?;

        let measure = SurveyMeasure::from_record(&record).map_err(|source| {
            ReplayError::InvalidTimestamp {
                row,
                value: record.timestamp.clone(),
                source,
            }
        })?;

        measures.push(measure);
    }

    Ok(measures)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
