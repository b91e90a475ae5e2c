//! # Survey library.
//!
//! This library allows the survey executable, and its tests, to access the
//! replay and processing stages of a pole survey.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Anchor following - how far each GPS fix strays from the recent average
pub mod follow;

/// Survey measures and time windows
pub mod measure;

/// Executable parameters
pub mod params;

/// Pole projection module - projects each measure to the far end of the pole
pub mod pole_proj;

/// Replay - loads recorded survey data from CSV
pub mod replay;

/// Survey calibration - calibrates the pole mount and evaluates the result
pub mod survey_calib;

/// TSV output of projected measures
pub mod tsv;
