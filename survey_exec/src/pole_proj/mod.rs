//! Pole projection module
//!
//! Projects each survey measure with a GPS fix to the far end of the pole,
//! archiving every projected measure in the session.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use state::*;

use chrono::{DateTime, Utc};
use positioner::ProjectorError;
use util::archive::ArchiveError;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during PoleProj operation.
#[derive(Debug, thiserror::Error)]
pub enum PoleProjError {
    #[error("PoleProj has not been initialised")]
    NotInitialised,

    #[error("Could not initialise the archives: {0}")]
    ArchiveInitError(ArchiveError),

    #[error("The measure at {0} has no GPS fix")]
    Undefined(DateTime<Utc>),

    #[error("Cannot project the measure at {0}: {1}")]
    ProjectionFailed(DateTime<Utc>, ProjectorError),
}
