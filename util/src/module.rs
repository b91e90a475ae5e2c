//! Processing stage interface
//!
//! A stage is set up once per session and then fed one input at a time, for
//! example one survey measure per call when replaying a recording.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::session::Session;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// The state of a processing stage.
pub trait State {
    /// What the stage needs to be set up, e.g. its parameters.
    type InitData;
    type InitError;

    /// One unit of work, e.g. a single measure.
    type InputData;
    type OutputData;
    /// Per input diagnostics, suitable for archiving.
    type StatusReport;
    type ProcError;

    /// Set the stage up for `session`, opening any archives it writes.
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError>;

    /// Process one input.
    ///
    /// An error only concerns this input, the stage remains usable for the
    /// next one.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;
}
