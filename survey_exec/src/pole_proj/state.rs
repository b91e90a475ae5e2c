//! Implementations for the PoleProj state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Serialize;

// Internal
use super::PoleProjError;
use crate::measure::{ProjectedMeasure, SurveyMeasure};
use positioner::{PoleProjector, Vector};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Pole projection module state
#[derive(Default)]
pub struct PoleProj {
    projector: Option<PoleProjector>,

    pub(crate) report: StatusReport,
    arch_report: Archiver,

    pub(crate) output: Option<ProjectedMeasure>,
    arch_output: Archiver,
}

/// Status report for PoleProj processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// Unit direction of the pole for the last projected measure.
    ///
    /// Frame: World
    pub dir_x: f64,
    pub dir_y: f64,
    pub dir_z: f64,

    /// Number of measures projected so far.
    pub num_projected: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for PoleProj {
    type InitData = PoleProjector;
    type InitError = PoleProjError;

    type InputData = SurveyMeasure;
    type OutputData = ProjectedMeasure;
    type StatusReport = StatusReport;
    type ProcError = PoleProjError;

    /// Initialise the PoleProj module.
    ///
    /// Expected init data is the projector to use.
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        self.projector = Some(init_data);

        // Initialise the archivers
        self.arch_report = Archiver::from_path(session, "pole_proj/status_report.csv")
            .map_err(PoleProjError::ArchiveInitError)?;
        self.arch_output = Archiver::from_path(session, "pole_proj/output.csv")
            .map_err(PoleProjError::ArchiveInitError)?;

        self.report = StatusReport::default();
        self.output = None;

        Ok(())
    }

    /// Project a single measure.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let projector = self.projector.ok_or(PoleProjError::NotInitialised)?;

        let anchor = input_data
            .anchor
            .ok_or(PoleProjError::Undefined(input_data.timestamp))?;

        let fail = |e| PoleProjError::ProjectionFailed(input_data.timestamp, e);

        let world_direction = projector
            .world_direction(&input_data.quaternion)
            .map_err(fail)?;
        let end = projector.project_with_direction(&world_direction, &anchor);

        let output = ProjectedMeasure::new(input_data.timestamp, &anchor, &end);

        trace!("PoleProj output: {:?}", output);

        self.report.dir_x = world_direction.x;
        self.report.dir_y = world_direction.y;
        self.report.dir_z = world_direction.z;
        self.report.num_projected += 1;
        self.output = Some(output);

        Ok((output, self.report))
    }
}

impl Archived for PoleProj {
    fn write(&mut self) -> Result<(), ArchiveError> {
        // Nothing projected yet, nothing to write
        let output = match self.output {
            Some(o) => o,
            None => return Ok(()),
        };

        self.arch_report.serialise(self.report)?;
        self.arch_output.serialise(output)?;

        Ok(())
    }
}

impl StatusReport {
    pub fn world_direction(&self) -> Vector {
        Vector::new(self.dir_x, self.dir_y, self.dir_z)
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
    use positioner::{Position, Quaternion};

    fn measure(anchor: Option<Position>, quaternion: Quaternion) -> SurveyMeasure {
        SurveyMeasure {
            timestamp: parse_timestamp("2024-06-01T12:00:00").unwrap(),
            quaternion,
            anchor,
        }
    }

    // The session epoch is global so this is the only test in the crate to
    // open a session.
    #[test]
    fn test_pole_proj() -> Result<(), Box<dyn std::error::Error>> {
        let mut pp = PoleProj::default();
        let anchor = Position::new(100.0, 200.0, 50.0);

        assert!(matches!(
            pp.proc(&measure(Some(anchor), Quaternion::IDENTITY)),
            Err(PoleProjError::NotInitialised)
        ));
        // Nothing to archive before the first projection
        pp.write()?;

        let sessions_dir = std::env::temp_dir().join("survey_exec_pole_proj_test");
        let session = Session::new_in("test_survey", &sessions_dir)?;

        pp.init(PoleProjector::with_default_direction(2.0)?, &session)?;
        pp.write()?;

        let (out, rpt) = pp.proc(&measure(Some(anchor), Quaternion::IDENTITY))?;
        assert_eq!(out.pole_end(), Position::new(102.0, 200.0, 50.0));
        assert_eq!(out.anchor(), anchor);
        assert_eq!(rpt.num_projected, 1);
        assert_eq!(rpt.world_direction(), Vector::X_AXIS);
        pp.write()?;

        let q = Quaternion::new(0.0, 0.3826834, 0.0, 0.9238795);
        let (out, rpt) = pp.proc(&measure(Some(anchor), q))?;
        assert_abs_diff_eq!(anchor.distance_to(&out.pole_end()), 2.0, epsilon = 1e-5);
        assert_eq!(rpt.num_projected, 2);
        pp.write()?;

        // Failures leave the last output untouched
        assert!(matches!(
            pp.proc(&measure(None, Quaternion::IDENTITY)),
            Err(PoleProjError::Undefined(_))
        ));
        assert!(matches!(
            pp.proc(&measure(Some(anchor), Quaternion::new(0.0, 0.0, 0.0, 0.0))),
            Err(PoleProjError::ProjectionFailed(_, _))
        ));
        assert_eq!(pp.report.num_projected, 2);

        // One row per successful projection plus the header
        let csv = std::fs::read_to_string(session.arch_root.join("pole_proj/output.csv"))?;
        assert_eq!(csv.lines().count(), 3);
        assert!(csv.starts_with("timestamp,utm_x,utm_y,utm_z,proj_x,proj_y,proj_z\n"));

        let csv = std::fs::read_to_string(session.arch_root.join("pole_proj/status_report.csv"))?;
        assert_eq!(csv.lines().count(), 3);

        std::fs::remove_dir_all(&session.session_root)?;

        Ok(())
    }
}
