//! Survey executable entry point.
//!
//! Replays recorded survey data through the pole positioner.
//!
//! # Commands
//!
//!     - `project`: project every measure with a GPS fix to the far end of the pole and
//!       print the result as TSV on stdout.
//!     - `calibrate`: estimate how the orientation sensor is mounted on the pole from samples
//!       taken while the pole was held still, then compare pole-end dispersion before and
//!       after calibration.
//!     - `follow`: print how far each GPS fix strays from the average of the previous ones.
//!
//! Logs go to stderr and to the session directory, so stdout only carries data.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use survey_lib::{
    follow::AnchorFollower,
    measure::TimeWindow,
    params::ExecParams,
    pole_proj::PoleProj,
    replay,
    survey_calib,
    tsv::{TsvWriter, TSV_TIMESTAMP_FORMAT},
};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, info, warn};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use structopt::StructOpt;

// Internal
use util::{
    archive::Archived,
    logger::{logger_init, parse_level},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

const EXEC_NAME: &str = "survey_exec";

/// Parameter file used when none is given, relative to the params directory.
const DEFAULT_PARAMS_FILE: &str = "survey_exec.toml";

// ---------------------------------------------------------------------------
// COMMAND LINE
// ---------------------------------------------------------------------------

/// Pole survey replay and calibration.
#[derive(Debug, StructOpt)]
#[structopt(name = "survey_exec")]
struct Opts {
    /// Parameter file to use instead of `params/survey_exec.toml`.
    #[structopt(long, parse(from_os_str))]
    params: Option<PathBuf>,

    /// Minimum level to log: TRACE, DEBUG, INFO, WARNING or ERROR.
    #[structopt(long, default_value = "INFO")]
    log_level: String,

    /// Directory to create the session in instead of `$POLE_SURVEY_ROOT/sessions`.
    #[structopt(long, parse(from_os_str))]
    sessions_dir: Option<PathBuf>,

    #[structopt(subcommand)]
    cmd: Cmd,
}

#[derive(Debug, StructOpt)]
enum Cmd {
    /// Project each measure with a GPS fix to the far end of the pole.
    #[structopt(name = "project")]
    Project {
        /// Survey recording to replay.
        #[structopt(long, parse(from_os_str))]
        data: PathBuf,

        /// Only include measures at or after this time.
        #[structopt(long)]
        start: Option<String>,

        /// Only include measures before this time.
        #[structopt(long)]
        end: Option<String>,

        /// Override the pole length from the parameters, in meters.
        #[structopt(long)]
        pole_length: Option<f64>,

        /// Don't write the header line.
        #[structopt(long)]
        no_header: bool,

        /// Write to this file rather than stdout.
        #[structopt(long, parse(from_os_str))]
        output: Option<PathBuf>,
    },

    /// Calibrate the sensor mount from samples of a static pole.
    #[structopt(name = "calibrate")]
    Calibrate {
        /// Survey recording or orientation samples.
        #[structopt(long, parse(from_os_str))]
        data: PathBuf,

        /// Only calibrate on samples at or after this time.
        #[structopt(long)]
        start: Option<String>,

        /// Only calibrate on samples at or before this time.
        #[structopt(long)]
        end: Option<String>,

        /// Interval to evaluate the calibration on, as START,END, both included. May be
        /// repeated.
        #[structopt(long = "evaluate")]
        evaluate: Vec<String>,
    },

    /// Track how far each GPS fix is from the average of the ones before it.
    #[structopt(name = "follow")]
    Follow {
        /// Survey recording to replay.
        #[structopt(long, parse(from_os_str))]
        data: PathBuf,

        /// Number of fixes to average.
        #[structopt(long, default_value = "20")]
        window: usize,
    },
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opts = Opts::from_args();

    // ---- EARLY INITIALISATION ----

    let level = parse_level(&opts.log_level).wrap_err("Invalid log level")?;

    // Initialise session
    let session = match opts.sessions_dir {
        Some(ref dir) => Session::new_in(EXEC_NAME, dir),
        None => Session::new(EXEC_NAME, "sessions"),
    }
    .wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(level, &session).wrap_err("Failed to initialise logging")?;

    info!("Pole Survey Executable\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI options: {:?}", opts);

    // ---- LOAD PARAMETERS ----

    let params: ExecParams = match opts.params {
        Some(ref path) => util::params::load_from_path(path),
        None => util::params::load(DEFAULT_PARAMS_FILE),
    }
    .wrap_err("Could not load exec params")?;

    info!("Exec parameters loaded");
    session
        .save("params.json", &params)
        .wrap_err("Failed to save the parameters to the session")?;

    // ---- RUN COMMAND ----

    match opts.cmd {
        Cmd::Project {
            data,
            start,
            end,
            pole_length,
            no_header,
            output,
        } => {
            let window = TimeWindow::parse(start.as_deref(), end.as_deref())
                .wrap_err("Invalid time window")?;

            let params = ExecParams {
                pole_length_m: pole_length.unwrap_or(params.pole_length_m),
                ..params
            };

            let out: Box<dyn Write> = match output {
                Some(ref path) => Box::new(
                    std::fs::File::create(path)
                        .wrap_err_with(|| format!("Cannot create output file {:?}", path))?,
                ),
                None => Box::new(io::stdout()),
            };

            project(&session, &params, &data, &window, out, !no_header)
        }
        Cmd::Calibrate {
            data,
            start,
            end,
            evaluate,
        } => {
            let window = TimeWindow::parse(start.as_deref(), end.as_deref())
                .wrap_err("Invalid time window")?;

            let eval_windows = evaluate
                .iter()
                .map(|s| survey_calib::parse_interval(s))
                .collect::<Result<Vec<_>, _>>()
                .wrap_err("Invalid evaluation interval")?;

            calibrate(&session, &params, &data, &window, &eval_windows)
        }
        Cmd::Follow { data, window } => follow(&data, window),
    }
}

/// Project every defined measure in `window` and write the TSV to `out`.
fn project(
    session: &Session,
    params: &ExecParams,
    data: &Path,
    window: &TimeWindow,
    out: Box<dyn Write>,
    header: bool,
) -> Result<(), Report> {
    let measures = replay::load_measures_from_path(data)
        .wrap_err_with(|| format!("Failed to load measures from {:?}", data))?;
    info!("Loaded {} survey measures from {:?}", measures.len(), data);

    let selected = replay::select(&measures, window, true);
    info!("{} measures with a GPS fix in {:?}", selected.len(), window);

    let projector = params.projector().wrap_err("Invalid projector parameters")?;
    info!(
        "Projecting along {} over {} m",
        projector.local_direction(),
        projector.pole_length_m()
    );

    let mut pole_proj = PoleProj::default();
    pole_proj
        .init(projector, session)
        .wrap_err("Failed to initialise PoleProj")?;

    let mut tsv = TsvWriter::new(out, header).wrap_err("Failed to write the TSV header")?;
    let mut num_skipped = 0;

    for m in selected.iter() {
        match pole_proj.proc(m) {
            Ok((projected, _)) => {
                tsv.write(&projected).wrap_err("Failed to write the TSV output")?;

                if let Err(e) = pole_proj.write() {
                    warn!("Could not archive PoleProj: {}", e);
                }
            }
            Err(e) => {
                warn!("Skipping measure: {}", e);
                num_skipped += 1;
            }
        }
    }

    tsv.finish().wrap_err("Failed to flush the TSV output")?;

    info!(
        "Projected {} measures, skipped {}",
        selected.len() - num_skipped,
        num_skipped
    );

    Ok(())
}

/// Calibrate on `window` and save the report to the session.
fn calibrate(
    session: &Session,
    params: &ExecParams,
    data: &Path,
    window: &TimeWindow,
    eval_windows: &[TimeWindow],
) -> Result<(), Report> {
    let samples = replay::load_quaternions_from_path(data)
        .wrap_err_with(|| format!("Failed to load samples from {:?}", data))?;
    info!("Loaded {} orientation samples from {:?}", samples.len(), data);

    let report = survey_calib::run(
        &samples,
        window,
        eval_windows,
        &params.calib,
        params.pole_length_m,
    )
    .wrap_err("Calibration failed")?;

    let path = session
        .save("calibration.json", &report)
        .wrap_err("Failed to save the calibration")?;

    info!(
        "Set `local_direction = {:?}` in the exec params to use this calibration (saved to {:?})",
        report.calibration.local_direction.to_array(),
        path
    );

    Ok(())
}

/// Print the deviation of each anchor from the rolling average.
fn follow(data: &Path, window_size: usize) -> Result<(), Report> {
    let measures = replay::load_measures_from_path(data)
        .wrap_err_with(|| format!("Failed to load measures from {:?}", data))?;
    info!("Loaded {} survey measures from {:?}", measures.len(), data);

    info!("Averaging over {} fixes", window_size);

    let mut follower = AnchorFollower::new(window_size);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for m in measures.iter() {
        if let Some(d) = follower.push(m).wrap_err("Failed to average the anchors")? {
            writeln!(
                out,
                "{}\t{:.4}",
                d.timestamp.format(TSV_TIMESTAMP_FORMAT),
                d.distance_m
            )
            .wrap_err("Failed to write to stdout")?;
        }
    }

    Ok(())
}
