//! # Autonomous Executable
//!
//! Runs one autonomous routine against the simulated chassis.
//!
//! # Architecture
//!
//! The execution consists of:
//!
//!     - Initialise the session and logging
//!     - Load the autonomy, tuning and simulation parameters
//!     - Select a routine from the registry
//!     - Start the simulated chassis and hand it the tuning
//!     - Reset the controller references and run the routine to completion
//!     - Save a report of the run into the session

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::time::Instant;

use chassis_if::{ChassisTuning, MotionController, Pose};
use chrono::Utc;
use color_eyre::{eyre::WrapErr, Result};
use log::{debug, info, warn};
use serde::Serialize;
use structopt::StructOpt;

use auton_lib::{
    auto::{routines, AutoParams, Auton},
    sim_chassis::{self, ExitReason, SimChassis},
};
use util::{
    host,
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Command line options.
#[derive(Debug, StructOpt)]
#[structopt(name = "auton_exec", about = "Run an autonomous routine on the simulated chassis")]
struct Opt {
    /// Name of the routine to run, the first registered routine is run if not given
    #[structopt(short, long)]
    routine: Option<String>,

    /// List the registered routines and exit
    #[structopt(short, long)]
    list: bool,

    /// Minimum level of the log output (info, debug or trace)
    #[structopt(long, default_value = "debug")]
    log_level: LevelFilter,

    /// Number of upcoming drives the simulated chassis will be blocked for
    #[structopt(long, default_value = "0")]
    obstruct: u32,
}

/// Summary of a run, saved into the session directory.
#[derive(Debug, Serialize)]
struct RunReport {
    routine: String,

    /// UTC time at which the routine was started, RFC 3339.
    started_at: String,

    /// Final pose of the robot, `None` if the pose sensor was unavailable.
    final_pose: Option<Pose>,

    interfered: bool,

    last_exit: Option<ExitReason>,

    /// Units: seconds
    duration_s: f64,

    /// Units: seconds
    sim_time_s: f64,
}

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- ROUTINE LISTING ----

    let mut registry = routines::registry();

    if opt.list {
        for (i, name) in registry.names().iter().enumerate() {
            println!("{:>2}: {}", i, name);
        }
        return Ok(());
    }

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session =
        Session::new("auton_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger, the control loop is very chatty below info
    logger_init(
        opt.log_level,
        &[("auton_lib::sim_chassis", LevelFilter::Info)],
        &session,
    )
    .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Autonomous Executable\n");
    info!(
        "Running on: {:#?}",
        host::get_uname().wrap_err("Failed to get host information")?
    );
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI options: {:?}", opt);

    // ---- LOAD PARAMETERS ----

    let auto_params: AutoParams =
        util::params::load("auto.toml").wrap_err("Could not load autonomy params")?;
    let tuning: ChassisTuning =
        util::params::load("chassis_tuning.toml").wrap_err("Could not load chassis tuning")?;
    let sim_params: sim_chassis::Params =
        util::params::load("sim_chassis.toml").wrap_err("Could not load sim chassis params")?;

    info!("Exec parameters loaded");

    // ---- SELECT ROUTINE ----

    if let Some(ref name) = opt.routine {
        registry
            .select_by_name(name)
            .wrap_err("Could not select the requested routine")?;
    }

    let routine_name = match registry.selected() {
        Some(entry) => entry.name().to_string(),
        None => String::new(),
    };
    info!("Selected routine \"{}\"", routine_name);

    // ---- INITIALISE CHASSIS ----

    let chassis = SimChassis::new(sim_params).wrap_err("Failed to initialise the SimChassis")?;
    tuning.apply(&chassis);
    info!("SimChassis initialised");

    if opt.obstruct > 0 {
        info!("Obstructing the next {} drives", opt.obstruct);
        chassis.obstruct(opt.obstruct);
    }

    // ---- RUN ROUTINE ----

    let auton = Auton::new(&chassis, &auto_params);

    info!("Starting autonomous period\n");
    let started_at = Utc::now().to_rfc3339();
    let start = Instant::now();

    auton.begin();
    registry
        .invoke_selected(&auton)
        .wrap_err("Autonomous routine failed")?;

    let duration_s = start.elapsed().as_secs_f64();

    info!("Routine complete in {:.02} s", duration_s);
    if chassis.sim_time_s() > auto_params.auton_period_s {
        warn!(
            "Routine took {:.02} s of robot time, longer than the {:.02} s autonomous period",
            chassis.sim_time_s(),
            auto_params.auton_period_s
        );
    }

    // ---- REPORT ----

    let final_pose = match chassis.pose() {
        Ok(p) => {
            info!("Final pose: {}", p);
            Some(p)
        }
        Err(e) => {
            warn!("Final pose unavailable: {}", e);
            None
        }
    };

    let report = RunReport {
        routine: routine_name,
        started_at,
        final_pose,
        interfered: chassis.is_interfered(),
        last_exit: chassis.last_exit(),
        duration_s,
        sim_time_s: chassis.sim_time_s(),
    };

    session
        .save("run_report.json", &report)
        .wrap_err("Failed to save the run report")?;

    info!("End of execution");

    Ok(())
}
