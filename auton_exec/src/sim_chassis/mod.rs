//! # Simulated Chassis
//!
//! The SimChassis is a motion controller for running routines on a development machine rather
//! than on the robot. It drives a kinematic model of a differential drivetrain from a background
//! thread, using the same PID loops, exit conditions, chaining and slew as the robot's own
//! controller.
//!
//! Callers and the background thread share the state through a mutex, and the thread notifies a
//! condition variable after every step. Waits block on that condition variable, re-checking their
//! condition on every notification, so they are only ever bounded by the exit conditions of the
//! motion.
//!
//! For tests the chassis can run in lockstep, where the simulation only advances while a caller
//! is blocked in a wait. It can also be told to obstruct upcoming drives or to lose its pose
//! sensor.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod exit;
mod model;
mod motion;
mod params;
mod pid;
mod state;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Condvar, Mutex, MutexGuard, PoisonError,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use chassis_if::{
    AngleBehaviour, ExitConditions, MotionController, MotionKind, MotionTarget, PidConstants,
    PidKind, Pose, PoseError, SlewLimits, Speed,
};
use log::{debug, info, warn};

use state::{SimState, WaitCondition};

pub use exit::ExitReason;
pub use params::Params;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Longest a waiting caller sleeps before re-checking its condition.
const WAIT_SLICE: Duration = Duration::from_millis(50);

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct SimChassis {
    shared: Arc<Shared>,
    bg_jh: Option<JoinHandle<()>>,
}

struct Shared {
    state: Mutex<SimState>,
    step_cv: Condvar,
    run: AtomicBool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SimChassisError {
    #[error("Invalid simulated chassis parameters: {0}")]
    InvalidParams(String),

    #[error("Could not start the control loop thread: {0}")]
    ThreadSpawnError(std::io::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimChassis {
    /// Create a new chassis at the field origin and start its control loop.
    pub fn new(params: Params) -> Result<Self, SimChassisError> {
        if params.sim_period_ms == 0 {
            return Err(SimChassisError::InvalidParams(
                "sim_period_ms must be greater than zero".into(),
            ));
        }
        if params.wheel_diameter_in <= 0.0 || params.track_width_in <= 0.0 {
            return Err(SimChassisError::InvalidParams(
                "wheel_diameter_in and track_width_in must be positive".into(),
            ));
        }

        info!(
            "Starting simulated chassis ({} ms step, {})",
            params.sim_period_ms,
            if params.lockstep {
                "lockstep".to_string()
            } else {
                format!("{} us wall period", params.wall_period_us)
            }
        );

        let shared = Arc::new(Shared {
            state: Mutex::new(SimState::new(params)),
            step_cv: Condvar::new(),
            run: AtomicBool::new(true),
        });
        let shared_bg = shared.clone();

        let bg_jh = thread::Builder::new()
            .name("sim_chassis::ctrl".into())
            .spawn(move || bg_thread(shared_bg))
            .map_err(SimChassisError::ThreadSpawnError)?;

        Ok(Self {
            shared,
            bg_jh: Some(bg_jh),
        })
    }

    /// Obstruct the next `count` translations. Obstructed motions cannot move the robot and end
    /// with the interference flag set.
    pub fn obstruct(&self, count: u32) {
        self.lock().obstructions += count;
    }

    /// Make every subsequent pose read fail.
    pub fn fail_pose_sensor(&self) {
        warn!("Simulated pose sensor failure");
        self.lock().pose_sensor_ok = false;
    }

    /// Whether no motion is in flight.
    pub fn is_settled(&self) -> bool {
        self.lock().motion.is_none()
    }

    /// Why the last motion ended, `None` while a motion is in flight.
    pub fn last_exit(&self) -> Option<ExitReason> {
        self.lock().last_exit
    }

    /// Simulated time since the chassis was created.
    ///
    /// Units: seconds
    pub fn sim_time_s(&self) -> f64 {
        self.lock().sim_time_s
    }

    /// Current tuning set.
    pub fn tuning(&self) -> chassis_if::ChassisTuning {
        self.lock().tuning.clone()
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until a condition produced by `f` is met.
    fn block_on<F>(&self, f: F)
    where
        F: FnOnce(&mut SimState) -> WaitCondition,
    {
        let mut state = self.lock();
        let cond = f(&mut state);

        state.wait = Some(cond);
        self.shared.step_cv.notify_all();

        while !state.is_met(cond) && self.shared.run.load(Ordering::Relaxed) {
            state = self
                .shared
                .step_cv
                .wait_timeout(state, WAIT_SLICE)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }

        state.wait = None;
    }
}

impl MotionController for SimChassis {
    fn submit(&self, target: MotionTarget, slew: bool) {
        self.lock().submit(target, slew);
    }

    fn wait_full_settle(&self) {
        self.block_on(|_| WaitCondition::Settled);
    }

    fn wait_quick_chain(&self) {
        self.block_on(|s| s.extend_for_chain());
    }

    fn wait_until(&self, threshold: f64) {
        self.block_on(|_| WaitCondition::Progress(threshold));
    }

    fn set_speed_cap(&self, speed: Speed) {
        self.lock().set_speed_cap(speed);
    }

    fn pose(&self) -> Result<Pose, PoseError> {
        self.lock().pose()
    }

    fn is_interfered(&self) -> bool {
        self.lock().interfered
    }

    fn reset_pose(&self) {
        self.lock().reset_pose();
    }

    fn reset_drive_reference(&self) {
        self.lock().reset_drive_reference();
    }

    fn reset_heading_reference(&self) {
        self.lock().reset_heading_reference();
    }

    fn reset_targets(&self) {
        self.lock().reset_targets();
    }

    fn set_pid_constants(&self, kind: PidKind, constants: PidConstants) {
        *self.lock().tuning.pid_mut(kind) = constants;
    }

    fn set_exit_conditions(&self, kind: MotionKind, conditions: ExitConditions) {
        if conditions.small_error < 0.0 || conditions.big_error < 0.0 {
            warn!(
                "Ignoring {:?} exit conditions with a negative error: {:?}",
                kind, conditions
            );
            return;
        }
        *self.lock().tuning.exit_mut(kind) = conditions;
    }

    fn set_chain_threshold(&self, kind: MotionKind, threshold: f64) {
        if threshold < 0.0 {
            warn!("Ignoring negative {:?} chain threshold {}", kind, threshold);
            return;
        }
        *self.lock().tuning.chain_mut(kind) = threshold;
    }

    fn set_slew(&self, kind: MotionKind, slew: SlewLimits) {
        if slew.distance < 0.0 {
            warn!("Ignoring {:?} slew with a negative distance", kind);
            return;
        }
        *self.lock().tuning.slew_mut(kind) = slew;
    }

    fn set_angle_behaviour(&self, behaviour: AngleBehaviour) {
        self.lock().tuning.angle_behaviour = behaviour;
    }
}

impl Drop for SimChassis {
    fn drop(&mut self) {
        self.shared.run.store(false, Ordering::Relaxed);
        self.shared.step_cv.notify_all();

        if let Some(jh) = self.bg_jh.take() {
            if jh.join().is_err() {
                warn!("Simulated chassis control loop panicked");
            }
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Background thread, steps the control loop until the chassis is dropped.
fn bg_thread(shared: Arc<Shared>) {
    debug!("Control loop started");

    while shared.run.load(Ordering::Relaxed) {
        let mut state = shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        // In lockstep only step while someone is waiting on the simulation
        if state.params.lockstep && !state.wait_pending() {
            let _ = shared
                .step_cv
                .wait_timeout(state, WAIT_SLICE)
                .unwrap_or_else(PoisonError::into_inner);
            continue;
        }

        state.step();
        let wall_period = Duration::from_micros(state.params.wall_period_us);
        drop(state);

        shared.step_cv.notify_all();

        if wall_period > Duration::from_micros(0) {
            thread::sleep(wall_period);
        } else {
            thread::yield_now();
        }
    }

    debug!("Control loop stopped");
}
