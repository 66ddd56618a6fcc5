//! # Motion controller contract
//!
//! The motion controller runs its feedback loop on its own execution context. All methods take
//! `&self`, implementations synchronise internally. Waits block the calling sequence and are
//! bounded by the controller's own exit-condition timers, callers apply no timeout of their own.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use crate::{
    pose::{Pose, PoseError},
    target::{AngleBehaviour, MotionTarget, Speed},
    tuning::{ExitConditions, MotionKind, PidConstants, PidKind, SlewLimits},
};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A closed-loop motion controller for a differential chassis.
pub trait MotionController {
    // ---- MOTION ----

    /// Start executing a target, superseding any target still in flight. Returns immediately.
    ///
    /// If `slew` is set the speed ramps up over the configured slew distance.
    fn submit(&self, target: MotionTarget, slew: bool);

    /// Block until the current target is settled or abandoned by the exit conditions.
    fn wait_full_settle(&self);

    /// Block until the current target is close enough to blend into the next motion.
    fn wait_quick_chain(&self);

    /// Block until the progress of the current target from its start crosses `threshold`
    /// (inches for drives, degrees for turns and swings). The motion stays in flight.
    fn wait_until(&self, threshold: f64);

    /// Change the speed cap of the target in flight.
    fn set_speed_cap(&self, speed: Speed);

    // ---- STATE ----

    /// Snapshot of the odometry pose.
    fn pose(&self) -> Result<Pose, PoseError>;

    /// Whether the last motion was abandoned because the robot was obstructed. Only valid once a
    /// wait has returned.
    fn is_interfered(&self) -> bool;

    /// Zero the odometry position and heading.
    fn reset_pose(&self);

    /// Zero the drive encoders used as the reference for distance targets.
    fn reset_drive_reference(&self);

    /// Zero the heading sensor.
    fn reset_heading_reference(&self);

    /// Drop any target in flight.
    fn reset_targets(&self);

    // ---- CONFIGURATION ----

    fn set_pid_constants(&self, kind: PidKind, constants: PidConstants);

    fn set_exit_conditions(&self, kind: MotionKind, conditions: ExitConditions);

    fn set_chain_threshold(&self, kind: MotionKind, threshold: f64);

    fn set_slew(&self, kind: MotionKind, slew: SlewLimits);

    fn set_angle_behaviour(&self, behaviour: AngleBehaviour);
}
