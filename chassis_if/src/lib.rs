//! # Chassis interface crate.
//!
//! Provides the contract between the autonomous sequencer and the motion controller which runs
//! the closed-loop drive, turn and swing control of the chassis. The controller itself (PID loops,
//! odometry, motor I/O) lives behind the [`MotionController`] trait.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// The motion controller trait
pub mod ctrl;

/// Robot pose in the field frame
pub mod pose;

/// Motion targets accepted by the controller
pub mod target;

/// One-time controller configuration
pub mod tuning;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use ctrl::MotionController;
pub use pose::{Pose, PoseError};
pub use target::{AngleBehaviour, DriveDirection, MotionTarget, OdomTarget, Speed, SwingSide};
pub use tuning::{ChassisTuning, ExitConditions, MotionKind, PidConstants, PidKind, SlewLimits};
