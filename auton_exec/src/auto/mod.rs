//! # Autonomy Module
//!
//! This module sequences the closed-loop motions of the robot during the autonomous period. A
//! routine is a plain function which receives an [`Auton`] context and issues motion primitives
//! through it, deciding after each one how long to wait before the next (see [`ChainMode`]).
//!
//! The context never stores motion targets. Each primitive is built, handed to the motion
//! controller and forgotten, the controller being the only owner of the target in flight.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Wait/chain coordinator - decides when the next motion may start
pub mod chain;

/// Motion primitive issuer - builds motion targets and submits them
pub mod issuer;

/// Coordinate navigator - drives to a point in the field frame
pub mod nav;

/// Autonomy parameters
pub mod params;

/// Interference recovery - backs the robot out of an obstruction
pub mod recovery;

/// Routine registry - named routines available to the selector
pub mod registry;

/// The routines shipped with the robot
pub mod routines;

#[cfg(test)]
pub(crate) mod mock;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{thread, time::Duration};

use chassis_if::{MotionController, PoseError};
use log::debug;

pub use chain::ChainMode;
pub use nav::NavLeg;
pub use params::{AutoParams, RecoveryParams};
pub use recovery::{RecoveryAttempt, RecoveryOutcome};
pub use registry::{Entrypoint, RegistryError, RoutineEntry, RoutineRegistry};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Context handed to every routine.
///
/// Routines run synchronously on the calling thread, the motion controller runs its own loop and
/// is only ever borrowed here.
pub struct Auton<'a> {
    chassis: &'a dyn MotionController,
    params: &'a AutoParams,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors which abort a routine.
#[derive(Debug, thiserror::Error)]
pub enum AutonError {
    #[error("Cannot navigate without a pose estimate: {0}")]
    PoseUnavailable(#[from] PoseError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<'a> Auton<'a> {
    pub fn new(chassis: &'a dyn MotionController, params: &'a AutoParams) -> Self {
        Self { chassis, params }
    }

    /// Bring the controller into a known state at the start of the autonomous period.
    ///
    /// Drops any leftover target, then zeroes the heading, drive and odometry references so that
    /// the routine starts from the field origin.
    pub fn begin(&self) {
        debug!("Resetting controller targets and references");

        self.chassis.reset_targets();
        self.chassis.reset_heading_reference();
        self.chassis.reset_drive_reference();
        self.chassis.reset_pose();
    }

    /// The controller this context issues motions to.
    pub fn chassis(&self) -> &'a dyn MotionController {
        self.chassis
    }

    pub fn params(&self) -> &'a AutoParams {
        self.params
    }

    /// Block the routine for a fixed time, the motion in flight carries on.
    pub fn pause(&self, ms: u64) {
        if ms > 0 {
            thread::sleep(Duration::from_millis(ms));
        }
    }
}
