//! # Interference recovery
//!
//! When a drive is abandoned because the robot was obstructed, the routine may try to back out of
//! the obstruction. Each attempt is a fast reverse drive followed by a full settle. If the robot is
//! still obstructed the drive reference is zeroed, a slow reverse drive is issued and the robot is
//! given time to free itself before the next attempt.
//!
//! Running out of attempts is not an error. The routine receives a [`RecoveryOutcome`] and decides
//! whether to carry on.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chassis_if::Speed;
use log::{info, warn};
use serde::Serialize;

use super::{Auton, ChainMode, RecoveryParams};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A single attempt to back out of an obstruction.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct RecoveryAttempt {
    /// Zero based index of the attempt.
    pub index: u32,

    /// Units: inches
    pub backoff_dist_in: f64,

    pub backoff_speed: Speed,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Result of a recovery.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum RecoveryOutcome {
    /// The robot backed out cleanly on attempt number `attempts`.
    Recovered { attempts: u32 },

    /// Every attempt ended obstructed, the interference flag is still set.
    Exhausted { attempts: u32 },
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl RecoveryOutcome {
    pub fn is_recovered(&self) -> bool {
        matches!(self, RecoveryOutcome::Recovered { .. })
    }

    /// Number of fast reverse drives which were issued.
    pub fn attempts(&self) -> u32 {
        match self {
            RecoveryOutcome::Recovered { attempts } | RecoveryOutcome::Exhausted { attempts } => {
                *attempts
            }
        }
    }
}

impl<'a> Auton<'a> {
    /// Back out of an obstruction using the configured recovery parameters.
    ///
    /// Call only after a drive has fully settled with the interference flag set.
    pub fn recover_from_interference(&self) -> RecoveryOutcome {
        self.recover_with(&self.params.recovery)
    }

    /// Back out of an obstruction, executing at most `params.max_attempts - 1` attempts.
    pub fn recover_with(&self, params: &RecoveryParams) -> RecoveryOutcome {
        let num_attempts = params.max_attempts.saturating_sub(1);

        warn!(
            "Interference detected, attempting recovery ({} attempts)",
            num_attempts
        );

        for index in 0..num_attempts {
            let attempt = RecoveryAttempt {
                index,
                backoff_dist_in: -params.backoff_dist_in.abs(),
                backoff_speed: params.backoff_speed,
            };

            if self.try_backoff(&attempt) {
                info!("Recovered from interference on attempt {}", index + 1);
                return RecoveryOutcome::Recovered {
                    attempts: index + 1,
                };
            }

            warn!("Still obstructed after attempt {}", index + 1);

            self.chassis.reset_drive_reference();
            self.drive(
                -params.gentle_backoff_dist_in.abs(),
                params.gentle_backoff_speed,
                false,
            );
            self.pause(params.settle_pause_ms);
        }

        warn!(
            "Recovery exhausted after {} attempts, robot is still obstructed",
            num_attempts
        );

        RecoveryOutcome::Exhausted {
            attempts: num_attempts,
        }
    }

    /// Execute one fast reverse drive, returning `true` if the robot moved freely.
    fn try_backoff(&self, attempt: &RecoveryAttempt) -> bool {
        self.drive(attempt.backoff_dist_in, attempt.backoff_speed, false);
        self.wait(ChainMode::FullSettle);

        !self.chassis.is_interfered()
    }
}
