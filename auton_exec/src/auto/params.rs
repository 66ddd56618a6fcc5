//! # Autonomy Parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chassis_if::Speed;
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters used by the routines and the navigator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoParams {
    /// Speed of straight drives and of navigation legs without an explicit speed.
    pub drive_speed: Speed,

    /// Speed of turns on the spot.
    pub turn_speed: Speed,

    /// Speed of the driven side during a swing.
    pub swing_speed: Speed,

    /// Speed of the other side during a swing.
    pub swing_opposite_speed: Speed,

    /// Length of the autonomous period. Routines overrunning it are reported but not cut short.
    ///
    /// Units: seconds
    pub auton_period_s: f64,

    /// Parameters of the interference recovery.
    pub recovery: RecoveryParams,
}

/// Parameters of the interference recovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryParams {
    /// Maximum number of attempts, of which `max_attempts - 1` are executed.
    pub max_attempts: u32,

    /// Distance of the reverse drive of each attempt.
    ///
    /// Units: inches
    pub backoff_dist_in: f64,

    /// Speed of the reverse drive of each attempt.
    pub backoff_speed: Speed,

    /// Distance of the slow reverse drive issued after a failed attempt.
    ///
    /// Units: inches
    pub gentle_backoff_dist_in: f64,

    /// Speed of the slow reverse drive.
    pub gentle_backoff_speed: Speed,

    /// Time given to the slow reverse drive before the next attempt.
    ///
    /// Units: milliseconds
    pub settle_pause_ms: u64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for AutoParams {
    fn default() -> Self {
        Self {
            drive_speed: Speed(110),
            turn_speed: Speed(90),
            swing_speed: Speed(110),
            swing_opposite_speed: Speed(45),
            auton_period_s: 15.0,
            recovery: RecoveryParams::default(),
        }
    }
}

impl Default for RecoveryParams {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_dist_in: 12.0,
            backoff_speed: Speed::MAX,
            gentle_backoff_dist_in: 2.0,
            gentle_backoff_speed: Speed(20),
            settle_pause_ms: 1000,
        }
    }
}
