//! # Wait/chain coordinator
//!
//! After issuing a primitive the routine chooses how long to block before the next one. Waits are
//! bounded by the exit-condition timers inside the controller, no timeout is applied here.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::trace;
use serde::{Deserialize, Serialize};

use super::Auton;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Wait policy applied to the motion in flight.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChainMode {
    /// Wait for the target to be satisfied, or for the exit timers to abandon it.
    ///
    /// Required before a routine ends and before reading a pose to plan from.
    FullSettle,

    /// Return once the motion is close enough to blend into the next one. The motion keeps
    /// running and is superseded by the next primitive.
    QuickChain,

    /// Return once progress from the start of the motion crosses the signed threshold (inches
    /// for drives, degrees for turns and swings). The motion keeps running.
    DistanceTriggered(f64),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for ChainMode {
    fn default() -> Self {
        ChainMode::FullSettle
    }
}

impl<'a> Auton<'a> {
    /// Block according to `mode`.
    pub fn wait(&self, mode: ChainMode) {
        trace!("Waiting: {:?}", mode);

        match mode {
            ChainMode::FullSettle => self.chassis.wait_full_settle(),
            ChainMode::QuickChain => self.chassis.wait_quick_chain(),
            ChainMode::DistanceTriggered(threshold) => self.chassis.wait_until(threshold),
        }
    }

    /// Shorthand for `wait(ChainMode::FullSettle)`.
    pub fn settle(&self) {
        self.wait(ChainMode::FullSettle)
    }
}
