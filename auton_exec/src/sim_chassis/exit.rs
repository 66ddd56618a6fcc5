//! # Exit condition timers

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chassis_if::ExitConditions;
use serde::Serialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Time spent so far in each exit condition.
#[derive(Debug, Default, Clone)]
pub struct ExitTimers {
    small_ms: u64,
    big_ms: u64,
    velocity_ms: u64,
    stall_ms: u64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Why a motion ended.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum ExitReason {
    /// The target was already satisfied when it was submitted.
    AlreadySettled,

    /// Error stayed inside the small error for the small exit time.
    SmallError,

    /// Error stayed inside the big error for the big exit time.
    BigError,

    /// Robot did not move for the velocity exit time.
    Velocity,

    /// Motors pushed without moving for the stall exit time.
    Stall,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ExitReason {
    /// Whether the motion was abandoned because something was in the way.
    pub fn is_interference(self) -> bool {
        matches!(self, ExitReason::Velocity | ExitReason::Stall)
    }
}

impl ExitTimers {
    /// Advance the timers by one step and check whether the motion should end.
    ///
    /// `stationary` is whether the drivetrain is not moving, `pushing` whether the motors are
    /// being driven hard at the same time.
    pub fn update(
        &mut self,
        cond: &ExitConditions,
        error: f64,
        stationary: bool,
        pushing: bool,
        step_ms: u64,
    ) -> Option<ExitReason> {
        let error = error.abs();

        Self::accumulate(&mut self.small_ms, error < cond.small_error, step_ms);
        Self::accumulate(&mut self.big_ms, error < cond.big_error, step_ms);
        Self::accumulate(&mut self.velocity_ms, stationary, step_ms);
        Self::accumulate(&mut self.stall_ms, stationary && pushing, step_ms);

        if Self::expired(self.small_ms, cond.small_exit_time_ms) {
            Some(ExitReason::SmallError)
        } else if Self::expired(self.big_ms, cond.big_exit_time_ms) {
            Some(ExitReason::BigError)
        } else if Self::expired(self.velocity_ms, cond.velocity_exit_time_ms) {
            Some(ExitReason::Velocity)
        } else if Self::expired(self.stall_ms, cond.stall_exit_time_ms) {
            Some(ExitReason::Stall)
        } else {
            None
        }
    }

    fn accumulate(timer: &mut u64, active: bool, step_ms: u64) {
        *timer = if active { *timer + step_ms } else { 0 };
    }

    /// A limit of zero disables the condition.
    fn expired(timer_ms: u64, limit_ms: u64) -> bool {
        limit_ms > 0 && timer_ms >= limit_ms
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_small_exit() {
        let cond = ExitConditions::new(90, 1.0, 250, 3.0, 500, 500);
        let mut timers = ExitTimers::default();

        for _ in 0..8 {
            assert_eq!(timers.update(&cond, 0.5, false, false, 10), None);
        }
        assert_eq!(
            timers.update(&cond, 0.5, false, false, 10),
            Some(ExitReason::SmallError)
        );
    }

    #[test]
    fn test_timer_resets_outside_band() {
        let cond = ExitConditions::new(90, 1.0, 0, 3.0, 0, 0);
        let mut timers = ExitTimers::default();

        for _ in 0..8 {
            timers.update(&cond, 0.5, false, false, 10);
        }
        assert_eq!(timers.update(&cond, 2.0, false, false, 10), None);
        assert_eq!(timers.update(&cond, 0.5, false, false, 10), None);
    }

    #[test]
    fn test_blocked_is_interference() {
        let cond = ExitConditions::new(90, 1.0, 250, 3.0, 500, 0);
        let mut timers = ExitTimers::default();

        let mut reason = None;
        for _ in 0..50 {
            reason = timers.update(&cond, 20.0, true, true, 10);
        }

        assert_eq!(reason, Some(ExitReason::Velocity));
        assert!(ExitReason::Velocity.is_interference());
        assert!(!ExitReason::BigError.is_interference());
    }
}
