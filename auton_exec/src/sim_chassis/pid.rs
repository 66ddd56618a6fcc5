//! # Simulated chassis PID controller

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chassis_if::PidConstants;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A PID controller stepped at a fixed rate.
///
/// The integral is the sum of errors and the derivative the change in error since the previous
/// step, so the gains are per control cycle rather than per second.
#[derive(Debug, Clone)]
pub struct Pid {
    gains: PidConstants,

    /// Previous error, `None` before the first step so the derivative doesn't kick.
    prev_error: Option<f64>,

    integral: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Pid {
    pub fn new(gains: PidConstants) -> Self {
        Self {
            gains,
            prev_error: None,
            integral: 0.0,
        }
    }

    /// Get the output of the controller for the given error.
    pub fn get(&mut self, error: f64) -> f64 {
        let prev = self.prev_error.unwrap_or(error);

        // The integral only winds up close to the target, and is dropped once the target has
        // been crossed
        if self.gains.k_i != 0.0 {
            if self.gains.start_i <= 0.0 || error.abs() < self.gains.start_i {
                self.integral += error;
            }
            if error.signum() != prev.signum() && prev != 0.0 {
                self.integral = 0.0;
            }
        }

        let deriv = error - prev;
        self.prev_error = Some(error);

        self.gains.k_p * error + self.gains.k_i * self.integral + self.gains.k_d * deriv
    }
}
