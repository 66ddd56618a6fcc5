//! # Differential drivetrain model
//!
//! Each side of the drivetrain tracks its commanded speed through a first order lag. The pose is
//! integrated from the side speeds with the midpoint heading of the step. Heading is kept
//! unwrapped here and only wrapped when reported.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chassis_if::Pose;
use nalgebra::Vector2;
use util::maths::{abs_cap, wrap_180};

use super::Params;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Maximum motor power.
pub const MAX_POWER: f64 = 127.0;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Drivetrain {
    /// Position in the field frame.
    ///
    /// Units: inches
    pub position_in: Vector2<f64>,

    /// Unwrapped heading, counter-clockwise from the field X axis.
    ///
    /// Units: degrees
    pub heading_deg: f64,

    /// Units: inches/second
    pub left_speed_ips: f64,

    /// Units: inches/second
    pub right_speed_ips: f64,

    /// Distance travelled by each side since the drive reference was last zeroed.
    ///
    /// Units: inches
    pub left_enc_in: f64,
    pub right_enc_in: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Drivetrain {
    /// A stationary drivetrain at the field origin.
    pub fn new() -> Self {
        Self {
            position_in: Vector2::zeros(),
            heading_deg: 0.0,
            left_speed_ips: 0.0,
            right_speed_ips: 0.0,
            left_enc_in: 0.0,
            right_enc_in: 0.0,
        }
    }

    /// Advance the model by one step with the given side powers.
    ///
    /// A blocked drivetrain cannot move whatever power is applied.
    pub fn step(&mut self, params: &Params, left_power: f64, right_power: f64, blocked: bool) {
        let dt = params.sim_period_s();
        let max_speed = params.max_wheel_speed_ips();
        let alpha = 1.0 - (-dt / params.motor_time_constant_s.max(1e-6)).exp();

        let left_cmd = abs_cap(left_power, MAX_POWER) / MAX_POWER * max_speed;
        let right_cmd = abs_cap(right_power, MAX_POWER) / MAX_POWER * max_speed;

        if blocked {
            self.stop();
        } else {
            self.left_speed_ips += (left_cmd - self.left_speed_ips) * alpha;
            self.right_speed_ips += (right_cmd - self.right_speed_ips) * alpha;
        }

        let speed = (self.left_speed_ips + self.right_speed_ips) / 2.0;
        let rate_rads = (self.right_speed_ips - self.left_speed_ips) / params.track_width_in;

        let mid_heading = self.heading_deg.to_radians() + 0.5 * rate_rads * dt;
        self.position_in += Vector2::new(mid_heading.cos(), mid_heading.sin()) * speed * dt;
        self.heading_deg += (rate_rads * dt).to_degrees();

        self.left_enc_in += self.left_speed_ips * dt;
        self.right_enc_in += self.right_speed_ips * dt;
    }

    /// Brake both sides to a stop.
    pub fn stop(&mut self) {
        self.left_speed_ips = 0.0;
        self.right_speed_ips = 0.0;
    }

    /// Mean distance travelled by the two sides.
    ///
    /// Units: inches
    pub fn travel_in(&self) -> f64 {
        (self.left_enc_in + self.right_enc_in) / 2.0
    }

    /// Mean absolute wheel speed.
    ///
    /// Units: inches/second
    pub fn wheel_speed_ips(&self) -> f64 {
        (self.left_speed_ips.abs() + self.right_speed_ips.abs()) / 2.0
    }

    /// Zero the side encoders, returning the travel they held.
    pub fn reset_encoders(&mut self) -> f64 {
        let travel = self.travel_in();
        self.left_enc_in = 0.0;
        self.right_enc_in = 0.0;
        travel
    }

    /// Unit vector along the current heading.
    pub fn heading_vector(&self) -> Vector2<f64> {
        let h = self.heading_deg.to_radians();
        Vector2::new(h.cos(), h.sin())
    }

    pub fn pose(&self) -> Pose {
        Pose::new(
            self.position_in.x,
            self.position_in.y,
            wrap_180(self.heading_deg),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_straight_line() {
        let params = Params::default();
        let mut dt = Drivetrain::new();

        for _ in 0..100 {
            dt.step(&params, 127.0, 127.0, false);
        }

        // One second at full power covers most of the top speed
        let max = params.max_wheel_speed_ips();
        assert!(dt.position_in.x > 0.9 * max && dt.position_in.x < max);
        assert!(dt.position_in.y.abs() < 1e-9);
        assert_eq!(dt.heading_deg, 0.0);
        assert!((dt.travel_in() - dt.position_in.x).abs() < 1e-9);
    }

    #[test]
    fn test_turn_on_spot() {
        let params = Params::default();
        let mut dt = Drivetrain::new();

        for _ in 0..50 {
            dt.step(&params, -60.0, 60.0, false);
        }

        assert!(dt.heading_deg > 0.0);
        assert!(dt.position_in.norm() < 1e-9);
        assert!(dt.travel_in().abs() < 1e-9);
    }

    #[test]
    fn test_blocked() {
        let params = Params::default();
        let mut dt = Drivetrain::new();

        for _ in 0..50 {
            dt.step(&params, 127.0, 127.0, true);
        }

        assert_eq!(dt.position_in, Vector2::zeros());
        assert_eq!(dt.wheel_speed_ips(), 0.0);
    }
}
