//! # Simulated chassis parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters of the simulated drivetrain and of its control loop.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {
    /// Units: inches
    pub wheel_diameter_in: f64,

    /// Wheel speed at full power.
    ///
    /// Units: revolutions/minute
    pub wheel_rpm: f64,

    /// Distance between the left and right wheels.
    ///
    /// Units: inches
    pub track_width_in: f64,

    /// Time constant of the first order lag between commanded and achieved wheel speed.
    ///
    /// Units: seconds
    pub motor_time_constant_s: f64,

    /// Simulated time advanced by each step of the control loop.
    ///
    /// Units: milliseconds
    pub sim_period_ms: u64,

    /// Wall-clock time between steps of the control loop. Zero runs as fast as possible.
    ///
    /// Units: microseconds
    pub wall_period_us: u64,

    /// Only advance the simulation while the sequence is blocked in a wait.
    ///
    /// Makes runs deterministic, at the cost of the robot freezing between waits.
    pub lockstep: bool,

    /// Below this wheel speed the drivetrain counts as stationary for the exit conditions.
    ///
    /// Units: inches/second
    pub stationary_speed_ips: f64,

    /// Above this power a stationary drivetrain counts as stalled.
    pub stall_power: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Params {
    /// Wheel surface speed at full power.
    ///
    /// Units: inches/second
    pub fn max_wheel_speed_ips(&self) -> f64 {
        std::f64::consts::PI * self.wheel_diameter_in * self.wheel_rpm / 60.0
    }

    pub fn sim_period_s(&self) -> f64 {
        util::time::millis_to_seconds(self.sim_period_ms)
    }
}

impl Default for Params {
    fn default() -> Self {
        Self {
            wheel_diameter_in: 3.125,
            wheel_rpm: 343.0,
            track_width_in: 11.5,
            motor_time_constant_s: 0.05,
            sim_period_ms: 10,
            wall_period_us: 10_000,
            lockstep: false,
            stationary_speed_ips: 0.05,
            stall_power: 10.0,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_shipped_params() {
        let params: Params =
            util::params::from_str(include_str!("../../../params/sim_chassis.toml")).unwrap();
        let default = Params::default();

        assert_eq!(params.wheel_diameter_in, default.wheel_diameter_in);
        assert_eq!(params.track_width_in, default.track_width_in);
        assert_eq!(params.sim_period_ms, default.sim_period_ms);
        assert!(!params.lockstep);

        // 3.125 in wheels at 343 rpm
        assert!((params.max_wheel_speed_ips() - 56.12).abs() < 0.01);
        assert_eq!(params.sim_period_s(), 0.01);
    }
}
