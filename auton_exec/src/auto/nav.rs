//! # Coordinate navigator
//!
//! Drives the robot to an absolute point in the field frame. The leg from the current pose to the
//! point is computed from a fresh pose snapshot and then handed to the controller as a single
//! odometry target, which the navigator waits on until it fully settles.
//!
//! A failed pose read aborts the navigation. The navigator never falls back to a stale or zeroed
//! pose.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chassis_if::{AngleBehaviour, DriveDirection, MotionTarget, OdomTarget, Pose, Speed};
use log::info;
use nalgebra::Vector2;
use serde::Serialize;
use util::maths::wrap_180;

use super::{Auton, AutonError, ChainMode};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A straight leg from a pose to a target point.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct NavLeg {
    /// Pose the leg was planned from.
    pub start: Pose,

    /// Units: inches
    pub dx_in: f64,

    /// Units: inches
    pub dy_in: f64,

    /// Straight line distance to the target, never negative.
    ///
    /// Units: inches
    pub distance_in: f64,

    /// Field heading pointing from the start to the target, in `(-180, 180]`.
    ///
    /// Units: degrees
    pub bearing_deg: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl NavLeg {
    /// Plan the leg from `start` to the point `(target_x_in, target_y_in)`.
    pub fn plan(start: Pose, target_x_in: f64, target_y_in: f64) -> Self {
        let delta = Vector2::new(target_x_in - start.x_in, target_y_in - start.y_in);

        Self {
            start,
            dx_in: delta.x,
            dy_in: delta.y,
            distance_in: delta.norm(),
            bearing_deg: wrap_180(delta.y.atan2(delta.x).to_degrees()),
        }
    }

    pub fn target_x_in(&self) -> f64 {
        self.start.x_in + self.dx_in
    }

    pub fn target_y_in(&self) -> f64 {
        self.start.y_in + self.dy_in
    }
}

impl<'a> Auton<'a> {
    /// Navigate to `(x_in, y_in)` at the default drive speed.
    pub fn navigate_to(&self, x_in: f64, y_in: f64) -> Result<NavLeg, AutonError> {
        self.navigate(x_in, y_in, None, None)
    }

    /// Navigate to `(x_in, y_in)` at `speed`.
    pub fn navigate_with_speed(
        &self,
        x_in: f64,
        y_in: f64,
        speed: Speed,
    ) -> Result<NavLeg, AutonError> {
        self.navigate(x_in, y_in, Some(speed), None)
    }

    /// Navigate to `(x_in, y_in)`, blocking until the motion fully settles.
    ///
    /// `speed` defaults to the drive speed. If `heading_deg` is given the robot finishes facing
    /// that heading, otherwise its final heading is left to the controller.
    ///
    /// Returns the leg which was planned from the pose at the time of the call.
    pub fn navigate(
        &self,
        x_in: f64,
        y_in: f64,
        speed: Option<Speed>,
        heading_deg: Option<f64>,
    ) -> Result<NavLeg, AutonError> {
        let start = self.chassis.pose()?;
        let leg = NavLeg::plan(start, x_in, y_in);

        info!(
            "Navigating from ({:.2}, {:.2}) to ({:.2}, {:.2}): {:.2} in at bearing {:.2} deg",
            start.x_in, start.y_in, x_in, y_in, leg.distance_in, leg.bearing_deg
        );

        let target = OdomTarget {
            x_in,
            y_in,
            heading_deg,
            direction: DriveDirection::Forward,
            speed: speed.unwrap_or(self.params.drive_speed),
            turn_behaviour: AngleBehaviour::ShortestPath,
        };

        self.issue(MotionTarget::Odom(target), true);
        self.wait(ChainMode::FullSettle);

        Ok(leg)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::auto::{
        mock::{Call, MockChassis},
        AutoParams,
    };
    use chassis_if::{MotionController, PoseError};

    #[test]
    fn test_plan() {
        let leg = NavLeg::plan(Pose::default(), 24.0, 36.0);
        assert!((leg.distance_in - 43.2666).abs() < 1e-3);
        assert!((leg.bearing_deg - 56.3099).abs() < 1e-3);

        // Directly behind gives +180, not -180
        let leg = NavLeg::plan(Pose::new(10.0, 0.0, 0.0), 0.0, 0.0);
        assert_eq!(leg.bearing_deg, 180.0);
        assert_eq!(leg.distance_in, 10.0);

        let leg = NavLeg::plan(Pose::new(0.0, 0.0, 45.0), 0.0, -5.0);
        assert!((leg.bearing_deg + 90.0).abs() < 1e-9);
        assert_eq!(leg.target_y_in(), -5.0);
    }

    #[test]
    fn test_navigate_submits_odom() {
        let chassis = MockChassis::new();
        let params = AutoParams::default();
        let auton = Auton::new(&chassis, &params);

        let leg = auton.navigate_to(24.0, 36.0).unwrap();
        assert!(leg.distance_in > 0.0);

        assert_eq!(
            chassis.calls(),
            vec![
                Call::Submit(
                    MotionTarget::Odom(OdomTarget {
                        x_in: 24.0,
                        y_in: 36.0,
                        heading_deg: None,
                        direction: DriveDirection::Forward,
                        speed: Speed(110),
                        turn_behaviour: AngleBehaviour::ShortestPath,
                    }),
                    true
                ),
                Call::WaitFullSettle,
            ]
        );

        auton.navigate(36.0, 48.0, Some(Speed(90)), Some(90.0)).unwrap();
        match chassis.submitted().last() {
            Some(MotionTarget::Odom(odom)) => {
                assert_eq!(odom.speed, Speed(90));
                assert_eq!(odom.heading_deg, Some(90.0));
            }
            other => panic!("Expected an odom target, got {:?}", other),
        }
    }

    #[test]
    fn test_navigate_to_current_position() {
        let chassis = MockChassis::new();
        chassis.set_pose(Ok(Pose::new(12.0, -6.0, 30.0)));
        let params = AutoParams::default();
        let auton = Auton::new(&chassis, &params);

        let leg = auton.navigate_with_speed(12.0, -6.0, Speed(70)).unwrap();

        // Zero distance leg is still submitted and the heading is kept
        assert_eq!(leg.distance_in, 0.0);
        assert_eq!(chassis.submitted().len(), 1);
        assert_eq!(chassis.pose().unwrap().heading_deg, 30.0);
    }

    #[test]
    fn test_return_bearing() {
        let chassis = MockChassis::new();
        let params = AutoParams::default();
        let auton = Auton::new(&chassis, &params);

        let out = auton.navigate_to(24.0, 36.0).unwrap();
        let back = auton.navigate_to(0.0, 0.0).unwrap();

        assert!((back.distance_in - out.distance_in).abs() < 1e-9);
        assert!((wrap_180(out.bearing_deg + 180.0) - back.bearing_deg).abs() < 1e-9);
    }

    #[test]
    fn test_pose_unavailable_aborts() {
        let chassis = MockChassis::new();
        chassis.set_pose(Err(PoseError::Unavailable));
        let params = AutoParams::default();
        let auton = Auton::new(&chassis, &params);

        match auton.navigate_to(24.0, 36.0) {
            Err(AutonError::PoseUnavailable(PoseError::Unavailable)) => (),
            other => panic!("Expected PoseUnavailable, got {:?}", other),
        }
        assert!(chassis.calls().is_empty());
    }
}
