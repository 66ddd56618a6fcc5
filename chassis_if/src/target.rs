//! # Motion targets
//!
//! A [`MotionTarget`] is created for every primitive issued by a routine and consumed straight
//! away by the motion controller. Targets are never stored by the sequencer.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::tuning::MotionKind;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Maximum motor power, unitless.
///
/// The controller is responsible for rejecting or clamping speeds outside of `0..=127`, the
/// sequencer passes them through untouched.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Speed(pub i32);

/// Target for a composite odometry motion (drive to a point, optionally finishing on a heading).
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct OdomTarget {
    /// Target X position in the field frame.
    ///
    /// Units: inches
    pub x_in: f64,

    /// Target Y position in the field frame.
    ///
    /// Units: inches
    pub y_in: f64,

    /// Heading to finish on, or `None` to leave the heading unconstrained.
    ///
    /// Units: degrees
    pub heading_deg: Option<f64>,

    /// Whether the robot drives towards the point facing forwards or backwards.
    pub direction: DriveDirection,

    /// Maximum speed of the translation.
    pub speed: Speed,

    /// How heading errors are resolved when turning.
    pub turn_behaviour: AngleBehaviour,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A motion for the controller to execute.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub enum MotionTarget {
    /// Drive in a straight line by a signed distance, holding the current heading.
    Drive {
        /// Units: inches
        dist_in: f64,
        speed: Speed,
    },

    /// Turn on the spot to an absolute field heading.
    TurnTo {
        /// Units: degrees
        angle_deg: f64,
        speed: Speed,
    },

    /// Turn on the spot by a signed angle relative to the current heading.
    TurnBy {
        /// Units: degrees
        angle_deg: f64,
        speed: Speed,
    },

    /// Turn to an absolute heading by driving one side of the drivetrain.
    Swing {
        /// The side which is driven.
        side: SwingSide,

        /// Units: degrees
        angle_deg: f64,

        speed: Speed,

        /// Power given to the other side, zero pivots about the stationary side.
        opposite_speed: Speed,
    },

    /// Drive to a point in the field frame.
    Odom(OdomTarget),
}

/// Side of the drivetrain driven during a swing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwingSide {
    Left,
    Right,
}

/// Direction the robot faces while driving to a point.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriveDirection {
    Forward,
    Reverse,
}

/// How the controller picks a direction of rotation for an absolute heading target.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AngleBehaviour {
    /// Rotate by the smallest angle. A target exactly 180 degrees away is a controller-defined
    /// tie.
    ShortestPath,

    /// Rotate by the largest angle.
    LongestPath,

    /// Always rotate counter-clockwise.
    CounterClockwise,

    /// Always rotate clockwise.
    Clockwise,

    /// Use the raw difference between the target and the unwrapped heading.
    Raw,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Speed {
    /// Highest power accepted by the motors.
    pub const MAX: Speed = Speed(127);

    /// Whether the speed will move the robot at all.
    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Power as a float, clamped into `0..=127`.
    pub fn power(self) -> f64 {
        self.0.max(0).min(Self::MAX.0) as f64
    }
}

impl MotionTarget {
    /// The speed cap requested by this target.
    pub fn speed(&self) -> Speed {
        match self {
            MotionTarget::Drive { speed, .. }
            | MotionTarget::TurnTo { speed, .. }
            | MotionTarget::TurnBy { speed, .. }
            | MotionTarget::Swing { speed, .. } => *speed,
            MotionTarget::Odom(odom) => odom.speed,
        }
    }

    /// The tuning set used to control this target.
    ///
    /// Odometry motions are tuned as drives, their final heading turn uses the turn set.
    pub fn kind(&self) -> MotionKind {
        match self {
            MotionTarget::Drive { .. } | MotionTarget::Odom(_) => MotionKind::Drive,
            MotionTarget::TurnTo { .. } | MotionTarget::TurnBy { .. } => MotionKind::Turn,
            MotionTarget::Swing { .. } => MotionKind::Swing,
        }
    }

    /// Whether the target moves the robot across the field, so can be obstructed.
    pub fn is_translation(&self) -> bool {
        self.kind() == MotionKind::Drive
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_speed_power() {
        assert_eq!(Speed(110).power(), 110.0);
        assert_eq!(Speed(200).power(), 127.0);
        assert_eq!(Speed(-5).power(), 0.0);
        assert!(!Speed(0).is_positive());
    }

    #[test]
    fn test_target_kind() {
        let odom = MotionTarget::Odom(OdomTarget {
            x_in: 1.0,
            y_in: 2.0,
            heading_deg: None,
            direction: DriveDirection::Forward,
            speed: Speed(90),
            turn_behaviour: AngleBehaviour::ShortestPath,
        });

        assert_eq!(odom.kind(), MotionKind::Drive);
        assert_eq!(odom.speed(), Speed(90));
        assert!(odom.is_translation());

        let swing = MotionTarget::Swing {
            side: SwingSide::Left,
            angle_deg: 45.0,
            speed: Speed(110),
            opposite_speed: Speed(45),
        };
        assert_eq!(swing.kind(), MotionKind::Swing);
        assert!(!swing.is_translation());
    }
}
