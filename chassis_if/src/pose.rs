//! # Robot pose

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The estimated position and orientation of the robot in the fixed field frame.
///
/// Heading is measured from the field +X axis and increases counter-clockwise, matching the
/// convention of `atan2(dy, dx)`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Position along the field X axis.
    ///
    /// Units: inches
    pub x_in: f64,

    /// Position along the field Y axis.
    ///
    /// Units: inches
    pub y_in: f64,

    /// Heading of the robot.
    ///
    /// Units: degrees
    pub heading_deg: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors which prevent a pose from being read.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoseError {
    /// The odometry or heading sensor is not providing data.
    #[error("The pose estimate is unavailable, the tracking or heading sensor is not responding")]
    Unavailable,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Pose {
    pub fn new(x_in: f64, y_in: f64, heading_deg: f64) -> Self {
        Self {
            x_in,
            y_in,
            heading_deg,
        }
    }

    /// Straight line distance between this pose and the point `(x_in, y_in)`.
    pub fn distance_to(&self, x_in: f64, y_in: f64) -> f64 {
        (x_in - self.x_in).hypot(y_in - self.y_in)
    }
}

impl std::fmt::Display for Pose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({:.2} in, {:.2} in, {:.1} deg)",
            self.x_in, self.y_in, self.heading_deg
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_distance_to() {
        let pose = Pose::new(3.0, 4.0, 90.0);

        assert_eq!(pose.distance_to(0.0, 0.0), 5.0);
        assert_eq!(pose.distance_to(3.0, 4.0), 0.0);
        assert_eq!(format!("{}", pose), "(3.00 in, 4.00 in, 90.0 deg)");
    }
}
