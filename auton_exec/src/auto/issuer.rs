//! # Motion primitive issuer
//!
//! Every primitive builds a [`MotionTarget`] and submits it to the controller straight away. None
//! of these calls block, the routine picks a [`super::ChainMode`] to wait on afterwards. Speeds are
//! passed through untouched, the controller clamps or rejects values outside of `0..=127`.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chassis_if::{MotionTarget, Speed, SwingSide};
use log::debug;

use super::Auton;

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<'a> Auton<'a> {
    /// Drive in a straight line by `dist_in` inches, negative distances drive backwards.
    pub fn drive(&self, dist_in: f64, speed: Speed, slew: bool) {
        self.issue(MotionTarget::Drive { dist_in, speed }, slew);
    }

    /// Turn on the spot to the absolute heading `angle_deg`.
    pub fn turn_to(&self, angle_deg: f64, speed: Speed) {
        self.issue(MotionTarget::TurnTo { angle_deg, speed }, false);
    }

    /// Turn on the spot by `angle_deg` relative to the current heading.
    pub fn turn_by(&self, angle_deg: f64, speed: Speed) {
        self.issue(MotionTarget::TurnBy { angle_deg, speed }, false);
    }

    /// Swing to the absolute heading `angle_deg` by driving `side`, the other side running at
    /// `opposite_speed`.
    pub fn swing(&self, side: SwingSide, angle_deg: f64, speed: Speed, opposite_speed: Speed) {
        self.issue(
            MotionTarget::Swing {
                side,
                angle_deg,
                speed,
                opposite_speed,
            },
            false,
        );
    }

    /// Change the speed cap of the motion in flight.
    ///
    /// Normally used after a [`super::ChainMode::DistanceTriggered`] wait.
    pub fn set_speed_cap(&self, speed: Speed) {
        debug!("Speed cap set to {}", speed.0);
        self.chassis.set_speed_cap(speed);
    }

    /// Submit a prebuilt target, superseding any target still in flight.
    pub fn issue(&self, target: MotionTarget, slew: bool) {
        debug!("Issuing {:?} (slew: {})", target, slew);
        self.chassis.submit(target, slew);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::auto::{
        mock::{Call, MockChassis},
        AutoParams,
    };

    #[test]
    fn test_primitives_submit_targets() {
        let chassis = MockChassis::new();
        let params = AutoParams::default();
        let auton = Auton::new(&chassis, &params);

        auton.drive(24.0, Speed(110), true);
        auton.turn_by(-30.0, Speed(90));
        auton.swing(SwingSide::Right, -45.0, Speed(110), Speed(45));
        auton.set_speed_cap(Speed(60));

        assert_eq!(
            chassis.calls(),
            vec![
                Call::Submit(
                    MotionTarget::Drive {
                        dist_in: 24.0,
                        speed: Speed(110)
                    },
                    true
                ),
                Call::Submit(
                    MotionTarget::TurnBy {
                        angle_deg: -30.0,
                        speed: Speed(90)
                    },
                    false
                ),
                Call::Submit(
                    MotionTarget::Swing {
                        side: SwingSide::Right,
                        angle_deg: -45.0,
                        speed: Speed(110),
                        opposite_speed: Speed(45)
                    },
                    false
                ),
                Call::SpeedCap(Speed(60)),
            ]
        );
    }

    #[test]
    fn test_speed_passed_through() {
        let chassis = MockChassis::new();
        let params = AutoParams::default();
        let auton = Auton::new(&chassis, &params);

        // Out of range values are the controller's problem
        auton.turn_to(90.0, Speed(300));
        auton.drive(0.0, Speed(-4), false);

        assert_eq!(
            chassis.submitted(),
            vec![
                MotionTarget::TurnTo {
                    angle_deg: 90.0,
                    speed: Speed(300)
                },
                MotionTarget::Drive {
                    dist_in: 0.0,
                    speed: Speed(-4)
                },
            ]
        );
    }
}
