//! # Simulated chassis state
//!
//! Everything shared between the control loop thread and the callers of the controller. The
//! state is only ever touched with the chassis mutex held.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chassis_if::{ChassisTuning, MotionTarget, Pose, PoseError, Speed};
use log::{debug, warn};

use super::{
    exit::ExitReason,
    model::Drivetrain,
    motion::{ActiveMotion, MotionStatus, Output},
    Params,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct SimState {
    pub params: Params,

    pub tuning: ChassisTuning,

    pub drivetrain: Drivetrain,

    /// The target in flight, `None` once settled.
    pub motion: Option<ActiveMotion>,

    /// Why the last motion ended.
    pub last_exit: Option<ExitReason>,

    pub interfered: bool,

    /// Number of upcoming translations which will be blocked.
    pub obstructions: u32,

    pub pose_sensor_ok: bool,

    /// Condition the sequence is currently blocked on.
    pub wait: Option<WaitCondition>,

    /// Units: seconds
    pub sim_time_s: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Conditions a caller of the controller can block on.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum WaitCondition {
    /// The motion in flight has ended.
    Settled,

    /// The motion in flight has passed its original target after a quick chain extension.
    ChainCrossed,

    /// Progress of the motion in flight has crossed the signed threshold.
    Progress(f64),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimState {
    pub fn new(params: Params) -> Self {
        Self {
            params,
            tuning: ChassisTuning::default(),
            drivetrain: Drivetrain::new(),
            motion: None,
            last_exit: None,
            interfered: false,
            obstructions: 0,
            pose_sensor_ok: true,
            wait: None,
            sim_time_s: 0.0,
        }
    }

    /// Advance the control loop and the drivetrain by one step.
    pub fn step(&mut self) {
        let (output, blocked) = match &mut self.motion {
            Some(m) => (m.control(&self.drivetrain, &self.tuning), m.obstructed),
            None => (
                Output {
                    left: 0.0,
                    right: 0.0,
                    main: 0.0,
                },
                false,
            ),
        };

        self.drivetrain
            .step(&self.params, output.left, output.right, blocked);
        self.sim_time_s += self.params.sim_period_s();

        let status = match &mut self.motion {
            Some(m) => m.check_exit(&self.drivetrain, &self.tuning, &self.params, &output),
            None => return,
        };

        if let MotionStatus::Finished(reason) = status {
            self.finish(reason);
        }
    }

    /// End the motion in flight.
    fn finish(&mut self, reason: ExitReason) {
        if let Some(m) = self.motion.take() {
            debug!(
                "{:?} ended after {:.2} s: {:?}",
                m.target, m.elapsed_s, reason
            );
        }

        if reason.is_interference() {
            warn!("Motion abandoned, the robot is obstructed ({:?})", reason);
        }

        self.drivetrain.stop();
        self.interfered = reason.is_interference();
        self.last_exit = Some(reason);
    }

    /// Replace the motion in flight with `target`.
    ///
    /// The interference flag keeps its value until the new motion ends.
    pub fn submit(&mut self, target: MotionTarget, slew: bool) {
        self.last_exit = None;
        self.motion = None;

        let speed = target.speed();
        if !speed.is_positive() {
            warn!(
                "Ignoring {:?}, speed {} would not move the robot",
                target, speed.0
            );
            self.finish(ExitReason::AlreadySettled);
            return;
        }
        if speed > Speed::MAX {
            warn!("Speed {} is above {}, clamping", speed.0, Speed::MAX.0);
        }

        match ActiveMotion::new(target, slew, &self.drivetrain, &self.tuning) {
            Some(mut m) => {
                if target.is_translation() && self.obstructions > 0 {
                    self.obstructions -= 1;
                    m.obstructed = true;
                    debug!("{:?} will be obstructed", target);
                }
                self.motion = Some(m);
            }
            None => {
                debug!("{:?} is already satisfied", target);
                self.finish(ExitReason::AlreadySettled);
            }
        }
    }

    /// Extend the motion in flight for a quick chain.
    pub fn extend_for_chain(&mut self) -> WaitCondition {
        let tuning = &self.tuning;
        match &mut self.motion {
            Some(m) => {
                let margin = tuning.chain(m.phase_kind());
                m.extend_for_chain(margin);
                WaitCondition::ChainCrossed
            }
            None => WaitCondition::Settled,
        }
    }

    /// Whether `cond` is met. Every condition is met once the motion has ended.
    pub fn is_met(&self, cond: WaitCondition) -> bool {
        let m = match &self.motion {
            Some(m) => m,
            None => return true,
        };

        match cond {
            WaitCondition::Settled => false,
            WaitCondition::ChainCrossed => m.chain_crossed,
            WaitCondition::Progress(threshold) => {
                let progress = m.progress(&self.drivetrain);
                if threshold >= 0.0 {
                    progress >= threshold
                } else {
                    progress <= threshold
                }
            }
        }
    }

    /// Whether a caller is blocked on a condition which is not met yet.
    pub fn wait_pending(&self) -> bool {
        self.wait.map_or(false, |c| !self.is_met(c))
    }

    pub fn set_speed_cap(&mut self, speed: Speed) {
        if !speed.is_positive() {
            warn!("Ignoring speed cap of {}", speed.0);
            return;
        }

        if let Some(m) = &mut self.motion {
            m.cap_power = speed.power();
        }
    }

    pub fn pose(&self) -> Result<Pose, PoseError> {
        if self.pose_sensor_ok {
            Ok(self.drivetrain.pose())
        } else {
            Err(PoseError::Unavailable)
        }
    }

    pub fn reset_pose(&mut self) {
        self.drivetrain.position_in = nalgebra::Vector2::zeros();
        self.drivetrain.heading_deg = 0.0;
    }

    pub fn reset_drive_reference(&mut self) {
        let offset = self.drivetrain.reset_encoders();
        if let Some(m) = &mut self.motion {
            m.shift_drive_reference(offset);
        }
    }

    pub fn reset_heading_reference(&mut self) {
        self.drivetrain.heading_deg = 0.0;
    }

    pub fn reset_targets(&mut self) {
        self.motion = None;
        self.interfered = false;
        self.drivetrain.stop();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chassis_if::SwingSide;

    fn run_to_end(state: &mut SimState) {
        for _ in 0..1000 {
            if state.motion.is_none() {
                return;
            }
            state.step();
        }
        panic!("Motion did not end");
    }

    #[test]
    fn test_drive_settles() {
        let mut state = SimState::new(Params::default());

        state.submit(
            MotionTarget::Drive {
                dist_in: 24.0,
                speed: Speed(110),
            },
            true,
        );
        run_to_end(&mut state);

        let pose = state.pose().unwrap();
        assert!((pose.x_in - 24.0).abs() < state.tuning.drive_exit.big_error);
        assert!(pose.y_in.abs() < 0.1);
        assert!(!state.interfered);
        assert!(!state.last_exit.map_or(true, |r| r.is_interference()));
    }

    #[test]
    fn test_turn_and_swing_settle() {
        let mut state = SimState::new(Params::default());

        state.submit(
            MotionTarget::TurnTo {
                angle_deg: 90.0,
                speed: Speed(90),
            },
            false,
        );
        run_to_end(&mut state);
        assert!((state.pose().unwrap().heading_deg - 90.0).abs() < 7.0);

        state.submit(
            MotionTarget::Swing {
                side: SwingSide::Right,
                angle_deg: 45.0,
                speed: Speed(110),
                opposite_speed: Speed(45),
            },
            false,
        );
        run_to_end(&mut state);
        assert!((state.pose().unwrap().heading_deg - 45.0).abs() < 7.0);
        assert!(!state.interfered);
    }

    #[test]
    fn test_obstructed_drive() {
        let mut state = SimState::new(Params::default());
        state.obstructions = 1;

        state.submit(
            MotionTarget::Drive {
                dist_in: 24.0,
                speed: Speed(110),
            },
            false,
        );
        run_to_end(&mut state);

        assert!(state.interfered);
        assert_eq!(state.obstructions, 0);
        assert_eq!(state.pose().unwrap().x_in, 0.0);

        // The next drive is free, and clears the flag once it ends
        state.submit(
            MotionTarget::Drive {
                dist_in: -12.0,
                speed: Speed(127),
            },
            false,
        );
        assert!(state.interfered);
        run_to_end(&mut state);
        assert!(!state.interfered);
    }

    #[test]
    fn test_zero_speed_ignored() {
        let mut state = SimState::new(Params::default());

        state.submit(
            MotionTarget::Drive {
                dist_in: 24.0,
                speed: Speed(0),
            },
            false,
        );

        assert!(state.motion.is_none());
        assert!(state.is_met(WaitCondition::Settled));
    }

    #[test]
    fn test_progress_condition() {
        let mut state = SimState::new(Params::default());

        state.submit(
            MotionTarget::Drive {
                dist_in: -24.0,
                speed: Speed(30),
            },
            true,
        );

        let cond = WaitCondition::Progress(-6.0);
        assert!(!state.is_met(cond));
        while !state.is_met(cond) {
            state.step();
        }

        assert!(state.motion.is_some());
        assert!(state.drivetrain.travel_in() <= -6.0);
    }
}
