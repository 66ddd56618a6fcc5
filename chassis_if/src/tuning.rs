//! # Controller tuning
//!
//! Configuration handed to the motion controller once, before any routine runs. The default
//! values are the tuning the example routines were written against.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::{ctrl::MotionController, target::{AngleBehaviour, Speed}};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Gains of one PID loop.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PidConstants {
    pub k_p: f64,
    pub k_i: f64,
    pub k_d: f64,

    /// The integral only accumulates while the error magnitude is below this value. Zero means
    /// the integral always accumulates.
    #[serde(default)]
    pub start_i: f64,
}

/// Conditions under which a motion is considered finished.
///
/// Errors are in inches for drives and degrees for turns and swings. A time of zero disables
/// that condition.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitConditions {
    /// Time the error must stay below `small_error` to settle.
    pub small_exit_time_ms: u64,
    pub small_error: f64,

    /// Time the error must stay below `big_error` to settle.
    pub big_exit_time_ms: u64,
    pub big_error: f64,

    /// Time the robot may be stationary outside of `small_error` before the motion is abandoned
    /// and flagged as interfered.
    pub velocity_exit_time_ms: u64,

    /// Time the motors may push against a stall before the motion is abandoned and flagged as
    /// interfered.
    pub stall_exit_time_ms: u64,
}

/// Ramp applied to the start of a motion when slew is enabled.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlewLimits {
    /// Distance over which the speed ramps up to the cap.
    ///
    /// Units: inches for drives and swings, degrees for turns
    pub distance: f64,

    /// Speed at the start of the ramp.
    pub min_speed: Speed,
}

/// Complete tuning of the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChassisTuning {
    pub drive_pid: PidConstants,
    pub heading_pid: PidConstants,
    pub turn_pid: PidConstants,
    pub swing_pid: PidConstants,

    pub drive_exit: ExitConditions,
    pub turn_exit: ExitConditions,
    pub swing_exit: ExitConditions,

    /// Distance before the target at which a quick chained drive hands over to the next motion.
    ///
    /// Units: inches
    pub drive_chain: f64,

    /// Units: degrees
    pub turn_chain: f64,

    /// Units: degrees
    pub swing_chain: f64,

    pub drive_slew: SlewLimits,
    pub turn_slew: SlewLimits,
    pub swing_slew: SlewLimits,

    pub angle_behaviour: AngleBehaviour,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// PID loops of the controller.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PidKind {
    Drive,
    /// Heading correction applied while driving.
    Heading,
    Turn,
    Swing,
}

/// Motion families which carry their own exit, chain and slew settings.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MotionKind {
    Drive,
    Turn,
    Swing,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PidConstants {
    pub fn new(k_p: f64, k_i: f64, k_d: f64, start_i: f64) -> Self {
        Self { k_p, k_i, k_d, start_i }
    }
}

impl ExitConditions {
    pub fn new(
        small_exit_time_ms: u64,
        small_error: f64,
        big_exit_time_ms: u64,
        big_error: f64,
        velocity_exit_time_ms: u64,
        stall_exit_time_ms: u64,
    ) -> Self {
        Self {
            small_exit_time_ms,
            small_error,
            big_exit_time_ms,
            big_error,
            velocity_exit_time_ms,
            stall_exit_time_ms,
        }
    }
}

impl ChassisTuning {
    /// Push the whole tuning set into a controller.
    pub fn apply(&self, ctrl: &dyn MotionController) {
        ctrl.set_pid_constants(PidKind::Drive, self.drive_pid);
        ctrl.set_pid_constants(PidKind::Heading, self.heading_pid);
        ctrl.set_pid_constants(PidKind::Turn, self.turn_pid);
        ctrl.set_pid_constants(PidKind::Swing, self.swing_pid);

        ctrl.set_exit_conditions(MotionKind::Drive, self.drive_exit);
        ctrl.set_exit_conditions(MotionKind::Turn, self.turn_exit);
        ctrl.set_exit_conditions(MotionKind::Swing, self.swing_exit);

        ctrl.set_chain_threshold(MotionKind::Drive, self.drive_chain);
        ctrl.set_chain_threshold(MotionKind::Turn, self.turn_chain);
        ctrl.set_chain_threshold(MotionKind::Swing, self.swing_chain);

        ctrl.set_slew(MotionKind::Drive, self.drive_slew);
        ctrl.set_slew(MotionKind::Turn, self.turn_slew);
        ctrl.set_slew(MotionKind::Swing, self.swing_slew);

        ctrl.set_angle_behaviour(self.angle_behaviour);
    }

    pub fn pid(&self, kind: PidKind) -> &PidConstants {
        match kind {
            PidKind::Drive => &self.drive_pid,
            PidKind::Heading => &self.heading_pid,
            PidKind::Turn => &self.turn_pid,
            PidKind::Swing => &self.swing_pid,
        }
    }

    pub fn pid_mut(&mut self, kind: PidKind) -> &mut PidConstants {
        match kind {
            PidKind::Drive => &mut self.drive_pid,
            PidKind::Heading => &mut self.heading_pid,
            PidKind::Turn => &mut self.turn_pid,
            PidKind::Swing => &mut self.swing_pid,
        }
    }

    pub fn exit(&self, kind: MotionKind) -> &ExitConditions {
        match kind {
            MotionKind::Drive => &self.drive_exit,
            MotionKind::Turn => &self.turn_exit,
            MotionKind::Swing => &self.swing_exit,
        }
    }

    pub fn exit_mut(&mut self, kind: MotionKind) -> &mut ExitConditions {
        match kind {
            MotionKind::Drive => &mut self.drive_exit,
            MotionKind::Turn => &mut self.turn_exit,
            MotionKind::Swing => &mut self.swing_exit,
        }
    }

    pub fn chain(&self, kind: MotionKind) -> f64 {
        match kind {
            MotionKind::Drive => self.drive_chain,
            MotionKind::Turn => self.turn_chain,
            MotionKind::Swing => self.swing_chain,
        }
    }

    pub fn chain_mut(&mut self, kind: MotionKind) -> &mut f64 {
        match kind {
            MotionKind::Drive => &mut self.drive_chain,
            MotionKind::Turn => &mut self.turn_chain,
            MotionKind::Swing => &mut self.swing_chain,
        }
    }

    pub fn slew(&self, kind: MotionKind) -> &SlewLimits {
        match kind {
            MotionKind::Drive => &self.drive_slew,
            MotionKind::Turn => &self.turn_slew,
            MotionKind::Swing => &self.swing_slew,
        }
    }

    pub fn slew_mut(&mut self, kind: MotionKind) -> &mut SlewLimits {
        match kind {
            MotionKind::Drive => &mut self.drive_slew,
            MotionKind::Turn => &mut self.turn_slew,
            MotionKind::Swing => &mut self.swing_slew,
        }
    }
}

impl Default for ChassisTuning {
    fn default() -> Self {
        let angular_exit = ExitConditions::new(90, 3.0, 250, 7.0, 500, 500);

        Self {
            drive_pid: PidConstants::new(20.0, 0.0, 100.0, 0.0),
            heading_pid: PidConstants::new(11.0, 0.0, 20.0, 0.0),
            turn_pid: PidConstants::new(3.0, 0.05, 20.0, 15.0),
            swing_pid: PidConstants::new(6.0, 0.0, 65.0, 0.0),

            drive_exit: ExitConditions::new(90, 1.0, 250, 3.0, 500, 500),
            turn_exit: angular_exit,
            swing_exit: angular_exit,

            drive_chain: 3.0,
            turn_chain: 3.0,
            swing_chain: 5.0,

            drive_slew: SlewLimits { distance: 3.0, min_speed: Speed(70) },
            turn_slew: SlewLimits { distance: 3.0, min_speed: Speed(70) },
            swing_slew: SlewLimits { distance: 3.0, min_speed: Speed(80) },

            angle_behaviour: AngleBehaviour::ShortestPath,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{pose::{Pose, PoseError}, target::MotionTarget};
    use std::cell::RefCell;

    /// Controller which only records the tuning it is given.
    struct Recorder {
        tuning: RefCell<ChassisTuning>,
    }

    impl MotionController for Recorder {
        fn submit(&self, _target: MotionTarget, _slew: bool) {}
        fn wait_full_settle(&self) {}
        fn wait_quick_chain(&self) {}
        fn wait_until(&self, _threshold: f64) {}
        fn set_speed_cap(&self, _speed: Speed) {}
        fn pose(&self) -> Result<Pose, PoseError> {
            Ok(Pose::default())
        }
        fn is_interfered(&self) -> bool {
            false
        }
        fn reset_pose(&self) {}
        fn reset_drive_reference(&self) {}
        fn reset_heading_reference(&self) {}
        fn reset_targets(&self) {}

        fn set_pid_constants(&self, kind: PidKind, constants: PidConstants) {
            *self.tuning.borrow_mut().pid_mut(kind) = constants;
        }
        fn set_exit_conditions(&self, kind: MotionKind, conditions: ExitConditions) {
            *self.tuning.borrow_mut().exit_mut(kind) = conditions;
        }
        fn set_chain_threshold(&self, kind: MotionKind, threshold: f64) {
            *self.tuning.borrow_mut().chain_mut(kind) = threshold;
        }
        fn set_slew(&self, kind: MotionKind, slew: SlewLimits) {
            *self.tuning.borrow_mut().slew_mut(kind) = slew;
        }
        fn set_angle_behaviour(&self, behaviour: AngleBehaviour) {
            self.tuning.borrow_mut().angle_behaviour = behaviour;
        }
    }

    fn zeroed() -> ChassisTuning {
        let exit = ExitConditions::new(0, 0.0, 0, 0.0, 0, 0);
        let slew = SlewLimits { distance: 0.0, min_speed: Speed(0) };

        ChassisTuning {
            drive_pid: PidConstants::default(),
            heading_pid: PidConstants::default(),
            turn_pid: PidConstants::default(),
            swing_pid: PidConstants::default(),
            drive_exit: exit,
            turn_exit: exit,
            swing_exit: exit,
            drive_chain: 0.0,
            turn_chain: 0.0,
            swing_chain: 0.0,
            drive_slew: slew,
            turn_slew: slew,
            swing_slew: slew,
            angle_behaviour: AngleBehaviour::Raw,
        }
    }

    #[test]
    fn test_apply_sets_everything() {
        let rec = Recorder { tuning: RefCell::new(zeroed()) };
        let tuning = ChassisTuning::default();

        tuning.apply(&rec);

        assert_eq!(*rec.tuning.borrow(), tuning);
    }

    #[test]
    fn test_accessors() {
        let mut tuning = ChassisTuning::default();

        assert_eq!(tuning.pid(PidKind::Turn).start_i, 15.0);
        assert_eq!(tuning.exit(MotionKind::Drive).small_error, 1.0);
        assert_eq!(tuning.chain(MotionKind::Swing), 5.0);
        assert_eq!(tuning.slew(MotionKind::Swing).min_speed, Speed(80));

        *tuning.chain_mut(MotionKind::Drive) = 6.0;
        assert_eq!(tuning.drive_chain, 6.0);
    }

    #[test]
    fn test_shipped_tuning_matches_defaults() {
        let tuning: ChassisTuning =
            toml::from_str(include_str!("../../params/chassis_tuning.toml")).unwrap();

        assert_eq!(tuning, ChassisTuning::default());
    }
}
