//! # Scripted motion controller
//!
//! Records every call made by the sequencer and replays a scripted interference sequence. A full
//! settle after an odometry target moves the pose onto that target.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
};

use chassis_if::{
    AngleBehaviour, ExitConditions, MotionController, MotionKind, MotionTarget, PidConstants,
    PidKind, Pose, PoseError, SlewLimits, Speed,
};
use util::maths::wrap_180;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub(crate) struct MockChassis {
    calls: RefCell<Vec<Call>>,

    /// Interference reported by successive full settles.
    interference: RefCell<VecDeque<bool>>,

    /// Interference reported once the script runs out.
    interference_after: bool,

    interfered: Cell<bool>,

    pose: Cell<Result<Pose, PoseError>>,

    pending: Cell<Option<MotionTarget>>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Submit(MotionTarget, bool),
    WaitFullSettle,
    WaitQuickChain,
    WaitUntil(f64),
    SpeedCap(Speed),
    ResetPose,
    ResetDriveReference,
    ResetHeadingReference,
    ResetTargets,
    Configure,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MockChassis {
    pub fn new() -> Self {
        Self::with_interference(&[], false)
    }

    /// Report `script` on successive full settles, then `after` forever.
    pub fn with_interference(script: &[bool], after: bool) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            interference: RefCell::new(script.iter().copied().collect()),
            interference_after: after,
            interfered: Cell::new(false),
            pose: Cell::new(Ok(Pose::default())),
            pending: Cell::new(None),
        }
    }

    pub fn set_pose(&self, pose: Result<Pose, PoseError>) {
        self.pose.set(pose);
    }

    pub fn set_interfered(&self, interfered: bool) {
        self.interfered.set(interfered);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn submitted(&self) -> Vec<MotionTarget> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::Submit(t, _) => Some(*t),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

impl MotionController for MockChassis {
    fn submit(&self, target: MotionTarget, slew: bool) {
        self.pending.set(Some(target));
        self.record(Call::Submit(target, slew));
    }

    fn wait_full_settle(&self) {
        self.record(Call::WaitFullSettle);

        let next = self
            .interference
            .borrow_mut()
            .pop_front()
            .unwrap_or(self.interference_after);
        self.interfered.set(next);

        if let (Some(MotionTarget::Odom(odom)), Ok(pose)) = (self.pending.take(), self.pose.get())
        {
            let heading_deg = match odom.heading_deg {
                Some(h) => wrap_180(h),
                None if pose.distance_to(odom.x_in, odom.y_in) > 0.0 => wrap_180(
                    (odom.y_in - pose.y_in)
                        .atan2(odom.x_in - pose.x_in)
                        .to_degrees(),
                ),
                None => pose.heading_deg,
            };
            self.pose
                .set(Ok(Pose::new(odom.x_in, odom.y_in, heading_deg)));
        }
    }

    fn wait_quick_chain(&self) {
        self.record(Call::WaitQuickChain);
    }

    fn wait_until(&self, threshold: f64) {
        self.record(Call::WaitUntil(threshold));
    }

    fn set_speed_cap(&self, speed: Speed) {
        self.record(Call::SpeedCap(speed));
    }

    fn pose(&self) -> Result<Pose, PoseError> {
        self.pose.get()
    }

    fn is_interfered(&self) -> bool {
        self.interfered.get()
    }

    fn reset_pose(&self) {
        self.record(Call::ResetPose);
        if self.pose.get().is_ok() {
            self.pose.set(Ok(Pose::default()));
        }
    }

    fn reset_drive_reference(&self) {
        self.record(Call::ResetDriveReference);
    }

    fn reset_heading_reference(&self) {
        self.record(Call::ResetHeadingReference);
    }

    fn reset_targets(&self) {
        self.pending.set(None);
        self.record(Call::ResetTargets);
    }

    fn set_pid_constants(&self, _kind: PidKind, _constants: PidConstants) {
        self.record(Call::Configure);
    }

    fn set_exit_conditions(&self, _kind: MotionKind, _conditions: ExitConditions) {
        self.record(Call::Configure);
    }

    fn set_chain_threshold(&self, _kind: MotionKind, _threshold: f64) {
        self.record(Call::Configure);
    }

    fn set_slew(&self, _kind: MotionKind, _slew: SlewLimits) {
        self.record(Call::Configure);
    }

    fn set_angle_behaviour(&self, _behaviour: AngleBehaviour) {
        self.record(Call::Configure);
    }
}
