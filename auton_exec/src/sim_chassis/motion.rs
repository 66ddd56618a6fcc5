//! # Simulated chassis motions
//!
//! An [`ActiveMotion`] is built from a [`MotionTarget`] on submission and owns the PID loops and
//! exit timers of that target until it ends. Drives are controlled on the mean travel of the two
//! sides with a heading hold, turns and swings on the heading, and odometry targets in two
//! phases: travel to the point, then an optional turn to the final heading.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chassis_if::{
    AngleBehaviour, ChassisTuning, DriveDirection, MotionKind, MotionTarget, SlewLimits, SwingSide,
};
use nalgebra::Vector2;
use util::maths::{abs_cap, lin_map, wrap_180, wrap_360};

use super::{
    exit::{ExitReason, ExitTimers},
    model::{Drivetrain, MAX_POWER},
    pid::Pid,
    Params,
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Errors below this are treated as zero when a target is submitted.
const ZERO_ERROR: f64 = 1e-6;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A target being executed by the simulated chassis.
#[derive(Debug, Clone)]
pub struct ActiveMotion {
    pub target: MotionTarget,

    /// Maximum power of the motion's main output.
    pub cap_power: f64,

    /// Ramp applied at the start of the motion, if slew was requested and the motion is longer
    /// than the ramp.
    slew: Option<SlewLimits>,

    /// Whether the robot is blocked for the whole of this motion.
    pub obstructed: bool,

    exit: ExitTimers,

    phase: Phase,

    /// Extension applied by a quick chain.
    chain_margin: Option<f64>,

    /// Set once the motion passes its original target after a quick chain.
    pub chain_crossed: bool,

    /// Units: seconds
    pub elapsed_s: f64,
}

/// Side powers and the main output of one control step.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Output {
    pub left: f64,
    pub right: f64,
    pub main: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Phase {
    Drive {
        start_in: f64,
        goal_in: f64,
        hold_deg: f64,
        sign: f64,
        drive_pid: Pid,
        heading_pid: Pid,
    },
    Turn {
        kind: MotionKind,
        start_deg: f64,
        goal_deg: f64,
        sign: f64,
        pid: Pid,
    },
    Swing {
        side: SwingSide,
        start_deg: f64,
        goal_deg: f64,
        sign: f64,
        ratio: f64,
        pid: Pid,
    },
    OdomTravel {
        start: Vector2<f64>,
        goal: Vector2<f64>,
        direction: f64,
        start_dist_in: f64,
        lock_deg: Option<f64>,
        final_heading: Option<(f64, AngleBehaviour)>,
        drive_pid: Pid,
        heading_pid: Pid,
    },
}

/// State of a motion after a control step.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MotionStatus {
    Running,
    Finished(ExitReason),
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Resolve an absolute heading into an unwrapped goal relative to the current unwrapped heading.
///
/// A target exactly 180 degrees away is reached counter-clockwise when taking the shortest path.
pub fn resolve_heading(heading_deg: f64, target_deg: f64, behaviour: AngleBehaviour) -> f64 {
    let shortest = wrap_180(target_deg - heading_deg);

    let error = match behaviour {
        AngleBehaviour::ShortestPath => shortest,
        AngleBehaviour::LongestPath if shortest > 0.0 => shortest - 360.0,
        AngleBehaviour::LongestPath if shortest < 0.0 => shortest + 360.0,
        AngleBehaviour::LongestPath => 0.0,
        AngleBehaviour::CounterClockwise => wrap_360(target_deg - heading_deg),
        AngleBehaviour::Clockwise => {
            let ccw = wrap_360(target_deg - heading_deg);
            if ccw > 0.0 {
                ccw - 360.0
            } else {
                0.0
            }
        }
        AngleBehaviour::Raw => target_deg - heading_deg,
    };

    heading_deg + error
}

fn sign_of(error: f64) -> f64 {
    if error < 0.0 {
        -1.0
    } else {
        1.0
    }
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ActiveMotion {
    /// Build a motion for `target` from the current state of the drivetrain.
    ///
    /// Returns `None` if the target is already satisfied.
    pub fn new(
        target: MotionTarget,
        slew: bool,
        dt: &Drivetrain,
        tuning: &ChassisTuning,
    ) -> Option<Self> {
        let phase = match target {
            MotionTarget::Drive { dist_in, .. } => {
                let start_in = dt.travel_in();
                Phase::Drive {
                    start_in,
                    goal_in: start_in + dist_in,
                    hold_deg: dt.heading_deg,
                    sign: sign_of(dist_in),
                    drive_pid: Pid::new(tuning.drive_pid),
                    heading_pid: Pid::new(tuning.heading_pid),
                }
            }
            MotionTarget::TurnTo { angle_deg, .. } => Self::turn_phase(
                dt,
                tuning,
                resolve_heading(dt.heading_deg, angle_deg, tuning.angle_behaviour),
            ),
            MotionTarget::TurnBy { angle_deg, .. } => {
                Self::turn_phase(dt, tuning, dt.heading_deg + angle_deg)
            }
            MotionTarget::Swing {
                side,
                angle_deg,
                opposite_speed,
                ..
            } => {
                let goal_deg = resolve_heading(dt.heading_deg, angle_deg, tuning.angle_behaviour);
                Phase::Swing {
                    side,
                    start_deg: dt.heading_deg,
                    goal_deg,
                    sign: sign_of(goal_deg - dt.heading_deg),
                    ratio: opposite_speed.power() / MAX_POWER,
                    pid: Pid::new(tuning.swing_pid),
                }
            }
            MotionTarget::Odom(odom) => {
                let goal = Vector2::new(odom.x_in, odom.y_in);
                let start_dist_in = (goal - dt.position_in).norm();
                let final_heading = odom.heading_deg.map(|h| (h, odom.turn_behaviour));

                match final_heading {
                    // Nothing to travel, go straight to the final turn
                    Some((h, behaviour)) if start_dist_in < ZERO_ERROR => Self::turn_phase(
                        dt,
                        tuning,
                        resolve_heading(dt.heading_deg, h, behaviour),
                    ),
                    _ => Phase::OdomTravel {
                        start: dt.position_in,
                        goal,
                        direction: match odom.direction {
                            DriveDirection::Forward => 1.0,
                            DriveDirection::Reverse => -1.0,
                        },
                        start_dist_in,
                        lock_deg: None,
                        final_heading,
                        drive_pid: Pid::new(tuning.drive_pid),
                        heading_pid: Pid::new(tuning.heading_pid),
                    },
                }
            }
        };

        let mut motion = Self {
            target,
            cap_power: target.speed().power(),
            slew: None,
            obstructed: false,
            exit: ExitTimers::default(),
            phase,
            chain_margin: None,
            chain_crossed: false,
            elapsed_s: 0.0,
        };

        let initial_error = motion.error(dt);
        if initial_error.abs() < ZERO_ERROR {
            return None;
        }

        let slew_limits = *tuning.slew(target.kind());
        if slew && initial_error.abs() > slew_limits.distance {
            motion.slew = Some(slew_limits);
        }

        Some(motion)
    }

    fn turn_phase(dt: &Drivetrain, tuning: &ChassisTuning, goal_deg: f64) -> Phase {
        Phase::Turn {
            kind: MotionKind::Turn,
            start_deg: dt.heading_deg,
            goal_deg,
            sign: sign_of(goal_deg - dt.heading_deg),
            pid: Pid::new(tuning.turn_pid),
        }
    }

    /// Tuning set of the current phase.
    pub fn phase_kind(&self) -> MotionKind {
        match &self.phase {
            Phase::Drive { .. } | Phase::OdomTravel { .. } => MotionKind::Drive,
            Phase::Turn { kind, .. } => *kind,
            Phase::Swing { .. } => MotionKind::Swing,
        }
    }

    /// Signed error of the current phase.
    ///
    /// Units: inches for drives, degrees for turns and swings
    pub fn error(&self, dt: &Drivetrain) -> f64 {
        match &self.phase {
            Phase::Drive { goal_in, .. } => goal_in - dt.travel_in(),
            Phase::Turn { goal_deg, .. } | Phase::Swing { goal_deg, .. } => {
                goal_deg - dt.heading_deg
            }
            Phase::OdomTravel {
                goal,
                direction,
                lock_deg,
                ..
            } => {
                let delta = goal - dt.position_in;
                match lock_deg {
                    None => delta.norm(),
                    Some(_) => direction * delta.dot(&dt.heading_vector()),
                }
            }
        }
    }

    /// Error in the direction of travel, positive until the goal is passed.
    fn directed_error(&self, dt: &Drivetrain) -> f64 {
        let sign = match &self.phase {
            Phase::Drive { sign, .. } | Phase::Turn { sign, .. } | Phase::Swing { sign, .. } => {
                *sign
            }
            Phase::OdomTravel { .. } => 1.0,
        };

        self.error(dt) * sign
    }

    /// Signed progress from the start of the current phase.
    ///
    /// Units: inches for drives, degrees for turns and swings
    pub fn progress(&self, dt: &Drivetrain) -> f64 {
        match &self.phase {
            Phase::Drive { start_in, .. } => dt.travel_in() - start_in,
            Phase::Turn { start_deg, .. } | Phase::Swing { start_deg, .. } => {
                dt.heading_deg - start_deg
            }
            Phase::OdomTravel {
                start_dist_in,
                goal,
                ..
            } => start_dist_in - (goal - dt.position_in).norm(),
        }
    }

    /// Extend the goal of the current phase by the chain threshold in the direction of travel.
    pub fn extend_for_chain(&mut self, margin: f64) {
        match &mut self.phase {
            Phase::Drive { goal_in, sign, .. } => *goal_in += *sign * margin,
            Phase::Turn { goal_deg, sign, .. } | Phase::Swing { goal_deg, sign, .. } => {
                *goal_deg += *sign * margin
            }
            Phase::OdomTravel { start, goal, .. } => {
                let path = *goal - *start;
                if path.norm() > ZERO_ERROR {
                    *goal += path.normalize() * margin;
                }
            }
        }

        self.chain_margin = Some(margin);
    }

    /// Shift drive goals after the drive encoders were zeroed.
    pub fn shift_drive_reference(&mut self, offset_in: f64) {
        if let Phase::Drive {
            start_in, goal_in, ..
        } = &mut self.phase
        {
            *start_in -= offset_in;
            *goal_in -= offset_in;
        }
    }

    /// Power cap at the current progress, including the slew ramp.
    fn ramped_cap(&self, progress: f64) -> f64 {
        match self.slew {
            Some(slew) if progress.abs() < slew.distance && slew.distance > 0.0 => {
                let min = slew.min_speed.power().min(self.cap_power);
                lin_map((0.0, slew.distance), (min, self.cap_power), progress.abs())
            }
            _ => self.cap_power,
        }
    }

    /// Compute the side powers for this step.
    pub fn control(&mut self, dt: &Drivetrain, tuning: &ChassisTuning) -> Output {
        let error = self.error(dt);
        let cap = self.ramped_cap(self.progress(dt));

        match &mut self.phase {
            Phase::Drive {
                hold_deg,
                drive_pid,
                heading_pid,
                ..
            } => {
                let main = abs_cap(drive_pid.get(error), cap);
                let correction = abs_cap(heading_pid.get(*hold_deg - dt.heading_deg), cap);
                Output {
                    left: main - correction,
                    right: main + correction,
                    main,
                }
            }
            Phase::Turn { pid, .. } => {
                let main = abs_cap(pid.get(error), cap);
                Output {
                    left: -main,
                    right: main,
                    main,
                }
            }
            Phase::Swing {
                side, ratio, pid, ..
            } => {
                let main = abs_cap(pid.get(error), cap);
                match side {
                    SwingSide::Left => Output {
                        left: -main,
                        right: -main * *ratio,
                        main,
                    },
                    SwingSide::Right => Output {
                        left: main * *ratio,
                        right: main,
                        main,
                    },
                }
            }
            Phase::OdomTravel {
                goal,
                direction,
                lock_deg,
                drive_pid,
                heading_pid,
                ..
            } => {
                let delta = *goal - dt.position_in;

                // Steer towards the point until close enough that the bearing becomes unstable,
                // then hold the heading and finish along the track
                if lock_deg.is_none() && delta.norm() <= tuning.drive_exit.big_error {
                    *lock_deg = Some(dt.heading_deg);
                }

                let heading_error = match lock_deg {
                    Some(lock) => *lock - dt.heading_deg,
                    None => {
                        let mut bearing = delta.y.atan2(delta.x).to_degrees();
                        if *direction < 0.0 {
                            bearing += 180.0;
                        }
                        wrap_180(bearing - dt.heading_deg)
                    }
                };

                // Error is recomputed as locking may have switched it to the along-track form
                let error = match lock_deg {
                    Some(_) => *direction * delta.dot(&dt.heading_vector()),
                    None => error,
                };

                let alignment = heading_error.to_radians().cos().max(0.0);
                let main = abs_cap(drive_pid.get(error), cap) * alignment * *direction;
                let correction = abs_cap(heading_pid.get(heading_error), cap);
                Output {
                    left: main - correction,
                    right: main + correction,
                    main,
                }
            }
        }
    }

    /// Update the exit timers after the drivetrain has been stepped.
    pub fn check_exit(
        &mut self,
        dt: &Drivetrain,
        tuning: &ChassisTuning,
        params: &Params,
        output: &Output,
    ) -> MotionStatus {
        self.elapsed_s += params.sim_period_s();

        if let Some(margin) = self.chain_margin {
            if self.directed_error(dt) <= margin {
                self.chain_crossed = true;
            }
        }

        let stationary = dt.wheel_speed_ips() < params.stationary_speed_ips;
        let pushing = output.main.abs() > params.stall_power;

        let reason = match self.exit.update(
            tuning.exit(self.phase_kind()),
            self.error(dt),
            stationary,
            pushing,
            params.sim_period_ms,
        ) {
            Some(r) => r,
            None => return MotionStatus::Running,
        };

        // A settled odometry travel carries on into its final turn
        if let Phase::OdomTravel {
            final_heading: Some((heading_deg, behaviour)),
            ..
        } = self.phase
        {
            if !reason.is_interference() {
                let goal_deg = resolve_heading(dt.heading_deg, heading_deg, behaviour);
                if (goal_deg - dt.heading_deg).abs() >= ZERO_ERROR {
                    self.phase = Self::turn_phase(dt, tuning, goal_deg);
                    self.exit = ExitTimers::default();
                    self.slew = None;
                    if self.chain_margin.is_some() {
                        self.chain_crossed = true;
                    }
                    return MotionStatus::Running;
                }
            }
        }

        MotionStatus::Finished(reason)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chassis_if::Speed;

    #[test]
    fn test_resolve_heading() {
        let b = AngleBehaviour::ShortestPath;
        assert_eq!(resolve_heading(0.0, 90.0, b), 90.0);
        assert_eq!(resolve_heading(350.0, 10.0, b), 370.0);
        assert_eq!(resolve_heading(0.0, -90.0, b), -90.0);

        // Ties go counter-clockwise
        assert_eq!(resolve_heading(0.0, 180.0, b), 180.0);
        assert_eq!(resolve_heading(90.0, -90.0, b), 270.0);

        assert_eq!(resolve_heading(0.0, 90.0, AngleBehaviour::LongestPath), -270.0);
        assert_eq!(resolve_heading(0.0, -90.0, AngleBehaviour::CounterClockwise), 270.0);
        assert_eq!(resolve_heading(0.0, 90.0, AngleBehaviour::Clockwise), -270.0);
        assert_eq!(resolve_heading(720.0, 90.0, AngleBehaviour::Raw), 90.0);
    }

    #[test]
    fn test_zero_targets_already_settled() {
        let dt = Drivetrain::new();
        let tuning = ChassisTuning::default();

        let zeros = [
            MotionTarget::Drive {
                dist_in: 0.0,
                speed: Speed(110),
            },
            MotionTarget::TurnTo {
                angle_deg: 0.0,
                speed: Speed(90),
            },
            MotionTarget::TurnBy {
                angle_deg: 0.0,
                speed: Speed(90),
            },
            MotionTarget::Swing {
                side: SwingSide::Left,
                angle_deg: 360.0,
                speed: Speed(110),
                opposite_speed: Speed(45),
            },
        ];

        for target in &zeros {
            assert!(ActiveMotion::new(*target, true, &dt, &tuning).is_none());
        }
    }

    #[test]
    fn test_chain_extension() {
        let dt = Drivetrain::new();
        let tuning = ChassisTuning::default();

        let mut motion = ActiveMotion::new(
            MotionTarget::Drive {
                dist_in: -10.0,
                speed: Speed(110),
            },
            false,
            &dt,
            &tuning,
        )
        .unwrap();

        motion.extend_for_chain(3.0);
        assert_eq!(motion.error(&dt), -13.0);
        assert_eq!(motion.directed_error(&dt), 13.0);
    }

    #[test]
    fn test_slew_ramp() {
        let dt = Drivetrain::new();
        let tuning = ChassisTuning::default();
        let target = MotionTarget::Drive {
            dist_in: 24.0,
            speed: Speed(110),
        };

        let motion = ActiveMotion::new(target, true, &dt, &tuning).unwrap();
        assert_eq!(motion.ramped_cap(0.0), 70.0);
        assert_eq!(motion.ramped_cap(1.5), 90.0);
        assert_eq!(motion.ramped_cap(5.0), 110.0);

        let motion = ActiveMotion::new(target, false, &dt, &tuning).unwrap();
        assert_eq!(motion.ramped_cap(0.0), 110.0);
    }
}
