//! # Routines
//!
//! The routines available to the selector, in the order they are shown. Every routine starts from
//! the state left by [`Auton::begin`] and ends on a full settle.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chassis_if::{Speed, SwingSide};
use log::warn;

use super::{Auton, AutonError, ChainMode, RoutineRegistry};

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Build the registry of all routines.
pub fn registry() -> RoutineRegistry {
    let mut reg = RoutineRegistry::new();

    reg.register("Drive", drive);
    reg.register("Turn", turn);
    reg.register("Drive and Turn", drive_and_turn);
    reg.register("Wait Until Change Speed", wait_until_change_speed);
    reg.register("Swing", swing);
    reg.register("Motion Chaining", motion_chaining);
    reg.register("Combining Movements", combining_movements);
    reg.register("Interference", interference);
    reg.register("Navigate To Coordinates", navigate_to_coordinates);

    reg
}

/// Drive forward, then back to the start in two steps.
pub fn drive(auton: &Auton) -> Result<(), AutonError> {
    let speed = auton.params().drive_speed;

    auton.drive(24.0, speed, true);
    auton.settle();

    auton.drive(-12.0, speed, false);
    auton.settle();

    auton.drive(-12.0, speed, false);
    auton.settle();

    Ok(())
}

/// Turn to a few absolute headings and back to the start.
pub fn turn(auton: &Auton) -> Result<(), AutonError> {
    let speed = auton.params().turn_speed;

    for angle_deg in &[90.0, 45.0, 0.0] {
        auton.turn_to(*angle_deg, speed);
        auton.settle();
    }

    Ok(())
}

pub fn drive_and_turn(auton: &Auton) -> Result<(), AutonError> {
    let p = auton.params();

    auton.drive(24.0, p.drive_speed, true);
    auton.settle();

    for angle_deg in &[45.0, -45.0, 0.0] {
        auton.turn_to(*angle_deg, p.turn_speed);
        auton.settle();
    }

    auton.drive(-24.0, p.drive_speed, true);
    auton.settle();

    Ok(())
}

/// Start drives slowly and speed up once 6 inches have been covered.
pub fn wait_until_change_speed(auton: &Auton) -> Result<(), AutonError> {
    let p = auton.params();
    let slow = Speed(30);

    auton.drive(24.0, slow, true);
    auton.wait(ChainMode::DistanceTriggered(6.0));
    auton.set_speed_cap(p.drive_speed);
    auton.settle();

    for angle_deg in &[45.0, -45.0, 0.0] {
        auton.turn_to(*angle_deg, p.turn_speed);
        auton.settle();
    }

    auton.drive(-24.0, slow, true);
    auton.wait(ChainMode::DistanceTriggered(-6.0));
    auton.set_speed_cap(p.drive_speed);
    auton.settle();

    Ok(())
}

/// Swing out and back on each side.
pub fn swing(auton: &Auton) -> Result<(), AutonError> {
    let p = auton.params();

    let swings = [
        (SwingSide::Left, 45.0),
        (SwingSide::Right, 0.0),
        (SwingSide::Right, 45.0),
        (SwingSide::Left, 0.0),
    ];

    for (side, angle_deg) in &swings {
        auton.swing(*side, *angle_deg, p.swing_speed, p.swing_opposite_speed);
        auton.settle();
    }

    Ok(())
}

/// Blend the turns into each other, settling only on the last.
pub fn motion_chaining(auton: &Auton) -> Result<(), AutonError> {
    let p = auton.params();

    auton.drive(24.0, p.drive_speed, true);
    auton.settle();

    auton.turn_to(45.0, p.turn_speed);
    auton.wait(ChainMode::QuickChain);

    auton.turn_to(-45.0, p.turn_speed);
    auton.wait(ChainMode::QuickChain);

    auton.turn_to(0.0, p.turn_speed);
    auton.settle();

    auton.drive(-24.0, p.drive_speed, true);
    auton.settle();

    Ok(())
}

pub fn combining_movements(auton: &Auton) -> Result<(), AutonError> {
    let p = auton.params();

    auton.drive(24.0, p.drive_speed, true);
    auton.settle();

    auton.turn_to(45.0, p.turn_speed);
    auton.settle();

    auton.swing(
        SwingSide::Right,
        -45.0,
        p.swing_speed,
        p.swing_opposite_speed,
    );
    auton.settle();

    auton.turn_to(0.0, p.turn_speed);
    auton.settle();

    auton.drive(-24.0, p.drive_speed, true);
    auton.settle();

    Ok(())
}

/// Drive forward and turn, backing out instead if the drive is obstructed.
pub fn interference(auton: &Auton) -> Result<(), AutonError> {
    let p = auton.params();

    auton.drive(24.0, p.drive_speed, true);
    auton.settle();

    if auton.chassis().is_interfered() {
        let outcome = auton.recover_from_interference();
        if !outcome.is_recovered() {
            warn!("Routine abandoned with the robot still obstructed");
        }
        return Ok(());
    }

    auton.turn_to(90.0, p.turn_speed);
    auton.settle();

    Ok(())
}

/// Visit a few points in the field frame and return to the origin.
pub fn navigate_to_coordinates(auton: &Auton) -> Result<(), AutonError> {
    auton.chassis().reset_pose();
    auton.chassis().reset_heading_reference();

    auton.navigate_to(24.0, 36.0)?;
    auton.navigate_with_speed(48.0, 24.0, Speed(100))?;
    auton.navigate(36.0, 48.0, Some(auton.params().drive_speed), Some(90.0))?;
    auton.navigate_to(0.0, 0.0)?;

    Ok(())
}
