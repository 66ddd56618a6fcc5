//! # Autonomous library.
//!
//! This library allows other crates in the workspace to access the autonomous sequencer and the
//! simulated chassis defined inside the autonomous exec crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Autonomy module - sequences motions, recovers from interference and navigates to coordinates
pub mod auto;

/// Simulated chassis - a host-side motion controller driving a kinematic drivetrain model
pub mod sim_chassis;
