//! # Rocket library.
//!
//! This library allows other crates in the workspace to access items defined inside the rocket
//! crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Game module - menu options, game play, calibration and diagnostics callbacks
pub mod game;

/// Executable parameters
pub mod params;

/// Rocket space module - the fixed-point kinematics engine driving the four tower motors
pub mod rocket_space;

/// State machine module - the table driven menu and game state machine
pub mod state_mach;
