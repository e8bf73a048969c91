//! # Communications interface crate.
//!
//! Provides the interfaces between the rocket control core and its external
//! collaborators: the actuator bus, the text display, the human input devices
//! and the LED/sound peripherals.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Frame and data definitions for equipment (like the tower motors)
pub mod eqpt;
