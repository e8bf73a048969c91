//! # Equipment Interface
//!
//! This module defines the interface structures which are exchanged with the rig's equipment.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod cue;
pub mod display;
pub mod input;
pub mod motor;

#[cfg(all(target_arch = "arm", target_os = "linux", target_env = "gnu"))]
pub mod i2c_bus;
