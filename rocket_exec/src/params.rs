//! # Rocket Executable Parameters
//!
//! This module provide parameters for the rocket executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::motor::DEFAULT_MOTOR_ADDRESS;
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RocketExecParams {
    /// Target period of one control tick.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Log every rendered display as a box, with its key targets
    pub verbose: bool,

    /// Send frames to the motor controller, otherwise the bus is simulated
    pub hardware_enabled: bool,

    /// Address of the motor controller on the bus
    pub motor_address: u16,

    /// I2C bus the motor controller is attached to
    pub i2c_bus: u8,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for RocketExecParams {
    fn default() -> Self {
        Self {
            cycle_period_s: 0.2,
            verbose: true,
            hardware_enabled: false,
            motor_address: DEFAULT_MOTOR_ADDRESS,
            i2c_bus: 1,
        }
    }
}
