//! # Rocket space module
//!
//! The kinematics and motion engine of the rig. The rocket hangs from four cables, one from the top
//! of each corner tower. Each control tick the engine:
//!
//! 1. integrates joystick thrust, gravity and fuel into a new goal position
//!    ([`RocketSpace::advance_goal`]),
//! 2. solves the four cable lengths for that goal ([`RocketSpace::solve_cable_lengths`]),
//! 3. commits the goal as the current position, converting the lengths to motor step counts and
//!    sending the per-tower step deltas to the motor controller ([`RocketSpace::commit_position`]).
//!
//! All positions and lengths are integer micrometers, all tower motion is integer steps.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod compass;
mod link;
mod params;
mod space;
mod tower;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use compass::{CalibrationCompass, CompassCmd};
pub use link::MotorLink;
pub use params::{BoundingBox, Params, TowerParams};
pub use space::{
    AdvanceReport, CommitReport, RocketSpace, SpaceInput, SpaceOutput, SpaceSnapshot, SpaceState,
    StatusReport,
};
pub use comms_if::eqpt::motor::NUM_TOWERS;
pub use tower::{Tower, TowerId};

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A point in rig space.
///
/// Units: micrometers. X is east, Y is north, Z is up from the floor of the play area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// How the engine treats the rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionMode {
    /// Positions are computed inside the mechanical envelope but increments are never sent.
    Simulate,

    /// Positions are kept inside the game envelope and increments are sent to the motors.
    Play,
}

#[derive(Debug, Error)]
pub enum RocketSpaceError {
    #[error("Could not load the rocket space parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("The step scale must be positive, found {0} tenths of a micrometer per step")]
    InvalidStepScale(i32),

    #[error("The {0} bounding box has a minimum above its maximum")]
    InvalidBox(&'static str),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Position {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

impl std::ops::Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        Position::new(
            self.x.saturating_add(rhs.x),
            self.y.saturating_add(rhs.y),
            self.z.saturating_add(rhs.z),
        )
    }
}

impl std::ops::Sub for Position {
    type Output = Position;

    fn sub(self, rhs: Position) -> Position {
        Position::new(
            self.x.saturating_sub(rhs.x),
            self.y.saturating_sub(rhs.y),
            self.z.saturating_sub(rhs.z),
        )
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:7}, {:7}, {:7})", self.x, self.y, self.z)
    }
}
