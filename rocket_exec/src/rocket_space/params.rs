//! Parameters structure for RocketSpace

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::input::AxisRange;
use serde::{Deserialize, Serialize};
use util::maths::clamp;

use super::{Position, RocketSpaceError, NUM_TOWERS};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// An axis aligned box in rig space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Position,
    pub max: Position,
}

/// Fixed geometry of one tower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TowerParams {
    /// Position of the cable pulley at the top of the tower.
    ///
    /// Units: micrometers
    pub position: Position,

    /// Offset of the cable's attachment on the rocket from the rocket's origin.
    ///
    /// Units: micrometers
    pub mount: Position,
}

/// Parameters for the rocket space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Params {
    // ---- GEOMETRY ----

    /// Envelope the mechanism can physically reach, used in simulate mode.
    pub mech_box: BoundingBox,

    /// Envelope the rocket is allowed to fly in during a game.
    pub game_box: BoundingBox,

    /// Tower geometry in NW, NE, SW, SE order.
    pub towers: [TowerParams; NUM_TOWERS],

    /// Resting position on the landing pad.
    pub home: Position,

    /// Position the rocket is hand-placed at during homing calibration.
    pub calibrate: Position,

    /// Height games start at.
    ///
    /// Units: micrometers
    pub start_z_um: i32,

    /// Cable travel per motor step.
    ///
    /// Units: tenths of a micrometer per step
    pub um10_per_step: i32,

    /// Seed for the cable length square roots.
    pub sqrt_seed: u32,

    // ---- CONTROLS ----

    pub axis_xy: AxisRange,
    pub axis_z: AxisRange,

    // ---- DYNAMICS ----

    /// Change in X/Y velocity per tick while thrusting.
    ///
    /// Units: micrometers/tick
    pub thrust_inc_xy_um: i32,

    /// Change in X/Y position per tick while moving in free move mode.
    ///
    /// Units: micrometers/tick
    pub move_inc_xy_um: i32,

    /// Change in Z velocity per tick for each joystick count beyond the dead zone.
    ///
    /// Units: micrometers/tick/count
    pub thrust_inc_z_um: i32,

    /// Downward change in velocity per tick under normal gravity.
    ///
    /// Units: micrometers/tick
    pub gravity_um: i32,

    /// Largest vertical speed at touch down which still counts as a landing.
    ///
    /// Units: micrometers/tick
    pub safe_landing_um: i32,

    // ---- FUEL ----

    /// Fuel at the start of a game under the normal fuel option.
    pub fuel_supply_init: i32,

    /// Fuel used per tick of X thrust.
    pub fuel_cost_x: i32,

    /// Fuel used per tick of Y thrust.
    pub fuel_cost_y: i32,

    /// Fuel used per tick of Z thrust.
    pub fuel_cost_z: i32,

    /// Level below which unlimited fuel is topped back up.
    pub fuel_low_water: i32,

    // ---- CALIBRATION ----

    /// Motor steps applied per tick when jogging a tower during homing.
    pub calibrate_step_inc: i32,

    /// Radius of the ring of position target points around the centre.
    ///
    /// Units: micrometers
    pub target_radius_um: i32,

    /// Height of the position target points.
    ///
    /// Units: micrometers
    pub target_z_um: i32,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl BoundingBox {
    pub const fn new(min: Position, max: Position) -> Self {
        Self { min, max }
    }

    /// Clamp a position into the box, per axis.
    pub fn clamp(&self, p: Position) -> Position {
        Position::new(
            clamp(p.x, self.min.x, self.max.x),
            clamp(p.y, self.min.y, self.max.y),
            clamp(p.z, self.min.z, self.max.z),
        )
    }

    pub fn contains(&self, p: &Position) -> bool {
        self.clamp(*p) == *p
    }

    fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }
}

impl Params {
    /// Check the parameters are usable.
    pub fn validate(&self) -> Result<(), RocketSpaceError> {
        if self.um10_per_step <= 0 {
            return Err(RocketSpaceError::InvalidStepScale(self.um10_per_step));
        }
        if !self.mech_box.is_valid() {
            return Err(RocketSpaceError::InvalidBox("mechanical"));
        }
        if !self.game_box.is_valid() {
            return Err(RocketSpaceError::InvalidBox("game"));
        }
        Ok(())
    }
}

impl Default for Params {
    /// The geometry of the standard rig, matching `params/rocket_space.toml`.
    fn default() -> Self {
        const TOP: i32 = 600_000;
        const EDGE: i32 = 300_000;
        const MOUNT_XY: i32 = 20_000;
        const MOUNT_Z: i32 = 30_000;

        let tower = |sx: i32, sy: i32| TowerParams {
            position: Position::new(sx * EDGE, sy * EDGE, TOP),
            mount: Position::new(sx * MOUNT_XY, sy * MOUNT_XY, MOUNT_Z),
        };

        Self {
            mech_box: BoundingBox::new(
                Position::new(-EDGE, -EDGE, 0),
                Position::new(EDGE, EDGE, 500_000),
            ),
            game_box: BoundingBox::new(
                Position::new(-250_000, -250_000, 0),
                Position::new(250_000, 250_000, 450_000),
            ),
            towers: [tower(-1, 1), tower(1, 1), tower(-1, -1), tower(1, -1)],
            home: Position::new(0, 0, 0),
            calibrate: Position::new(0, 0, 200_000),
            start_z_um: 400_000,
            um10_per_step: 1000,
            sqrt_seed: 500,
            axis_xy: AxisRange::JOYSTICK_XY,
            axis_z: AxisRange::JOYSTICK_Z,
            thrust_inc_xy_um: 500,
            move_inc_xy_um: 1000,
            thrust_inc_z_um: 5,
            gravity_um: 1000,
            safe_landing_um: 5000,
            fuel_supply_init: 2000,
            fuel_cost_x: 1,
            fuel_cost_y: 1,
            fuel_cost_z: 2,
            fuel_low_water: 100,
            calibrate_step_inc: 10,
            target_radius_um: 200_000,
            target_z_um: 100_000,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_valid() {
        let p = Params::default();
        assert!(p.validate().is_ok());

        // Game envelope must sit inside the mechanical one
        assert!(p.mech_box.contains(&p.game_box.min));
        assert!(p.mech_box.contains(&p.game_box.max));
    }

    #[test]
    fn test_invalid() {
        let mut p = Params::default();
        p.um10_per_step = 0;
        assert!(matches!(
            p.validate(),
            Err(RocketSpaceError::InvalidStepScale(0))
        ));

        let mut p = Params::default();
        p.game_box.min.z = 1_000_000;
        assert!(matches!(p.validate(), Err(RocketSpaceError::InvalidBox("game"))));
    }

    #[test]
    fn test_shipped_file() {
        let p: Params =
            util::params::from_str(include_str!("../../../params/rocket_space.toml")).unwrap();
        assert_eq!(p, Params::default());
    }

    #[test]
    fn test_clamp() {
        let b = Params::default().game_box;
        assert_eq!(
            b.clamp(Position::new(-900_000, 10, 900_000)),
            Position::new(-250_000, 10, 450_000)
        );
    }
}
