//! Game configuration selected from the options menus

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The options of the current (or next) game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub kind: GameKind,
    pub fuel: FuelOption,
    pub gravity: GravityOption,
    pub start: StartOption,
    pub display: PlayDisplay,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameKind {
    /// Vertical landing only, the X/Y stick is ignored.
    ZLand,

    /// Full three axis landing.
    XyzLand,

    /// Free flight, the game never ends by landing.
    XyzFlight,

    /// Landing with the same rules as `XyzLand`, selected from its own menu entry.
    XyzAuto,

    /// Free positioning without inertia, gravity or fuel cost.
    XyzMove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FuelOption {
    Normal,
    Low,
    NoLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GravityOption {
    Normal,
    High,
    None,
    Negative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartOption {
    Center,
    Random,
}

/// What the display shows during play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayDisplay {
    /// Position in moon centimeters, speed and fuel.
    Normal,

    /// Raw position in millimeters and fuel.
    RawXyzf,

    /// Cable lengths in millimeters.
    RawCable,

    /// Motor step counts.
    RawSteps,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            kind: GameKind::XyzLand,
            fuel: FuelOption::Normal,
            gravity: GravityOption::Normal,
            start: StartOption::Center,
            display: PlayDisplay::Normal,
        }
    }
}

impl GameConfig {
    /// Configuration for moving the rocket around outside of a game, as used by calibration and
    /// the diagnostics.
    pub fn free_move() -> Self {
        Self {
            kind: GameKind::XyzMove,
            fuel: FuelOption::NoLimit,
            gravity: GravityOption::None,
            ..Self::default()
        }
    }

    /// Configuration with the given fuel and gravity options, keeping the rest.
    pub fn with_physics(self, fuel: FuelOption, gravity: GravityOption) -> Self {
        Self {
            fuel,
            gravity,
            ..self
        }
    }
}

impl GameKind {
    /// Game number as shown to the player.
    pub fn number(self) -> u8 {
        match self {
            GameKind::ZLand => 1,
            GameKind::XyzLand => 2,
            GameKind::XyzFlight => 3,
            GameKind::XyzAuto => 4,
            GameKind::XyzMove => 5,
        }
    }

    /// If the game ends when the rocket reaches the ground.
    pub fn ends_on_landing(self) -> bool {
        self != GameKind::XyzFlight
    }

    /// If the X/Y stick moves the rocket.
    pub fn uses_xy(self) -> bool {
        self != GameKind::ZLand
    }
}

impl FuelOption {
    /// Fuel at the start of a game given the normal supply.
    pub fn supply(self, normal: i32) -> i32 {
        match self {
            FuelOption::Normal => normal,
            FuelOption::Low => normal / 2,
            FuelOption::NoLimit => normal.saturating_mul(10),
        }
    }
}

impl GravityOption {
    /// Change in Z velocity per tick given the normal gravity magnitude.
    pub fn accel(self, normal: i32) -> i32 {
        match self {
            GravityOption::Normal => -normal,
            GravityOption::High => -2 * normal,
            GravityOption::None => 0,
            GravityOption::Negative => normal,
        }
    }
}

impl PlayDisplay {
    /// The next display in the cycle.
    pub fn next(self) -> Self {
        match self {
            PlayDisplay::Normal => PlayDisplay::RawXyzf,
            PlayDisplay::RawXyzf => PlayDisplay::RawCable,
            PlayDisplay::RawCable => PlayDisplay::RawSteps,
            PlayDisplay::RawSteps => PlayDisplay::Normal,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_fuel_supply() {
        assert_eq!(FuelOption::Normal.supply(2000), 2000);
        assert_eq!(FuelOption::Low.supply(2000), 1000);
        assert_eq!(FuelOption::NoLimit.supply(2000), 20000);
    }

    #[test]
    fn test_gravity() {
        assert_eq!(GravityOption::Normal.accel(10), -10);
        assert_eq!(GravityOption::High.accel(10), -20);
        assert_eq!(GravityOption::None.accel(10), 0);
        assert_eq!(GravityOption::Negative.accel(10), 10);
    }

    #[test]
    fn test_display_cycle() {
        let mut d = PlayDisplay::Normal;
        for _ in 0..4 {
            d = d.next();
        }
        assert_eq!(d, PlayDisplay::Normal);
        assert_eq!(PlayDisplay::RawCable.next(), PlayDisplay::RawSteps);
    }
}
