//! Cable towers

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::motor::TOWER_ADDRESSES;
use log::warn;
use serde::Serialize;
use util::maths::{integer_sqrt, micro_to_milli, micro_to_steps, UM_PER_MM};

use super::{Position, TowerParams, NUM_TOWERS};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Identifies one of the four corner towers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TowerId {
    NW,
    NE,
    SW,
    SE,
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// One cable tower and the state of its cable.
#[derive(Debug, Clone, Serialize)]
pub struct Tower {
    pub id: TowerId,

    /// Pulley position, units: micrometers
    pub position: Position,

    /// Attachment offset on the rocket, units: micrometers
    pub mount: Position,

    /// Address byte used in absolute position frames.
    pub address: u8,

    /// Committed cable length, units: micrometers
    pub length: i32,

    /// Cable length for the goal position, units: micrometers
    pub length_goal: i32,

    /// Committed motor position, always the step conversion of `length`.
    pub step_count: i32,

    /// Change in `step_count` made by the last commit.
    pub step_diff: i32,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TowerId {
    /// All towers, in bus order.
    pub const ALL: [TowerId; NUM_TOWERS] = [TowerId::NW, TowerId::NE, TowerId::SW, TowerId::SE];

    pub fn index(self) -> usize {
        match self {
            TowerId::NW => 0,
            TowerId::NE => 1,
            TowerId::SW => 2,
            TowerId::SE => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TowerId::NW => "NW",
            TowerId::NE => "NE",
            TowerId::SW => "SW",
            TowerId::SE => "SE",
        }
    }
}

impl std::fmt::Display for TowerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Tower {
    pub fn new(id: TowerId, params: &TowerParams) -> Self {
        Self {
            id,
            position: params.position,
            mount: params.mount,
            address: TOWER_ADDRESSES[id.index()],
            length: 0,
            length_goal: 0,
            step_count: 0,
            step_diff: 0,
        }
    }

    /// Compute the cable length needed for the rocket to be at `goal` and store it as the goal
    /// length.
    ///
    /// The components are reduced to millimeters before squaring so the sum of squares fits in 32
    /// bits for any position in the envelope. The result therefore has millimeter resolution.
    pub fn solve(&mut self, goal: &Position, sqrt_seed: u32) -> i32 {
        let cable = *goal + self.mount - self.position;

        let x = micro_to_milli(cable.x) as i64;
        let y = micro_to_milli(cable.y) as i64;
        let z = micro_to_milli(cable.z) as i64;

        let sum = x * x + y * y + z * z;
        let sum = if sum > u32::MAX as i64 {
            warn!("Cable for tower {} is out of range ({} mm²)", self.id, sum);
            u32::MAX
        }
        else {
            sum as u32
        };

        let root = integer_sqrt(sum, sqrt_seed);
        if !root.converged {
            warn!("Cable length for tower {} is approximate", self.id);
        }

        self.length_goal = (root.root as i32).saturating_mul(UM_PER_MM);
        self.length_goal
    }

    /// Move the tower to its goal length, recording the step change.
    pub fn commit(&mut self, um10_per_step: i32) -> i32 {
        let step_goal = micro_to_steps(self.length_goal, um10_per_step);

        self.step_diff = step_goal - self.step_count;
        self.step_count = step_goal;
        self.length = self.length_goal;

        self.step_diff
    }

    /// Declare the tower to already be at its goal length, without any step change.
    pub fn preset(&mut self, um10_per_step: i32) {
        self.length = self.length_goal;
        self.step_count = micro_to_steps(self.length, um10_per_step);
        self.step_diff = 0;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn tower() -> Tower {
        Tower::new(
            TowerId::NE,
            &TowerParams {
                position: Position::new(300_000, 300_000, 600_000),
                mount: Position::new(20_000, 20_000, 30_000),
            },
        )
    }

    #[test]
    fn test_solve_vertical() {
        let mut t = tower();

        // Attachment directly under the pulley, only the vertical component remains
        let goal = Position::new(280_000, 280_000, 170_000);
        assert_eq!(t.solve(&goal, 500), 400_000);
        assert_eq!(t.length_goal, 400_000);
    }

    #[test]
    fn test_solve_diagonal() {
        let mut t = tower();

        // 3-4-5 triangle in X/Z
        let goal = Position::new(280_000 - 300_000, 280_000, 570_000 - 400_000);
        assert_eq!(t.solve(&goal, 500), 500_000);

        // Sub-millimeter offsets are truncated away
        let goal = Position::new(280_000 - 300_400, 280_000, 570_000 - 400_900);
        assert_eq!(t.solve(&goal, 500), 500_000);
    }

    #[test]
    fn test_commit_preset() {
        let mut t = tower();
        t.length_goal = 500_000;
        t.preset(1000);
        assert_eq!(t.step_count, 5000);
        assert_eq!(t.step_diff, 0);

        t.length_goal = 499_000;
        assert_eq!(t.commit(1000), -10);
        assert_eq!(t.length, 499_000);
        assert_eq!(t.step_count, 4990);

        // Step count always follows the committed length
        assert_eq!(t.step_count, micro_to_steps(t.length, 1000));
    }

    #[test]
    fn test_ids() {
        for (i, id) in TowerId::ALL.iter().enumerate() {
            assert_eq!(id.index(), i);
        }
        assert_eq!(tower().address, b'2');
    }
}
