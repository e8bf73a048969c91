//! # Game module
//!
//! Everything the state table's callbacks act on: the [`RocketSpace`], the options chosen in the
//! menus, the calibration compass, and the cues and readouts produced for the peripheral
//! collaborators.
//!
//! The options picked in the menus are kept apart from the configuration of the motion in
//! progress, so calibration and the diagnostics can move the rocket freely without losing the
//! player's choices.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod calibrate;
mod callbacks;
mod config;
mod diagnostics;
mod play;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use config::{FuelOption, GameConfig, GameKind, GravityOption, PlayDisplay, StartOption};

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::{
    cue::{Cue, Readouts},
    input::{ControlInputs, InputSample},
};
use log::debug;
use rand::{rngs::StdRng, SeedableRng};

use crate::{
    rocket_space::{CalibrationCompass, RocketSpace},
    state_mach::{StateId, ValidationReport},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The context every state callback runs against.
pub struct Rocket {
    pub space: RocketSpace,

    /// Options selected in the menus, used by the next game.
    pub menu: GameConfig,

    /// Configuration of the motion in progress.
    pub active: GameConfig,

    pub control: ControlInputs,

    pub compass: CalibrationCompass,

    /// Values for the LED readouts.
    pub readouts: Readouts,

    /// Findings of the last sanity test.
    pub last_self_test: Option<ValidationReport>,

    cues: Vec<Cue>,

    rng: StdRng,

    /// State the simulation returns to when resumed.
    resume_state: StateId,

    /// Step count the next motor set test presets.
    motor_next_set: i32,

    /// Lines logged since the last simulation table header.
    sim_lines: u32,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Rocket {
    pub fn new(space: RocketSpace) -> Self {
        Self::with_rng(space, StdRng::from_entropy())
    }

    /// Create a context whose random start positions are reproducible.
    pub fn with_seed(space: RocketSpace, seed: u64) -> Self {
        Self::with_rng(space, StdRng::seed_from_u64(seed))
    }

    fn with_rng(space: RocketSpace, rng: StdRng) -> Self {
        let compass = CalibrationCompass::new(&space.params);

        Self {
            space,
            menu: GameConfig::default(),
            active: GameConfig::free_move(),
            control: ControlInputs::default(),
            compass,
            readouts: Readouts::default(),
            last_self_test: None,
            cues: Vec::new(),
            rng,
            resume_state: StateId::MainMenu,
            motor_next_set: 1,
            sim_lines: 0,
        }
    }

    /// Apply a new sample from the input collaborator.
    pub fn apply_inputs(&mut self, sample: &InputSample) {
        self.control.apply(sample);
    }

    /// Take the cues queued since the last call.
    pub fn drain_cues(&mut self) -> Vec<Cue> {
        std::mem::take(&mut self.cues)
    }

    fn cue(&mut self, cue: Cue) {
        debug!("Cue {:?}", cue);
        self.cues.push(cue);
    }
}
