//! # Peripheral cues and readouts
//!
//! The LED, seven segment and sound peripherals are driven by an external collaborator. The game
//! logic only queues [`Cue`]s and keeps the numeric [`Readouts`] current.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// One-shot events for the sound and lighting collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cue {
    /// Back at the main menu.
    Ready,

    /// A game has started.
    Play,

    /// Landed too fast.
    Crash,

    /// Landed safely.
    Win,

    /// Silence everything, for example on shutdown.
    Quiet,
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Values shown on the three numeric LED readouts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Readouts {
    pub fuel: i32,
    pub height: i32,
    pub speed: i32,
}
