//! # Input script interpreter module
//!
//! This module provides an interpreter for input scripts, allowing the rig to be driven without
//! the physical buttons and joystick. Each entry of a script is a timestamp in seconds followed by
//! an [`InputSample`] in JSON:
//!
//! ```text
//! 0.5: {"button_b": true};
//! 0.7: {};
//! 2.0: {"analog_z": 1023};
//! ```
//!
//! A sample stays applied until the next one is due.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::fs;
use regex::RegexBuilder;
use thiserror::Error;

// Internal
use comms_if::eqpt::input::InputSample;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An input sample which is scripted to occur at a specific time.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedInput {
    /// The time the sample becomes current
    pub exec_time_s: f64,

    /// The sample to apply
    pub sample: InputSample
}

/// A script interpreter.
///
/// After initialising with the path to the script use `.get_pending` to
/// acquire the sample that should be applied now.
pub struct ScriptInterpreter {
    script_path: PathBuf,
    inputs: VecDeque<ScriptedInput>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0:?}")]
    ScriptNotFound(PathBuf),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("Could not build the script pattern: {0}")]
    InvalidPattern(regex::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error(
        "Script contains an invalid timestamp: {0}. \
        Should be a float (like 1.0)")]
    InvalidTimestamp(String),

    #[error("Script contains an invalid input sample at {0} s: {1}")]
    InvalidSample(f64, serde_json::Error)
}

#[derive(Debug, PartialEq)]
pub enum PendingInput {
    None,
    Some(InputSample),
    EndOfScript
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ScriptInterpreter {

    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {

        // Get the path in a buffer
        let path = PathBuf::from(script_path.as_ref());

        // Check that the script file exists.
        if !path.exists() {
            return Err(ScriptError::ScriptNotFound(path));
        }

        // Load the script into a string
        let script = fs::read_to_string(&path)
            .map_err(ScriptError::ScriptLoadError)?;

        let inputs = Self::parse(&script)?;

        Ok(ScriptInterpreter {
            script_path: path,
            inputs
        })
    }

    /// Parse the text of a script into its timed samples.
    pub fn parse(script: &str) -> Result<VecDeque<ScriptedInput>, ScriptError> {
        let mut inputs: VecDeque<ScriptedInput> = VecDeque::new();

        // Go through the script executing __the magic regex__.
        let re = RegexBuilder::new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
            .map_err(ScriptError::InvalidPattern)?;

        for cap in re.captures_iter(script) {
            let time_str = cap.get(1).map(|m| m.as_str()).unwrap_or("");
            let payload = cap.get(3).map(|m| m.as_str()).unwrap_or("");

            // Parse the exec time
            let exec_time_s: f64 = time_str
                .parse()
                .map_err(|e| ScriptError::InvalidTimestamp(format!("{}", e)))?;

            // Parse the sample from the payload. The scripts contain JSON only.
            let sample = InputSample::from_json(payload)
                .map_err(|e| ScriptError::InvalidSample(exec_time_s, e))?;

            inputs.push_back(ScriptedInput {
                exec_time_s,
                sample
            });
        }

        if inputs.is_empty() {
            return Err(ScriptError::ScriptEmpty)
        }

        Ok(inputs)
    }

    /// Return the latest sample which has become due by `current_time_s`.
    ///
    /// If several samples became due since the last call only the last one
    /// is returned, the inputs are levels not events.
    pub fn get_pending(&mut self, current_time_s: f64) -> PendingInput {

        // If the queue is empty the script is over
        if self.inputs.is_empty() {
            return PendingInput::EndOfScript
        }

        let mut latest = None;

        while let Some(front) = self.inputs.front() {
            if front.exec_time_s > current_time_s {
                break;
            }
            latest = self.inputs.pop_front().map(|i| i.sample);
        }

        match latest {
            Some(s) => PendingInput::Some(s),
            None => PendingInput::None
        }
    }

    /// Get the number of samples left in the script
    pub fn get_num_inputs(&self) -> usize {
        self.inputs.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        match self.inputs.back() {
            Some(c) => c.exec_time_s,
            None => 0f64
        }
    }

    /// Path the script was loaded from
    pub fn path(&self) -> &Path {
        &self.script_path
    }
}
