//! # Human input interface
//!
//! The input collaborator samples two push buttons and a three axis analog joystick. The control
//! core only ever sees the [`InputSample`] snapshots it hands over, folded into [`ControlInputs`]
//! which also carries the previous button levels for edge detection.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Raw range of one analog axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: i32,
    pub mid: i32,
    pub max: i32,

    /// Deviation from `mid` below which the axis reads as centred.
    pub dead_zone: i32,
}

/// One snapshot from the input collaborator.
///
/// Missing fields deserialise to released buttons and a centred joystick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSample {
    pub button_a: bool,
    pub button_b: bool,
    pub analog_x: i32,
    pub analog_y: i32,
    pub analog_z: i32,
}

/// Inputs as consumed by the control core each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlInputs {
    pub button_a: bool,
    pub button_b: bool,

    /// Level of button A when the edge was last accepted.
    pub button_a_prev: bool,

    /// Level of button B when the edge was last accepted.
    pub button_b_prev: bool,

    pub analog_x: i32,
    pub analog_y: i32,
    pub analog_z: i32,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl AxisRange {
    /// Grove thumb joystick X and Y axes.
    pub const JOYSTICK_XY: AxisRange = AxisRange {
        min: 200,
        mid: 413,
        max: 650,
        dead_zone: 40,
    };

    /// Throttle (Z) axis.
    pub const JOYSTICK_Z: AxisRange = AxisRange {
        min: 0,
        mid: 422,
        max: 1023,
        dead_zone: 40,
    };

    /// Clamp a raw reading into the axis range.
    pub fn clamp(&self, raw: i32) -> i32 {
        raw.max(self.min).min(self.max)
    }

    /// Signed deviation of a (clamped) reading from the centre.
    pub fn deviation(&self, raw: i32) -> i32 {
        self.clamp(raw) - self.mid
    }

    /// Ternary direction of a reading: -1, 0 inside the dead zone, or 1.
    pub fn direction(&self, raw: i32) -> i32 {
        let dev = self.deviation(raw);
        if dev < -self.dead_zone {
            -1
        }
        else if dev > self.dead_zone {
            1
        }
        else {
            0
        }
    }

    /// Deviation beyond the dead zone, zero inside it.
    pub fn beyond_dead_zone(&self, raw: i32) -> i32 {
        let dev = self.deviation(raw);
        match self.direction(raw) {
            -1 => dev + self.dead_zone,
            1 => dev - self.dead_zone,
            _ => 0,
        }
    }
}

impl InputSample {
    /// Parse a sample from its JSON form, for example `{"button_a": true}`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Default for InputSample {
    fn default() -> Self {
        Self {
            button_a: false,
            button_b: false,
            analog_x: AxisRange::JOYSTICK_XY.mid,
            analog_y: AxisRange::JOYSTICK_XY.mid,
            analog_z: AxisRange::JOYSTICK_Z.mid,
        }
    }
}

impl ControlInputs {
    /// Take on the levels of a new sample, leaving the previous-level latches untouched.
    pub fn apply(&mut self, sample: &InputSample) {
        self.button_a = sample.button_a;
        self.button_b = sample.button_b;
        self.analog_x = sample.analog_x;
        self.analog_y = sample.analog_y;
        self.analog_z = sample.analog_z;
    }

    pub fn a_rising(&self) -> bool {
        self.button_a && !self.button_a_prev
    }

    pub fn b_rising(&self) -> bool {
        self.button_b && !self.button_b_prev
    }

    /// Both buttons are down and at least one of them has just gone down.
    pub fn both_rising(&self) -> bool {
        self.button_a && self.button_b && (self.a_rising() || self.b_rising())
    }
}

impl Default for ControlInputs {
    fn default() -> Self {
        let mut c = Self {
            button_a: false,
            button_b: false,
            button_a_prev: false,
            button_b_prev: false,
            analog_x: 0,
            analog_y: 0,
            analog_z: 0,
        };
        c.apply(&InputSample::default());
        c
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_axis() {
        let xy = AxisRange::JOYSTICK_XY;

        assert_eq!(xy.clamp(0), 200);
        assert_eq!(xy.clamp(9999), 650);
        assert_eq!(xy.deviation(413), 0);

        assert_eq!(xy.direction(413 + 40), 0);
        assert_eq!(xy.direction(413 + 41), 1);
        assert_eq!(xy.direction(413 - 41), -1);
        assert_eq!(xy.direction(-5000), -1);

        assert_eq!(xy.beyond_dead_zone(413 + 50), 10);
        assert_eq!(xy.beyond_dead_zone(413 - 50), -10);
        assert_eq!(xy.beyond_dead_zone(413 + 5), 0);
    }

    #[test]
    fn test_sample_json() {
        let s = InputSample::from_json(r#"{"button_a": true, "analog_z": 1023}"#).unwrap();

        assert!(s.button_a);
        assert!(!s.button_b);
        assert_eq!(s.analog_x, AxisRange::JOYSTICK_XY.mid);
        assert_eq!(s.analog_z, 1023);

        assert!(InputSample::from_json("{\"button_a\": 3}").is_err());
    }

    #[test]
    fn test_edges() {
        let mut c = ControlInputs::default();
        assert!(!c.a_rising());

        c.apply(&InputSample {
            button_a: true,
            ..Default::default()
        });
        assert!(c.a_rising());
        assert!(!c.both_rising());

        c.button_a_prev = true;
        c.apply(&InputSample {
            button_a: true,
            button_b: true,
            ..Default::default()
        });
        assert!(!c.a_rising());
        assert!(c.b_rising());
        assert!(c.both_rising());
    }
}
