//! Joystick compass used by the calibration flows
//!
//! During homing the joystick heading picks the tower to jog and the throttle jogs it. During
//! position calibration the heading picks one of nine target points (the centre and eight points on
//! a ring around it).

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::{input::ControlInputs, motor::NUM_TOWERS};
use log::{debug, info, warn};
use util::maths::{compass_heading, cosine_scaled, sine_scaled, TRIG_SCALE};

use super::{Params, Position, TowerId};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Target point names, centre first then clockwise from north.
const TARGET_NAMES: [&str; 9] = [
    "Centr", "North", "N-Eas", "East ", "S-Eas", "South", "S-Wes", "West ", "N-Wes",
];

/// Shown when no tower is selected.
const NO_TOWER: &str = "--";

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompassCmd {
    /// Forget any selection, lock and target.
    Init,

    /// Select a tower from the stick heading and jog it with the throttle.
    CalcHome,

    CalcTilt,

    /// Select a target point from the stick heading.
    CalcPos,

    CalcCirc,

    /// Toggle the lock on the selected tower.
    Lock,

    CalcGround,
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct CalibrationCompass {
    /// Tower being jogged during homing.
    pub selected: Option<TowerId>,

    /// While locked the selected tower doesn't follow the stick.
    pub locked: bool,

    /// Step increments for this tick in NW, NE, SW, SE order.
    pub incs: [i32; NUM_TOWERS],

    /// Selected target point.
    pub target: Position,

    /// Display name of the current selection.
    pub name: &'static str,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CalibrationCompass {
    pub fn new(params: &Params) -> Self {
        Self {
            selected: None,
            locked: false,
            incs: [0; NUM_TOWERS],
            target: Position::new(0, 0, params.target_z_um),
            name: NO_TOWER,
        }
    }

    /// Run a compass command against the current inputs.
    ///
    /// Returns `false` if the command isn't supported, in which case nothing changes.
    pub fn apply(&mut self, cmd: CompassCmd, control: &ControlInputs, params: &Params) -> bool {
        match cmd {
            CompassCmd::Init => {
                *self = Self::new(params);
            }
            CompassCmd::CalcHome => self.calc_home(control, params),
            CompassCmd::CalcPos => self.calc_pos(control, params),
            CompassCmd::Lock => {
                self.locked = !self.locked;
                info!(
                    "Compass {} on tower {}",
                    if self.locked { "locked" } else { "unlocked" },
                    self.name
                );
            }
            CompassCmd::CalcTilt | CompassCmd::CalcCirc | CompassCmd::CalcGround => {
                warn!("Compass command {:?} is not supported", cmd);
                return false;
            }
        }

        true
    }

    /// True if a tower should be jogged this tick.
    pub fn has_increments(&self) -> bool {
        self.incs.iter().any(|&i| i != 0)
    }

    fn calc_home(&mut self, control: &ControlInputs, params: &Params) {
        if !self.locked {
            self.selected = stick_heading(control, params).map(|heading| match heading {
                0..=89 => TowerId::NE,
                90..=179 => TowerId::SE,
                180..=269 => TowerId::SW,
                _ => TowerId::NW,
            });
        }

        self.incs = [0; NUM_TOWERS];
        self.name = NO_TOWER;

        if let Some(tower) = self.selected {
            self.name = tower.name();
            self.incs[tower.index()] =
                params.axis_z.direction(control.analog_z) * params.calibrate_step_inc;
        }

        if self.has_increments() {
            debug!("Jogging tower {} by {:?}", self.name, self.incs);
        }
    }

    fn calc_pos(&mut self, control: &ControlInputs, params: &Params) {
        match stick_heading(control, params) {
            None => {
                self.target = Position::new(0, 0, params.target_z_um);
                self.name = TARGET_NAMES[0];
            }
            Some(heading) => {
                let r = params.target_radius_um as i64;
                let scale = TRIG_SCALE as i64;
                self.target = Position::new(
                    (r * sine_scaled(heading) as i64 / scale) as i32,
                    (r * cosine_scaled(heading) as i64 / scale) as i32,
                    params.target_z_um,
                );
                self.name = TARGET_NAMES[1 + (heading / 45) as usize % 8];
            }
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Heading of the X/Y stick, `None` while it's centred.
fn stick_heading(control: &ControlInputs, params: &Params) -> Option<i32> {
    compass_heading(
        params.axis_xy.beyond_dead_zone(control.analog_x),
        params.axis_xy.beyond_dead_zone(control.analog_y),
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::eqpt::input::InputSample;

    fn stick(x: i32, y: i32, z: i32) -> ControlInputs {
        let mut c = ControlInputs::default();
        c.apply(&InputSample {
            analog_x: x,
            analog_y: y,
            analog_z: z,
            ..Default::default()
        });
        c
    }

    #[test]
    fn test_home_select_and_jog() {
        let p = Params::default();
        let mut c = CalibrationCompass::new(&p);

        assert!(c.apply(CompassCmd::CalcHome, &stick(413, 413, 422), &p));
        assert_eq!(c.selected, None);
        assert_eq!(c.name, "--");
        assert!(!c.has_increments());

        // North-east, throttle up
        c.apply(CompassCmd::CalcHome, &stick(650, 650, 1023), &p);
        assert_eq!(c.selected, Some(TowerId::NE));
        assert_eq!(c.name, "NE");
        assert_eq!(c.incs, [0, p.calibrate_step_inc, 0, 0]);

        // South-west, throttle down
        c.apply(CompassCmd::CalcHome, &stick(200, 200, 0), &p);
        assert_eq!(c.selected, Some(TowerId::SW));
        assert_eq!(c.incs, [0, 0, -p.calibrate_step_inc, 0]);
    }

    #[test]
    fn test_lock() {
        let p = Params::default();
        let mut c = CalibrationCompass::new(&p);

        c.apply(CompassCmd::CalcHome, &stick(200, 650, 422), &p);
        assert_eq!(c.selected, Some(TowerId::NW));

        c.apply(CompassCmd::Lock, &stick(413, 413, 422), &p);
        assert!(c.locked);

        // Stick is now free to jog without changing tower
        c.apply(CompassCmd::CalcHome, &stick(650, 200, 1023), &p);
        assert_eq!(c.selected, Some(TowerId::NW));
        assert_eq!(c.incs[TowerId::NW.index()], p.calibrate_step_inc);

        c.apply(CompassCmd::Init, &stick(413, 413, 422), &p);
        assert!(!c.locked);
        assert_eq!(c.selected, None);
    }

    #[test]
    fn test_target_points() {
        let p = Params::default();
        let mut c = CalibrationCompass::new(&p);

        c.apply(CompassCmd::CalcPos, &stick(413, 413, 422), &p);
        assert_eq!(c.name, "Centr");
        assert_eq!(c.target, Position::new(0, 0, p.target_z_um));

        c.apply(CompassCmd::CalcPos, &stick(413, 650, 422), &p);
        assert_eq!(c.name, "North");
        assert_eq!(c.target, Position::new(0, p.target_radius_um, p.target_z_um));

        c.apply(CompassCmd::CalcPos, &stick(650, 413, 422), &p);
        assert_eq!(c.name, "East ");
        assert_eq!(c.target.x, p.target_radius_um);
        assert_eq!(c.target.y, 0);

        c.apply(CompassCmd::CalcPos, &stick(200, 200, 422), &p);
        assert_eq!(c.name, "S-Wes");
        assert!(c.target.x < 0 && c.target.y < 0);
        assert_eq!(c.target.x, c.target.y);
        assert_eq!(c.name.len(), 5);
    }

    #[test]
    fn test_unsupported() {
        let p = Params::default();
        let mut c = CalibrationCompass::new(&p);
        c.apply(CompassCmd::CalcHome, &stick(650, 650, 422), &p);

        assert!(!c.apply(CompassCmd::CalcTilt, &stick(413, 413, 422), &p));
        assert!(!c.apply(CompassCmd::CalcCirc, &stick(413, 413, 422), &p));
        assert!(!c.apply(CompassCmd::CalcGround, &stick(413, 413, 422), &p));
        assert_eq!(c.selected, Some(TowerId::NE));
    }
}
