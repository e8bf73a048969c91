//! Test menu diagnostics
//!
//! Input readout, the sanity test, the simulation readouts and the motor exercises. The simulation
//! runs in free move inside the mechanical envelope and never sends anything to the motors.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::{
    cue::Cue,
    motor::{MotorCmd, NUM_TOWERS},
};
use log::info;
use util::maths::integer_sqrt;

use super::{GameConfig, Rocket};
use crate::{
    rocket_space::{MotionMode, Position, TowerId},
    state_mach::{Goto, StateId, StateMachine},
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Motor steps in one revolution.
pub(super) const STEPS_PER_REV: i32 = 200;

/// Largest step count the motor set test presets before starting again.
const MOTOR_SET_MAX: i32 = 0x10_0000;

/// Square root sweeps: the largest cable length in cm, the largest squared length in mm, and the
/// largest squared length in tenths of a mm.
const SQRT_SWEEPS: [(u32, &str); 3] = [
    (21_325, "max cm"),
    (682_400, "(max mm)^2"),
    (68_240_000, "(max mm*10)^2"),
];

/// Points in each square root sweep.
const SQRT_SWEEP_POINTS: u32 = 32;

/// Lines between repeats of the simulation table header.
const SIM_HEADER_EVERY: u32 = 10;

/// Offset of each move in the cable step walks.
///
/// Units: micrometers
const WALK_STEP_UM: i32 = 1000;

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Rocket {
    pub(super) fn test_enter(&mut self, _: &mut StateMachine) -> Option<Goto> {
        self.cue(Cue::Quiet);
        None
    }

    pub(super) fn io_state_loop(&mut self, _: &mut StateMachine) -> Option<Goto> {
        let c = &self.control;
        info!(
            "[I/O] X={:3} Y={:3} Z={:3} A={} B={}",
            c.analog_x, c.analog_y, c.analog_z, c.button_a as u8, c.button_b as u8
        );
        None
    }

    pub(super) fn test_motor_status_loop(&mut self, fsm: &mut StateMachine) -> Option<Goto> {
        let status = self.space.link.read_status();
        fsm.set_line(0, &format!("Status={:4}", status));
        fsm.render();
        None
    }

    // ---- SANITY TEST ----

    /// Check the state table and exercise the maths, then put everything back as it was.
    pub(super) fn test_sanity_enter(&mut self, fsm: &mut StateMachine) -> Option<Goto> {
        let snapshot = self.space.snapshot();
        let position = self.space.state.position;
        self.space
            .init_game(position, &GameConfig::free_move(), MotionMode::Simulate);

        let report = fsm.validate(self);

        info!("Rocket(x,y,z)={} in uM", position);
        info!("Tower  position                      mount");
        for t in self.space.towers.iter() {
            info!("{:6} {} {}", t.id, t.position, t.mount);
        }
        info!("Step scale {} um/10 per step", self.space.params.um10_per_step);

        self.sqrt_sweeps();
        self.cable_sweeps();
        self.step_walks();

        self.space.restore(snapshot);
        self.last_self_test = Some(report);

        Some(Goto::Show(StateId::MainMenu))
    }

    fn sqrt_sweeps(&self) {
        let seed = self.space.params.sqrt_seed;

        for (limit, label) in SQRT_SWEEPS.iter() {
            info!("==== sqrt test @ {} ===", label);
            let step = (limit / SQRT_SWEEP_POINTS) as usize;
            for (j, value) in (0..*limit).step_by(step).enumerate() {
                let s = integer_sqrt(value, seed);
                info!(
                    "{:4}:Sqrt({})={} ({} tries{})",
                    j,
                    value,
                    s.root,
                    s.iterations,
                    if s.converged { "" } else { ", capped" }
                );
            }
        }
    }

    /// Solve the cables above each tower and the centre, from the top of the envelope down.
    fn cable_sweeps(&mut self) {
        info!("==== Cable length calculation test ===");

        let z_max = self.space.params.mech_box.max.z;
        let mut columns: Vec<(&str, i32, i32)> = self
            .space
            .towers
            .iter()
            .map(|t| (t.id.name(), t.position.x, t.position.y))
            .collect();
        columns.push(("CN", 0, 0));

        for (name, x, y) in columns {
            let mut z = z_max;
            while z >= 0 {
                self.space.state.goal = Position::new(x, y, z);
                let l = self.space.solve_cable_lengths();
                info!(
                    "[{}] Cable({:4},{:4},{:4})={:5},{:5},{:5},{:5}",
                    name,
                    x / 1000,
                    y / 1000,
                    z / 1000,
                    l[0] / 1000,
                    l[1] / 1000,
                    l[2] / 1000,
                    l[3] / 1000
                );

                if z == 0 {
                    break;
                }
                z = (z - z_max / 4).max(0);
            }
        }
    }

    /// Walk a small square under each tower and around the centre, logging the step changes.
    fn step_walks(&mut self) {
        info!("==== Cable steps calculation test ===");

        let d = WALK_STEP_UM;
        let square = [
            Position::new(d, 0, 0),
            Position::new(d, d, 0),
            Position::new(0, d, 0),
            Position::new(0, 0, 0),
        ];

        for id in TowerId::ALL.iter() {
            info!("{}:", id);
            let origin = self.space.tower(*id).position;
            self.step_walk(origin, &square);
        }

        info!("Center:");
        let centre = Position::new(0, 0, self.space.tower(TowerId::NW).position.z / 2);
        let mut moves = square.to_vec();
        moves.push(Position::new(0, 0, d));
        moves.push(Position::new(0, 0, -d));
        self.step_walk(centre, &moves);
    }

    fn step_walk(&mut self, origin: Position, moves: &[Position]) {
        // Start exactly at the origin, outside any envelope
        self.space.state.position = origin;
        self.space.state.goal = origin;
        self.space.solve_cable_lengths();
        self.space.commit_position();

        for m in moves.iter() {
            let start = self.space.state.position;
            self.space.state.goal = origin + *m;
            self.space.solve_cable_lengths();
            let report = self.space.commit_position();

            info!(
                "Start{} Move={} Steps{:?}",
                start,
                self.space.state.position - start,
                report.step_diffs
            );
        }
    }

    // ---- SIMULATION ----

    pub(super) fn sim_meters_enter(&mut self, _: &mut StateMachine) -> Option<Goto> {
        info!("=== Rocket controls to position in game space ===");
        self.start_simulation();
        None
    }

    pub(super) fn sim_meters_loop(&mut self, millimeters: bool) -> Option<Goto> {
        self.space.advance_goal(&self.control, &self.active);

        let c = &self.control;
        let s = &self.space.state;
        let scale = if millimeters { 1000 } else { 1 };
        let unit = if millimeters { "mMeters" } else { "uMeters" };

        let header = "----------------------------   jx  jy  jz  ---    dx    dy    dz ---    newx    newy    newz ---";
        let line = format!(
            "[Thrust Joy=>Delta=>{}] ({:3},{:3},{:3}) => ({:5},{:5},{:5}) => ({:7},{:7},{:7})",
            unit,
            c.analog_x,
            c.analog_y,
            c.analog_z,
            s.delta.x / scale,
            s.delta.y / scale,
            s.delta.z / scale,
            s.goal.x / scale,
            s.goal.y / scale,
            s.goal.z / scale
        );

        self.sim_log(header, &line);
        None
    }

    pub(super) fn sim_cables_enter(&mut self, _: &mut StateMachine) -> Option<Goto> {
        info!("=== Rocket position (mM) to cable lengths (NW,NE,SW,SE) ===");
        self.start_simulation();
        None
    }

    pub(super) fn sim_cables_loop(&mut self, _: &mut StateMachine) -> Option<Goto> {
        self.space.advance_goal(&self.control, &self.active);
        let l = self.space.solve_cable_lengths();

        let g = self.space.state.goal;
        let line = format!(
            "[Pos => Cables] ({:3},{:3},{:3}) => ({:3},{:3},{:3},{:3})",
            g.x / 1000,
            g.y / 1000,
            g.z / 1000,
            l[0] / 1000,
            l[1] / 1000,
            l[2] / 1000,
            l[3] / 1000
        );

        self.sim_log("--mm------mm------ x   y   z--|--- NW  NE  SW  SE ---", &line);
        None
    }

    pub(super) fn sim_steps_enter(&mut self, _: &mut StateMachine) -> Option<Goto> {
        info!("=== Rocket position (mM) to cable steps (NW,NE,SW,SE) ===");
        self.start_simulation();
        None
    }

    pub(super) fn sim_steps_loop(&mut self, _: &mut StateMachine) -> Option<Goto> {
        self.space.advance_goal(&self.control, &self.active);
        self.space.solve_cable_lengths();

        let moved = self.space.state.goal - self.space.state.position;
        let mut length_diffs = [0; NUM_TOWERS];
        for (d, t) in length_diffs.iter_mut().zip(self.space.towers.iter()) {
            *d = t.length_goal - t.length;
        }

        // Simulate mode, nothing is sent
        let report = self.space.commit_position();

        let line = format!(
            "[PosDiff => LengthDiff,Steps] ({:5},{:5},{:5}) => {:?} {:?}",
            moved.x, moved.y, moved.z, length_diffs, report.step_diffs
        );

        self.sim_log(
            "-------------------------------    x     y     z ------ NW   NE   SW   SE --- NW   NE   SW   SE ---",
            &line,
        );
        None
    }

    pub(super) fn sim_pause_enter(&mut self, fsm: &mut StateMachine) -> Option<Goto> {
        self.resume_state = fsm.previous();
        None
    }

    pub(super) fn sim_resume_enter(&mut self, _: &mut StateMachine) -> Option<Goto> {
        Some(Goto::Show(self.resume_state))
    }

    fn start_simulation(&mut self) {
        self.active = GameConfig::free_move();
        self.space
            .init_game(self.mid_air(), &self.active, MotionMode::Simulate);
        self.sim_lines = 0;
    }

    /// Log one simulation line, repeating the table header every few lines.
    fn sim_log(&mut self, header: &str, line: &str) {
        if self.sim_lines == 0 {
            info!("{}", header);
        }
        self.sim_lines += 1;
        if self.sim_lines > SIM_HEADER_EVERY {
            self.sim_lines = 0;
        }

        info!("{}", line);
    }

    // ---- MOTOR TESTS ----

    pub(super) fn motor_next_set_enter(&mut self, _: &mut StateMachine) -> Option<Goto> {
        info!("Motor_NextSet={:#x}", self.motor_next_set);
        self.preset_step_counts(self.motor_next_set);

        self.motor_next_set = match self.motor_next_set << 1 {
            0 => 1,
            v if v > MOTOR_SET_MAX => 0,
            v => v,
        };

        Some(Goto::Show(StateId::MotorNextSet))
    }

    pub(super) fn motor_next_set_done_enter(&mut self, _: &mut StateMachine) -> Option<Goto> {
        self.preset_step_counts(0);
        Some(Goto::Show(StateId::MotorPlusStep))
    }

    /// Move every motor by `steps` then return to the `back` menu.
    pub(super) fn motor_increment(&mut self, steps: i32, back: StateId) -> Option<Goto> {
        self.space.link.send_increments([steps; NUM_TOWERS]);
        Some(Goto::Show(back))
    }

    /// Load the same step count into every tower motor, leaving the tracked towers untouched.
    fn preset_step_counts(&mut self, steps: i32) {
        let space = &mut self.space;
        for t in space.towers.iter() {
            space.link.send_position(t.address, steps);
        }
        space.link.send_command(MotorCmd::Preset);
    }
}
