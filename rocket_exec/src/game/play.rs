//! Main menu, options, game play and shutdown

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::{
    cue::Cue,
    motor::{MotorCmd, PROGRESS_DONE},
};
use log::{info, warn};
use rand::Rng;
use util::module::State;

use super::{GameConfig, GameKind, PlayDisplay, Rocket, StartOption};
use crate::{
    rocket_space::{MotionMode, Position, SpaceInput, TowerId},
    state_mach::{Goto, StateId, StateMachine},
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Micrometers per moon meter, for the height and speed readouts.
const UM_PER_MOON_M: i32 = 1000;

/// Micrometers per moon centimeter, for the normal play display.
const UM_PER_MOON_CM: i32 = 10_000;

/// Micrometers per millimeter.
const UM_PER_MM: i32 = 1000;

/// Largest value the speed readout shows in free move.
const PSEUDO_SPEED_MAX: i32 = 999;

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Rocket {
    pub(super) fn main_menu_enter(&mut self, _: &mut StateMachine) -> Option<Goto> {
        self.cue(Cue::Ready);
        None
    }

    /// Change one of the menu options and return to the main menu.
    pub(super) fn select_option<F>(&mut self, f: F) -> Option<Goto>
    where
        F: FnOnce(&mut GameConfig),
    {
        f(&mut self.menu);
        info!(
            "Options: game {} ({:?}), gravity {:?}, fuel {:?}, start {:?}",
            self.menu.kind.number(),
            self.menu.kind,
            self.menu.gravity,
            self.menu.fuel,
            self.menu.start
        );
        Some(Goto::Show(StateId::MainMenu))
    }

    // ---- GAME ----

    pub(super) fn game_start_enter(&mut self, _: &mut StateMachine) -> Option<Goto> {
        self.active = self.menu;
        let start = self.start_position();

        info!("Game {} starting at {}", self.active.kind.number(), start);
        self.space.init_game(start, &self.active, MotionMode::Play);
        self.space.place(MotorCmd::Dest);

        self.cue(Cue::Play);
        self.update_readouts();
        None
    }

    pub(super) fn game_start_loop(&mut self, fsm: &mut StateMachine) -> Option<Goto> {
        self.show_progress(fsm, StateId::GamePlay, false)
    }

    pub(super) fn game_play_loop(&mut self, fsm: &mut StateMachine) -> Option<Goto> {
        let input = SpaceInput {
            control: self.control,
            config: self.active,
        };
        if let Err(e) = self.space.proc(&input) {
            warn!("Rocket space cycle failed: {}", e);
        }

        if self.active.kind.ends_on_landing() && self.space.state.position.z <= 0 {
            return Some(Goto::Show(StateId::GameDone));
        }

        let [top, bottom] = self.play_lines();
        fsm.set_line(0, &top);
        fsm.set_line(1, &bottom);
        fsm.render();

        self.update_readouts();
        None
    }

    pub(super) fn game_done_enter(&mut self, fsm: &mut StateMachine) -> Option<Goto> {
        let speed = self.space.state.delta.z.abs();

        if speed > self.space.params.safe_landing_um {
            info!("Crashed at {} um/tick", speed);
            fsm.set_line(0, &format!("CRASH :-( S={:04}", speed));
            self.cue(Cue::Crash);
        }
        else {
            info!("Landed at {} um/tick", speed);
            fsm.set_line(0, &format!("WIN! :-) S={:04}", speed));
            self.cue(Cue::Win);
        }

        None
    }

    pub(super) fn game_display_next_enter(&mut self, _: &mut StateMachine) -> Option<Goto> {
        self.active.display = self.active.display.next();
        self.menu.display = self.active.display;
        Some(Goto::Jump(StateId::GamePlay))
    }

    // ---- SHUTDOWN ----

    pub(super) fn shutdown_enter(&mut self, _: &mut StateMachine) -> Option<Goto> {
        self.active = GameConfig::free_move();
        self.space
            .init_game(self.space.params.home, &self.active, MotionMode::Play);
        self.space.place(MotorCmd::Dest);
        None
    }

    pub(super) fn shutdown_loop(&mut self, fsm: &mut StateMachine) -> Option<Goto> {
        self.show_progress(fsm, StateId::ShutdownDone, true)
    }

    // ---- HELPERS ----

    /// Show the motion progress on the first line, moving on to `done` once it completes.
    fn show_progress(&mut self, fsm: &mut StateMachine, done: StateId, show: bool) -> Option<Goto> {
        let progress = self.space.progress();
        fsm.set_line(0, &format!("Progress={:4}", progress));
        fsm.render();

        if progress == PROGRESS_DONE {
            if show {
                Some(Goto::Show(done))
            }
            else {
                Some(Goto::Jump(done))
            }
        }
        else {
            None
        }
    }

    /// Where the next game starts.
    fn start_position(&mut self) -> Position {
        let p = &self.space.params;
        match self.active.start {
            StartOption::Center => Position::new(0, 0, p.start_z_um),
            StartOption::Random => {
                let b = p.game_box;
                Position::new(
                    self.rng.gen_range(b.min.x..=b.max.x),
                    self.rng.gen_range(b.min.y..=b.max.y),
                    p.start_z_um,
                )
            }
        }
    }

    /// The two display lines for the current play display.
    pub(super) fn play_lines(&self) -> [String; 2] {
        let s = &self.space.state;
        let t = |id: TowerId| self.space.tower(id);

        match self.active.display {
            PlayDisplay::Normal => [
                format!(
                    "Z={:02} X={:03} Y={:03}",
                    s.position.z / UM_PER_MOON_CM,
                    s.position.x / UM_PER_MOON_CM,
                    s.position.y / UM_PER_MOON_CM
                ),
                format!("S={:04} F={:04}", s.delta.z, s.fuel),
            ],
            PlayDisplay::RawXyzf => [
                format!(
                    "X={:5}  Y={:5}",
                    s.position.x / UM_PER_MM,
                    s.position.y / UM_PER_MM
                ),
                format!("Z={:5}  f={:5}", s.position.z / UM_PER_MM, s.fuel),
            ],
            PlayDisplay::RawCable => [
                format!(
                    "NW={:4} NE={:4}",
                    t(TowerId::NW).length_goal / UM_PER_MM,
                    t(TowerId::NE).length_goal / UM_PER_MM
                ),
                format!(
                    "SW={:4} SE={:4}",
                    t(TowerId::SW).length_goal / UM_PER_MM,
                    t(TowerId::SE).length_goal / UM_PER_MM
                ),
            ],
            PlayDisplay::RawSteps => [
                format!(
                    "NW={:05} E={:05}",
                    t(TowerId::NW).step_count,
                    t(TowerId::NE).step_count
                ),
                format!(
                    "SW={:05} E={:05}",
                    t(TowerId::SW).step_count,
                    t(TowerId::SE).step_count
                ),
            ],
        }
    }

    /// Refresh the fuel, height and speed readouts.
    pub(super) fn update_readouts(&mut self) {
        let s = &self.space.state;
        let p = &self.space.params;

        let speed = if self.active.kind == GameKind::XyzMove {
            // No speed in free move, show how hard the stick is pushed instead
            let beyond = |thrust: i32, dead_zone: i32| (thrust.abs() - dead_zone).max(0);
            (beyond(s.thrust.x, p.axis_xy.dead_zone)
                + beyond(s.thrust.y, p.axis_xy.dead_zone)
                + beyond(s.thrust.z, p.axis_z.dead_zone))
            .min(PSEUDO_SPEED_MAX)
        }
        else {
            (s.delta.x + s.delta.y + s.delta.z) / UM_PER_MOON_M
        };

        self.readouts.fuel = s.fuel;
        self.readouts.height = s.position.z / UM_PER_MOON_M;
        self.readouts.speed = speed;
    }
}
