//! Start up and calibration flows

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::motor::MotorCmd;
use log::info;

use super::{FuelOption, GameConfig, GravityOption, Rocket};
use crate::{
    rocket_space::{CompassCmd, MotionMode, Position, TowerId},
    state_mach::{Goto, StateId, StateMachine},
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Column of the second display line where the compass selection is written.
const COMPASS_COL: usize = 5;

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Rocket {
    /// The rocket was left on its pad, tell the motors that's where they are.
    pub(super) fn start_at_home_enter(&mut self, _: &mut StateMachine) -> Option<Goto> {
        self.active = self.menu.with_physics(FuelOption::NoLimit, GravityOption::None);
        self.space
            .init_game(self.space.params.home, &self.active, MotionMode::Play);
        self.space.place(MotorCmd::Preset);

        Some(Goto::Show(StateId::MainMenu))
    }

    // ---- HOMING ----

    pub(super) fn calibrate_init_enter(&mut self, _: &mut StateMachine) -> Option<Goto> {
        // Pretend to be mid air so the motors don't hit their step limits while jogged
        self.active = GameConfig::free_move();
        self.space
            .init_game(self.mid_air(), &self.active, MotionMode::Simulate);

        self.space.link.send_command(MotorCmd::Calibrate);
        self.compass_cmd(CompassCmd::Init);

        Some(Goto::Show(StateId::CalibrateHome))
    }

    pub(super) fn calibrate_home_loop(&mut self, fsm: &mut StateMachine) -> Option<Goto> {
        self.compass_cmd(CompassCmd::CalcHome);
        fsm.overlay(1, COMPASS_COL, &format!("{:2.2}", self.compass.name));
        fsm.render();

        if self.compass.has_increments() {
            self.space.link.send_increments(self.compass.incs);
        }

        None
    }

    pub(super) fn calibrate_home_done_enter(&mut self, _: &mut StateMachine) -> Option<Goto> {
        self.active = GameConfig::free_move();
        self.space
            .init_game(self.space.params.calibrate, &self.active, MotionMode::Simulate);

        self.space.place(MotorCmd::Preset);
        self.space.link.send_command(MotorCmd::Normal);

        info!("Homing calibration done at {}", self.space.params.calibrate);
        Some(Goto::Show(StateId::MainMenu))
    }

    pub(super) fn calibrate_home_lock_enter(&mut self, _: &mut StateMachine) -> Option<Goto> {
        self.compass_cmd(CompassCmd::Lock);
        self.space.log_towers("Step Status");

        Some(Goto::Jump(StateId::CalibrateHome))
    }

    // ---- POSITION TARGETS ----

    pub(super) fn calibrate_position_enter(&mut self, _: &mut StateMachine) -> Option<Goto> {
        self.compass_cmd(CompassCmd::Init);
        None
    }

    pub(super) fn calibrate_position_loop(&mut self, fsm: &mut StateMachine) -> Option<Goto> {
        self.compass_cmd(CompassCmd::CalcPos);
        fsm.overlay(1, COMPASS_COL, &format!("{:5.5}", self.compass.name));
        fsm.render();
        None
    }

    pub(super) fn calibrate_position_go_enter(&mut self, _: &mut StateMachine) -> Option<Goto> {
        self.space.set_goal(self.compass.target);
        self.space.solve_cable_lengths();
        self.space.commit_position();

        let t = |id: TowerId| {
            let t = self.space.tower(id);
            (t.length, t.step_count)
        };
        info!(
            "MOVE_TO:{} at {} NW={:?} NE={:?} SW={:?} SE={:?}",
            self.compass.name,
            self.space.state.position,
            t(TowerId::NW),
            t(TowerId::NE),
            t(TowerId::SW),
            t(TowerId::SE)
        );

        Some(Goto::Show(StateId::CalibratePositionSelect))
    }

    // ---- HELPERS ----

    fn compass_cmd(&mut self, cmd: CompassCmd) {
        self.compass.apply(cmd, &self.control, &self.space.params);
    }

    /// Centre of the mechanism at half its height.
    pub(super) fn mid_air(&self) -> Position {
        Position::new(0, 0, self.space.params.mech_box.max.z / 2)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        rocket_space::{MotorLink, RocketSpace},
        state_mach::table,
    };
    use comms_if::eqpt::{
        input::{AxisRange, InputSample},
        motor::{increment_frame, SimBus, DEFAULT_MOTOR_ADDRESS},
    };

    fn rig() -> (StateMachine, Rocket, SimBus) {
        let bus = SimBus::new();
        let link = MotorLink::new(Box::new(bus.clone()), DEFAULT_MOTOR_ADDRESS, true);
        let space = RocketSpace::new(Default::default(), link).unwrap();

        let mut fsm = StateMachine::new(table::build(), StateId::MainMenu, false).unwrap();
        fsm.start();
        (fsm, Rocket::with_seed(space, 3), bus)
    }

    fn stick(x: i32, y: i32, z: i32) -> InputSample {
        InputSample {
            analog_x: x,
            analog_y: y,
            analog_z: z,
            ..Default::default()
        }
    }

    #[test]
    fn test_start_at_home() {
        let (mut fsm, mut rocket, bus) = rig();
        fsm.goto(Some(StateId::StartAtHome), &mut rocket);

        assert_eq!(fsm.current(), StateId::MainMenu);
        assert_eq!(rocket.space.state.position, rocket.space.params.home);
        assert_eq!(rocket.space.mode(), MotionMode::Play);

        let payloads = bus.payloads();
        assert_eq!(payloads.len(), 5);
        assert_eq!(payloads[4], vec![b'p']);

        // The menu choices survive
        assert_eq!(rocket.menu, GameConfig::default());
    }

    #[test]
    fn test_homing() {
        let (mut fsm, mut rocket, bus) = rig();
        let xy = AxisRange::JOYSTICK_XY;
        let z = AxisRange::JOYSTICK_Z;

        fsm.goto(Some(StateId::CalibrateHomeSelect), &mut rocket);
        assert_eq!(fsm.current(), StateId::CalibrateHome);
        assert_eq!(rocket.space.mode(), MotionMode::Simulate);
        assert_eq!(bus.payloads(), vec![vec![b'c']]);
        bus.clear();

        // Stick to the north east with the throttle up jogs the NE tower
        rocket.apply_inputs(&stick(xy.max, xy.max, z.max));
        fsm.tick(&mut rocket);
        assert_eq!(rocket.compass.selected, Some(TowerId::NE));
        assert_eq!(fsm.lcd().line(1), "Next NE (Un)Lock");

        let inc = rocket.space.params.calibrate_step_inc;
        assert_eq!(bus.payloads(), vec![increment_frame([0, inc, 0, 0]).to_vec()]);
        bus.clear();

        // Throttle centred, nothing sent
        rocket.apply_inputs(&stick(xy.max, xy.max, z.mid));
        fsm.tick(&mut rocket);
        assert!(bus.payloads().is_empty());

        // Lock holds the selection whatever the stick does
        fsm.goto(Some(StateId::CalibrateHomeLock), &mut rocket);
        assert_eq!(fsm.current(), StateId::CalibrateHome);
        assert!(rocket.compass.locked);
        rocket.apply_inputs(&stick(xy.min, xy.min, z.mid));
        fsm.tick(&mut rocket);
        assert_eq!(rocket.compass.selected, Some(TowerId::NE));

        // Done presets at the calibration position
        fsm.goto(Some(StateId::CalibrateHomeDone), &mut rocket);
        assert_eq!(fsm.current(), StateId::MainMenu);
        assert_eq!(rocket.space.state.position, rocket.space.params.calibrate);

        let payloads = bus.payloads();
        assert_eq!(payloads.len(), 6);
        assert_eq!(payloads[4], vec![b'p']);
        assert_eq!(payloads[5], vec![b'n']);
    }

    #[test]
    fn test_position_targets() {
        let (mut fsm, mut rocket, bus) = rig();
        let xy = AxisRange::JOYSTICK_XY;
        fsm.goto(Some(StateId::StartAtHome), &mut rocket);
        bus.clear();

        fsm.goto(Some(StateId::CalibratePositionSelect), &mut rocket);
        fsm.tick(&mut rocket);
        assert_eq!(fsm.lcd().line(1), "Done Centr    Go");

        // Stick north selects the north target
        rocket.apply_inputs(&stick(xy.mid, xy.max, AxisRange::JOYSTICK_Z.mid));
        fsm.tick(&mut rocket);
        assert_eq!(fsm.lcd().line(1), "Done North    Go");
        let target = rocket.compass.target;
        assert!(target.y > 0);

        fsm.goto(Some(StateId::CalibratePositionGo), &mut rocket);
        assert_eq!(fsm.current(), StateId::CalibratePositionSelect);
        assert_eq!(rocket.space.state.position, rocket.space.params.game_box.clamp(target));

        // The move went out as one increment frame
        let payloads = bus.payloads();
        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0][0], b'i');
    }
}
