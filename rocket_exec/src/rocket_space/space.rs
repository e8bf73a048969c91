//! Implementations for the RocketSpace state structure

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use comms_if::eqpt::{
    input::ControlInputs,
    motor::{MotorCmd, NUM_TOWERS, PROGRESS_DONE, PROGRESS_IN_PROGRESS},
};
use log::{debug, info, trace};
use serde::Serialize;

// Internal
use super::{
    MotionMode, MotorLink, Params, Position, RocketSpaceError, Tower, TowerId,
};
use crate::game::{FuelOption, GameConfig, GameKind};
use util::{module::State, params, session::Session};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Dynamic state of the rocket.
///
/// Units: micrometers for positions, micrometers/tick for deltas, raw joystick counts for thrust.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SpaceState {
    /// Committed position.
    pub position: Position,

    /// Position being driven towards.
    pub goal: Position,

    /// Velocity applied to the goal on the next tick.
    pub delta: Position,

    /// Joystick deviation from centre on the last tick.
    pub thrust: Position,

    pub fuel: i32,
}

/// The kinematics engine.
pub struct RocketSpace {
    pub params: Params,

    pub state: SpaceState,

    pub towers: [Tower; NUM_TOWERS],

    mode: MotionMode,

    pub link: MotorLink,
}

/// Copy of everything a diagnostic might disturb, see [`RocketSpace::snapshot`].
#[derive(Debug, Clone)]
pub struct SpaceSnapshot {
    state: SpaceState,
    towers: [Tower; NUM_TOWERS],
    mode: MotionMode,
}

/// Outcome of [`RocketSpace::advance_goal`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdvanceReport {
    /// The integrated goal was outside the active envelope and has been clamped.
    pub clamped: bool,

    /// The fuel was topped back up to the full supply.
    pub refilled: bool,
}

/// Outcome of [`RocketSpace::commit_position`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CommitReport {
    /// Step change of each tower in NW, NE, SW, SE order.
    pub step_diffs: [i32; NUM_TOWERS],

    /// At least one tower moved.
    pub moved: bool,

    /// An increment frame was sent to the motors.
    pub sent: bool,
}

/// Input data to one processing cycle.
#[derive(Debug, Clone, Copy)]
pub struct SpaceInput {
    pub control: ControlInputs,
    pub config: GameConfig,
}

/// Output of one processing cycle.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SpaceOutput {
    pub position: Position,
    pub fuel: i32,
    pub step_diffs: [i32; NUM_TOWERS],
}

/// Status report for one processing cycle.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusReport {
    pub goal_clamped: bool,
    pub fuel_refilled: bool,
    pub moved: bool,
    pub increments_sent: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl RocketSpace {
    /// Create a new engine, the rocket starts at home in simulate mode.
    pub fn new(params: Params, link: MotorLink) -> Result<Self, RocketSpaceError> {
        params.validate()?;

        let towers = build_towers(&params);
        let home = params.home;

        let mut space = Self {
            params,
            state: SpaceState::default(),
            towers,
            mode: MotionMode::Simulate,
            link,
        };

        space.init_game(home, &GameConfig::free_move(), MotionMode::Simulate);

        Ok(space)
    }

    pub fn mode(&self) -> MotionMode {
        self.mode
    }

    /// Reset the rocket to `start` for a new game or session.
    ///
    /// All dynamic state is replaced. The towers are declared to already be at the cable lengths
    /// for the start position, no frames are sent, use [`RocketSpace::place`] to tell the motors.
    pub fn init_game(&mut self, start: Position, config: &GameConfig, mode: MotionMode) {
        self.mode = mode;

        let start = self.bounds().clamp(start);

        self.state = SpaceState {
            position: start,
            goal: start,
            delta: Position::default(),
            thrust: Position::default(),
            fuel: config.fuel.supply(self.params.fuel_supply_init),
        };

        self.solve_cable_lengths();

        let um10_per_step = self.params.um10_per_step;
        for tower in self.towers.iter_mut() {
            tower.preset(um10_per_step);
        }

        info!(
            "Rocket initialised at {} in {:?} mode ({:?}, fuel {:?}, gravity {:?})",
            start, mode, config.kind, config.fuel, config.gravity
        );
        self.log_towers("Init");
    }

    /// Send every tower's absolute position followed by `cmd`.
    ///
    /// `MotorCmd::Preset` tells the motors they are already there, `MotorCmd::Dest` drives them
    /// there.
    pub fn place(&mut self, cmd: MotorCmd) {
        self.link.send_positions(&self.towers);
        self.link.send_command(cmd);
    }

    /// Integrate one tick of thrust, gravity and fuel into the goal position.
    pub fn advance_goal(&mut self, control: &ControlInputs, config: &GameConfig) -> AdvanceReport {
        let p = &self.params;
        let s = &mut self.state;
        let free_move = config.kind == GameKind::XyzMove;

        s.thrust = Position::new(
            p.axis_xy.deviation(control.analog_x),
            p.axis_xy.deviation(control.analog_y),
            p.axis_z.deviation(control.analog_z),
        );

        let (dir_x, dir_y) = if config.kind.uses_xy() {
            (
                p.axis_xy.direction(control.analog_x),
                p.axis_xy.direction(control.analog_y),
            )
        }
        else {
            (0, 0)
        };
        let lift = p.axis_z.beyond_dead_zone(control.analog_z);

        let inc_xy = if free_move {
            p.move_inc_xy_um
        }
        else {
            p.thrust_inc_xy_um
        };

        // Thrust, only while there's fuel to burn. X/Y thrusters are on or off and set a fixed
        // velocity, Z is proportional and accelerates.
        let mut fuel_used = 0;
        if s.fuel > 0 || free_move {
            if dir_x != 0 {
                s.delta.x = dir_x * inc_xy;
                fuel_used += p.fuel_cost_x;
            }
            if dir_y != 0 {
                s.delta.y = dir_y * inc_xy;
                fuel_used += p.fuel_cost_y;
            }
            if lift != 0 {
                s.delta.z += lift * p.thrust_inc_z_um;
                fuel_used += p.fuel_cost_z;
            }
        }

        s.goal = s.goal + s.delta;

        if free_move {
            s.delta = Position::default();
            fuel_used = 0;
        }
        else {
            s.delta.z += config.gravity.accel(p.gravity_um);
        }

        // Fuel
        let refills = config.fuel == FuelOption::NoLimit || free_move;
        let refilled =
            refills && s.fuel < p.fuel_low_water && (fuel_used > 0 || free_move);
        if refilled {
            s.fuel = config.fuel.supply(p.fuel_supply_init);
            debug!("Fuel refilled to {}", s.fuel);
        }
        else {
            s.fuel = (s.fuel - fuel_used).max(0);
        }

        // Keep inside the envelope
        let bounds = match self.mode {
            MotionMode::Simulate => p.mech_box,
            MotionMode::Play => p.game_box,
        };
        let clamped_goal = bounds.clamp(s.goal);
        let clamped = clamped_goal != s.goal;
        s.goal = clamped_goal;

        trace!(
            "Goal {} delta {} thrust {} fuel {}",
            s.goal, s.delta, s.thrust, s.fuel
        );

        AdvanceReport { clamped, refilled }
    }

    /// Solve every tower's cable length for the goal position.
    pub fn solve_cable_lengths(&mut self) -> [i32; NUM_TOWERS] {
        let goal = self.state.goal;
        let seed = self.params.sqrt_seed;

        let mut lengths = [0; NUM_TOWERS];
        for (length, tower) in lengths.iter_mut().zip(self.towers.iter_mut()) {
            *length = tower.solve(&goal, seed);
        }

        lengths
    }

    /// Make the goal the current position and move the towers to match.
    ///
    /// In play mode with the motors enabled, any step changes are sent as one increment frame.
    pub fn commit_position(&mut self) -> CommitReport {
        self.state.position = self.state.goal;

        let um10_per_step = self.params.um10_per_step;
        let mut step_diffs = [0; NUM_TOWERS];
        for (diff, tower) in step_diffs.iter_mut().zip(self.towers.iter_mut()) {
            *diff = tower.commit(um10_per_step);
        }

        let moved = step_diffs.iter().any(|&d| d != 0);
        let sent = moved && self.link.is_enabled() && self.mode == MotionMode::Play;

        if sent {
            self.link.send_increments(step_diffs);
        }

        trace!("Commit {} steps {:?}", self.state.position, step_diffs);

        CommitReport {
            step_diffs,
            moved,
            sent,
        }
    }

    /// Progress of the current motion in percent.
    pub fn progress(&mut self) -> u8 {
        if self.link.is_enabled() {
            self.link.query_progress()
        }
        else if self.state.position == self.state.goal {
            PROGRESS_DONE
        }
        else {
            PROGRESS_IN_PROGRESS
        }
    }

    /// Set a new goal directly, clamped into the active envelope.
    pub fn set_goal(&mut self, goal: Position) {
        self.state.goal = self.bounds().clamp(goal);
    }

    pub fn tower(&self, id: TowerId) -> &Tower {
        &self.towers[id.index()]
    }

    pub fn step_counts(&self) -> [i32; NUM_TOWERS] {
        let mut counts = [0; NUM_TOWERS];
        for (c, t) in counts.iter_mut().zip(self.towers.iter()) {
            *c = t.step_count;
        }
        counts
    }

    /// Copy the dynamic state so a diagnostic can be undone.
    pub fn snapshot(&self) -> SpaceSnapshot {
        SpaceSnapshot {
            state: self.state,
            towers: self.towers.clone(),
            mode: self.mode,
        }
    }

    pub fn restore(&mut self, snapshot: SpaceSnapshot) {
        self.state = snapshot.state;
        self.towers = snapshot.towers;
        self.mode = snapshot.mode;
    }

    /// Log the state of every tower.
    pub fn log_towers(&self, label: &str) {
        for t in self.towers.iter() {
            debug!(
                "{}: {} at {} mount {} length={} goal={} steps={} diff={}",
                label, t.id, t.position, t.mount, t.length, t.length_goal, t.step_count, t.step_diff
            );
        }
    }

    /// The envelope of the active mode.
    fn bounds(&self) -> super::BoundingBox {
        match self.mode {
            MotionMode::Simulate => self.params.mech_box,
            MotionMode::Play => self.params.game_box,
        }
    }
}

impl Default for RocketSpace {
    fn default() -> Self {
        let params = Params::default();
        let towers = build_towers(&params);

        Self {
            params,
            state: SpaceState::default(),
            towers,
            mode: MotionMode::Simulate,
            link: MotorLink::disabled(),
        }
    }
}

impl State for RocketSpace {
    type InitData = &'static str;
    type InitError = RocketSpaceError;

    type InputData = SpaceInput;
    type OutputData = SpaceOutput;
    type StatusReport = StatusReport;
    type ProcError = RocketSpaceError;

    /// Initialise the rocket space.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, _session: &Session) -> Result<(), Self::InitError> {
        let params: Params = params::load(init_data).map_err(RocketSpaceError::ParamLoadError)?;
        params.validate()?;

        self.towers = build_towers(&params);
        let home = params.home;
        self.params = params;

        self.init_game(home, &GameConfig::free_move(), MotionMode::Simulate);

        Ok(())
    }

    /// Run one tick of the motion pipeline: advance, solve, commit.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let advance = self.advance_goal(&input_data.control, &input_data.config);
        self.solve_cable_lengths();
        let commit = self.commit_position();

        Ok((
            SpaceOutput {
                position: self.state.position,
                fuel: self.state.fuel,
                step_diffs: commit.step_diffs,
            },
            StatusReport {
                goal_clamped: advance.clamped,
                fuel_refilled: advance.refilled,
                moved: commit.moved,
                increments_sent: commit.sent,
            },
        ))
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn build_towers(params: &Params) -> [Tower; NUM_TOWERS] {
    let t = &params.towers;
    [
        Tower::new(TowerId::NW, &t[0]),
        Tower::new(TowerId::NE, &t[1]),
        Tower::new(TowerId::SW, &t[2]),
        Tower::new(TowerId::SE, &t[3]),
    ]
}
