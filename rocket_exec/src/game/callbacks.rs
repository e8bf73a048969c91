//! Mapping of callback identifiers to game behaviour

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::input::ControlInputs;

use super::{
    diagnostics::STEPS_PER_REV, FuelOption, GameKind, GravityOption, Rocket, StartOption,
};
use crate::state_mach::{
    CallbackId, Callbacks, Dispatch, Goto, StateError, StateId, StateMachine,
};

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Callbacks for Rocket {
    fn inputs(&mut self) -> &mut ControlInputs {
        &mut self.control
    }

    fn dispatch(
        &mut self,
        id: CallbackId,
        mode: Dispatch<'_>,
    ) -> Result<Option<Goto>, StateError> {
        if !has_behaviour(id) {
            return Err(StateError::MissingCallback(id));
        }

        match mode {
            Dispatch::Validate => Ok(None),
            Dispatch::Live(fsm) => Ok(self.run_callback(id, fsm)),
        }
    }
}

impl Rocket {
    /// Run the behaviour behind a callback.
    fn run_callback(&mut self, id: CallbackId, fsm: &mut StateMachine) -> Option<Goto> {
        use CallbackId as C;
        use StateId as S;

        match id {
            // Start up and calibration
            C::StartAtHomeEnter => self.start_at_home_enter(fsm),
            C::CalibrateInitEnter => self.calibrate_init_enter(fsm),
            C::CalibrateHomeLoop => self.calibrate_home_loop(fsm),
            C::CalibrateHomeDoneEnter => self.calibrate_home_done_enter(fsm),
            C::CalibrateHomeLockEnter => self.calibrate_home_lock_enter(fsm),
            C::CalibratePositionEnter => self.calibrate_position_enter(fsm),
            C::CalibratePositionLoop => self.calibrate_position_loop(fsm),
            C::CalibratePositionGoEnter => self.calibrate_position_go_enter(fsm),

            // Game
            C::MainMenuEnter => self.main_menu_enter(fsm),
            C::GameStartEnter => self.game_start_enter(fsm),
            C::GameStartLoop => self.game_start_loop(fsm),
            C::GamePlayLoop => self.game_play_loop(fsm),
            C::GameDoneEnter => self.game_done_enter(fsm),
            C::GameDisplayNextEnter => self.game_display_next_enter(fsm),
            C::ShutdownEnter => self.shutdown_enter(fsm),
            C::ShutdownLoop => self.shutdown_loop(fsm),

            // Options
            C::OptGameZEnter => self.select_option(|c| c.kind = GameKind::ZLand),
            C::OptGameXyzEnter => self.select_option(|c| c.kind = GameKind::XyzLand),
            C::OptGameFlightEnter => self.select_option(|c| c.kind = GameKind::XyzFlight),
            C::OptGameMoveEnter => self.select_option(|c| c.kind = GameKind::XyzMove),
            C::OptGameAutoEnter => self.select_option(|c| c.kind = GameKind::XyzAuto),
            C::OptGravityFullEnter => self.select_option(|c| c.gravity = GravityOption::Normal),
            C::OptGravityHighEnter => self.select_option(|c| c.gravity = GravityOption::High),
            C::OptGravityNoneEnter => self.select_option(|c| c.gravity = GravityOption::None),
            C::OptGravityNegativeEnter => {
                self.select_option(|c| c.gravity = GravityOption::Negative)
            }
            C::OptFuelNormalEnter => self.select_option(|c| c.fuel = FuelOption::Normal),
            C::OptFuelLowEnter => self.select_option(|c| c.fuel = FuelOption::Low),
            C::OptFuelNolimitEnter => self.select_option(|c| c.fuel = FuelOption::NoLimit),
            C::OptPosCenterEnter => self.select_option(|c| c.start = StartOption::Center),
            C::OptPosRandomEnter => self.select_option(|c| c.start = StartOption::Random),

            // Diagnostics
            C::TestEnter => self.test_enter(fsm),
            C::IoStateLoop => self.io_state_loop(fsm),
            C::TestSanityEnter => self.test_sanity_enter(fsm),
            C::SimMetersEnter => self.sim_meters_enter(fsm),
            C::SimMicroMetersLoop => self.sim_meters_loop(false),
            C::SimMilliMetersLoop => self.sim_meters_loop(true),
            C::SimCablesEnter => self.sim_cables_enter(fsm),
            C::SimCablesLoop => self.sim_cables_loop(fsm),
            C::SimStepsEnter => self.sim_steps_enter(fsm),
            C::SimStepsLoop => self.sim_steps_loop(fsm),
            C::SimPauseEnter => self.sim_pause_enter(fsm),
            C::SimResumeEnter => self.sim_resume_enter(fsm),
            C::MotorNextSetEnter => self.motor_next_set_enter(fsm),
            C::MotorNextSetDoneEnter => self.motor_next_set_done_enter(fsm),
            C::MotorPlusStepEnter => self.motor_increment(1, S::MotorPlusStep),
            C::MotorMinusStepEnter => self.motor_increment(-1, S::MotorMinusStep),
            C::MotorPlus360Enter => self.motor_increment(STEPS_PER_REV, S::MotorPlus360),
            C::MotorMinus360Enter => self.motor_increment(-STEPS_PER_REV, S::MotorMinus360),
            C::TestMotorStatusLoop => self.test_motor_status_loop(fsm),

            // Rejected by has_behaviour before getting here
            C::OrphanErrorEnter | C::OrphanErrorLoop | C::OrphanErrorExit => None,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Whether a callback has behaviour behind it.
///
/// The orphan error state is a self test fixture and is deliberately left without any.
fn has_behaviour(id: CallbackId) -> bool {
    !matches!(
        id,
        CallbackId::OrphanErrorEnter | CallbackId::OrphanErrorLoop | CallbackId::OrphanErrorExit
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        rocket_space::RocketSpace,
        state_mach::table,
    };

    #[test]
    fn test_every_callback_has_behaviour() {
        for id in CallbackId::ALL.iter() {
            let missing = matches!(
                id,
                CallbackId::OrphanErrorEnter
                    | CallbackId::OrphanErrorLoop
                    | CallbackId::OrphanErrorExit
            );
            assert_eq!(has_behaviour(*id), !missing, "{}", id);
        }
    }

    #[test]
    fn test_live_orphan_is_missing() {
        let mut fsm = StateMachine::new(table::build(), StateId::MainMenu, false).unwrap();
        let mut rocket = Rocket::with_seed(RocketSpace::default(), 1);

        let result = rocket.dispatch(CallbackId::OrphanErrorEnter, Dispatch::Live(&mut fsm));
        assert!(matches!(
            result,
            Err(StateError::MissingCallback(CallbackId::OrphanErrorEnter))
        ));
    }

    #[test]
    fn test_live_dispatch_runs_behaviour() {
        let mut fsm = StateMachine::new(table::build(), StateId::MainMenu, false).unwrap();
        let mut rocket = Rocket::with_seed(RocketSpace::default(), 1);

        let result = rocket.dispatch(CallbackId::OptFuelLowEnter, Dispatch::Live(&mut fsm));
        assert!(matches!(result, Ok(Some(Goto::Show(StateId::MainMenu)))));
        assert_eq!(rocket.menu.fuel, FuelOption::Low);
    }

    #[test]
    fn test_validate_production_table() {
        let fsm = StateMachine::new(table::build(), StateId::MainMenu, false).unwrap();
        let mut rocket = Rocket::with_seed(RocketSpace::default(), 1);
        let before = rocket.space.state;

        let report = fsm.validate(&mut rocket);

        assert_eq!(report.missing_callbacks.len(), 3);
        assert!(report
            .missing_callbacks
            .iter()
            .all(|(s, _)| *s == StateId::OrphanError));
        assert_eq!(report.num_errors(), 7);

        // Validation runs nothing
        assert_eq!(rocket.space.state, before);
        assert!(rocket.drain_cues().is_empty());
        assert_eq!(fsm.current(), StateId::Init);
    }
}
