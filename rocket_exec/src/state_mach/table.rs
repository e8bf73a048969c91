//! The rig's state table
//!
//! Line 1 of each state is its title, line 2 labels the buttons: button A (left, k1) is "next" or
//! "stop", button B (right, k2) is "go" or "select".

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use super::{CallbackId as C, StateDef, StateFlags, StateId as S, StateRegistry};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

const NO_FLAGS: StateFlags = StateFlags::NONE;
const NO_VERBOSE: StateFlags = StateFlags::NO_VERBOSE;
const FROM_CALLBACK: StateFlags = StateFlags::FROM_CALLBACK;

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Build the full state table.
///
/// The table ends with a deliberately broken state, registered twice, which the self test is
/// expected to report.
pub fn build() -> StateRegistry {
    let mut r = StateRegistry::new();

    // ---- START UP ----

    add(&mut r, S::Init, FROM_CALLBACK,
        [" Rocket Lander! ", "I/O_Test   Start"],
        [Some(S::IoState), Some(S::Start)],
        [None, None, None]);

    add(&mut r, S::Start, NO_FLAGS,
        ["Rocket Position?", "@Home  Calibrate"],
        [Some(S::StartAtHome), Some(S::CalibrateHomeSelect)],
        [None, None, None]);

    add(&mut r, S::StartAtHome, NO_VERBOSE,
        ["", ""],
        [None, None],
        [Some(C::StartAtHomeEnter), None, None]);

    add(&mut r, S::CalibrateHomeSelect, NO_VERBOSE,
        ["", ""],
        [None, None],
        [Some(C::CalibrateInitEnter), None, None]);

    add(&mut r, S::CalibrateHome, NO_VERBOSE,
        ["Calibrate Home  ", "Next    (Un)Lock"],
        [Some(S::CalibrateHomeDone), Some(S::CalibrateHomeLock)],
        [None, Some(C::CalibrateHomeLoop), None]);

    add(&mut r, S::CalibrateHomeDone, NO_FLAGS,
        ["", ""],
        [None, None],
        [Some(C::CalibrateHomeDoneEnter), None, None]);

    add(&mut r, S::CalibrateHomeLock, NO_VERBOSE,
        ["", ""],
        [None, None],
        [Some(C::CalibrateHomeLockEnter), None, None]);

    // ---- MAIN MENU AND GAME ----

    add(&mut r, S::MainMenu, NO_FLAGS,
        [" Rocket Lander! ", "Next       Play!"],
        [Some(S::MainOptions), Some(S::GameStart)],
        [Some(C::MainMenuEnter), None, None]);

    add(&mut r, S::GameStart, NO_VERBOSE,
        ["Move to start...", "Cancel          "],
        [Some(S::GameDone), None],
        [Some(C::GameStartEnter), Some(C::GameStartLoop), None]);

    add(&mut r, S::GamePlay, NO_VERBOSE | FROM_CALLBACK,
        ["", ""],
        [Some(S::GameStop), Some(S::GameDisplayNext)],
        [None, Some(C::GamePlayLoop), None]);

    add(&mut r, S::GameDisplayNext, NO_VERBOSE,
        ["", ""],
        [None, None],
        [Some(C::GameDisplayNextEnter), None, None]);

    add(&mut r, S::GameDone, FROM_CALLBACK,
        ["", "Main      Replay"],
        [Some(S::MainMenu), Some(S::GameStart)],
        [Some(C::GameDoneEnter), None, None]);

    add(&mut r, S::GameStop, NO_FLAGS,
        ["  <GAME STOP>   ", "Main      Replay"],
        [Some(S::MainMenu), Some(S::GameStart)],
        [None, None, None]);

    add(&mut r, S::MainOptions, NO_FLAGS,
        [" Rocket Lander! ", "Next     Options"],
        [Some(S::MainTest), Some(S::OptionsSelect)],
        [None, None, None]);

    add(&mut r, S::MainTest, NO_FLAGS,
        [" Rocket Lander! ", "Next        Test"],
        [Some(S::Shutdown), Some(S::TestSelect)],
        [None, None, None]);

    add(&mut r, S::Shutdown, NO_FLAGS,
        [" Rocket Lander! ", "Next    Shutdown"],
        [Some(S::MainMenu), Some(S::ShutdownSelect)],
        [None, None, None]);

    add(&mut r, S::ShutdownSelect, NO_FLAGS,
        ["Move to home... ", "Cancel          "],
        [Some(S::ShutdownDone), None],
        [Some(C::ShutdownEnter), Some(C::ShutdownLoop), None]);

    add(&mut r, S::ShutdownDone, FROM_CALLBACK,
        ["SAFE TO TURN OFF", "Return to Main?"],
        [Some(S::MainMenu), Some(S::MainMenu)],
        [None, None, None]);

    // ---- OPTIONS ----

    add(&mut r, S::OptionsSelect, NO_FLAGS,
        ["Select ...", "Next        Game"],
        [Some(S::OptGravity), Some(S::OptGameZ)],
        [None, None, None]);

    option(&mut r, "Game   ...", "Next      Land:Z",
        S::OptGameZ, S::OptGameXyz, S::OptGameZSelect, C::OptGameZEnter);
    option(&mut r, "Game   ...", "Next    Land:XYZ",
        S::OptGameXyz, S::OptGameFlight, S::OptGameXyzSelect, C::OptGameXyzEnter);
    option(&mut r, "Game   ...", "Next  Flight:XYZ",
        S::OptGameFlight, S::OptGameMove, S::OptGameFlightSelect, C::OptGameFlightEnter);
    option(&mut r, "Game   ...", "Next    Move:XYZ",
        S::OptGameMove, S::OptGameAuto, S::OptGameMoveSelect, C::OptGameMoveEnter);
    option(&mut r, "Game   ...", "Next   Autopilot",
        S::OptGameAuto, S::OptGameBack, S::OptGameAutoSelect, C::OptGameAutoEnter);

    add(&mut r, S::OptGameBack, NO_FLAGS,
        ["Game   ...", "Next   Main_Menu"],
        [Some(S::OptGameZ), Some(S::MainMenu)],
        [None, None, None]);

    add(&mut r, S::OptGravity, NO_FLAGS,
        ["Select ...", "Next     Gravity"],
        [Some(S::OptFuel), Some(S::OptGravityFull)],
        [None, None, None]);

    option(&mut r, "Gravity...", "Next      Normal",
        S::OptGravityFull, S::OptGravityHigh, S::OptGravityFullSelect, C::OptGravityFullEnter);
    option(&mut r, "Gravity...", "Next        High",
        S::OptGravityHigh, S::OptGravityNone, S::OptGravityHighSelect, C::OptGravityHighEnter);
    option(&mut r, "Gravity...", "Next        None",
        S::OptGravityNone, S::OptGravityNegative, S::OptGravityNoneSelect,
        C::OptGravityNoneEnter);
    option(&mut r, "Gravity...", "Next    Negative",
        S::OptGravityNegative, S::OptGravityBack, S::OptGravityNegativeSelect,
        C::OptGravityNegativeEnter);

    add(&mut r, S::OptGravityBack, NO_FLAGS,
        ["Gravity...", "Next   Main_Menu"],
        [Some(S::OptGravityFull), Some(S::MainMenu)],
        [None, None, None]);

    add(&mut r, S::OptFuel, NO_FLAGS,
        ["Select ...", "Next        Fuel"],
        [Some(S::OptPos), Some(S::OptFuelNormal)],
        [None, None, None]);

    option(&mut r, "Fuel...         ", "Next      Normal",
        S::OptFuelNormal, S::OptFuelLow, S::OptFuelNormalSelect, C::OptFuelNormalEnter);
    option(&mut r, "Fuel...         ", "Next         Low",
        S::OptFuelLow, S::OptFuelNolimit, S::OptFuelLowSelect, C::OptFuelLowEnter);
    option(&mut r, "Fuel...         ", "Next    No_Limit",
        S::OptFuelNolimit, S::OptFuelBack, S::OptFuelNolimitSelect, C::OptFuelNolimitEnter);

    add(&mut r, S::OptFuelBack, NO_FLAGS,
        ["Fuel...         ", "Next   Main_Menu"],
        [Some(S::OptFuelNormal), Some(S::MainMenu)],
        [None, None, None]);

    add(&mut r, S::OptPos, NO_FLAGS,
        ["Select ...", "Next   Start_Pos"],
        [Some(S::OptBack), Some(S::OptPosCenter)],
        [None, None, None]);

    option(&mut r, "Init Position...", "Next      Center",
        S::OptPosCenter, S::OptPosRandom, S::OptPosCenterSelect, C::OptPosCenterEnter);
    option(&mut r, "Init Position...", "Next      Random",
        S::OptPosRandom, S::OptPosBack, S::OptPosRandomSelect, C::OptPosRandomEnter);

    add(&mut r, S::OptPosBack, NO_FLAGS,
        ["Init Position...", "Next   Main_Menu"],
        [Some(S::OptPosCenter), Some(S::MainMenu)],
        [None, None, None]);

    add(&mut r, S::OptBack, NO_FLAGS,
        ["Select ...", "Next   Main_Menu"],
        [Some(S::OptionsSelect), Some(S::MainMenu)],
        [None, None, None]);

    // ---- TEST ----

    add(&mut r, S::TestSelect, NO_FLAGS,
        ["Test...         ", "Next  I/O_Values"],
        [Some(S::TestSanityTest), Some(S::IoState)],
        [Some(C::TestEnter), None, None]);

    add(&mut r, S::IoState, NO_VERBOSE,
        ["I/O State       ", "  Display...    "],
        [None, None],
        [None, Some(C::IoStateLoop), None]);

    add(&mut r, S::TestSanityTest, NO_FLAGS,
        ["Test...         ", "Next Sanity_Test"],
        [Some(S::TestSimulation), Some(S::TestSanitySelect)],
        [None, None, None]);

    add(&mut r, S::TestSanitySelect, NO_FLAGS,
        ["", ""],
        [None, None],
        [Some(C::TestSanityEnter), None, None]);

    add(&mut r, S::TestSimulation, NO_FLAGS,
        ["Test...         ", "Next  Simulation"],
        [Some(S::TestMotorTest), Some(S::SimMicroMetersSelect)],
        [None, None, None]);

    add(&mut r, S::SimMicroMetersSelect, NO_FLAGS,
        ["Sim: Pos uMeters", "Next       Pause"],
        [Some(S::SimMilliMetersSelect), Some(S::SimPause)],
        [Some(C::SimMetersEnter), Some(C::SimMicroMetersLoop), None]);

    add(&mut r, S::SimMilliMetersSelect, NO_FLAGS,
        ["Sim: Pos mMeters", "Next       Pause"],
        [Some(S::SimCablesSelect), Some(S::SimPause)],
        [Some(C::SimMetersEnter), Some(C::SimMilliMetersLoop), None]);

    add(&mut r, S::SimCablesSelect, NO_FLAGS,
        ["Sim: Cables mM", "Next       Pause"],
        [Some(S::SimStepsSelect), Some(S::SimPause)],
        [Some(C::SimCablesEnter), Some(C::SimCablesLoop), None]);

    add(&mut r, S::SimStepsSelect, NO_FLAGS,
        ["Sim: Cable steps", "Next       Pause"],
        [Some(S::SimMicroMetersSelect), Some(S::SimPause)],
        [Some(C::SimStepsEnter), Some(C::SimStepsLoop), None]);

    add(&mut r, S::SimPause, NO_VERBOSE,
        ["Sim:    Pause...", "Main_Menu Resume"],
        [Some(S::MainMenu), Some(S::SimResume)],
        [Some(C::SimPauseEnter), None, None]);

    add(&mut r, S::SimResume, NO_VERBOSE,
        ["", ""],
        [None, None],
        [Some(C::SimResumeEnter), None, None]);

    add(&mut r, S::TestMotorTest, NO_FLAGS,
        ["Test...         ", "Next  Motor_Test"],
        [Some(S::TestCalibrateHome), Some(S::MotorNextSet)],
        [None, None, None]);

    add(&mut r, S::MotorNextSet, NO_FLAGS,
        ["Test Motor  +set", "Next        +set"],
        [Some(S::MotorNextSetDone), Some(S::MotorNextSetGo)],
        [None, None, None]);

    add(&mut r, S::MotorNextSetGo, NO_FLAGS,
        ["", ""],
        [None, None],
        [Some(C::MotorNextSetEnter), None, None]);

    add(&mut r, S::MotorNextSetDone, NO_FLAGS,
        ["", ""],
        [None, None],
        [Some(C::MotorNextSetDoneEnter), None, None]);

    add(&mut r, S::MotorPlusStep, FROM_CALLBACK,
        ["Test Motor +step", "Next       +step"],
        [Some(S::MotorMinusStep), Some(S::MotorPlusStepGo)],
        [None, None, None]);

    add(&mut r, S::MotorPlusStepGo, NO_FLAGS,
        ["", ""],
        [None, None],
        [Some(C::MotorPlusStepEnter), None, None]);

    add(&mut r, S::MotorMinusStep, NO_FLAGS,
        ["Test Motor -step", "Next       -step"],
        [Some(S::MotorPlus360), Some(S::MotorMinusStepGo)],
        [None, None, None]);

    add(&mut r, S::MotorMinusStepGo, NO_FLAGS,
        ["", ""],
        [None, None],
        [Some(C::MotorMinusStepEnter), None, None]);

    add(&mut r, S::MotorPlus360, NO_FLAGS,
        ["Test Motor  +360", "Next        +360"],
        [Some(S::MotorMinus360), Some(S::MotorPlus360Go)],
        [None, None, None]);

    add(&mut r, S::MotorPlus360Go, NO_FLAGS,
        ["", ""],
        [None, None],
        [Some(C::MotorPlus360Enter), None, None]);

    add(&mut r, S::MotorMinus360, NO_FLAGS,
        ["Test Motor  -360", "Next        -360"],
        [Some(S::MainMenu), Some(S::MotorMinus360Go)],
        [None, None, None]);

    add(&mut r, S::MotorMinus360Go, NO_FLAGS,
        ["", ""],
        [None, None],
        [Some(C::MotorMinus360Enter), None, None]);

    add(&mut r, S::TestCalibrateHome, NO_FLAGS,
        ["Test...", "Next  Motor_Home"],
        [Some(S::TestCalibratePosition), Some(S::CalibrateHome)],
        [None, None, None]);

    add(&mut r, S::TestCalibratePosition, NO_FLAGS,
        ["Test...", "Next   Motor_Pos"],
        [Some(S::TestMotorStatus), Some(S::CalibratePositionSelect)],
        [None, None, None]);

    add(&mut r, S::CalibratePositionSelect, NO_VERBOSE,
        ["Motor   Position", "Done          Go"],
        [Some(S::MainMenu), Some(S::CalibratePositionGo)],
        [Some(C::CalibratePositionEnter), Some(C::CalibratePositionLoop), None]);

    add(&mut r, S::CalibratePositionGo, NO_VERBOSE,
        ["", ""],
        [None, None],
        [Some(C::CalibratePositionGoEnter), None, None]);

    add(&mut r, S::TestMotorStatus, NO_FLAGS,
        ["Test...", "Next Motor_State"],
        [Some(S::TestBack), Some(S::TestMotorStatusSelect)],
        [None, None, None]);

    add(&mut r, S::TestMotorStatusSelect, NO_VERBOSE,
        ["Motors at:  100%", "Done"],
        [Some(S::MainMenu), Some(S::MainMenu)],
        [None, Some(C::TestMotorStatusLoop), None]);

    add(&mut r, S::TestBack, NO_FLAGS,
        ["Test...", "Next   Main_Menu"],
        [Some(S::TestSelect), Some(S::MainMenu)],
        [None, None, None]);

    // ---- SELF TEST FIXTURE ----

    add(&mut r, S::OrphanError, NO_FLAGS,
        ["", ""],
        [Some(S::OrphanErrorK1), Some(S::OrphanErrorK2)],
        [Some(C::OrphanErrorEnter), Some(C::OrphanErrorLoop), Some(C::OrphanErrorExit)]);

    add(&mut r, S::OrphanError, NO_FLAGS,
        ["", ""],
        [None, None],
        [None, None, None]);

    r
}

fn add(
    r: &mut StateRegistry,
    id: S,
    flags: StateFlags,
    lines: [&str; 2],
    keys: [Option<S>; 2],
    callbacks: [Option<C>; 3],
) {
    r.register(StateDef::new(id, flags, lines, keys, callbacks));
}

/// Add one entry of an options menu: the entry itself, where "next" leads to `next`, and its
/// select state which applies the option.
fn option(r: &mut StateRegistry, title: &str, keys: &str, id: S, next: S, select: S, apply: C) {
    add(r, id, NO_FLAGS, [title, keys], [Some(next), Some(select)], [None, None, None]);
    add(r, select, NO_VERBOSE, ["", ""], [None, None], [Some(apply), None, None]);
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::state_mach::{test::Recorder, StateMachine};

    #[test]
    fn test_fits() {
        let r = build();
        assert!(r.len() <= crate::state_mach::REGISTRY_CAPACITY);
        assert_eq!(r.resolve(S::Init), Some(0));

        // Every registered identifier apart from the fixture is registered once
        for id in S::ALL.iter() {
            let count = r.iter().filter(|d| d.id == *id).count();
            match id {
                S::OrphanError => assert_eq!(count, 2),
                S::OrphanErrorK1 | S::OrphanErrorK2 => assert_eq!(count, 0),
                _ => assert_eq!(count, 1, "{} registered {} times", id, count),
            }
        }
    }

    #[test]
    fn test_self_test_finds_fixture_only() {
        let fsm = StateMachine::new(build(), S::MainMenu, false).unwrap();
        let mut rec = Recorder::default();
        rec.missing = vec![C::OrphanErrorEnter, C::OrphanErrorLoop, C::OrphanErrorExit];

        let report = fsm.validate(&mut rec);

        assert_eq!(
            report.missing_targets,
            vec![(S::OrphanError, S::OrphanErrorK1), (S::OrphanError, S::OrphanErrorK2)]
        );
        assert_eq!(report.missing_callbacks.len(), 3);
        assert_eq!(report.orphans, vec![S::OrphanError]);
        assert_eq!(report.duplicates.len(), 1);
        assert_eq!(report.num_errors(), 7);

        for id in [S::Init, S::GamePlay, S::MotorPlusStep] {
            assert!(report.callback_only.contains(&id));
        }
    }

    #[test]
    fn test_menu_walk() {
        let mut fsm = StateMachine::new(build(), S::MainMenu, false).unwrap();
        let mut rec = Recorder::default();
        fsm.start();

        // Callbacks are only recorded, keys drive everything
        rec.press(false, true);
        fsm.tick(&mut rec);
        assert_eq!(fsm.current(), S::Start);
        assert_eq!(fsm.lcd().line(1), "@Home  Calibrate");

        rec.press(true, true);
        fsm.tick(&mut rec);
        assert_eq!(fsm.current(), S::MainMenu);
        assert_eq!(fsm.lcd().line(0), " Rocket Lander! ");
        assert_eq!(rec.calls.last(), Some(&C::MainMenuEnter));

        // Options, gravity, negative
        for (a, b, expected) in [
            (true, false, S::MainOptions),
            (false, true, S::OptionsSelect),
            (true, false, S::OptGravity),
            (false, true, S::OptGravityFull),
            (true, false, S::OptGravityHigh),
            (true, false, S::OptGravityNone),
            (true, false, S::OptGravityNegative),
        ] {
            rec.press(false, false);
            fsm.tick(&mut rec);
            rec.press(a, b);
            fsm.tick(&mut rec);
            assert_eq!(fsm.current(), expected);
        }
    }
}
