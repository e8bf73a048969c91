//! State and callback identifiers
//!
//! Both are closed enumerations. Each identifier carries the name it's logged and displayed under.

// ------------------------------------------------------------------------------------------------
// MACROS
// ------------------------------------------------------------------------------------------------

macro_rules! named_ids {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident => $text:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            /// Every identifier, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

named_ids! {
    /// Identity of a state in the table.
    ///
    /// Not every identifier has to be registered, a transition to one that isn't is reported as a
    /// configuration error.
    pub enum StateId {
        Init => "S_Init",
        Start => "S_Start",
        StartAtHome => "S_Start_At_Home",
        CalibrateHomeSelect => "S_Calibrate_Home_Select",
        CalibrateHome => "S_Calibrate_Home",
        CalibrateHomeDone => "S_CalibrateHome_Done",
        CalibrateHomeLock => "S_CalibrateHome_Lock",

        MainMenu => "S_Main_Menu",
        GameStart => "S_Game_Start",
        GamePlay => "S_Game_Play",
        GameDisplayNext => "S_Game_Display_Next",
        GameDone => "S_Game_Done",
        GameStop => "S_Game_Stop",
        MainOptions => "S_Main_Options",
        MainTest => "S_Main_Test",
        Shutdown => "S_Shutdown",
        ShutdownSelect => "S_Shutdown_Select",
        ShutdownDone => "S_Shutdown_Done",

        OptionsSelect => "S_Options_Select",
        OptGameZ => "S_Opt_Game_Z",
        OptGameZSelect => "S_Opt_Game_Z_Select",
        OptGameXyz => "S_Opt_Game_XYZ",
        OptGameXyzSelect => "S_Opt_Game_XYZ_Select",
        OptGameFlight => "S_Opt_Game_Flight",
        OptGameFlightSelect => "S_Opt_Game_Flight_Select",
        OptGameMove => "S_Opt_Game_Move",
        OptGameMoveSelect => "S_Opt_Game_Move_Select",
        OptGameAuto => "S_Opt_Game_Auto",
        OptGameAutoSelect => "S_Opt_Game_Auto_Select",
        OptGameBack => "S_Opt_Game_Back",

        OptGravity => "S_Opt_Gravity",
        OptGravityFull => "S_Opt_Gravity_Full",
        OptGravityFullSelect => "S_Opt_Gravity_Full_Select",
        OptGravityHigh => "S_Opt_Gravity_High",
        OptGravityHighSelect => "S_Opt_Gravity_High_Select",
        OptGravityNone => "S_Opt_Gravity_None",
        OptGravityNoneSelect => "S_Opt_Gravity_None_Select",
        OptGravityNegative => "S_Opt_Gravity_Negative",
        OptGravityNegativeSelect => "S_Opt_Gravity_Negative_Select",
        OptGravityBack => "S_Opt_Gravity_Back",

        OptFuel => "S_Opt_Fuel",
        OptFuelNormal => "S_Opt_Fuel_Normal",
        OptFuelNormalSelect => "S_Opt_Fuel_Normal_Select",
        OptFuelLow => "S_Opt_Fuel_Low",
        OptFuelLowSelect => "S_Opt_Fuel_Low_Select",
        OptFuelNolimit => "S_Opt_Fuel_Nolimit",
        OptFuelNolimitSelect => "S_Opt_Fuel_Nolimit_Select",
        OptFuelBack => "S_Opt_Fuel_Back",

        OptPos => "S_Opt_Pos",
        OptPosCenter => "S_Opt_Pos_Center",
        OptPosCenterSelect => "S_Opt_Pos_Center_Select",
        OptPosRandom => "S_Opt_Pos_Random",
        OptPosRandomSelect => "S_Opt_Pos_Random_Select",
        OptPosBack => "S_Opt_Pos_Back",
        OptBack => "S_Opt_Back",

        TestSelect => "S_Test_Select",
        IoState => "S_IO_STATE",
        TestSanityTest => "S_Test_SanityTest",
        TestSanitySelect => "S_Test_Sanity_Select",
        TestSimulation => "S_Test_Simulation",
        SimMicroMetersSelect => "S_Test_Simulation_MicroMeters_Select",
        SimMilliMetersSelect => "S_Test_Simulation_MilliMeters_Select",
        SimCablesSelect => "S_Test_Simulation_Cables_Select",
        SimStepsSelect => "S_Test_Simulation_Steps_Select",
        SimPause => "S_Test_Simulation_Pause",
        SimResume => "S_Test_Simulation_Resume",

        TestMotorTest => "S_Test_Motor_Test",
        MotorNextSet => "S_TestMotor_NextSet",
        MotorNextSetGo => "S_TestMotor_NextSet_Go",
        MotorNextSetDone => "S_TestMotor_NextSet_Done",
        MotorPlusStep => "S_TestMotor_PlusStep",
        MotorPlusStepGo => "S_TestMotor_PlusStep_Go",
        MotorMinusStep => "S_TestMotor_MinusStep",
        MotorMinusStepGo => "S_TestMotor_MinusStep_Go",
        MotorPlus360 => "S_TestMotor_Plus360",
        MotorPlus360Go => "S_TestMotor_Plus360_Go",
        MotorMinus360 => "S_TestMotor_Minus360",
        MotorMinus360Go => "S_TestMotor_Minus360_Go",

        TestCalibrateHome => "S_Test_Calibrate_Home",
        TestCalibratePosition => "S_Test_Calibrate_Position",
        CalibratePositionSelect => "S_Calibrate_Position_Select",
        CalibratePositionGo => "S_Calibrate_Position_Go",
        TestMotorStatus => "S_Test_Motor_Status",
        TestMotorStatusSelect => "S_Test_Motor_Status_Select",
        TestBack => "S_Test_Back",

        OrphanError => "S_Orphan_Error",
        OrphanErrorK1 => "S_Orphan_Error_K1",
        OrphanErrorK2 => "S_Orphan_Error_K2",
    }
}

named_ids! {
    /// Identity of an enter, loop or exit behaviour.
    pub enum CallbackId {
        MainMenuEnter => "S_Main_Menu_enter",
        StartAtHomeEnter => "S_Start_At_Home_enter",
        CalibrateInitEnter => "S_Calibrate_Init_enter",
        CalibrateHomeLoop => "S_CalibrateHome_loop",
        CalibrateHomeDoneEnter => "S_CalibrateHome_Done_enter",
        CalibrateHomeLockEnter => "S_CalibrateHome_Lock_enter",
        CalibratePositionEnter => "S_Calibrate_Position_Enter",
        CalibratePositionLoop => "S_Calibrate_Position_Loop",
        CalibratePositionGoEnter => "S_Calibrate_Position_Go_enter",
        TestMotorStatusLoop => "S_Test_Motor_Status_loop",

        GameStartEnter => "S_Game_Start_enter",
        GameStartLoop => "S_Game_Start_loop",
        GamePlayLoop => "S_Game_Play_loop",
        GameDoneEnter => "S_Game_Done_enter",
        GameDisplayNextEnter => "S_Game_Display_Next_enter",

        OptGameZEnter => "S_Opt_Game_Z_Enter",
        OptGameXyzEnter => "S_Opt_Game_XYZ_Enter",
        OptGameFlightEnter => "S_Opt_Game_Flight_Enter",
        OptGameMoveEnter => "S_Opt_Game_Move_Enter",
        OptGameAutoEnter => "S_Opt_Game_Auto_Enter",
        OptGravityFullEnter => "S_Opt_Gravity_Full_Enter",
        OptGravityHighEnter => "S_Opt_Gravity_High_Enter",
        OptGravityNoneEnter => "S_Opt_Gravity_None_Enter",
        OptGravityNegativeEnter => "S_Opt_Gravity_Negative_Enter",
        OptFuelNormalEnter => "S_Opt_Fuel_Normal_Enter",
        OptFuelLowEnter => "S_Opt_Fuel_Low_Enter",
        OptFuelNolimitEnter => "S_Opt_Fuel_Nolimit_Enter",
        OptPosCenterEnter => "S_Opt_Pos_Center_Enter",
        OptPosRandomEnter => "S_Opt_Pos_Random_Enter",

        TestEnter => "S_Test_enter",
        IoStateLoop => "S_IO_STATE_loop",
        TestSanityEnter => "S_Test_Sanity_enter",
        SimMetersEnter => "S_Test_Simulation_Meters_enter",
        SimMicroMetersLoop => "S_Test_Simulation_MicroMeters_loop",
        SimMilliMetersLoop => "S_Test_Simulation_MilliMeters_loop",
        SimCablesEnter => "S_Test_Simulation_Cables_enter",
        SimCablesLoop => "S_Test_Simulation_Cables_loop",
        SimStepsEnter => "S_Test_Simulation_Steps_enter",
        SimStepsLoop => "S_Test_Simulation_Steps_loop",
        SimPauseEnter => "do_Simulation_Pause_enter",
        SimResumeEnter => "do_Simulation_Resume_enter",

        MotorNextSetEnter => "S_TestMotor_NextSet_enter",
        MotorNextSetDoneEnter => "S_TestMotor_NextSet_Done_enter",
        MotorPlusStepEnter => "S_TestMotor_PlusStep_enter",
        MotorMinusStepEnter => "S_TestMotor_MinusStep_enter",
        MotorPlus360Enter => "S_TestMotor_Plus360_enter",
        MotorMinus360Enter => "S_TestMotor_Minus360_enter",

        ShutdownEnter => "S_Shutdown_enter",
        ShutdownLoop => "S_Shutdown_loop",

        OrphanErrorEnter => "S_Orphan_Error_Enter",
        OrphanErrorLoop => "S_Orphan_Error_Loop",
        OrphanErrorExit => "S_Orphan_Error_Exit",
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_unique() {
        let states: HashSet<_> = StateId::ALL.iter().map(|s| s.name()).collect();
        assert_eq!(states.len(), StateId::ALL.len());

        let callbacks: HashSet<_> = CallbackId::ALL.iter().map(|c| c.name()).collect();
        assert_eq!(callbacks.len(), CallbackId::ALL.len());

        assert_eq!(format!("{}", StateId::MainMenu), "S_Main_Menu");
    }
}
