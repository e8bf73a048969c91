//! Main rocket rig executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the rocket space and the motor link
//!     - Build and start the state machine
//!     - Main loop:
//!         - Input acquisition, from a script if one was given
//!         - State machine tick: button edges, then the current state's loop callback
//!         - Display, cue and readout hand off to the peripheral collaborators
//!
//! # Modules
//!
//! All cyclic modules (e.g. `rocket_space`) shall provide a public struct implementing the
//! `util::module::State` trait.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use std::env;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use comms_if::eqpt::{display::DisplayLines, motor::MotorBus};
use rocket_lib::{
    game::Rocket,
    params::RocketExecParams,
    rocket_space::{MotorLink, RocketSpace},
    state_mach::{table, StateId, StateMachine},
};
use util::{
    host,
    logger::{logger_init, LevelFilter},
    module::State,
    script_interpreter::{PendingInput, ScriptInterpreter},
    session::{self, Session},
};

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("rocket_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Rocket Lander Rig Executable\n");
    info!(
        "Running on: {}",
        host::get_hostname().unwrap_or_else(|| String::from("unknown host"))
    );
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: RocketExecParams =
        util::params::load("rocket_exec.toml").wrap_err("Could not load exec params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE INPUT SOURCE ----

    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    // If we have a single argument use it as the script path
    let mut script = if args.len() == 2 {
        info!("Loading script from \"{}\"", &args[1]);

        let si = ScriptInterpreter::new(&args[1]).wrap_err("Failed to load script")?;

        info!(
            "Loaded script lasts {:.02} s and contains {} inputs\n",
            si.get_duration(),
            si.get_num_inputs()
        );

        Some(si)
    }
    else if args.len() == 1 {
        info!("No script provided, inputs will stay at rest\n");
        None
    }
    else {
        return Err(eyre!(
            "Expected either zero or one argument, found {}",
            args.len() - 1
        ));
    };

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut space = RocketSpace::default();
    space
        .init("rocket_space.toml", &session)
        .wrap_err("Failed to initialise RocketSpace")?;
    info!("RocketSpace init complete");

    space.link = MotorLink::new(
        open_bus(&exec_params).wrap_err("Failed to open the motor bus")?,
        exec_params.motor_address,
        exec_params.hardware_enabled,
    );
    info!(
        "Motor link at 0x{:02x} {}",
        exec_params.motor_address,
        if exec_params.hardware_enabled {
            "enabled"
        }
        else {
            "disabled"
        }
    );

    let mut rocket = Rocket::new(space);

    let mut fsm = StateMachine::new(table::build(), StateId::MainMenu, exec_params.verbose)
        .wrap_err("Failed to build the state machine")?;
    info!("State machine built with {} states", fsm.registry().len());

    info!("Module initialisation complete\n");

    fsm.start();

    // ---- MAIN LOOP ----

    info!("Beginning main loop\n");

    let cycle_period = Duration::from_secs_f64(exec_params.cycle_period_s);
    let mut shown = DisplayLines::new();
    let mut num_cycles: u64 = 0;

    loop {
        let cycle_start_instant = Instant::now();

        // ---- INPUT ACQUISITION ----

        if let Some(ref mut si) = script {
            match si.get_pending(session::get_elapsed_seconds()) {
                PendingInput::Some(sample) => rocket.apply_inputs(&sample),
                PendingInput::None => (),
                PendingInput::EndOfScript => {
                    info!("End of script reached, stopping");
                    break;
                }
            }
        }

        // ---- STATE MACHINE ----

        fsm.tick(&mut rocket);

        // ---- PERIPHERALS ----

        let lcd = fsm.lcd();
        if lcd.line(0) != shown.line(0) || lcd.line(1) != shown.line(1) {
            shown = lcd.clone();
            debug!("Display |{}|{}|", shown.line(0), shown.line(1));
        }

        for cue in rocket.drain_cues() {
            info!("Cue: {:?}", cue);
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => thread::sleep(d),
            None => warn!(
                "Cycle overran by {:.06} s",
                cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
            ),
        }

        num_cycles += 1;
    }

    // ---- SHUTDOWN ----

    info!("Final readouts: {:?}", rocket.readouts);
    info!("End of execution after {} cycles", num_cycles);

    Ok(())
}

/// Open the bus the motor controller is attached to.
#[cfg(all(target_arch = "arm", target_os = "linux", target_env = "gnu"))]
fn open_bus(params: &RocketExecParams) -> Result<Box<dyn MotorBus>, Report> {
    use comms_if::eqpt::{i2c_bus::I2cBus, motor::SimBus};

    if params.hardware_enabled {
        Ok(Box::new(I2cBus::new(params.i2c_bus)?))
    }
    else {
        Ok(Box::new(SimBus::new()))
    }
}

/// Open the bus the motor controller is attached to.
///
/// There is no I2C peripheral off the rig, frames always go to a simulated bus.
#[cfg(not(all(target_arch = "arm", target_os = "linux", target_env = "gnu")))]
fn open_bus(params: &RocketExecParams) -> Result<Box<dyn MotorBus>, Report> {
    if params.hardware_enabled {
        warn!("Motor hardware requested but not available on this host, simulating the bus");
    }
    Ok(Box::new(comms_if::eqpt::motor::SimBus::new()))
}
