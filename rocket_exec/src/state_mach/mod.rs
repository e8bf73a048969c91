//! # State machine module
//!
//! A table driven state machine for the two button, two line display interface. Every state in the
//! [`StateRegistry`] declares its display lines, the state each button leads to, and the enter,
//! loop and exit callbacks to run.
//!
//! Callbacks are named by [`CallbackId`] and run through the [`Callbacks`] implementation handed to
//! the machine, so an identifier with no behaviour behind it is a logged configuration error. A
//! callback asks for a transition by returning a [`Goto`]; when an enter callback does this the
//! machine keeps transitioning until the cascade settles, and the superseded states are never
//! rendered.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod ids;
mod registry;
pub mod table;
mod validate;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use ids::{CallbackId, StateId};
pub use registry::{StateDef, StateFlags, StateRegistry, REGISTRY_CAPACITY};
pub use validate::ValidationReport;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::{
    display::{fit, DisplayLines},
    input::ControlInputs,
};
use log::{debug, error, info, warn};
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The state machine context.
pub struct StateMachine {
    registry: StateRegistry,

    /// Index of the current state.
    current: usize,

    /// Index of the state before the last transition.
    previous: usize,

    /// State both buttons lead to from anywhere.
    home: StateId,

    /// Lines last rendered.
    lcd: DisplayLines,

    /// Trace each rendered display to the log.
    pub verbose: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A transition requested by a callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Goto {
    /// Transition and render the new state.
    Show(StateId),

    /// Transition without rendering, the caller takes care of the display.
    Jump(StateId),
}

/// How a callback is being dispatched.
pub enum Dispatch<'a> {
    /// Run the behaviour.
    Live(&'a mut StateMachine),

    /// Only check the behaviour exists, nothing may be changed.
    Validate,
}

#[derive(Debug, Error)]
pub enum StateError {
    #[error("The state table is empty")]
    EmptyTable,

    #[error("No behaviour for callback {0}")]
    MissingCallback(CallbackId),
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Behaviour behind the callback identifiers.
pub trait Callbacks {
    /// The inputs the machine reads button edges from.
    fn inputs(&mut self) -> &mut ControlInputs;

    /// Run (or in validation only resolve) the behaviour of a callback.
    ///
    /// Must return [`StateError::MissingCallback`] for an identifier with no behaviour, in either
    /// mode.
    fn dispatch(&mut self, id: CallbackId, mode: Dispatch<'_>)
        -> Result<Option<Goto>, StateError>;
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Goto {
    pub fn target(self) -> StateId {
        match self {
            Goto::Show(id) | Goto::Jump(id) => id,
        }
    }

    pub fn skips_display(self) -> bool {
        matches!(self, Goto::Jump(_))
    }
}

impl StateMachine {
    /// Create a machine over a registry, starting in its first state.
    pub fn new(registry: StateRegistry, home: StateId, verbose: bool) -> Result<Self, StateError> {
        if registry.is_empty() {
            return Err(StateError::EmptyTable);
        }

        if registry.resolve(home).is_none() {
            warn!("Home state {} is not registered", home);
        }

        Ok(Self {
            registry,
            current: 0,
            previous: 0,
            home,
            lcd: DisplayLines::new(),
            verbose,
        })
    }

    pub fn registry(&self) -> &StateRegistry {
        &self.registry
    }

    pub fn current(&self) -> StateId {
        self.registry[self.current].id
    }

    pub fn previous(&self) -> StateId {
        self.registry[self.previous].id
    }

    pub fn current_def(&self) -> &StateDef {
        &self.registry[self.current]
    }

    /// What the display is showing.
    pub fn lcd(&self) -> &DisplayLines {
        &self.lcd
    }

    /// Put the machine in its first state and render it, without running any callback.
    pub fn start(&mut self) {
        self.current = 0;
        self.previous = 0;
        info!("Starting in {}", self.current());
        self.render();
    }

    /// Transition to `target` and render it, `None` does nothing.
    pub fn goto<C: Callbacks>(&mut self, target: Option<StateId>, ctx: &mut C) {
        if let Some(id) = target {
            self.transition(Goto::Show(id), ctx);
        }
    }

    /// Transition to `target` without rendering it, `None` does nothing.
    pub fn jump<C: Callbacks>(&mut self, target: Option<StateId>, ctx: &mut C) {
        if let Some(id) = target {
            self.transition(Goto::Jump(id), ctx);
        }
    }

    /// Perform a transition, following any cascade requested by enter callbacks.
    pub fn transition<C: Callbacks>(&mut self, goto: Goto, ctx: &mut C) {
        let mut next = Some(goto);
        let mut hops = 0;

        while let Some(goto) = next.take() {
            hops += 1;
            if hops > REGISTRY_CAPACITY {
                error!("Transition cascade did not settle, stopped in {}", self.current());
                return;
            }

            let index = match self.registry.resolve(goto.target()) {
                Some(i) => i,
                None => {
                    error!("Could not find state {}", goto.target());
                    return;
                }
            };

            // Exit the current state
            let exit = self.registry[self.current].exit;
            if let Some(g) = self.run(exit, ctx) {
                warn!(
                    "Exit callback of {} asked for {}, ignored",
                    self.current(),
                    g.target()
                );
            }

            self.previous = self.current;
            self.current = index;

            if self.current_def().flags.contains(StateFlags::NO_VERBOSE) {
                debug!("NEW_STATE={}", self.current());
            }
            else {
                info!("NEW_STATE={}", self.current());
            }

            // Enter the new one, which may move on straight away
            let enter = self.registry[self.current].enter;
            let mut superseded = false;
            if let Some(g) = self.run(enter, ctx) {
                match self.registry.resolve(g.target()) {
                    Some(i) => {
                        superseded = i != self.current;
                        next = Some(g);
                    }
                    None => error!("Could not find state {}", g.target()),
                }
            }

            if !superseded
                && !goto.skips_display()
                && !self.current_def().flags.contains(StateFlags::NO_DISPLAY)
            {
                self.render();
            }
        }
    }

    /// Run one control tick: act on button edges then run the current state's loop callback.
    pub fn tick<C: Callbacks>(&mut self, ctx: &mut C) {
        let inputs = *ctx.inputs();
        let keys = self.current_def().keys;

        if inputs.both_rising() {
            self.goto(Some(self.home), ctx);
        }
        else if inputs.a_rising() {
            self.goto(keys[0], ctx);
        }
        else if inputs.b_rising() {
            self.goto(keys[1], ctx);
        }

        let flags = self.current_def().flags;
        let latch = ctx.inputs();
        if !flags.contains(StateFlags::BUTTON_HOLD_A) {
            latch.button_a_prev = latch.button_a;
        }
        if !flags.contains(StateFlags::BUTTON_HOLD_B) {
            latch.button_b_prev = latch.button_b;
        }

        let on_loop = self.current_def().on_loop;
        if let Some(g) = self.run(on_loop, ctx) {
            self.transition(g, ctx);
        }
    }

    /// Replace one display line of the current state.
    pub fn set_line(&mut self, row: usize, text: &str) {
        if let Some(line) = self
            .registry
            .get_mut(self.current)
            .and_then(|d| d.lines.get_mut(row))
        {
            *line = fit(text);
        }
    }

    /// Write text over part of one display line of the current state, starting at `col`.
    pub fn overlay(&mut self, row: usize, col: usize, text: &str) {
        if let Some(line) = self
            .registry
            .get_mut(self.current)
            .and_then(|d| d.lines.get_mut(row))
        {
            let mut chars: Vec<char> = line.chars().collect();
            for (c, t) in chars.iter_mut().skip(col).zip(text.chars()) {
                *c = t;
            }
            *line = chars.into_iter().collect();
        }
    }

    /// Send the current state's lines to the display.
    pub fn render(&mut self) {
        let def = &self.registry[self.current];
        self.lcd.show(&def.lines[0], &def.lines[1]);

        if self.verbose && !def.flags.contains(StateFlags::NO_VERBOSE) {
            info!("/----------------\\ State={}", def.id);
            info!("|{}|", self.lcd.line(0));
            info!("|{}|", self.lcd.line(1));
            info!("\\----------------/");
            info!("1:={}, 2={}", key_name(def.k1()), key_name(def.k2()));
        }
    }

    /// Dispatch a callback live, logging a missing behaviour.
    fn run<C: Callbacks>(&mut self, id: Option<CallbackId>, ctx: &mut C) -> Option<Goto> {
        let id = id?;
        match ctx.dispatch(id, Dispatch::Live(self)) {
            Ok(g) => g,
            Err(e) => {
                error!("{} (in state {})", e, self.current());
                None
            }
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn key_name(key: Option<StateId>) -> &'static str {
    key.map(|k| k.name()).unwrap_or("None")
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use comms_if::eqpt::input::InputSample;
    use std::collections::HashMap;

    /// Callbacks that record what ran and answer with preset transitions.
    #[derive(Default)]
    pub(crate) struct Recorder {
        pub inputs: ControlInputs,
        pub calls: Vec<CallbackId>,
        pub gotos: HashMap<CallbackId, Goto>,
        pub missing: Vec<CallbackId>,
    }

    impl Callbacks for Recorder {
        fn inputs(&mut self) -> &mut ControlInputs {
            &mut self.inputs
        }

        fn dispatch(
            &mut self,
            id: CallbackId,
            mode: Dispatch<'_>,
        ) -> Result<Option<Goto>, StateError> {
            if self.missing.contains(&id) {
                return Err(StateError::MissingCallback(id));
            }

            match mode {
                Dispatch::Validate => Ok(None),
                Dispatch::Live(_) => {
                    self.calls.push(id);
                    Ok(self.gotos.get(&id).copied())
                }
            }
        }
    }

    impl Recorder {
        pub fn press(&mut self, a: bool, b: bool) {
            self.inputs.apply(&InputSample {
                button_a: a,
                button_b: b,
                ..Default::default()
            });
        }
    }

    fn table() -> StateRegistry {
        use CallbackId as C;
        use StateId as S;

        let mut r = StateRegistry::new();
        r.register(StateDef::new(
            S::Init,
            StateFlags::FROM_CALLBACK,
            [" Rocket Lander! ", "Menu"],
            [Some(S::MainMenu), None],
            [None, None, None],
        ));
        r.register(StateDef::new(
            S::MainMenu,
            StateFlags::NONE,
            [" Rocket Lander! ", "Next       Play!"],
            [Some(S::Shutdown), Some(S::GameStart)],
            [Some(C::MainMenuEnter), None, None],
        ));
        r.register(StateDef::new(
            S::GameStart,
            StateFlags::NONE,
            ["Move to start...", "Cancel"],
            [Some(S::GameStop), None],
            [Some(C::GameStartEnter), Some(C::GameStartLoop), None],
        ));
        r.register(StateDef::new(
            S::GamePlay,
            StateFlags::FROM_CALLBACK,
            ["Playing", ""],
            [Some(S::GameStop), None],
            [None, Some(C::GamePlayLoop), Some(C::OrphanErrorExit)],
        ));
        r.register(StateDef::new(
            S::GameStop,
            StateFlags::NONE,
            ["  <GAME STOP>   ", "Main      Replay"],
            [Some(S::MainMenu), Some(S::Start)],
            [None, None, None],
        ));
        r.register(StateDef::new(
            S::Shutdown,
            StateFlags::NO_DISPLAY | StateFlags::BUTTON_HOLD_A,
            ["Hidden", ""],
            [None, Some(S::MainMenu)],
            [None, None, None],
        ));
        r
    }

    fn machine() -> (StateMachine, Recorder) {
        let mut fsm = StateMachine::new(table(), StateId::MainMenu, true).unwrap();
        fsm.start();
        (fsm, Recorder::default())
    }

    #[test]
    fn test_start() {
        let (fsm, _) = machine();
        assert_eq!(fsm.current(), StateId::Init);
        assert_eq!(fsm.lcd().line(0), " Rocket Lander! ");
        assert_eq!(fsm.lcd().refresh_count, 1);

        assert!(matches!(
            StateMachine::new(StateRegistry::new(), StateId::MainMenu, false),
            Err(StateError::EmptyTable)
        ));
    }

    #[test]
    fn test_no_action() {
        let (mut fsm, mut rec) = machine();
        fsm.goto(None, &mut rec);
        fsm.jump(None, &mut rec);

        assert_eq!(fsm.current(), StateId::Init);
        assert!(rec.calls.is_empty());
        assert_eq!(fsm.lcd().refresh_count, 1);
    }

    #[test]
    fn test_unknown_target() {
        let (mut fsm, mut rec) = machine();
        fsm.goto(Some(StateId::GamePlay), &mut rec);
        rec.calls.clear();

        // GameStop's k2 leads nowhere
        fsm.goto(Some(StateId::GameStop), &mut rec);
        let calls = rec.calls.len();
        fsm.goto(Some(StateId::Start), &mut rec);

        assert_eq!(fsm.current(), StateId::GameStop);
        assert_eq!(rec.calls.len(), calls);
    }

    #[test]
    fn test_render() {
        let (mut fsm, mut rec) = machine();
        fsm.goto(Some(StateId::MainMenu), &mut rec);

        assert_eq!(fsm.current(), StateId::MainMenu);
        assert_eq!(fsm.previous(), StateId::Init);
        assert_eq!(fsm.lcd().line(1), "Next       Play!");
        assert_eq!(rec.calls, vec![CallbackId::MainMenuEnter]);

        // Jumps don't render
        let count = fsm.lcd().refresh_count;
        fsm.jump(Some(StateId::GameStop), &mut rec);
        assert_eq!(fsm.lcd().refresh_count, count);

        // Neither do states which say so
        fsm.goto(Some(StateId::Shutdown), &mut rec);
        assert_eq!(fsm.current(), StateId::Shutdown);
        assert_eq!(fsm.lcd().refresh_count, count);
    }

    #[test]
    fn test_cascade() {
        let (mut fsm, mut rec) = machine();
        rec.gotos
            .insert(CallbackId::GameStartEnter, Goto::Jump(StateId::GamePlay));
        let count = fsm.lcd().refresh_count;

        fsm.goto(Some(StateId::GameStart), &mut rec);

        assert_eq!(fsm.current(), StateId::GamePlay);
        assert_eq!(fsm.previous(), StateId::GameStart);
        assert_eq!(rec.calls, vec![CallbackId::GameStartEnter]);

        // GameStart was superseded, GamePlay was jumped to
        assert_eq!(fsm.lcd().refresh_count, count);

        // A cascade ending in a shown state renders it once
        rec.gotos
            .insert(CallbackId::GameStartEnter, Goto::Show(StateId::GameStop));
        fsm.goto(Some(StateId::GameStart), &mut rec);
        assert_eq!(fsm.current(), StateId::GameStop);
        assert_eq!(fsm.lcd().refresh_count, count + 1);
        assert_eq!(fsm.lcd().line(0), "  <GAME STOP>   ");
    }

    #[test]
    fn test_cascade_to_unknown() {
        let (mut fsm, mut rec) = machine();
        rec.gotos
            .insert(CallbackId::GameStartEnter, Goto::Show(StateId::Start));

        fsm.goto(Some(StateId::GameStart), &mut rec);

        // The bad request is dropped and the entered state still rendered
        assert_eq!(fsm.current(), StateId::GameStart);
        assert_eq!(fsm.lcd().line(0), "Move to start...");
    }

    #[test]
    fn test_exit_goto_ignored() {
        let (mut fsm, mut rec) = machine();
        rec.gotos
            .insert(CallbackId::OrphanErrorExit, Goto::Show(StateId::MainMenu));
        fsm.jump(Some(StateId::GamePlay), &mut rec);

        fsm.goto(Some(StateId::GameStop), &mut rec);
        assert_eq!(fsm.current(), StateId::GameStop);
        assert_eq!(rec.calls, vec![CallbackId::OrphanErrorExit]);
    }

    #[test]
    fn test_missing_callback() {
        let (mut fsm, mut rec) = machine();
        rec.missing.push(CallbackId::MainMenuEnter);

        fsm.goto(Some(StateId::MainMenu), &mut rec);
        assert_eq!(fsm.current(), StateId::MainMenu);
        assert_eq!(fsm.lcd().line(1), "Next       Play!");
    }

    #[test]
    fn test_tick_buttons() {
        let (mut fsm, mut rec) = machine();

        rec.press(true, false);
        fsm.tick(&mut rec);
        assert_eq!(fsm.current(), StateId::MainMenu);
        assert!(rec.inputs.button_a_prev);

        // Held, no new edge
        fsm.tick(&mut rec);
        assert_eq!(fsm.current(), StateId::MainMenu);

        rec.press(false, false);
        fsm.tick(&mut rec);
        rec.press(false, true);
        fsm.tick(&mut rec);
        assert_eq!(fsm.current(), StateId::GameStart);

        // Loop callback ran on the same tick
        assert_eq!(rec.calls.last(), Some(&CallbackId::GameStartLoop));
    }

    #[test]
    fn test_both_buttons() {
        let (mut fsm, mut rec) = machine();
        fsm.goto(Some(StateId::GameStop), &mut rec);

        // GameStop's k1 and k2 don't matter
        rec.press(true, true);
        fsm.tick(&mut rec);
        assert_eq!(fsm.current(), StateId::MainMenu);

        // Still held, no further transitions
        fsm.goto(Some(StateId::GameStop), &mut rec);
        fsm.tick(&mut rec);
        assert_eq!(fsm.current(), StateId::GameStop);
    }

    #[test]
    fn test_hold_flag() {
        let (mut fsm, mut rec) = machine();
        fsm.goto(Some(StateId::Shutdown), &mut rec);

        rec.press(true, false);
        fsm.tick(&mut rec);
        assert!(!rec.inputs.button_a_prev);
        assert!(rec.inputs.a_rising());

        fsm.goto(Some(StateId::GameStop), &mut rec);
        fsm.tick(&mut rec);
        assert_eq!(fsm.current(), StateId::MainMenu);
        assert!(rec.inputs.button_a_prev);
    }

    #[test]
    fn test_loop_goto() {
        let (mut fsm, mut rec) = machine();
        rec.gotos
            .insert(CallbackId::GamePlayLoop, Goto::Show(StateId::GameStop));
        fsm.jump(Some(StateId::GamePlay), &mut rec);

        fsm.tick(&mut rec);
        assert_eq!(fsm.current(), StateId::GameStop);
        assert_eq!(fsm.previous(), StateId::GamePlay);
    }

    #[test]
    fn test_lines() {
        let (mut fsm, mut rec) = machine();
        fsm.goto(Some(StateId::GameStart), &mut rec);

        fsm.set_line(0, "Progress=  50");
        fsm.overlay(1, 5, "NE");
        fsm.set_line(7, "ignored");
        fsm.render();

        assert_eq!(fsm.lcd().line(0), "Progress=  50   ");
        assert_eq!(fsm.lcd().line(1), "CanceNE         ");
    }
}
