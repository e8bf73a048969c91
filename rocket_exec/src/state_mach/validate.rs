//! Self test of the state table

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{error, info};

use super::{CallbackId, Callbacks, Dispatch, StateFlags, StateId, StateMachine, REGISTRY_CAPACITY};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Findings of [`StateMachine::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Number of states in the table.
    pub num_states: usize,

    /// Key targets which aren't registered, as (state, target).
    pub missing_targets: Vec<(StateId, StateId)>,

    /// Callbacks with no behaviour, as (state, callback).
    pub missing_callbacks: Vec<(StateId, CallbackId)>,

    /// States no key leads to which aren't flagged as reached by callback.
    pub orphans: Vec<StateId>,

    /// States no key leads to which are flagged as reached by callback.
    pub callback_only: Vec<StateId>,

    /// States registered more than once, as (state, first index, later index).
    pub duplicates: Vec<(StateId, usize, usize)>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ValidationReport {
    pub fn num_errors(&self) -> usize {
        self.missing_targets.len()
            + self.missing_callbacks.len()
            + self.orphans.len()
            + self.duplicates.len()
    }

    pub fn is_clean(&self) -> bool {
        self.num_errors() == 0
    }
}

impl StateMachine {
    /// Check the state table.
    ///
    /// Every key target must be registered, every callback must have a behaviour, every state
    /// must be reachable by some key unless flagged as reached by callback, and no state may be
    /// registered twice. Callbacks are only resolved, never run. Findings are logged and returned,
    /// none of them stop the machine.
    pub fn validate<C: Callbacks>(&self, ctx: &mut C) -> ValidationReport {
        let registry = self.registry();
        let mut report = ValidationReport {
            num_states: registry.len(),
            ..Default::default()
        };

        info!(
            "=== Self test: state table {} of {} ===",
            registry.len(),
            REGISTRY_CAPACITY
        );

        for (i, def) in registry.iter().enumerate() {
            // Keys
            for &target in def.keys.iter().flatten() {
                if registry.resolve(target).is_none() {
                    error!("Missing state {} (from {})", target, def.id);
                    report.missing_targets.push((def.id, target));
                }
            }

            // Callbacks
            for cb in def.callbacks() {
                if let Err(e) = ctx.dispatch(cb, Dispatch::Validate) {
                    error!("{} (in state {})", e, def.id);
                    report.missing_callbacks.push((def.id, cb));
                }
            }

            // Reachability
            let called = registry.iter().any(|d| d.keys.contains(&Some(def.id)));
            if !called {
                if def.flags.contains(StateFlags::FROM_CALLBACK) {
                    info!("Note: callback to otherwise orphan state {}", def.id);
                    if !report.callback_only.contains(&def.id) {
                        report.callback_only.push(def.id);
                    }
                }
                else {
                    error!("Orphan state {}", def.id);
                    if !report.orphans.contains(&def.id) {
                        report.orphans.push(def.id);
                    }
                }
            }

            // Duplicates
            for (j, other) in registry.iter().enumerate().skip(i + 1) {
                if other.id == def.id {
                    error!("Duplicate state {} ({} and {})", def.id, i, j);
                    report.duplicates.push((def.id, i, j));
                }
            }
        }

        info!("=== Self test: {} error(s) ===", report.num_errors());

        report
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::state_mach::{test::Recorder, StateDef, StateRegistry};

    fn fixture() -> StateRegistry {
        use StateId as S;

        let mut r = StateRegistry::new();
        r.register(StateDef::new(
            S::Init,
            StateFlags::FROM_CALLBACK,
            ["", ""],
            [Some(S::MainMenu), None],
            [None, None, None],
        ));
        r.register(StateDef::new(
            S::MainMenu,
            StateFlags::NONE,
            ["", ""],
            [Some(S::GameStart), Some(S::Start)],
            [Some(CallbackId::MainMenuEnter), None, None],
        ));
        r.register(StateDef::new(
            S::GameStart,
            StateFlags::NONE,
            ["", ""],
            [None, Some(S::MainMenu)],
            [Some(CallbackId::GameStartEnter), Some(CallbackId::GameStartLoop), None],
        ));
        r.register(StateDef::new(
            S::GameStart,
            StateFlags::NONE,
            ["", ""],
            [None, None],
            [None, None, None],
        ));
        r
    }

    #[test]
    fn test_duplicate_and_missing_target() {
        let fsm = StateMachine::new(fixture(), StateId::MainMenu, false).unwrap();
        let mut rec = Recorder::default();

        let report = fsm.validate(&mut rec);

        assert_eq!(report.num_states, 4);
        assert_eq!(report.missing_targets, vec![(StateId::MainMenu, StateId::Start)]);
        assert_eq!(report.duplicates, vec![(StateId::GameStart, 2, 3)]);
        assert!(report.missing_callbacks.is_empty());
        assert!(report.orphans.is_empty());
        assert_eq!(report.callback_only, vec![StateId::Init]);
        assert_eq!(report.num_errors(), 2);

        // Nothing ran and nothing moved
        assert!(rec.calls.is_empty());
        assert_eq!(fsm.current(), StateId::Init);
    }

    #[test]
    fn test_missing_callback_and_orphan() {
        let mut r = fixture();
        r.register(StateDef::new(
            StateId::GameStop,
            StateFlags::NONE,
            ["", ""],
            [None, None],
            [None, Some(CallbackId::OrphanErrorLoop), None],
        ));
        let fsm = StateMachine::new(r, StateId::MainMenu, false).unwrap();

        let mut rec = Recorder::default();
        rec.missing.push(CallbackId::OrphanErrorLoop);

        let report = fsm.validate(&mut rec);
        assert_eq!(
            report.missing_callbacks,
            vec![(StateId::GameStop, CallbackId::OrphanErrorLoop)]
        );
        assert_eq!(report.orphans, vec![StateId::GameStop]);
        assert!(!report.is_clean());
    }
}
