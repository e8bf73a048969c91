//! State definitions and the registry holding them

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::display::{fit, DISPLAY_ROWS};
use log::error;

use super::{CallbackId, StateId};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Maximum number of states a registry can hold.
pub const REGISTRY_CAPACITY: usize = 160;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Behaviour flags of a state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateFlags(u32);

/// One entry of the state table.
#[derive(Debug, Clone)]
pub struct StateDef {
    pub id: StateId,
    pub flags: StateFlags,

    /// The two display lines, always exactly the display width.
    pub lines: [String; DISPLAY_ROWS],

    /// Transition taken on a fresh press of button A (k1) and button B (k2), `None` for no action.
    pub keys: [Option<StateId>; 2],

    pub enter: Option<CallbackId>,
    pub on_loop: Option<CallbackId>,
    pub exit: Option<CallbackId>,
}

/// Append-only, insertion-ordered collection of states.
#[derive(Debug, Clone, Default)]
pub struct StateRegistry {
    defs: Vec<StateDef>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl StateFlags {
    pub const NONE: StateFlags = StateFlags(0x0000);

    /// Entering the state doesn't refresh the display.
    pub const NO_DISPLAY: StateFlags = StateFlags(0x0001);

    /// The display box isn't traced to the log.
    pub const NO_VERBOSE: StateFlags = StateFlags(0x0002);

    /// Button A's previous level isn't latched while in this state, so holding it repeats.
    pub const BUTTON_HOLD_A: StateFlags = StateFlags(0x0004);

    pub const BUTTON_HOLD_B: StateFlags = StateFlags(0x0008);

    /// The state is only reached by a callback, not by any key.
    pub const FROM_CALLBACK: StateFlags = StateFlags(0x0010);

    pub fn contains(self, other: StateFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for StateFlags {
    type Output = StateFlags;

    fn bitor(self, rhs: StateFlags) -> StateFlags {
        StateFlags(self.0 | rhs.0)
    }
}

impl StateDef {
    pub fn new(
        id: StateId,
        flags: StateFlags,
        lines: [&str; DISPLAY_ROWS],
        keys: [Option<StateId>; 2],
        callbacks: [Option<CallbackId>; 3],
    ) -> Self {
        Self {
            id,
            flags,
            lines: [fit(lines[0]), fit(lines[1])],
            keys,
            enter: callbacks[0],
            on_loop: callbacks[1],
            exit: callbacks[2],
        }
    }

    pub fn k1(&self) -> Option<StateId> {
        self.keys[0]
    }

    pub fn k2(&self) -> Option<StateId> {
        self.keys[1]
    }

    /// The enter, loop and exit callbacks that are set.
    pub fn callbacks(&self) -> impl Iterator<Item = CallbackId> {
        vec![self.enter, self.on_loop, self.exit].into_iter().flatten()
    }
}

impl StateRegistry {
    pub fn new() -> Self {
        Self {
            defs: Vec::with_capacity(REGISTRY_CAPACITY),
        }
    }

    /// Append a state, returning its index.
    ///
    /// A full registry drops the state. A duplicate identifier is stored anyway so validation can
    /// report it. Both are logged as errors.
    pub fn register(&mut self, def: StateDef) -> Option<usize> {
        if self.defs.len() >= REGISTRY_CAPACITY {
            error!("Out of state record space, {} dropped", def.id);
            return None;
        }

        if self.resolve(def.id).is_some() {
            error!("Duplicate state {}", def.id);
        }

        self.defs.push(def);
        Some(self.defs.len() - 1)
    }

    /// Index of the first state registered with this identifier.
    pub fn resolve(&self, id: StateId) -> Option<usize> {
        self.defs.iter().position(|d| d.id == id)
    }

    pub fn get(&self, index: usize) -> Option<&StateDef> {
        self.defs.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut StateDef> {
        self.defs.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StateDef> {
        self.defs.iter()
    }
}

impl std::ops::Index<usize> for StateRegistry {
    type Output = StateDef;

    fn index(&self, index: usize) -> &StateDef {
        &self.defs[index]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn def(id: StateId) -> StateDef {
        StateDef::new(id, StateFlags::NONE, ["", ""], [None, None], [None, None, None])
    }

    #[test]
    fn test_register_resolve() {
        let mut r = StateRegistry::new();
        assert_eq!(r.register(def(StateId::Init)), Some(0));
        assert_eq!(r.register(def(StateId::MainMenu)), Some(1));

        assert_eq!(r.resolve(StateId::MainMenu), Some(1));
        assert_eq!(r.resolve(StateId::GamePlay), None);
        assert_eq!(r.get(0).map(|d| d.lines[0].len()), Some(16));
    }

    #[test]
    fn test_duplicate_kept() {
        let mut r = StateRegistry::new();
        r.register(def(StateId::OrphanError));
        assert_eq!(r.register(def(StateId::OrphanError)), Some(1));

        assert_eq!(r.len(), 2);
        assert_eq!(r.resolve(StateId::OrphanError), Some(0));
    }

    #[test]
    fn test_overflow_dropped() {
        let mut r = StateRegistry::new();
        for _ in 0..REGISTRY_CAPACITY {
            assert!(r.register(def(StateId::TestBack)).is_some());
        }

        assert_eq!(r.register(def(StateId::Init)), None);
        assert_eq!(r.len(), REGISTRY_CAPACITY);
        assert_eq!(r.resolve(StateId::Init), None);
    }

    #[test]
    fn test_flags() {
        let f = StateFlags::NO_VERBOSE | StateFlags::FROM_CALLBACK;
        assert!(f.contains(StateFlags::NO_VERBOSE));
        assert!(f.contains(StateFlags::FROM_CALLBACK));
        assert!(!f.contains(StateFlags::NO_DISPLAY));
        assert!(StateFlags::NONE.contains(StateFlags::NONE));
    }

    #[test]
    fn test_callbacks() {
        let d = StateDef::new(
            StateId::GameStart,
            StateFlags::NONE,
            ["Move to start...", "Cancel"],
            [Some(StateId::GameDone), None],
            [Some(CallbackId::GameStartEnter), Some(CallbackId::GameStartLoop), None],
        );

        let c: Vec<_> = d.callbacks().collect();
        assert_eq!(c, vec![CallbackId::GameStartEnter, CallbackId::GameStartLoop]);
        assert_eq!(d.lines[1], "Cancel          ");
    }
}
