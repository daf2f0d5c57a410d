//! Per-actor finite state machine
//!
//! Each actor owns a machine mapping state ids to enter/exit/update hooks.
//! Hooks are plain function pointers so a species picks its overrides when it
//! registers its states, and the machine can hand the actor itself to them
//! without aliasing the table.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::SimError;
use super::events::EventQueue;
use super::grid::Grid;
use super::spawn::SpawnSlots;
use super::tick::PlayerIntent;
use crate::settings::Settings;

/// Character states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateId {
    Idle,
    Walk,
    Jump,
    Fall,
    Flipped,
    Dying,
    Dead,
    /// Enemy only: coming out of a top pipe
    Entering,
    /// Enemy only: leaving through a bottom pipe
    Exiting,
    /// Player only: riding the respawn elevator
    Respawn,
}

/// Everything a hook may read or write besides its own actor
pub struct SimContext<'a> {
    pub grid: &'a Grid,
    pub settings: &'a Settings,
    pub slots: &'a mut SpawnSlots,
    pub events: &'a mut EventQueue,
    /// Input for the actor being updated (neutral for enemies)
    pub intent: PlayerIntent,
}

impl<'a> SimContext<'a> {
    pub fn new(
        grid: &'a Grid,
        settings: &'a Settings,
        slots: &'a mut SpawnSlots,
        events: &'a mut EventQueue,
    ) -> Self {
        Self {
            grid,
            settings,
            slots,
            events,
            intent: PlayerIntent::default(),
        }
    }

    pub fn with_intent(mut self, intent: PlayerIntent) -> Self {
        self.intent = intent;
        self
    }
}

pub type EnterHook<A> = fn(&mut A, &mut SimContext<'_>);
pub type ExitHook<A> = fn(&mut A, &mut SimContext<'_>);
/// `(actor, ctx, delta_time, elapsed_in_state)`
pub type UpdateHook<A> = fn(&mut A, &mut SimContext<'_>, f32, f32);

/// Hooks registered for one state
pub struct StateHooks<A> {
    pub on_enter: Option<EnterHook<A>>,
    pub on_exit: Option<ExitHook<A>>,
    pub on_update: Option<UpdateHook<A>>,
}

impl<A> StateHooks<A> {
    pub fn new(
        on_enter: Option<EnterHook<A>>,
        on_exit: Option<ExitHook<A>>,
        on_update: Option<UpdateHook<A>>,
    ) -> Self {
        Self {
            on_enter,
            on_exit,
            on_update,
        }
    }
}

impl<A> Clone for StateHooks<A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A> Copy for StateHooks<A> {}

/// Single-current-state machine with an elapsed-in-state clock
pub struct StateMachine<A> {
    states: HashMap<StateId, StateHooks<A>>,
    current: Option<StateId>,
    elapsed: f32,
}

impl<A> Default for StateMachine<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for StateMachine<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut registered: Vec<_> = self.states.keys().collect();
        registered.sort_by_key(|id| format!("{id:?}"));
        f.debug_struct("StateMachine")
            .field("current", &self.current)
            .field("elapsed", &self.elapsed)
            .field("registered", &registered)
            .finish()
    }
}

impl<A> StateMachine<A> {
    pub fn new() -> Self {
        Self {
            states: HashMap::new(),
            current: None,
            elapsed: 0.0,
        }
    }

    /// Register a state. The first registration wins; later ones are ignored.
    pub fn add_state(&mut self, id: StateId, hooks: StateHooks<A>) -> bool {
        if self.states.contains_key(&id) {
            return false;
        }
        self.states.insert(id, hooks);
        true
    }

    pub fn is_registered(&self, id: StateId) -> bool {
        self.states.contains_key(&id)
    }

    pub fn current(&self) -> Option<StateId> {
        self.current
    }

    pub fn is_in(&self, id: StateId) -> bool {
        self.current == Some(id)
    }

    /// Seconds since the current state was entered
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    fn hooks(&self, id: StateId) -> Option<StateHooks<A>> {
        self.states.get(&id).copied()
    }
}

/// Anything that owns a machine keyed on itself
pub trait Stateful: Sized {
    fn machine(&self) -> &StateMachine<Self>;
    fn machine_mut(&mut self) -> &mut StateMachine<Self>;
}

/// Leave the current state and enter `to`.
///
/// The target must be registered; the old state's exit hook always runs before
/// the new state's enter hook, and the elapsed clock restarts at zero.
pub fn transition<A: Stateful>(
    actor: &mut A,
    ctx: &mut SimContext<'_>,
    to: StateId,
) -> Result<(), SimError> {
    let Some(target) = actor.machine().hooks(to) else {
        return Err(SimError::UnregisteredState(to));
    };

    let exit = actor
        .machine()
        .current
        .and_then(|id| actor.machine().hooks(id))
        .and_then(|hooks| hooks.on_exit);
    if let Some(on_exit) = exit {
        on_exit(actor, ctx);
    }

    let machine = actor.machine_mut();
    machine.current = Some(to);
    machine.elapsed = 0.0;

    if let Some(on_enter) = target.on_enter {
        on_enter(actor, ctx);
    }
    Ok(())
}

/// Advance the clock and run the current state's update hook
pub fn update<A: Stateful>(actor: &mut A, ctx: &mut SimContext<'_>, delta_time: f32) {
    let machine = actor.machine_mut();
    let Some(current) = machine.current else {
        return;
    };
    machine.elapsed += delta_time;
    let elapsed = machine.elapsed;
    let on_update = machine.hooks(current).and_then(|hooks| hooks.on_update);
    if let Some(on_update) = on_update {
        on_update(actor, ctx, delta_time, elapsed);
    }
}
