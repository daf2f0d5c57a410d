#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use arcade_bros::Settings;
use arcade_bros::consts::SIM_DT;
use arcade_bros::sim::{
    Campaign, EventSink, GameEvent, GamePhase, GameState, LevelDef, PlayerIntent, SpawnEntry,
    Species, TickInput, tick,
};

/// Sink sharing what it records with the test
#[derive(Clone, Default)]
pub struct Recorder(pub Rc<RefCell<Vec<GameEvent>>>);

impl Recorder {
    pub fn events(&self) -> Vec<GameEvent> {
        self.0.borrow().clone()
    }

    pub fn count(&self, matches: impl Fn(&GameEvent) -> bool) -> usize {
        self.0.borrow().iter().filter(|e| matches(e)).count()
    }
}

impl EventSink for Recorder {
    fn on_event(&mut self, event: &GameEvent) {
        self.0.borrow_mut().push(event.clone());
    }
}

/// Settings with fireballs pushed far into the future
pub fn quiet_settings() -> Settings {
    Settings {
        bouncing_cooldown_min: 10_000.0,
        bouncing_cooldown_max: 10_000.0,
        sweeping_cooldown_min: 10_000.0,
        sweeping_cooldown_max: 10_000.0,
        ..Settings::default()
    }
}

/// One level whose only spawn never arrives, so it never clears on its own
pub fn holding_campaign() -> Campaign {
    Campaign {
        levels: vec![LevelDef::new(0, vec![SpawnEntry::new(Species::Turtle, 10_000.0)])],
    }
}

/// One level with nothing scheduled: clears once placed enemies are gone
pub fn empty_campaign() -> Campaign {
    Campaign {
        levels: vec![LevelDef::new(0, Vec::new())],
    }
}

/// A world already in play, with a recorder attached
pub fn playing(settings: Settings, campaign: Campaign, players: usize) -> (GameState, Recorder) {
    let mut state = GameState::with_campaign(7, settings, campaign).unwrap();
    let recorder = Recorder::default();
    state.add_sink(Box::new(recorder.clone()));
    state.start_game(players).unwrap();
    state.phase = GamePhase::Playing;
    (state, recorder)
}

pub fn intents(first: PlayerIntent) -> TickInput {
    TickInput {
        players: [first, PlayerIntent::default()],
        ..Default::default()
    }
}

pub fn run(state: &mut GameState, input: &TickInput, ticks: usize) {
    for _ in 0..ticks {
        tick(state, input, SIM_DT);
    }
}

/// Tick until `done` holds, at most `limit` ticks; returns whether it did
pub fn run_until(
    state: &mut GameState,
    input: &TickInput,
    limit: usize,
    done: impl Fn(&GameState) -> bool,
) -> bool {
    for _ in 0..limit {
        tick(state, input, SIM_DT);
        if done(state) {
            return true;
        }
    }
    false
}
