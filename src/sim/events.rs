//! Simulation events
//!
//! Closed set of things that happen during a tick. The world reacts to some of
//! them itself (bumps, deaths) and forwards every one of them, in order, to the
//! registered sinks (audio, effects, score display).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::enemy::Species;
use crate::audio::SoundEffect;

/// Stable entity handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub u32);

/// Which fireball kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FireballKind {
    /// Bounces diagonally off walls and platforms
    Bouncing,
    /// Sweeps horizontally along a player's floor
    Sweeping,
}

/// Everything the core reports to the outside
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A jumping character hit a tile from below
    BumpStarted { bumper: ActorId },
    /// A character reached its terminal Dead state
    CharacterDied { character: ActorId },
    /// An enemy started dying (killer gets the credit)
    EnemyDying {
        enemy: ActorId,
        killer: Option<ActorId>,
    },
    /// A coin finished its collect animation
    CoinCollected {
        coin: ActorId,
        collector: Option<ActorId>,
    },
    /// An enemy was knocked onto its back
    EnemyFlipped { enemy: ActorId, by: ActorId },
    /// An enemy walked out of a pipe
    EnemySpawned { enemy: ActorId, species: Species },
    /// A player's score changed
    ScoreChanged {
        player: ActorId,
        score: u32,
        gained: u32,
    },
    /// A player crossed the extra life threshold
    ExtraLife { player: ActorId, lives: i32 },
    /// A player came back on the respawn elevator
    PlayerRespawned { player: ActorId },
    /// The POW block was hit
    PowTriggered { by: ActorId, uses_left: u32 },
    /// The POW block is used up
    PowDepleted,
    FireballSpawned { kind: FireballKind },
    FireballDestroyed { kind: FireballKind },
    LevelStarted { index: usize, bonus: bool },
    LevelCleared { index: usize },
    BonusCounted { coins: u32, perfect: bool },
    GameOver,
    /// Play a sound
    Sound(SoundEffect),
    /// Spawn a splash at the bottom of the screen
    Splash { x: f32 },
    /// Shake the camera
    CameraShake { duration: f32 },
    /// A fireball vanished at this position
    FireballPuff { at: Vec2 },
}

/// External collaborator receiving events (audio, visual effects, HUD)
pub trait EventSink {
    fn on_event(&mut self, event: &GameEvent);
}

/// Sink that keeps every event it sees (replays, tests, debugging)
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    pub events: Vec<GameEvent>,
}

impl EventSink for EventLog {
    fn on_event(&mut self, event: &GameEvent) {
        self.events.push(event.clone());
    }
}

/// Per-tick event buffer filled by characters while they update
#[derive(Debug, Default, Clone)]
pub struct EventQueue {
    pending: Vec<GameEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: GameEvent) {
        log::trace!("event {event:?}");
        self.pending.push(event);
    }

    pub fn sound(&mut self, sound: SoundEffect) {
        self.push(GameEvent::Sound(sound));
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Remove and return the oldest pending event
    pub fn pop_front(&mut self) -> Option<GameEvent> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending.remove(0))
        }
    }

    /// Take every pending event in emission order
    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.pending.iter()
    }
}
