//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (players by number, enemies by spawn order)
//! - No rendering, audio or input dependencies; side effects leave as events

pub mod actor;
pub mod animation;
pub mod character;
pub mod collision;
pub mod effects;
pub mod enemy;
pub mod error;
pub mod events;
pub mod fireball;
pub mod grid;
pub mod level;
pub mod machine;
pub mod motion;
pub mod player;
pub mod respawn;
pub mod spawn;
pub mod state;
pub mod tick;

pub use actor::Actor;
pub use animation::{AnimationSet, Animator, ClipLibrary};
pub use character::{Behavior, Character, CharacterSpec, JumpArc};
pub use collision::{PlayerContact, bump_direction, enemy_blocked_by, player_contact, player_touches_enemy};
pub use effects::{BumpEffect, Shake, Splash};
pub use enemy::{Enemy, EnemyData, Species, new_enemy};
pub use error::SimError;
pub use events::{ActorId, EventLog, EventQueue, EventSink, FireballKind, GameEvent};
pub use fireball::{Fireball, FireballState};
pub use grid::{Grid, Special, Tile, cell};
pub use level::{Campaign, Level, LevelDef, SpawnEntry};
pub use machine::{SimContext, StateHooks, StateId, StateMachine, Stateful};
pub use player::{Player, PlayerData, new_player};
pub use respawn::RespawnPlatform;
pub use spawn::{Side, SpawnSlots};
pub use state::{GamePhase, GameState, RngState};
pub use tick::{PlayerIntent, TickInput, tick};
