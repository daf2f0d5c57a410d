//! World state
//!
//! Everything one simulation owns: the grid, the characters, transient
//! effects, the level clock and the seeded RNG. Flow between phases lives in
//! `tick`.

use std::fmt;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::animation::ClipLibrary;
use super::effects::{BumpEffect, Shake, Splash};
use super::enemy::{Enemy, Species, new_enemy};
use super::error::SimError;
use super::events::{ActorId, EventQueue, EventSink, FireballKind, GameEvent};
use super::fireball::Fireball;
use super::grid::Grid;
use super::level::{Campaign, Level, LevelDef};
use super::machine::SimContext;
use super::player::{Player, new_player, player_side};
use super::respawn::RespawnPlatform;
use super::spawn::{Side, SpawnSlots};
use crate::audio::SoundEffect;
use crate::settings::Settings;

/// Current phase of the game flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for a start press
    Title,
    /// Level banner; nothing moves
    LevelStart,
    /// Active gameplay
    Playing,
    /// Every enemy is gone; short pause before the next level
    LevelCleared,
    /// Tallying coins after a bonus level
    BonusCount,
    /// Every player is out of lives
    GameOver,
}

/// Seed record for the world RNG
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}

/// Complete world (deterministic for a given seed and input sequence)
pub struct GameState {
    pub rng_state: RngState,
    pub settings: Settings,
    pub campaign: Campaign,
    pub clips: ClipLibrary,
    /// Pristine layout restored at every new game
    pub layout: Grid,
    /// Live grid (POW cells disappear when used up)
    pub grid: Grid,
    pub slots: SpawnSlots,
    /// Events raised during the tick, waiting to be dispatched
    pub events: EventQueue,
    pub phase: GamePhase,
    /// Seconds spent in the current phase
    pub phase_timer: f32,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Indexed by player number
    pub players: Vec<Player>,
    /// One elevator per player, same index
    pub elevators: Vec<RespawnPlatform>,
    /// Sorted by spawn order (ids ascending)
    pub enemies: Vec<Enemy>,
    pub bumps: Vec<BumpEffect>,
    pub splashes: Vec<Splash>,
    pub shake: Shake,
    pub fireballs: Vec<Fireball>,
    pub level: Level,
    /// Completed passes through the campaign
    pub loop_count: u32,
    /// Enemies of this level that are gone for good
    pub killed: usize,
    /// Coins collected during the current bonus level, per player
    pub bonus_coins: [u32; 2],
    pub(crate) rng: Pcg32,
    next_id: u32,
    sinks: Vec<Box<dyn EventSink>>,
    dispatched: Vec<GameEvent>,
}

impl fmt::Debug for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameState")
            .field("phase", &self.phase)
            .field("level", &self.level.index())
            .field("loop_count", &self.loop_count)
            .field("players", &self.players.len())
            .field("enemies", &self.enemies.len())
            .field("killed", &self.killed)
            .field("time_ticks", &self.time_ticks)
            .finish()
    }
}

impl GameState {
    /// New world on the arcade layout with the built-in campaign
    pub fn new(seed: u64, settings: Settings) -> Self {
        let campaign = Campaign::default();
        let first = campaign
            .levels
            .first()
            .cloned()
            .unwrap_or_else(|| LevelDef::new(0, Vec::new()));
        Self::build(seed, settings, campaign, Level::new(0, first))
    }

    /// New world with a custom campaign; fails on an empty one
    pub fn with_campaign(seed: u64, settings: Settings, campaign: Campaign) -> Result<Self, SimError> {
        let level = Level::from_campaign(&campaign, 0)?;
        Ok(Self::build(seed, settings, campaign, level))
    }

    fn build(seed: u64, settings: Settings, campaign: Campaign, level: Level) -> Self {
        let rng_state = RngState::new(seed);
        let layout = Grid::arcade(settings.pow_uses);
        Self {
            rng_state,
            grid: layout.clone(),
            layout,
            settings,
            campaign,
            clips: ClipLibrary::default(),
            slots: SpawnSlots::new(),
            events: EventQueue::new(),
            phase: GamePhase::Title,
            phase_timer: 0.0,
            time_ticks: 0,
            players: Vec::new(),
            elevators: Vec::new(),
            enemies: Vec::new(),
            bumps: Vec::new(),
            splashes: Vec::new(),
            shake: Shake::default(),
            fireballs: Vec::new(),
            level,
            loop_count: 0,
            killed: 0,
            bonus_coins: [0; 2],
            rng: rng_state.to_rng(),
            next_id: 1,
            sinks: Vec::new(),
            dispatched: Vec::new(),
        }
    }

    /// Replace the layout (takes effect at the next new game)
    pub fn set_layout(&mut self, layout: Grid) {
        self.grid = layout.clone();
        self.layout = layout;
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> ActorId {
        let id = ActorId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Register an external collaborator (audio, effects, HUD)
    pub fn add_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    /// Every event dispatched during the last tick, in order
    pub fn events_this_tick(&self) -> &[GameEvent] {
        &self.dispatched
    }

    pub(crate) fn clear_dispatched(&mut self) {
        self.dispatched.clear();
    }

    pub(crate) fn forward(&mut self, event: GameEvent) {
        for sink in self.sinks.iter_mut() {
            sink.on_event(&event);
        }
        self.dispatched.push(event);
    }

    /// Enemy speed added by campaign loops
    pub fn speed_bonus(&self) -> f32 {
        self.loop_count as f32 * self.settings.loop_speed_bonus
    }

    pub fn player(&self, id: ActorId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: ActorId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn enemy(&self, id: ActorId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn enemy_mut(&mut self, id: ActorId) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|e| e.id == id)
    }

    /// Enemies still in play (not dying, not dead)
    pub fn live_enemies(&self) -> usize {
        self.enemies
            .iter()
            .filter(|e| !e.is_dying() && !e.is_dead())
            .count()
    }

    /// Fresh game: new players, full POW block, first level
    pub fn start_game(&mut self, player_count: usize) -> Result<(), SimError> {
        let count = player_count.clamp(1, 2);
        self.grid = self.layout.clone();
        self.grid.restore_pow(self.settings.pow_uses);
        self.loop_count = 0;

        self.players.clear();
        self.elevators.clear();
        for index in 0..count {
            let id = self.next_entity_id();
            let mut player = new_player(id, index, &self.settings, &self.clips);
            player.reset_for_game(&self.settings);
            self.players.push(player);
            self.elevators.push(RespawnPlatform::new(player_side(index)));
        }

        self.fireballs = vec![
            Fireball::new(FireballKind::Bouncing, &self.settings, &mut self.rng),
            Fireball::new(FireballKind::Sweeping, &self.settings, &mut self.rng),
        ];

        log::info!("new game, {count} player(s), seed {}", self.rng_state.seed);
        self.events.sound(SoundEffect::StartGame);
        self.begin_level(0)
    }

    /// Tear down the current level and show the banner for `index`
    pub fn begin_level(&mut self, index: usize) -> Result<(), SimError> {
        self.level = Level::from_campaign(&self.campaign, index)?;
        self.enemies.clear();
        self.bumps.clear();
        self.splashes.clear();
        self.slots.release_all();
        self.killed = 0;
        self.bonus_coins = [0; 2];
        for fireball in self.fireballs.iter_mut() {
            fireball.reset(&self.settings, &mut self.rng);
        }

        for (player, elevator) in self.players.iter_mut().zip(self.elevators.iter_mut()) {
            elevator.hide();
            if player.body.is_alive() {
                let mut ctx = SimContext::new(&self.grid, &self.settings, &mut self.slots, &mut self.events);
                player.reset_state(&mut ctx);
            }
        }

        self.phase = GamePhase::LevelStart;
        self.phase_timer = 0.0;
        let bonus = self.level.is_bonus();
        log::info!("level {index} (loop {}){}", self.loop_count, if bonus { " bonus" } else { "" });
        self.events.push(GameEvent::LevelStarted { index, bonus });
        self.events.sound(SoundEffect::StartLevel);
        Ok(())
    }

    /// Create an enemy on a random side and send it through the top pipe
    pub fn spawn_enemy(&mut self, species: Species) -> ActorId {
        let side = if self.rng.random_bool(0.5) { Side::Left } else { Side::Right };
        self.spawn_enemy_at(species, side)
    }

    pub fn spawn_enemy_at(&mut self, species: Species, side: Side) -> ActorId {
        let id = self.next_entity_id();
        let mut enemy = new_enemy(id, species, side, &self.settings, &self.clips, self.speed_bonus());
        let mut ctx = SimContext::new(&self.grid, &self.settings, &mut self.slots, &mut self.events);
        enemy.enter(&mut ctx, side);
        log::info!("spawning {} {:?} from the {side:?} pipe", species.name(), id);
        self.enemies.push(enemy);
        id
    }

    /// Drop an enemy straight into play, already walking (scripted setups)
    pub fn place_enemy(&mut self, species: Species, position: Vec2, facing: i32) -> ActorId {
        let id = self.next_entity_id();
        let side = Side::from_sign(facing);
        let mut enemy = new_enemy(id, species, side, &self.settings, &self.clips, self.speed_bonus());
        enemy.body.move_to(position);
        enemy.body.look_horizontal(facing);
        enemy.body.visible = true;
        let mut ctx = SimContext::new(&self.grid, &self.settings, &mut self.slots, &mut self.events);
        enemy.walk(&mut ctx);
        self.enemies.push(enemy);
        id
    }
}
