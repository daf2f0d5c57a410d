//! Level campaign and spawn schedule
//!
//! A level is an ordered list of spawns, each waiting `delay` seconds after
//! the previous one. The campaign is plain data so it can be loaded from JSON.

use serde::{Deserialize, Serialize};

use super::enemy::Species;
use super::error::SimError;

/// One scheduled enemy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnEntry {
    pub species: Species,
    /// Seconds after the previous spawn
    pub delay: f32,
}

impl SpawnEntry {
    pub fn new(species: Species, delay: f32) -> Self {
        Self { species, delay }
    }
}

/// Static description of a level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDef {
    pub spawns: Vec<SpawnEntry>,
    /// Coin-collecting round with a time limit
    #[serde(default)]
    pub bonus: bool,
    /// Platform tile look (renderer only)
    #[serde(default)]
    pub tile_set: u32,
}

impl LevelDef {
    pub fn new(tile_set: u32, spawns: Vec<SpawnEntry>) -> Self {
        Self {
            spawns,
            bonus: false,
            tile_set,
        }
    }

    pub fn bonus(tile_set: u32, coins: usize, interval: f32) -> Self {
        let spawns = (0..coins)
            .map(|i| SpawnEntry::new(Species::Coin, if i == 0 { 0.0 } else { interval }))
            .collect();
        Self {
            spawns,
            bonus: true,
            tile_set,
        }
    }
}

/// Ordered levels; play loops back to the first one after the last
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub levels: Vec<LevelDef>,
}

impl Default for Campaign {
    fn default() -> Self {
        use Species::{Crab, Turtle};
        let schedule = |species: Species, delays: &[f32]| {
            delays
                .iter()
                .map(|&delay| SpawnEntry::new(species, delay))
                .collect::<Vec<_>>()
        };
        Self {
            levels: vec![
                LevelDef::new(0, schedule(Turtle, &[0.0, 3.0, 6.0])),
                LevelDef::new(0, schedule(Turtle, &[0.0, 3.0, 6.0, 3.0, 6.0])),
                LevelDef::bonus(1, 10, 1.0),
                LevelDef::new(2, schedule(Crab, &[0.0, 3.0, 6.0, 3.0])),
            ],
        }
    }
}

impl Campaign {
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&LevelDef, SimError> {
        self.levels.get(index).ok_or(SimError::UnknownLevel {
            index,
            count: self.levels.len(),
        })
    }
}

/// Running level: spawn clock and elapsed time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    def: LevelDef,
    index: usize,
    next_spawn: usize,
    spawn_timer: f32,
    elapsed: f32,
}

impl Level {
    pub fn new(index: usize, def: LevelDef) -> Self {
        Self {
            def,
            index,
            next_spawn: 0,
            spawn_timer: 0.0,
            elapsed: 0.0,
        }
    }

    pub fn from_campaign(campaign: &Campaign, index: usize) -> Result<Self, SimError> {
        Ok(Self::new(index, campaign.get(index)?.clone()))
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_bonus(&self) -> bool {
        self.def.bonus
    }

    pub fn tile_set(&self) -> u32 {
        self.def.tile_set
    }

    /// Enemies (or coins) this level spawns in total
    pub fn enemy_count(&self) -> usize {
        self.def.spawns.len()
    }

    pub fn all_spawned(&self) -> bool {
        self.next_spawn >= self.def.spawns.len()
    }

    /// Seconds since the level started playing
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn reset_spawns(&mut self) {
        self.next_spawn = 0;
        self.spawn_timer = 0.0;
    }

    /// Advance the clocks; at most one spawn per call, remainder carried over
    pub fn update(&mut self, delta_time: f32) -> Option<Species> {
        self.elapsed += delta_time;
        let entry = *self.def.spawns.get(self.next_spawn)?;
        self.spawn_timer += delta_time;
        if self.spawn_timer >= entry.delay {
            self.spawn_timer -= entry.delay;
            self.next_spawn += 1;
            return Some(entry.species);
        }
        None
    }
}
