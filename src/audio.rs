//! Sound side-effect channel
//!
//! The simulation never plays audio itself. It fires `GameEvent::Sound` and an
//! `AudioManager` registered as an event sink forwards those to whatever
//! backend the host provides.

use serde::{Deserialize, Serialize};

use crate::sim::{EventSink, GameEvent};

/// Number of distinct footstep samples cycled while running
pub const FOOTSTEP_VARIANTS: u8 = 8;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Player footstep (index into the cycled samples)
    Footstep(u8),
    /// Player reversing or braking at full speed
    Skid,
    /// Player jump
    Jump,
    /// Player touched by an enemy or fireball
    Hit,
    /// Player death hop
    Death,
    /// Something fell into the water
    Splash,
    /// Enemy knocked onto its back
    Bump,
    /// Enemy came out of a pipe
    EnemySpawn,
    /// Coin picked up
    CoinCollect,
    /// POW block triggered
    Pow,
    /// Fireball bounced off a wall or platform
    FireballBounce,
    /// Game start jingle
    StartGame,
    /// Level start jingle
    StartLevel,
    /// Extra life awarded
    ExtraLife,
    /// Game over
    GameOver,
}

impl SoundEffect {
    /// Asset name used by the host to look the sample up
    pub fn asset_name(&self) -> &'static str {
        match self {
            SoundEffect::Footstep(i) => match i % 4 {
                0 => "pout1",
                1 => "pout2",
                2 => "pout3",
                _ => "pout4",
            },
            SoundEffect::Skid => "criii",
            SoundEffect::Jump => "zboui",
            SoundEffect::Hit => "huii",
            SoundEffect::Death => "flbflbflb",
            SoundEffect::Splash => "plouf",
            SoundEffect::Bump => "bump",
            SoundEffect::EnemySpawn => "spawn",
            SoundEffect::CoinCollect => "coin",
            SoundEffect::Pow => "pow",
            SoundEffect::FireballBounce => "fireball",
            SoundEffect::StartGame => "tadoudi",
            SoundEffect::StartLevel => "doudidou",
            SoundEffect::ExtraLife => "oneup",
            SoundEffect::GameOver => "gameover",
        }
    }
}

/// Whatever actually makes noise
pub trait SoundBackend {
    fn play(&mut self, sound: SoundEffect, volume: f32);
}

/// Backend that drops every sound (headless runs)
#[derive(Debug, Default)]
pub struct SilentBackend;

impl SoundBackend for SilentBackend {
    fn play(&mut self, _sound: SoundEffect, _volume: f32) {}
}

/// Audio manager for the game
pub struct AudioManager<B: SoundBackend> {
    backend: B,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl<B: SoundBackend> AudioManager<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    pub fn set_master_volume(&mut self, volume: f32) {
        self.master_volume = volume.clamp(0.0, 1.0);
    }

    pub fn set_sfx_volume(&mut self, volume: f32) {
        self.sfx_volume = volume.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Play a sound effect
    pub fn play(&mut self, sound: SoundEffect) {
        if self.muted {
            return;
        }
        let volume = self.master_volume * self.sfx_volume * Self::sample_volume(sound);
        if volume <= 0.0 {
            return;
        }
        self.backend.play(sound, volume);
    }

    /// Per-sample mix level
    fn sample_volume(sound: SoundEffect) -> f32 {
        match sound {
            SoundEffect::Footstep(_) => 0.75,
            _ => 1.0,
        }
    }
}

impl<B: SoundBackend> EventSink for AudioManager<B> {
    fn on_event(&mut self, event: &GameEvent) {
        if let GameEvent::Sound(sound) = event {
            self.play(*sound);
        }
    }
}
