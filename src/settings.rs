//! Game tunables and difficulty presets
//!
//! Every number the simulation reads lives here so it can be injected from a
//! JSON file (or a test) instead of being baked into the rules.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::sim::SimError;

/// Difficulty presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "norm" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Player jump (duration seconds, height pixels) for this preset
    pub fn jump(&self) -> (f32, f32) {
        match self {
            Difficulty::Easy => (0.55, 80.0),
            Difficulty::Normal => (0.5, 75.0),
            Difficulty::Hard => (0.45, 68.0),
        }
    }

    /// Multiplier applied to every enemy base speed
    pub fn enemy_speed_scale(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.8,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.25,
        }
    }

    /// Seconds an enemy stays on its back
    pub fn flipped_duration(&self) -> f32 {
        match self {
            Difficulty::Easy => 12.0,
            Difficulty::Normal => 10.0,
            Difficulty::Hard => 7.0,
        }
    }
}

/// How an actor turns speed into displacement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MoveMode {
    /// position += direction * speed * dt
    Continuous,
    /// Accumulate speed * dt and move one whole pixel step each time it reaches 1
    #[default]
    Stepped,
}

/// Simulation tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Preset the jump/speed values were derived from
    pub difficulty: Difficulty,
    /// Movement integration for platform characters
    pub move_mode: MoveMode,

    // === Player ===
    pub player_max_speed: f32,
    pub player_acceleration: f32,
    pub player_jump_duration: f32,
    pub player_jump_height: f32,
    pub starting_lives: i32,
    /// Seconds within which a further kill extends the combo
    pub combo_window: f32,
    /// Seconds a player stays squashed after being stood on
    pub flatten_duration: f32,
    /// Height of the hop given to a player bouncing off another's head
    pub head_bounce_height: f32,
    /// Horizontal push speed between two players in contact (px/s)
    pub push_speed: f32,
    /// Separation beyond which a push ends
    pub push_margin: f32,

    // === Enemies ===
    pub turtle_speed: f32,
    pub crab_speed: f32,
    pub crab_angry_bonus: f32,
    pub coin_speed: f32,
    pub flipped_duration: f32,
    /// Base speed multiplier per phase
    pub phase_speed_factor: f32,
    /// Animation speed multiplier per phase
    pub phase_anim_factor: f32,

    // === Score ===
    pub flip_score: u32,
    pub kill_score: u32,
    pub coin_score: u32,
    pub extra_life_score: u32,
    pub bonus_perfect_score: u32,

    // === Level ===
    pub pow_uses: u32,
    /// Seconds of camera shake after a POW hit
    pub pow_shake_duration: f32,
    pub level_start_duration: f32,
    pub level_cleared_duration: f32,
    pub game_over_duration: f32,
    pub bonus_duration: f32,
    pub bonus_count_duration: f32,
    /// Enemy speed added per completed campaign loop
    pub loop_speed_bonus: f32,

    // === Fireballs ===
    pub fireball_speed: f32,
    pub fireball_lifetime: f32,
    pub bouncing_cooldown_min: f32,
    pub bouncing_cooldown_max: f32,
    pub sweeping_cooldown_min: f32,
    pub sweeping_cooldown_max: f32,
    pub sweeping_bob_amplitude: f32,
    pub sweeping_bob_frequency: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,
            move_mode: MoveMode::Stepped,

            // Player
            player_max_speed: 75.0,
            player_acceleration: 400.0,
            player_jump_duration: 0.5,
            player_jump_height: 75.0,
            starting_lives: 2,
            combo_window: 0.5,
            flatten_duration: 1.0,
            head_bounce_height: 20.0,
            push_speed: 30.0,
            push_margin: 18.0,

            // Enemies
            turtle_speed: 25.0,
            crab_speed: 25.0,
            crab_angry_bonus: 7.0,
            coin_speed: 25.0,
            flipped_duration: 10.0,
            phase_speed_factor: 1.25,
            phase_anim_factor: 1.5,

            // Score
            flip_score: 10,
            kill_score: 800,
            coin_score: 800,
            extra_life_score: 20_000,
            bonus_perfect_score: 5_000,

            // Level
            pow_uses: 3,
            pow_shake_duration: 0.5,
            level_start_duration: 3.0,
            level_cleared_duration: 5.0,
            game_over_duration: 5.0,
            bonus_duration: 20.0,
            bonus_count_duration: 3.0,
            loop_speed_bonus: 5.0,

            // Fireballs
            fireball_speed: 40.0,
            fireball_lifetime: 12.0,
            bouncing_cooldown_min: 15.0,
            bouncing_cooldown_max: 25.0,
            sweeping_cooldown_min: 10.0,
            sweeping_cooldown_max: 20.0,
            sweeping_bob_amplitude: 4.0,
            sweeping_bob_frequency: 6.0,
        }
    }
}

impl Settings {
    /// Create settings from a difficulty preset (applies preset defaults)
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        let mut settings = Self::default();
        settings.apply_difficulty(difficulty);
        settings
    }

    /// Apply a difficulty preset (updates difficulty-dependent values)
    pub fn apply_difficulty(&mut self, difficulty: Difficulty) {
        let defaults = Self::default();
        let (duration, height) = difficulty.jump();
        let scale = difficulty.enemy_speed_scale();

        self.difficulty = difficulty;
        self.player_jump_duration = duration;
        self.player_jump_height = height;
        self.flipped_duration = difficulty.flipped_duration();
        self.turtle_speed = defaults.turtle_speed * scale;
        self.crab_speed = defaults.crab_speed * scale;
    }

    /// Parse settings from JSON; missing keys keep their defaults
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(err) => {
                    log::warn!("Failed to parse {}: {err}, using defaults", path.display());
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(r#"{ "player_jump_height": 55.0 }"#).unwrap();
        assert_eq!(settings.player_jump_height, 55.0);
        assert_eq!(settings.player_max_speed, 75.0);
        assert_eq!(settings.combo_window, 0.5);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(Settings::from_json("{ nope").is_err());
    }

    #[test]
    fn test_difficulty_presets() {
        let hard = Settings::from_difficulty(Difficulty::Hard);
        assert_eq!(hard.difficulty, Difficulty::Hard);
        assert!(hard.turtle_speed > Settings::default().turtle_speed);
        assert_eq!(hard.player_jump_duration, 0.45);

        assert_eq!(Difficulty::parse("EASY"), Some(Difficulty::Easy));
        assert_eq!(Difficulty::parse("brutal"), None);
    }

    #[test]
    fn test_round_trip_json() {
        let settings = Settings::from_difficulty(Difficulty::Easy);
        let json = settings.to_json().unwrap();
        let back = Settings::from_json(&json).unwrap();
        assert_eq!(back.difficulty, Difficulty::Easy);
        assert_eq!(back.player_jump_height, settings.player_jump_height);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let settings = Settings::load("/definitely/not/here.json");
        assert_eq!(settings.starting_lives, 2);
    }
}
