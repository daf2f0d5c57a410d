//! Arcade Bros - single-screen platform brawler simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (characters, state machines, collisions, world flow)
//! - `settings`: Data-driven tunables and difficulty presets
//! - `audio`: Sound side-effect channel fired by the simulation

pub mod audio;
pub mod settings;
pub mod sim;

pub use settings::{Difficulty, MoveMode, Settings};

/// Game configuration constants
pub mod consts {
    /// Logical screen size in pixels
    pub const SCREEN_WIDTH: f32 = 256.0;
    pub const SCREEN_HEIGHT: f32 = 224.0;

    /// Tile size in pixels
    pub const TILE_SIZE: i32 = 8;
    /// Grid dimensions in tiles
    pub const GRID_WIDTH: usize = 32;
    pub const GRID_HEIGHT: usize = 30;
    /// Bottom row, always solid whatever the grid holds
    pub const FLOOR_ROW: i32 = 29;

    /// How far above the feet the head sits when probing for a ceiling
    pub const HEAD_PROBE: i32 = 20;

    /// Fixed simulation timestep (one rendered frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Hop applied by every bump and by the generic dying fall
    pub const HOP_DURATION: f32 = 0.25;
    pub const HOP_HEIGHT: f32 = 15.0;

    /// Collision boxes
    pub const PLAYER_COLLISION_WIDTH: i32 = 16;
    pub const PLAYER_COLLISION_HEIGHT: i32 = 16;
    pub const ENEMY_COLLISION_WIDTH: i32 = 8;
    pub const ENEMY_COLLISION_HEIGHT: i32 = 8;
    pub const BETWEEN_ENEMY_COLLISION_WIDTH: i32 = 12;
}

/// Arcade jump curve: 0 at t=0 and t=1, peaks at 1.0 for t=0.5
#[inline]
pub fn normalized_parabolic_position(t: f32) -> f32 {
    4.0 * t * (1.0 - t)
}

/// Wrap a horizontal position back onto the screen (one pass, not clamped)
#[inline]
pub fn wrap_x(x: f32) -> f32 {
    if x >= consts::SCREEN_WIDTH {
        x - consts::SCREEN_WIDTH
    } else if x < 0.0 {
        x + consts::SCREEN_WIDTH
    } else {
        x
    }
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Sign of a float as an integer direction (-1, 0 or 1)
#[inline]
pub fn sign(value: f32) -> i32 {
    if value > 0.0 {
        1
    } else if value < 0.0 {
        -1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parabola_endpoints_and_peak() {
        assert_eq!(normalized_parabolic_position(0.0), 0.0);
        assert_eq!(normalized_parabolic_position(1.0), 0.0);
        assert_eq!(normalized_parabolic_position(0.5), 1.0);
    }

    #[test]
    fn test_wrap_edges() {
        assert_eq!(wrap_x(-1.0), consts::SCREEN_WIDTH - 1.0);
        assert_eq!(wrap_x(consts::SCREEN_WIDTH), 0.0);
        assert_eq!(wrap_x(100.0), 100.0);
    }

    #[test]
    fn test_sign() {
        assert_eq!(sign(-3.0), -1);
        assert_eq!(sign(0.0), 0);
        assert_eq!(sign(0.1), 1);
    }

    proptest! {
        #[test]
        fn parabola_matches_formula(t in 0.0f32..=1.0) {
            let expected = 4.0 * t * (1.0 - t);
            prop_assert_eq!(normalized_parabolic_position(t), expected);
            prop_assert!(normalized_parabolic_position(t) <= 1.0 + f32::EPSILON);
            prop_assert!(normalized_parabolic_position(t) >= 0.0);
        }

        #[test]
        fn wrap_lands_on_screen(x in -255i32..511) {
            let wrapped = wrap_x(x as f32);
            prop_assert!(wrapped >= 0.0);
            prop_assert!(wrapped < consts::SCREEN_WIDTH);
        }
    }
}
