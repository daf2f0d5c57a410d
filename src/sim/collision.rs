//! Contact tests between characters
//!
//! Integer pixel rules on feet positions. Characters are anchored at the
//! middle of their feet, so boxes extend half their width each way and their
//! full height upward.

use crate::consts::{
    BETWEEN_ENEMY_COLLISION_WIDTH, ENEMY_COLLISION_HEIGHT, ENEMY_COLLISION_WIDTH,
    PLAYER_COLLISION_HEIGHT, PLAYER_COLLISION_WIDTH, SCREEN_WIDTH,
};

/// Horizontal reach of a bump on either side of the bumper's column
pub const BUMP_REACH: i32 = 12;
/// Half-width of the straight-up bucket
pub const BUMP_CENTER: i32 = 4;

/// Player box against enemy box
pub fn player_touches_enemy(player: (i32, i32), enemy: (i32, i32)) -> bool {
    let dx = (player.0 - enemy.0).abs();
    if dx >= PLAYER_COLLISION_WIDTH / 2 + ENEMY_COLLISION_WIDTH / 2 {
        return false;
    }
    // Positive when the player's feet are below the enemy's
    let dy = player.1 - enemy.1;
    if dy >= 0 {
        dy < PLAYER_COLLISION_HEIGHT
    } else {
        -dy < ENEMY_COLLISION_HEIGHT
    }
}

/// Signed distance from `from` to `to`, taking the short way around the screen
pub fn wrapped_dx(from: f32, to: f32) -> f32 {
    let mut dx = to - from;
    if dx > SCREEN_WIDTH / 2.0 {
        dx -= SCREEN_WIDTH;
    } else if dx < -SCREEN_WIDTH / 2.0 {
        dx += SCREEN_WIDTH;
    }
    dx
}

/// Whether an enemy walking in `direction` (sign) is about to run into
/// another enemy on the same row. Looks across the screen edge when the
/// walker is heading over it.
pub fn enemy_blocked_by(walker: (i32, i32), direction: i32, other: (i32, i32)) -> bool {
    if walker.1 != other.1 || direction == 0 {
        return false;
    }
    let screen = SCREEN_WIDTH as i32;
    let half = BETWEEN_ENEMY_COLLISION_WIDTH / 2;
    let mut other_x = other.0;
    if walker.0 > screen - half && direction > 0 {
        other_x += screen;
    } else if walker.0 < half && direction < 0 {
        other_x -= screen;
    }

    let dx = other_x - walker.0;
    dx != 0 && dx.abs() < BETWEEN_ENEMY_COLLISION_WIDTH && dx.signum() == direction.signum()
}

/// Which way a bump from `bumper_x` knocks a character at `target_x`.
///
/// The buckets are disjoint: a target just right of the bumper is knocked
/// right, just left is knocked left, and anything within the centre band goes
/// straight up. `None` when out of reach.
pub fn bump_direction(bumper_x: i32, target_x: i32) -> Option<i32> {
    let offset = bumper_x - target_x;
    if !(-BUMP_REACH..=BUMP_REACH).contains(&offset) {
        None
    } else if offset < -BUMP_CENTER {
        Some(1)
    } else if offset > BUMP_CENTER {
        Some(-1)
    } else {
        Some(0)
    }
}

/// What happens when two players touch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerContact {
    /// `top` landed on `bottom`'s head (indices into the pair)
    Flatten { top: usize, bottom: usize },
    /// Side by side: shove apart
    Push,
}

/// Contact between two players given their feet positions and whether
/// each one is coming down
pub fn player_contact(a: (i32, i32), a_falling: bool, b: (i32, i32), b_falling: bool) -> Option<PlayerContact> {
    let dx = wrapped_dx(a.0 as f32, b.0 as f32).abs() as i32;
    if dx >= PLAYER_COLLISION_WIDTH {
        return None;
    }
    // Positive when b stands lower than a
    let dy = b.1 - a.1;
    if dy.abs() >= PLAYER_COLLISION_HEIGHT {
        return None;
    }
    let head_band = PLAYER_COLLISION_HEIGHT / 2;
    if a_falling && dy >= head_band {
        Some(PlayerContact::Flatten { top: 0, bottom: 1 })
    } else if b_falling && -dy >= head_band {
        Some(PlayerContact::Flatten { top: 1, bottom: 0 })
    } else if dy.abs() < head_band {
        Some(PlayerContact::Push)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_player_enemy_boxes() {
        assert!(player_touches_enemy((100, 208), (111, 208)));
        assert!(!player_touches_enemy((100, 208), (112, 208)));
        // Enemy standing on the ledge the player is under
        assert!(player_touches_enemy((100, 208), (100, 193)));
        assert!(!player_touches_enemy((100, 208), (100, 192)));
        // Player jumping just above an enemy
        assert!(player_touches_enemy((100, 201), (100, 208)));
        assert!(!player_touches_enemy((100, 200), (100, 208)));
    }

    #[test]
    fn test_enemy_blocking_only_when_converging() {
        assert!(enemy_blocked_by((100, 64), 1, (110, 64)));
        assert!(!enemy_blocked_by((100, 64), -1, (110, 64)));
        assert!(!enemy_blocked_by((100, 64), 1, (112, 64)));
        assert!(!enemy_blocked_by((100, 64), 1, (110, 72)));
    }

    #[test]
    fn test_enemy_blocking_across_the_edge() {
        assert!(enemy_blocked_by((252, 64), 1, (2, 64)));
        assert!(enemy_blocked_by((2, 64), -1, (250, 64)));
    }

    #[test]
    fn test_bump_buckets() {
        assert_eq!(bump_direction(100, 110), Some(1));
        assert_eq!(bump_direction(100, 104), Some(0));
        assert_eq!(bump_direction(100, 96), Some(0));
        assert_eq!(bump_direction(100, 95), Some(-1));
        assert_eq!(bump_direction(100, 88), Some(-1));
        assert_eq!(bump_direction(100, 87), None);
        assert_eq!(bump_direction(100, 113), None);
    }

    #[test]
    fn test_wrapped_dx() {
        assert_eq!(wrapped_dx(250.0, 4.0), 10.0);
        assert_eq!(wrapped_dx(4.0, 250.0), -10.0);
        assert_eq!(wrapped_dx(100.0, 90.0), -10.0);
    }

    #[test]
    fn test_player_contacts() {
        assert_eq!(player_contact((100, 200), true, (108, 208), false), Some(PlayerContact::Flatten { top: 0, bottom: 1 }));
        assert_eq!(player_contact((100, 208), false, (104, 196), true), Some(PlayerContact::Flatten { top: 1, bottom: 0 }));
        assert_eq!(player_contact((100, 208), false, (110, 208), false), Some(PlayerContact::Push));
        assert_eq!(player_contact((100, 208), false, (116, 208), false), None);
        // Standing on a ledge above someone who is not falling: no contact
        assert_eq!(player_contact((100, 196), false, (100, 208), false), None);
    }

    proptest! {
        #[test]
        fn bump_offsets_land_in_exactly_one_bucket(offset in -BUMP_REACH..=BUMP_REACH) {
            let direction = bump_direction(100, 100 - offset);
            prop_assert!(direction.is_some());
            let expected = if offset < -BUMP_CENTER { 1 } else if offset > BUMP_CENTER { -1 } else { 0 };
            prop_assert_eq!(direction, Some(expected));
        }

        #[test]
        fn wrapped_dx_is_short(a in 0.0f32..256.0, b in 0.0f32..256.0) {
            prop_assert!(wrapped_dx(a, b).abs() <= SCREEN_WIDTH / 2.0);
        }
    }
}
