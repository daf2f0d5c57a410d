//! Motion primitives
//!
//! Integration, screen wrap and the parabolic arc every jump and fall follows.

use glam::Vec2;

use crate::{normalized_parabolic_position, wrap_x};

/// Continuous integration: position += direction * speed * dt
#[inline]
pub fn integrate_position(position: Vec2, direction: Vec2, speed: f32, dt: f32) -> Vec2 {
    position + direction * speed * dt
}

/// Ratchet integration: accumulate `speed * dt` and move one whole direction
/// step each time the accumulator reaches 1. Returns the new position and
/// accumulator.
#[inline]
pub fn step_position(position: Vec2, direction: Vec2, move_step: f32, speed: f32, dt: f32) -> (Vec2, f32) {
    let mut move_step = move_step + dt * speed;
    let mut position = position;
    if move_step >= 1.0 {
        position += direction;
        move_step -= 1.0;
    }
    (position, move_step)
}

/// Wrap the horizontal component around the screen edges
#[inline]
pub fn wrap_position(position: Vec2) -> Vec2 {
    Vec2::new(wrap_x(position.x), position.y)
}

/// Height above the take-off point `elapsed` seconds into a jump that
/// peaks at `height` after `duration` seconds
#[inline]
pub fn jump_rise(elapsed: f32, duration: f32, height: f32) -> f32 {
    normalized_parabolic_position(elapsed / (2.0 * duration)) * height
}

/// Height (negative: below) relative to the fall start, `elapsed` seconds
/// into a fall. This is the second half of the same parabola, so a fall that
/// starts at a jump's apex continues it with matching velocity.
#[inline]
pub fn fall_drop(elapsed: f32, duration: f32, height: f32) -> f32 {
    let t = (elapsed + duration) / (2.0 * duration);
    (normalized_parabolic_position(t) - 1.0) * height
}
