//! Respawn elevator
//!
//! After losing a life the player rides a small platform down from the top of
//! the screen, then stands on it until they move or it times out.

use glam::Vec2;

use super::machine::{SimContext, StateId};
use super::player::Player;
use super::spawn::Side;
use crate::lerp;

pub const APPEARANCE_DURATION: f32 = 2.0;
/// How long the platform holds once it has arrived
pub const HOLD_DURATION: f32 = 12.0;
pub const START_Y: f32 = 10.0;
pub const FINAL_Y: f32 = 40.0;
pub const LEFT_X: f32 = 108.0;
pub const RIGHT_X: f32 = 132.0;
/// Player anchor offset from the platform's left edge
const PLAYER_OFFSET_X: f32 = 8.0;
/// Sprite frames the platform shrinks through while holding
const HOLD_FRAMES: f32 = 3.0;

/// One elevator per player side
#[derive(Debug, Clone)]
pub struct RespawnPlatform {
    side: Side,
    x: f32,
    y: f32,
    timer: f32,
    /// Sprite frame while shown, `None` when cleared
    frame: Option<f32>,
}

impl RespawnPlatform {
    pub fn new(side: Side) -> Self {
        let x = match side {
            Side::Left => LEFT_X,
            Side::Right => RIGHT_X,
        };
        Self {
            side,
            x,
            y: START_Y,
            timer: 0.0,
            frame: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.frame.is_some()
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn frame(&self) -> Option<u32> {
        self.frame.map(|f| f.floor() as u32)
    }

    /// Put the player on the platform at the top of the screen
    pub fn reset(&mut self, player: &mut Player, ctx: &mut SimContext<'_>) {
        self.frame = Some(0.0);
        self.y = START_Y;
        self.timer = 0.0;
        player.body.move_to(Vec2::new(self.x + PLAYER_OFFSET_X, self.y));
        player.body.look_horizontal(-self.side.sign());
        player.respawn(ctx);
        log::info!("player {} respawning ({} lives)", player.index(), player.lives());
    }

    pub fn update(&mut self, player: &mut Player, ctx: &mut SimContext<'_>, delta_time: f32) {
        if self.frame.is_none() {
            return;
        }
        if player.is_moving() {
            self.clear(player);
            return;
        }

        self.timer += delta_time;
        if self.timer <= APPEARANCE_DURATION {
            self.y = lerp(START_Y, FINAL_Y, self.timer / APPEARANCE_DURATION);
            player.body.move_to(Vec2::new(self.x + PLAYER_OFFSET_X, self.y));
            return;
        }

        if !player.is_in(StateId::Walk) {
            player.walk(ctx);
        }
        let held = self.timer - APPEARANCE_DURATION;
        if held >= HOLD_DURATION {
            self.clear(player);
        } else {
            self.frame = Some(held / (HOLD_DURATION / HOLD_FRAMES));
        }
    }

    /// Remove the platform; the player collides with tiles again
    pub fn clear(&mut self, player: &mut Player) {
        self.frame = None;
        player.ignore_platforms = false;
    }

    /// Hide without touching a player (level teardown)
    pub fn hide(&mut self) {
        self.frame = None;
    }
}
