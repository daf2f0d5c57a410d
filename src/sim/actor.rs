//! Actor body: position, facing and speed

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::motion::{integrate_position, step_position, wrap_position};
use crate::settings::MoveMode;

/// Physical body shared by every platform character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    position: Vec2,
    /// Direction moved along each step (also the facing when non-zero)
    direction: Vec2,
    orientation: Vec2,
    /// Mirror flags for the sprite (-1 flips an axis)
    scale: Vec2,
    rotation: f32,
    base_speed: f32,
    /// Multiplier on `base_speed` (0 freezes, 1 normal)
    speed: f32,
    move_step: f32,
    pub move_mode: MoveMode,
    pub visible: bool,
    alive: bool,
    /// RGBA tint
    pub color: u32,
}

impl Actor {
    pub fn new(position: Vec2, move_mode: MoveMode) -> Self {
        let mut actor = Self {
            position,
            direction: Vec2::ZERO,
            orientation: Vec2::ZERO,
            scale: Vec2::ONE,
            rotation: 0.0,
            base_speed: 0.0,
            speed: 1.0,
            move_step: 0.0,
            move_mode,
            visible: true,
            alive: true,
            color: 0xFFFF_FFFF,
        };
        actor.look_to(Vec2::new(1.0, 0.0));
        actor
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn pixel_x(&self) -> i32 {
        self.position.x.floor() as i32
    }

    pub fn pixel_y(&self) -> i32 {
        self.position.y.floor() as i32
    }

    pub fn move_to(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn move_by(&mut self, translation: Vec2) {
        self.position += translation;
    }

    pub fn set_y(&mut self, y: f32) {
        self.position.y = y;
    }

    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    /// Horizontal facing as -1 or 1
    pub fn facing(&self) -> i32 {
        if self.orientation.x < 0.0 { -1 } else { 1 }
    }

    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Set the move direction, updating facing and sprite mirroring
    pub fn look_to(&mut self, direction: Vec2) {
        self.direction = direction;
        if direction.x != 0.0 {
            self.orientation.x = direction.x;
            self.scale.x = direction.x;
        }
        if direction.y != 0.0 {
            self.orientation.y = direction.y;
            self.scale.y = -self.orientation.x * self.orientation.y;
        } else {
            self.scale.y = 1.0;
        }
        self.orientation.y = direction.y;
        self.rotation = self.orientation.x * self.orientation.y * std::f32::consts::FRAC_PI_2;
    }

    /// Face a horizontal direction (-1 or 1)
    pub fn look_horizontal(&mut self, sign: i32) {
        self.look_to(Vec2::new(sign as f32, 0.0));
    }

    pub fn base_speed(&self) -> f32 {
        self.base_speed
    }

    pub fn set_base_speed(&mut self, base_speed: f32) {
        self.base_speed = base_speed;
        if base_speed == 0.0 {
            self.move_step = 0.0;
        }
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
        if speed == 0.0 {
            self.move_step = 0.0;
        }
    }

    /// Effective speed in pixels per second
    pub fn current_speed(&self) -> f32 {
        self.speed * self.base_speed
    }

    /// Integrate one tick along the move direction and wrap around the screen
    pub fn advance(&mut self, delta_time: f32) {
        let speed = self.current_speed();
        match self.move_mode {
            MoveMode::Continuous => {
                self.position = integrate_position(self.position, self.direction, speed, delta_time);
            }
            MoveMode::Stepped => {
                let (position, step) =
                    step_position(self.position, self.direction, self.move_step, speed, delta_time);
                self.position = position;
                self.move_step = step;
            }
        }
        self.position = wrap_position(self.position);
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Take the body out of play (no longer updated or drawn)
    pub fn disable(&mut self) {
        self.alive = false;
        self.visible = false;
    }

    pub fn enable(&mut self) {
        self.alive = true;
        self.visible = true;
    }
}
