//! Transient world effects that run independently of character states

use serde::{Deserialize, Serialize};

use super::events::ActorId;
use super::grid::cell;
use crate::consts::HEAD_PROBE;

/// Bumped tile animation: frames per second and length
const BUMP_RATE: f32 = 20.0;
const BUMP_FRAMES: f32 = 5.0;
const SPLASH_RATE: f32 = 10.0;
const SPLASH_FRAMES: f32 = 3.0;

/// A tile row lifted by a jump from below, three cells wide
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BumpEffect {
    pub bumper: ActorId,
    pub cell_x: i32,
    pub cell_y: i32,
    progress: f32,
}

impl BumpEffect {
    /// Centered on the column above a bumper whose feet are at this pixel
    pub fn new(bumper: ActorId, pixel_x: i32, pixel_y: i32) -> Self {
        Self {
            bumper,
            cell_x: cell(pixel_x),
            cell_y: cell(pixel_y - HEAD_PROBE),
            progress: 0.0,
        }
    }

    /// Returns true once the animation has finished
    pub fn update(&mut self, dt: f32) -> bool {
        self.progress += dt * BUMP_RATE;
        self.progress >= BUMP_FRAMES
    }

    pub fn frame(&self) -> u32 {
        self.progress.floor() as u32
    }

    pub fn is_bumped(&self, x: i32, y: i32) -> bool {
        y == self.cell_y && (self.cell_x - 1..=self.cell_x + 1).contains(&x)
    }
}

/// Water splash where a character fell off the bottom
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Splash {
    pub x: f32,
    progress: f32,
}

impl Splash {
    pub fn new(x: f32) -> Self {
        Self { x, progress: 0.0 }
    }

    pub fn update(&mut self, dt: f32) -> bool {
        self.progress += dt * SPLASH_RATE;
        self.progress >= SPLASH_FRAMES
    }

    pub fn frame(&self) -> u32 {
        self.progress.floor() as u32
    }
}

/// Countdown of the POW camera shake
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Shake {
    pub remaining: f32,
}

impl Shake {
    pub fn start(&mut self, duration: f32) {
        self.remaining = self.remaining.max(duration);
    }

    pub fn update(&mut self, dt: f32) {
        self.remaining = (self.remaining - dt).max(0.0);
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }
}
