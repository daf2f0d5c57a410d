//! Fireball hazards
//!
//! Two independent hazards on their own cooldowns. The bouncing one travels
//! diagonally and reflects off the screen edges and solid tiles. The sweeping
//! one appears at a player's height and crosses the screen horizontally with
//! a bobbing motion. Both kill a player on contact and then puff away.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::events::{EventQueue, FireballKind, GameEvent};
use super::grid::{Grid, cell};
use crate::audio::SoundEffect;
use crate::consts::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::settings::Settings;

/// Hit box edge in pixels
pub const FIREBALL_SIZE: f32 = 8.0;
/// Lowest point the bouncing fireball appears at
const BOUNCING_SPAWN_Y: f32 = 32.0;
/// How far above a player's feet the sweeping fireball travels
const SWEEP_HEIGHT: f32 = 8.0;
const PUFF_RATE: f32 = 10.0;
const PUFF_FRAMES: f32 = 3.0;

/// Lifecycle of a fireball
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FireballState {
    /// Off screen, counting down to the next appearance
    Waiting { cooldown: f32 },
    Active { age: f32 },
    /// Puff animation before going back to waiting
    Disappearing { progress: f32 },
}

/// Axis-aligned box (left, top, right, bottom) in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    /// Box standing on `feet`, centered horizontally
    pub fn standing(feet: Vec2, width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(feet.x - width / 2.0, feet.y - height),
            max: Vec2::new(feet.x + width / 2.0, feet.y),
        }
    }

    pub fn centered(center: Vec2, size: f32) -> Self {
        let half = Vec2::splat(size / 2.0);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fireball {
    pub kind: FireballKind,
    pub position: Vec2,
    pub direction: Vec2,
    pub state: FireballState,
    /// Centre line of the sweep
    base_y: f32,
    travelled: f32,
}

fn roll_cooldown(rng: &mut Pcg32, min: f32, max: f32) -> f32 {
    if max <= min {
        return min;
    }
    rng.random_range(min..=max)
}

impl Fireball {
    pub fn new(kind: FireballKind, settings: &Settings, rng: &mut Pcg32) -> Self {
        let mut fireball = Self {
            kind,
            position: Vec2::ZERO,
            direction: Vec2::ZERO,
            state: FireballState::Waiting { cooldown: 0.0 },
            base_y: 0.0,
            travelled: 0.0,
        };
        fireball.state = FireballState::Waiting {
            cooldown: fireball.next_cooldown(settings, rng),
        };
        fireball
    }

    fn next_cooldown(&self, settings: &Settings, rng: &mut Pcg32) -> f32 {
        match self.kind {
            FireballKind::Bouncing => roll_cooldown(
                rng,
                settings.bouncing_cooldown_min,
                settings.bouncing_cooldown_max,
            ),
            FireballKind::Sweeping => roll_cooldown(
                rng,
                settings.sweeping_cooldown_min,
                settings.sweeping_cooldown_max,
            ),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, FireballState::Active { .. })
    }

    pub fn hit_box(&self) -> Rect {
        Rect::centered(self.position, FIREBALL_SIZE)
    }

    /// Start the puff; the fireball stops being dangerous immediately
    pub fn destroy(&mut self, events: &mut EventQueue) {
        if !self.is_active() {
            return;
        }
        self.state = FireballState::Disappearing { progress: 0.0 };
        events.push(GameEvent::FireballPuff { at: self.position });
        events.push(GameEvent::FireballDestroyed { kind: self.kind });
    }

    /// Back to waiting (level change)
    pub fn reset(&mut self, settings: &Settings, rng: &mut Pcg32) {
        self.state = FireballState::Waiting {
            cooldown: self.next_cooldown(settings, rng),
        };
    }

    /// Advance one tick. `target` is the feet position of the player the
    /// sweeping fireball lines up with when it appears.
    pub fn update(
        &mut self,
        grid: &Grid,
        settings: &Settings,
        rng: &mut Pcg32,
        events: &mut EventQueue,
        target: Option<Vec2>,
        dt: f32,
    ) {
        match self.state {
            FireballState::Waiting { cooldown } => {
                let cooldown = cooldown - dt;
                if cooldown > 0.0 {
                    self.state = FireballState::Waiting { cooldown };
                } else if let Some(target) = target {
                    self.appear(rng, target);
                    events.push(GameEvent::FireballSpawned { kind: self.kind });
                } else {
                    // Nobody to chase, try again on the next tick
                    self.state = FireballState::Waiting { cooldown: 0.0 };
                }
            }
            FireballState::Active { age } => {
                let age = age + dt;
                self.state = FireballState::Active { age };
                match self.kind {
                    FireballKind::Bouncing => self.bounce(grid, settings, events, dt),
                    FireballKind::Sweeping => self.sweep(settings, age, dt),
                }
                let expired = age >= settings.fireball_lifetime
                    || (self.kind == FireballKind::Sweeping && self.travelled >= SCREEN_WIDTH);
                if expired {
                    self.destroy(events);
                }
            }
            FireballState::Disappearing { progress } => {
                let progress = progress + dt * PUFF_RATE;
                if progress >= PUFF_FRAMES {
                    self.reset(settings, rng);
                } else {
                    self.state = FireballState::Disappearing { progress };
                }
            }
        }
    }

    fn appear(&mut self, rng: &mut Pcg32, target: Vec2) {
        self.travelled = 0.0;
        match self.kind {
            FireballKind::Bouncing => {
                let x = rng.random_range(FIREBALL_SIZE..SCREEN_WIDTH - FIREBALL_SIZE);
                let dx = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
                self.position = Vec2::new(x, BOUNCING_SPAWN_Y);
                self.direction = Vec2::new(dx, 1.0);
            }
            FireballKind::Sweeping => {
                // Enter from the edge farther from the target
                let from_left = target.x >= SCREEN_WIDTH / 2.0;
                let x = if from_left { 0.0 } else { SCREEN_WIDTH - 1.0 };
                self.base_y = target.y - SWEEP_HEIGHT;
                self.position = Vec2::new(x, self.base_y);
                self.direction = Vec2::new(if from_left { 1.0 } else { -1.0 }, 0.0);
            }
        }
        self.state = FireballState::Active { age: 0.0 };
        log::debug!("{:?} fireball at {:?}", self.kind, self.position);
    }

    fn bounce(&mut self, grid: &Grid, settings: &Settings, events: &mut EventQueue, dt: f32) {
        let step = self.direction * settings.fireball_speed * dt;
        let next = self.position + step;
        let half = FIREBALL_SIZE / 2.0;
        let mut reflected = false;

        let lead_x = next.x + self.direction.x.signum() * half;
        let hits_wall = lead_x < 0.0 || lead_x >= SCREEN_WIDTH;
        let hits_tile_x = grid.is_solid(cell(lead_x.floor() as i32), cell(self.position.y.floor() as i32));
        if self.direction.x != 0.0 && (hits_wall || hits_tile_x) {
            self.direction.x = -self.direction.x;
            reflected = true;
        }

        let lead_y = next.y + self.direction.y.signum() * half;
        let hits_edge = lead_y < 0.0 || lead_y >= SCREEN_HEIGHT;
        let hits_tile_y = grid.is_solid(cell(self.position.x.floor() as i32), cell(lead_y.floor() as i32));
        if self.direction.y != 0.0 && (hits_edge || hits_tile_y) {
            self.direction.y = -self.direction.y;
            reflected = true;
        }

        if reflected {
            events.sound(SoundEffect::FireballBounce);
        }
        self.position += self.direction * settings.fireball_speed * dt;
    }

    fn sweep(&mut self, settings: &Settings, age: f32, dt: f32) {
        let dx = self.direction.x * settings.fireball_speed * dt;
        self.travelled += dx.abs();
        let bob = (age * settings.sweeping_bob_frequency).sin() * settings.sweeping_bob_amplitude;
        self.position = Vec2::new(self.position.x + dx, self.base_y + bob);
    }
}
