//! Player controller
//!
//! Input-driven walk with acceleration and skid, combo scoring, the death hop,
//! and the squash/push reactions used when two players touch.

use glam::Vec2;

use super::animation::ClipLibrary;
use super::character::{
    self, Behavior, Character, CharacterSpec, dying_enter, jump_enter, jump_update,
    platform_recover, walk_update,
};
use super::events::{ActorId, GameEvent};
use super::machine::{SimContext, StateHooks, StateId};
use super::motion::wrap_position;
use super::spawn::Side;
use crate::audio::{FOOTSTEP_VARIANTS, SoundEffect};
use crate::consts::{HOP_DURATION, HOP_HEIGHT};
use crate::settings::Settings;

/// Where each player stands when a level starts
pub const PLAYER_START_X: [f32; 2] = [68.0, 188.0];
pub const PLAYER_START_Y: f32 = 208.0;
/// Seconds spent showing the hit pose before the death hop
const DEATH_HOP_DELAY: f32 = 1.0;
/// Run clip frame on which a footstep sounds
const FOOTSTEP_FRAME: u32 = 2;
/// Push strength used when the other player is standing still
const MIN_PUSH_FACTOR: f32 = 0.25;

/// Horizontal shove from the other player
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Push {
    /// -1 or 1
    pub direction: i32,
    /// Pixels per second
    pub speed: f32,
    /// The player we are being pushed away from
    pub from: ActorId,
}

/// Player role data
#[derive(Debug, Clone)]
pub struct PlayerData {
    /// 0 for the first player, 1 for the second
    pub index: usize,
    /// Signed walking speed driven by input
    pub current_speed: f32,
    pub max_speed: f32,
    pub acceleration: f32,
    pub lives: i32,
    pub score: u32,
    combo: u32,
    pub last_kill_timer: f32,
    combo_window: f32,
    extra_life_score: u32,
    extra_life_granted: bool,
    footstep: u8,
    pub flatten_timer: f32,
    pub push: Option<Push>,
}

pub type Player = Character<PlayerData>;

pub fn new_player(id: ActorId, index: usize, settings: &Settings, clips: &ClipLibrary) -> Player {
    let side = player_side(index);
    let mut player = Character::new(CharacterSpec {
        id,
        position: start_position(index),
        base_speed: 0.0,
        move_mode: settings.move_mode,
        clips: clips.player.clone(),
        flipped_duration: settings.flipped_duration,
        behavior: Behavior {
            walk_animation: |_| "Run",
            bump: player_bump,
            recover: platform_recover,
            on_frame: Some(player_frame),
        },
        states: player_states(),
        role: PlayerData {
            index,
            current_speed: 0.0,
            max_speed: settings.player_max_speed,
            acceleration: settings.player_acceleration,
            lives: settings.starting_lives,
            score: 0,
            combo: 0,
            last_kill_timer: settings.combo_window,
            combo_window: settings.combo_window,
            extra_life_score: settings.extra_life_score,
            extra_life_granted: false,
            footstep: 0,
            flatten_timer: 0.0,
            push: None,
        },
    });
    player.can_bump = true;
    player.body.look_horizontal(-side.sign());
    player
}

/// Side of the screen a player starts and respawns on
pub fn player_side(index: usize) -> Side {
    if index == 0 { Side::Left } else { Side::Right }
}

pub fn start_position(index: usize) -> Vec2 {
    Vec2::new(PLAYER_START_X[index.min(1)], PLAYER_START_Y)
}

impl Character<PlayerData> {
    pub fn index(&self) -> usize {
        self.role.index
    }

    pub fn lives(&self) -> i32 {
        self.role.lives
    }

    pub fn score(&self) -> u32 {
        self.role.score
    }

    pub fn combo(&self) -> u32 {
        self.role.combo
    }

    /// Moving under its own power (or airborne)
    pub fn is_moving(&self) -> bool {
        self.is_jumping() || self.is_falling() || self.role.current_speed != 0.0
    }

    pub fn is_respawning(&self) -> bool {
        self.is_in(StateId::Respawn)
    }

    pub fn is_flattened(&self) -> bool {
        self.role.flatten_timer > 0.0
    }

    /// Can touch enemies, fireballs and the other player
    pub fn is_active(&self) -> bool {
        !self.is_dying() && !self.is_dead() && !self.is_respawning() && self.body.is_alive()
    }

    /// Per-tick update: state machine, combo clock, squash lock and push
    pub fn tick(&mut self, ctx: &mut SimContext<'_>, delta_time: f32) {
        self.update(ctx, delta_time);
        self.role.last_kill_timer += delta_time;

        if self.role.flatten_timer > 0.0 {
            self.role.flatten_timer = (self.role.flatten_timer - delta_time).max(0.0);
            if self.role.flatten_timer == 0.0 && self.is_walking() {
                self.play("Idle");
            }
        }

        if let Some(push) = self.role.push {
            let shove = Vec2::new(push.direction as f32 * push.speed * delta_time, 0.0);
            self.body.move_to(wrap_position(self.position() + shove));
        }
    }

    /// Walking speed as a fraction of max speed
    pub fn speed_factor(&self) -> f32 {
        if self.role.max_speed <= 0.0 {
            return 0.0;
        }
        (self.role.current_speed.abs() / self.role.max_speed).min(1.0)
    }

    /// Start being shoved away from `from`, harder the faster it walks into us
    pub fn shove(&mut self, direction: i32, from: ActorId, other_factor: f32, settings: &Settings) {
        self.role.push = Some(Push {
            direction,
            speed: settings.push_speed * other_factor.max(MIN_PUSH_FACTOR),
            from,
        });
    }

    /// Count a kill toward the combo. A kill within the window of the previous
    /// one raises the combo, otherwise it restarts at zero.
    pub fn kill_combo(&mut self) -> u32 {
        if self.role.last_kill_timer < self.role.combo_window {
            self.role.combo += 1;
        } else {
            self.role.combo = 0;
        }
        self.role.last_kill_timer = 0.0;
        self.role.combo
    }

    /// Add points, granting the one-shot extra life on crossing the threshold
    pub fn add_score(&mut self, points: u32, ctx: &mut SimContext<'_>) {
        if points == 0 {
            return;
        }
        self.role.score = self.role.score.saturating_add(points);
        ctx.events.push(GameEvent::ScoreChanged {
            player: self.id,
            score: self.role.score,
            gained: points,
        });

        if !self.role.extra_life_granted && self.role.score >= self.role.extra_life_score {
            self.role.extra_life_granted = true;
            self.role.lives += 1;
            log::info!("player {} extra life ({} lives)", self.role.index, self.role.lives);
            ctx.events.push(GameEvent::ExtraLife {
                player: self.id,
                lives: self.role.lives,
            });
            ctx.events.sound(SoundEffect::ExtraLife);
        }
    }

    /// Fresh game: score, lives and the extra-life grant reset
    pub fn reset_for_game(&mut self, settings: &Settings) {
        self.role.lives = settings.starting_lives;
        self.role.score = 0;
        self.role.combo = 0;
        self.role.extra_life_granted = false;
        self.role.max_speed = settings.player_max_speed;
        self.role.acceleration = settings.player_acceleration;
        self.role.combo_window = settings.combo_window;
        self.role.extra_life_score = settings.extra_life_score;
        self.body.enable();
    }

    /// Back at the level start position, standing
    pub fn reset_state(&mut self, ctx: &mut SimContext<'_>) {
        self.reset_flags();
        self.role.current_speed = 0.0;
        self.role.footstep = 0;
        self.role.flatten_timer = 0.0;
        self.role.push = None;
        self.role.last_kill_timer = self.role.combo_window;
        self.body.set_base_speed(0.0);
        self.body.move_to(start_position(self.role.index));
        self.body.look_horizontal(-player_side(self.role.index).sign());
        self.walk(ctx);
    }

    /// Ride the elevator back in
    pub fn respawn(&mut self, ctx: &mut SimContext<'_>) {
        self.set_state(ctx, StateId::Respawn);
        ctx.events.push(GameEvent::PlayerRespawned { player: self.id });
    }

    /// Squashed by the other player landing on our head
    pub fn flatten(&mut self, duration: f32) {
        self.role.flatten_timer = duration;
        self.role.current_speed = 0.0;
        self.body.set_base_speed(0.0);
        self.play("Flatten");
    }

    /// Bounce off the other player's head
    pub fn head_bounce(&mut self, ctx: &mut SimContext<'_>) {
        let height = ctx.settings.head_bounce_height;
        self.jump(ctx, HOP_DURATION, height, Some("Jump"));
    }
}

fn player_states() -> Vec<(StateId, StateHooks<Player>)> {
    vec![
        (
            StateId::Walk,
            StateHooks::new(Some(player_walk_enter), None, Some(player_walk_update)),
        ),
        // Keeps the input-driven speed through the air
        (
            StateId::Jump,
            StateHooks::new(Some(jump_enter), Some(player_jump_exit), Some(jump_update)),
        ),
        (
            StateId::Dying,
            StateHooks::new(Some(player_dying_enter), None, Some(player_dying_update)),
        ),
        (
            StateId::Dead,
            StateHooks::new(Some(player_dead_enter), None, None),
        ),
        (
            StateId::Respawn,
            StateHooks::new(Some(player_respawn_enter), None, None),
        ),
    ]
}

/// Knocked from below: players hop but never flip
fn player_bump(
    player: &mut Player,
    ctx: &mut SimContext<'_>,
    _bumper: Option<ActorId>,
    direction: i32,
    with_sound: bool,
) {
    if direction != 0 {
        player.body.look_horizontal(direction);
    }
    if with_sound {
        ctx.events.sound(SoundEffect::Bump);
    }
    player.jump(ctx, HOP_DURATION, HOP_HEIGHT, Some("Jump"));
}

fn player_jump_exit(player: &mut Player, _ctx: &mut SimContext<'_>) {
    player.release_bump();
}

fn player_walk_enter(player: &mut Player, _ctx: &mut SimContext<'_>) {
    player.play("Idle");
}

fn skid(player: &mut Player, ctx: &mut SimContext<'_>) {
    if player.play("Slip") {
        ctx.events.sound(SoundEffect::Skid);
    }
}

fn player_walk_update(player: &mut Player, ctx: &mut SimContext<'_>, dt: f32, elapsed: f32) {
    if player.is_flattened() {
        player.role.current_speed = 0.0;
        player.body.set_base_speed(0.0);
        walk_update(player, ctx, dt, elapsed);
        return;
    }

    let intent = ctx.intent;
    let max_speed = player.role.max_speed;
    let acceleration = player.role.acceleration;
    let mut has_input = false;

    if intent.left {
        has_input = true;
        player.role.current_speed -= acceleration * dt;
        if player.role.current_speed.abs() >= max_speed {
            player.role.current_speed = -max_speed;
        }
        if player.role.current_speed >= 0.0 {
            skid(player, ctx);
        } else {
            let clip = player.walk_animation();
            player.play(clip);
        }
    } else if intent.right {
        has_input = true;
        player.role.current_speed += acceleration * dt;
        if player.role.current_speed.abs() >= max_speed {
            player.role.current_speed = max_speed;
        }
        if player.role.current_speed <= 0.0 {
            skid(player, ctx);
        } else {
            let clip = player.walk_animation();
            player.play(clip);
        }
    }

    let mut jumped = false;
    if intent.jump {
        has_input = true;
        jumped = true;
    }

    if !has_input {
        let speed = player.role.current_speed;
        if speed != 0.0 {
            if speed.abs() >= max_speed {
                skid(player, ctx);
            }
            let decelerated = speed - speed.signum() * acceleration * dt;
            // Stop exactly at the zero crossing
            player.role.current_speed = if speed * decelerated < 0.0 { 0.0 } else { decelerated };
        } else {
            player.play("Idle");
        }
    } else {
        player.ignore_platforms = false;
    }

    let speed = player.role.current_speed;
    if speed != 0.0 {
        player.body.look_horizontal(crate::sign(speed));
    }
    player.body.set_base_speed(speed.abs());

    if jumped {
        let (duration, height) = (ctx.settings.player_jump_duration, ctx.settings.player_jump_height);
        player.jump(ctx, duration, height, Some("Jump"));
        ctx.events.sound(SoundEffect::Jump);
        return;
    }

    walk_update(player, ctx, dt, elapsed);
}

fn player_frame(player: &mut Player, ctx: &mut SimContext<'_>, frame: u32) {
    if player.is_walking() && player.role.current_speed != 0.0 && frame == FOOTSTEP_FRAME {
        player.role.footstep = (player.role.footstep + 1) % FOOTSTEP_VARIANTS;
        ctx.events.sound(SoundEffect::Footstep(player.role.footstep));
    }
}

fn player_dying_enter(player: &mut Player, ctx: &mut SimContext<'_>) {
    dying_enter(player, ctx);
    player.role.push = None;
    player.play("Hit");
    ctx.events.sound(SoundEffect::Hit);
}

fn player_dying_update(player: &mut Player, ctx: &mut SimContext<'_>, _dt: f32, elapsed: f32) {
    if elapsed > DEATH_HOP_DELAY {
        player.body.set_speed(0.0);
        player.role.current_speed = 0.0;
        player.jump(ctx, HOP_DURATION, HOP_HEIGHT, Some("Death"));
        ctx.events.sound(SoundEffect::Death);
    }
}

fn player_dead_enter(player: &mut Player, ctx: &mut SimContext<'_>) {
    if player.role.lives >= 0 {
        player.role.lives -= 1;
    }
    character::dead_enter(player, ctx);
}

fn player_respawn_enter(player: &mut Player, _ctx: &mut SimContext<'_>) {
    player.body.set_speed(1.0);
    player.play("Idle");
    player.set_dying(false);
    player.set_flipped(false);
    player.role.current_speed = 0.0;
    player.role.flatten_timer = 0.0;
    player.role.push = None;
    player.body.set_base_speed(0.0);
}
