//! Enemy species built on the platform character
//!
//! All species share pipe entry/exit, spawn-lane arbitration and the phase
//! (difficulty tier) mechanic. The crab gets angry on its first bump instead
//! of flipping; the coin dies on any bump and drifts up while collected.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::animation::ClipLibrary;
use super::character::{
    self, Behavior, Character, CharacterSpec, dying_enter, fall_enter, fall_update, jump_enter,
    jump_update, platform_bump, platform_recover, walk_update,
};
use super::events::{ActorId, GameEvent};
use super::machine::{SimContext, StateHooks, StateId};
use super::spawn::Side;
use crate::audio::SoundEffect;
use crate::consts::{HOP_DURATION, HOP_HEIGHT, SCREEN_WIDTH};
use crate::settings::Settings;

/// Pipe mouth height every enemy enters at
pub const SPAWN_Y: f32 = 44.0;
pub const LEFT_SPAWN_X: f32 = 37.0;
pub const RIGHT_SPAWN_X: f32 = 219.0;
/// Height of the bottom pipes
pub const EXIT_Y: f32 = 199.0;
/// Distance from a screen edge at which a floor walker enters the bottom pipe
pub const EXIT_MARGIN: i32 = 32;
/// Feet row of the bottom floor
pub const EXIT_FLOOR_Y: i32 = 208;
/// Pixels walked out of a top pipe before the enemy is in play
pub const SPAWN_DISTANCE: f32 = 9.0;
/// Pixels walked into a bottom pipe before it comes back out on top
pub const EXIT_DISTANCE: f32 = 16.0;
pub const MAX_PHASE: u32 = 2;
/// Half the sprite width (distance from the anchor to either edge)
const SPRITE_HALF_WIDTH: i32 = 8;
/// Upward drift of a coin being collected, pixels per second
const COIN_COLLECT_RISE: f32 = 32.0;
/// Collect clip frame at which the coin stops rising
const COIN_COLLECT_STOP_FRAME: u32 = 3;

/// Enemy kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Species {
    Turtle,
    Crab,
    Coin,
}

impl Species {
    pub fn name(&self) -> &'static str {
        match self {
            Species::Turtle => "turtle",
            Species::Crab => "crab",
            Species::Coin => "coin",
        }
    }

    fn base_speed(&self, settings: &Settings) -> f32 {
        match self {
            Species::Turtle => settings.turtle_speed,
            Species::Crab => settings.crab_speed,
            Species::Coin => settings.coin_speed,
        }
    }
}

/// Progress of a coin's collect sequence
#[derive(Debug, Clone, Copy, Default)]
pub struct CoinCollect {
    pub active: bool,
    pub animation_done: bool,
    pub movement_done: bool,
    pub origin: Vec2,
}

/// Enemy role data
#[derive(Debug, Clone)]
pub struct EnemyData {
    pub species: Species,
    pub phase: u32,
    /// Animation speed for the current phase
    pub anim_speed: f32,
    /// Pipe side used by the current entry or exit
    pub side: Side,
    pub angry: bool,
    /// Seconds spent walking out of the pipe (only counted while holding the lane)
    pub entry_clock: f32,
    pub coin: CoinCollect,
}

pub type Enemy = Character<EnemyData>;

/// Build an enemy that has not entered the level yet.
/// `speed_bonus` is added to the species speed (campaign loops).
pub fn new_enemy(
    id: ActorId,
    species: Species,
    side: Side,
    settings: &Settings,
    clips: &ClipLibrary,
    speed_bonus: f32,
) -> Enemy {
    let (clip_set, behavior, mut states) = match species {
        Species::Turtle => (clips.turtle.clone(), turtle_behavior(), Vec::new()),
        Species::Crab => (clips.crab.clone(), crab_behavior(), crab_states()),
        Species::Coin => (clips.coin.clone(), coin_behavior(), coin_states()),
    };
    states.extend(enemy_states());

    let mut enemy = Character::new(CharacterSpec {
        id,
        position: Vec2::new(spawn_x(side), SPAWN_Y),
        base_speed: species.base_speed(settings) + speed_bonus,
        move_mode: settings.move_mode,
        clips: clip_set,
        flipped_duration: settings.flipped_duration,
        behavior,
        states,
        role: EnemyData {
            species,
            phase: 0,
            anim_speed: 1.0,
            side,
            angry: false,
            entry_clock: 0.0,
            coin: CoinCollect::default(),
        },
    });
    enemy.body.visible = false;
    enemy
}

pub fn spawn_x(side: Side) -> f32 {
    match side {
        Side::Left => LEFT_SPAWN_X,
        Side::Right => RIGHT_SPAWN_X,
    }
}

impl Character<EnemyData> {
    pub fn species(&self) -> Species {
        self.role.species
    }

    pub fn phase(&self) -> u32 {
        self.role.phase
    }

    pub fn side(&self) -> Side {
        self.role.side
    }

    pub fn is_angry(&self) -> bool {
        self.role.angry
    }

    pub fn is_entering(&self) -> bool {
        self.is_in(StateId::Entering)
    }

    pub fn is_exiting(&self) -> bool {
        self.is_in(StateId::Exiting)
    }

    pub fn is_coin(&self) -> bool {
        self.role.species == Species::Coin
    }

    pub fn is_being_collected(&self) -> bool {
        self.role.coin.active
    }

    /// Come out of the top pipe on `side`
    pub fn enter(&mut self, ctx: &mut SimContext<'_>, side: Side) {
        self.role.side = side;
        self.set_state(ctx, StateId::Entering);
    }

    /// One difficulty tier up (capped): faster walk and animation
    pub fn increase_phase(&mut self, settings: &Settings) {
        if self.role.phase >= MAX_PHASE {
            return;
        }
        self.role.phase += 1;
        let base = self.body.base_speed();
        self.body.set_base_speed(base * settings.phase_speed_factor);
        self.role.anim_speed *= settings.phase_anim_factor;
        self.anim.set_speed(self.role.anim_speed);
        log::debug!("enemy {:?} phase {}", self.id, self.role.phase);
    }

    pub fn to_max_phase(&mut self, settings: &Settings) {
        self.increase_phase(settings);
        self.increase_phase(settings);
    }

    /// Bounce off another enemy: reverse now, pause for the turn clip
    pub fn turn_around(&mut self) {
        let reversed = -self.body.direction();
        self.body.look_to(reversed);
        if self.anim.has_clip("Turn") {
            self.body.set_speed(0.0);
            self.anim.play(Some("Turn"), Some(turn_end));
        }
    }
}

fn turn_end(enemy: &mut Enemy, _ctx: &mut SimContext<'_>) {
    enemy.body.set_speed(1.0);
    let clip = enemy.walk_animation();
    enemy.play(clip);
    enemy.anim.set_speed(enemy.role.anim_speed);
}

// === Behaviors ===

fn turtle_behavior() -> Behavior<EnemyData> {
    Behavior {
        walk_animation: |_| "Run",
        bump: platform_bump,
        recover: enemy_recover,
        on_frame: None,
    }
}

fn crab_behavior() -> Behavior<EnemyData> {
    Behavior {
        walk_animation: |crab| if crab.role.angry { "RunAngry" } else { "Run" },
        bump: crab_bump,
        recover: enemy_recover,
        on_frame: None,
    }
}

fn coin_behavior() -> Behavior<EnemyData> {
    Behavior {
        walk_animation: |_| "Rotate",
        bump: coin_bump,
        recover: enemy_recover,
        on_frame: Some(coin_frame),
    }
}

fn enemy_recover(enemy: &mut Enemy, ctx: &mut SimContext<'_>) {
    platform_recover(enemy, ctx);
    enemy.anim.set_speed(enemy.role.anim_speed);
    enemy.increase_phase(ctx.settings);
}

/// First upright bump only makes a crab angry (faster, no flip)
fn crab_bump(
    crab: &mut Enemy,
    ctx: &mut SimContext<'_>,
    bumper: Option<ActorId>,
    direction: i32,
    with_sound: bool,
) {
    let bonus = ctx.settings.crab_angry_bonus;
    if !crab.is_flipped() && !crab.role.angry {
        crab.role.angry = true;
        let clip = crab.walk_animation();
        crab.play(clip);
        crab.body.set_base_speed(crab.body.base_speed() + bonus);
        crab.body.set_speed(0.0);
        crab.jump(ctx, HOP_DURATION, HOP_HEIGHT, None);
    } else {
        platform_bump(crab, ctx, bumper, direction, with_sound);
        if crab.is_flipped() && crab.role.angry {
            crab.role.angry = false;
            crab.body.set_base_speed(crab.body.base_speed() - bonus);
        }
    }
}

fn coin_bump(
    coin: &mut Enemy,
    ctx: &mut SimContext<'_>,
    bumper: Option<ActorId>,
    _direction: i32,
    _with_sound: bool,
) {
    coin.kill(ctx, bumper, 0);
}

fn coin_frame(coin: &mut Enemy, _ctx: &mut SimContext<'_>, frame: u32) {
    if coin.role.coin.active && frame == COIN_COLLECT_STOP_FRAME {
        coin.role.coin.movement_done = true;
    }
}

fn coin_collect_end(coin: &mut Enemy, _ctx: &mut SimContext<'_>) {
    coin.role.coin.animation_done = true;
}

// === State tables ===

fn enemy_states() -> Vec<(StateId, StateHooks<Enemy>)> {
    vec![
        (
            StateId::Walk,
            StateHooks::new(Some(character::walk_enter), None, Some(enemy_walk_update)),
        ),
        (
            StateId::Fall,
            StateHooks::new(Some(enemy_fall_enter), None, Some(fall_update)),
        ),
        (
            StateId::Dying,
            StateHooks::new(Some(enemy_dying_enter), None, Some(character::dying_update)),
        ),
        (
            StateId::Entering,
            StateHooks::new(Some(entering_enter), Some(entering_exit), Some(entering_update)),
        ),
        (
            StateId::Exiting,
            StateHooks::new(Some(exiting_enter), None, Some(exiting_update)),
        ),
    ]
}

fn crab_states() -> Vec<(StateId, StateHooks<Enemy>)> {
    vec![
        (
            StateId::Jump,
            StateHooks::new(Some(jump_enter), Some(crab_jump_exit), Some(jump_update)),
        ),
        (
            StateId::Fall,
            StateHooks::new(Some(enemy_fall_enter), Some(crab_fall_exit), Some(fall_update)),
        ),
    ]
}

fn coin_states() -> Vec<(StateId, StateHooks<Enemy>)> {
    vec![
        (
            StateId::Dying,
            StateHooks::new(Some(coin_dying_enter), None, Some(coin_dying_update)),
        ),
        (
            StateId::Exiting,
            StateHooks::new(Some(exiting_enter), None, Some(coin_exiting_update)),
        ),
    ]
}

// === Hooks ===

fn enemy_walk_update(enemy: &mut Enemy, ctx: &mut SimContext<'_>, dt: f32, elapsed: f32) {
    walk_update(enemy, ctx, dt, elapsed);
    if !enemy.is_walking() || enemy.pixel_y() < EXIT_FLOOR_Y {
        return;
    }

    let dx = enemy.body.direction().x;
    let x = enemy.pixel_x();
    let at_left_pipe = dx < 0.0 && x - SPRITE_HALF_WIDTH <= EXIT_MARGIN;
    let at_right_pipe = dx > 0.0 && x + SPRITE_HALF_WIDTH > SCREEN_WIDTH as i32 - EXIT_MARGIN;
    if at_left_pipe || at_right_pipe {
        enemy.role.side = Side::from_sign(crate::sign(dx));
        enemy.set_state(ctx, StateId::Exiting);
    }
}

fn enemy_fall_enter(enemy: &mut Enemy, ctx: &mut SimContext<'_>) {
    fall_enter(enemy, ctx);
    ctx.slots.release_owner(enemy.id);
}

fn enemy_dying_enter(enemy: &mut Enemy, ctx: &mut SimContext<'_>) {
    dying_enter(enemy, ctx);
    ctx.slots.release_owner(enemy.id);
    ctx.events.push(GameEvent::EnemyDying {
        enemy: enemy.id,
        killer: enemy.killer(),
    });
}

fn entering_enter(enemy: &mut Enemy, _ctx: &mut SimContext<'_>) {
    enemy.ignore_platforms = true;
    enemy.role.entry_clock = 0.0;
    let side = enemy.role.side;
    enemy.body.look_horizontal(-side.sign());
    enemy.body.move_to(Vec2::new(spawn_x(side), SPAWN_Y));
    enemy.body.visible = false;
    let clip = enemy.walk_animation();
    enemy.play(clip);
}

fn entering_exit(enemy: &mut Enemy, ctx: &mut SimContext<'_>) {
    enemy.ignore_platforms = false;
    ctx.events.sound(SoundEffect::EnemySpawn);
    ctx.events.push(GameEvent::EnemySpawned {
        enemy: enemy.id,
        species: enemy.role.species,
    });
}

fn entering_update(enemy: &mut Enemy, ctx: &mut SimContext<'_>, dt: f32, _elapsed: f32) {
    // Hold inside the pipe until the lane is ours
    if !ctx.slots.try_acquire(enemy.role.side, enemy.id) {
        return;
    }
    enemy.body.visible = true;
    enemy.role.entry_clock += dt;
    enemy.body.advance(dt);
    enemy.animate(ctx, dt);

    if enemy.role.entry_clock > SPAWN_DISTANCE / enemy.body.current_speed() {
        enemy.set_state(ctx, StateId::Walk);
    }
}

fn exiting_enter(enemy: &mut Enemy, _ctx: &mut SimContext<'_>) {
    enemy.ignore_platforms = true;
    let clip = enemy.walk_animation();
    enemy.play(clip);
    let x = enemy.position().x;
    enemy.body.move_to(Vec2::new(x, EXIT_Y));
}

fn exiting_update(enemy: &mut Enemy, ctx: &mut SimContext<'_>, dt: f32, elapsed: f32) {
    enemy.body.advance(dt);
    enemy.animate(ctx, dt);
    if elapsed > EXIT_DISTANCE / enemy.body.current_speed() {
        let side = enemy.role.side;
        enemy.enter(ctx, side);
    }
}

fn coin_exiting_update(coin: &mut Enemy, ctx: &mut SimContext<'_>, dt: f32, elapsed: f32) {
    coin.body.advance(dt);
    coin.animate(ctx, dt);
    if elapsed > EXIT_DISTANCE / coin.body.current_speed() {
        coin.set_state(ctx, StateId::Dead);
    }
}

fn crab_jump_exit(crab: &mut Enemy, _ctx: &mut SimContext<'_>) {
    crab.release_bump();
    if !crab.is_flipped() && !crab.role.angry {
        crab.body.set_speed(1.0);
    }
}

fn crab_fall_exit(crab: &mut Enemy, _ctx: &mut SimContext<'_>) {
    if crab.role.angry {
        crab.body.set_speed(1.0);
    }
}

fn coin_dying_enter(coin: &mut Enemy, ctx: &mut SimContext<'_>) {
    dying_enter(coin, ctx);
    ctx.slots.release_owner(coin.id);
    coin.body.set_speed(0.0);
    ctx.events.sound(SoundEffect::CoinCollect);
    coin.role.coin = CoinCollect {
        active: true,
        animation_done: false,
        movement_done: false,
        origin: coin.position(),
    };
    coin.anim.play(Some("Collect"), Some(coin_collect_end));
}

fn coin_dying_update(coin: &mut Enemy, ctx: &mut SimContext<'_>, dt: f32, _elapsed: f32) {
    if coin.role.coin.animation_done {
        coin.set_state(ctx, StateId::Dead);
        ctx.events.push(GameEvent::CoinCollected {
            coin: coin.id,
            collector: coin.killer(),
        });
        return;
    }
    coin.animate(ctx, dt);
    if !coin.role.coin.movement_done {
        coin.body.move_by(Vec2::new(0.0, -dt * COIN_COLLECT_RISE));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::character::test_support::Harness;
    use crate::sim::grid::Grid;

    fn spawn(h: &mut Harness, id: u32, species: Species, side: Side) -> Enemy {
        let clips = ClipLibrary::default();
        let mut enemy = new_enemy(ActorId(id), species, side, &h.settings, &clips, 0.0);
        enemy.enter(&mut h.ctx(), side);
        enemy
    }

    fn run(enemy: &mut Enemy, h: &mut Harness, ticks: usize) {
        for _ in 0..ticks {
            let mut ctx = h.ctx();
            enemy.update(&mut ctx, SIM_DT);
        }
    }

    #[test]
    fn test_enters_facing_into_the_screen() {
        let mut h = Harness::new(Grid::arcade(3));
        let turtle = spawn(&mut h, 1, Species::Turtle, Side::Left);
        assert!(turtle.is_entering());
        assert_eq!(turtle.body.facing(), 1);
        assert_eq!(turtle.position(), Vec2::new(LEFT_SPAWN_X, SPAWN_Y));
        assert!(turtle.ignore_platforms);

        let crab = spawn(&mut h, 2, Species::Crab, Side::Right);
        assert_eq!(crab.body.facing(), -1);
        assert_eq!(crab.position().x, RIGHT_SPAWN_X);
    }

    #[test]
    fn test_second_enemy_waits_for_the_lane() {
        let mut h = Harness::new(Grid::arcade(3));
        let mut first = spawn(&mut h, 1, Species::Turtle, Side::Left);
        let mut second = spawn(&mut h, 2, Species::Turtle, Side::Left);
        run(&mut first, &mut h, 1);
        run(&mut second, &mut h, 30);
        assert_eq!(second.position(), Vec2::new(LEFT_SPAWN_X, SPAWN_Y));
        assert!(!second.body.visible);

        // First walks out and drops off the pipe, freeing the lane
        run(&mut first, &mut h, 30);
        assert!(first.is_falling());
        assert_eq!(h.slots.owner(Side::Left), None);
        run(&mut second, &mut h, 3);
        assert_eq!(h.slots.owner(Side::Left), Some(ActorId(2)));
        assert!(second.position().x > LEFT_SPAWN_X);
    }

    #[test]
    fn test_first_crab_bump_makes_it_angry() {
        let mut h = Harness::new(Grid::arcade(3));
        let mut crab = spawn(&mut h, 1, Species::Crab, Side::Left);
        crab.body.move_to(Vec2::new(120.0, 208.0));
        crab.walk(&mut h.ctx());
        let base = crab.body.base_speed();

        crab.bump(&mut h.ctx(), Some(ActorId(9)), 0, true);
        assert!(crab.is_angry());
        assert!(!crab.is_flipped());
        assert!(crab.is_jumping());
        assert_eq!(crab.body.speed(), 0.0);
        assert_eq!(crab.body.base_speed(), base + h.settings.crab_angry_bonus);
        assert!(crab.anim.is_playing("RunAngry"));

        run(&mut crab, &mut h, 60);
        assert!(crab.is_walking());
        assert_eq!(crab.body.speed(), 1.0);

        crab.bump(&mut h.ctx(), Some(ActorId(9)), 0, true);
        assert!(crab.is_flipped());
        assert!(!crab.is_angry());
        assert_eq!(crab.body.base_speed(), base);
    }

    #[test]
    fn test_recover_raises_phase() {
        let mut h = Harness::new(Grid::arcade(3));
        h.settings.flipped_duration = 1.0;
        let mut turtle = spawn(&mut h, 1, Species::Turtle, Side::Left);
        turtle.set_flipped_duration(1.0);
        turtle.body.move_to(Vec2::new(120.0, 208.0));
        turtle.walk(&mut h.ctx());
        let base = turtle.body.base_speed();

        turtle.bump(&mut h.ctx(), None, 0, false);
        run(&mut turtle, &mut h, 120);
        assert!(turtle.is_walking());
        assert_eq!(turtle.phase(), 1);
        assert!((turtle.body.base_speed() - base * 1.25).abs() < 1e-4);
        assert!((turtle.anim.speed() - 1.5).abs() < 1e-4);
    }

    #[test]
    fn test_phase_is_capped() {
        let mut h = Harness::new(Grid::arcade(3));
        let mut turtle = spawn(&mut h, 1, Species::Turtle, Side::Left);
        let base = turtle.body.base_speed();
        turtle.to_max_phase(&h.settings);
        turtle.to_max_phase(&h.settings);
        assert_eq!(turtle.phase(), MAX_PHASE);
        assert!((turtle.body.base_speed() - base * 1.25 * 1.25).abs() < 1e-3);
    }

    #[test]
    fn test_floor_walker_exits_and_reenters_same_side() {
        let mut h = Harness::new(Grid::arcade(3));
        let mut turtle = spawn(&mut h, 1, Species::Turtle, Side::Left);
        run(&mut turtle, &mut h, 30);
        turtle.body.move_to(Vec2::new(220.0, 208.0));
        turtle.body.look_horizontal(1);
        turtle.walk(&mut h.ctx());
        run(&mut turtle, &mut h, 1);
        assert!(turtle.is_exiting());
        assert_eq!(turtle.side(), Side::Right);
        assert_eq!(turtle.position().y, EXIT_Y);

        run(&mut turtle, &mut h, 60);
        assert!(turtle.is_entering() || turtle.is_walking() || turtle.is_falling());
        assert_eq!(turtle.body.facing(), -1);
    }

    #[test]
    fn test_coin_collect_rises_then_dies() {
        let mut h = Harness::new(Grid::arcade(3));
        let mut coin = spawn(&mut h, 1, Species::Coin, Side::Left);
        coin.body.move_to(Vec2::new(120.0, 208.0));
        coin.walk(&mut h.ctx());
        coin.bump(&mut h.ctx(), Some(ActorId(5)), 1, true);
        assert!(coin.is_dying());
        assert!(coin.is_being_collected());
        assert!(!h.events.iter().any(|e| matches!(e, GameEvent::EnemyDying { .. })));

        run(&mut coin, &mut h, 120);
        assert!(coin.is_dead());
        // Rose for three frames at 10 fps
        let rise = 208.0 - coin.position().y;
        assert!((rise - 0.3 * COIN_COLLECT_RISE).abs() < 1.5, "rise {rise}");
        assert!(h.events.iter().any(|e| *e
            == GameEvent::CoinCollected {
                coin: ActorId(1),
                collector: Some(ActorId(5)),
            }));
    }

    #[test]
    fn test_turn_around_reverses_and_pauses() {
        let mut h = Harness::new(Grid::arcade(3));
        let mut turtle = spawn(&mut h, 1, Species::Turtle, Side::Left);
        turtle.body.move_to(Vec2::new(120.0, 208.0));
        turtle.walk(&mut h.ctx());
        turtle.turn_around();
        assert_eq!(turtle.body.facing(), -1);
        assert_eq!(turtle.body.speed(), 0.0);
        run(&mut turtle, &mut h, 40);
        assert_eq!(turtle.body.speed(), 1.0);
        assert!(turtle.anim.is_playing("Run"));
    }
}
