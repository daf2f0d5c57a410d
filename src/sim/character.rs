//! Platform character: the state machine shared by players and enemies
//!
//! A `Character<R>` is an actor body plus a state machine keyed on itself.
//! `R` carries the role data (enemy or player). Species differences are not
//! expressed through inheritance: each species registers its own hooks for
//! the states it overrides and supplies a `Behavior` table for the few
//! non-state operations (bump, recover, walk clip, frame callback). The base
//! hooks in this module fill in every state a species leaves alone.

use std::sync::Arc;

use glam::Vec2;

use super::actor::Actor;
use super::animation::{AnimationSet, Animator, FrameHook};
use super::error::SimError;
use super::events::{ActorId, GameEvent};
use super::grid::cell;
use super::machine::{self, SimContext, StateHooks, StateId, StateMachine, Stateful};
use super::motion::{fall_drop, jump_rise};
use crate::audio::SoundEffect;
use crate::consts::{HEAD_PROBE, HOP_DURATION, HOP_HEIGHT, SCREEN_HEIGHT, TILE_SIZE};
use crate::settings::MoveMode;

/// `(character, ctx, bumper, direction, with_sound)`
pub type BumpHook<R> = fn(&mut Character<R>, &mut SimContext<'_>, Option<ActorId>, i32, bool);
pub type RecoverHook<R> = fn(&mut Character<R>, &mut SimContext<'_>);
pub type WalkClip<R> = fn(&Character<R>) -> &'static str;

/// Species-level operations picked at construction
pub struct Behavior<R> {
    pub walk_animation: WalkClip<R>,
    pub bump: BumpHook<R>,
    pub recover: RecoverHook<R>,
    pub on_frame: Option<FrameHook<Character<R>>>,
}

impl<R> Clone for Behavior<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for Behavior<R> {}

impl<R> Behavior<R> {
    /// Plain platform behavior
    pub fn platform() -> Self {
        Self {
            walk_animation: run_clip::<R>,
            bump: platform_bump::<R>,
            recover: platform_recover::<R>,
            on_frame: None,
        }
    }
}

fn run_clip<R>(_: &Character<R>) -> &'static str {
    "Run"
}

/// Parameters of the current parabolic arc
#[derive(Debug, Clone, Copy, Default)]
pub struct JumpArc {
    pub start_y: f32,
    pub timer: f32,
    pub duration: f32,
    pub height: f32,
}

/// Everything needed to build a character
pub struct CharacterSpec<R> {
    pub id: ActorId,
    pub position: Vec2,
    pub base_speed: f32,
    pub move_mode: MoveMode,
    pub clips: Arc<AnimationSet>,
    pub flipped_duration: f32,
    pub behavior: Behavior<R>,
    /// Species overrides, registered before the platform defaults
    pub states: Vec<(StateId, StateHooks<Character<R>>)>,
    pub role: R,
}

/// A platform-bound actor driven by its own state machine
pub struct Character<R> {
    pub id: ActorId,
    pub body: Actor,
    pub anim: Animator<Character<R>>,
    machine: StateMachine<Character<R>>,
    behavior: Behavior<R>,
    pub role: R,
    jump: JumpArc,
    fall_timer: f32,
    fall_start_y: f32,
    bumping: bool,
    flipped: bool,
    flipped_duration: f32,
    /// Pass through tiles (pipes, dying, respawn elevator)
    pub ignore_platforms: bool,
    dying: bool,
    /// Whether hitting a tile from below starts a bump
    pub can_bump: bool,
    killer: Option<ActorId>,
}

impl<R> Stateful for Character<R> {
    fn machine(&self) -> &StateMachine<Self> {
        &self.machine
    }

    fn machine_mut(&mut self) -> &mut StateMachine<Self> {
        &mut self.machine
    }
}

impl<R> std::fmt::Debug for Character<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Character")
            .field("id", &self.id)
            .field("state", &self.machine.current())
            .field("position", &self.body.position())
            .field("flipped", &self.flipped)
            .field("dying", &self.dying)
            .finish()
    }
}

/// Default hooks for every platform state
pub fn platform_states<R>() -> Vec<(StateId, StateHooks<Character<R>>)> {
    vec![
        (
            StateId::Idle,
            StateHooks::new(Some(idle_enter::<R>), None, Some(idle_update::<R>)),
        ),
        (
            StateId::Walk,
            StateHooks::new(Some(walk_enter::<R>), None, Some(walk_update::<R>)),
        ),
        (
            StateId::Jump,
            StateHooks::new(Some(jump_enter::<R>), Some(jump_exit::<R>), Some(jump_update::<R>)),
        ),
        (
            StateId::Fall,
            StateHooks::new(Some(fall_enter::<R>), None, Some(fall_update::<R>)),
        ),
        (
            StateId::Flipped,
            StateHooks::new(
                Some(flipped_enter::<R>),
                Some(flipped_exit::<R>),
                Some(flipped_update::<R>),
            ),
        ),
        (
            StateId::Dying,
            StateHooks::new(Some(dying_enter::<R>), None, Some(dying_update::<R>)),
        ),
        (StateId::Dead, StateHooks::new(Some(dead_enter::<R>), None, None)),
    ]
}

impl<R> Character<R> {
    pub fn new(spec: CharacterSpec<R>) -> Self {
        let mut body = Actor::new(spec.position, spec.move_mode);
        body.set_base_speed(spec.base_speed);

        let mut machine = StateMachine::new();
        for (id, hooks) in spec.states.into_iter().chain(platform_states::<R>()) {
            machine.add_state(id, hooks);
        }

        Self {
            id: spec.id,
            body,
            anim: Animator::new(spec.clips),
            machine,
            behavior: spec.behavior,
            role: spec.role,
            jump: JumpArc {
                duration: HOP_DURATION,
                height: HOP_HEIGHT,
                ..JumpArc::default()
            },
            fall_timer: 0.0,
            fall_start_y: 0.0,
            bumping: false,
            flipped: false,
            flipped_duration: spec.flipped_duration,
            ignore_platforms: false,
            dying: false,
            can_bump: false,
            killer: None,
        }
    }

    // === State machine ===

    /// Transition, failing fast on a state this character never registered
    pub fn set_state(&mut self, ctx: &mut SimContext<'_>, state: StateId) {
        if let Err(err) = self.try_set_state(ctx, state) {
            panic!("character {:?}: {err}", self.id);
        }
    }

    pub fn try_set_state(&mut self, ctx: &mut SimContext<'_>, state: StateId) -> Result<(), SimError> {
        machine::transition(self, ctx, state)
    }

    /// Advance the current state by one tick
    pub fn update(&mut self, ctx: &mut SimContext<'_>, delta_time: f32) {
        machine::update(self, ctx, delta_time);
    }

    pub fn state(&self) -> Option<StateId> {
        self.machine.current()
    }

    pub fn is_in(&self, state: StateId) -> bool {
        self.machine.is_in(state)
    }

    pub fn state_elapsed(&self) -> f32 {
        self.machine.elapsed()
    }

    pub fn is_walking(&self) -> bool {
        self.is_in(StateId::Walk)
    }

    pub fn is_jumping(&self) -> bool {
        self.is_in(StateId::Jump)
    }

    pub fn is_falling(&self) -> bool {
        self.is_in(StateId::Fall)
    }

    pub fn is_dead(&self) -> bool {
        self.is_in(StateId::Dead)
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    pub fn is_dying(&self) -> bool {
        self.dying
    }

    pub fn is_bumping(&self) -> bool {
        self.bumping
    }

    pub fn killer(&self) -> Option<ActorId> {
        self.killer
    }

    pub fn jump_arc(&self) -> JumpArc {
        self.jump
    }

    pub fn flipped_duration(&self) -> f32 {
        self.flipped_duration
    }

    pub fn set_flipped_duration(&mut self, duration: f32) {
        self.flipped_duration = duration;
    }

    pub fn behavior(&self) -> Behavior<R> {
        self.behavior
    }

    pub(crate) fn set_flipped(&mut self, flipped: bool) {
        self.flipped = flipped;
    }

    pub(crate) fn set_dying(&mut self, dying: bool) {
        self.dying = dying;
    }

    // === Position helpers ===

    pub fn position(&self) -> Vec2 {
        self.body.position()
    }

    pub fn pixel_x(&self) -> i32 {
        self.body.pixel_x()
    }

    pub fn pixel_y(&self) -> i32 {
        self.body.pixel_y()
    }

    pub fn on_platform(&self, ctx: &SimContext<'_>) -> bool {
        ctx.grid.is_on_platform(self.pixel_x(), self.pixel_y())
    }

    pub fn under_platform(&self, ctx: &SimContext<'_>) -> bool {
        ctx.grid.is_under_platform(self.pixel_x(), self.pixel_y(), HEAD_PROBE)
    }

    // === Animation ===

    pub fn walk_animation(&self) -> &'static str {
        (self.behavior.walk_animation)(self)
    }

    /// Switch clip; unknown clips are ignored
    pub fn play(&mut self, name: &str) -> bool {
        self.anim.play(Some(name), None)
    }

    /// Advance the clip and fire the end/frame callbacks it reports
    pub fn animate(&mut self, ctx: &mut SimContext<'_>, delta_time: f32) {
        let step = self.anim.advance(delta_time);
        if let Some(on_end) = step.on_end {
            on_end(self, ctx);
        }
        if let (Some(frame), Some(on_frame)) = (step.frame_changed, self.behavior.on_frame) {
            on_frame(self, ctx, frame);
        }
    }

    // === Actions ===

    pub fn walk(&mut self, ctx: &mut SimContext<'_>) {
        self.set_state(ctx, StateId::Walk);
    }

    pub fn idle(&mut self, ctx: &mut SimContext<'_>) {
        self.set_state(ctx, StateId::Idle);
    }

    /// Start a parabolic jump that peaks `height` pixels up after `duration`
    pub fn jump(&mut self, ctx: &mut SimContext<'_>, duration: f32, height: f32, animation: Option<&str>) {
        self.jump.duration = duration;
        self.jump.height = height;
        self.anim.play(animation, None);
        self.set_state(ctx, StateId::Jump);
    }

    /// Start falling along the back half of a jump arc
    pub fn fall(&mut self, ctx: &mut SimContext<'_>, duration: f32, height: f32) {
        self.jump.duration = duration;
        self.jump.height = height;
        self.set_state(ctx, StateId::Fall);
    }

    /// Knock this character from below (`direction` 0 is straight up)
    pub fn bump(&mut self, ctx: &mut SimContext<'_>, bumper: Option<ActorId>, direction: i32, with_sound: bool) {
        (self.behavior.bump)(self, ctx, bumper, direction, with_sound);
    }

    /// Kill this character; a non-zero direction turns it to face that way
    pub fn kill(&mut self, ctx: &mut SimContext<'_>, killer: Option<ActorId>, direction: i32) {
        self.killer = killer;
        if direction != 0 {
            self.body.look_horizontal(direction);
        }
        self.set_state(ctx, StateId::Dying);
    }

    pub fn recover(&mut self, ctx: &mut SimContext<'_>) {
        (self.behavior.recover)(self, ctx);
    }

    fn start_bump(&mut self, ctx: &mut SimContext<'_>) {
        self.bumping = true;
        ctx.events.push(GameEvent::BumpStarted { bumper: self.id });
    }

    /// Called when the bump tile animation finishes: resume falling
    pub fn stop_bump(&mut self, ctx: &mut SimContext<'_>) {
        if !self.bumping {
            return;
        }
        self.bumping = false;
        if self.is_jumping() {
            self.set_state(ctx, StateId::Fall);
        }
    }

    /// Drop a bump hold without touching the current state
    pub(crate) fn release_bump(&mut self) {
        self.bumping = false;
    }

    /// Back to a fresh walking character (level start)
    pub fn reset_flags(&mut self) {
        self.bumping = false;
        self.flipped = false;
        self.dying = false;
        self.ignore_platforms = false;
        self.killer = None;
        self.body.set_speed(1.0);
        self.anim.set_speed(1.0);
    }
}

// === Base bump/recover ===

/// Toggle the flipped flag and hop
pub fn platform_bump<R>(
    ch: &mut Character<R>,
    ctx: &mut SimContext<'_>,
    _bumper: Option<ActorId>,
    direction: i32,
    with_sound: bool,
) {
    ch.flipped = !ch.flipped;
    if ch.flipped {
        ch.play("OnBack");
        if direction == 0 {
            // Straight up: once it lands it wanders back the way it came
            ch.body.set_speed(0.0);
            let reversed = -ch.body.direction();
            ch.body.look_to(reversed);
        } else {
            ch.body.look_horizontal(direction);
        }
        if with_sound {
            ctx.events.sound(SoundEffect::Bump);
        }
    } else {
        let clip = ch.walk_animation();
        ch.play(clip);
        if direction == 0 {
            ch.body.set_speed(0.0);
        } else {
            ch.body.set_speed(1.0);
            ch.body.look_horizontal(direction);
        }
    }
    ch.jump(ctx, HOP_DURATION, HOP_HEIGHT, None);
}

pub fn platform_recover<R>(ch: &mut Character<R>, ctx: &mut SimContext<'_>) {
    ch.body.set_speed(1.0);
    ch.anim.set_speed(1.0);
    ch.set_state(ctx, StateId::Walk);
}

// === Base state hooks ===

pub fn idle_enter<R>(ch: &mut Character<R>, _ctx: &mut SimContext<'_>) {
    ch.play("Idle");
}

pub fn idle_update<R>(ch: &mut Character<R>, ctx: &mut SimContext<'_>, dt: f32, _elapsed: f32) {
    ch.animate(ctx, dt);
}

pub fn walk_enter<R>(ch: &mut Character<R>, _ctx: &mut SimContext<'_>) {
    let clip = ch.walk_animation();
    ch.play(clip);
}

pub fn walk_update<R>(ch: &mut Character<R>, ctx: &mut SimContext<'_>, dt: f32, _elapsed: f32) {
    if !ch.ignore_platforms && !ch.on_platform(ctx) {
        ch.fall(ctx, HOP_DURATION, HOP_HEIGHT);
        return;
    }
    ch.body.advance(dt);
    ch.animate(ctx, dt);
}

pub fn jump_enter<R>(ch: &mut Character<R>, _ctx: &mut SimContext<'_>) {
    ch.jump.timer = 0.0;
    ch.jump.start_y = ch.body.position().y;
}

pub fn jump_exit<R>(ch: &mut Character<R>, _ctx: &mut SimContext<'_>) {
    ch.bumping = false;
    if !ch.flipped {
        ch.body.set_speed(1.0);
    }
}

pub fn jump_update<R>(ch: &mut Character<R>, ctx: &mut SimContext<'_>, dt: f32, _elapsed: f32) {
    if !ch.bumping {
        ch.jump.timer += dt;
        let rise = jump_rise(ch.jump.timer, ch.jump.duration, ch.jump.height);
        ch.body.set_y(ch.jump.start_y - rise);
    }
    ch.body.advance(dt);
    ch.animate(ctx, dt);
    if !ch.is_jumping() {
        return;
    }

    let hit_ceiling = ch.can_bump && !ch.ignore_platforms && ch.under_platform(ctx);
    if hit_ceiling {
        if !ch.bumping {
            ch.start_bump(ctx);
        }
    } else if ch.jump.timer >= ch.jump.duration {
        ch.set_state(ctx, StateId::Fall);
    }
}

pub fn fall_enter<R>(ch: &mut Character<R>, _ctx: &mut SimContext<'_>) {
    ch.fall_timer = 0.0;
    ch.fall_start_y = ch.body.position().y;
}

pub fn fall_update<R>(ch: &mut Character<R>, ctx: &mut SimContext<'_>, dt: f32, _elapsed: f32) {
    if !ch.ignore_platforms && ch.on_platform(ctx) {
        let row = cell(ch.pixel_y()) * TILE_SIZE;
        ch.body.set_y(row as f32);
        let next = if ch.flipped { StateId::Flipped } else { StateId::Walk };
        ch.set_state(ctx, next);
        return;
    }

    ch.fall_timer += dt;
    let drop = fall_drop(ch.fall_timer, ch.jump.duration, ch.jump.height);
    ch.body.set_y(ch.fall_start_y - drop);
    ch.body.advance(dt);

    if ch.body.position().y >= SCREEN_HEIGHT {
        ch.set_state(ctx, StateId::Dead);
    }
}

pub fn flipped_enter<R>(ch: &mut Character<R>, _ctx: &mut SimContext<'_>) {
    ch.body.set_speed(0.0);
}

pub fn flipped_exit<R>(ch: &mut Character<R>, _ctx: &mut SimContext<'_>) {
    ch.flipped = false;
}

pub fn flipped_update<R>(ch: &mut Character<R>, ctx: &mut SimContext<'_>, dt: f32, elapsed: f32) {
    if elapsed >= ch.flipped_duration {
        ch.recover(ctx);
        return;
    }
    if elapsed > ch.flipped_duration / 2.0 {
        // About to get back up
        ch.anim.set_speed(3.0);
    }
    ch.animate(ctx, dt);
}

pub fn dying_enter<R>(ch: &mut Character<R>, _ctx: &mut SimContext<'_>) {
    ch.ignore_platforms = true;
    ch.dying = true;
    ch.body.set_speed(1.0);
}

pub fn dying_update<R>(ch: &mut Character<R>, ctx: &mut SimContext<'_>, _dt: f32, _elapsed: f32) {
    ch.fall(ctx, HOP_DURATION, HOP_HEIGHT);
}

pub fn dead_enter<R>(ch: &mut Character<R>, ctx: &mut SimContext<'_>) {
    ctx.events.push(GameEvent::CharacterDied { character: ch.id });
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::grid::Grid;

    fn run(ch: &mut Character<()>, h: &mut Harness, seconds: f32) {
        let ticks = (seconds / SIM_DT).round() as usize;
        for _ in 0..ticks {
            let mut ctx = h.ctx();
            ch.update(&mut ctx, SIM_DT);
        }
    }

    #[test]
    fn test_walks_on_floor() {
        let mut h = Harness::new(Grid::arcade(3));
        let mut ch = plain(Vec2::new(100.0, 208.0));
        ch.walk(&mut h.ctx());
        run(&mut ch, &mut h, 1.0);
        assert!(ch.is_walking());
        assert!((ch.position().x - 130.0).abs() < 0.1);
        assert_eq!(ch.position().y, 208.0);
    }

    #[test]
    fn test_walking_off_a_ledge_falls_and_lands() {
        let mut h = Harness::new(Grid::arcade(3));
        // Above nothing at mid-screen, row 10 is empty
        let mut ch = plain(Vec2::new(124.0, 80.0));
        ch.walk(&mut h.ctx());
        run(&mut ch, &mut h, SIM_DT);
        assert!(ch.is_falling());
        run(&mut ch, &mut h, 2.0);
        // Lands on the centre island (row 14)
        assert!(ch.is_walking());
        assert_eq!(ch.position().y, 112.0);
    }

    #[test]
    fn test_fall_past_bottom_is_dead() {
        let mut h = Harness::new(Grid::empty(0));
        let mut ch = plain(Vec2::new(50.0, 200.0));
        ch.ignore_platforms = true;
        ch.fall(&mut h.ctx(), HOP_DURATION, HOP_HEIGHT);
        run(&mut ch, &mut h, 1.0);
        assert!(ch.is_dead());
        assert!(h
            .events
            .iter()
            .any(|e| *e == GameEvent::CharacterDied { character: ActorId(1) }));
    }

    #[test]
    fn test_straight_up_bump_flips_and_reverses() {
        let mut h = Harness::new(Grid::arcade(3));
        let mut ch = plain(Vec2::new(100.0, 208.0));
        ch.walk(&mut h.ctx());
        ch.bump(&mut h.ctx(), Some(ActorId(9)), 0, true);
        assert!(ch.is_flipped());
        assert!(ch.is_jumping());
        assert_eq!(ch.body.facing(), -1);
        assert_eq!(ch.jump_arc().duration, HOP_DURATION);
        assert_eq!(ch.jump_arc().height, HOP_HEIGHT);
        assert!(h.events.iter().any(|e| *e == GameEvent::Sound(SoundEffect::Bump)));

        // Hop lands on its back
        run(&mut ch, &mut h, 1.0);
        assert!(ch.is_in(StateId::Flipped));
        assert_eq!(ch.body.speed(), 0.0);
    }

    #[test]
    fn test_double_bump_restores_flag_but_still_hops() {
        let mut h = Harness::new(Grid::arcade(3));
        let mut ch = plain(Vec2::new(100.0, 208.0));
        ch.walk(&mut h.ctx());
        ch.bump(&mut h.ctx(), None, 1, false);
        ch.bump(&mut h.ctx(), None, -1, false);
        assert!(!ch.is_flipped());
        assert!(ch.is_jumping());
        assert_eq!(ch.body.facing(), -1);
        run(&mut ch, &mut h, 1.0);
        assert!(ch.is_walking());
    }

    #[test]
    fn test_flipped_recovers_exactly_once() {
        let mut h = Harness::new(Grid::arcade(3));
        let mut ch = plain(Vec2::new(100.0, 208.0));
        ch.walk(&mut h.ctx());
        ch.bump(&mut h.ctx(), None, 0, false);
        run(&mut ch, &mut h, 0.6);
        assert!(ch.is_in(StateId::Flipped));

        run(&mut ch, &mut h, 1.2);
        assert!(ch.is_in(StateId::Flipped));
        assert_eq!(ch.anim.speed(), 3.0);

        run(&mut ch, &mut h, 1.0);
        assert!(ch.is_walking());
        assert!(!ch.is_flipped());
        assert_eq!(ch.body.speed(), 1.0);
        assert_eq!(ch.anim.speed(), 1.0);
    }

    #[test]
    fn test_kill_faces_away_and_dies() {
        let mut h = Harness::new(Grid::arcade(3));
        let mut ch = plain(Vec2::new(100.0, 208.0));
        ch.walk(&mut h.ctx());
        ch.kill(&mut h.ctx(), Some(ActorId(4)), -1);
        assert!(ch.is_dying());
        assert!(ch.ignore_platforms);
        assert_eq!(ch.killer(), Some(ActorId(4)));
        assert_eq!(ch.body.facing(), -1);
        run(&mut ch, &mut h, 2.0);
        assert!(ch.is_dead());
    }

    #[test]
    #[should_panic(expected = "not registered")]
    fn test_unregistered_transition_fails_fast() {
        let mut h = Harness::new(Grid::arcade(3));
        let mut ch = plain(Vec2::new(100.0, 208.0));
        ch.set_state(&mut h.ctx(), StateId::Entering);
    }

    #[test]
    fn test_bumper_freezes_under_ceiling_until_stop() {
        let mut h = Harness::new(Grid::arcade(3));
        // Under the lower-left ledge (row 20)
        let mut ch = plain(Vec2::new(40.0, 208.0));
        ch.can_bump = true;
        ch.walk(&mut h.ctx());
        ch.jump(&mut h.ctx(), 0.5, 75.0, None);
        run(&mut ch, &mut h, 0.4);
        assert!(ch.is_bumping());
        let frozen = ch.position().y;
        run(&mut ch, &mut h, 0.1);
        assert_eq!(ch.position().y, frozen);
        let bumps = h
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::BumpStarted { .. }))
            .count();
        assert_eq!(bumps, 1);

        ch.stop_bump(&mut h.ctx());
        assert!(ch.is_falling());
    }
}
