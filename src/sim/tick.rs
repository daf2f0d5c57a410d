//! Fixed timestep simulation tick
//!
//! Advances the world one frame. While playing the order is fixed: effects,
//! level clock, every character, dead sweep, contacts, level-clear check.
//! Events raised by an actor are handled and forwarded before the next actor
//! moves.

use serde::{Deserialize, Serialize};

use super::collision::{
    PlayerContact, bump_direction, enemy_blocked_by, player_contact, player_touches_enemy,
    wrapped_dx,
};
use super::effects::{BumpEffect, Splash};
use super::enemy::Enemy;
use super::events::{ActorId, GameEvent};
use super::fireball::Rect;
use super::grid::cell;
use super::machine::SimContext;
use super::state::{GamePhase, GameState};
use crate::audio::SoundEffect;
use crate::consts::{HEAD_PROBE, PLAYER_COLLISION_HEIGHT, PLAYER_COLLISION_WIDTH, SCREEN_HEIGHT};

/// One player's controls for a tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerIntent {
    pub left: bool,
    pub right: bool,
    /// Edge triggered: true only on the frame jump was pressed. A jump
    /// starts from this alone, so holding the button needs no separate flag.
    pub jump: bool,
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickInput {
    /// Indexed by player number
    pub players: [PlayerIntent; 2],
    /// Start press on the title screen
    pub start: bool,
    /// Start a two player game
    pub two_players: bool,
}

/// Borrow the context pieces of a world, leaving its actor lists free
macro_rules! ctx {
    ($state:ident) => {
        SimContext::new(
            &$state.grid,
            &$state.settings,
            &mut $state.slots,
            &mut $state.events,
        )
    };
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.clear_dispatched();
    state.time_ticks += 1;
    state.phase_timer += dt;

    match state.phase {
        GamePhase::Title => {
            if input.start {
                let count = if input.two_players { 2 } else { 1 };
                if let Err(err) = state.start_game(count) {
                    log::warn!("cannot start a game: {err}");
                }
            }
        }
        GamePhase::LevelStart => {
            if state.phase_timer >= state.settings.level_start_duration {
                enter_phase(state, GamePhase::Playing);
            }
        }
        GamePhase::Playing => play(state, input, dt),
        GamePhase::LevelCleared => {
            advance_effects(state, dt);
            advance_players(state, input, dt);
            if state.phase_timer >= state.settings.level_cleared_duration {
                if state.level.is_bonus() {
                    count_bonus(state);
                } else {
                    next_level(state);
                }
            }
        }
        GamePhase::BonusCount => {
            if state.phase_timer >= state.settings.bonus_count_duration {
                next_level(state);
            }
        }
        GamePhase::GameOver => {
            if state.phase_timer >= state.settings.game_over_duration {
                enter_phase(state, GamePhase::Title);
            }
        }
    }

    dispatch_events(state);
}

fn play(state: &mut GameState, input: &TickInput, dt: f32) {
    advance_effects(state, dt);
    advance_fireballs(state, dt);
    dispatch_events(state);

    if let Some(species) = state.level.update(dt) {
        state.spawn_enemy(species);
        dispatch_events(state);
    }

    advance_players(state, input, dt);
    advance_enemies(state, dt);

    sweep_dead(state);
    if state.phase != GamePhase::Playing {
        return;
    }

    collide_players_with_enemies(state);
    repel_enemies(state);
    collide_players(state);
    collide_fireballs(state);
    dispatch_events(state);

    check_level_clear(state);
}

fn enter_phase(state: &mut GameState, phase: GamePhase) {
    log::debug!("phase {:?} -> {phase:?}", state.phase);
    state.phase = phase;
    state.phase_timer = 0.0;
}

// === Events ===

/// Handle pending events in emission order, forwarding each one to the sinks.
/// Events raised while handling are appended and handled in the same pass.
pub(crate) fn dispatch_events(state: &mut GameState) {
    while let Some(event) = state.events.pop_front() {
        handle_event(state, &event);
        state.forward(event);
    }
}

fn handle_event(state: &mut GameState, event: &GameEvent) {
    match event {
        GameEvent::BumpStarted { bumper } => bump_from_below(state, *bumper),
        GameEvent::EnemyDying { enemy, killer } => on_enemy_dying(state, *enemy, *killer),
        GameEvent::CoinCollected { collector, .. } => on_coin_collected(state, *collector),
        _ => {}
    }
}

fn award(state: &mut GameState, player: ActorId, points: u32) {
    if let Some(p) = state.players.iter_mut().find(|p| p.id == player) {
        let mut ctx = ctx!(state);
        p.add_score(points, &mut ctx);
    }
}

/// Whether bumps and contacts apply to this enemy at all
fn in_play(enemy: &Enemy) -> bool {
    !enemy.is_dying() && !enemy.is_dead() && !enemy.is_entering() && !enemy.is_exiting()
}

fn bump_from_below(state: &mut GameState, bumper: ActorId) {
    let Some(player) = state.player(bumper) else {
        return;
    };
    let (px, py) = (player.pixel_x(), player.pixel_y());
    state.bumps.push(BumpEffect::new(bumper, px, py));

    let row = cell(py - HEAD_PROBE);
    if state.grid.is_pow(cell(px), row) {
        trigger_pow(state, bumper);
        return;
    }

    for i in 0..state.enemies.len() {
        let enemy = &state.enemies[i];
        if !in_play(enemy) || cell(enemy.pixel_y()) != row {
            continue;
        }
        let target_x = px + wrapped_dx(px as f32, enemy.pixel_x() as f32) as i32;
        if let Some(direction) = bump_direction(px, target_x) {
            bump_enemy(state, i, bumper, direction, true);
        }
    }
}

fn bump_enemy(state: &mut GameState, index: usize, bumper: ActorId, direction: i32, with_sound: bool) {
    let enemy = &mut state.enemies[index];
    let was_flipped = enemy.is_flipped();
    let mut ctx = ctx!(state);
    enemy.bump(&mut ctx, Some(bumper), direction, with_sound);

    if !was_flipped && enemy.is_flipped() {
        let id = enemy.id;
        let points = state.settings.flip_score;
        state.events.push(GameEvent::EnemyFlipped { enemy: id, by: bumper });
        award(state, bumper, points);
    }
}

/// Bump every grounded character on screen except the bumper, straight up
fn trigger_pow(state: &mut GameState, bumper: ActorId) {
    let hit = state.grid.hit_pow();
    let duration = state.settings.pow_shake_duration;
    state.shake.start(duration);
    state.events.push(GameEvent::CameraShake { duration });
    state.events.sound(SoundEffect::Pow);
    state.events.push(GameEvent::PowTriggered {
        by: bumper,
        uses_left: hit.uses_left,
    });
    if hit.depleted {
        log::info!("POW block used up");
        state.events.push(GameEvent::PowDepleted);
    }

    for i in 0..state.enemies.len() {
        let enemy = &state.enemies[i];
        if in_play(enemy) && !enemy.is_falling() {
            bump_enemy(state, i, bumper, 0, false);
        }
    }

    for player in state.players.iter_mut() {
        if player.id == bumper || !player.is_active() || player.is_falling() {
            continue;
        }
        let mut ctx = ctx!(state);
        player.bump(&mut ctx, Some(bumper), 0, false);
    }
}

fn on_enemy_dying(state: &mut GameState, enemy: ActorId, killer: Option<ActorId>) {
    let Some(dying) = state.enemy(enemy) else {
        return;
    };
    // Coins score through CoinCollected
    if dying.is_coin() {
        return;
    }

    if let Some(killer) = killer {
        let combo = state.player_mut(killer).map(|p| p.kill_combo());
        if let Some(combo) = combo {
            let points = state.settings.kill_score.saturating_mul(combo + 1);
            award(state, killer, points);
        }
    }

    // Last enemy standing goes all out
    if !state.level.is_bonus() && state.level.all_spawned() {
        let mut live = state
            .enemies
            .iter_mut()
            .filter(|e| !e.is_dying() && !e.is_dead());
        if let (Some(last), None) = (live.next(), live.next()) {
            log::debug!("last enemy {:?} to max phase", last.id);
            last.to_max_phase(&state.settings);
        }
    }
}

fn on_coin_collected(state: &mut GameState, collector: Option<ActorId>) {
    let Some((id, index)) = collector
        .and_then(|id| state.player(id))
        .map(|p| (p.id, p.index()))
    else {
        return;
    };
    if let Some(count) = state.bonus_coins.get_mut(index) {
        *count += 1;
    }
    // Bonus levels pay out at the tally
    if !state.level.is_bonus() {
        let points = state.settings.coin_score;
        award(state, id, points);
    }
}

// === Per-tick steps ===

fn advance_effects(state: &mut GameState, dt: f32) {
    let mut finished = Vec::new();
    state.bumps.retain_mut(|bump| {
        let done = bump.update(dt);
        if done {
            finished.push(bump.bumper);
        }
        !done
    });
    for bumper in finished {
        if let Some(player) = state.players.iter_mut().find(|p| p.id == bumper) {
            let mut ctx = ctx!(state);
            player.stop_bump(&mut ctx);
        }
    }

    state.splashes.retain_mut(|splash| !splash.update(dt));
    state.shake.update(dt);

    for (player, elevator) in state.players.iter_mut().zip(state.elevators.iter_mut()) {
        let mut ctx = ctx!(state);
        elevator.update(player, &mut ctx, dt);
    }
}

fn advance_fireballs(state: &mut GameState, dt: f32) {
    if state.level.is_bonus() {
        return;
    }
    let target = state
        .players
        .iter()
        .find(|p| p.is_active())
        .map(|p| p.position());
    for fireball in state.fireballs.iter_mut() {
        fireball.update(
            &state.grid,
            &state.settings,
            &mut state.rng,
            &mut state.events,
            target,
            dt,
        );
    }
}

fn advance_players(state: &mut GameState, input: &TickInput, dt: f32) {
    for i in 0..state.players.len() {
        let player = &mut state.players[i];
        if !player.body.is_alive() {
            continue;
        }
        let intent = input.players.get(player.index()).copied().unwrap_or_default();
        let mut ctx = ctx!(state).with_intent(intent);
        player.tick(&mut ctx, dt);
        dispatch_events(state);
    }
}

fn advance_enemies(state: &mut GameState, dt: f32) {
    for i in 0..state.enemies.len() {
        let enemy = &mut state.enemies[i];
        if enemy.is_dead() {
            continue;
        }
        let mut ctx = ctx!(state);
        enemy.update(&mut ctx, dt);
        dispatch_events(state);
    }
}

fn splash(state: &mut GameState, x: f32) {
    state.splashes.push(Splash::new(x));
    state.events.push(GameEvent::Splash { x });
    state.events.sound(SoundEffect::Splash);
}

/// Remove dead enemies, respawn or retire dead players
fn sweep_dead(state: &mut GameState) {
    let mut gone = Vec::new();
    state.enemies.retain(|enemy| {
        if enemy.is_dead() {
            gone.push((enemy.id, enemy.position()));
            false
        } else {
            true
        }
    });
    state.killed += gone.len();
    for (id, position) in gone {
        state.slots.release_owner(id);
        if position.y >= SCREEN_HEIGHT {
            splash(state, position.x);
        }
    }

    for i in 0..state.players.len() {
        let player = &state.players[i];
        if !player.is_dead() || !player.body.is_alive() {
            continue;
        }
        let position = player.position();
        if position.y >= SCREEN_HEIGHT {
            splash(state, position.x);
        }

        let player = &mut state.players[i];
        if player.lives() >= 0 {
            if let Some(elevator) = state.elevators.get_mut(i) {
                let mut ctx = ctx!(state);
                elevator.reset(player, &mut ctx);
            }
        } else {
            log::info!("player {} is out (score {})", player.index(), player.score());
            player.body.disable();
        }
    }
    dispatch_events(state);

    if !state.players.is_empty() && state.players.iter().all(|p| !p.body.is_alive()) {
        game_over(state);
    }
}

fn collide_players_with_enemies(state: &mut GameState) {
    for p in 0..state.players.len() {
        for e in 0..state.enemies.len() {
            let player = &state.players[p];
            if !player.is_active() {
                break;
            }
            let enemy = &state.enemies[e];
            if !in_play(enemy) {
                continue;
            }

            let (px, py) = (player.pixel_x(), player.pixel_y());
            let dx = wrapped_dx(px as f32, enemy.pixel_x() as f32);
            if !player_touches_enemy((px, py), (px + dx as i32, enemy.pixel_y())) {
                continue;
            }

            let player_id = player.id;
            if enemy.is_flipped() || enemy.is_coin() {
                let enemy = &mut state.enemies[e];
                let mut ctx = ctx!(state);
                enemy.kill(&mut ctx, Some(player_id), crate::sign(dx));
            } else {
                let player = &mut state.players[p];
                let mut ctx = ctx!(state);
                player.kill(&mut ctx, None, 0);
            }
            dispatch_events(state);
        }
    }
}

/// Walkers that meet head on both turn around
fn repel_enemies(state: &mut GameState) {
    for i in 0..state.enemies.len() {
        let enemy = &state.enemies[i];
        if !in_play(enemy) || enemy.is_falling() || enemy.is_flipped() {
            continue;
        }
        let position = (enemy.pixel_x(), enemy.pixel_y());
        let facing = enemy.body.facing();
        let blocked = state
            .enemies
            .iter()
            .enumerate()
            .any(|(j, other)| j != i && enemy_blocked_by(position, facing, (other.pixel_x(), other.pixel_y())));
        if blocked {
            state.enemies[i].turn_around();
        }
    }
}

fn collide_players(state: &mut GameState) {
    if state.players.len() < 2 {
        return;
    }
    let (first, second) = state.players.split_at_mut(1);
    let (a, b) = (&mut first[0], &mut second[0]);

    let both_active = a.is_active() && b.is_active();
    let dx = wrapped_dx(a.position().x, b.position().x);
    if !both_active || dx.abs() >= state.settings.push_margin {
        a.role.push = None;
        b.role.push = None;
    }
    if !both_active {
        return;
    }

    let contact = player_contact(
        (a.pixel_x(), a.pixel_y()),
        a.is_falling(),
        (b.pixel_x(), b.pixel_y()),
        b.is_falling(),
    );
    let mut ctx = ctx!(state);
    let squash = ctx.settings.flatten_duration;
    match contact {
        Some(PlayerContact::Flatten { top: 0, .. }) => {
            a.head_bounce(&mut ctx);
            b.flatten(squash);
        }
        Some(PlayerContact::Flatten { .. }) => {
            b.head_bounce(&mut ctx);
            a.flatten(squash);
        }
        Some(PlayerContact::Push) if a.role.push.is_none() && b.role.push.is_none() => {
            let away = if dx > 0.0 {
                -1
            } else if dx < 0.0 {
                1
            } else {
                -a.body.facing()
            };
            let (a_factor, b_factor) = (a.speed_factor(), b.speed_factor());
            a.shove(away, b.id, b_factor, ctx.settings);
            b.shove(-away, a.id, a_factor, ctx.settings);
        }
        _ => {}
    }
}

fn collide_fireballs(state: &mut GameState) {
    for f in 0..state.fireballs.len() {
        if !state.fireballs[f].is_active() {
            continue;
        }
        let hit_box = state.fireballs[f].hit_box();
        for p in 0..state.players.len() {
            let player = &mut state.players[p];
            if !player.is_active() {
                continue;
            }
            let body = Rect::standing(
                player.position(),
                PLAYER_COLLISION_WIDTH as f32,
                PLAYER_COLLISION_HEIGHT as f32,
            );
            if body.overlaps(&hit_box) {
                let mut ctx = ctx!(state);
                player.kill(&mut ctx, None, 0);
                state.fireballs[f].destroy(&mut state.events);
                break;
            }
        }
    }
}

fn check_level_clear(state: &mut GameState) {
    let cleared = state.level.all_spawned() && state.enemies.is_empty();
    let time_up = state.level.is_bonus() && state.level.elapsed() >= state.settings.bonus_duration;
    if !cleared && !time_up {
        return;
    }
    if !cleared {
        log::info!("bonus time up, {} coin(s) left", state.enemies.len());
    }

    state.enemies.clear();
    state.slots.release_all();
    for fireball in state.fireballs.iter_mut() {
        fireball.destroy(&mut state.events);
    }

    let index = state.level.index();
    log::info!("level {index} cleared ({} enemies)", state.killed);
    state.events.push(GameEvent::LevelCleared { index });
    enter_phase(state, GamePhase::LevelCleared);
}

fn count_bonus(state: &mut GameState) {
    let total = state.level.enemy_count() as u32;
    let collected: u32 = state.bonus_coins.iter().sum();
    let perfect = total > 0 && collected >= total;
    let (coin_score, perfect_score) = (state.settings.coin_score, state.settings.bonus_perfect_score);

    let earners: Vec<(ActorId, u32)> = state
        .players
        .iter()
        .map(|p| (p.id, state.bonus_coins.get(p.index()).copied().unwrap_or(0)))
        .collect();
    for (id, coins) in earners {
        let mut points = coins.saturating_mul(coin_score);
        if perfect && coins > 0 {
            points = points.saturating_add(perfect_score);
        }
        award(state, id, points);
    }

    log::info!("bonus: {collected}/{total} coins{}", if perfect { ", perfect" } else { "" });
    state.events.push(GameEvent::BonusCounted {
        coins: collected,
        perfect,
    });
    enter_phase(state, GamePhase::BonusCount);
}

/// Next level, looping to the first with faster enemies past the end
fn next_level(state: &mut GameState) {
    let mut index = state.level.index() + 1;
    if index >= state.campaign.len() {
        index = 0;
        state.loop_count += 1;
        log::info!("campaign loop {}", state.loop_count);
    }
    if let Err(err) = state.begin_level(index) {
        log::warn!("{err}");
        enter_phase(state, GamePhase::Title);
    }
}

fn game_over(state: &mut GameState) {
    log::info!("game over at level {} (loop {})", state.level.index(), state.loop_count);
    state.events.push(GameEvent::GameOver);
    state.events.sound(SoundEffect::GameOver);
    enter_phase(state, GamePhase::GameOver);
}
