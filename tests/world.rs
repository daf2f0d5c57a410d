//! POW, hazards, two player contact and level flow

mod common;

use arcade_bros::sim::{
    Campaign, FireballKind, GameEvent, GamePhase, LevelDef, PlayerIntent, SimContext, SpawnEntry,
    Species,
};
use arcade_bros::consts::HOP_HEIGHT;
use glam::Vec2;

use common::*;

const JUMP: PlayerIntent = PlayerIntent {
    left: false,
    right: false,
    jump: true,
};

const RIGHT: PlayerIntent = PlayerIntent {
    left: false,
    right: true,
    jump: false,
};

fn idle() -> arcade_bros::sim::TickInput {
    intents(PlayerIntent::default())
}

// === POW ===

#[test]
fn pow_flips_grounded_enemies_and_spares_falling_ones() {
    let (mut state, recorder) = playing(quiet_settings(), holding_campaign(), 1);
    let player_id = state.players[0].id;
    state.players[0].body.move_to(Vec2::new(128.0, 208.0));
    let island = state.place_enemy(Species::Turtle, Vec2::new(100.0, 112.0), 1);
    let ledge = state.place_enemy(Species::Turtle, Vec2::new(40.0, 160.0), -1);
    let airborne = state.place_enemy(Species::Turtle, Vec2::new(200.0, 100.0), 1);
    for enemy in state.enemies.iter_mut() {
        enemy.body.set_speed(0.0);
    }

    run(&mut state, &intents(JUMP), 1);
    let hit = run_until(&mut state, &idle(), 10, |s| {
        s.events_this_tick()
            .iter()
            .any(|e| matches!(e, GameEvent::PowTriggered { .. }))
    });
    assert!(hit);

    assert!(state.enemy(island).unwrap().is_flipped());
    assert!(state.enemy(ledge).unwrap().is_flipped());
    assert!(!state.enemy(airborne).unwrap().is_flipped());
    assert_eq!(state.players[0].score(), 20);
    assert_eq!(state.grid.pow_uses_left(), 2);
    assert!(state.shake.is_active());

    let tick_events = state.events_this_tick();
    assert!(tick_events.contains(&GameEvent::PowTriggered { by: player_id, uses_left: 2 }));
    assert!(tick_events.contains(&GameEvent::CameraShake { duration: 0.5 }));
    assert_eq!(recorder.count(|e| *e == GameEvent::PowDepleted), 0);
}

#[test]
fn last_pow_use_removes_the_block() {
    let mut settings = quiet_settings();
    settings.pow_uses = 1;
    let (mut state, recorder) = playing(settings, holding_campaign(), 1);
    state.players[0].body.move_to(Vec2::new(128.0, 208.0));

    run(&mut state, &intents(JUMP), 1);
    run(&mut state, &idle(), 5);
    assert_eq!(recorder.count(|e| *e == GameEvent::PowDepleted), 1);
    assert_eq!(state.grid.pow_uses_left(), 0);
    assert!(!state.grid.is_pow(15, 22));
    assert!(!state.grid.is_pow(16, 22));
}

fn pow_hit_by_first_player(state: &mut arcade_bros::sim::GameState) -> bool {
    state.players[0].body.move_to(Vec2::new(128.0, 208.0));
    run(state, &intents(JUMP), 1);
    run_until(state, &idle(), 10, |s| {
        s.events_this_tick()
            .iter()
            .any(|e| matches!(e, GameEvent::PowTriggered { .. }))
    })
}

#[test]
fn pow_hops_the_other_player_but_not_the_bumper() {
    let (mut state, _) = playing(quiet_settings(), holding_campaign(), 2);
    state.players[1].body.move_to(Vec2::new(180.0, 208.0));

    assert!(pow_hit_by_first_player(&mut state));

    let other = &state.players[1];
    assert!(other.is_jumping());
    assert!(!other.is_flipped());
    assert_eq!(other.jump_arc().height, HOP_HEIGHT);
    assert_eq!(other.score(), 0);

    // The bumper stays frozen under the block on its own jump
    let bumper = &state.players[0];
    assert!(bumper.is_jumping());
    assert!(bumper.is_bumping());
    assert!(!bumper.is_flipped());
    assert_eq!(bumper.jump_arc().height, state.settings.player_jump_height);

    // The hop lands back on the floor
    let landed = run_until(&mut state, &idle(), 60, |s| s.players[1].is_walking());
    assert!(landed);
    assert_eq!(state.players[1].position().y, 208.0);
}

#[test]
fn pow_spares_a_falling_player() {
    let (mut state, _) = playing(quiet_settings(), holding_campaign(), 2);
    // Mid-air over the lower right ledge
    state.players[1].body.move_to(Vec2::new(200.0, 100.0));

    assert!(pow_hit_by_first_player(&mut state));

    let other = &state.players[1];
    assert!(other.is_falling());
    assert!(!other.is_jumping());
    assert!(!other.is_flipped());
}

// === Fireballs ===

#[test]
fn sweeping_fireball_kills_and_puffs() {
    let mut settings = quiet_settings();
    settings.sweeping_cooldown_min = 0.1;
    settings.sweeping_cooldown_max = 0.1;
    let (mut state, recorder) = playing(settings, holding_campaign(), 1);

    let killed = run_until(&mut state, &idle(), 400, |s| s.players[0].is_dying());
    assert!(killed);
    assert_eq!(
        recorder.count(|e| *e == GameEvent::FireballSpawned { kind: FireballKind::Sweeping }),
        1
    );
    assert_eq!(
        recorder.count(|e| *e == GameEvent::FireballDestroyed { kind: FireballKind::Sweeping }),
        1
    );
    assert!(state.fireballs.iter().all(|f| !f.is_active()));
}

// === Two players ===

#[test]
fn players_side_by_side_push_apart() {
    let (mut state, _) = playing(quiet_settings(), holding_campaign(), 2);
    state.players[0].body.move_to(Vec2::new(100.0, 208.0));
    state.players[1].body.move_to(Vec2::new(110.0, 208.0));

    run(&mut state, &idle(), 1);
    let push = state.players[0].role.push.expect("first player pushed");
    assert_eq!(push.direction, -1);
    assert_eq!(push.from, state.players[1].id);
    assert_eq!(state.players[1].role.push.map(|p| p.direction), Some(1));

    run(&mut state, &idle(), 60);
    assert!(state.players[0].role.push.is_none());
    assert!(state.players[1].role.push.is_none());
    let gap = state.players[1].position().x - state.players[0].position().x;
    assert!((18.0..19.0).contains(&gap), "gap {gap}");
}

#[test]
fn landing_on_a_head_flattens_the_other_player() {
    let (mut state, _) = playing(quiet_settings(), holding_campaign(), 2);
    state.players[0].body.move_to(Vec2::new(100.0, 190.0));
    state.players[1].body.move_to(Vec2::new(104.0, 208.0));
    let input = arcade_bros::sim::TickInput {
        players: [PlayerIntent::default(), RIGHT],
        ..Default::default()
    };

    let squashed = run_until(&mut state, &input, 60, |s| s.players[1].is_flattened());
    assert!(squashed);
    assert!(state.players[0].is_jumping());
    assert!(state.players[0].is_active());

    // Pinned while squashed, even holding a direction
    let x = state.players[1].position().x;
    run(&mut state, &input, 30);
    assert_eq!(state.players[1].position().x, x);
    assert!(state.players[1].is_active());
}

// === Deaths ===

#[test]
fn touching_an_upright_enemy_costs_a_life() {
    let (mut state, recorder) = playing(quiet_settings(), holding_campaign(), 1);
    let player_id = state.players[0].id;
    state.place_enemy(Species::Turtle, Vec2::new(100.0, 208.0), -1);

    let respawning = run_until(&mut state, &idle(), 400, |s| s.players[0].is_respawning());
    assert!(respawning);
    assert_eq!(state.players[0].lives(), 1);
    assert!(state.elevators[0].is_active());
    assert_eq!(recorder.count(|e| *e == GameEvent::PlayerRespawned { player: player_id }), 1);
    assert_eq!(recorder.count(|e| *e == GameEvent::CharacterDied { character: player_id }), 1);
    assert!(recorder.events().iter().any(|e| matches!(e, GameEvent::Splash { .. })));

    // Rides down, then stands on the platform
    run(&mut state, &idle(), 130);
    let player = &state.players[0];
    assert!(player.is_walking());
    assert!((player.position().y - 40.0).abs() < 0.5);
    assert!(state.elevators[0].is_active());
}

#[test]
fn losing_the_last_life_ends_the_game() {
    let mut settings = quiet_settings();
    settings.starting_lives = 0;
    let (mut state, recorder) = playing(settings, holding_campaign(), 1);
    state.place_enemy(Species::Turtle, Vec2::new(100.0, 208.0), -1);

    let over = run_until(&mut state, &idle(), 400, |s| s.phase == GamePhase::GameOver);
    assert!(over);
    assert!(!state.players[0].body.is_alive());
    assert_eq!(state.players[0].lives(), -1);
    assert_eq!(recorder.count(|e| *e == GameEvent::GameOver), 1);
    assert_eq!(recorder.count(|e| matches!(e, GameEvent::PlayerRespawned { .. })), 0);
}

// === Level flow ===

#[test]
fn kicking_the_last_enemy_clears_and_loops_the_campaign() {
    let (mut state, recorder) = playing(quiet_settings(), empty_campaign(), 1);
    let turtle = state.place_enemy(Species::Turtle, Vec2::new(120.0, 208.0), -1);
    {
        let mut ctx = SimContext::new(&state.grid, &state.settings, &mut state.slots, &mut state.events);
        state.enemies[0].bump(&mut ctx, None, 0, false);
    }

    let kicked = run_until(&mut state, &intents(RIGHT), 120, |s| {
        s.enemy(turtle).is_some_and(|e| e.is_dying())
    });
    assert!(kicked);
    assert_eq!(state.players[0].score(), 800);

    let cleared = run_until(&mut state, &idle(), 120, |s| s.phase == GamePhase::LevelCleared);
    assert!(cleared);
    assert_eq!(state.killed, 1);
    assert_eq!(recorder.count(|e| *e == GameEvent::LevelCleared { index: 0 }), 1);
    assert!(recorder.events().iter().any(|e| matches!(e, GameEvent::Splash { .. })));

    run(&mut state, &idle(), 301);
    assert_eq!(state.phase, GamePhase::LevelStart);
    assert_eq!(state.level.index(), 0);
    assert_eq!(state.loop_count, 1);
    assert_eq!(state.speed_bonus(), 5.0);
    assert_eq!(
        recorder.count(|e| *e == GameEvent::LevelStarted { index: 0, bonus: false }),
        2
    );
}

fn bonus_campaign(coins: usize) -> Campaign {
    Campaign {
        levels: vec![
            LevelDef::bonus(1, coins, 1.0),
            LevelDef::new(0, vec![SpawnEntry::new(Species::Turtle, 10_000.0)]),
        ],
    }
}

#[test]
fn bonus_coins_pay_out_at_the_tally() {
    let (mut state, recorder) = playing(quiet_settings(), bonus_campaign(0), 1);
    assert!(state.level.is_bonus());
    state.place_enemy(Species::Coin, Vec2::new(110.0, 208.0), -1);

    let cleared = run_until(&mut state, &idle(), 300, |s| s.phase == GamePhase::LevelCleared);
    assert!(cleared);
    assert_eq!(state.bonus_coins, [1, 0]);
    assert_eq!(state.players[0].score(), 0);
    assert_eq!(recorder.count(|e| matches!(e, GameEvent::CoinCollected { .. })), 1);

    let counted = run_until(&mut state, &idle(), 400, |s| s.phase == GamePhase::BonusCount);
    assert!(counted);
    assert_eq!(state.players[0].score(), 800);
    assert!(state
        .events_this_tick()
        .contains(&GameEvent::BonusCounted { coins: 1, perfect: false }));

    let next = run_until(&mut state, &idle(), 200, |s| s.phase == GamePhase::LevelStart);
    assert!(next);
    assert_eq!(state.level.index(), 1);
    assert!(!state.level.is_bonus());
}

#[test]
fn bonus_round_ends_when_time_runs_out() {
    let mut settings = quiet_settings();
    settings.bonus_duration = 2.0;
    let (mut state, recorder) = playing(settings, bonus_campaign(1), 1);

    run(&mut state, &idle(), 60);
    assert_eq!(state.phase, GamePhase::Playing);
    assert_eq!(state.enemies.len(), 1);
    assert!(state.enemies[0].is_coin());

    let over = run_until(&mut state, &idle(), 70, |s| s.phase == GamePhase::LevelCleared);
    assert!(over);
    assert!(state.enemies.is_empty());

    let counted = run_until(&mut state, &idle(), 400, |s| s.phase == GamePhase::BonusCount);
    assert!(counted);
    assert_eq!(state.players[0].score(), 0);
    assert_eq!(
        recorder.count(|e| *e == GameEvent::BonusCounted { coins: 0, perfect: false }),
        1
    );
}
