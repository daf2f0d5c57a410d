//! Arcade Bros headless runner
//!
//! Plays a scripted game for a while and prints a summary. Useful for
//! checking determinism and tuning settings without a renderer.
//!
//! Usage: `arcade-bros [seed] [seconds] [settings.json]`

#[cfg(not(target_arch = "wasm32"))]
use arcade_bros::{
    Settings,
    audio::{AudioManager, SilentBackend},
    consts::SIM_DT,
    sim::{EventSink, GameEvent, GamePhase, GameState, PlayerIntent, TickInput, tick},
};

/// Logs the events a HUD would care about
#[cfg(not(target_arch = "wasm32"))]
#[derive(Default)]
struct HudLog;

#[cfg(not(target_arch = "wasm32"))]
impl EventSink for HudLog {
    fn on_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::ScoreChanged { player, score, gained } => {
                log::debug!("{player:?} +{gained} = {score}");
            }
            GameEvent::LevelStarted { index, bonus } => {
                log::info!("-- level {index}{} --", if *bonus { " (bonus)" } else { "" });
            }
            GameEvent::ExtraLife { player, lives } => log::info!("{player:?} 1UP ({lives})"),
            GameEvent::GameOver => log::info!("-- game over --"),
            _ => {}
        }
    }
}

/// Wander back and forth, hopping now and then
#[cfg(not(target_arch = "wasm32"))]
fn autopilot(tick_index: u64) -> PlayerIntent {
    let leg = (tick_index / 150) % 2;
    PlayerIntent {
        left: leg == 0,
        right: leg == 1,
        jump: tick_index % 50 == 0,
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let seed = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(12345);
    let seconds: f32 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(120.0);
    let settings = args.get(3).map(Settings::load).unwrap_or_default();

    log::info!("Arcade Bros (headless) seed {seed}, {seconds}s");
    let mut state = GameState::new(seed, settings);
    state.add_sink(Box::new(AudioManager::new(SilentBackend)));
    state.add_sink(Box::new(HudLog));

    let ticks = (seconds / SIM_DT) as u64;
    let mut started = false;
    for t in 0..ticks {
        let input = TickInput {
            players: [autopilot(t), autopilot(t + 75)],
            start: !started,
            two_players: true,
        };
        tick(&mut state, &input, SIM_DT);
        started = true;
        if state.phase == GamePhase::GameOver {
            break;
        }
    }

    println!("phase: {:?}", state.phase);
    println!("level: {} (loop {})", state.level.index(), state.loop_count);
    for player in &state.players {
        println!(
            "player {}: score {}, lives {}",
            player.index() + 1,
            player.score(),
            player.lives()
        );
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No headless runner on the web
}
