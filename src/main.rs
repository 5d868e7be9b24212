//! Cat Billiards headless demo
//!
//! Racks a table, takes a break shot and runs frames until everything is at
//! rest, logging what happened. The browser build drives the library through
//! `platform::web` instead.
//!
//! Usage: `cat-billiards [compact|full] [config.json]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use cat_billiards::sim::{GameEvent, ManualScheduler};
    use cat_billiards::{Game, GameConfig, TableMode};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Cat Billiards (native) starting...");

    let mut mode = None;
    let mut config_path = None;
    for arg in std::env::args().skip(1) {
        match TableMode::from_str(&arg) {
            Some(m) => mode = Some(m),
            None => config_path = Some(arg),
        }
    }

    let config = match config_path {
        Some(path) => match std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|json| GameConfig::from_json(&json).map_err(|e| e.to_string()))
        {
            Ok(config) => config,
            Err(e) => {
                log::error!("Failed to load config {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => GameConfig::default(),
    };

    let mut game = match Game::new(config, ManualScheduler::new()) {
        Ok(game) => game,
        Err(e) => {
            log::error!("Invalid config: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(mode) = mode {
        game.set_mode(mode);
    }

    game.subscribe(|event: &GameEvent| -> cat_billiards::Result<()> {
        if event.is_foul() {
            log::info!("Foul! cue ball pocketed");
            return Ok(());
        }
        match event {
            GameEvent::Sink { ball, pocket, .. } => log::info!("Ball {} into pocket {}", ball, pocket),
            GameEvent::ObstacleHit { ball, obstacle, .. } => {
                log::info!("Meow! cat {} swatted ball {}", obstacle, ball)
            }
            _ => log::trace!("{:?}", event),
        }
        Ok(())
    });
    game.on_stopped(|| {
        log::info!("Table at rest");
        Ok(())
    });

    // Aim from the right, so the cue ball travels right into the rack
    let power = game.settings().shot_power(1.0);
    game.apply_shot(std::f32::consts::PI + 0.02, power);

    let frame_ms = 1000.0 / 60.0;
    let mut now = 0.0;
    while let Some(token) = game.scheduler_mut().next_frame() {
        game.frame(token, now);
        now += frame_ms;
    }
    if let Some(due) = game.next_due() {
        game.fire_due(due);
    }

    let score = game.score();
    log::info!(
        "Break finished after {:.1}s: score {}, pocketed {}, fouls {}, {} balls left",
        now / 1000.0,
        score.score,
        score.pocketed,
        score.fouls,
        game.table().object_balls_remaining()
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {}
