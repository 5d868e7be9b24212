//! Browser bridge
//!
//! JS owns the requestAnimationFrame loop and the DOM; each callback calls
//! `frame()` while `is_running()` is true and draws from `snapshot()`.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;

use crate::config::GameConfig;
use crate::feedback::{FeedbackRecorder, FeedbackSettings};
use crate::game::Game;
use crate::settings::TableMode;
use crate::sim::{EventListener, GameEvent, ManualScheduler};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    // Err only when a logger is already installed
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("Cat Billiards core loaded");
}

#[wasm_bindgen]
pub struct WebGame {
    game: Game<ManualScheduler>,
    events: Rc<RefCell<Vec<GameEvent>>>,
    feedback: Rc<RefCell<FeedbackRecorder>>,
}

#[wasm_bindgen]
impl WebGame {
    /// Build from a JSON config (empty string for defaults) and the measured table size
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str, width: f32, height: f32) -> Result<WebGame, JsValue> {
        let mut config = if config_json.trim().is_empty() {
            GameConfig::default()
        } else {
            GameConfig::from_json(config_json).map_err(|e| JsValue::from_str(&e.to_string()))?
        };
        config.layout = config.layout.with_size(width, height);

        let mut game = Game::new(config, ManualScheduler::new())
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        game.subscribe(move |event: &GameEvent| -> crate::Result<()> {
            sink.borrow_mut().push(*event);
            Ok(())
        });

        let feedback = Rc::new(RefCell::new(FeedbackRecorder::new(FeedbackSettings::default())));
        let recorder = Rc::clone(&feedback);
        game.subscribe(move |event: &GameEvent| -> crate::Result<()> {
            recorder.borrow_mut().on_event(event)
        });

        Ok(WebGame {
            game,
            events,
            feedback,
        })
    }

    pub fn apply_shot(&mut self, angle: f32, power: f32) -> bool {
        self.game.apply_shot(angle, power)
    }

    /// Shot power for a pull fraction in [0, 1]
    pub fn shot_power(&self, fraction: f32) -> f32 {
        self.game.settings().shot_power(fraction)
    }

    pub fn reset(&mut self) {
        self.game.reset();
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.game.resize(width, height);
    }

    pub fn set_compact(&mut self, compact: bool) {
        let mode = if compact { TableMode::Compact } else { TableMode::Full };
        self.game.set_mode(mode);
    }

    /// Switch mode by name ("compact"/"mobile" or "full"/"desktop"); false if unknown
    pub fn set_mode(&mut self, name: &str) -> bool {
        match TableMode::from_str(name) {
            Some(mode) => {
                self.game.set_mode(mode);
                true
            }
            None => {
                log::warn!("Unknown table mode {:?}", name);
                false
            }
        }
    }

    /// Pick the table mode from the viewport width (CSS px)
    pub fn set_viewport_width(&mut self, width: f32) {
        self.game.set_mode(TableMode::for_viewport_width(width));
    }

    pub fn set_feedback(&mut self, sound: bool, haptics: bool, sfx_volume: f32) {
        self.feedback.borrow_mut().set_settings(FeedbackSettings {
            sound,
            haptics,
            sfx_volume,
        });
    }

    /// Run the pending frame, if any; returns whether the loop is still running
    pub fn frame(&mut self, now_ms: f64) -> bool {
        if let Some(token) = self.game.scheduler_mut().next_frame() {
            self.game.frame(token, now_ms);
        }
        self.game.is_running()
    }

    pub fn is_running(&self) -> bool {
        self.game.is_running()
    }

    /// Fire due timers (cue respawn); returns how many fired
    pub fn fire_due(&mut self, now_ms: f64) -> u32 {
        self.game.fire_due(now_ms) as u32
    }

    pub fn next_due(&self) -> Option<f64> {
        self.game.next_due()
    }

    /// `[x, y, radius, sunk]` per ball, in ball id order
    pub fn snapshot(&self) -> Vec<f32> {
        bytemuck::cast_slice(&self.game.table().snapshot()).to_vec()
    }

    /// `[x, y, radius]` per cat
    pub fn obstacles(&self) -> Vec<f32> {
        self.game
            .table()
            .obstacles
            .iter()
            .flat_map(|o| [o.pos.x, o.pos.y, o.radius])
            .collect()
    }

    /// `[x, y, radius]` per pocket
    pub fn pockets(&self) -> Vec<f32> {
        self.game
            .table()
            .pockets
            .iter()
            .flat_map(|p| [p.pos.x, p.pos.y, p.radius])
            .collect()
    }

    /// Events since the last call, as a JSON array
    pub fn drain_events(&mut self) -> String {
        let events = std::mem::take(&mut *self.events.borrow_mut());
        serde_json::to_string(&events).unwrap_or_else(|e| {
            log::warn!("Failed to encode events: {}", e);
            "[]".to_string()
        })
    }

    /// Feedback cues since the last call, as a JSON array
    pub fn drain_feedback(&mut self) -> String {
        let cues = self.feedback.borrow_mut().drain();
        serde_json::to_string(&cues).unwrap_or_else(|e| {
            log::warn!("Failed to encode feedback: {}", e);
            "[]".to_string()
        })
    }

    pub fn score(&self) -> u32 {
        self.game.score().score
    }

    pub fn fouls(&self) -> u32 {
        self.game.score().fouls
    }

    pub fn rack_cleared(&self) -> bool {
        self.game.rack_cleared()
    }

    pub fn balls_remaining(&self) -> u32 {
        self.game.table().object_balls_remaining() as u32
    }
}
