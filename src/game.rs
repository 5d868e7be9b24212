//! Shot/reset controller
//!
//! `Game` owns the table, the engine and the frame loop, and is the only
//! thing that mutates ball state from outside a step: shots, resets,
//! resizes and cue ball respawns. Listeners only ever see events, render
//! snapshots and stop notifications.

use glam::Vec2;

use crate::config::GameConfig;
use crate::error::Result;
use crate::rules::{DeferredAction, DeferredQueue, ScoreKeeper};
use crate::settings::{PhysicsSettings, TableMode};
use crate::sim::layout::rack_spacing;
use crate::sim::{
    BallInstance, EventBus, EventListener, FrameOutcome, FrameScheduler, FrameToken, GameEvent,
    GameLoop, LoopState, PhysicsEngine, Table, TableLayout,
};

pub type RenderListener = Box<dyn FnMut(&[BallInstance])>;

pub struct Game<S: FrameScheduler> {
    config: GameConfig,
    engine: PhysicsEngine,
    table: Table,
    driver: GameLoop<S>,
    bus: EventBus,
    render_listeners: Vec<RenderListener>,
    rules: ScoreKeeper,
    deferred: DeferredQueue,
    /// Per-frame event buffer
    events: Vec<GameEvent>,
}

impl<S: FrameScheduler> Game<S> {
    /// Validate the config and lay out a fresh table
    pub fn new(config: GameConfig, scheduler: S) -> Result<Self> {
        config.validate()?;
        let engine = PhysicsEngine::new(config.physics_settings());
        let table = config.layout.build();
        let rules = ScoreKeeper::new(config.sink_reward, config.foul_penalty);
        log::info!(
            "New table {}x{} ({} mode, {} object balls, {} cats)",
            table.width,
            table.height,
            config.mode.as_str(),
            config.layout.object_balls,
            table.obstacles.len()
        );
        Ok(Self {
            config,
            engine,
            table,
            driver: GameLoop::new(scheduler),
            bus: EventBus::new(),
            render_listeners: Vec::new(),
            rules,
            deferred: DeferredQueue::new(),
            events: Vec::new(),
        })
    }

    /// Read-only view for rendering between frames
    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn layout(&self) -> &TableLayout {
        &self.config.layout
    }

    pub fn score(&self) -> &ScoreKeeper {
        &self.rules
    }

    pub fn settings(&self) -> &PhysicsSettings {
        self.engine.settings()
    }

    pub fn state(&self) -> LoopState {
        self.driver.state()
    }

    pub fn is_running(&self) -> bool {
        self.driver.is_running()
    }

    pub fn scheduler(&self) -> &S {
        self.driver.scheduler()
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        self.driver.scheduler_mut()
    }

    pub fn rack_cleared(&self) -> bool {
        self.rules.rack_cleared(self.config.layout.object_balls)
    }

    /// Earliest pending timer (host ms), if any
    pub fn next_due(&self) -> Option<f64> {
        self.deferred.next_due()
    }

    pub fn subscribe(&mut self, listener: impl EventListener + 'static) {
        self.bus.subscribe(listener);
    }

    pub fn on_stopped(&mut self, listener: impl FnMut() -> Result<()> + 'static) {
        self.driver.on_stopped(listener);
    }

    pub fn on_render(&mut self, listener: impl FnMut(&[BallInstance]) + 'static) {
        self.render_listeners.push(Box::new(listener));
    }

    /// Switch table mode; the new preset applies from the next step
    ///
    /// Drops any custom settings from `update_settings` or the config.
    pub fn set_mode(&mut self, mode: TableMode) {
        if self.config.settings_override.take().is_some() {
            log::info!("Custom physics settings replaced by {} preset", mode.as_str());
        }
        self.config.mode = mode;
        self.engine.update_settings(self.config.physics_settings());
    }

    pub fn update_settings(&mut self, settings: PhysicsSettings) -> Result<()> {
        settings.validate()?;
        self.config.mode = settings.mode;
        self.config.settings_override = Some(settings);
        self.engine.update_settings(settings);
        Ok(())
    }

    /// Strike the cue ball: pull back along `angle`, release with `power`
    ///
    /// Ignored while balls are moving or while the cue ball is off the table.
    /// `power` is used as given.
    pub fn apply_shot(&mut self, angle: f32, power: f32) -> bool {
        if self.driver.is_running() {
            log::warn!("Shot ignored: balls still moving");
            return false;
        }
        if !self.table.is_measured() {
            log::warn!("Shot ignored: table not measured");
            return false;
        }
        let Some(cue) = self.table.cue_ball_mut() else {
            log::warn!("Shot ignored: no cue ball");
            return false;
        };
        if cue.sunk {
            log::warn!("Shot ignored: cue ball awaiting respawn");
            return false;
        }

        cue.vel = Vec2::new(-angle.cos() * power, -angle.sin() * power);
        log::info!("Shot: angle {:.3} power {:.2} -> {:?}", angle, power, cue.vel);
        self.rules.shot_taken();
        self.driver.start()
    }

    /// Re-rack and start scoring over
    pub fn reset(&mut self) {
        self.rules.reset();
        self.relayout();
        log::info!("Table reset");
    }

    /// The host measured a new table size; lay the table out again
    pub fn resize(&mut self, width: f32, height: f32) {
        self.config.layout = self.config.layout.with_size(width, height);
        self.relayout();
        log::info!("Table resized to {}x{}", width, height);
    }

    /// Cancel any in-flight frame and rebuild every entity from the layout
    fn relayout(&mut self) {
        self.driver.stop();
        self.deferred.clear();
        self.rules.take_foul();
        self.events.clear();
        self.table = self.config.layout.build();
        self.notify_render();
    }

    /// Run the frame the host scheduled with `token`
    pub fn frame(&mut self, token: FrameToken, now_ms: f64) -> FrameOutcome {
        let Game {
            driver,
            engine,
            table,
            bus,
            rules,
            events,
            render_listeners,
            ..
        } = self;

        let outcome = driver.run_frame(token, || {
            engine.step(table, events);
            for event in events.iter() {
                rules.observe(event);
            }
            bus.emit_all(events);
            events.clear();

            let snapshot = table.snapshot();
            for listener in render_listeners.iter_mut() {
                listener(&snapshot);
            }
            table.all_settled()
        });

        if outcome == FrameOutcome::Stopped {
            self.after_stop(now_ms);
        }
        outcome
    }

    /// Table settled: queue the cue respawn if this shot was a foul
    fn after_stop(&mut self, now_ms: f64) {
        if self.rack_cleared() {
            log::info!("Rack cleared in {} shots, score {}", self.rules.shots, self.rules.score);
        }
        if self.rules.take_foul() {
            let due = now_ms + self.config.respawn_delay_ms;
            log::info!("Cue ball respawn at {:.0} ms", due);
            self.deferred.schedule(due, DeferredAction::RespawnCue);
            self.fire_due(now_ms);
        }
    }

    /// Run timers due at `now_ms`; returns how many fired
    ///
    /// Nothing fires while the loop is running.
    pub fn fire_due(&mut self, now_ms: f64) -> usize {
        if self.driver.is_running() {
            return 0;
        }
        let due = self.deferred.take_due(now_ms);
        for action in &due {
            match action {
                DeferredAction::RespawnCue => self.respawn_cue(),
            }
        }
        if !due.is_empty() {
            self.notify_render();
        }
        due.len()
    }

    fn respawn_cue(&mut self) {
        let spot = self.respawn_spot();
        if let Some(cue) = self.table.cue_ball_mut() {
            if cue.sunk {
                cue.revive(spot);
                log::info!("Cue ball respawned at ({:.1}, {:.1})", spot.x, spot.y);
            }
        }
    }

    /// The cue spot, or the nearest point along its row clear of balls and cats
    fn respawn_spot(&self) -> Vec2 {
        let spot = self.config.layout.cue_spot();
        let Some(cue) = self.table.cue_ball() else {
            return spot;
        };
        let r = cue.radius;
        let is_clear = |pos: Vec2| {
            let clear_of_balls = self
                .table
                .balls
                .iter()
                .filter(|b| !b.sunk && b.id != cue.id)
                .all(|b| b.pos.distance(pos) >= b.radius + r);
            let clear_of_cats = self
                .table
                .obstacles
                .iter()
                .all(|c| c.pos.distance(pos) >= c.radius + r);
            clear_of_balls && clear_of_cats
        };

        let step = rack_spacing(r);
        let max_steps = (self.table.width / step).ceil() as i32;
        // 0, -1, +1, -2, +2, ... spacings from the spot
        (0..=max_steps)
            .flat_map(|k| [-k, k])
            .map(|k| Vec2::new(spot.x + k as f32 * step, spot.y))
            .filter(|pos| pos.x >= r && pos.x <= self.table.width - r)
            .find(|&pos| is_clear(pos))
            .unwrap_or(spot)
    }

    fn notify_render(&mut self) {
        let snapshot = self.table.snapshot();
        for listener in self.render_listeners.iter_mut() {
            listener(&snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::ManualScheduler;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn new_game() -> Game<ManualScheduler> {
        Game::new(GameConfig::default(), ManualScheduler::new()).unwrap()
    }

    /// Drive frames until the loop goes idle; returns the frame count
    fn run_until_idle(game: &mut Game<ManualScheduler>) -> usize {
        let mut frames = 0;
        let mut now = 0.0;
        while let Some(token) = game.scheduler_mut().next_frame() {
            game.frame(token, now);
            now += 16.0;
            frames += 1;
            assert!(frames < 20_000, "table never settled");
        }
        frames
    }

    #[test]
    fn test_shot_sets_velocity_opposite_aim() {
        let mut game = new_game();
        assert!(game.apply_shot(0.0, 10.0));
        let cue = game.table().cue_ball().unwrap();
        assert_eq!(cue.vel.x, -10.0);
        assert_eq!(cue.vel.y, 0.0);
        assert!(game.is_running());
        assert_eq!(game.score().shots, 1);
    }

    #[test]
    fn test_shot_while_moving_is_ignored() {
        let mut game = new_game();
        assert!(game.apply_shot(0.0, 10.0));
        let token = game.scheduler_mut().next_frame().unwrap();
        game.frame(token, 0.0);
        let vel = game.table().cue_ball().unwrap().vel;

        assert!(!game.apply_shot(1.0, 50.0));
        assert_eq!(game.table().cue_ball().unwrap().vel, vel);
        assert_eq!(game.score().shots, 1);
    }

    #[test]
    fn test_reset_mid_shot_invalidates_pending_frame() {
        let mut game = new_game();
        game.apply_shot(std::f32::consts::PI, 15.0);
        let token = game.scheduler_mut().next_frame().unwrap();

        game.reset();
        let fresh = game.table().balls.clone();

        assert_eq!(game.frame(token, 0.0), FrameOutcome::Stale);
        assert_eq!(game.table().balls, fresh);
        assert_eq!(game.state(), LoopState::Idle);
        assert_eq!(game.scheduler().pending(), 0);
    }

    #[test]
    fn test_listeners_see_events_renders_and_stop() {
        let mut game = new_game();
        let events = Rc::new(RefCell::new(Vec::new()));
        let renders = Rc::new(RefCell::new(0usize));
        let stops = Rc::new(RefCell::new(0usize));

        let e = Rc::clone(&events);
        game.subscribe(move |ev: &GameEvent| -> Result<()> {
            e.borrow_mut().push(*ev);
            Ok(())
        });
        let r = Rc::clone(&renders);
        game.on_render(move |snapshot: &[BallInstance]| {
            assert_eq!(snapshot.len(), 11);
            *r.borrow_mut() += 1;
        });
        let s = Rc::clone(&stops);
        game.on_stopped(move || {
            *s.borrow_mut() += 1;
            Ok(())
        });

        // Straight at the rack
        game.apply_shot(std::f32::consts::PI, 15.0);
        let frames = run_until_idle(&mut game);

        assert_eq!(*renders.borrow(), frames);
        assert_eq!(*stops.borrow(), 1);
        assert!(
            events
                .borrow()
                .iter()
                .any(|e| matches!(e, GameEvent::BallHit { a: 0, .. }))
        );
        assert!(game.table().all_settled());
    }

    #[test]
    fn test_cue_foul_respawns_after_delay() {
        let mut game = new_game();
        // Park the cue ball next to the top-left pocket and roll it in
        let pocket = game.table().pockets[0].pos;
        if let Some(cue) = game.table.cue_ball_mut() {
            cue.pos = pocket + Vec2::new(20.0, 20.0);
        }
        let angle = std::f32::consts::FRAC_PI_4;
        assert!(game.apply_shot(angle, 4.0));
        run_until_idle(&mut game);

        assert!(game.table().cue_ball().unwrap().sunk);
        assert_eq!(game.score().fouls, 1);
        let due = game.next_due().expect("respawn scheduled");

        // Cue is sunk: no shots until it comes back
        assert!(!game.apply_shot(0.0, 5.0));

        assert_eq!(game.fire_due(due - 1.0), 0);
        assert_eq!(game.fire_due(due), 1);
        let cue = game.table().cue_ball().unwrap();
        assert!(!cue.sunk);
        assert_eq!(cue.pos, game.layout().cue_spot());
        assert_eq!(cue.vel, Vec2::ZERO);
        assert!(game.apply_shot(0.0, 5.0));
    }

    #[test]
    fn test_reset_clears_pending_respawn_and_score() {
        let mut game = new_game();
        let pocket = game.table().pockets[0].pos;
        if let Some(cue) = game.table.cue_ball_mut() {
            cue.pos = pocket + Vec2::new(20.0, 20.0);
        }
        game.apply_shot(std::f32::consts::FRAC_PI_4, 4.0);
        run_until_idle(&mut game);
        assert!(game.next_due().is_some());

        game.reset();
        assert!(game.next_due().is_none());
        assert_eq!(*game.score(), ScoreKeeper::new(1, 1));
        assert!(!game.table().cue_ball().unwrap().sunk);
    }

    #[test]
    fn test_resize_relays_out_table() {
        let mut game = new_game();
        game.resize(300.0, 200.0);
        assert_eq!(game.table().width, 300.0);
        assert_eq!(game.table().cue_ball().unwrap().pos, Vec2::new(75.0, 100.0));
    }

    #[test]
    fn test_unmeasured_table_rejects_shots() {
        let mut game = new_game();
        game.resize(0.0, 0.0);
        assert!(!game.apply_shot(0.0, 10.0));
        assert_eq!(game.state(), LoopState::Idle);
    }

    #[test]
    fn test_mode_switch_replaces_custom_settings() {
        let mut game = new_game();
        let custom = PhysicsSettings {
            friction: 0.97,
            ..PhysicsSettings::for_mode(TableMode::Full)
        };
        game.update_settings(custom).unwrap();
        assert_eq!(game.settings().friction, 0.97);

        game.set_mode(TableMode::Compact);
        assert_eq!(*game.settings(), PhysicsSettings::for_mode(TableMode::Compact));
        assert_eq!(game.config().mode, TableMode::Compact);
        assert!(game.config().settings_override.is_none());

        game.set_mode(TableMode::Full);
        assert_eq!(*game.settings(), PhysicsSettings::for_mode(TableMode::Full));
    }

    #[test]
    fn test_respawn_avoids_ball_on_cue_spot() {
        let mut game = new_game();
        let spot = game.layout().cue_spot();
        // Sink the cue and leave object ball 1 resting on the spot
        if let Some(cue) = game.table.cue_ball_mut() {
            cue.sink();
        }
        if let Some(ball) = game.table.balls.iter_mut().find(|b| b.id == 1) {
            ball.pos = spot;
        }
        game.deferred.schedule(0.0, DeferredAction::RespawnCue);
        assert_eq!(game.fire_due(0.0), 1);

        let cue = game.table().cue_ball().unwrap();
        assert!(!cue.sunk);
        assert_eq!(cue.pos.y, spot.y);
        assert!(cue.pos.distance(spot) >= 2.0 * cue.radius);

        // Nothing moving, so the next step reports no contact
        let mut events = Vec::new();
        game.engine.step(&mut game.table, &mut events);
        assert!(events.is_empty());
    }

    #[test]
    fn test_mode_switch_updates_engine() {
        let mut game = new_game();
        game.set_mode(TableMode::Compact);
        assert_eq!(*game.settings(), PhysicsSettings::for_mode(TableMode::Compact));

        let mut bad = *game.settings();
        bad.friction = 2.0;
        assert!(game.update_settings(bad).is_err());
        assert_eq!(game.settings().mode, TableMode::Compact);
    }
}
