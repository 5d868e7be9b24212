//! Cat Billiards - casual pool on a table guarded by cats
//!
//! Core modules:
//! - `sim`: Deterministic table simulation (friction, collisions, pockets, frame loop)
//! - `game`: Shot/reset controller wiring the simulation to listeners
//! - `rules`: Scoring, fouls and deferred respawns
//! - `feedback`: Event to sound/haptic cue mapping
//! - `settings` / `config`: Physics presets and JSON game configuration
//! - `platform`: Browser bridge (wasm32 only)

pub mod config;
pub mod error;
pub mod feedback;
pub mod game;
pub mod platform;
pub mod rules;
pub mod settings;
pub mod sim;

pub use config::GameConfig;
pub use error::{Error, Result};
pub use game::Game;
pub use settings::{PhysicsSettings, TableMode};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Extra separation added after a contact so it does not re-trigger next frame
    pub const COLLISION_EPSILON: f32 = 1.0;

    /// Default ball radius in table units
    pub const BALL_RADIUS: f32 = 12.0;
    /// Default number of object balls (1 + 2 + 3 + 4 rack)
    pub const OBJECT_BALL_COUNT: usize = 10;
    /// Gap between neighbouring rack balls
    pub const RACK_GAP: f32 = 2.0;

    /// Cue spot as a fraction of table width/height
    pub const CUE_SPOT_X: f32 = 0.25;
    pub const CUE_SPOT_Y: f32 = 0.5;
    /// Rack apex as a fraction of table width/height
    pub const RACK_APEX_X: f32 = 0.6;
    pub const RACK_APEX_Y: f32 = 0.5;
    /// Rack apex never closer to the right rail than this many ball radii
    pub const RACK_RAIL_CLEARANCE: f32 = 8.0;

    /// Pocket capture radius as a multiple of ball radius
    pub const POCKET_SCALE: f32 = 2.2;
    /// Pocket center inset from the rails as a fraction of pocket radius
    pub const POCKET_INSET: f32 = 0.75;

    /// Default cue respawn delay after a foul (ms)
    pub const RESPAWN_DELAY_MS: f64 = 800.0;
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_polar_to_cartesian_axes() {
        let p = polar_to_cartesian(10.0, FRAC_PI_2);
        assert!(p.x.abs() < 1e-5);
        assert!((p.y - 10.0).abs() < 1e-5);

        let q = polar_to_cartesian(3.0, -FRAC_PI_2);
        assert!(q.x.abs() < 1e-5);
        assert!((q.y + 3.0).abs() < 1e-5);
    }
}
