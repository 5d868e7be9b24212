//! Physics settings and table modes
//!
//! One mode flag picks a preset; the engine holds the resulting values and
//! only changes them through `PhysicsEngine::update_settings`.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Table size mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TableMode {
    /// Small screens: softer hits, slow balls ignored by cats
    Compact,
    #[default]
    Full,
}

impl TableMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableMode::Compact => "Compact",
            TableMode::Full => "Full",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "compact" | "mobile" => Some(TableMode::Compact),
            "full" | "desktop" => Some(TableMode::Full),
            _ => None,
        }
    }

    /// Pick the mode from a viewport width (CSS px)
    pub fn for_viewport_width(width: f32) -> Self {
        if width < 768.0 {
            TableMode::Compact
        } else {
            TableMode::Full
        }
    }
}

/// Per-session physics constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsSettings {
    pub mode: TableMode,
    /// Fraction of velocity kept each frame (0 < f < 1)
    pub friction: f32,
    /// Per-axis speed below which velocity snaps to zero
    pub min_velocity: f32,
    /// Shot speed at full pull
    pub base_hit_power: f32,
    /// Speed a cat swat gives the ball
    pub paw_impulse: f32,
    /// Frames a cat stays inert after reacting
    pub obstacle_cooldown: u32,
    /// Slowest ball a cat reacts to (compact mode only)
    pub min_obstacle_speed: f32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self::for_mode(TableMode::default())
    }
}

impl PhysicsSettings {
    /// Preset values for a mode
    pub fn for_mode(mode: TableMode) -> Self {
        match mode {
            TableMode::Compact => Self {
                mode,
                friction: 0.98,
                min_velocity: 0.05,
                base_hit_power: 12.0,
                paw_impulse: 5.0,
                obstacle_cooldown: 45,
                min_obstacle_speed: 0.5,
            },
            TableMode::Full => Self {
                mode,
                friction: 0.985,
                min_velocity: 0.05,
                base_hit_power: 18.0,
                paw_impulse: 8.0,
                obstacle_cooldown: 30,
                min_obstacle_speed: 0.0,
            },
        }
    }

    /// Whether a cat ignores a ball moving at `speed`
    pub fn obstacle_ignores(&self, speed: f32) -> bool {
        self.mode == TableMode::Compact && speed < self.min_obstacle_speed
    }

    /// Map an input pull fraction to a shot power (caller-side clamp)
    pub fn shot_power(&self, fraction: f32) -> f32 {
        fraction.clamp(0.0, 1.0) * self.base_hit_power
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.friction > 0.0 && self.friction < 1.0) {
            return Err(Error::InvalidSettings(format!(
                "friction must be in (0, 1), got {}",
                self.friction
            )));
        }
        if !(self.min_velocity >= 0.0) {
            return Err(Error::InvalidSettings(format!(
                "min_velocity must be >= 0, got {}",
                self.min_velocity
            )));
        }
        if !(self.base_hit_power >= 0.0 && self.paw_impulse >= 0.0) {
            return Err(Error::InvalidSettings(
                "hit power and paw impulse must be >= 0".to_string(),
            ));
        }
        if !(self.min_obstacle_speed >= 0.0) {
            return Err(Error::InvalidSettings(format!(
                "min_obstacle_speed must be >= 0, got {}",
                self.min_obstacle_speed
            )));
        }
        Ok(())
    }
}
