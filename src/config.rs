//! Game configuration
//!
//! Everything a host can tune without recompiling, loadable from JSON.
//! Missing fields fall back to defaults.

use serde::{Deserialize, Serialize};

use crate::consts::RESPAWN_DELAY_MS;
use crate::error::Result;
use crate::settings::{PhysicsSettings, TableMode};
use crate::sim::TableLayout;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub mode: TableMode,
    /// Replaces the mode preset entirely when present
    pub settings_override: Option<PhysicsSettings>,
    pub layout: TableLayout,
    /// Delay between the table settling and the cue ball coming back after a foul
    pub respawn_delay_ms: f64,
    /// Points for pocketing an object ball
    pub sink_reward: u32,
    /// Points lost for pocketing the cue ball
    pub foul_penalty: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            mode: TableMode::default(),
            settings_override: None,
            layout: TableLayout::default(),
            respawn_delay_ms: RESPAWN_DELAY_MS,
            sink_reward: 1,
            foul_penalty: 1,
        }
    }
}

impl GameConfig {
    /// Settings the engine should run with
    pub fn physics_settings(&self) -> PhysicsSettings {
        self.settings_override
            .unwrap_or_else(|| PhysicsSettings::for_mode(self.mode))
    }

    pub fn validate(&self) -> Result<()> {
        self.physics_settings().validate()?;
        self.layout.validate()?;
        if !(self.respawn_delay_ms >= 0.0) {
            return Err(crate::Error::InvalidSettings(format!(
                "respawn_delay_ms must be >= 0, got {}",
                self.respawn_delay_ms
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
