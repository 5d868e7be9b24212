//! Sound and haptic cues derived from simulation events
//!
//! Purely reactive: the recorder listens to events and queues cues for the
//! host to play (Web Audio, vibration API). Nothing here feeds back into
//! the physics.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::sim::{EventListener, GameEvent};

/// Impact speed that plays at full volume
const FULL_VOLUME_SPEED: f32 = 12.0;
/// Quietest audible clack
const MIN_VOLUME: f32 = 0.1;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Ball hits ball
    Clack,
    /// Ball hits rail
    Cushion,
    /// Cat swats a ball
    Meow,
    /// Object ball pocketed
    PocketDrop,
    /// Cue ball pocketed
    Foul,
}

impl SoundEffect {
    pub fn for_event(event: &GameEvent) -> Self {
        match event {
            GameEvent::BallHit { .. } => SoundEffect::Clack,
            GameEvent::WallHit { .. } => SoundEffect::Cushion,
            GameEvent::ObstacleHit { .. } => SoundEffect::Meow,
            GameEvent::Sink { is_cue: true, .. } => SoundEffect::Foul,
            GameEvent::Sink { is_cue: false, .. } => SoundEffect::PocketDrop,
        }
    }

    /// Vibration length (ms)
    pub fn vibrate_ms(&self) -> u32 {
        match self {
            SoundEffect::Clack => 10,
            SoundEffect::Cushion => 5,
            SoundEffect::Meow => 30,
            SoundEffect::PocketDrop => 20,
            SoundEffect::Foul => 80,
        }
    }
}

/// Player feedback preferences
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeedbackSettings {
    pub sound: bool,
    pub haptics: bool,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
}

impl Default for FeedbackSettings {
    fn default() -> Self {
        Self {
            sound: true,
            haptics: true,
            sfx_volume: 1.0,
        }
    }
}

/// One thing for the host to play
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeedbackCue {
    pub effect: SoundEffect,
    /// 0.0 when sound is off
    pub volume: f32,
    /// 0 when haptics are off
    pub vibrate_ms: u32,
}

/// Event listener that queues feedback cues
#[derive(Debug, Default)]
pub struct FeedbackRecorder {
    settings: FeedbackSettings,
    cues: Vec<FeedbackCue>,
}

impl FeedbackRecorder {
    pub fn new(settings: FeedbackSettings) -> Self {
        Self {
            settings,
            cues: Vec::new(),
        }
    }

    pub fn set_settings(&mut self, settings: FeedbackSettings) {
        self.settings = settings;
    }

    /// Cue for an event, or `None` when both sound and haptics are off
    pub fn cue_for(&self, event: &GameEvent) -> Option<FeedbackCue> {
        if !self.settings.sound && !self.settings.haptics {
            return None;
        }
        let effect = SoundEffect::for_event(event);
        let loudness = match event {
            GameEvent::BallHit { speed, .. }
            | GameEvent::WallHit { speed, .. }
            | GameEvent::ObstacleHit { speed, .. } => {
                (speed / FULL_VOLUME_SPEED).clamp(MIN_VOLUME, 1.0)
            }
            GameEvent::Sink { .. } => 1.0,
        };
        Some(FeedbackCue {
            effect,
            volume: if self.settings.sound {
                loudness * self.settings.sfx_volume.clamp(0.0, 1.0)
            } else {
                0.0
            },
            vibrate_ms: if self.settings.haptics { effect.vibrate_ms() } else { 0 },
        })
    }

    /// Take every queued cue
    pub fn drain(&mut self) -> Vec<FeedbackCue> {
        std::mem::take(&mut self.cues)
    }
}

impl EventListener for FeedbackRecorder {
    fn on_event(&mut self, event: &GameEvent) -> Result<()> {
        if let Some(cue) = self.cue_for(event) {
            self.cues.push(cue);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::WallSide;

    #[test]
    fn test_volume_scales_with_speed() {
        let recorder = FeedbackRecorder::new(FeedbackSettings::default());
        let soft = recorder
            .cue_for(&GameEvent::BallHit { a: 0, b: 1, speed: 0.5 })
            .unwrap();
        let hard = recorder
            .cue_for(&GameEvent::BallHit { a: 0, b: 1, speed: 30.0 })
            .unwrap();
        assert_eq!(soft.volume, MIN_VOLUME);
        assert_eq!(hard.volume, 1.0);
        assert_eq!(hard.effect, SoundEffect::Clack);
    }

    #[test]
    fn test_foul_and_pocket_sounds() {
        assert_eq!(
            SoundEffect::for_event(&GameEvent::Sink { ball: 0, pocket: 2, is_cue: true }),
            SoundEffect::Foul
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::Sink { ball: 4, pocket: 2, is_cue: false }),
            SoundEffect::PocketDrop
        );
    }

    #[test]
    fn test_toggles() {
        let mut recorder = FeedbackRecorder::new(FeedbackSettings {
            sound: false,
            haptics: true,
            sfx_volume: 1.0,
        });
        let meow = GameEvent::ObstacleHit { ball: 0, obstacle: 1, speed: 6.0 };
        let cue = recorder.cue_for(&meow).unwrap();
        assert_eq!(cue.volume, 0.0);
        assert_eq!(cue.vibrate_ms, 30);

        recorder.set_settings(FeedbackSettings { sound: false, haptics: false, sfx_volume: 1.0 });
        assert!(recorder.cue_for(&meow).is_none());
    }

    #[test]
    fn test_recorder_queues_and_drains() {
        let mut recorder = FeedbackRecorder::default();
        recorder
            .on_event(&GameEvent::WallHit { ball: 0, side: WallSide::Top, speed: 6.0 })
            .unwrap();
        let cues = recorder.drain();
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].effect, SoundEffect::Cushion);
        assert!((cues[0].volume - 0.5).abs() < 1e-6);
        assert!(recorder.drain().is_empty());
    }
}
