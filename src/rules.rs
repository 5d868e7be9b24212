//! Scoring, fouls and deferred actions
//!
//! The engine only reports sinks. What a sink is worth, and what happens
//! after the cue ball drops, is decided here: a scored foul followed by a
//! respawn once the table settles and a short delay has passed.

use serde::{Deserialize, Serialize};

use crate::sim::GameEvent;

/// Score and shot bookkeeping for one rack
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreKeeper {
    pub score: u32,
    pub shots: u32,
    pub pocketed: u32,
    pub fouls: u32,
    sink_reward: u32,
    foul_penalty: u32,
    /// Cue ball went down during the current shot
    foul_pending: bool,
}

impl ScoreKeeper {
    pub fn new(sink_reward: u32, foul_penalty: u32) -> Self {
        Self {
            sink_reward,
            foul_penalty,
            ..Default::default()
        }
    }

    pub fn shot_taken(&mut self) {
        self.shots += 1;
    }

    /// Apply one simulation event
    pub fn observe(&mut self, event: &GameEvent) {
        if let GameEvent::Sink { ball, is_cue, .. } = *event {
            if is_cue {
                self.fouls += 1;
                self.score = self.score.saturating_sub(self.foul_penalty);
                self.foul_pending = true;
                log::info!("Foul: cue ball pocketed, score {}", self.score);
            } else {
                self.pocketed += 1;
                self.score += self.sink_reward;
                log::debug!("Ball {} pocketed, score {}", ball, self.score);
            }
        }
    }

    /// Consume the pending foul, if any
    pub fn take_foul(&mut self) -> bool {
        std::mem::take(&mut self.foul_pending)
    }

    pub fn foul_pending(&self) -> bool {
        self.foul_pending
    }

    /// Every object ball of a rack of `object_balls` has been pocketed
    pub fn rack_cleared(&self, object_balls: usize) -> bool {
        object_balls > 0 && self.pocketed as usize >= object_balls
    }

    /// Start over with the same scoring rules
    pub fn reset(&mut self) {
        *self = Self::new(self.sink_reward, self.foul_penalty);
    }
}

/// Work to do later, outside the frame loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeferredAction {
    /// Put the cue ball back on its spot
    RespawnCue,
}

/// Fire-once timers keyed by host time (ms)
#[derive(Debug, Clone, Default)]
pub struct DeferredQueue {
    entries: Vec<(f64, DeferredAction)>,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due_ms: f64, action: DeferredAction) {
        self.entries.push((due_ms, action));
    }

    /// Remove and return every action due at `now_ms`, earliest first
    pub fn take_due(&mut self, now_ms: f64) -> Vec<DeferredAction> {
        let mut due: Vec<(f64, DeferredAction)> = Vec::new();
        self.entries.retain(|&(at, action)| {
            if at <= now_ms {
                due.push((at, action));
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.0.total_cmp(&b.0));
        due.into_iter().map(|(_, action)| action).collect()
    }

    /// Earliest due time, if anything is queued
    pub fn next_due(&self) -> Option<f64> {
        self.entries.iter().map(|(at, _)| *at).min_by(f64::total_cmp)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foul_costs_points_but_never_below_zero() {
        let mut keeper = ScoreKeeper::new(1, 2);
        keeper.observe(&GameEvent::Sink { ball: 3, pocket: 0, is_cue: false });
        assert_eq!(keeper.score, 1);

        keeper.observe(&GameEvent::Sink { ball: 0, pocket: 1, is_cue: true });
        assert_eq!(keeper.score, 0);
        assert_eq!(keeper.fouls, 1);
        assert!(keeper.take_foul());
        assert!(!keeper.take_foul());
    }

    #[test]
    fn test_non_sink_events_are_ignored() {
        let mut keeper = ScoreKeeper::new(1, 1);
        keeper.observe(&GameEvent::BallHit { a: 0, b: 1, speed: 4.0 });
        assert_eq!(keeper, ScoreKeeper::new(1, 1));
    }

    #[test]
    fn test_reset_keeps_rules() {
        let mut keeper = ScoreKeeper::new(5, 1);
        keeper.shot_taken();
        keeper.observe(&GameEvent::Sink { ball: 2, pocket: 0, is_cue: false });
        keeper.reset();
        assert_eq!(keeper.score, 0);
        assert_eq!(keeper.shots, 0);
        keeper.observe(&GameEvent::Sink { ball: 2, pocket: 0, is_cue: false });
        assert_eq!(keeper.score, 5);
    }

    #[test]
    fn test_rack_cleared_after_last_ball() {
        let mut keeper = ScoreKeeper::new(1, 1);
        assert!(!keeper.rack_cleared(2));
        keeper.observe(&GameEvent::Sink { ball: 1, pocket: 0, is_cue: false });
        keeper.observe(&GameEvent::Sink { ball: 0, pocket: 3, is_cue: true });
        assert!(!keeper.rack_cleared(2));
        keeper.observe(&GameEvent::Sink { ball: 2, pocket: 5, is_cue: false });
        assert!(keeper.rack_cleared(2));
        assert!(!keeper.rack_cleared(0));
    }

    #[test]
    fn test_deferred_fires_once_when_due() {
        let mut queue = DeferredQueue::new();
        queue.schedule(1_000.0, DeferredAction::RespawnCue);
        assert_eq!(queue.next_due(), Some(1_000.0));

        assert!(queue.take_due(999.0).is_empty());
        assert_eq!(queue.take_due(1_000.0), vec![DeferredAction::RespawnCue]);
        assert!(queue.take_due(5_000.0).is_empty());
        assert!(queue.is_empty());
    }
}
