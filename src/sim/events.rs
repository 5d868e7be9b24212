//! Discrete events emitted by the simulation
//!
//! The engine only appends to an event buffer; listeners (audio, haptics,
//! scoring) subscribe through `EventBus` and never touch physics state.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Which rail a ball bounced off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WallSide {
    Left,
    Right,
    Top,
    Bottom,
}

/// Something that happened during a step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    /// Two balls collided
    BallHit { a: u32, b: u32, speed: f32 },
    /// A ball bounced off a rail
    WallHit { ball: u32, side: WallSide, speed: f32 },
    /// A cat swatted a ball
    ObstacleHit { ball: u32, obstacle: u32, speed: f32 },
    /// A ball dropped into a pocket
    Sink { ball: u32, pocket: u32, is_cue: bool },
}

impl GameEvent {
    pub fn is_foul(&self) -> bool {
        matches!(self, GameEvent::Sink { is_cue: true, .. })
    }
}

/// Subscriber to simulation events
///
/// Failures must be reported as `Err`; the bus isolates those. A listener
/// that panics is not caught and unwinds through the frame.
pub trait EventListener {
    fn on_event(&mut self, event: &GameEvent) -> Result<()>;
}

impl<F> EventListener for F
where
    F: FnMut(&GameEvent) -> Result<()>,
{
    fn on_event(&mut self, event: &GameEvent) -> Result<()> {
        self(event)
    }
}

/// Fan-out of events to registered listeners
///
/// A failing listener is logged and skipped; the remaining listeners still
/// see the event.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Box<dyn EventListener>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl EventListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver one event to every listener, in subscription order
    pub fn emit(&mut self, event: &GameEvent) {
        for (index, listener) in self.listeners.iter_mut().enumerate() {
            if let Err(e) = listener.on_event(event) {
                log::warn!("Event listener {} failed on {:?}: {}", index, event, e);
            }
        }
    }

    /// Deliver a frame's worth of events in order
    pub fn emit_all(&mut self, events: &[GameEvent]) {
        for event in events {
            self.emit(event);
        }
    }
}
