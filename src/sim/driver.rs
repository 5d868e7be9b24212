//! Frame loop driver
//!
//! Idle -> Running -> Idle. While running, every scheduled frame runs one
//! simulation step and then either schedules the next frame or, once every
//! ball is sunk or exactly at rest, goes idle and notifies stop listeners.
//!
//! Frames are identified by `FrameToken`s. Stopping bumps the generation,
//! so a callback that was already queued by the host before a reset can
//! never step the freshly laid out table.

use std::collections::VecDeque;

use crate::error::Result;

/// Loop state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// No animation in flight
    Idle,
    /// Stepping every frame
    Running,
}

/// Handle for one scheduled frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameToken {
    generation: u64,
    frame: u64,
}

impl FrameToken {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Frame index within its run
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

/// Host animation-frame primitive (requestAnimationFrame and friends)
pub trait FrameScheduler {
    /// Arrange for the host to call back with `token` on its next frame
    fn request_frame(&mut self, token: FrameToken);
    /// Drop a frame that was requested but has not run yet
    fn cancel_frame(&mut self, token: FrameToken);
}

/// Scheduler that queues tokens for the host to pull explicitly
///
/// Used by the native demo, the web bridge (which calls back from its own
/// requestAnimationFrame loop) and tests.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    queue: VecDeque<FrameToken>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next frame the host should run, if any
    pub fn next_frame(&mut self) -> Option<FrameToken> {
        self.queue.pop_front()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self, token: FrameToken) {
        self.queue.push_back(token);
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        self.queue.retain(|t| *t != token);
    }
}

/// What happened when a frame callback arrived
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Token from a cancelled or finished run; nothing was stepped
    Stale,
    /// Stepped; another frame is scheduled
    Continue,
    /// Stepped; everything is at rest and the loop is idle
    Stopped,
}

pub type StopListener = Box<dyn FnMut() -> Result<()>>;

/// The Idle/Running state machine around a `FrameScheduler`
pub struct GameLoop<S: FrameScheduler> {
    scheduler: S,
    state: LoopState,
    generation: u64,
    /// Frames stepped in the current (or last) run
    frames: u64,
    pending: Option<FrameToken>,
    stop_listeners: Vec<StopListener>,
}

impl<S: FrameScheduler> GameLoop<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            state: LoopState::Idle,
            generation: 0,
            frames: 0,
            pending: None,
            stop_listeners: Vec::new(),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Register a listener for "all motion ceased"
    ///
    /// An `Err` is logged and the other listeners still run. Panics are not
    /// caught.
    pub fn on_stopped(&mut self, listener: impl FnMut() -> Result<()> + 'static) {
        self.stop_listeners.push(Box::new(listener));
    }

    /// Begin running; returns false if already running
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            return false;
        }
        self.state = LoopState::Running;
        self.generation += 1;
        self.frames = 0;
        self.schedule();
        true
    }

    /// Cancel any pending frame and go idle without waiting for rest
    ///
    /// Stop listeners are not notified. Calling this while idle does nothing.
    pub fn stop(&mut self) {
        if let Some(token) = self.pending.take() {
            self.scheduler.cancel_frame(token);
        }
        if self.is_running() {
            log::info!("Frame loop cancelled after {} frames", self.frames);
            self.state = LoopState::Idle;
            self.generation += 1;
        }
    }

    fn schedule(&mut self) {
        let token = FrameToken {
            generation: self.generation,
            frame: self.frames,
        };
        self.pending = Some(token);
        self.scheduler.request_frame(token);
    }

    /// Handle a frame callback
    ///
    /// `step` runs the simulation for this frame and reports whether every
    /// ball is now settled. Stale tokens are ignored without calling it.
    pub fn run_frame(&mut self, token: FrameToken, step: impl FnOnce() -> bool) -> FrameOutcome {
        if !self.is_running() || self.pending != Some(token) {
            log::warn!("Ignoring stale frame {:?}", token);
            return FrameOutcome::Stale;
        }
        self.pending = None;

        let settled = step();
        self.frames += 1;

        if settled {
            self.state = LoopState::Idle;
            log::info!("All balls at rest after {} frames", self.frames);
            self.notify_stopped();
            FrameOutcome::Stopped
        } else {
            self.schedule();
            FrameOutcome::Continue
        }
    }

    fn notify_stopped(&mut self) {
        for (index, listener) in self.stop_listeners.iter_mut().enumerate() {
            if let Err(e) = listener() {
                log::warn!("Stop listener {} failed: {}", index, e);
            }
        }
    }
}
