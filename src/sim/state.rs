//! Table entities and the table that owns them
//!
//! Entities are plain numeric records. The host maps `id`s to whatever
//! visual elements it draws; nothing here refers back to presentation.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A ball on the table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub pos: Vec2,
    /// Velocity in table units per frame
    pub vel: Vec2,
    pub radius: f32,
    /// Removed from play until revived
    pub sunk: bool,
}

impl Ball {
    pub fn new(id: u32, pos: Vec2, radius: f32) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            radius,
            sunk: false,
        }
    }

    /// Exactly zero on both axes
    #[inline]
    pub fn is_at_rest(&self) -> bool {
        self.vel == Vec2::ZERO
    }

    /// Sunk or at rest
    #[inline]
    pub fn is_settled(&self) -> bool {
        self.sunk || self.is_at_rest()
    }

    /// Take the ball out of play
    pub fn sink(&mut self) {
        self.sunk = true;
        self.vel = Vec2::ZERO;
    }

    /// Bring a sunk ball back at `pos`, motionless
    pub fn revive(&mut self, pos: Vec2) {
        self.sunk = false;
        self.pos = pos;
        self.vel = Vec2::ZERO;
    }
}

/// A cat sitting on the table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub pos: Vec2,
    pub radius: f32,
    /// Frames left before the cat reacts again
    pub cooldown: u32,
}

impl Obstacle {
    pub fn new(id: u32, pos: Vec2, radius: f32) -> Self {
        Self {
            id,
            pos,
            radius,
            cooldown: 0,
        }
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.cooldown == 0
    }

    /// Count the cooldown down by one frame
    pub fn cool(&mut self) {
        self.cooldown = self.cooldown.saturating_sub(1);
    }
}

/// A pocket's capture circle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pocket {
    pub id: u32,
    pub pos: Vec2,
    pub radius: f32,
}

/// Per-ball render data, laid out for direct upload as `[f32; 4]`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct BallInstance {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    /// 1.0 when sunk
    pub sunk: f32,
}

impl From<&Ball> for BallInstance {
    fn from(ball: &Ball) -> Self {
        Self {
            x: ball.pos.x,
            y: ball.pos.y,
            radius: ball.radius,
            sunk: if ball.sunk { 1.0 } else { 0.0 },
        }
    }
}

/// Everything on the table, in table-local coordinates (origin top-left)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Table {
    pub width: f32,
    pub height: f32,
    /// Balls in stable id order; the cue ball is identified by `cue_id`
    pub balls: Vec<Ball>,
    pub obstacles: Vec<Obstacle>,
    pub pockets: Vec<Pocket>,
    pub cue_id: u32,
}

impl Table {
    /// Empty table of the given size
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Whether the layout has produced a usable size yet
    pub fn is_measured(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    #[inline]
    pub fn is_cue(&self, ball: &Ball) -> bool {
        ball.id == self.cue_id
    }

    pub fn cue_ball(&self) -> Option<&Ball> {
        self.balls.iter().find(|b| b.id == self.cue_id)
    }

    pub fn cue_ball_mut(&mut self) -> Option<&mut Ball> {
        let cue_id = self.cue_id;
        self.balls.iter_mut().find(|b| b.id == cue_id)
    }

    /// Every ball is sunk or has exactly zero velocity
    pub fn all_settled(&self) -> bool {
        self.balls.iter().all(Ball::is_settled)
    }

    /// Object balls still in play
    pub fn object_balls_remaining(&self) -> usize {
        self.balls
            .iter()
            .filter(|b| !self.is_cue(b) && !b.sunk)
            .count()
    }

    /// Render data for every ball, in ball order
    pub fn snapshot(&self) -> Vec<BallInstance> {
        self.balls.iter().map(BallInstance::from).collect()
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.balls.sort_by_key(|b| b.id);
        self.obstacles.sort_by_key(|o| o.id);
        self.pockets.sort_by_key(|p| p.id);
    }
}
