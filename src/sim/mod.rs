//! Deterministic table simulation
//!
//! All physics lives here. This module must be pure and deterministic:
//! - One step per frame, no wall-clock time
//! - Seeded RNG only (layout scatter)
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or platform dependencies

pub mod broadphase;
pub mod collision;
pub mod driver;
pub mod engine;
pub mod events;
pub mod layout;
pub mod state;

pub use broadphase::{AllPairs, BroadPhase};
pub use collision::{
    Contact, ElasticResponse, apply_friction, apply_friction_vec, ball_in_pocket, circle_contact,
    resolve_elastic_collision,
};
pub use driver::{FrameOutcome, FrameScheduler, FrameToken, GameLoop, LoopState, ManualScheduler};
pub use engine::PhysicsEngine;
pub use events::{EventBus, EventListener, GameEvent, WallSide};
pub use layout::{ObstacleScatter, ObstacleSpec, TableLayout, cue_spot, pocket_layout, rack_positions};
pub use state::{Ball, BallInstance, Obstacle, Pocket, Table};
