//! Collision math for circles on a flat table
//!
//! Pure functions only: friction decay, circle contact tests and the
//! equal-mass elastic collision solved in the contact normal's frame.

use glam::Vec2;

use crate::consts::COLLISION_EPSILON;

/// Result of a circle-circle contact check
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    /// Whether the circles overlap
    pub hit: bool,
    /// Unit normal from the first circle toward the second
    pub normal: Vec2,
    /// Angle of `normal` (radians)
    pub angle: f32,
    /// Center distance (1.0 substituted when the centers coincide)
    pub distance: f32,
    /// Overlap depth (positive when hit)
    pub penetration: f32,
}

impl Contact {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::X,
            angle: 0.0,
            distance: 0.0,
            penetration: 0.0,
        }
    }
}

/// Outcome of an elastic ball-ball collision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElasticResponse {
    pub vel_a: Vec2,
    pub vel_b: Vec2,
    /// Position correction for the first ball
    pub push_a: Vec2,
    /// Position correction for the second ball
    pub push_b: Vec2,
}

/// Decay one velocity component by `friction`, snapping tiny values to zero
#[inline]
pub fn apply_friction(v: f32, friction: f32, min_velocity: f32) -> f32 {
    let v = v * friction;
    if v.abs() < min_velocity { 0.0 } else { v }
}

/// Per-axis friction on a velocity vector
#[inline]
pub fn apply_friction_vec(vel: Vec2, friction: f32, min_velocity: f32) -> Vec2 {
    Vec2::new(
        apply_friction(vel.x, friction, min_velocity),
        apply_friction(vel.y, friction, min_velocity),
    )
}

/// Check overlap between circle `a` and circle `b`
///
/// Coincident centers are treated as distance 1 along +X so the caller
/// always gets a usable normal.
pub fn circle_contact(pos_a: Vec2, radius_a: f32, pos_b: Vec2, radius_b: f32) -> Contact {
    let delta = pos_b - pos_a;
    let raw_distance = delta.length();
    let reach = radius_a + radius_b;

    if raw_distance >= reach {
        return Contact::miss();
    }

    let (distance, angle) = if raw_distance > 0.0 {
        (raw_distance, delta.y.atan2(delta.x))
    } else {
        (1.0, 0.0)
    };

    Contact {
        hit: true,
        normal: Vec2::new(angle.cos(), angle.sin()),
        angle,
        distance,
        penetration: reach - distance,
    }
}

/// Rotate `v` by `-angle` (world frame into the contact frame)
#[inline]
fn to_contact_frame(v: Vec2, cos: f32, sin: f32) -> Vec2 {
    Vec2::new(v.x * cos + v.y * sin, v.y * cos - v.x * sin)
}

/// Rotate `v` by `+angle` (contact frame back into the world frame)
#[inline]
fn to_world_frame(v: Vec2, cos: f32, sin: f32) -> Vec2 {
    Vec2::new(v.x * cos - v.y * sin, v.y * cos + v.x * sin)
}

/// Resolve an equal-mass elastic collision between two overlapping circles
///
/// Both velocities are rotated into the frame of the contact normal, their
/// normal components swapped, then rotated back. The overlap (plus
/// `COLLISION_EPSILON`) is split evenly between the two balls along the normal.
pub fn resolve_elastic_collision(
    pos_a: Vec2,
    vel_a: Vec2,
    radius_a: f32,
    pos_b: Vec2,
    vel_b: Vec2,
    radius_b: f32,
) -> ElasticResponse {
    let delta = pos_b - pos_a;
    let raw_distance = delta.length();
    let (distance, angle) = if raw_distance > 0.0 {
        (raw_distance, delta.y.atan2(delta.x))
    } else {
        (1.0, 0.0)
    };
    let (sin, cos) = angle.sin_cos();

    let a = to_contact_frame(vel_a, cos, sin);
    let b = to_contact_frame(vel_b, cos, sin);

    // Equal masses: exchange the normal components, keep the tangential ones
    let a_after = Vec2::new(b.x, a.y);
    let b_after = Vec2::new(a.x, b.y);

    let overlap = radius_a + radius_b - distance + COLLISION_EPSILON;
    let half = Vec2::new(cos, sin) * (overlap / 2.0);

    ElasticResponse {
        vel_a: to_world_frame(a_after, cos, sin),
        vel_b: to_world_frame(b_after, cos, sin),
        push_a: -half,
        push_b: half,
    }
}

/// Whether a ball lies entirely inside a pocket's capture circle
#[inline]
pub fn ball_in_pocket(ball_pos: Vec2, ball_radius: f32, pocket_pos: Vec2, pocket_radius: f32) -> bool {
    ball_pos.distance(pocket_pos) + ball_radius < pocket_radius
}
