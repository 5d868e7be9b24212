//! Per-frame table physics
//!
//! One `step` is one rendered frame. Each live ball runs friction, motion,
//! pocket, rail and cat checks in that order before the next ball is touched;
//! the ball-ball pass runs only after every ball has been moved.

use glam::Vec2;

use super::broadphase::{AllPairs, BroadPhase};
use super::collision::{apply_friction_vec, ball_in_pocket, circle_contact, resolve_elastic_collision};
use super::events::{GameEvent, WallSide};
use super::state::{Ball, Obstacle, Table};
use crate::consts::COLLISION_EPSILON;
use crate::polar_to_cartesian;
use crate::settings::PhysicsSettings;

/// The simulation step and the settings it runs with
pub struct PhysicsEngine<B: BroadPhase = AllPairs> {
    settings: PhysicsSettings,
    broad_phase: B,
    /// Reused candidate pair buffer
    pairs: Vec<(usize, usize)>,
}

impl Default for PhysicsEngine {
    fn default() -> Self {
        Self::new(PhysicsSettings::default())
    }
}

impl PhysicsEngine {
    pub fn new(settings: PhysicsSettings) -> Self {
        Self::with_broad_phase(settings, AllPairs)
    }
}

impl<B: BroadPhase> PhysicsEngine<B> {
    pub fn with_broad_phase(settings: PhysicsSettings, broad_phase: B) -> Self {
        Self {
            settings,
            broad_phase,
            pairs: Vec::new(),
        }
    }

    pub fn settings(&self) -> &PhysicsSettings {
        &self.settings
    }

    /// Swap in new settings; takes effect on the next step
    pub fn update_settings(&mut self, settings: PhysicsSettings) {
        if settings != self.settings {
            log::info!(
                "Physics settings: {} -> {} (friction {})",
                self.settings.mode.as_str(),
                settings.mode.as_str(),
                settings.friction
            );
        }
        self.settings = settings;
    }

    /// Advance the table by one frame, appending what happened to `events`
    ///
    /// A table that has not been measured yet is left untouched.
    pub fn step(&mut self, table: &mut Table, events: &mut Vec<GameEvent>) {
        if !table.is_measured() {
            return;
        }

        let settings = self.settings;
        let (width, height, cue_id) = (table.width, table.height, table.cue_id);

        for cat in &mut table.obstacles {
            cat.cool();
        }

        for ball in &mut table.balls {
            if ball.sunk {
                continue;
            }

            ball.vel = apply_friction_vec(ball.vel, settings.friction, settings.min_velocity);
            if ball.is_at_rest() {
                continue;
            }

            ball.pos += ball.vel;

            if let Some(pocket) = table
                .pockets
                .iter()
                .find(|p| ball_in_pocket(ball.pos, ball.radius, p.pos, p.radius))
            {
                ball.sink();
                let is_cue = ball.id == cue_id;
                log::debug!("Ball {} sunk in pocket {} (cue: {})", ball.id, pocket.id, is_cue);
                events.push(GameEvent::Sink {
                    ball: ball.id,
                    pocket: pocket.id,
                    is_cue,
                });
                continue;
            }

            resolve_rails(ball, width, height, events);
            resolve_obstacles(ball, &mut table.obstacles, &settings, events);
        }

        self.resolve_ball_pairs(&mut table.balls, events);

        for ball in table.balls.iter_mut().filter(|b| !b.sunk) {
            contain(ball, width, height);
        }
    }

    /// Elastic collisions between every candidate pair that actually touches
    fn resolve_ball_pairs(&mut self, balls: &mut [Ball], events: &mut Vec<GameEvent>) {
        self.broad_phase.candidate_pairs(balls, &mut self.pairs);

        for &(i, j) in &self.pairs {
            debug_assert!(i < j);
            let (head, tail) = balls.split_at_mut(j);
            let a = &mut head[i];
            let b = &mut tail[0];

            if !circle_contact(a.pos, a.radius, b.pos, b.radius).hit {
                continue;
            }

            let speed = (a.vel - b.vel).length();
            let response = resolve_elastic_collision(a.pos, a.vel, a.radius, b.pos, b.vel, b.radius);
            a.vel = response.vel_a;
            b.vel = response.vel_b;
            a.pos += response.push_a;
            b.pos += response.push_b;

            events.push(GameEvent::BallHit {
                a: a.id,
                b: b.id,
                speed,
            });
        }
    }
}

/// Bounce off rails the ball is moving into and keep it on the table
///
/// Both axes are handled independently, so a corner produces two hits.
fn resolve_rails(ball: &mut Ball, width: f32, height: f32, events: &mut Vec<GameEvent>) {
    let (id, r) = (ball.id, ball.radius);
    let speed = ball.vel.length();
    let mut hit = |side: WallSide| {
        events.push(GameEvent::WallHit {
            ball: id,
            side,
            speed,
        })
    };

    if ball.pos.x - r < 0.0 {
        if ball.vel.x < 0.0 {
            ball.vel.x = -ball.vel.x;
            hit(WallSide::Left);
        }
        ball.pos.x = r;
    } else if ball.pos.x + r > width {
        if ball.vel.x > 0.0 {
            ball.vel.x = -ball.vel.x;
            hit(WallSide::Right);
        }
        ball.pos.x = width - r;
    }

    if ball.pos.y - r < 0.0 {
        if ball.vel.y < 0.0 {
            ball.vel.y = -ball.vel.y;
            hit(WallSide::Top);
        }
        ball.pos.y = r;
    } else if ball.pos.y + r > height {
        if ball.vel.y > 0.0 {
            ball.vel.y = -ball.vel.y;
            hit(WallSide::Bottom);
        }
        ball.pos.y = height - r;
    }
}

/// Cat swats: a fixed-speed push straight away from the cat
///
/// The swat replaces the ball's velocity rather than reflecting it.
fn resolve_obstacles(
    ball: &mut Ball,
    obstacles: &mut [Obstacle],
    settings: &PhysicsSettings,
    events: &mut Vec<GameEvent>,
) {
    for cat in obstacles.iter_mut().filter(|c| c.is_ready()) {
        let contact = circle_contact(cat.pos, cat.radius, ball.pos, ball.radius);
        if !contact.hit {
            continue;
        }

        let speed = ball.vel.length();
        if settings.obstacle_ignores(speed) {
            continue;
        }

        cat.cooldown = settings.obstacle_cooldown;
        log::debug!("Cat {} swatted ball {} at speed {:.2}", cat.id, ball.id, speed);
        events.push(GameEvent::ObstacleHit {
            ball: ball.id,
            obstacle: cat.id,
            speed,
        });

        ball.vel = polar_to_cartesian(settings.paw_impulse, contact.angle);
        ball.pos += contact.normal * (contact.penetration + COLLISION_EPSILON);
    }
}

/// Clamp a ball's center inside the rails without touching its velocity
fn contain(ball: &mut Ball, width: f32, height: f32) {
    let r = ball.radius;
    ball.pos = Vec2::new(
        ball.pos.x.max(r).min(width - r),
        ball.pos.y.max(r).min(height - r),
    );
}
