//! Table layout: where balls, cats and pockets start
//!
//! Every position is a pure function of the table size and ball radius
//! (plus a seed for scattered cats), so a reset always reproduces the same
//! table.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::state::{Ball, Obstacle, Pocket, Table};
use crate::consts::*;
use crate::error::{Error, Result};

/// A cat placed at a fixed fraction of the table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleSpec {
    /// Fraction of table width
    pub x: f32,
    /// Fraction of table height
    pub y: f32,
    /// Radius as a multiple of ball radius
    pub radius_scale: f32,
}

/// Extra cats at seeded random spots
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleScatter {
    pub seed: u64,
    pub count: usize,
    pub radius_scale: f32,
}

/// Attempts per scattered cat before giving up on it
const SCATTER_ATTEMPTS: usize = 32;

/// Measured table geometry plus what goes on it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableLayout {
    pub width: f32,
    pub height: f32,
    pub ball_radius: f32,
    /// Object balls in the rack (cue ball not included)
    pub object_balls: usize,
    /// Pocket radius as a multiple of ball radius
    pub pocket_scale: f32,
    pub obstacles: Vec<ObstacleSpec>,
    pub scatter: Option<ObstacleScatter>,
}

impl Default for TableLayout {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 400.0,
            ball_radius: BALL_RADIUS,
            object_balls: OBJECT_BALL_COUNT,
            pocket_scale: POCKET_SCALE,
            obstacles: vec![
                ObstacleSpec { x: 0.4, y: 0.2, radius_scale: 1.5 },
                ObstacleSpec { x: 0.75, y: 0.8, radius_scale: 1.5 },
            ],
            scatter: None,
        }
    }
}

/// Where the cue ball starts and respawns
pub fn cue_spot(width: f32, height: f32) -> Vec2 {
    Vec2::new(width * CUE_SPOT_X, height * CUE_SPOT_Y)
}

/// Center-to-center spacing of rack neighbours
#[inline]
pub fn rack_spacing(ball_radius: f32) -> f32 {
    ball_radius * 2.0 + RACK_GAP
}

/// Position of the first (apex) rack ball
pub fn rack_apex(width: f32, height: f32, ball_radius: f32) -> Vec2 {
    Vec2::new(
        (width * RACK_APEX_X).min(width - ball_radius * RACK_RAIL_CLEARANCE),
        height * RACK_APEX_Y,
    )
}

/// Triangle rack, apex toward the cue ball, rows spreading right
///
/// Rows hold 1, 2, 3, ... balls; the last row may be partial. Each row is
/// centered on the apex line, so row `r` starts half a spacing per row above it.
///
/// ```text
///  0          <- apex (row 0)
///  1  2       <- row 1
///  3  4  5    <- row 2
///  6  7  8  9 <- row 3
/// ```
pub fn rack_positions(count: usize, ball_radius: f32, width: f32, height: f32) -> Vec<Vec2> {
    let apex = rack_apex(width, height, ball_radius);
    let spacing = rack_spacing(ball_radius);
    let row_offset = spacing * 0.866; // sqrt(3)/2 for equilateral triangle

    let mut positions = Vec::with_capacity(count);
    let mut row = 0usize;
    while positions.len() < count {
        let x = apex.x + row as f32 * row_offset;
        let top = apex.y - row as f32 * spacing / 2.0;
        for i in 0..=row {
            if positions.len() == count {
                break;
            }
            positions.push(Vec2::new(x, top + i as f32 * spacing));
        }
        row += 1;
    }
    positions
}

/// Four corner pockets and one in the middle of each long rail
pub fn pocket_layout(width: f32, height: f32, ball_radius: f32, pocket_scale: f32) -> Vec<Pocket> {
    let radius = ball_radius * pocket_scale;
    let inset = radius * POCKET_INSET;
    let spots = [
        Vec2::new(inset, inset),
        Vec2::new(width / 2.0, inset),
        Vec2::new(width - inset, inset),
        Vec2::new(inset, height - inset),
        Vec2::new(width / 2.0, height - inset),
        Vec2::new(width - inset, height - inset),
    ];
    spots
        .iter()
        .enumerate()
        .map(|(i, &pos)| Pocket {
            id: i as u32,
            pos,
            radius,
        })
        .collect()
}

impl TableLayout {
    /// Layout for a measured table size, keeping everything else
    pub fn with_size(&self, width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..self.clone()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.ball_radius > 0.0) {
            return Err(Error::InvalidLayout(format!(
                "ball_radius must be > 0, got {}",
                self.ball_radius
            )));
        }
        if !(self.pocket_scale > 1.0) {
            return Err(Error::InvalidLayout(format!(
                "pocket_scale must be > 1 so a ball can fit, got {}",
                self.pocket_scale
            )));
        }
        for spec in &self.obstacles {
            if !(0.0..=1.0).contains(&spec.x) || !(0.0..=1.0).contains(&spec.y) {
                return Err(Error::InvalidLayout(format!(
                    "obstacle position ({}, {}) is outside the table",
                    spec.x, spec.y
                )));
            }
            if !(spec.radius_scale > 0.0) {
                return Err(Error::InvalidLayout("obstacle radius must be > 0".to_string()));
            }
        }
        if let Some(scatter) = &self.scatter {
            if !(scatter.radius_scale > 0.0) {
                return Err(Error::InvalidLayout("scattered obstacle radius must be > 0".to_string()));
            }
        }
        Ok(())
    }

    pub fn cue_spot(&self) -> Vec2 {
        cue_spot(self.width, self.height)
    }

    pub fn pockets(&self) -> Vec<Pocket> {
        pocket_layout(self.width, self.height, self.ball_radius, self.pocket_scale)
    }

    /// Cue ball (id 0) followed by the racked object balls (ids 1..)
    pub fn balls(&self) -> Vec<Ball> {
        let r = self.ball_radius;
        let mut balls = Vec::with_capacity(self.object_balls + 1);
        balls.push(Ball::new(0, self.cue_spot(), r));
        for (i, pos) in rack_positions(self.object_balls, r, self.width, self.height)
            .into_iter()
            .enumerate()
        {
            balls.push(Ball::new(i as u32 + 1, pos, r));
        }
        balls
    }

    /// Fixed cats followed by scattered ones
    pub fn obstacles(&self) -> Vec<Obstacle> {
        let size = Vec2::new(self.width, self.height);
        let mut cats: Vec<Obstacle> = self
            .obstacles
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                Obstacle::new(
                    i as u32,
                    Vec2::new(spec.x, spec.y) * size,
                    spec.radius_scale * self.ball_radius,
                )
            })
            .collect();

        if let Some(scatter) = self.scatter {
            self.scatter_obstacles(&scatter, &mut cats);
        }
        cats
    }

    /// Place seeded cats away from pockets, the cue spot, the rack and each other
    fn scatter_obstacles(&self, scatter: &ObstacleScatter, cats: &mut Vec<Obstacle>) {
        let mut rng = Pcg32::seed_from_u64(scatter.seed);
        let r = self.ball_radius;
        let cat_radius = scatter.radius_scale * r;
        let pockets = self.pockets();
        let cue = self.cue_spot();
        let rack = rack_positions(self.object_balls, r, self.width, self.height);

        for _ in 0..scatter.count {
            let mut placed = false;
            for _ in 0..SCATTER_ATTEMPTS {
                let pos = Vec2::new(
                    rng.random_range(0.1f32..0.9) * self.width,
                    rng.random_range(0.15f32..0.85) * self.height,
                );
                let clear_of_pockets = pockets
                    .iter()
                    .all(|p| p.pos.distance(pos) > p.radius + cat_radius + r);
                let clear_of_cue = cue.distance(pos) > cat_radius + r * 3.0;
                let clear_of_rack = rack.iter().all(|b| b.distance(pos) > cat_radius + r * 3.0);
                let clear_of_cats = cats
                    .iter()
                    .all(|c| c.pos.distance(pos) > c.radius + cat_radius + r * 2.0);

                if clear_of_pockets && clear_of_cue && clear_of_rack && clear_of_cats {
                    let id = cats.len() as u32;
                    cats.push(Obstacle::new(id, pos, cat_radius));
                    placed = true;
                    break;
                }
            }
            if !placed {
                log::debug!("No room for scattered cat {} on {}x{}", cats.len(), self.width, self.height);
            }
        }
    }

    /// Build a fresh table: velocities zero, nothing sunk, cats ready
    pub fn build(&self) -> Table {
        let mut table = Table::new(self.width, self.height);
        table.balls = self.balls();
        table.obstacles = self.obstacles();
        table.pockets = self.pockets();
        table.cue_id = 0;
        table.normalize_order();
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rack_apex_matches_reference_table() {
        let positions = rack_positions(10, 12.0, 600.0, 400.0);
        assert_eq!(positions[0], Vec2::new(360.0, 200.0));
    }

    #[test]
    fn test_rack_apex_respects_rail_clearance() {
        // 0.6 * 300 = 180 > 300 - 8 * 20 = 140
        let apex = rack_apex(300.0, 200.0, 20.0);
        assert_eq!(apex, Vec2::new(140.0, 100.0));
    }

    #[test]
    fn test_rack_rows_are_centered() {
        let r = 12.0;
        let spacing = rack_spacing(r);
        let p = rack_positions(10, r, 600.0, 400.0);
        assert_eq!(p.len(), 10);

        // Row 1: two balls straddling the apex line
        assert!((p[1].y - (200.0 - spacing / 2.0)).abs() < 1e-4);
        assert!((p[2].y - (200.0 + spacing / 2.0)).abs() < 1e-4);
        assert_eq!(p[1].x, p[2].x);

        // Row 3: four balls, outermost 1.5 spacings from center
        assert!((p[6].y - (200.0 - 1.5 * spacing)).abs() < 1e-4);
        assert!((p[9].y - (200.0 + 1.5 * spacing)).abs() < 1e-4);
        assert!((p[6].x - (360.0 + 3.0 * spacing * 0.866)).abs() < 1e-3);
    }

    #[test]
    fn test_rack_balls_do_not_overlap() {
        let r = 12.0;
        let p = rack_positions(10, r, 600.0, 400.0);
        for i in 0..p.len() {
            for j in (i + 1)..p.len() {
                assert!(p[i].distance(p[j]) > 2.0 * r, "balls {} and {} overlap", i, j);
            }
        }
    }

    #[test]
    fn test_partial_last_row() {
        let p = rack_positions(5, 12.0, 600.0, 400.0);
        assert_eq!(p.len(), 5);
        // Rows 1, 2, then two of three
        assert_eq!(p[3].x, p[4].x);
        assert!(p[3].x > p[1].x);
        assert!(rack_positions(0, 12.0, 600.0, 400.0).is_empty());
    }

    #[test]
    fn test_build_is_deterministic() {
        let layout = TableLayout {
            scatter: Some(ObstacleScatter { seed: 7, count: 3, radius_scale: 1.2 }),
            ..Default::default()
        };
        let a = layout.build();
        let b = layout.build();
        assert_eq!(a.balls, b.balls);
        assert_eq!(a.obstacles, b.obstacles);
        assert_eq!(a.pockets, b.pockets);
    }

    #[test]
    fn test_build_resets_entities() {
        let table = TableLayout::default().build();
        assert_eq!(table.balls.len(), 11);
        assert_eq!(table.cue_ball().map(|b| b.pos), Some(Vec2::new(150.0, 200.0)));
        assert!(table.balls.iter().all(|b| !b.sunk && b.vel == Vec2::ZERO));
        assert!(table.obstacles.iter().all(|o| o.cooldown == 0));
        assert_eq!(table.pockets.len(), 6);
    }

    #[test]
    fn test_scattered_cats_keep_clear() {
        let layout = TableLayout {
            obstacles: Vec::new(),
            scatter: Some(ObstacleScatter { seed: 42, count: 4, radius_scale: 1.5 }),
            ..Default::default()
        };
        let cats = layout.obstacles();
        assert!(cats.len() <= 4);
        for cat in &cats {
            for pocket in layout.pockets() {
                assert!(cat.pos.distance(pocket.pos) > pocket.radius + cat.radius);
            }
            assert!(cat.pos.distance(layout.cue_spot()) > cat.radius + layout.ball_radius);
        }
    }

    #[test]
    fn test_a_ball_fits_in_every_pocket() {
        let layout = TableLayout::default();
        let r = layout.ball_radius;
        for pocket in layout.pockets() {
            // Closest in-bounds spot to the pocket center still counts as sunk
            let reachable = Vec2::new(
                pocket.pos.x.clamp(r, layout.width - r),
                pocket.pos.y.clamp(r, layout.height - r),
            );
            assert!(crate::sim::collision::ball_in_pocket(reachable, r, pocket.pos, pocket.radius));
        }
    }

    #[test]
    fn test_validate() {
        assert!(TableLayout::default().validate().is_ok());
        let bad = TableLayout { pocket_scale: 0.9, ..Default::default() };
        assert!(matches!(bad.validate(), Err(Error::InvalidLayout(_))));
        let bad = TableLayout {
            obstacles: vec![ObstacleSpec { x: 1.5, y: 0.5, radius_scale: 1.0 }],
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
