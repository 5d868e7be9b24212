//! Candidate pair generation for the ball-ball pass
//!
//! The engine asks a `BroadPhase` which pairs might touch and runs the exact
//! circle test on each. `AllPairs` is plenty for a rack of balls; a grid or
//! sweep could be dropped in for larger tables without touching the engine.

use super::state::Ball;

/// Produces unordered index pairs `(i, j)` with `i < j`
pub trait BroadPhase {
    /// Fill `pairs` with candidate pairs among non-sunk balls, in a stable order
    fn candidate_pairs(&mut self, balls: &[Ball], pairs: &mut Vec<(usize, usize)>);
}

/// Every unordered pair of live balls, in index order
#[derive(Debug, Clone, Copy, Default)]
pub struct AllPairs;

impl BroadPhase for AllPairs {
    fn candidate_pairs(&mut self, balls: &[Ball], pairs: &mut Vec<(usize, usize)>) {
        pairs.clear();
        for i in 0..balls.len() {
            if balls[i].sunk {
                continue;
            }
            for j in (i + 1)..balls.len() {
                if !balls[j].sunk {
                    pairs.push((i, j));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_all_pairs_skips_sunk() {
        let mut balls: Vec<Ball> = (0..4)
            .map(|i| Ball::new(i, Vec2::new(i as f32 * 30.0, 0.0), 12.0))
            .collect();
        balls[2].sink();

        let mut pairs = Vec::new();
        AllPairs.candidate_pairs(&balls, &mut pairs);
        assert_eq!(pairs, vec![(0, 1), (0, 3), (1, 3)]);
    }

    #[test]
    fn test_all_pairs_count() {
        let balls: Vec<Ball> = (0..11).map(|i| Ball::new(i, Vec2::ZERO, 12.0)).collect();
        let mut pairs = vec![(99, 99)];
        AllPairs.candidate_pairs(&balls, &mut pairs);
        assert_eq!(pairs.len(), 11 * 10 / 2);
    }
}
