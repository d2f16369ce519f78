//! Procedural maze generation for the simulated game loop
//!
//! Mazes are produced by a depth-first traversal of the interior starting at
//! `(1, 1)`. Every traversed cell is assigned open road or a soft obstacle;
//! the outer ring stays wall except for the entrance and the exit.

use std::f64::consts::FRAC_PI_2;

use rand::{Rng, SeedableRng, rngs::StdRng};

use super::grid::Maze;
use crate::{
    error::{Error, Result},
    types::{Material, Position},
};

/// Smallest dimension that leaves a traversable interior.
pub const MIN_DIMENSION: usize = 5;

/// Start cell used by generated mazes.
pub const fn default_start() -> Position {
    Position::new(1, 1)
}

/// Exit cell used by generated mazes: on the right edge, one row below the top.
pub fn default_goal(dimension: usize) -> Position {
    let d = dimension as i32;
    Position::new(d - 1, d - 2)
}

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Seeded generator of square mazes.
#[derive(Debug, Clone)]
pub struct MazeGenerator {
    rng: StdRng,
}

impl MazeGenerator {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            rng: build_rng(seed),
        }
    }

    /// Generate a `dimension x dimension` maze.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `dimension` is below
    /// [`MIN_DIMENSION`].
    pub fn generate(&mut self, dimension: usize) -> Result<Maze> {
        if dimension < MIN_DIMENSION {
            return Err(Error::InvalidConfiguration {
                message: format!("maze dimension must be at least {MIN_DIMENSION}, got {dimension}"),
            });
        }

        let mut maze = Maze::filled(dimension, Material::Wall);
        let mut seen = vec![false; dimension * dimension];
        let start = default_start();
        let inner_max = dimension as i32 - 2;

        let mut stack = vec![start];
        seen[start.x as usize * dimension + start.y as usize] = true;
        maze.set(start, self.draw_material());

        while let Some(&cell) = stack.last() {
            let candidates: Vec<Position> = [(-1, 0), (1, 0), (0, -1), (0, 1)]
                .into_iter()
                .map(|(dx, dy)| Position::new(cell.x + dx, cell.y + dy))
                .filter(|p| (1..=inner_max).contains(&p.x) && (1..=inner_max).contains(&p.y))
                .filter(|p| !seen[p.x as usize * dimension + p.y as usize])
                .collect();

            if candidates.is_empty() {
                stack.pop();
                continue;
            }

            let next = candidates[self.rng.random_range(0..candidates.len())];
            seen[next.x as usize * dimension + next.y as usize] = true;
            maze.set(next, self.draw_material());
            stack.push(next);
        }

        maze.set(start, Material::Open);
        maze.set(default_goal(dimension), Material::Open);
        Ok(maze)
    }

    /// Folded `sin^2` draw: open road and soft obstacles with a bias towards
    /// open road.
    fn draw_material(&mut self) -> Material {
        let u: f64 = self.rng.random();
        let beta = (u * FRAC_PI_2).sin().powi(2);
        let folded = if beta < 0.5 {
            2.0 * beta
        } else {
            2.0 * (1.0 - beta)
        };
        if folded * 2.0 < 1.0 {
            Material::Open
        } else {
            Material::SoftObstacle
        }
    }
}

impl Default for MazeGenerator {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::MazeGrid;

    #[test]
    fn test_generated_layout() {
        let mut generator = MazeGenerator::new(Some(7));
        let maze = generator.generate(11).unwrap();

        assert_eq!(maze.dimension(), 11);
        assert_eq!(maze.material_at(default_start()), Material::Open);
        assert_eq!(maze.material_at(default_goal(11)), Material::Open);

        // Ring is wall apart from the exit
        for i in 0..11 {
            assert_eq!(maze.material(i, 0), Material::Wall);
            assert_eq!(maze.material(0, i), Material::Wall);
            assert_eq!(maze.material(i, 10), Material::Wall);
        }
        assert_eq!(maze.count(Material::Wall), 4 * 10 - 1);
    }

    #[test]
    fn test_interior_is_passable() {
        let mut generator = MazeGenerator::new(Some(3));
        let maze = generator.generate(9).unwrap();
        for x in 1..8 {
            for y in 1..8 {
                assert_ne!(maze.material(x, y), Material::Wall, "({x}, {y})");
            }
        }
    }

    #[test]
    fn test_same_seed_same_maze() {
        let a = MazeGenerator::new(Some(99)).generate(13).unwrap();
        let b = MazeGenerator::new(Some(99)).generate(13).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rejects_tiny_dimension() {
        let mut generator = MazeGenerator::new(Some(1));
        assert!(matches!(
            generator.generate(4),
            Err(Error::InvalidConfiguration { .. })
        ));
    }
}
