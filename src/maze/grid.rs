//! Maze grid port and dense snapshot

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    types::{Material, Position},
};

/// Read access to a square maze.
///
/// Implementors only provide the dimension and per-cell materials; the
/// border rule shared by the feature extractor and the reward function is
/// derived from the dimension.
pub trait MazeGrid {
    /// Side length `D` of the `D x D` grid.
    fn dimension(&self) -> usize;

    /// Material at `(x, y)`. Coordinates outside the grid read as
    /// [`Material::Wall`].
    fn material(&self, x: i32, y: i32) -> Material;

    /// Material at `position`.
    fn material_at(&self, position: Position) -> Material {
        self.material(position.x, position.y)
    }

    /// Whether `position` lies inside the grid at all.
    fn contains(&self, position: Position) -> bool {
        let d = self.dimension() as i64;
        (0..d).contains(&(position.x as i64)) && (0..d).contains(&(position.y as i64))
    }

    /// Whether `position` is on (or beyond) the outer one-cell ring.
    fn is_border(&self, position: Position) -> bool {
        let last = self.dimension() as i64 - 1;
        let (x, y) = (position.x as i64, position.y as i64);
        x < 1 || x >= last || y < 1 || y >= last
    }
}

/// Dense square maze, indexed as `cells[x * dimension + y]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Maze {
    dimension: usize,
    cells: Vec<Material>,
}

impl Maze {
    /// Create a maze where every cell has the same material.
    pub fn filled(dimension: usize, material: Material) -> Self {
        Self {
            dimension,
            cells: vec![material; dimension * dimension],
        }
    }

    /// A maze whose outer ring is wall and whose interior is open.
    pub fn walled(dimension: usize) -> Self {
        let mut maze = Self::filled(dimension, Material::Wall);
        for x in 1..dimension.saturating_sub(1) {
            for y in 1..dimension.saturating_sub(1) {
                maze.cells[x * dimension + y] = Material::Open;
            }
        }
        maze
    }

    /// Build a maze from material codes laid out as `codes[x][y]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMaze`] if the grid is empty or not square, and
    /// [`Error::InvalidMaterial`] for unknown codes.
    pub fn from_codes(codes: &[Vec<u8>]) -> Result<Self> {
        let dimension = codes.len();
        if dimension == 0 {
            return Err(Error::InvalidMaze {
                message: "maze has no cells".to_string(),
            });
        }

        let mut cells = Vec::with_capacity(dimension * dimension);
        for (x, column) in codes.iter().enumerate() {
            if column.len() != dimension {
                return Err(Error::InvalidMaze {
                    message: format!(
                        "column {x} has {} cells, expected {dimension}",
                        column.len()
                    ),
                });
            }
            for (y, &code) in column.iter().enumerate() {
                cells.push(Material::from_code(code, x, y)?);
            }
        }

        Ok(Self { dimension, cells })
    }

    /// Copy any [`MazeGrid`] into a dense snapshot.
    pub fn snapshot<M: MazeGrid + ?Sized>(grid: &M) -> Self {
        let dimension = grid.dimension();
        let mut cells = Vec::with_capacity(dimension * dimension);
        for x in 0..dimension {
            for y in 0..dimension {
                cells.push(grid.material(x as i32, y as i32));
            }
        }
        Self { dimension, cells }
    }

    /// Overwrite the material of a cell. Positions outside the grid are ignored.
    pub fn set(&mut self, position: Position, material: Material) {
        if let Some(index) = self.index(position) {
            self.cells[index] = material;
        }
    }

    /// Material codes laid out as `codes[x][y]`.
    pub fn to_codes(&self) -> Vec<Vec<u8>> {
        self.cells
            .chunks(self.dimension)
            .map(|column| column.iter().map(|m| m.code()).collect())
            .collect()
    }

    /// Number of cells with the given material.
    pub fn count(&self, material: Material) -> usize {
        self.cells.iter().filter(|&&m| m == material).count()
    }

    fn index(&self, position: Position) -> Option<usize> {
        if self.contains(position) {
            Some(position.x as usize * self.dimension + position.y as usize)
        } else {
            None
        }
    }
}

impl MazeGrid for Maze {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn material(&self, x: i32, y: i32) -> Material {
        self.index(Position::new(x, y))
            .map(|index| self.cells[index])
            .unwrap_or(Material::Wall)
    }
}

impl fmt::Display for Maze {
    /// Renders the maze with `y` increasing upwards.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in (0..self.dimension).rev() {
            let row: String = (0..self.dimension)
                .map(|x| self.cells[x * self.dimension + y].glyph())
                .collect();
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}
