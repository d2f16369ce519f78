//! Per-episode visitation history

use crate::types::Position;

/// Boolean grid of cells the agent has occupied during the current episode.
///
/// Cells only ever flip from unvisited to visited; a new episode gets a new
/// grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitedGrid {
    dimension: usize,
    cells: Vec<bool>,
}

impl VisitedGrid {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            cells: vec![false; dimension * dimension],
        }
    }

    /// Mark `position` as visited. Positions outside the grid are ignored.
    pub fn mark(&mut self, position: Position) {
        if let Some(index) = self.index(position) {
            self.cells[index] = true;
        }
    }

    /// Whether `position` has been visited. Always false outside the grid.
    pub fn is_visited(&self, position: Position) -> bool {
        self.index(position).is_some_and(|index| self.cells[index])
    }

    /// Number of distinct cells visited so far.
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|&&v| v).count()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn index(&self, position: Position) -> Option<usize> {
        let d = self.dimension as i64;
        let (x, y) = (position.x as i64, position.y as i64);
        if (0..d).contains(&x) && (0..d).contains(&y) {
            Some(x as usize * self.dimension + y as usize)
        } else {
            None
        }
    }
}
