//! Core value types shared by the maze, the feature extractor and the agent.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Number of movement actions available to the agent.
pub const ACTION_COUNT: usize = 4;

/// A cell coordinate in the maze grid.
///
/// Coordinates are signed so that a tentative move off the edge of the grid
/// is representable; such positions read as walls.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The position one step away in the direction of `action`.
    pub fn offset(self, action: Action) -> Self {
        let (dx, dy) = action.delta();
        Self::new(self.x + dx, self.y + dy)
    }

    /// Manhattan (L1) distance to `other`.
    pub fn manhattan_distance(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A unit move on the grid.
///
/// The declaration order fixes the action index used by the Q-table and the
/// slot order of the feature vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Left,
    Up,
    Right,
    Down,
}

impl Action {
    /// All actions in index order.
    pub const ALL: [Action; ACTION_COUNT] = [Action::Left, Action::Up, Action::Right, Action::Down];

    /// Index of this action in the Q-table row.
    pub const fn index(self) -> usize {
        match self {
            Action::Left => 0,
            Action::Up => 1,
            Action::Right => 2,
            Action::Down => 3,
        }
    }

    /// Action for a Q-table column index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Direction vector `(dx, dy)` of this action.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Action::Left => (-1, 0),
            Action::Up => (0, 1),
            Action::Right => (1, 0),
            Action::Down => (0, -1),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Left => "left",
            Action::Up => "up",
            Action::Right => "right",
            Action::Down => "down",
        };
        f.write_str(name)
    }
}

/// Material of a maze cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Material {
    /// Free road.
    #[default]
    Open,
    /// Passable but penalised (bushes).
    SoftObstacle,
    /// Impassable brick.
    Wall,
}

impl Material {
    /// Numeric material code (0 = open, 1 = soft obstacle, 2 = wall).
    pub const fn code(self) -> u8 {
        match self {
            Material::Open => 0,
            Material::SoftObstacle => 1,
            Material::Wall => 2,
        }
    }

    /// Parse a material code.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMaterial`] for codes other than 0, 1 and 2.
    /// The coordinates are only used for the error message.
    pub fn from_code(code: u8, x: usize, y: usize) -> Result<Self, Error> {
        match code {
            0 => Ok(Material::Open),
            1 => Ok(Material::SoftObstacle),
            2 => Ok(Material::Wall),
            _ => Err(Error::InvalidMaterial { code, x, y }),
        }
    }

    pub const fn is_open(self) -> bool {
        matches!(self, Material::Open)
    }

    /// Single-character rendering used by `Maze`'s `Display` impl.
    pub const fn glyph(self) -> char {
        match self {
            Material::Open => '.',
            Material::SoftObstacle => '*',
            Material::Wall => '#',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_order_and_deltas() {
        for (index, action) in Action::ALL.iter().enumerate() {
            assert_eq!(action.index(), index);
            assert_eq!(Action::from_index(index), Some(*action));
        }
        assert_eq!(Action::from_index(4), None);
        assert_eq!(Action::Up.delta(), (0, 1));
        assert_eq!(Action::Down.delta(), (0, -1));
    }

    #[test]
    fn test_position_offset_and_distance() {
        let origin = Position::new(1, 1);
        assert_eq!(origin.offset(Action::Right), Position::new(2, 1));
        assert_eq!(origin.offset(Action::Left), Position::new(0, 1));
        assert_eq!(origin.manhattan_distance(Position::new(3, 2)), 3);
        assert_eq!(Position::new(-2, 0).manhattan_distance(Position::new(1, 4)), 7);
    }

    #[test]
    fn test_material_codes() {
        for material in [Material::Open, Material::SoftObstacle, Material::Wall] {
            assert_eq!(Material::from_code(material.code(), 0, 0).unwrap(), material);
        }
        assert!(matches!(
            Material::from_code(3, 4, 5),
            Err(Error::InvalidMaterial { code: 3, x: 4, y: 5 })
        ));
    }
}
