//! Board grid for the falling-block game.
//!
//! The board is a row-major grid of small integers, row 0 at the bottom.
//! A cell is empty, one of [`NUM_COLORS`] piece colors, or the obstacle
//! marker. The grid is immutable by convention inside the search core:
//! transitions produce a new board, and identity for search purposes is the
//! environment-provided [`StateKey`], never Rust object identity.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

/// An empty cell.
pub const EMPTY: i8 = 0;

/// Number of distinct piece colors; colors are `1..=NUM_COLORS`.
pub const NUM_COLORS: i8 = 4;

/// The obstacle (filler) cell marker.
pub const OBSTACLE: i8 = 6;

/// Opaque comparable key identifying a board's content.
///
/// Produced by [`crate::Environment::state_key`]; the search engine keys all
/// of its per-state statistics by this value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct StateKey(pub u64);

/// A board state: height × width grid of cells, row 0 at the bottom.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Board {
    height: usize,
    width: usize,
    cells: Vec<i8>,
}

impl Board {
    /// Default board height.
    pub const DEFAULT_HEIGHT: usize = 14;

    /// Default board width.
    pub const DEFAULT_WIDTH: usize = 6;

    /// Create an empty board with the given dimensions.
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            height,
            width,
            cells: vec![EMPTY; height * width],
        }
    }

    /// Create an empty board with the default 14×6 dimensions.
    pub fn standard() -> Self {
        Self::new(Self::DEFAULT_HEIGHT, Self::DEFAULT_WIDTH)
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Get the cell at (row, column), row 0 at the bottom.
    ///
    /// # Panics
    /// Panics if the coordinates are out of bounds.
    pub fn get(&self, row: usize, col: usize) -> i8 {
        self.cells[row * self.width + col]
    }

    /// Set the cell at (row, column).
    ///
    /// # Panics
    /// Panics if the coordinates are out of bounds.
    pub fn set(&mut self, row: usize, col: usize, value: i8) {
        self.cells[row * self.width + col] = value;
    }

    /// The raw cell grid in row-major order, row 0 first.
    pub fn cells(&self) -> &[i8] {
        &self.cells
    }

    /// Height of the stack in a column: index of the topmost occupied cell
    /// plus one, or 0 for an empty column.
    pub fn column_height(&self, col: usize) -> usize {
        for row in (0..self.height).rev() {
            if self.get(row, col) != EMPTY {
                return row + 1;
            }
        }
        0
    }

    /// A left-right mirrored copy of the board (`column → width−1−column`).
    pub fn mirrored(&self) -> Board {
        let mut out = Board::new(self.height, self.width);
        for row in 0..self.height {
            for col in 0..self.width {
                out.set(row, self.width - 1 - col, self.get(row, col));
            }
        }
        out
    }

    /// Cells that are occupied in `self` but empty in `before`, excluding
    /// obstacle cells. Returned as (column, row) pairs.
    ///
    /// Used by the controller to attribute a loss to the agent's own
    /// placement versus an obstacle drop.
    pub fn placed_cells_since(&self, before: &Board) -> Vec<(usize, usize)> {
        let mut placed = Vec::new();
        if before.height != self.height || before.width != self.width {
            return placed;
        }
        for row in 0..self.height {
            for col in 0..self.width {
                let after = self.get(row, col);
                if before.get(row, col) == EMPTY && after != EMPTY && after != OBSTACLE {
                    placed.push((col, row));
                }
            }
        }
        placed
    }

    /// A content hash usable by in-process environments as a [`StateKey`].
    pub fn content_key(&self) -> StateKey {
        let mut hasher = DefaultHasher::new();
        self.height.hash(&mut hasher);
        self.width.hash(&mut hasher);
        self.cells.hash(&mut hasher);
        StateKey(hasher.finish())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..self.height).rev() {
            for col in 0..self.width {
                let c = match self.get(row, col) {
                    EMPTY => '.',
                    OBSTACLE => '#',
                    v => char::from_digit(v as u32, 10).unwrap_or('?'),
                };
                write!(f, "{}", c)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
