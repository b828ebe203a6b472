//! Action encoding: target column plus one of four placement geometries.
//!
//! An action index in `[0, 4·width)` encodes `column + width·orientation`,
//! so index `x + 0·W` is a vertical drop in column `x`, `x + 1·W` lays the
//! pair horizontally to the right, and so on.

use std::fmt;

/// Placement geometry of the two-cell piece.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Orientation {
    /// Vertical, first cell below the second.
    Up,
    /// Horizontal, second cell in the column to the right.
    Right,
    /// Vertical inverted, second cell below the first.
    Down,
    /// Horizontal, second cell in the column to the left.
    Left,
}

impl Orientation {
    /// Encode as the orientation part of an action index.
    pub fn index(self) -> usize {
        match self {
            Orientation::Up => 0,
            Orientation::Right => 1,
            Orientation::Down => 2,
            Orientation::Left => 3,
        }
    }

    /// Decode from the orientation part of an action index.
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Orientation::Up),
            1 => Some(Orientation::Right),
            2 => Some(Orientation::Down),
            3 => Some(Orientation::Left),
            _ => None,
        }
    }

    /// The orientation after a left-right reflection: `Right ↔ Left`,
    /// vertical orientations unchanged.
    pub fn mirrored(self) -> Self {
        match self {
            Orientation::Right => Orientation::Left,
            Orientation::Left => Orientation::Right,
            vertical => vertical,
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Orientation::Up | Orientation::Down)
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Orientation::Up => "up",
            Orientation::Right => "right",
            Orientation::Down => "down",
            Orientation::Left => "left",
        };
        write!(f, "{}", s)
    }
}

/// A placement action: target column and orientation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Action {
    pub column: usize,
    pub orientation: Orientation,
}

impl Action {
    /// Total number of action indices for a board of the given width.
    pub fn num_actions(width: usize) -> usize {
        4 * width
    }

    /// Decode a flat action index for a board of the given width.
    /// Returns `None` if the index is out of range.
    pub fn from_index(index: usize, width: usize) -> Option<Self> {
        if width == 0 || index >= Self::num_actions(width) {
            return None;
        }
        let orientation = Orientation::from_index(index / width)?;
        Some(Self {
            column: index % width,
            orientation,
        })
    }

    /// Encode as a flat action index for a board of the given width.
    pub fn index(&self, width: usize) -> usize {
        self.column + width * self.orientation.index()
    }

    /// The action after a left-right reflection of the board:
    /// `column → width−1−column` with the orientation mirrored.
    pub fn mirrored(&self, width: usize) -> Action {
        Action {
            column: width - 1 - self.column,
            orientation: self.orientation.mirrored(),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "col {} {}", self.column, self.orientation)
    }
}
