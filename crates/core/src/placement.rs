//! Placement representation for positioned blocks.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Unique identifier for a block.
pub type BlockId = String;

/// Orientation of a placed block.
///
/// Only crane blocks may be placed at 90°; trestles are always at 0°.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Orientation {
    /// Original orientation.
    #[default]
    Deg0,
    /// Rotated 90° clockwise.
    Deg90,
}

impl Orientation {
    /// Returns true if this is the rotated orientation.
    pub fn is_rotated(&self) -> bool {
        matches!(self, Self::Deg90)
    }

    /// Returns the rotation angle in degrees.
    pub fn degrees(&self) -> u32 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
        }
    }
}

/// Represents the placement of a block on the deck.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Placement {
    /// The id of the placed block.
    pub block_id: BlockId,

    /// Anchor x coordinate (cells, deck frame).
    pub x: i32,

    /// Anchor y coordinate (cells, deck frame).
    pub y: i32,

    /// Orientation of the footprint.
    pub orientation: Orientation,
}

impl Placement {
    /// Creates a new placement.
    pub fn new(block_id: impl Into<BlockId>, x: i32, y: i32, orientation: Orientation) -> Self {
        Self {
            block_id: block_id.into(),
            x,
            y,
            orientation,
        }
    }

    /// Returns the anchor as an `(x, y)` pair.
    pub fn anchor(&self) -> (i32, i32) {
        (self.x, self.y)
    }
}

/// Statistics over a set of placements.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlacementStats {
    /// Total number of placements.
    pub count: usize,
    /// Number of placements at 90°.
    pub rotated_count: usize,
}

impl PlacementStats {
    /// Computes statistics from a set of placements.
    pub fn from_placements(placements: &[Placement]) -> Self {
        Self {
            count: placements.len(),
            rotated_count: placements
                .iter()
                .filter(|p| p.orientation.is_rotated())
                .count(),
        }
    }
}
