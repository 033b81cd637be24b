//! Voxel-record and deck-configuration loaders.
//!
//! The engine never reads meshes; blocks arrive as precomputed 2.5-D voxel
//! records produced by the voxelisation pipeline, and the deck arrives as a
//! JSON configuration. Both are plain serde models.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use deckpack_core::{Error, Result};

use crate::block::{BlockType, HeightRange, VoxelBlock};

/// One voxel column: `[x, y, [min_height, max_height]]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoxelPosition(pub i64, pub i64, pub (f64, f64));

/// The `voxel_data` section of a block record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoxelData {
    /// Metres per cell of the voxelisation (informational).
    pub resolution: f64,

    /// Occupied columns of the footprint.
    pub voxel_positions: Vec<VoxelPosition>,

    /// Optional precomputed footprint area; must match the position count.
    #[serde(default)]
    pub footprint_area: Option<usize>,
}

/// A per-block voxel record, as written by the voxelisation pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoxelRecord {
    /// Block identifier.
    pub block_id: String,

    /// Block type label; anything other than `"crane"` is a trestle.
    pub block_type: String,

    /// Voxelised footprint.
    pub voxel_data: VoxelData,
}

impl VoxelRecord {
    /// Parses a record from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::InvalidBlock(format!("voxel record parse error: {}", e)))
    }

    /// Reads and parses a record file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::InvalidBlock(format!(
                "failed to read {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_json_str(&content)
    }

    /// Builds the immutable block descriptor this record describes.
    pub fn into_block(self) -> Result<VoxelBlock> {
        let positions = &self.voxel_data.voxel_positions;
        if positions.is_empty() {
            return Err(Error::InvalidBlock(format!(
                "{}: record has no voxel positions",
                self.block_id
            )));
        }
        if let Some(expected) = self.voxel_data.footprint_area {
            if expected != positions.len() {
                return Err(Error::InvalidBlock(format!(
                    "{}: footprint_area {} does not match {} voxel positions",
                    self.block_id,
                    expected,
                    positions.len()
                )));
            }
        }

        let mut raw = Vec::with_capacity(positions.len());
        for &VoxelPosition(x, y, (min_height, max_height)) in positions {
            if x < 0 || y < 0 {
                return Err(Error::InvalidBlock(format!(
                    "{}: negative voxel cell ({}, {})",
                    self.block_id, x, y
                )));
            }
            if x > i64::from(i32::MAX) || y > i64::from(i32::MAX) {
                return Err(Error::InvalidBlock(format!(
                    "{}: voxel cell ({}, {}) out of range",
                    self.block_id, x, y
                )));
            }
            raw.push((
                (x as i32, y as i32),
                HeightRange::new(min_height, max_height),
            ));
        }

        VoxelBlock::new(
            self.block_id,
            BlockType::from_label(&self.block_type),
            self.voxel_data.resolution,
            raw,
        )
    }
}

/// Deck extent in metres plus the cell size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSize {
    /// Deck width in metres.
    pub width: f64,
    /// Deck height in metres.
    pub height: f64,
    /// Cell size in metres per cell.
    pub grid_unit: f64,
}

/// Boundary reservations at the deck ends, in cells.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Margin {
    /// Bow-side (+x) reserved band.
    pub bow: i32,
    /// Stern-side (-x) reserved band.
    pub stern: i32,
}

/// Placement constraints of the deck.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckConstraints {
    /// Boundary reservations.
    pub margin: Margin,

    /// Minimum chessboard gap between blocks, in cells.
    #[serde(default)]
    pub block_clearance: i32,

    /// Crane-only bow reservation, in cells.
    #[serde(default)]
    pub ring_bow_clearance: i32,
}

/// Deck configuration consumed by [`PlacementArea::from_config`].
///
/// [`PlacementArea::from_config`]: crate::area::PlacementArea::from_config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckConfig {
    /// Deck extent.
    pub grid_size: GridSize,

    /// Placement constraints.
    pub constraints: DeckConstraints,
}

impl DeckConfig {
    /// Parses a deck configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::InvalidDeck(format!("deck config parse error: {}", e)))
    }

    /// Reads and parses a deck configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::InvalidDeck(format!(
                "failed to read {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_json_str(&content)
    }
}
