//! # Deckpack
//!
//! Voxel block placement for self-propelled floating dock decks.
//!
//! This crate re-exports the two workspace members:
//! - **core**: shared vocabulary (errors, configuration, results)
//! - **voxel**: the greedy voxel placement engine
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use deckpack::voxel::{DeckConfig, PlacementArea, VoxelRecord};
//! use deckpack::{GreedyPlacer, PackConfig};
//!
//! let config = DeckConfig::from_path("deck.json")?;
//! let mut area = PlacementArea::from_config(&config)?;
//! let blocks = vec![Arc::new(
//!     VoxelRecord::from_path("blocks/4391_643_000.json")?.into_block()?,
//! )];
//!
//! let placer = GreedyPlacer::new(PackConfig::default());
//! let result = placer.place_all(&blocks, &mut area)?;
//! ```

/// Shared vocabulary: errors, configuration, results.
pub use deckpack_core as core;

/// The greedy voxel placement engine.
pub use deckpack_voxel as voxel;

// Re-export commonly used types at root level
pub use deckpack_core::{
    Error, Orientation, PackConfig, Placement, PlacementResult, PlacementSummary, Result,
};
pub use deckpack_voxel::{GreedyPlacer, PlacementArea, VoxelBlock};
