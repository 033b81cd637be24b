//! # Deckpack Voxel
//!
//! Greedy voxel placement engine for packing ship blocks onto the deck of a
//! self-propelled floating dock.
//!
//! Blocks arrive as 2.5-D voxel footprints (precomputed by an external
//! voxelisation pipeline) and are packed onto a cell grid under boundary,
//! clearance and block-type constraints, maximising the count of placed
//! blocks.
//!
//! ## Features
//!
//! - Arbitrary (non-rectangular) voxel footprints with per-cell heights
//! - Crane and trestle block types with distinct access rules
//! - Chessboard perimeter spacing between blocks
//! - Two-phase greedy placement with post-placement compaction
//! - Optional 90° rotation for crane blocks
//! - Deterministic results for a fixed input
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use deckpack_voxel::{BlockType, GreedyPlacer, PackConfig, PlacementArea, VoxelBlock};
//!
//! // Describe the deck: 40x12 cells, one cell of spacing between blocks.
//! let mut area = PlacementArea::new(40, 12)
//!     .unwrap()
//!     .with_spacing(1)
//!     .unwrap();
//!
//! // Blocks normally come from voxel records; rectangles work for tests.
//! let blocks = vec![
//!     Arc::new(VoxelBlock::rectangle("hull_a", BlockType::Trestle, 6, 4).unwrap()),
//!     Arc::new(VoxelBlock::rectangle("hull_b", BlockType::Crane, 5, 3).unwrap()),
//! ];
//!
//! let placer = GreedyPlacer::new(PackConfig::new().with_time_limit(10_000));
//! let result = placer.place_all(&blocks, &mut area).unwrap();
//!
//! println!(
//!     "placed {} of {} blocks, utilization {}",
//!     result.placed_count(),
//!     blocks.len(),
//!     result.utilization_percent()
//! );
//! ```
//!
//! ## Loading real inputs
//!
//! ```rust,ignore
//! use deckpack_voxel::{DeckConfig, PlacementArea, VoxelRecord};
//!
//! let config = DeckConfig::from_path("deck.json")?;
//! let mut area = PlacementArea::from_config(&config)?;
//! let block = VoxelRecord::from_path("blocks/4391_643_000.json")?.into_block()?;
//! ```

pub mod area;
pub mod block;
pub mod candidates;
pub mod compact;
mod constraints;
pub mod loader;
pub mod placer;
pub mod spatial_index;

// Re-exports
pub use area::PlacementArea;
pub use block::{BlockType, FootprintView, HeightRange, VoxelBlock};
pub use candidates::Candidate;
pub use loader::{DeckConfig, VoxelRecord};
pub use placer::GreedyPlacer;
pub use spatial_index::{SpatialEntry, SpatialIndex};
pub use deckpack_core::{
    BlockId, Error, Orientation, PackConfig, Placement, PlacementResult, PlacementStats,
    PlacementSummary, ProgressCallback, ProgressInfo, Result,
};
