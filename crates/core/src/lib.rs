//! # Deckpack Core
//!
//! Core types for the deckpack voxel placement engine.
//!
//! This crate provides the vocabulary shared by the placement engine and its
//! callers: errors, configuration, progress reporting, and result types.
//!
//! ## Core Components
//!
//! - **Error handling**: [`Error`], [`Result`]
//! - **Configuration**: [`PackConfig`] - builder-style placer settings
//! - **Progress**: [`ProgressCallback`], [`ProgressInfo`]
//! - **Results**: [`Placement`], [`PlacementResult`], [`PlacementSummary`]
//!
//! ## Configuration
//!
//! ```rust
//! use deckpack_core::PackConfig;
//!
//! let config = PackConfig::new()
//!     .with_time_limit(30_000)
//!     .with_max_candidates(25)
//!     .with_compaction(true);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization support

pub mod error;
pub mod placement;
pub mod result;
pub mod solver;

// Re-exports
pub use error::{Error, Result};
pub use placement::{BlockId, Orientation, Placement, PlacementStats};
pub use result::{PlacementResult, PlacementSummary};
pub use solver::{PackConfig, ProgressCallback, ProgressInfo};
