//! Error types for deckpack.

use thiserror::Error;

/// Result type alias for deckpack operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during block placement operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid block data (empty footprint, negative cells, bad record).
    #[error("Invalid block: {0}")]
    InvalidBlock(String),

    /// Invalid deck geometry (non-positive extent, clearances eating the deck).
    #[error("Invalid deck: {0}")]
    InvalidDeck(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A block with this id is already placed.
    #[error("Block already placed: {0}")]
    AlreadyPlaced(String),

    /// No placed block with this id.
    #[error("Unknown block: {0}")]
    UnknownBlock(String),

    /// The block has no footprint view for the requested orientation.
    #[error("Block {0} has no view for the requested orientation")]
    InvalidOrientation(String),

    /// Internal error. Indicates a bug, never a caller mistake.
    #[error("Internal error: {0}")]
    Internal(String),
}
