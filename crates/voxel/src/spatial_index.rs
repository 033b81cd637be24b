//! Spatial indexing for placed blocks using an R*-tree.
//!
//! Broad-phase filter for the spacing check: only blocks whose bounding
//! boxes lie within the spacing distance of a candidate need their
//! perimeter cells compared.

use rstar::{RTree, RTreeObject, AABB};

/// An entry in the spatial index representing a placed block.
#[derive(Debug, Clone)]
pub struct SpatialEntry {
    /// Registry token of the placed block.
    pub token: u32,
    /// Inclusive cell bounding box (min_x, min_y, max_x, max_y).
    pub aabb: [i32; 4],
}

impl SpatialEntry {
    /// Creates a new spatial entry.
    pub fn new(token: u32, aabb: [i32; 4]) -> Self {
        Self { token, aabb }
    }
}

impl PartialEq for SpatialEntry {
    fn eq(&self, other: &Self) -> bool {
        self.token == other.token
    }
}

impl RTreeObject for SpatialEntry {
    type Envelope = AABB<[i32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners([self.aabb[0], self.aabb[1]], [self.aabb[2], self.aabb[3]])
    }
}

/// R*-tree over the cell bounding boxes of placed blocks.
#[derive(Debug, Clone, Default)]
pub struct SpatialIndex {
    tree: RTree<SpatialEntry>,
}

impl SpatialIndex {
    /// Creates a new empty spatial index.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Inserts a placed block.
    pub fn insert(&mut self, token: u32, aabb: [i32; 4]) {
        self.tree.insert(SpatialEntry::new(token, aabb));
    }

    /// Removes a placed block. Returns true if it was present.
    pub fn remove(&mut self, token: u32, aabb: [i32; 4]) -> bool {
        self.tree.remove(&SpatialEntry::new(token, aabb)).is_some()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Returns true if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Tokens of blocks whose bounding boxes come within `margin` cells
    /// (chessboard) of the query box.
    pub fn query_with_margin(&self, aabb: [i32; 4], margin: i32) -> Vec<u32> {
        let envelope = AABB::from_corners(
            [aabb[0] - margin, aabb[1] - margin],
            [aabb[2] + margin, aabb[3] + margin],
        );
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|entry| entry.token)
            .collect()
    }
}
