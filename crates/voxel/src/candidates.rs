//! Candidate anchor generation.
//!
//! Anchors are generated without feasibility filtering; the greedy loop is
//! the single gate through `PlacementArea::can_place`. Ordering biases
//! packing toward the bow: the initial corner first, then column stacking
//! from the rightmost column, then a fresh column to the left. Crane blocks
//! repeat the sequence for their 90° view, appended after the originals.

use deckpack_core::Orientation;

use crate::area::PlacementArea;
use crate::block::VoxelBlock;

/// A candidate anchor for a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    /// Anchor x coordinate.
    pub x: i32,
    /// Anchor y coordinate.
    pub y: i32,
    /// Footprint orientation.
    pub orientation: Orientation,
}

/// Generates the ordered candidate list for a block, truncated to
/// `max_candidates`.
pub fn generate(
    area: &PlacementArea,
    block: &VoxelBlock,
    max_candidates: usize,
) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    let spacing = area.block_spacing();
    let tops = area.column_tops();

    for &orientation in block.orientations() {
        let Some(view) = block.view(orientation) else {
            continue;
        };

        if area.is_deck_empty() {
            // Initial anchor: bottom-right corner against the bow margin.
            let x = area.usable_x_end() - view.width();
            if x >= area.usable_x_start() {
                candidates.push(Candidate { x, y: 0, orientation });
            }
            continue;
        }

        // Column-wise vertical stacking, rightmost columns first.
        for (&x, &top) in tops.iter().rev() {
            let y = top + spacing;
            if y + view.height() <= area.height() {
                candidates.push(Candidate { x, y, orientation });
            }
        }

        // New column to the left of the leftmost occupied one.
        if let Some((&leftmost, _)) = tops.iter().next() {
            let x = leftmost - view.width() - spacing;
            if x >= area.usable_x_start() {
                candidates.push(Candidate { x, y: 0, orientation });
            }
        }
    }

    candidates.truncate(max_candidates);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockType;
    use std::sync::Arc;

    fn trestle(id: &str, w: i32, h: i32) -> Arc<VoxelBlock> {
        Arc::new(VoxelBlock::rectangle(id, BlockType::Trestle, w, h).unwrap())
    }

    fn crane(id: &str, w: i32, h: i32) -> Arc<VoxelBlock> {
        Arc::new(VoxelBlock::rectangle(id, BlockType::Crane, w, h).unwrap())
    }

    #[test]
    fn test_initial_anchor_empty_deck() {
        let area = PlacementArea::new(10, 10).unwrap();
        let b = trestle("B", 3, 2);

        let candidates = generate(&area, &b, 25);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].x, 7);
        assert_eq!(candidates[0].y, 0);
        assert_eq!(candidates[0].orientation, Orientation::Deg0);
    }

    #[test]
    fn test_initial_anchor_respects_bow_clearance() {
        let area = PlacementArea::new(12, 10)
            .unwrap()
            .with_clearances(2, 1)
            .unwrap();
        let b = trestle("B", 3, 2);

        let candidates = generate(&area, &b, 25);
        assert_eq!(candidates[0].x, 7);
    }

    #[test]
    fn test_oversized_block_yields_nothing() {
        let area = PlacementArea::new(10, 10)
            .unwrap()
            .with_clearances(2, 2)
            .unwrap();
        let b = trestle("B", 8, 2);
        assert!(generate(&area, &b, 25).is_empty());
    }

    #[test]
    fn test_column_stacking_order() {
        let mut area = PlacementArea::new(10, 10)
            .unwrap()
            .with_spacing(1)
            .unwrap();
        let a = crane("A", 3, 2);
        area.place(&a, 7, 0, Orientation::Deg0).unwrap();

        let b = trestle("B", 3, 2);
        let candidates = generate(&area, &b, 25);

        // Stacking candidates for columns 9, 8, 7 at y = 2 + spacing,
        // then the new-column anchor.
        assert_eq!(
            candidates,
            vec![
                Candidate { x: 9, y: 3, orientation: Orientation::Deg0 },
                Candidate { x: 8, y: 3, orientation: Orientation::Deg0 },
                Candidate { x: 7, y: 3, orientation: Orientation::Deg0 },
                Candidate { x: 3, y: 0, orientation: Orientation::Deg0 },
            ]
        );
    }

    #[test]
    fn test_stacking_skips_columns_too_tall() {
        let mut area = PlacementArea::new(10, 6)
            .unwrap()
            .with_spacing(1)
            .unwrap();
        let a = crane("A", 3, 2);
        let b = crane("B", 3, 2);
        area.place(&a, 7, 0, Orientation::Deg0).unwrap();
        area.place(&b, 7, 3, Orientation::Deg0).unwrap();

        let c = trestle("C", 3, 2);
        let candidates = generate(&area, &c, 25);

        // Columns are filled to y = 5; stacking at y = 6 would overflow the
        // 6-cell deck, so only the new-column anchor remains.
        assert_eq!(
            candidates,
            vec![Candidate { x: 3, y: 0, orientation: Orientation::Deg0 }]
        );
    }

    #[test]
    fn test_crane_rotated_candidates_appended() {
        let area = PlacementArea::new(10, 10).unwrap();
        let c = crane("C", 4, 2);

        let candidates = generate(&area, &c, 25);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].x, 6);
        assert_eq!(candidates[0].orientation, Orientation::Deg0);
        // Rotated view is 2x4, so its corner anchor sits further right.
        assert_eq!(candidates[1].x, 8);
        assert_eq!(candidates[1].orientation, Orientation::Deg90);
    }

    #[test]
    fn test_truncation() {
        let mut area = PlacementArea::new(20, 20).unwrap();
        let a = crane("A", 10, 2);
        area.place(&a, 10, 0, Orientation::Deg0).unwrap();

        let b = trestle("B", 2, 2);
        let candidates = generate(&area, &b, 3);
        assert_eq!(candidates.len(), 3);
    }
}
