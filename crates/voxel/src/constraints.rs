//! Type-specific placement rules and perimeter spacing.

use crate::area::{view_aabb, PlacementArea};
use crate::block::{BlockType, FootprintView, VoxelBlock};

/// Checks the rules tied to the candidate's block type, plus the corridors
/// of already-placed trestles (which constrain every candidate).
pub(crate) fn type_rules_ok(
    area: &PlacementArea,
    block: &VoxelBlock,
    view: &FootprintView,
    x: i32,
    y: i32,
) -> bool {
    let own_ok = match block.block_type() {
        BlockType::Crane => ring_bow_ok(area, view, x),
        BlockType::Trestle => corridor_clear(area, view, x, y),
    };
    own_ok && respects_placed_corridors(area, view, x, y)
}

/// Crane bow-ring clearance: the bow-most footprint column must stay
/// `ring_bow_clearance` cells short of the deck edge at `width`.
///
/// The distance is measured from the deck edge itself, not from the bow
/// margin, so the ring binds whenever it is stricter than the margin.
pub(crate) fn ring_bow_ok(area: &PlacementArea, view: &FootprintView, x: i32) -> bool {
    let far_x = x + view.width() - 1;
    if area.width() - far_x - 1 < area.ring_bow_clearance() {
        log::trace!("ring bow clearance rejects far column {}", far_x);
        return false;
    }
    true
}

/// Trestle access corridor: every cell between the stern edge and the
/// block's left edge, across the block's full y-span, must be empty.
pub(crate) fn corridor_clear(area: &PlacementArea, view: &FootprintView, x: i32, y: i32) -> bool {
    for cy in y..y + view.height() {
        for cx in 0..x {
            if area.is_occupied(cx, cy) {
                log::trace!("access corridor blocked at ({}, {})", cx, cy);
                return false;
            }
        }
    }
    true
}

/// No candidate may intrude into the corridor of a placed trestle.
fn respects_placed_corridors(area: &PlacementArea, view: &FootprintView, x: i32, y: i32) -> bool {
    for (placed, (px, py), orientation) in area.iter_placed() {
        if placed.block_type() != BlockType::Trestle {
            continue;
        }
        let placed_view = placed
            .view(orientation)
            .expect("placed block has a view for its orientation");
        let band_start = py;
        let band_end = py + placed_view.height();

        // Quick reject when the y-spans do not meet.
        if y + view.height() <= band_start || y >= band_end {
            continue;
        }
        for &(rx, ry) in view.cells() {
            let cy = y + ry;
            if cy >= band_start && cy < band_end && x + rx < px {
                log::trace!(
                    "anchor ({}, {}) intrudes into the corridor of {}",
                    x,
                    y,
                    placed.id()
                );
                return false;
            }
        }
    }
    true
}

/// Voxel-boundary spacing: the chessboard gap between the candidate's
/// perimeter and every nearby placed block's perimeter must reach the
/// configured spacing. Blocks whose bounding boxes are farther than the
/// spacing are skipped via the spatial index.
pub(crate) fn spacing_ok(area: &PlacementArea, view: &FootprintView, x: i32, y: i32) -> bool {
    let spacing = area.block_spacing();
    if spacing == 0 {
        return true;
    }

    for token in area.nearby_tokens(view_aabb(view, x, y), spacing) {
        let (placed, (px, py), orientation) = area.placed_by_token(token);
        let placed_view = placed
            .view(orientation)
            .expect("placed block has a view for its orientation");
        let gap = perimeter_gap(view, (x, y), placed_view, (px, py));
        if gap < spacing {
            log::trace!(
                "anchor ({}, {}) leaves gap {} to {}, spacing requires {}",
                x,
                y,
                gap,
                placed.id(),
                spacing
            );
            return false;
        }
    }
    true
}

/// Minimum chessboard gap between the perimeter cells of two placed views.
///
/// Axis-aligned adjacency counts as 0; one empty cell between counts as 1;
/// coincident cells count as 0 (overlap is rejected by occupancy, not here).
pub(crate) fn perimeter_gap(
    view_a: &FootprintView,
    anchor_a: (i32, i32),
    view_b: &FootprintView,
    anchor_b: (i32, i32),
) -> i32 {
    let mut min_gap = i32::MAX;
    for &(ax, ay) in view_a.perimeter() {
        let (pax, pay) = (anchor_a.0 + ax, anchor_a.1 + ay);
        for &(bx, by) in view_b.perimeter() {
            let dx = (pax - (anchor_b.0 + bx)).abs();
            let dy = (pay - (anchor_b.1 + by)).abs();
            let gap = if dx == 0 && dy == 0 {
                0
            } else {
                dx.max(dy) - 1
            };
            if gap < min_gap {
                min_gap = gap;
                if min_gap == 0 {
                    return 0;
                }
            }
        }
    }
    min_gap
}
