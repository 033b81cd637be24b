//! Post-placement compaction: shifting a fresh block toward obstacles.

use std::sync::Arc;

use deckpack_core::{Error, Orientation, Result};

use crate::area::PlacementArea;
use crate::block::VoxelBlock;

/// Compacts the freshly placed block: right-shift, down-shift, then a second
/// right-shift picking up room opened by the drop. Earlier placements are
/// never revisited.
pub fn compact_block(area: &mut PlacementArea, id: &str) -> Result<()> {
    shift_right(area, id)?;
    if shift_down(area, id)? {
        shift_right(area, id)?;
    }
    Ok(())
}

/// Shifts the block toward the bow as far as its right-edge cells allow.
/// Returns true if the block moved.
pub fn shift_right(area: &mut PlacementArea, id: &str) -> Result<bool> {
    let (block, x, y, orientation) = placed_state(area, id)?;
    let view = block
        .view(orientation)
        .ok_or_else(|| Error::Internal(format!("placed block {} lost its view", id)))?;

    let spacing = area.block_spacing();
    let usable_end = area.usable_x_end();
    // The bow boundary acts as an obstacle column; cranes additionally stop
    // at the ring clearance line, measured from the deck edge.
    let mut boundary = usable_end;
    if block.is_crane() {
        boundary = boundary.min(area.width() - area.ring_bow_clearance());
    }

    let mut max_shift = i32::MAX;
    for &(rx, ry) in view.right_edge() {
        let edge_x = x + rx;
        let edge_y = y + ry;
        let mut obstacle = boundary;
        for tx in edge_x + 1..usable_end {
            if area.is_occupied(tx, edge_y) {
                obstacle = tx;
                break;
            }
        }
        max_shift = max_shift.min(obstacle - edge_x - 1 - spacing);
    }
    let max_shift = max_shift.max(0);
    if max_shift == 0 {
        return Ok(false);
    }

    attempt_shifts(area, &block, (x, y), orientation, max_shift, |k| (x + k, y))
}

/// Shifts the block toward y = 0 as far as its bottom-edge cells allow.
/// Returns true if the block moved.
pub fn shift_down(area: &mut PlacementArea, id: &str) -> Result<bool> {
    let (block, x, y, orientation) = placed_state(area, id)?;
    let view = block
        .view(orientation)
        .ok_or_else(|| Error::Internal(format!("placed block {} lost its view", id)))?;

    let spacing = area.block_spacing();

    let mut max_shift = i32::MAX;
    for &(rx, ry) in view.bottom_edge() {
        let edge_x = x + rx;
        let edge_y = y + ry;
        // The deck floor is the obstacle row below y = 0.
        let mut obstacle = -1;
        for ty in (0..edge_y).rev() {
            if area.is_occupied(edge_x, ty) {
                obstacle = ty;
                break;
            }
        }
        max_shift = max_shift.min(edge_y - obstacle - 1 - spacing);
    }
    let max_shift = max_shift.max(0);
    if max_shift == 0 {
        return Ok(false);
    }

    attempt_shifts(area, &block, (x, y), orientation, max_shift, |k| (x, y - k))
}

/// Tries shifts of `max_shift`, `max_shift - 1`, ..., 1 cells, committing the
/// first one `can_place` accepts. Restores the original placement when every
/// shift fails.
fn attempt_shifts(
    area: &mut PlacementArea,
    block: &Arc<VoxelBlock>,
    origin: (i32, i32),
    orientation: Orientation,
    max_shift: i32,
    target: impl Fn(i32) -> (i32, i32),
) -> Result<bool> {
    area.remove(block.id())?;
    for k in (1..=max_shift).rev() {
        let (tx, ty) = target(k);
        if area.can_place(block, tx, ty, orientation) {
            area.place(block, tx, ty, orientation)?;
            log::debug!("compacted {} by {} cells to ({}, {})", block.id(), k, tx, ty);
            return Ok(true);
        }
    }
    area.place(block, origin.0, origin.1, orientation)?;
    Ok(false)
}

fn placed_state(
    area: &PlacementArea,
    id: &str,
) -> Result<(Arc<VoxelBlock>, i32, i32, Orientation)> {
    let (x, y, orientation) = area
        .anchor_of(id)
        .ok_or_else(|| Error::UnknownBlock(id.to_string()))?;
    let block = area
        .iter_placed()
        .find(|(b, _, _)| b.id() == id)
        .map(|(b, _, _)| Arc::clone(b))
        .ok_or_else(|| Error::UnknownBlock(id.to_string()))?;
    Ok((block, x, y, orientation))
}
