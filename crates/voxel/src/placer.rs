//! Two-phase greedy placement loop.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use deckpack_core::{
    Error, PackConfig, Placement, PlacementResult, ProgressCallback, ProgressInfo, Result,
};

use crate::area::PlacementArea;
use crate::block::VoxelBlock;
use crate::candidates;
use crate::compact::compact_block;

/// Greedy voxel placer.
///
/// Runs a primary descending-area pass and a retry ascending-area pass over
/// the input blocks, committing each block at the first feasible candidate
/// anchor and compacting it toward the bow and the deck floor.
pub struct GreedyPlacer {
    config: PackConfig,
    cancelled: Arc<AtomicBool>,
}

impl GreedyPlacer {
    /// Creates a new placer with the given configuration.
    pub fn new(config: PackConfig) -> Self {
        Self {
            config,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Creates a placer with default configuration.
    pub fn default_config() -> Self {
        Self::new(PackConfig::default())
    }

    /// Requests cooperative cancellation of an ongoing run.
    ///
    /// Observed at the top of each per-block iteration and before each
    /// candidate attempt; the partial result is returned.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Places as many blocks as possible onto the area.
    ///
    /// Per-block infeasibility is a normal outcome reported through the
    /// result; an `Err` indicates invalid input or an internal bug.
    pub fn place_all(
        &self,
        blocks: &[Arc<VoxelBlock>],
        area: &mut PlacementArea,
    ) -> Result<PlacementResult> {
        self.run(blocks, area, None)
    }

    /// Places all blocks, reporting progress through the callback.
    pub fn place_all_with_progress(
        &self,
        blocks: &[Arc<VoxelBlock>],
        area: &mut PlacementArea,
        callback: ProgressCallback,
    ) -> Result<PlacementResult> {
        self.run(blocks, area, Some(&callback))
    }

    fn run(
        &self,
        blocks: &[Arc<VoxelBlock>],
        area: &mut PlacementArea,
        callback: Option<&ProgressCallback>,
    ) -> Result<PlacementResult> {
        let start = Instant::now();
        self.cancelled.store(false, Ordering::Relaxed);

        let mut seen = HashSet::new();
        for block in blocks {
            if !seen.insert(block.id()) {
                return Err(Error::InvalidBlock(format!(
                    "duplicate block id {}",
                    block.id()
                )));
            }
        }

        let mut result = PlacementResult::new();
        let total = blocks.len();
        let mut placed_count = 0usize;

        report(callback, &start, area, placed_count, total, "Primary pass");

        // Phase 1: largest blocks first, stable id tie-break.
        let mut order: Vec<&Arc<VoxelBlock>> = blocks.iter().collect();
        order.sort_by(|a, b| b.area().cmp(&a.area()).then_with(|| a.id().cmp(b.id())));

        let mut retry_queue: Vec<&Arc<VoxelBlock>> = Vec::new();
        let mut unattempted: Vec<&Arc<VoxelBlock>> = Vec::new();

        for (i, block) in order.iter().enumerate() {
            if self.budget_exceeded(&start) {
                result.time_budget_exceeded = true;
                unattempted.extend(&order[i..]);
                break;
            }
            if self.cancelled.load(Ordering::Relaxed) {
                result.cancelled = true;
                unattempted.extend(&order[i..]);
                break;
            }

            if self.try_place(area, block, self.config.max_candidates)? {
                placed_count += 1;
                report(callback, &start, area, placed_count, total, "Primary pass");
            } else {
                retry_queue.push(block);
            }
        }

        // Phase 2: smallest leftovers first, with a wider candidate cap.
        if !retry_queue.is_empty() && !result.time_budget_exceeded && !result.cancelled {
            retry_queue.sort_by(|a, b| a.area().cmp(&b.area()).then_with(|| a.id().cmp(b.id())));
            log::info!("retrying {} unplaced blocks", retry_queue.len());
            report(callback, &start, area, placed_count, total, "Retry pass");

            for (i, block) in retry_queue.iter().enumerate() {
                if self.budget_exceeded(&start) {
                    result.time_budget_exceeded = true;
                    unattempted.extend(&retry_queue[i..]);
                    break;
                }
                if self.cancelled.load(Ordering::Relaxed) {
                    result.cancelled = true;
                    unattempted.extend(&retry_queue[i..]);
                    break;
                }

                let cap = self
                    .config
                    .retry_max_candidates
                    .min(10 * area.placed_count() + 30);
                if self.try_place(area, block, cap)? {
                    placed_count += 1;
                    result.retry_placed += 1;
                    report(callback, &start, area, placed_count, total, "Retry pass");
                } else {
                    result.unplaced.push(block.id().to_string());
                }
            }
            if result.retry_placed > 0 {
                log::info!("retry pass placed {} additional blocks", result.retry_placed);
            }
        } else {
            for block in &retry_queue {
                result.unplaced.push(block.id().to_string());
            }
        }

        for block in &unattempted {
            result.unplaced.push(block.id().to_string());
        }

        let input_ids: HashSet<&str> = blocks.iter().map(|b| b.id()).collect();
        result.placements = area
            .iter_placed()
            .filter(|(block, _, _)| input_ids.contains(block.id()))
            .map(|(block, (x, y), orientation)| Placement::new(block.id(), x, y, orientation))
            .collect();
        result.utilization = area.utilization();
        result.computation_time_ms = start.elapsed().as_millis() as u64;

        let phase = if result.cancelled {
            "Cancelled"
        } else if result.time_budget_exceeded {
            "Time limit reached"
        } else {
            "Complete"
        };
        if let Some(cb) = callback {
            cb(ProgressInfo::new()
                .with_blocks(placed_count, total)
                .with_utilization(result.utilization)
                .with_elapsed(result.computation_time_ms)
                .with_phase(phase)
                .finished());
        }

        Ok(result)
    }

    /// Tries every candidate anchor in order, committing and compacting at
    /// the first feasible one.
    fn try_place(
        &self,
        area: &mut PlacementArea,
        block: &Arc<VoxelBlock>,
        max_candidates: usize,
    ) -> Result<bool> {
        for candidate in candidates::generate(area, block, max_candidates) {
            if self.cancelled.load(Ordering::Relaxed) {
                return Ok(false);
            }
            if area.can_place(block, candidate.x, candidate.y, candidate.orientation) {
                if let Err(err) =
                    area.place(block, candidate.x, candidate.y, candidate.orientation)
                {
                    log::warn!(
                        "place() rejected {} after can_place accepted it: {}",
                        block.id(),
                        err
                    );
                    return Err(err);
                }
                if self.config.compaction {
                    if let Err(err) = compact_block(area, block.id()) {
                        log::warn!("compaction of {} failed: {}", block.id(), err);
                        return Err(err);
                    }
                }
                log::debug!(
                    "placed {} at {:?} ({:?})",
                    block.id(),
                    area.anchor_of(block.id()),
                    block.block_type()
                );
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn budget_exceeded(&self, start: &Instant) -> bool {
        self.config.time_limit_ms > 0
            && start.elapsed().as_millis() as u64 >= self.config.time_limit_ms
    }
}

fn report(
    callback: Option<&ProgressCallback>,
    start: &Instant,
    area: &PlacementArea,
    placed: usize,
    total: usize,
    phase: &str,
) {
    if let Some(cb) = callback {
        cb(ProgressInfo::new()
            .with_blocks(placed, total)
            .with_utilization(area.utilization())
            .with_elapsed(start.elapsed().as_millis() as u64)
            .with_phase(phase));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockType;
    use deckpack_core::Orientation;

    fn trestle(id: &str, w: i32, h: i32) -> Arc<VoxelBlock> {
        Arc::new(VoxelBlock::rectangle(id, BlockType::Trestle, w, h).unwrap())
    }

    #[test]
    fn test_empty_input() {
        let mut area = PlacementArea::new(10, 10).unwrap();
        let placer = GreedyPlacer::default_config();
        let result = placer.place_all(&[], &mut area).unwrap();

        assert_eq!(result.placed_count(), 0);
        assert_eq!(result.unplaced_count(), 0);
        assert!(result.completed_normally());
    }

    #[test]
    fn test_single_block_lands_in_corner() {
        let mut area = PlacementArea::new(10, 10).unwrap();
        let placer = GreedyPlacer::default_config();
        let blocks = vec![trestle("B1", 3, 2)];

        let result = placer.place_all(&blocks, &mut area).unwrap();
        assert_eq!(result.placements.len(), 1);
        assert_eq!(result.placements[0].anchor(), (7, 0));
        assert_eq!(result.placements[0].orientation, Orientation::Deg0);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut area = PlacementArea::new(10, 10).unwrap();
        let placer = GreedyPlacer::default_config();
        let blocks = vec![trestle("B1", 2, 2), trestle("B1", 3, 3)];

        assert!(matches!(
            placer.place_all(&blocks, &mut area),
            Err(Error::InvalidBlock(_))
        ));
    }

    #[test]
    fn test_descending_area_order() {
        let mut area = PlacementArea::new(20, 10).unwrap();
        let placer = GreedyPlacer::default_config();
        // Input order is small-first; the primary pass must flip it.
        let blocks = vec![trestle("small", 2, 2), trestle("big", 4, 4)];

        let result = placer.place_all(&blocks, &mut area).unwrap();
        assert_eq!(result.placements[0].block_id, "big");
        assert_eq!(result.placements[1].block_id, "small");
    }

    #[test]
    fn test_oversized_block_reported_unplaced() {
        let mut area = PlacementArea::new(10, 10).unwrap();
        let placer = GreedyPlacer::default_config();
        let blocks = vec![trestle("fits", 3, 3), trestle("wide", 11, 2)];

        let result = placer.place_all(&blocks, &mut area).unwrap();
        assert_eq!(result.placed_count(), 1);
        assert_eq!(result.unplaced, vec!["wide".to_string()]);
        // Counts always partition the input.
        assert_eq!(result.placed_count() + result.unplaced_count(), 2);
    }

    #[test]
    fn test_progress_callback_invoked() {
        use std::sync::atomic::AtomicUsize;

        let mut area = PlacementArea::new(20, 10).unwrap();
        let placer = GreedyPlacer::default_config();
        let blocks = vec![trestle("A", 3, 3), trestle("B", 3, 3)];

        let calls = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(AtomicBool::new(false));
        let calls_clone = Arc::clone(&calls);
        let finished_clone = Arc::clone(&finished);
        let callback: ProgressCallback = Box::new(move |info| {
            calls_clone.fetch_add(1, Ordering::Relaxed);
            if !info.running {
                finished_clone.store(true, Ordering::Relaxed);
            }
            assert!(info.blocks_placed <= info.total_blocks);
        });

        let result = placer
            .place_all_with_progress(&blocks, &mut area, callback)
            .unwrap();

        assert_eq!(result.placed_count(), 2);
        // Initial + per-placement + final.
        assert!(calls.load(Ordering::Relaxed) >= 4);
        assert!(finished.load(Ordering::Relaxed));
    }

    #[test]
    fn test_cancel_before_run_yields_partial_result() {
        let mut area = PlacementArea::new(20, 10).unwrap();
        let placer = GreedyPlacer::default_config();
        let blocks = vec![trestle("A", 3, 3)];

        // cancel() flags an ongoing run; a fresh run resets the flag first.
        placer.cancel();
        let result = placer.place_all(&blocks, &mut area).unwrap();
        assert_eq!(result.placed_count(), 1);
        assert!(!result.cancelled);
    }

    #[test]
    fn test_time_budget_zero_is_unlimited() {
        let mut area = PlacementArea::new(20, 10).unwrap();
        let placer = GreedyPlacer::new(PackConfig::new().with_time_limit(0));
        let blocks = vec![trestle("A", 3, 3), trestle("B", 3, 3)];

        let result = placer.place_all(&blocks, &mut area).unwrap();
        assert_eq!(result.placed_count(), 2);
        assert!(!result.time_budget_exceeded);
    }
}
