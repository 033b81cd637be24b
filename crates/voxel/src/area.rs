//! Mutable deck state: occupancy grid and placement bookkeeping.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use deckpack_core::{Error, Orientation, Result};

use crate::block::{BlockType, FootprintView, VoxelBlock};
use crate::constraints;
use crate::loader::DeckConfig;
use crate::spatial_index::SpatialIndex;

/// A block known to the area, placed or not.
///
/// Registry slots are stable for the lifetime of the area; grid cells refer
/// to blocks through the slot token, never through pointers.
#[derive(Debug, Clone)]
struct RegisteredBlock {
    block: Arc<VoxelBlock>,
    placement: Option<(i32, i32, Orientation)>,
}

/// The deck: a `width x height` cell grid with clearance bands, plus the set
/// of placed blocks in placement order.
///
/// Coordinates are deck-frame cells. The usable rectangle is
/// `[stern_clearance, width - bow_clearance) x [0, height)`; no footprint
/// cell of any placed block may leave it.
#[derive(Debug, Clone)]
pub struct PlacementArea {
    width: i32,
    height: i32,
    bow_clearance: i32,
    stern_clearance: i32,
    block_spacing: i32,
    ring_bow_clearance: i32,
    grid: Vec<Option<u32>>,
    registry: Vec<RegisteredBlock>,
    id_index: HashMap<String, u32>,
    order: Vec<u32>,
    index: SpatialIndex,
}

impl PlacementArea {
    /// Creates an empty deck of the given extent.
    pub fn new(width: i32, height: i32) -> Result<Self> {
        if width <= 0 || height <= 0 {
            return Err(Error::InvalidDeck(format!(
                "deck extent must be positive, got {}x{}",
                width, height
            )));
        }
        Ok(Self {
            width,
            height,
            bow_clearance: 0,
            stern_clearance: 0,
            block_spacing: 0,
            ring_bow_clearance: 0,
            grid: vec![None; (width as usize) * (height as usize)],
            registry: Vec::new(),
            id_index: HashMap::new(),
            order: Vec::new(),
            index: SpatialIndex::new(),
        })
    }

    /// Creates a deck from a parsed configuration.
    pub fn from_config(config: &DeckConfig) -> Result<Self> {
        let unit = config.grid_size.grid_unit;
        if unit <= 0.0 {
            return Err(Error::InvalidDeck(format!(
                "grid_unit must be positive, got {}",
                unit
            )));
        }
        let width = (config.grid_size.width / unit) as i32;
        let height = (config.grid_size.height / unit) as i32;
        Self::new(width, height)?
            .with_clearances(config.constraints.margin.bow, config.constraints.margin.stern)?
            .with_spacing(config.constraints.block_clearance)?
            .with_ring_bow_clearance(config.constraints.ring_bow_clearance)
    }

    /// Sets the bow and stern clearance bands.
    pub fn with_clearances(mut self, bow: i32, stern: i32) -> Result<Self> {
        if bow < 0 || stern < 0 {
            return Err(Error::InvalidDeck("clearances must be non-negative".into()));
        }
        if bow + stern >= self.width {
            return Err(Error::InvalidDeck(format!(
                "clearances {}+{} leave no usable width on a {}-cell deck",
                bow, stern, self.width
            )));
        }
        self.bow_clearance = bow;
        self.stern_clearance = stern;
        Ok(self)
    }

    /// Sets the minimum chessboard gap between placed blocks.
    pub fn with_spacing(mut self, spacing: i32) -> Result<Self> {
        if spacing < 0 {
            return Err(Error::InvalidDeck("block spacing must be non-negative".into()));
        }
        self.block_spacing = spacing;
        Ok(self)
    }

    /// Sets the crane-only bow-side exclusion.
    pub fn with_ring_bow_clearance(mut self, clearance: i32) -> Result<Self> {
        if clearance < 0 {
            return Err(Error::InvalidDeck(
                "ring bow clearance must be non-negative".into(),
            ));
        }
        self.ring_bow_clearance = clearance;
        Ok(self)
    }

    /// Deck width in cells.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Deck height in cells.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Bow-side reserved band, in cells.
    pub fn bow_clearance(&self) -> i32 {
        self.bow_clearance
    }

    /// Stern-side reserved band, in cells.
    pub fn stern_clearance(&self) -> i32 {
        self.stern_clearance
    }

    /// Minimum chessboard gap between placed blocks.
    pub fn block_spacing(&self) -> i32 {
        self.block_spacing
    }

    /// Crane-only bow-side exclusion.
    pub fn ring_bow_clearance(&self) -> i32 {
        self.ring_bow_clearance
    }

    /// First usable x column.
    pub fn usable_x_start(&self) -> i32 {
        self.stern_clearance
    }

    /// One past the last usable x column.
    pub fn usable_x_end(&self) -> i32 {
        self.width - self.bow_clearance
    }

    /// Number of usable cells (clearance bands excluded).
    pub fn usable_cells(&self) -> i64 {
        i64::from(self.usable_x_end() - self.usable_x_start()) * i64::from(self.height)
    }

    /// Number of placed blocks.
    pub fn placed_count(&self) -> usize {
        self.order.len()
    }

    /// Returns true if nothing is placed.
    pub fn is_deck_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Total footprint cells of all placed blocks.
    pub fn placed_area_cells(&self) -> usize {
        self.order
            .iter()
            .map(|&token| self.registry[token as usize].block.area())
            .sum()
    }

    /// Utilization of the usable deck area (0.0 - 1.0).
    pub fn utilization(&self) -> f64 {
        let usable = self.usable_cells();
        if usable == 0 {
            return 0.0;
        }
        self.placed_area_cells() as f64 / usable as f64
    }

    /// Id of the block occupying a cell, if any.
    pub fn block_at(&self, x: i32, y: i32) -> Option<&str> {
        if x < 0 || x >= self.width || y < 0 || y >= self.height {
            return None;
        }
        self.grid[self.cell_index(x, y)]
            .map(|token| self.registry[token as usize].block.id())
    }

    /// Anchor and orientation of a placed block.
    pub fn anchor_of(&self, id: &str) -> Option<(i32, i32, Orientation)> {
        let token = *self.id_index.get(id)?;
        self.registry[token as usize].placement
    }

    /// Placed blocks with their anchors, in placement order.
    pub fn iter_placed(
        &self,
    ) -> impl Iterator<Item = (&Arc<VoxelBlock>, (i32, i32), Orientation)> {
        self.order.iter().map(|&token| {
            let entry = &self.registry[token as usize];
            let (x, y, orientation) = entry
                .placement
                .expect("ordered block is always placed");
            (&entry.block, (x, y), orientation)
        })
    }

    /// Returns true iff placing the block at the anchor preserves every
    /// placement invariant.
    ///
    /// Checks, in order: bounds, occupancy, type rules (crane ring-bow,
    /// trestle corridors), then perimeter spacing. A block without a view
    /// for the requested orientation is never placeable.
    pub fn can_place(&self, block: &VoxelBlock, x: i32, y: i32, orientation: Orientation) -> bool {
        let Some(view) = block.view(orientation) else {
            return false;
        };

        // Bounds: the footprint bounding box is tight, so a box test covers
        // every cell.
        if x < self.usable_x_start()
            || x + view.width() > self.usable_x_end()
            || y < 0
            || y + view.height() > self.height
        {
            log::trace!("anchor ({}, {}) out of bounds for {}", x, y, block.id());
            return false;
        }

        for &(rx, ry) in view.cells() {
            if self.grid[self.cell_index(x + rx, y + ry)].is_some() {
                log::trace!(
                    "cell ({}, {}) occupied, rejecting {}",
                    x + rx,
                    y + ry,
                    block.id()
                );
                return false;
            }
        }

        if !constraints::type_rules_ok(self, block, view, x, y) {
            return false;
        }

        constraints::spacing_ok(self, view, x, y)
    }

    /// Commits a placement.
    ///
    /// Precondition: `can_place(block, x, y, orientation)` returned true.
    /// Bounds and occupancy are re-verified defensively; a violation means
    /// the precondition was broken and surfaces as [`Error::Internal`].
    pub fn place(
        &mut self,
        block: &Arc<VoxelBlock>,
        x: i32,
        y: i32,
        orientation: Orientation,
    ) -> Result<()> {
        if let Some(&token) = self.id_index.get(block.id()) {
            if self.registry[token as usize].placement.is_some() {
                return Err(Error::AlreadyPlaced(block.id().to_string()));
            }
        }
        let view = block
            .view(orientation)
            .ok_or_else(|| Error::InvalidOrientation(block.id().to_string()))?;

        if x < self.usable_x_start()
            || x + view.width() > self.usable_x_end()
            || y < 0
            || y + view.height() > self.height
        {
            return Err(Error::Internal(format!(
                "place() called with out-of-bounds anchor ({}, {}) for {}",
                x,
                y,
                block.id()
            )));
        }
        for &(rx, ry) in view.cells() {
            if self.grid[self.cell_index(x + rx, y + ry)].is_some() {
                return Err(Error::Internal(format!(
                    "place() called over an occupied cell for {}",
                    block.id()
                )));
            }
        }

        let token = match self.id_index.get(block.id()) {
            Some(&token) => token,
            None => {
                let token = self.registry.len() as u32;
                self.registry.push(RegisteredBlock {
                    block: Arc::clone(block),
                    placement: None,
                });
                self.id_index.insert(block.id().to_string(), token);
                token
            }
        };

        for &(rx, ry) in view.cells() {
            let idx = self.cell_index(x + rx, y + ry);
            self.grid[idx] = Some(token);
        }
        self.registry[token as usize].placement = Some((x, y, orientation));
        self.order.push(token);
        self.index.insert(token, view_aabb(view, x, y));
        Ok(())
    }

    /// Removes a placed block, clearing its grid cells.
    pub fn remove(&mut self, id: &str) -> Result<()> {
        let token = *self
            .id_index
            .get(id)
            .ok_or_else(|| Error::UnknownBlock(id.to_string()))?;
        let (x, y, orientation) = self.registry[token as usize]
            .placement
            .ok_or_else(|| Error::UnknownBlock(id.to_string()))?;
        let block = Arc::clone(&self.registry[token as usize].block);
        let view = block
            .view(orientation)
            .ok_or_else(|| Error::Internal(format!("placed block {} lost its view", id)))?;

        for &(rx, ry) in view.cells() {
            let idx = self.cell_index(x + rx, y + ry);
            self.grid[idx] = None;
        }
        self.registry[token as usize].placement = None;
        self.order.retain(|&t| t != token);
        self.index.remove(token, view_aabb(view, x, y));
        Ok(())
    }

    /// For each usable column containing at least one occupied cell, the
    /// smallest y strictly above the topmost occupied cell.
    ///
    /// Keys iterate in numeric order; candidate generation depends on that.
    pub fn column_tops(&self) -> BTreeMap<i32, i32> {
        let mut tops = BTreeMap::new();
        for (block, (x, y), orientation) in self.iter_placed() {
            let view = block
                .view(orientation)
                .expect("placed block has a view for its orientation");
            for &(rx, ry) in view.cells() {
                let column = x + rx;
                let top = y + ry + 1;
                tops.entry(column)
                    .and_modify(|t: &mut i32| *t = (*t).max(top))
                    .or_insert(top);
            }
        }
        tops
    }

    /// Verifies every placement invariant, returning [`Error::Internal`] on
    /// the first breach. Used defensively by tests and debug builds.
    pub fn check_invariants(&self) -> Result<()> {
        if let Err(err) = self.verify_invariants() {
            log::warn!("placement invariant violated: {}", err);
            return Err(err);
        }
        Ok(())
    }

    fn verify_invariants(&self) -> Result<()> {
        let mut expected_occupied = 0usize;
        let placed: Vec<_> = self.iter_placed().collect();

        for (block, (x, y), orientation) in &placed {
            let view = block
                .view(*orientation)
                .ok_or_else(|| Error::Internal(format!("{}: missing view", block.id())))?;
            expected_occupied += view.area();

            let token = self.id_index[block.id()];
            for &(rx, ry) in view.cells() {
                let (cx, cy) = (x + rx, y + ry);
                if cx < self.usable_x_start()
                    || cx >= self.usable_x_end()
                    || cy < 0
                    || cy >= self.height
                {
                    return Err(Error::Internal(format!(
                        "{}: cell ({}, {}) outside the usable rectangle",
                        block.id(),
                        cx,
                        cy
                    )));
                }
                if self.grid[self.cell_index(cx, cy)] != Some(token) {
                    return Err(Error::Internal(format!(
                        "{}: grid cell ({}, {}) does not reference the block",
                        block.id(),
                        cx,
                        cy
                    )));
                }
            }

            if block.is_crane() && !constraints::ring_bow_ok(self, view, *x) {
                return Err(Error::Internal(format!(
                    "{}: ring bow clearance violated",
                    block.id()
                )));
            }
            if block.block_type() == BlockType::Trestle {
                for cy in *y..*y + view.height() {
                    for cx in 0..*x {
                        if self.grid[self.cell_index(cx, cy)].is_some() {
                            return Err(Error::Internal(format!(
                                "{}: access corridor blocked at ({}, {})",
                                block.id(),
                                cx,
                                cy
                            )));
                        }
                    }
                }
            }
        }

        let occupied = self.grid.iter().filter(|cell| cell.is_some()).count();
        if occupied != expected_occupied {
            return Err(Error::Internal(format!(
                "grid holds {} occupied cells, placements account for {}",
                occupied, expected_occupied
            )));
        }

        for (i, (block_a, (ax, ay), oa)) in placed.iter().enumerate() {
            let view_a = block_a.view(*oa).expect("checked above");
            for (block_b, (bx, by), ob) in placed.iter().skip(i + 1) {
                let view_b = block_b.view(*ob).expect("checked above");
                let gap = constraints::perimeter_gap(view_a, (*ax, *ay), view_b, (*bx, *by));
                if gap < self.block_spacing {
                    return Err(Error::Internal(format!(
                        "{} and {} are {} cells apart, spacing requires {}",
                        block_a.id(),
                        block_b.id(),
                        gap,
                        self.block_spacing
                    )));
                }
            }
        }

        Ok(())
    }

    pub(crate) fn is_occupied(&self, x: i32, y: i32) -> bool {
        x >= 0
            && x < self.width
            && y >= 0
            && y < self.height
            && self.grid[self.cell_index(x, y)].is_some()
    }

    pub(crate) fn nearby_tokens(&self, aabb: [i32; 4], margin: i32) -> Vec<u32> {
        self.index.query_with_margin(aabb, margin)
    }

    pub(crate) fn placed_by_token(
        &self,
        token: u32,
    ) -> (&Arc<VoxelBlock>, (i32, i32), Orientation) {
        let entry = &self.registry[token as usize];
        let (x, y, orientation) = entry
            .placement
            .expect("indexed block is always placed");
        (&entry.block, (x, y), orientation)
    }

    fn cell_index(&self, x: i32, y: i32) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }
}

/// Inclusive cell bounding box of a view placed at an anchor.
pub(crate) fn view_aabb(view: &FootprintView, x: i32, y: i32) -> [i32; 4] {
    [x, y, x + view.width() - 1, y + view.height() - 1]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(id: &str, w: i32, h: i32) -> Arc<VoxelBlock> {
        Arc::new(VoxelBlock::rectangle(id, BlockType::Trestle, w, h).unwrap())
    }

    fn crane(id: &str, w: i32, h: i32) -> Arc<VoxelBlock> {
        Arc::new(VoxelBlock::rectangle(id, BlockType::Crane, w, h).unwrap())
    }

    #[test]
    fn test_construction_validation() {
        assert!(PlacementArea::new(0, 10).is_err());
        assert!(PlacementArea::new(10, -1).is_err());
        assert!(PlacementArea::new(10, 10)
            .unwrap()
            .with_clearances(6, 4)
            .is_err());
        assert!(PlacementArea::new(10, 10)
            .unwrap()
            .with_spacing(-1)
            .is_err());
    }

    #[test]
    fn test_place_and_remove_round_trip() {
        let mut area = PlacementArea::new(10, 10).unwrap();
        let b = block("B1", 3, 2);

        assert!(area.can_place(&b, 7, 0, Orientation::Deg0));
        area.place(&b, 7, 0, Orientation::Deg0).unwrap();

        assert_eq!(area.placed_count(), 1);
        assert_eq!(area.block_at(8, 1), Some("B1"));
        assert_eq!(area.anchor_of("B1"), Some((7, 0, Orientation::Deg0)));
        area.check_invariants().unwrap();

        area.remove("B1").unwrap();
        assert_eq!(area.placed_count(), 0);
        assert!(area.block_at(8, 1).is_none());
        assert!(area.grid.iter().all(|cell| cell.is_none()));
        assert!(area.can_place(&b, 7, 0, Orientation::Deg0));
    }

    #[test]
    fn test_place_twice_fails() {
        let mut area = PlacementArea::new(10, 10).unwrap();
        let b = block("B1", 2, 2);
        area.place(&b, 0, 0, Orientation::Deg0).unwrap();
        let err = area.place(&b, 5, 5, Orientation::Deg0).unwrap_err();
        assert!(matches!(err, Error::AlreadyPlaced(_)));
    }

    #[test]
    fn test_remove_unknown_fails() {
        let mut area = PlacementArea::new(10, 10).unwrap();
        assert!(matches!(
            area.remove("nope"),
            Err(Error::UnknownBlock(_))
        ));
    }

    #[test]
    fn test_bounds_respect_clearances() {
        let area = PlacementArea::new(10, 10)
            .unwrap()
            .with_clearances(2, 1)
            .unwrap();
        let b = block("B1", 3, 2);

        // Usable x range is [1, 8).
        assert!(!area.can_place(&b, 0, 0, Orientation::Deg0));
        assert!(area.can_place(&b, 1, 0, Orientation::Deg0));
        assert!(area.can_place(&b, 5, 0, Orientation::Deg0));
        assert!(!area.can_place(&b, 6, 0, Orientation::Deg0));
        assert!(!area.can_place(&b, 5, 9, Orientation::Deg0));
    }

    #[test]
    fn test_occupancy_rejected() {
        let mut area = PlacementArea::new(10, 10).unwrap();
        let a = crane("A", 3, 3);
        let b = crane("B", 3, 3);
        area.place(&a, 4, 4, Orientation::Deg0).unwrap();
        assert!(!area.can_place(&b, 6, 6, Orientation::Deg0));
        assert!(area.can_place(&b, 7, 4, Orientation::Deg0));
    }

    #[test]
    fn test_column_tops() {
        let mut area = PlacementArea::new(10, 10).unwrap();
        let a = crane("A", 3, 2);
        let b = crane("B", 2, 4);
        area.place(&a, 7, 0, Orientation::Deg0).unwrap();
        area.place(&b, 3, 0, Orientation::Deg0).unwrap();

        let tops = area.column_tops();
        assert_eq!(tops.get(&7), Some(&2));
        assert_eq!(tops.get(&8), Some(&2));
        assert_eq!(tops.get(&9), Some(&2));
        assert_eq!(tops.get(&3), Some(&4));
        assert_eq!(tops.get(&4), Some(&4));
        assert_eq!(tops.get(&5), None);

        // Numeric key order.
        let keys: Vec<i32> = tops.keys().copied().collect();
        assert_eq!(keys, vec![3, 4, 7, 8, 9]);
    }

    #[test]
    fn test_utilization() {
        use approx::assert_relative_eq;

        let mut area = PlacementArea::new(10, 10)
            .unwrap()
            .with_clearances(1, 1)
            .unwrap();
        let b = block("B1", 4, 4);
        area.place(&b, 2, 0, Orientation::Deg0).unwrap();
        // 16 cells over a usable 8x10 deck.
        assert_relative_eq!(area.utilization(), 16.0 / 80.0, epsilon = 1e-12);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut area = PlacementArea::new(10, 10).unwrap();
        let a = block("A", 2, 2);
        area.place(&a, 0, 0, Orientation::Deg0).unwrap();

        let mut copy = area.clone();
        copy.remove("A").unwrap();

        assert_eq!(area.placed_count(), 1);
        assert_eq!(copy.placed_count(), 0);
    }
}
