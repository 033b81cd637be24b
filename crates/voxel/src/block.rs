//! Voxel block descriptors.

use std::collections::{BTreeMap, HashMap, HashSet};

use deckpack_core::{Error, Orientation, Result};
use serde::{Deserialize, Serialize};

/// Block type, deciding which placement rules apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    /// Lifted vertically by crane; subject to the ring-bow clearance.
    Crane,
    /// Rolled in horizontally by transporter; needs a stern-side corridor.
    Trestle,
}

impl BlockType {
    /// Maps a record label to a block type.
    ///
    /// Any label other than `"crane"` (including `"support"`) takes the
    /// trestle rules.
    pub fn from_label(label: &str) -> Self {
        match label {
            "crane" => Self::Crane,
            _ => Self::Trestle,
        }
    }
}

/// Vertical extent of a footprint cell, in grid layers.
///
/// Opaque to the placement engine; carried through for visualisation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeightRange {
    /// Lowest occupied layer.
    pub min_layer: f64,
    /// Highest occupied layer.
    pub max_layer: f64,
}

impl HeightRange {
    /// Creates a new height range.
    pub fn new(min_layer: f64, max_layer: f64) -> Self {
        Self {
            min_layer,
            max_layer,
        }
    }
}

/// A block footprint at a fixed orientation, with derived geometry.
///
/// Cells are normalised so that `min rx = min ry = 0`. The cell set need not
/// be rectangular or connected; the engine treats it purely as a set.
#[derive(Debug, Clone)]
pub struct FootprintView {
    cells: Vec<(i32, i32)>,
    cell_set: HashSet<(i32, i32)>,
    width: i32,
    height: i32,
    perimeter: Vec<(i32, i32)>,
    right_edge: Vec<(i32, i32)>,
    bottom_edge: Vec<(i32, i32)>,
    heights: HashMap<(i32, i32), HeightRange>,
}

impl FootprintView {
    /// Builds a view from raw cells, normalising to the origin.
    pub fn new(raw: Vec<((i32, i32), HeightRange)>) -> Result<Self> {
        if raw.is_empty() {
            return Err(Error::InvalidBlock("empty footprint".into()));
        }

        let min_x = raw.iter().map(|((x, _), _)| *x).min().unwrap_or(0);
        let min_y = raw.iter().map(|((_, y), _)| *y).min().unwrap_or(0);

        let mut cells = Vec::with_capacity(raw.len());
        let mut heights = HashMap::with_capacity(raw.len());
        for ((x, y), range) in raw {
            let cell = (x - min_x, y - min_y);
            if heights.insert(cell, range).is_some() {
                return Err(Error::InvalidBlock(format!(
                    "duplicate footprint cell ({}, {})",
                    x, y
                )));
            }
            cells.push(cell);
        }
        cells.sort_unstable();

        let cell_set: HashSet<(i32, i32)> = cells.iter().copied().collect();
        let width = cells.iter().map(|&(x, _)| x).max().unwrap_or(0) + 1;
        let height = cells.iter().map(|&(_, y)| y).max().unwrap_or(0) + 1;

        // A cell is on the perimeter when at least one 4-neighbour is
        // outside the footprint.
        let perimeter: Vec<(i32, i32)> = cells
            .iter()
            .copied()
            .filter(|&(x, y)| {
                [(x + 1, y), (x - 1, y), (x, y + 1), (x, y - 1)]
                    .iter()
                    .any(|n| !cell_set.contains(n))
            })
            .collect();

        let mut row_max: BTreeMap<i32, i32> = BTreeMap::new();
        let mut col_min: BTreeMap<i32, i32> = BTreeMap::new();
        for &(x, y) in &cells {
            row_max
                .entry(y)
                .and_modify(|mx| *mx = (*mx).max(x))
                .or_insert(x);
            col_min
                .entry(x)
                .and_modify(|my| *my = (*my).min(y))
                .or_insert(y);
        }
        let right_edge = row_max.into_iter().map(|(y, x)| (x, y)).collect();
        let bottom_edge = col_min.into_iter().collect();

        Ok(Self {
            cells,
            cell_set,
            width,
            height,
            perimeter,
            right_edge,
            bottom_edge,
            heights,
        })
    }

    /// Builds the 90°-clockwise rotated view.
    pub fn rotated_cw(&self) -> Self {
        let raw = self
            .cells
            .iter()
            .map(|&(x, y)| {
                let cell = (y, self.width - 1 - x);
                let range = self.heights[&(x, y)];
                (cell, range)
            })
            .collect();
        // Rotation of a valid view cannot fail validation.
        Self::new(raw).expect("rotated view of a valid footprint")
    }

    /// Bounding-box width in cells.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Bounding-box height in cells.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Number of footprint cells.
    pub fn area(&self) -> usize {
        self.cells.len()
    }

    /// All footprint cells, sorted lexicographically.
    pub fn cells(&self) -> &[(i32, i32)] {
        &self.cells
    }

    /// Returns true if the relative cell belongs to the footprint.
    pub fn contains(&self, cell: (i32, i32)) -> bool {
        self.cell_set.contains(&cell)
    }

    /// Perimeter cells (at least one 4-neighbour outside the footprint).
    pub fn perimeter(&self) -> &[(i32, i32)] {
        &self.perimeter
    }

    /// Rightmost cell of each occupied row, as `(rx, ry)` sorted by `ry`.
    pub fn right_edge(&self) -> &[(i32, i32)] {
        &self.right_edge
    }

    /// Bottommost cell of each occupied column, as `(rx, ry)` sorted by `rx`.
    pub fn bottom_edge(&self) -> &[(i32, i32)] {
        &self.bottom_edge
    }

    /// Height range of a footprint cell, if present.
    pub fn height_range(&self, cell: (i32, i32)) -> Option<&HeightRange> {
        self.heights.get(&cell)
    }
}

/// An immutable block descriptor: footprint cells, per-cell heights, type,
/// and derived geometry for each usable orientation.
#[derive(Debug, Clone)]
pub struct VoxelBlock {
    id: String,
    block_type: BlockType,
    resolution: f64,
    base: FootprintView,
    rotated: Option<FootprintView>,
}

impl VoxelBlock {
    /// Creates a block from raw footprint cells.
    ///
    /// Cells are normalised to the origin. Crane blocks also materialise
    /// their 90° view once, here; it is never recomputed during placement.
    pub fn new(
        id: impl Into<String>,
        block_type: BlockType,
        resolution: f64,
        raw: Vec<((i32, i32), HeightRange)>,
    ) -> Result<Self> {
        let base = FootprintView::new(raw)?;
        let rotated = match block_type {
            BlockType::Crane => Some(base.rotated_cw()),
            BlockType::Trestle => None,
        };
        Ok(Self {
            id: id.into(),
            block_type,
            resolution,
            base,
            rotated,
        })
    }

    /// Creates a solid rectangular block with unit heights.
    pub fn rectangle(
        id: impl Into<String>,
        block_type: BlockType,
        width: i32,
        height: i32,
    ) -> Result<Self> {
        if width <= 0 || height <= 0 {
            return Err(Error::InvalidBlock(
                "rectangle dimensions must be positive".into(),
            ));
        }
        let mut raw = Vec::with_capacity((width * height) as usize);
        for x in 0..width {
            for y in 0..height {
                raw.push(((x, y), HeightRange::new(0.0, 1.0)));
            }
        }
        Self::new(id, block_type, 1.0, raw)
    }

    /// Returns the block id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the block type.
    pub fn block_type(&self) -> BlockType {
        self.block_type
    }

    /// Returns true for crane-typed blocks.
    pub fn is_crane(&self) -> bool {
        self.block_type == BlockType::Crane
    }

    /// Metres per cell of the source voxelisation (informational).
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Number of footprint cells (orientation-independent).
    pub fn area(&self) -> usize {
        self.base.area()
    }

    /// The footprint view for an orientation, if the block supports it.
    pub fn view(&self, orientation: Orientation) -> Option<&FootprintView> {
        match orientation {
            Orientation::Deg0 => Some(&self.base),
            Orientation::Deg90 => self.rotated.as_ref(),
        }
    }

    /// Orientations this block can be placed at.
    pub fn orientations(&self) -> &'static [Orientation] {
        if self.rotated.is_some() {
            &[Orientation::Deg0, Orientation::Deg90]
        } else {
            &[Orientation::Deg0]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l_block() -> VoxelBlock {
        // ##
        // #.
        let raw = vec![
            ((0, 0), HeightRange::new(0.0, 2.0)),
            ((0, 1), HeightRange::new(0.0, 2.0)),
            ((1, 1), HeightRange::new(0.0, 1.0)),
        ];
        VoxelBlock::new("L1", BlockType::Trestle, 0.5, raw).unwrap()
    }

    #[test]
    fn test_block_type_from_label() {
        assert_eq!(BlockType::from_label("crane"), BlockType::Crane);
        assert_eq!(BlockType::from_label("trestle"), BlockType::Trestle);
        assert_eq!(BlockType::from_label("support"), BlockType::Trestle);
        assert_eq!(BlockType::from_label("unknown"), BlockType::Trestle);
    }

    #[test]
    fn test_empty_footprint_rejected() {
        let result = VoxelBlock::new("E", BlockType::Trestle, 1.0, vec![]);
        assert!(matches!(result, Err(Error::InvalidBlock(_))));
    }

    #[test]
    fn test_duplicate_cell_rejected() {
        let raw = vec![
            ((0, 0), HeightRange::new(0.0, 1.0)),
            ((0, 0), HeightRange::new(0.0, 2.0)),
        ];
        let result = VoxelBlock::new("D", BlockType::Trestle, 1.0, raw);
        assert!(matches!(result, Err(Error::InvalidBlock(_))));
    }

    #[test]
    fn test_normalisation() {
        let raw = vec![
            ((5, 7), HeightRange::new(0.0, 1.0)),
            ((6, 7), HeightRange::new(0.0, 1.0)),
        ];
        let block = VoxelBlock::new("N", BlockType::Trestle, 1.0, raw).unwrap();
        let view = block.view(Orientation::Deg0).unwrap();
        assert_eq!(view.cells(), &[(0, 0), (1, 0)]);
        assert_eq!(view.width(), 2);
        assert_eq!(view.height(), 1);
    }

    #[test]
    fn test_derived_geometry() {
        let block = l_block();
        let view = block.view(Orientation::Deg0).unwrap();

        assert_eq!(view.width(), 2);
        assert_eq!(view.height(), 2);
        assert_eq!(view.area(), 3);
        // Every cell of an L-tromino is on the perimeter.
        assert_eq!(view.perimeter().len(), 3);
        // Rows: y=0 -> max x 0, y=1 -> max x 1.
        assert_eq!(view.right_edge(), &[(0, 0), (1, 1)]);
        // Columns: x=0 -> min y 0, x=1 -> min y 1.
        assert_eq!(view.bottom_edge(), &[(0, 0), (1, 1)]);
        assert!(view.contains((0, 0)));
        assert!(!view.contains((1, 0)));
    }

    #[test]
    fn test_heights_pass_through() {
        let block = l_block();
        let view = block.view(Orientation::Deg0).unwrap();
        let range = view.height_range((0, 1)).unwrap();
        assert_eq!(range.max_layer, 2.0);
        assert!(view.height_range((1, 0)).is_none());
    }

    #[test]
    fn test_trestle_has_no_rotated_view() {
        let block = l_block();
        assert!(block.view(Orientation::Deg90).is_none());
        assert_eq!(block.orientations(), &[Orientation::Deg0]);
    }

    #[test]
    fn test_crane_rotated_view() {
        let block = VoxelBlock::rectangle("C", BlockType::Crane, 3, 2).unwrap();
        let rotated = block.view(Orientation::Deg90).unwrap();
        assert_eq!(rotated.width(), 2);
        assert_eq!(rotated.height(), 3);
        assert_eq!(rotated.area(), 6);
        assert_eq!(block.orientations().len(), 2);
    }

    #[test]
    fn test_rotation_preserves_heights() {
        let raw = vec![
            ((0, 0), HeightRange::new(0.0, 3.0)),
            ((1, 0), HeightRange::new(0.0, 1.0)),
        ];
        let block = VoxelBlock::new("C2", BlockType::Crane, 1.0, raw).unwrap();
        let rotated = block.view(Orientation::Deg90).unwrap();
        // (0,0) in a 2x1 row rotates to (0,1); (1,0) rotates to (0,0).
        assert_eq!(rotated.height_range((0, 1)).unwrap().max_layer, 3.0);
        assert_eq!(rotated.height_range((0, 0)).unwrap().max_layer, 1.0);
    }
}
