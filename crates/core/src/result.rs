//! Placement result representation.

use crate::placement::{BlockId, Placement, PlacementStats};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Result of a full placement run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlacementResult {
    /// Placements in placement order.
    pub placements: Vec<Placement>,

    /// Ids of blocks that could not be placed.
    pub unplaced: Vec<BlockId>,

    /// Utilization of the usable deck area (0.0 - 1.0).
    pub utilization: f64,

    /// Computation time in milliseconds.
    pub computation_time_ms: u64,

    /// Number of blocks that were placed by the retry pass.
    pub retry_placed: usize,

    /// Whether the wall-clock budget cut the run short.
    pub time_budget_exceeded: bool,

    /// Whether the run was cancelled early.
    pub cancelled: bool,
}

impl PlacementResult {
    /// Creates a new empty result.
    pub fn new() -> Self {
        Self {
            placements: Vec::new(),
            unplaced: Vec::new(),
            utilization: 0.0,
            computation_time_ms: 0,
            retry_placed: 0,
            time_budget_exceeded: false,
            cancelled: false,
        }
    }

    /// Returns true if every input block was placed.
    pub fn all_placed(&self) -> bool {
        self.unplaced.is_empty()
    }

    /// Returns the number of placed blocks.
    pub fn placed_count(&self) -> usize {
        self.placements.len()
    }

    /// Returns the number of unplaced blocks.
    pub fn unplaced_count(&self) -> usize {
        self.unplaced.len()
    }

    /// Returns true if the run finished without cancellation or budget cut.
    pub fn completed_normally(&self) -> bool {
        !self.cancelled && !self.time_budget_exceeded
    }

    /// Returns utilization as a percentage string.
    pub fn utilization_percent(&self) -> String {
        format!("{:.1}%", self.utilization * 100.0)
    }

    /// Computes placement statistics.
    pub fn placement_stats(&self) -> PlacementStats {
        PlacementStats::from_placements(&self.placements)
    }
}

impl Default for PlacementResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Summary statistics for a placement result.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlacementSummary {
    /// Total blocks requested.
    pub total_requested: usize,
    /// Total blocks placed.
    pub total_placed: usize,
    /// Utilization percentage.
    pub utilization_percent: f64,
    /// Computation time in milliseconds.
    pub time_ms: u64,
    /// Whether the run completed normally.
    pub completed: bool,
}

impl From<&PlacementResult> for PlacementSummary {
    fn from(result: &PlacementResult) -> Self {
        Self {
            total_requested: result.placements.len() + result.unplaced.len(),
            total_placed: result.placements.len(),
            utilization_percent: result.utilization * 100.0,
            time_ms: result.computation_time_ms,
            completed: result.completed_normally(),
        }
    }
}
