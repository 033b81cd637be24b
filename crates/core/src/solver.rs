//! Placer configuration and progress reporting.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Common configuration for the greedy placer.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PackConfig {
    /// Maximum computation time in milliseconds (0 = unlimited).
    pub time_limit_ms: u64,

    /// Candidate-anchor cap for the primary pass.
    pub max_candidates: usize,

    /// Upper bound on the candidate cap for the retry pass.
    /// The effective retry cap also scales with the number of placed blocks.
    pub retry_max_candidates: usize,

    /// Whether freshly placed blocks are compacted toward obstacles.
    pub compaction: bool,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            time_limit_ms: 60_000,
            max_candidates: 25,
            retry_max_candidates: 50,
            compaction: true,
        }
    }
}

impl PackConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the time limit in milliseconds (0 = unlimited).
    pub fn with_time_limit(mut self, ms: u64) -> Self {
        self.time_limit_ms = ms;
        self
    }

    /// Sets the primary-pass candidate cap.
    pub fn with_max_candidates(mut self, cap: usize) -> Self {
        self.max_candidates = cap;
        self
    }

    /// Sets the retry-pass candidate cap.
    pub fn with_retry_max_candidates(mut self, cap: usize) -> Self {
        self.retry_max_candidates = cap;
        self
    }

    /// Enables or disables post-placement compaction.
    pub fn with_compaction(mut self, enabled: bool) -> Self {
        self.compaction = enabled;
        self
    }
}

/// Progress callback for long-running placements.
pub type ProgressCallback = Box<dyn Fn(ProgressInfo) + Send + Sync>;

/// Progress information during a placement run.
#[derive(Debug, Clone, Default)]
pub struct ProgressInfo {
    /// Number of blocks placed so far.
    pub blocks_placed: usize,
    /// Total number of input blocks.
    pub total_blocks: usize,
    /// Current deck utilization (0.0 to 1.0).
    pub utilization: f64,
    /// Elapsed time in milliseconds.
    pub elapsed_ms: u64,
    /// Current phase description.
    pub phase: String,
    /// Whether the placer is still running.
    pub running: bool,
}

impl ProgressInfo {
    /// Creates a new progress info marked as running.
    pub fn new() -> Self {
        Self {
            running: true,
            ..Default::default()
        }
    }

    /// Sets the block counts.
    pub fn with_blocks(mut self, placed: usize, total: usize) -> Self {
        self.blocks_placed = placed;
        self.total_blocks = total;
        self
    }

    /// Sets the utilization.
    pub fn with_utilization(mut self, utilization: f64) -> Self {
        self.utilization = utilization;
        self
    }

    /// Sets the elapsed time.
    pub fn with_elapsed(mut self, elapsed_ms: u64) -> Self {
        self.elapsed_ms = elapsed_ms;
        self
    }

    /// Sets the phase description.
    pub fn with_phase(mut self, phase: impl Into<String>) -> Self {
        self.phase = phase.into();
        self
    }

    /// Marks the placer as finished.
    pub fn finished(mut self) -> Self {
        self.running = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = PackConfig::default();
        assert_eq!(config.max_candidates, 25);
        assert_eq!(config.retry_max_candidates, 50);
        assert!(config.compaction);
    }

    #[test]
    fn test_config_builder() {
        let config = PackConfig::new()
            .with_time_limit(5_000)
            .with_max_candidates(10)
            .with_compaction(false);
        assert_eq!(config.time_limit_ms, 5_000);
        assert_eq!(config.max_candidates, 10);
        assert!(!config.compaction);
    }

    #[test]
    fn test_progress_info_builder() {
        let info = ProgressInfo::new()
            .with_blocks(3, 10)
            .with_phase("Primary pass")
            .finished();
        assert_eq!(info.blocks_placed, 3);
        assert_eq!(info.total_blocks, 10);
        assert!(!info.running);
    }
}
