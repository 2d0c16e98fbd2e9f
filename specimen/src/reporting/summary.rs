// Run Summary
// Results of a harness run

use crate::execution::{TileStats, TileStatus};
use crate::selection::FlagStat;

use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Overall classification of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Success,
    Failure,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success => write!(f, "SUCCESS"),
            Outcome::Failure => write!(f, "FAILURE"),
        }
    }
}

/// Result of one tile
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TileRecord {
    /// Location of the leaf the tile came from
    pub location: String,
    /// Index of the tile within its leaf
    pub index: usize,
    pub status: TileStatus,
    /// Failure messages, empty for a passing tile
    pub info: Vec<String>,
}

impl TileRecord {
    /// `<location>[<index>]`, the name of the tile in reports
    pub fn name(&self) -> String {
        format!("{}[{}]", self.location, self.index)
    }

    pub fn passed(&self) -> bool {
        self.status == TileStatus::Pristine
    }
}

/// Everything a run produced
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub suite_name: String,
    #[serde(flatten)]
    pub stats: TileStats,
    #[serde(flatten)]
    pub flags: FlagStat,
    /// One line per tile that did not pass, in run order
    pub failure_report: Vec<String>,
    /// Every tile, in run order
    pub tiles: Vec<TileRecord>,
    pub duration_ms: u64,
    pub outcome: Outcome,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Final line of the terminal report
    pub fn status_line(&self) -> String {
        format!(
            "{} -- {} Passed | {} Failed | {} Aborted | {} Raised",
            self.outcome,
            self.stats.tile_passed,
            self.stats.tile_failed,
            self.stats.tile_aborted,
            self.stats.tile_raised
        )
    }
}
