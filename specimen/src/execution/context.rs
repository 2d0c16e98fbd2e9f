// Execution Context
// Per-tile status and fail info, plus the counters and failure report of a whole run

use super::fault::{Fault, PanicReport};
use super::registry::BoxResult;
use crate::reporting::TileRecord;
use crate::spec::Location;

use serde::Serialize;
use std::fmt::Debug;

// =============================================================================
// Tile Status
// =============================================================================

/// Outcome of one tile
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum TileStatus {
    /// Nothing went wrong
    #[default]
    Pristine,
    /// `fail` or a mismatching `expect_equal`
    Failed,
    /// `abort`
    Aborted,
    /// The function returned an error or panicked
    Raised,
}

impl TileStatus {
    /// Word used in report lines
    pub fn word(&self) -> &'static str {
        match self {
            TileStatus::Pristine => "PASS",
            TileStatus::Failed => "FAIL",
            TileStatus::Aborted => "ABORT",
            TileStatus::Raised => "RAISE",
        }
    }
}

/// Tile counters of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TileStats {
    pub tile_count: usize,
    pub tile_passed: usize,
    pub tile_failed: usize,
    pub tile_aborted: usize,
    pub tile_raised: usize,
}

// =============================================================================
// Execution Context
// =============================================================================

/// Handed to every test function call. Records failures for the current
/// tile; the harness resets it between tiles and keeps the run totals.
#[derive(Debug, Default)]
pub struct ExecutionContext {
    status: TileStatus,
    fail_info: Vec<String>,
    stats: TileStats,
    failure_report: Vec<String>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Status of the current tile
    pub fn status(&self) -> TileStatus {
        self.status
    }

    /// Messages recorded for the current tile
    pub fn fail_info(&self) -> &[String] {
        &self.fail_info
    }

    pub fn stats(&self) -> TileStats {
        self.stats
    }

    /// One line per tile that did not pass, in run order
    pub fn failure_report(&self) -> &[String] {
        &self.failure_report
    }

    /// Mark the tile as failed and keep going. Ignored once the tile is aborted.
    pub fn fail(&mut self, info: impl Into<String>) {
        if self.status == TileStatus::Aborted {
            return;
        }
        self.status = TileStatus::Failed;
        self.record(info.into());
    }

    /// Fail the tile when `value != wanted`; returns whether they matched
    pub fn expect_equal<A, B>(&mut self, value: A, wanted: B, context: &str) -> bool
    where
        A: PartialEq<B> + Debug,
        B: Debug,
    {
        if value == wanted {
            return true;
        }
        let message = if context.is_empty() {
            format!("{:?} != {:?}", value, wanted)
        } else {
            format!("({}): {:?} != {:?}", context, value, wanted)
        };
        self.fail(message);
        false
    }

    /// Mark the tile as aborted. Return the result from the test function
    /// to stop it:
    ///
    /// ```ignore
    /// if tile.str("animal")? == "unicorn" {
    ///     return ctx.abort("unicorns are out of scope");
    /// }
    /// ```
    pub fn abort(&mut self, info: impl Into<String>) -> BoxResult {
        if self.status != TileStatus::Aborted {
            self.status = TileStatus::Aborted;
            self.record(info.into());
        }
        Err(Fault::abort())
    }

    fn record(&mut self, info: String) {
        if !info.is_empty() {
            self.fail_info.push(info);
        }
    }

    pub(crate) fn begin_tile(&mut self) {
        self.status = TileStatus::Pristine;
        self.fail_info.clear();
    }

    /// Classify what the test function did. An abort always wins.
    pub(crate) fn settle(&mut self, outcome: Result<BoxResult, PanicReport>) {
        if self.status == TileStatus::Aborted {
            return;
        }
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(fault)) if fault.is_abort() => self.status = TileStatus::Aborted,
            Ok(Err(fault)) => self.raise(fault.describe()),
            Err(panic) => self.raise(panic.describe()),
        }
    }

    fn raise(&mut self, info: String) {
        self.status = TileStatus::Raised;
        self.fail_info.push(info);
    }

    /// Count the tile and append its report line if it did not pass
    pub(crate) fn end_tile(&mut self, location: &Location, index: usize) -> TileRecord {
        self.stats.tile_count += 1;
        match self.status {
            TileStatus::Pristine => self.stats.tile_passed += 1,
            TileStatus::Failed => self.stats.tile_failed += 1,
            TileStatus::Aborted => self.stats.tile_aborted += 1,
            TileStatus::Raised => self.stats.tile_raised += 1,
        }

        if self.status != TileStatus::Pristine {
            self.failure_report.push(format!(
                "{}[{}][{}]: {}",
                self.status.word(),
                location,
                index,
                self.fail_info.join("; ")
            ));
        }

        TileRecord {
            location: location.to_string(),
            index,
            status: self.status,
            info: self.fail_info.clone(),
        }
    }
}
