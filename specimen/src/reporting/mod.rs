// Reporting Module
// Run summaries and their terminal, TAP, JUnit and JSON renderings

mod reporter;
mod summary;

pub use reporter::{ReportFormat, Reporter};
pub use summary::{Outcome, RunSummary, TileRecord};
