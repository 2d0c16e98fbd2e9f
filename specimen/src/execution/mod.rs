// Execution Module
// Test function registry, matrix expansion, per-tile context and the run harness

pub mod context;
pub mod fault;
pub mod harness;
pub mod matrix;
pub mod registry;
pub mod tile;

// Re-export key types
pub use context::{ExecutionContext, TileStats, TileStatus};
pub use fault::Fault;
pub use harness::{Harness, HarnessConfig};
pub use matrix::{MatrixExpander, TileIter};
pub use registry::{BoxFunction, BoxId, BoxRegistry, BoxResult};
pub use tile::{BindingError, Tile};
