// Specimen Library
// Data-driven test specifications: YAML spec trees, focus/pending selection and matrix tiles

pub mod document;
pub mod error;
pub mod execution;
pub mod reporting;
pub mod selection;
pub mod spec;
pub mod value;

// Re-export commonly used types
pub use error::{SpecimenError, SpecimenResult};

// Re-export document types
pub use document::{dedent, DocumentError, Node, NodeData, Position, Scalar, SpecFile};

// Re-export spec tree types
pub use spec::{
    Diagnostic, Flag, Location, Nodule, NoduleId, NoduleKind, SchemaError, SchemaErrorKind,
    SpecParser, SpecTree,
};

// Re-export selection types
pub use selection::{FlagStat, FocusResolver, Selection};

// Re-export execution types
pub use execution::{
    BindingError, BoxFunction, BoxId, BoxRegistry, BoxResult, ExecutionContext, Fault, Harness,
    HarnessConfig, MatrixExpander, Tile, TileIter, TileStats, TileStatus,
};

// Re-export reporting types
pub use reporting::{Outcome, ReportFormat, Reporter, RunSummary, TileRecord};

pub use value::Value;

/// Build a runnable harness from spec files and the test functions they name.
///
/// Parsing happens here; warnings and dropped-subtree notices are kept on the
/// harness and written to the report sink when it runs.
pub fn register(files: Vec<SpecFile>, registry: BoxRegistry) -> Harness {
    Harness::new(files, registry)
}
