// Spec Module
// Spec tree model and the parser that builds it from YAML documents

mod error;
mod flag;
mod nodule;
mod parser;

pub use error::{Diagnostic, SchemaError, SchemaErrorKind, Severity};
pub use flag::{read_flag, Flag, FlagReading};
pub use nodule::{Location, Nodule, NoduleId, NoduleKind, SpecTree};
pub use parser::{SpecParser, RESERVED_KEYS};
