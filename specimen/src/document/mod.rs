// Document Module
// Positioned YAML node trees and the spec files they are read from

mod error;
mod file;
mod loader;
mod node;

pub use error::DocumentError;
pub use file::{dedent, SpecFile};
pub use loader::load_documents;
pub use node::{Node, NodeData, Position, Scalar};
