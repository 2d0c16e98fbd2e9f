// Selection Module
// FOCUS/PENDING resolution over the spec tree

mod focus;

pub use focus::{FlagStat, FocusResolver, Selection};
