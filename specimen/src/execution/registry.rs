// Box Registry
// Named test functions ("boxes") that spec nodes refer to with `box:`

use super::context::ExecutionContext;
use super::fault::Fault;
use super::tile::Tile;

use std::collections::HashMap;
use std::fmt;

/// What a test function returns; `Err` ends the tile early
pub type BoxResult = Result<(), Fault>;

/// A registered test function
pub type BoxFunction = Box<dyn FnMut(&mut ExecutionContext, &Tile) -> BoxResult>;

/// Typed handle to a registered box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoxId(usize);

struct Codebox {
    name: String,
    function: BoxFunction,
}

/// Maps box names to test functions
#[derive(Default)]
pub struct BoxRegistry {
    boxes: Vec<Codebox>,
    index: HashMap<String, BoxId>,
}

impl BoxRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a test function. Registering a name again replaces the
    /// function and keeps its id.
    pub fn register<F>(&mut self, name: impl Into<String>, function: F) -> BoxId
    where
        F: FnMut(&mut ExecutionContext, &Tile) -> BoxResult + 'static,
    {
        self.insert(name.into(), Box::new(function))
    }

    /// Builder-style [`BoxRegistry::register`]
    pub fn with<F>(mut self, name: impl Into<String>, function: F) -> Self
    where
        F: FnMut(&mut ExecutionContext, &Tile) -> BoxResult + 'static,
    {
        self.register(name, function);
        self
    }

    fn insert(&mut self, name: String, function: BoxFunction) -> BoxId {
        if let Some(&id) = self.index.get(&name) {
            self.boxes[id.0].function = function;
            return id;
        }
        let id = BoxId(self.boxes.len());
        self.index.insert(name.clone(), id);
        self.boxes.push(Codebox { name, function });
        id
    }

    pub fn lookup(&self, name: &str) -> Option<BoxId> {
        self.index.get(name).copied()
    }

    pub fn name(&self, id: BoxId) -> Option<&str> {
        self.boxes.get(id.0).map(|codebox| codebox.name.as_str())
    }

    /// Registered names, in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.boxes.iter().map(|codebox| codebox.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub(crate) fn function_mut(&mut self, id: BoxId) -> Option<&mut BoxFunction> {
        self.boxes.get_mut(id.0).map(|codebox| &mut codebox.function)
    }
}

impl<S: Into<String>> FromIterator<(S, BoxFunction)> for BoxRegistry {
    fn from_iter<I: IntoIterator<Item = (S, BoxFunction)>>(iter: I) -> Self {
        let mut registry = Self::new();
        for (name, function) in iter {
            registry.insert(name.into(), function);
        }
        registry
    }
}

impl fmt::Debug for BoxRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
