// Spec Tree
// Arena of spec nodes ("nodules") built from YAML documents

use super::error::Diagnostic;
use super::flag::Flag;
use crate::document::Position;
use crate::execution::BoxId;
use crate::value::Value;

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use std::ops::Index;
use std::sync::Arc;

/// Index of a nodule in its [`SpecTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoduleId(usize);

impl NoduleId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NoduleKind {
    /// Document root
    File,
    /// Node with a `content` list
    Node,
    /// Leaf candidate, without `content`
    Slab,
}

impl fmt::Display for NoduleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoduleKind::File => write!(f, "File"),
            NoduleKind::Node => write!(f, "Node"),
            NoduleKind::Slab => write!(f, "Slab"),
        }
    }
}

/// Source location of a nodule
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub file: Arc<str>,
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(file: Arc<str>, position: Position) -> Self {
        Self {
            file,
            line: position.line,
            column: position.column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// A node of the spec tree
#[derive(Debug, Clone, PartialEq)]
pub struct Nodule {
    pub kind: NoduleKind,
    pub location: Location,
    pub name: Option<String>,
    pub flag: Flag,
    pub children: Vec<NoduleId>,
    /// Test function, inherited from the closest ancestor declaring a `box`
    pub codebox: Option<BoxId>,
    /// Input merged down from every ancestor, closer scopes winning
    pub input: IndexMap<String, Value>,
    pub matrix: IndexMap<String, Vec<Value>>,
}

impl Nodule {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// `<kind> <name>(<location>)`, the prefix used by diagnostics
    pub fn label(&self) -> String {
        format!(
            "{} {}({})",
            self.kind,
            self.name.as_deref().unwrap_or(""),
            self.location
        )
    }
}

/// Nodule arena with one root per loaded document
#[derive(Debug, Clone, Default)]
pub struct SpecTree {
    nodules: Vec<Nodule>,
    roots: Vec<NoduleId>,
    diagnostics: Vec<Diagnostic>,
}

impl SpecTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: NoduleId) -> Option<&Nodule> {
        self.nodules.get(id.0)
    }

    pub fn roots(&self) -> &[NoduleId] {
        &self.roots
    }

    /// Warnings and dropped-subtree notices, in emission order
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.nodules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NoduleId, &Nodule)> + '_ {
        self.nodules
            .iter()
            .enumerate()
            .map(|(i, nodule)| (NoduleId(i), nodule))
    }

    /// Children of a nodule, in declaration order
    pub fn children(&self, id: NoduleId) -> impl Iterator<Item = (NoduleId, &Nodule)> + '_ {
        self[id].children.iter().map(move |&child| (child, &self[child]))
    }

    /// Depth-first pre-order walk of the leaves below `id`, skipping
    /// nothing; selection rules live in the focus resolver
    pub fn leaves(&self, id: NoduleId) -> Vec<NoduleId> {
        let mut leaves = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let nodule = &self[current];
            if nodule.is_leaf() {
                leaves.push(current);
            } else {
                stack.extend(nodule.children.iter().rev());
            }
        }
        leaves
    }

    pub(crate) fn push(&mut self, nodule: Nodule) -> NoduleId {
        self.nodules.push(nodule);
        NoduleId(self.nodules.len() - 1)
    }

    pub(crate) fn add_root(&mut self, id: NoduleId) {
        self.roots.push(id);
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.nodules.truncate(len);
    }

    pub(crate) fn report(&mut self, diagnostic: Diagnostic) {
        diagnostic.trace();
        self.diagnostics.push(diagnostic);
    }
}

impl Index<NoduleId> for SpecTree {
    type Output = Nodule;

    fn index(&self, id: NoduleId) -> &Nodule {
        &self.nodules[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodule(kind: NoduleKind, line: usize, children: Vec<NoduleId>) -> Nodule {
        Nodule {
            kind,
            location: Location::new(Arc::from("zoo.yaml"), Position::new(line, 1)),
            name: None,
            flag: Flag::None,
            children,
            codebox: None,
            input: IndexMap::new(),
            matrix: IndexMap::new(),
        }
    }

    #[test]
    fn test_location_display() {
        let location = Location::new(Arc::from("data/zoo.yaml"), Position::new(12, 5));
        assert_eq!(location.to_string(), "data/zoo.yaml:12:5");
    }

    #[test]
    fn test_label_with_and_without_name() {
        let mut slab = nodule(NoduleKind::Slab, 3, vec![]);
        assert_eq!(slab.label(), "Slab (zoo.yaml:3:1)");

        slab.name = Some("cat".to_string());
        assert_eq!(slab.label(), "Slab cat(zoo.yaml:3:1)");
    }

    #[test]
    fn test_arena_leaves_in_pre_order() {
        let mut tree = SpecTree::new();
        let a = tree.push(nodule(NoduleKind::Slab, 3, vec![]));
        let b = tree.push(nodule(NoduleKind::Slab, 5, vec![]));
        let inner = tree.push(nodule(NoduleKind::Node, 2, vec![a, b]));
        let c = tree.push(nodule(NoduleKind::Slab, 7, vec![]));
        let root = tree.push(nodule(NoduleKind::File, 1, vec![inner, c]));
        tree.add_root(root);

        assert_eq!(tree.leaves(root), vec![a, b, c]);
        assert_eq!(tree.children(root).count(), 2);
        assert!(tree[c].is_leaf());
        assert_eq!(tree.roots(), &[root]);
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn test_truncate_drops_trailing_records() {
        let mut tree = SpecTree::new();
        tree.push(nodule(NoduleKind::Slab, 1, vec![]));
        let mark = tree.len();
        tree.push(nodule(NoduleKind::Slab, 2, vec![]));
        tree.truncate(mark);
        assert_eq!(tree.len(), 1);
        assert!(tree.get(NoduleId(1)).is_none());
    }
}
