// Spec Parser
// Validates YAML documents and builds the nodule arena, resolving boxes and inputs top-down

use super::error::{Diagnostic, SchemaError, SchemaErrorKind};
use super::flag::{read_flag, Flag};
use super::nodule::{Location, Nodule, NoduleId, NoduleKind, SpecTree};
use crate::document::{Node, SpecFile};
use crate::error::{SpecimenError, SpecimenResult};
use crate::execution::{BoxId, BoxRegistry, MatrixExpander};
use crate::value::Value;

use indexmap::IndexMap;
use std::sync::Arc;

/// Keys with a meaning in spec nodes; anything else draws a warning
pub const RESERVED_KEYS: [&str; 7] = ["flag", "name", "box", "input", "matrix", "content", "about"];

/// Binding every tile starts with, holding the path of its spec file
pub const FILEPATH_BINDING: &str = "filepath";

/// What a node inherits from its ancestors
#[derive(Clone, Copy)]
struct Scope<'a> {
    codebox: Option<BoxId>,
    input: &'a IndexMap<String, Value>,
}

/// Identity of the node being parsed, for diagnostics
struct Header {
    kind: NoduleKind,
    name: Option<String>,
    location: Location,
}

impl Header {
    fn error(&self, kind: SchemaErrorKind, message: impl Into<String>) -> SchemaError {
        SchemaError {
            kind,
            nodule_kind: self.kind,
            name: self.name.clone().unwrap_or_default(),
            location: self.location.clone(),
            message: message.into(),
        }
    }

    fn warning(&self, message: &str) -> Diagnostic {
        Diagnostic::warning(format!(
            "{} {}({}): {}",
            self.kind,
            self.name.as_deref().unwrap_or(""),
            self.location,
            message
        ))
    }
}

/// Builds a [`SpecTree`] from spec files, resolving box names against a registry
pub struct SpecParser<'r> {
    registry: &'r BoxRegistry,
    tree: SpecTree,
}

impl<'r> SpecParser<'r> {
    pub fn new(registry: &'r BoxRegistry) -> Self {
        Self {
            registry,
            tree: SpecTree::new(),
        }
    }

    /// Parse every document of a file. Errors drop the failing document with
    /// a notice; the other documents are kept. Returns the roots added.
    pub fn parse_file(&mut self, file: &SpecFile) -> Vec<NoduleId> {
        let documents = match file.load() {
            Ok(documents) => documents,
            Err(err) => {
                self.tree.report(Diagnostic::notice(format!(
                    "{} -- this file has been ignored",
                    err
                )));
                return Vec::new();
            }
        };

        let path: Arc<str> = Arc::from(file.path.as_str());
        let mut roots = Vec::new();
        for document in &documents {
            match self.parse_document(document, &path) {
                Ok(root) => roots.push(root),
                Err(err) => self.tree.report(Diagnostic::notice(format!(
                    "{} -- this file has been ignored",
                    err
                ))),
            }
        }

        tracing::debug!(
            file = %file.path,
            documents = documents.len(),
            roots = roots.len(),
            "parsed spec file"
        );
        roots
    }

    /// Parse every document of a file, failing on the first syntax or
    /// document-level schema error. Subtree errors below the root are still
    /// dropped with a notice.
    pub fn parse_file_strict(&mut self, file: &SpecFile) -> SpecimenResult<Vec<NoduleId>> {
        let documents = file.load()?;
        let path: Arc<str> = Arc::from(file.path.as_str());
        documents
            .iter()
            .map(|document| self.parse_document(document, &path).map_err(SpecimenError::from))
            .collect()
    }

    /// Parse one document into a File nodule and register it as a root
    pub fn parse_document(
        &mut self,
        document: &Node,
        file: &Arc<str>,
    ) -> Result<NoduleId, SchemaError> {
        let mut seed = IndexMap::new();
        seed.insert(FILEPATH_BINDING.to_string(), Value::String(file.to_string()));
        let scope = Scope {
            codebox: None,
            input: &seed,
        };
        let mark = self.tree.len();
        match self.build(document, file, true, scope) {
            Ok(root) => {
                self.tree.add_root(root);
                Ok(root)
            }
            Err(err) => {
                self.tree.truncate(mark);
                Err(err)
            }
        }
    }

    /// The tree built so far
    pub fn tree(&self) -> &SpecTree {
        &self.tree
    }

    pub fn finish(self) -> SpecTree {
        self.tree
    }

    fn build(
        &mut self,
        node: &Node,
        file: &Arc<str>,
        is_root: bool,
        scope: Scope<'_>,
    ) -> Result<NoduleId, SchemaError> {
        let location = Location::new(file.clone(), node.position);
        let mut header = Header {
            kind: if is_root { NoduleKind::File } else { NoduleKind::Slab },
            name: None,
            location,
        };

        let Some(entries) = node.as_mapping() else {
            return Err(header.error(
                SchemaErrorKind::NotAMapping,
                format!("expected a mapping, found a {}", node.kind_name()),
            ));
        };

        let content = node.get("content");
        if !is_root && content.is_some() {
            header.kind = NoduleKind::Node;
        }

        // A pending node keeps only a scalar name and is never validated further
        let name_node = node.get("name");
        header.name = name_node.and_then(Node::as_scalar).map(ToString::to_string);

        let flag = match node.get("flag") {
            Some(flag_node) => {
                let Some(text) = flag_node.as_str() else {
                    return Err(header.error(
                        SchemaErrorKind::InvalidFlag,
                        format!("the flag must be a string, found a {}", flag_node.kind_name()),
                    ));
                };
                let reading = read_flag(text);
                for warning in &reading.warnings {
                    self.tree.report(header.warning(warning));
                }
                reading.flag
            }
            None => Flag::None,
        };

        if flag == Flag::Skip {
            return Ok(self.tree.push(Nodule {
                kind: header.kind,
                location: header.location,
                name: header.name,
                flag,
                children: Vec::new(),
                codebox: None,
                input: IndexMap::new(),
                matrix: IndexMap::new(),
            }));
        }

        if let Some(name) = name_node.filter(|name| name.as_scalar().is_none()) {
            return Err(header.error(
                SchemaErrorKind::InvalidName,
                format!("the name must be a scalar, found a {}", name.kind_name()),
            ));
        }

        for (key, _) in entries {
            match key.as_str() {
                Some(key) if RESERVED_KEYS.contains(&key) => {}
                Some(key) => self.tree.report(
                    header.warning(&format!("Unknown key \"{}\". It has been ignored.", key)),
                ),
                None => self
                    .tree
                    .report(header.warning("Non-string key found. It has been ignored.")),
            }
        }

        let input_node = node.get("input");
        if content.is_none() && input_node.is_none() {
            return Err(header.error(
                SchemaErrorKind::MissingContentAndInput,
                "a node needs a `content` list or an `input` mapping",
            ));
        }

        let codebox = match node.get("box") {
            Some(box_node) => {
                let Some(box_name) = box_node.as_str() else {
                    return Err(header.error(
                        SchemaErrorKind::InvalidBox,
                        format!("the box must be a string, found a {}", box_node.kind_name()),
                    ));
                };
                match self.registry.lookup(box_name) {
                    Some(id) => Some(id),
                    None => {
                        return Err(header.error(
                            SchemaErrorKind::UnregisteredBox,
                            format!(
                                "no test function is registered under the name \"{}\"",
                                box_name
                            ),
                        ))
                    }
                }
            }
            None => scope.codebox,
        };

        let mut input = scope.input.clone();
        if let Some(input_node) = input_node {
            let Some(input_entries) = input_node.as_mapping() else {
                return Err(header.error(
                    SchemaErrorKind::InvalidInput,
                    format!("the input must be a mapping, found a {}", input_node.kind_name()),
                ));
            };
            for (key, value) in input_entries {
                let Some(key) = key.key_text() else {
                    return Err(header.error(
                        SchemaErrorKind::InvalidInput,
                        "input keys must be scalars",
                    ));
                };
                input.insert(key, Value::from_node(value));
            }
        }

        let matrix = match node.get("matrix") {
            Some(_) if content.is_some() => {
                return Err(header.error(
                    SchemaErrorKind::MatrixOnNode,
                    "a matrix is only allowed on a node without `content`",
                ))
            }
            Some(matrix_node) => read_matrix(matrix_node, &header)?,
            None => IndexMap::new(),
        };

        let children = match content {
            Some(content_node) => {
                let Some(items) = content_node.as_sequence() else {
                    return Err(header.error(
                        SchemaErrorKind::InvalidContent,
                        format!(
                            "the content must be a sequence, found a {}",
                            content_node.kind_name()
                        ),
                    ));
                };
                let child_scope = Scope { codebox, input: &input };
                let mut children = Vec::new();
                for item in items {
                    let mark = self.tree.len();
                    match self.build(item, file, false, child_scope) {
                        Ok(child) => children.push(child),
                        Err(err) => {
                            self.tree.truncate(mark);
                            self.tree.report(Diagnostic::notice(err.dropped_notice()));
                        }
                    }
                }
                if children.is_empty() {
                    return Err(header.error(
                        SchemaErrorKind::NoValidChildren,
                        "the content has no valid child",
                    ));
                }
                children
            }
            None => {
                if codebox.is_none() {
                    return Err(header.error(
                        SchemaErrorKind::MissingBox,
                        "no box is declared on this node or any of its ancestors",
                    ));
                }
                Vec::new()
            }
        };

        Ok(self.tree.push(Nodule {
            kind: header.kind,
            location: header.location,
            name: header.name,
            flag,
            children,
            codebox,
            input,
            matrix,
        }))
    }
}

fn read_matrix(node: &Node, header: &Header) -> Result<IndexMap<String, Vec<Value>>, SchemaError> {
    let Some(entries) = node.as_mapping() else {
        return Err(header.error(
            SchemaErrorKind::InvalidMatrix,
            format!("the matrix must be a mapping, found a {}", node.kind_name()),
        ));
    };

    let mut matrix = IndexMap::new();
    for (key, values) in entries {
        let Some(axis) = key.key_text() else {
            return Err(header.error(
                SchemaErrorKind::InvalidMatrix,
                "matrix axis names must be scalars",
            ));
        };
        let Some(items) = values.as_sequence() else {
            return Err(header.error(
                SchemaErrorKind::InvalidMatrix,
                format!("the values of matrix axis \"{}\" must be a sequence", axis),
            ));
        };
        let mut candidates = Vec::with_capacity(items.len());
        for item in items {
            let Some(scalar) = item.as_scalar() else {
                return Err(header.error(
                    SchemaErrorKind::InvalidMatrix,
                    format!(
                        "matrix axis \"{}\" contains a {}, only scalars are allowed",
                        axis,
                        item.kind_name()
                    ),
                ));
            };
            candidates.push(Value::from(scalar));
        }
        matrix.insert(axis, candidates);
    }

    if MatrixExpander::combination_count(&matrix).is_none() {
        return Err(header.error(
            SchemaErrorKind::InvalidMatrix,
            "the matrix has too many combinations to count",
        ));
    }
    Ok(matrix)
}
