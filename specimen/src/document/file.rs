// Spec Files
// Spec file sources: files on disk and in-memory virtual files

use super::error::DocumentError;
use super::loader::load_documents;
use super::node::Node;
use crate::error::{SpecimenError, SpecimenResult};

use std::path::Path;

/// A named YAML source holding one or more spec documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecFile {
    /// Path or name used in locations and reports
    pub path: String,
    pub content: String,
}

impl SpecFile {
    /// Read a spec file from disk
    pub fn read_local(path: impl AsRef<Path>) -> SpecimenResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SpecimenError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.display().to_string(),
            content,
        })
    }

    /// A spec file that exists only in memory
    pub fn virtual_file(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Same as [`SpecFile::virtual_file`], with the common leading
    /// indentation removed so specs can be written inline in source code
    pub fn virtual_file_dedent(path: impl Into<String>, content: impl AsRef<str>) -> Self {
        Self::virtual_file(path, dedent(content.as_ref()))
    }

    /// Parse the content into one node tree per YAML document
    pub fn documents(&self) -> Result<Vec<Node>, DocumentError> {
        load_documents(&self.content)
    }

    /// Parse the content, tagging syntax errors with this file's path
    pub fn load(&self) -> SpecimenResult<Vec<Node>> {
        self.documents().map_err(|source| SpecimenError::Document {
            path: self.path.clone(),
            source,
        })
    }
}

/// Remove leading newlines and the common space indentation of all
/// non-blank lines. Tabs are content, not margin.
pub fn dedent(text: &str) -> String {
    let text = text.trim_start_matches('\n');
    let indent = |line: &str| line.len() - line.trim_start_matches(' ').len();

    let margin = text
        .split('\n')
        .filter(|line| line.chars().any(|c| c != ' '))
        .map(indent)
        .min()
        .unwrap_or(0);

    text.split('\n')
        .map(|line| &line[indent(line).min(margin)..])
        .collect::<Vec<_>>()
        .join("\n")
}
