// Tiles
// One resolved set of named bindings handed to a test function

use crate::value::Value;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Error reading a binding from a tile
#[derive(Debug, Error)]
pub enum BindingError {
    #[error("no binding named \"{0}\" in this tile")]
    Missing(String),

    #[error("binding \"{name}\" has type {found}, expected {expected}")]
    WrongType {
        name: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("binding \"{name}\" could not be decoded: {source}")]
    Decode {
        name: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Inputs of one test function call: the leaf's merged input with one
/// matrix combination laid over it
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    /// Position of this tile within its leaf
    pub index: usize,
    pub bindings: IndexMap<String, Value>,
}

impl Tile {
    pub fn new(index: usize, bindings: IndexMap<String, Value>) -> Self {
        Self { index, bindings }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    fn require(&self, name: &str) -> Result<&Value, BindingError> {
        self.get(name)
            .ok_or_else(|| BindingError::Missing(name.to_string()))
    }

    fn wrong_type(name: &str, expected: &'static str, found: &Value) -> BindingError {
        BindingError::WrongType {
            name: name.to_string(),
            expected,
            found: found.type_name(),
        }
    }

    pub fn str(&self, name: &str) -> Result<&str, BindingError> {
        let value = self.require(name)?;
        value
            .as_str()
            .ok_or_else(|| Self::wrong_type(name, "string", value))
    }

    pub fn int(&self, name: &str) -> Result<i64, BindingError> {
        let value = self.require(name)?;
        value
            .as_i64()
            .ok_or_else(|| Self::wrong_type(name, "int", value))
    }

    /// Floats; integers are widened
    pub fn float(&self, name: &str) -> Result<f64, BindingError> {
        let value = self.require(name)?;
        value
            .as_f64()
            .ok_or_else(|| Self::wrong_type(name, "float", value))
    }

    pub fn bool(&self, name: &str) -> Result<bool, BindingError> {
        let value = self.require(name)?;
        value
            .as_bool()
            .ok_or_else(|| Self::wrong_type(name, "bool", value))
    }

    /// Decode a binding into any deserializable type
    pub fn deserialize<T: DeserializeOwned>(&self, name: &str) -> Result<T, BindingError> {
        let value = self.require(name)?;
        serde_yaml::from_value(value.to_yaml()).map_err(|source| BindingError::Decode {
            name: name.to_string(),
            source,
        })
    }
}
