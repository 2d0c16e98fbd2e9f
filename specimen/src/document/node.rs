// Document Nodes
// Generic YAML node tree where every node carries its source position

use std::fmt;

/// Source position of a node, both coordinates 1-based
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A resolved scalar value
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl Scalar {
    /// Resolve an untagged plain scalar using the YAML core schema
    pub fn resolve_plain(text: &str) -> Self {
        match text {
            "" | "~" | "null" | "Null" | "NULL" => return Scalar::Null,
            "true" | "True" | "TRUE" => return Scalar::Bool(true),
            "false" | "False" | "FALSE" => return Scalar::Bool(false),
            _ => {}
        }
        if let Some(value) = parse_int(text) {
            return Scalar::Int(value);
        }
        if let Some(value) = parse_float(text) {
            return Scalar::Float(value);
        }
        Scalar::String(text.to_string())
    }

    /// Resolve a scalar carrying a `!!` tag; falls back to a string when
    /// the text does not fit the tag
    pub fn resolve_tagged(text: &str, tag: &str) -> Self {
        let resolved = match tag {
            "str" => Some(Scalar::String(text.to_string())),
            "null" => matches!(text, "" | "~" | "null" | "Null" | "NULL").then_some(Scalar::Null),
            "bool" => match text {
                "true" | "True" | "TRUE" => Some(Scalar::Bool(true)),
                "false" | "False" | "FALSE" => Some(Scalar::Bool(false)),
                _ => None,
            },
            "int" => parse_int(text).map(Scalar::Int),
            "float" => parse_float(text)
                .or_else(|| parse_int(text).map(|v| v as f64))
                .map(Scalar::Float),
            _ => None,
        };
        resolved.unwrap_or_else(|| Scalar::String(text.to_string()))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::Null => "null",
            Scalar::Bool(_) => "bool",
            Scalar::Int(_) => "int",
            Scalar::Float(_) => "float",
            Scalar::String(_) => "string",
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => write!(f, "null"),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::String(s) => write!(f, "{}", s),
        }
    }
}

fn parse_int(text: &str) -> Option<i64> {
    if let Some(hex) = text.strip_prefix("0x") {
        return i64::from_str_radix(hex, 16).ok();
    }
    if let Some(oct) = text.strip_prefix("0o") {
        return i64::from_str_radix(oct, 8).ok();
    }
    let digits = text.strip_prefix('+').unwrap_or(text);
    if digits.starts_with(['+', '-']) && digits.len() != text.len() {
        return None;
    }
    digits.parse().ok()
}

fn parse_float(text: &str) -> Option<f64> {
    match text {
        ".inf" | ".Inf" | ".INF" | "+.inf" | "+.Inf" | "+.INF" => Some(f64::INFINITY),
        "-.inf" | "-.Inf" | "-.INF" => Some(f64::NEG_INFINITY),
        ".nan" | ".NaN" | ".NAN" => Some(f64::NAN),
        // "inf" and "nan" spelled without a dot are strings in YAML
        _ if text.chars().any(|c| c.is_ascii_digit()) => text.parse().ok(),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Mapping(Vec<(Node, Node)>),
    Sequence(Vec<Node>),
    Scalar(Scalar),
}

/// A YAML node with the position where it starts
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub data: NodeData,
    pub position: Position,
}

impl Node {
    pub fn new(data: NodeData, position: Position) -> Self {
        Self { data, position }
    }

    pub fn scalar(scalar: Scalar, position: Position) -> Self {
        Self::new(NodeData::Scalar(scalar), position)
    }

    pub fn as_mapping(&self) -> Option<&[(Node, Node)]> {
        match &self.data {
            NodeData::Mapping(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Node]> {
        match &self.data {
            NodeData::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match &self.data {
            NodeData::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    /// String content, only for string scalars
    pub fn as_str(&self) -> Option<&str> {
        match &self.data {
            NodeData::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Text of a scalar node usable as a mapping key
    pub fn key_text(&self) -> Option<String> {
        self.as_scalar().map(|scalar| scalar.to_string())
    }

    /// Look up the value of a mapping entry by key; the first match wins
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_mapping()?
            .iter()
            .find(|(k, _)| k.as_str() == Some(key))
            .map(|(_, v)| v)
    }

    pub fn kind_name(&self) -> &'static str {
        match &self.data {
            NodeData::Mapping(_) => "mapping",
            NodeData::Sequence(_) => "sequence",
            NodeData::Scalar(_) => "scalar",
        }
    }
}
