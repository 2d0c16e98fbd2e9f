// Document Loader
// Builds positioned node trees from the yaml-rust event stream

use super::error::DocumentError;
use super::node::{Node, NodeData, Position, Scalar};

use std::collections::HashMap;
use yaml_rust::parser::{Event, MarkedEventReceiver, Parser};
use yaml_rust::scanner::{Marker, ScanError, TScalarStyle, TokenType};

/// Read every document of a YAML stream, in order
pub fn load_documents(source: &str) -> Result<Vec<Node>, DocumentError> {
    let mut builder = TreeBuilder::default();
    let mut parser = Parser::new(source.chars());
    parser
        .load(&mut builder, true)
        .map_err(|err| scan_error(&err, source))?;
    Ok(builder.documents)
}

fn scan_error(err: &ScanError, source: &str) -> DocumentError {
    let marker = err.marker();
    let text = err.to_string();
    let message = match text.rsplit_once(" at line ") {
        Some((message, _)) => message.to_string(),
        None => text,
    };
    DocumentError::new(message, marker.line(), marker.col() + 1).with_source_context(source, 2)
}

fn position(mark: &Marker) -> Position {
    Position::new(mark.line(), mark.col() + 1)
}

enum Frame {
    Sequence {
        items: Vec<Node>,
        position: Position,
        anchor: usize,
    },
    Mapping {
        entries: Vec<(Node, Node)>,
        key: Option<Node>,
        position: Position,
        anchor: usize,
    },
}

#[derive(Default)]
struct TreeBuilder {
    documents: Vec<Node>,
    stack: Vec<Frame>,
    root: Option<Node>,
    anchors: HashMap<usize, Node>,
}

impl TreeBuilder {
    fn insert(&mut self, node: Node) {
        match self.stack.last_mut() {
            None => self.root = Some(node),
            Some(Frame::Sequence { items, .. }) => items.push(node),
            Some(Frame::Mapping { entries, key, .. }) => match key.take() {
                Some(k) => entries.push((k, node)),
                None => *key = Some(node),
            },
        }
    }

    fn finish(&mut self, node: Node, anchor: usize) {
        if anchor > 0 {
            self.anchors.insert(anchor, node.clone());
        }
        self.insert(node);
    }
}

impl MarkedEventReceiver for TreeBuilder {
    fn on_event(&mut self, event: Event, mark: Marker) {
        match event {
            Event::DocumentEnd => {
                let root = self
                    .root
                    .take()
                    .unwrap_or_else(|| Node::scalar(Scalar::Null, position(&mark)));
                self.documents.push(root);
            }
            Event::SequenceStart(anchor) => self.stack.push(Frame::Sequence {
                items: Vec::new(),
                position: position(&mark),
                anchor,
            }),
            Event::MappingStart(anchor) => self.stack.push(Frame::Mapping {
                entries: Vec::new(),
                key: None,
                position: position(&mark),
                anchor,
            }),
            Event::SequenceEnd | Event::MappingEnd => match self.stack.pop() {
                Some(Frame::Sequence {
                    items,
                    position,
                    anchor,
                }) => self.finish(Node::new(NodeData::Sequence(items), position), anchor),
                Some(Frame::Mapping {
                    entries,
                    position,
                    anchor,
                    ..
                }) => self.finish(Node::new(NodeData::Mapping(entries), position), anchor),
                None => {}
            },
            Event::Scalar(text, style, anchor, tag) => {
                let scalar = match (&tag, style) {
                    (Some(TokenType::Tag(handle, suffix)), _) if handle == "!!" => {
                        Scalar::resolve_tagged(&text, suffix)
                    }
                    (_, TScalarStyle::Plain) => Scalar::resolve_plain(&text),
                    _ => Scalar::String(text),
                };
                self.finish(Node::scalar(scalar, position(&mark)), anchor);
            }
            Event::Alias(anchor) => {
                let node = match self.anchors.get(&anchor) {
                    Some(target) => Node {
                        data: target.data.clone(),
                        position: position(&mark),
                    },
                    None => Node::scalar(Scalar::Null, position(&mark)),
                };
                self.insert(node);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_positions() {
        let source = "box: zoo\ncontent:\n  - input:\n      animal: cat\n";
        let docs = load_documents(source).unwrap();
        assert_eq!(docs.len(), 1);

        let root = &docs[0];
        assert_eq!(root.position, Position::new(1, 1));

        let content = root.get("content").unwrap().as_sequence().unwrap();
        assert_eq!(content[0].position, Position::new(3, 5));

        let animal = content[0].get("input").unwrap().get("animal").unwrap();
        assert_eq!(animal.as_str(), Some("cat"));
        assert_eq!(animal.position, Position::new(4, 15));
    }

    #[test]
    fn test_scalar_styles() {
        let source = "a: 12\nb: \"12\"\nc: !!str 12\nd: !!float 3\ne:\nf: 'yes'\n";
        let docs = load_documents(source).unwrap();
        let root = &docs[0];

        let scalar = |key: &str| root.get(key).unwrap().as_scalar().unwrap().clone();
        assert_eq!(scalar("a"), Scalar::Int(12));
        assert_eq!(scalar("b"), Scalar::String("12".into()));
        assert_eq!(scalar("c"), Scalar::String("12".into()));
        assert_eq!(scalar("d"), Scalar::Float(3.0));
        assert_eq!(scalar("e"), Scalar::Null);
        assert_eq!(scalar("f"), Scalar::String("yes".into()));
    }

    #[test]
    fn test_multiple_documents() {
        let source = "box: a\ninput: {}\n---\nbox: b\ninput: {}\n";
        let docs = load_documents(source).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1].get("box").and_then(Node::as_str), Some("b"));
        assert_eq!(docs[1].position.line, 4);
    }

    #[test]
    fn test_alias_resolves_to_anchor_content() {
        let source = "base: &base\n  animal: cat\ncopy: *base\n";
        let docs = load_documents(source).unwrap();
        let copy = docs[0].get("copy").unwrap();
        assert_eq!(copy.get("animal").and_then(Node::as_str), Some("cat"));
        assert_eq!(copy.position.line, 3);
    }

    #[test]
    fn test_syntax_error_has_position() {
        let source = "content:\n  - box: [unclosed\n";
        let err = load_documents(source).unwrap_err();
        assert!(err.line >= 2);
        assert!(!err.message.contains(" at line "));
        assert!(!err.context.is_empty());
    }

    #[test]
    fn test_empty_stream_has_no_documents() {
        assert!(load_documents("").unwrap().is_empty());
    }
}
