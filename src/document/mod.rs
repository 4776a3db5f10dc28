//! Document input: the generic tree, the typed model, and source readers
//!
//! Parsing text into a tree is normally the caller's job; the readers here
//! cover the formats the command-line tool accepts.

mod model;
mod tree;

pub use model::{Document, Element, Literal, Value, VarEntry};
pub use tree::{Node, Scalar};

use std::path::Path;

use crate::error::DocumentError;

/// Text formats a document can be read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceFormat {
    #[default]
    Toml,
    Json,
}

impl SourceFormat {
    /// Guess the format from a file extension, defaulting to TOML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => SourceFormat::Json,
            _ => SourceFormat::Toml,
        }
    }

    pub fn parse(self, source: &str) -> Result<Node, DocumentError> {
        match self {
            SourceFormat::Toml => parse_toml(source),
            SourceFormat::Json => parse_json(source),
        }
    }
}

/// Read a document tree from TOML text
pub fn parse_toml(source: &str) -> Result<Node, DocumentError> {
    toml::from_str(source).map_err(|e| DocumentError::Syntax {
        message: e.message().to_string(),
        span: e.span(),
    })
}

/// Read a document tree from JSON text
pub fn parse_json(source: &str) -> Result<Node, DocumentError> {
    serde_json::from_str(source).map_err(|e| {
        let offset = byte_offset(source, e.line(), e.column());
        DocumentError::Syntax {
            message: e.to_string(),
            span: offset.map(|o| o..o),
        }
    })
}

/// Convert a 1-based line/column pair to a byte offset
fn byte_offset(source: &str, line: usize, column: usize) -> Option<usize> {
    if line == 0 {
        return None;
    }
    let line_start: usize = source
        .split_inclusive('\n')
        .take(line - 1)
        .map(str::len)
        .sum();
    let offset = line_start + column.saturating_sub(1);
    (offset <= source.len()).then_some(offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(SourceFormat::from_path(Path::new("a.json")), SourceFormat::Json);
        assert_eq!(SourceFormat::from_path(Path::new("a.JSON")), SourceFormat::Json);
        assert_eq!(SourceFormat::from_path(Path::new("a.toml")), SourceFormat::Toml);
        assert_eq!(SourceFormat::from_path(Path::new("drawing")), SourceFormat::Toml);
    }

    #[test]
    fn test_empty_toml_is_empty_mapping() {
        let node = parse_toml("").expect("Empty TOML should parse");
        assert_eq!(node.as_mapping().map(|m| m.len()), Some(0));
    }

    #[test]
    fn test_toml_syntax_error_has_span() {
        let err = parse_toml("[vars\nx = 1").unwrap_err();
        assert!(matches!(err, DocumentError::Syntax { span: Some(_), .. }));
    }

    #[test]
    fn test_json_syntax_error_has_span() {
        let source = "{\n  \"vars\": {,}\n}";
        let err = parse_json(source).unwrap_err();
        match err {
            DocumentError::Syntax { span: Some(span), .. } => {
                assert!(span.start > 2 && span.start < source.len());
            }
            other => panic!("Expected syntax error with span, got {:?}", other),
        }
    }

    #[test]
    fn test_byte_offset() {
        assert_eq!(byte_offset("ab\ncd", 2, 1), Some(3));
        assert_eq!(byte_offset("ab\ncd", 1, 2), Some(1));
        assert_eq!(byte_offset("ab", 0, 1), None);
    }
}
