//! Error types for the compile pipeline

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::config::ConfigError;
use crate::document::Node;
use crate::expr::ExprError;
use crate::resolve::ResolveError;
use crate::schema::SchemaError;
use crate::scope::ScopeError;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Errors raised while reading source text or interpreting the document tree
#[derive(Error, Debug)]
pub enum DocumentError {
    /// Source text could not be parsed into a tree
    #[error("syntax error: {message}")]
    Syntax { message: String, span: Option<Span> },

    /// A node that must be a mapping is something else
    #[error("expected a mapping at '{path}', found {found}")]
    ExpectedMapping { path: String, found: &'static str },

    /// Element without a `type` key
    #[error("element '{element}' has no type")]
    MissingType { element: String },

    /// Element whose `type` is not a string
    #[error("element '{element}' has a {found} type; expected a string")]
    InvalidType { element: String, found: &'static str },

    /// Attribute or variable bound to a sequence or mapping
    #[error("'{path}' must be a literal or an expression, found {found}")]
    InvalidValue { path: String, found: &'static str },

    /// `nan`, `inf` or a number literal too large for `f64`
    #[error("'{path}' is not a finite number")]
    NonFiniteNumber { path: String },

    #[error("invalid expression at '{path}': {source}")]
    InvalidExpression {
        path: String,
        #[source]
        source: ExprError,
    },
}

impl DocumentError {
    pub fn expected_mapping(path: impl Into<String>, found: &Node) -> Self {
        Self::ExpectedMapping {
            path: path.into(),
            found: found.kind_name(),
        }
    }

    pub fn invalid_value(path: impl Into<String>, found: &Node) -> Self {
        Self::InvalidValue {
            path: path.into(),
            found: found.kind_name(),
        }
    }

    /// Get the source span if available
    pub fn span(&self) -> Option<&Span> {
        match self {
            Self::Syntax { span, .. } => span.as_ref(),
            _ => None,
        }
    }

    /// Format the error with source context using ariadne
    ///
    /// Errors without a source location fall back to their plain message.
    pub fn format(&self, source: &str, filename: &str) -> String {
        let Some(span) = self.span() else {
            return format!("{}: {}", filename, self);
        };

        let message = match self {
            Self::Syntax { message, .. } => message.clone(),
            other => other.to_string(),
        };

        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename, span.start)
            .with_message(&message)
            .with_label(
                Label::new((filename, span.clone()))
                    .with_message(&message)
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);

        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => format!("{}: {}", filename, self),
        }
    }
}

/// Errors that can occur during a compile pass
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    #[error("{0}")]
    Scope(#[from] ScopeError),

    #[error("{0}")]
    Resolve(#[from] ResolveError),
}

/// Coarse classification of a [`CompileError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Config,
    Document,
    UnsupportedType,
    UnknownAttribute,
    DuplicateName,
    UnresolvedReference,
    CyclicReference,
    IdentifierCollision,
}

impl CompileError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Config,
            Self::Document(_) => ErrorKind::Document,
            Self::Scope(ScopeError::Schema(SchemaError::UnsupportedType { .. })) => {
                ErrorKind::UnsupportedType
            }
            // Duplicate kinds come from registry setup, not from a document
            Self::Scope(ScopeError::Schema(SchemaError::DuplicateKind { .. })) => {
                ErrorKind::Config
            }
            Self::Scope(ScopeError::UnknownAttribute { .. }) => ErrorKind::UnknownAttribute,
            Self::Scope(ScopeError::DuplicateName { .. }) => ErrorKind::DuplicateName,
            Self::Resolve(ResolveError::UnresolvedReference { .. }) => {
                ErrorKind::UnresolvedReference
            }
            Self::Resolve(ResolveError::CyclicReference { .. }) => ErrorKind::CyclicReference,
            Self::Resolve(ResolveError::IdentifierCollision { .. }) => {
                ErrorKind::IdentifierCollision
            }
        }
    }

    /// Format the error for a terminal, with source context where available
    pub fn format(&self, source: &str, filename: &str) -> String {
        match self {
            Self::Document(err) => err.format(source, filename),
            other => format!("{}: {}", filename, other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_format_includes_message() {
        let err = DocumentError::Syntax {
            message: "unclosed table".to_string(),
            span: Some(0..5),
        };
        let report = err.format("[vars\nx = 1", "drawing.toml");
        assert!(report.contains("unclosed table"));
        assert!(report.contains("drawing.toml"));
    }

    #[test]
    fn test_format_without_span_is_plain() {
        let err = DocumentError::MissingType {
            element: "box".to_string(),
        };
        assert_eq!(
            err.format("", "drawing.toml"),
            "drawing.toml: element 'box' has no type"
        );
    }

    #[test]
    fn test_invalid_value_display() {
        let err = DocumentError::invalid_value("box.x", &Node::Sequence(vec![]));
        assert_eq!(
            err.to_string(),
            "'box.x' must be a literal or an expression, found sequence"
        );
    }

    #[test]
    fn test_compile_error_kind() {
        let err = CompileError::from(ScopeError::DuplicateName {
            name: "box".to_string(),
            first: "a variable",
            second: "an element",
        });
        assert_eq!(err.kind(), ErrorKind::DuplicateName);

        let err = CompileError::from(ResolveError::CyclicReference {
            cycle: vec!["n".to_string(), "n".to_string()],
        });
        assert_eq!(err.kind(), ErrorKind::CyclicReference);
        assert_eq!(err.to_string(), "cyclic reference: n -> n");
    }

    #[test]
    fn test_unsupported_type_kind_through_scope_error() {
        let err = CompileError::from(ScopeError::from(SchemaError::UnsupportedType {
            kind: "triangle".to_string(),
            supported: "circle, rect".to_string(),
        }));
        assert_eq!(err.kind(), ErrorKind::UnsupportedType);
    }
}
