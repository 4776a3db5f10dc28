//! Typed document model built from the generic tree
//!
//! A [`Document`] is built once per compile pass and never mutated. Scalars are
//! classified here as either literals or expressions:
//!
//! - numbers and booleans are literals
//! - strings that parse as a number are numeric literals
//! - strings made of a number and a known unit (`10px`, `50%`) are passed
//!   through verbatim as text literals
//! - strings wrapped in matching quotes are text literals
//! - every other string is an expression
//!
//! Numbers that are not finite (`1e400`, TOML `nan` and `inf`) are rejected.

use std::fmt;

use indexmap::IndexMap;
use log::warn;
use serde::Serialize;

use crate::error::DocumentError;
use crate::expr::{split_unit, Expr};

use super::tree::{Node, Scalar};

/// A constant value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Literal {
    Number(f64),
    Bool(bool),
    Text(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number(n) => write!(f, "{}", n),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Text(s) => write!(f, "{:?}", s),
        }
    }
}

/// The right-hand side of a variable binding
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Literal(Literal),
    Expr(Expr),
}

impl Value {
    /// Classify the scalar found at `path` as literal or expression
    pub fn from_scalar(path: &str, scalar: &Scalar) -> Result<Self, DocumentError> {
        match scalar {
            Scalar::Bool(b) => Ok(Value::Literal(Literal::Bool(*b))),
            Scalar::Number(n) => finite(path, *n).map(|n| Value::Literal(Literal::Number(n))),
            Scalar::String(s) => Self::from_text(path, s),
        }
    }

    fn from_text(path: &str, text: &str) -> Result<Self, DocumentError> {
        let trimmed = text.trim();

        if trimmed.is_empty() {
            return Ok(Value::Literal(Literal::Text(String::new())));
        }
        if let Some(n) = parse_number(trimmed) {
            return finite(path, n).map(|n| Value::Literal(Literal::Number(n)));
        }
        if let Some(n) = parse_dimension(trimmed) {
            finite(path, n)?;
            return Ok(Value::Literal(Literal::Text(trimmed.to_string())));
        }
        if let Some(inner) = unquote(trimmed) {
            return Ok(Value::Literal(Literal::Text(inner.to_string())));
        }

        Expr::parse(trimmed)
            .map(Value::Expr)
            .map_err(|source| DocumentError::InvalidExpression {
                path: path.to_string(),
                source,
            })
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Value::Literal(_))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Literal(Literal::Number(value))
    }
}

impl From<Expr> for Value {
    fn from(expr: Expr) -> Self {
        Value::Expr(expr)
    }
}

/// A drawable element as declared by the author
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    /// Declared `type`, looked up in the schema registry later
    pub kind: String,
    /// Declared attributes, `type` excluded
    pub attributes: IndexMap<String, Value>,
}

/// An entry under `vars`: a binding or a nested group of bindings
#[derive(Debug, Clone, PartialEq)]
pub enum VarEntry {
    Value(Value),
    Group(IndexMap<String, VarEntry>),
}

/// A complete drawing description
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub vars: IndexMap<String, VarEntry>,
    pub elements: IndexMap<String, Element>,
}

impl Document {
    /// Build the typed model from a generic tree
    pub fn from_tree(node: &Node) -> Result<Self, DocumentError> {
        let root = match node {
            Node::Null => return Ok(Document::default()),
            Node::Mapping(m) => m,
            other => return Err(DocumentError::expected_mapping("<root>", other)),
        };

        let mut doc = Document::default();

        for (key, value) in root {
            match key.as_str() {
                "vars" => doc.vars = parse_vars("vars", value)?,
                "elements" => doc.elements = parse_elements(value)?,
                _ => warn!(key = key.as_str(); "Ignoring unknown top-level key"),
            }
        }

        Ok(doc)
    }
}

fn parse_vars(path: &str, node: &Node) -> Result<IndexMap<String, VarEntry>, DocumentError> {
    let mapping = match node {
        Node::Null => return Ok(IndexMap::new()),
        Node::Mapping(m) => m,
        other => return Err(DocumentError::expected_mapping(path, other)),
    };

    let mut vars = IndexMap::new();
    for (name, value) in mapping {
        let child_path = format!("{}.{}", path, name);
        match value {
            Node::Null => {}
            Node::Scalar(s) => {
                let value = Value::from_scalar(&child_path, s)?;
                vars.insert(name.clone(), VarEntry::Value(value));
            }
            Node::Mapping(_) => {
                vars.insert(name.clone(), VarEntry::Group(parse_vars(&child_path, value)?));
            }
            Node::Sequence(_) => {
                return Err(DocumentError::invalid_value(child_path, value));
            }
        }
    }
    Ok(vars)
}

fn parse_elements(node: &Node) -> Result<IndexMap<String, Element>, DocumentError> {
    let mapping = match node {
        Node::Null => return Ok(IndexMap::new()),
        Node::Mapping(m) => m,
        other => return Err(DocumentError::expected_mapping("elements", other)),
    };

    let mut elements = IndexMap::new();
    for (name, value) in mapping {
        elements.insert(name.clone(), parse_element(name, value)?);
    }
    Ok(elements)
}

fn parse_element(name: &str, node: &Node) -> Result<Element, DocumentError> {
    let mapping = node
        .as_mapping()
        .ok_or_else(|| DocumentError::expected_mapping(format!("elements.{}", name), node))?;

    let kind = match mapping.get("type") {
        Some(Node::Scalar(Scalar::String(kind))) => kind.clone(),
        Some(Node::Null) | None => {
            return Err(DocumentError::MissingType {
                element: name.to_string(),
            })
        }
        Some(other) => {
            return Err(DocumentError::InvalidType {
                element: name.to_string(),
                found: other.kind_name(),
            })
        }
    };

    let mut attributes = IndexMap::new();
    for (attr, value) in mapping.iter().filter(|(k, _)| k.as_str() != "type") {
        match value {
            Node::Null => {}
            Node::Scalar(s) => {
                let value = Value::from_scalar(&format!("{}.{}", name, attr), s)?;
                attributes.insert(attr.clone(), value);
            }
            other => {
                return Err(DocumentError::invalid_value(
                    format!("{}.{}", name, attr),
                    other,
                ))
            }
        }
    }

    Ok(Element {
        name: name.to_string(),
        kind,
        attributes,
    })
}

/// Parse a plain number; refuses words like `inf` or `nan` that `f64::from_str` accepts
fn parse_number(text: &str) -> Option<f64> {
    let numeric_chars = text
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'));
    let has_digit = text.chars().any(|c| c.is_ascii_digit());
    if numeric_chars && has_digit {
        text.parse().ok()
    } else {
        None
    }
}

/// The number part of a dimension with a known unit, e.g. `10px`, `-2.5em`, `50%`
fn parse_dimension(text: &str) -> Option<f64> {
    match split_unit(text) {
        (_, "") => None,
        (number, _) => parse_number(number),
    }
}

fn finite(path: &str, n: f64) -> Result<f64, DocumentError> {
    if n.is_finite() {
        Ok(n)
    } else {
        Err(DocumentError::NonFiniteNumber {
            path: path.to_string(),
        })
    }
}

fn unquote(text: &str) -> Option<&str> {
    ['"', '\'']
        .iter()
        .find_map(|q| {
            let inner = text.strip_prefix(*q)?.strip_suffix(*q)?;
            (!inner.contains(*q)).then_some(inner)
        })
}
