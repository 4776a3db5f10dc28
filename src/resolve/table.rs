//! The flat table handed to the renderer

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::document::Literal;
use crate::sanitize::Identifier;
use crate::scope::QualifiedName;

/// Resolved right-hand side of one identifier
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Binding {
    /// A constant, substituted as is
    Parameter(Literal),
    /// An expression over other identifiers, evaluated by the renderer
    Expression(String),
}

impl Binding {
    pub fn kind(&self) -> &'static str {
        match self {
            Binding::Parameter(_) => "parameter",
            Binding::Expression(_) => "expression",
        }
    }

    pub fn is_parameter(&self) -> bool {
        matches!(self, Binding::Parameter(_))
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Parameter(literal) => write!(f, "{}", literal),
            Binding::Expression(expr) => f.write_str(expr),
        }
    }
}

/// Identifier bindings plus the reverse index back to qualified names.
///
/// Built once per compile pass and never modified afterwards. Ordered maps keep
/// iteration and serialization byte-identical across passes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlatTable {
    bindings: BTreeMap<Identifier, Binding>,
    names: BTreeMap<Identifier, QualifiedName>,
    #[serde(skip)]
    identifiers: BTreeMap<QualifiedName, Identifier>,
}

impl FlatTable {
    pub(crate) fn insert(&mut self, name: QualifiedName, identifier: Identifier, binding: Binding) {
        self.bindings.insert(identifier.clone(), binding);
        self.names.insert(identifier.clone(), name.clone());
        self.identifiers.insert(name, identifier);
    }

    /// Binding for an identifier
    pub fn get(&self, identifier: &str) -> Option<&Binding> {
        self.bindings.get(identifier)
    }

    /// Qualified name an identifier was generated from
    pub fn origin(&self, identifier: &str) -> Option<&QualifiedName> {
        self.names.get(identifier)
    }

    /// Identifier generated for a qualified name
    pub fn identifier_of(&self, qualified: &str) -> Option<&Identifier> {
        self.identifiers.get(qualified)
    }

    /// Binding for a qualified name
    pub fn lookup(&self, qualified: &str) -> Option<&Binding> {
        self.identifier_of(qualified).and_then(|id| self.bindings.get(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Identifier, &Binding)> {
        self.bindings.iter()
    }

    /// Reverse index: identifier to qualified name
    pub fn names(&self) -> impl Iterator<Item = (&Identifier, &QualifiedName)> {
        self.names.iter()
    }

    /// Constant bindings only
    pub fn parameters(&self) -> impl Iterator<Item = (&Identifier, &Literal)> {
        self.bindings.iter().filter_map(|(id, b)| match b {
            Binding::Parameter(literal) => Some((id, literal)),
            Binding::Expression(_) => None,
        })
    }

    /// Expression bindings only
    pub fn expressions(&self) -> impl Iterator<Item = (&Identifier, &str)> {
        self.bindings.iter().filter_map(|(id, b)| match b {
            Binding::Expression(expr) => Some((id, expr.as_str())),
            Binding::Parameter(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// One line per binding in qualified-name order:
/// `box.right = boxRightXXXXXX: expression boxXXXXXXXX + boxWidthXXXXXX`
impl fmt::Display for FlatTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, identifier) in &self.identifiers {
            if let Some(binding) = self.bindings.get(identifier) {
                writeln!(f, "{} = {}: {} {}", name, identifier, binding.kind(), binding)?;
            }
        }
        Ok(())
    }
}
