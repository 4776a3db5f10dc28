//! Variable scopes
//!
//! The scope tree has one root scope (document `vars`), one child per element,
//! and one child per nested variable group. It is built in one go by
//! [`build_scopes`] and is read-only afterwards; every compile pass builds a
//! fresh tree. [`flatten`] then collapses it into one mapping keyed by
//! qualified name.

mod builder;
mod flatten;

pub use builder::build_scopes;
pub use flatten::{flatten, FlatVar, FlatVars};

use std::borrow::Borrow;
use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

use crate::document::Value;
use crate::schema::SchemaError;

/// Errors that can occur while building or flattening scopes
#[derive(Debug, Error)]
pub enum ScopeError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Element declares an attribute its type does not accept
    #[error("element '{element}' of type '{kind}' does not accept attribute '{attribute}' (accepted: {accepted})")]
    UnknownAttribute {
        element: String,
        kind: String,
        attribute: String,
        accepted: String,
    },

    /// Two scopes or bindings claim the same name
    #[error("duplicate name '{name}': declared as {first} and as {second}")]
    DuplicateName {
        name: String,
        first: &'static str,
        second: &'static str,
    },
}

/// Dotted path from the root to an attribute, e.g. `rect1.left`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct QualifiedName(String);

impl QualifiedName {
    /// Qualify `attribute` with a scope path; the root scope has an empty path
    pub fn new(path: &[String], attribute: &str) -> Self {
        if path.is_empty() {
            Self(attribute.to_string())
        } else {
            Self(format!("{}.{}", path.join("."), attribute))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for QualifiedName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Index of a scope within its tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(usize);

impl ScopeId {
    pub const ROOT: ScopeId = ScopeId(0);
}

/// What a scope was created for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeKind {
    Root,
    /// Nested mapping under `vars`
    Group,
    /// An element, with its declared type
    Element { kind: String },
}

impl ScopeKind {
    fn label(&self) -> &'static str {
        match self {
            ScopeKind::Root => "the root scope",
            ScopeKind::Group => "a variable group",
            ScopeKind::Element { .. } => "an element",
        }
    }
}

/// A named container of attribute bindings
#[derive(Debug, Clone)]
pub struct Scope {
    name: String,
    kind: ScopeKind,
    parent: Option<ScopeId>,
    path: Vec<String>,
    attributes: IndexMap<String, Value>,
    children: Vec<ScopeId>,
}

impl Scope {
    /// Scope name; empty for the root
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ScopeKind {
        &self.kind
    }

    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    /// Names from the root down to this scope (empty for the root)
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Declared and derived bindings, in declaration order
    pub fn attributes(&self) -> &IndexMap<String, Value> {
        &self.attributes
    }

    pub fn children(&self) -> &[ScopeId] {
        &self.children
    }

    /// Qualified name of one of this scope's attributes
    pub fn qualify(&self, attribute: &str) -> QualifiedName {
        QualifiedName::new(&self.path, attribute)
    }
}

/// Arena of scopes; [`ScopeId::ROOT`] is always present
#[derive(Debug, Clone)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
}

impl ScopeTree {
    fn new() -> Self {
        Self {
            scopes: vec![Scope {
                name: String::new(),
                kind: ScopeKind::Root,
                parent: None,
                path: Vec::new(),
                attributes: IndexMap::new(),
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> &Scope {
        &self.scopes[ScopeId::ROOT.0]
    }

    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ScopeId, &Scope)> {
        self.scopes.iter().enumerate().map(|(i, s)| (ScopeId(i), s))
    }

    /// The scope itself, then each parent up to and including the root
    pub fn ancestors(&self, id: ScopeId) -> impl Iterator<Item = &Scope> {
        std::iter::successors(Some(self.get(id)), |scope| {
            scope.parent.map(|p| self.get(p))
        })
    }

    /// Find a scope by its path from the root
    pub fn find(&self, path: &[&str]) -> Option<ScopeId> {
        path.iter().try_fold(ScopeId::ROOT, |current, name| {
            self.get(current)
                .children
                .iter()
                .copied()
                .find(|child| self.get(*child).name == *name)
        })
    }

    fn push_child(&mut self, parent: ScopeId, name: &str, kind: ScopeKind) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        let mut path = self.get(parent).path.clone();
        path.push(name.to_string());
        self.scopes.push(Scope {
            name: name.to_string(),
            kind,
            parent: Some(parent),
            path,
            attributes: IndexMap::new(),
            children: Vec::new(),
        });
        self.scopes[parent.0].children.push(id);
        id
    }

    fn get_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.0]
    }
}
