//! Registry mapping element kinds to their schemas

use std::collections::HashMap;

use thiserror::Error;

use super::{CircleSchema, ElementSchema, RectSchema};

/// Errors that can occur during schema lookup and registration
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Element declares a type no schema is registered for
    #[error("unsupported element type '{kind}' (supported: {supported})")]
    UnsupportedType { kind: String, supported: String },

    /// Two schemas registered for the same kind
    #[error("duplicate schema for element type '{kind}'")]
    DuplicateKind { kind: String },
}

/// Registry of element schemas, keyed by element `type`
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Box<dyn ElementSchema>>,
}

impl SchemaRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in kinds (`rect`, `circle`)
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.insert(Box::new(RectSchema));
        registry.insert(Box::new(CircleSchema));
        registry
    }

    /// Register a schema for a new element kind
    pub fn register(&mut self, schema: Box<dyn ElementSchema>) -> Result<(), SchemaError> {
        if self.schemas.contains_key(schema.kind()) {
            return Err(SchemaError::DuplicateKind {
                kind: schema.kind().to_string(),
            });
        }
        self.insert(schema);
        Ok(())
    }

    /// Look up the attribute rules for an element kind
    pub fn attributes_for(&self, kind: &str) -> Result<&dyn ElementSchema, SchemaError> {
        self.schemas
            .get(kind)
            .map(|s| s.as_ref())
            .ok_or_else(|| SchemaError::UnsupportedType {
                kind: kind.to_string(),
                supported: self.kinds().join(", "),
            })
    }

    /// Check if a kind is registered
    pub fn contains(&self, kind: &str) -> bool {
        self.schemas.contains_key(kind)
    }

    /// Registered kinds, sorted
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.schemas.keys().map(|k| k.as_str()).collect();
        kinds.sort_unstable();
        kinds
    }

    fn insert(&mut self, schema: Box<dyn ElementSchema>) {
        self.schemas.insert(schema.kind().to_string(), schema);
    }
}
