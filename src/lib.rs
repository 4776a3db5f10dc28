//! drawvars - compiles declarative drawing documents into a flat variable table
//!
//! A document declares free variables and typed elements whose attributes are
//! literals or expressions over other variables. Compiling it yields a
//! [`FlatTable`]: every variable under a collision-free, renderer-safe
//! identifier, with expressions rewritten to reference those identifiers.
//!
//! # Example
//!
//! ```rust
//! use drawvars::compile_toml;
//!
//! let table = compile_toml(r#"
//!     [vars]
//!     margin = 10
//!
//!     [elements.box]
//!     type = "rect"
//!     x = "margin"
//!     y = "margin"
//!     width = 100
//!     height = 50
//! "#).unwrap();
//!
//! assert!(table.lookup("box.right").is_some());
//! assert_eq!(table.parameters().count(), 3);
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod expr;
pub mod resolve;
pub mod sanitize;
pub mod schema;
pub mod scope;
pub mod session;

pub use config::{CompileConfig, ConfigError, UnknownAttributePolicy};
pub use document::{Document, Literal, Node, SourceFormat, Value};
pub use error::{CompileError, DocumentError, ErrorKind};
pub use resolve::{Binding, FlatTable, ResolveError};
pub use sanitize::{Identifier, Sanitizer};
pub use schema::{ElementSchema, SchemaError, SchemaRegistry};
pub use scope::{QualifiedName, ScopeError};
pub use session::{Publication, Revision, Session};

use log::debug;

/// Runs the compile pipeline with a fixed configuration and schema registry
#[derive(Debug)]
pub struct Compiler {
    config: CompileConfig,
    registry: SchemaRegistry,
}

impl Default for Compiler {
    fn default() -> Self {
        Self {
            config: CompileConfig::default(),
            registry: SchemaRegistry::with_builtins(),
        }
    }
}

impl Compiler {
    /// Create a compiler with the built-in element kinds
    pub fn new(config: CompileConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            registry: SchemaRegistry::with_builtins(),
        })
    }

    /// Replace the schema registry
    pub fn with_registry(mut self, registry: SchemaRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &CompileConfig {
        &self.config
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Compile a parsed document tree
    pub fn compile(&self, node: &Node) -> Result<FlatTable, CompileError> {
        let doc = Document::from_tree(node)?;
        self.compile_document(&doc)
    }

    /// Compile an already typed document
    pub fn compile_document(&self, doc: &Document) -> Result<FlatTable, CompileError> {
        let tree = scope::build_scopes(doc, &self.registry, self.config.unknown_attributes)?;
        debug!(scopes = tree.len(); "Built scope tree");

        let vars = scope::flatten(&tree)?;
        debug!(entries = vars.len(); "Flattened scopes");

        let sanitizer = Sanitizer::new(self.config.suffix_len);
        let table = resolve::resolve(&tree, &vars, &sanitizer)?;
        debug!(
            entries = table.len(),
            parameters = table.parameters().count();
            "Resolved flat table"
        );

        Ok(table)
    }
}

/// Compile a document tree with default configuration
pub fn compile(node: &Node) -> Result<FlatTable, CompileError> {
    Compiler::default().compile(node)
}

/// Compile a document tree with custom configuration
///
/// # Example
///
/// ```rust
/// use drawvars::{compile_with_config, document::parse_toml, CompileConfig};
///
/// let node = parse_toml("[vars]\nmargin = 10").unwrap();
/// let table = compile_with_config(&node, CompileConfig::new().with_suffix_len(10)).unwrap();
///
/// let id = table.identifier_of("margin").unwrap();
/// assert_eq!(id.as_str().len(), "margin".len() + 10);
/// ```
pub fn compile_with_config(node: &Node, config: CompileConfig) -> Result<FlatTable, CompileError> {
    Compiler::new(config)?.compile(node)
}

/// Parse TOML source and compile it with default configuration
pub fn compile_toml(source: &str) -> Result<FlatTable, CompileError> {
    let node = document::parse_toml(source)?;
    compile(&node)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_empty_document() {
        let table = compile_toml("").unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_compile_reports_unsupported_type() {
        let err = compile_toml(
            r#"
            [elements.t]
            type = "triangle"
            "#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedType);
    }

    #[test]
    fn test_compile_reports_unknown_attribute() {
        let err = compile_toml(
            r#"
            [elements.box]
            type = "rect"
            colour = "red"
            "#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownAttribute);
    }

    #[test]
    fn test_drop_policy_skips_unknown_attribute() {
        let node = document::parse_toml(
            r#"
            [elements.box]
            type = "rect"
            x = 0
            y = 0
            width = 1
            height = 1
            colour = "red"
            "#,
        )
        .unwrap();
        let config = CompileConfig::new().with_unknown_attributes(UnknownAttributePolicy::Drop);
        let table = compile_with_config(&node, config).unwrap();
        assert!(table.lookup("box.colour").is_none());
        assert_eq!(table.len(), 8);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let err = compile_with_config(&Node::Null, CompileConfig::new().with_suffix_len(0))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_syntax_error_is_document_error() {
        let err = compile_toml("[vars\nx = 1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Document);
    }

    #[test]
    fn test_custom_registry() {
        let compiler = Compiler::default().with_registry(SchemaRegistry::new());
        let node = document::parse_toml("[elements.box]\ntype = \"rect\"").unwrap();
        let err = compiler.compile(&node).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedType);
    }
}
