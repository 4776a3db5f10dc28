//! Element schemas: which attributes an element kind accepts and which it derives
//!
//! Each element kind registers an [`ElementSchema`]. The scope builder asks the
//! [`SchemaRegistry`] for the schema of every element, copies the accepted
//! declared attributes and merges in the derived ones. Supporting a new kind
//! only means registering another schema.

mod builtin;
mod registry;

pub use builtin::{CircleSchema, RectSchema};
pub use registry::{SchemaError, SchemaRegistry};

use std::fmt;

use crate::expr::Expr;

/// Attribute rules for one element kind
pub trait ElementSchema: fmt::Debug + Send + Sync {
    /// The `type` value this schema handles
    fn kind(&self) -> &str;

    /// Attribute names an author may declare
    fn accepted_attributes(&self) -> &[&'static str];

    /// Derived attributes for an element whose scope is qualified as `scope`.
    ///
    /// References in the returned expressions are fully qualified
    /// (`{scope}.{attr}`), so they always point at the element's own
    /// attributes whatever scope they are resolved from.
    fn derive(&self, scope: &str) -> Vec<(&'static str, Expr)>;

    fn accepts(&self, attribute: &str) -> bool {
        self.accepted_attributes().contains(&attribute)
    }
}

fn qualified(scope: &str, attribute: &str) -> String {
    format!("{}.{}", scope, attribute)
}

/// `{scope}.{a} {op} {scope}.{b}`
fn binary(scope: &str, a: &str, op: &str, b: &str) -> Expr {
    Expr::new()
        .with_ref(qualified(scope, a))
        .with_text(&format!(" {} ", op))
        .with_ref(qualified(scope, b))
}

fn alias(scope: &str, attribute: &str) -> Expr {
    Expr::new().with_ref(qualified(scope, attribute))
}
