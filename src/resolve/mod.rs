//! Reference resolution over the flattened variables
//!
//! Resolution runs in fixed order so that every error names human-readable
//! qualified names:
//!
//! 1. Generate an identifier for every qualified name; two names mapping to
//!    the same identifier is an error.
//! 2. Resolve each reference of each expression: the expression's own scope
//!    first, then each enclosing scope up to the root. Because the root scope
//!    has an empty path, a dotted reference like `box.right` resolves there as
//!    an already-qualified name.
//! 3. Reject dependency cycles among expressions.
//! 4. Emit the table, rewriting references to identifiers.

mod graph;
mod suggest;
mod table;

pub use table::{Binding, FlatTable};

use std::collections::HashMap;

use log::trace;
use thiserror::Error;

use crate::document::Value;
use crate::sanitize::{Identifier, Sanitizer};
use crate::scope::{FlatVar, FlatVars, QualifiedName, ScopeId, ScopeTree};

use graph::DependencyGraph;

/// Maximum edit distance for "did you mean" suggestions
const SUGGESTION_DISTANCE: usize = 2;

/// Errors that can occur during reference resolution
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Expression references a name that exists in no enclosing scope
    #[error("unresolved reference '{reference}' in '{within}'{}", format_suggestions(.suggestions))]
    UnresolvedReference {
        reference: String,
        within: String,
        suggestions: Vec<String>,
    },

    /// Expressions depend on each other in a loop
    #[error("cyclic reference: {}", cycle.join(" -> "))]
    CyclicReference { cycle: Vec<String> },

    /// Two qualified names produced the same identifier
    #[error("identifier '{identifier}' generated for both '{first}' and '{second}'")]
    IdentifierCollision {
        identifier: String,
        first: String,
        second: String,
    },
}

impl ResolveError {
    /// Get suggestions if available
    pub fn suggestions(&self) -> Option<&[String]> {
        match self {
            Self::UnresolvedReference { suggestions, .. } => Some(suggestions),
            _ => None,
        }
    }
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (did you mean {}?)", suggestions.join(", "))
    }
}

/// Qualified name to identifier assignment, rejecting collisions
#[derive(Debug, Default)]
pub(crate) struct IdentifierMap {
    by_name: HashMap<QualifiedName, Identifier>,
    by_identifier: HashMap<Identifier, QualifiedName>,
}

impl IdentifierMap {
    pub(crate) fn assign(
        &mut self,
        name: &QualifiedName,
        identifier: Identifier,
    ) -> Result<(), ResolveError> {
        if let Some(first) = self.by_identifier.get(&identifier) {
            if first != name {
                return Err(ResolveError::IdentifierCollision {
                    identifier: identifier.to_string(),
                    first: first.to_string(),
                    second: name.to_string(),
                });
            }
        }
        self.by_identifier.insert(identifier.clone(), name.clone());
        self.by_name.insert(name.clone(), identifier);
        Ok(())
    }

    fn get(&self, name: &str) -> Option<&Identifier> {
        self.by_name.get(name)
    }
}

/// Resolve every binding of `vars` into a flat table
pub fn resolve(
    tree: &ScopeTree,
    vars: &FlatVars,
    sanitizer: &Sanitizer,
) -> Result<FlatTable, ResolveError> {
    let mut identifiers = IdentifierMap::default();
    let mut assigned = Vec::with_capacity(vars.len());
    for var in vars.iter() {
        let identifier = sanitizer.sanitize(var.name.as_str());
        identifiers.assign(&var.name, identifier.clone())?;
        assigned.push((var, identifier));
    }

    // Reference text -> identifier of its target, per expression binding
    let mut renames: HashMap<&str, HashMap<&str, &Identifier>> = HashMap::new();
    let mut graph = DependencyGraph::default();

    for var in vars.iter() {
        let Value::Expr(expr) = &var.value else {
            continue;
        };

        let mut resolved = HashMap::new();
        let mut dependencies = Vec::new();
        for reference in expr.refs() {
            if resolved.contains_key(reference) {
                continue;
            }
            let (target, identifier) = lookup(tree, vars, var.scope, reference)
                .and_then(|target| Some((target, identifiers.get(target.name.as_str())?)))
                .ok_or_else(|| unresolved(vars, var, reference))?;
            trace!(
                within = var.name.as_str(),
                reference = reference,
                target = target.name.as_str();
                "Resolved reference"
            );
            resolved.insert(reference, identifier);
            dependencies.push(target.name.as_str());
        }

        graph.add(var.name.as_str(), dependencies);
        renames.insert(var.name.as_str(), resolved);
    }

    if let Some(cycle) = graph.find_cycle() {
        return Err(ResolveError::CyclicReference { cycle });
    }

    let mut table = FlatTable::default();
    for (var, identifier) in assigned {
        let binding = match &var.value {
            Value::Literal(literal) => Binding::Parameter(literal.clone()),
            Value::Expr(expr) => {
                let resolved = renames.get(var.name.as_str());
                let rewritten = expr.try_rewrite(|reference| {
                    resolved
                        .and_then(|r| r.get(reference))
                        .map(|id| id.to_string())
                        .ok_or_else(|| unresolved(vars, var, reference))
                })?;
                Binding::Expression(rewritten)
            }
        };
        table.insert(var.name.clone(), identifier, binding);
    }

    Ok(table)
}

/// Find `reference` in the scope `from` or any scope enclosing it
fn lookup<'v>(
    tree: &ScopeTree,
    vars: &'v FlatVars,
    from: ScopeId,
    reference: &str,
) -> Option<&'v FlatVar> {
    tree.ancestors(from)
        .find_map(|scope| vars.get(scope.qualify(reference).as_str()))
}

fn unresolved(vars: &FlatVars, var: &FlatVar, reference: &str) -> ResolveError {
    ResolveError::UnresolvedReference {
        reference: reference.to_string(),
        within: var.name.to_string(),
        suggestions: suggest::find_similar(vars.names(), reference, SUGGESTION_DISTANCE),
    }
}
