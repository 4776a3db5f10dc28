//! Build the scope tree from a document

use std::collections::HashMap;

use indexmap::IndexMap;
use log::{trace, warn};

use crate::config::UnknownAttributePolicy;
use crate::document::{Document, Element, Value, VarEntry};
use crate::schema::SchemaRegistry;

use super::{ScopeError, ScopeId, ScopeKind, ScopeTree};

/// Build one root scope for `vars`, a child scope per variable group and a
/// child scope per element.
///
/// Element scopes receive their accepted declared attributes followed by the
/// attributes derived by their schema. Root-level variable names, group names
/// and element names share one namespace.
pub fn build_scopes(
    doc: &Document,
    registry: &SchemaRegistry,
    unknown_attributes: UnknownAttributePolicy,
) -> Result<ScopeTree, ScopeError> {
    let mut tree = ScopeTree::new();
    let mut claimed: HashMap<&str, &'static str> = HashMap::new();

    for (name, entry) in &doc.vars {
        let label = match entry {
            VarEntry::Value(_) => "a variable",
            VarEntry::Group(_) => ScopeKind::Group.label(),
        };
        claim(&mut claimed, name, label)?;
    }
    add_vars(&mut tree, ScopeId::ROOT, &doc.vars);

    for (name, element) in &doc.elements {
        claim(&mut claimed, name, "an element")?;
        add_element(&mut tree, element, registry, unknown_attributes)?;
    }

    Ok(tree)
}

fn claim<'a>(
    claimed: &mut HashMap<&'a str, &'static str>,
    name: &'a str,
    label: &'static str,
) -> Result<(), ScopeError> {
    if let Some(first) = claimed.insert(name, label) {
        return Err(ScopeError::DuplicateName {
            name: name.to_string(),
            first,
            second: label,
        });
    }
    Ok(())
}

/// Names inside one mapping are unique already, so nested groups need no claim check
fn add_vars(tree: &mut ScopeTree, scope: ScopeId, vars: &IndexMap<String, VarEntry>) {
    for (name, entry) in vars {
        match entry {
            VarEntry::Value(value) => {
                tree.get_mut(scope)
                    .attributes
                    .insert(name.clone(), value.clone());
            }
            VarEntry::Group(group) => {
                let child = tree.push_child(scope, name, ScopeKind::Group);
                add_vars(tree, child, group);
            }
        }
    }
}

fn add_element(
    tree: &mut ScopeTree,
    element: &Element,
    registry: &SchemaRegistry,
    unknown_attributes: UnknownAttributePolicy,
) -> Result<(), ScopeError> {
    let schema = registry.attributes_for(&element.kind)?;
    let mut attributes: IndexMap<String, Value> = IndexMap::new();

    for (attribute, value) in &element.attributes {
        if !schema.accepts(attribute) {
            match unknown_attributes {
                UnknownAttributePolicy::Reject => {
                    return Err(ScopeError::UnknownAttribute {
                        element: element.name.clone(),
                        kind: element.kind.clone(),
                        attribute: attribute.clone(),
                        accepted: schema.accepted_attributes().join(", "),
                    });
                }
                UnknownAttributePolicy::Drop => {
                    warn!(
                        element = element.name.as_str(),
                        attribute = attribute.as_str();
                        "Dropping attribute not accepted by element type"
                    );
                    continue;
                }
            }
        }
        attributes.insert(attribute.clone(), value.clone());
    }

    let id = tree.push_child(
        ScopeId::ROOT,
        &element.name,
        ScopeKind::Element {
            kind: element.kind.clone(),
        },
    );
    let scope_name = tree.get(id).path().join(".");

    for (attribute, expr) in schema.derive(&scope_name) {
        attributes.insert(attribute.to_string(), Value::Expr(expr));
    }

    trace!(
        element = element.name.as_str(),
        attributes = attributes.len();
        "Built element scope"
    );
    tree.get_mut(id).attributes = attributes;
    Ok(())
}
