//! Collapse the scope tree into one mapping keyed by qualified name

use indexmap::map::Entry;
use indexmap::IndexMap;

use crate::document::Value;

use super::{QualifiedName, ScopeError, ScopeId, ScopeKind, ScopeTree};

/// One flattened binding
#[derive(Debug, Clone, PartialEq)]
pub struct FlatVar {
    pub name: QualifiedName,
    /// Scope the binding was declared in; references in its value resolve from here
    pub scope: ScopeId,
    pub value: Value,
}

/// Every binding of a scope tree, keyed by qualified name, in tree order
#[derive(Debug, Clone, Default)]
pub struct FlatVars {
    entries: IndexMap<QualifiedName, FlatVar>,
}

impl FlatVars {
    pub fn get(&self, name: &str) -> Option<&FlatVar> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlatVar> {
        self.entries.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }
}

/// Flatten a scope tree: root bindings keep their bare name, every other
/// binding is qualified by its scope path (`box.left`, `canvas.width`).
///
/// Fails when two bindings end up with the same qualified name, which happens
/// when a root variable name itself contains a dot (`"box.x"` next to element
/// `box`).
pub fn flatten(tree: &ScopeTree) -> Result<FlatVars, ScopeError> {
    let mut vars = FlatVars::default();
    flatten_scope(tree, ScopeId::ROOT, &mut vars)?;
    Ok(vars)
}

fn flatten_scope(tree: &ScopeTree, id: ScopeId, vars: &mut FlatVars) -> Result<(), ScopeError> {
    let scope = tree.get(id);

    for (attribute, value) in scope.attributes() {
        let name = scope.qualify(attribute);
        match vars.entries.entry(name) {
            Entry::Occupied(existing) => {
                return Err(ScopeError::DuplicateName {
                    name: existing.key().to_string(),
                    first: binding_label(tree.get(existing.get().scope).kind()),
                    second: binding_label(scope.kind()),
                });
            }
            Entry::Vacant(slot) => {
                let name = slot.key().clone();
                slot.insert(FlatVar {
                    name,
                    scope: id,
                    value: value.clone(),
                });
            }
        }
    }

    for child in scope.children() {
        flatten_scope(tree, *child, vars)?;
    }
    Ok(())
}

fn binding_label(kind: &ScopeKind) -> &'static str {
    match kind {
        ScopeKind::Root | ScopeKind::Group => "a variable",
        ScopeKind::Element { .. } => "an element attribute",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UnknownAttributePolicy;
    use crate::document::{parse_toml, Document};
    use crate::schema::SchemaRegistry;
    use crate::scope::build_scopes;

    fn flat(source: &str) -> Result<FlatVars, ScopeError> {
        let doc = Document::from_tree(&parse_toml(source).unwrap()).unwrap();
        let tree = build_scopes(
            &doc,
            &SchemaRegistry::with_builtins(),
            UnknownAttributePolicy::Reject,
        )?;
        flatten(&tree)
    }

    #[test]
    fn test_flatten_qualifies_element_attributes() {
        let vars = flat(
            r#"
            [vars]
            margin = 4

            [vars.canvas]
            width = 800

            [elements.box]
            type = "rect"
            x = 0
            y = 0
            width = 10
            height = 10
            "#,
        )
        .expect("Should flatten");

        let names: Vec<&str> = vars.names().collect();
        assert_eq!(
            names,
            vec![
                "margin",
                "canvas.width",
                "box.x",
                "box.y",
                "box.width",
                "box.height",
                "box.left",
                "box.right",
                "box.top",
                "box.bottom",
            ]
        );
        assert_eq!(vars.len(), 10);
    }

    #[test]
    fn test_flat_var_remembers_scope() {
        let vars = flat(
            r#"
            [elements.box]
            type = "rect"
            width = 10
            "#,
        )
        .unwrap();
        let width = vars.get("box.width").expect("box.width");
        assert_ne!(width.scope, ScopeId::ROOT);
        assert_eq!(vars.get("box.left").unwrap().scope, width.scope);
    }

    #[test]
    fn test_dotted_root_variable_collides() {
        let result = flat(
            r#"
            [vars]
            "box.x" = 3

            [elements.box]
            type = "rect"
            x = 1
            "#,
        );
        match result {
            Err(ScopeError::DuplicateName {
                name,
                first,
                second,
            }) => {
                assert_eq!(name, "box.x");
                assert_eq!(first, "a variable");
                assert_eq!(second, "an element attribute");
            }
            other => panic!("Expected duplicate name, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_tree_flattens_to_nothing() {
        let vars = flat("").unwrap();
        assert!(vars.is_empty());
    }
}
