//! Generic document tree (mappings, sequences, scalars)
//!
//! This is the shape a text-to-tree parser hands over. Any self-describing
//! serde format deserializes into it; mapping order is preserved so that
//! compilation output is reproducible.

use indexmap::IndexMap;
use serde::Deserialize;

/// Scalar leaf value
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Number(f64),
    String(String),
}

/// A node of the generic document tree
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Node {
    /// Explicit null or an empty value (`vars:` with nothing after it)
    Null,
    Scalar(Scalar),
    Sequence(Vec<Node>),
    Mapping(IndexMap<String, Node>),
}

impl Node {
    /// Build a mapping node from key/value pairs, keeping their order
    pub fn mapping<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Node)>,
    {
        Node::Mapping(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn as_mapping(&self) -> Option<&IndexMap<String, Node>> {
        match self {
            Node::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    /// Human-readable name of the node's shape, for error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Null => "null",
            Node::Scalar(Scalar::Bool(_)) => "boolean",
            Node::Scalar(Scalar::Number(_)) => "number",
            Node::Scalar(Scalar::String(_)) => "string",
            Node::Sequence(_) => "sequence",
            Node::Mapping(_) => "mapping",
        }
    }
}

impl From<f64> for Node {
    fn from(value: f64) -> Self {
        Node::Scalar(Scalar::Number(value))
    }
}

impl From<i32> for Node {
    fn from(value: i32) -> Self {
        Node::Scalar(Scalar::Number(f64::from(value)))
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Node::Scalar(Scalar::Bool(value))
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::Scalar(Scalar::String(value.to_string()))
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::Scalar(Scalar::String(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_toml_tree() {
        let node: Node = toml::from_str(
            r#"
            [vars]
            margin = 4
            ratio = 0.5
            visible = true

            [elements.box]
            type = "rect"
            x = "margin"
            "#,
        )
        .expect("Should deserialize");

        let root = node.as_mapping().expect("Root should be a mapping");
        let vars = root["vars"].as_mapping().expect("vars should be a mapping");
        assert_eq!(vars["margin"], Node::from(4));
        assert_eq!(vars["ratio"], Node::from(0.5));
        assert_eq!(vars["visible"], Node::from(true));

        let boxed = root["elements"].as_mapping().unwrap()["box"]
            .as_mapping()
            .unwrap();
        assert_eq!(boxed["type"], Node::from("rect"));
        assert_eq!(boxed["x"], Node::from("margin"));
    }

    #[test]
    fn test_deserialize_json_null_and_sequence() {
        let node: Node =
            serde_json::from_str(r#"{"vars": null, "list": [1, "a"]}"#).expect("Should deserialize");
        let root = node.as_mapping().unwrap();
        assert!(root["vars"].is_null());
        assert_eq!(
            root["list"],
            Node::Sequence(vec![Node::from(1), Node::from("a")])
        );
    }

    #[test]
    fn test_mapping_preserves_order() {
        let node: Node = serde_json::from_str(r#"{"z": 1, "a": 2, "m": 3}"#).unwrap();
        let keys: Vec<&str> = node.as_mapping().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_mapping_builder() {
        let node = Node::mapping([("width", Node::from(10)), ("x", Node::from("left"))]);
        assert_eq!(node.kind_name(), "mapping");
        assert_eq!(node.as_mapping().unwrap().len(), 2);
    }
}
