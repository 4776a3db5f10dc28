//! Dependency graph between expression bindings

use std::collections::HashMap;

use indexmap::IndexMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    /// On the active DFS path
    Visiting,
    Done,
}

/// Edges from an expression binding to the bindings it references
#[derive(Debug, Default)]
pub(crate) struct DependencyGraph<'a> {
    edges: IndexMap<&'a str, Vec<&'a str>>,
}

impl<'a> DependencyGraph<'a> {
    pub(crate) fn add(&mut self, node: &'a str, dependencies: Vec<&'a str>) {
        self.edges.insert(node, dependencies);
    }

    /// First cycle found by depth-first search, as a closed path (`a -> b -> a`).
    ///
    /// Roots are visited in insertion order and edges in declaration order, so
    /// the reported cycle is stable for a given document.
    pub(crate) fn find_cycle(&self) -> Option<Vec<String>> {
        let mut marks: HashMap<&str, Mark> = HashMap::new();
        let mut path: Vec<&str> = Vec::new();

        for &node in self.edges.keys() {
            if !marks.contains_key(node) {
                if let Some(cycle) = self.visit(node, &mut marks, &mut path) {
                    return Some(cycle);
                }
            }
        }
        None
    }

    fn visit(
        &self,
        node: &'a str,
        marks: &mut HashMap<&'a str, Mark>,
        path: &mut Vec<&'a str>,
    ) -> Option<Vec<String>> {
        marks.insert(node, Mark::Visiting);
        path.push(node);

        // Nodes without edges (literals) cannot be part of a cycle
        for &next in self.edges.get(node).into_iter().flatten() {
            match marks.get(next) {
                Some(Mark::Visiting) => {
                    let start = path.iter().position(|n| *n == next).unwrap_or(0);
                    let mut cycle: Vec<String> =
                        path[start..].iter().map(|n| n.to_string()).collect();
                    cycle.push(next.to_string());
                    return Some(cycle);
                }
                Some(Mark::Done) => {}
                None => {
                    if let Some(cycle) = self.visit(next, marks, path) {
                        return Some(cycle);
                    }
                }
            }
        }

        path.pop();
        marks.insert(node, Mark::Done);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acyclic_chain() {
        let mut graph = DependencyGraph::default();
        graph.add("a", vec!["b"]);
        graph.add("b", vec!["c"]);
        graph.add("c", vec![]);
        assert_eq!(graph.find_cycle(), None);
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let mut graph = DependencyGraph::default();
        graph.add("top", vec!["left", "right"]);
        graph.add("left", vec!["base"]);
        graph.add("right", vec!["base"]);
        assert_eq!(graph.find_cycle(), None);
    }

    #[test]
    fn test_two_node_cycle() {
        let mut graph = DependencyGraph::default();
        graph.add("a.x", vec!["b.x"]);
        graph.add("b.x", vec!["a.x"]);
        assert_eq!(
            graph.find_cycle(),
            Some(vec!["a.x".to_string(), "b.x".to_string(), "a.x".to_string()])
        );
    }

    #[test]
    fn test_self_reference() {
        let mut graph = DependencyGraph::default();
        graph.add("x", vec!["x"]);
        assert_eq!(graph.find_cycle(), Some(vec!["x".to_string(), "x".to_string()]));
    }

    #[test]
    fn test_cycle_reported_without_lead_in() {
        let mut graph = DependencyGraph::default();
        graph.add("entry", vec!["a"]);
        graph.add("a", vec!["b"]);
        graph.add("b", vec!["c"]);
        graph.add("c", vec!["a"]);
        assert_eq!(
            graph.find_cycle(),
            Some(vec![
                "a".to_string(),
                "b".to_string(),
                "c".to_string(),
                "a".to_string()
            ])
        );
    }
}
