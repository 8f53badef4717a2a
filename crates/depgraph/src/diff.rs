//! Structural deltas between two graph snapshots.

use crate::error::Result;
use crate::graph::DependencyGraph;
use crate::path::AbsolutePath;
use path_clean::PathClean;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Structural difference between a base and a target snapshot. All lists
/// are lexicographically sorted; edges break ties on the target path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDelta {
    pub nodes_added: Vec<AbsolutePath>,
    pub nodes_removed: Vec<AbsolutePath>,
    pub edges_added: Vec<(AbsolutePath, AbsolutePath)>,
    pub edges_removed: Vec<(AbsolutePath, AbsolutePath)>,
    /// Semantic analyzer findings, sorted. Empty until analyzers run.
    pub findings: Vec<String>,
    /// Files the version-control system reports as modified between the
    /// snapshots; supplied by the caller and propagated unchanged.
    pub changed_nodes: BTreeSet<AbsolutePath>,
}

impl GraphDelta {
    pub fn is_empty(&self) -> bool {
        self.nodes_added.is_empty()
            && self.nodes_removed.is_empty()
            && self.edges_added.is_empty()
            && self.edges_removed.is_empty()
    }
}

/// Compute added/removed nodes and edges between two snapshots.
pub fn diff_graphs(base: &DependencyGraph, target: &DependencyGraph) -> Result<GraphDelta> {
    let base_nodes = collect_nodes(base);
    let target_nodes = collect_nodes(target);
    let base_edges = collect_edges(base);
    let target_edges = collect_edges(target);

    let mut delta = GraphDelta {
        nodes_added: target_nodes.difference(&base_nodes).cloned().collect(),
        nodes_removed: base_nodes.difference(&target_nodes).cloned().collect(),
        edges_added: target_edges.difference(&base_edges).cloned().collect(),
        edges_removed: base_edges.difference(&target_edges).cloned().collect(),
        ..GraphDelta::default()
    };

    sort_edges(&mut delta.edges_added);
    sort_edges(&mut delta.edges_removed);

    Ok(delta)
}

/// Nodes are taken from the adjacency itself (union of keys and values) so
/// hand-built graphs diff correctly even without endpoint closure.
fn collect_nodes(graph: &DependencyGraph) -> BTreeSet<AbsolutePath> {
    let mut nodes = BTreeSet::new();
    for (from, to) in graph.edges() {
        nodes.insert(from.clone());
        nodes.insert(to.clone());
    }
    for vertex in graph.vertices() {
        nodes.insert(vertex.clone());
    }
    nodes
}

fn collect_edges(graph: &DependencyGraph) -> BTreeSet<(AbsolutePath, AbsolutePath)> {
    graph
        .edges()
        .map(|(from, to)| (from.clone(), to.clone()))
        .collect()
}

/// Edge ordering compares lexically cleaned path *strings* (byte-wise,
/// not PathBuf's component order) so spelling variants (`a/./b` vs `a/b`)
/// order identically even though they compare unequal as nodes.
fn sort_edges(edges: &mut [(AbsolutePath, AbsolutePath)]) {
    edges.sort_by(|left, right| {
        let key = |edge: &(AbsolutePath, AbsolutePath)| -> (String, String) {
            (cleaned_string(&edge.0), cleaned_string(&edge.1))
        };
        key(left).cmp(&key(right))
    });
}

fn cleaned_string(path: &AbsolutePath) -> String {
    path.as_path()
        .to_path_buf()
        .clean()
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> AbsolutePath {
        AbsolutePath::from_clean(s)
    }

    fn graph_of(edges: &[(&str, &str)]) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for (from, to) in edges {
            graph.add_edge(p(from), p(to));
        }
        graph
    }

    #[test]
    fn computes_node_and_edge_deltas() {
        // Base {a->b}, target {a->c, c isolated}.
        let base = graph_of(&[("/r/a", "/r/b")]);
        let mut target = graph_of(&[("/r/a", "/r/c")]);
        target.add_vertex(p("/r/c"));

        let delta = diff_graphs(&base, &target).unwrap();
        assert_eq!(delta.nodes_added, vec![p("/r/c")]);
        assert_eq!(delta.nodes_removed, vec![p("/r/b")]);
        assert_eq!(delta.edges_added, vec![(p("/r/a"), p("/r/c"))]);
        assert_eq!(delta.edges_removed, vec![(p("/r/a"), p("/r/b"))]);
        assert!(delta.findings.is_empty());
        assert!(delta.changed_nodes.is_empty());
    }

    #[test]
    fn diff_is_symmetric() {
        let left = graph_of(&[("/r/a", "/r/b"), ("/r/b", "/r/c")]);
        let right = graph_of(&[("/r/a", "/r/c"), ("/r/d", "/r/a")]);

        let forward = diff_graphs(&left, &right).unwrap();
        let backward = diff_graphs(&right, &left).unwrap();

        assert_eq!(forward.nodes_added, backward.nodes_removed);
        assert_eq!(forward.nodes_removed, backward.nodes_added);
        assert_eq!(forward.edges_added, backward.edges_removed);
        assert_eq!(forward.edges_removed, backward.edges_added);
    }

    #[test]
    fn identical_graphs_produce_empty_delta() {
        let graph = graph_of(&[("/r/a", "/r/b")]);
        let delta = diff_graphs(&graph, &graph.clone()).unwrap();
        assert!(delta.is_empty());
    }

    #[test]
    fn node_and_edge_ordering_is_byte_wise_not_component_wise() {
        // "a-b.go" precedes "a/b.go" byte-wise ('-' < '/'); PathBuf's
        // component comparison would reverse them.
        let base = DependencyGraph::new();
        let target = graph_of(&[("/r/a/b.go", "/r/x.go"), ("/r/a-b.go", "/r/x.go")]);

        let delta = diff_graphs(&base, &target).unwrap();
        assert_eq!(
            delta.nodes_added,
            vec![p("/r/a-b.go"), p("/r/a/b.go"), p("/r/x.go")]
        );
        assert_eq!(
            delta.edges_added,
            vec![
                (p("/r/a-b.go"), p("/r/x.go")),
                (p("/r/a/b.go"), p("/r/x.go")),
            ]
        );
    }

    #[test]
    fn edge_lists_are_sorted() {
        let base = DependencyGraph::new();
        let target = graph_of(&[
            ("/r/z", "/r/a"),
            ("/r/a", "/r/z"),
            ("/r/a", "/r/b"),
        ]);

        let delta = diff_graphs(&base, &target).unwrap();
        assert_eq!(
            delta.edges_added,
            vec![
                (p("/r/a"), p("/r/b")),
                (p("/r/a"), p("/r/z")),
                (p("/r/z"), p("/r/a")),
            ]
        );
    }
}
