//! The file-level dependency graph.

use crate::path::AbsolutePath;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Directed graph keyed by canonicalized absolute paths, stored as an
/// adjacency map. Every vertex is a key; out-neighbor lists preserve
/// first-seen order and hold at most one edge per ordered pair. Self-edges
/// are permitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyGraph {
    adjacency: BTreeMap<AbsolutePath, Vec<AbsolutePath>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a vertex with no outgoing edges (no-op when present).
    pub fn add_vertex(&mut self, vertex: AbsolutePath) {
        self.adjacency.entry(vertex).or_default();
    }

    /// Insert an edge, creating both endpoints as needed. Duplicate edges
    /// are ignored.
    pub fn add_edge(&mut self, from: AbsolutePath, to: AbsolutePath) {
        self.add_vertex(to.clone());
        let neighbors = self.adjacency.entry(from).or_default();
        if !neighbors.contains(&to) {
            neighbors.push(to);
        }
    }

    /// Replace the out-neighbor list of `vertex`, deduplicating while
    /// preserving first-seen order. Targets become vertices.
    pub fn insert_with_neighbors(&mut self, vertex: AbsolutePath, neighbors: Vec<AbsolutePath>) {
        let mut deduped: Vec<AbsolutePath> = Vec::with_capacity(neighbors.len());
        for n in neighbors {
            if !deduped.contains(&n) {
                deduped.push(n);
            }
        }
        for n in &deduped {
            self.add_vertex(n.clone());
        }
        self.adjacency.insert(vertex, deduped);
    }

    pub fn contains_vertex(&self, vertex: &AbsolutePath) -> bool {
        self.adjacency.contains_key(vertex)
    }

    pub fn has_edge(&self, from: &AbsolutePath, to: &AbsolutePath) -> bool {
        self.adjacency
            .get(from)
            .is_some_and(|neighbors| neighbors.contains(to))
    }

    /// Vertices in sorted order.
    pub fn vertices(&self) -> impl Iterator<Item = &AbsolutePath> {
        self.adjacency.keys()
    }

    /// Out-neighbors of a vertex in first-seen order.
    pub fn out_neighbors(&self, vertex: &AbsolutePath) -> &[AbsolutePath] {
        self.adjacency
            .get(vertex)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// All edges, grouped by source vertex in sorted order.
    pub fn edges(&self) -> impl Iterator<Item = (&AbsolutePath, &AbsolutePath)> {
        self.adjacency
            .iter()
            .flat_map(|(from, tos)| tos.iter().map(move |to| (from, to)))
    }

    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    pub fn as_adjacency(&self) -> &BTreeMap<AbsolutePath, Vec<AbsolutePath>> {
        &self.adjacency
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> AbsolutePath {
        AbsolutePath::from_clean(s)
    }

    #[test]
    fn add_edge_creates_both_endpoints() {
        let mut g = DependencyGraph::new();
        g.add_edge(p("/a"), p("/b"));
        assert!(g.contains_vertex(&p("/a")));
        assert!(g.contains_vertex(&p("/b")));
        assert!(g.has_edge(&p("/a"), &p("/b")));
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn duplicate_edges_are_ignored() {
        let mut g = DependencyGraph::new();
        g.add_edge(p("/a"), p("/b"));
        g.add_edge(p("/a"), p("/b"));
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn self_edges_are_permitted() {
        let mut g = DependencyGraph::new();
        g.add_edge(p("/a"), p("/a"));
        assert!(g.has_edge(&p("/a"), &p("/a")));
    }

    #[test]
    fn insert_with_neighbors_dedupes_preserving_first_seen_order() {
        let mut g = DependencyGraph::new();
        g.insert_with_neighbors(p("/a"), vec![p("/c"), p("/b"), p("/c")]);
        assert_eq!(g.out_neighbors(&p("/a")), &[p("/c"), p("/b")]);
    }

    #[test]
    fn vertices_iterate_sorted() {
        let mut g = DependencyGraph::new();
        g.add_vertex(p("/z"));
        g.add_vertex(p("/a"));
        g.add_vertex(p("/m"));
        let order: Vec<_> = g.vertices().map(|v| v.to_slash_string()).collect();
        assert_eq!(order, vec!["/a", "/m", "/z"]);
    }
}
