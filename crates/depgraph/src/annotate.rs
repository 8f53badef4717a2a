//! File-level metadata, cycle detection, and the annotated graph.

use crate::error::Result;
use crate::graph::DependencyGraph;
use crate::path::AbsolutePath;
use crate::reader::ContentReader;
use crate::registry;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Version-control statistics for one file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStats {
    pub additions: u32,
    pub deletions: u32,
    pub is_new: bool,
}

/// Metadata attached to one graph vertex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub is_test: bool,
    pub extension: String,
    pub stats: Option<FileStats>,
}

/// Metadata attached to one graph edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeMetadata {
    pub in_cycle: bool,
}

/// The canonical vertex sequence of one cycle; the closing edge from the
/// last vertex back to the first is implicit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCycle {
    pub path: Vec<AbsolutePath>,
}

/// A dependency graph decorated with file, edge, and cycle metadata.
#[derive(Debug, Clone)]
pub struct AnnotatedGraph {
    pub graph: DependencyGraph,
    pub files: BTreeMap<AbsolutePath, FileMetadata>,
    pub edges: BTreeMap<(AbsolutePath, AbsolutePath), EdgeMetadata>,
    pub cycles: Vec<FileCycle>,
}

/// Annotate a graph with test-file tagging, optional per-file stats, and
/// canonical cycle metadata.
pub fn annotate_file_graph(
    graph: DependencyGraph,
    stats: Option<&BTreeMap<AbsolutePath, FileStats>>,
    reader: &dyn ContentReader,
) -> Result<AnnotatedGraph> {
    let mut files = BTreeMap::new();
    let mut edges = BTreeMap::new();

    for vertex in graph.vertices() {
        let metadata = FileMetadata {
            is_test: registry::is_test_file(vertex, reader),
            extension: vertex.extension(),
            stats: stats.and_then(|s| s.get(vertex).copied()),
        };
        files.insert(vertex.clone(), metadata);

        for neighbor in graph.out_neighbors(vertex) {
            edges.insert(
                (vertex.clone(), neighbor.clone()),
                EdgeMetadata::default(),
            );
        }
    }

    let (cycles, cycle_edges) = find_canonical_cycles(&graph);
    for edge in cycle_edges {
        if let Some(metadata) = edges.get_mut(&edge) {
            metadata.in_cycle = true;
        }
    }

    Ok(AnnotatedGraph {
        graph,
        files,
        edges,
        cycles,
    })
}

/// Canonical cycles of the graph plus the edges lying on their closing
/// paths. Cycles are ordered by their smallest vertex.
fn find_canonical_cycles(
    graph: &DependencyGraph,
) -> (Vec<FileCycle>, BTreeSet<(AbsolutePath, AbsolutePath)>) {
    let mut cycles = Vec::new();
    let mut cycle_edges = BTreeSet::new();

    for scc in cyclic_components(graph) {
        let path_with_closure = canonical_cycle_path(graph, &scc);
        if path_with_closure.len() < 2 {
            continue;
        }

        cycles.push(FileCycle {
            path: path_with_closure[..path_with_closure.len() - 1].to_vec(),
        });

        for pair in path_with_closure.windows(2) {
            cycle_edges.insert((pair[0].clone(), pair[1].clone()));
        }
    }

    (cycles, cycle_edges)
}

/// Strongly-connected components that contain a cycle (size > 1, or a
/// single vertex with a self-edge), each sorted internally and ordered by
/// smallest vertex.
fn cyclic_components(graph: &DependencyGraph) -> Vec<Vec<AbsolutePath>> {
    let vertices: Vec<&AbsolutePath> = graph.vertices().collect();
    let mut indices: BTreeMap<&AbsolutePath, NodeIndex> = BTreeMap::new();
    let mut petgraph: DiGraph<(), ()> = DiGraph::with_capacity(vertices.len(), 0);

    for &vertex in &vertices {
        indices.insert(vertex, petgraph.add_node(()));
    }
    for (from, to) in graph.edges() {
        petgraph.add_edge(indices[from], indices[to], ());
    }

    let mut components: Vec<Vec<AbsolutePath>> = tarjan_scc(&petgraph)
        .into_iter()
        .map(|component| {
            let mut members: Vec<AbsolutePath> = component
                .into_iter()
                .map(|idx| vertices[idx.index()].clone())
                .collect();
            members.sort();
            members
        })
        .filter(|members| {
            members.len() > 1 || graph.has_edge(&members[0], &members[0])
        })
        .collect();

    components.sort_by(|a, b| a[0].cmp(&b[0]));
    components
}

/// The canonical cycle path of a cyclic SCC, including the closing vertex:
/// a depth-first search from the lexicographically smallest member,
/// restricted to the SCC, visiting out-neighbors in sorted order, looking
/// for a way back to the start of length >= 2. Implemented with an explicit
/// stack so pathological components cannot overflow the call stack.
fn canonical_cycle_path(graph: &DependencyGraph, scc: &[AbsolutePath]) -> Vec<AbsolutePath> {
    let Some(start) = scc.first() else {
        return Vec::new();
    };
    if scc.len() == 1 {
        return vec![start.clone(), start.clone()];
    }

    let allowed: BTreeSet<&AbsolutePath> = scc.iter().collect();
    let sorted_neighbors = |vertex: &AbsolutePath| -> Vec<AbsolutePath> {
        let mut neighbors: Vec<AbsolutePath> = graph
            .out_neighbors(vertex)
            .iter()
            .filter(|n| allowed.contains(n))
            .cloned()
            .collect();
        neighbors.sort();
        neighbors
    };

    let mut path: Vec<AbsolutePath> = vec![start.clone()];
    let mut in_path: BTreeSet<AbsolutePath> = BTreeSet::from([start.clone()]);
    let mut frames: Vec<(Vec<AbsolutePath>, usize)> = vec![(sorted_neighbors(start), 0)];

    while let Some((neighbors, cursor)) = frames.last_mut() {
        if *cursor >= neighbors.len() {
            frames.pop();
            if let Some(backtracked) = path.pop() {
                in_path.remove(&backtracked);
            }
            continue;
        }

        let next = neighbors[*cursor].clone();
        *cursor += 1;

        if next == *start && path.len() > 1 {
            path.push(start.clone());
            return path;
        }
        if in_path.contains(&next) {
            continue;
        }

        in_path.insert(next.clone());
        frames.push((sorted_neighbors(&next), 0));
        path.push(next);
    }

    // All cyclic SCCs admit a closing path, so this is unreachable in
    // practice; fall back to the sorted member list to keep metadata
    // populated.
    let mut fallback = scc.to_vec();
    fallback.push(start.clone());
    fallback
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::MemoryReader;

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
    fn detects_cycles_and_marks_edges() {
        // {A->B, B->C, C->A, D->D, E->F}
        let mut graph = graph_of(&[
            ("/r/a", "/r/b"),
            ("/r/b", "/r/c"),
            ("/r/c", "/r/a"),
            ("/r/e", "/r/f"),
        ]);
        graph.add_edge(p("/r/d"), p("/r/d"));

        let reader = MemoryReader::new();
        let annotated = annotate_file_graph(graph, None, &reader).unwrap();

        let paths: Vec<Vec<String>> = annotated
            .cycles
            .iter()
            .map(|c| c.path.iter().map(|v| v.to_slash_string()).collect())
            .collect();
        assert_eq!(
            paths,
            vec![vec!["/r/a", "/r/b", "/r/c"], vec!["/r/d"]]
        );

        let in_cycle = |from: &str, to: &str| {
            annotated.edges[&(p(from), p(to))].in_cycle
        };
        assert!(in_cycle("/r/a", "/r/b"));
        assert!(in_cycle("/r/b", "/r/c"));
        assert!(in_cycle("/r/c", "/r/a"));
        assert!(in_cycle("/r/d", "/r/d"));
        assert!(!in_cycle("/r/e", "/r/f"));
    }

    #[test]
    fn canonical_path_starts_at_smallest_vertex() {
        let graph = graph_of(&[("/r/z", "/r/m"), ("/r/m", "/r/z")]);
        let reader = MemoryReader::new();
        let annotated = annotate_file_graph(graph, None, &reader).unwrap();

        assert_eq!(annotated.cycles.len(), 1);
        assert_eq!(annotated.cycles[0].path[0], p("/r/m"));
    }

    #[test]
    fn smallest_vertex_is_chosen_by_byte_order() {
        // "/r/a-b" is the byte-wise smallest member ('-' < '/'), even
        // though PathBuf's component order would pick "/r/a/b".
        let graph = graph_of(&[("/r/a/b", "/r/a-b"), ("/r/a-b", "/r/a/b")]);
        let reader = MemoryReader::new();
        let annotated = annotate_file_graph(graph, None, &reader).unwrap();

        assert_eq!(annotated.cycles.len(), 1);
        assert_eq!(annotated.cycles[0].path[0], p("/r/a-b"));
    }

    #[test]
    fn off_path_edges_in_cyclic_scc_stay_unmarked() {
        // Two interleaved cycles over {a,b,c}; the canonical witness is
        // a->b->a, leaving the a->c->a loop unmarked.
        let graph = graph_of(&[
            ("/r/a", "/r/b"),
            ("/r/b", "/r/a"),
            ("/r/a", "/r/c"),
            ("/r/c", "/r/a"),
        ]);
        let reader = MemoryReader::new();
        let annotated = annotate_file_graph(graph, None, &reader).unwrap();

        assert_eq!(annotated.cycles.len(), 1);
        assert_eq!(
            annotated.cycles[0]
                .path
                .iter()
                .map(|v| v.to_slash_string())
                .collect::<Vec<_>>(),
            vec!["/r/a", "/r/b"]
        );
        assert!(annotated.edges[&(p("/r/a"), p("/r/b"))].in_cycle);
        assert!(annotated.edges[&(p("/r/b"), p("/r/a"))].in_cycle);
        assert!(!annotated.edges[&(p("/r/a"), p("/r/c"))].in_cycle);
        assert!(!annotated.edges[&(p("/r/c"), p("/r/a"))].in_cycle);
    }

    #[test]
    fn attaches_stats_and_test_tags() {
        let graph = graph_of(&[("/p/m_test.go", "/p/m.go")]);
        let mut stats = BTreeMap::new();
        stats.insert(
            p("/p/m.go"),
            FileStats {
                additions: 3,
                deletions: 1,
                is_new: false,
            },
        );

        let reader = MemoryReader::new()
            .with("/p/m.go", "package p\n")
            .with("/p/m_test.go", "package p\n");
        let annotated = annotate_file_graph(graph, Some(&stats), &reader).unwrap();

        assert!(annotated.files[&p("/p/m_test.go")].is_test);
        assert!(!annotated.files[&p("/p/m.go")].is_test);
        assert_eq!(annotated.files[&p("/p/m.go")].stats.unwrap().additions, 3);
        assert_eq!(annotated.files[&p("/p/m_test.go")].stats, None);
        assert_eq!(annotated.files[&p("/p/m.go")].extension, ".go");
    }
}
