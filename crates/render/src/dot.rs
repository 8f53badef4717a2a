//! Graphviz DOT rendering for annotated graphs and deltas.

use depscope_depgraph::{AnnotatedGraph, GraphDelta};
use std::collections::BTreeSet;
use std::fmt::Write;

/// Render an annotated graph: base-name labels, test files filled green,
/// in-cycle edges red, stats appended to labels when present.
pub fn render_graph(annotated: &AnnotatedGraph) -> String {
    let mut out = String::new();
    out.push_str("digraph dependencies {\n");
    out.push_str("  rankdir=LR;\n");
    out.push_str("  node [shape=box];\n\n");

    for (path, metadata) in &annotated.files {
        let mut label = path.file_name().to_string();
        if let Some(stats) = &metadata.stats {
            let _ = write!(label, "\\n+{} -{}", stats.additions, stats.deletions);
        }

        let mut attrs = vec![format!("label=\"{label}\"")];
        if metadata.is_test {
            attrs.push("style=filled".to_string());
            attrs.push("fillcolor=lightgreen".to_string());
        }
        if metadata.stats.as_ref().is_some_and(|s| s.is_new) {
            attrs.push("color=forestgreen".to_string());
            attrs.push("penwidth=2".to_string());
        }

        let _ = writeln!(out, "  \"{path}\" [{}];", attrs.join(", "));
    }
    out.push('\n');

    for ((from, to), metadata) in &annotated.edges {
        if metadata.in_cycle {
            let _ = writeln!(out, "  \"{from}\" -> \"{to}\" [color=red];");
        } else {
            let _ = writeln!(out, "  \"{from}\" -> \"{to}\";");
        }
    }

    out.push_str("}\n");
    out
}

/// Render a delta: added edges solid, removed edges dashed, added nodes
/// green, removed nodes red.
pub fn render_delta(delta: &GraphDelta) -> String {
    let mut out = String::new();
    out.push_str("digraph dependency_changes {\n");
    out.push_str("  rankdir=LR;\n");
    out.push_str("  node [shape=box];\n\n");

    let added: BTreeSet<_> = delta.nodes_added.iter().collect();
    let removed: BTreeSet<_> = delta.nodes_removed.iter().collect();

    let mut nodes = BTreeSet::new();
    nodes.extend(delta.nodes_added.iter());
    nodes.extend(delta.nodes_removed.iter());
    nodes.extend(delta.changed_nodes.iter());
    for (from, to) in delta.edges_added.iter().chain(delta.edges_removed.iter()) {
        nodes.insert(from);
        nodes.insert(to);
    }

    for node in &nodes {
        let label = node.file_name();
        if added.contains(node) {
            let _ = writeln!(
                out,
                "  \"{node}\" [label=\"{label}\", style=filled, fillcolor=\"#d9f2d9\"];"
            );
        } else if removed.contains(node) {
            let _ = writeln!(
                out,
                "  \"{node}\" [label=\"{label}\", style=filled, fillcolor=\"#f8d7da\"];"
            );
        } else {
            let _ = writeln!(out, "  \"{node}\" [label=\"{label}\"];");
        }
    }
    out.push('\n');

    for (from, to) in &delta.edges_added {
        let _ = writeln!(out, "  \"{from}\" -> \"{to}\" [color=forestgreen];");
    }
    for (from, to) in &delta.edges_removed {
        let _ = writeln!(out, "  \"{from}\" -> \"{to}\" [color=firebrick, style=dashed];");
    }

    out.push_str("}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use depscope_depgraph::{
        annotate_file_graph, AbsolutePath, DependencyGraph, MemoryReader,
    };

    #[test]
    fn graph_rendering_marks_tests_and_cycles() {
        let mut graph = DependencyGraph::new();
        graph.add_edge(
            AbsolutePath::from_clean("/p/a_test.go"),
            AbsolutePath::from_clean("/p/b.go"),
        );
        graph.add_edge(
            AbsolutePath::from_clean("/p/b.go"),
            AbsolutePath::from_clean("/p/a_test.go"),
        );

        let reader = MemoryReader::new();
        let annotated = annotate_file_graph(graph, None, &reader).unwrap();
        let dot = render_graph(&annotated);

        assert!(dot.starts_with("digraph dependencies {"));
        assert!(dot.contains("fillcolor=lightgreen"));
        assert!(dot.contains("[color=red]"));
        assert!(dot.contains("\"/p/a_test.go\" -> \"/p/b.go\""));
    }

    #[test]
    fn delta_rendering_separates_added_and_removed() {
        let delta = GraphDelta {
            nodes_added: vec![AbsolutePath::from_clean("/r/new.rs")],
            nodes_removed: vec![AbsolutePath::from_clean("/r/old.rs")],
            edges_added: vec![(
                AbsolutePath::from_clean("/r/main.rs"),
                AbsolutePath::from_clean("/r/new.rs"),
            )],
            edges_removed: vec![(
                AbsolutePath::from_clean("/r/main.rs"),
                AbsolutePath::from_clean("/r/old.rs"),
            )],
            ..GraphDelta::default()
        };

        let dot = render_delta(&delta);
        assert!(dot.contains("#d9f2d9"));
        assert!(dot.contains("#f8d7da"));
        assert!(dot.contains("style=dashed"));
    }
}
