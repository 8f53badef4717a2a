//! Mermaid flowchart rendering.

use depscope_depgraph::{AbsolutePath, AnnotatedGraph, GraphDelta};
use std::collections::BTreeMap;
use std::fmt::Write;

/// Stable node ids (`n0`, `n1`, ...) assigned in sorted-vertex order.
fn assign_ids<'a>(nodes: impl Iterator<Item = &'a AbsolutePath>) -> BTreeMap<&'a AbsolutePath, String> {
    let mut ids = BTreeMap::new();
    for node in nodes {
        let next = format!("n{}", ids.len());
        ids.entry(node).or_insert(next);
    }
    ids
}

pub fn render_graph(annotated: &AnnotatedGraph) -> String {
    let mut out = String::new();
    out.push_str("flowchart LR\n");

    let ids = assign_ids(annotated.graph.vertices());
    for (node, id) in &ids {
        let _ = writeln!(out, "    {id}[\"{}\"]", node.file_name());
    }

    let mut cycle_links = Vec::new();
    for (index, ((from, to), metadata)) in annotated.edges.iter().enumerate() {
        let _ = writeln!(out, "    {} --> {}", ids[from], ids[to]);
        if metadata.in_cycle {
            cycle_links.push(index.to_string());
        }
    }

    if !cycle_links.is_empty() {
        let _ = writeln!(
            out,
            "    linkStyle {} stroke:#b22222,stroke-width:2px",
            cycle_links.join(",")
        );
    }

    let test_nodes: Vec<&str> = annotated
        .files
        .iter()
        .filter(|(_, metadata)| metadata.is_test)
        .filter_map(|(path, _)| ids.get(path).map(String::as_str))
        .collect();
    if !test_nodes.is_empty() {
        out.push_str("    classDef test fill:#d9f2d9,stroke:#2e8b57\n");
        let _ = writeln!(out, "    class {} test", test_nodes.join(","));
    }

    out
}

pub fn render_delta(delta: &GraphDelta) -> String {
    let mut out = String::new();
    out.push_str("flowchart LR\n");

    let ids = assign_ids(
        delta
            .nodes_added
            .iter()
            .chain(delta.nodes_removed.iter())
            .chain(delta.changed_nodes.iter())
            .chain(
                delta
                    .edges_added
                    .iter()
                    .chain(delta.edges_removed.iter())
                    .flat_map(|(from, to)| [from, to]),
            ),
    );
    for (node, id) in &ids {
        let _ = writeln!(out, "    {id}[\"{}\"]", node.file_name());
    }

    for (from, to) in &delta.edges_added {
        let _ = writeln!(out, "    {} --> {}", ids[from], ids[to]);
    }
    for (from, to) in &delta.edges_removed {
        let _ = writeln!(out, "    {} -.-> {}", ids[from], ids[to]);
    }

    let class_line = |nodes: &[AbsolutePath], ids: &BTreeMap<&AbsolutePath, String>| {
        nodes
            .iter()
            .filter_map(|n| ids.get(n).map(String::as_str))
            .collect::<Vec<_>>()
            .join(",")
    };

    let added = class_line(&delta.nodes_added, &ids);
    if !added.is_empty() {
        out.push_str("    classDef added fill:#d9f2d9,stroke:#2e8b57,color:#000000\n");
        let _ = writeln!(out, "    class {added} added");
    }
    let removed = class_line(&delta.nodes_removed, &ids);
    if !removed.is_empty() {
        out.push_str("    classDef removed fill:#f8d7da,stroke:#b22222,color:#000000\n");
        let _ = writeln!(out, "    class {removed} removed");
    }

    out
}
