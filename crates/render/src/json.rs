//! JSON rendering via serde views.
//!
//! Edge maps are keyed by path pairs in the core model; JSON gets them as
//! arrays of records instead so keys stay plain strings.

use crate::error::Result;
use depscope_depgraph::{AnnotatedGraph, FileStats, GraphDelta};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Serialize)]
struct GraphView<'a> {
    files: BTreeMap<String, FileView<'a>>,
    edges: Vec<EdgeView>,
    cycles: Vec<Vec<String>>,
}

#[derive(Serialize)]
struct FileView<'a> {
    is_test: bool,
    extension: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<&'a FileStats>,
    dependencies: Vec<String>,
}

#[derive(Serialize)]
struct EdgeView {
    from: String,
    to: String,
    in_cycle: bool,
}

pub fn render_graph(annotated: &AnnotatedGraph) -> Result<String> {
    let files = annotated
        .files
        .iter()
        .map(|(path, metadata)| {
            let dependencies = annotated
                .graph
                .out_neighbors(path)
                .iter()
                .map(|dep| dep.to_slash_string())
                .collect();
            (
                path.to_slash_string(),
                FileView {
                    is_test: metadata.is_test,
                    extension: &metadata.extension,
                    stats: metadata.stats.as_ref(),
                    dependencies,
                },
            )
        })
        .collect();

    let edges = annotated
        .edges
        .iter()
        .map(|((from, to), metadata)| EdgeView {
            from: from.to_slash_string(),
            to: to.to_slash_string(),
            in_cycle: metadata.in_cycle,
        })
        .collect();

    let cycles = annotated
        .cycles
        .iter()
        .map(|cycle| cycle.path.iter().map(|p| p.to_slash_string()).collect())
        .collect();

    let view = GraphView {
        files,
        edges,
        cycles,
    };
    Ok(serde_json::to_string_pretty(&view)?)
}

#[derive(Serialize)]
struct DeltaView {
    nodes_added: Vec<String>,
    nodes_removed: Vec<String>,
    edges_added: Vec<DeltaEdgeView>,
    edges_removed: Vec<DeltaEdgeView>,
    findings: Vec<String>,
    changed_nodes: Vec<String>,
}

#[derive(Serialize)]
struct DeltaEdgeView {
    from: String,
    to: String,
}

pub fn render_delta(delta: &GraphDelta) -> Result<String> {
    fn edge_views(
        edges: &[(depscope_depgraph::AbsolutePath, depscope_depgraph::AbsolutePath)],
    ) -> Vec<DeltaEdgeView> {
        edges
            .iter()
            .map(|(from, to)| DeltaEdgeView {
                from: from.to_slash_string(),
                to: to.to_slash_string(),
            })
            .collect()
    }

    let view = DeltaView {
        nodes_added: delta.nodes_added.iter().map(|p| p.to_slash_string()).collect(),
        nodes_removed: delta
            .nodes_removed
            .iter()
            .map(|p| p.to_slash_string())
            .collect(),
        edges_added: edge_views(&delta.edges_added),
        edges_removed: edge_views(&delta.edges_removed),
        findings: delta.findings.clone(),
        changed_nodes: delta
            .changed_nodes
            .iter()
            .map(|p| p.to_slash_string())
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&view)?)
}
