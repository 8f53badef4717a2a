//! Plain-text delta summary for `diff --summary`.

use depscope_depgraph::GraphDelta;
use std::fmt::Write;

pub fn render_delta_summary(delta: &GraphDelta) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Nodes added: {}", delta.nodes_added.len());
    for node in &delta.nodes_added {
        let _ = writeln!(out, "{node}");
    }

    let _ = writeln!(out, "Nodes removed: {}", delta.nodes_removed.len());
    for node in &delta.nodes_removed {
        let _ = writeln!(out, "{node}");
    }

    let _ = writeln!(out, "Edges added: {}", delta.edges_added.len());
    for (from, to) in &delta.edges_added {
        let _ = writeln!(out, "{from} -> {to}");
    }

    let _ = writeln!(out, "Edges removed: {}", delta.edges_removed.len());
    for (from, to) in &delta.edges_removed {
        let _ = writeln!(out, "{from} -> {to}");
    }

    let _ = writeln!(out, "Semantic findings: {}", delta.findings.len());
    for finding in &delta.findings {
        let _ = writeln!(out, "{finding}");
    }

    out.trim_end().to_string()
}
