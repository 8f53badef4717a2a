//! Optional post-diff semantic analyzers.

use crate::diff::GraphDelta;
use crate::error::{DepgraphError, Result};
use crate::graph::DependencyGraph;
use std::collections::BTreeSet;

/// A semantic analyzer inspects both snapshots and the structural delta
/// and produces human-readable findings.
pub type SemanticAnalyzer<'a> =
    &'a dyn Fn(&DependencyGraph, &DependencyGraph, &GraphDelta) -> Result<Vec<String>>;

/// Apply analyzers in order, concatenating their findings into
/// `delta.findings` (sorted). Absent analyzers are skipped; the first
/// failure aborts the pipeline.
pub fn apply_semantic_analyzers(
    base: &DependencyGraph,
    target: &DependencyGraph,
    mut delta: GraphDelta,
    analyzers: &[Option<SemanticAnalyzer<'_>>],
) -> Result<GraphDelta> {
    if analyzers.is_empty() {
        return Ok(delta);
    }

    let mut findings = Vec::new();
    for analyzer in analyzers.iter().flatten() {
        let mut produced = analyzer(base, target, &delta)
            .map_err(|err| DepgraphError::AnalyzerFailure(err.to_string()))?;
        findings.append(&mut produced);
    }
    findings.sort();
    delta.findings = findings;

    Ok(delta)
}

/// Built-in analyzer: reports dependency cycles present in the target
/// snapshot that the base snapshot did not have.
pub fn new_cycles_analyzer(
    base: &DependencyGraph,
    target: &DependencyGraph,
    _delta: &GraphDelta,
) -> Result<Vec<String>> {
    let base_cycles = cycle_signatures(base);
    let findings = cycle_signatures(target)
        .difference(&base_cycles)
        .map(|cycle| format!("new dependency cycle: {cycle}"))
        .collect();
    Ok(findings)
}

/// Stable textual signature per cyclic SCC: sorted member list.
fn cycle_signatures(graph: &DependencyGraph) -> BTreeSet<String> {
    let annotated =
        crate::annotate::annotate_file_graph(graph.clone(), None, &crate::reader::MemoryReader::new());
    let Ok(annotated) = annotated else {
        return BTreeSet::new();
    };

    annotated
        .cycles
        .iter()
        .map(|cycle| {
            let mut members: Vec<String> =
                cycle.path.iter().map(|p| p.to_slash_string()).collect();
            members.sort();
            members.join(" -> ")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::AbsolutePath;

    fn p(s: &str) -> AbsolutePath {
        AbsolutePath::from_clean(s)
    }

    #[test]
    fn findings_are_concatenated_and_sorted() {
        let base = DependencyGraph::new();
        let target = DependencyGraph::new();
        let delta = GraphDelta::default();

        let first: SemanticAnalyzer<'_> = &|_, _, _| Ok(vec!["b-finding".to_string()]);
        let second: SemanticAnalyzer<'_> = &|_, _, _| Ok(vec!["a-finding".to_string()]);

        let delta =
            apply_semantic_analyzers(&base, &target, delta, &[Some(first), Some(second)]).unwrap();
        assert_eq!(delta.findings, vec!["a-finding", "b-finding"]);
    }

    #[test]
    fn absent_analyzers_are_skipped() {
        let base = DependencyGraph::new();
        let target = DependencyGraph::new();
        let only: SemanticAnalyzer<'_> = &|_, _, _| Ok(vec!["finding".to_string()]);

        let delta =
            apply_semantic_analyzers(&base, &target, GraphDelta::default(), &[None, Some(only)])
                .unwrap();
        assert_eq!(delta.findings, vec!["finding"]);
    }

    #[test]
    fn first_failure_aborts_the_pipeline() {
        let base = DependencyGraph::new();
        let target = DependencyGraph::new();
        let failing: SemanticAnalyzer<'_> =
            &|_, _, _| Err(DepgraphError::AnalyzerFailure("boom".to_string()));
        let never_runs: SemanticAnalyzer<'_> = &|_, _, _| panic!("must not run");

        let err = apply_semantic_analyzers(
            &base,
            &target,
            GraphDelta::default(),
            &[Some(failing), Some(never_runs)],
        )
        .unwrap_err();
        assert!(matches!(err, DepgraphError::AnalyzerFailure(_)));
    }

    #[test]
    fn cycle_analyzer_reports_only_new_cycles() {
        let mut base = DependencyGraph::new();
        base.add_edge(p("/r/a"), p("/r/b"));
        base.add_edge(p("/r/b"), p("/r/a"));

        let mut target = base.clone();
        target.add_edge(p("/r/c"), p("/r/d"));
        target.add_edge(p("/r/d"), p("/r/c"));

        let findings = new_cycles_analyzer(&base, &target, &GraphDelta::default()).unwrap();
        assert_eq!(
            findings,
            vec!["new dependency cycle: /r/c -> /r/d".to_string()]
        );
    }
}
