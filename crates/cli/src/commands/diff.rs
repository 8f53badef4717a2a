use super::DiffArgs;
use anyhow::Context;
use depscope_depgraph::{
    apply_semantic_analyzers, build_dependency_graph, diff_graphs, new_cycles_analyzer,
    ContentReader, DependencyGraph,
};
use depscope_render::{parse_output_format, render_delta, render_delta_summary};
use depscope_vcs::{
    changed_files, list_commit_files, list_project_files, resolve_commit, CommitContentReader,
    FsContentReader,
};
use std::path::Path;

/// Which two snapshots to compare.
enum Comparison {
    /// HEAD against the working tree.
    WorkingTree,
    /// A single revision against the working tree.
    CommitToWorkingTree(String),
    /// Two committed revisions.
    Commits(String, String),
}

pub fn run(args: DiffArgs) -> anyhow::Result<()> {
    let format = parse_output_format(&args.format)?;
    let comparison = parse_comparison(&args.repo, args.commit.as_deref())?;

    let (base_graph, target_graph, changed) = build_snapshots(&args.repo, &comparison)?;

    let mut delta = diff_graphs(&base_graph, &target_graph)?;
    delta.changed_nodes = changed;

    let delta = apply_semantic_analyzers(
        &base_graph,
        &target_graph,
        delta,
        &[Some(&new_cycles_analyzer)],
    )?;

    if args.summary {
        println!("{}", render_delta_summary(&delta));
    } else {
        println!("{}", render_delta(&delta, format)?);
    }
    Ok(())
}

fn parse_comparison(repo: &Path, commit: Option<&str>) -> anyhow::Result<Comparison> {
    let Some(spec) = commit else {
        return Ok(Comparison::WorkingTree);
    };

    match spec.split_once(',') {
        Some((base, target)) => {
            let base = resolve_commit(repo, base.trim()).context("bad base revision")?;
            let target = resolve_commit(repo, target.trim()).context("bad target revision")?;
            Ok(Comparison::Commits(base, target))
        }
        None => {
            let base = resolve_commit(repo, spec.trim()).context("bad revision")?;
            Ok(Comparison::CommitToWorkingTree(base))
        }
    }
}

fn build_snapshots(
    repo: &Path,
    comparison: &Comparison,
) -> anyhow::Result<(
    DependencyGraph,
    DependencyGraph,
    std::collections::BTreeSet<depscope_depgraph::AbsolutePath>,
)> {
    let (base_rev, target_rev) = match comparison {
        Comparison::WorkingTree => ("HEAD".to_string(), None),
        Comparison::CommitToWorkingTree(base) => (base.clone(), None),
        Comparison::Commits(base, target) => (base.clone(), Some(target.clone())),
    };

    let base_graph = build_commit_graph(repo, &base_rev).context("failed to build base graph")?;

    let target_graph = match &target_rev {
        Some(rev) => build_commit_graph(repo, rev).context("failed to build target graph")?,
        None => {
            let files = list_project_files(repo)?;
            build_dependency_graph(&files, &FsContentReader)
                .context("failed to build working-tree graph")?
        }
    };

    let changed = changed_files(repo, &base_rev, target_rev.as_deref())
        .unwrap_or_else(|err| {
            log::warn!("skipping changed-file detection: {err}");
            Default::default()
        });

    Ok((base_graph, target_graph, changed))
}

fn build_commit_graph(repo: &Path, rev: &str) -> anyhow::Result<DependencyGraph> {
    let files = list_commit_files(repo, rev)?;
    let reader = CommitContentReader::new(repo, rev)?;
    build_dependency_graph(&files, &reader as &dyn ContentReader).map_err(Into::into)
}
