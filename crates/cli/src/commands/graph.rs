use super::GraphArgs;
use anyhow::{bail, Context};
use depscope_depgraph::{
    annotate_file_graph, build_dependency_graph, ContentReader, PathResolver,
};
use depscope_render::{parse_output_format, render_graph};
use depscope_vcs::{
    list_commit_files, list_project_files, working_tree_stats, CommitContentReader,
    FsContentReader,
};
use std::path::PathBuf;

pub fn run(args: GraphArgs) -> anyhow::Result<()> {
    let format = parse_output_format(&args.format)?;

    let files = collect_files(&args)?;
    if files.is_empty() {
        bail!("no files to analyze; pass --input paths or --repo");
    }

    let reader: Box<dyn ContentReader> = match (&args.repo, &args.commit) {
        (Some(repo), Some(commit)) => Box::new(
            CommitContentReader::new(repo, commit)
                .context("failed to open commit reader")?,
        ),
        (None, Some(_)) => bail!("--commit requires --repo"),
        _ => Box::new(FsContentReader),
    };

    let graph = build_dependency_graph(&files, reader.as_ref())
        .context("failed to build dependency graph")?;

    // Working-tree stats only make sense against a live repository.
    let stats = match (&args.repo, &args.commit) {
        (Some(repo), None) => match working_tree_stats(repo) {
            Ok(stats) => Some(stats),
            Err(err) => {
                log::warn!("skipping file stats: {err}");
                None
            }
        },
        _ => None,
    };

    let annotated = annotate_file_graph(graph, stats.as_ref(), reader.as_ref())
        .context("failed to annotate dependency graph")?;

    println!("{}", render_graph(&annotated, format)?);
    Ok(())
}

fn collect_files(args: &GraphArgs) -> anyhow::Result<Vec<PathBuf>> {
    if !args.inputs.is_empty() {
        let base = args
            .repo
            .as_deref()
            .map(|p| p.to_path_buf())
            .unwrap_or_default();
        let resolver = PathResolver::new(base)?;
        return args
            .inputs
            .iter()
            .map(|input| {
                resolver
                    .resolve(input)
                    .map(|abs| abs.as_path().to_path_buf())
                    .map_err(Into::into)
            })
            .collect();
    }

    let Some(repo) = &args.repo else {
        return Ok(Vec::new());
    };

    let files = match &args.commit {
        Some(commit) => list_commit_files(repo, commit)?,
        None => list_project_files(repo)?,
    };
    Ok(files)
}
