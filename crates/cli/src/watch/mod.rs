//! Live-rebuild loop: watch the repository, rebuild the graph on change,
//! and serve renderings over HTTP/SSE.

mod broker;
mod server;

use anyhow::Context;
use broker::Broker;
use clap::Args;
use depscope_depgraph::{annotate_file_graph, build_dependency_graph};
use depscope_render::{render_graph, OutputFormat};
use depscope_vcs::{list_project_files, repository_root, working_tree_stats, FsContentReader};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Args)]
pub struct WatchArgs {
    /// Git repository path (default: current directory)
    #[arg(short, long, value_name = "PATH", default_value = ".")]
    pub repo: PathBuf,

    /// Port to serve on
    #[arg(short = 'P', long, default_value_t = 7070)]
    pub port: u16,

    /// Debounce interval in seconds between a change and the rebuild
    #[arg(short = 'i', long, default_value_t = 2)]
    pub interval: u64,

    /// Only analyze files with these extensions (repeatable)
    #[arg(long = "include-ext", value_name = "EXT")]
    pub include_ext: Vec<String>,

    /// Skip files with these extensions (repeatable)
    #[arg(long = "exclude-ext", value_name = "EXT")]
    pub exclude_ext: Vec<String>,
}

pub async fn run(args: WatchArgs) -> anyhow::Result<()> {
    let root = repository_root(&args.repo).context("failed to resolve repository")?;
    let broker = Arc::new(Broker::new());

    let filter = ExtensionFilter::new(&args.include_ext, &args.exclude_ext);

    // First snapshot before any filesystem event arrives.
    match rebuild(&root, &filter) {
        Ok(dot) => broker.publish(dot),
        Err(err) => log::warn!("initial build failed: {err:#}"),
    }

    let (event_tx, event_rx) = mpsc::channel::<()>(64);
    let mut watcher: RecommendedWatcher =
        notify::recommended_watcher(move |event: notify::Result<notify::Event>| {
            if event.is_ok() {
                let _ = event_tx.blocking_send(());
            }
        })
        .context("failed to create filesystem watcher")?;
    watcher
        .watch(&root, RecursiveMode::Recursive)
        .context("failed to watch repository")?;

    let rebuild_loop = rebuild_on_change(
        root.clone(),
        filter,
        broker.clone(),
        event_rx,
        Duration::from_secs(args.interval.max(1)),
    );

    let addr = format!("127.0.0.1:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    log::info!("serving live graph on http://{addr}");
    println!("watching {} — live graph on http://{addr}", root.display());

    tokio::select! {
        result = axum::serve(listener, server::router(broker)) => {
            result.context("server error")?;
        }
        _ = rebuild_loop => {}
        _ = tokio::signal::ctrl_c() => {
            log::info!("shutting down watch loop");
        }
    }

    Ok(())
}

/// Debounce filesystem events, then rebuild and publish.
async fn rebuild_on_change(
    root: PathBuf,
    filter: ExtensionFilter,
    broker: Arc<Broker>,
    mut events: mpsc::Receiver<()>,
    debounce: Duration,
) {
    while events.recv().await.is_some() {
        tokio::time::sleep(debounce).await;
        while events.try_recv().is_ok() {}

        let root = root.clone();
        let filter = filter.clone();
        let result =
            tokio::task::spawn_blocking(move || rebuild(&root, &filter)).await;

        match result {
            Ok(Ok(dot)) => broker.publish(dot),
            Ok(Err(err)) => log::warn!("rebuild failed: {err:#}"),
            Err(err) => log::warn!("rebuild task panicked: {err}"),
        }
    }
}

fn rebuild(root: &Path, filter: &ExtensionFilter) -> anyhow::Result<String> {
    let files: Vec<PathBuf> = list_project_files(root)?
        .into_iter()
        .filter(|file| filter.keeps(file))
        .collect();

    let reader = FsContentReader;
    let graph = build_dependency_graph(&files, &reader)?;

    let stats = working_tree_stats(root).ok();
    let annotated = annotate_file_graph(graph, stats.as_ref(), &reader)?;

    Ok(render_graph(&annotated, OutputFormat::Dot)?)
}

#[derive(Debug, Clone, Default)]
struct ExtensionFilter {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl ExtensionFilter {
    fn new(include: &[String], exclude: &[String]) -> Self {
        let normalize = |exts: &[String]| {
            exts.iter()
                .map(|ext| {
                    let ext = ext.trim();
                    if ext.starts_with('.') {
                        ext.to_string()
                    } else {
                        format!(".{ext}")
                    }
                })
                .collect()
        };
        ExtensionFilter {
            include: normalize(include),
            exclude: normalize(exclude),
        }
    }

    fn keeps(&self, file: &Path) -> bool {
        let ext = match file.extension().and_then(|e| e.to_str()) {
            Some(ext) => format!(".{ext}"),
            None => String::new(),
        };
        if self.exclude.contains(&ext) {
            return false;
        }
        self.include.is_empty() || self.include.contains(&ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_filter_normalizes_and_applies() {
        let filter = ExtensionFilter::new(&["go".to_string()], &[".md".to_string()]);
        assert!(filter.keeps(Path::new("/r/main.go")));
        assert!(!filter.keeps(Path::new("/r/notes.md")));
        assert!(!filter.keeps(Path::new("/r/app.ts")));

        let open = ExtensionFilter::new(&[], &[".md".to_string()]);
        assert!(open.keeps(Path::new("/r/app.ts")));
        assert!(!open.keeps(Path::new("/r/notes.md")));
    }
}
