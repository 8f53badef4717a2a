pub mod diff;
pub mod graph;
pub mod languages;

use crate::watch::WatchArgs;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "depscope")]
#[command(about = "File-level dependency graphs and structural diffs for change review")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build and render the dependency graph of a set of files
    Graph(GraphArgs),

    /// Show dependency-graph changes between snapshots
    Diff(DiffArgs),

    /// Rebuild on file changes and serve the graph over HTTP
    Watch(WatchArgs),

    /// Tabulate supported languages
    Languages,
}

#[derive(Args)]
pub struct GraphArgs {
    /// Input files to analyze (repeatable)
    #[arg(short, long = "input", value_name = "PATH")]
    pub inputs: Vec<PathBuf>,

    /// Git repository path; its files are analyzed when no inputs are given
    #[arg(short, long, value_name = "PATH")]
    pub repo: Option<PathBuf>,

    /// Read file contents from this commit instead of the working tree
    #[arg(short, long, value_name = "REV")]
    pub commit: Option<String>,

    /// Output format (dot, mermaid, json)
    #[arg(short, long, default_value = "dot")]
    pub format: String,
}

#[derive(Args)]
pub struct DiffArgs {
    /// Git repository path (default: current directory)
    #[arg(short, long, value_name = "PATH", default_value = ".")]
    pub repo: PathBuf,

    /// Compare committed snapshots: `<rev>` against the working tree, or
    /// `<base>,<target>` against each other
    #[arg(short, long, value_name = "REV[,REV]")]
    pub commit: Option<String>,

    /// Output format (dot, mermaid, json)
    #[arg(short, long, default_value = "dot")]
    pub format: String,

    /// Print a text summary instead of a rendered graph
    #[arg(long)]
    pub summary: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn graph_accepts_repeated_inputs() {
        let cli = Cli::parse_from(["depscope", "graph", "-i", "a.go", "-i", "b.go", "-f", "json"]);
        let Command::Graph(args) = cli.command else {
            panic!("expected graph subcommand");
        };
        assert_eq!(args.inputs.len(), 2);
        assert_eq!(args.format, "json");
    }

    #[test]
    fn diff_parses_commit_pair() {
        let cli = Cli::parse_from(["depscope", "diff", "-c", "abc123,def456", "--summary"]);
        let Command::Diff(args) = cli.command else {
            panic!("expected diff subcommand");
        };
        assert_eq!(args.commit.as_deref(), Some("abc123,def456"));
        assert!(args.summary);
    }
}
