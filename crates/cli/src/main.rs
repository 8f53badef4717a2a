use clap::Parser;

mod commands;
mod watch;

use commands::{Cli, Command};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Graph(args) => commands::graph::run(args),
        Command::Diff(args) => commands::diff::run(args),
        Command::Watch(args) => watch::run(args).await,
        Command::Languages => commands::languages::run(),
    };

    if let Err(err) = result {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
