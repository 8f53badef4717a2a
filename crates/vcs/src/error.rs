use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, VcsError>;

#[derive(Error, Debug)]
pub enum VcsError {
    #[error("repository path does not exist: {0}")]
    MissingRepository(PathBuf),

    #[error("{0} is not a git repository (use 'git init' to initialize)")]
    NotARepository(PathBuf),

    #[error("git command not found - install Git to use repository features")]
    GitUnavailable,

    #[error("git command failed: {0}")]
    GitFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
