use crate::path::AbsolutePath;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DepgraphError>;

#[derive(Error, Debug)]
pub enum DepgraphError {
    #[error("path cannot be empty")]
    EmptyPath,

    #[error("failed to resolve path {path}: {source}")]
    PathResolution {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to read {path}: {source}")]
    ContentUnavailable {
        path: AbsolutePath,
        source: std::io::Error,
    },

    #[error("failed to parse imports in {path}: {source}")]
    ParseFailure {
        path: AbsolutePath,
        source: ParseError,
    },

    #[error("resolver produced a path outside the supplied file set: {path} -> {candidate}")]
    ResolverFailure {
        path: AbsolutePath,
        candidate: AbsolutePath,
    },

    #[error("semantic analyzer failed: {0}")]
    AnalyzerFailure(String),
}

/// Error raised by a per-language import parser.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("source is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("{0}")]
    Syntax(String),
}
