//! The language-neutral import classification produced by per-language
//! parsers.

/// One import/include statement extracted from a source file, in source
/// order. Classification happens per language; the resolver layer only acts
/// on [`Import::Internal`], [`Import::EmbedDirective`], and
/// [`Import::Include`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Import {
    /// Built-in / language-provided module.
    StandardLibrary { path: String },
    /// Third-party package.
    External { path: String },
    /// Candidate intra-project reference.
    Internal { path: String, is_wildcard: bool },
    /// Embed-like directive (`//go:embed`, `include_str!`, ...).
    EmbedDirective { pattern: String },
    /// Textual inclusion (`#include <...>` vs `#include "..."`).
    Include { path: String, kind: IncludeKind },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncludeKind {
    /// Angle-bracket form; searched on include paths the project does not
    /// control.
    System,
    /// Quoted form; resolved relative to the including file.
    Local,
}

impl Import {
    pub fn internal(path: impl Into<String>) -> Self {
        Import::Internal {
            path: path.into(),
            is_wildcard: false,
        }
    }

    pub fn wildcard(path: impl Into<String>) -> Self {
        Import::Internal {
            path: path.into(),
            is_wildcard: true,
        }
    }

    pub fn external(path: impl Into<String>) -> Self {
        Import::External { path: path.into() }
    }

    pub fn standard_library(path: impl Into<String>) -> Self {
        Import::StandardLibrary { path: path.into() }
    }

    /// The operand as written in source, regardless of variant.
    pub fn operand(&self) -> &str {
        match self {
            Import::StandardLibrary { path }
            | Import::External { path }
            | Import::Internal { path, .. }
            | Import::Include { path, .. } => path,
            Import::EmbedDirective { pattern } => pattern,
        }
    }
}
