//! # Depscope Dependency Graph Engine
//!
//! Builds file-level dependency graphs across a fixed set of languages and
//! computes structural diffs between two snapshots of a project.
//!
//! ## Architecture
//!
//! ```text
//! file paths + ContentReader
//!     │
//!     ├──> Graph Builder
//!     │      ├─ ResolverContext (shared per-build indices)
//!     │      ├─ per-language parsers (imports/includes/embeds)
//!     │      └─ per-language resolvers (project-file candidates)
//!     │
//!     ├──> Dependency Graph (adjacency map, intra-project edges only)
//!     │
//!     ├──> Annotator (test tagging, stats, canonical cycles)
//!     │
//!     └──> Differ + semantic analyzers (snapshot deltas)
//! ```
//!
//! The engine is single-threaded and deterministic: for a fixed file set
//! and reader, every output sequence is sorted at a well-defined point.

mod analyzer;
mod annotate;
mod builder;
mod context;
mod diff;
mod error;
mod graph;
mod import;
pub mod languages;
mod path;
mod reader;
mod registry;

pub use analyzer::{apply_semantic_analyzers, new_cycles_analyzer, SemanticAnalyzer};
pub use annotate::{
    annotate_file_graph, AnnotatedGraph, EdgeMetadata, FileCycle, FileMetadata, FileStats,
};
pub use builder::build_dependency_graph;
pub use context::{PackageIndex, ResolverContext};
pub use diff::{diff_graphs, GraphDelta};
pub use error::{DepgraphError, ParseError, Result};
pub use graph::DependencyGraph;
pub use import::{Import, IncludeKind};
pub use path::{AbsolutePath, PathResolver};
pub use reader::{ContentReader, MemoryReader};
pub use registry::{
    is_supported_extension, is_test_file, module_for_extension, modules, supported_extensions,
    supported_languages, ImportResolver, LanguageModule, LanguageSupport, Maturity,
};
