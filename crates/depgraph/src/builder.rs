//! Orchestrates language modules over a file set to produce the graph.

use crate::context::ResolverContext;
use crate::error::{DepgraphError, Result};
use crate::graph::DependencyGraph;
use crate::path::{AbsolutePath, PathResolver};
use crate::reader::ContentReader;
use crate::registry::{self, ImportResolver};
use std::collections::BTreeMap;
use std::path::Path;

/// Build a dependency graph over `files`, reading contents through `reader`.
///
/// Only edges whose endpoints are both in the supplied set are produced.
/// Files with unsupported extensions become isolated vertices. Any file
/// whose imports cannot be read or parsed fails the whole build; additive
/// finalize passes that fail are logged and skipped instead.
pub fn build_dependency_graph<P: AsRef<Path>>(
    files: &[P],
    reader: &dyn ContentReader,
) -> Result<DependencyGraph> {
    let path_resolver = PathResolver::new("")?;
    let mut canonical: Vec<AbsolutePath> = files
        .iter()
        .map(|f| path_resolver.resolve(f.as_ref()))
        .collect::<Result<_>>()?;
    canonical.sort();
    canonical.dedup();

    let ctx = ResolverContext::build(&canonical);
    let mut graph = DependencyGraph::new();

    // One resolver per language, shared across that language's files so
    // index construction happens once.
    let mut resolvers: BTreeMap<&'static str, Box<dyn ImportResolver + '_>> = BTreeMap::new();

    for file in &canonical {
        let ext = file.extension();
        let Some(module) = registry::module_for_extension(&ext) else {
            graph.add_vertex(file.clone());
            continue;
        };

        let resolver = resolvers
            .entry(module.name())
            .or_insert_with(|| module.new_resolver(&ctx, reader));

        let dependencies = resolver.resolve_project_imports(file, &ext)?;
        for dependency in &dependencies {
            if !ctx.contains(dependency) {
                return Err(DepgraphError::ResolverFailure {
                    path: file.clone(),
                    candidate: dependency.clone(),
                });
            }
        }

        graph.insert_with_neighbors(file.clone(), dependencies);
    }

    // Finalize passes are additive; a failure loses supplemental edges for
    // that language but keeps the graph usable.
    for (language, resolver) in resolvers.iter_mut() {
        if let Err(err) = resolver.finalize_graph(&mut graph) {
            log::warn!("skipping {language} finalize pass: {err}");
        }
    }

    log::debug!(
        "built dependency graph: {} vertices, {} edges",
        graph.vertex_count(),
        graph.edge_count()
    );

    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::MemoryReader;

    #[test]
    fn unsupported_extensions_become_isolated_vertices() {
        let reader = MemoryReader::new().with("/p/readme.txt", "hello");
        let graph = build_dependency_graph(&["/p/readme.txt"], &reader).unwrap();

        let vertex = AbsolutePath::from_clean("/p/readme.txt");
        assert!(graph.contains_vertex(&vertex));
        assert!(graph.out_neighbors(&vertex).is_empty());
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn unreadable_supported_file_fails_the_build() {
        let reader = MemoryReader::new();
        let err = build_dependency_graph(&["/p/a.go"], &reader).unwrap_err();
        assert!(matches!(err, DepgraphError::ContentUnavailable { .. }));
    }

    #[test]
    fn duplicate_inputs_collapse_to_one_vertex() {
        let reader = MemoryReader::new().with("/p/readme.txt", "hello");
        let graph =
            build_dependency_graph(&["/p/readme.txt", "/p/./readme.txt"], &reader).unwrap();
        assert_eq!(graph.vertex_count(), 1);
    }
}
