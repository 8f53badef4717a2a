//! The static registry of language modules.

use crate::context::ResolverContext;
use crate::error::Result;
use crate::graph::DependencyGraph;
use crate::languages;
use crate::path::AbsolutePath;
use crate::reader::ContentReader;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How complete a language's analysis support is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Maturity {
    Untested,
    Basic,
    Active,
    Stable,
}

impl Maturity {
    pub fn as_str(self) -> &'static str {
        match self {
            Maturity::Untested => "untested",
            Maturity::Basic => "basic",
            Maturity::Active => "active",
            Maturity::Stable => "stable",
        }
    }

    /// Known levels in ascending order.
    pub fn levels() -> &'static [Maturity] {
        &[
            Maturity::Untested,
            Maturity::Basic,
            Maturity::Active,
            Maturity::Stable,
        ]
    }
}

impl fmt::Display for Maturity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One supported language: name, extensions, a resolver factory, and a
/// test-file predicate.
pub trait LanguageModule: Sync {
    fn name(&self) -> &'static str;

    /// Dot-prefixed extensions this module claims.
    fn extensions(&self) -> &'static [&'static str];

    fn maturity(&self) -> Maturity;

    /// Create a resolver for one build pass. Implementations may read
    /// project files up front to build language-specific indices.
    fn new_resolver<'a>(
        &self,
        ctx: &'a ResolverContext,
        reader: &'a dyn ContentReader,
    ) -> Box<dyn ImportResolver + 'a>;

    fn is_test_file(&self, path: &AbsolutePath, reader: &dyn ContentReader) -> bool;
}

/// Resolves one file's imports to project files, with an optional
/// graph-wide finalize pass.
pub trait ImportResolver {
    /// Absolute paths of project files this file depends on, deduplicated
    /// downstream. Candidates must come from the [`ResolverContext`].
    fn resolve_project_imports(
        &mut self,
        path: &AbsolutePath,
        ext: &str,
    ) -> Result<Vec<AbsolutePath>>;

    /// Post-pass over the whole graph; may add edges, never removes them.
    /// Errors here are reported but do not fail the build.
    fn finalize_graph(&mut self, _graph: &mut DependencyGraph) -> Result<()> {
        Ok(())
    }
}

static MODULES: &[&dyn LanguageModule] = &[
    &languages::c::CModule,
    &languages::cpp::CppModule,
    &languages::csharp::CSharpModule,
    &languages::dart::DartModule,
    &languages::golang::GoModule,
    &languages::java::JavaModule,
    &languages::javascript::JavaScriptModule,
    &languages::kotlin::KotlinModule,
    &languages::python::PythonModule,
    &languages::ruby::RubyModule,
    &languages::rust::RustModule,
    &languages::swift::SwiftModule,
    &languages::typescript::TypeScriptModule,
];

/// Supported language modules in deterministic registration order.
pub fn modules() -> &'static [&'static dyn LanguageModule] {
    MODULES
}

/// The module registered for a dot-prefixed extension.
pub fn module_for_extension(ext: &str) -> Option<&'static dyn LanguageModule> {
    MODULES
        .iter()
        .find(|module| module.extensions().contains(&ext))
        .copied()
}

/// One supported language and the extensions that map to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageSupport {
    pub name: String,
    pub extensions: Vec<String>,
    pub maturity: Maturity,
}

/// All supported languages in registration order.
pub fn supported_languages() -> Vec<LanguageSupport> {
    MODULES
        .iter()
        .map(|module| LanguageSupport {
            name: module.name().to_string(),
            extensions: module.extensions().iter().map(|e| e.to_string()).collect(),
            maturity: module.maturity(),
        })
        .collect()
}

/// All supported extensions in sorted order.
pub fn supported_extensions() -> Vec<String> {
    let mut extensions: Vec<String> = MODULES
        .iter()
        .flat_map(|module| module.extensions().iter().map(|e| e.to_string()))
        .collect();
    extensions.sort();
    extensions.dedup();
    extensions
}

/// Whether files with the dot-prefixed extension can be analyzed.
pub fn is_supported_extension(ext: &str) -> bool {
    module_for_extension(ext).is_some()
}

/// Whether a path should be treated as a test file. Detection is delegated
/// to the extension's module; unknown extensions are never test files.
pub fn is_test_file(path: &AbsolutePath, reader: &dyn ContentReader) -> bool {
    match module_for_extension(&path.extension()) {
        Some(module) => module.is_test_file(path, reader),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::MemoryReader;

    #[test]
    fn every_registered_extension_resolves_to_its_module() {
        for module in modules() {
            for ext in module.extensions() {
                let found = module_for_extension(ext).expect("extension registered");
                assert_eq!(found.name(), module.name());
            }
        }
    }

    #[test]
    fn corpus_extensions_are_supported() {
        for ext in [
            ".c", ".h", ".cc", ".cpp", ".cxx", ".hpp", ".hh", ".hxx", ".cs", ".dart", ".go",
            ".java", ".js", ".jsx", ".kt", ".kts", ".py", ".rb", ".rs", ".swift", ".ts", ".tsx",
        ] {
            assert!(is_supported_extension(ext), "missing support for {ext}");
        }
        assert!(!is_supported_extension(".zig"));
    }

    #[test]
    fn supported_extensions_are_sorted_and_unique() {
        let exts = supported_extensions();
        let mut sorted = exts.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(exts, sorted);
    }

    #[test]
    fn unknown_extensions_are_not_test_files() {
        let reader = MemoryReader::new();
        assert!(!is_test_file(
            &AbsolutePath::from_clean("/x/notes.txt"),
            &reader
        ));
    }
}
