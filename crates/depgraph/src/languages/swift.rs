//! Swift: imports name modules, not files, so parsing is tree-sitter
//! backed but resolution produces no intra-project edges.

use super::read_source;
use crate::context::ResolverContext;
use crate::error::{DepgraphError, ParseError, Result};
use crate::import::Import;
use crate::path::AbsolutePath;
use crate::reader::ContentReader;
use crate::registry::{ImportResolver, LanguageModule, Maturity};
use tree_sitter::{Node, Parser};

pub struct SwiftModule;

impl LanguageModule for SwiftModule {
    fn name(&self) -> &'static str {
        "Swift"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".swift"]
    }

    fn maturity(&self) -> Maturity {
        Maturity::Basic
    }

    fn new_resolver<'a>(
        &self,
        _ctx: &'a ResolverContext,
        reader: &'a dyn ContentReader,
    ) -> Box<dyn ImportResolver + 'a> {
        Box::new(SwiftResolver { reader })
    }

    fn is_test_file(&self, path: &AbsolutePath, _reader: &dyn ContentReader) -> bool {
        is_test_file(path)
    }
}

pub fn is_test_file(path: &AbsolutePath) -> bool {
    let name = path.file_name();
    name.ends_with("Tests.swift") || name.ends_with("Test.swift")
}

/// Parse import declarations via the tree-sitter Swift grammar. Module
/// imports are classified External; Foundation-family modules are the
/// standard library.
pub fn parse_imports(source: &str) -> std::result::Result<Vec<Import>, ParseError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_swift::LANGUAGE.into())
        .map_err(|err| ParseError::Syntax(format!("failed to load Swift grammar: {err}")))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| ParseError::Syntax("failed to parse Swift source".to_string()))?;

    let mut imports = Vec::new();
    collect_imports(tree.root_node(), source, &mut imports);
    Ok(imports)
}

fn collect_imports(node: Node<'_>, source: &str, imports: &mut Vec<Import>) {
    if node.kind() == "import_declaration" {
        if let Some(module) = import_module_name(node, source) {
            if matches!(
                module.as_str(),
                "Foundation" | "Swift" | "Dispatch" | "XCTest"
            ) {
                imports.push(Import::standard_library(module));
            } else {
                imports.push(Import::external(module));
            }
        }
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_imports(child, source, imports);
    }
}

fn import_module_name(node: Node<'_>, source: &str) -> Option<String> {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "identifier" {
            return source
                .get(child.byte_range())
                .map(|text| text.trim().to_string());
        }
    }
    None
}

struct SwiftResolver<'a> {
    reader: &'a dyn ContentReader,
}

impl ImportResolver for SwiftResolver<'_> {
    /// Swift files in one module see each other without imports, and
    /// module boundaries are a build-system concern. Parse for errors,
    /// produce no edges.
    fn resolve_project_imports(
        &mut self,
        path: &AbsolutePath,
        _ext: &str,
    ) -> Result<Vec<AbsolutePath>> {
        let source = read_source(self.reader, path)?;
        parse_imports(&source).map_err(|source| DepgraphError::ParseFailure {
            path: path.clone(),
            source,
        })?;
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_import_declarations() {
        let src = "import Foundation\nimport Alamofire\n\nstruct App {}\n";
        let imports = parse_imports(src).unwrap();
        assert_eq!(
            imports,
            vec![
                Import::standard_library("Foundation"),
                Import::external("Alamofire"),
            ]
        );
    }

    #[test]
    fn test_file_naming() {
        assert!(is_test_file(&AbsolutePath::from_clean(
            "/r/Tests/AppTests.swift"
        )));
        assert!(!is_test_file(&AbsolutePath::from_clean("/r/App.swift")));
    }
}
