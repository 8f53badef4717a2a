//! Kotlin: package-declaration resolution plus same-package references
//! that need no import statement.

use super::java::resolve_package_import;
use super::{identifier_tokens, read_source, strip_c_style_comments, strip_string_literals};
use crate::context::{PackageIndex, ResolverContext};
use crate::error::{DepgraphError, ParseError, Result};
use crate::import::Import;
use crate::path::AbsolutePath;
use crate::reader::ContentReader;
use crate::registry::{ImportResolver, LanguageModule, Maturity};
use std::collections::BTreeSet;

pub struct KotlinModule;

impl LanguageModule for KotlinModule {
    fn name(&self) -> &'static str {
        "Kotlin"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".kt", ".kts"]
    }

    fn maturity(&self) -> Maturity {
        Maturity::Basic
    }

    fn new_resolver<'a>(
        &self,
        ctx: &'a ResolverContext,
        reader: &'a dyn ContentReader,
    ) -> Box<dyn ImportResolver + 'a> {
        let kotlin_files = ctx.files_with_extensions(&[".kt", ".kts"]);
        let index = PackageIndex::build(
            &kotlin_files,
            reader,
            extract_package_declaration,
            extract_top_level_type_names,
        );
        Box::new(KotlinResolver { ctx, reader, index })
    }

    fn is_test_file(&self, path: &AbsolutePath, _reader: &dyn ContentReader) -> bool {
        is_test_file(path)
    }
}

pub fn is_test_file(path: &AbsolutePath) -> bool {
    let name = path.file_name();
    if name.ends_with("Test.kt") || name.ends_with("Tests.kt") {
        return true;
    }
    let slashed = path.to_slash_string();
    slashed.contains("/test/") || slashed.contains("/tests/")
}

/// `package a.b.c` (no semicolon required).
pub fn extract_package_declaration(source: &str) -> Option<String> {
    strip_c_style_comments(source).into_iter().find_map(|line| {
        line.trim()
            .strip_prefix("package ")
            .map(|rest| rest.trim_end_matches(';').trim().to_string())
            .filter(|pkg| !pkg.is_empty())
    })
}

/// Top-level type declarations: classes (plain, data, sealed, enum,
/// annotation), interfaces, and objects.
pub fn extract_top_level_type_names(source: &str) -> Vec<String> {
    let mut names = Vec::new();
    for line in strip_c_style_comments(source) {
        let trimmed = line.trim();
        for keyword in ["class ", "interface ", "object "] {
            if let Some(idx) = find_decl_keyword(trimmed, keyword) {
                let rest = &trimmed[idx + keyword.len()..];
                let name: String = rest
                    .trim_start()
                    .chars()
                    .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
                    .collect();
                if !name.is_empty() {
                    names.push(name);
                }
                break;
            }
        }
    }
    names
}

fn find_decl_keyword(line: &str, keyword: &str) -> Option<usize> {
    let idx = line.find(keyword)?;
    if idx == 0 {
        return Some(idx);
    }
    line[..idx]
        .split_whitespace()
        .all(|word| {
            matches!(
                word,
                "public" | "private" | "internal" | "protected" | "open" | "abstract" | "final"
                    | "sealed" | "data" | "enum" | "annotation" | "inner" | "value" | "expect"
                    | "actual"
            )
        })
        .then_some(idx)
}

/// Parse import statements. Kotlin and Java standard prefixes are
/// classified immediately; everything else stays External until the
/// resolver checks it against the project's package set.
pub fn parse_imports(source: &str) -> std::result::Result<Vec<Import>, ParseError> {
    let mut imports = Vec::new();

    for line in strip_c_style_comments(source) {
        let trimmed = line.trim();
        let Some(rest) = trimmed.strip_prefix("import ") else {
            continue;
        };

        let mut statement = rest.trim_end_matches(';').trim();
        if let Some(alias_idx) = statement.find(" as ") {
            statement = statement[..alias_idx].trim();
        }
        if statement.is_empty() {
            continue;
        }

        let is_wildcard = statement.ends_with(".*");
        let operand = statement.to_string();
        let bare = operand.trim_end_matches(".*");

        if bare.starts_with("kotlin.") || bare.starts_with("java.") || bare.starts_with("javax.")
        {
            imports.push(Import::standard_library(operand));
        } else if is_wildcard {
            imports.push(Import::Internal {
                path: operand,
                is_wildcard: true,
            });
        } else {
            imports.push(Import::external(operand));
        }
    }

    Ok(imports)
}

/// Capitalized identifiers referenced in source, for the same-package pass.
pub(crate) fn extract_type_identifiers(source: &str) -> BTreeSet<String> {
    let mut referenced = BTreeSet::new();
    for line in strip_c_style_comments(source) {
        let line = strip_string_literals(&line);
        for (token, _) in identifier_tokens(&line) {
            if token.chars().next().is_some_and(char::is_uppercase) {
                referenced.insert(token);
            }
        }
    }
    referenced
}

fn simple_name(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}

struct KotlinResolver<'a> {
    ctx: &'a ResolverContext,
    reader: &'a dyn ContentReader,
    index: PackageIndex,
}

impl ImportResolver for KotlinResolver<'_> {
    fn resolve_project_imports(
        &mut self,
        path: &AbsolutePath,
        _ext: &str,
    ) -> Result<Vec<AbsolutePath>> {
        let source = read_source(self.reader, path)?;
        let imports = parse_imports(&source).map_err(|source| DepgraphError::ParseFailure {
            path: path.clone(),
            source,
        })?;

        let mut resolved = Vec::new();
        for import in &imports {
            let (operand, is_wildcard) = match import {
                Import::Internal {
                    path: operand,
                    is_wildcard,
                } => (operand.as_str(), *is_wildcard),
                // Externally classified imports can still target a project
                // package; only the package index can tell.
                Import::External { path: operand } => (operand.as_str(), false),
                _ => continue,
            };

            let bare = operand.trim_end_matches(".*");
            let package = if is_wildcard {
                bare.to_string()
            } else {
                match bare.rfind('.') {
                    Some(idx) => bare[..idx].to_string(),
                    None => continue,
                }
            };
            if !self.index.has_package(&package) && !self.index.has_package(bare) {
                continue;
            }

            resolved.extend(resolve_package_import(
                self.ctx,
                &self.index,
                path,
                bare,
                is_wildcard,
            ));
        }

        resolved.extend(self.same_package_dependencies(path, &source, &imports));
        Ok(resolved)
    }
}

impl KotlinResolver<'_> {
    /// Same-package type references resolve without imports: scan for
    /// capitalized identifiers, subtract explicitly imported names, and
    /// look the rest up in this file's own package.
    fn same_package_dependencies(
        &self,
        path: &AbsolutePath,
        source: &str,
        imports: &[Import],
    ) -> Vec<AbsolutePath> {
        let Some(package) = self.index.package_of(path) else {
            return Vec::new();
        };
        let Some(type_index) = self.index.type_decls_in_package(package) else {
            return Vec::new();
        };

        let references = extract_type_identifiers(source);
        if references.is_empty() {
            return Vec::new();
        }

        let imported_names: BTreeSet<&str> = imports
            .iter()
            .filter(|import| !matches!(import, Import::Internal { is_wildcard: true, .. }))
            .map(|import| simple_name(import.operand().trim_end_matches(".*")))
            .collect();

        let mut seen = BTreeSet::new();
        let mut deps = Vec::new();
        for reference in &references {
            if imported_names.contains(reference.as_str()) {
                continue;
            }
            let Some(defining_files) = type_index.get(reference) else {
                continue;
            };
            for file in defining_files {
                if file == path || !self.ctx.contains(file) {
                    continue;
                }
                if seen.insert(file.clone()) {
                    deps.push(file.clone());
                }
            }
        }

        deps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::MemoryReader;

    fn p(s: &str) -> AbsolutePath {
        AbsolutePath::from_clean(s)
    }

    #[test]
    fn parses_package_and_types() {
        let src = r#"package com.app.core

data class Config(val port: Int)
sealed class Event
object Registry
internal interface Store
"#;
        assert_eq!(
            extract_package_declaration(src),
            Some("com.app.core".to_string())
        );
        let mut types = extract_top_level_type_names(src);
        types.sort();
        assert_eq!(types, vec!["Config", "Event", "Registry", "Store"]);
    }

    #[test]
    fn classifies_imports() {
        let src = r#"package com.app

import kotlin.math.abs
import java.time.Instant
import com.app.util.Config
import com.app.util.*
import org.junit.Test as JTest
"#;
        let imports = parse_imports(src).unwrap();
        assert_eq!(
            imports,
            vec![
                Import::standard_library("kotlin.math.abs"),
                Import::standard_library("java.time.Instant"),
                Import::external("com.app.util.Config"),
                Import::wildcard("com.app.util.*"),
                Import::external("org.junit.Test"),
            ]
        );
    }

    #[test]
    fn resolves_imports_against_project_packages() {
        let reader = MemoryReader::new()
            .with(
                "/r/util/Config.kt",
                "package com.app.util\n\nclass Config\n",
            )
            .with(
                "/r/util/Env.kt",
                "package com.app.util\n\nclass Env\n",
            )
            .with(
                "/r/Main.kt",
                "package com.app\n\nimport com.app.util.Config\n\nfun main() {}\n",
            );
        let files = vec![p("/r/Main.kt"), p("/r/util/Config.kt"), p("/r/util/Env.kt")];
        let ctx = ResolverContext::build(&files);
        let mut resolver = KotlinModule.new_resolver(&ctx, &reader);

        let deps = resolver
            .resolve_project_imports(&p("/r/Main.kt"), ".kt")
            .unwrap();
        assert_eq!(deps, vec![p("/r/util/Config.kt")]);
    }

    #[test]
    fn same_package_references_resolve_without_imports() {
        let reader = MemoryReader::new()
            .with("/r/Config.kt", "package com.app\n\nclass Config\n")
            .with(
                "/r/Main.kt",
                "package com.app\n\nfun main() { val c = Config() }\n",
            );
        let files = vec![p("/r/Config.kt"), p("/r/Main.kt")];
        let ctx = ResolverContext::build(&files);
        let mut resolver = KotlinModule.new_resolver(&ctx, &reader);

        let deps = resolver
            .resolve_project_imports(&p("/r/Main.kt"), ".kt")
            .unwrap();
        assert_eq!(deps, vec![p("/r/Config.kt")]);
    }

    #[test]
    fn kts_files_participate_in_package_indexing() {
        let reader = MemoryReader::new()
            .with("/r/build.kts", "package scripts\n\nclass Pipeline\n")
            .with(
                "/r/Run.kt",
                "package scripts\n\nfun run() { Pipeline() }\n",
            );
        let files = vec![p("/r/Run.kt"), p("/r/build.kts")];
        let ctx = ResolverContext::build(&files);
        let mut resolver = KotlinModule.new_resolver(&ctx, &reader);

        let deps = resolver
            .resolve_project_imports(&p("/r/Run.kt"), ".kt")
            .unwrap();
        assert_eq!(deps, vec![p("/r/build.kts")]);
    }

    #[test]
    fn test_file_naming() {
        assert!(is_test_file(&p("/r/src/test/kotlin/AppTest.kt")));
        assert!(!is_test_file(&p("/r/src/main/kotlin/App.kt")));
    }
}
