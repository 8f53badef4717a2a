//! Java: package-declaration resolution with wildcard imports and
//! type-name narrowing.

use super::{read_source, strip_c_style_comments};
use crate::context::{PackageIndex, ResolverContext};
use crate::error::{DepgraphError, ParseError, Result};
use crate::import::Import;
use crate::path::AbsolutePath;
use crate::reader::ContentReader;
use crate::registry::{ImportResolver, LanguageModule, Maturity};
use std::collections::BTreeSet;

pub struct JavaModule;

impl LanguageModule for JavaModule {
    fn name(&self) -> &'static str {
        "Java"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".java"]
    }

    fn maturity(&self) -> Maturity {
        Maturity::Basic
    }

    fn new_resolver<'a>(
        &self,
        ctx: &'a ResolverContext,
        reader: &'a dyn ContentReader,
    ) -> Box<dyn ImportResolver + 'a> {
        let index = PackageIndex::build(
            ctx.files_with_extension(".java"),
            reader,
            parse_package_declaration,
            parse_top_level_type_names,
        );
        let project_packages = ctx
            .files_with_extension(".java")
            .iter()
            .filter_map(|file| index.package_of(file).map(str::to_string))
            .collect();
        Box::new(JavaResolver {
            ctx,
            reader,
            index,
            project_packages,
        })
    }

    fn is_test_file(&self, path: &AbsolutePath, _reader: &dyn ContentReader) -> bool {
        is_test_file(path)
    }
}

pub fn is_test_file(path: &AbsolutePath) -> bool {
    let name = path.file_name();
    if name.ends_with("Test.java") || name.ends_with("Tests.java") {
        return true;
    }
    let slashed = path.to_slash_string();
    slashed.contains("/test/") || slashed.contains("/tests/")
}

/// `package com.example.core;` -> "com.example.core".
pub fn parse_package_declaration(source: &str) -> Option<String> {
    strip_c_style_comments(source).into_iter().find_map(|line| {
        line.trim()
            .strip_prefix("package ")
            .map(|rest| rest.trim_end_matches(';').trim().to_string())
            .filter(|pkg| !pkg.is_empty())
    })
}

/// Top-level `class` / `interface` / `enum` / `record` names.
pub fn parse_top_level_type_names(source: &str) -> Vec<String> {
    let mut names = Vec::new();
    for line in strip_c_style_comments(source) {
        let trimmed = line.trim();
        for keyword in ["class ", "interface ", "enum ", "record "] {
            if let Some(idx) = find_type_keyword(trimmed, keyword) {
                let rest = &trimmed[idx + keyword.len()..];
                if let Some(name) = leading_type_name(rest) {
                    names.push(name);
                }
                break;
            }
        }
    }
    names
}

/// Keyword must start the line or follow a modifier list, not appear
/// mid-identifier.
fn find_type_keyword(line: &str, keyword: &str) -> Option<usize> {
    let idx = line.find(keyword)?;
    if idx == 0 {
        return Some(idx);
    }
    let before = &line[..idx];
    before
        .split_whitespace()
        .all(|word| {
            matches!(
                word,
                "public" | "private" | "protected" | "abstract" | "final" | "static" | "sealed"
                    | "non-sealed" | "strictfp"
            )
        })
        .then_some(idx)
}

fn leading_type_name(rest: &str) -> Option<String> {
    let name: String = rest
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '$')
        .collect();
    (!name.is_empty()).then_some(name)
}

/// Extract import statements, classifying against the project's declared
/// package set: project packages are Internal, `java.` / `javax.` are
/// standard library, the rest are external.
pub fn parse_imports(
    source: &str,
    project_packages: &BTreeSet<String>,
) -> std::result::Result<Vec<Import>, ParseError> {
    let mut imports = Vec::new();

    for line in strip_c_style_comments(source) {
        let trimmed = line.trim();
        let Some(rest) = trimmed.strip_prefix("import ") else {
            continue;
        };
        if !rest.contains(';') {
            continue;
        }

        let mut statement = rest.trim_end_matches(';').trim();
        if let Some(static_rest) = statement.strip_prefix("static ") {
            statement = static_rest.trim();
        }
        if statement.is_empty() {
            continue;
        }

        let is_wildcard = statement.ends_with(".*");
        let operand = statement.trim_end_matches(".*").to_string();
        let package = if is_wildcard {
            operand.clone()
        } else {
            parent_package(&operand)
        };

        if project_packages.contains(&package) || project_packages.contains(&operand) {
            imports.push(Import::Internal {
                path: statement.to_string(),
                is_wildcard,
            });
        } else if operand.starts_with("java.") || operand.starts_with("javax.") {
            imports.push(Import::standard_library(statement));
        } else {
            imports.push(Import::external(statement));
        }
    }

    Ok(imports)
}

fn parent_package(path: &str) -> String {
    match path.rfind('.') {
        Some(idx) => path[..idx].to_string(),
        None => path.to_string(),
    }
}

fn simple_type_name(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}

struct JavaResolver<'a> {
    ctx: &'a ResolverContext,
    reader: &'a dyn ContentReader,
    index: PackageIndex,
    project_packages: BTreeSet<String>,
}

impl ImportResolver for JavaResolver<'_> {
    fn resolve_project_imports(
        &mut self,
        path: &AbsolutePath,
        _ext: &str,
    ) -> Result<Vec<AbsolutePath>> {
        let source = read_source(self.reader, path)?;

        let imports = parse_imports(&source, &self.project_packages).map_err(|source| {
            DepgraphError::ParseFailure {
                path: path.clone(),
                source,
            }
        })?;

        let mut resolved = Vec::new();
        for import in imports {
            let Import::Internal {
                path: operand,
                is_wildcard,
            } = import
            else {
                continue;
            };
            resolved.extend(resolve_package_import(
                self.ctx,
                &self.index,
                path,
                operand.trim_end_matches(".*"),
                is_wildcard,
            ));
        }

        Ok(resolved)
    }
}

/// Shared by the package-declaration languages: wildcard imports pull in
/// the whole package; named imports narrow by declared type, falling back
/// to the whole package when no declaration index entry matches.
pub(crate) fn resolve_package_import(
    ctx: &ResolverContext,
    index: &PackageIndex,
    source_file: &AbsolutePath,
    operand: &str,
    is_wildcard: bool,
) -> Vec<AbsolutePath> {
    let mut resolved = Vec::new();
    let mut seen = BTreeSet::new();
    let mut add_file = |file: &AbsolutePath, out: &mut Vec<AbsolutePath>| {
        if file == source_file || !ctx.contains(file) || !seen.insert(file.clone()) {
            return;
        }
        out.push(file.clone());
    };

    if is_wildcard {
        for file in index.files_in_package(operand) {
            add_file(file, &mut resolved);
        }
        return resolved;
    }

    let package = parent_package(operand);
    let type_name = simple_type_name(operand);
    for file in index.files_declaring_type(&package, type_name) {
        add_file(file, &mut resolved);
    }

    if resolved.is_empty() {
        for file in index.files_in_package(&package) {
            add_file(file, &mut resolved);
        }
    }
    // A nested-type import names the package itself as its prefix.
    if resolved.is_empty() && index.has_package(operand) {
        for file in index.files_in_package(operand) {
            add_file(file, &mut resolved);
        }
    }

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::MemoryReader;

    fn p(s: &str) -> AbsolutePath {
        AbsolutePath::from_clean(s)
    }

    #[test]
    fn parses_package_declaration() {
        let src = "package com.example.core;\n\npublic class App {}\n";
        assert_eq!(
            parse_package_declaration(src),
            Some("com.example.core".to_string())
        );
    }

    #[test]
    fn classifies_internal_standard_and_external() {
        let src = r#"package com.example;

import com.example.util.Helper;
import java.util.List;
import org.slf4j.Logger;
"#;
        let packages: BTreeSet<String> =
            ["com.example", "com.example.util"].map(String::from).into();

        let imports = parse_imports(src, &packages).unwrap();
        assert_eq!(
            imports,
            vec![
                Import::internal("com.example.util.Helper"),
                Import::standard_library("java.util.List"),
                Import::external("org.slf4j.Logger"),
            ]
        );
    }

    #[test]
    fn recognizes_wildcard_imports() {
        let packages: BTreeSet<String> = [String::from("com.x")].into();
        let imports = parse_imports("import com.x.*;\n", &packages).unwrap();
        assert_eq!(imports, vec![Import::wildcard("com.x.*")]);
    }

    #[test]
    fn parses_top_level_type_names() {
        let src = r#"package com.example;

public class App {}
interface Service {}
enum Mode { ON, OFF }
record User(String name) {}
"#;
        let mut types = parse_top_level_type_names(src);
        types.sort();
        assert_eq!(types, vec!["App", "Mode", "Service", "User"]);
    }

    #[test]
    fn wildcard_imports_resolve_to_whole_package() {
        let reader = MemoryReader::new()
            .with("/r/A.java", "package com.x;\n\npublic class A {}\n")
            .with("/r/B.java", "package com.x;\n\npublic class B {}\n")
            .with(
                "/r/c/C.java",
                "package com.x.c;\n\nimport com.x.*;\n\npublic class C {}\n",
            );
        let files = vec![p("/r/A.java"), p("/r/B.java"), p("/r/c/C.java")];
        let ctx = ResolverContext::build(&files);
        let mut resolver = JavaModule.new_resolver(&ctx, &reader);

        let deps = resolver
            .resolve_project_imports(&p("/r/c/C.java"), ".java")
            .unwrap();
        assert_eq!(deps, vec![p("/r/A.java"), p("/r/B.java")]);
    }

    #[test]
    fn named_imports_narrow_by_declared_type() {
        let reader = MemoryReader::new()
            .with("/r/A.java", "package com.x;\n\npublic class A {}\n")
            .with("/r/B.java", "package com.x;\n\npublic class B {}\n")
            .with(
                "/r/c/C.java",
                "package com.x.c;\n\nimport com.x.B;\n\npublic class C {}\n",
            );
        let files = vec![p("/r/A.java"), p("/r/B.java"), p("/r/c/C.java")];
        let ctx = ResolverContext::build(&files);
        let mut resolver = JavaModule.new_resolver(&ctx, &reader);

        let deps = resolver
            .resolve_project_imports(&p("/r/c/C.java"), ".java")
            .unwrap();
        assert_eq!(deps, vec![p("/r/B.java")]);
    }

    #[test]
    fn unmatched_type_falls_back_to_whole_package() {
        let reader = MemoryReader::new()
            .with("/r/A.java", "package com.x;\npublic class A {}\n")
            .with(
                "/r/c/C.java",
                "package com.x.c;\nimport com.x.Generated;\npublic class C {}\n",
            );
        let files = vec![p("/r/A.java"), p("/r/c/C.java")];
        let ctx = ResolverContext::build(&files);
        let mut resolver = JavaModule.new_resolver(&ctx, &reader);

        let deps = resolver
            .resolve_project_imports(&p("/r/c/C.java"), ".java")
            .unwrap();
        assert_eq!(deps, vec![p("/r/A.java")]);
    }

    #[test]
    fn test_file_naming() {
        assert!(is_test_file(&p("/p/src/test/java/com/x/AppTest.java")));
        assert!(is_test_file(&p("/p/module/test/com/x/AppTests.java")));
        assert!(!is_test_file(&p("/p/src/main/java/com/x/App.java")));
    }
}
