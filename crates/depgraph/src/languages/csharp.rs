//! C#: `using` directives resolved against declared namespaces. A plain
//! `using` imports a whole namespace; `using static` and alias forms
//! narrow to one type.

use super::{read_source, strip_c_style_comments};
use crate::context::{PackageIndex, ResolverContext};
use crate::error::{DepgraphError, ParseError, Result};
use crate::import::Import;
use crate::path::AbsolutePath;
use crate::reader::ContentReader;
use crate::registry::{ImportResolver, LanguageModule, Maturity};
use std::collections::BTreeSet;

pub struct CSharpModule;

impl LanguageModule for CSharpModule {
    fn name(&self) -> &'static str {
        "C#"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".cs"]
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
            ctx.files_with_extension(".cs"),
            reader,
            parse_namespace_declaration,
            parse_top_level_type_names,
        );
        Box::new(CSharpResolver { ctx, reader, index })
    }

    fn is_test_file(&self, path: &AbsolutePath, _reader: &dyn ContentReader) -> bool {
        is_test_file(path)
    }
}

pub fn is_test_file(path: &AbsolutePath) -> bool {
    let name = path.file_name();
    if name.ends_with("Test.cs") || name.ends_with("Tests.cs") {
        return true;
    }
    let slashed = path.to_slash_string();
    slashed.contains("/test/") || slashed.contains("/tests/")
}

/// Block-scoped (`namespace A.B {`) or file-scoped (`namespace A.B;`).
pub fn parse_namespace_declaration(source: &str) -> Option<String> {
    strip_c_style_comments(source).into_iter().find_map(|line| {
        line.trim()
            .strip_prefix("namespace ")
            .map(|rest| {
                rest.trim_end_matches(['{', ';'])
                    .trim()
                    .to_string()
            })
            .filter(|ns| !ns.is_empty())
    })
}

/// Top-level (or namespace-level) type declarations.
pub fn parse_top_level_type_names(source: &str) -> Vec<String> {
    let mut names = Vec::new();
    for line in strip_c_style_comments(source) {
        let trimmed = line.trim();
        for keyword in ["class ", "interface ", "struct ", "enum ", "record "] {
            if let Some(idx) = find_type_keyword(trimmed, keyword) {
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

fn find_type_keyword(line: &str, keyword: &str) -> Option<usize> {
    let idx = line.find(keyword)?;
    if idx == 0 {
        return Some(idx);
    }
    line[..idx]
        .split_whitespace()
        .all(|word| {
            matches!(
                word,
                "public" | "private" | "protected" | "internal" | "abstract" | "sealed"
                    | "static" | "partial" | "readonly" | "ref" | "file"
            )
        })
        .then_some(idx)
}

/// One using directive, after comment stripping and alias/static cleanup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsingDirective {
    pub path: String,
    /// `using static` and alias forms name a type; plain `using` names a
    /// namespace.
    pub names_type: bool,
}

/// Extract `using` directives, skipping using-statements (`using (...)`)
/// and handling `using static X.Y` and `using Alias = X.Y;`.
pub fn parse_using_directives(source: &str) -> Vec<UsingDirective> {
    let mut directives = Vec::new();

    for line in strip_c_style_comments(source) {
        let trimmed = line.trim();
        let Some(rest) = trimmed.strip_prefix("using ") else {
            continue;
        };
        if !trimmed.contains(';') {
            continue;
        }

        let mut statement = rest.trim_end_matches(';').trim().to_string();
        let mut names_type = false;

        if let Some(static_rest) = statement.strip_prefix("static ") {
            statement = static_rest.trim().to_string();
            names_type = true;
        }
        if let Some(eq) = statement.find('=') {
            statement = statement[eq + 1..].trim().to_string();
            names_type = true;
        }

        if statement.is_empty() || statement.starts_with('(') {
            continue;
        }

        directives.push(UsingDirective {
            path: statement,
            names_type,
        });
    }

    directives
}

/// Classify directives against the project's namespace set.
pub fn parse_imports(
    source: &str,
    project_namespaces: &BTreeSet<String>,
) -> std::result::Result<Vec<Import>, ParseError> {
    let imports = parse_using_directives(source)
        .into_iter()
        .map(|directive| {
            let namespace_of_type = directive
                .path
                .rfind('.')
                .map(|idx| directive.path[..idx].to_string());

            let is_project = if directive.names_type {
                namespace_of_type
                    .as_deref()
                    .is_some_and(|ns| project_namespaces.contains(ns))
            } else {
                project_namespaces.contains(&directive.path)
            };

            if is_project {
                Import::Internal {
                    path: directive.path,
                    // A namespace-wide using behaves like a wildcard import.
                    is_wildcard: !directive.names_type,
                }
            } else if directive.path.starts_with("System") {
                Import::standard_library(directive.path)
            } else {
                Import::external(directive.path)
            }
        })
        .collect();

    Ok(imports)
}

struct CSharpResolver<'a> {
    ctx: &'a ResolverContext,
    reader: &'a dyn ContentReader,
    index: PackageIndex,
}

impl ImportResolver for CSharpResolver<'_> {
    fn resolve_project_imports(
        &mut self,
        path: &AbsolutePath,
        _ext: &str,
    ) -> Result<Vec<AbsolutePath>> {
        let source = read_source(self.reader, path)?;

        let project_namespaces: BTreeSet<String> = self
            .ctx
            .files_with_extension(".cs")
            .iter()
            .filter_map(|file| self.index.package_of(file).map(str::to_string))
            .collect();

        let imports = parse_imports(&source, &project_namespaces).map_err(|source| {
            DepgraphError::ParseFailure {
                path: path.clone(),
                source,
            }
        })?;

        let mut resolved = Vec::new();
        let mut seen = BTreeSet::new();
        let mut add_files = |files: &[AbsolutePath], out: &mut Vec<AbsolutePath>| {
            for file in files {
                if file == path || !self.ctx.contains(file) {
                    continue;
                }
                if seen.insert(file.clone()) {
                    out.push(file.clone());
                }
            }
        };

        for import in imports {
            let Import::Internal {
                path: operand,
                is_wildcard,
            } = import
            else {
                continue;
            };

            if is_wildcard {
                add_files(self.index.files_in_package(&operand), &mut resolved);
                continue;
            }

            let Some(idx) = operand.rfind('.') else {
                continue;
            };
            let (namespace, type_name) = (&operand[..idx], &operand[idx + 1..]);
            let declaring = self.index.files_declaring_type(namespace, type_name);
            if declaring.is_empty() {
                add_files(self.index.files_in_package(namespace), &mut resolved);
            } else {
                let declaring = declaring.to_vec();
                add_files(&declaring, &mut resolved);
            }
        }

        Ok(resolved)
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
    fn parses_using_directives_with_comments() {
        let src = r#"// header
using App.Core;
/* block */ using System.Text;
using static App.Core.Math;
using Alias = App.Core.Config;
using (var scope = new Scope()) { }
"#;
        let directives = parse_using_directives(src);
        assert_eq!(
            directives,
            vec![
                UsingDirective {
                    path: "App.Core".to_string(),
                    names_type: false
                },
                UsingDirective {
                    path: "System.Text".to_string(),
                    names_type: false
                },
                UsingDirective {
                    path: "App.Core.Math".to_string(),
                    names_type: true
                },
                UsingDirective {
                    path: "App.Core.Config".to_string(),
                    names_type: true
                },
            ]
        );
    }

    #[test]
    fn classifies_directives() {
        let namespaces: BTreeSet<String> = [String::from("App.Core")].into();
        let imports =
            parse_imports("using App.Core;\nusing System.Linq;\nusing Serilog;\n", &namespaces)
                .unwrap();
        assert_eq!(
            imports,
            vec![
                Import::wildcard("App.Core"),
                Import::standard_library("System.Linq"),
                Import::external("Serilog"),
            ]
        );
    }

    #[test]
    fn file_scoped_namespaces_parse() {
        assert_eq!(
            parse_namespace_declaration("namespace App.Core;\n\nclass Engine {}\n"),
            Some("App.Core".to_string())
        );
        assert_eq!(
            parse_namespace_declaration("namespace App.Core {\n}\n"),
            Some("App.Core".to_string())
        );
    }

    #[test]
    fn namespace_usings_resolve_to_all_files() {
        let reader = MemoryReader::new()
            .with("/r/Engine.cs", "namespace App.Core;\n\npublic class Engine {}\n")
            .with("/r/Config.cs", "namespace App.Core;\n\npublic class Config {}\n")
            .with(
                "/r/Program.cs",
                "namespace App;\n\nusing App.Core;\n\npublic class Program {}\n",
            );
        let files = vec![p("/r/Config.cs"), p("/r/Engine.cs"), p("/r/Program.cs")];
        let ctx = ResolverContext::build(&files);
        let mut resolver = CSharpModule.new_resolver(&ctx, &reader);

        let deps = resolver
            .resolve_project_imports(&p("/r/Program.cs"), ".cs")
            .unwrap();
        assert_eq!(deps, vec![p("/r/Config.cs"), p("/r/Engine.cs")]);
    }

    #[test]
    fn static_usings_narrow_to_declaring_file() {
        let reader = MemoryReader::new()
            .with("/r/Engine.cs", "namespace App.Core;\n\npublic class Engine {}\n")
            .with("/r/Config.cs", "namespace App.Core;\n\npublic class Config {}\n")
            .with(
                "/r/Program.cs",
                "namespace App;\n\nusing static App.Core.Engine;\n\npublic class Program {}\n",
            );
        let files = vec![p("/r/Config.cs"), p("/r/Engine.cs"), p("/r/Program.cs")];
        let ctx = ResolverContext::build(&files);
        let mut resolver = CSharpModule.new_resolver(&ctx, &reader);

        let deps = resolver
            .resolve_project_imports(&p("/r/Program.cs"), ".cs")
            .unwrap();
        assert_eq!(deps, vec![p("/r/Engine.cs")]);
    }
}
