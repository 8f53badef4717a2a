//! Rust: `mod` declarations map to the module file tree; `include!`-family
//! macros are textual inclusion.

use super::{read_source, strip_c_style_comments};
use crate::context::ResolverContext;
use crate::error::{DepgraphError, ParseError, Result};
use crate::import::{Import, IncludeKind};
use crate::path::AbsolutePath;
use crate::reader::ContentReader;
use crate::registry::{ImportResolver, LanguageModule, Maturity};

pub struct RustModule;

impl LanguageModule for RustModule {
    fn name(&self) -> &'static str {
        "Rust"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".rs"]
    }

    fn maturity(&self) -> Maturity {
        Maturity::Basic
    }

    fn new_resolver<'a>(
        &self,
        ctx: &'a ResolverContext,
        reader: &'a dyn ContentReader,
    ) -> Box<dyn ImportResolver + 'a> {
        Box::new(RustResolver { ctx, reader })
    }

    /// Content-based: a file with a `#[cfg(test)]` module is a test file
    /// even outside a tests/ directory.
    fn is_test_file(&self, path: &AbsolutePath, reader: &dyn ContentReader) -> bool {
        if path.to_slash_string().contains("/tests/") {
            return true;
        }
        match reader.read(path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).contains("#[cfg(test)]"),
            Err(_) => false,
        }
    }
}

/// A `mod name;` item, with the target override of a preceding
/// `#[path = "..."]` attribute when present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModDecl {
    pub name: String,
    pub explicit_path: Option<String>,
}

/// Extract `use` imports, `mod` declarations, and include macros.
pub fn parse_imports(source: &str) -> std::result::Result<Vec<Import>, ParseError> {
    let mut imports = Vec::new();

    for line in strip_c_style_comments(source) {
        let trimmed = line.trim();

        if let Some(rest) = use_statement(trimmed) {
            let operand = rest.trim_end_matches(';').trim();
            let operand = operand.split(" as ").next().unwrap_or(operand).trim();
            if operand.is_empty() {
                continue;
            }
            let is_wildcard = operand.ends_with("::*");
            let root = operand.split("::").next().unwrap_or(operand);
            match root {
                "std" | "core" | "alloc" => {
                    imports.push(Import::standard_library(operand));
                }
                "crate" | "self" | "super" => imports.push(Import::Internal {
                    path: operand.to_string(),
                    is_wildcard,
                }),
                _ => imports.push(Import::external(operand)),
            }
            continue;
        }

        if let Some(decl) = mod_decl_on_line(trimmed) {
            // File mapping happens on the resolver's dedicated pass.
            imports.push(Import::internal(decl));
            continue;
        }

        for macro_name in ["include!", "include_str!", "include_bytes!"] {
            for argument in macro_arguments(trimmed, macro_name) {
                if macro_name == "include!" {
                    imports.push(Import::Include {
                        path: argument,
                        kind: IncludeKind::Local,
                    });
                } else {
                    imports.push(Import::EmbedDirective { pattern: argument });
                }
            }
        }
    }

    Ok(imports)
}

/// `mod` declarations with `#[path]` overrides, for file-tree resolution.
pub fn parse_mod_decls(source: &str) -> Vec<ModDecl> {
    let mut decls = Vec::new();
    let mut pending_path: Option<String> = None;

    for line in strip_c_style_comments(source) {
        let trimmed = line.trim();

        if let Some(rest) = trimmed.strip_prefix("#[path") {
            if let Some(value) = quoted(rest) {
                pending_path = Some(value);
            }
            continue;
        }

        if let Some(name) = mod_decl_on_line(trimmed) {
            decls.push(ModDecl {
                name,
                explicit_path: pending_path.take(),
            });
        } else if !trimmed.is_empty() && !trimmed.starts_with("#[") {
            pending_path = None;
        }
    }

    decls
}

/// The module name of a file-backed `mod name;` item (no body).
fn mod_decl_on_line(line: &str) -> Option<String> {
    let rest = if let Some(rest) = line.strip_prefix("mod ") {
        rest
    } else if let Some(after_pub) = line.strip_prefix("pub") {
        // pub mod x; / pub(crate) mod x;
        let after_vis = if let Some(paren) = after_pub.strip_prefix('(') {
            let close = paren.find(')')?;
            &paren[close + 1..]
        } else {
            after_pub
        };
        after_vis.trim_start().strip_prefix("mod ")?
    } else {
        return None;
    };

    let rest = rest.trim();
    let name: String = rest
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    let after = rest[name.len()..].trim_start();
    (!name.is_empty() && after.starts_with(';')).then_some(name)
}

fn use_statement(line: &str) -> Option<&str> {
    line.strip_prefix("use ")
        .or_else(|| line.strip_prefix("pub use "))
}

fn macro_arguments(line: &str, macro_name: &str) -> Vec<String> {
    let mut arguments = Vec::new();
    let mut search = line;
    while let Some(idx) = search.find(macro_name) {
        let rest = &search[idx + macro_name.len()..];
        if let Some(value) = rest.strip_prefix('(').and_then(quoted) {
            arguments.push(value);
        }
        search = rest;
    }
    arguments
}

fn quoted(text: &str) -> Option<String> {
    let start = text.find('"')?;
    let rest = &text[start + 1..];
    let end = rest.find('"')?;
    Some(rest[..end].to_string())
}

struct RustResolver<'a> {
    ctx: &'a ResolverContext,
    reader: &'a dyn ContentReader,
}

impl ImportResolver for RustResolver<'_> {
    fn resolve_project_imports(
        &mut self,
        path: &AbsolutePath,
        _ext: &str,
    ) -> Result<Vec<AbsolutePath>> {
        let source = read_source(self.reader, path)?;
        // Surface parse problems through the common contract even though
        // the lexical scan is infallible today.
        let imports = parse_imports(&source).map_err(|source| DepgraphError::ParseFailure {
            path: path.clone(),
            source,
        })?;

        let file_dir = path.parent();
        // `mod x;` in src/foo.rs looks in src/foo/, except for crate roots
        // and mod.rs files which look in their own directory.
        let module_dir = match path.file_stem() {
            "mod" | "lib" | "main" => file_dir.clone(),
            stem => file_dir.join_clean(stem),
        };

        let mut resolved = Vec::new();

        for decl in parse_mod_decls(&source) {
            let candidates = match &decl.explicit_path {
                Some(explicit) => vec![file_dir.join_clean(explicit)],
                None => vec![
                    module_dir.join_clean(format!("{}.rs", decl.name)),
                    module_dir.join_clean(format!("{}/mod.rs", decl.name)),
                ],
            };
            resolved.extend(
                candidates
                    .into_iter()
                    .filter(|candidate| candidate != path && self.ctx.contains(candidate)),
            );
        }

        for import in imports {
            let candidate = match import {
                Import::Include { path: include, .. } => file_dir.join_clean(include),
                Import::EmbedDirective { pattern } => file_dir.join_clean(pattern),
                _ => continue,
            };
            if candidate != *path && self.ctx.contains(&candidate) {
                resolved.push(candidate);
            }
        }

        Ok(resolved)
    }
}
