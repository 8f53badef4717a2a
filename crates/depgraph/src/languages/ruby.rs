//! Ruby: `require_relative` resolution; plain `require` is external.

use super::{read_source, strip_hash_comments};
use crate::context::ResolverContext;
use crate::error::{DepgraphError, ParseError, Result};
use crate::import::Import;
use crate::path::AbsolutePath;
use crate::reader::ContentReader;
use crate::registry::{ImportResolver, LanguageModule, Maturity};

pub struct RubyModule;

impl LanguageModule for RubyModule {
    fn name(&self) -> &'static str {
        "Ruby"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".rb"]
    }

    fn maturity(&self) -> Maturity {
        Maturity::Basic
    }

    fn new_resolver<'a>(
        &self,
        ctx: &'a ResolverContext,
        reader: &'a dyn ContentReader,
    ) -> Box<dyn ImportResolver + 'a> {
        Box::new(RubyResolver { ctx, reader })
    }

    fn is_test_file(&self, path: &AbsolutePath, _reader: &dyn ContentReader) -> bool {
        is_test_file(path)
    }
}

pub fn is_test_file(path: &AbsolutePath) -> bool {
    let name = path.file_name();
    if name.ends_with("_spec.rb") || name.ends_with("_test.rb") {
        return true;
    }
    if name.starts_with("test_") && name.ends_with(".rb") {
        return true;
    }
    let slashed = path.to_slash_string();
    slashed.contains("/spec/") || slashed.contains("/test/")
}

pub fn parse_imports(source: &str) -> std::result::Result<Vec<Import>, ParseError> {
    let mut imports = Vec::new();

    for line in strip_hash_comments(source) {
        let trimmed = line.trim();

        if let Some(rest) = trimmed.strip_prefix("require_relative") {
            if let Some(path) = quoted_argument(rest) {
                imports.push(Import::internal(path));
            }
        } else if let Some(rest) = trimmed.strip_prefix("require") {
            if let Some(path) = quoted_argument(rest) {
                imports.push(Import::external(path));
            }
        }
    }

    Ok(imports)
}

/// `'x'` / `"x"` / `('x')` after the keyword.
fn quoted_argument(rest: &str) -> Option<String> {
    let rest = rest.trim_start().trim_start_matches('(').trim_start();
    let quote = rest.chars().next().filter(|c| *c == '\'' || *c == '"')?;
    let body = &rest[1..];
    let end = body.find(quote)?;
    Some(body[..end].to_string())
}

struct RubyResolver<'a> {
    ctx: &'a ResolverContext,
    reader: &'a dyn ContentReader,
}

impl ImportResolver for RubyResolver<'_> {
    fn resolve_project_imports(
        &mut self,
        path: &AbsolutePath,
        ext: &str,
    ) -> Result<Vec<AbsolutePath>> {
        let source = read_source(self.reader, path)?;
        let imports = parse_imports(&source).map_err(|source| DepgraphError::ParseFailure {
            path: path.clone(),
            source,
        })?;

        let source_dir = path.parent();
        let mut resolved = Vec::new();

        for import in imports {
            let Import::Internal { path: relative, .. } = import else {
                continue;
            };

            let mut candidate = source_dir.join_clean(&relative);
            if !candidate.to_slash_string().ends_with(ext) {
                candidate =
                    AbsolutePath::from_clean(format!("{}{ext}", candidate.to_slash_string()));
            }

            if candidate != *path && self.ctx.contains(&candidate) {
                resolved.push(candidate);
            }
        }

        Ok(resolved)
    }
}
