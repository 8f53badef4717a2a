//! Shared `#include` scanning and resolution for the C-family modules.

use super::{read_source, strip_c_style_comments};
use crate::context::ResolverContext;
use crate::error::{DepgraphError, ParseError, Result};
use crate::import::{Import, IncludeKind};
use crate::path::AbsolutePath;
use crate::reader::ContentReader;
use crate::registry::ImportResolver;

/// Extract `#include` directives, quoted and angle-bracket forms.
pub fn parse_includes(source: &str) -> std::result::Result<Vec<Import>, ParseError> {
    let mut includes = Vec::new();

    for line in strip_c_style_comments(source) {
        let trimmed = line.trim();
        let Some(rest) = trimmed.strip_prefix('#') else {
            continue;
        };
        let Some(rest) = rest.trim_start().strip_prefix("include") else {
            continue;
        };
        let rest = rest.trim_start();

        if let Some(body) = rest.strip_prefix('"') {
            if let Some(end) = body.find('"') {
                includes.push(Import::Include {
                    path: body[..end].to_string(),
                    kind: IncludeKind::Local,
                });
            }
        } else if let Some(body) = rest.strip_prefix('<') {
            if let Some(end) = body.find('>') {
                includes.push(Import::Include {
                    path: body[..end].to_string(),
                    kind: IncludeKind::System,
                });
            }
        }
    }

    Ok(includes)
}

/// Resolver shared by the C and C++ modules; only the header extension
/// set differs.
pub(crate) struct IncludeResolver<'a> {
    pub(crate) ctx: &'a ResolverContext,
    pub(crate) reader: &'a dyn ContentReader,
    pub(crate) header_extensions: &'static [&'static str],
}

impl IncludeResolver<'_> {
    /// Quoted includes resolve relative to the including file; when the
    /// spelled path misses, each known header extension is tried.
    fn resolve_local(&self, source_file: &AbsolutePath, spec: &str) -> Vec<AbsolutePath> {
        let base = source_file.parent().join_clean(spec);
        let base_str = base.to_slash_string();

        let mut candidates = vec![base.clone()];
        for ext in self.header_extensions {
            candidates.push(AbsolutePath::from_clean(format!("{base_str}{ext}")));
        }

        candidates
            .into_iter()
            .filter(|candidate| candidate != source_file && self.ctx.contains(candidate))
            .collect()
    }

    /// Angle-bracket includes are matched by trailing path components
    /// against the supplied set; include-path search outside the project
    /// is not attempted.
    fn resolve_system(&self, source_file: &AbsolutePath, spec: &str) -> Vec<AbsolutePath> {
        self.ctx
            .supplied_files()
            .iter()
            .filter(|file| *file != source_file && file.ends_with_components(spec))
            .cloned()
            .collect()
    }
}

impl ImportResolver for IncludeResolver<'_> {
    fn resolve_project_imports(
        &mut self,
        path: &AbsolutePath,
        _ext: &str,
    ) -> Result<Vec<AbsolutePath>> {
        let source = read_source(self.reader, path)?;
        let includes = parse_includes(&source).map_err(|source| DepgraphError::ParseFailure {
            path: path.clone(),
            source,
        })?;

        let mut resolved = Vec::new();
        for include in includes {
            let Import::Include { path: spec, kind } = include else {
                continue;
            };
            match kind {
                IncludeKind::Local => resolved.extend(self.resolve_local(path, &spec)),
                IncludeKind::System => resolved.extend(self.resolve_system(path, &spec)),
            }
        }

        Ok(resolved)
    }
}

/// Test naming shared across the C family.
pub(crate) fn is_test_file(path: &AbsolutePath) -> bool {
    let name = path.file_name();
    if name.contains("_test.") || name.starts_with("test_") {
        return true;
    }
    let slashed = path.to_slash_string();
    slashed.contains("/test/") || slashed.contains("/tests/")
}
