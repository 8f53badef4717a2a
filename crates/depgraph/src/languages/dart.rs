//! Dart: relative-URI imports; `dart:` is the SDK, `package:` is pub.

use super::{read_source, strip_c_style_comments};
use crate::context::ResolverContext;
use crate::error::{DepgraphError, ParseError, Result};
use crate::import::Import;
use crate::path::AbsolutePath;
use crate::reader::ContentReader;
use crate::registry::{ImportResolver, LanguageModule, Maturity};

pub struct DartModule;

impl LanguageModule for DartModule {
    fn name(&self) -> &'static str {
        "Dart"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".dart"]
    }

    fn maturity(&self) -> Maturity {
        Maturity::Active
    }

    fn new_resolver<'a>(
        &self,
        ctx: &'a ResolverContext,
        reader: &'a dyn ContentReader,
    ) -> Box<dyn ImportResolver + 'a> {
        Box::new(DartResolver { ctx, reader })
    }

    fn is_test_file(&self, path: &AbsolutePath, _reader: &dyn ContentReader) -> bool {
        is_test_file(path)
    }
}

pub fn is_test_file(path: &AbsolutePath) -> bool {
    path.file_name().ends_with("_test.dart")
}

/// Extract `import` / `export` / `part` directives. `part of` names the
/// parent library, not a file, and is skipped.
pub fn parse_imports(source: &str) -> std::result::Result<Vec<Import>, ParseError> {
    let mut imports = Vec::new();

    for line in strip_c_style_comments(source) {
        let trimmed = line.trim();
        let rest = ["import ", "export ", "part "]
            .iter()
            .find_map(|prefix| trimmed.strip_prefix(prefix));
        let Some(rest) = rest else { continue };
        if rest.trim_start().starts_with("of ") {
            continue;
        }

        let Some(uri) = quoted_uri(rest) else {
            continue;
        };

        if let Some(sdk) = uri.strip_prefix("dart:") {
            imports.push(Import::standard_library(sdk));
        } else if uri.starts_with("package:") {
            imports.push(Import::external(uri));
        } else {
            imports.push(Import::internal(uri));
        }
    }

    Ok(imports)
}

fn quoted_uri(text: &str) -> Option<String> {
    let text = text.trim_start();
    let quote = text.chars().next().filter(|c| *c == '\'' || *c == '"')?;
    let rest = &text[1..];
    let end = rest.find(quote)?;
    Some(rest[..end].to_string())
}

struct DartResolver<'a> {
    ctx: &'a ResolverContext,
    reader: &'a dyn ContentReader,
}

impl ImportResolver for DartResolver<'_> {
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
            let Import::Internal { path: uri, .. } = import else {
                continue;
            };

            let mut candidate = source_dir.join_clean(&uri);
            if !candidate.to_slash_string().ends_with(ext) {
                candidate = AbsolutePath::from_clean(format!(
                    "{}{ext}",
                    candidate.to_slash_string()
                ));
            }

            if candidate != *path && self.ctx.contains(&candidate) {
                resolved.push(candidate);
            }
        }

        Ok(resolved)
    }
}
