//! TypeScript: relative-path import resolution with extension and
//! index-file candidate tries. The scanner is shared with JavaScript.

use super::{read_source, strip_c_style_comments};
use crate::context::ResolverContext;
use crate::error::{DepgraphError, ParseError, Result};
use crate::import::Import;
use crate::path::AbsolutePath;
use crate::reader::ContentReader;
use crate::registry::{ImportResolver, LanguageModule, Maturity};

pub struct TypeScriptModule;

impl LanguageModule for TypeScriptModule {
    fn name(&self) -> &'static str {
        "TypeScript"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".ts", ".tsx"]
    }

    fn maturity(&self) -> Maturity {
        Maturity::Basic
    }

    fn new_resolver<'a>(
        &self,
        ctx: &'a ResolverContext,
        reader: &'a dyn ContentReader,
    ) -> Box<dyn ImportResolver + 'a> {
        Box::new(ModuleResolver {
            ctx,
            reader,
            candidate_extensions: TS_EXTENSIONS,
        })
    }

    fn is_test_file(&self, path: &AbsolutePath, _reader: &dyn ContentReader) -> bool {
        is_test_file(path)
    }
}

const TS_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".d.ts"];
pub(crate) const JS_EXTENSIONS: &[&str] = &[".js", ".jsx"];

const NODE_BUILTINS: &[&str] = &[
    "assert", "buffer", "child_process", "crypto", "events", "fs", "http", "https", "net",
    "os", "path", "process", "stream", "url", "util", "zlib",
];

/// Shared with the JavaScript module (same naming conventions).
pub(crate) fn is_test_file(path: &AbsolutePath) -> bool {
    let name = path.file_name();
    let ext = path.extension();
    if name.ends_with(&format!(".test{ext}")) || name.ends_with(&format!(".spec{ext}")) {
        return true;
    }
    path.to_slash_string().contains("/__tests__/")
}

/// Extract import/export/require specifiers. Relative specifiers are
/// Internal, `node:`-style modules are StandardLibrary, bare names are
/// External packages.
pub fn parse_imports(source: &str) -> std::result::Result<Vec<Import>, ParseError> {
    let mut imports = Vec::new();
    let mut pending: Option<String> = None;

    for line in strip_c_style_comments(source) {
        let trimmed = line.trim();

        if let Some(buffered) = pending.take() {
            let joined = format!("{buffered} {trimmed}");
            if let Some(spec) = from_clause_specifier(&joined) {
                imports.push(classify(spec));
            } else if !joined.contains(';') && joined.len() < 2048 {
                pending = Some(joined);
            }
            continue;
        }

        if trimmed.starts_with("import ") || trimmed.starts_with("export ") {
            if let Some(spec) = from_clause_specifier(trimmed) {
                imports.push(classify(spec));
            } else if trimmed.starts_with("export ") && !trimmed.contains(" from") {
                // Plain re-export of local declarations; nothing to do.
            } else if !trimmed.contains(';') {
                pending = Some(trimmed.to_string());
            }
            continue;
        }

        for spec in call_specifiers(trimmed, "require(") {
            imports.push(classify(spec));
        }
        for spec in call_specifiers(trimmed, "import(") {
            imports.push(classify(spec));
        }
    }

    Ok(imports)
}

/// The quoted specifier of a `from '...'` clause, or of a bare
/// `import '...'` statement.
fn from_clause_specifier(statement: &str) -> Option<String> {
    if let Some(idx) = statement.find(" from ") {
        return quoted_at(&statement[idx + 6..]);
    }
    let rest = statement.strip_prefix("import ")?;
    quoted_at(rest.trim_start())
}

fn quoted_at(text: &str) -> Option<String> {
    let text = text.trim_start();
    let quote = text.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let rest = &text[1..];
    let end = rest.find(quote)?;
    Some(rest[..end].to_string())
}

/// Quoted arguments of `require(...)` / dynamic `import(...)` calls.
fn call_specifiers(line: &str, marker: &str) -> Vec<String> {
    let mut specs = Vec::new();
    let mut search = line;
    while let Some(idx) = search.find(marker) {
        let rest = &search[idx + marker.len()..];
        if let Some(spec) = quoted_at(rest) {
            specs.push(spec);
        }
        search = rest;
    }
    specs
}

fn classify(spec: String) -> Import {
    if spec.starts_with('.') || spec.starts_with('/') {
        return Import::internal(spec);
    }
    if let Some(bare) = spec.strip_prefix("node:") {
        return Import::standard_library(bare);
    }
    if NODE_BUILTINS.contains(&spec.as_str()) {
        return Import::standard_library(spec);
    }
    Import::external(spec)
}

/// Resolver shared by the TypeScript and JavaScript modules; only the
/// candidate extension set differs.
pub(crate) struct ModuleResolver<'a> {
    pub(crate) ctx: &'a ResolverContext,
    pub(crate) reader: &'a dyn ContentReader,
    pub(crate) candidate_extensions: &'static [&'static str],
}

impl ImportResolver for ModuleResolver<'_> {
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
        for import in imports {
            let Import::Internal { path: spec, .. } = import else {
                continue;
            };
            resolved.extend(resolve_relative_import(
                self.ctx,
                path,
                &spec,
                self.candidate_extensions,
            ));
        }

        Ok(resolved)
    }
}

/// Candidates for a relative specifier, in try order: the path as written,
/// then each candidate extension appended, then index files under it.
/// `./x.js` also retries with the source-language extensions, matching how
/// compiled-output specifiers name their sources.
pub(crate) fn resolve_relative_import(
    ctx: &ResolverContext,
    source_file: &AbsolutePath,
    spec: &str,
    extensions: &[&str],
) -> Vec<AbsolutePath> {
    let base = source_file.parent().join_clean(spec);
    let base_str = base.to_slash_string();
    let mut candidates: Vec<AbsolutePath> = vec![base.clone()];

    for ext in extensions {
        candidates.push(AbsolutePath::from_clean(format!("{base_str}{ext}")));
    }
    if let Some(stripped) = base_str
        .strip_suffix(".js")
        .or_else(|| base_str.strip_suffix(".jsx"))
    {
        for ext in extensions {
            candidates.push(AbsolutePath::from_clean(format!("{stripped}{ext}")));
        }
    }
    for ext in extensions {
        candidates.push(base.join_clean(format!("index{ext}")));
    }

    candidates
        .into_iter()
        .filter(|candidate| candidate != source_file && ctx.contains(candidate))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_specifiers() {
        let source = r#"
import { helper } from "./lib/helper";
import * as fs from "node:fs";
import path from "path";
import React from "react";
import "./styles.css";
export { thing } from "../shared/thing";
"#;
        let imports = parse_imports(source).unwrap();
        assert_eq!(
            imports,
            vec![
                Import::internal("./lib/helper"),
                Import::standard_library("fs"),
                Import::standard_library("path"),
                Import::external("react"),
                Import::internal("./styles.css"),
                Import::internal("../shared/thing"),
            ]
        );
    }

    #[test]
    fn parses_multi_line_imports() {
        let source = "import {\n  a,\n  b,\n} from './wide';\n";
        let imports = parse_imports(source).unwrap();
        assert_eq!(imports, vec![Import::internal("./wide")]);
    }

    #[test]
    fn parses_require_calls() {
        let source = "const x = require('./local');\nconst y = require('lodash');\n";
        let imports = parse_imports(source).unwrap();
        assert_eq!(
            imports,
            vec![Import::internal("./local"), Import::external("lodash")]
        );
    }

    #[test]
    fn resolves_with_extension_and_index_tries() {
        let files = vec![
            AbsolutePath::from_clean("/r/src/app.ts"),
            AbsolutePath::from_clean("/r/src/lib/helper.ts"),
            AbsolutePath::from_clean("/r/src/widgets/index.tsx"),
        ];
        let ctx = ResolverContext::build(&files);
        let app = AbsolutePath::from_clean("/r/src/app.ts");

        assert_eq!(
            resolve_relative_import(&ctx, &app, "./lib/helper", TS_EXTENSIONS),
            vec![AbsolutePath::from_clean("/r/src/lib/helper.ts")]
        );
        assert_eq!(
            resolve_relative_import(&ctx, &app, "./widgets", TS_EXTENSIONS),
            vec![AbsolutePath::from_clean("/r/src/widgets/index.tsx")]
        );
        assert!(resolve_relative_import(&ctx, &app, "./missing", TS_EXTENSIONS).is_empty());
    }

    #[test]
    fn js_suffixed_specifiers_map_back_to_ts_sources() {
        let files = vec![
            AbsolutePath::from_clean("/r/a.ts"),
            AbsolutePath::from_clean("/r/b.ts"),
        ];
        let ctx = ResolverContext::build(&files);
        let a = AbsolutePath::from_clean("/r/a.ts");

        assert_eq!(
            resolve_relative_import(&ctx, &a, "./b.js", TS_EXTENSIONS),
            vec![AbsolutePath::from_clean("/r/b.ts")]
        );
    }

    #[test]
    fn test_file_naming() {
        assert!(is_test_file(&AbsolutePath::from_clean("/r/a.test.ts")));
        assert!(is_test_file(&AbsolutePath::from_clean("/r/a.spec.tsx")));
        assert!(is_test_file(&AbsolutePath::from_clean(
            "/r/__tests__/a.ts"
        )));
        assert!(!is_test_file(&AbsolutePath::from_clean("/r/a.ts")));
    }
}
