//! Python: relative imports resolve from the source directory; absolute
//! dotted imports are tried against ancestor directories of the importing
//! file.

use super::{read_source, strip_hash_comments};
use crate::context::ResolverContext;
use crate::error::{DepgraphError, ParseError, Result};
use crate::import::Import;
use crate::path::AbsolutePath;
use crate::reader::ContentReader;
use crate::registry::{ImportResolver, LanguageModule, Maturity};

pub struct PythonModule;

impl LanguageModule for PythonModule {
    fn name(&self) -> &'static str {
        "Python"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".py"]
    }

    fn maturity(&self) -> Maturity {
        Maturity::Untested
    }

    fn new_resolver<'a>(
        &self,
        ctx: &'a ResolverContext,
        reader: &'a dyn ContentReader,
    ) -> Box<dyn ImportResolver + 'a> {
        Box::new(PythonResolver { ctx, reader })
    }

    fn is_test_file(&self, path: &AbsolutePath, _reader: &dyn ContentReader) -> bool {
        is_test_file(path)
    }
}

pub fn is_test_file(path: &AbsolutePath) -> bool {
    let name = path.file_name();
    if name.starts_with("test_") && name.ends_with(".py") {
        return true;
    }
    if name.ends_with("_test.py") {
        return true;
    }
    path.to_slash_string().contains("/tests/")
}

/// Extract `import a.b` and `from x import y` statements. Leading-dot
/// modules are Internal; absolute modules stay External until the
/// resolver finds a matching project file.
pub fn parse_imports(source: &str) -> std::result::Result<Vec<Import>, ParseError> {
    let mut imports = Vec::new();

    for line in strip_hash_comments(source) {
        let trimmed = line.trim();

        if let Some(rest) = trimmed.strip_prefix("from ") {
            let Some((module, names)) = rest.split_once(" import ") else {
                continue;
            };
            let module = module.trim();
            let is_wildcard = names.trim() == "*";

            if module == "." || module.chars().all(|c| c == '.') {
                // `from . import x, y` names sibling modules directly.
                for name in names.split(',') {
                    let name = name.trim().split_whitespace().next().unwrap_or("");
                    if !name.is_empty() && name != "*" {
                        imports.push(Import::internal(format!("{module}{name}")));
                    }
                }
            } else if module.starts_with('.') {
                imports.push(Import::Internal {
                    path: module.to_string(),
                    is_wildcard,
                });
            } else {
                imports.push(Import::External {
                    path: module.to_string(),
                });
            }
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix("import ") {
            for spec in rest.split(',') {
                let module = spec
                    .trim()
                    .split_whitespace()
                    .next()
                    .unwrap_or("")
                    .to_string();
                if !module.is_empty() {
                    imports.push(Import::external(module));
                }
            }
        }
    }

    Ok(imports)
}

struct PythonResolver<'a> {
    ctx: &'a ResolverContext,
    reader: &'a dyn ContentReader,
}

impl PythonResolver<'_> {
    /// `<base>/<segments>.py` or `<base>/<segments>/__init__.py`.
    fn module_candidates(&self, base: &AbsolutePath, dotted: &str) -> Vec<AbsolutePath> {
        let relative = dotted.replace('.', "/");
        vec![
            base.join_clean(format!("{relative}.py")),
            base.join_clean(format!("{relative}/__init__.py")),
        ]
    }

    fn resolve_relative(&self, source_dir: &AbsolutePath, module: &str) -> Vec<AbsolutePath> {
        let dots = module.chars().take_while(|c| *c == '.').count();
        let rest = &module[dots..];
        if rest.is_empty() {
            return Vec::new();
        }

        let mut base = source_dir.clone();
        for _ in 1..dots {
            base = base.parent();
        }

        self.module_candidates(&base, rest)
            .into_iter()
            .filter(|candidate| self.ctx.contains(candidate))
            .collect()
    }

    /// Try the module path from the source directory upward; the first
    /// ancestor with a hit wins.
    fn resolve_absolute(&self, source_dir: &AbsolutePath, module: &str) -> Vec<AbsolutePath> {
        let mut base = source_dir.clone();
        loop {
            let hits: Vec<AbsolutePath> = self
                .module_candidates(&base, module)
                .into_iter()
                .filter(|candidate| self.ctx.contains(candidate))
                .collect();
            if !hits.is_empty() {
                return hits;
            }

            let parent = base.parent();
            if parent == base {
                return Vec::new();
            }
            base = parent;
        }
    }
}

impl ImportResolver for PythonResolver<'_> {
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

        let source_dir = path.parent();
        let mut resolved = Vec::new();

        for import in imports {
            let candidates = match &import {
                Import::Internal { path: module, .. } => {
                    self.resolve_relative(&source_dir, module)
                }
                Import::External { path: module } => {
                    self.resolve_absolute(&source_dir, module)
                }
                _ => Vec::new(),
            };
            resolved.extend(candidates.into_iter().filter(|c| c != path));
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
    fn parses_import_statements() {
        let src = r#"import os
import json, sys
from collections import OrderedDict
from .sibling import thing
from ..pkg import other  # relative
from . import alpha, beta
"#;
        let imports = parse_imports(src).unwrap();
        assert_eq!(
            imports,
            vec![
                Import::external("os"),
                Import::external("json"),
                Import::external("sys"),
                Import::external("collections"),
                Import::internal(".sibling"),
                Import::internal("..pkg"),
                Import::internal(".alpha"),
                Import::internal(".beta"),
            ]
        );
    }

    #[test]
    fn resolves_relative_imports() {
        let reader = MemoryReader::new()
            .with("/app/pkg/main.py", "from .util import helper\n")
            .with("/app/pkg/util.py", "def helper(): pass\n");
        let files = vec![p("/app/pkg/main.py"), p("/app/pkg/util.py")];
        let ctx = ResolverContext::build(&files);
        let mut resolver = PythonModule.new_resolver(&ctx, &reader);

        let deps = resolver
            .resolve_project_imports(&p("/app/pkg/main.py"), ".py")
            .unwrap();
        assert_eq!(deps, vec![p("/app/pkg/util.py")]);
    }

    #[test]
    fn resolves_parent_relative_imports() {
        let reader = MemoryReader::new()
            .with("/app/pkg/sub/worker.py", "from ..config import load\n")
            .with("/app/pkg/config.py", "def load(): pass\n");
        let files = vec![p("/app/pkg/config.py"), p("/app/pkg/sub/worker.py")];
        let ctx = ResolverContext::build(&files);
        let mut resolver = PythonModule.new_resolver(&ctx, &reader);

        let deps = resolver
            .resolve_project_imports(&p("/app/pkg/sub/worker.py"), ".py")
            .unwrap();
        assert_eq!(deps, vec![p("/app/pkg/config.py")]);
    }

    #[test]
    fn resolves_absolute_imports_through_ancestors() {
        let reader = MemoryReader::new()
            .with("/app/src/main.py", "import mylib.util\n")
            .with("/app/src/mylib/util.py", "def helper(): pass\n")
            .with("/app/src/mylib/__init__.py", "");
        let files = vec![
            p("/app/src/main.py"),
            p("/app/src/mylib/__init__.py"),
            p("/app/src/mylib/util.py"),
        ];
        let ctx = ResolverContext::build(&files);
        let mut resolver = PythonModule.new_resolver(&ctx, &reader);

        let deps = resolver
            .resolve_project_imports(&p("/app/src/main.py"), ".py")
            .unwrap();
        assert_eq!(deps, vec![p("/app/src/mylib/util.py")]);
    }

    #[test]
    fn unresolved_absolute_imports_produce_no_edges() {
        let reader = MemoryReader::new().with("/app/main.py", "import numpy\n");
        let files = vec![p("/app/main.py")];
        let ctx = ResolverContext::build(&files);
        let mut resolver = PythonModule.new_resolver(&ctx, &reader);

        let deps = resolver
            .resolve_project_imports(&p("/app/main.py"), ".py")
            .unwrap();
        assert!(deps.is_empty());
    }

    #[test]
    fn test_file_naming() {
        assert!(is_test_file(&p("/r/test_main.py")));
        assert!(is_test_file(&p("/r/main_test.py")));
        assert!(is_test_file(&p("/r/tests/conftest.py")));
        assert!(!is_test_file(&p("/r/main.py")));
    }
}
