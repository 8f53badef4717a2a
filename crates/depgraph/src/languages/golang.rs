//! Go: module-path import resolution, embed directives, and intra-package
//! symbol linking.

use super::{identifier_tokens, read_source, strip_c_comments_line, strip_string_literals};
use crate::context::ResolverContext;
use crate::error::{ParseError, Result};
use crate::graph::DependencyGraph;
use crate::import::Import;
use crate::path::AbsolutePath;
use crate::reader::ContentReader;
use crate::registry::{ImportResolver, LanguageModule, Maturity};
use std::collections::{BTreeMap, BTreeSet};

pub struct GoModule;

impl LanguageModule for GoModule {
    fn name(&self) -> &'static str {
        "Go"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".go"]
    }

    fn maturity(&self) -> Maturity {
        Maturity::Active
    }

    fn new_resolver<'a>(
        &self,
        ctx: &'a ResolverContext,
        reader: &'a dyn ContentReader,
    ) -> Box<dyn ImportResolver + 'a> {
        Box::new(GoResolver::new(ctx, reader))
    }

    fn is_test_file(&self, path: &AbsolutePath, _reader: &dyn ContentReader) -> bool {
        is_test_file(path)
    }
}

pub fn is_test_file(path: &AbsolutePath) -> bool {
    path.file_name().ends_with("_test.go")
}

/// Parse import specs and `//go:embed` directives in source order.
/// Import paths whose first segment has no dot are standard library;
/// everything else is classified External here and re-checked against the
/// module name during resolution.
pub fn parse_imports(source: &str) -> std::result::Result<Vec<Import>, ParseError> {
    let mut imports = Vec::new();
    let mut in_block_comment = false;
    let mut in_import_block = false;

    for raw in source.lines() {
        let trimmed_raw = raw.trim_start();
        if !in_block_comment {
            if let Some(rest) = trimmed_raw.strip_prefix("//go:embed") {
                for pattern in split_embed_patterns(rest) {
                    imports.push(Import::EmbedDirective { pattern });
                }
                continue;
            }
        }

        let line = strip_c_comments_line(raw, &mut in_block_comment);
        let line = line.trim();

        if in_import_block {
            if line.starts_with(')') {
                in_import_block = false;
                continue;
            }
            if let Some(import) = parse_import_spec(line) {
                imports.push(import);
            }
            continue;
        }

        if let Some(rest) = line.strip_prefix("import") {
            let rest = rest.trim_start();
            if let Some(block) = rest.strip_prefix('(') {
                in_import_block = true;
                if let Some(import) = parse_import_spec(block.trim()) {
                    imports.push(import);
                }
            } else if let Some(import) = parse_import_spec(rest) {
                imports.push(import);
            }
        }
    }

    Ok(imports)
}

/// One spec line: optional alias (`alias "p"`, `_ "p"`, `. "p"`) and a
/// quoted path.
fn parse_import_spec(line: &str) -> Option<Import> {
    let start = line.find('"')?;
    let end = line[start + 1..].find('"')?;
    let path = &line[start + 1..start + 1 + end];
    if path.is_empty() {
        return None;
    }

    let first_segment = path.split('/').next().unwrap_or(path);
    if first_segment.contains('.') {
        Some(Import::external(path))
    } else {
        Some(Import::standard_library(path))
    }
}

fn split_embed_patterns(rest: &str) -> Vec<String> {
    rest.split_whitespace()
        .map(|p| p.trim_matches('"').to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

/// Alias each import is referred to by in source: the explicit alias, or
/// the final path segment.
fn import_aliases(source: &str) -> BTreeMap<String, String> {
    let mut aliases = BTreeMap::new();
    let mut in_block_comment = false;
    let mut in_import_block = false;

    for raw in source.lines() {
        let line = strip_c_comments_line(raw, &mut in_block_comment);
        let line = line.trim();

        let spec = if in_import_block {
            if line.starts_with(')') {
                in_import_block = false;
                continue;
            }
            Some(line)
        } else if let Some(rest) = line.strip_prefix("import") {
            let rest = rest.trim_start();
            if let Some(block) = rest.strip_prefix('(') {
                in_import_block = true;
                Some(block.trim())
            } else {
                Some(rest)
            }
        } else {
            None
        };

        let Some(spec) = spec else { continue };
        let Some(start) = spec.find('"') else {
            continue;
        };
        let Some(end) = spec[start + 1..].find('"') else {
            continue;
        };
        let path = spec[start + 1..start + 1 + end].to_string();

        let prefix = spec[..start].trim();
        let alias = match prefix {
            "" => path.rsplit('/').next().unwrap_or(&path).to_string(),
            "_" | "." => continue,
            explicit => explicit.to_string(),
        };
        aliases.insert(alias, path);
    }

    aliases
}

/// Symbols accessed through each imported package's alias
/// (`util.Helper` -> {"example.com/m/util": {"Helper"}}).
fn used_symbols_by_package(source: &str) -> BTreeMap<String, BTreeSet<String>> {
    let aliases = import_aliases(source);
    let mut used: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    let mut in_block_comment = false;

    for raw in source.lines() {
        let line = strip_c_comments_line(raw, &mut in_block_comment);
        let line = strip_string_literals(&line);
        let tokens = identifier_tokens(&line);

        for pair in tokens.windows(2) {
            let (qualifier, symbol) = (&pair[0], &pair[1]);
            if !symbol.1 {
                continue;
            }
            if let Some(path) = aliases.get(&qualifier.0) {
                used.entry(path.clone()).or_default().insert(symbol.0.clone());
            }
        }
    }

    used
}

/// Top-level symbols a file defines and the identifiers it references.
#[derive(Debug, Default, Clone)]
pub(crate) struct GoSymbols {
    pub(crate) package: String,
    pub(crate) defined: BTreeSet<String>,
    pub(crate) referenced: BTreeSet<String>,
}

const GO_KEYWORDS: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough",
    "for", "func", "go", "goto", "if", "import", "interface", "map", "package", "range",
    "return", "select", "struct", "switch", "type", "var", "nil", "true", "false", "iota",
];

#[derive(PartialEq)]
enum ParenBlock {
    None,
    Type,
    Value,
}

/// Lexical scan for defined/referenced symbols. Brace depth zero marks
/// top-level declarations; `type (` / `var (` / `const (` groups are
/// tracked separately since they do not open braces.
pub(crate) fn extract_symbols(source: &str) -> GoSymbols {
    let mut symbols = GoSymbols::default();
    let mut in_block_comment = false;
    let mut depth: i32 = 0;
    let mut paren_block = ParenBlock::None;

    for raw in source.lines() {
        let line = strip_c_comments_line(raw, &mut in_block_comment);
        let line = strip_string_literals(&line);
        let trimmed = line.trim();

        if depth == 0 {
            if paren_block != ParenBlock::None {
                if trimmed.starts_with(')') {
                    paren_block = ParenBlock::None;
                } else {
                    match paren_block {
                        ParenBlock::Type => {
                            if let Some(name) = first_identifier(trimmed) {
                                symbols.defined.insert(name);
                            }
                        }
                        ParenBlock::Value => {
                            symbols.defined.extend(leading_name_list(trimmed));
                        }
                        ParenBlock::None => {}
                    }
                }
            } else if let Some(rest) = trimmed.strip_prefix("package ") {
                symbols.package = rest.trim().to_string();
            } else if let Some(rest) = trimmed.strip_prefix("func ") {
                if let Some(name) = func_decl_name(rest) {
                    symbols.defined.insert(name);
                }
            } else if let Some(rest) = trimmed.strip_prefix("type ") {
                if rest.trim_start().starts_with('(') {
                    paren_block = ParenBlock::Type;
                } else if let Some(name) = first_identifier(rest) {
                    symbols.defined.insert(name);
                }
            } else if let Some(rest) = strip_value_decl(trimmed) {
                if rest.trim_start().starts_with('(') {
                    paren_block = ParenBlock::Value;
                } else {
                    symbols.defined.extend(leading_name_list(rest));
                }
            }
        }

        for (token, after_dot) in identifier_tokens(&line) {
            if after_dot || token == "_" {
                continue;
            }
            if GO_KEYWORDS.contains(&token.as_str()) {
                continue;
            }
            symbols.referenced.insert(token);
        }

        depth += line.matches('{').count() as i32;
        depth -= line.matches('}').count() as i32;
    }

    symbols.referenced.remove(&symbols.package.clone());
    symbols
}

fn strip_value_decl(line: &str) -> Option<&str> {
    line.strip_prefix("var ")
        .or_else(|| line.strip_prefix("const "))
}

/// `Name(...)` or `(recv Type) Name(...)`; method names only count when
/// exported, mirroring how the export surface is read elsewhere.
fn func_decl_name(rest: &str) -> Option<String> {
    let rest = rest.trim_start();
    if let Some(after_recv) = rest.strip_prefix('(') {
        let close = after_recv.find(')')?;
        let name = first_identifier(&after_recv[close + 1..])?;
        if name.chars().next()?.is_uppercase() {
            return Some(name);
        }
        return None;
    }
    first_identifier(rest)
}

fn first_identifier(text: &str) -> Option<String> {
    identifier_tokens(text).into_iter().map(|(t, _)| t).next()
}

/// `a, b = 1, 2` -> [a, b]; stops at `=` or a type annotation.
fn leading_name_list(text: &str) -> Vec<String> {
    let names_part = text.split('=').next().unwrap_or(text);
    let mut names = Vec::new();
    for piece in names_part.split(',') {
        match first_identifier(piece) {
            Some(name) if name != "_" => names.push(name),
            _ => break,
        }
    }
    names
}

struct GoResolver<'a> {
    ctx: &'a ResolverContext,
    reader: &'a dyn ContentReader,
    /// package directory -> exported symbol -> defining files
    export_indices: BTreeMap<AbsolutePath, BTreeMap<String, Vec<AbsolutePath>>>,
    module_roots: BTreeMap<AbsolutePath, Option<(AbsolutePath, String)>>,
}

impl<'a> GoResolver<'a> {
    fn new(ctx: &'a ResolverContext, reader: &'a dyn ContentReader) -> Self {
        let mut export_indices: BTreeMap<AbsolutePath, BTreeMap<String, Vec<AbsolutePath>>> =
            BTreeMap::new();

        for file in ctx.files_with_extension(".go") {
            let Ok(bytes) = reader.read(file) else {
                continue;
            };
            let source = String::from_utf8_lossy(&bytes);
            let symbols = extract_symbols(&source);

            let index = export_indices.entry(file.parent()).or_default();
            for symbol in &symbols.defined {
                if symbol.chars().next().is_some_and(char::is_uppercase) {
                    index.entry(symbol.clone()).or_default().push(file.clone());
                }
            }
        }

        GoResolver {
            ctx,
            reader,
            export_indices,
            module_roots: BTreeMap::new(),
        }
    }

    /// Walk up from `dir` looking for a readable go.mod; returns the module
    /// root and declared module name.
    fn module_for_dir(&mut self, dir: &AbsolutePath) -> Option<(AbsolutePath, String)> {
        if let Some(cached) = self.module_roots.get(dir) {
            return cached.clone();
        }

        let mut current = dir.clone();
        let found = loop {
            let go_mod = current.join_clean("go.mod");
            if let Ok(bytes) = self.reader.read(&go_mod) {
                let source = String::from_utf8_lossy(&bytes);
                match parse_module_name(&source) {
                    Some(name) => break Some((current, name)),
                    None => break None,
                }
            }
            let parent = current.parent();
            if parent == current {
                break None;
            }
            current = parent;
        };

        self.module_roots.insert(dir.clone(), found.clone());
        found
    }

    /// Map an import path to the package directory it names inside this
    /// module, or None for genuinely external imports.
    fn resolve_import_dir(&mut self, source_file: &AbsolutePath, import_path: &str) -> Option<AbsolutePath> {
        let (root, module_name) = self.module_for_dir(&source_file.parent())?;

        if import_path == module_name {
            return Some(root);
        }
        let relative = import_path.strip_prefix(&format!("{module_name}/"))?;
        Some(root.join_clean(relative))
    }

    fn resolve_embed(&self, source_file: &AbsolutePath, pattern: &str) -> Option<AbsolutePath> {
        let source_dir = source_file.parent();

        if !pattern.contains(['*', '?', '[']) {
            let candidate = source_dir.join_clean(pattern);
            return self.ctx.contains(&candidate).then_some(candidate);
        }

        let full_pattern = source_dir.join_clean(pattern).to_slash_string();
        let matcher = glob::Pattern::new(&full_pattern).ok()?;
        self.ctx
            .supplied_files()
            .iter()
            .find(|file| matcher.matches(&file.to_slash_string()))
            .cloned()
    }
}

impl ImportResolver for GoResolver<'_> {
    fn resolve_project_imports(
        &mut self,
        path: &AbsolutePath,
        _ext: &str,
    ) -> Result<Vec<AbsolutePath>> {
        let source = read_source(self.reader, path)?;
        let imports = parse_imports(&source).map_err(|source| {
            crate::error::DepgraphError::ParseFailure {
                path: path.clone(),
                source,
            }
        })?;

        let used_symbols = used_symbols_by_package(&source);
        let is_test = is_test_file(path);
        let source_dir = path.parent();
        let mut project_imports = Vec::new();

        for import in &imports {
            match import {
                Import::EmbedDirective { pattern } => {
                    if let Some(embedded) = self.resolve_embed(path, pattern) {
                        project_imports.push(embedded);
                    }
                }
                Import::External { path: import_path } => {
                    let Some(package_dir) = self.resolve_import_dir(path, import_path) else {
                        continue;
                    };
                    let same_dir = source_dir == package_dir;
                    let export_index = self.export_indices.get(&package_dir);
                    let used = used_symbols.get(import_path);

                    for dep in self.ctx.files_in_dir(&package_dir) {
                        if dep == path {
                            continue;
                        }
                        if dep.extension() != ".go" {
                            continue;
                        }
                        if is_test_file(dep) && !same_dir {
                            continue;
                        }

                        // Symbol-level narrowing when both the used-symbol
                        // set and the export index are available; otherwise
                        // the whole package is a candidate.
                        if !same_dir || is_test {
                            if let (Some(index), Some(used)) = (export_index, used) {
                                if !used.is_empty()
                                    && !used.iter().any(|symbol| {
                                        index
                                            .get(symbol)
                                            .is_some_and(|files| files.contains(dep))
                                    })
                                {
                                    continue;
                                }
                            }
                        }

                        project_imports.push(dep.clone());
                    }
                }
                _ => {}
            }
        }

        Ok(project_imports)
    }

    /// Files in one package reference each other without imports; link a
    /// file to every package sibling defining a symbol it uses. Non-test
    /// files never link to test files.
    fn finalize_graph(&mut self, graph: &mut DependencyGraph) -> Result<()> {
        let mut packages: BTreeMap<AbsolutePath, Vec<&AbsolutePath>> = BTreeMap::new();
        for file in self.ctx.files_with_extension(".go") {
            packages.entry(file.parent()).or_default().push(file);
        }

        for files in packages.values() {
            let mut test_files: Vec<(&AbsolutePath, GoSymbols)> = Vec::new();
            let mut non_test_files: Vec<(&AbsolutePath, GoSymbols)> = Vec::new();

            for &file in files {
                let Ok(bytes) = self.reader.read(file) else {
                    log::warn!("intra-package pass: unreadable file {file}");
                    continue;
                };
                let symbols = extract_symbols(&String::from_utf8_lossy(&bytes));
                if is_test_file(file) {
                    test_files.push((file, symbols));
                } else {
                    non_test_files.push((file, symbols));
                }
            }

            let mut non_test_defs: BTreeMap<&str, Vec<&AbsolutePath>> = BTreeMap::new();
            for &(file, ref symbols) in &non_test_files {
                for symbol in &symbols.defined {
                    non_test_defs.entry(symbol.as_str()).or_default().push(file);
                }
            }

            let mut all_defs = non_test_defs.clone();
            for &(file, ref symbols) in &test_files {
                for symbol in &symbols.defined {
                    all_defs.entry(symbol.as_str()).or_default().push(file);
                }
            }

            let mut link = |file: &AbsolutePath,
                            symbols: &GoSymbols,
                            defs: &BTreeMap<&str, Vec<&AbsolutePath>>,
                            graph: &mut DependencyGraph| {
                if !graph.contains_vertex(file) {
                    return;
                }
                for symbol in &symbols.referenced {
                    let Some(defining) = defs.get(symbol.as_str()) else {
                        continue;
                    };
                    for &def_file in defining {
                        if def_file != file && graph.contains_vertex(def_file) {
                            graph.add_edge(file.clone(), def_file.clone());
                        }
                    }
                }
            };

            for &(file, ref symbols) in &non_test_files {
                link(file, symbols, &non_test_defs, graph);
            }
            for &(file, ref symbols) in &test_files {
                link(file, symbols, &all_defs, graph);
            }
        }

        Ok(())
    }
}

fn parse_module_name(go_mod: &str) -> Option<String> {
    go_mod.lines().find_map(|line| {
        line.trim()
            .strip_prefix("module")
            .map(|rest| rest.trim().to_string())
            .filter(|name| !name.is_empty())
    })
}
