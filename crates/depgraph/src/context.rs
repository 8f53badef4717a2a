//! Per-build shared indices over the supplied file set.

use crate::path::AbsolutePath;
use crate::reader::ContentReader;
use std::collections::{BTreeMap, BTreeSet};

/// Precomputed, read-only indices shared by every resolver during one build.
/// Constructed from the sorted canonical file list, so contents do not
/// depend on the caller's argument order.
#[derive(Debug, Default)]
pub struct ResolverContext {
    supplied_files: BTreeSet<AbsolutePath>,
    dir_to_files: BTreeMap<AbsolutePath, Vec<AbsolutePath>>,
    files_by_extension: BTreeMap<String, Vec<AbsolutePath>>,
}

impl ResolverContext {
    /// `files` must already be canonicalized and sorted.
    pub fn build(files: &[AbsolutePath]) -> Self {
        let mut ctx = ResolverContext::default();
        for file in files {
            ctx.supplied_files.insert(file.clone());
            ctx.dir_to_files
                .entry(file.parent())
                .or_default()
                .push(file.clone());

            let ext = file.extension();
            if !ext.is_empty() {
                ctx.files_by_extension
                    .entry(ext)
                    .or_default()
                    .push(file.clone());
            }
        }
        ctx
    }

    pub fn contains(&self, path: &AbsolutePath) -> bool {
        self.supplied_files.contains(path)
    }

    pub fn supplied_files(&self) -> &BTreeSet<AbsolutePath> {
        &self.supplied_files
    }

    /// Files in a directory, sorted.
    pub fn files_in_dir(&self, dir: &AbsolutePath) -> &[AbsolutePath] {
        self.dir_to_files
            .get(dir)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Supplied files carrying the given dot-prefixed extension, sorted.
    pub fn files_with_extension(&self, ext: &str) -> &[AbsolutePath] {
        self.files_by_extension
            .get(ext)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Supplied files carrying any of the given extensions, sorted.
    pub fn files_with_extensions(&self, exts: &[&str]) -> Vec<AbsolutePath> {
        let mut files: Vec<AbsolutePath> = exts
            .iter()
            .flat_map(|ext| self.files_with_extension(ext).iter().cloned())
            .collect();
        files.sort();
        files
    }
}

/// Package/namespace indices for languages where files declare their
/// package at the top. Built once per resolver from the context file list.
#[derive(Debug, Default)]
pub struct PackageIndex {
    package_to_files: BTreeMap<String, Vec<AbsolutePath>>,
    package_to_type_decls: BTreeMap<String, BTreeMap<String, Vec<AbsolutePath>>>,
    file_to_package: BTreeMap<AbsolutePath, String>,
}

impl PackageIndex {
    /// Index `files` using language-supplied extraction functions. Files
    /// whose content is unavailable or that declare no package are skipped.
    pub fn build(
        files: &[AbsolutePath],
        reader: &dyn ContentReader,
        extract_package: impl Fn(&str) -> Option<String>,
        extract_type_decls: impl Fn(&str) -> Vec<String>,
    ) -> Self {
        let mut index = PackageIndex::default();

        for file in files {
            let Ok(bytes) = reader.read(file) else {
                continue;
            };
            let source = String::from_utf8_lossy(&bytes);

            let Some(package) = extract_package(&source) else {
                continue;
            };

            index
                .package_to_files
                .entry(package.clone())
                .or_default()
                .push(file.clone());
            index.file_to_package.insert(file.clone(), package.clone());

            for type_name in extract_type_decls(&source) {
                if type_name.is_empty() {
                    continue;
                }
                index
                    .package_to_type_decls
                    .entry(package.clone())
                    .or_default()
                    .entry(type_name)
                    .or_default()
                    .push(file.clone());
            }
        }

        index
    }

    pub fn has_package(&self, package: &str) -> bool {
        self.package_to_files.contains_key(package)
    }

    pub fn files_in_package(&self, package: &str) -> &[AbsolutePath] {
        self.package_to_files
            .get(package)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn files_declaring_type(&self, package: &str, type_name: &str) -> &[AbsolutePath] {
        self.package_to_type_decls
            .get(package)
            .and_then(|types| types.get(type_name))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn type_decls_in_package(
        &self,
        package: &str,
    ) -> Option<&BTreeMap<String, Vec<AbsolutePath>>> {
        self.package_to_type_decls.get(package)
    }

    pub fn package_of(&self, file: &AbsolutePath) -> Option<&str> {
        self.file_to_package.get(file).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.package_to_files.is_empty()
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
    fn context_indexes_dirs_and_extensions() {
        let files = vec![p("/r/a.go"), p("/r/sub/b.go"), p("/r/sub/c.kt")];
        let ctx = ResolverContext::build(&files);

        assert!(ctx.contains(&p("/r/a.go")));
        assert_eq!(ctx.files_in_dir(&p("/r/sub")).len(), 2);
        assert_eq!(ctx.files_with_extension(".go").len(), 2);
        assert_eq!(ctx.files_with_extension(".kt"), &[p("/r/sub/c.kt")]);
        assert!(ctx.files_with_extension(".java").is_empty());
    }

    #[test]
    fn package_index_groups_files_and_types() {
        let reader = MemoryReader::new()
            .with("/r/A.java", "package com.x;\nclass A {}\n")
            .with("/r/B.java", "package com.x;\nclass B {}\n")
            .with("/r/other.txt", "not java");
        let files = vec![p("/r/A.java"), p("/r/B.java")];

        let index = PackageIndex::build(
            &files,
            &reader,
            |src| {
                src.lines()
                    .find_map(|l| l.strip_prefix("package "))
                    .map(|rest| rest.trim_end_matches(';').trim().to_string())
            },
            |src| {
                src.lines()
                    .filter_map(|l| l.strip_prefix("class "))
                    .map(|rest| rest.split_whitespace().next().unwrap_or("").to_string())
                    .collect()
            },
        );

        assert!(index.has_package("com.x"));
        assert_eq!(index.files_in_package("com.x").len(), 2);
        assert_eq!(
            index.files_declaring_type("com.x", "B"),
            &[p("/r/B.java")]
        );
        assert_eq!(index.package_of(&p("/r/A.java")), Some("com.x"));
    }
}
