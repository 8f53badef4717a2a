//! Canonicalized absolute paths and the resolver that produces them.

use crate::error::{DepgraphError, Result};
use path_clean::PathClean;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

/// A lexically cleaned absolute filesystem path.
///
/// Equality and ordering are byte-wise over the cleaned path, so two
/// `AbsolutePath` values compare equal iff they name the same file in the
/// same spelling. Construction goes through [`PathResolver`] or
/// [`AbsolutePath::from_clean`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AbsolutePath(PathBuf);

// PathBuf's own comparisons are component-wise ("a/b" before "a-b");
// vertex identity here is the path *string*, so Eq/Ord/Hash all go
// through the encoded bytes instead of deriving from PathBuf.
impl PartialEq for AbsolutePath {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for AbsolutePath {}

impl PartialOrd for AbsolutePath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AbsolutePath {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_bytes().cmp(other.as_bytes())
    }
}

impl Hash for AbsolutePath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_bytes().hash(state);
    }
}

impl AbsolutePath {
    fn as_bytes(&self) -> &[u8] {
        self.0.as_os_str().as_encoded_bytes()
    }

    /// Wrap a path that is already absolute, applying a lexical clean.
    pub fn from_clean(path: impl Into<PathBuf>) -> Self {
        AbsolutePath(path.into().clean())
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// The containing directory, cleaned. Root directories return themselves.
    pub fn parent(&self) -> AbsolutePath {
        match self.0.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                AbsolutePath(parent.to_path_buf())
            }
            _ => self.clone(),
        }
    }

    /// Final path component as a string.
    pub fn file_name(&self) -> &str {
        self.0
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }

    /// File stem (name without the final extension).
    pub fn file_stem(&self) -> &str {
        self.0
            .file_stem()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }

    /// Dot-prefixed extension of the file name (".go", ".rs", ...) or "".
    pub fn extension(&self) -> String {
        match self.0.extension().and_then(|e| e.to_str()) {
            Some(ext) => format!(".{ext}"),
            None => String::new(),
        }
    }

    /// Join a relative fragment onto this path and clean the result.
    pub fn join_clean(&self, fragment: impl AsRef<Path>) -> AbsolutePath {
        AbsolutePath(self.0.join(fragment).clean())
    }

    /// True when `suffix` matches a whole trailing run of path components.
    pub fn ends_with_components(&self, suffix: impl AsRef<Path>) -> bool {
        self.0.ends_with(suffix)
    }

    /// Slash-normalized string form, for substring checks on directories.
    pub fn to_slash_string(&self) -> String {
        let s = self.0.to_string_lossy();
        if std::path::MAIN_SEPARATOR == '/' {
            s.into_owned()
        } else {
            s.replace(std::path::MAIN_SEPARATOR, "/")
        }
    }
}

impl fmt::Display for AbsolutePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.display().fmt(f)
    }
}

impl AsRef<Path> for AbsolutePath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

/// Resolves raw user-supplied paths against a configured base directory.
#[derive(Debug, Clone)]
pub struct PathResolver {
    base_dir: AbsolutePath,
}

impl PathResolver {
    /// An empty base directory means the current working directory.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base = base_dir.as_ref();
        let base = if base.as_os_str().is_empty() {
            Path::new(".")
        } else {
            base
        };

        let abs = if base.is_absolute() {
            base.to_path_buf()
        } else {
            let cwd = std::env::current_dir().map_err(|source| DepgraphError::PathResolution {
                path: base.display().to_string(),
                source,
            })?;
            cwd.join(base)
        };

        Ok(PathResolver {
            base_dir: AbsolutePath::from_clean(abs),
        })
    }

    pub fn base_dir(&self) -> &AbsolutePath {
        &self.base_dir
    }

    /// Absolute inputs are cleaned lexically; relative inputs are joined
    /// against the base directory. Empty input is an error.
    pub fn resolve(&self, raw: impl AsRef<Path>) -> Result<AbsolutePath> {
        let raw = raw.as_ref();
        if raw.as_os_str().is_empty() {
            return Err(DepgraphError::EmptyPath);
        }

        if raw.is_absolute() {
            return Ok(AbsolutePath::from_clean(raw));
        }

        Ok(self.base_dir.join_clean(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_cleans_absolute_paths() {
        let resolver = PathResolver::new("/base").unwrap();
        let p = resolver.resolve("/a/./b/../c.go").unwrap();
        assert_eq!(p.to_slash_string(), "/a/c.go");
    }

    #[test]
    fn resolve_joins_relative_paths_against_base() {
        let resolver = PathResolver::new("/base/dir").unwrap();
        let p = resolver.resolve("../src/main.rs").unwrap();
        assert_eq!(p.to_slash_string(), "/base/src/main.rs");
    }

    #[test]
    fn resolve_rejects_empty_input() {
        let resolver = PathResolver::new("/base").unwrap();
        assert!(matches!(
            resolver.resolve(""),
            Err(DepgraphError::EmptyPath)
        ));
    }

    #[test]
    fn empty_base_falls_back_to_current_dir() {
        let resolver = PathResolver::new("").unwrap();
        assert!(resolver.base_dir().as_path().is_absolute());
    }

    #[test]
    fn ordering_is_byte_wise_over_the_path_string() {
        // '-' (0x2D) sorts before '/' (0x2F) byte-wise; PathBuf's
        // component order would put the nested path first.
        let hyphenated = AbsolutePath::from_clean("/r/a-b.go");
        let nested = AbsolutePath::from_clean("/r/a/b.go");
        assert!(hyphenated < nested);

        let mut paths = vec![nested.clone(), hyphenated.clone()];
        paths.sort();
        assert_eq!(paths, vec![hyphenated, nested]);
    }

    #[test]
    fn extension_is_dot_prefixed() {
        let p = AbsolutePath::from_clean("/a/b/file.test.ts");
        assert_eq!(p.extension(), ".ts");
        assert_eq!(AbsolutePath::from_clean("/a/Makefile").extension(), "");
    }

    #[test]
    fn parent_of_root_is_root() {
        let root = AbsolutePath::from_clean("/");
        assert_eq!(root.parent(), root);
    }
}
