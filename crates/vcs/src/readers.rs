//! Content readers: filesystem and git-commit backed.

use crate::repository;
use depscope_depgraph::{AbsolutePath, ContentReader};
use std::io;
use std::path::{Path, PathBuf};

/// Reads file bytes straight from the filesystem.
#[derive(Debug, Clone, Default)]
pub struct FsContentReader;

impl ContentReader for FsContentReader {
    fn read(&self, path: &AbsolutePath) -> io::Result<Vec<u8>> {
        std::fs::read(path.as_path())
    }
}

/// Reads file bytes as they were at a given commit, translating absolute
/// paths to repository-relative at the boundary.
pub struct CommitContentReader {
    repo_root: PathBuf,
    commit: String,
}

impl CommitContentReader {
    /// `repo_path` may be any directory inside the repository; the root is
    /// resolved (symlinks included) so path translation matches the
    /// canonicalized paths the engine works with.
    pub fn new(repo_path: &Path, commit: &str) -> crate::error::Result<Self> {
        let repo_root = repository::repository_root(repo_path)?;
        Ok(CommitContentReader {
            repo_root,
            commit: commit.to_string(),
        })
    }

    fn relative_path(&self, path: &AbsolutePath) -> PathBuf {
        path.as_path()
            .strip_prefix(&self.repo_root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_path().to_path_buf())
    }
}

impl ContentReader for CommitContentReader {
    fn read(&self, path: &AbsolutePath) -> io::Result<Vec<u8>> {
        let relative = self.relative_path(path);
        let spec = format!("{}:{}", self.commit, relative.to_string_lossy());

        repository::run_git_bytes(&self.repo_root, &["show", &spec])
            .map_err(|err| io::Error::new(io::ErrorKind::NotFound, err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fs_reader_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, b"contents").unwrap();

        let reader = FsContentReader;
        let canonical = dir.path().canonicalize().unwrap().join("a.txt");
        let bytes = reader
            .read(&AbsolutePath::from_clean(canonical))
            .unwrap();
        assert_eq!(bytes, b"contents");
    }

    #[test]
    fn fs_reader_propagates_missing_files() {
        let reader = FsContentReader;
        let err = reader
            .read(&AbsolutePath::from_clean("/no/such/file.rs"))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
