//! Content access abstraction.
//!
//! The engine never touches the filesystem directly; every byte it reads
//! comes through a [`ContentReader`]. Concrete readers (filesystem, git
//! commit) live outside the core.

use crate::path::AbsolutePath;
use std::collections::BTreeMap;
use std::io;

/// Maps an absolute path to file bytes.
pub trait ContentReader {
    fn read(&self, path: &AbsolutePath) -> io::Result<Vec<u8>>;
}

impl<F> ContentReader for F
where
    F: Fn(&AbsolutePath) -> io::Result<Vec<u8>>,
{
    fn read(&self, path: &AbsolutePath) -> io::Result<Vec<u8>> {
        self(path)
    }
}

/// In-memory reader backed by a path → bytes map. Used as a fixture in
/// tests and anywhere a snapshot of file contents is already in hand.
#[derive(Debug, Clone, Default)]
pub struct MemoryReader {
    files: BTreeMap<AbsolutePath, Vec<u8>>,
}

impl MemoryReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: AbsolutePath, contents: impl Into<Vec<u8>>) {
        self.files.insert(path, contents.into());
    }

    pub fn with(mut self, path: &str, contents: &str) -> Self {
        self.insert(AbsolutePath::from_clean(path), contents.as_bytes().to_vec());
        self
    }
}

impl ContentReader for MemoryReader {
    fn read(&self, path: &AbsolutePath) -> io::Result<Vec<u8>> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no entry for {path}")))
    }
}
