//! In-memory collaborators for tests and embedding.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::catalog::CatalogEntry;
use crate::error::ScopeError;
use crate::outline::OutlineNode;
use crate::revision::{BlameLine, Commit, validate_revision_range};

use super::{BlameSource, CatalogSource, OutlineSource, RevisionHistory, SourceReader, TextSearcher};

/// Outlines keyed by file path; unknown files have no outline.
#[derive(Debug, Default)]
pub struct InMemoryOutlines {
    outlines: Mutex<BTreeMap<PathBuf, Vec<OutlineNode>>>,
    requested: Mutex<Vec<PathBuf>>,
}

impl InMemoryOutlines {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_outline(self, path: impl Into<PathBuf>, outline: Vec<OutlineNode>) -> Self {
        self.insert(path, outline);
        self
    }

    pub fn insert(&self, path: impl Into<PathBuf>, outline: Vec<OutlineNode>) {
        self.outlines.lock().insert(path.into(), outline);
    }

    /// Paths asked for so far, in call order.
    pub fn requested(&self) -> Vec<PathBuf> {
        self.requested.lock().clone()
    }
}

impl OutlineSource for InMemoryOutlines {
    fn outline(&self, path: &Path) -> Result<Vec<OutlineNode>, ScopeError> {
        self.requested.lock().push(path.to_path_buf());
        self.outlines
            .lock()
            .get(path)
            .cloned()
            .ok_or_else(|| ScopeError::NoOutline(path.to_path_buf()))
    }
}

/// Catalogs keyed by directory, counting lookups.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    catalogs: Mutex<BTreeMap<PathBuf, Vec<CatalogEntry>>>,
    calls: Mutex<usize>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(self, dir: impl Into<PathBuf>, entries: Vec<CatalogEntry>) -> Self {
        self.insert(dir, entries);
        self
    }

    pub fn insert(&self, dir: impl Into<PathBuf>, entries: Vec<CatalogEntry>) {
        self.catalogs.lock().insert(dir.into(), entries);
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock()
    }
}

impl CatalogSource for InMemoryCatalog {
    fn catalog(&self, dir: &Path) -> Result<Vec<CatalogEntry>, ScopeError> {
        *self.calls.lock() += 1;
        self.catalogs
            .lock()
            .get(dir)
            .cloned()
            .ok_or_else(|| ScopeError::Collaborator(format!("no test suite in {}", dir.display())))
    }
}

/// Search results are the registered `path:content` lines of a directory that contain the pattern.
#[derive(Debug, Default)]
pub struct InMemorySearcher {
    lines: Mutex<BTreeMap<PathBuf, Vec<String>>>,
}

impl InMemorySearcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_line(self, dir: impl Into<PathBuf>, file: &str, content: &str) -> Self {
        self.lines
            .lock()
            .entry(dir.into())
            .or_default()
            .push(format!("{file}:{content}"));
        self
    }
}

impl TextSearcher for InMemorySearcher {
    fn search(&self, pattern: &str, dir: &Path) -> Result<Vec<String>, ScopeError> {
        let lines = self.lines.lock();
        Ok(lines
            .get(dir)
            .map(|lines| {
                lines
                    .iter()
                    .filter(|line| {
                        line.split_once(':')
                            .is_some_and(|(_, content)| content.contains(pattern))
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Commit lists keyed by revision range.
#[derive(Debug, Default)]
pub struct InMemoryHistory {
    ranges: Mutex<BTreeMap<String, Vec<Commit>>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_range(self, range: impl Into<String>, commits: Vec<Commit>) -> Self {
        self.ranges.lock().insert(range.into(), commits);
        self
    }
}

impl RevisionHistory for InMemoryHistory {
    fn log_commits(
        &self,
        range: &str,
        _repo: &Path,
        subdir: &Path,
    ) -> Result<Vec<Commit>, ScopeError> {
        validate_revision_range(range)?;
        let ranges = self.ranges.lock();
        let commits = ranges
            .get(range)
            .ok_or_else(|| ScopeError::Collaborator(format!("unknown revision range {range}")))?;
        if subdir.as_os_str().is_empty() {
            return Ok(commits.clone());
        }

        // mirrors `git log -- <subdir>`: only changes below subdir, commits without any dropped
        Ok(commits
            .iter()
            .filter_map(|commit| {
                let mut commit = commit.clone();
                commit
                    .file_changes
                    .retain(|change| Path::new(&change.filename).starts_with(subdir));
                (!commit.file_changes.is_empty()).then_some(commit)
            })
            .collect())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryBlame {
    blames: Mutex<BTreeMap<PathBuf, Vec<BlameLine>>>,
}

impl InMemoryBlame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blame(self, path: impl Into<PathBuf>, lines: Vec<BlameLine>) -> Self {
        self.blames.lock().insert(path.into(), lines);
        self
    }
}

impl BlameSource for InMemoryBlame {
    fn blame(&self, path: &Path) -> Result<Vec<BlameLine>, ScopeError> {
        self.blames
            .lock()
            .get(path)
            .cloned()
            .ok_or_else(|| {
                ScopeError::Collaborator(format!("no such path {} in HEAD", path.display()))
            })
    }
}

#[derive(Debug, Default)]
pub struct InMemoryReader {
    files: Mutex<BTreeMap<PathBuf, String>>,
    reads: Mutex<BTreeSet<PathBuf>>,
}

impl InMemoryReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.files.lock().insert(path.into(), content.into());
        self
    }

    /// Distinct paths read so far.
    pub fn reads(&self) -> BTreeSet<PathBuf> {
        self.reads.lock().clone()
    }
}

impl SourceReader for InMemoryReader {
    fn read(&self, path: &Path) -> Result<String, ScopeError> {
        self.reads.lock().insert(path.to_path_buf());
        self.files.lock().get(path).cloned().ok_or_else(|| {
            ScopeError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            ))
        })
    }
}
