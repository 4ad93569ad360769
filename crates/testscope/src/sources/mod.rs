//! Narrow interfaces to the external tools the engine depends on.
//!
//! Each trait has a process-backed implementation and an in-memory one in
//! [`memory`] for tests.

use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use std::sync::Arc;

use crate::catalog::CatalogEntry;
use crate::error::ScopeError;
use crate::outline::OutlineNode;
use crate::revision::{BlameLine, Commit};

pub mod git;
pub mod ginkgo;
pub mod memory;
pub mod search;

/// Produces the outline forest of one test source file.
pub trait OutlineSource: Send + Sync {
    /// Returns [`ScopeError::NoOutline`] for files that are not ginkgo test files.
    fn outline(&self, path: &Path) -> Result<Vec<OutlineNode>, ScopeError>;
}

/// Produces the dry-run catalog of every spec below a directory.
pub trait CatalogSource: Send + Sync {
    fn catalog(&self, dir: &Path) -> Result<Vec<CatalogEntry>, ScopeError>;
}

/// Literal text search; returns `path:content` lines with paths relative to `dir`.
pub trait TextSearcher: Send + Sync {
    fn search(&self, pattern: &str, dir: &Path) -> Result<Vec<String>, ScopeError>;
}

pub trait RevisionHistory: Send + Sync {
    /// Commits of `range`, newest first, limited to changes below `subdir` when it is not empty.
    fn log_commits(&self, range: &str, repo: &Path, subdir: &Path)
    -> Result<Vec<Commit>, ScopeError>;
}

pub trait BlameSource: Send + Sync {
    fn blame(&self, path: &Path) -> Result<Vec<BlameLine>, ScopeError>;
}

pub trait SourceReader: Send + Sync {
    fn read(&self, path: &Path) -> Result<String, ScopeError>;
}

/// Runs `program` in `dir` and returns its raw output regardless of exit status.
pub(crate) fn run_tool<I, S>(program: &str, args: I, dir: &Path) -> Result<Output, ScopeError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(program);
    command.args(args).current_dir(dir);
    tracing::debug!(command = ?command, "running collaborator");
    command
        .output()
        .map_err(|err| ScopeError::Collaborator(format!("failed to run {program}: {err}")))
}

/// Error for a tool that exited unsuccessfully, carrying its trimmed stderr.
pub(crate) fn tool_failure(program: &str, output: &Output) -> ScopeError {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let detail = if stderr.trim().is_empty() {
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    } else {
        stderr.trim().to_string()
    };
    ScopeError::Collaborator(format!("{program} failed ({}): {detail}", output.status))
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FilesystemReader;

impl SourceReader for FilesystemReader {
    fn read(&self, path: &Path) -> Result<String, ScopeError> {
        fs::read_to_string(path).map_err(ScopeError::from)
    }
}

impl<T: OutlineSource + ?Sized> OutlineSource for Arc<T> {
    fn outline(&self, path: &Path) -> Result<Vec<OutlineNode>, ScopeError> {
        (**self).outline(path)
    }
}

impl<T: CatalogSource + ?Sized> CatalogSource for Arc<T> {
    fn catalog(&self, dir: &Path) -> Result<Vec<CatalogEntry>, ScopeError> {
        (**self).catalog(dir)
    }
}

impl<T: TextSearcher + ?Sized> TextSearcher for Arc<T> {
    fn search(&self, pattern: &str, dir: &Path) -> Result<Vec<String>, ScopeError> {
        (**self).search(pattern, dir)
    }
}

impl<T: RevisionHistory + ?Sized> RevisionHistory for Arc<T> {
    fn log_commits(
        &self,
        range: &str,
        repo: &Path,
        subdir: &Path,
    ) -> Result<Vec<Commit>, ScopeError> {
        (**self).log_commits(range, repo, subdir)
    }
}

impl<T: BlameSource + ?Sized> BlameSource for Arc<T> {
    fn blame(&self, path: &Path) -> Result<Vec<BlameLine>, ScopeError> {
        (**self).blame(path)
    }
}

impl<T: SourceReader + ?Sized> SourceReader for Arc<T> {
    fn read(&self, path: &Path) -> Result<String, ScopeError> {
        (**self).read(path)
    }
}
