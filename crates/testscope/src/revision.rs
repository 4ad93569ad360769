use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ScopeError;

/// Git diff-filter status of a file within a commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Copied,
    Deleted,
    Modified,
    Renamed,
    TypeChanged,
    Unmerged,
    Unknown,
    BrokenPairing,
}

impl ChangeKind {
    pub fn from_code(code: char) -> Option<Self> {
        Some(match code {
            'A' => ChangeKind::Added,
            'C' => ChangeKind::Copied,
            'D' => ChangeKind::Deleted,
            'M' => ChangeKind::Modified,
            'R' => ChangeKind::Renamed,
            'T' => ChangeKind::TypeChanged,
            'U' => ChangeKind::Unmerged,
            'X' => ChangeKind::Unknown,
            'B' => ChangeKind::BrokenPairing,
            _ => return None,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    pub kind: ChangeKind,
    /// Repository-relative path after the change.
    pub filename: String,
    /// Source path of a rename or copy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_filename: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub hash: String,
    #[serde(default)]
    pub file_changes: Vec<FileChange>,
}

impl Commit {
    pub fn new(hash: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            file_changes: Vec::new(),
        }
    }

    pub fn with_change(mut self, kind: ChangeKind, filename: impl Into<String>) -> Self {
        self.file_changes.push(FileChange {
            kind,
            filename: filename.into(),
            old_filename: None,
        });
        self
    }
}

/// One line of `git blame` output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlameLine {
    /// Attributing commit; usually abbreviated, `^`-prefixed for boundary commits.
    pub commit_id: String,
    pub line_no: usize,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub line: String,
}

impl BlameLine {
    pub fn new(line_no: usize, commit_id: impl Into<String>) -> Self {
        Self {
            commit_id: commit_id.into(),
            line_no,
            author: String::new(),
            date: String::new(),
            line: String::new(),
        }
    }
}

/// Commit hashes of a revision range, matched by prefix in either direction.
///
/// Hash prefix collisions between distinct commits are not detected.
#[derive(Clone, Debug, Default)]
pub struct CommitHashSet {
    hashes: BTreeSet<String>,
}

impl CommitHashSet {
    pub fn new(commits: &[Commit], prefix_len: Option<usize>) -> Self {
        let hashes = commits
            .iter()
            .map(|commit| truncate(&commit.hash, prefix_len).to_string())
            .filter(|hash| !hash.is_empty())
            .collect();
        Self { hashes }
    }

    pub fn contains(&self, hash: &str) -> bool {
        if hash.is_empty() {
            return false;
        }
        self.hashes
            .iter()
            .any(|known| known.starts_with(hash) || hash.starts_with(known.as_str()))
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}

fn truncate(hash: &str, prefix_len: Option<usize>) -> &str {
    match prefix_len {
        Some(len) => hash.char_indices().nth(len).map_or(hash, |(idx, _)| &hash[..idx]),
        None => hash,
    }
}

/// Blame line numbers attributed to a commit of the range, per touched file.
///
/// Files absent from every commit's changes contribute nothing, even when blame lines exist.
pub fn changed_lines_by_file(
    commits: &[Commit],
    blame_by_file: &BTreeMap<String, Vec<BlameLine>>,
    prefix_len: Option<usize>,
) -> BTreeMap<String, BTreeSet<usize>> {
    let hashes = CommitHashSet::new(commits, prefix_len);
    let touched: BTreeSet<&str> = commits
        .iter()
        .flat_map(|commit| commit.file_changes.iter())
        .map(|change| change.filename.as_str())
        .collect();

    let mut changed = BTreeMap::new();
    for filename in touched {
        let Some(blame) = blame_by_file.get(filename) else {
            continue;
        };
        let lines: BTreeSet<usize> = blame
            .iter()
            .filter(|line| hashes.contains(&line.commit_id))
            .map(|line| line.line_no)
            .collect();
        if !lines.is_empty() {
            changed.insert(filename.to_string(), lines);
        }
    }
    changed
}

/// Rejects ranges git would not read as `rev`, `a..b` or `a...b`.
///
/// A leading `-` is refused so the range can never be taken for a git option.
pub fn validate_revision_range(range: &str) -> Result<(), ScopeError> {
    static RANGE_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = RANGE_REGEX.get_or_init(|| Regex::new(r"^[^\s.\-]\S*$").expect("Invalid regex"));
    if re.is_match(range) {
        Ok(())
    } else {
        Err(ScopeError::InvalidRevisionRange(range.to_string()))
    }
}
