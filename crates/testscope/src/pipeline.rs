//! Change detection over a revision range: history, blame and outlines in,
//! fully-qualified test names out.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use schemars::{Schema, schema_for};
use serde::{Deserialize, Serialize};

use crate::config::MatchOptions;
use crate::error::ScopeError;
use crate::line_index::LineIndex;
use crate::outline::{ChangedPath, OutlineMapper, OutlineNode};
use crate::reconcile::reconcile;
use crate::revision::{
    BlameLine, ChangeKind, Commit, changed_lines_by_file, validate_revision_range,
};
use crate::sources::{
    BlameSource, CatalogSource, FilesystemReader, OutlineSource, RevisionHistory, SourceReader,
};

/// Which commits to inspect and where the test suite lives.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRequest {
    pub revision_range: String,
    pub repo: PathBuf,
    /// Test directory relative to `repo`; empty means the whole repository.
    #[serde(default)]
    pub test_subdirectory: PathBuf,
}

impl ChangeRequest {
    pub fn new(revision_range: impl Into<String>, repo: impl Into<PathBuf>) -> Self {
        Self {
            revision_range: revision_range.into(),
            repo: repo.into(),
            test_subdirectory: PathBuf::new(),
        }
    }

    pub fn with_test_subdirectory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.test_subdirectory = dir.into();
        self
    }

    /// Directory the dry-run catalog is built from.
    pub fn test_dir(&self) -> PathBuf {
        self.repo.join(&self.test_subdirectory)
    }
}

/// Everything gathered from the collaborators, keyed by repository-relative file name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeInputs {
    pub commits: Vec<Commit>,
    pub outlines: BTreeMap<String, Vec<OutlineNode>>,
    pub blame: BTreeMap<String, Vec<BlameLine>>,
    pub contents: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeReport {
    /// Sorted, de-duplicated fully-qualified names.
    pub test_names: Vec<String>,
    pub paths: Vec<ChangedPath>,
}

/// JSON Schema of the test-name file written for a change report.
pub fn test_names_schema() -> Schema {
    schema_for!(Vec<String>)
}

/// JSON Schema of the outline-path file written for a change report.
pub fn changed_paths_schema() -> Schema {
    schema_for!(Vec<ChangedPath>)
}

/// Maps blame-attributed changed lines onto the outline of every gathered file.
///
/// Files are visited in name order; files without an outline contribute nothing.
pub fn extract_changed_paths(
    inputs: &ChangeInputs,
    options: &MatchOptions,
) -> Result<Vec<ChangedPath>, ScopeError> {
    let changed = changed_lines_by_file(&inputs.commits, &inputs.blame, options.hash_prefix_len);

    let mut paths = Vec::new();
    for (filename, lines) in &changed {
        let Some(outline) = inputs.outlines.get(filename).filter(|o| !o.is_empty()) else {
            continue;
        };
        let content = inputs.contents.get(filename).map(String::as_str).unwrap_or_default();
        let index = LineIndex::build(content);
        let file_paths = OutlineMapper::new(&index, outline)
            .paths_for_lines(lines.iter().copied())
            .map_err(|err| {
                tracing::error!(file = %filename, error = %err, "blame does not fit file content");
                err
            })?;
        tracing::debug!(
            file = %filename,
            lines = lines.len(),
            paths = file_paths.len(),
            "mapped changed lines onto outline"
        );
        paths.extend(file_paths);
    }
    Ok(paths)
}

/// Orchestrates the collaborators of one change-detection run.
pub struct ChangeDetector<H, B, O, C, R = FilesystemReader> {
    history: H,
    blame: B,
    outlines: O,
    catalogs: C,
    reader: R,
    options: MatchOptions,
}

impl<H, B, O, C> ChangeDetector<H, B, O, C> {
    pub fn new(history: H, blame: B, outlines: O, catalogs: C) -> Self {
        Self {
            history,
            blame,
            outlines,
            catalogs,
            reader: FilesystemReader,
            options: MatchOptions::default(),
        }
    }
}

impl<H, B, O, C, R> ChangeDetector<H, B, O, C, R> {
    pub fn with_reader<R2>(self, reader: R2) -> ChangeDetector<H, B, O, C, R2> {
        ChangeDetector {
            history: self.history,
            blame: self.blame,
            outlines: self.outlines,
            catalogs: self.catalogs,
            reader,
            options: self.options,
        }
    }

    pub fn with_options(mut self, options: MatchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &MatchOptions {
        &self.options
    }
}

impl<H, B, O, C, R> ChangeDetector<H, B, O, C, R>
where
    H: RevisionHistory,
    B: BlameSource,
    O: OutlineSource,
    C: CatalogSource,
    R: SourceReader,
{
    /// Gathers commits plus outline, content and blame of every changed source file.
    ///
    /// Each file is handled once, at its newest change. Deleted files are recorded
    /// empty; files that are not test files are skipped.
    pub fn collect(&self, request: &ChangeRequest) -> Result<ChangeInputs, ScopeError> {
        validate_revision_range(&request.revision_range)?;
        let commits = self.history.log_commits(
            &request.revision_range,
            &request.repo,
            &request.test_subdirectory,
        )?;
        tracing::debug!(
            range = %request.revision_range,
            commits = commits.len(),
            "loaded revision history"
        );

        let mut inputs = ChangeInputs::default();
        let mut seen = BTreeSet::new();
        for change in commits.iter().flat_map(|commit| commit.file_changes.iter()) {
            if !change.filename.ends_with(&self.options.source_suffix) {
                continue;
            }
            if !seen.insert(change.filename.clone()) {
                continue;
            }

            if change.kind == ChangeKind::Deleted {
                inputs.outlines.insert(change.filename.clone(), Vec::new());
                inputs.contents.insert(change.filename.clone(), String::new());
                inputs.blame.insert(change.filename.clone(), Vec::new());
                continue;
            }

            let full_path = request.repo.join(&change.filename);
            let content = self.reader.read(&full_path)?;
            let outline = match self.outlines.outline(&full_path) {
                Ok(outline) if !outline.is_empty() => outline,
                Ok(_) | Err(ScopeError::NoOutline(_)) => {
                    tracing::debug!(file = %change.filename, "no test outline, skipping");
                    continue;
                }
                Err(err) => return Err(err),
            };
            let blame = self.blame.blame(&full_path)?;

            inputs.outlines.insert(change.filename.clone(), outline);
            inputs.contents.insert(change.filename.clone(), content);
            inputs.blame.insert(change.filename.clone(), blame);
        }
        inputs.commits = commits;
        Ok(inputs)
    }

    /// Reconciles the changed paths of `inputs` against the catalog of `test_dir`.
    ///
    /// The catalog is only built when at least one path changed.
    pub fn report(
        &self,
        inputs: &ChangeInputs,
        test_dir: &Path,
    ) -> Result<ChangeReport, ScopeError> {
        let paths = extract_changed_paths(inputs, &self.options)?;
        if paths.is_empty() {
            tracing::info!("no test outline touched by the revision range");
            return Ok(ChangeReport::default());
        }
        let catalog = self
            .catalogs
            .catalog(test_dir)
            .map_err(|err| err.context(format!("catalog for {}", test_dir.display())))?;
        let test_names = reconcile(&paths, &catalog, &self.options);
        tracing::info!(
            paths = paths.len(),
            tests = test_names.len(),
            "changed tests detected"
        );
        Ok(ChangeReport { test_names, paths })
    }

    pub fn detect(&self, request: &ChangeRequest) -> Result<ChangeReport, ScopeError> {
        let inputs = self.collect(request)?;
        self.report(&inputs, &request.test_dir())
    }
}
