use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::catalog::{CatalogEntry, parse_dry_run_report};
use crate::error::ScopeError;
use crate::outline::OutlineNode;

use super::{CatalogSource, OutlineSource, run_tool, tool_failure};

/// Marker ginkgo prints when asked to outline a file that is not a ginkgo v2 test.
const NOT_A_GINKGO_FILE: &str = "does not import \"github.com/onsi/ginkgo/v2\"";

/// Parses `ginkgo outline --format json` output; `null` is an empty outline.
pub fn parse_outline(raw: &[u8]) -> Result<Vec<OutlineNode>, ScopeError> {
    let nodes: Option<Vec<OutlineNode>> =
        serde_json::from_slice(raw).map_err(|err| ScopeError::from(err).context("ginkgo outline"))?;
    Ok(nodes.unwrap_or_default())
}

#[derive(Clone, Debug)]
pub struct GinkgoOutline {
    program: String,
}

impl GinkgoOutline {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for GinkgoOutline {
    fn default() -> Self {
        Self::new("ginkgo")
    }
}

impl OutlineSource for GinkgoOutline {
    fn outline(&self, path: &Path) -> Result<Vec<OutlineNode>, ScopeError> {
        let output = run_tool(
            &self.program,
            [
                OsStr::new("outline"),
                OsStr::new("--format"),
                OsStr::new("json"),
                path.as_os_str(),
            ],
            Path::new("."),
        )?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            if stderr.contains(NOT_A_GINKGO_FILE) || stdout.contains(NOT_A_GINKGO_FILE) {
                return Err(ScopeError::NoOutline(path.to_path_buf()));
            }
            return Err(tool_failure(&self.program, &output).context(path.display()));
        }
        parse_outline(&output.stdout).map_err(|err| err.context(path.display()))
    }
}

/// Builds the catalog with `ginkgo run --dry-run --json-report`.
#[derive(Clone, Debug)]
pub struct GinkgoDryRun {
    program: String,
}

impl GinkgoDryRun {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for GinkgoDryRun {
    fn default() -> Self {
        Self::new("ginkgo")
    }
}

impl CatalogSource for GinkgoDryRun {
    fn catalog(&self, dir: &Path) -> Result<Vec<CatalogEntry>, ScopeError> {
        let report = tempfile::Builder::new()
            .prefix("ginkgo-dry-run-")
            .suffix(".json")
            .tempfile()?;
        let target = format!("{}/...", dir.display());
        let output = run_tool(
            &self.program,
            [
                OsStr::new("run"),
                OsStr::new("-v"),
                OsStr::new("--dry-run"),
                OsStr::new("--json-report"),
                report.path().as_os_str(),
                OsStr::new(&target),
            ],
            Path::new("."),
        )?;

        // ginkgo exits non-zero for focused suites too; the report is what counts
        let raw = fs::read(report.path())?;
        if raw.iter().all(u8::is_ascii_whitespace) {
            if output.status.success() {
                return Ok(Vec::new());
            }
            return Err(tool_failure(&self.program, &output)
                .context(format!("dry-run {}", dir.display())));
        }
        let entries = parse_dry_run_report(&raw)?;
        tracing::debug!(dir = %dir.display(), entries = entries.len(), "loaded dry-run catalog");
        Ok(entries)
    }
}

/// Memoises another catalog source per directory.
pub struct CachedCatalog<S> {
    inner: S,
    cache: Mutex<BTreeMap<PathBuf, Vec<CatalogEntry>>>,
}

impl<S: CatalogSource> CachedCatalog<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cache: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn invalidate(&self, dir: &Path) {
        self.cache.lock().remove(dir);
    }
}

impl<S: CatalogSource> CatalogSource for CachedCatalog<S> {
    fn catalog(&self, dir: &Path) -> Result<Vec<CatalogEntry>, ScopeError> {
        if let Some(entries) = self.cache.lock().get(dir) {
            return Ok(entries.clone());
        }
        let entries = self.inner.catalog(dir)?;
        self.cache.lock().insert(dir.to_path_buf(), entries.clone());
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::memory::InMemoryCatalog;

    #[test]
    fn parses_outline_forest() {
        let raw = br#"[
            {"name":"Describe","text":"simple","start":35,"end":200,"spec":false,
             "focused":false,"pending":false,"labels":null,"nodes":[
                {"name":"It","text":"works","start":70,"end":120,"spec":true,
                 "focused":false,"pending":true,"labels":[],"nodes":[]}]}
        ]"#;
        let outline = parse_outline(raw).unwrap();
        assert_eq!(outline.len(), 1);
        assert_eq!(outline[0].nodes[0].text, "works");
        assert!(outline[0].nodes[0].pending);
    }

    #[test]
    fn null_outline_is_empty() {
        assert!(parse_outline(b"null").unwrap().is_empty());
    }

    #[test]
    fn garbage_outline_is_a_serialization_error() {
        let err = parse_outline(b"Describe(").unwrap_err();
        assert!(
            matches!(err, ScopeError::Serialization(ref msg) if msg.starts_with("ginkgo outline"))
        );
    }

    #[test]
    fn cached_catalog_runs_inner_source_once_per_dir() {
        let inner = InMemoryCatalog::new().with_catalog(
            "tests",
            vec![CatalogEntry::new(["suite"], "leaf", "tests/a_test.go", 3)],
        );
        let cached = CachedCatalog::new(inner);

        let first = cached.catalog(Path::new("tests")).unwrap();
        let second = cached.catalog(Path::new("tests")).unwrap();
        assert_eq!(first, second);
        assert_eq!(cached.inner.calls(), 1);

        cached.invalidate(Path::new("tests"));
        cached.catalog(Path::new("tests")).unwrap();
        assert_eq!(cached.inner.calls(), 2);
    }

    #[test]
    fn missing_ginkgo_binary_is_a_collaborator_error() {
        let outline = GinkgoOutline::new("definitely-not-ginkgo");
        let err = outline.outline(Path::new("a_test.go")).unwrap_err();
        assert!(matches!(err, ScopeError::Collaborator(_)), "{err}");
    }
}
