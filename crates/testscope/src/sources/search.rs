use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use ignore::WalkBuilder;
use regex::Regex;

use crate::error::ScopeError;

use super::{TextSearcher, run_tool, tool_failure};

fn search_line_regex() -> &'static Regex {
    static LINE: OnceLock<Regex> = OnceLock::new();
    LINE.get_or_init(|| Regex::new(r"^([^:]+):.*$").expect("Invalid regex"))
}

/// Distinct file names of `path:content` search results.
///
/// Lines without a `path:` prefix are logged and skipped.
pub fn parse_search_output<S: AsRef<str>>(lines: &[S]) -> BTreeSet<String> {
    let mut files = BTreeSet::new();
    for line in lines {
        let line = line.as_ref();
        if line.is_empty() {
            continue;
        }
        match search_line_regex().captures(line) {
            Some(caps) => {
                files.insert(caps[1].to_string());
            }
            None => tracing::warn!(line, "skipping search result without file name"),
        }
    }
    files
}

/// Literal search through `rg`.
#[derive(Clone, Debug)]
pub struct RipgrepSearcher {
    program: String,
}

impl RipgrepSearcher {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for RipgrepSearcher {
    fn default() -> Self {
        Self::new("rg")
    }
}

impl TextSearcher for RipgrepSearcher {
    fn search(&self, pattern: &str, dir: &Path) -> Result<Vec<String>, ScopeError> {
        let output = run_tool(
            &self.program,
            ["--fixed-strings", "--with-filename", "--no-heading", "--", pattern],
            dir,
        )?;
        match output.status.code() {
            Some(0) => Ok(String::from_utf8_lossy(&output.stdout)
                .lines()
                .map(str::to_string)
                .collect()),
            // rg exits with 1 when nothing matched
            Some(1) => Ok(Vec::new()),
            _ => Err(tool_failure(&self.program, &output)),
        }
    }
}

/// In-process literal search over the files below `dir`, honouring ignore files.
///
/// Files that are not valid UTF-8 are skipped.
#[derive(Clone, Copy, Debug, Default)]
pub struct WalkSearcher;

impl TextSearcher for WalkSearcher {
    fn search(&self, pattern: &str, dir: &Path) -> Result<Vec<String>, ScopeError> {
        if !dir.is_dir() {
            return Err(ScopeError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} is not a directory", dir.display()),
            )));
        }
        let walker = WalkBuilder::new(dir)
            .hidden(true)
            .ignore(true)
            .git_ignore(true)
            .sort_by_file_path(|a, b| a.cmp(b))
            .build();

        let mut results = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(error = %err, "skipping unreadable entry");
                    continue;
                }
            };
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Ok(content) = fs::read_to_string(path) else {
                continue;
            };
            let relative = path.strip_prefix(dir).unwrap_or(path);
            for line in content.lines().filter(|line| line.contains(pattern)) {
                results.push(format!("{}:{line}", relative.display()));
            }
        }
        Ok(results)
    }
}
