use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::ScopeError;
use crate::revision::{BlameLine, ChangeKind, Commit, FileChange, validate_revision_range};

use super::{BlameSource, RevisionHistory, run_tool, tool_failure};

/// `git` executable wrapper for commit history and blame.
#[derive(Clone, Debug)]
pub struct GitCli {
    program: String,
}

impl GitCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, dir: &Path, args: &[&str]) -> Result<String, ScopeError> {
        let output = run_tool(&self.program, args, dir)?;
        if !output.status.success() {
            return Err(tool_failure(&self.program, &output));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new("git")
    }
}

impl RevisionHistory for GitCli {
    fn log_commits(
        &self,
        range: &str,
        repo: &Path,
        subdir: &Path,
    ) -> Result<Vec<Commit>, ScopeError> {
        validate_revision_range(range)?;
        let subdir = subdir.to_string_lossy();
        let output = self.run(repo, &log_args(range, &subdir))?;
        Ok(parse_log(&output))
    }
}

// The range always follows `--end-of-options` so git never parses it as a flag.
fn log_args<'a>(range: &'a str, subdir: &'a str) -> Vec<&'a str> {
    let mut args = vec!["log", "--format=%H", "--name-status", "--end-of-options", range];
    if !subdir.is_empty() {
        args.push("--");
        args.push(subdir);
    }
    args
}

impl BlameSource for GitCli {
    fn blame(&self, path: &Path) -> Result<Vec<BlameLine>, ScopeError> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let file = path.file_name().ok_or_else(|| {
            ScopeError::Collaborator(format!("cannot blame {}: no file name", path.display()))
        })?;
        let file = file.to_string_lossy();
        let output = self
            .run(dir, &["blame", "--", file.as_ref()])
            .map_err(|err| err.context(format!("blame {}", path.display())))?;
        Ok(parse_blame(&output))
    }
}

fn commit_hash_regex() -> &'static Regex {
    static HASH: OnceLock<Regex> = OnceLock::new();
    HASH.get_or_init(|| Regex::new(r"^[0-9a-f]{4,64}$").expect("Invalid regex"))
}

fn change_status_regex() -> &'static Regex {
    static STATUS: OnceLock<Regex> = OnceLock::new();
    STATUS.get_or_init(|| Regex::new(r"^([ACDMRTUXB])[0-9]{0,3}$").expect("Invalid regex"))
}

/// Parses `git log --format=%H --name-status` output.
///
/// Status lines are tab separated; renames and copies list the old path first.
pub fn parse_log(output: &str) -> Vec<Commit> {
    let mut commits: Vec<Commit> = Vec::new();
    for line in output.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        if commit_hash_regex().is_match(line) {
            commits.push(Commit::new(line));
            continue;
        }

        let mut fields = line.split('\t');
        let status = fields.next().unwrap_or_default();
        let Some(kind) = change_status_regex()
            .captures(status)
            .and_then(|caps| caps.get(1))
            .and_then(|code| code.as_str().chars().next())
            .and_then(ChangeKind::from_code)
        else {
            tracing::warn!(line, "skipping unrecognized git log line");
            continue;
        };
        let paths: Vec<&str> = fields.filter(|field| !field.is_empty()).collect();
        let change = match paths.as_slice() {
            [filename] => FileChange {
                kind,
                filename: filename.to_string(),
                old_filename: None,
            },
            [old, new, ..] => FileChange {
                kind,
                filename: new.to_string(),
                old_filename: Some(old.to_string()),
            },
            [] => {
                tracing::warn!(line, "skipping git log status line without path");
                continue;
            }
        };
        match commits.last_mut() {
            Some(commit) => commit.file_changes.push(change),
            None => tracing::warn!(line, "file change before first commit hash"),
        }
    }
    commits
}

fn blame_regex() -> &'static Regex {
    static BLAME: OnceLock<Regex> = OnceLock::new();
    BLAME.get_or_init(|| {
        Regex::new(
            r"^(\^?[0-9a-f]+)(?:\s+\S+)?\s+\(([\S ]+?)\s+([0-9]{4}-[0-9]{2}-[0-9]{2}\s[0-9]{2}:[0-9]{2}:[0-9]{2}\s[-+][0-9]{4})\s+([0-9]+)\)\s?(.*)$",
        )
        .expect("Invalid regex")
    })
}

/// Parses default-format `git blame` output; lines that do not parse are skipped.
pub fn parse_blame(output: &str) -> Vec<BlameLine> {
    output
        .lines()
        .filter_map(|line| {
            let caps = blame_regex().captures(line)?;
            let line_no = caps[4].parse().ok()?;
            Some(BlameLine {
                commit_id: caps[1].to_string(),
                line_no,
                author: caps[2].trim().to_string(),
                date: caps[3].to_string(),
                line: caps[5].to_string(),
            })
        })
        .collect()
}
