//! The two substring-containment directions used to line up outline or name
//! texts with catalog texts.
//!
//! Change reconciliation asks whether the catalog text contains the text taken
//! from the outline; name resolution asks whether the given name contains the
//! catalog text. Both go through [`ContainmentRule`] so the direction is always
//! named at the call site.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;

use crate::config::DEFAULT_NARRATIVE_PREFIX;

pub trait ContainmentRule {
    /// Whether `entry_text` (from the catalog) and `candidate_text` line up under this rule.
    fn holds(&self, entry_text: &str, candidate_text: &str) -> bool;
}

/// The catalog text must contain the candidate text.
#[derive(Clone, Copy, Debug, Default)]
pub struct EntryContainsCandidate;

impl ContainmentRule for EntryContainsCandidate {
    fn holds(&self, entry_text: &str, candidate_text: &str) -> bool {
        entry_contains_candidate(entry_text, candidate_text)
    }
}

/// The candidate text must contain the catalog text, with the narrative-prefix
/// and whitespace fallbacks.
#[derive(Clone, Debug)]
pub struct CandidateContainsEntry {
    narrative_prefix: String,
}

impl CandidateContainsEntry {
    pub fn new(narrative_prefix: impl Into<String>) -> Self {
        Self {
            narrative_prefix: narrative_prefix.into(),
        }
    }
}

impl Default for CandidateContainsEntry {
    fn default() -> Self {
        Self::new(DEFAULT_NARRATIVE_PREFIX)
    }
}

impl ContainmentRule for CandidateContainsEntry {
    fn holds(&self, entry_text: &str, candidate_text: &str) -> bool {
        candidate_contains_entry(candidate_text, entry_text, &self.narrative_prefix)
    }
}

pub fn entry_contains_candidate(entry_text: &str, candidate_text: &str) -> bool {
    entry_text.contains(candidate_text)
}

/// `candidate.contains(entry_text)`, retried first without the narrative prefix and
/// then with whitespace runs collapsed to one space.
pub fn candidate_contains_entry(candidate: &str, entry_text: &str, narrative_prefix: &str) -> bool {
    if candidate.contains(entry_text) {
        return true;
    }
    // ginkgo prefixes `When` container texts with "when ", test names often do not
    if !narrative_prefix.is_empty() {
        if let Some(stripped) = entry_text.strip_prefix(narrative_prefix) {
            if candidate.contains(stripped) {
                return true;
            }
        }
    }
    let entry_runs = has_whitespace_run(entry_text);
    let candidate_runs = has_whitespace_run(candidate);
    if entry_runs || candidate_runs {
        let entry = collapse_whitespace(entry_text);
        let candidate = collapse_whitespace(candidate);
        if candidate.contains(entry.as_ref()) {
            return true;
        }
    }
    false
}

fn whitespace_runs() -> &'static Regex {
    static RUNS: OnceLock<Regex> = OnceLock::new();
    RUNS.get_or_init(|| Regex::new(r"\s{2,}").expect("Invalid regex"))
}

pub fn has_whitespace_run(text: &str) -> bool {
    whitespace_runs().is_match(text)
}

/// Replaces every run of two or more whitespace characters with one space.
pub fn collapse_whitespace(text: &str) -> Cow<'_, str> {
    whitespace_runs().replace_all(text, " ")
}
