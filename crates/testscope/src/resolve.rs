//! Locating the catalog entry or source file behind a test display name.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::catalog::CatalogEntry;
use crate::config::MatchOptions;
use crate::containment::{CandidateContainsEntry, ContainmentRule};
use crate::error::ScopeError;
use crate::sources::search::parse_search_output;
use crate::sources::{CatalogSource, TextSearcher};

/// Outcome of matching a name against every catalog entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NameMatch<'a> {
    Unique(&'a CatalogEntry),
    NoMatch,
    Ambiguous(Vec<&'a CatalogEntry>),
}

fn entry_within_name<R: ContainmentRule + ?Sized>(
    rule: &R,
    entry: &CatalogEntry,
    name: &str,
) -> bool {
    !entry.leaf_text.is_empty()
        && rule.holds(&entry.leaf_text, name)
        && entry
            .container_texts
            .iter()
            .all(|container| rule.holds(container, name))
}

/// Entries whose leaf and container texts all occur in `name`.
pub fn match_by_name<'a>(
    catalog: &'a [CatalogEntry],
    name: &str,
    options: &MatchOptions,
) -> NameMatch<'a> {
    let rule = CandidateContainsEntry::new(options.narrative_prefix.as_str());
    let mut matches: Vec<&CatalogEntry> = catalog
        .iter()
        .filter(|entry| entry_within_name(&rule, entry, name))
        .collect();
    match matches.len() {
        0 => NameMatch::NoMatch,
        1 => NameMatch::Unique(matches.remove(0)),
        _ => NameMatch::Ambiguous(matches),
    }
}

/// The single entry named by `name`.
///
/// No match and several matches both surface as [`ScopeError::NotFound`].
pub fn resolve_by_name<'a>(
    catalog: &'a [CatalogEntry],
    name: &str,
    options: &MatchOptions,
) -> Result<&'a CatalogEntry, ScopeError> {
    match match_by_name(catalog, name, options) {
        NameMatch::Unique(entry) => Ok(entry),
        NameMatch::NoMatch => Err(ScopeError::NotFound(name.to_string())),
        NameMatch::Ambiguous(entries) => {
            tracing::debug!(
                name,
                candidates = ?entries.iter().map(|e| e.full_name()).collect::<Vec<_>>(),
                "ambiguous test name"
            );
            Err(ScopeError::NotFound(name.to_string()))
        }
    }
}

/// Loads the catalog of `dir` and returns the source file of the test called `name`.
pub fn find_test_file_by_name<C: CatalogSource + ?Sized>(
    catalogs: &C,
    name: &str,
    dir: &Path,
    options: &MatchOptions,
) -> Result<PathBuf, ScopeError> {
    let catalog = catalogs.catalog(dir)?;
    let entry = resolve_by_name(&catalog, name, options)?;
    Ok(entry.file.clone())
}

fn test_id_regex() -> &'static Regex {
    static TEST_ID: OnceLock<Regex> = OnceLock::new();
    TEST_ID.get_or_init(|| Regex::new(r"\[test_id:[0-9]+]").expect("Invalid regex"))
}

/// First `[test_id:<digits>]` token of `name`.
pub fn test_id(name: &str) -> Result<String, ScopeError> {
    test_id_regex()
        .find(name)
        .map(|token| token.as_str().to_string())
        .ok_or_else(|| ScopeError::NoIdentifier(name.to_string()))
}

pub fn has_test_id(name: &str) -> bool {
    test_id_regex().is_match(name)
}

/// Finds the one file below `dir` that mentions the identifier token of `name`.
pub fn resolve_by_id<S: TextSearcher + ?Sized>(
    searcher: &S,
    name: &str,
    dir: &Path,
) -> Result<PathBuf, ScopeError> {
    let token = test_id(name)?;
    let lines = searcher.search(&token, dir)?;
    let files = parse_search_output(&lines);
    match files.len() {
        0 => Err(ScopeError::NotExist {
            pattern: token,
            dir: dir.to_path_buf(),
        }),
        1 => {
            let file = files.into_iter().next().unwrap_or_default();
            Ok(dir.join(file))
        }
        _ => Err(ScopeError::MultipleMatches {
            pattern: token,
            files: files.into_iter().collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::memory::{InMemoryCatalog, InMemorySearcher};

    fn catalog() -> Vec<CatalogEntry> {
        vec![
            CatalogEntry::new(
                ["[sig-compute]VM", "when something happens"],
                "it should pass",
                "tests/vm_test.go",
                20,
            ),
            CatalogEntry::new(["[sig-network]Net"], "does a thing now", "tests/net_test.go", 30),
            CatalogEntry::new(Vec::<String>::new(), "", "tests/suite_test.go", 5),
        ]
    }

    #[test]
    fn matches_with_narrative_prefix_stripped() {
        let catalog = catalog();
        let entry = resolve_by_name(
            &catalog,
            "[sig-compute]VM whenever something happens it should pass",
            &MatchOptions::default(),
        )
        .unwrap();
        assert_eq!(entry.line, 20);
    }

    #[test]
    fn matches_with_whitespace_runs_collapsed() {
        let catalog = catalog();
        let entry = resolve_by_name(
            &catalog,
            "[sig-network]Net does  a   thing  now",
            &MatchOptions::default(),
        )
        .unwrap();
        assert_eq!(entry.file, PathBuf::from("tests/net_test.go"));
    }

    #[test]
    fn no_match_and_ambiguity_are_both_not_found() {
        let mut catalog = catalog();
        let options = MatchOptions::default();

        let err = resolve_by_name(&catalog, "something else entirely", &options).unwrap_err();
        assert!(matches!(err, ScopeError::NotFound(ref name) if name == "something else entirely"));

        catalog.push(CatalogEntry::new(
            ["[sig-network]Net"],
            "does a thing",
            "tests/dup_test.go",
            9,
        ));
        let name = "[sig-network]Net does a thing now";
        assert!(matches!(
            match_by_name(&catalog, name, &options),
            NameMatch::Ambiguous(ref entries) if entries.len() == 2
        ));
        assert!(matches!(
            resolve_by_name(&catalog, name, &options),
            Err(ScopeError::NotFound(_))
        ));
    }

    #[test]
    fn empty_leaf_entries_never_match() {
        let catalog = vec![CatalogEntry::new(Vec::<String>::new(), "", "tests/suite_test.go", 5)];
        assert_eq!(
            match_by_name(&catalog, "anything", &MatchOptions::default()),
            NameMatch::NoMatch
        );
    }

    #[test]
    fn finds_file_through_catalog_source() {
        let source = InMemoryCatalog::new().with_catalog("tests", catalog());
        let file = find_test_file_by_name(
            &source,
            "[sig-network]Net does a thing now",
            Path::new("tests"),
            &MatchOptions::default(),
        )
        .unwrap();
        assert_eq!(file, PathBuf::from("tests/net_test.go"));
    }

    #[test]
    fn extracts_identifier_token() {
        assert_eq!(test_id("[sig-compute][test_id:1742]boots").unwrap(), "[test_id:1742]");
        assert!(has_test_id("x [test_id:7] y"));
        assert!(matches!(test_id("[test_id:]boots"), Err(ScopeError::NoIdentifier(_))));
    }

    #[test]
    fn resolves_identifier_to_single_file() {
        let searcher = InMemorySearcher::new()
            .with_line("tests", "vm_test.go", "It(\"[test_id:1742]boots\", func() {")
            .with_line("tests", "vm_test.go", "// see [test_id:1742]")
            .with_line("tests", "net_test.go", "It(\"[test_id:99]pings\", func() {");

        let path = resolve_by_id(&searcher, "VM [test_id:1742]boots", Path::new("tests")).unwrap();
        assert_eq!(path, Path::new("tests").join("vm_test.go"));
    }

    #[test]
    fn identifier_outcomes_for_zero_and_many_files() {
        let searcher = InMemorySearcher::new()
            .with_line("tests", "a_test.go", "[test_id:5]")
            .with_line("tests", "b_test.go", "[test_id:5]");

        let err = resolve_by_id(&searcher, "[test_id:6]x", Path::new("tests")).unwrap_err();
        assert!(
            matches!(err, ScopeError::NotExist { ref pattern, .. } if pattern == "[test_id:6]")
        );

        let err = resolve_by_id(&searcher, "[test_id:5]x", Path::new("tests")).unwrap_err();
        match err {
            ScopeError::MultipleMatches { files, .. } => {
                assert_eq!(files, vec!["a_test.go".to_string(), "b_test.go".to_string()]);
            }
            other => panic!("unexpected error {other}"),
        }

        let err = resolve_by_id(&searcher, "no id", Path::new("tests")).unwrap_err();
        assert!(matches!(err, ScopeError::NoIdentifier(_)));
    }
}
