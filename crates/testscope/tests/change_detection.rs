use std::path::{Path, PathBuf};

use testscope::sources::memory::{
    InMemoryBlame, InMemoryCatalog, InMemoryHistory, InMemoryOutlines, InMemoryReader,
};
use testscope::{
    BlameLine, ChangeDetector, ChangeRequest, LineIndex, MatchOptions, OutlineMapper, ScopeError,
    extract_changed_paths, parse_dry_run_report, parse_log, parse_outline,
};

const FIXTURE: &str = include_str!("testdata/fixture_test.go");
const CHANGED_COMMIT: &str = "c0ffee0123456789abcdef0123456789abcdef01";

fn testdata(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("testdata").join(name)
}

fn blame_for(changed_lines: &[usize]) -> Vec<BlameLine> {
    let lines = FIXTURE.split('\n').count();
    (1..=lines)
        .map(|line| {
            let hash = if changed_lines.contains(&line) {
                &CHANGED_COMMIT[..8]
            } else {
                "^1234abcd"
            };
            BlameLine::new(line, hash)
        })
        .collect()
}

type FakeDetector = ChangeDetector<
    InMemoryHistory,
    InMemoryBlame,
    InMemoryOutlines,
    InMemoryCatalog,
    InMemoryReader,
>;

fn detector(changed_lines: &[usize]) -> FakeDetector {
    let log = format!(
        "{CHANGED_COMMIT}\n\nM\ttests/fixture_test.go\nA\ttests/helpers.go\nM\tdocs/notes.md\n"
    );
    let history = InMemoryHistory::new().with_range("main..HEAD", parse_log(&log));

    let outline = parse_outline(&std::fs::read(testdata("fixture_outline.json")).unwrap()).unwrap();
    let raw = std::fs::read(testdata("fixture_report.json")).unwrap();
    let catalog = parse_dry_run_report(&raw).unwrap();

    ChangeDetector::new(
        history,
        InMemoryBlame::new().with_blame("repo/tests/fixture_test.go", blame_for(changed_lines)),
        InMemoryOutlines::new().with_outline("repo/tests/fixture_test.go", outline),
        InMemoryCatalog::new().with_catalog("repo/tests", catalog),
    )
    .with_reader(
        InMemoryReader::new()
            .with_file("repo/tests/fixture_test.go", FIXTURE)
            .with_file("repo/tests/helpers.go", "package fixture\n"),
    )
}

fn request() -> ChangeRequest {
    ChangeRequest::new("main..HEAD", "repo").with_test_subdirectory("tests")
}

#[test]
fn detects_tests_touched_by_changed_lines() {
    // 13: `By` step, 26: body of "does return an error", 35: first table entry
    let report = detector(&[13, 26, 35]).detect(&request()).unwrap();

    assert_eq!(
        report.test_names,
        vec![
            "fixture is a table [test_id:8976]second testcase".to_string(),
            "fixture is a table first testcase".to_string(),
            "fixture when something is executed does return an error".to_string(),
            "fixture with a nested container [test_id:1742]is still found".to_string(),
        ]
    );
    assert!(report.paths.iter().all(|path| !path.is_empty()));
}

#[test]
fn line_ending_past_an_entry_selects_the_whole_table() {
    let content = FIXTURE;
    let outline = parse_outline(&std::fs::read(testdata("fixture_outline.json")).unwrap()).unwrap();
    let index = LineIndex::build(content);

    let paths = OutlineMapper::new(&index, &outline).paths_for_lines([35]).unwrap();
    let leaves: Vec<&str> = paths
        .iter()
        .filter_map(|path| path.leaf())
        .map(|leaf| leaf.text.as_str())
        .collect();
    assert_eq!(leaves, vec!["first testcase", "[test_id:8976]second testcase"]);
}

#[test]
fn narrative_step_change_maps_to_enclosing_spec() {
    let detector = detector(&[14]);
    let inputs = detector.collect(&request()).unwrap();
    let paths = extract_changed_paths(&inputs, &MatchOptions::default()).unwrap();

    assert_eq!(paths.len(), 1);
    let names: Vec<&str> = paths[0].nodes.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["Describe", "Context", "It"]);
    assert!(paths[0].nodes.iter().all(|n| !n.is_narrative()));
}

#[test]
fn detection_is_idempotent() {
    let detector = detector(&[22, 26, 33]);
    let first = detector.detect(&request()).unwrap();
    let second = detector.detect(&request()).unwrap();
    assert_eq!(first, second);
    assert!(!first.test_names.is_empty());
}

#[test]
fn unchanged_tests_yield_empty_report() {
    let report = detector(&[1, 2, 3]).detect(&request()).unwrap();
    assert!(report.test_names.is_empty());
    assert!(report.paths.is_empty());
}

#[test]
fn unknown_range_surfaces_collaborator_error() {
    let err = detector(&[13])
        .detect(&ChangeRequest::new("v1.0.0..HEAD", "repo"))
        .unwrap_err();
    assert!(matches!(err, ScopeError::Collaborator(_)), "{err}");
}
