use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ScopeError;

/// One executable spec as reported by a ginkgo dry-run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub container_texts: Vec<String>,
    #[serde(default)]
    pub container_labels: Vec<Vec<String>>,
    pub leaf_text: String,
    #[serde(default)]
    pub leaf_labels: Vec<String>,
    pub file: PathBuf,
    pub line: usize,
}

impl CatalogEntry {
    pub fn new<I, S>(
        containers: I,
        leaf_text: impl Into<String>,
        file: impl Into<PathBuf>,
        line: usize,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            container_texts: containers.into_iter().map(Into::into).collect(),
            container_labels: Vec::new(),
            leaf_text: leaf_text.into(),
            leaf_labels: Vec::new(),
            file: file.into(),
            line,
        }
    }

    /// Container texts followed by the leaf text.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.container_texts
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.leaf_text.as_str()))
    }

    /// Canonical fully-qualified name: every text joined by a single space.
    pub fn full_name(&self) -> String {
        self.texts().collect::<Vec<_>>().join(" ")
    }

    /// Suite-level setup nodes carry no container and an empty leaf.
    pub fn is_anonymous(&self) -> bool {
        self.container_texts.is_empty() && self.leaf_text.is_empty()
    }

    /// Container labels in hierarchy order, then leaf labels, kept when every matcher accepts them.
    pub fn labels(&self, matchers: &[Regex]) -> Vec<String> {
        self.container_labels
            .iter()
            .flatten()
            .chain(self.leaf_labels.iter())
            .filter(|label| matchers.iter().all(|m| m.is_match(label)))
            .cloned()
            .collect()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SuiteReport {
    #[serde(default)]
    spec_reports: Option<Vec<SpecReport>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SpecReport {
    #[serde(default)]
    container_hierarchy_texts: Option<Vec<String>>,
    #[serde(default)]
    container_hierarchy_labels: Option<Vec<Option<Vec<String>>>>,
    #[serde(default)]
    leaf_node_text: String,
    #[serde(default)]
    leaf_node_labels: Option<Vec<String>>,
    #[serde(default)]
    leaf_node_location: Option<CodeLocation>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CodeLocation {
    #[serde(default)]
    file_name: String,
    #[serde(default)]
    line_number: usize,
}

/// Flattens a ginkgo `--json-report` document into catalog entries, in report order.
pub fn parse_dry_run_report(raw: &[u8]) -> Result<Vec<CatalogEntry>, ScopeError> {
    let suites: Vec<SuiteReport> =
        serde_json::from_slice(raw).map_err(|err| ScopeError::from(err).context("ginkgo report"))?;

    let entries = suites
        .into_iter()
        .flat_map(|suite| suite.spec_reports.unwrap_or_default())
        .map(|report| {
            let location = report.leaf_node_location.unwrap_or(CodeLocation {
                file_name: String::new(),
                line_number: 0,
            });
            CatalogEntry {
                container_texts: report.container_hierarchy_texts.unwrap_or_default(),
                container_labels: report
                    .container_hierarchy_labels
                    .unwrap_or_default()
                    .into_iter()
                    .map(Option::unwrap_or_default)
                    .collect(),
                leaf_text: report.leaf_node_text,
                leaf_labels: report.leaf_node_labels.unwrap_or_default(),
                file: PathBuf::from(location.file_name),
                line: location.line_number,
            }
        })
        .collect();
    Ok(entries)
}

pub fn read_dry_run_report(path: &Path) -> Result<Vec<CatalogEntry>, ScopeError> {
    let raw = std::fs::read(path)?;
    parse_dry_run_report(&raw).map_err(|err| err.context(path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = r#"[{
        "SuitePath": "/repo/tests",
        "SuiteDescription": "Tests Suite",
        "SpecReports": [
            {"ContainerHierarchyTexts": null, "LeafNodeType": "BeforeSuite",
             "LeafNodeText": "", "LeafNodeLocation": {"FileName": "/repo/tests/suite_test.go", "LineNumber": 12}},
            {"ContainerHierarchyTexts": ["[sig-compute]VM", "when started"],
             "ContainerHierarchyLabels": [["sig-compute"], null],
             "LeafNodeType": "It", "LeafNodeText": "[test_id:1742]boots",
             "LeafNodeLabels": ["conformance"],
             "LeafNodeLocation": {"FileName": "/repo/tests/vm_test.go", "LineNumber": 31}}
        ]
    }, {"SuitePath": "/repo/other", "SpecReports": null}]"#;

    #[test]
    fn parses_spec_reports_across_suites() {
        let entries = parse_dry_run_report(REPORT.as_bytes()).unwrap();
        assert_eq!(entries.len(), 2);

        assert!(entries[0].is_anonymous());

        let vm = &entries[1];
        assert_eq!(vm.full_name(), "[sig-compute]VM when started [test_id:1742]boots");
        assert_eq!(vm.file, PathBuf::from("/repo/tests/vm_test.go"));
        assert_eq!(vm.line, 31);
        assert_eq!(vm.container_labels, vec![vec!["sig-compute".to_string()], vec![]]);
    }

    #[test]
    fn filters_labels_through_matchers() {
        let entries = parse_dry_run_report(REPORT.as_bytes()).unwrap();
        let vm = &entries[1];
        assert_eq!(vm.labels(&[]), vec!["sig-compute", "conformance"]);

        let sig_only = Regex::new("^sig-").unwrap();
        assert_eq!(vm.labels(&[sig_only]), vec!["sig-compute"]);
    }

    #[test]
    fn malformed_report_is_a_serialization_error() {
        let err = parse_dry_run_report(b"{not json").unwrap_err();
        assert!(
            matches!(err, ScopeError::Serialization(ref msg) if msg.starts_with("ginkgo report"))
        );
    }
}
