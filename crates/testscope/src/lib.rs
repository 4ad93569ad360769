pub mod catalog;
pub mod config;
pub mod containment;
pub mod error;
pub mod line_index;
pub mod outline;
pub mod pipeline;
pub mod quarantine;
pub mod reconcile;
pub mod resolve;
pub mod revision;
pub mod sources;

pub use catalog::{CatalogEntry, parse_dry_run_report, read_dry_run_report};
pub use config::{MatchOptions, ScopeConfig, ToolConfig};
pub use containment::{CandidateContainsEntry, ContainmentRule, EntryContainsCandidate};
pub use error::ScopeError;
pub use line_index::{CharRange, LineIndex};
pub use outline::{ChangedPath, NodeKind, OutlineMapper, OutlineNode, expand_paths, matching_nodes};
pub use pipeline::{
    ChangeDetector, ChangeInputs, ChangeReport, ChangeRequest, changed_paths_schema,
    extract_changed_paths, test_names_schema,
};
pub use quarantine::{go_quote, quarantine_entry, quarantine_source};
pub use reconcile::{node_texts, reconcile};
pub use resolve::{
    NameMatch, find_test_file_by_name, has_test_id, match_by_name, resolve_by_id, resolve_by_name,
    test_id,
};
pub use revision::{
    BlameLine, ChangeKind, Commit, CommitHashSet, FileChange, changed_lines_by_file,
    validate_revision_range,
};
pub use sources::git::{GitCli, parse_blame, parse_log};
pub use sources::ginkgo::{CachedCatalog, GinkgoDryRun, GinkgoOutline, parse_outline};
pub use sources::search::{RipgrepSearcher, WalkSearcher, parse_search_output};
pub use sources::{
    BlameSource, CatalogSource, FilesystemReader, OutlineSource, RevisionHistory, SourceReader,
    TextSearcher,
};
