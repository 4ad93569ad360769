use std::collections::BTreeSet;

use crate::catalog::CatalogEntry;
use crate::config::MatchOptions;
use crate::containment::{ContainmentRule, EntryContainsCandidate};
use crate::outline::ChangedPath;

/// Display texts of a path, root first, without narrative nodes or placeholder texts.
pub fn node_texts(path: &ChangedPath, options: &MatchOptions) -> Vec<String> {
    path.nodes
        .iter()
        .filter(|node| !node.is_narrative())
        .filter(|node| node.text != options.placeholder_text)
        .map(|node| node.text.clone())
        .collect()
}

/// Aligns `candidate` with the entry's texts from the leaf backwards.
///
/// Alignment stops when either side runs out; every consumed pair must satisfy `rule`.
pub fn aligns_from_leaf<R: ContainmentRule + ?Sized>(
    rule: &R,
    entry: &CatalogEntry,
    candidate: &[String],
) -> bool {
    if entry.is_anonymous() {
        return false;
    }
    let entry_texts: Vec<&str> = entry.texts().collect();
    entry_texts
        .iter()
        .rev()
        .zip(candidate.iter().rev())
        .all(|(entry_text, candidate_text)| rule.holds(entry_text, candidate_text))
}

/// Catalog entries that line up with at least one of the candidate text lists, in catalog order.
pub fn matching_entries<'a>(
    catalog: &'a [CatalogEntry],
    candidates: &[Vec<String>],
) -> Vec<&'a CatalogEntry> {
    let rule = EntryContainsCandidate;
    catalog
        .iter()
        .filter(|entry| {
            candidates
                .iter()
                .any(|candidate| aligns_from_leaf(&rule, entry, candidate))
        })
        .collect()
}

/// Sorted, de-duplicated full names of every catalog entry implicated by `paths`.
pub fn reconcile(
    paths: &[ChangedPath],
    catalog: &[CatalogEntry],
    options: &MatchOptions,
) -> Vec<String> {
    let candidates: Vec<Vec<String>> = paths.iter().map(|path| node_texts(path, options)).collect();
    let names: BTreeSet<String> = matching_entries(catalog, &candidates)
        .into_iter()
        .map(CatalogEntry::full_name)
        .collect();
    tracing::debug!(
        paths = paths.len(),
        catalog = catalog.len(),
        names = names.len(),
        "reconciled changed paths against catalog"
    );
    names.into_iter().collect()
}
