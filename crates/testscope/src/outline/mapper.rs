use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ScopeError;
use crate::line_index::{CharRange, LineIndex};

use super::node::OutlineNode;

/// Root-to-leaf chain of outline nodes touched by a change.
///
/// Ancestors are snapshots without children; the last node is the one that matched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ChangedPath {
    pub nodes: Vec<OutlineNode>,
}

impl ChangedPath {
    pub fn leaf(&self) -> Option<&OutlineNode> {
        self.nodes.last()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Maps changed lines of one file onto that file's outline.
pub struct OutlineMapper<'a> {
    lines: &'a LineIndex,
    outline: &'a [OutlineNode],
}

impl<'a> OutlineMapper<'a> {
    pub fn new(lines: &'a LineIndex, outline: &'a [OutlineNode]) -> Self {
        Self { lines, outline }
    }

    pub fn paths_for_lines(
        &self,
        lines: impl IntoIterator<Item = usize>,
    ) -> Result<Vec<ChangedPath>, ScopeError> {
        let mut lines: Vec<usize> = lines.into_iter().collect();
        lines.sort_unstable();
        lines.dedup();

        let ranges = lines
            .into_iter()
            .map(|line| self.lines.char_range_for_line(line))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(self.paths_for_ranges(&ranges))
    }

    pub fn paths_for_ranges(&self, ranges: &[CharRange]) -> Vec<ChangedPath> {
        if self.outline.is_empty() || ranges.is_empty() {
            return Vec::new();
        }
        expand_paths(&matching_nodes(ranges, self.outline))
    }
}

/// A node matches when some range's end offset lies in `[node.start, node.end)`.
///
/// Only the end point is tested: a range that starts inside a node but ends past it
/// does not match that node.
fn matches_any(node: &OutlineNode, ranges: &[CharRange]) -> bool {
    ranges.iter().any(|range| node.contains_offset(range.end))
}

/// Prunes `nodes` to the subtrees hit by `ranges`.
///
/// A matched node without matched children is kept with its non-narrative children;
/// otherwise it is kept with only the matched children.
pub fn matching_nodes(ranges: &[CharRange], nodes: &[OutlineNode]) -> Vec<OutlineNode> {
    let mut matched = Vec::new();
    for node in nodes {
        if !matches_any(node, ranges) {
            continue;
        }
        let children = matching_nodes(ranges, &node.nodes);
        if children.is_empty() {
            matched.push(node.clone_without_narrative());
        } else {
            let mut clone = node.clone_without_children();
            clone.nodes = children;
            matched.push(clone);
        }
    }
    matched
}

/// One path per childless node of the pruned forest, in depth-first order.
pub fn expand_paths(nodes: &[OutlineNode]) -> Vec<ChangedPath> {
    let mut paths = Vec::new();
    let mut ancestors = Vec::new();
    expand_into(&mut ancestors, nodes, &mut paths);
    paths
}

fn expand_into(
    ancestors: &mut Vec<OutlineNode>,
    nodes: &[OutlineNode],
    paths: &mut Vec<ChangedPath>,
) {
    for node in nodes {
        if node.nodes.is_empty() {
            let mut path = ancestors.clone();
            path.push(node.clone());
            paths.push(ChangedPath { nodes: path });
        } else {
            ancestors.push(node.clone_without_children());
            expand_into(ancestors, &node.nodes, paths);
            ancestors.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(path: &ChangedPath) -> Vec<&str> {
        path.nodes.iter().map(|n| n.text.as_str()).collect()
    }

    #[test]
    fn end_point_containment_boundaries() {
        let outline = vec![OutlineNode::spec("It", "leaf", 100, 200)];

        assert_eq!(matching_nodes(&[CharRange::new(150, 180)], &outline).len(), 1);
        assert!(matching_nodes(&[CharRange::new(50, 99)], &outline).is_empty());
        assert!(matching_nodes(&[CharRange::new(50, 200)], &outline).is_empty());
        assert_eq!(matching_nodes(&[CharRange::new(50, 100)], &outline).len(), 1);
    }

    #[test]
    fn two_hit_leaves_yield_two_paths_with_shared_ancestor() {
        let outline = vec![OutlineNode::new("Describe", "suite", 0, 300).with_children(vec![
            OutlineNode::spec("It", "first", 10, 100),
            OutlineNode::spec("It", "second", 110, 200),
            OutlineNode::spec("It", "third", 210, 290),
        ])];

        let ranges = [CharRange::new(20, 30), CharRange::new(120, 130)];
        let paths = expand_paths(&matching_nodes(&ranges, &outline));

        assert_eq!(paths.len(), 2);
        assert_eq!(texts(&paths[0]), vec!["suite", "first"]);
        assert_eq!(texts(&paths[1]), vec!["suite", "second"]);
        assert_eq!(paths[0].nodes[0], paths[1].nodes[0]);
        assert!(paths[0].nodes[0].nodes.is_empty());
    }

    #[test]
    fn container_hit_without_child_hit_expands_to_all_specs() {
        let outline = vec![OutlineNode::new("DescribeTable", "table", 0, 300).with_children(vec![
            OutlineNode::spec("Entry", "first", 200, 240),
            OutlineNode::spec("Entry", "second", 250, 290),
        ])];

        let paths = expand_paths(&matching_nodes(&[CharRange::new(50, 60)], &outline));
        assert_eq!(paths.len(), 2);
        assert_eq!(texts(&paths[1]), vec!["table", "second"]);
    }

    #[test]
    fn narrative_children_do_not_make_paths() {
        let outline = vec![OutlineNode::spec("It", "leaf", 0, 100).with_children(vec![
            OutlineNode::new("By", "step one", 10, 20),
            OutlineNode::new("By", "step two", 30, 40),
        ])];

        let paths = expand_paths(&matching_nodes(&[CharRange::new(50, 60)], &outline));
        assert_eq!(paths.len(), 1);
        assert_eq!(texts(&paths[0]), vec!["leaf"]);
        assert!(paths[0].leaf().unwrap().nodes.is_empty());
    }

    #[test]
    fn mapper_sorts_lines_and_rejects_unknown_lines() {
        let content = "Describe(\"s\", func() {\n\tIt(\"a\", func() {\n\t})\n})";
        let index = LineIndex::build(content);
        let outline = vec![OutlineNode::new("Describe", "s", 0, content.len()).with_children(vec![
            OutlineNode::spec("It", "a", 24, 45),
        ])];
        let mapper = OutlineMapper::new(&index, &outline);

        let paths = mapper.paths_for_lines([3, 2, 3]).unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(texts(&paths[0]), vec!["s", "a"]);

        let err = mapper.paths_for_lines([9]).unwrap_err();
        assert!(matches!(err, ScopeError::InvalidLineNumber { line: 9, lines: 4 }));
    }

    #[test]
    fn empty_outline_yields_no_paths() {
        let index = LineIndex::build("package x\n");
        let mapper = OutlineMapper::new(&index, &[]);
        assert!(mapper.paths_for_lines([1]).unwrap().is_empty());
    }
}
