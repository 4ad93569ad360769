use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

/// Node name ginkgo uses for documentation-only steps inside a spec body.
const NARRATIVE_NODE_NAME: &str = "By";

/// Role of an outline node in test identification.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// `Describe`, `Context`, `When`, `DescribeTable` and friends.
    Container,
    /// A runnable spec such as `It` or `Entry`.
    Spec,
    /// A `By` step: no test identity of its own.
    Narrative,
}

impl NodeKind {
    pub fn classify(name: &str, spec: bool) -> Self {
        if name == NARRATIVE_NODE_NAME {
            NodeKind::Narrative
        } else if spec {
            NodeKind::Spec
        } else {
            NodeKind::Container
        }
    }
}

/// One node of a ginkgo outline with its half-open byte range `[start, end)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, JsonSchema)]
pub struct OutlineNode {
    pub name: String,
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub kind: NodeKind,
    pub focused: bool,
    pub pending: bool,
    pub labels: Vec<String>,
    pub nodes: Vec<OutlineNode>,
}

/// Wire shape of `ginkgo outline --format json`, which carries a `spec` flag instead of a kind.
#[derive(Deserialize)]
struct RawOutlineNode {
    name: String,
    #[serde(default)]
    text: String,
    start: usize,
    end: usize,
    #[serde(default)]
    kind: Option<NodeKind>,
    #[serde(default)]
    spec: bool,
    #[serde(default)]
    focused: bool,
    #[serde(default)]
    pending: bool,
    #[serde(default)]
    labels: Option<Vec<String>>,
    #[serde(default)]
    nodes: Option<Vec<OutlineNode>>,
}

impl<'de> Deserialize<'de> for OutlineNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawOutlineNode::deserialize(deserializer)?;
        let kind = raw
            .kind
            .unwrap_or_else(|| NodeKind::classify(&raw.name, raw.spec));
        Ok(OutlineNode {
            name: raw.name,
            text: raw.text,
            start: raw.start,
            end: raw.end,
            kind,
            focused: raw.focused,
            pending: raw.pending,
            labels: raw.labels.unwrap_or_default(),
            nodes: raw.nodes.unwrap_or_default(),
        })
    }
}

impl OutlineNode {
    pub fn new(name: impl Into<String>, text: impl Into<String>, start: usize, end: usize) -> Self {
        let name = name.into();
        let kind = NodeKind::classify(&name, false);
        Self {
            name,
            text: text.into(),
            start,
            end,
            kind,
            focused: false,
            pending: false,
            labels: Vec::new(),
            nodes: Vec::new(),
        }
    }

    /// Builder for a runnable spec node (`It`, `Entry`, ...).
    pub fn spec(
        name: impl Into<String>,
        text: impl Into<String>,
        start: usize,
        end: usize,
    ) -> Self {
        let mut node = Self::new(name, text, start, end);
        if node.kind != NodeKind::Narrative {
            node.kind = NodeKind::Spec;
        }
        node
    }

    pub fn with_children(mut self, nodes: Vec<OutlineNode>) -> Self {
        self.nodes = nodes;
        self
    }

    pub fn is_narrative(&self) -> bool {
        matches!(self.kind, NodeKind::Narrative)
    }

    /// Whether `offset` falls inside `[start, end)`.
    pub fn contains_offset(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    pub fn clone_without_children(&self) -> Self {
        Self {
            name: self.name.clone(),
            text: self.text.clone(),
            start: self.start,
            end: self.end,
            kind: self.kind,
            focused: self.focused,
            pending: self.pending,
            labels: self.labels.clone(),
            nodes: Vec::new(),
        }
    }

    /// Deep clone that drops narrative nodes at every level.
    pub fn clone_without_narrative(&self) -> Self {
        let mut clone = self.clone_without_children();
        clone.nodes = self
            .nodes
            .iter()
            .filter(|child| !child.is_narrative())
            .map(OutlineNode::clone_without_narrative)
            .collect();
        clone
    }
}
