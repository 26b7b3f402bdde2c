//! Fault tree node types
//!
//! `RawNode` mirrors the JSON documents as authored. `TreeNode` is the typed
//! record the tree model stores under each synthetic `NodeId`.

use serde::{Deserialize, Deserializer, Serialize};

/// Identifier of the implicit container holding the top-level items
pub const ROOT_ID: &str = "root";

/// Path-of-sibling-indices identifier, e.g. `root-2-0`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// The implicit root container
    pub fn root() -> Self {
        Self(ROOT_ID.to_string())
    }

    /// Identifier of the `index`-th child under this node
    pub fn child(&self, index: usize) -> Self {
        Self(format!("{}-{}", self.0, index))
    }

    /// Parent identifier by prefix decomposition; `None` for the root container
    pub fn parent(&self) -> Option<Self> {
        self.0
            .rsplit_once('-')
            .map(|(prefix, _)| Self(prefix.to_string()))
    }

    pub fn is_root(&self) -> bool {
        self.0 == ROOT_ID
    }

    /// Number of sibling indices in the path (top-level items have depth 1)
    pub fn depth(&self) -> usize {
        self.0.matches('-').count()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Image attached to a detail-bearing node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// One entry of `main.json` as authored
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNode {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<RawNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measures: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_cause: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ImageRef>>,
}

impl RawNode {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_children(mut self, children: Vec<RawNode>) -> Self {
        self.children = Some(children);
        self
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_measures(mut self, measures: impl Into<String>) -> Self {
        self.measures = Some(measures.into());
        self
    }

    pub fn with_root_cause(mut self, root_cause: impl Into<String>) -> Self {
        self.root_cause = Some(root_cause.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn has_children(&self) -> bool {
        self.children.as_ref().is_some_and(|c| !c.is_empty())
    }
}

/// Diagnostic content carried inline or by a detail document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Detail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measures: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_cause: Option<String>,
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub images: Vec<ImageRef>,
}

/// `null` and a missing list both decode to an empty list
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Detail {
    pub fn is_empty(&self) -> bool {
        self.measures.is_none() && self.root_cause.is_none() && self.images.is_empty()
    }
}

/// What a node is, for iconography and content resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    /// Has children; used for structural grouping
    Category { children: Vec<NodeId>, detail: Detail },
    /// Details live in an external document
    ExternalLeaf { file: String },
    /// Details, if any, are carried on the node itself
    InlineLeaf { detail: Detail },
}

/// A node of the built tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub id: NodeId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(flatten)]
    pub kind: NodeKind,
}

impl TreeNode {
    pub fn is_category(&self) -> bool {
        matches!(self.kind, NodeKind::Category { .. })
    }

    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Category { children, .. } => children,
            _ => &[],
        }
    }

    /// External detail file, if this is an external leaf
    pub fn file(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::ExternalLeaf { file } => Some(file),
            _ => None,
        }
    }

    /// Inline detail, if any
    pub fn detail(&self) -> Option<&Detail> {
        match &self.kind {
            NodeKind::Category { detail, .. } | NodeKind::InlineLeaf { detail } => Some(detail),
            NodeKind::ExternalLeaf { .. } => None,
        }
    }
}

/// Treat empty strings as absent
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
