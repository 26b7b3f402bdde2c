//! Content resolution for a selected node
//!
//! Resolving a node yields its effective note (own or inherited from the
//! nearest ancestor) and its display content, which comes from the node's
//! external detail document, from inline fields, or is empty.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ContentLoadError;
use crate::fetch::Fetcher;
use crate::node::{non_empty, Detail, ImageRef, NodeId, NodeKind, TreeNode};
use crate::store::DataStore;
use crate::tree::FaultTree;

/// Line-break markup substituted for newlines in display text
pub const LINE_BREAK: &str = "<br>";

/// Replace literal newlines with line-break markup
pub fn normalize_breaks(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\n', LINE_BREAK)
}

/// Nearest non-empty note walking up from `id`, starting with the node itself
pub fn effective_note<'a>(tree: &'a FaultTree, id: &NodeId) -> Option<&'a str> {
    let node = tree.get(id)?;
    std::iter::once(node)
        .chain(tree.ancestors(id))
        .find_map(|n| n.note.as_deref())
}

/// Display-ready detail content
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measures: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_cause: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ImageRef>,
}

impl Content {
    pub fn from_detail(detail: &Detail) -> Self {
        Self {
            measures: detail.measures.as_deref().map(normalize_breaks),
            root_cause: detail.root_cause.as_deref().map(normalize_breaks),
            images: detail.images.clone(),
        }
    }

    /// Empty content means "show the select-an-item placeholder"
    pub fn is_empty(&self) -> bool {
        self.measures.is_none() && self.root_cause.is_none() && self.images.is_empty()
    }
}

/// Outcome of resolving one node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub node_id: NodeId,
    pub note: Option<String>,
    pub content: Result<Content, ContentLoadError>,
}

/// Resolves notes and content against a tree and a shared data store
pub struct ContentResolver<F> {
    tree: Arc<FaultTree>,
    store: Arc<DataStore<F>>,
}

impl<F> Clone for ContentResolver<F> {
    fn clone(&self) -> Self {
        Self {
            tree: Arc::clone(&self.tree),
            store: Arc::clone(&self.store),
        }
    }
}

impl<F: Fetcher> ContentResolver<F> {
    pub fn new(tree: Arc<FaultTree>, store: Arc<DataStore<F>>) -> Self {
        Self { tree, store }
    }

    pub fn tree(&self) -> &Arc<FaultTree> {
        &self.tree
    }

    pub fn store(&self) -> &Arc<DataStore<F>> {
        &self.store
    }

    pub fn effective_note(&self, id: &NodeId) -> Option<String> {
        effective_note(&self.tree, id).map(str::to_string)
    }

    /// Resolve note and content for `id`; unknown ids resolve to `None`
    pub async fn resolve(&self, id: &NodeId) -> Option<Resolution> {
        let Some(node) = self.tree.get(id) else {
            log::debug!("Ignoring unknown node {}", id);
            return None;
        };

        let note = self.effective_note(id);
        let content = self.content(node).await;

        Some(Resolution {
            node_id: id.clone(),
            note,
            content,
        })
    }

    /// Display content for a node of the tree
    pub async fn content(&self, node: &TreeNode) -> Result<Content, ContentLoadError> {
        match &node.kind {
            NodeKind::ExternalLeaf { file } => {
                let value = self
                    .store
                    .load(file)
                    .await
                    .map_err(|source| ContentLoadError::Load {
                        node_id: node.id.clone(),
                        source,
                    })?;

                let detail = Detail::deserialize(&*value).map_err(|e| ContentLoadError::Shape {
                    node_id: node.id.clone(),
                    path: file.clone(),
                    reason: e.to_string(),
                })?;

                Ok(Content::from_detail(&Detail {
                    measures: non_empty(detail.measures),
                    root_cause: non_empty(detail.root_cause),
                    images: detail.images,
                }))
            }
            NodeKind::Category { detail, .. } | NodeKind::InlineLeaf { detail } => {
                Ok(Content::from_detail(detail))
            }
        }
    }
}
