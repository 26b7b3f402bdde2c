//! Tree model
//!
//! Built once from the main document and immutable afterwards. The id→node
//! map is the single source of truth for what a node represents; structure is
//! recovered from the identifiers themselves.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::Result;
use crate::node::{non_empty, Detail, NodeId, NodeKind, RawNode, TreeNode};

/// Immutable fault tree keyed by synthetic node identifiers
#[derive(Debug, Clone, Default)]
pub struct FaultTree {
    nodes: HashMap<NodeId, TreeNode>,
    roots: Vec<NodeId>,
}

impl FaultTree {
    /// Build a tree from the top-level items of the main document
    pub fn build(items: Vec<RawNode>) -> Self {
        let mut nodes = HashMap::new();
        let roots = Self::build_under(items, &NodeId::root(), &mut nodes);
        log::debug!("Built fault tree with {} nodes", nodes.len());
        Self { nodes, roots }
    }

    /// Decode the main document (a JSON array of nodes) and build the tree
    pub fn from_value(value: Value) -> Result<Self> {
        let items: Vec<RawNode> = serde_json::from_value(value)?;
        Ok(Self::build(items))
    }

    /// Recursively insert `items` under `parent`, returning their identifiers
    fn build_under(
        items: Vec<RawNode>,
        parent: &NodeId,
        nodes: &mut HashMap<NodeId, TreeNode>,
    ) -> Vec<NodeId> {
        let mut ids = Vec::with_capacity(items.len());

        for (index, item) in items.into_iter().enumerate() {
            let id = parent.child(index);
            let detail = Detail {
                measures: non_empty(item.measures),
                root_cause: non_empty(item.root_cause),
                images: item.images.unwrap_or_default(),
            };
            let file = non_empty(item.file);

            let kind = match item.children {
                Some(children) if !children.is_empty() => {
                    if let Some(file) = &file {
                        log::debug!("Ignoring file {} on category {}", file, id);
                    }
                    let children = Self::build_under(children, &id, nodes);
                    NodeKind::Category { children, detail }
                }
                _ => match file {
                    Some(file) => NodeKind::ExternalLeaf { file },
                    None => NodeKind::InlineLeaf { detail },
                },
            };

            nodes.insert(
                id.clone(),
                TreeNode {
                    id: id.clone(),
                    title: item.title,
                    note: non_empty(item.note),
                    kind,
                },
            );
            ids.push(id);
        }

        ids
    }

    pub fn get(&self, id: &NodeId) -> Option<&TreeNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Top-level node identifiers in document order
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Children of `id` in document order; the root container yields the top level
    pub fn children(&self, id: &NodeId) -> &[NodeId] {
        if id.is_root() {
            return &self.roots;
        }
        self.nodes.get(id).map(TreeNode::children).unwrap_or(&[])
    }

    /// Parent node, or `None` for top-level nodes and unknown ids
    pub fn parent(&self, id: &NodeId) -> Option<&TreeNode> {
        id.parent().and_then(|p| self.nodes.get(&p))
    }

    /// Ancestors from nearest to farthest, excluding the root container
    pub fn ancestors<'a>(&'a self, id: &NodeId) -> impl Iterator<Item = &'a TreeNode> + 'a {
        std::iter::successors(self.parent(id), move |node| self.parent(&node.id))
    }

    /// Every node in pre-order (document order, parents before children)
    pub fn walk(&self) -> Vec<&TreeNode> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<&NodeId> = self.roots.iter().rev().collect();

        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.get(id) {
                out.push(node);
                stack.extend(node.children().iter().rev());
            }
        }

        out
    }

    /// All nodes, unordered
    pub fn nodes(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.values()
    }
}
