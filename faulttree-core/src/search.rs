//! Title search and tree filtering
//!
//! Filtering keeps every match reachable: ancestors of a match stay visible
//! and expanded, and a node whose own title matches shows its whole subtree.
//! Matches are not ranked; callers render visible nodes in tree order.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::node::NodeId;
use crate::tree::FaultTree;

/// Visibility and expansion sets produced by a query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterResult {
    /// Normalized (trimmed, lowercased) query; empty for the reset state
    pub query: String,
    pub visible: HashSet<NodeId>,
    pub expanded: HashSet<NodeId>,
    /// Nodes whose own title matched, in tree order
    pub matches: Vec<NodeId>,
}

impl FilterResult {
    /// Whether this is the reset state (empty query)
    pub fn is_reset(&self) -> bool {
        self.query.is_empty()
    }

    /// Nothing but the implicit root container is left visible
    pub fn no_results(&self) -> bool {
        !self.is_reset() && self.visible.is_empty()
    }

    pub fn is_visible(&self, id: &NodeId) -> bool {
        self.visible.contains(id)
    }

    pub fn is_expanded(&self, id: &NodeId) -> bool {
        self.expanded.contains(id)
    }
}

/// Lowercased titles in pre-order with parent links, built once per tree
#[derive(Debug, Clone)]
pub struct SearchIndex {
    ids: Vec<NodeId>,
    titles: Vec<String>,
    parents: Vec<Option<usize>>,
}

impl SearchIndex {
    pub fn new(tree: &FaultTree) -> Self {
        let order = tree.walk();
        let mut position: HashMap<&NodeId, usize> = HashMap::with_capacity(order.len());
        let mut ids = Vec::with_capacity(order.len());
        let mut titles = Vec::with_capacity(order.len());
        let mut parents = Vec::with_capacity(order.len());

        for (index, node) in order.iter().enumerate() {
            position.insert(&node.id, index);
            ids.push(node.id.clone());
            titles.push(node.title.to_lowercase());
            // Pre-order places every parent before its children.
            parents.push(node.id.parent().and_then(|p| position.get(&p).copied()));
        }

        Self {
            ids,
            titles,
            parents,
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Compute the visible and expanded sets for `query`
    pub fn filter(&self, query: &str) -> FilterResult {
        let needle = query.trim().to_lowercase();

        if needle.is_empty() {
            return FilterResult {
                query: needle,
                visible: self.ids.iter().cloned().collect(),
                expanded: HashSet::new(),
                matches: Vec::new(),
            };
        }

        let n = self.ids.len();
        let own: Vec<bool> = self.titles.iter().map(|t| t.contains(&needle)).collect();

        // Own match or any matching descendant; children follow parents, so a
        // reverse sweep sees a whole subtree before its root.
        let mut subtree = own.clone();
        for i in (0..n).rev() {
            if subtree[i] {
                if let Some(p) = self.parents[i] {
                    subtree[p] = true;
                }
            }
        }

        // Some strict ancestor matched on its own title.
        let mut inside_match = vec![false; n];
        for i in 0..n {
            if let Some(p) = self.parents[i] {
                inside_match[i] = own[p] || inside_match[p];
            }
        }

        let mut visible = HashSet::new();
        let mut expanded = HashSet::new();
        let mut matches = Vec::new();

        for i in 0..n {
            if !(subtree[i] || inside_match[i]) {
                continue;
            }
            visible.insert(self.ids[i].clone());
            if let Some(p) = self.parents[i] {
                expanded.insert(self.ids[p].clone());
            }
            if own[i] {
                matches.push(self.ids[i].clone());
            }
        }

        log::debug!(
            "Query {:?}: {} matches, {} visible",
            needle,
            matches.len(),
            visible.len()
        );

        FilterResult {
            query: needle,
            visible,
            expanded,
            matches,
        }
    }
}

/// One-shot filter without keeping an index around
pub fn filter(tree: &FaultTree, query: &str) -> FilterResult {
    SearchIndex::new(tree).filter(query)
}
