//! Tree state: the flat node list plus selection, expansion and the inline
//! create session.

use std::collections::{BTreeSet, HashMap};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::domain::builder::{build_tree, find_in_forest, flatten_visible, BuildOptions, TreeNode};
use crate::domain::entities::{InlineCreateSession, Node};

/// Canonical state of one tree instance.
///
/// `nodes` is the source of truth; `tree` is rebuilt from it on every transition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeState {
    pub nodes: Vec<Node>,
    #[serde(skip)]
    pub tree: Vec<TreeNode<Node>>,
    /// Position of each id in `nodes`; the first occurrence wins.
    #[serde(skip)]
    index: HashMap<String, usize>,
    pub selected_id: Option<String>,
    pub expanded_ids: BTreeSet<String>,
    pub inline_create: Option<InlineCreateSession>,
}

impl TreeState {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self::default().with_nodes(nodes)
    }

    /// Same cursors, new node list, fresh derived tree.
    pub fn with_nodes(mut self, nodes: Vec<Node>) -> Self {
        self.nodes = nodes;
        self.rebuild();
        self
    }

    pub fn rebuild(&mut self) {
        self.tree = build_tree(&self.nodes, BuildOptions::default());
        self.index.clear();
        for (pos, node) in self.nodes.iter().enumerate() {
            self.index.entry(node.id.clone()).or_insert(pos);
        }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.position(id).and_then(|pos| self.nodes.get(pos))
    }

    /// Index of `id` in `nodes`.
    ///
    /// Falls back to a scan when `nodes` was edited without a rebuild.
    pub fn position(&self, id: &str) -> Option<usize> {
        match self.index.get(id) {
            Some(&pos) if self.nodes.get(pos).is_some_and(|n| n.id == id) => Some(pos),
            _ => self.nodes.iter().position(|n| n.id == id),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// Children of `parent_id` (roots for None), sorted by rank.
    ///
    /// Equal ranks keep their order in `nodes`.
    pub fn children_of(&self, parent_id: Option<&str>) -> Vec<&Node> {
        self.nodes
            .iter()
            .filter(|n| n.parent_id.as_deref() == parent_id)
            .sorted_by(|a, b| a.rank.total_cmp(&b.rank))
            .collect()
    }

    /// Sibling set of `id`, including the node itself, sorted by rank.
    pub fn siblings_of(&self, id: &str) -> Option<Vec<&Node>> {
        let node = self.node(id)?;
        Some(self.children_of(node.parent_id.as_deref()))
    }

    /// Ancestor ids of `id`, nearest first.
    ///
    /// Stops at a missing parent or on revisiting a node, so foreign data with a
    /// cycle cannot loop forever.
    pub fn ancestors(&self, id: &str) -> Vec<String> {
        let mut chain = Vec::new();
        let mut seen = BTreeSet::new();
        seen.insert(id.to_string());
        let mut current = self.node(id).and_then(|n| n.parent_id.clone());
        while let Some(pid) = current {
            if !seen.insert(pid.clone()) {
                break;
            }
            current = self.node(&pid).and_then(|n| n.parent_id.clone());
            chain.push(pid);
        }
        chain
    }

    /// Whether `ancestor` appears on the parent chain of `id`.
    pub fn is_ancestor(&self, ancestor: &str, id: &str) -> bool {
        self.ancestors(id).iter().any(|a| a == ancestor)
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded_ids.contains(id)
    }

    pub fn find_tree_node(&self, id: &str) -> Option<&TreeNode<Node>> {
        find_in_forest(&self.tree, id)
    }

    /// Rows for rendering: roots and the children of expanded nodes.
    pub fn visible_rows(&self) -> Vec<(usize, &TreeNode<Node>)> {
        flatten_visible(&self.tree, &self.expanded_ids)
    }

    pub fn selected(&self) -> Option<&Node> {
        self.selected_id.as_deref().and_then(|id| self.node(id))
    }
}
