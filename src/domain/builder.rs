//! Tree builder: turns a flat, parent-linked record list into a nested forest.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use generational_arena::Index;
use termtree::Tree;
use tracing::{instrument, warn};

use crate::domain::arena::NodeArena;
use crate::domain::entities::TreeItem;

/// Derived nested view of a record and its children.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode<T> {
    pub node: T,
    pub children: Vec<TreeNode<T>>,
}

/// Options for [`build_tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Sort every child list and the root list by ascending rank
    pub sort: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self { sort: true }
    }
}

/// Builds the nested forest for `items`.
///
/// A record whose parent is not in `items` becomes a root. Input is never
/// modified; every record appears exactly once in the output.
#[instrument(level = "debug", skip(items), fields(count = items.len()))]
pub fn build_tree<T: TreeItem + Clone>(items: &[T], options: BuildOptions) -> Vec<TreeNode<T>> {
    let mut arena = NodeArena::with_capacity(items.len());
    let slots: Vec<Index> = items.iter().cloned().map(|item| arena.insert(item)).collect();

    for &slot in &slots {
        let parent = arena
            .get_node(slot)
            .and_then(|n| n.data.parent_id())
            .and_then(|pid| arena.index_of(pid))
            .filter(|&p| p != slot);
        arena.attach(slot, parent);
    }

    // Records caught in a parent cycle are not reachable from any root.
    loop {
        let Some(&orphan) = arena.unreachable().first() else {
            break;
        };
        if let Some(node) = arena.get_node(orphan) {
            warn!(id = node.data.item_id(), "parent cycle in input, promoting node to root");
        }
        arena.detach_to_root(orphan);
    }

    let mut forest = materialize(&mut arena);
    if options.sort {
        sort_forest(&mut forest);
    }
    forest
}

/// Moves every reachable slot out of the arena into nested nodes.
///
/// Works bottom-up over the preorder, so chain depth is bounded by the heap
/// rather than the call stack.
fn materialize<T>(arena: &mut NodeArena<T>) -> Vec<TreeNode<T>> {
    let order: Vec<Index> = arena.iter().map(|(idx, _)| idx).collect();
    let roots = arena.roots().to_vec();
    let mut built: HashMap<Index, TreeNode<T>> = HashMap::with_capacity(order.len());
    // children follow their parent in preorder
    for idx in order.into_iter().rev() {
        let Some(slot) = arena.take(idx) else {
            continue;
        };
        let children = slot.children.iter().filter_map(|c| built.remove(c)).collect();
        built.insert(
            idx,
            TreeNode {
                node: slot.data,
                children,
            },
        );
    }
    roots.iter().filter_map(|root| built.remove(root)).collect()
}

fn sort_forest<T: TreeItem>(forest: &mut [TreeNode<T>]) {
    let mut pending = vec![forest];
    while let Some(level) = pending.pop() {
        level.sort_by(|a, b| a.node.rank().total_cmp(&b.node.rank()));
        pending.extend(level.iter_mut().map(|n| n.children.as_mut_slice()));
    }
}

impl<T: TreeItem> TreeNode<T> {
    pub fn id(&self) -> &str {
        self.node.item_id()
    }

    /// Number of levels in this subtree, counting this node.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(1, self)];
        while let Some((level, node)) = stack.pop() {
            deepest = deepest.max(level);
            stack.extend(node.children.iter().map(|c| (level + 1, c)));
        }
        deepest
    }

    /// Number of records in this subtree, counting this node.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&TreeNode<T>> {
        self.iter().find(|n| n.id() == id)
    }

    /// Preorder traversal of this subtree.
    pub fn iter(&self) -> impl Iterator<Item = &TreeNode<T>> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let current = stack.pop()?;
            stack.extend(current.children.iter().rev());
            Some(current)
        })
    }
}

impl<T: fmt::Display> TreeNode<T> {
    pub fn to_tree_string(&self) -> Tree<String> {
        Tree::new(self.node.to_string())
            .with_leaves(self.children.iter().map(TreeNode::to_tree_string))
    }
}

/// Finds a record anywhere in the forest.
pub fn find_in_forest<'a, T: TreeItem>(forest: &'a [TreeNode<T>], id: &str) -> Option<&'a TreeNode<T>> {
    forest.iter().find_map(|root| root.find(id))
}

/// Rows a consumer would render: roots plus the children of expanded nodes.
///
/// Yields `(depth, node)` in display order, depth starting at 0.
pub fn flatten_visible<'a, T: TreeItem>(
    forest: &'a [TreeNode<T>],
    expanded: &BTreeSet<String>,
) -> Vec<(usize, &'a TreeNode<T>)> {
    let mut rows = Vec::new();
    let mut stack: Vec<(usize, &TreeNode<T>)> = forest.iter().rev().map(|n| (0, n)).collect();
    while let Some((depth, node)) = stack.pop() {
        rows.push((depth, node));
        if expanded.contains(node.id()) {
            stack.extend(node.children.iter().rev().map(|c| (depth + 1, c)));
        }
    }
    rows
}
