use std::collections::{HashMap, HashSet};

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::entities::TreeItem;

/// Slot in the arena-based forest.
#[derive(Debug)]
pub struct ArenaNode<T> {
    pub data: T,
    /// Index of parent slot, None for roots
    pub parent: Option<Index>,
    /// Indices of child slots in attachment order
    pub children: Vec<Index>,
}

/// Arena-backed forest with an id index.
///
/// Slots are inserted detached and linked afterwards, so records can arrive in
/// any order relative to their parents.
#[derive(Debug)]
pub struct NodeArena<T> {
    arena: Arena<ArenaNode<T>>,
    by_id: HashMap<String, Index>,
    roots: Vec<Index>,
}

impl<T> Default for NodeArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> NodeArena<T> {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            by_id: HashMap::new(),
            roots: Vec::new(),
        }
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            arena: Arena::with_capacity(n),
            by_id: HashMap::with_capacity(n),
            roots: Vec::new(),
        }
    }

    pub fn get_node(&self, idx: Index) -> Option<&ArenaNode<T>> {
        self.arena.get(idx)
    }

    pub fn get_node_mut(&mut self, idx: Index) -> Option<&mut ArenaNode<T>> {
        self.arena.get_mut(idx)
    }

    pub fn index_of(&self, id: &str) -> Option<Index> {
        self.by_id.get(id).copied()
    }

    pub fn roots(&self) -> &[Index] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Links `child` under `parent`, or makes it a root when `parent` is None.
    #[instrument(level = "trace", skip(self))]
    pub fn attach(&mut self, child: Index, parent: Option<Index>) {
        match parent.and_then(|p| self.arena.get_mut(p).map(|node| (p, node))) {
            Some((p, node)) => {
                node.children.push(child);
                if let Some(c) = self.arena.get_mut(child) {
                    c.parent = Some(p);
                }
            }
            None => {
                self.roots.push(child);
                if let Some(c) = self.arena.get_mut(child) {
                    c.parent = None;
                }
            }
        }
    }

    /// Removes `child` from its parent's child list and makes it a root.
    pub fn detach_to_root(&mut self, child: Index) {
        let parent = self.arena.get(child).and_then(|c| c.parent);
        if let Some(p) = parent.and_then(|p| self.arena.get_mut(p)) {
            p.children.retain(|&c| c != child);
        }
        self.attach(child, None);
    }

    /// Preorder traversal over all roots, in root order.
    pub fn iter(&self) -> PreOrderIterator<'_, T> {
        PreOrderIterator::new(self)
    }

    /// Slot indices not reachable from any root, in slot order.
    pub fn unreachable(&self) -> Vec<Index> {
        let reachable: HashSet<Index> = self.iter().map(|(idx, _)| idx).collect();
        self.arena
            .iter()
            .map(|(idx, _)| idx)
            .filter(|idx| !reachable.contains(idx))
            .collect()
    }

    /// Removes a slot and returns it; its children stay in the arena.
    pub fn take(&mut self, idx: Index) -> Option<ArenaNode<T>> {
        self.arena.remove(idx)
    }
}

impl<T: TreeItem> NodeArena<T> {
    /// Inserts a detached slot and indexes it by id.
    ///
    /// A duplicate id keeps the first slot in the index; the later record is still
    /// stored so no input is lost.
    #[instrument(level = "trace", skip(self, data), fields(id = data.item_id()))]
    pub fn insert(&mut self, data: T) -> Index {
        let id = data.item_id().to_string();
        let idx = self.arena.insert(ArenaNode {
            data,
            parent: None,
            children: Vec::new(),
        });
        self.by_id.entry(id).or_insert(idx);
        idx
    }
}

pub struct PreOrderIterator<'a, T> {
    arena: &'a NodeArena<T>,
    stack: Vec<Index>,
}

impl<'a, T> PreOrderIterator<'a, T> {
    fn new(arena: &'a NodeArena<T>) -> Self {
        let stack = arena.roots.iter().rev().copied().collect();
        Self { arena, stack }
    }
}

impl<'a, T> Iterator for PreOrderIterator<'a, T> {
    type Item = (Index, &'a ArenaNode<T>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}
