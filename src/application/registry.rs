//! Registry of running tree instances, keyed by an arbitrary string.
//!
//! The host owns the registry and passes it to whatever needs to locate a tree;
//! there is no process-wide instance.

use std::collections::BTreeMap;

use tracing::debug;

use crate::application::store::TreeHandle;
use crate::application::{ApplicationError, ApplicationResult};

#[derive(Debug, Default)]
pub struct TreeRegistry {
    trees: BTreeMap<String, TreeHandle>,
}

impl TreeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites `key`, returning the handle it replaced.
    pub fn register_tree(&mut self, key: impl Into<String>, handle: TreeHandle) -> Option<TreeHandle> {
        let key = key.into();
        debug!(key = %key, "register tree");
        self.trees.insert(key, handle)
    }

    /// Removes `key`; absent keys are ignored.
    pub fn unregister_tree(&mut self, key: &str) -> Option<TreeHandle> {
        debug!(key, "unregister tree");
        self.trees.remove(key)
    }

    pub fn get_registered_tree(&self, key: &str) -> Option<TreeHandle> {
        self.trees.get(key).cloned()
    }

    /// Like [`get_registered_tree`](Self::get_registered_tree), but an absent key is an error.
    pub fn require_tree(&self, key: &str) -> ApplicationResult<TreeHandle> {
        self.get_registered_tree(key)
            .ok_or_else(|| ApplicationError::UnknownTree(key.to_string()))
    }

    /// Registered keys in sorted order.
    pub fn list_registered_trees(&self) -> Vec<String> {
        self.trees.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}
