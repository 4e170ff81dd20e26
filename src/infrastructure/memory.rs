//! In-memory remote store.
//!
//! Behaves like the remote API closely enough for tests and the CLI: issues
//! permanent ids, assigns ranks and can be told to fail the next call.

use std::cell::RefCell;

use tracing::{debug, instrument};
use uuid::Uuid;

use crate::domain::{move_node, reorder_node, reparent_node, Direction, Node, RankAllocator, TreeState};
use crate::infrastructure::error::{ApiError, ApiResult};
use crate::infrastructure::traits::NodeApi;

#[derive(Debug, Default)]
pub struct InMemoryNodeApi {
    state: RefCell<TreeState>,
    ranks: RankAllocator,
    fail_next: RefCell<Option<ApiError>>,
}

impl InMemoryNodeApi {
    pub fn new(ranks: RankAllocator) -> Self {
        Self {
            state: RefCell::new(TreeState::default()),
            ranks,
            fail_next: RefCell::new(None),
        }
    }

    pub fn with_nodes(nodes: Vec<Node>) -> Self {
        let api = Self::new(RankAllocator::default());
        api.state.replace(TreeState::new(nodes));
        api
    }

    /// Makes the next call return `error` without touching the store.
    pub fn fail_next(&self, error: ApiError) {
        self.fail_next.replace(Some(error));
    }

    /// Snapshot of every stored node.
    pub fn nodes(&self) -> Vec<Node> {
        self.state.borrow().nodes.clone()
    }

    pub fn get(&self, id: &str) -> Option<Node> {
        self.state.borrow().node(id).cloned()
    }

    fn check_failure(&self) -> ApiResult<()> {
        match self.fail_next.borrow_mut().take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn commit(&self, next: TreeState, id: &str) -> ApiResult<Node> {
        let node = next
            .node(id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(id.to_string()))?;
        self.state.replace(next);
        Ok(node)
    }
}

impl NodeApi for InMemoryNodeApi {
    fn list_children(&self, parent_id: Option<&str>) -> ApiResult<Vec<Node>> {
        self.check_failure()?;
        let state = self.state.borrow();
        Ok(state.children_of(parent_id).into_iter().cloned().collect())
    }

    #[instrument(level = "debug", skip(self))]
    fn create_child(&self, parent_id: Option<&str>, title: &str, note: Option<&str>) -> ApiResult<Node> {
        self.check_failure()?;
        let current = self.state.borrow().clone();
        if let Some(pid) = parent_id {
            if !current.contains(pid) {
                return Err(ApiError::NotFound(pid.to_string()));
            }
        }
        let rank = self
            .ranks
            .rank_for_slot(current.children_of(parent_id).last().map(|n| n.rank), None)
            .unwrap_or(self.ranks.base_rank);
        let mut node = Node::new(Uuid::new_v4().to_string(), parent_id, title, rank);
        if let Some(note) = note {
            node = node.with_field("note", note);
        }
        debug!(id = %node.id, rank, "created");

        let mut nodes = current.nodes.clone();
        nodes.push(node.clone());
        self.state.replace(current.with_nodes(nodes));
        Ok(node)
    }

    fn move_node(&self, node_id: &str, new_parent_id: Option<&str>) -> ApiResult<Node> {
        self.check_failure()?;
        let current = self.state.borrow().clone();
        if !current.contains(node_id) {
            return Err(ApiError::NotFound(node_id.to_string()));
        }
        let next = reparent_node(&current, node_id, new_parent_id, &self.ranks)
            .map_err(|e| ApiError::rejected(e.to_string()))?;
        self.commit(next, node_id)
    }

    fn reorder_node(&self, node_id: &str, direction: Direction, target_rank: Option<f64>) -> ApiResult<Node> {
        self.check_failure()?;
        let current = self.state.borrow().clone();
        if !current.contains(node_id) {
            return Err(ApiError::NotFound(node_id.to_string()));
        }
        let next = match target_rank {
            Some(_) => reorder_node(&current, node_id, direction, target_rank, &self.ranks),
            None => move_node(&current, node_id, direction, &self.ranks),
        }
        .map_err(|e| ApiError::rejected(e.to_string()))?;
        self.commit(next, node_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_empty_store_when_create_children_then_ranks_increase() {
        let api = InMemoryNodeApi::default();
        let a = api.create_child(None, "a", None).unwrap();
        let b = api.create_child(None, "b", Some("with note")).unwrap();
        assert!(a.rank < b.rank);
        assert_ne!(a.id, b.id);
        assert_eq!(b.extra.get("note").and_then(|v| v.as_str()), Some("with note"));
        assert_eq!(api.list_children(None).unwrap().len(), 2);
    }

    #[test]
    fn given_fail_next_when_called_then_error_once() {
        let api = InMemoryNodeApi::default();
        api.fail_next(ApiError::unavailable("offline"));
        assert!(api.create_child(None, "a", None).is_err());
        assert!(api.create_child(None, "a", None).is_ok());
    }

    #[test]
    fn given_descendant_target_when_move_then_rejected() {
        let api = InMemoryNodeApi::with_nodes(vec![
            Node::new("1", None, "one", 100.0),
            Node::new("1.1", Some("1"), "child", 100.0),
        ]);
        let err = api.move_node("1", Some("1.1")).unwrap_err();
        assert!(matches!(err, ApiError::Rejected { .. }));
    }
}
