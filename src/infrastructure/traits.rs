//! I/O boundary traits for testability
//!
//! The engine never talks to the network itself. Services reach the remote
//! store through [`NodeApi`], which tests replace with an in-memory version.

use crate::domain::{Direction, Node};
use crate::infrastructure::error::ApiResult;

/// Remote persistence contract for tree nodes.
pub trait NodeApi {
    /// Children of `parent_id` (roots for None).
    fn list_children(&self, parent_id: Option<&str>) -> ApiResult<Vec<Node>>;

    /// Create a node as last child of `parent_id`; the returned node carries the permanent id.
    fn create_child(&self, parent_id: Option<&str>, title: &str, note: Option<&str>) -> ApiResult<Node>;

    /// Reparent `node_id` under `new_parent_id`.
    fn move_node(&self, node_id: &str, new_parent_id: Option<&str>) -> ApiResult<Node>;

    /// Shift `node_id` among its siblings, or pin it to `target_rank`.
    fn reorder_node(&self, node_id: &str, direction: Direction, target_rank: Option<f64>) -> ApiResult<Node>;
}
