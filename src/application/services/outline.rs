//! Outline service
//!
//! Runs the optimistic edit workflow against a remote store: apply the change
//! locally, call the remote API, then reconcile with the confirmed values or
//! roll the local state back when the call fails.

use std::rc::Rc;

use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::application::store::TreeHandle;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{Direction, Node, TreeAction, TreeState};
use crate::infrastructure::traits::NodeApi;

/// Service pairing one tree instance with its remote store.
pub struct OutlineService {
    api: Rc<dyn NodeApi>,
    tree: TreeHandle,
}

impl OutlineService {
    /// Create a new outline service.
    pub fn new(api: Rc<dyn NodeApi>, tree: TreeHandle) -> Self {
        Self { api, tree }
    }

    pub fn tree(&self) -> &TreeHandle {
        &self.tree
    }

    /// Fetch the children of `parent_id` and merge them into the local node list.
    ///
    /// Confirmed local children of that parent are replaced; pending
    /// placeholders survive the refresh.
    #[instrument(level = "debug", skip(self))]
    pub fn load_children(&self, parent_id: Option<&str>) -> ApplicationResult<usize> {
        let fetched = self
            .api
            .list_children(parent_id)
            .map_err(|e| ApplicationError::remote("list children", e))?;
        let count = fetched.len();

        let mut nodes: Vec<Node> = self.tree.with_state(|s| {
            s.nodes
                .iter()
                .filter(|n| n.is_pending() || n.parent_id.as_deref() != parent_id)
                .filter(|n| !fetched.iter().any(|f| f.id == n.id))
                .cloned()
                .collect()
        });
        nodes.extend(fetched);
        self.tree.set_nodes(nodes)?;
        debug!(count, "children loaded");
        Ok(count)
    }

    /// Create a node after `after_id` (or as last child of `parent_id`).
    ///
    /// A pending placeholder is shown and selected at once; it is promoted to the
    /// permanent id on success and removed again on failure.
    #[instrument(level = "debug", skip(self))]
    pub fn create_node(
        &self,
        after_id: Option<&str>,
        parent_id: Option<&str>,
        title: &str,
    ) -> ApplicationResult<String> {
        let temp_id = format!("temp-{}", Uuid::new_v4());
        self.tree.begin_inline_create(&temp_id, after_id.or(parent_id))?;
        let draft = Node::new(&temp_id, parent_id, title, 0.0);
        if let Err(e) = self.tree.add_inline_create_placeholder(after_id, draft) {
            self.tree.cancel_inline_create()?;
            return Err(e.into());
        }

        let (parent, local_rank) = self.tree.with_state(|s| {
            s.node(&temp_id)
                .map(|n| (n.parent_id.clone(), n.rank))
                .unwrap_or((None, 0.0))
        });

        let created = match self.api.create_child(parent.as_deref(), title, None) {
            Ok(node) => node,
            Err(e) => {
                warn!(temp_id = %temp_id, error = %e, "create failed, discarding placeholder");
                self.tree.cancel_inline_create()?;
                return Err(ApplicationError::remote("create child", e));
            }
        };
        self.tree.confirm_inline_create(&temp_id, &created.id)?;

        // The remote store appends; pin it to the slot chosen locally.
        if let Err(e) = self.api.reorder_node(&created.id, Direction::Down, Some(local_rank)) {
            warn!(id = %created.id, error = %e, "could not persist rank of new node");
        }
        Ok(created.id)
    }

    /// Indent `id` locally and persist the new parent.
    pub fn indent(&self, id: &str) -> ApplicationResult<()> {
        self.reparent_with(TreeAction::Indent { id: id.to_string() }, id)
    }

    /// Outdent `id` locally and persist the new parent.
    pub fn outdent(&self, id: &str) -> ApplicationResult<()> {
        self.reparent_with(TreeAction::Outdent { id: id.to_string() }, id)
    }

    /// Move `id` under `new_parent_id` locally and persist it.
    pub fn reparent(&self, id: &str, new_parent_id: Option<&str>) -> ApplicationResult<()> {
        self.reparent_with(
            TreeAction::Reparent {
                id: id.to_string(),
                new_parent_id: new_parent_id.map(str::to_string),
            },
            id,
        )
    }

    /// Move `id` one slot up or down locally and persist the rank.
    #[instrument(level = "debug", skip(self))]
    pub fn move_node(&self, id: &str, direction: Direction) -> ApplicationResult<()> {
        let snapshot = self.tree.state();
        self.tree.move_node(id, direction)?;
        let local_rank = self.local_rank(id);

        match self.api.reorder_node(id, direction, local_rank) {
            Ok(confirmed) => self.reconcile_rank(&confirmed, direction),
            Err(e) => {
                self.rollback(snapshot, id);
                Err(ApplicationError::remote("reorder node", e))
            }
        }
    }

    #[instrument(level = "debug", skip(self, action))]
    fn reparent_with(&self, action: TreeAction, id: &str) -> ApplicationResult<()> {
        let snapshot = self.tree.state();
        self.tree.dispatch(action)?;
        let (new_parent, local_rank) = self.tree.with_state(|s| {
            s.node(id)
                .map(|n| (n.parent_id.clone(), Some(n.rank)))
                .unwrap_or((None, None))
        });

        let moved = match self.api.move_node(id, new_parent.as_deref()) {
            Ok(node) => node,
            Err(e) => {
                self.rollback(snapshot, id);
                return Err(ApplicationError::remote("move node", e));
            }
        };

        // The parent change is persisted; a failed reorder only costs the slot.
        match self.api.reorder_node(id, Direction::Down, local_rank) {
            Ok(confirmed) => self.reconcile_rank(&confirmed, Direction::Down),
            Err(e) => {
                warn!(id, error = %e, "could not persist rank, adopting remote rank");
                self.reconcile_rank(&moved, Direction::Down)
            }
        }
    }

    fn local_rank(&self, id: &str) -> Option<f64> {
        self.tree.with_state(|s| s.node(id).map(|n| n.rank))
    }

    /// Mirror the rank the remote store settled on.
    fn reconcile_rank(&self, confirmed: &Node, direction: Direction) -> ApplicationResult<()> {
        if self.local_rank(&confirmed.id) != Some(confirmed.rank) {
            self.tree.reorder(&confirmed.id, direction, Some(confirmed.rank))?;
        }
        Ok(())
    }

    fn rollback(&self, snapshot: TreeState, id: &str) {
        warn!(id, "remote call failed, restoring previous state");
        self.tree.restore(snapshot);
    }
}
