//! Tree store: one running tree instance.
//!
//! Owns a [`TreeState`] and applies actions to it one at a time. A
//! [`TreeHandle`] pairs state access with the typed actions; it is what the
//! registry hands out.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, instrument};

use crate::domain::{
    try_reduce, BeginInlineCreate, ConfirmInlineCreate, Direction, DomainResult, InlinePlaceholder,
    Node, RankAllocator, TreeAction, TreeState,
};

#[derive(Debug, Default)]
pub struct TreeStore {
    state: TreeState,
    ranks: RankAllocator,
}

impl TreeStore {
    pub fn new(ranks: RankAllocator) -> Self {
        Self {
            state: TreeState::default(),
            ranks,
        }
    }

    pub fn with_nodes(nodes: Vec<Node>, ranks: RankAllocator) -> Self {
        Self {
            state: TreeState::new(nodes),
            ranks,
        }
    }

    pub fn state(&self) -> &TreeState {
        &self.state
    }

    pub fn ranks(&self) -> &RankAllocator {
        &self.ranks
    }

    /// Replaces the whole state, e.g. with a snapshot taken before a failed edit.
    pub fn restore(&mut self, state: TreeState) {
        debug!("state restored");
        self.state = state;
    }

    /// Applies `action`. On rejection the state is left as it was.
    #[instrument(level = "debug", skip(self, action), fields(action = action.name()))]
    pub fn dispatch(&mut self, action: &TreeAction) -> DomainResult<()> {
        match try_reduce(&self.state, action, &self.ranks) {
            Ok(next) => {
                self.state = next;
                Ok(())
            }
            Err(e) => {
                debug!(error = %e, "action rejected, state unchanged");
                Err(e)
            }
        }
    }
}

/// Shared handle to a [`TreeStore`].
///
/// Single-threaded by construction: clones share the same store.
#[derive(Debug, Clone, Default)]
pub struct TreeHandle {
    inner: Rc<RefCell<TreeStore>>,
}

impl TreeHandle {
    pub fn new(store: TreeStore) -> Self {
        Self {
            inner: Rc::new(RefCell::new(store)),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> TreeState {
        self.inner.borrow().state().clone()
    }

    /// Runs `f` against the current state without cloning it.
    pub fn with_state<R>(&self, f: impl FnOnce(&TreeState) -> R) -> R {
        f(self.inner.borrow().state())
    }

    pub fn dispatch(&self, action: TreeAction) -> DomainResult<()> {
        self.inner.borrow_mut().dispatch(&action)
    }

    pub fn restore(&self, state: TreeState) {
        self.inner.borrow_mut().restore(state);
    }

    pub fn ptr_eq(&self, other: &TreeHandle) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn set_nodes(&self, nodes: Vec<Node>) -> DomainResult<()> {
        self.dispatch(TreeAction::SetNodes { nodes })
    }

    pub fn select(&self, id: Option<&str>) -> DomainResult<()> {
        self.dispatch(TreeAction::Select {
            id: id.map(str::to_string),
        })
    }

    pub fn toggle_expanded(&self, id: &str) -> DomainResult<()> {
        self.dispatch(TreeAction::ToggleExpanded { id: id.to_string() })
    }

    pub fn indent(&self, id: &str) -> DomainResult<()> {
        self.dispatch(TreeAction::Indent { id: id.to_string() })
    }

    pub fn outdent(&self, id: &str) -> DomainResult<()> {
        self.dispatch(TreeAction::Outdent { id: id.to_string() })
    }

    pub fn move_node(&self, id: &str, direction: Direction) -> DomainResult<()> {
        self.dispatch(TreeAction::Move {
            id: id.to_string(),
            direction,
        })
    }

    pub fn reorder(&self, id: &str, direction: Direction, target_rank: Option<f64>) -> DomainResult<()> {
        self.dispatch(TreeAction::Reorder {
            id: id.to_string(),
            direction,
            target_rank,
        })
    }

    pub fn reparent(&self, id: &str, new_parent_id: Option<&str>) -> DomainResult<()> {
        self.dispatch(TreeAction::Reparent {
            id: id.to_string(),
            new_parent_id: new_parent_id.map(str::to_string),
        })
    }

    pub fn begin_inline_create(&self, temp_id: &str, source_id: Option<&str>) -> DomainResult<()> {
        self.dispatch(TreeAction::BeginInlineCreate(BeginInlineCreate {
            temp_id: temp_id.to_string(),
            source_id: source_id.map(str::to_string),
        }))
    }

    pub fn add_inline_create_placeholder(&self, after_id: Option<&str>, node: Node) -> DomainResult<()> {
        self.dispatch(TreeAction::AddInlineCreatePlaceholder(InlinePlaceholder {
            after_id: after_id.map(str::to_string),
            node,
        }))
    }

    pub fn confirm_inline_create(&self, temp_id: &str, node_id: &str) -> DomainResult<()> {
        self.dispatch(TreeAction::ConfirmInlineCreate(ConfirmInlineCreate {
            temp_id: temp_id.to_string(),
            node_id: node_id.to_string(),
        }))
    }

    pub fn cancel_inline_create(&self) -> DomainResult<()> {
        self.dispatch(TreeAction::CancelInlineCreate)
    }
}
