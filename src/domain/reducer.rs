//! # Tree Reducer
//!
//! Maps a tagged [`TreeAction`] onto the matching transition:
//! ```text
//! Action → Reduce → Mutation → Rebuild tree → New state
//! ```
//!
//! Rejected actions never panic. [`try_reduce`] surfaces the [`DomainError`];
//! [`reduce`] logs it and hands back the unchanged state.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::domain::entities::{
    BeginInlineCreate, ConfirmInlineCreate, Direction, InlinePlaceholder, Node,
};
use crate::domain::error::DomainResult;
use crate::domain::mutations::{
    add_inline_create_placeholder, begin_inline_create, cancel_inline_create, confirm_inline_create,
    indent_node, move_node, outdent_node, reorder_node, reparent_node,
};
use crate::domain::rank::RankAllocator;
use crate::domain::state::TreeState;

/// Everything a consumer can ask a tree instance to do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum TreeAction {
    // =========================================================================
    // Cursor actions
    // =========================================================================
    /// Replace the node list wholesale (load or server refresh)
    SetNodes { nodes: Vec<Node> },
    /// Select a node; the id is not validated
    Select { id: Option<String> },
    ToggleExpanded { id: String },
    Expand { id: String },
    Collapse { id: String },
    CollapseAll,

    // =========================================================================
    // Structural mutations
    // =========================================================================
    Indent { id: String },
    Outdent { id: String },
    Move { id: String, direction: Direction },
    Reorder {
        id: String,
        direction: Direction,
        #[serde(default)]
        target_rank: Option<f64>,
    },
    Reparent {
        id: String,
        #[serde(default)]
        new_parent_id: Option<String>,
    },

    // =========================================================================
    // Inline creation
    // =========================================================================
    BeginInlineCreate(BeginInlineCreate),
    AddInlineCreatePlaceholder(InlinePlaceholder),
    ConfirmInlineCreate(ConfirmInlineCreate),
    CancelInlineCreate,
}

impl TreeAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetNodes { .. } => "setNodes",
            Self::Select { .. } => "select",
            Self::ToggleExpanded { .. } => "toggleExpanded",
            Self::Expand { .. } => "expand",
            Self::Collapse { .. } => "collapse",
            Self::CollapseAll => "collapseAll",
            Self::Indent { .. } => "indent",
            Self::Outdent { .. } => "outdent",
            Self::Move { .. } => "move",
            Self::Reorder { .. } => "reorder",
            Self::Reparent { .. } => "reparent",
            Self::BeginInlineCreate(_) => "beginInlineCreate",
            Self::AddInlineCreatePlaceholder(_) => "addInlineCreatePlaceholder",
            Self::ConfirmInlineCreate(_) => "confirmInlineCreate",
            Self::CancelInlineCreate => "cancelInlineCreate",
        }
    }
}

/// Applies `action`, or reports why it was rejected.
pub fn try_reduce(
    state: &TreeState,
    action: &TreeAction,
    ranks: &RankAllocator,
) -> DomainResult<TreeState> {
    trace!(action = action.name(), "reduce");
    match action {
        TreeAction::SetNodes { nodes } => Ok(state.clone().with_nodes(nodes.clone())),
        TreeAction::Select { id } => {
            let mut next = state.clone();
            next.selected_id = id.clone();
            Ok(next)
        }
        TreeAction::ToggleExpanded { id } => {
            let mut next = state.clone();
            if !next.expanded_ids.remove(id) {
                next.expanded_ids.insert(id.clone());
            }
            Ok(next)
        }
        TreeAction::Expand { id } => {
            let mut next = state.clone();
            next.expanded_ids.insert(id.clone());
            Ok(next)
        }
        TreeAction::Collapse { id } => {
            let mut next = state.clone();
            next.expanded_ids.remove(id);
            Ok(next)
        }
        TreeAction::CollapseAll => {
            let mut next = state.clone();
            next.expanded_ids.clear();
            Ok(next)
        }
        TreeAction::Indent { id } => indent_node(state, id, ranks),
        TreeAction::Outdent { id } => outdent_node(state, id, ranks),
        TreeAction::Move { id, direction } => move_node(state, id, *direction, ranks),
        TreeAction::Reorder {
            id,
            direction,
            target_rank,
        } => reorder_node(state, id, *direction, *target_rank, ranks),
        TreeAction::Reparent { id, new_parent_id } => {
            reparent_node(state, id, new_parent_id.as_deref(), ranks)
        }
        TreeAction::BeginInlineCreate(args) => begin_inline_create(state, args),
        TreeAction::AddInlineCreatePlaceholder(args) => {
            add_inline_create_placeholder(state, args, ranks)
        }
        TreeAction::ConfirmInlineCreate(args) => confirm_inline_create(state, args),
        TreeAction::CancelInlineCreate => cancel_inline_create(state),
    }
}

/// Applies `action`; a rejected action leaves the state unchanged.
pub fn reduce(state: &TreeState, action: &TreeAction, ranks: &RankAllocator) -> TreeState {
    match try_reduce(state, action, ranks) {
        Ok(next) => next,
        Err(e) => {
            debug!(action = action.name(), error = %e, "action rejected");
            state.clone()
        }
    }
}
