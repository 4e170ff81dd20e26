//! Structural mutations and the inline create session.
//!
//! Every function takes the current state by reference and returns a new,
//! fully rebuilt state or a [`DomainError`]. Nothing is changed in place.

use tracing::{debug, instrument, warn};

use crate::domain::entities::{
    BeginInlineCreate, ConfirmInlineCreate, Direction, InlineCreateSession, InlinePlaceholder, Node,
    NodeStatus,
};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::rank::RankAllocator;
use crate::domain::state::TreeState;

fn require<'a>(state: &'a TreeState, id: &str) -> DomainResult<&'a Node> {
    state
        .node(id)
        .ok_or_else(|| DomainError::NodeNotFound(id.to_string()))
}

/// Rejects a reparent that would put `id` on its own ancestor chain.
fn ensure_acyclic(state: &TreeState, id: &str, new_parent: Option<&str>) -> DomainResult<()> {
    match new_parent {
        Some(parent) if parent == id || state.is_ancestor(id, parent) => {
            Err(DomainError::CycleDetected {
                id: id.to_string(),
                new_parent: parent.to_string(),
            })
        }
        _ => Ok(()),
    }
}

fn rank_of(nodes: &[Node], id: Option<&str>) -> Option<f64> {
    let id = id?;
    nodes.iter().find(|n| n.id == id).map(|n| n.rank)
}

/// Re-spaces the sibling set of `parent`, leaving `moving` untouched.
fn renormalize_siblings(nodes: &mut [Node], ranks: &RankAllocator, parent: Option<&str>, moving: &str) {
    let mut members: Vec<usize> = nodes
        .iter()
        .enumerate()
        .filter(|(_, n)| n.parent_id.as_deref() == parent && n.id != moving)
        .map(|(i, _)| i)
        .collect();
    members.sort_by(|&a, &b| nodes[a].rank.total_cmp(&nodes[b].rank));
    let spaced = ranks.renormalize(members.len());
    for (i, rank) in members.into_iter().zip(spaced) {
        nodes[i].rank = rank;
    }
}

/// Rank for the slot between `prev` and `next` in `parent`'s sibling set.
///
/// Falls back to re-spacing the sibling set when the gap is exhausted.
fn allocate_slot(
    nodes: &mut [Node],
    ranks: &RankAllocator,
    parent: Option<&str>,
    moving: &str,
    prev: Option<&str>,
    next: Option<&str>,
) -> f64 {
    if let Some(rank) = ranks.rank_for_slot(rank_of(nodes, prev), rank_of(nodes, next)) {
        return rank;
    }
    warn!(
        parent = parent.unwrap_or("<root>"),
        moving, "rank gap exhausted, renormalizing sibling ranks"
    );
    renormalize_siblings(nodes, ranks, parent, moving);
    let (lo, hi) = (rank_of(nodes, prev), rank_of(nodes, next));
    ranks
        .rank_for_slot(lo, hi)
        .or(lo.map(|a| ranks.after(a)))
        .unwrap_or(ranks.base_rank)
}

/// Id of the last child of `parent`, ignoring `exclude`.
fn last_child(state: &TreeState, parent: Option<&str>, exclude: &str) -> Option<String> {
    state
        .children_of(parent)
        .into_iter()
        .filter(|n| n.id != exclude)
        .last()
        .map(|n| n.id.clone())
}

/// The pending placeholder keyed by `temp_id`, if one is present.
fn placeholder<'a>(state: &'a TreeState, temp_id: &str) -> Option<&'a Node> {
    state.nodes.iter().find(|n| n.id == temp_id && n.is_pending())
}

fn is_placeholder(node: &Node, temp_id: &str) -> bool {
    node.id == temp_id && node.is_pending()
}

fn set_placement(nodes: &mut [Node], id: &str, parent: Option<String>, rank: f64) {
    if let Some(node) = nodes.iter_mut().find(|n| n.id == id) {
        node.parent_id = parent;
        node.rank = rank;
    }
}

/// Moves `id` under its previous sibling, after that sibling's last child.
#[instrument(level = "debug", skip(state, ranks))]
pub fn indent_node(state: &TreeState, id: &str, ranks: &RankAllocator) -> DomainResult<TreeState> {
    let node = require(state, id)?;
    let siblings = state.children_of(node.parent_id.as_deref());
    let pos = siblings
        .iter()
        .position(|n| n.id == id)
        .ok_or_else(|| DomainError::NodeNotFound(id.to_string()))?;
    if pos == 0 {
        return Err(DomainError::AlreadyFirst(id.to_string()));
    }
    let new_parent = siblings[pos - 1].id.clone();
    ensure_acyclic(state, id, Some(new_parent.as_str()))?;

    let after = last_child(state, Some(new_parent.as_str()), id);
    let mut nodes = state.nodes.clone();
    let rank = allocate_slot(&mut nodes, ranks, Some(new_parent.as_str()), id, after.as_deref(), None);
    set_placement(&mut nodes, id, Some(new_parent.clone()), rank);
    debug!(id, parent = %new_parent, rank, "indented");

    let mut next = state.clone();
    next.expanded_ids.insert(new_parent);
    Ok(next.with_nodes(nodes))
}

/// Moves `id` up one level, directly after its former parent.
#[instrument(level = "debug", skip(state, ranks))]
pub fn outdent_node(state: &TreeState, id: &str, ranks: &RankAllocator) -> DomainResult<TreeState> {
    let node = require(state, id)?;
    let parent = node
        .parent_id
        .as_deref()
        .and_then(|pid| state.node(pid))
        .ok_or_else(|| DomainError::AlreadyRoot(id.to_string()))?;
    let new_parent = parent.parent_id.clone();
    ensure_acyclic(state, id, new_parent.as_deref())?;

    let parent_siblings = state.children_of(new_parent.as_deref());
    let following = parent_siblings
        .iter()
        .skip_while(|n| n.id != parent.id)
        .nth(1)
        .map(|n| n.id.clone());

    let mut nodes = state.nodes.clone();
    let rank = allocate_slot(
        &mut nodes,
        ranks,
        new_parent.as_deref(),
        id,
        Some(parent.id.as_str()),
        following.as_deref(),
    );
    set_placement(&mut nodes, id, new_parent.clone(), rank);
    debug!(id, parent = ?new_parent, rank, "outdented");
    Ok(state.clone().with_nodes(nodes))
}

/// Moves `id` one position up or down among its siblings.
#[instrument(level = "debug", skip(state, ranks))]
pub fn move_node(
    state: &TreeState,
    id: &str,
    direction: Direction,
    ranks: &RankAllocator,
) -> DomainResult<TreeState> {
    let node = require(state, id)?;
    let parent = node.parent_id.clone();
    let siblings = state.children_of(parent.as_deref());
    let pos = siblings
        .iter()
        .position(|n| n.id == id)
        .ok_or_else(|| DomainError::NodeNotFound(id.to_string()))?;
    let boundary = || DomainError::AtBoundary {
        id: id.to_string(),
        direction: direction.to_string(),
    };

    let (prev, next) = match direction {
        Direction::Up => {
            if pos == 0 {
                return Err(boundary());
            }
            let prev = pos.checked_sub(2).map(|i| siblings[i].id.clone());
            (prev, Some(siblings[pos - 1].id.clone()))
        }
        Direction::Down => {
            if pos + 1 >= siblings.len() {
                return Err(boundary());
            }
            let next = siblings.get(pos + 2).map(|n| n.id.clone());
            (Some(siblings[pos + 1].id.clone()), next)
        }
    };

    let mut nodes = state.nodes.clone();
    let rank = allocate_slot(&mut nodes, ranks, parent.as_deref(), id, prev.as_deref(), next.as_deref());
    set_placement(&mut nodes, id, parent, rank);
    debug!(id, %direction, rank, "moved");
    Ok(state.clone().with_nodes(nodes))
}

/// Like [`move_node`], or sets the rank verbatim when `target_rank` is given.
///
/// The explicit rank mirrors a value already confirmed by the remote store.
#[instrument(level = "debug", skip(state, ranks))]
pub fn reorder_node(
    state: &TreeState,
    id: &str,
    direction: Direction,
    target_rank: Option<f64>,
    ranks: &RankAllocator,
) -> DomainResult<TreeState> {
    let Some(rank) = target_rank else {
        return move_node(state, id, direction, ranks);
    };
    require(state, id)?;
    if !rank.is_finite() {
        return Err(DomainError::InvalidRank {
            id: id.to_string(),
            rank,
        });
    }
    let mut nodes = state.nodes.clone();
    if let Some(node) = nodes.iter_mut().find(|n| n.id == id) {
        node.rank = rank;
    }
    Ok(state.clone().with_nodes(nodes))
}

/// Moves `id` under `new_parent` (None for root), after the last existing child.
#[instrument(level = "debug", skip(state, ranks))]
pub fn reparent_node(
    state: &TreeState,
    id: &str,
    new_parent: Option<&str>,
    ranks: &RankAllocator,
) -> DomainResult<TreeState> {
    require(state, id)?;
    if let Some(parent) = new_parent {
        require(state, parent)?;
    }
    ensure_acyclic(state, id, new_parent)?;

    let after = last_child(state, new_parent, id);
    let mut nodes = state.nodes.clone();
    let rank = allocate_slot(&mut nodes, ranks, new_parent, id, after.as_deref(), None);
    set_placement(&mut nodes, id, new_parent.map(str::to_string), rank);
    Ok(state.clone().with_nodes(nodes))
}

/// Opens an inline create session. Only one may be open per tree.
pub fn begin_inline_create(state: &TreeState, args: &BeginInlineCreate) -> DomainResult<TreeState> {
    if let Some(open) = &state.inline_create {
        return Err(DomainError::SessionAlreadyOpen(open.temp_id.clone()));
    }
    if state.contains(&args.temp_id) {
        return Err(DomainError::DuplicateId(args.temp_id.clone()));
    }
    let mut next = state.clone();
    next.inline_create = Some(InlineCreateSession {
        temp_id: args.temp_id.clone(),
        source_id: args.source_id.clone(),
        after_id: None,
    });
    Ok(next)
}

/// Inserts the pending placeholder for the open session and selects it.
#[instrument(level = "debug", skip(state, args, ranks), fields(after_id = ?args.after_id))]
pub fn add_inline_create_placeholder(
    state: &TreeState,
    args: &InlinePlaceholder,
    ranks: &RankAllocator,
) -> DomainResult<TreeState> {
    let session = state.inline_create.as_ref().ok_or(DomainError::NoOpenSession)?;
    let temp_id = session.temp_id.clone();
    // Only an earlier placeholder of this session may be replaced.
    if state.nodes.iter().any(|n| n.id == temp_id && !n.is_pending()) {
        return Err(DomainError::DuplicateId(temp_id));
    }
    let mut nodes: Vec<Node> = state
        .nodes
        .iter()
        .filter(|n| !is_placeholder(n, &temp_id))
        .cloned()
        .collect();

    let (parent, prev, next) = match args.after_id.as_deref() {
        Some(after_id) => {
            if after_id == temp_id {
                return Err(DomainError::InvalidAnchor(temp_id));
            }
            let after = require(state, after_id)?;
            let parent = after.parent_id.clone();
            let following = state
                .children_of(parent.as_deref())
                .into_iter()
                .filter(|n| n.id != temp_id)
                .skip_while(|n| n.id != after_id)
                .nth(1)
                .map(|n| n.id.clone());
            (parent, Some(after_id.to_string()), following)
        }
        None => {
            let parent = args.node.parent_id.clone();
            if let Some(pid) = parent.as_deref() {
                require(state, pid)?;
            }
            let after = last_child(state, parent.as_deref(), &temp_id);
            (parent, after, None)
        }
    };
    ensure_acyclic(state, &temp_id, parent.as_deref())?;

    let rank = allocate_slot(&mut nodes, ranks, parent.as_deref(), &temp_id, prev.as_deref(), next.as_deref());
    let placeholder = Node {
        id: temp_id.clone(),
        parent_id: parent.clone(),
        rank,
        status: NodeStatus::Pending,
        ..args.node.clone()
    };
    nodes.push(placeholder);
    debug!(temp_id = %temp_id, rank, "placeholder added");

    let mut next_state = state.clone();
    next_state.selected_id = Some(temp_id);
    if let Some(pid) = parent {
        next_state.expanded_ids.insert(pid);
    }
    if let Some(open) = next_state.inline_create.as_mut() {
        open.after_id = args.after_id.clone();
    }
    Ok(next_state.with_nodes(nodes))
}

/// Promotes the placeholder to its permanent id and closes the session.
#[instrument(level = "debug", skip(state))]
pub fn confirm_inline_create(state: &TreeState, args: &ConfirmInlineCreate) -> DomainResult<TreeState> {
    let session = state.inline_create.as_ref().ok_or(DomainError::NoOpenSession)?;
    if session.temp_id != args.temp_id {
        return Err(DomainError::SessionMismatch {
            expected: session.temp_id.clone(),
            actual: args.temp_id.clone(),
        });
    }
    let (temp_id, node_id) = (args.temp_id.as_str(), args.node_id.as_str());
    let pending = placeholder(state, temp_id);
    let has_placeholder = pending.is_some();
    let lifted_parent = pending.and_then(|p| p.parent_id.clone());

    let already_loaded = temp_id != node_id && state.contains(node_id);
    let mut nodes: Vec<Node> = state
        .nodes
        .iter()
        .filter(|n| !(already_loaded && is_placeholder(n, temp_id)))
        .cloned()
        .collect();
    for node in nodes.iter_mut() {
        if is_placeholder(node, temp_id) {
            node.id = node_id.to_string();
            node.status = NodeStatus::Confirmed;
        }
        if has_placeholder && node.parent_id.as_deref() == Some(temp_id) {
            // A loaded node_id may itself sit below the placeholder.
            let would_cycle = already_loaded && (node.id == node_id || state.is_ancestor(&node.id, node_id));
            node.parent_id = if would_cycle {
                lifted_parent.clone()
            } else {
                Some(node_id.to_string())
            };
        }
    }
    if already_loaded {
        debug!(temp_id, node_id, "permanent node already present, dropping placeholder");
    }

    let mut next = state.clone();
    next.inline_create = None;
    if next.selected_id.as_deref() == Some(temp_id) {
        next.selected_id = Some(node_id.to_string());
    }
    if next.expanded_ids.remove(temp_id) {
        next.expanded_ids.insert(node_id.to_string());
    }
    Ok(next.with_nodes(nodes))
}

/// Drops the open session together with its placeholder.
///
/// Children moved under the placeholder are lifted to the placeholder's parent.
#[instrument(level = "debug", skip(state))]
pub fn cancel_inline_create(state: &TreeState) -> DomainResult<TreeState> {
    let session = state.inline_create.as_ref().ok_or(DomainError::NoOpenSession)?;
    let temp_id = session.temp_id.as_str();

    let mut nodes = state.nodes.clone();
    if let Some(pending) = placeholder(state, temp_id) {
        let lifted_parent = pending.parent_id.clone();
        nodes.retain(|n| !is_placeholder(n, temp_id));
        for node in nodes.iter_mut() {
            if node.parent_id.as_deref() == Some(temp_id) {
                node.parent_id = lifted_parent.clone();
            }
        }
    }

    let mut next = state.clone();
    if next.selected_id.as_deref() == Some(temp_id) {
        next.selected_id = [&session.after_id, &session.source_id]
            .into_iter()
            .flatten()
            .find(|id| state.contains(id))
            .cloned();
    }
    next.expanded_ids.remove(temp_id);
    next.inline_create = None;
    Ok(next.with_nodes(nodes))
}
