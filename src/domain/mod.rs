//! Domain layer: tree entities, rank arithmetic and pure state transitions
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod entities;
pub mod error;
pub mod mutations;
pub mod rank;
pub mod reducer;
pub mod state;

pub use arena::{ArenaNode, NodeArena};
pub use builder::{build_tree, flatten_visible, BuildOptions, TreeNode};
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use mutations::{
    add_inline_create_placeholder, begin_inline_create, cancel_inline_create, confirm_inline_create,
    indent_node, move_node, outdent_node, reorder_node, reparent_node,
};
pub use rank::{compute_middle_rank, compute_rank_after, compute_rank_before, RankAllocator};
pub use reducer::{reduce, try_reduce, TreeAction};
pub use state::TreeState;
