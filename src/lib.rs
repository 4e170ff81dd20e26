//! In-memory ordered-tree state engine.
//!
//! Siblings are ordered by a numeric rank rather than by position. The
//! [`domain`] layer holds the pure data model and transitions, [`application`]
//! the running tree instances, their registry and the optimistic edit workflow,
//! and [`infrastructure`] the remote store boundary.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use application::{TreeHandle, TreeRegistry, TreeStore};
pub use domain::{Node, TreeAction, TreeState};
