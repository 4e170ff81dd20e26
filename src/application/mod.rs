//! Application layer: tree stores, the registry and services
//!
//! This layer holds running tree instances and orchestrates domain logic
//! against I/O boundary traits.

pub mod error;
pub mod registry;
pub mod services;
pub mod store;

pub use error::{ApplicationError, ApplicationResult};
pub use registry::TreeRegistry;
pub use store::{TreeHandle, TreeStore};
