//! Infrastructure layer: remote API boundary and its in-memory implementation
//!
//! This layer implements I/O boundary traits.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{ApiError, ApiResult};
pub use memory::InMemoryNodeApi;
pub use traits::NodeApi;
