//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (NodeApi) but are themselves
//! concrete structs, not traits.

mod outline;

pub use outline::OutlineService;
