//! Storage engine for the HBnB object model.
//! - Whole-store snapshot persistence behind a pluggable backend.
//! - Cascading deletes and relationship traversal over the entity graph.
//! - Transactions that make "mutate + flush" one exclusive unit.

pub mod errors;
pub mod metrics;
pub mod storage;

pub use errors::ServiceError;
pub use storage::{Backend, Index, JsonFileBackend, MemoryBackend, PlaceSearch, Storage, Transaction};
