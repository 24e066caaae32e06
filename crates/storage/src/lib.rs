//! Persistence of template executions and configuration for Stratus.
//!
//! [`StratusStorage`] is the interface the CLI consumes. Two backends ship
//! with the crate: [`MemoryStorage`] for tests and embedding, and
//! [`FileStorage`] which keeps one JSON document per execution in a
//! directory. Both pass [`conformance::run_conformance_suite`].

pub mod conformance;
mod error;
mod file;
mod memory;
mod traits;

pub use error::StorageError;
pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use traits::{split_config_key, ExecutionFilter, StratusStorage};
