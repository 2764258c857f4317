//! Adapters that live inside the domain crate for convenience.
//!
//! The in-memory store backs unit tests and ephemeral CLI runs. The SQLite
//! adapter lives in its own crate.

pub mod memory_repo;
