//! Shared test doubles for the replication integration tests.
//!
//! - `MemoryNetwork`: directory, storage, record store and metadata generator
//!   in one, with per-member failure injection
//! - `MemoryRelations`: relation capability that records lookups and links

pub mod memory;

pub use memory::*;
