//! RL-Vis State: SurrealDB Backend for saved runs
//!
//! This crate provides the persistence layer for RL-Vis. It stores runs as
//! opaque serialized record sets keyed by owner and name, and keeps the
//! owner directory used at the auth boundary.
//!
//! ## Key Components
//!
//! - `RunStore` / `OwnerDirectory`: backend-agnostic async traits
//! - `SurrealRunStore`: SurrealDB implementation (memory, SurrealKV, remote)
//! - `fakes`: in-memory implementations for tests
//! - `StoreConfig`: connection target resolved from the environment

mod error;
pub mod fakes;
mod handle;
mod migrations;
mod schema;
pub mod storage_traits;
pub mod surreal_store;

pub use error::{StateError, StorageError};
pub use handle::{RemoteConfig, StoreConfig, StoreTarget, DEFAULT_LOCAL_PATH};
pub use storage_traits::{
    hash_password, OwnerDirectory, OwnerId, RunId, RunListing, RunStore, StorageResult,
    StoredRun,
};
pub use surreal_store::SurrealRunStore;

/// Result type for connection and schema setup
pub type Result<T> = std::result::Result<T, StateError>;
