//! Business Services
//!
//! This module contains the repository layer of TreeCache:
//!
//! - `Repository` - the CRUD contract shared by both tiers
//! - `TreeRepository` - single-tier engine enforcing the tree invariants
//! - `CachedTreeRepository` - cache tier with lazy loading, orphan
//!   relinking, and the apply/reset reconciliation protocol
//! - `TreeError` - the error taxonomy raised by all of the above
//!
//! Repositories coordinate between the storage layer and the adapter
//! layer, implementing the change-tracking rules and the two-tier commit.

pub mod cached_tree_repository;
pub mod error;
pub mod repository;
pub mod tree_repository;

pub use cached_tree_repository::CachedTreeRepository;
pub use error::TreeError;
pub use repository::Repository;
pub use tree_repository::TreeRepository;
