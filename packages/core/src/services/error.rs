//! Service Layer Error Types
//!
//! This module defines the error taxonomy for repository operations. All
//! errors are raised synchronously by the operation that detects them and
//! are never retried internally; they are programming or data errors for
//! the caller to handle, not transient faults.

use crate::models::NodeId;
use thiserror::Error;

/// Repository operation errors.
///
/// Three families:
///
/// - not-found: [`TreeError::NotFound`], [`TreeError::MissingId`]
/// - invalid argument: [`TreeError::RootAlreadyExists`],
///   [`TreeError::ParentNotFound`], [`TreeError::AlreadyExists`]
/// - invalid operation: [`TreeError::NodeDeleted`] - the node's deletion is
///   already committed and it can no longer be mutated
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// Node id absent from the addressed store
    #[error("node not found: {id}")]
    NotFound { id: NodeId },

    /// The argument carries no id yet
    #[error("node has no identifier assigned")]
    MissingId,

    /// A second root was attempted
    #[error("a root node already exists")]
    RootAlreadyExists,

    /// Referenced parent does not exist in the addressed store
    #[error("parent node not found: {parent_id}")]
    ParentNotFound { parent_id: NodeId },

    /// The id is already taken in the addressed store
    #[error("node already exists: {id}")]
    AlreadyExists { id: NodeId },

    /// Mutation attempted against a node whose deletion is committed
    /// (`is_deleted` with state `Unchanged`)
    #[error("node {id} is deleted and the deletion is already committed")]
    NodeDeleted { id: NodeId },
}

impl TreeError {
    /// Create a node not found error
    pub fn not_found(id: NodeId) -> Self {
        Self::NotFound { id }
    }

    /// Create a parent not found error
    pub fn parent_not_found(parent_id: NodeId) -> Self {
        Self::ParentNotFound { parent_id }
    }

    /// Create an already exists error
    pub fn already_exists(id: NodeId) -> Self {
        Self::AlreadyExists { id }
    }

    /// Create a committed-deletion error
    pub fn node_deleted(id: NodeId) -> Self {
        Self::NodeDeleted { id }
    }
}
