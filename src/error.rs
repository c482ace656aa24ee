//! Error types for the blackboard.

use thiserror::Error;

/// Errors surfaced by blackboard operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlackboardError {
    /// A data operation was called while no blackboard instance is live.
    ///
    /// Callers are expected to guard with [`is_ready`](crate::is_ready) or
    /// to have called [`create`](crate::create) during startup.
    #[error("Blackboard is not initialized: call create() before any data operation")]
    NotInitialized,

    /// A read targeted a key that was never written for the requested type.
    ///
    /// The key may well exist in another type's partition; reads only see
    /// the partition of the type they are parameterized with.
    #[error("No value of type {type_name} stored under key {key:?}")]
    KeyNotFound {
        /// The key that was looked up.
        key: String,
        /// The requested value type.
        type_name: &'static str,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BlackboardError>;
