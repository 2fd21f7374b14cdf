//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent graph configuration violations.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("duplicate node: {0}")]
    DuplicateNode(String),

    #[error("unknown node: {0}")]
    UnknownNode(String),

    #[error("cannot link node to itself: {0}")]
    SelfLink(String),

    #[error("conflicting edge {a} <-> {b}: {reason}")]
    ConflictingEdge { a: String, b: String, reason: String },

    #[error("main project not registered: {main}")]
    InvalidRootConfiguration { main: String },

    #[error("only one root node may be set (already declared: {0})")]
    RootAlreadyDeclared(String),

    #[error("cannot add extra mappings to root node: {0}")]
    RootExtraMappings(String),

    #[error("no declared tree node at index {0}")]
    InvalidTreeIndex(String),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
