//! Error types.
//!
//! Queries against the engine never fail; anomalies degrade to fewer or less
//! precise results. Errors only arise from misuse of the in-memory index
//! registration API and from invalid configuration.

use thiserror::Error;

use crate::base::{CallSiteId, DeclId, ExprId, FileId};

/// Errors raised while registering facts in an [`InMemoryIndex`](crate::index::InMemoryIndex).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndexError {
    /// File id was never handed out by this index.
    #[error("Unknown file: {0:?}")]
    UnknownFile(FileId),

    /// Declaration id was never handed out by this index.
    #[error("Unknown declaration: {0:?}")]
    UnknownDeclaration(DeclId),

    /// Declaration belonged to a file that has since been removed.
    #[error("Stale declaration: {0:?}")]
    StaleDeclaration(DeclId),

    /// Call site id was never handed out by this index.
    #[error("Unknown call site: {0:?}")]
    UnknownCallSite(CallSiteId),

    /// Expression id was never handed out by this index.
    #[error("Unknown expression: {0:?}")]
    UnknownExpression(ExprId),

    /// Members and supertypes can only be attached to type declarations.
    #[error("{0:?} is not a type declaration")]
    NotAType(DeclId),

    /// Call sites must be enclosed by a method or constructor.
    #[error("{0:?} is not a method or constructor")]
    NotCallable(DeclId),

    /// Qualified names must be non-empty and dot-separated identifiers.
    #[error("Invalid qualified name: '{0}'")]
    InvalidName(String),
}

/// Errors raised by [`EngineConfig::validate`](crate::config::EngineConfig::validate).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max_attribution_depth must be at least 1")]
    ZeroDepth,

    #[error("at least one scheduler interface is required")]
    NoSchedulerInterfaces,

    #[error("Missing required {kind}")]
    Missing { kind: &'static str },
}

pub type IndexResult<T> = Result<T, IndexError>;

/// Errors raised while rendering a [`MessageFlowReport`](crate::report::MessageFlowReport).
#[cfg(feature = "export")]
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
