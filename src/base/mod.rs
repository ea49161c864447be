//! Foundation types for the msgflow engine.
//!
//! This module provides fundamental types used throughout the resolver:
//! - [`FileId`], [`DeclId`], [`CallSiteId`], [`ExprId`] - Opaque index handles
//! - [`Revision`] - Source/library generation pair used for cache invalidation
//! - [`TextRange`], [`TextSize`] - Source positions (byte offsets)
//!
//! This module has NO dependencies on other msgflow modules.

mod ids;
mod revision;

pub use ids::{CallSiteId, DeclId, ExprId, FileId};
pub use revision::{Generation, Revision};

// Re-export text-size types for convenience
pub use text_size::{TextRange, TextSize};
