//! # msgflow-base
//!
//! Static message-flow resolution for annotation-driven messaging code:
//! which declarations handle a message, where messages are created, and
//! which handler each creation site runs inside.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! engine    → MessageFlowEngine query surface
//!   ↓
//! resolve   → Markers, handlers, creators, deadlines, call attribution
//!   ↓
//! cache     → Revision-keyed query caches
//!   ↓
//! index     → SymbolIndex trait, InMemoryIndex
//!   ↓
//! model     → Handler, Creator, MessageKind, Marker
//!   ↓
//! base      → Primitives (DeclId, CallSiteId, Revision, TextRange)
//! ```

// ============================================================================
// MODULES (dependency order: base → model → index → cache → resolve → engine)
// ============================================================================

/// Foundation types: ids, revisions, text ranges
pub mod base;

/// Message-flow values: kinds, markers, handlers, creators
pub mod model;

/// Symbol index trait and the in-memory reference index
pub mod index;

/// Revision-keyed memoization
pub mod cache;

/// Engine configuration
pub mod config;

/// Error types
pub mod error;

/// Resolvers for markers, handlers, creators and deadlines
pub mod resolve;

/// Query surface
pub mod engine;

/// JSON export of handlers and creators
#[cfg(feature = "export")]
pub mod report;

// Re-export the query surface
pub use config::EngineConfig;
pub use engine::MessageFlowEngine;
pub use error::{ConfigError, IndexError, IndexResult};
pub use index::{InMemoryIndex, SymbolIndex};
pub use model::{
    Creator, CreatorOrigin, FrameworkVersion, Handler, Marker, MessageCategory, MessageKind,
    ResolvedMarker,
};

// Re-export foundation types
pub use base::{CallSiteId, DeclId, ExprId, FileId, Revision, TextRange, TextSize};
