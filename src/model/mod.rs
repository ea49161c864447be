//! Message-flow model: kinds, markers, handlers and creators.
//!
//! These are plain values produced by the resolvers. They hold index ids
//! rather than references so they can be cached and shared across threads.

mod creator;
mod handler;
mod kind;
mod marker;

pub use creator::{Creator, CreatorOrigin};
pub use handler::Handler;
pub use kind::{FrameworkVersion, Marker, MessageCategory, MessageKind};
pub use marker::ResolvedMarker;

/// Last segment of a qualified name (`pkg.sub.Type` → `Type`).
pub fn short_name(qualified_name: &str) -> &str {
    qualified_name
        .rsplit_once('.')
        .map_or(qualified_name, |(_, short)| short)
}

/// Everything before the last segment (`pkg.sub.Type` → `pkg.sub`).
pub fn namespace_of(qualified_name: &str) -> &str {
    qualified_name
        .rsplit_once('.')
        .map_or("", |(namespace, _)| namespace)
}
