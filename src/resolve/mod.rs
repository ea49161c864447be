//! Resolvers: the message-flow graph computed from the symbol index.
//!
//! ## Resolution Layers
//!
//! ```text
//! markers        ← marker forest per framework annotation (BFS over meta-annotations)
//!     │
//!     ▼
//! handlers       ← annotated declarations → typed Handler records (per-kind builders)
//!     │
//!     ▼
//! attribution    ← call site → enclosing handler(s), bounded caller walk
//!     │
//!     ▼
//! creators       ← construction sites of compatible payloads
//! deadlines      ← scheduling / cancellation calls keyed by name and payload
//! ```
//!
//! Every resolver is a short-lived view over a [`ResolveContext`]: the index,
//! the configuration and the engine-owned caches. Results are cached per
//! index [`Revision`](crate::base::Revision).

mod annotations;
mod attribution;
mod builders;
mod compat;
mod creators;
mod deadlines;
mod handlers;
mod markers;

use std::sync::Arc;

pub use annotations::AnnotationReader;
pub use attribution::CallerWalk;
pub use compat::TypeCompat;
pub use creators::CreatorResolver;
pub use deadlines::{DeadlineMethodResolver, DeadlineReferenceResolver, SchedulerMethods};
pub use handlers::{HandlerResolver, HandlerSet};
pub use markers::{MarkerForest, MarkerResolver};

use crate::cache::{CachedValue, QueryCache};
use crate::config::EngineConfig;
use crate::index::SymbolIndex;
use crate::model::Creator;

/// Caches owned by one engine instance.
#[derive(Debug)]
pub struct ResolverCaches {
    pub(crate) markers: CachedValue<Arc<MarkerForest>>,
    pub(crate) handlers: CachedValue<Arc<HandlerSet>>,
    pub(crate) creators: QueryCache<String, Arc<[Creator]>>,
    /// Keyed by the library revision only.
    pub(crate) library_schedulers: CachedValue<Arc<SchedulerMethods>>,
    pub(crate) project_schedulers: CachedValue<Arc<SchedulerMethods>>,
    pub(crate) deadline_creators: CachedValue<Arc<[Creator]>>,
}

impl Default for ResolverCaches {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolverCaches {
    pub fn new() -> Self {
        Self {
            markers: CachedValue::new("markers"),
            handlers: CachedValue::new("handlers"),
            creators: QueryCache::new("creators"),
            library_schedulers: CachedValue::new("library_schedulers"),
            project_schedulers: CachedValue::new("project_schedulers"),
            deadline_creators: CachedValue::new("deadline_creators"),
        }
    }

    /// Drop every cached result, library-derived ones included.
    pub fn clear(&self) {
        self.markers.clear();
        self.handlers.clear();
        self.creators.clear();
        self.library_schedulers.clear();
        self.project_schedulers.clear();
        self.deadline_creators.clear();
    }
}

/// Everything a resolver needs, borrowed from the engine.
pub struct ResolveContext<'a, I: SymbolIndex + ?Sized> {
    pub index: &'a I,
    pub config: &'a EngineConfig,
    pub caches: &'a ResolverCaches,
}

// Manual impls: derive would require `I: Clone`.
impl<I: SymbolIndex + ?Sized> Clone for ResolveContext<'_, I> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<I: SymbolIndex + ?Sized> Copy for ResolveContext<'_, I> {}

impl<'a, I: SymbolIndex + ?Sized> ResolveContext<'a, I> {
    pub fn new(index: &'a I, config: &'a EngineConfig, caches: &'a ResolverCaches) -> Self {
        Self {
            index,
            config,
            caches,
        }
    }

    pub fn markers(self) -> MarkerResolver<'a, I> {
        MarkerResolver::new(self)
    }

    pub fn handlers(self) -> HandlerResolver<'a, I> {
        HandlerResolver::new(self)
    }

    pub fn creators(self) -> CreatorResolver<'a, I> {
        CreatorResolver::new(self)
    }

    pub fn deadline_methods(self) -> DeadlineMethodResolver<'a, I> {
        DeadlineMethodResolver::new(self)
    }

    pub fn deadline_references(self) -> DeadlineReferenceResolver<'a, I> {
        DeadlineReferenceResolver::new(self)
    }

    pub fn compat(self) -> TypeCompat<'a, I> {
        TypeCompat::new(self.index)
    }
}
