//! MessageFlowEngine: the query surface over a symbol index.
//!
//! The engine owns the index, the configuration and every cache. Queries take
//! `&self` and may run from several threads at once; index mutation goes
//! through [`MessageFlowEngine::index_mut`], which advances the revision and
//! thereby invalidates cached results.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = MessageFlowEngine::new(InMemoryIndex::new());
//!
//! // Register facts
//! let file = engine.index_mut().add_file(Origin::Project);
//! let cmd = engine.index_mut().add_class(file, "com.example.PlaceOrder")?;
//!
//! // Query
//! let handlers = engine.find_handlers("com.example.PlaceOrder", None);
//! let creators = engine.find_creators("com.example.PlaceOrder");
//! ```

use std::sync::Arc;

use crate::base::{DeclId, Revision};
use crate::config::EngineConfig;
use crate::error::ConfigError;
use crate::index::SymbolIndex;
use crate::model::{Creator, Handler, Marker, MessageCategory, MessageKind, ResolvedMarker};
use crate::resolve::{ResolveContext, ResolverCaches};

/// Resolves handlers and creators of messages found in a [`SymbolIndex`].
pub struct MessageFlowEngine<I> {
    index: I,
    config: EngineConfig,
    caches: ResolverCaches,
}

impl<I: SymbolIndex> MessageFlowEngine<I> {
    /// Engine with the default configuration.
    pub fn new(index: I) -> Self {
        Self {
            index,
            config: EngineConfig::default(),
            caches: ResolverCaches::new(),
        }
    }

    pub fn with_config(index: I, config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            index,
            config,
            caches: ResolverCaches::new(),
        })
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    /// Mutable access to the index. Changes made through it are picked up
    /// on the next query via the index revision.
    pub fn index_mut(&mut self) -> &mut I {
        &mut self.index
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn revision(&self) -> Revision {
        self.index.revision()
    }

    /// Borrowed view handed to the resolvers.
    pub fn context(&self) -> ResolveContext<'_, I> {
        ResolveContext::new(&self.index, &self.config, &self.caches)
    }

    /// Drop every cached result, including library-derived ones.
    pub fn clear_caches(&self) {
        self.caches.clear();
    }

    // ------------------------------------------------------------------------
    // Handlers
    // ------------------------------------------------------------------------

    /// Handlers compatible with `payload`, optionally of one kind only.
    pub fn find_handlers(&self, payload: &str, kind: Option<MessageKind>) -> Vec<Handler> {
        self.context().handlers().find_for_payload(payload, kind)
    }

    pub fn find_handlers_in_category(
        &self,
        payload: &str,
        category: MessageCategory,
    ) -> Vec<Handler> {
        self.context()
            .handlers()
            .find_for_payload_in_category(payload, category)
    }

    /// Every handler in the index. Shared until the revision changes.
    pub fn find_all_handlers(&self) -> Arc<[Handler]> {
        self.context().handlers().find_all()
    }

    pub fn handler_by_declaration(&self, declaration: DeclId) -> Option<Handler> {
        self.context().handlers().find_by_declaration(declaration)
    }

    // ------------------------------------------------------------------------
    // Creators
    // ------------------------------------------------------------------------

    pub fn find_creators(&self, payload: &str) -> Vec<Creator> {
        self.context().creators().find_for_payload(payload).to_vec()
    }

    /// Every creator of every handled payload plus all deadline sites.
    pub fn find_all_creators(&self) -> Vec<Creator> {
        self.context().creators().find_all()
    }

    /// Scheduling and cancellation sites of deadlines.
    pub fn deadline_creators(&self) -> Arc<[Creator]> {
        self.context().deadline_references().creators()
    }

    // ------------------------------------------------------------------------
    // Markers and types
    // ------------------------------------------------------------------------

    pub fn resolve_markers(&self, kind: MessageKind) -> Vec<Arc<ResolvedMarker>> {
        self.context().markers().resolve_markers(kind)
    }

    pub fn markers_for(&self, marker: Marker) -> Vec<Arc<ResolvedMarker>> {
        self.context().markers().markers_for(marker)
    }

    /// True if a value of `source` can be used as `target`.
    pub fn assignable(&self, target: &str, source: &str) -> bool {
        self.context().compat().assignable(target, source)
    }
}

impl<I: SymbolIndex + Default> Default for MessageFlowEngine<I> {
    fn default() -> Self {
        Self::new(I::default())
    }
}
