//! Handler discovery and lookup.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use super::builders::{BuildContext, builder_for};
use super::{AnnotationReader, ResolveContext};
use crate::base::DeclId;
use crate::index::{DeclKind, SymbolIndex};
use crate::model::{Handler, Marker, MessageCategory, MessageKind};

/// Every handler in the index at one revision.
#[derive(Debug, Default)]
pub struct HandlerSet {
    handlers: Arc<[Handler]>,
    by_declaration: FxHashMap<DeclId, usize>,
}

impl HandlerSet {
    fn new(handlers: Vec<Handler>) -> Self {
        let by_declaration = handlers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.declaration, i))
            .collect();
        Self {
            handlers: handlers.into(),
            by_declaration,
        }
    }

    pub fn handlers(&self) -> &Arc<[Handler]> {
        &self.handlers
    }

    pub fn get(&self, declaration: DeclId) -> Option<&Handler> {
        self.by_declaration
            .get(&declaration)
            .and_then(|&i| self.handlers.get(i))
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Finds handlers, cached per revision.
pub struct HandlerResolver<'a, I: SymbolIndex + ?Sized> {
    ctx: ResolveContext<'a, I>,
}

impl<'a, I: SymbolIndex + ?Sized> HandlerResolver<'a, I> {
    pub fn new(ctx: ResolveContext<'a, I>) -> Self {
        Self { ctx }
    }

    pub fn set(&self) -> Arc<HandlerSet> {
        let revision = self.ctx.index.revision();
        self.ctx
            .caches
            .handlers
            .get_or_compute(revision, || Arc::new(self.compute()))
    }

    /// All valid handlers. Repeated calls at one revision return the same
    /// list as long as no declaration went stale in between.
    pub fn find_all(&self) -> Arc<[Handler]> {
        let index = self.ctx.index;
        let handlers = self.set().handlers().clone();
        if handlers.iter().all(|h| index.is_valid(h.declaration)) {
            return handlers;
        }
        handlers
            .iter()
            .filter(|h| index.is_valid(h.declaration))
            .cloned()
            .collect()
    }

    /// Handlers whose payload is compatible with `type_name`, optionally
    /// restricted to one kind. Deadline handlers also match by deadline name.
    pub fn find_for_payload(&self, type_name: &str, kind: Option<MessageKind>) -> Vec<Handler> {
        self.matching(type_name, |h| kind.is_none_or(|k| h.kind == k))
    }

    pub fn find_for_payload_in_category(
        &self,
        type_name: &str,
        category: MessageCategory,
    ) -> Vec<Handler> {
        self.matching(type_name, |h| h.category() == category)
    }

    /// The handler backed by `declaration`, if it is one.
    pub fn find_by_declaration(&self, declaration: DeclId) -> Option<Handler> {
        if !self.ctx.index.is_valid(declaration) {
            return None;
        }
        self.set().get(declaration).cloned()
    }

    fn matching(&self, type_name: &str, filter: impl Fn(&Handler) -> bool) -> Vec<Handler> {
        let index = self.ctx.index;
        let known = !index.resolve_type(type_name).is_empty();
        let compat = self.ctx.compat();
        let set = self.set();

        let found: Vec<Handler> = set
            .handlers()
            .iter()
            .filter(|h| filter(*h))
            .filter(|h| {
                (h.kind == MessageKind::Deadline && h.group_label == type_name)
                    || (known && compat.compatible(type_name, &h.payload))
            })
            .filter(|h| index.is_valid(h.declaration))
            .cloned()
            .collect();

        tracing::debug!(
            "[HANDLERS] {} handler(s) for '{}'",
            found.len(),
            type_name
        );
        found
    }

    fn compute(&self) -> HandlerSet {
        let index = self.ctx.index;
        let forest = self.ctx.markers().forest();
        let cx = BuildContext {
            index,
            config: self.ctx.config,
            reader: AnnotationReader::new(index, &forest),
        };

        let mut seen: FxHashSet<DeclId> = FxHashSet::default();
        let mut handlers = Vec::new();

        for kind in MessageKind::ALL {
            let build = builder_for::<I>(kind);
            for resolved in forest.markers(kind.marker()) {
                for id in index.find_declarations_annotated_with(&resolved.qualified_name) {
                    if seen.contains(&id) {
                        continue;
                    }
                    let Some(decl) = index.declaration(id) else {
                        continue;
                    };
                    if let Some(handler) = build(&cx, decl) {
                        seen.insert(id);
                        handlers.push(handler);
                    }
                }
            }
        }

        for resolved in forest.markers(Marker::AggregateRoot) {
            for ty in index.find_meta_annotated_by(&resolved.qualified_name) {
                let is_entity = index
                    .declaration(ty)
                    .is_some_and(|d| d.kind == DeclKind::Class);
                if !is_entity {
                    continue;
                }
                for ctor in index.find_constructors(ty) {
                    if seen.contains(&ctor) {
                        continue;
                    }
                    let Some(decl) = index.declaration(ctor) else {
                        continue;
                    };
                    if let Some(handler) = cx.entity_constructor(decl) {
                        seen.insert(ctor);
                        handlers.push(handler);
                    }
                }
            }
        }

        tracing::debug!("[HANDLERS] resolved {} handlers", handlers.len());
        HandlerSet::new(handlers)
    }
}
