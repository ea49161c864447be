//! Attribution of call sites to the handlers they run inside.
//!
//! A creator is often not called from the handler itself but from a helper
//! the handler calls. The walk goes from the site to its enclosing
//! declaration and, if that is not a handler, on to every caller of it, up to
//! the configured depth.

use rustc_hash::FxHashSet;

use super::HandlerSet;
use crate::base::{CallSiteId, DeclId};
use crate::index::SymbolIndex;
use crate::model::Handler;

pub struct CallerWalk<'a, I: SymbolIndex + ?Sized> {
    index: &'a I,
    handlers: &'a HandlerSet,
    max_depth: usize,
}

impl<'a, I: SymbolIndex + ?Sized> CallerWalk<'a, I> {
    pub fn new(index: &'a I, handlers: &'a HandlerSet, max_depth: usize) -> Self {
        Self {
            index,
            handlers,
            max_depth,
        }
    }

    /// Distinct handlers `site` is reachable from. Empty when none is found
    /// within the depth budget.
    pub fn parent_handlers(&self, site: CallSiteId) -> Vec<Handler> {
        let mut found = Vec::new();
        let mut seen: FxHashSet<DeclId> = FxHashSet::default();
        self.walk(site, 0, &mut found, &mut seen);
        found
    }

    fn walk(
        &self,
        site: CallSiteId,
        depth: usize,
        found: &mut Vec<Handler>,
        seen: &mut FxHashSet<DeclId>,
    ) {
        if depth > self.max_depth {
            tracing::trace!("[CREATORS] depth budget exhausted at {:?}", site);
            return;
        }
        let Some(enclosing) = self.index.enclosing_declaration(site) else {
            return;
        };
        if let Some(handler) = self.handlers.get(enclosing) {
            if self.index.is_valid(enclosing) && seen.insert(enclosing) {
                found.push(handler.clone());
            }
            return;
        }
        for caller in self.index.find_call_sites(enclosing) {
            self.walk(caller, depth + 1, found, seen);
        }
    }
}
