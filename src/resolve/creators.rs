//! Creator discovery: where payloads are constructed or scheduled.

use std::sync::Arc;

use rayon::prelude::*;
use rustc_hash::FxHashSet;

use super::{CallerWalk, DeadlineReferenceResolver, ResolveContext};
use crate::base::{CallSiteId, DeclId};
use crate::index::SymbolIndex;
use crate::model::{Creator, CreatorOrigin, Handler};

/// Substring marking builder-style factory methods.
const BUILDER_NAME: &str = "build";

/// Finds creators for a payload, cached per payload and revision.
pub struct CreatorResolver<'a, I: SymbolIndex + ?Sized> {
    ctx: ResolveContext<'a, I>,
}

impl<'a, I: SymbolIndex + ?Sized> CreatorResolver<'a, I> {
    pub fn new(ctx: ResolveContext<'a, I>) -> Self {
        Self { ctx }
    }

    /// Construction sites of `payload` or any handler payload compatible
    /// with it, plus deadline sites keyed exactly by `payload`.
    pub fn find_for_payload(&self, payload: &str) -> Arc<[Creator]> {
        let revision = self.ctx.index.revision();
        let cached = self
            .ctx
            .caches
            .creators
            .get_or_compute(&payload.to_string(), revision, || {
                self.compute(payload).into()
            });
        retain_live(self.ctx.index, cached)
    }

    /// Creators for every handler payload and every deadline site.
    ///
    /// Expensive; meant for bulk export. Payloads are resolved in parallel.
    pub fn find_all(&self) -> Vec<Creator> {
        let handlers = self.ctx.handlers().find_all();
        let mut payloads: Vec<&str> = Vec::new();
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        for handler in handlers.iter() {
            if seen.insert(handler.payload.as_str()) {
                payloads.push(handler.payload.as_str());
            }
        }

        let ctx = self.ctx;
        let per_payload: Vec<Arc<[Creator]>> = payloads
            .par_iter()
            .map(|payload| CreatorResolver::new(ctx).find_for_payload(payload))
            .collect();

        let mut creators: Vec<Creator> = per_payload
            .iter()
            .flat_map(|found| found.iter().cloned())
            .collect();
        creators.extend(DeadlineReferenceResolver::new(ctx).creators().iter().cloned());
        dedup_creators(&mut creators);

        tracing::debug!(
            "[CREATORS] {} creator(s) across {} payload(s)",
            creators.len(),
            payloads.len()
        );
        creators
    }

    fn compute(&self, payload: &str) -> Vec<Creator> {
        let index = self.ctx.index;
        let handlers = self.ctx.handlers().set();
        let walk = CallerWalk::new(index, &handlers, self.ctx.config.max_attribution_depth);
        let compat = self.ctx.compat();

        let mut candidates: Vec<&str> = vec![payload];
        for handler in handlers.handlers().iter() {
            let name = handler.payload.as_str();
            if !candidates.contains(&name) && compat.compatible(payload, name) {
                candidates.push(name);
            }
        }

        let mut creators = Vec::new();
        for name in &candidates {
            for ty in index.resolve_type(name) {
                for callee in self.creating_callables(ty) {
                    for site in index.find_call_sites(callee) {
                        let parents = walk.parent_handlers(site);
                        push_attributed(
                            &mut creators,
                            site,
                            name,
                            &parents,
                            CreatorOrigin::Construction,
                        );
                    }
                }
            }
        }

        creators.extend(DeadlineReferenceResolver::new(self.ctx).creators_for(payload));
        dedup_creators(&mut creators);

        tracing::debug!(
            "[CREATORS] {} creator(s) for '{}' ({} candidate type(s))",
            creators.len(),
            payload,
            candidates.len()
        );
        creators
    }

    /// Constructors of `ty`, and its builder methods when enabled.
    fn creating_callables(&self, ty: DeclId) -> Vec<DeclId> {
        let index = self.ctx.index;
        let mut callables = index.find_constructors(ty);
        if self.ctx.config.include_builder_methods {
            callables.extend(index.find_methods(ty).into_iter().filter(|id| {
                index
                    .declaration(*id)
                    .is_some_and(|m| m.name.to_lowercase().contains(BUILDER_NAME))
            }));
        }
        callables
    }
}

/// Cached creators as of now: sites that are gone or sit in a stale
/// declaration are dropped, and stale parent handlers are detached.
///
/// Returns `creators` unchanged when nothing went stale.
pub(crate) fn retain_live<I: SymbolIndex + ?Sized>(
    index: &I,
    creators: Arc<[Creator]>,
) -> Arc<[Creator]> {
    let site_live = |c: &Creator| {
        index.call_site(c.site).is_some()
            && index
                .enclosing_declaration(c.site)
                .is_none_or(|decl| index.is_valid(decl))
    };
    let parent_live = |c: &Creator| {
        c.parent_handler
            .as_ref()
            .is_none_or(|h| index.is_valid(h.declaration))
    };
    if creators.iter().all(|c| site_live(c) && parent_live(c)) {
        return creators;
    }

    // A site that keeps one live parent needs no unattributed fallback.
    let attributed: FxHashSet<(CallSiteId, &str)> = creators
        .iter()
        .filter(|c| c.parent_handler.is_some() && parent_live(*c))
        .map(|c| (c.site, c.payload.as_str()))
        .collect();
    let mut live: Vec<Creator> = creators
        .iter()
        .filter(|c| site_live(*c))
        .filter_map(|c| {
            if parent_live(c) {
                Some(c.clone())
            } else if attributed.contains(&(c.site, c.payload.as_str())) {
                None
            } else {
                Some(Creator::new(c.site, c.payload.clone(), None, c.origin))
            }
        })
        .collect();
    dedup_creators(&mut live);

    tracing::debug!(
        "[CREATORS] {} of {} cached creator(s) still live",
        live.len(),
        creators.len()
    );
    live.into()
}

/// One creator per parent handler, or a single unattributed one.
pub(crate) fn push_attributed(
    creators: &mut Vec<Creator>,
    site: CallSiteId,
    payload: &str,
    parents: &[Handler],
    origin: CreatorOrigin,
) {
    if parents.is_empty() {
        creators.push(Creator::new(site, payload, None, origin));
        return;
    }
    for parent in parents {
        creators.push(Creator::new(site, payload, Some(parent.clone()), origin));
    }
}

/// Keep the first creator per `(site, payload, parent handler)`.
pub(crate) fn dedup_creators(creators: &mut Vec<Creator>) {
    let mut seen: FxHashSet<(CallSiteId, String, Option<DeclId>)> = FxHashSet::default();
    creators.retain(|creator| {
        let (site, payload, parent) = creator.key();
        seen.insert((site, payload.to_string(), parent))
    });
}
