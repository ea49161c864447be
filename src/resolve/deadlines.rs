//! Deadline scheduling and cancellation sites.
//!
//! A deadline is scheduled by name and optionally with a payload object, and
//! handled by name or by payload type. Each scheduling call therefore yields
//! up to two creators: one keyed by the constant deadline name, one keyed by
//! the payload's qualified type name.

use std::sync::Arc;

use rustc_hash::FxHashSet;

use super::creators::{dedup_creators, push_attributed, retain_live};
use super::{CallerWalk, ResolveContext};
use crate::base::{CallSiteId, DeclId};
use crate::index::{Origin, SymbolIndex};
use crate::model::{Creator, CreatorOrigin};

const SCHEDULE_PREFIX: &str = "schedule";
const CANCEL_PREFIX: &str = "cancel";

/// Scheduler methods, split by what they do.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SchedulerMethods {
    pub schedule: Vec<DeclId>,
    pub cancel: Vec<DeclId>,
}

impl SchedulerMethods {
    /// Append the methods of `other` not already present, keeping order.
    fn merge(&mut self, other: &SchedulerMethods) {
        merge_unique(&mut self.schedule, &other.schedule);
        merge_unique(&mut self.cancel, &other.cancel);
    }

    pub fn len(&self) -> usize {
        self.schedule.len() + self.cancel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schedule.is_empty() && self.cancel.is_empty()
    }
}

fn merge_unique(into: &mut Vec<DeclId>, from: &[DeclId]) {
    let mut seen: FxHashSet<DeclId> = into.iter().copied().collect();
    into.extend(from.iter().copied().filter(|id| seen.insert(*id)));
}

/// Finds the methods of configured scheduler interfaces and their subtypes.
///
/// Library methods are cached against the library revision alone, so edits
/// to project sources only rescan project code.
pub struct DeadlineMethodResolver<'a, I: SymbolIndex + ?Sized> {
    ctx: ResolveContext<'a, I>,
}

impl<'a, I: SymbolIndex + ?Sized> DeadlineMethodResolver<'a, I> {
    pub fn new(ctx: ResolveContext<'a, I>) -> Self {
        Self { ctx }
    }

    /// Library and project methods combined.
    pub fn methods(&self) -> SchedulerMethods {
        let mut all = self.library_methods().as_ref().clone();
        all.merge(&self.project_methods());
        all
    }

    pub fn library_methods(&self) -> Arc<SchedulerMethods> {
        let revision = self.ctx.index.revision().library_only();
        self.ctx
            .caches
            .library_schedulers
            .get_or_compute(revision, || Arc::new(self.scan(Origin::Library)))
    }

    pub fn project_methods(&self) -> Arc<SchedulerMethods> {
        let revision = self.ctx.index.revision();
        self.ctx
            .caches
            .project_schedulers
            .get_or_compute(revision, || Arc::new(self.scan(Origin::Project)))
    }

    fn scan(&self, origin: Origin) -> SchedulerMethods {
        let index = self.ctx.index;
        let mut methods = SchedulerMethods::default();
        let mut visited: FxHashSet<DeclId> = FxHashSet::default();

        for name in &self.ctx.config.scheduler_interfaces {
            for interface in index.resolve_type(name) {
                let types = std::iter::once(interface).chain(index.find_subtypes(interface));
                for ty in types {
                    if !visited.insert(ty) {
                        continue;
                    }
                    let Some(decl) = index.declaration(ty) else {
                        continue;
                    };
                    if decl.origin != origin {
                        continue;
                    }
                    self.collect_methods(ty, &mut methods);
                }
            }
        }

        tracing::debug!(
            "[DEADLINES] {:?} scan: {} schedule, {} cancel method(s)",
            origin,
            methods.schedule.len(),
            methods.cancel.len()
        );
        methods
    }

    fn collect_methods(&self, ty: DeclId, methods: &mut SchedulerMethods) {
        let index = self.ctx.index;
        let string_type = self.ctx.config.string_type.as_str();
        for id in index.find_methods(ty) {
            let Some(method) = index.declaration(id) else {
                continue;
            };
            let takes_name = method
                .parameters
                .iter()
                .any(|p| p.ty.qualified_name.as_ref() == string_type);
            if !takes_name {
                continue;
            }
            let name = method.name.to_lowercase();
            if name.starts_with(SCHEDULE_PREFIX) {
                methods.schedule.push(id);
            } else if name.starts_with(CANCEL_PREFIX) {
                methods.cancel.push(id);
            }
        }
    }
}

/// Turns calls to scheduler methods into creators.
pub struct DeadlineReferenceResolver<'a, I: SymbolIndex + ?Sized> {
    ctx: ResolveContext<'a, I>,
}

impl<'a, I: SymbolIndex + ?Sized> DeadlineReferenceResolver<'a, I> {
    pub fn new(ctx: ResolveContext<'a, I>) -> Self {
        Self { ctx }
    }

    /// Every deadline creator at the current revision.
    pub fn creators(&self) -> Arc<[Creator]> {
        let revision = self.ctx.index.revision();
        let cached = self
            .ctx
            .caches
            .deadline_creators
            .get_or_compute(revision, || self.compute().into());
        retain_live(self.ctx.index, cached)
    }

    /// Deadline creators keyed exactly by `payload` (a deadline name or a
    /// payload type).
    pub fn creators_for(&self, payload: &str) -> Vec<Creator> {
        self.creators()
            .iter()
            .filter(|c| c.payload == payload)
            .cloned()
            .collect()
    }

    fn compute(&self) -> Vec<Creator> {
        let index = self.ctx.index;
        let methods = DeadlineMethodResolver::new(self.ctx).methods();
        let handlers = self.ctx.handlers().set();
        let walk = CallerWalk::new(index, &handlers, self.ctx.config.max_attribution_depth);

        let mut creators = Vec::new();
        for method in &methods.schedule {
            for site in index.find_call_sites(*method) {
                let parents = walk.parent_handlers(site);
                let origin = CreatorOrigin::DeadlineSchedule;
                if let Some(name) = self.deadline_name(site) {
                    push_attributed(&mut creators, site, &name, &parents, origin);
                }
                if let Some(payload) = self.payload_type(site) {
                    push_attributed(&mut creators, site, &payload, &parents, origin);
                }
            }
        }
        for method in &methods.cancel {
            for site in index.find_call_sites(*method) {
                let parents = walk.parent_handlers(site);
                if let Some(name) = self.deadline_name(site) {
                    let origin = CreatorOrigin::DeadlineCancel;
                    push_attributed(&mut creators, site, &name, &parents, origin);
                }
            }
        }

        dedup_creators(&mut creators);
        tracing::debug!("[DEADLINES] {} deadline creator(s)", creators.len());
        creators
    }

    /// Constant value of the first string-typed argument.
    fn deadline_name(&self, site: CallSiteId) -> Option<String> {
        let index = self.ctx.index;
        let string_type = self.ctx.config.string_type.as_str();
        let call = index.call_site(site)?;
        let arg = call.arguments.iter().copied().find(|arg| {
            index
                .expression_type(*arg)
                .is_some_and(|ty| ty.qualified_name.as_ref() == string_type)
        })?;
        let name = index.evaluate_constant_string(arg);
        if name.is_none() {
            tracing::trace!("[DEADLINES] non-constant deadline name at {:?}", site);
        }
        name
    }

    /// Type of the first argument whose type is known and not built in.
    fn payload_type(&self, site: CallSiteId) -> Option<String> {
        let index = self.ctx.index;
        let call = index.call_site(site)?;
        call.arguments.iter().find_map(|arg| {
            let ty = index.expression_type(*arg)?;
            (!self.ctx.config.is_builtin_type(&ty.qualified_name))
                .then(|| ty.qualified_name.to_string())
        })
    }
}
