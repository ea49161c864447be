use super::{Handler, short_name};
use crate::base::{CallSiteId, DeclId};

/// How a creator site produces its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "export", derive(serde::Serialize))]
pub enum CreatorOrigin {
    /// Constructor or builder invocation of the payload type.
    Construction,
    /// Call to a deadline scheduling method.
    DeadlineSchedule,
    /// Call to a deadline cancellation method.
    DeadlineCancel,
}

impl CreatorOrigin {
    pub fn is_deadline(self) -> bool {
        !matches!(self, CreatorOrigin::Construction)
    }
}

/// A call or construction site that produces a payload.
///
/// For deadlines the payload is either the deadline name or the qualified
/// name of the scheduled payload object.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "export", derive(serde::Serialize))]
pub struct Creator {
    pub site: CallSiteId,
    pub payload: String,
    pub parent_handler: Option<Handler>,
    pub origin: CreatorOrigin,
}

impl Creator {
    pub fn new(
        site: CallSiteId,
        payload: impl Into<String>,
        parent_handler: Option<Handler>,
        origin: CreatorOrigin,
    ) -> Self {
        Self {
            site,
            payload: payload.into(),
            parent_handler,
            origin,
        }
    }

    /// Deduplication key: one creator per site, payload and parent handler.
    pub fn key(&self) -> (CallSiteId, &str, Option<DeclId>) {
        (
            self.site,
            self.payload.as_str(),
            self.parent_handler.as_ref().map(|h| h.declaration),
        )
    }

    pub fn render_text(&self) -> String {
        match &self.parent_handler {
            Some(handler) => handler.display_text.clone(),
            None => short_name(&self.payload).to_string(),
        }
    }

    pub fn render_container_text(&self) -> Option<&str> {
        self.origin.is_deadline().then_some(self.payload.as_str())
    }
}
