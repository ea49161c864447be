use super::{MessageCategory, MessageKind, short_name};
use crate::base::DeclId;

/// A declaration statically determined to process one payload type.
///
/// Identity is the backing declaration; two handlers with the same
/// declaration are the same handler regardless of the rendered text.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "export", derive(serde::Serialize))]
pub struct Handler {
    pub declaration: DeclId,
    pub kind: MessageKind,
    /// Qualified name of the accepted message type.
    pub payload: String,
    /// Processing group, owning component or deadline name, depending on kind.
    pub group_label: String,
    /// `Type.method(Param, ...)` rendering of the declaration.
    pub display_text: String,
    /// Secondary text shown next to the handler.
    pub container_text: String,
}

impl Handler {
    pub fn category(&self) -> MessageCategory {
        self.kind.category()
    }

    /// Short label for lists: the payload's simple name, or the deadline name.
    pub fn render_text(&self) -> String {
        match self.kind {
            MessageKind::Deadline => format!("Deadline {}", self.group_label),
            _ => short_name(&self.payload).to_string(),
        }
    }
}

impl PartialEq for Handler {
    fn eq(&self, other: &Self) -> bool {
        self.declaration == other.declaration
    }
}

impl Eq for Handler {}

impl std::hash::Hash for Handler {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.declaration.hash(state);
    }
}
