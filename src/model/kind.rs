//! Message kinds and the framework markers they are declared with.

use std::fmt;

/// Framework generation whose annotation names are in use.
///
/// Some markers moved packages between generations and some were dropped
/// entirely; a marker without a name in the active version resolves to
/// nothing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FrameworkVersion {
    V4,
    V5,
    /// Version could not be detected. Behaves like [`FrameworkVersion::V4`].
    #[default]
    Unknown,
}

/// Framework annotations resolved through the marker forest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "export", derive(serde::Serialize))]
pub enum Marker {
    CommandHandler,
    EventHandler,
    EventSourcingHandler,
    QueryHandler,
    CommandHandlerInterceptor,
    SagaEventHandler,
    DeadlineHandler,
    AggregateRoot,
    ProcessingGroup,
}

impl Marker {
    /// All markers in resolution order. Earlier markers win name collisions.
    pub const ALL: [Marker; 9] = [
        Marker::CommandHandler,
        Marker::EventHandler,
        Marker::EventSourcingHandler,
        Marker::QueryHandler,
        Marker::CommandHandlerInterceptor,
        Marker::SagaEventHandler,
        Marker::DeadlineHandler,
        Marker::AggregateRoot,
        Marker::ProcessingGroup,
    ];

    fn names(self) -> (Option<&'static str>, Option<&'static str>) {
        match self {
            Marker::CommandHandler => (
                Some("org.axonframework.commandhandling.CommandHandler"),
                Some("org.axonframework.messaging.commandhandling.annotation.CommandHandler"),
            ),
            Marker::EventHandler => (
                Some("org.axonframework.eventhandling.EventHandler"),
                Some("org.axonframework.messaging.eventhandling.annotation.EventHandler"),
            ),
            Marker::EventSourcingHandler => (
                Some("org.axonframework.eventsourcing.EventSourcingHandler"),
                Some("org.axonframework.eventsourcing.annotation.EventSourcingHandler"),
            ),
            Marker::QueryHandler => (
                Some("org.axonframework.queryhandling.QueryHandler"),
                Some("org.axonframework.messaging.queryhandling.annotation.QueryHandler"),
            ),
            Marker::CommandHandlerInterceptor => (
                Some("org.axonframework.modelling.command.CommandHandlerInterceptor"),
                None,
            ),
            Marker::SagaEventHandler => {
                (Some("org.axonframework.modelling.saga.SagaEventHandler"), None)
            }
            Marker::DeadlineHandler => (
                Some("org.axonframework.deadline.annotation.DeadlineHandler"),
                None,
            ),
            Marker::AggregateRoot => {
                (Some("org.axonframework.modelling.command.AggregateRoot"), None)
            }
            Marker::ProcessingGroup => (Some("org.axonframework.config.ProcessingGroup"), None),
        }
    }

    /// Qualified annotation name for a framework version.
    pub fn qualified_name(self, version: FrameworkVersion) -> Option<&'static str> {
        let (v4, v5) = self.names();
        match version {
            FrameworkVersion::V5 => v5,
            FrameworkVersion::V4 | FrameworkVersion::Unknown => v4,
        }
    }

    /// Every qualified name this marker has across versions.
    pub fn all_names(self) -> impl Iterator<Item = &'static str> {
        let (v4, v5) = self.names();
        v4.into_iter().chain(v5.filter(|name| Some(*name) != v4))
    }

    /// True if `qualified_name` is the built-in name of any handler marker.
    ///
    /// Such names are never adopted as custom markers of another kind.
    pub fn is_handler_root(qualified_name: &str) -> bool {
        MessageKind::ALL
            .iter()
            .any(|kind| kind.marker().all_names().any(|name| name == qualified_name))
    }
}

/// Logical message category used for filtering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "export", derive(serde::Serialize))]
pub enum MessageCategory {
    Command,
    Event,
    Query,
    Deadline,
}

/// Kind of handler, each backed by one root marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "export", derive(serde::Serialize))]
pub enum MessageKind {
    Command,
    Event,
    Saga,
    EventSourcing,
    Query,
    CommandInterceptor,
    Deadline,
}

impl MessageKind {
    pub const ALL: [MessageKind; 7] = [
        MessageKind::Command,
        MessageKind::Event,
        MessageKind::Saga,
        MessageKind::EventSourcing,
        MessageKind::Query,
        MessageKind::CommandInterceptor,
        MessageKind::Deadline,
    ];

    pub fn marker(self) -> Marker {
        match self {
            MessageKind::Command => Marker::CommandHandler,
            MessageKind::Event => Marker::EventHandler,
            MessageKind::Saga => Marker::SagaEventHandler,
            MessageKind::EventSourcing => Marker::EventSourcingHandler,
            MessageKind::Query => Marker::QueryHandler,
            MessageKind::CommandInterceptor => Marker::CommandHandlerInterceptor,
            MessageKind::Deadline => Marker::DeadlineHandler,
        }
    }

    pub fn category(self) -> MessageCategory {
        match self {
            MessageKind::Command | MessageKind::CommandInterceptor => MessageCategory::Command,
            MessageKind::Event | MessageKind::Saga | MessageKind::EventSourcing => {
                MessageCategory::Event
            }
            MessageKind::Query => MessageCategory::Query,
            MessageKind::Deadline => MessageCategory::Deadline,
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            MessageKind::Command => "command handler",
            MessageKind::Event => "event handler",
            MessageKind::Saga => "saga event handler",
            MessageKind::EventSourcing => "event sourcing handler",
            MessageKind::Query => "query handler",
            MessageKind::CommandInterceptor => "command handler interceptor",
            MessageKind::Deadline => "deadline handler",
        };
        f.write_str(text)
    }
}
