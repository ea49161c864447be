//! Per-kind handler construction.
//!
//! Each [`MessageKind`] maps to one function turning an annotated declaration
//! into a [`Handler`], or `None` when its payload cannot be resolved.

use crate::config::EngineConfig;
use crate::index::{DeclKind, Declaration, SymbolIndex, TypeName};
use crate::model::{Handler, Marker, MessageKind, namespace_of, short_name};

use super::AnnotationReader;

/// Attribute overriding the payload on any handler annotation.
const PAYLOAD_TYPE_ATTRIBUTE: &str = "payloadType";
const PROCESSING_GROUP_ATTRIBUTE: &str = "value";
const DEADLINE_NAME_ATTRIBUTE: &str = "deadlineName";

pub(crate) struct BuildContext<'a, I: SymbolIndex + ?Sized> {
    pub index: &'a I,
    pub config: &'a EngineConfig,
    pub reader: AnnotationReader<'a, I>,
}

pub(crate) type BuildFn<I> = fn(&BuildContext<'_, I>, &Declaration) -> Option<Handler>;

/// Construction function for each handler kind.
pub(crate) fn builder_for<I: SymbolIndex + ?Sized>(kind: MessageKind) -> BuildFn<I> {
    match kind {
        MessageKind::Command => build_command::<I>,
        MessageKind::Event => build_event::<I>,
        MessageKind::Saga => build_saga::<I>,
        MessageKind::EventSourcing => build_event_sourcing::<I>,
        MessageKind::Query => build_query::<I>,
        MessageKind::CommandInterceptor => build_interceptor::<I>,
        MessageKind::Deadline => build_deadline::<I>,
    }
}

fn build_command<I: SymbolIndex + ?Sized>(
    cx: &BuildContext<'_, I>,
    decl: &Declaration,
) -> Option<Handler> {
    let payload = cx.resolvable_payload(decl)?;
    let model = cx.container_name(decl);
    Some(cx.handler(decl, MessageKind::Command, payload, model.clone(), model))
}

fn build_event<I: SymbolIndex + ?Sized>(
    cx: &BuildContext<'_, I>,
    decl: &Declaration,
) -> Option<Handler> {
    let payload = cx.resolvable_payload(decl)?;
    let group = cx.processing_group(decl);
    Some(cx.handler(decl, MessageKind::Event, payload, group.clone(), group))
}

fn build_saga<I: SymbolIndex + ?Sized>(
    cx: &BuildContext<'_, I>,
    decl: &Declaration,
) -> Option<Handler> {
    let payload = cx.resolvable_payload(decl)?;
    let group = cx.processing_group(decl);
    let container = format!("Saga {group}");
    Some(cx.handler(decl, MessageKind::Saga, payload, group, container))
}

fn build_event_sourcing<I: SymbolIndex + ?Sized>(
    cx: &BuildContext<'_, I>,
    decl: &Declaration,
) -> Option<Handler> {
    let payload = cx.resolvable_payload(decl)?;
    let model = cx.container_name(decl);
    Some(cx.handler(decl, MessageKind::EventSourcing, payload, model.clone(), model))
}

fn build_query<I: SymbolIndex + ?Sized>(
    cx: &BuildContext<'_, I>,
    decl: &Declaration,
) -> Option<Handler> {
    let payload = cx.resolvable_payload(decl)?;
    let component = cx.processing_group(decl);
    Some(cx.handler(decl, MessageKind::Query, payload, component.clone(), component))
}

fn build_interceptor<I: SymbolIndex + ?Sized>(
    cx: &BuildContext<'_, I>,
    decl: &Declaration,
) -> Option<Handler> {
    let payload = cx.resolvable_payload(decl)?;
    let aggregate = cx.container_name(decl);
    Some(cx.handler(
        decl,
        MessageKind::CommandInterceptor,
        payload,
        aggregate.clone(),
        aggregate,
    ))
}

/// Deadline handlers accept any payload, so an unresolvable one falls back
/// to the object type instead of dropping the handler.
fn build_deadline<I: SymbolIndex + ?Sized>(
    cx: &BuildContext<'_, I>,
    decl: &Declaration,
) -> Option<Handler> {
    let payload = cx
        .payload(decl)
        .filter(|payload| cx.is_resolvable(payload))
        .unwrap_or_else(|| cx.config.object_type.clone());
    let name = cx
        .reader
        .string_attribute(decl, Marker::DeadlineHandler, DEADLINE_NAME_ATTRIBUTE)
        .unwrap_or_else(|| payload.clone());
    let container = format!("Deadline {name}");
    Some(cx.handler(decl, MessageKind::Deadline, payload, name, container))
}

impl<I: SymbolIndex + ?Sized> BuildContext<'_, I> {
    /// Parameterised aggregate constructor that is not itself a command
    /// handler. The payload is the aggregate type.
    pub(crate) fn entity_constructor(&self, ctor: &Declaration) -> Option<Handler> {
        if ctor.kind != DeclKind::Constructor || !ctor.has_parameters() {
            return None;
        }
        if self.reader.has_marker(ctor, Marker::CommandHandler) {
            return None;
        }
        let entity = self.index.declaration(ctor.container?)?;
        let payload = entity.qualified_name.to_string();
        let container = short_name(&payload).to_string();
        Some(self.handler(
            ctor,
            MessageKind::Command,
            payload,
            entity.name.to_string(),
            container,
        ))
    }

    fn handler(
        &self,
        decl: &Declaration,
        kind: MessageKind,
        payload: String,
        group_label: String,
        container_text: String,
    ) -> Handler {
        Handler {
            declaration: decl.id,
            kind,
            payload,
            group_label,
            display_text: self.display_text(decl),
            container_text,
        }
    }

    fn resolvable_payload(&self, decl: &Declaration) -> Option<String> {
        let payload = self.payload(decl)?;
        if self.is_resolvable(&payload) {
            Some(payload)
        } else {
            tracing::trace!(
                "[HANDLERS] dropping '{}': payload '{}' not in index",
                decl.qualified_name,
                payload
            );
            None
        }
    }

    /// Declared `payloadType`, else the first non-context parameter. A
    /// generic wrapper such as `CommandMessage<T>` contributes its first
    /// type argument.
    fn payload(&self, decl: &Declaration) -> Option<String> {
        let declared = self
            .reader
            .any_marker_annotation(decl)
            .and_then(|annotation| self.reader.class_attribute(annotation, PAYLOAD_TYPE_ATTRIBUTE));
        let ty = match declared {
            Some(ty) => ty,
            None => {
                let param = decl
                    .parameters
                    .iter()
                    .find(|p| !self.config.is_context_parameter(&p.ty.qualified_name))?;
                param.ty.arguments.first().unwrap_or(&param.ty).clone()
            }
        };
        Some(self.type_name(&ty))
    }

    fn type_name(&self, ty: &TypeName) -> String {
        if ty.wildcard {
            self.config.object_type.clone()
        } else {
            ty.qualified_name.to_string()
        }
    }

    fn is_resolvable(&self, payload: &str) -> bool {
        payload == self.config.object_type || !self.index.resolve_type(payload).is_empty()
    }

    fn container(&self, decl: &Declaration) -> Option<&Declaration> {
        decl.container.and_then(|id| self.index.declaration(id))
    }

    fn container_name(&self, decl: &Declaration) -> String {
        self.container(decl)
            .map(|c| c.name.to_string())
            .unwrap_or_default()
    }

    /// `ProcessingGroup` of the containing type. Sagas fall back to the
    /// type's qualified name, everything else to its namespace.
    fn processing_group(&self, decl: &Declaration) -> String {
        let Some(container) = self.container(decl) else {
            return String::new();
        };
        if let Some(group) = self.reader.string_attribute(
            container,
            Marker::ProcessingGroup,
            PROCESSING_GROUP_ATTRIBUTE,
        ) {
            return group;
        }
        if self.reader.has_marker(decl, Marker::SagaEventHandler) {
            container.qualified_name.to_string()
        } else {
            namespace_of(&container.qualified_name).to_string()
        }
    }

    /// `Type.method(Short, ...)`; constructors render as `Type(Short, ...)`.
    fn display_text(&self, decl: &Declaration) -> String {
        let mut text = self.container_name(decl);
        if !decl.is_constructor() {
            text.push('.');
            text.push_str(&decl.name);
        }
        let params: Vec<&str> = decl
            .parameters
            .iter()
            .map(|p| short_name(&p.ty.qualified_name))
            .collect();
        text.push('(');
        text.push_str(&params.join(", "));
        text.push(')');
        text
    }
}

