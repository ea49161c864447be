//! Handler discovery tests.

use crate::helpers::fixtures::*;
use crate::helpers::flow_assertions::*;
use msgflow::index::{Parameter, TypeName};
use msgflow::{Marker, MessageCategory, MessageKind};
use rstest::rstest;

const PAYLOAD: &str = "com.example.orders.OrderPlaced";
const OWNER: &str = "com.example.orders.OrderHandler";

// =============================================================================
// PER-KIND CONSTRUCTION
// =============================================================================

#[rstest]
#[case(MessageKind::Command, "OrderHandler", "OrderHandler")]
#[case(MessageKind::Event, "com.example.orders", "com.example.orders")]
#[case(MessageKind::Saga, OWNER, "Saga com.example.orders.OrderHandler")]
#[case(MessageKind::EventSourcing, "OrderHandler", "OrderHandler")]
#[case(MessageKind::Query, "com.example.orders", "com.example.orders")]
#[case(MessageKind::CommandInterceptor, "OrderHandler", "OrderHandler")]
#[case(MessageKind::Deadline, PAYLOAD, "Deadline com.example.orders.OrderPlaced")]
fn test_group_label_per_kind(
    #[case] kind: MessageKind,
    #[case] group: &str,
    #[case] container: &str,
) {
    let mut fx = Fixture::new();
    fx.class(PAYLOAD);
    let owner = fx.class(OWNER);
    let method = fx.handler(kind, owner, "on", PAYLOAD);
    let engine = fx.engine();

    let handlers = engine.find_handlers(PAYLOAD, Some(kind));
    let handler = assert_single_handler(&handlers, method);
    assert_eq!(handler.kind, kind);
    assert_eq!(handler.payload, PAYLOAD);
    assert_eq!(handler.group_label, group);
    assert_eq!(handler.container_text, container);
    assert_eq!(handler.display_text, "OrderHandler.on(OrderPlaced)");
}

#[test]
fn test_explicit_processing_group() {
    let mut fx = Fixture::new();
    fx.class(PAYLOAD);
    let owner = fx.class(OWNER);
    fx.processing_group(owner, "billing");
    let event = fx.handler(MessageKind::Event, owner, "on", PAYLOAD);
    let saga = fx.handler(MessageKind::Saga, owner, "onSaga", PAYLOAD);
    let engine = fx.engine();

    assert_eq!(engine.handler_by_declaration(event).unwrap().group_label, "billing");
    let saga = engine.handler_by_declaration(saga).unwrap();
    assert_eq!(saga.group_label, "billing");
    assert_eq!(saga.container_text, "Saga billing");
}

#[test]
fn test_processing_group_through_meta_annotations() {
    let mut fx = Fixture::new();
    fx.class(PAYLOAD);
    let billing = fx.annotation_type("com.example.BillingProcessor");
    fx.processing_group(billing, "billing");
    fx.meta_annotation("com.example.NightlyBilling", "com.example.BillingProcessor");

    let owner = fx.class(OWNER);
    fx.annotate(owner, "com.example.NightlyBilling");
    let method = fx.handler(MessageKind::Event, owner, "on", PAYLOAD);
    let engine = fx.engine();

    assert_eq!(
        engine.handler_by_declaration(method).unwrap().group_label,
        "billing"
    );
}

#[test]
fn test_processing_group_constant_is_folded() {
    let mut fx = Fixture::new();
    fx.class(PAYLOAD);
    let names = fx.class("com.example.Names");
    let literal = fx.index.string_literal("orders");
    fx.index
        .add_field(names, "GROUP", TypeName::new(STRING), Some(literal))
        .unwrap();
    let owner = fx.class(OWNER);
    let value = fx.index.constant_ref("com.example.Names.GROUP");
    fx.annotate_with(owner, marker_name(Marker::ProcessingGroup), &[("value", value)]);
    let method = fx.handler(MessageKind::Query, owner, "on", PAYLOAD);
    let engine = fx.engine();

    assert_eq!(
        engine.handler_by_declaration(method).unwrap().group_label,
        "orders"
    );
}

#[test]
fn test_unresolvable_constant_falls_back_to_namespace() {
    let mut fx = Fixture::new();
    fx.class(PAYLOAD);
    let owner = fx.class(OWNER);
    let value = fx.index.constant_ref("com.elsewhere.Names.GROUP");
    fx.annotate_with(owner, marker_name(Marker::ProcessingGroup), &[("value", value)]);
    let method = fx.handler(MessageKind::Event, owner, "on", PAYLOAD);
    let engine = fx.engine();

    assert_eq!(
        engine.handler_by_declaration(method).unwrap().group_label,
        "com.example.orders"
    );
}

// =============================================================================
// PAYLOAD RESOLUTION
// =============================================================================

#[test]
fn test_generic_wrapper_yields_type_argument() {
    let mut fx = Fixture::new();
    fx.class("com.example.Cmd");
    let owner = fx.class("com.example.Handler");
    let wrapped = TypeName::generic(
        "org.axonframework.commandhandling.CommandMessage",
        vec![TypeName::new("com.example.Cmd")],
    );
    let method = fx
        .index
        .add_method(owner, "handle", vec![Parameter::new("message", wrapped)])
        .unwrap();
    fx.annotate(method, kind_marker(MessageKind::Command));
    let engine = fx.engine();

    let handler = engine.handler_by_declaration(method).unwrap();
    assert_eq!(handler.payload, "com.example.Cmd");
    assert_eq!(handler.display_text, "Handler.handle(CommandMessage)");
}

#[test]
fn test_wildcard_argument_yields_object() {
    let mut fx = Fixture::new();
    let owner = fx.class("com.example.Audit");
    let wrapped = TypeName::generic(
        "org.axonframework.eventhandling.EventMessage",
        vec![TypeName::wildcard()],
    );
    let method = fx
        .index
        .add_method(owner, "onAny", vec![Parameter::new("message", wrapped)])
        .unwrap();
    fx.annotate(method, kind_marker(MessageKind::Event));
    let engine = fx.engine();

    assert_eq!(engine.handler_by_declaration(method).unwrap().payload, OBJECT);
}

#[test]
fn test_payload_type_attribute_overrides_parameters() {
    let mut fx = Fixture::new();
    fx.class("com.example.Cmd");
    fx.class("com.example.Other");
    let owner = fx.class("com.example.Handler");
    let method = fx.method(owner, "handle", &["com.example.Other"]);
    let payload_type = fx.index.class_literal("com.example.Cmd");
    fx.annotate_with(
        method,
        kind_marker(MessageKind::Command),
        &[("payloadType", payload_type)],
    );
    let engine = fx.engine();

    assert_eq!(
        engine.handler_by_declaration(method).unwrap().payload,
        "com.example.Cmd"
    );
}

#[test]
fn test_context_parameters_are_skipped() {
    let mut fx = Fixture::new();
    fx.class("com.example.Evt");
    let owner = fx.class("com.example.Projector");
    let method = fx.method(
        owner,
        "on",
        &[
            "org.axonframework.messaging.unitofwork.ProcessingContext",
            "com.example.Evt",
        ],
    );
    fx.annotate(method, kind_marker(MessageKind::Event));
    let engine = fx.engine();

    assert_eq!(
        engine.handler_by_declaration(method).unwrap().payload,
        "com.example.Evt"
    );
}

#[test]
fn test_unresolvable_payload_drops_handler() {
    let mut fx = Fixture::new();
    let owner = fx.class("com.example.Handler");
    let method = fx.handler(MessageKind::Command, owner, "handle", "com.example.Missing");
    let no_params = fx.method(owner, "ping", &[]);
    fx.annotate(no_params, kind_marker(MessageKind::Command));
    let engine = fx.engine();

    assert!(engine.handler_by_declaration(method).is_none());
    assert!(engine.handler_by_declaration(no_params).is_none());
    assert!(engine.find_all_handlers().is_empty());
}

// =============================================================================
// DEADLINES AND ENTITIES
// =============================================================================

#[test]
fn test_deadline_handler_matches_by_name() {
    let mut fx = Fixture::new();
    let owner = fx.class("com.example.OrderSaga");
    let method = fx.method(owner, "onTimeout", &[]);
    let name = fx.index.string_literal("payment-timeout");
    fx.annotate_with(
        method,
        kind_marker(MessageKind::Deadline),
        &[("deadlineName", name)],
    );
    let engine = fx.engine();

    let handler = engine.handler_by_declaration(method).unwrap();
    assert_eq!(handler.payload, OBJECT);
    assert_eq!(handler.group_label, "payment-timeout");
    assert_eq!(handler.render_text(), "Deadline payment-timeout");

    let found = engine.find_handlers("payment-timeout", None);
    assert_single_handler(&found, method);
    assert!(engine.find_handlers("other-timeout", None).is_empty());
}

#[test]
fn test_entity_constructor_detected() {
    let mut fx = Fixture::new();
    fx.class("com.example.CreateOrder");
    let order = fx.class("com.example.Order");
    fx.annotate(order, marker_name(Marker::AggregateRoot));
    let state_ctor = fx.constructor(order, &[STRING]);
    let no_arg = fx.constructor(order, &[]);
    let command_ctor = fx.constructor(order, &["com.example.CreateOrder"]);
    fx.annotate(command_ctor, kind_marker(MessageKind::Command));
    let engine = fx.engine();

    let entity = engine.handler_by_declaration(state_ctor).unwrap();
    assert_eq!(entity.kind, MessageKind::Command);
    assert_eq!(entity.payload, "com.example.Order");
    assert_eq!(entity.container_text, "Order");
    assert_eq!(entity.display_text, "Order(String)");

    assert!(engine.handler_by_declaration(no_arg).is_none());
    let command = engine.handler_by_declaration(command_ctor).unwrap();
    assert_eq!(command.payload, "com.example.CreateOrder");
    assert_eq!(command.display_text, "Order(CreateOrder)");
}

#[test]
fn test_entity_through_custom_aggregate_marker() {
    let mut fx = Fixture::new();
    fx.meta_annotation("com.example.Entity", marker_name(Marker::AggregateRoot));
    let order = fx.class("com.example.Order");
    fx.annotate(order, "com.example.Entity");
    let ctor = fx.constructor(order, &[STRING]);
    let engine = fx.engine();

    assert_eq!(
        engine.handler_by_declaration(ctor).unwrap().payload,
        "com.example.Order"
    );
}

// =============================================================================
// LOOKUP
// =============================================================================

#[test]
fn test_custom_marker_handler() {
    let mut fx = Fixture::new();
    fx.meta_annotation("com.example.Handles", kind_marker(MessageKind::Command));
    fx.class("com.example.Cmd");
    let owner = fx.class("com.example.Handler");
    let method = fx.method(owner, "handle", &["com.example.Cmd"]);
    fx.annotate(method, "com.example.Handles");
    let engine = fx.engine();

    let found = engine.find_handlers("com.example.Cmd", Some(MessageKind::Command));
    assert_single_handler(&found, method);
}

#[test]
fn test_find_handlers_matches_super_and_subtypes() {
    let mut fx = Fixture::new();
    fx.class("com.example.Event");
    let specific = fx.class("com.example.OrderEvent");
    fx.index.add_supertype(specific, "com.example.Event").unwrap();
    let owner = fx.class("com.example.Listener");
    let generic = fx.handler(MessageKind::Event, owner, "onAny", "com.example.Event");
    let narrow = fx.handler(MessageKind::Event, owner, "onOrder", "com.example.OrderEvent");
    let engine = fx.engine();

    assert_eq!(
        declarations(&engine.find_handlers("com.example.OrderEvent", None)),
        vec![generic, narrow]
    );
    assert_eq!(
        declarations(&engine.find_handlers("com.example.Event", None)),
        vec![generic, narrow]
    );
}

#[test]
fn test_unknown_query_type_returns_nothing() {
    let mut fx = Fixture::new();
    fx.class(PAYLOAD);
    let owner = fx.class(OWNER);
    fx.handler(MessageKind::Event, owner, "on", PAYLOAD);
    let engine = fx.engine();

    assert!(engine.find_handlers("com.example.Nope", None).is_empty());
}

#[test]
fn test_kind_and_category_filters() {
    let mut fx = Fixture::new();
    fx.class(PAYLOAD);
    let owner = fx.class(OWNER);
    let event = fx.handler(MessageKind::Event, owner, "on", PAYLOAD);
    let saga = fx.handler(MessageKind::Saga, owner, "onSaga", PAYLOAD);
    let command = fx.handler(MessageKind::Command, owner, "handle", PAYLOAD);
    let engine = fx.engine();

    assert_eq!(declarations(&engine.find_handlers(PAYLOAD, None)).len(), 3);
    assert_single_handler(&engine.find_handlers(PAYLOAD, Some(MessageKind::Saga)), saga);
    assert_eq!(
        declarations(&engine.find_handlers_in_category(PAYLOAD, MessageCategory::Event)),
        vec![event, saga]
    );
    assert_single_handler(
        &engine.find_handlers_in_category(PAYLOAD, MessageCategory::Command),
        command,
    );
}

#[test]
fn test_removed_file_drops_its_handlers() {
    let mut fx = Fixture::new();
    fx.class(PAYLOAD);
    let handlers_file = fx.index.add_file(msgflow::index::Origin::Project);
    let owner = fx.class_in(handlers_file, OWNER);
    let method = fx.handler(MessageKind::Event, owner, "on", PAYLOAD);
    let mut engine = fx.engine();

    assert_eq!(engine.find_handlers(PAYLOAD, None).len(), 1);

    engine.index_mut().remove_file(handlers_file).unwrap();

    assert!(engine.find_handlers(PAYLOAD, None).is_empty());
    assert!(engine.handler_by_declaration(method).is_none());
}

#[test]
fn test_declaration_with_two_markers_is_one_handler() {
    let mut fx = Fixture::new();
    fx.class(PAYLOAD);
    let owner = fx.class(OWNER);
    let method = fx.handler(MessageKind::Command, owner, "handle", PAYLOAD);
    fx.annotate(method, kind_marker(MessageKind::Event));
    let engine = fx.engine();

    let all = engine.find_all_handlers();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].kind, MessageKind::Command);
}

#[test]
fn test_handler_annotated_with_deepest_marker_only() {
    let mut fx = Fixture::new();
    fx.meta_annotation("com.example.B", kind_marker(MessageKind::Command));
    fx.meta_annotation("com.example.C", "com.example.B");
    fx.meta_annotation("com.example.D", "com.example.C");
    fx.class("com.example.T");
    let owner = fx.class("com.example.Handler");
    let method = fx.method(owner, "handle", &["com.example.T"]);
    fx.annotate(method, "com.example.D");
    let engine = fx.engine();

    let found = engine.find_handlers("com.example.T", None);
    let handler = assert_single_handler(&found, method);
    assert_eq!(handler.kind, MessageKind::Command);
}
