//! Deadline scheduling and cancellation tests.

use std::sync::Arc;

use crate::helpers::fixtures::*;
use crate::helpers::flow_assertions::*;
use msgflow::index::TypeName;
use msgflow::{CreatorOrigin, DeclId, MessageKind};

const REMINDER: &str = "com.example.ReminderPayload";

/// A saga handler `OrderSaga.on(OrderPlaced)` to schedule deadlines from.
fn saga_fixture() -> (Fixture, DeclId, DeclId) {
    let mut fx = Fixture::new();
    fx.class("com.example.OrderPlaced");
    fx.class(REMINDER);
    let saga = fx.class("com.example.OrderSaga");
    let on = fx.handler(MessageKind::Saga, saga, "on", "com.example.OrderPlaced");
    (fx, saga, on)
}

#[test]
fn test_schedule_is_keyed_by_name_and_payload() {
    let (mut fx, _, on) = saga_fixture();
    let name = fx.index.string_literal("D1");
    let site = fx.schedule_deadline(on, name, Some(REMINDER));
    let engine = fx.engine();

    let creators = engine.deadline_creators();
    assert_eq!(creators.len(), 2);
    assert!(creators.iter().all(|c| c.site == site));
    assert!(creators.iter().all(|c| c.origin == CreatorOrigin::DeadlineSchedule));
    assert_eq!(parents(&creators), vec![Some(on), Some(on)]);
    assert_eq!(payloads(&creators), vec!["D1".to_string(), REMINDER.to_string()]);
}

#[test]
fn test_find_creators_includes_deadline_sites() {
    let (mut fx, _, on) = saga_fixture();
    let name = fx.index.string_literal("D1");
    fx.schedule_deadline(on, name, Some(REMINDER));
    let engine = fx.engine();

    let by_name = engine.find_creators("D1");
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].render_container_text(), Some("D1"));
    assert_eq!(by_name[0].render_text(), "OrderSaga.on(OrderPlaced)");

    let by_payload = engine.find_creators(REMINDER);
    assert_eq!(payloads(&by_payload), vec![REMINDER.to_string()]);
}

#[test]
fn test_cancel_is_keyed_by_name_only() {
    let (mut fx, _, on) = saga_fixture();
    let name = fx.index.string_literal("D1");
    let schedule_id = fx.index.typed("scheduleId", STRING);
    let cancel = fx.scheduler.cancel_schedule;
    let site = fx.call_with(on, cancel, vec![name, schedule_id]);
    let engine = fx.engine();

    let creators = engine.deadline_creators();
    assert_eq!(creators.len(), 1);
    assert_eq!(creators[0].site, site);
    assert_eq!(creators[0].payload, "D1");
    assert_eq!(creators[0].origin, CreatorOrigin::DeadlineCancel);
}

#[test]
fn test_non_constant_name_is_omitted() {
    let (mut fx, _, on) = saga_fixture();
    let name = fx.index.typed("computeName()", STRING);
    fx.schedule_deadline(on, name, Some(REMINDER));
    let engine = fx.engine();

    assert_eq!(payloads(&engine.deadline_creators()), vec![REMINDER.to_string()]);
}

#[test]
fn test_constant_name_is_folded() {
    let (mut fx, _, on) = saga_fixture();
    let names = fx.class("com.example.Deadlines");
    let literal = fx.index.string_literal("payment-");
    fx.index
        .add_field(names, "PREFIX", TypeName::new(STRING), Some(literal))
        .unwrap();
    let prefix = fx.index.constant_ref("com.example.Deadlines.PREFIX");
    let suffix = fx.index.string_literal("timeout");
    let name = fx.index.concat(vec![prefix, suffix]).unwrap();
    fx.schedule_deadline(on, name, None);
    let engine = fx.engine();

    assert_eq!(
        payloads(&engine.deadline_creators()),
        vec!["payment-timeout".to_string()]
    );
}

#[test]
fn test_project_scheduler_implementation() {
    let (mut fx, _, on) = saga_fixture();
    let custom = fx.class("com.example.QuartzDeadlines");
    fx.index.add_supertype(custom, DEADLINE_MANAGER).unwrap();
    let schedule_later = fx.method(custom, "scheduleLater", &[STRING, OBJECT]);
    let schedule_all = fx.method(custom, "scheduleAll", &[]);
    let name = fx.index.string_literal("D2");
    let site = fx.call_with(on, schedule_later, vec![name]);
    fx.call(on, schedule_all);
    let engine = fx.engine();

    let methods = engine.context().deadline_methods().methods();
    assert!(methods.schedule.contains(&schedule_later));
    assert!(!methods.schedule.contains(&schedule_all));

    let creators = engine.deadline_creators();
    assert_eq!(creators.len(), 1);
    assert_eq!(creators[0].site, site);
    assert_eq!(creators[0].payload, "D2");
}

#[test]
fn test_library_methods_survive_source_edits() {
    let (fx, _, _) = saga_fixture();
    let project = fx.project;
    let mut engine = fx.engine();

    let library = engine.context().deadline_methods().library_methods();
    let project_methods = engine.context().deadline_methods().project_methods();
    assert_eq!(library.schedule.len(), 1);
    assert_eq!(library.cancel.len(), 2);

    engine.index_mut().mark_changed(project).unwrap();

    let library_after = engine.context().deadline_methods().library_methods();
    let project_after = engine.context().deadline_methods().project_methods();
    assert!(Arc::ptr_eq(&library, &library_after));
    assert!(!Arc::ptr_eq(&project_methods, &project_after));

    engine.index_mut().mark_libraries_changed();

    let library_rescanned = engine.context().deadline_methods().library_methods();
    assert!(!Arc::ptr_eq(&library, &library_rescanned));
    assert_eq!(*library, *library_rescanned);
}

#[test]
fn test_deadline_handler_and_creator_meet_by_name() {
    let (mut fx, saga, on) = saga_fixture();
    let timeout = fx.method(saga, "onTimeout", &[]);
    let handler_name = fx.index.string_literal("D1");
    fx.annotate_with(
        timeout,
        kind_marker(MessageKind::Deadline),
        &[("deadlineName", handler_name)],
    );
    let name = fx.index.string_literal("D1");
    fx.schedule_deadline(on, name, None);
    let engine = fx.engine();

    let handlers = engine.find_handlers("D1", None);
    assert_single_handler(&handlers, timeout);
    let creators = engine.find_creators("D1");
    assert_eq!(parents(&creators), vec![Some(on)]);
}
