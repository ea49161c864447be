//! Assertions over resolved handlers and creators.

use msgflow::{Creator, DeclId, Handler};

/// Declarations of `handlers`, sorted.
pub fn declarations(handlers: &[Handler]) -> Vec<DeclId> {
    let mut ids: Vec<DeclId> = handlers.iter().map(|h| h.declaration).collect();
    ids.sort();
    ids
}

pub fn assert_single_handler(handlers: &[Handler], declaration: DeclId) -> &Handler {
    assert_eq!(
        handlers.len(),
        1,
        "expected exactly one handler, got {:?}",
        handlers
    );
    assert_eq!(handlers[0].declaration, declaration);
    &handlers[0]
}

/// Parent handler declarations of `creators`, sorted (`None` first).
pub fn parents(creators: &[Creator]) -> Vec<Option<DeclId>> {
    let mut ids: Vec<Option<DeclId>> = creators
        .iter()
        .map(|c| c.parent_handler.as_ref().map(|h| h.declaration))
        .collect();
    ids.sort();
    ids
}

/// Payloads of `creators`, sorted.
pub fn payloads(creators: &[Creator]) -> Vec<String> {
    let mut names: Vec<String> = creators.iter().map(|c| c.payload.clone()).collect();
    names.sort();
    names
}
