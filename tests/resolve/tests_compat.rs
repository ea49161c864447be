//! Type compatibility tests.

use crate::helpers::fixtures::*;
use msgflow::SymbolIndex;
use rstest::rstest;

#[rstest]
#[case("com.example.Known")]
#[case("com.example.NeverRegistered")]
#[case("")]
fn test_assignable_is_reflexive(#[case] name: &str) {
    let mut fx = Fixture::new();
    fx.class("com.example.Known");
    let engine = fx.engine();

    assert!(engine.assignable(name, name));
}

#[test]
fn test_subtype_assignable_to_supertype_only() {
    let mut fx = Fixture::new();
    fx.class("com.example.Base");
    let mid = fx.class("com.example.Mid");
    let leaf = fx.class("com.example.Leaf");
    fx.index.add_supertype(mid, "com.example.Base").unwrap();
    fx.index.add_supertype(leaf, "com.example.Mid").unwrap();
    let engine = fx.engine();

    assert!(engine.assignable("com.example.Base", "com.example.Leaf"));
    assert!(!engine.assignable("com.example.Leaf", "com.example.Base"));
    assert!(engine.context().compat().compatible("com.example.Leaf", "com.example.Base"));
}

#[test]
fn test_any_candidate_pair_counts() {
    let mut fx = Fixture::new();
    let other = fx.index.add_file(msgflow::index::Origin::Project);
    fx.class("com.example.Api");
    // two classes share a name; only the second one implements Api
    fx.class("com.example.Impl");
    let second = fx.class_in(other, "com.example.Impl");
    fx.index.add_supertype(second, "com.example.Api").unwrap();
    let engine = fx.engine();

    assert_eq!(engine.index().resolve_type("com.example.Impl").len(), 2);
    assert!(engine.assignable("com.example.Api", "com.example.Impl"));
}

#[test]
fn test_unknown_names_are_incompatible() {
    let mut fx = Fixture::new();
    fx.class("com.example.Known");
    let engine = fx.engine();

    assert!(!engine.assignable("com.example.Known", "com.example.Ghost"));
    assert!(!engine.assignable("com.example.Ghost", "com.example.Known"));
}
