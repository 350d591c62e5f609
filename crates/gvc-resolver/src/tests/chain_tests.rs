use crate::env::ResolveCtx;
use crate::session::ResolveSession;
use crate::target::Target;
use crate::unit::UnitResolver;
use crate::{ClassTable, ResolverOptions};
use gvc_ast::ModuleBuilder;
use gvc_common::limits::MAX_CANDIDATE_DEPTH;
use std::sync::Arc;

fn runtime_session() -> ResolveSession {
    let options = ResolverOptions {
        parallel: false,
        ..ResolverOptions::default()
    };
    ResolveSession::new(options, Arc::new(ClassTable::with_runtime_classes()))
}

#[test]
fn test_nested_lookup_finds_mangled_class() {
    let session = runtime_session();
    let mut b = ModuleBuilder::new("Main.gvc").package("p");
    b.class("Main");
    let mut unit = UnitResolver::new(&session, Arc::new(b.finish()));
    let thread = session.class_by_name("java.lang.Thread").expect("runtime class");

    let found = unit.resolve_nested(thread, "State", &ResolveCtx::module());

    let Some(Target::Class(id)) = found else {
        panic!("expected a nested class, got {found:?}");
    };
    assert_eq!(session.store().name(id), "java.lang.Thread$State");
    assert_eq!(unit.depth, 0);
}

#[test]
fn test_nested_lookup_respects_candidate_depth() {
    let session = runtime_session();
    let mut b = ModuleBuilder::new("Main.gvc").package("p");
    b.class("Main");
    let mut unit = UnitResolver::new(&session, Arc::new(b.finish()));
    let thread = session.class_by_name("java.lang.Thread").expect("runtime class");
    let before = session.stats().snapshot().candidates_built;

    unit.depth = MAX_CANDIDATE_DEPTH;
    let found = unit.resolve_nested(thread, "State", &ResolveCtx::module());

    assert!(found.is_none());
    assert_eq!(session.stats().snapshot().candidates_built, before);
    assert_eq!(unit.depth, MAX_CANDIDATE_DEPTH);
}
