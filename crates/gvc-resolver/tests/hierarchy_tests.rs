//! Supertype resolution, shape publication and cycle detection.

use gvc_ast::{FieldId, ModuleBuilder, Modifiers, TypeRefId};
use gvc_common::diagnostic_codes;
use gvc_resolver::diagnostics::count_kind;
use gvc_resolver::{
    ClassTable, DiagnosticKind, Program, ResolveSession, ResolverOptions, UnitResolver,
};
use std::sync::Arc;

fn runtime_session() -> ResolveSession {
    let options = ResolverOptions {
        parallel: false,
        ..ResolverOptions::default()
    };
    ResolveSession::new(options, Arc::new(ClassTable::with_runtime_classes()))
}

fn field_ref(builder: &ModuleBuilder, field: FieldId) -> TypeRefId {
    builder
        .module()
        .field(field)
        .type_ref
        .expect("typed field")
}

#[test]
fn test_mutual_inheritance_marks_both_classes() {
    let session = runtime_session();
    let mut b = ModuleBuilder::new("Cycle.gvc");
    let a = b.class("A");
    let c = b.class("B");
    b.extends(a, "B");
    b.extends(c, "A");

    let resolution = UnitResolver::new(&session, Arc::new(b.finish())).run();

    assert_eq!(
        count_kind(resolution.diagnostics(), DiagnosticKind::CyclicHierarchy),
        2
    );
    let messages: Vec<&str> = resolution
        .diagnostics()
        .iter()
        .map(|d| d.message_text.as_str())
        .collect();
    assert_eq!(
        messages,
        [
            "Cyclic inheritance involving B in class A",
            "Cyclic inheritance involving A in class B",
        ]
    );
    for decl in [a, c] {
        let id = resolution.class_id(decl).expect("class id");
        assert!(session.store().is_inconsistent(id));
    }
}

#[test]
fn test_interface_extending_itself() {
    let session = runtime_session();
    let mut b = ModuleBuilder::new("Loop.gvc");
    let i = b.interface("Loop");
    b.implements(i, "Loop");

    let resolution = UnitResolver::new(&session, Arc::new(b.finish())).run();

    assert_eq!(resolution.error_count(), 1);
    let diagnostic = &resolution.diagnostics()[0];
    assert_eq!(diagnostic.code, diagnostic_codes::CYCLIC_INHERITANCE_IN_INTERFACE);
    assert_eq!(
        diagnostic.message_text,
        "Cyclic inheritance involving Loop in interface Loop"
    );
}

#[test]
fn test_interfaces_extending_each_other() {
    let session = runtime_session();
    let mut b = ModuleBuilder::new("Pair.gvc").package("p");
    let first = b.interface("First");
    let second = b.interface("Second");
    b.implements(first, "Second");
    b.implements(second, "First");

    let resolution = UnitResolver::new(&session, Arc::new(b.finish())).run();

    assert_eq!(resolution.error_count(), 2);
    assert!(
        resolution
            .diagnostics()
            .iter()
            .all(|d| d.code == diagnostic_codes::CYCLIC_INHERITANCE_IN_INTERFACE)
    );
}

#[test]
fn test_class_implementing_itself() {
    let session = runtime_session();
    let mut b = ModuleBuilder::new("Odd.gvc");
    let odd = b.class("Odd");
    b.implements(odd, "Odd");

    let resolution = UnitResolver::new(&session, Arc::new(b.finish())).run();

    assert_eq!(resolution.error_count(), 1);
    let diagnostic = &resolution.diagnostics()[0];
    assert_eq!(diagnostic.code, diagnostic_codes::TYPE_CANNOT_IMPLEMENT_ITSELF);
    assert_eq!(
        diagnostic.message_text,
        "Cycle detected: the type Odd cannot implement itself"
    );
}

#[test]
fn test_cycle_across_units_is_found() {
    let session = runtime_session();
    let mut ua = ModuleBuilder::new("A.gvc");
    let a = ua.class("A");
    ua.extends(a, "B");
    let mut ub = ModuleBuilder::new("B.gvc");
    let c = ub.class("B");
    ub.extends(c, "A");

    let mut program = Program::new(&session);
    program.add_module(ua.finish());
    program.add_module(ub.finish());
    let resolution = program.resolve();

    assert_eq!(
        count_kind(resolution.diagnostics(), DiagnosticKind::CyclicHierarchy),
        2
    );
}

#[test]
fn test_external_supertypes_publish_shape() {
    let session = runtime_session();
    let mut b = ModuleBuilder::new("Worker.gvc").package("p");
    let worker = b.class("Worker");
    let super_ref = b.extends(worker, "Thread");
    b.implements(worker, "Runnable");

    let resolution = UnitResolver::new(&session, Arc::new(b.finish())).run();

    assert_eq!(resolution.error_count(), 0);
    let id = resolution.class_id(worker).expect("class id");
    let thread = resolution.class_of(super_ref).expect("superclass resolved");
    let runnable = session.store().lookup("java.lang.Runnable").expect("interned");
    let shape = session.store().shape(id).expect("shape published");
    assert_eq!(shape.superclass, Some(thread));
    assert_eq!(shape.interfaces.as_slice(), &[runnable]);
    assert_eq!(session.is_subtype(id, runnable), Some(true));
    assert!(!session.store().is_inconsistent(id));
}

#[test]
fn test_interface_without_supertypes_has_no_superclass() {
    let session = runtime_session();
    let mut b = ModuleBuilder::new("Marker.gvc").package("p");
    let marker = b.interface("Marker");

    let resolution = UnitResolver::new(&session, Arc::new(b.finish())).run();

    let id = resolution.class_id(marker).expect("class id");
    let shape = session.store().shape(id).expect("shape published");
    assert_eq!(shape.superclass, None);
    assert!(shape.interfaces.is_empty());
}

#[test]
fn test_nested_class_of_superclass_is_inherited() {
    let session = runtime_session();
    let mut b = ModuleBuilder::new("Shapes.gvc").package("p");
    let base = b.class("Base");
    let helper = b.nested_class(base, "Helper");
    b.set_modifiers(helper, Modifiers::PUBLIC | Modifiers::STATIC);
    let derived = b.class("Derived");
    b.extends(derived, "Base");
    let field = b.field(derived, "helper", Some("Helper"));
    let tr = field_ref(&b, field);

    let resolution = UnitResolver::new(&session, Arc::new(b.finish())).run();

    let id = resolution.class_of(tr).expect("inherited nested class");
    assert_eq!(session.store().name(id), "p.Base$Helper");
    assert_eq!(resolution.error_count(), 0);
}

#[test]
fn test_nested_class_of_interface_is_inherited() {
    let session = runtime_session();
    let mut b = ModuleBuilder::new("Shapes.gvc").package("p");
    let shapes = b.interface("Shapes");
    b.nested_class(shapes, "Circle");
    let canvas = b.class("Canvas");
    b.implements(canvas, "Shapes");
    let field = b.field(canvas, "circle", Some("Circle"));
    let tr = field_ref(&b, field);

    let resolution = UnitResolver::new(&session, Arc::new(b.finish())).run();

    let id = resolution.class_of(tr).expect("nested class of interface");
    assert_eq!(session.store().name(id), "p.Shapes$Circle");
}

#[test]
fn test_enclosing_class_members_are_found_outermost_first() {
    let session = runtime_session();
    let mut b = ModuleBuilder::new("Outer.gvc").package("p");
    let outer = b.class("Outer");
    let sibling = b.nested_class(outer, "Sibling");
    b.set_modifiers(sibling, Modifiers::PRIVATE | Modifiers::STATIC);
    let middle = b.nested_class(outer, "Middle");
    let innermost = b.nested_class(middle, "Deep");
    let field = b.field(innermost, "sibling", Some("Sibling"));
    let tr = field_ref(&b, field);

    let resolution = UnitResolver::new(&session, Arc::new(b.finish())).run();

    let id = resolution.class_of(tr).expect("enclosing member class");
    assert_eq!(session.store().name(id), "p.Outer$Sibling");
    assert_eq!(resolution.error_count(), 0);
}
