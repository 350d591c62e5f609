//! Import directives: plain, aliased, star, static and static-star.

use gvc_ast::{FieldId, ModuleBuilder, Modifiers, TypeRefId};
use gvc_common::diagnostic_codes;
use gvc_resolver::diagnostics::count_kind;
use gvc_resolver::{
    ClassTable, DiagnosticKind, ExternalClass, ResolveSession, ResolverOptions, Target,
    UnitResolution, UnitResolver,
};
use std::sync::Arc;

fn session_with(table: ClassTable) -> ResolveSession {
    let options = ResolverOptions {
        parallel: false,
        ..ResolverOptions::default()
    };
    ResolveSession::new(options, Arc::new(table))
}

fn field_ref(builder: &ModuleBuilder, field: FieldId) -> TypeRefId {
    builder
        .module()
        .field(field)
        .type_ref
        .expect("typed field")
}

fn resolved_name(session: &ResolveSession, resolution: &UnitResolution, tr: TypeRefId) -> String {
    let id = resolution.class_of(tr).expect("reference resolved");
    session.store().name(id)
}

fn library() -> ClassTable {
    let public_static = Modifiers::PUBLIC | Modifiers::STATIC;
    let mut table = ClassTable::with_runtime_classes();
    table
        .insert(ExternalClass::new("a.Foo"))
        .insert(ExternalClass::new("b.Foo"))
        .insert(ExternalClass::new("a.Outer"))
        .insert(ExternalClass::new("a.Outer$Member").with_modifiers(public_static))
        .insert(ExternalClass::new("a.Outer$Bound").with_modifiers(Modifiers::PUBLIC))
        .insert(ExternalClass::new("a.Outer$Deep").with_modifiers(public_static))
        .insert(ExternalClass::new("a.Outer$Deep$Leaf").with_modifiers(public_static));
    table
}

#[test]
fn test_plain_import_resolves_simple_name() {
    let session = session_with(library());
    let mut b = ModuleBuilder::new("Main.gvc").package("app");
    b.import("a.Foo");
    let main = b.class("Main");
    let field = b.field(main, "foo", Some("Foo"));
    let tr = field_ref(&b, field);

    let resolution = UnitResolver::new(&session, Arc::new(b.finish())).run();

    assert_eq!(resolved_name(&session, &resolution, tr), "a.Foo");
    assert_eq!(resolution.error_count(), 0);
}

#[test]
fn test_import_alias_renames_class() {
    let session = session_with(library());
    let mut b = ModuleBuilder::new("Main.gvc").package("app");
    b.import_as("b.Foo", "OtherFoo");
    let main = b.class("Main");
    let field = b.field(main, "foo", Some("OtherFoo"));
    let tr = field_ref(&b, field);

    let resolution = UnitResolver::new(&session, Arc::new(b.finish())).run();

    assert_eq!(resolved_name(&session, &resolution, tr), "b.Foo");
}

#[test]
fn test_partial_alias_match_reaches_nested_class() {
    let session = session_with(library());
    let mut b = ModuleBuilder::new("Main.gvc").package("app");
    b.import("java.util.Map");
    b.import_as("a.Outer", "O");
    let main = b.class("Main");
    let entry = b.field(main, "entry", Some("Map.Entry"));
    let leaf = b.field(main, "leaf", Some("O.Deep.Leaf"));
    let entry_ref = field_ref(&b, entry);
    let leaf_ref = field_ref(&b, leaf);

    let resolution = UnitResolver::new(&session, Arc::new(b.finish())).run();

    assert_eq!(resolved_name(&session, &resolution, entry_ref), "java.util.Map$Entry");
    assert_eq!(resolved_name(&session, &resolution, leaf_ref), "a.Outer$Deep$Leaf");
    assert_eq!(resolution.error_count(), 0);
}

#[test]
fn test_star_imports_with_different_classes_are_ambiguous() {
    let session = session_with(library());
    let mut b = ModuleBuilder::new("Main.gvc").package("app");
    b.import_star("a");
    let second = b.import_star("b");
    let second_span = b.module().imports[second].span;
    let main = b.class("Main");
    let field = b.field(main, "foo", Some("Foo"));
    let tr = field_ref(&b, field);

    let resolution = UnitResolver::new(&session, Arc::new(b.finish())).run();

    assert_eq!(
        count_kind(resolution.diagnostics(), DiagnosticKind::AmbiguousName),
        1
    );
    let diagnostic = &resolution.diagnostics()[0];
    assert_eq!(diagnostic.code, diagnostic_codes::AMBIGUOUS_CLASS_REFERENCE);
    assert_eq!(
        diagnostic.message_text,
        "reference to Foo is ambiguous, both class a.Foo and b.Foo match"
    );
    assert_eq!(diagnostic.related_information.len(), 1);
    let related = &diagnostic.related_information[0];
    assert_eq!(related.file, "Main.gvc");
    assert_eq!(related.start, second_span.start);
    assert_eq!(related.message_text, "class b.Foo is imported here");
    assert_eq!(resolved_name(&session, &resolution, tr), "a.Foo");
}

#[test]
fn test_qualified_reference_to_package_private_nested_class_is_rejected() {
    let mut table = library();
    table.insert(ExternalClass::new("a.Outer$Hidden").with_modifiers(Modifiers::STATIC));
    let session = session_with(table);
    let mut b = ModuleBuilder::new("Main.gvc").package("b");
    let main = b.class("Main");
    b.field(main, "hidden", Some("a.Outer.Hidden"));
    let visible = b.field(main, "member", Some("a.Outer.Member"));
    let visible_ref = field_ref(&b, visible);

    let resolution = UnitResolver::new(&session, Arc::new(b.finish())).run();

    assert_eq!(resolution.error_count(), 1);
    let diagnostic = &resolution.diagnostics()[0];
    assert_eq!(diagnostic.code, diagnostic_codes::NESTED_TYPE_NOT_VISIBLE);
    assert_eq!(
        diagnostic.message_text,
        "nested type a.Outer$Hidden is not visible from b.Main"
    );
    assert_eq!(
        resolved_name(&session, &resolution, visible_ref),
        "a.Outer$Member"
    );
}

#[test]
fn test_same_class_through_two_star_imports_is_not_ambiguous() {
    let session = session_with(library());
    let mut b = ModuleBuilder::new("Main.gvc").package("app");
    b.import_star("a");
    b.import_star("a");
    let main = b.class("Main");
    let field = b.field(main, "foo", Some("Foo"));
    let tr = field_ref(&b, field);

    let resolution = UnitResolver::new(&session, Arc::new(b.finish())).run();

    assert_eq!(resolution.error_count(), 0);
    assert_eq!(resolved_name(&session, &resolution, tr), "a.Foo");
}

#[test]
fn test_star_import_of_class_offers_nested_classes() {
    let session = session_with(library());
    let mut b = ModuleBuilder::new("Main.gvc").package("app");
    b.import_star("a.Outer");
    let main = b.class("Main");
    let field = b.field(main, "member", Some("Member"));
    let tr = field_ref(&b, field);

    let resolution = UnitResolver::new(&session, Arc::new(b.finish())).run();

    assert_eq!(resolved_name(&session, &resolution, tr), "a.Outer$Member");
}

#[test]
fn test_static_import_accepts_static_nested_class() {
    let session = session_with(library());
    let mut b = ModuleBuilder::new("Main.gvc").package("app");
    b.import_static("a.Outer", "Member", None);
    let main = b.class("Main");
    let field = b.field(main, "member", Some("Member"));
    let tr = field_ref(&b, field);

    let resolution = UnitResolver::new(&session, Arc::new(b.finish())).run();

    assert_eq!(resolved_name(&session, &resolution, tr), "a.Outer$Member");
    assert_eq!(resolution.error_count(), 0);
}

#[test]
fn test_static_import_rejects_inner_class() {
    let session = session_with(library());
    let mut b = ModuleBuilder::new("Main.gvc").package("app");
    b.import_static("a.Outer", "Bound", None);
    let main = b.class("Main");
    let field = b.field(main, "bound", Some("Bound"));
    let tr = field_ref(&b, field);

    let resolution = UnitResolver::new(&session, Arc::new(b.finish())).run();

    assert!(resolution.resolved(tr).is_none());
    assert_eq!(
        count_kind(resolution.diagnostics(), DiagnosticKind::UnresolvedName),
        1
    );
}

#[test]
fn test_static_star_import_offers_static_nested_classes() {
    let session = session_with(library());
    let mut b = ModuleBuilder::new("Main.gvc").package("app");
    b.import_static_star("a.Outer");
    let main = b.class("Main");
    let deep = b.field(main, "deep", Some("Deep"));
    let bound = b.field(main, "bound", Some("Bound"));
    let deep_ref = field_ref(&b, deep);
    let bound_ref = field_ref(&b, bound);

    let resolution = UnitResolver::new(&session, Arc::new(b.finish())).run();

    assert_eq!(resolved_name(&session, &resolution, deep_ref), "a.Outer$Deep");
    assert!(resolution.resolved(bound_ref).is_none());
}

#[test]
fn test_unresolvable_import_is_reported_once() {
    let session = session_with(library());
    let mut b = ModuleBuilder::new("Main.gvc").package("app");
    let index = b.import("nowhere.Gone");
    b.class("Main");
    let import_ref = b.module().imports[index].type_ref.expect("import reference");

    let resolution = UnitResolver::new(&session, Arc::new(b.finish())).run();

    assert_eq!(resolution.error_count(), 1);
    assert_eq!(
        resolution.diagnostics()[0].message_text,
        "unable to resolve class nowhere.Gone"
    );
    assert!(resolution.resolved(import_ref).is_none());
}

#[test]
fn test_import_targets_are_recorded() {
    let session = session_with(library());
    let mut b = ModuleBuilder::new("Main.gvc").package("app");
    let index = b.import("a.Outer");
    b.class("Main");
    let import_ref = b.module().imports[index].type_ref.expect("import reference");

    let resolution = UnitResolver::new(&session, Arc::new(b.finish())).run();

    let expected = session.store().lookup("a.Outer").map(Target::Class);
    assert_eq!(resolution.resolved(import_ref), expected);
}

#[test]
fn test_same_package_class_resolves_without_import() {
    let mut table = library();
    table.insert(ExternalClass::new("app.Helper"));
    let session = session_with(table);
    let mut b = ModuleBuilder::new("Main.gvc").package("app");
    let main = b.class("Main");
    let field = b.field(main, "helper", Some("Helper"));
    let tr = field_ref(&b, field);

    let resolution = UnitResolver::new(&session, Arc::new(b.finish())).run();

    assert_eq!(resolved_name(&session, &resolution, tr), "app.Helper");
}

#[test]
fn test_default_imports_use_positive_cache_on_repeat() {
    let session = session_with(library());
    let mut b = ModuleBuilder::new("Main.gvc").package("app");
    let main = b.class("Main");
    let first = b.field(main, "created", Some("Date"));
    let second = b.field(main, "updated", Some("Date"));
    let first_ref = field_ref(&b, first);
    let second_ref = field_ref(&b, second);

    let resolution = UnitResolver::new(&session, Arc::new(b.finish())).run();

    assert_eq!(resolved_name(&session, &resolution, first_ref), "java.util.Date");
    assert_eq!(resolved_name(&session, &resolution, second_ref), "java.util.Date");
    assert_eq!(session.stats().snapshot().positive_cache_hits, 1);
    let prefixes = session.caches().positive.prefixes("Date").expect("recorded");
    assert_eq!(prefixes.len(), 1);
    assert_eq!(&*prefixes[0], "java.util.");
}

#[test]
fn test_big_number_fallbacks() {
    let session = session_with(library());
    let mut b = ModuleBuilder::new("Main.gvc").package("app");
    let main = b.class("Main");
    let int_field = b.field(main, "count", Some("BigInteger"));
    let dec_field = b.field(main, "amount", Some("BigDecimal"));
    let int_ref = field_ref(&b, int_field);
    let dec_ref = field_ref(&b, dec_field);

    let resolution = UnitResolver::new(&session, Arc::new(b.finish())).run();

    assert_eq!(resolved_name(&session, &resolution, int_ref), "java.math.BigInteger");
    assert_eq!(resolved_name(&session, &resolution, dec_ref), "java.math.BigDecimal");
    assert_eq!(resolution.error_count(), 0);
}

#[test]
fn test_qualified_nested_name_is_mangled() {
    let session = session_with(library());
    let mut b = ModuleBuilder::new("Main.gvc").package("app");
    let main = b.class("Main");
    let field = b.field(main, "leaf", Some("a.Outer.Deep.Leaf"));
    let tr = field_ref(&b, field);

    let resolution = UnitResolver::new(&session, Arc::new(b.finish())).run();

    assert_eq!(resolved_name(&session, &resolution, tr), "a.Outer$Deep$Leaf");
    assert!(session.stats().snapshot().static_inner_probes > 0);
}
