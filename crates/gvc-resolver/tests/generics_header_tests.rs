//! Type-parameter headers, generics environments and generic construction
//! checks.

use gvc_ast::{ExprKind, FieldId, MethodDecl, ModuleBuilder, Modifiers, TypeRefId};
use gvc_common::diagnostic_codes;
use gvc_resolver::diagnostics::count_kind;
use gvc_resolver::{
    ClassTable, DiagnosticKind, ResolveSession, ResolverOptions, Target, UnitResolver,
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
fn test_f_bounded_parameter_refers_to_itself() {
    let session = runtime_session();
    let mut b = ModuleBuilder::new("Sorted.gvc").package("p");
    let class = b.class("Sorted");
    let inner = b.type_ref("T");
    let bound = b.generic_ref("Comparable", &[inner]);
    let param = b.type_param("T", &[bound]);
    b.add_type_param(class, param);

    let resolution = UnitResolver::new(&session, Arc::new(b.finish())).run();

    let comparable = resolution.class_of(bound).expect("bound resolved");
    assert_eq!(session.store().name(comparable), "java.lang.Comparable");
    let nested = resolution.target(inner).expect("self reference bound");
    assert_eq!(nested.target, Target::TypeParam(param));
    assert!(nested.placeholder);
    assert_eq!(resolution.error_count(), 0);
}

#[test]
fn test_wildcard_bound_mentioning_parameter() {
    let session = runtime_session();
    let mut b = ModuleBuilder::new("Tree.gvc").package("p");
    let class = b.class("Tree");
    let inner = b.type_ref("T");
    let wildcard = b.wildcard(Some(inner), None);
    let bound = b.type_ref_with("List", &[wildcard]);
    let param = b.type_param("T", &[bound]);
    b.add_type_param(class, param);

    let resolution = UnitResolver::new(&session, Arc::new(b.finish())).run();

    let list = resolution.class_of(bound).expect("bound resolved");
    assert_eq!(session.store().name(list), "java.util.List");
    assert_eq!(resolution.resolved(inner), Some(Target::TypeParam(param)));
    assert_eq!(resolution.error_count(), 0);
}

#[test]
fn test_unresolvable_bound_is_reported() {
    let session = runtime_session();
    let mut b = ModuleBuilder::new("Box.gvc").package("p");
    let class = b.class("Box");
    let bound = b.type_ref("Missing");
    let param = b.type_param("T", &[bound]);
    b.add_type_param(class, param);

    let resolution = UnitResolver::new(&session, Arc::new(b.finish())).run();

    assert_eq!(resolution.error_count(), 1);
    assert_eq!(
        resolution.diagnostics()[0].message_text,
        "unable to resolve class Missing"
    );
}

#[test]
fn test_method_type_parameter_is_visible_in_signature() {
    let session = runtime_session();
    let mut b = ModuleBuilder::new("Util.gvc").package("p");
    let class = b.class("Util");
    let param = b.type_param("M", &[]);
    let return_type = b.type_ref("M");
    let value = b.param("value", Some("M"));
    let value_ref = value.type_ref.expect("typed parameter");
    let mut method = MethodDecl::new("pick");
    method.generics.push(param);
    method.return_type = Some(return_type);
    method.params.push(value);
    b.add_method(class, method);

    let resolution = UnitResolver::new(&session, Arc::new(b.finish())).run();

    assert_eq!(resolution.resolved(return_type), Some(Target::TypeParam(param)));
    assert_eq!(resolution.resolved(value_ref), Some(Target::TypeParam(param)));
    assert_eq!(resolution.error_count(), 0);
}

#[test]
fn test_static_method_does_not_see_class_parameters() {
    let session = runtime_session();
    let mut b = ModuleBuilder::new("Box.gvc").package("p");
    let class = b.class("Box");
    let param = b.type_param("T", &[]);
    b.add_type_param(class, param);
    let return_type = b.type_ref("T");
    let mut method = MethodDecl::new("make");
    method.modifiers = Modifiers::PUBLIC | Modifiers::STATIC;
    method.return_type = Some(return_type);
    b.add_method(class, method);

    let resolution = UnitResolver::new(&session, Arc::new(b.finish())).run();

    assert!(resolution.resolved(return_type).is_none());
    assert_eq!(
        count_kind(resolution.diagnostics(), DiagnosticKind::UnresolvedName),
        1
    );
}

#[test]
fn test_inner_class_sees_outer_parameters() {
    let session = runtime_session();
    let mut b = ModuleBuilder::new("Box.gvc").package("p");
    let class = b.class("Box");
    let param = b.type_param("T", &[]);
    b.add_type_param(class, param);
    let inner = b.nested_class(class, "Cursor");
    let field = b.field(inner, "current", Some("T"));
    let tr = field_ref(&b, field);

    let resolution = UnitResolver::new(&session, Arc::new(b.finish())).run();

    assert_eq!(resolution.resolved(tr), Some(Target::TypeParam(param)));
    assert_eq!(resolution.error_count(), 0);
}

#[test]
fn test_static_nested_class_does_not_see_outer_parameters() {
    let session = runtime_session();
    let mut b = ModuleBuilder::new("Box.gvc").package("p");
    let class = b.class("Box");
    let param = b.type_param("T", &[]);
    b.add_type_param(class, param);
    let nested = b.nested_class(class, "Builder");
    b.set_modifiers(nested, Modifiers::PUBLIC | Modifiers::STATIC);
    let field = b.field(nested, "value", Some("T"));
    let tr = field_ref(&b, field);

    let resolution = UnitResolver::new(&session, Arc::new(b.finish())).run();

    assert!(resolution.resolved(tr).is_none());
    assert_eq!(resolution.error_count(), 1);
}

#[test]
fn test_closure_parameters_share_the_method_environment() {
    let session = runtime_session();
    let mut b = ModuleBuilder::new("Box.gvc").package("p");
    let class = b.class("Box");
    let param = b.type_param("T", &[]);
    b.add_type_param(class, param);
    let item = b.param("item", Some("T"));
    let item_ref = item.type_ref.expect("typed parameter");
    let body = b.block_of(&[]);
    let closure = b.expr(ExprKind::Closure {
        params: vec![item],
        body,
    });
    b.method_with_body(class, "each", &[closure]);

    let resolution = UnitResolver::new(&session, Arc::new(b.finish())).run();

    assert_eq!(resolution.resolved(item_ref), Some(Target::TypeParam(param)));
    assert_eq!(resolution.error_count(), 0);
}

#[test]
fn test_declared_bounds_are_published_in_the_shape() {
    let session = runtime_session();
    let mut b = ModuleBuilder::new("Holder.gvc").package("p");
    let class = b.class("Holder");
    let bound = b.type_ref("Number");
    let param = b.type_param("N", &[bound]);
    b.add_type_param(class, param);

    let resolution = UnitResolver::new(&session, Arc::new(b.finish())).run();

    let id = resolution.class_id(class).expect("class id");
    let shape = session.store().shape(id).expect("shape published");
    let number = session.store().lookup("java.lang.Number").expect("interned");
    assert_eq!(shape.type_param_bounds.len(), 1);
    assert_eq!(shape.type_param_bounds[0].as_slice(), &[number]);
}

#[test]
fn test_type_argument_outside_bound_is_reported() {
    let session = runtime_session();
    let mut b = ModuleBuilder::new("Holder.gvc").package("p");
    let holder = b.class("Holder");
    let bound = b.type_ref("Number");
    let param = b.type_param("N", &[bound]);
    b.add_type_param(holder, param);
    let user = b.class("User");
    let good_arg = b.type_ref("Integer");
    let good = b.generic_ref("Holder", &[good_arg]);
    let bad_arg = b.type_ref("String");
    let bad = b.generic_ref("Holder", &[bad_arg]);
    for (name, type_ref) in [("ints", good), ("strings", bad)] {
        let field = b.field(user, name, None);
        b.field_mut(field).type_ref = Some(type_ref);
    }

    let resolution = UnitResolver::new(&session, Arc::new(b.finish())).run();

    assert_eq!(resolution.error_count(), 1);
    let diagnostic = &resolution.diagnostics()[0];
    assert_eq!(diagnostic.code, diagnostic_codes::TYPE_ARGUMENT_NOT_WITHIN_BOUND);
    assert_eq!(
        diagnostic.message_text,
        "type argument String is not within the bound java.lang.Number of p.Holder"
    );
}

#[test]
fn test_wrong_number_of_type_arguments() {
    let session = runtime_session();
    let mut b = ModuleBuilder::new("Main.gvc").package("p");
    let main = b.class("Main");
    let key = b.type_ref("String");
    let map = b.generic_ref("Map", &[key]);
    let field = b.field(main, "index", None);
    b.field_mut(field).type_ref = Some(map);

    let resolution = UnitResolver::new(&session, Arc::new(b.finish())).run();

    assert_eq!(
        count_kind(resolution.diagnostics(), DiagnosticKind::ConstructionError),
        1
    );
    assert_eq!(
        resolution.diagnostics()[0].message_text,
        "wrong number of type arguments for java.util.Map: expected 2 but got 1"
    );
}

#[test]
fn test_well_formed_construction_is_silent() {
    let session = runtime_session();
    let mut b = ModuleBuilder::new("Main.gvc").package("p");
    let main = b.class("Main");
    let key = b.type_ref("String");
    let value = b.type_ref("Integer");
    let map = b.generic_ref("HashMap", &[key, value]);
    let field = b.field(main, "index", None);
    b.field_mut(field).type_ref = Some(map);

    let resolution = UnitResolver::new(&session, Arc::new(b.finish())).run();

    assert_eq!(resolution.error_count(), 0);
    assert!(resolution.is_fully_resolved());
}
