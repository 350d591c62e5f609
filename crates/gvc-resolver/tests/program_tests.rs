//! Multi-unit programs: staging, scheduling rounds and parallel runs.

use gvc_ast::{FieldId, ModuleAst, ModuleBuilder, Modifiers, TypeRefId};
use gvc_resolver::{
    ClassTable, MemoryLoader, Program, ProgramResolution, ResolveSession, ResolverOptions,
};
use std::sync::Arc;

fn session(table: ClassTable, parallel: bool, max_scheduling_rounds: u32) -> ResolveSession {
    let options = ResolverOptions {
        parallel,
        max_scheduling_rounds,
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

fn sample_program() -> Vec<ModuleAst> {
    let mut base = ModuleBuilder::new("lib/Base.gvc").package("lib");
    let base_class = base.class("Base");
    let param = base.type_param("T", &[]);
    base.add_type_param(base_class, param);
    let node = base.nested_class(base_class, "Node");
    base.set_modifiers(node, Modifiers::PUBLIC | Modifiers::STATIC);
    base.field(node, "next", Some("Node"));
    base.field(base_class, "items", Some("List"));

    let mut app = ModuleBuilder::new("app/App.gvc").package("app");
    app.import("lib.Base");
    let app_class = app.class("App");
    app.extends(app_class, "Base");
    app.implements(app_class, "Runnable");
    app.field(app_class, "head", Some("Node"));
    app.field(app_class, "tail", Some("Base.Node"));
    let key = app.type_ref("String");
    let list = app.generic_ref("List", &[key]);
    let names = app.field(app_class, "names", None);
    app.field_mut(names).type_ref = Some(list);
    app.field(app_class, "broken", Some("Missing"));

    let mut util = ModuleBuilder::new("app/Util.gvc").package("app");
    let util_class = util.class("Util");
    util.field(util_class, "app", Some("App"));
    let key = util.type_ref("String");
    let map = util.generic_ref("Map", &[key]);
    let index = util.field(util_class, "index", None);
    util.field_mut(index).type_ref = Some(map);

    vec![base.finish(), app.finish(), util.finish()]
}

/// Resolved class name (or `None`) of every reference, per unit, plus the
/// diagnostic messages.
fn summarize(
    session: &ResolveSession,
    resolution: &ProgramResolution,
) -> Vec<(String, Vec<Option<String>>, Vec<String>)> {
    resolution
        .units()
        .iter()
        .map(|unit| {
            let names = unit
                .module()
                .type_ref_ids()
                .map(|tr| unit.class_of(tr).map(|id| session.store().name(id)))
                .collect();
            let messages = unit
                .diagnostics()
                .iter()
                .map(|d| d.message_text.clone())
                .collect();
            (unit.file().to_string(), names, messages)
        })
        .collect()
}

#[test]
fn test_parallel_and_sequential_runs_agree() {
    let sequential_session = session(ClassTable::with_runtime_classes(), false, 16);
    let mut sequential = Program::new(&sequential_session);
    for module in sample_program() {
        sequential.add_module(module);
    }
    let sequential = sequential.resolve();

    let parallel_session = session(ClassTable::with_runtime_classes(), true, 16);
    let mut parallel = Program::new(&parallel_session);
    for module in sample_program() {
        parallel.add_module(module);
    }
    let parallel = parallel.resolve();

    assert_eq!(
        summarize(&sequential_session, &sequential),
        summarize(&parallel_session, &parallel)
    );
    assert_eq!(sequential.error_count(), 2);
    assert_eq!(parallel.error_count(), 2);
}

#[test]
fn test_sample_program_resolves_inherited_and_qualified_nested_classes() {
    let session = session(ClassTable::with_runtime_classes(), false, 16);
    let mut program = Program::new(&session);
    for module in sample_program() {
        program.add_module(module);
    }
    assert_eq!(program.unit_count(), 3);
    let resolution = program.resolve();

    let app = resolution.unit("app/App.gvc").expect("unit");
    let module = app.module();
    let class = module.find_class("app.App").expect("declared");
    let fields = &module.class(class).fields;
    let name_of = |field: FieldId| {
        let tr = module.field(field).type_ref.expect("typed field");
        app.class_of(tr).map(|id| session.store().name(id))
    };
    assert_eq!(name_of(fields[0]).as_deref(), Some("lib.Base$Node"));
    assert_eq!(name_of(fields[1]).as_deref(), Some("lib.Base$Node"));
    assert_eq!(name_of(fields[2]).as_deref(), Some("java.util.List"));
    assert_eq!(name_of(fields[3]), None);

    let messages: Vec<&str> = resolution
        .diagnostics()
        .map(|d| d.message_text.as_str())
        .collect();
    assert_eq!(
        messages,
        [
            "unable to resolve class Missing",
            "wrong number of type arguments for java.util.Map: expected 2 but got 1",
        ]
    );
}

#[test]
fn test_unit_added_twice_is_ignored() {
    let session = session(ClassTable::with_runtime_classes(), false, 16);
    let mut program = Program::new(&session);
    let mut first = ModuleBuilder::new("A.gvc");
    first.class("A");
    let mut second = ModuleBuilder::new("A.gvc");
    second.class("A");
    program.add_module(first.finish());
    program.add_module(second.finish());
    assert_eq!(program.unit_count(), 1);
    assert_eq!(program.resolve().units().len(), 1);
}

#[test]
fn test_nested_class_through_import_of_unloaded_unit() {
    let mut table = ClassTable::with_runtime_classes();
    table.insert_source("A", "A.gvc");
    let session = session(table, false, 16);

    let mut ub = ModuleBuilder::new("B.gvc");
    let import = ub.import("A");
    let b_class = ub.class("B");
    let inner = ub.field(b_class, "inner", Some("A.Inner"));
    let missing = ub.field(b_class, "missing", Some("A.Missing"));
    let inner_ref = field_ref(&ub, inner);
    let missing_ref = field_ref(&ub, missing);
    let import_ref = ub.module().imports[import].type_ref.expect("import reference");

    let mut ua = ModuleBuilder::new("A.gvc");
    let a_class = ua.class("A");
    let nested = ua.nested_class(a_class, "Inner");
    ua.set_modifiers(nested, Modifiers::PUBLIC | Modifiers::STATIC);
    let loader = MemoryLoader::new();
    loader.insert(ua.finish());

    let mut program = Program::new(&session).with_loader(loader);
    program.add_module(ub.finish());
    let resolution = program.resolve();

    let unit_b = resolution.unit("B.gvc").expect("unit B");
    let inner_id = unit_b.class_of(inner_ref).expect("settled after loading");
    assert_eq!(session.store().name(inner_id), "A$Inner");
    let import_id = unit_b.class_of(import_ref).expect("import settled");
    assert_eq!(session.store().name(import_id), "A");
    assert!(unit_b.resolved(missing_ref).is_none());
    assert_eq!(unit_b.error_count(), 1);
    assert_eq!(
        unit_b.diagnostics()[0].message_text,
        "unable to resolve class A.Missing"
    );
    assert!(!resolution.is_fully_resolved());
}

#[test]
fn test_static_import_of_nested_class_in_unloaded_unit() {
    let mut table = ClassTable::with_runtime_classes();
    table.insert_source("A", "A.gvc");
    let session = session(table, false, 16);

    let mut ub = ModuleBuilder::new("B.gvc");
    ub.import_static("A", "Inner", None);
    let b_class = ub.class("B");
    let inner = ub.field(b_class, "inner", Some("Inner"));
    let inner_ref = field_ref(&ub, inner);

    let mut ua = ModuleBuilder::new("A.gvc");
    let a_class = ua.class("A");
    let nested = ua.nested_class(a_class, "Inner");
    ua.set_modifiers(nested, Modifiers::PUBLIC | Modifiers::STATIC);
    let loader = MemoryLoader::new();
    loader.insert(ua.finish());

    let mut program = Program::new(&session).with_loader(loader);
    program.add_module(ub.finish());
    let resolution = program.resolve();

    let unit_b = resolution.unit("B.gvc").expect("unit B");
    let inner_id = unit_b.class_of(inner_ref).expect("settled after loading");
    assert_eq!(session.store().name(inner_id), "A$Inner");
    assert!(session.stats().snapshot().deferred_registrations > 0);
    assert_eq!(resolution.error_count(), 0);
    assert!(resolution.is_fully_resolved());
}

#[test]
fn test_scheduled_unit_without_loader_stays_unresolved() {
    let mut table = ClassTable::with_runtime_classes();
    table.insert_source("Later", "Later.gvc");
    let session = session(table, false, 16);

    let mut b = ModuleBuilder::new("Now.gvc");
    let class = b.class("Now");
    let field = b.field(class, "later", Some("Later"));
    let tr = field_ref(&b, field);

    let mut program = Program::new(&session);
    program.add_module(b.finish());
    let resolution = program.resolve();

    let unit = resolution.unit("Now.gvc").expect("unit");
    assert!(unit.resolved(tr).is_none());
    assert_eq!(unit.error_count(), 1);
    assert_eq!(
        unit.diagnostics()[0].message_text,
        "unable to resolve class Later"
    );
}

#[test]
fn test_round_limit_stops_loading() {
    let mut table = ClassTable::with_runtime_classes();
    table.insert_source("A", "A.gvc").insert_source("C", "C.gvc");
    let session = session(table, false, 1);

    let mut ub = ModuleBuilder::new("B.gvc");
    let b_class = ub.class("B");
    let b_field = ub.field(b_class, "a", Some("A"));
    let b_ref = field_ref(&ub, b_field);

    let mut ua = ModuleBuilder::new("A.gvc");
    let a_class = ua.class("A");
    let a_field = ua.field(a_class, "c", Some("C"));
    let a_ref = field_ref(&ua, a_field);

    let mut uc = ModuleBuilder::new("C.gvc");
    uc.class("C");

    let loader = MemoryLoader::new();
    loader.insert(ua.finish());
    loader.insert(uc.finish());

    let mut program = Program::new(&session).with_loader(loader);
    program.add_module(ub.finish());
    let resolution = program.resolve();

    assert_eq!(resolution.units().len(), 2);
    assert!(resolution.unit("C.gvc").is_none());
    let unit_b = resolution.unit("B.gvc").expect("unit B");
    assert!(unit_b.class_of(b_ref).is_some());
    let unit_a = resolution.unit("A.gvc").expect("loaded in the last round");
    assert!(unit_a.resolved(a_ref).is_none());
    assert_eq!(unit_a.error_count(), 1);
}

#[test]
fn test_diagnostics_serialize_to_json() {
    let session = session(ClassTable::with_runtime_classes(), false, 16);
    let mut b = ModuleBuilder::new("Main.gvc").package("p");
    let class = b.class("Main");
    b.field(class, "missing", Some("Missing"));
    let mut program = Program::new(&session);
    program.add_module(b.finish());
    let resolution = program.resolve();

    let diagnostics: Vec<_> = resolution.diagnostics().collect();
    let json = serde_json::to_value(&diagnostics).expect("serializable");
    assert_eq!(json[0]["code"], 5001);
    assert_eq!(json[0]["file"], "Main.gvc");
}
