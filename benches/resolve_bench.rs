//! Resolution benchmarks.
//!
//! Measures a whole program run against a cold session and repeated unit
//! resolution against a session whose caches are already warm.

use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use gvc::{ClassTable, ModuleAst, ModuleBuilder, Program, ResolveSession, ResolverOptions, UnitResolver};
use std::sync::Arc;

/// Simple names drawn from the default-import packages.
const DEFAULT_IMPORTED: &[&str] = &[
    "String", "Integer", "List", "Map", "ArrayList", "HashMap", "File", "BigDecimal", "Thread",
    "Runnable",
];

fn session(parallel: bool) -> ResolveSession {
    let options = ResolverOptions {
        parallel,
        ..ResolverOptions::default()
    };
    ResolveSession::new(options, Arc::new(ClassTable::with_runtime_classes()))
}

/// One unit with a class per index, each holding a field of every
/// default-imported name plus a nested-class reference.
fn client_module(tag: usize, classes: usize) -> ModuleAst {
    let mut b = ModuleBuilder::new(format!("app/Client{tag}.gvc")).package("app");
    for index in 0..classes {
        let class = b.class(&format!("Client{tag}_{index}"));
        for (slot, name) in DEFAULT_IMPORTED.iter().enumerate() {
            b.field(class, &format!("f{slot}"), Some(name));
        }
        b.field(class, "state", Some("Thread.State"));
    }
    b.finish()
}

fn program_modules(units: usize) -> Vec<ModuleAst> {
    let mut modules = Vec::with_capacity(units + 1);
    let mut base = ModuleBuilder::new("lib/Base.gvc").package("lib");
    let base_class = base.class("Base");
    base.field(base_class, "names", Some("List"));
    modules.push(base.finish());
    for unit in 0..units {
        let mut b = ModuleBuilder::new(format!("app/Unit{unit}.gvc")).package("app");
        b.import("lib.Base");
        let class = b.class(&format!("Unit{unit}"));
        b.extends(class, "Base");
        for (slot, name) in DEFAULT_IMPORTED.iter().enumerate() {
            b.field(class, &format!("f{slot}"), Some(name));
        }
        modules.push(b.finish());
    }
    modules
}

fn bench_program(c: &mut Criterion) {
    let mut group = c.benchmark_group("program");
    for units in [8usize, 64] {
        for parallel in [false, true] {
            let label = if parallel { "parallel" } else { "sequential" };
            group.bench_with_input(BenchmarkId::new(label, units), &units, |b, &units| {
                b.iter_batched(
                    || program_modules(units),
                    |modules| {
                        let session = session(parallel);
                        let mut program = Program::new(&session);
                        for module in modules {
                            program.add_module(module);
                        }
                        black_box(program.resolve().error_count())
                    },
                    BatchSize::SmallInput,
                );
            });
        }
    }
    group.finish();
}

fn bench_warm_unit(c: &mut Criterion) {
    let session = session(false);
    // Prime the positive and negative caches.
    UnitResolver::new(&session, Arc::new(client_module(0, 4))).run();

    let mut tag = 0usize;
    c.bench_function("unit_warm_caches", |b| {
        b.iter_batched(
            || {
                tag += 1;
                Arc::new(client_module(tag, 4))
            },
            |module| black_box(UnitResolver::new(&session, module).run().error_count()),
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_program, bench_warm_unit);
criterion_main!(benches);
