//! gvc: compile-time type-name resolution for a JVM-style language.
//!
//! The work is split across three crates, re-exported here:
//!
//! - [`common`] - spans, diagnostics and resolver limits
//! - [`ast`] - the program model handed over by the parser
//! - [`resolver`] - the resolution engine itself
//!
//! A typical embedding builds a [`ResolveSession`], feeds modules to a
//! [`Program`] and reads the per-unit results back:
//!
//! ```no_run
//! use gvc::{ClassTable, ModuleBuilder, Program, ResolveSession, ResolverOptions};
//! use std::sync::Arc;
//!
//! gvc::tracing_config::init_tracing();
//! let session = ResolveSession::new(
//!     ResolverOptions::default(),
//!     Arc::new(ClassTable::with_runtime_classes()),
//! );
//! let mut builder = ModuleBuilder::new("Main.gvc").package("app");
//! let main = builder.class("Main");
//! builder.field(main, "names", Some("List"));
//!
//! let mut program = Program::new(&session);
//! program.add_module(builder.finish());
//! let resolution = program.resolve();
//! assert_eq!(resolution.error_count(), 0);
//! ```

pub use gvc_ast as ast;
pub use gvc_common as common;
pub use gvc_resolver as resolver;

pub use gvc_ast::{ModuleAst, ModuleBuilder};
pub use gvc_common::{Diagnostic, DiagnosticCategory};
pub use gvc_resolver::{
    ClassTable, ExternalClass, ExternalResolver, MemoryLoader, Program, ProgramResolution,
    ResolveSession, ResolverOptions, SourceLoader, Target, UnitResolution, UnitResolver,
};

pub mod tracing_config;
