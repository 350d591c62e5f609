//! Per-unit resolution driver.
//!
//! A `UnitResolver` owns the resolution state of one module: the
//! `TypeRefId -> ResolvedRef` map, the generics environments, the collected
//! work lists and the unit's diagnostics. It borrows the session for
//! everything shared between units.
//!
//! Resolution is a two-phase pipeline. `collect` walks the module once and
//! records every reference to resolve, together with the context it is
//! resolved in, into two work lists:
//!
//! - the header list: generics headers, supertypes and shape publication of
//!   every class (outer classes before nested ones);
//! - the body list: cycle checks, imports, members, bodies, class completion.
//!
//! `run_stage` drains one list. A [`Program`](crate::Program) runs the header
//! stage of every unit before any body stage, so each class's shape is fixed
//! before members anywhere are resolved. `finalize` then settles deferred
//! references and validates generic constructions.

use crate::builtins;
use crate::env::{EnvArena, EnvId, ResolveCtx};
use crate::session::ResolveSession;
use crate::store::ClassId;
use crate::target::{Mode, ResolvedRef, Target};
use crate::unit_collect::Scopes;
use gvc_ast::{ClassDeclId, ExprId, GenericsTypeId, ImportKind, MethodId, ModuleAst, TypeRefId};
use gvc_common::diagnostics::get_message_template;
use gvc_common::{Diagnostic, Span, format_message};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::{debug, trace};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Stage {
    Header,
    Body,
}

#[derive(Clone, Debug)]
pub(crate) enum WorkItem {
    Resolve {
        type_ref: TypeRefId,
        ctx: ResolveCtx,
        mode: Mode,
        /// Try import aliases before the chain (supertypes).
        prefer_imports: bool,
    },
    GenericsHeader {
        params: SmallVec<[GenericsTypeId; 2]>,
        ctx: ResolveCtx,
    },
    PublishShape(ClassDeclId),
    CheckHierarchy(ClassDeclId),
    ResolveImports,
    ProbeVariable {
        expr: ExprId,
        ctx: ResolveCtx,
    },
    ProbeProperty {
        expr: ExprId,
        ctx: ResolveCtx,
    },
    ClassLiteral {
        expr: ExprId,
        type_ref: TypeRefId,
        ctx: ResolveCtx,
    },
    ClassFinished(ClassDeclId),
}

pub struct UnitResolver<'s> {
    pub(crate) session: &'s ResolveSession,
    pub(crate) module: Arc<ModuleAst>,
    pub(crate) file: Arc<str>,
    /// Module package with trailing dot, or `""`.
    pub(crate) package_prefix: String,
    /// Store ids of the module's declarations, indexed by `ClassDeclId`.
    pub(crate) class_ids: Vec<ClassId>,
    pub(crate) targets: Vec<Option<ResolvedRef>>,
    pub(crate) class_exprs: FxHashMap<ExprId, ClassId>,
    pub(crate) envs: EnvArena,
    class_envs: Vec<EnvId>,
    method_envs: FxHashMap<MethodId, EnvId>,
    pub(crate) header_work: Vec<WorkItem>,
    pub(crate) body_work: Vec<WorkItem>,
    collected: bool,
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) plain_aliases: IndexMap<String, usize>,
    pub(crate) static_aliases: IndexMap<String, usize>,
    /// Lazily resolved import targets; `Some(None)` also marks an import
    /// whose resolution is in progress.
    pub(crate) import_targets: Vec<Option<Option<Target>>>,
    pub(crate) imports_resolved: bool,
    /// Constructed type name -> references of the enclosing instances it was
    /// constructed with (`new Inner(new Outer())`).
    pub(crate) ctor_hints: FxHashMap<String, SmallVec<[TypeRefId; 1]>>,
    /// Classes whose shape has a supertype still pending.
    pub(crate) pending_shapes: Vec<ClassDeclId>,
    pub(crate) current_span: Span,
    pub(crate) depth: u32,
}

impl<'s> UnitResolver<'s> {
    /// Register the module's classes with the session and prepare its
    /// generics environments.
    pub fn new(session: &'s ResolveSession, module: Arc<ModuleAst>) -> Self {
        let class_ids = session.register_module(&module);
        let file: Arc<str> = Arc::from(module.file.as_str());
        let mut unit = Self {
            session,
            file,
            package_prefix: module.package_prefix(),
            class_ids,
            targets: vec![None; module.type_ref_count()],
            class_exprs: FxHashMap::default(),
            envs: EnvArena::new(),
            class_envs: Vec::with_capacity(module.class_count()),
            method_envs: FxHashMap::default(),
            header_work: Vec::new(),
            body_work: Vec::new(),
            collected: false,
            diagnostics: Vec::new(),
            plain_aliases: module.alias_table(ImportKind::Plain),
            static_aliases: module.alias_table(ImportKind::Static),
            import_targets: vec![None; module.imports.len()],
            imports_resolved: false,
            ctor_hints: FxHashMap::default(),
            pending_shapes: Vec::new(),
            current_span: Span::dummy(),
            depth: 0,
            module,
        };
        unit.build_envs();
        unit
    }

    /// Declarations are pooled outer-first and a local class's enclosing
    /// method belongs to an earlier declaration, so one pass in index order
    /// sees every parent environment before its children.
    fn build_envs(&mut self) {
        let module = Arc::clone(&self.module);
        for index in 0..module.class_count() {
            let decl_id = ClassDeclId(u32::try_from(index).unwrap_or(u32::MAX));
            let decl = module.class(decl_id);
            let parent = match (decl.enclosing_method, decl.outer) {
                (Some(method), _) => self.method_envs.get(&method).copied(),
                (None, Some(outer)) if !decl.is_static() && !decl.is_interface() => {
                    self.class_envs.get(outer.index()).copied()
                }
                _ => None,
            };
            let env = self.envs.push(parent);
            for &g in &decl.generics {
                if let Some(name) = module.generics_type(g).param_name() {
                    self.envs.declare(env, name, g);
                }
            }
            self.class_envs.push(env);

            for &method_id in &decl.methods {
                let method = module.method(method_id);
                let method_env = self
                    .envs
                    .push((!method.is_static()).then_some(env));
                for &g in &method.generics {
                    if let Some(name) = module.generics_type(g).param_name() {
                        self.envs.declare(method_env, name, g);
                    }
                }
                self.method_envs.insert(method_id, method_env);
            }
        }
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn module(&self) -> &ModuleAst {
        &self.module
    }

    /// Store id of one of this unit's declarations.
    pub fn class_id(&self, decl: ClassDeclId) -> Option<ClassId> {
        self.class_ids.get(decl.index()).copied()
    }

    /// Context for references written directly in `decl`.
    pub fn class_context(&self, decl: ClassDeclId) -> ResolveCtx {
        let env = self
            .class_envs
            .get(decl.index())
            .copied()
            .unwrap_or(EnvId::ROOT);
        ResolveCtx::for_class(decl, env)
    }

    /// Context for references in the signature or body of `method`.
    pub fn method_context(&self, decl: ClassDeclId, method: MethodId) -> ResolveCtx {
        let ctx = self.class_context(decl);
        match self.method_envs.get(&method) {
            Some(&env) => ctx.with_env(env),
            None => ctx,
        }
    }

    /// Context of module-level references (imports).
    pub fn module_context(&self) -> ResolveCtx {
        ResolveCtx::module()
    }

    /// Resolve without forward registration. A failure leaves no trace
    /// beyond the session caches.
    pub fn resolve(&mut self, type_ref: TypeRefId, ctx: &ResolveCtx) -> bool {
        self.resolve_type_ref(type_ref, ctx, Mode::BestEffort, false)
    }

    /// Resolve with every strategy; a failure is reported as UnresolvedName.
    pub fn resolve_or_fail(&mut self, type_ref: TypeRefId, ctx: &ResolveCtx) -> bool {
        self.resolve_type_ref(type_ref, ctx, Mode::OrFail, false)
    }

    pub fn target(&self, type_ref: TypeRefId) -> Option<ResolvedRef> {
        self.targets.get(type_ref.index()).copied().flatten()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Resolve this unit on its own: both stages, then finalization.
    pub fn run(mut self) -> UnitResolution {
        self.collect();
        self.run_stage(Stage::Header);
        self.run_stage(Stage::Body);
        self.finalize();
        self.into_resolution()
    }

    // -------------------------------------------------------------------------
    // Staging
    // -------------------------------------------------------------------------

    /// Fill both work lists. Runs once.
    pub(crate) fn collect(&mut self) {
        if self.collected {
            return;
        }
        self.collected = true;
        let module = Arc::clone(&self.module);
        let top_level: Vec<ClassDeclId> = module.top_level_classes().collect();

        for &decl in &top_level {
            self.collect_header(&module, decl);
        }

        for index in 0..module.class_count() {
            let decl = ClassDeclId(u32::try_from(index).unwrap_or(u32::MAX));
            self.body_work.push(WorkItem::CheckHierarchy(decl));
        }
        self.body_work.push(WorkItem::ResolveImports);
        for &decl in &top_level {
            self.collect_body(&module, decl);
        }
        debug!(
            file = %self.file,
            header = self.header_work.len(),
            body = self.body_work.len(),
            "collected resolution work"
        );
    }

    fn collect_header(&mut self, module: &ModuleAst, decl: ClassDeclId) {
        let class = module.class(decl);
        let ctx = self.class_context(decl);
        if !class.generics.is_empty() {
            self.header_work.push(WorkItem::GenericsHeader {
                params: class.generics.clone(),
                ctx,
            });
        }
        for type_ref in class.superclass.iter().chain(class.interfaces.iter()) {
            self.header_work.push(WorkItem::Resolve {
                type_ref: *type_ref,
                ctx,
                mode: Mode::OrFail,
                prefer_imports: true,
            });
        }
        self.header_work.push(WorkItem::PublishShape(decl));
        for &inner in &class.inner {
            self.collect_header(module, inner);
        }
    }

    fn collect_body(&mut self, module: &ModuleAst, decl: ClassDeclId) {
        let class = module.class(decl);
        let ctx = self.class_context(decl);
        let mut scopes = Scopes::for_class(module, decl);

        for &annotation in &class.annotations {
            self.collect_annotation(module, annotation, ctx, &mut scopes);
        }
        for &field_id in &class.fields {
            let field = module.field(field_id);
            for &annotation in &field.annotations {
                self.collect_annotation(module, annotation, ctx, &mut scopes);
            }
            if let Some(type_ref) = field.type_ref {
                self.push_resolve(type_ref, ctx);
            }
            if let Some(init) = field.initializer {
                self.collect_expr(module, init, ctx, &mut scopes);
            }
        }
        for &property_id in &class.properties {
            let property = module.property(property_id);
            if property.field.is_none()
                && let Some(type_ref) = property.type_ref
            {
                self.push_resolve(type_ref, ctx);
            }
        }
        for &method in &class.methods {
            self.collect_method(module, decl, method);
        }
        for &block in &class.initializers {
            self.collect_stmt(module, block, ctx, &mut scopes);
        }
        self.body_work.push(WorkItem::ClassFinished(decl));

        for &inner in &class.inner {
            self.collect_body(module, inner);
        }
    }

    fn collect_method(&mut self, module: &ModuleAst, decl: ClassDeclId, method_id: MethodId) {
        let method = module.method(method_id);
        let ctx = self.method_context(decl, method_id);
        let mut scopes = Scopes::for_class(module, decl);

        if !method.generics.is_empty() {
            self.body_work.push(WorkItem::GenericsHeader {
                params: method.generics.iter().copied().collect(),
                ctx,
            });
        }
        scopes.push();
        for param in &method.params {
            if let Some(type_ref) = param.type_ref {
                self.push_resolve(type_ref, ctx);
            }
            if let Some(default) = param.default_value {
                self.collect_expr(module, default, ctx, &mut scopes);
            }
            scopes.declare(&param.name);
        }
        for type_ref in method.return_type.iter().chain(method.exceptions.iter()) {
            self.push_resolve(*type_ref, ctx);
        }
        for &annotation in &method.annotations {
            self.collect_annotation(module, annotation, ctx, &mut scopes);
        }
        if let Some(body) = method.body {
            self.collect_stmt(module, body, ctx, &mut scopes);
        }
        scopes.pop();
    }

    fn collect_annotation(
        &mut self,
        module: &ModuleAst,
        annotation: gvc_ast::AnnotationId,
        ctx: ResolveCtx,
        scopes: &mut Scopes,
    ) {
        let annotation = module.annotation(annotation);
        self.body_work.push(WorkItem::Resolve {
            type_ref: annotation.type_ref,
            ctx: ctx.for_annotation(),
            mode: Mode::OrFail,
            prefer_imports: false,
        });
        for (_, value) in &annotation.members {
            self.collect_expr(module, *value, ctx, scopes);
        }
    }

    pub(crate) fn push_resolve(&mut self, type_ref: TypeRefId, ctx: ResolveCtx) {
        self.body_work.push(WorkItem::Resolve {
            type_ref,
            ctx,
            mode: Mode::OrFail,
            prefer_imports: false,
        });
    }

    /// Drain one work list.
    pub(crate) fn run_stage(&mut self, stage: Stage) {
        self.collect();
        let work = match stage {
            Stage::Header => std::mem::take(&mut self.header_work),
            Stage::Body => std::mem::take(&mut self.body_work),
        };
        debug!(file = %self.file, ?stage, items = work.len(), "draining stage");
        for item in work {
            self.execute(item);
        }
    }

    fn execute(&mut self, item: WorkItem) {
        match item {
            WorkItem::Resolve {
                type_ref,
                ctx,
                mode,
                prefer_imports,
            } => {
                self.resolve_type_ref(type_ref, &ctx, mode, prefer_imports);
            }
            WorkItem::GenericsHeader { params, ctx } => self.resolve_generics_header(&params, &ctx),
            WorkItem::PublishShape(decl) => self.publish_shape(decl),
            WorkItem::CheckHierarchy(decl) => self.check_hierarchy(decl),
            WorkItem::ResolveImports => self.resolve_imports(),
            WorkItem::ProbeVariable { expr, ctx } => self.probe_variable(expr, &ctx),
            WorkItem::ProbeProperty { expr, ctx } => self.probe_property(expr, &ctx),
            WorkItem::ClassLiteral {
                expr,
                type_ref,
                ctx,
            } => {
                if self.resolve_type_ref(type_ref, &ctx, Mode::OrFail, false)
                    && let Some(id) = self.class_target(type_ref)
                {
                    self.class_exprs.insert(expr, id);
                }
            }
            WorkItem::ClassFinished(decl) => {
                let id = self.class_ids[decl.index()];
                trace!(class = %self.module.class(decl).name, "class resolved");
                self.session
                    .registry()
                    .mark_complete(id, &self.module.class(decl).name);
            }
        }
    }

    // -------------------------------------------------------------------------
    // Shared helpers
    // -------------------------------------------------------------------------

    pub(crate) fn target_of(&self, type_ref: TypeRefId) -> Option<Target> {
        self.target(type_ref).map(|r| r.target)
    }

    pub(crate) fn class_target(&self, type_ref: TypeRefId) -> Option<ClassId> {
        self.target_of(type_ref).and_then(Target::class)
    }

    pub(crate) fn set_target(&mut self, type_ref: TypeRefId, target: Target, placeholder: bool) {
        if let Some(slot) = self.targets.get_mut(type_ref.index()) {
            *slot = Some(ResolvedRef {
                target,
                placeholder,
            });
        }
    }

    pub(crate) fn clear_target(&mut self, type_ref: TypeRefId) {
        if let Some(slot) = self.targets.get_mut(type_ref.index()) {
            *slot = None;
        }
    }

    /// Binary name of the class a context resolves in, or the file name.
    pub(crate) fn context_name(&self, ctx: &ResolveCtx) -> String {
        match ctx.class {
            Some(decl) => self.module.class(decl).name.clone(),
            None => self.file.to_string(),
        }
    }

    pub(crate) fn object_id(&self) -> ClassId {
        self.session.store().object()
    }

    pub(crate) fn builtin_class(&self, name: &str) -> Option<ClassId> {
        builtins::builtin_name(name).and_then(|b| self.session.store().lookup(b))
    }

    /// Record an error diagnostic with a templated message.
    pub(crate) fn error(&mut self, span: Span, code: u32, args: &[&str]) {
        let diagnostic = self.make_error(span, code, args);
        self.diagnostics.push(diagnostic);
    }

    /// Like `error`, with a note at a second location of this unit.
    pub(crate) fn error_with_related(
        &mut self,
        span: Span,
        code: u32,
        args: &[&str],
        related: Span,
        note: String,
    ) {
        let diagnostic = self.make_error(span, code, args).with_related(
            self.file.to_string(),
            related.start,
            related.len(),
            note,
        );
        self.diagnostics.push(diagnostic);
    }

    fn make_error(&self, span: Span, code: u32, args: &[&str]) -> Diagnostic {
        let message = match get_message_template(code) {
            Some(template) => format_message(template, args),
            None => args.join(" "),
        };
        debug!(file = %self.file, code, message = %message, "resolution error");
        Diagnostic::error(self.file.to_string(), span.start, span.len(), message, code)
    }

    pub(crate) fn into_resolution(self) -> UnitResolution {
        UnitResolution {
            file: self.file.to_string(),
            module: self.module,
            class_ids: self.class_ids,
            targets: self.targets,
            class_exprs: self.class_exprs,
            diagnostics: self.diagnostics,
        }
    }
}

/// Final resolution state of one unit.
#[derive(Debug)]
pub struct UnitResolution {
    file: String,
    module: Arc<ModuleAst>,
    class_ids: Vec<ClassId>,
    targets: Vec<Option<ResolvedRef>>,
    class_exprs: FxHashMap<ExprId, ClassId>,
    diagnostics: Vec<Diagnostic>,
}

impl UnitResolution {
    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn module(&self) -> &ModuleAst {
        &self.module
    }

    pub fn target(&self, type_ref: TypeRefId) -> Option<ResolvedRef> {
        self.targets.get(type_ref.index()).copied().flatten()
    }

    pub fn resolved(&self, type_ref: TypeRefId) -> Option<Target> {
        self.target(type_ref).map(|r| r.target)
    }

    /// Class a reference resolved to, looking through arrays.
    pub fn class_of(&self, type_ref: TypeRefId) -> Option<ClassId> {
        let mut cursor = type_ref;
        for _ in 0..self.targets.len() {
            match self.resolved(cursor)? {
                Target::Class(id) => return Some(id),
                Target::Array(component) => cursor = component,
                Target::TypeParam(_) | Target::Pending(_) => return None,
            }
        }
        None
    }

    /// Class an expression was found to denote.
    pub fn class_expr(&self, expr: ExprId) -> Option<ClassId> {
        self.class_exprs.get(&expr).copied()
    }

    pub fn class_id(&self, decl: ClassDeclId) -> Option<ClassId> {
        self.class_ids.get(decl.index()).copied()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    /// Every reference has a settled target.
    pub fn is_fully_resolved(&self) -> bool {
        self.targets
            .iter()
            .all(|t| matches!(t, Some(r) if !matches!(r.target, Target::Pending(_))))
    }
}
