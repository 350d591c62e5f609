//! Collaborators outside the program: compiled classes and unloaded sources.

use crate::registry::ProgramRegistry;
use gvc_ast::{ClassKind, ModuleAst, Modifiers};
use rustc_hash::FxHashMap;
use std::sync::Mutex;

/// Answer of the external resolver for one fully-qualified name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Lookup {
    NotFound,
    /// A compiled class.
    Class(ExternalClass),
    /// The class is declared by this source unit, which is not loaded yet.
    SourceUnit(String),
}

/// Descriptor of a class the program does not compile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExternalClass {
    pub name: String,
    pub modifiers: Modifiers,
    pub kind: ClassKind,
    pub superclass: Option<String>,
    pub interfaces: Vec<String>,
    pub type_params: Vec<String>,
    /// Upper bounds per type parameter (binary names).
    pub type_param_bounds: Vec<Vec<String>>,
}

impl ExternalClass {
    /// A public class extending `java.lang.Object`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let superclass = (name != crate::builtins::OBJECT).then(|| crate::builtins::OBJECT.to_string());
        Self {
            name,
            modifiers: Modifiers::PUBLIC,
            kind: ClassKind::Class,
            superclass,
            interfaces: Vec::new(),
            type_params: Vec::new(),
            type_param_bounds: Vec::new(),
        }
    }

    /// A public interface.
    pub fn interface(name: impl Into<String>) -> Self {
        Self {
            kind: ClassKind::Interface,
            superclass: None,
            ..Self::new(name)
        }
    }

    #[must_use]
    pub fn with_kind(mut self, kind: ClassKind) -> Self {
        self.kind = kind;
        if kind.is_interface_like() {
            self.superclass = None;
        }
        self
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub fn extends(mut self, superclass: &str) -> Self {
        self.superclass = Some(superclass.to_string());
        self
    }

    #[must_use]
    pub fn implements(mut self, interface: &str) -> Self {
        self.interfaces.push(interface.to_string());
        self
    }

    /// Unbounded type parameters.
    #[must_use]
    pub fn type_params(mut self, names: &[&str]) -> Self {
        for name in names {
            self.type_params.push((*name).to_string());
            self.type_param_bounds.push(Vec::new());
        }
        self
    }

    /// A type parameter with upper bounds.
    #[must_use]
    pub fn bounded_param(mut self, name: &str, bounds: &[&str]) -> Self {
        self.type_params.push(name.to_string());
        self.type_param_bounds
            .push(bounds.iter().map(|b| (*b).to_string()).collect());
        self
    }

    /// Binary name of the enclosing class, if nested.
    pub fn outer_name(&self) -> Option<String> {
        let start = self.name.rfind('.').map_or(0, |dot| dot + 1);
        self.name[start..]
            .rfind('$')
            .map(|sep| self.name[..start + sep].to_string())
    }
}

/// Resolver for names not declared in the program.
///
/// Must be a pure function of its inputs: the same name against the same
/// registry contents gives the same answer.
pub trait ExternalResolver: Send + Sync {
    fn lookup(&self, name: &str, registry: &ProgramRegistry) -> Lookup;
}

/// Resolver that knows nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullResolver;

impl ExternalResolver for NullResolver {
    fn lookup(&self, _name: &str, _registry: &ProgramRegistry) -> Lookup {
        Lookup::NotFound
    }
}

/// In-memory table of external classes and unloaded source declarations.
#[derive(Clone, Debug, Default)]
pub struct ClassTable {
    classes: FxHashMap<String, ExternalClass>,
    sources: FxHashMap<String, String>,
}

impl ClassTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, class: ExternalClass) -> &mut Self {
        self.classes.insert(class.name.clone(), class);
        self
    }

    /// Declare that `class_name` lives in the source unit `file`.
    pub fn insert_source(&mut self, class_name: &str, file: &str) -> &mut Self {
        self.sources
            .insert(class_name.to_string(), file.to_string());
        self
    }

    pub fn len(&self) -> usize {
        self.classes.len() + self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A table with the JDK and Groovy runtime classes the default imports
    /// commonly reach.
    pub fn with_runtime_classes() -> Self {
        let mut table = Self::new();
        let public_static = Modifiers::PUBLIC | Modifiers::STATIC;
        table
            .insert(ExternalClass::new("java.lang.Object"))
            .insert(ExternalClass::interface("java.lang.CharSequence"))
            .insert(ExternalClass::interface("java.lang.Comparable").type_params(&["T"]))
            .insert(ExternalClass::interface("java.lang.Iterable").type_params(&["T"]))
            .insert(ExternalClass::interface("java.lang.Runnable"))
            .insert(ExternalClass::interface("java.lang.Cloneable"))
            .insert(ExternalClass::interface("java.io.Serializable"))
            .insert(
                ExternalClass::new("java.lang.String")
                    .with_modifiers(Modifiers::PUBLIC | Modifiers::FINAL)
                    .implements("java.lang.CharSequence")
                    .implements("java.lang.Comparable")
                    .implements("java.io.Serializable"),
            )
            .insert(
                ExternalClass::new("java.lang.Number")
                    .with_modifiers(Modifiers::PUBLIC | Modifiers::ABSTRACT)
                    .implements("java.io.Serializable"),
            )
            .insert(
                ExternalClass::new("java.lang.Integer")
                    .with_modifiers(Modifiers::PUBLIC | Modifiers::FINAL)
                    .extends("java.lang.Number")
                    .implements("java.lang.Comparable"),
            )
            .insert(
                ExternalClass::new("java.lang.Long")
                    .with_modifiers(Modifiers::PUBLIC | Modifiers::FINAL)
                    .extends("java.lang.Number")
                    .implements("java.lang.Comparable"),
            )
            .insert(ExternalClass::new("java.lang.Boolean"))
            .insert(ExternalClass::new("java.lang.Character"))
            .insert(ExternalClass::new("java.lang.Math"))
            .insert(ExternalClass::new("java.lang.System"))
            .insert(ExternalClass::new("java.lang.StringBuilder"))
            .insert(ExternalClass::new("java.lang.Class").type_params(&["T"]))
            .insert(
                ExternalClass::new("java.lang.Enum")
                    .with_modifiers(Modifiers::PUBLIC | Modifiers::ABSTRACT)
                    .bounded_param("E", &["java.lang.Enum"])
                    .implements("java.lang.Comparable"),
            )
            .insert(ExternalClass::new("java.lang.Thread").implements("java.lang.Runnable"))
            .insert(
                ExternalClass::new("java.lang.Thread$State")
                    .with_kind(ClassKind::Enum)
                    .with_modifiers(public_static)
                    .extends("java.lang.Enum"),
            )
            .insert(ExternalClass::new("java.lang.Throwable").implements("java.io.Serializable"))
            .insert(ExternalClass::new("java.lang.Exception").extends("java.lang.Throwable"))
            .insert(ExternalClass::new("java.lang.RuntimeException").extends("java.lang.Exception"))
            .insert(
                ExternalClass::new("java.lang.IllegalArgumentException")
                    .extends("java.lang.RuntimeException"),
            )
            .insert(
                ExternalClass::interface("java.util.Collection")
                    .type_params(&["E"])
                    .implements("java.lang.Iterable"),
            )
            .insert(
                ExternalClass::interface("java.util.List")
                    .type_params(&["E"])
                    .implements("java.util.Collection"),
            )
            .insert(
                ExternalClass::interface("java.util.Set")
                    .type_params(&["E"])
                    .implements("java.util.Collection"),
            )
            .insert(ExternalClass::interface("java.util.Map").type_params(&["K", "V"]))
            .insert(
                ExternalClass::interface("java.util.Map$Entry")
                    .with_modifiers(public_static)
                    .type_params(&["K", "V"]),
            )
            .insert(
                ExternalClass::new("java.util.ArrayList")
                    .type_params(&["E"])
                    .implements("java.util.List"),
            )
            .insert(
                ExternalClass::new("java.util.LinkedList")
                    .type_params(&["E"])
                    .implements("java.util.List"),
            )
            .insert(
                ExternalClass::new("java.util.HashSet")
                    .type_params(&["E"])
                    .implements("java.util.Set"),
            )
            .insert(
                ExternalClass::new("java.util.HashMap")
                    .type_params(&["K", "V"])
                    .implements("java.util.Map"),
            )
            .insert(ExternalClass::new("java.util.Optional").type_params(&["T"]))
            .insert(ExternalClass::new("java.util.Date"))
            .insert(ExternalClass::new("java.io.File"))
            .insert(ExternalClass::new("java.io.InputStream"))
            .insert(ExternalClass::new("java.io.IOException").extends("java.lang.Exception"))
            .insert(ExternalClass::new("java.net.URL"))
            .insert(ExternalClass::new("java.net.URI"))
            .insert(ExternalClass::new("groovy.lang.Closure").type_params(&["V"]))
            .insert(ExternalClass::new("groovy.lang.GString"))
            .insert(ExternalClass::new("groovy.lang.Script"))
            .insert(ExternalClass::new("groovy.util.Expando"));
        table
    }
}

impl ExternalResolver for ClassTable {
    fn lookup(&self, name: &str, registry: &ProgramRegistry) -> Lookup {
        // A unit also declares the nested classes of its top-level classes.
        let start = name.rfind('.').map_or(0, |dot| dot + 1);
        let top_level = match name[start..].find('$') {
            Some(sep) => &name[..start + sep],
            None => name,
        };
        if let Some(file) = self.sources.get(name).or_else(|| self.sources.get(top_level))
            && !registry.has_unit(file)
        {
            return Lookup::SourceUnit(file.clone());
        }
        match self.classes.get(name) {
            Some(class) => Lookup::Class(class.clone()),
            None => Lookup::NotFound,
        }
    }
}

/// Supplier of parsed modules for units scheduled during resolution.
pub trait SourceLoader: Send + Sync {
    fn load(&self, file: &str) -> Option<ModuleAst>;
}

/// Loader over modules parsed ahead of time. Each module is handed out once.
#[derive(Debug, Default)]
pub struct MemoryLoader {
    modules: Mutex<FxHashMap<String, ModuleAst>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, module: ModuleAst) {
        if let Ok(mut modules) = self.modules.lock() {
            modules.insert(module.file.clone(), module);
        }
    }
}

impl SourceLoader for MemoryLoader {
    fn load(&self, file: &str) -> Option<ModuleAst> {
        self.modules.lock().ok()?.remove(file)
    }
}
