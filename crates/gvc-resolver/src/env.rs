//! Generic-parameter environments and resolution contexts.

use gvc_ast::{ClassDeclId, GenericsTypeId};
use rustc_hash::FxHashMap;

/// Index of a generics environment in a unit's arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct EnvId(pub u32);

impl EnvId {
    /// The empty module-level environment.
    pub const ROOT: Self = Self(0);
}

#[derive(Debug, Default)]
struct GenericsEnv {
    parent: Option<EnvId>,
    names: FxHashMap<String, GenericsTypeId>,
}

/// Lexically chained environments. Static contexts start a chain without a
/// parent; closures and inner classes chain to the enclosing environment.
#[derive(Debug)]
pub(crate) struct EnvArena {
    envs: Vec<GenericsEnv>,
}

impl EnvArena {
    pub(crate) fn new() -> Self {
        Self {
            envs: vec![GenericsEnv::default()],
        }
    }

    pub(crate) fn push(&mut self, parent: Option<EnvId>) -> EnvId {
        let id = EnvId(u32::try_from(self.envs.len()).unwrap_or(u32::MAX));
        self.envs.push(GenericsEnv {
            parent,
            names: FxHashMap::default(),
        });
        id
    }

    pub(crate) fn declare(&mut self, env: EnvId, name: &str, param: GenericsTypeId) {
        if let Some(slot) = self.envs.get_mut(env.0 as usize) {
            slot.names.insert(name.to_string(), param);
        }
    }

    /// Innermost declaration of `name` visible from `env`.
    pub(crate) fn lookup(&self, env: EnvId, name: &str) -> Option<GenericsTypeId> {
        let mut cursor = Some(env);
        while let Some(id) = cursor {
            let scope = self.envs.get(id.0 as usize)?;
            if let Some(&param) = scope.names.get(name) {
                return Some(param);
            }
            cursor = scope.parent;
        }
        None
    }
}

/// Context a reference is resolved in.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ResolveCtx {
    /// Class being resolved; `None` for module-level imports.
    pub class: Option<ClassDeclId>,
    pub env: EnvId,
    /// Import being resolved, excluded from alias lookup.
    pub(crate) current_import: Option<usize>,
    pub(crate) annotation: bool,
}

impl ResolveCtx {
    pub fn module() -> Self {
        Self {
            class: None,
            env: EnvId::ROOT,
            current_import: None,
            annotation: false,
        }
    }

    pub fn for_class(class: ClassDeclId, env: EnvId) -> Self {
        Self {
            class: Some(class),
            env,
            ..Self::module()
        }
    }

    #[must_use]
    pub(crate) fn with_env(mut self, env: EnvId) -> Self {
        self.env = env;
        self
    }

    #[must_use]
    pub(crate) fn for_annotation(mut self) -> Self {
        self.annotation = true;
        self
    }

    #[must_use]
    pub(crate) fn for_import(mut self, import: usize) -> Self {
        self.current_import = Some(import);
        self
    }
}
