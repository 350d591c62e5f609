//! Resolver configuration.

use anyhow::{Context, Result};
use gvc_common::limits::MAX_SCHEDULING_ROUNDS;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Implicit import packages, tried in order for unqualified names.
pub const DEFAULT_IMPORTS: &[&str] = &[
    "java.lang.",
    "java.util.",
    "java.io.",
    "java.net.",
    "groovy.lang.",
    "groovy.util.",
];

/// Options for a [`crate::ResolveSession`].
///
/// ```json
/// { "defaultImports": ["java.lang.", "java.util."], "parallel": false }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolverOptions {
    /// Ordered package prefixes (with trailing dot) implicitly imported by
    /// every unit.
    pub default_imports: Vec<String>,
    /// Resolve units on the rayon pool.
    pub parallel: bool,
    /// Rounds of "belongs to another source unit" loading.
    pub max_scheduling_rounds: u32,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            default_imports: DEFAULT_IMPORTS.iter().map(|p| (*p).to_string()).collect(),
            parallel: true,
            max_scheduling_rounds: MAX_SCHEDULING_ROUNDS,
        }
    }
}

impl ResolverOptions {
    /// Parse options from JSON text. Missing keys take their defaults.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let options: Self =
            serde_json::from_str(text).context("failed to parse resolver options")?;
        Ok(options.normalized())
    }

    /// Load options from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read resolver options from {}", path.display()))?;
        Self::from_json_str(&text)
            .with_context(|| format!("invalid resolver options in {}", path.display()))
    }

    /// Ensure every default import prefix ends with a dot and drop empty ones.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.default_imports.retain(|p| !p.trim().is_empty());
        for prefix in &mut self.default_imports {
            let trimmed = prefix.trim();
            *prefix = if trimmed.ends_with('.') {
                trimmed.to_string()
            } else {
                format!("{trimmed}.")
            };
        }
        self
    }
}
