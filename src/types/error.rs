//! Registry error types.

use super::KeyPath;
use owo_colors::OwoColorize;
use std::fmt;
use thiserror::Error;

// ============================================================================
// RegistryError
// ============================================================================

/// Errors surfaced by the path tree store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A container would have to be created through a registered parameter.
    #[error("item {prefix} is a registered parameter and cannot be redeclared as a namespace")]
    PathFinalConflict { prefix: KeyPath },

    /// A parameter name is already taken by a namespace container.
    #[error("item {path} is a namespace and cannot be registered as a parameter")]
    ContainerConflict { path: KeyPath },

    #[error("no parameter registered at {path}")]
    NotRegistered { path: KeyPath },
}

impl RegistryError {
    fn hint(&self) -> Option<&'static str> {
        match self {
            Self::PathFinalConflict { .. } => {
                Some("register nested values as a compound default instead")
            }
            Self::ContainerConflict { .. } => Some("pick a parameter name outside the namespace"),
            Self::NotRegistered { .. } => Some("register the parameter before overriding it"),
            Self::InvalidArgument(_) => None,
        }
    }
}

// ============================================================================
// Diagnostic
// ============================================================================

/// An error swallowed by a navigator verb.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Verb that failed (`register`, `register_batch`, `describe`).
    pub verb: &'static str,
    /// Path the navigator was bound to.
    pub path: KeyPath,
    pub error: RegistryError,
}

impl Diagnostic {
    pub fn new(verb: &'static str, path: KeyPath, error: RegistryError) -> Self {
        Self { verb, path, error }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}{}{} {}",
            "[".dimmed(),
            self.path.as_dotted().cyan(),
            "]".dimmed(),
            self.verb.dimmed()
        )?;
        write!(f, "{} {}", "→".red(), self.error)?;
        if let Some(hint) = self.error.hint() {
            write!(f, "\n  {} {}", "hint:".yellow(), hint)?;
        }
        Ok(())
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

/// Ordered record of every error swallowed by one registry.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            write!(f, "{entry}")?;
            if i + 1 < self.entries.len() {
                writeln!(f, "\n")?;
            }
        }
        if self.entries.len() > 1 {
            write!(
                f,
                "\n\n{} {} {}",
                "found".dimmed(),
                self.entries.len().to_string().red().bold(),
                "errors".dimmed()
            )?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
