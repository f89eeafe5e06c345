//! Path-bound views over a registry tree.
//!
//! A [`Navigator`] is a coordinate: an immutable key path plus a handle to
//! the tree it points into. Extending the path is pure; only the verbs
//! (`register`, `register_batch`, `describe`, `get`, ...) read or mutate
//! the store.
//!
//! ```ignore
//! let cfg = cfgtree::root();
//! nav!(cfg.server)
//!     .describe("HTTP front end")
//!     .register("port", 8080, "listen port");
//!
//! assert_eq!(nav!(cfg.server.port).value(), Some(json!(8080)));
//! ```
//!
//! Verbs are methods, so any string is a valid segment name, including
//! `get` or `register`.
//!
//! # Error policy
//!
//! The chaining verbs are fail-soft: an error is recorded in the registry's
//! [`Diagnostics`], logged under [`ReportMode::Log`], and the same navigator
//! is returned so the chain stays usable. The `try_*` variants return the
//! error instead.
//!
//! # Panics
//!
//! The tree lives in a `RefCell`. Holding a `borrow_mut()` of
//! [`Navigator::root_handle`] while calling a verb panics.

use crate::tree::{ParamSpec, PathTree, Resolved};
use crate::types::{Diagnostic, Diagnostics, KeyPath, RegistryError};
use crate::{debug, log};
use serde_json::Value;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Shared handle to the tree behind a family of navigators.
pub type TreeHandle = Rc<RefCell<PathTree>>;

/// What the fail-soft verbs do with an error besides recording it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportMode {
    /// Print through `log!("error"; ..)`.
    #[default]
    Log,
    /// Record only.
    Collect,
}

/// Immutable path-bound view over a registry tree.
#[derive(Clone)]
pub struct Navigator {
    path: KeyPath,
    tree: TreeHandle,
    diagnostics: Rc<RefCell<Diagnostics>>,
    mode: ReportMode,
}

impl Navigator {
    /// Fresh navigator at the empty path, backed by a fresh empty tree.
    pub fn root() -> Self {
        Self::with_mode(ReportMode::default())
    }

    pub fn with_mode(mode: ReportMode) -> Self {
        Self {
            path: KeyPath::root(),
            tree: Rc::new(RefCell::new(PathTree::new())),
            diagnostics: Rc::new(RefCell::new(Diagnostics::new())),
            mode,
        }
    }

    fn rebind(&self, path: KeyPath) -> Self {
        Self {
            path,
            tree: Rc::clone(&self.tree),
            diagnostics: Rc::clone(&self.diagnostics),
            mode: self.mode,
        }
    }

    // ------------------------------------------------------------------------
    // Path extension
    // ------------------------------------------------------------------------

    /// Navigator one segment deeper. Never touches the tree.
    pub fn child(&self, name: impl Into<String>) -> Self {
        self.rebind(self.path.child(name))
    }

    /// Navigator several segments deeper.
    pub fn descend<I, S>(&self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rebind(self.path.join(&KeyPath::from_segments(segments)))
    }

    /// Navigator at a dotted sub-path (`"server.http"`).
    pub fn at(&self, dotted: &str) -> Result<Self, RegistryError> {
        Ok(self.rebind(self.path.join(&KeyPath::parse(dotted)?)))
    }

    // ------------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------------

    /// The accumulated path.
    pub fn current_path(&self) -> &KeyPath {
        &self.path
    }

    /// The tree shared by every navigator derived from the same root.
    pub fn root_handle(&self) -> TreeHandle {
        Rc::clone(&self.tree)
    }

    pub fn mode(&self) -> ReportMode {
        self.mode
    }

    /// Every error swallowed by fail-soft verbs on this registry so far.
    pub fn diagnostics(&self) -> Diagnostics {
        self.diagnostics.borrow().clone()
    }

    /// Drain the diagnostics shared by this navigator's tree, leaving an
    /// empty collection behind.
    pub fn take_diagnostics(&self) -> Diagnostics {
        self.diagnostics.take()
    }

    // ------------------------------------------------------------------------
    // Fail-soft verbs
    // ------------------------------------------------------------------------

    /// Register parameter `name` with a default under the bound path.
    ///
    /// Re-registering replaces the default and keeps any overridden value.
    /// Pass `""` for no description.
    pub fn register(&self, name: &str, default: impl Into<Value>, description: &str) -> &Self {
        let result = self.register_inner(name, default.into(), description);
        self.report("register", result)
    }

    /// Register several parameters under the bound path.
    pub fn register_batch(&self, entries: &[ParamSpec]) -> &Self {
        let result = self.register_batch_inner(entries);
        self.report("register_batch", result)
    }

    /// Describe the namespace at the bound path. No-op on a parameter.
    pub fn describe(&self, description: &str) -> &Self {
        let result = self.describe_inner(description);
        self.report("describe", result)
    }

    // ------------------------------------------------------------------------
    // Strict verbs
    // ------------------------------------------------------------------------

    pub fn try_register(
        &self,
        name: &str,
        default: impl Into<Value>,
        description: &str,
    ) -> Result<&Self, RegistryError> {
        self.register_inner(name, default.into(), description)?;
        Ok(self)
    }

    pub fn try_register_batch(&self, entries: &[ParamSpec]) -> Result<&Self, RegistryError> {
        self.register_batch_inner(entries)?;
        Ok(self)
    }

    pub fn try_describe(&self, description: &str) -> Result<&Self, RegistryError> {
        self.describe_inner(description)?;
        Ok(self)
    }

    // ------------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------------

    /// Resolved value at the bound path. `None` when nothing is there.
    pub fn get(&self) -> Option<Resolved> {
        self.tree.borrow().resolve_value(&self.path, None)
    }

    /// Resolved value of `name` under the bound path. An empty name reads
    /// the bound path itself.
    pub fn get_child(&self, name: &str) -> Option<Resolved> {
        self.tree.borrow().resolve_value(&self.path, Some(name))
    }

    /// Like [`get`](Self::get), collapsed to a plain value.
    pub fn value(&self) -> Option<Value> {
        self.get().map(Resolved::into_value)
    }

    /// Like [`get_child`](Self::get_child), collapsed to a plain value.
    pub fn value_of(&self, name: &str) -> Option<Value> {
        self.get_child(name).map(Resolved::into_value)
    }

    /// Whether a namespace or parameter exists at the bound path, or at
    /// `name` under it when given.
    pub fn contains(&self, name: Option<&str>) -> bool {
        let tree = self.tree.borrow();
        match name {
            Some(name) if !name.is_empty() => tree.contains(&self.path.child(name)),
            _ => tree.contains(&self.path),
        }
    }

    pub fn description(&self) -> Option<String> {
        self.tree.borrow().description(&self.path).map(str::to_string)
    }

    // ------------------------------------------------------------------------
    // Internal
    // ------------------------------------------------------------------------

    fn register_inner(&self, name: &str, default: Value, description: &str) -> Result<(), RegistryError> {
        self.tree
            .borrow_mut()
            .register_parameter(&self.path, name, Some(default), description)?;
        debug!("config"; "registered {}", self.path.child(name));
        Ok(())
    }

    fn register_batch_inner(&self, entries: &[ParamSpec]) -> Result<(), RegistryError> {
        self.tree
            .borrow_mut()
            .register_parameter_batch(&self.path, entries)?;
        debug!("config"; "registered {} parameters under {}", entries.len(), self.path);
        Ok(())
    }

    fn describe_inner(&self, description: &str) -> Result<(), RegistryError> {
        self.tree
            .borrow_mut()
            .set_description(&self.path, description)
    }

    fn report(&self, verb: &'static str, result: Result<(), RegistryError>) -> &Self {
        if let Err(error) = result {
            let diagnostic = Diagnostic::new(verb, self.path.clone(), error);
            if self.mode == ReportMode::Log {
                log!("error"; "{diagnostic}");
            }
            self.diagnostics.borrow_mut().push(diagnostic);
        }
        self
    }
}

/// Renders the resolved value at the bound path, or `<unset>`.
impl fmt::Display for Navigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(resolved) => write!(f, "{resolved}"),
            None => f.write_str("<unset>"),
        }
    }
}

impl fmt::Debug for Navigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigator")
            .field("path", &self.path.as_dotted())
            .field("mode", &self.mode)
            .finish()
    }
}

/// Chained segment access, `nav!(cfg.server.http)`.
///
/// Expands to [`Navigator::descend`] on the first identifier; the source
/// navigator is only borrowed.
#[macro_export]
macro_rules! nav {
    ($root:ident $(. $segment:ident)*) => {
        $root.descend({
            let segments: &[&str] = &[$(stringify!($segment)),*];
            segments.iter().copied()
        })
    };
}
