//! cfgtree - a lazy hierarchical configuration registry.
//!
//! Callers walk an arbitrarily deep namespace without declaring it first,
//! then register parameters with defaults or read their resolved values.
//!
//! ```ignore
//! use cfgtree::{nav, ParamSpec};
//!
//! let cfg = cfgtree::root();
//! nav!(cfg.server.http)
//!     .describe("HTTP front end")
//!     .register("port", 8080, "listen port")
//!     .register_batch(&[
//!         ParamSpec::new("host", "0.0.0.0"),
//!         ParamSpec::new("keepalive", 75).with_description("seconds"),
//!     ]);
//!
//! assert_eq!(nav!(cfg.server.http.port).value(), Some(json!(8080)));
//! assert_eq!(nav!(cfg.server.unknown).get(), None);
//! ```
//!
//! # Modules
//!
//! | Module      | Purpose                                          |
//! |-------------|--------------------------------------------------|
//! | `navigator` | Immutable path-bound views and chaining verbs    |
//! | `tree`      | Path tree store, node model, value resolution    |
//! | `types`     | Key paths, errors and diagnostics                |
//! | `logger`    | Colored `log!`/`debug!` output                   |
//!
//! # Threading
//!
//! Everything is single-threaded and synchronous. Navigators share their
//! tree through `Rc<RefCell<_>>` and are therefore neither `Send` nor
//! `Sync`.

pub mod logger;
mod navigator;
pub mod tree;
pub mod types;

pub use navigator::{Navigator, ReportMode, TreeHandle};
pub use tree::{Container, Leaf, Node, ParamSpec, PathTree, Resolved, is_truthy};
pub use types::{Diagnostic, Diagnostics, KeyPath, RegistryError};

/// Fresh navigator at the empty path, backed by a fresh empty tree.
///
/// Every call creates an independent registry.
pub fn root() -> Navigator {
    Navigator::root()
}
