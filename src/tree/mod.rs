//! Path tree store.
//!
//! In-memory nested mapping rooted at a single container. Containers are
//! created lazily, one level at a time, when registration or `describe`
//! walks through a missing segment. Reads never create anything.
//!
//! ```text
//! <root>                      Container
//! ├── server                  Container  "HTTP front end"
//! │   ├── port                Leaf       default 8080
//! │   └── tls                 Leaf       default { "enabled": false }
//! └── workers                 Leaf       default 4
//! ```
//!
//! The store has no internal locking. Register everything up front, read
//! afterwards; a concurrent host must serialize registration itself.

mod node;
mod resolve;

pub use node::{Container, Leaf, Node, ParamSpec};
pub use resolve::{Resolved, is_truthy};

use crate::types::{KeyPath, RegistryError};
use serde_json::Value;

/// Owner of one registry tree.
#[derive(Debug, Clone, PartialEq)]
pub struct PathTree {
    root: Node,
}

impl Default for PathTree {
    fn default() -> Self {
        Self::new()
    }
}

impl PathTree {
    pub fn new() -> Self {
        Self {
            root: Node::container(),
        }
    }

    /// The root node. Always a container.
    pub fn root(&self) -> &Node {
        &self.root
    }

    // ------------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------------

    /// Walk from the root, creating a container at each missing segment.
    ///
    /// Fails with `PathFinalConflict` if any segment, including the last,
    /// is a registered parameter. Nothing is created in that case: a leaf
    /// can only sit on an already existing prefix.
    pub fn ensure_container_path(&mut self, path: &KeyPath) -> Result<&mut Container, RegistryError> {
        self.ensure_path(path)?
            .as_container_mut()
            .ok_or_else(|| RegistryError::PathFinalConflict {
                prefix: path.clone(),
            })
    }

    /// Register a parameter `name` under the container at `path`.
    ///
    /// - `default == None` is a no-op.
    /// - An existing parameter keeps its current value; only `default` is
    ///   replaced (and the description, when a non-empty one is given).
    /// - A fresh parameter starts with no value.
    pub fn register_parameter(
        &mut self,
        path: &KeyPath,
        name: &str,
        default: Option<Value>,
        description: &str,
    ) -> Result<(), RegistryError> {
        let Some(default) = default else {
            return Ok(());
        };
        validate_name(name)?;
        self.check_not_container(path, name)?;

        let container = self.ensure_container_path(path)?;
        upsert_leaf(container, name, default, description);
        Ok(())
    }

    /// Register several parameters sharing the container at `path`.
    ///
    /// Every entry is validated before anything is touched, so a failing
    /// batch leaves the tree unchanged. Entries without a default are
    /// skipped.
    pub fn register_parameter_batch(
        &mut self,
        path: &KeyPath,
        entries: &[ParamSpec],
    ) -> Result<(), RegistryError> {
        if entries.is_empty() {
            return Ok(());
        }
        for entry in entries {
            validate_name(&entry.name)?;
            if entry.default.is_some() {
                self.check_not_container(path, &entry.name)?;
            }
        }

        let container = self.ensure_container_path(path)?;
        for entry in entries {
            if let Some(default) = &entry.default {
                upsert_leaf(container, &entry.name, default.clone(), &entry.description);
            }
        }
        Ok(())
    }

    /// Set the description of the container at `path`, creating it if
    /// needed.
    ///
    /// When `path` itself is a parameter this is a no-op: parameters keep
    /// the description given at registration. Walking *through* a parameter
    /// still fails with `PathFinalConflict`.
    pub fn set_description(&mut self, path: &KeyPath, description: &str) -> Result<(), RegistryError> {
        if let Node::Container(container) = self.ensure_path(path)? {
            container.description = Some(description.to_string());
        }
        Ok(())
    }

    /// Override the current value of the parameter at `path`.
    ///
    /// The default is left untouched. Never creates nodes.
    pub fn override_value(&mut self, path: &KeyPath, value: Value) -> Result<(), RegistryError> {
        match self.node_mut(path) {
            Some(Node::Leaf(leaf)) => {
                leaf.value = Some(value);
                Ok(())
            }
            _ => Err(RegistryError::NotRegistered { path: path.clone() }),
        }
    }

    // ------------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------------

    /// Resolve the effective value at `path`, or at `path.name` when `name`
    /// is non-empty.
    ///
    /// A parameter met mid-walk resolves first and the remaining segments
    /// index into its compound value. A container at the end of the walk is
    /// returned as a subtree. Missing segments yield `None`.
    pub fn resolve_value(&self, path: &KeyPath, name: Option<&str>) -> Option<Resolved> {
        let full = match name {
            Some(name) if !name.is_empty() => path.child(name),
            _ => path.clone(),
        };

        let mut node = &self.root;
        for (depth, segment) in full.iter().enumerate() {
            match node {
                Node::Container(container) => node = container.get(segment)?,
                Node::Leaf(leaf) => {
                    let rest = &full.segments()[depth..];
                    return resolve::descend(leaf.effective(), rest)
                        .cloned()
                        .map(Resolved::Value);
                }
            }
        }

        Some(match node {
            Node::Container(container) => Resolved::Subtree(container.clone()),
            Node::Leaf(leaf) => Resolved::Value(leaf.effective().clone()),
        })
    }

    /// Raw node stored exactly at `path`. Compound values are not entered.
    pub fn node(&self, path: &KeyPath) -> Option<&Node> {
        path.iter().try_fold(&self.root, |node, segment| {
            node.as_container()?.get(segment)
        })
    }

    /// Whether a container or parameter exists exactly at `path`.
    pub fn contains(&self, path: &KeyPath) -> bool {
        self.node(path).is_some()
    }

    pub fn description(&self, path: &KeyPath) -> Option<&str> {
        self.node(path)?.description()
    }

    /// Dump the whole tree for tooling and debugging.
    pub fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(&self.root)
    }

    // ------------------------------------------------------------------------
    // Internal
    // ------------------------------------------------------------------------

    /// Walk to `path`, creating missing containers. The final node may be a
    /// leaf; any leaf before it is a conflict. Empty segments are rejected
    /// before anything is inserted.
    fn ensure_path(&mut self, path: &KeyPath) -> Result<&mut Node, RegistryError> {
        if let Some(depth) = path.iter().position(String::is_empty) {
            return Err(RegistryError::InvalidArgument(format!(
                "segment {} of {} is empty",
                depth + 1,
                path
            )));
        }

        let mut node = &mut self.root;
        for (depth, segment) in path.iter().enumerate() {
            let Node::Container(container) = node else {
                return Err(RegistryError::PathFinalConflict {
                    prefix: path.prefix(depth),
                });
            };
            node = container
                .children
                .entry(segment.clone())
                .or_insert_with(Node::container);
        }
        Ok(node)
    }

    fn node_mut(&mut self, path: &KeyPath) -> Option<&mut Node> {
        let mut node = &mut self.root;
        for segment in path {
            node = node.as_container_mut()?.children.get_mut(segment)?;
        }
        Some(node)
    }

    fn check_not_container(&self, path: &KeyPath, name: &str) -> Result<(), RegistryError> {
        let target = path.child(name);
        match self.node(&target) {
            Some(Node::Container(_)) => Err(RegistryError::ContainerConflict { path: target }),
            _ => Ok(()),
        }
    }
}

fn validate_name(name: &str) -> Result<(), RegistryError> {
    if name.is_empty() {
        return Err(RegistryError::InvalidArgument(
            "parameter name must be a non-empty string".to_string(),
        ));
    }
    Ok(())
}

fn upsert_leaf(container: &mut Container, name: &str, default: Value, description: &str) {
    match container.children.get_mut(name) {
        Some(Node::Leaf(leaf)) => {
            leaf.default = default;
            if !description.is_empty() {
                leaf.description = description.to_string();
            }
        }
        // Ruled out by `check_not_container` before any mutation.
        Some(Node::Container(_)) => {}
        None => {
            container
                .children
                .insert(name.to_string(), Node::Leaf(Leaf::new(default, description)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(dotted: &str) -> KeyPath {
        KeyPath::parse(dotted).unwrap()
    }

    #[test]
    fn test_ensure_container_path_creates_each_level() {
        let mut tree = PathTree::new();
        tree.ensure_container_path(&path("a.b.c")).unwrap();

        assert!(matches!(tree.node(&path("a")), Some(Node::Container(_))));
        assert!(matches!(tree.node(&path("a.b")), Some(Node::Container(_))));
        assert!(matches!(tree.node(&path("a.b.c")), Some(Node::Container(_))));
        assert!(tree.node(&path("a.b.c.d")).is_none());
    }

    #[test]
    fn test_ensure_container_path_through_leaf_fails() {
        let mut tree = PathTree::new();
        tree.register_parameter(&path("a"), "port", Some(json!(1)), "")
            .unwrap();
        let before = tree.clone();

        let err = tree.ensure_container_path(&path("a.port.x.y")).unwrap_err();
        assert_eq!(
            err,
            RegistryError::PathFinalConflict {
                prefix: path("a.port")
            }
        );

        let err = tree.ensure_container_path(&path("a.port")).unwrap_err();
        assert!(matches!(err, RegistryError::PathFinalConflict { .. }));
        assert_eq!(tree, before);
    }

    #[test]
    fn test_empty_path_segment_is_rejected() {
        let mut tree = PathTree::new();
        tree.ensure_container_path(&path("a")).unwrap();
        let before = tree.clone();

        let blank = KeyPath::from_segments([""]);
        let nested_blank = KeyPath::from_segments(["a", "", "b"]);

        let err = tree
            .register_parameter(&blank, "x", Some(json!(1)), "")
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidArgument(_)));

        let err = tree
            .register_parameter_batch(&nested_blank, &[ParamSpec::new("x", 1)])
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidArgument(_)));

        let err = tree.set_description(&nested_blank, "blank").unwrap_err();
        assert!(matches!(err, RegistryError::InvalidArgument(_)));

        assert_eq!(tree, before);
        assert_eq!(tree.resolve_value(&nested_blank, None), None);
    }

    #[test]
    fn test_register_without_default_is_noop() {
        let mut tree = PathTree::new();
        tree.register_parameter(&path("a.b"), "x", None, "").unwrap();
        assert_eq!(tree, PathTree::new());
    }

    #[test]
    fn test_register_rejects_empty_name() {
        let mut tree = PathTree::new();
        let err = tree
            .register_parameter(&path("a"), "", Some(json!(1)), "")
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidArgument(_)));
        assert_eq!(tree, PathTree::new());
    }

    #[test]
    fn test_reregister_keeps_value_and_updates_default() {
        let mut tree = PathTree::new();
        let server = path("server");
        tree.register_parameter(&server, "port", Some(json!(8080)), "listen port")
            .unwrap();
        tree.override_value(&server.child("port"), json!(9000)).unwrap();
        tree.register_parameter(&server, "port", Some(json!(9090)), "")
            .unwrap();

        let leaf = tree.node(&path("server.port")).and_then(Node::as_leaf).unwrap();
        assert_eq!(leaf.default, json!(9090));
        assert_eq!(leaf.value, Some(json!(9000)));
        assert_eq!(leaf.description, "listen port");

        tree.register_parameter(&server, "port", Some(json!(1)), "new text")
            .unwrap();
        assert_eq!(tree.description(&path("server.port")), Some("new text"));
    }

    #[test]
    fn test_register_over_container_is_rejected() {
        let mut tree = PathTree::new();
        tree.set_description(&path("a.sub"), "namespace").unwrap();
        let before = tree.clone();

        let err = tree
            .register_parameter(&path("a"), "sub", Some(json!(1)), "")
            .unwrap_err();
        assert_eq!(err, RegistryError::ContainerConflict { path: path("a.sub") });
        assert_eq!(tree, before);
    }

    #[test]
    fn test_batch_matches_sequential_registration() {
        let entries = vec![
            ParamSpec::new("host", "localhost").with_description("bind host"),
            ParamSpec::new("port", 5432),
            ParamSpec::new("pool", json!({ "min": 1, "max": 8 })),
        ];

        let mut batched = PathTree::new();
        batched
            .register_parameter_batch(&path("db"), &entries)
            .unwrap();

        let mut sequential = PathTree::new();
        for entry in &entries {
            sequential
                .register_parameter(&path("db"), &entry.name, entry.default.clone(), &entry.description)
                .unwrap();
        }

        assert_eq!(batched, sequential);
        assert_eq!(
            batched.resolve_value(&path("db.pool"), Some("max")),
            Some(Resolved::Value(json!(8)))
        );
    }

    #[test]
    fn test_batch_validates_before_mutating() {
        let mut tree = PathTree::new();
        let entries = vec![ParamSpec::new("ok", 1), ParamSpec::new("", 2)];

        let err = tree
            .register_parameter_batch(&path("a"), &entries)
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidArgument(_)));
        assert_eq!(tree, PathTree::new());

        tree.register_parameter_batch(&path("a"), &[]).unwrap();
        assert_eq!(tree, PathTree::new());
    }

    #[test]
    fn test_batch_skips_entries_without_default() {
        let mut tree = PathTree::new();
        let mut skipped = ParamSpec::new("skipped", 0);
        skipped.default = None;

        tree.register_parameter_batch(&path("a"), &[ParamSpec::new("kept", 1), skipped])
            .unwrap();

        assert!(tree.contains(&path("a.kept")));
        assert!(!tree.contains(&path("a.skipped")));
    }

    #[test]
    fn test_set_description_on_container_and_leaf() {
        let mut tree = PathTree::new();
        tree.set_description(&path("server.http"), "front end").unwrap();
        assert_eq!(tree.description(&path("server.http")), Some("front end"));
        assert_eq!(tree.description(&path("server")), None);

        tree.register_parameter(&path("server"), "port", Some(json!(80)), "port")
            .unwrap();
        let before = tree.clone();
        tree.set_description(&path("server.port"), "ignored").unwrap();
        assert_eq!(tree, before);

        let err = tree
            .set_description(&path("server.port.deeper"), "nope")
            .unwrap_err();
        assert!(matches!(err, RegistryError::PathFinalConflict { .. }));
    }

    #[test]
    fn test_resolve_missing_path_does_not_mutate() {
        let tree = PathTree::new();
        assert_eq!(tree.resolve_value(&path("a.b.c"), None), None);
        assert_eq!(tree.resolve_value(&KeyPath::root(), Some("x")), None);
        assert_eq!(tree, PathTree::new());
    }

    #[test]
    fn test_resolve_walks_into_compound_values() {
        let mut tree = PathTree::new();
        tree.register_parameter(&path("test2"), "test21", Some(json!({ "key1": 20 })), "")
            .unwrap();

        assert_eq!(
            tree.resolve_value(&path("test2.test21"), None),
            Some(Resolved::Value(json!({ "key1": 20 })))
        );
        assert_eq!(
            tree.resolve_value(&path("test2.test21.key1"), None),
            Some(Resolved::Value(json!(20)))
        );
        assert_eq!(tree.resolve_value(&path("test2.test21.key2"), None), None);
    }

    #[test]
    fn test_resolve_container_returns_subtree() {
        let mut tree = PathTree::new();
        tree.register_parameter(&path("db"), "port", Some(json!(5432)), "")
            .unwrap();

        let resolved = tree.resolve_value(&path("db"), None).unwrap();
        assert!(resolved.as_subtree().is_some());
        assert_eq!(resolved.into_value(), json!({ "port": 5432 }));

        let root = tree.resolve_value(&KeyPath::root(), Some("")).unwrap();
        assert_eq!(root.into_value(), json!({ "db": { "port": 5432 } }));
    }

    #[test]
    fn test_falsy_value_falls_back_to_default() {
        let mut tree = PathTree::new();
        tree.register_parameter(&KeyPath::root(), "flag", Some(json!(5)), "")
            .unwrap();
        tree.override_value(&path("flag"), json!(0)).unwrap();

        assert_eq!(
            tree.resolve_value(&KeyPath::root(), Some("flag")),
            Some(Resolved::Value(json!(5)))
        );

        tree.override_value(&path("flag"), json!(3)).unwrap();
        assert_eq!(
            tree.resolve_value(&KeyPath::root(), Some("flag")),
            Some(Resolved::Value(json!(3)))
        );
    }

    #[test]
    fn test_override_requires_registered_parameter() {
        let mut tree = PathTree::new();
        tree.ensure_container_path(&path("a")).unwrap();
        let before = tree.clone();

        for target in ["a", "a.missing", "nowhere.at.all"] {
            let err = tree.override_value(&path(target), json!(1)).unwrap_err();
            assert_eq!(err, RegistryError::NotRegistered { path: path(target) });
        }
        assert_eq!(tree, before);
    }

    #[test]
    fn test_contains_reports_nodes_only() {
        let mut tree = PathTree::new();
        tree.register_parameter(&path("a"), "obj", Some(json!({ "k": 1 })), "")
            .unwrap();

        assert!(tree.contains(&KeyPath::root()));
        assert!(tree.contains(&path("a")));
        assert!(tree.contains(&path("a.obj")));
        assert!(!tree.contains(&path("a.obj.k")));
        assert!(!tree.contains(&path("b")));
    }

    #[test]
    fn test_to_json_dump() {
        let mut tree = PathTree::new();
        tree.set_description(&path("server"), "front end").unwrap();
        tree.register_parameter(&path("server"), "port", Some(json!(8080)), "listen port")
            .unwrap();

        assert_eq!(
            tree.to_json().unwrap(),
            json!({
                "kind": "container",
                "children": {
                    "server": {
                        "kind": "container",
                        "description": "front end",
                        "children": {
                            "port": {
                                "kind": "leaf",
                                "default": 8080,
                                "description": "listen port"
                            }
                        }
                    }
                }
            })
        );
    }
}
