//! Tree node model.

use super::resolve::is_truthy;
use rustc_hash::FxHashMap;
use serde::Serialize;
use serde_json::{Map, Value};

/// One node of the registry tree.
///
/// A `Leaf` never turns back into a `Container`; nothing is ever removed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Container(Container),
    Leaf(Leaf),
}

impl Node {
    pub(super) fn container() -> Self {
        Self::Container(Container::default())
    }

    pub fn as_container(&self) -> Option<&Container> {
        match self {
            Self::Container(container) => Some(container),
            Self::Leaf(_) => None,
        }
    }

    pub fn as_container_mut(&mut self) -> Option<&mut Container> {
        match self {
            Self::Container(container) => Some(container),
            Self::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            Self::Container(_) => None,
        }
    }

    /// Container `describe` text, or the leaf's registration description.
    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Container(container) => container.description.as_deref(),
            Self::Leaf(leaf) => Some(&leaf.description),
        }
    }

    /// Effective value of this node: a leaf's resolved value, or an object
    /// of effective child values for a container.
    pub fn effective_value(&self) -> Value {
        match self {
            Self::Container(container) => container.effective_value(),
            Self::Leaf(leaf) => leaf.effective().clone(),
        }
    }
}

/// Namespace segment holding child containers and leaves.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Container {
    pub children: FxHashMap<String, Node>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Container {
    pub fn get(&self, name: &str) -> Option<&Node> {
        self.children.get(name)
    }

    /// Child names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.children.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn effective_value(&self) -> Value {
        let names = self.names();
        let mut map = Map::with_capacity(names.len());
        for name in names {
            map.insert(name.to_string(), self.children[name].effective_value());
        }
        Value::Object(map)
    }
}

/// A registered parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Leaf {
    /// Current value; `None` until overridden.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    pub default: Value,
    pub description: String,
}

impl Leaf {
    pub fn new(default: Value, description: impl Into<String>) -> Self {
        Self {
            value: None,
            default,
            description: description.into(),
        }
    }

    /// `value` if truthy, otherwise `default`.
    ///
    /// A value deliberately overridden to `0`, `""`, `false` or `null` falls
    /// back to the default.
    pub fn effective(&self) -> &Value {
        match &self.value {
            Some(value) if is_truthy(value) => value,
            _ => &self.default,
        }
    }
}

/// One entry of a batch registration.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    /// `None` skips the entry, like registering without a default.
    pub default: Option<Value>,
    pub description: String,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, default: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            default: Some(default.into()),
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_effective_prefers_truthy_value() {
        let mut leaf = Leaf::new(json!(5), "");
        assert_eq!(leaf.effective(), &json!(5));

        leaf.value = Some(json!(7));
        assert_eq!(leaf.effective(), &json!(7));

        leaf.value = Some(json!(0));
        assert_eq!(leaf.effective(), &json!(5));

        leaf.value = Some(json!(""));
        assert_eq!(leaf.effective(), &json!(5));
    }

    #[test]
    fn test_container_effective_value() {
        let mut inner = Container::default();
        inner
            .children
            .insert("port".into(), Node::Leaf(Leaf::new(json!(8080), "")));

        let mut outer = Container::default();
        outer.children.insert("http".into(), Node::Container(inner));
        outer
            .children
            .insert("name".into(), Node::Leaf(Leaf::new(json!("api"), "")));

        assert_eq!(
            outer.effective_value(),
            json!({ "http": { "port": 8080 }, "name": "api" })
        );
        assert_eq!(outer.names(), ["http", "name"]);
    }

    #[test]
    fn test_node_serializes_with_kind_tag() {
        let node = Node::Leaf(Leaf::new(json!(1), "one"));
        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            json!({ "kind": "leaf", "default": 1, "description": "one" })
        );
    }
}
