//! Owned key path into the registry tree.

use super::RegistryError;
use owo_colors::OwoColorize;
use std::fmt;

/// Ordered sequence of segment names identifying a node from the root.
///
/// Navigators carry one of these as their coordinate. Building a path never
/// touches the store.
///
/// # Example
///
/// ```ignore
/// let path = KeyPath::parse("server.http")?.child("port");
/// assert_eq!(path.as_dotted(), "server.http.port");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyPath(Vec<String>);

impl KeyPath {
    /// The empty path, addressing the root container.
    #[inline]
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Parse dotted notation (`"a.b.c"`).
    ///
    /// The empty string is the root path. Empty segments (`"a..b"`, `".a"`)
    /// are rejected.
    pub fn parse(dotted: &str) -> Result<Self, RegistryError> {
        if dotted.is_empty() {
            return Ok(Self::root());
        }
        let segments: Vec<String> = dotted.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(RegistryError::InvalidArgument(format!(
                "path `{dotted}` contains an empty segment"
            )));
        }
        Ok(Self(segments))
    }

    /// New path extended by one segment. `self` is left untouched.
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.extend(self.0.iter().cloned());
        segments.push(name.into());
        Self(segments)
    }

    /// New path extended by every segment of `other`.
    pub fn join(&self, other: &KeyPath) -> Self {
        let mut segments = self.0.clone();
        segments.extend(other.0.iter().cloned());
        Self(segments)
    }

    /// The first `len` segments (clamped to the path length).
    pub fn prefix(&self, len: usize) -> Self {
        Self(self.0[..len.min(self.0.len())].to_vec())
    }

    #[inline]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Plain dotted form, `""` for the root.
    pub fn as_dotted(&self) -> String {
        self.0.join(".")
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return write!(f, "{}", "<root>".bright_blue());
        }
        write!(f, "{}", format_args!("`{}`", self.as_dotted()).bright_blue())
    }
}

impl<S: Into<String>> FromIterator<S> for KeyPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::from_segments(iter)
    }
}

impl<'a> IntoIterator for &'a KeyPath {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl AsRef<[String]> for KeyPath {
    fn as_ref(&self) -> &[String] {
        &self.0
    }
}
