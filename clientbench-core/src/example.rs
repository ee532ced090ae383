//! Examples
//!
//! A raw example is the input fixture handed to every client; its payload is
//! opaque to the engine. Clients turn each payload, including nested partial
//! examples, into their own executable form.

use serde::{Deserialize, Serialize};

/// Input fixture: an opaque payload plus optional nested partial examples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawExample<P> {
    /// Display name
    pub name: String,
    /// Payload passed through to `Client::transform_raw_example`
    pub payload: P,
    /// Nested partial examples, transformed recursively
    #[serde(default = "Vec::new", skip_serializing_if = "Vec::is_empty")]
    pub partials: Vec<RawExample<P>>,
}

impl<P> RawExample<P> {
    /// Example without partials
    pub fn new(name: impl Into<String>, payload: P) -> Self {
        Self {
            name: name.into(),
            payload,
            partials: Vec::new(),
        }
    }

    /// Attach a nested partial example
    pub fn with_partial(mut self, partial: RawExample<P>) -> Self {
        self.partials.push(partial);
        self
    }

    /// Number of examples in this tree, including the root
    pub fn len(&self) -> usize {
        1 + self.partials.iter().map(RawExample::len).sum::<usize>()
    }

    /// Always false; an example tree has at least its root
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Client-specific executable example, mirroring the raw example tree
#[derive(Debug, Clone, PartialEq)]
pub struct Example<E> {
    /// Name of the raw example this was produced from
    pub name: String,
    /// Transformed payload
    pub value: E,
    /// Transformed partials, in raw order
    pub partials: Vec<Example<E>>,
}

impl<E> Example<E> {
    /// Example without partials
    pub fn new(name: impl Into<String>, value: E) -> Self {
        Self {
            name: name.into(),
            value,
            partials: Vec::new(),
        }
    }

    /// Look up a direct partial by name
    pub fn partial(&self, name: &str) -> Option<&Example<E>> {
        self.partials.iter().find(|p| p.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_tree_size() {
        let raw = RawExample::new("root", 1)
            .with_partial(RawExample::new("a", 2).with_partial(RawExample::new("a1", 3)))
            .with_partial(RawExample::new("b", 4));
        assert_eq!(raw.len(), 4);
    }

    #[test]
    fn test_partial_lookup() {
        let mut example = Example::new("root", "q");
        example.partials.push(Example::new("fragment", "f"));
        assert_eq!(example.partial("fragment").map(|p| p.value), Some("f"));
        assert!(example.partial("missing").is_none());
    }

    #[test]
    fn test_partials_omitted_when_empty() {
        let json = serde_json::to_value(RawExample::new("solo", 5)).unwrap();
        assert!(json.get("partials").is_none());
    }
}
