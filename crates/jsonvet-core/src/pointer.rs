//! JSON Pointer (RFC 6901) values used for schema and instance addressing
//!
//! Copyright (c) 2025 Jsonvet Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use serde_json::Value;
use std::fmt;

/// An RFC 6901 JSON Pointer kept in its escaped string form.
///
/// The empty pointer addresses the document root. Tokens are stored with
/// `~0`/`~1` escapes applied, so the string form can be used directly as a
/// registry key or URI fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JsonPointer(String);

impl JsonPointer {
    /// The root pointer (empty string)
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Parse a pointer from its escaped string form, validating syntax
    pub fn parse(pointer: &str) -> Result<Self> {
        if pointer.is_empty() {
            return Ok(Self::root());
        }
        if !pointer.starts_with('/') {
            return Err(Error::argument(format!(
                "JSON pointer must start with '/' or be empty, got '{}'",
                pointer
            )));
        }
        for segment in pointer.split('/').skip(1) {
            let mut chars = segment.chars().peekable();
            while let Some(ch) = chars.next() {
                if ch == '~' && !matches!(chars.peek(), Some('0') | Some('1')) {
                    return Err(Error::argument(format!(
                        "Invalid escape sequence in JSON pointer '{}'",
                        pointer
                    )));
                }
            }
        }
        Ok(Self(pointer.to_string()))
    }

    /// Append an (unescaped) token, escaping it as needed
    pub fn push(&self, token: &str) -> Self {
        Self(format!("{}/{}", self.0, escape(token)))
    }

    /// Append an array index token
    pub fn push_index(&self, index: usize) -> Self {
        Self(format!("{}/{}", self.0, index))
    }

    /// The escaped string form; empty for the root pointer
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the root pointer
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The pointer relative to a prefix, if this pointer lies under it
    pub fn strip_prefix(&self, prefix: &JsonPointer) -> Option<JsonPointer> {
        if prefix.is_root() {
            return Some(self.clone());
        }
        match self.0.strip_prefix(&prefix.0) {
            Some("") => Some(JsonPointer::root()),
            Some(rest) if rest.starts_with('/') => Some(JsonPointer(rest.to_string())),
            _ => None,
        }
    }

    /// Navigate a JSON value to the location this pointer addresses
    pub fn navigate<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        let mut current = root;
        for segment in self.0.split('/').skip(1) {
            let token = unescape(segment);
            match current {
                Value::Object(map) => current = map.get(&token)?,
                Value::Array(items) => {
                    let index: usize = token.parse().ok()?;
                    current = items.get(index)?;
                }
                _ => return None,
            }
        }
        Some(current)
    }
}

impl fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Escape one reference token per RFC 6901
pub fn escape(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Unescape one reference token per RFC 6901
pub fn unescape(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_root_pointer() {
        let root = JsonPointer::root();
        assert!(root.is_root());
        assert_eq!(root.as_str(), "");
        let value = json!({"a": 1});
        assert_eq!(root.navigate(&value), Some(&value));
    }

    #[test]
    fn test_push_escapes_tokens() {
        let ptr = JsonPointer::root().push("a/b").push("c~d");
        assert_eq!(ptr.as_str(), "/a~1b/c~0d");
    }

    #[test]
    fn test_navigation() {
        let value = json!({
            "definitions": {"User": {"type": "object"}},
            "items": [1, 2, 3],
            "odd/key": true
        });

        let ptr = JsonPointer::parse("/definitions/User/type").unwrap();
        assert_eq!(ptr.navigate(&value), Some(&json!("object")));

        let ptr = JsonPointer::parse("/items/1").unwrap();
        assert_eq!(ptr.navigate(&value), Some(&json!(2)));

        let ptr = JsonPointer::parse("/odd~1key").unwrap();
        assert_eq!(ptr.navigate(&value), Some(&json!(true)));

        let ptr = JsonPointer::parse("/missing").unwrap();
        assert_eq!(ptr.navigate(&value), None);
    }

    #[test]
    fn test_parse_rejects_bad_pointers() {
        assert!(JsonPointer::parse("no-slash").is_err());
        assert!(JsonPointer::parse("/bad~escape").is_err());
        assert!(JsonPointer::parse("/ok~0/also~1ok").is_ok());
    }

    #[test]
    fn test_strip_prefix() {
        let full = JsonPointer::parse("/properties/foo/type").unwrap();
        let prefix = JsonPointer::parse("/properties/foo").unwrap();
        assert_eq!(
            full.strip_prefix(&prefix),
            Some(JsonPointer::parse("/type").unwrap())
        );
        assert_eq!(full.strip_prefix(&JsonPointer::root()), Some(full.clone()));
        let other = JsonPointer::parse("/items").unwrap();
        assert_eq!(full.strip_prefix(&other), None);
    }
}
