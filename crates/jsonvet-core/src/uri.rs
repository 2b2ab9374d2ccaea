//! Absolute-URI and schema-location handling
//!
//! URIs are compared in a normalized form: scheme and host case-insensitive,
//! path and query case-sensitive, percent-encoded octets normalized to
//! uppercase hex, trailing slash significant. Fragments never live inside a
//! [`Uri`]; they travel separately in a [`Location`].
//!
//! Copyright (c) 2025 Jsonvet Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use crate::pointer::JsonPointer;
use std::fmt;
use url::Url;

/// A normalized absolute URI without a fragment
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Uri(String);

impl Uri {
    /// Parse an absolute URI, dropping any fragment
    pub fn parse(input: &str) -> Result<Self> {
        let url = Url::parse(input)
            .map_err(|e| Error::argument(format!("'{}' is not an absolute URI: {}", input, e)))?;
        Ok(Self::from_url(&url))
    }

    fn from_url(url: &Url) -> Self {
        let mut url = url.clone();
        url.set_fragment(None);
        Self(normalize_percent_encoding(url.as_str()))
    }

    /// Resolve a (possibly relative) reference against this base.
    ///
    /// Returns the resolved base URI and the percent-decoded fragment
    /// (empty when the reference carries none).
    pub fn resolve(&self, reference: &str) -> Result<Location> {
        let base = Url::parse(&self.0).map_err(|e| {
            Error::argument(format!("'{}' is not an absolute URI: {}", self.0, e))
        })?;
        let resolved = base.join(reference).map_err(|e| {
            Error::argument(format!(
                "Cannot resolve reference '{}' against '{}': {}",
                reference, self.0, e
            ))
        })?;
        let fragment = percent_decode(resolved.fragment().unwrap_or(""));
        Ok(Location {
            base: Self::from_url(&resolved),
            fragment,
        })
    }

    /// The normalized text form
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The location of this URI's root schema
    pub fn root_location(&self) -> Location {
        Location {
            base: self.clone(),
            fragment: String::new(),
        }
    }

    /// The location of a pointer within this URI's bucket
    pub fn at_pointer(&self, pointer: &JsonPointer) -> Location {
        Location {
            base: self.clone(),
            fragment: pointer.as_str().to_string(),
        }
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A (base URI, fragment) pair — the universal addressing unit.
///
/// The fragment is either a JSON Pointer (empty or starting with `/`) or an
/// anchor name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub base: Uri,
    pub fragment: String,
}

impl Location {
    /// Parse an absolute URI with an optional fragment
    pub fn parse(input: &str) -> Result<Self> {
        match input.split_once('#') {
            Some((base, fragment)) => Ok(Self {
                base: Uri::parse(base)?,
                fragment: percent_decode(fragment),
            }),
            None => Ok(Uri::parse(input)?.root_location()),
        }
    }

    /// Whether the fragment addresses by pointer rather than by anchor
    pub fn is_pointer(&self) -> bool {
        self.fragment.is_empty() || self.fragment.starts_with('/')
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.base, self.fragment)
    }
}

/// Uppercase the hex digits of every percent-encoded octet
fn normalize_percent_encoding(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            out.push('%');
            out.push(bytes[i + 1].to_ascii_uppercase() as char);
            out.push(bytes[i + 2].to_ascii_uppercase() as char);
            i += 3;
        } else {
            out.push(bytes[i] as char);
            i += 1;
        }
    }
    out
}

/// Decode percent-encoded octets in a fragment
fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = &input[i + 1..i + 3];
            if let Ok(byte) = u8::from_str_radix(hex, 16) {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8(out).unwrap_or_else(|_| input.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_case() {
        let a = Uri::parse("HTTPS://Example.COM/Schema").unwrap();
        let b = Uri::parse("https://example.com/Schema").unwrap();
        assert_eq!(a, b);
        // path stays case-sensitive
        let c = Uri::parse("https://example.com/schema").unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_parse_strips_fragment() {
        let a = Uri::parse("http://json-schema.org/draft-07/schema#").unwrap();
        let b = Uri::parse("http://json-schema.org/draft-07/schema").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_percent_encoding_uppercased() {
        let a = Uri::parse("https://example.com/a%2fb").unwrap();
        let b = Uri::parse("https://example.com/a%2Fb").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_trailing_slash_significant() {
        let a = Uri::parse("https://example.com/schemas/").unwrap();
        let b = Uri::parse("https://example.com/schemas").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_resolve_relative_reference() {
        let base = Uri::parse("https://example.com/schemas/root.json").unwrap();
        let loc = base.resolve("other.json#/definitions/a").unwrap();
        assert_eq!(loc.base.as_str(), "https://example.com/schemas/other.json");
        assert_eq!(loc.fragment, "/definitions/a");
        assert!(loc.is_pointer());
    }

    #[test]
    fn test_resolve_fragment_only() {
        let base = Uri::parse("https://example.com/root.json").unwrap();
        let loc = base.resolve("#anchor").unwrap();
        assert_eq!(loc.base, base);
        assert_eq!(loc.fragment, "anchor");
        assert!(!loc.is_pointer());
    }

    #[test]
    fn test_resolve_decodes_fragment() {
        let base = Uri::parse("https://example.com/root.json").unwrap();
        let loc = base.resolve("#/a%20b").unwrap();
        assert_eq!(loc.fragment, "/a b");
    }

    #[test]
    fn test_urn_bases() {
        let urn = Uri::parse("urn:jsonvet:anon:1").unwrap();
        let loc = urn.resolve("#/properties/x").unwrap();
        assert_eq!(loc.base, urn);
        assert_eq!(loc.fragment, "/properties/x");
    }

    #[test]
    fn test_rejects_relative_input() {
        assert!(Uri::parse("relative/path").is_err());
    }
}
