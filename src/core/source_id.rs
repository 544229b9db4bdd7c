//! Source identification - WHERE packages come from.
//!
//! A SourceId names an abstract registry location. It is a label only:
//! the harness never dereferences it. SourceIds are interned for cheap
//! comparison and cloning.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{LazyLock, RwLock};

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Global source ID interner
static SOURCE_INTERNER: LazyLock<RwLock<HashMap<Url, &'static Url>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// A unique identifier for a registry source (interned).
///
/// SourceIds are cheap to clone and compare (pointer comparison).
#[derive(Clone, Copy)]
pub struct SourceId {
    url: &'static Url,
}

impl SourceId {
    /// Create a SourceId for a remote registry URL.
    pub fn for_remote(url: &str) -> Result<Self> {
        let url = Url::parse(url)?;
        Ok(Self::intern(url))
    }

    fn intern(url: Url) -> Self {
        // Fast path: check if already interned
        {
            let interner = SOURCE_INTERNER.read().unwrap();
            if let Some(&interned) = interner.get(&url) {
                return SourceId { url: interned };
            }
        }

        // Slow path: intern the new source ID
        let mut interner = SOURCE_INTERNER.write().unwrap();

        // Double-check after acquiring write lock
        if let Some(&interned) = interner.get(&url) {
            return SourceId { url: interned };
        }

        let leaked: &'static Url = Box::leak(Box::new(url.clone()));
        interner.insert(url, leaked);

        SourceId { url: leaked }
    }

    /// Parse a SourceId from a lock-file source string: `registry+<url>`.
    pub fn parse(s: &str) -> Result<Self> {
        let Some((kind, url)) = s.split_once('+') else {
            bail!("invalid source `{s}`: missing kind prefix");
        };
        if kind != "registry" {
            bail!("unknown source kind: {kind}");
        }
        Self::for_remote(url)
    }

    /// Get the registry URL.
    pub fn url(&self) -> &Url {
        self.url
    }

    /// Convert to a lock-file source string.
    pub fn to_url_string(&self) -> String {
        format!("registry+{}", self.url)
    }
}

impl PartialEq for SourceId {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.url, other.url)
    }
}

impl Eq for SourceId {}

impl Hash for SourceId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(self.url, state)
    }
}

impl fmt::Debug for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SourceId").field(&self.url.as_str()).finish()
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

impl Serialize for SourceId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_url_string().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SourceId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        SourceId::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interning() {
        let a = SourceId::for_remote("https://rubygems.org").unwrap();
        let b = SourceId::for_remote("https://rubygems.org").unwrap();
        let c = SourceId::for_remote("https://gems.example.com").unwrap();

        assert_eq!(a, b);
        assert!(std::ptr::eq(a.url, b.url));
        assert_ne!(a, c);
    }

    #[test]
    fn test_url_string_roundtrip() {
        let id = SourceId::for_remote("https://rubygems.org").unwrap();
        let s = id.to_url_string();
        assert!(s.starts_with("registry+https://rubygems.org"));

        let parsed = SourceId::parse(&s).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_parse_rejects_unknown_kind() {
        assert!(SourceId::parse("git+https://example.com/repo").is_err());
        assert!(SourceId::parse("https://example.com").is_err());
    }
}
