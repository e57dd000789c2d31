//! Hierarchical namespaces.
//!
//! A namespace is a `/`-separated path of non-empty segments, e.g.
//! `teamA/app`. Leading and trailing separators are ignored, so `/teamA/app/`
//! and `teamA/app` are the same namespace.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};

/// Segment separator.
pub const SEPARATOR: char = '/';

/// A validated, normalized namespace.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Namespace(String);

impl Namespace {
    /// Parse and normalize a namespace.
    pub fn new(raw: &str) -> Result<Self> {
        let invalid = |reason: &str| CoreError::InvalidNamespace {
            namespace: raw.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = raw.trim_matches(SEPARATOR);
        if trimmed.is_empty() {
            return Err(invalid("namespace is empty"));
        }

        for segment in trimmed.split(SEPARATOR) {
            if segment.is_empty() {
                return Err(invalid("empty segment"));
            }
            if segment == "." || segment == ".." {
                return Err(invalid("relative segment"));
            }
            if segment == "*" {
                return Err(invalid("wildcard is only valid in grant scopes"));
            }
            if segment.chars().any(|c| c.is_whitespace() || c.is_control()) {
                return Err(invalid("whitespace or control character"));
            }
        }

        Ok(Self(trimmed.to_string()))
    }

    /// The normalized text form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate over the segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(SEPARATOR)
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// Whether `self` equals `ancestor` or lies below it.
    ///
    /// Matching is by whole segment: `teamA` contains `teamA/app` but not
    /// `teamAB`.
    pub fn is_within(&self, ancestor: &Namespace) -> bool {
        match self.0.strip_prefix(ancestor.as_str()) {
            Some("") => true,
            Some(rest) => rest.starts_with(SEPARATOR),
            None => false,
        }
    }

    /// The parent namespace, if any.
    pub fn parent(&self) -> Option<Namespace> {
        self.0
            .rsplit_once(SEPARATOR)
            .map(|(parent, _)| Namespace(parent.to_string()))
    }
}

impl FromStr for Namespace {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Namespace({})", self.0)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Namespace {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Namespace {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Namespace::new(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ns(s: &str) -> Namespace {
        Namespace::new(s).unwrap()
    }

    #[test]
    fn test_normalizes_separators() {
        assert_eq!(ns("/teamA/app/"), ns("teamA/app"));
        assert_eq!(ns("teamA/app").depth(), 2);
    }

    #[test]
    fn test_rejects_bad_input() {
        for bad in ["", "/", "a//b", "a/./b", "../a", "a b", "a/*", "a/\tb"] {
            assert!(Namespace::new(bad).is_err(), "{:?} should be rejected", bad);
        }
    }

    #[test]
    fn test_is_within_matches_whole_segments() {
        let team = ns("teamA");
        assert!(ns("teamA").is_within(&team));
        assert!(ns("teamA/app").is_within(&team));
        assert!(ns("teamA/app/db").is_within(&team));
        assert!(!ns("teamAB").is_within(&team));
        assert!(!ns("teamB/app").is_within(&team));
        assert!(!team.is_within(&ns("teamA/app")));
    }

    #[test]
    fn test_parent() {
        assert_eq!(ns("a/b/c").parent(), Some(ns("a/b")));
        assert_eq!(ns("a").parent(), None);
    }
}
