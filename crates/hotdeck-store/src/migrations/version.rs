//! Semantic schema versions
//!
//! Ordered by semver precedence. Build metadata (`+...`) is accepted and
//! discarded since it never affects ordering.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::{invalid_version, Result};
use hotdeck_core::errors::ExError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Identifier {
    Numeric(u64),
    Alpha(String),
}

impl Ord for Identifier {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Identifier::Numeric(a), Identifier::Numeric(b)) => a.cmp(b),
            (Identifier::Alpha(a), Identifier::Alpha(b)) => a.cmp(b),
            (Identifier::Numeric(_), Identifier::Alpha(_)) => Ordering::Less,
            (Identifier::Alpha(_), Identifier::Numeric(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Identifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Numeric(n) => write!(f, "{}", n),
            Identifier::Alpha(s) => f.write_str(s),
        }
    }
}

/// `MAJOR.MINOR.PATCH[-PRE]`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaVersion {
    major: u64,
    minor: u64,
    patch: u64,
    pre: Vec<Identifier>,
}

impl SchemaVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            pre: Vec::new(),
        }
    }

    /// Parse a version string such as `5.0.0-beta.10`
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
        let without_build = trimmed.split_once('+').map_or(trimmed, |(v, _)| v);
        let (core, pre) = match without_build.split_once('-') {
            Some((core, pre)) => (core, Some(pre)),
            None => (without_build, None),
        };

        let parts: Vec<&str> = core.split('.').collect();
        if parts.len() != 3 {
            return Err(invalid_version(input, "expected MAJOR.MINOR.PATCH"));
        }
        let number = |part: &str| -> Result<u64> {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid_version(input, "version parts must be numeric"));
            }
            part.parse()
                .map_err(|_| invalid_version(input, "version part too large"))
        };

        let mut version = Self::new(number(parts[0])?, number(parts[1])?, number(parts[2])?);
        if let Some(pre) = pre {
            for ident in pre.split('.') {
                if ident.is_empty()
                    || !ident
                        .bytes()
                        .all(|b| b.is_ascii_alphanumeric() || b == b'-')
                {
                    return Err(invalid_version(input, "malformed pre-release identifier"));
                }
                let parsed = if ident.bytes().all(|b| b.is_ascii_digit()) {
                    ident
                        .parse()
                        .map(Identifier::Numeric)
                        .map_err(|_| invalid_version(input, "pre-release number too large"))?
                } else {
                    Identifier::Alpha(ident.to_string())
                };
                version.pre.push(parsed);
            }
        }
        Ok(version)
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    pub fn patch(&self) -> u64 {
        self.patch
    }
}

impl Ord for SchemaVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (self.pre.is_empty(), other.pre.is_empty()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                // Vec ordering: identifier-wise, then shorter list first
                (false, false) => self.pre.cmp(&other.pre),
            })
    }
}

impl PartialOrd for SchemaVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        for (i, ident) in self.pre.iter().enumerate() {
            f.write_str(if i == 0 { "-" } else { "." })?;
            write!(f, "{}", ident)?;
        }
        Ok(())
    }
}

impl FromStr for SchemaVersion {
    type Err = ExError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for SchemaVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SchemaVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotdeck_core::ExErrorKind;

    fn v(s: &str) -> SchemaVersion {
        SchemaVersion::parse(s).unwrap()
    }

    #[test]
    fn test_semver_precedence_chain() {
        // Precedence example from semver.org
        let chain = [
            "1.0.0-alpha",
            "1.0.0-alpha.1",
            "1.0.0-alpha.beta",
            "1.0.0-beta",
            "1.0.0-beta.2",
            "1.0.0-beta.11",
            "1.0.0-rc.1",
            "1.0.0",
        ];
        for pair in chain.windows(2) {
            assert!(v(pair[0]) < v(pair[1]), "{} < {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_hotbar_versions_order() {
        assert!(v("5.0.0-alpha.0") < v("5.0.0-alpha.2"));
        assert!(v("5.0.0-alpha.2") < v("5.0.0-beta.5"));
        assert!(v("5.0.0-beta.5") < v("5.0.0-beta.10"));
        assert!(v("5.0.0-beta.10") < v("5.0.0"));
        assert!(v("4.9.9") < v("5.0.0-alpha.0"));
    }

    #[test]
    fn test_display_round_trips() {
        for s in ["0.9.0", "5.0.0-beta.10", "1.2.3-rc.1.x-y"] {
            assert_eq!(v(s).to_string(), s);
        }
        assert_eq!(v("1.0.0+build.7"), v("1.0.0"));
    }

    #[test]
    fn test_rejects_malformed() {
        for s in ["", "1.0", "1.0.0.0", "a.b.c", "1.0.0-", "1.0.0-beta..1", "-1.0.0"] {
            let err = SchemaVersion::parse(s).unwrap_err();
            assert_eq!(err.kind(), ExErrorKind::InvalidVersion, "{:?}", s);
        }
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&v("2.0.0-alpha.1")).unwrap();
        assert_eq!(json, "\"2.0.0-alpha.1\"");
        let back: SchemaVersion = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v("2.0.0-alpha.1"));
    }
}
