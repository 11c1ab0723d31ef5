//! Group access patterns for `readers` and `writers`
//!
//! An entry is a literal group name unless it starts with `$`, in which case
//! the rest is a regular expression that must match the whole group name
//! (`$org\dMSP` admits `org1MSP` ... `org9MSP`). Patterns are compiled once,
//! when the definition is built or deserialized.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Marker prefix selecting the regular-expression form.
pub const PATTERN_MARKER: char = '$';

#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum GroupPattern {
    Literal(String),
    Pattern { source: String, regex: Regex },
}

impl GroupPattern {
    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw.strip_prefix(PATTERN_MARKER) {
            Some(expr) => {
                let regex = Regex::new(&format!("^(?:{})$", expr))
                    .map_err(|e| format!("invalid group pattern '{}': {}", raw, e))?;
                Ok(Self::Pattern {
                    source: raw.to_string(),
                    regex,
                })
            }
            None if raw.is_empty() => Err("group name must be non-empty".into()),
            None => Ok(Self::Literal(raw.to_string())),
        }
    }

    pub fn matches(&self, group: &str) -> bool {
        match self {
            Self::Literal(name) => name == group,
            Self::Pattern { regex, .. } => regex.is_match(group),
        }
    }

    /// The entry as written in the definition.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Literal(name) => name,
            Self::Pattern { source, .. } => source,
        }
    }
}

impl TryFrom<String> for GroupPattern {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<GroupPattern> for String {
    fn from(pattern: GroupPattern) -> Self {
        pattern.as_str().to_string()
    }
}

impl PartialEq for GroupPattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl fmt::Debug for GroupPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

/// A set of group patterns. Empty means unrestricted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupSet(Vec<GroupPattern>);

impl GroupSet {
    /// Compile raw entries, failing on the first invalid one.
    pub fn parse<S: AsRef<str>>(raw: &[S]) -> Result<Self, String> {
        raw.iter()
            .map(|entry| GroupPattern::parse(entry.as_ref()))
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn permits(&self, group: &str) -> bool {
        self.is_empty() || self.0.iter().any(|p| p.matches(group))
    }
}
