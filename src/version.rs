//! Provider version numbers and constraint expressions.
//!
//! Constraints use the comparator grammar `=`, `!=`, `>`, `>=`, `<`, `<=` and
//! the pessimistic operator `~>`, with comma-separated comparators all having
//! to hold. `~>` changes meaning with the number of written components:
//! `~> 4.48` allows `>= 4.48.0, < 5.0.0` while `~> 4.48.0` allows
//! `>= 4.48.0, < 4.49.0`.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parses `X`, `X.Y`, or `X.Y.Z`; missing components default to zero.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let (version, _) = parse_components(text)?;
        Ok(version)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Returns the version plus how many components were written, which the
/// pessimistic operator needs to pick its upper bound.
fn parse_components(text: &str) -> Result<(Version, usize), ConfigError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(bad_version(text));
    }
    let parts: Vec<&str> = text.split('.').collect();
    if parts.len() > 3 {
        return Err(bad_version(text));
    }
    let mut numbers = [0u64; 3];
    for (slot, part) in numbers.iter_mut().zip(&parts) {
        *slot = part.parse().map_err(|_| bad_version(text))?;
    }
    Ok((Version::new(numbers[0], numbers[1], numbers[2]), parts.len()))
}

fn bad_version(text: &str) -> ConfigError {
    ConfigError::Constraint(format!("\"{text}\" is not a valid version"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Pessimistic,
}

#[derive(Debug, Clone, PartialEq)]
struct Comparator {
    op: Op,
    version: Version,
    precision: usize,
}

impl Comparator {
    fn parse(text: &str) -> Result<Self, ConfigError> {
        let text = text.trim();
        let (op, rest) = if let Some(rest) = text.strip_prefix("~>") {
            (Op::Pessimistic, rest)
        } else if let Some(rest) = text.strip_prefix(">=") {
            (Op::Ge, rest)
        } else if let Some(rest) = text.strip_prefix("<=") {
            (Op::Le, rest)
        } else if let Some(rest) = text.strip_prefix("!=") {
            (Op::Ne, rest)
        } else if let Some(rest) = text.strip_prefix('>') {
            (Op::Gt, rest)
        } else if let Some(rest) = text.strip_prefix('<') {
            (Op::Lt, rest)
        } else if let Some(rest) = text.strip_prefix('=') {
            (Op::Eq, rest)
        } else {
            (Op::Eq, text)
        };
        let (version, precision) = parse_components(rest)?;
        Ok(Self {
            op,
            version,
            precision,
        })
    }

    fn allows(&self, candidate: &Version) -> bool {
        match self.op {
            Op::Eq => *candidate == self.version,
            Op::Ne => *candidate != self.version,
            Op::Gt => *candidate > self.version,
            Op::Ge => *candidate >= self.version,
            Op::Lt => *candidate < self.version,
            Op::Le => *candidate <= self.version,
            Op::Pessimistic => {
                *candidate >= self.version && *candidate < self.pessimistic_upper()
            }
        }
    }

    fn pessimistic_upper(&self) -> Version {
        if self.precision <= 2 {
            Version::new(self.version.major + 1, 0, 0)
        } else {
            Version::new(self.version.major, self.version.minor + 1, 0)
        }
    }
}

/// A parsed version constraint expression, e.g. `~> 4.48.0` or `>= 1.2, < 2.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionConstraint {
    text: String,
    comparators: Vec<Comparator>,
}

impl VersionConstraint {
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let parts: Vec<&str> = text.split(',').map(str::trim).collect();
        if parts.iter().any(|part| part.is_empty()) {
            return Err(ConfigError::Constraint(format!(
                "\"{text}\" is not a valid version constraint"
            )));
        }
        let comparators = parts
            .iter()
            .map(|part| Comparator::parse(part))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            text: parts.join(", "),
            comparators,
        })
    }

    pub fn allows(&self, candidate: &Version) -> bool {
        self.comparators.iter().all(|c| c.allows(candidate))
    }

    /// Newest version in `available` that the constraint allows.
    pub fn select(&self, available: &[Version]) -> Option<Version> {
        available.iter().filter(|v| self.allows(v)).max().copied()
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for VersionConstraint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for VersionConstraint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        VersionConstraint::parse(&text).map_err(de::Error::custom)
    }
}
