//! Dotted-numeric version comparison.
//!
//! Build tool versions are not semver: `7.6` is a complete Gradle version
//! and `2.10` is newer than `2.9`. Versions are compared component by
//! component, with a shorter version padded with zeros, so `7.6` and
//! `7.6.0` compare equal. A trailing qualifier (`8.0-rc-1`) orders before
//! the same numeric version without one.

use std::cmp::Ordering;

/// A parsed dotted-numeric version with an optional pre-release qualifier.
#[derive(Debug, Clone)]
pub struct VersionNumber {
    parts: Vec<u64>,
    qualifier: Option<String>,
}

impl VersionNumber {
    /// Parse a version string. Parsing is total: anything that is not a
    /// leading dotted-numeric sequence becomes the qualifier.
    pub fn parse(version: &str) -> Self {
        let split_at = version
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(version.len());

        let (numeric, rest) = version.split_at(split_at);

        let parts = numeric
            .split('.')
            .filter(|p| !p.is_empty())
            .map(|p| p.parse::<u64>().unwrap_or(0))
            .collect();

        let qualifier = rest.trim_start_matches(['-', '.', '_']);
        let qualifier = if qualifier.is_empty() {
            None
        } else {
            Some(qualifier.to_string())
        };

        Self { parts, qualifier }
    }
}

impl Ord for VersionNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.parts.len().max(other.parts.len());

        for i in 0..len {
            let left = self.parts.get(i).copied().unwrap_or(0);
            let right = other.parts.get(i).copied().unwrap_or(0);
            match left.cmp(&right) {
                Ordering::Equal => continue,
                ordering => return ordering,
            }
        }

        // a qualified version is a pre-release of the unqualified one
        match (&self.qualifier, &other.qualifier) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(left), Some(right)) => left.cmp(right),
        }
    }
}

impl PartialOrd for VersionNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for VersionNumber {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VersionNumber {}
