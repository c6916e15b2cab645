use std::fmt;
use std::str::FromStr;

use semver::{Version, VersionReq};

/// Error type for version parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    #[error("Invalid version format: {0}")]
    InvalidFormat(String),
    #[error("Version parse error: {0}")]
    ParseError(String),
}

/// Cut a pre-release suffix: everything from the first `-` onward.
pub fn strip_prerelease(version: &str) -> &str {
    match version.find('-') {
        Some(idx) => &version[..idx],
        None => version,
    }
}

/// Parses a version, tolerating a leading `v` and missing minor/patch parts.
pub fn parse_version(version: &str) -> Result<Version, VersionError> {
    let trimmed = version.trim();
    let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
    if trimmed.is_empty() {
        return Err(VersionError::InvalidFormat(version.to_string()));
    }

    // Pad the release part only, leaving pre-release and build metadata alone
    let split_at = trimmed.find(['-', '+']).unwrap_or(trimmed.len());
    let (release, rest) = trimmed.split_at(split_at);
    let padded = match release.split('.').count() {
        1 => format!("{}.0.0{}", release, rest),
        2 => format!("{}.0{}", release, rest),
        _ => trimmed.to_string(),
    };

    Version::parse(&padded)
        .map_err(|e| VersionError::ParseError(format!("Invalid version '{}': {}", version, e)))
}

/// Represents a version requirement range.
///
/// Accepts the range grammar used by package manifests: comparators separated
/// by whitespace or commas, `||` alternatives, hyphen ranges (`1.2 - 2.3`),
/// caret, tilde, and `x`/`*` wildcards. A bare version means exactly that
/// version.
#[derive(Debug, Clone)]
pub struct VersionRange {
    /// The original constraint string (e.g., "^1.2.3", ">=2.0 <3 || 4.x")
    constraint: String,
    /// One parsed requirement per `||` alternative
    alternatives: Vec<VersionReq>,
}

impl VersionRange {
    /// Creates a new version range from a constraint string.
    pub fn from_constraint(constraint: &str) -> Result<Self, VersionError> {
        let alternatives = constraint
            .split("||")
            .map(|alternative| {
                let translated = translate_alternative(alternative);
                VersionReq::parse(&translated).map_err(|e| {
                    VersionError::ParseError(format!("Invalid version constraint '{}': {}", constraint, e))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            constraint: constraint.to_string(),
            alternatives,
        })
    }

    /// Checks if a specific `semver::Version` satisfies any alternative of this range.
    pub fn includes(&self, version: &Version) -> bool {
        self.alternatives.iter().any(|req| req.matches(version))
    }

    /// Returns the parsed requirement for each alternative.
    pub fn semver_reqs(&self) -> &[VersionReq] {
        &self.alternatives
    }

    /// Returns the original constraint string.
    pub fn constraint_string(&self) -> &str {
        &self.constraint
    }
}

/// Implement Display to show the original constraint string.
impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.constraint)
    }
}

/// Allow parsing directly from a string slice.
impl FromStr for VersionRange {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VersionRange::from_constraint(s)
    }
}

const OPERATORS: [&str; 7] = [">=", "<=", ">", "<", "=", "^", "~"];

/// Rewrites one `||` alternative into `semver::VersionReq` syntax.
fn translate_alternative(alternative: &str) -> String {
    let alternative = alternative.trim();

    if let Some((low, high)) = alternative.split_once(" - ") {
        return format!(">={}, <={}", trim_version(low.trim()), trim_version(high.trim()));
    }

    // Glue operators written apart from their version (">= 1.2") back together
    let mut comparators: Vec<String> = Vec::new();
    let mut pending_op: Option<&str> = None;
    for token in alternative.split([' ', '\t', ',']).filter(|t| !t.is_empty()) {
        if OPERATORS.contains(&token) {
            pending_op = Some(token);
            continue;
        }
        let token = match pending_op.take() {
            Some(op) => format!("{}{}", op, token),
            None => token.to_string(),
        };
        comparators.push(translate_comparator(&token));
    }

    // `*` must stand alone in a semver requirement and adds nothing next to others
    comparators.retain(|c| c != "*");
    if comparators.is_empty() {
        return "*".to_string();
    }
    comparators.join(", ")
}

fn translate_comparator(comparator: &str) -> String {
    let op = OPERATORS
        .iter()
        .find(|op| comparator.starts_with(**op))
        .copied()
        .unwrap_or("");
    let version = trim_version(&comparator[op.len()..]);

    if version == "*" {
        return "*".to_string();
    }
    match op {
        // A bare version pins exactly, unlike semver's default caret
        "" => format!("={}", version),
        _ => format!("{}{}", op, version),
    }
}

/// Drops a leading `v` and any wildcard components ("1.x" becomes "1").
fn trim_version(version: &str) -> String {
    let version = version.strip_prefix('v').unwrap_or(version);
    let kept: Vec<&str> = version
        .split('.')
        .take_while(|part| !matches!(*part, "x" | "X" | "*" | ""))
        .collect();
    if kept.is_empty() {
        "*".to_string()
    } else {
        kept.join(".")
    }
}

/// Answers whether a concrete version satisfies a range expression.
pub trait RangeCheck: Send + Sync {
    fn satisfies(&self, version: &str, range: &str) -> bool;
}

impl<F> RangeCheck for F
where
    F: Fn(&str, &str) -> bool + Send + Sync,
{
    fn satisfies(&self, version: &str, range: &str) -> bool {
        self(version, range)
    }
}

/// Default [`RangeCheck`] built on the `semver` crate.
///
/// Unparsable versions or ranges never satisfy.
#[derive(Debug, Clone, Copy, Default)]
pub struct SemverRanges;

impl RangeCheck for SemverRanges {
    fn satisfies(&self, version: &str, range: &str) -> bool {
        let range = match VersionRange::from_constraint(range) {
            Ok(range) => range,
            Err(e) => {
                log::debug!("{}", e);
                return false;
            }
        };
        match parse_version(version) {
            Ok(version) => range.includes(&version),
            Err(e) => {
                log::debug!("{}", e);
                false
            }
        }
    }
}
