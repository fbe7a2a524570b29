//! Version constraint matching.
//!
//! # Responsibilities
//! - Decide whether a request's version token satisfies a route's constraint
//! - Keep constraint syntax out of the resolution algorithm
//!
//! # Design Decisions
//! - The router only consumes a boolean; matchers never fail a request
//! - Unparseable tokens or constraints simply do not match
//! - Constraints are parsed on every call, nothing is compiled ahead of time

use semver::{Version, VersionReq};

/// Predicate deciding whether a version token satisfies a constraint.
pub trait VersionMatcher: Send + Sync + std::fmt::Debug {
    /// Returns true if `version` satisfies `constraint`.
    fn satisfies(&self, version: &str, constraint: &str) -> bool;

    /// Checks that a constraint is well formed. Only consulted by eager
    /// route-set validation.
    fn check_constraint(&self, _constraint: &str) -> Result<(), String> {
        Ok(())
    }
}

/// Semantic-version ranges in the npm style.
///
/// A bare version is an exact match (`1.0.0`), whitespace-separated
/// comparators are ANDed (`>=1.2.0 <2.0.0`) and `||` separates alternatives.
/// Hyphen ranges (`1.2.3 - 2.0.0`), caret, tilde (also `~>`) and wildcards
/// are accepted.
/// An empty constraint matches any valid version.
#[derive(Debug, Clone, Copy, Default)]
pub struct SemverMatcher;

impl SemverMatcher {
    pub fn new() -> Self {
        Self
    }
}

impl VersionMatcher for SemverMatcher {
    fn satisfies(&self, version: &str, constraint: &str) -> bool {
        let Some(version) = parse_version(version) else {
            return false;
        };
        match parse_range(constraint) {
            Ok(alternatives) => alternatives.iter().any(|req| req.matches(&version)),
            Err(_) => false,
        }
    }

    fn check_constraint(&self, constraint: &str) -> Result<(), String> {
        parse_range(constraint).map(|_| ()).map_err(|e| e.to_string())
    }
}

/// Plain string equality after trimming. Suits date-style or opaque tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatcher;

impl VersionMatcher for ExactMatcher {
    fn satisfies(&self, version: &str, constraint: &str) -> bool {
        version.trim() == constraint.trim()
    }
}

fn parse_version(token: &str) -> Option<Version> {
    let token = token.trim().trim_start_matches(|c| c == 'v' || c == '=');
    Version::parse(token).ok()
}

fn parse_range(constraint: &str) -> Result<Vec<VersionReq>, semver::Error> {
    constraint.split("||").map(parse_comparator_set).collect()
}

fn parse_comparator_set(set: &str) -> Result<VersionReq, semver::Error> {
    let tokens: Vec<&str> = set.split_whitespace().collect();

    if let [low, "-", high] = tokens.as_slice() {
        return VersionReq::parse(&format!(">={}, <={}", strip_v(low), strip_v(high)));
    }

    let mut comparators = Vec::with_capacity(tokens.len());
    let mut operator: Option<&str> = None;

    for token in tokens {
        if token.chars().all(is_operator_char) {
            // ">= 1.2.0": operator split from its version
            if let Some(dangling) = operator.replace(token) {
                comparators.push(dangling.to_string());
            }
            continue;
        }

        let comparator = match operator.take() {
            Some(op) => normalize_comparator(&format!("{}{}", op, token)),
            None => normalize_comparator(token),
        };
        comparators.push(comparator);
    }

    // A trailing operator has no version; let the parser reject it.
    if let Some(dangling) = operator {
        comparators.push(dangling.to_string());
    }

    if comparators.is_empty() {
        return Ok(VersionReq::STAR);
    }
    VersionReq::parse(&comparators.join(", "))
}

/// Split off the operator, drop a `v` from the version, and make a bare
/// version exact. `~>` is read as `~`.
fn normalize_comparator(comparator: &str) -> String {
    let split = comparator
        .find(|c: char| !is_operator_char(c))
        .unwrap_or(comparator.len());
    let (op, version) = comparator.split_at(split);
    let version = strip_v(version);
    let op = if op == "~>" { "~" } else { op };

    if op.is_empty() && version.starts_with(|c: char| c.is_ascii_digit()) && !has_wildcard(version) {
        format!("={}", version)
    } else {
        format!("{}{}", op, version)
    }
}

fn is_operator_char(c: char) -> bool {
    matches!(c, '<' | '>' | '=' | '^' | '~')
}

fn has_wildcard(token: &str) -> bool {
    token
        .split('.')
        .any(|part| matches!(part, "*" | "x" | "X"))
}

fn strip_v(token: &str) -> &str {
    token.strip_prefix('v').unwrap_or(token)
}
