//! Dependency range matching
//!
//! A dependency edge names its target either by an exact version or by a
//! `MAJOR.MINOR.x` wildcard. Wildcards accept every patch of that line,
//! prereleases included; anything else that parses as a semver requirement is
//! matched with standard requirement semantics.

use ::semver::{Version, VersionReq};
use tracing::debug;

pub use pkgreg_core::types::is_wildcard_patch;

/// How a range expression selects candidates
#[derive(Debug, Clone, PartialEq)]
enum RangeMatcher {
    /// `MAJOR.MINOR.x`
    Line { major: u64, minor: u64 },
    /// A single version that only matches itself
    Exact(Version),
    /// Any other semver requirement
    Requirement(VersionReq),
}

impl RangeMatcher {
    fn parse(range: &str) -> Option<Self> {
        let range = range.trim();

        if is_wildcard_patch(range) {
            let mut parts = range.split('.');
            let major = parts.next()?.parse().ok()?;
            let minor = parts.next()?.parse().ok()?;
            return Some(RangeMatcher::Line { major, minor });
        }

        if let Ok(version) = Version::parse(range) {
            return Some(RangeMatcher::Exact(version));
        }

        VersionReq::parse(range).ok().map(RangeMatcher::Requirement)
    }

    fn matches(&self, candidate: &Version) -> bool {
        match self {
            RangeMatcher::Line { major, minor } => {
                candidate.major == *major && candidate.minor == *minor
            },
            RangeMatcher::Exact(version) => candidate == version,
            RangeMatcher::Requirement(req) => req.matches(candidate),
        }
    }
}

/// Highest candidate satisfying `range` by semantic-version ordering.
///
/// Candidates that do not parse as semantic versions are skipped. Returns
/// `None` when the range itself is unparseable or nothing matches.
pub fn best_match<'a, I>(range: &str, candidates: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let matcher = match RangeMatcher::parse(range) {
        Some(matcher) => matcher,
        None => {
            debug!(range, "Unparseable dependency range");
            return None;
        },
    };

    candidates
        .into_iter()
        .filter_map(|candidate| Version::parse(candidate).ok().map(|parsed| (candidate, parsed)))
        .filter(|(_, parsed)| matcher.matches(parsed))
        .max_by(|(_, a), (_, b)| a.cmp(b))
        .map(|(candidate, _)| candidate.to_string())
}
