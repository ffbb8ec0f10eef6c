//! Protocol version constants and comparison.
//!
//! Versions are semver strings. How a mismatch is treated is a policy
//! decision owned by the endpoints; this module only classifies.

/// Version stamped into every outbound envelope.
pub const PROTOCOL_VERSION: &str = "1.0.0";

/// Result of comparing a peer's version string against [`PROTOCOL_VERSION`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionMatch {
    /// Identical version string.
    Exact,
    /// Same major version; minor/patch drift.
    Compatible,
    /// Different major version.
    MajorMismatch,
    /// Not a parseable semver string.
    Unparseable,
}

impl VersionMatch {
    /// Whether a strict policy would accept a message at this level.
    pub fn acceptable_under_strict(self) -> bool {
        matches!(self, Self::Exact | Self::Compatible)
    }
}

/// Classify a peer-supplied version string against [`PROTOCOL_VERSION`].
pub fn classify(theirs: &str) -> VersionMatch {
    if theirs == PROTOCOL_VERSION {
        return VersionMatch::Exact;
    }
    let Ok(theirs) = semver::Version::parse(theirs) else {
        return VersionMatch::Unparseable;
    };
    let Ok(ours) = semver::Version::parse(PROTOCOL_VERSION) else {
        return VersionMatch::Unparseable;
    };
    if theirs.major == ours.major { VersionMatch::Compatible } else { VersionMatch::MajorMismatch }
}
