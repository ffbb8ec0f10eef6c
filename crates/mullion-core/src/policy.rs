//! Version-mismatch policy.

use mullion_proto::VersionMatch;

/// How an endpoint treats a peer speaking a different protocol version.
///
/// The lenient default tolerates any mismatch with a warning, which keeps
/// independently deployed frontends talking across rollouts. Strict mode
/// rejects major-version mismatches (and unparseable versions) outright.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VersionPolicy {
    /// Warn on any mismatch, process the message anyway.
    #[default]
    Lenient,
    /// Reject major mismatches and unparseable versions; warn on
    /// minor/patch drift.
    Strict,
}

/// Outcome of applying a [`VersionPolicy`] to a classified version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionDecision {
    /// Versions agree; process silently.
    Accept,
    /// Mismatch tolerated; process after logging a warning.
    Warn,
    /// Mismatch not tolerated; drop the message.
    Reject,
}

impl VersionPolicy {
    /// Decide what to do with a message at the given version distance.
    pub fn decide(self, matched: VersionMatch) -> VersionDecision {
        match (self, matched) {
            (_, VersionMatch::Exact) => VersionDecision::Accept,
            (Self::Lenient, _) => VersionDecision::Warn,
            (Self::Strict, matched) => {
                if matched.acceptable_under_strict() {
                    VersionDecision::Warn
                } else {
                    VersionDecision::Reject
                }
            },
        }
    }
}
