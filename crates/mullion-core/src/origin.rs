//! Inbound origin trust policy.

/// Which browser origins an endpoint accepts messages from.
///
/// Any page can post into a frame's message channel, so shape validation
/// alone is not a trust boundary. The policy is a required construction
/// parameter of both endpoints; the permissive [`OriginPolicy::Any`] exists
/// for tests and same-origin deployments and must be opted into explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginPolicy {
    /// Accept any origin.
    Any,
    /// Accept only the listed origins (exact match on the serialized
    /// origin, e.g. `https://account.example.com`).
    AllowList(Vec<String>),
}

impl OriginPolicy {
    /// Accept any origin.
    pub fn any() -> Self {
        Self::Any
    }

    /// Accept exactly one origin.
    pub fn single(origin: impl Into<String>) -> Self {
        Self::AllowList(vec![normalize(origin.into())])
    }

    /// Accept each origin in the list.
    pub fn allow_list<S: Into<String>>(origins: impl IntoIterator<Item = S>) -> Self {
        Self::AllowList(origins.into_iter().map(|origin| normalize(origin.into())).collect())
    }

    /// Whether a message arriving from `origin` passes the policy.
    pub fn allows(&self, origin: &str) -> bool {
        match self {
            Self::Any => true,
            Self::AllowList(origins) => {
                let origin = origin.trim_end_matches('/');
                origins.iter().any(|allowed| allowed == origin)
            },
        }
    }
}

/// Origins compare without a trailing slash.
fn normalize(origin: String) -> String {
    let trimmed = origin.trim_end_matches('/');
    if trimmed.len() == origin.len() { origin } else { trimmed.to_string() }
}
