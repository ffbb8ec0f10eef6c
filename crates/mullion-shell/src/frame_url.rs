//! Account frame URL construction.
//!
//! The frame's `src` mirrors the host route: configured base URL, current
//! route path appended to the base path, and the current query forwarded -
//! except the reserved account parameter, which the host always sets
//! explicitly from the connected wallet. Rebuilding from the same router
//! state yields the same URL, so the embedder can recompute reactively
//! without churn.

use url::Url;

use crate::router::RouteLocation;

/// Reserved query parameter naming the active account (`chainId:address`).
///
/// Never forwarded from the host query; always set from wallet state.
pub const ACCOUNT_PARAM: &str = "account";

/// Why a frame URL could not be built.
#[derive(Debug, thiserror::Error)]
pub enum FrameUrlError {
    /// The configured base URL cannot carry a path/query (e.g. `data:`).
    #[error("base URL `{0}` cannot be a base")]
    OpaqueBase(Url),

    /// The route path was not absolute.
    #[error("route path must be absolute (got `{0}`)")]
    RelativePath(String),
}

/// Build the frame URL for a route, with the reserved account parameter
/// set to `account` when present.
///
/// Query parameters sort by key (the route query is a sorted map), and any
/// query on the base URL itself is discarded: the route is the single
/// source of the frame's query string.
pub fn build(base: &Url, route: &RouteLocation, account: Option<&str>) -> Result<Url, FrameUrlError> {
    if base.cannot_be_a_base() {
        return Err(FrameUrlError::OpaqueBase(base.clone()));
    }
    if !route.path.starts_with('/') {
        return Err(FrameUrlError::RelativePath(route.path.clone()));
    }

    let mut url = base.clone();
    let base_path = base.path().trim_end_matches('/');
    url.set_path(&format!("{base_path}{}", route.path));

    url.set_query(None);
    let forwarded: Vec<(&String, &String)> =
        route.query.iter().filter(|(key, _)| key.as_str() != ACCOUNT_PARAM).collect();
    if !forwarded.is_empty() || account.is_some() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in forwarded {
            pairs.append_pair(key, value);
        }
        if let Some(account) = account {
            pairs.append_pair(ACCOUNT_PARAM, account);
        }
    }

    Ok(url)
}
