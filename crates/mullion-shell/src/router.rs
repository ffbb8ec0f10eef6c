//! Host router seam.

use mullion_proto::Query;

/// A location in the host application: absolute path plus query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteLocation {
    /// Absolute path (`/assets`, `/settings/setup`, ...).
    pub path: String,
    /// Query parameters.
    pub query: Query,
}

impl RouteLocation {
    /// Location at `path` with no query.
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), query: Query::new() }
    }

    /// Attach query parameters.
    pub fn with_query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }
}

impl Default for RouteLocation {
    fn default() -> Self {
        Self::new("/")
    }
}

/// The host application's router, as seen by the frame host.
///
/// Implemented by the embedder over whatever routing library the host page
/// uses. The frame host only ever mirrors child-reported navigation with
/// [`Router::replace`] - a shallow update that must not create a history
/// entry - while [`Router::push`] exists for host-driven navigation.
pub trait Router {
    /// Current location.
    fn current(&self) -> RouteLocation;

    /// Navigate, creating a history entry.
    fn push(&mut self, location: RouteLocation);

    /// Replace the current location without creating a history entry.
    fn replace(&mut self, location: RouteLocation);
}
