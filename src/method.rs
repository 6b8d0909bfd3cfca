//! Method matching for registered routes.
//!
//! Requests carry an [`http::Method`], which already covers RFC 9110, WebDAV
//! and any extension token a client sends. A route either names one method or
//! accepts every method (registered through [`Router::any`](crate::Router::any)).

use std::fmt;

use http::Method;

/// The method half of a route's match condition.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum MethodFilter {
    /// The `*` wildcard: matches every request method.
    Any,
    Only(Method),
}

impl MethodFilter {
    pub(crate) fn matches(&self, method: &Method) -> bool {
        match self {
            Self::Any => true,
            Self::Only(m) => m == method,
        }
    }
}

impl fmt::Display for MethodFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("*"),
            Self::Only(m) => f.write_str(m.as_str()),
        }
    }
}

/// Methods whose body is buffered and decoded before the chain runs.
pub(crate) fn carries_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}
