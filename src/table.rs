//! Route table: registration-ordered, matched by linear scan.
//!
//! A route matches when its method matches and its pattern has exactly as many
//! segments as the request path, each one either equal or a `:name` parameter.
//! The first such route in registration order wins. There is no specificity
//! ranking: `/a/:id` registered before `/a/b` shadows it.
//!
//! The pattern `*` never takes part in that scan. If nothing matched, the
//! first `*` route whose method matches is used as the catch-all.

use std::collections::HashMap;
use std::sync::Arc;

use http::Method;

use crate::error::Error;
use crate::handler::BoxedHandler;
use crate::method::MethodFilter;
use crate::request::RequestContext;

const CATCH_ALL: &str = "*";

// ── Routes ────────────────────────────────────────────────────────────────────

#[derive(Debug, PartialEq)]
enum Segment {
    Literal(String),
    Param(String),
}

pub(crate) struct Route<E> {
    method: MethodFilter,
    pattern: String,
    segments: Vec<Segment>,
    handlers: Arc<[BoxedHandler<E>]>,
}

impl<E> Route<E> {
    fn new(method: MethodFilter, pattern: &str, handlers: Vec<BoxedHandler<E>>) -> Self {
        // Segments are parsed once here, never per request.
        let segments = split(pattern)
            .map(|s| match s.strip_prefix(':') {
                Some(name) => Segment::Param(name.to_owned()),
                None => Segment::Literal(s.to_owned()),
            })
            .collect();
        Self { method, pattern: pattern.to_owned(), segments, handlers: handlers.into() }
    }

    pub(crate) fn pattern(&self) -> &str { &self.pattern }
    pub(crate) fn method(&self) -> &MethodFilter { &self.method }
    pub(crate) fn handlers(&self) -> &Arc<[BoxedHandler<E>]> { &self.handlers }

    fn is_catch_all(&self) -> bool {
        self.pattern == CATCH_ALL
    }

    /// Compares segment by segment; `None` on the first mismatch.
    fn bind(&self, path: &[&str]) -> Option<HashMap<String, String>> {
        // Segment counts must agree; `/a/:id` never matches `/a` or `/a/b/c`.
        if self.segments.len() != path.len() {
            return None;
        }
        // A fresh map per candidate so a partial match leaves nothing behind.
        let mut params = HashMap::new();
        for (segment, value) in self.segments.iter().zip(path) {
            match segment {
                Segment::Param(name) => {
                    params.insert(name.clone(), (*value).to_owned());
                }
                Segment::Literal(lit) if lit == value => {}
                Segment::Literal(_) => return None,
            }
        }
        Some(params)
    }
}

// ── Table ─────────────────────────────────────────────────────────────────────

pub(crate) struct RouteTable<E> {
    routes: Vec<Route<E>>,
}

impl<E> RouteTable<E> {
    pub(crate) fn new() -> Self {
        Self { routes: Vec::new() }
    }

    pub(crate) fn push(&mut self, method: MethodFilter, pattern: &str, handlers: Vec<BoxedHandler<E>>) {
        self.routes.push(Route::new(method, pattern, handlers));
    }

    pub(crate) fn len(&self) -> usize {
        self.routes.len()
    }

    /// Finds the route for `req` and writes the bound `params` and the
    /// request's `query` into it.
    ///
    /// `req` is left untouched when nothing matches.
    pub(crate) fn find(&self, req: &mut RequestContext) -> Result<Option<&Route<E>>, Error> {
        let (route, params) = {
            let path: Vec<&str> = split(req.uri.path()).collect();
            // Structural match first; the catch-all only when that fails.
            match self.structural(&req.method, &path) {
                Some(hit) => hit,
                None => match self.catch_all(&req.method) {
                    Some(route) => (route, HashMap::new()),
                    None => return Ok(None),
                },
            }
        };

        // Only a matched request gets its query parsed.
        req.query = parse_query(req.uri.query())?;
        req.params = params;
        Ok(Some(route))
    }

    fn structural(&self, method: &Method, path: &[&str]) -> Option<(&Route<E>, HashMap<String, String>)> {
        self.routes
            .iter()
            .filter(|r| !r.is_catch_all() && r.method.matches(method))
            .find_map(|r| r.bind(path).map(|params| (r, params)))
    }

    fn catch_all(&self, method: &Method) -> Option<&Route<E>> {
        self.routes.iter().find(|r| r.is_catch_all() && r.method.matches(method))
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Leading, trailing and doubled slashes produce no segments.
fn split(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Flat query map; a repeated key keeps its last value.
fn parse_query(query: Option<&str>) -> Result<HashMap<String, String>, Error> {
    let Some(query) = query else {
        return Ok(HashMap::new());
    };
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)?;
    Ok(pairs.into_iter().collect())
}
