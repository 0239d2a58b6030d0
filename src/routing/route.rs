//! Route definitions and startup-time registration.

use std::fmt;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::routing::error::PatternError;
use crate::routing::method::{Method, MethodSet};
use crate::routing::pattern::{self, CompiledPattern};

/// Opaque identifier of the action a route dispatches to, e.g. a
/// controller + handler reference. The engine never interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(String);

impl ActionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ActionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ActionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One registered route: allowed methods, path template, target action.
///
/// Immutable once created; the compiled pattern is computed on first use
/// and cached for the route's lifetime.
#[derive(Debug, Clone)]
pub struct Route {
    methods: MethodSet,
    path: String,
    action: ActionId,
    compiled: OnceCell<CompiledPattern>,
}

impl Route {
    pub fn new(methods: MethodSet, path: impl Into<String>, action: impl Into<ActionId>) -> Self {
        Self {
            methods,
            path: path.into(),
            action: action.into(),
            compiled: OnceCell::new(),
        }
    }

    pub fn methods(&self) -> &MethodSet {
        &self.methods
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn action(&self) -> &ActionId {
        &self.action
    }

    /// Compile the path template, reusing the cached result.
    pub fn compile(&self) -> Result<&CompiledPattern, PatternError> {
        self.compiled.get_or_try_init(|| pattern::compile(&self.path))
    }
}

/// Ordered route registration. Declaration order is the match priority:
/// when two routes both match a path, the earlier one wins.
///
/// This is the explicit startup-time replacement for source-level route
/// discovery: register every route once, then compile the set into a
/// routing table.
#[derive(Debug, Clone, Default)]
pub struct RouteSet {
    routes: Vec<Route>,
}

impl RouteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route with an explicit method set.
    pub fn route(
        &mut self,
        methods: MethodSet,
        path: impl Into<String>,
        action: impl Into<ActionId>,
    ) -> &mut Self {
        self.routes.push(Route::new(methods, path, action));
        self
    }

    /// Register a route accepting any method.
    pub fn any(&mut self, path: impl Into<String>, action: impl Into<ActionId>) -> &mut Self {
        self.route(MethodSet::any(), path, action)
    }

    pub fn get(&mut self, path: impl Into<String>, action: impl Into<ActionId>) -> &mut Self {
        self.route(MethodSet::of([Method::Get]), path, action)
    }

    pub fn post(&mut self, path: impl Into<String>, action: impl Into<ActionId>) -> &mut Self {
        self.route(MethodSet::of([Method::Post]), path, action)
    }

    pub fn put(&mut self, path: impl Into<String>, action: impl Into<ActionId>) -> &mut Self {
        self.route(MethodSet::of([Method::Put]), path, action)
    }

    pub fn patch(&mut self, path: impl Into<String>, action: impl Into<ActionId>) -> &mut Self {
        self.route(MethodSet::of([Method::Patch]), path, action)
    }

    pub fn delete(&mut self, path: impl Into<String>, action: impl Into<ActionId>) -> &mut Self {
        self.route(MethodSet::of([Method::Delete]), path, action)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn into_routes(self) -> Vec<Route> {
        self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_is_cached() {
        let route = Route::new(MethodSet::any(), "/users/{id:num}", "users.show");
        let first = route.compile().unwrap() as *const CompiledPattern;
        let second = route.compile().unwrap() as *const CompiledPattern;
        assert_eq!(first, second);
    }

    #[test]
    fn test_route_set_preserves_order() {
        let mut set = RouteSet::new();
        set.get("/a", "a").post("/b", "b").any("/c", "c");

        let paths: Vec<&str> = set.routes().iter().map(|r| r.path()).collect();
        assert_eq!(paths, ["/a", "/b", "/c"]);
        assert!(set.routes()[2].methods().is_any());
    }
}
