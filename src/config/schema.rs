//! Configuration schema definitions.
//!
//! This module defines the declarative route table structure. All types
//! derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::routing::method::{Method, MethodSet};
use crate::routing::route::Route;
use crate::routing::table::{CompileOptions, DEFAULT_SIZE_LIMIT};

/// Root configuration for the routing engine.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Engine settings.
    pub router: RouterSettings,

    /// Ordered route declarations. File order is match priority.
    pub routes: Vec<RouteSpec>,
}

/// Engine settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterSettings {
    /// Optional path of the compiled-table cache artifact.
    pub cache_path: Option<String>,

    /// Engine size limit per combined pattern, in bytes.
    pub size_limit: usize,

    /// Starting chunk limit override (default: dynamic route count).
    pub chunk_limit: Option<usize>,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            cache_path: None,
            size_limit: DEFAULT_SIZE_LIMIT,
            chunk_limit: None,
        }
    }
}

/// One declared route.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteSpec {
    /// Allowed methods; omit or leave empty for any method.
    #[serde(default)]
    pub methods: Vec<Method>,

    /// Path template, e.g. "/users/{id:num}".
    pub path: String,

    /// Opaque action identifier, e.g. "users.show".
    pub action: String,
}

impl RouterConfig {
    /// The ordered route list this config declares.
    pub fn to_routes(&self) -> Vec<Route> {
        self.routes
            .iter()
            .map(|spec| {
                Route::new(
                    MethodSet::of(spec.methods.iter().copied()),
                    spec.path.clone(),
                    spec.action.clone(),
                )
            })
            .collect()
    }

    /// Compilation options derived from the settings section.
    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            size_limit: self.router.size_limit,
            chunk_limit: self.router.chunk_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_parses() {
        let config: RouterConfig = toml::from_str(
            r#"
            [[routes]]
            path = "/users/{id:num}"
            action = "users.show"
            methods = ["GET"]
            "#,
        )
        .unwrap();

        assert_eq!(config.routes.len(), 1);
        assert_eq!(config.routes[0].methods, vec![Method::Get]);
        assert_eq!(config.router.size_limit, DEFAULT_SIZE_LIMIT);

        let routes = config.to_routes();
        assert_eq!(routes[0].path(), "/users/{id:num}");
        assert_eq!(routes[0].action().as_str(), "users.show");
    }

    #[test]
    fn test_omitted_methods_mean_any() {
        let config: RouterConfig = toml::from_str(
            r#"
            [[routes]]
            path = "/health"
            action = "health"
            "#,
        )
        .unwrap();

        assert!(config.to_routes()[0].methods().is_any());
    }

    #[test]
    fn test_settings_section() {
        let config: RouterConfig = toml::from_str(
            r#"
            [router]
            cache_path = "routes.cache.json"
            size_limit = 1048576
            chunk_limit = 64
            "#,
        )
        .unwrap();

        assert_eq!(config.router.cache_path.as_deref(), Some("routes.cache.json"));
        let options = config.compile_options();
        assert_eq!(options.size_limit, 1048576);
        assert_eq!(options.chunk_limit, Some(64));
    }
}
