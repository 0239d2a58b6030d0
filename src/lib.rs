//! HTTP path-routing engine.
//!
//! Compiles declarative route patterns (literal segments plus named,
//! optionally-typed placeholders) into an efficient dispatch structure,
//! then resolves a request path + method to an action, extracted path
//! variables, and the correct error semantics (404 vs 405 with an
//! `Allow` list).
//!
//! # Architecture Overview
//!
//! ```text
//!   Route registration (startup)          Request (per call)
//!   ───────────────────────────           ──────────────────
//!   RouteSet / RouterConfig (TOML)        path + method
//!        │                                     │
//!        ▼                                     ▼
//!   ┌──────────┐  ┌───────────┐  ┌─────────────────────────┐
//!   │ pattern  │─▶│ partition │─▶│ chunker + prefix tree   │
//!   │ compiler │  │ static /  │  │ combined mark patterns  │
//!   └──────────┘  │ dynamic   │  └───────────┬─────────────┘
//!                 └───────────┘              │
//!                                            ▼
//!                              ┌───────────────────────────┐
//!          save/load (JSON) ◀─▶│ RoutingTable (immutable)  │
//!                              └───────────┬───────────────┘
//!                                          │
//!                                          ▼
//!                              ┌───────────────────────────┐
//!                              │ matcher: static index,    │
//!                              │ then chunks in order      │
//!                              └───────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use pathmark::{match_request, Method, RouteSet, RoutingTable};
//!
//! let mut routes = RouteSet::new();
//! routes.get("/users/{id:num}", "users.show");
//!
//! let table = RoutingTable::compile(routes.routes()).unwrap();
//! let hit = match_request(&table, "/users/42", Method::Get).unwrap();
//! assert_eq!(hit.action.as_str(), "users.show");
//! assert_eq!(hit.variables["id"], "42");
//! ```

// Core subsystems
pub mod cache;
pub mod config;
pub mod routing;

// Caller-side helpers
pub mod path;

pub use cache::{load_table, save_table, CacheError};
pub use config::loader::{load_config, ConfigError};
pub use config::RouterConfig;
pub use path::normalize_path;
pub use routing::error::{CompileError, MatchError, PatternError};
pub use routing::matcher::{match_request, MatchResult};
pub use routing::method::{Method, MethodSet};
pub use routing::route::{ActionId, Route, RouteSet};
pub use routing::table::{CompileOptions, RoutingTable, TableData};
