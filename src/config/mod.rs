//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RouterConfig (validated, immutable)
//!     → to_routes() → ordered Route list → table compilation
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload path, since the
//!   routing table itself is compile-once
//! - Declaration order in the file is the match priority
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::RouteSpec;
pub use schema::RouterConfig;
pub use schema::RouterSettings;
