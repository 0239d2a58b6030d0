//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup, or reloaded from cache):
//!     Route[] (ordered registration)
//!     → pattern.rs (template → anchored pattern + variables)
//!     → partition.rs (static group / dynamic group)
//!     → chunker.rs + prefix_tree.rs (combined mark-annotated patterns)
//!     → Freeze as immutable RoutingTable
//!
//! Incoming Request (path, method)
//!     → matcher.rs (static index, then chunk patterns in order)
//!     → Return: action + variables, or NotFound / MethodNotAllowed
//! ```
//!
//! # Design Decisions
//! - Routes compiled once, immutable at runtime; no online update path
//! - Variable-free routes resolve through an exact-match map, never the
//!   pattern engine
//! - Deterministic: same input always matches same route
//! - First registered wins, across both tiers

mod chunker;
pub mod error;
pub mod matcher;
pub mod method;
mod partition;
pub mod pattern;
mod prefix_tree;
pub mod route;
pub mod table;
