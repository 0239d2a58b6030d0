//! Error types for route compilation and matching.

use thiserror::Error;

use crate::routing::method::Method;

/// Errors raised while compiling a single route pattern.
///
/// All of these are fatal to table construction: a table is either built
/// from every registered route or not built at all.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// Variable names double as capture-group names and must not start
    /// with a digit.
    #[error("variable name \"{name}\" cannot start with a digit in route pattern \"{pattern}\"")]
    LeadingDigit { name: String, pattern: String },

    /// A variable name may appear only once per pattern.
    #[error("route pattern \"{pattern}\" cannot reference variable name \"{name}\" more than once")]
    DuplicateVariable { name: String, pattern: String },

    /// Capture-group names are capped by the pattern engine.
    #[error("variable name \"{name}\" cannot be longer than {max} characters in route pattern \"{pattern}\"")]
    NameTooLong {
        name: String,
        max: usize,
        pattern: String,
    },

    /// The `{name:type}` type tag is not in the variable type registry.
    #[error("unknown variable type \"{type_tag}\" for \"{name}\" in route pattern \"{pattern}\"")]
    UnknownType {
        name: String,
        type_tag: String,
        pattern: String,
    },
}

/// Errors raised while building a routing table.
#[derive(Debug, Error)]
pub enum CompileError {
    /// A route pattern failed validation.
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// A combined pattern exceeded the engine size limit even after the
    /// chunk limit was shrunk to its floor of one route per chunk.
    #[error("combined route pattern exceeds the engine size limit ({size_limit} bytes) at chunk limit 1")]
    EngineOverflow { size_limit: usize },

    /// The engine rejected a pattern for a non-size reason.
    #[error("route pattern \"{pattern}\" was rejected by the pattern engine: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: Box<regex::Error>,
    },
}

/// Request-time outcomes that are not a match.
///
/// These are ordinary result values: "no match" is an expected, frequent
/// outcome, not a defect.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MatchError {
    /// No static or dynamic entry matches the path at all.
    #[error("no route found")]
    NotFound,

    /// At least one route matches the path but none accepts the request
    /// method. The caller is expected to report `allowed` (e.g. as an
    /// `Allow` response header).
    #[error("method not allowed, allow: {}", .allowed.iter().map(|m| m.as_str()).collect::<Vec<_>>().join(", "))]
    MethodNotAllowed { allowed: Vec<Method> },
}
