//! HTTP method names and method sets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// HTTP request method.
///
/// The derived ordering (declaration order) is used when an allowed-method
/// list is reported back to the caller, so `Allow` output is deterministic.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Trace,
    Connect,
}

impl Method {
    /// Canonical uppercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Options => "OPTIONS",
            Method::Trace => "TRACE",
            Method::Connect => "CONNECT",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognized method name.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown HTTP method \"{0}\"")]
pub struct InvalidMethod(pub String);

impl FromStr for Method {
    type Err = InvalidMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "HEAD" => Ok(Method::Head),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            "PATCH" => Ok(Method::Patch),
            "OPTIONS" => Ok(Method::Options),
            "TRACE" => Ok(Method::Trace),
            "CONNECT" => Ok(Method::Connect),
            _ => Err(InvalidMethod(s.to_string())),
        }
    }
}

/// Ordered set of methods a route accepts.
///
/// Empty means "any method". Insertion order is preserved; duplicates are
/// dropped on insert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MethodSet(Vec<Method>);

impl MethodSet {
    /// The any-method set.
    pub fn any() -> Self {
        Self(Vec::new())
    }

    /// Build a set from the given methods, preserving order.
    pub fn of<I: IntoIterator<Item = Method>>(methods: I) -> Self {
        let mut set = Self::any();
        for m in methods {
            set.insert(m);
        }
        set
    }

    pub fn insert(&mut self, method: Method) {
        if !self.0.contains(&method) {
            self.0.push(method);
        }
    }

    /// True when no method restriction applies.
    pub fn is_any(&self) -> bool {
        self.0.is_empty()
    }

    /// True when `method` passes this set's restriction.
    pub fn allows(&self, method: Method) -> bool {
        self.is_any() || self.0.contains(&method)
    }

    pub fn iter(&self) -> impl Iterator<Item = Method> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Method> for MethodSet {
    fn from_iter<I: IntoIterator<Item = Method>>(iter: I) -> Self {
        Self::of(iter)
    }
}
