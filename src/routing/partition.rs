//! Static/dynamic route partitioning.
//!
//! # Responsibilities
//! - Split the ordered route list into a static (variable-free) group
//!   and a dynamic (variable-bearing) group
//! - Preserve declaration-order priority across the two groups
//!
//! # Design Decisions
//! - The static index is probed before the dynamic chunks at match time,
//!   so a literal path that an earlier dynamic pattern would also match
//!   must be demoted into the dynamic group, or priority would silently
//!   flip. Only dynamic patterns registered earlier are considered.
//! - The demotion test covers the literal path both exactly and with a
//!   trailing slash appended, because combined dynamic patterns tolerate
//!   one trailing slash.

use std::collections::HashMap;

use regex::Regex;

use crate::routing::error::CompileError;
use crate::routing::route::Route;

/// Partitioned route list. Both groups borrow from the input slice and
/// keep its declaration order.
pub(crate) struct Partition<'a> {
    /// Literal path -> routes sharing it, in declaration order.
    pub static_groups: HashMap<String, Vec<&'a Route>>,
    /// Variable-bearing and demoted routes, in declaration order.
    pub dynamic: Vec<&'a Route>,
}

pub(crate) fn partition(routes: &[Route]) -> Result<Partition<'_>, CompileError> {
    let mut static_groups: HashMap<String, Vec<&Route>> = HashMap::new();
    let mut dynamic: Vec<&Route> = Vec::new();
    // Accumulated probes for earlier dynamic patterns: (pattern, trimmed
    // static prefix).
    let mut dynamic_probes: Vec<(Regex, String)> = Vec::new();

    for route in routes {
        let compiled = route.compile()?;
        let prefix = compiled.static_prefix().trim_end_matches('/').to_string();

        if compiled.has_variables() {
            dynamic_probes.push((probe_regex(&compiled.full_pattern())?, prefix));
            dynamic.push(route);
            continue;
        }

        let url = route.path();
        let collides = dynamic_probes.iter().any(|(rx, px)| {
            (px.is_empty() || url.starts_with(px.as_str()))
                && (rx.is_match(url) || rx.is_match(&format!("{url}/")))
        });

        if collides {
            dynamic_probes.push((probe_regex(&compiled.full_pattern())?, prefix));
            dynamic.push(route);
        } else {
            static_groups.entry(url.to_string()).or_default().push(route);
        }
    }

    Ok(Partition {
        static_groups,
        dynamic,
    })
}

fn probe_regex(pattern: &str) -> Result<Regex, CompileError> {
    Regex::new(pattern).map_err(|e| CompileError::InvalidPattern {
        pattern: pattern.to_string(),
        source: Box::new(e),
    })
}
