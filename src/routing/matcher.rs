//! Request matching against a compiled table.
//!
//! # Responsibilities
//! - Probe the static index, then the dynamic chunks, in order
//! - Resolve the winning mark to an action and variable bindings
//! - Distinguish "no route" from "route found, method rejected"
//!
//! # Design Decisions
//! - Matching is a pure function of (table, path, method): no I/O, no
//!   locks, safe from any number of threads
//! - When the winning mark is rejected on method grounds, later marks in
//!   the same chunk are trialed with independent leaf evaluations, which
//!   preserves priority order without re-scanning the chunk

use std::collections::{BTreeSet, HashMap};

use regex::Captures;
use serde::Serialize;

use crate::routing::error::MatchError;
use crate::routing::method::Method;
use crate::routing::route::ActionId;
use crate::routing::table::{MarkEntry, RoutingTable};

/// A resolved request: the target action and the raw captured path
/// variables (undecoded, untyped).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub action: ActionId,
    pub variables: HashMap<String, String>,
}

/// Resolve `path` + `method` against the table.
pub fn match_request(
    table: &RoutingTable,
    path: &str,
    method: Method,
) -> Result<MatchResult, MatchError> {
    let mut allow: BTreeSet<Method> = BTreeSet::new();

    if let Some(entries) = table.static_entries(path) {
        for entry in entries {
            if entry.methods.allows(method) {
                tracing::trace!(path, %method, action = %entry.action, "static route matched");
                return Ok(MatchResult {
                    action: entry.action.clone(),
                    variables: HashMap::new(),
                });
            }
            allow.extend(entry.methods.iter());
        }
    }

    'chunks: for chunk in 0..table.chunk_count() {
        let Some(caps) = table.chunk_regex(chunk).captures(path) else {
            continue;
        };
        let Some(first_mark) = table.participating_mark(chunk, &caps) else {
            continue;
        };

        for mark in first_mark..table.chunk_mark_end(chunk) {
            let Some(MarkEntry::Candidates { candidates, .. }) = table.mark_entry(mark) else {
                // The sentinel: no further alternatives in this chunk.
                continue 'chunks;
            };

            // The winning mark binds from the combined captures; later
            // marks must first re-match the path on their own.
            let leaf_caps = if mark == first_mark {
                None
            } else {
                match table.leaf_regex(mark).and_then(|rx| rx.captures(path)) {
                    Some(leaf) => Some(leaf),
                    None => continue,
                }
            };

            for candidate in candidates {
                if !candidate.methods.allows(method) {
                    allow.extend(candidate.methods.iter());
                    continue;
                }
                let variables = match &leaf_caps {
                    Some(leaf) => bind_named(leaf, &candidate.variables),
                    None => bind_renamed(&caps, mark, &candidate.variables),
                };
                tracing::trace!(path, %method, action = %candidate.action, "dynamic route matched");
                return Ok(MatchResult {
                    action: candidate.action.clone(),
                    variables,
                });
            }
        }
    }

    if allow.is_empty() {
        Err(MatchError::NotFound)
    } else {
        Err(MatchError::MethodNotAllowed {
            allowed: allow.into_iter().collect(),
        })
    }
}

/// Bind variables from a standalone leaf evaluation, where groups carry
/// their original names. Variables that did not participate stay unset.
fn bind_named(caps: &Captures<'_>, names: &[String]) -> HashMap<String, String> {
    names
        .iter()
        .filter_map(|name| {
            caps.name(name)
                .map(|m| (name.clone(), m.as_str().to_string()))
        })
        .collect()
}

/// Bind variables from a combined chunk evaluation, where the winning
/// alternative's groups were renamed positionally under its mark.
fn bind_renamed(caps: &Captures<'_>, mark: usize, names: &[String]) -> HashMap<String, String> {
    names
        .iter()
        .enumerate()
        .filter_map(|(i, name)| {
            caps.name(&format!("v{mark}_{i}"))
                .map(|m| (name.clone(), m.as_str().to_string()))
        })
        .collect()
}
