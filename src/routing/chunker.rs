//! Dynamic route aggregation into combined chunk patterns.
//!
//! # Responsibilities
//! - Group the dynamic route list into flag-homogeneous chunks bounded
//!   by the route-count limit
//! - Emit one combined alternation per chunk, factored through the
//!   literal-prefix tree, with a mark group closing every alternative
//! - Validate each combined pattern against the engine size limit and
//!   retry the whole aggregation with smaller chunks on overflow
//!
//! # Design Decisions
//! - Mark ids are sequential across chunks; the matcher recovers the
//!   winning alternative from the single participating mark group
//! - Variable captures are renamed `v<mark>_<ordinal>` inside a combined
//!   pattern, since one pattern cannot repeat a group name; each mark
//!   keeps its standalone leaf pattern with the original names
//! - A retry discards all partial results: coarse but simple, and
//!   compilation is an offline, cache-once operation

use regex::RegexBuilder;

use crate::routing::error::CompileError;
use crate::routing::pattern::flag_group;
use crate::routing::prefix_tree::{LeafId, PrefixTree, TreeItem};
use crate::routing::route::Route;
use crate::routing::table::{Candidate, ChunkData, CompileOptions, MarkEntry};

pub(crate) fn compile_dynamic(
    routes: &[&Route],
    options: &CompileOptions,
) -> Result<(Vec<ChunkData>, Vec<MarkEntry>), CompileError> {
    if routes.is_empty() {
        return Ok((Vec::new(), Vec::new()));
    }

    let mut chunk_limit = options.chunk_limit.unwrap_or(routes.len()).max(1);
    loop {
        match try_compile(routes, chunk_limit, options.size_limit) {
            Err(CompileError::EngineOverflow { .. }) if chunk_limit > 1 => {
                // Halve, clamped so the limit always shrinks until the
                // floor of one route per chunk.
                let next = (1 + chunk_limit / 2).min(chunk_limit - 1);
                tracing::warn!(
                    chunk_limit,
                    next_limit = next,
                    "combined pattern exceeded the engine size limit, recompiling with smaller chunks"
                );
                chunk_limit = next;
            }
            done => return done,
        }
    }
}

/// One full aggregation pass at a fixed chunk limit.
fn try_compile(
    routes: &[&Route],
    chunk_limit: usize,
    size_limit: usize,
) -> Result<(Vec<ChunkData>, Vec<MarkEntry>), CompileError> {
    let mut groups: Vec<(String, Vec<&Route>)> = Vec::new();

    for route in routes {
        let compiled = route.compile()?;
        // Split against the flags of the route that opened the chunk.
        let open_new = match groups.last() {
            None => true,
            Some((flags, members)) => {
                members.len() >= chunk_limit
                    || needs_flag_split(
                        Some(flags.as_str()),
                        compiled.flags(),
                        compiled.has_variables(),
                    )
            }
        };
        if open_new {
            groups.push((compiled.flags().to_string(), Vec::new()));
        }
        if let Some((_, members)) = groups.last_mut() {
            members.push(route);
        }
    }

    let mut chunks = Vec::with_capacity(groups.len());
    let mut marks: Vec<MarkEntry> = Vec::new();

    for (flags, group) in &groups {
        let start_mark = marks.len();

        let mut tree = PrefixTree::root();
        for (i, route) in group.iter().enumerate() {
            tree.add(route.compile()?.regex_body(), LeafId(i));
        }

        let alternation = emit(&tree, 0, group, flags, &mut marks)?;
        let pattern = format!("{}^(?:{})/?$", flag_group(flags), alternation);
        validate_chunk(&pattern, size_limit)?;

        chunks.push(ChunkData {
            start_mark,
            pattern,
        });
    }

    marks.push(MarkEntry::Sentinel);

    Ok((chunks, marks))
}

/// A route whose flag set differs from the current chunk's opens a new
/// chunk — unless it has no variables, in which case its (pure literal)
/// body is flag-insensitive and may merge anyway.
fn needs_flag_split(prev_flags: Option<&str>, flags: &str, has_variables: bool) -> bool {
    has_variables && prev_flags != Some(flags)
}

/// Depth-first emission of one chunk's alternation. Branch nodes emit
/// their shared literal once around a nested group; leaves emit the
/// remaining suffix plus their mark group. Back-to-back leaves with
/// byte-identical full patterns collapse into the previous mark.
fn emit(
    tree: &PrefixTree,
    prefix_len: usize,
    routes: &[&Route],
    flags: &str,
    marks: &mut Vec<MarkEntry>,
) -> Result<String, CompileError> {
    let mut alternatives: Vec<String> = Vec::new();
    let mut prev_full: Option<String> = None;

    for item in &tree.items {
        match item {
            TreeItem::Group(group) => {
                prev_full = None;
                let shared = &group.prefix[prefix_len..];
                let inner = emit(group, group.prefix.len(), routes, flags, marks)?;
                alternatives.push(format!("{shared}(?:{inner})"));
            }
            TreeItem::Leaf { regex, id } => {
                let route = routes[id.0];
                let compiled = route.compile()?;
                let candidate = Candidate {
                    action: route.action().clone(),
                    methods: route.methods().clone(),
                    variables: compiled.variables().to_vec(),
                };

                let full = compiled.full_pattern();
                if prev_full.as_deref() == Some(full.as_str()) {
                    if let Some(MarkEntry::Candidates { candidates, .. }) = marks.last_mut() {
                        candidates.push(candidate);
                        continue;
                    }
                }

                let mark = marks.len();
                let suffix = rename_captures(&regex[prefix_len..], mark);
                alternatives.push(format!("{suffix}(?P<m{mark}>)"));
                marks.push(MarkEntry::Candidates {
                    leaf_pattern: format!("{}^{}/?$", flag_group(flags), compiled.regex_body()),
                    candidates: vec![candidate],
                });
                prev_full = Some(full);
            }
        }
    }

    Ok(alternatives.join("|"))
}

/// Rename every named capture in `body` to `v<mark>_<ordinal>` so the
/// combined pattern never repeats a group name across alternatives.
fn rename_captures(body: &str, mark: usize) -> String {
    let mut out = String::with_capacity(body.len());
    let mut rest = body;
    let mut ordinal = 0;

    while !rest.is_empty() {
        if let Some(after_escape) = rest.strip_prefix('\\') {
            out.push('\\');
            match after_escape.chars().next() {
                Some(c) => {
                    out.push(c);
                    rest = &after_escape[c.len_utf8()..];
                }
                None => break,
            }
            continue;
        }
        if let Some(after_open) = rest.strip_prefix("(?P<") {
            if let Some(close) = after_open.find('>') {
                out.push_str(&format!("(?P<v{mark}_{ordinal}>"));
                ordinal += 1;
                rest = &after_open[close + 1..];
                continue;
            }
        }
        match rest.chars().next() {
            Some(c) => {
                out.push(c);
                rest = &rest[c.len_utf8()..];
            }
            None => break,
        }
    }

    out
}

/// Force the engine to compile the combined pattern so size overflow is
/// caught here, where the chunk limit can still be shrunk.
fn validate_chunk(pattern: &str, size_limit: usize) -> Result<(), CompileError> {
    match RegexBuilder::new(pattern).size_limit(size_limit).build() {
        Ok(_) => Ok(()),
        Err(regex::Error::CompiledTooBig(_)) => Err(CompileError::EngineOverflow { size_limit }),
        Err(other) => Err(CompileError::InvalidPattern {
            pattern: pattern.to_string(),
            source: Box::new(other),
        }),
    }
}
