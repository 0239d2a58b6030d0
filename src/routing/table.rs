//! The compiled routing table.
//!
//! # Responsibilities
//! - Hold the three match tiers: static index, chunk patterns, mark table
//! - Drive compilation: partition, chunk, validate, publish
//! - Round-trip through a pure-data form for cache persistence
//!
//! # Design Decisions
//! - Publish-once, read-many: a table is fully built before it is
//!   returned, never mutated afterwards, and safe to share across
//!   threads without locking
//! - Compiled engine state (regexes, mark group offsets) is derived from
//!   the pure-data form on construction, so a reloaded table behaves
//!   bit-identically to a freshly compiled one

use std::collections::HashMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::routing::chunker;
use crate::routing::error::CompileError;
use crate::routing::method::MethodSet;
use crate::routing::partition;
use crate::routing::route::{ActionId, Route};

/// Default engine size limit for one combined chunk pattern, in bytes.
pub const DEFAULT_SIZE_LIMIT: usize = 10 * (1 << 20);

/// Knobs for table compilation. The defaults are right for production
/// use; tests lower them to force the degraded paths.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Engine size limit per combined pattern.
    pub size_limit: usize,
    /// Starting chunk limit; defaults to the dynamic route count.
    pub chunk_limit: Option<usize>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            size_limit: DEFAULT_SIZE_LIMIT,
            chunk_limit: None,
        }
    }
}

/// One entry of the static index: a route registered on a literal path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticEntry {
    pub action: ActionId,
    pub methods: MethodSet,
}

/// One combined dynamic pattern and the first mark id it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkData {
    pub start_mark: usize,
    pub pattern: String,
}

/// A candidate route collapsed into a mark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub action: ActionId,
    pub methods: MethodSet,
    pub variables: Vec<String>,
}

/// Mark table entry. Mark ids are sequential, so the table is a vector
/// indexed by mark id; the sentinel is the single final entry and bounds
/// the last chunk's alternatives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MarkEntry {
    Candidates {
        /// Standalone anchored pattern for this alternative, used to
        /// trial it independently when an earlier mark is rejected on
        /// method grounds.
        leaf_pattern: String,
        /// Routes that collapsed into this mark, in declaration order.
        candidates: Vec<Candidate>,
    },
    Sentinel,
}

/// Pure-data form of a routing table: static map, ordered chunk pattern
/// strings, mark table. No compiled state, safe to persist and reload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TableData {
    pub static_index: HashMap<String, Vec<StaticEntry>>,
    pub chunks: Vec<ChunkData>,
    pub mark_table: Vec<MarkEntry>,
}

/// The immutable dispatch structure produced by compilation.
#[derive(Debug)]
pub struct RoutingTable {
    data: TableData,
    chunk_regexes: Vec<Regex>,
    /// Per chunk: (capture-group index, mark id) for every mark group.
    chunk_marks: Vec<Vec<(usize, usize)>>,
    /// Per mark id: the compiled leaf pattern, `None` for the sentinel.
    leaf_regexes: Vec<Option<Regex>>,
}

impl RoutingTable {
    /// Compile an ordered route list with default options.
    pub fn compile(routes: &[Route]) -> Result<Self, CompileError> {
        Self::compile_with(routes, &CompileOptions::default())
    }

    /// Compile an ordered route list.
    pub fn compile_with(routes: &[Route], options: &CompileOptions) -> Result<Self, CompileError> {
        let partition = partition::partition(routes)?;

        let mut static_index: HashMap<String, Vec<StaticEntry>> = HashMap::new();
        for (url, group) in partition.static_groups {
            let entries = group
                .iter()
                .map(|route| StaticEntry {
                    action: route.action().clone(),
                    methods: route.methods().clone(),
                })
                .collect();
            static_index.insert(url, entries);
        }

        let (chunks, mark_table) = chunker::compile_dynamic(&partition.dynamic, options)?;

        let data = TableData {
            static_index,
            chunks,
            mark_table,
        };
        let table = Self::from_data(data)?;

        tracing::info!(
            routes = routes.len(),
            static_paths = table.data.static_index.len(),
            chunks = table.data.chunks.len(),
            marks = table.data.mark_table.len(),
            "route table compiled"
        );

        Ok(table)
    }

    /// Rebuild a table from its pure-data form, compiling every pattern.
    /// A loaded table matches bit-identically to the one that was saved.
    pub fn from_data(data: TableData) -> Result<Self, CompileError> {
        let mut chunk_regexes = Vec::with_capacity(data.chunks.len());
        let mut chunk_marks = Vec::with_capacity(data.chunks.len());
        for chunk in &data.chunks {
            let regex = build_regex(&chunk.pattern)?;
            chunk_marks.push(mark_groups(&regex));
            chunk_regexes.push(regex);
        }

        let mut leaf_regexes = Vec::with_capacity(data.mark_table.len());
        for entry in &data.mark_table {
            leaf_regexes.push(match entry {
                MarkEntry::Candidates { leaf_pattern, .. } => Some(build_regex(leaf_pattern)?),
                MarkEntry::Sentinel => None,
            });
        }

        Ok(Self {
            data,
            chunk_regexes,
            chunk_marks,
            leaf_regexes,
        })
    }

    /// The pure-data form, suitable for persistence.
    pub fn data(&self) -> &TableData {
        &self.data
    }

    pub(crate) fn static_entries(&self, path: &str) -> Option<&[StaticEntry]> {
        self.data.static_index.get(path).map(Vec::as_slice)
    }

    pub(crate) fn chunk_count(&self) -> usize {
        self.data.chunks.len()
    }

    pub(crate) fn chunk_regex(&self, chunk: usize) -> &Regex {
        &self.chunk_regexes[chunk]
    }

    /// Exclusive upper bound of the mark ids owned by `chunk`. The last
    /// chunk is bounded by the sentinel entry.
    pub(crate) fn chunk_mark_end(&self, chunk: usize) -> usize {
        match self.data.chunks.get(chunk + 1) {
            Some(next) => next.start_mark,
            None => self.data.mark_table.len(),
        }
    }

    /// Which mark fired in a successful chunk evaluation. Exactly one
    /// mark group participates in any match.
    pub(crate) fn participating_mark(&self, chunk: usize, caps: &regex::Captures<'_>) -> Option<usize> {
        self.chunk_marks[chunk]
            .iter()
            .find(|(group, _)| caps.get(*group).is_some())
            .map(|(_, mark)| *mark)
    }

    pub(crate) fn mark_entry(&self, mark: usize) -> Option<&MarkEntry> {
        self.data.mark_table.get(mark)
    }

    pub(crate) fn leaf_regex(&self, mark: usize) -> Option<&Regex> {
        self.leaf_regexes.get(mark).and_then(Option::as_ref)
    }
}

fn build_regex(pattern: &str) -> Result<Regex, CompileError> {
    Regex::new(pattern).map_err(|e| CompileError::InvalidPattern {
        pattern: pattern.to_string(),
        source: Box::new(e),
    })
}

/// Extract `(capture index, mark id)` pairs from a chunk regex's group
/// names. Mark groups are named `m<id>`.
fn mark_groups(regex: &Regex) -> Vec<(usize, usize)> {
    regex
        .capture_names()
        .enumerate()
        .filter_map(|(index, name)| {
            let id = name?.strip_prefix('m')?.parse().ok()?;
            Some((index, id))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::method::{Method, MethodSet};

    fn sample_routes() -> Vec<Route> {
        vec![
            Route::new(MethodSet::of([Method::Get]), "/", "home"),
            Route::new(MethodSet::of([Method::Get]), "/users/{id:num}", "users.show"),
            Route::new(MethodSet::of([Method::Post]), "/users/{id:num}", "users.update"),
            Route::new(MethodSet::any(), "/ping", "ping"),
        ]
    }

    #[test]
    fn test_compile_builds_all_tiers() {
        let table = RoutingTable::compile(&sample_routes()).unwrap();

        assert_eq!(table.data().static_index.len(), 2);
        assert_eq!(table.data().chunks.len(), 1);
        // One mark for the two merged /users routes, plus the sentinel.
        assert_eq!(table.data().mark_table.len(), 2);
        assert!(matches!(
            table.data().mark_table.last(),
            Some(MarkEntry::Sentinel)
        ));
    }

    #[test]
    fn test_data_roundtrip_preserves_structure() {
        let table = RoutingTable::compile(&sample_routes()).unwrap();
        let reloaded = RoutingTable::from_data(table.data().clone()).unwrap();

        assert_eq!(table.data(), reloaded.data());
    }

    #[test]
    fn test_json_roundtrip() {
        let table = RoutingTable::compile(&sample_routes()).unwrap();
        let json = serde_json::to_string(table.data()).unwrap();
        let data: TableData = serde_json::from_str(&json).unwrap();

        assert_eq!(&data, table.data());
        RoutingTable::from_data(data).unwrap();
    }

    #[test]
    fn test_empty_route_list() {
        let table = RoutingTable::compile(&[]).unwrap();
        assert!(table.data().static_index.is_empty());
        assert!(table.data().chunks.is_empty());
        assert!(table.data().mark_table.is_empty());
    }

    #[test]
    fn test_mark_groups_extracted() {
        let regex = Regex::new("(?s)^(?:/a/(?P<v0_0>[^/]+)(?P<m0>)|/b(?P<m1>))/?$").unwrap();
        assert_eq!(mark_groups(&regex), vec![(2, 0), (3, 1)]);
    }
}
