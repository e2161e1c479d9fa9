//! In-memory vector index.
//!
//! Stores `(chunk, vector)` pairs in insertion order and ranks every
//! stored vector against a query vector by cosine similarity. Brute
//! force, O(n) per query: a repository dump yields thousands of chunks,
//! not millions, so no approximate-nearest-neighbor structure is needed.
//!
//! The index is append-only within a build and replaced wholesale by the
//! next build — there is no deletion or incremental insert, matching the
//! whole-repository re-ingest usage pattern. It must be fully populated
//! by a single writer before any reader queries it.

use std::cmp::Ordering;

use crate::embedding::cosine_similarity;
use crate::models::{CodeChunk, QueryMatch};

/// A chunk paired with its cached embedding vector.
pub struct IndexEntry {
    pub chunk: CodeChunk,
    pub vector: Vec<f32>,
}

/// Similarity-ranked retrieval over one index build.
#[derive(Default)]
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// An empty index; queries against it return no results.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build an index from pre-embedded chunks, preserving their order.
    pub fn build(entries: Vec<IndexEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate stored entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.iter()
    }

    /// Rank all stored chunks against `query_vec` and return the top
    /// `top_k` as `(chunk, score)` pairs, descending by cosine
    /// similarity. The sort is stable, so ties keep insertion order.
    /// An empty index yields an empty result, never an error.
    pub fn query(&self, query_vec: &[f32], top_k: usize) -> Vec<QueryMatch> {
        let mut matches: Vec<QueryMatch> = self
            .entries
            .iter()
            .map(|entry| QueryMatch {
                chunk: entry.chunk.clone(),
                similarity: cosine_similarity(query_vec, &entry.vector),
            })
            .collect();

        matches.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(Ordering::Equal)
        });
        matches.truncate(top_k);
        matches
    }
}
