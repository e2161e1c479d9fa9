//! Core data models used throughout repolens.
//!
//! These types represent the chunks and ranked matches that flow through
//! the vectorization and retrieval pipeline.

use std::fmt;

use serde::Serialize;

/// Classification of a chunk, derived from its first non-blank line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkType {
    Import,
    Function,
    Class,
    Variable,
    Code,
}

impl ChunkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkType::Import => "import",
            ChunkType::Function => "function",
            ChunkType::Class => "class",
            ChunkType::Variable => "variable",
            ChunkType::Code => "code",
        }
    }
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One retrievable contiguous span of a source file's content.
///
/// Chunks are immutable once built into a [`crate::index::VectorIndex`].
/// The `id` is stable for a given `(file_path, chunk_index)` pair and
/// unique within one index build.
#[derive(Debug, Clone, Serialize)]
pub struct CodeChunk {
    pub id: String,
    pub file_path: String,
    pub content: String,
    pub language: String,
    pub chunk_type: ChunkType,
    pub chunk_index: usize,
}

/// A ranked retrieval hit: a chunk paired with its cosine similarity
/// to the query vector.
#[derive(Debug, Clone)]
pub struct QueryMatch {
    pub chunk: CodeChunk,
    pub similarity: f32,
}
