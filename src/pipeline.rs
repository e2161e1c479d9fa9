//! Repository vectorization and query orchestration.
//!
//! [`RepoSession`] owns one embedding backend and the current index
//! build. `process_repository` runs the full pass — parse, chunk,
//! embed, index — and wholesale-replaces any previous build; there is
//! no incremental update. `query_repository` embeds the query text,
//! ranks the index, and assembles the bounded LLM context.
//!
//! Also hosts the `run_*` CLI entry points used by the binary.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::assemble::assemble_context;
use crate::chunk::{chunk_source, classify_chunk};
use crate::config::{Config, RetrievalConfig};
use crate::embedding::{create_embedder, Embedder};
use crate::index::{IndexEntry, VectorIndex};
use crate::language::detect_language;
use crate::models::{ChunkType, CodeChunk};
use crate::parse::parse_repo_dump;

/// Characters of chunk content shown in `content_preview`.
const PREVIEW_CHARS: usize = 200;

/// Build summary returned by [`RepoSession::process_repository`].
#[derive(Debug, Serialize)]
pub struct ProcessSummary {
    pub total_files: usize,
    pub total_chunks: usize,
    pub ready_for_llm: bool,
}

/// One ranked chunk in a [`QueryResponse`].
#[derive(Debug, Serialize)]
pub struct SimilarChunk {
    pub file_path: String,
    pub similarity: f32,
    pub chunk_type: ChunkType,
    pub language: String,
    pub content_preview: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_content: Option<String>,
}

/// Response returned by [`RepoSession::query_repository`].
#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub query: String,
    pub similar_chunks: Vec<SimilarChunk>,
    pub llm_context: String,
    pub ready_for_llm: bool,
}

/// One vectorization session: an embedding backend plus the live index.
///
/// Only one build is live at a time; a new `process_repository` call
/// discards the previous one. The session is not a persistent store —
/// the index lives in process memory and dies with the session.
pub struct RepoSession {
    embedder: Box<dyn Embedder>,
    index: VectorIndex,
    retrieval: RetrievalConfig,
    min_chars: usize,
}

impl RepoSession {
    /// Create a session with the backend named in the configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let embedder = create_embedder(&config.embedding)?;
        Ok(Self::with_embedder(config, embedder))
    }

    /// Create a session around an injected backend. This is the seam
    /// for substituting a local model or a deterministic stub.
    pub fn with_embedder(config: &Config, embedder: Box<dyn Embedder>) -> Self {
        Self {
            embedder,
            index: VectorIndex::new(),
            retrieval: config.retrieval.clone(),
            min_chars: config.chunking.min_chars,
        }
    }

    /// Override the number of chunks returned per query.
    pub fn set_top_k(&mut self, top_k: usize) {
        self.retrieval.top_k = top_k;
    }

    /// Number of chunks in the current index build.
    pub fn indexed_chunks(&self) -> usize {
        self.index.len()
    }

    /// Run the full vectorization pass over a flattened repository blob,
    /// replacing the current index build.
    ///
    /// Chunks whose trimmed content is shorter than the configured
    /// minimum never enter the index (and are never embedded); their
    /// chunk indices are still counted per file, so chunk ids stay
    /// stable regardless of filtering.
    pub async fn process_repository(&mut self, blob: &str) -> Result<ProcessSummary> {
        let files = parse_repo_dump(blob);
        let total_files = files.len();

        let mut chunks: Vec<CodeChunk> = Vec::new();
        for file in &files {
            let language = detect_language(&file.path);
            for (i, text) in chunk_source(&file.content, language).into_iter().enumerate() {
                if text.trim().chars().count() < self.min_chars {
                    continue;
                }
                chunks.push(CodeChunk {
                    id: chunk_id(&file.path, i),
                    file_path: file.path.clone(),
                    language: language.to_string(),
                    chunk_type: classify_chunk(&text),
                    chunk_index: i,
                    content: text,
                });
            }
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let vectors = if texts.is_empty() {
            Vec::new()
        } else {
            self.embedder.embed_batch(&texts).await?
        };

        let entries = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| IndexEntry { chunk, vector })
            .collect();
        self.index = VectorIndex::build(entries);

        Ok(ProcessSummary {
            total_files,
            total_chunks: self.index.len(),
            ready_for_llm: true,
        })
    }

    /// Answer a natural-language query against the current index build.
    ///
    /// When `blob` is given, the repository is (re)vectorized first.
    /// A query against an empty or never-built index returns empty
    /// `similar_chunks` and an empty context — never an error — and
    /// skips the query embedding entirely.
    pub async fn query_repository(
        &mut self,
        query: &str,
        blob: Option<&str>,
        include_full_content: bool,
    ) -> Result<QueryResponse> {
        if let Some(blob) = blob {
            self.process_repository(blob).await?;
        }

        if self.index.is_empty() {
            return Ok(QueryResponse {
                query: query.to_string(),
                similar_chunks: Vec::new(),
                llm_context: String::new(),
                ready_for_llm: true,
            });
        }

        let query_vec = self.embedder.embed(query).await?;

        let top = self.index.query(&query_vec, self.retrieval.top_k);
        let context_candidates = self.index.query(&query_vec, self.retrieval.context_top_k);
        let llm_context =
            assemble_context(&context_candidates, self.retrieval.max_context_length);

        let similar_chunks = top
            .iter()
            .map(|m| SimilarChunk {
                file_path: m.chunk.file_path.clone(),
                similarity: m.similarity,
                chunk_type: m.chunk.chunk_type,
                language: m.chunk.language.clone(),
                content_preview: content_preview(&m.chunk.content),
                full_content: include_full_content.then(|| m.chunk.content.clone()),
            })
            .collect();

        Ok(QueryResponse {
            query: query.to_string(),
            similar_chunks,
            llm_context,
            ready_for_llm: true,
        })
    }
}

/// Stable short chunk identifier: first 16 hex chars of the SHA-256
/// digest of the string `"{file_path}:{chunk_index}"`.
fn chunk_id(file_path: &str, chunk_index: usize) -> String {
    let digest = Sha256::digest(format!("{}:{}", file_path, chunk_index).as_bytes());
    format!("{:x}", digest)[..16].to_string()
}

/// First 200 characters of chunk content, `...`-suffixed when longer.
fn content_preview(content: &str) -> String {
    if content.chars().count() > PREVIEW_CHARS {
        let preview: String = content.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", preview)
    } else {
        content.to_string()
    }
}

// ============ CLI entry points ============

/// `repolens process <blob>` — vectorize a dump and print the summary.
pub async fn run_process(config: &Config, blob_path: &Path) -> Result<()> {
    let blob = std::fs::read_to_string(blob_path)
        .with_context(|| format!("Failed to read repository dump: {}", blob_path.display()))?;

    let mut session = RepoSession::new(config)?;
    let summary = session.process_repository(&blob).await?;

    println!("processed {}", blob_path.display());
    println!("  files: {}", summary.total_files);
    println!("  chunks indexed: {}", summary.total_chunks);
    println!("ok");
    Ok(())
}

/// `repolens query <text>` — one-shot build-and-query against a dump.
pub async fn run_query(
    config: &Config,
    query: &str,
    blob_path: Option<&Path>,
    top_k: Option<usize>,
    full_content: bool,
    json: bool,
) -> Result<()> {
    let blob = match blob_path {
        Some(path) => Some(std::fs::read_to_string(path).with_context(|| {
            format!("Failed to read repository dump: {}", path.display())
        })?),
        None => None,
    };

    let mut session = RepoSession::new(config)?;
    if let Some(k) = top_k {
        session.set_top_k(k);
    }

    let response = session
        .query_repository(query, blob.as_deref(), full_content)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    if response.similar_chunks.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, chunk) in response.similar_chunks.iter().enumerate() {
        println!(
            "{}. {} [{} | {}] score {:.3}",
            i + 1,
            chunk.file_path,
            chunk.language,
            chunk.chunk_type,
            chunk.similarity
        );
    }
    println!();
    println!("{}", response.llm_context);
    Ok(())
}
