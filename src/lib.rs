//! # repolens
//!
//! Semantic retrieval over flattened repository dumps.
//!
//! repolens consumes the single text artifact produced by a
//! repository-to-text flattening tool, decomposes it into language-aware
//! code chunks, embeds each chunk into a fixed-length vector, and answers
//! natural-language queries with similarity-ranked chunks plus a
//! length-bounded context block ready for a downstream LLM.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌───────────────┐   ┌───────────┐
//! │  Flattened │──▶│ Parse + Chunk  │──▶│  Embedder │
//! │  repo dump │   │ (per language) │   │ (trait)   │
//! └────────────┘   └───────────────┘   └─────┬─────┘
//!                                            │
//!                       ┌────────────────────┤
//!                       ▼                    ▼
//!                 ┌───────────┐       ┌────────────┐
//!                 │  Vector   │──────▶│  Context   │
//!                 │  Index    │ rank  │  Assembler │
//!                 └───────────┘       └────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! repolens process dump.txt
//! repolens query "where is authentication handled" --blob dump.txt
//! repolens serve
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`parse`] | Flattened-blob parsing into file records |
//! | [`language`] | Extension → language tag table |
//! | [`chunk`] | Language-aware chunking and classification |
//! | [`embedding`] | Embedding backend abstraction |
//! | [`index`] | In-memory similarity-ranked vector index |
//! | [`assemble`] | Bounded LLM context assembly |
//! | [`pipeline`] | Session orchestration and CLI commands |
//! | [`server`] | JSON HTTP API |

pub mod assemble;
pub mod chunk;
pub mod config;
pub mod embedding;
pub mod index;
pub mod language;
pub mod models;
pub mod parse;
pub mod pipeline;
pub mod server;
