//! # repolens CLI
//!
//! Commands for vectorizing flattened repository dumps and querying them.
//!
//! ## Usage
//!
//! ```bash
//! repolens --config ./repolens.toml <command>
//! ```
//!
//! | Command | Description |
//! |---------|-------------|
//! | `repolens process <blob>` | Vectorize a dump and print the build summary |
//! | `repolens query "<text>" --blob <file>` | Build and query in one shot |
//! | `repolens serve` | Start the JSON HTTP server |
//!
//! The index is process-memory-resident: the `query` command rebuilds it
//! from `--blob` on each invocation, and the server keeps one live build
//! per process. Built-in defaults (hash embedder) apply when the config
//! file does not exist.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use repolens::{config, pipeline, server};

/// repolens — semantic retrieval over flattened repository dumps.
#[derive(Parser)]
#[command(
    name = "repolens",
    about = "Semantic retrieval over flattened repository dumps",
    version,
    long_about = "repolens decomposes a repository-to-text dump into language-aware code chunks, \
    embeds them, and answers natural-language queries with similarity-ranked chunks and a \
    length-bounded context block for a downstream LLM."
)]
struct Cli {
    /// Path to configuration file (TOML). Built-in defaults are used
    /// when the file does not exist.
    #[arg(long, global = true, default_value = "./repolens.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Vectorize a flattened repository dump.
    ///
    /// Parses the dump into files, chunks each file by language, embeds
    /// the chunks, and prints the build summary.
    Process {
        /// Path to the flattened repository dump.
        blob: PathBuf,
    },

    /// Query a repository dump with natural language.
    ///
    /// Builds an index from `--blob`, ranks chunks against the query,
    /// and prints the matches and the assembled LLM context.
    Query {
        /// The natural-language query.
        query: String,

        /// Path to the flattened repository dump to index first.
        #[arg(long)]
        blob: Option<PathBuf>,

        /// Number of ranked chunks to return (default from config).
        #[arg(long)]
        top_k: Option<usize>,

        /// Include full chunk content in the output, not just previews.
        #[arg(long)]
        full_content: bool,

        /// Print the raw JSON response instead of formatted output.
        #[arg(long)]
        json: bool,
    },

    /// Start the JSON HTTP server.
    ///
    /// Exposes `/repository/process`, `/repository/query`, and
    /// `/health` on the configured bind address.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Process { blob } => {
            pipeline::run_process(&cfg, &blob).await?;
        }
        Commands::Query {
            query,
            blob,
            top_k,
            full_content,
            json,
        } => {
            pipeline::run_query(&cfg, &query, blob.as_deref(), top_k, full_content, json).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
