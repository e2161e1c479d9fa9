//! LLM context assembly.
//!
//! Renders ranked chunks into a single text block bounded by a character
//! budget. Truncation is greedy and order-preserving: iteration stops at
//! the first block that would overflow the budget — no skipping ahead to
//! find a smaller block that fits. Callers needing exhaustive coverage
//! raise the budget rather than expecting bin-packing behavior.

use crate::models::QueryMatch;

const BLOCK_SEPARATOR: &str = "\n\n";

/// Assemble a context block from ranked results under `max_length`
/// characters. Returns the empty string when no block fits, including
/// the degenerate empty-results case. The output never exceeds
/// `max_length` by construction.
pub fn assemble_context(results: &[QueryMatch], max_length: usize) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut current_length = 0usize;

    for m in results {
        let block = render_block(m);
        let cost = if parts.is_empty() {
            block.len()
        } else {
            BLOCK_SEPARATOR.len() + block.len()
        };

        if current_length + cost > max_length {
            break;
        }

        current_length += cost;
        parts.push(block);
    }

    parts.join(BLOCK_SEPARATOR)
}

/// Render one result as a fenced block with its retrieval metadata.
fn render_block(m: &QueryMatch) -> String {
    format!(
        "## {} ({}, {})\nSimilarity: {:.3}\n```\n{}\n```",
        m.chunk.file_path, m.chunk.language, m.chunk.chunk_type, m.similarity, m.chunk.content
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChunkType, CodeChunk};

    fn query_match(path: &str, content: &str, similarity: f32) -> QueryMatch {
        QueryMatch {
            chunk: CodeChunk {
                id: "0123456789abcdef".to_string(),
                file_path: path.to_string(),
                content: content.to_string(),
                language: "python".to_string(),
                chunk_type: ChunkType::Function,
                chunk_index: 0,
            },
            similarity,
        }
    }

    #[test]
    fn test_empty_results_give_empty_string() {
        assert_eq!(assemble_context(&[], 4000), "");
    }

    #[test]
    fn test_block_contains_metadata() {
        let text = assemble_context(&[query_match("a.py", "def f():\n    pass", 0.87654)], 4000);
        assert!(text.contains("## a.py (python, function)"));
        assert!(text.contains("Similarity: 0.877"));
        assert!(text.contains("```\ndef f():\n    pass\n```"));
    }

    #[test]
    fn test_length_budget_never_exceeded() {
        let results = vec![
            query_match("a.py", &"x".repeat(100), 0.9),
            query_match("b.py", &"y".repeat(100), 0.8),
            query_match("c.py", &"z".repeat(100), 0.7),
        ];
        for budget in [0, 10, 150, 300, 1000] {
            let text = assemble_context(&results, budget);
            assert!(
                text.len() <= budget,
                "budget {} exceeded: {}",
                budget,
                text.len()
            );
        }
    }

    #[test]
    fn test_greedy_stop_does_not_skip_ahead() {
        // A large second block blocks the smaller third one even though
        // the third would fit on its own.
        let results = vec![
            query_match("a.py", "small", 0.9),
            query_match("b.py", &"big".repeat(200), 0.8),
            query_match("c.py", "tiny", 0.7),
        ];
        let first_len = assemble_context(&results[..1], usize::MAX).len();
        let text = assemble_context(&results, first_len + 20);
        assert!(text.contains("a.py"));
        assert!(!text.contains("b.py"));
        assert!(!text.contains("c.py"));
    }

    #[test]
    fn test_nothing_fits_gives_empty_string() {
        let results = vec![query_match("a.py", "content", 0.5)];
        assert_eq!(assemble_context(&results, 5), "");
    }

    #[test]
    fn test_blocks_joined_by_blank_line() {
        let results = vec![
            query_match("a.py", "one", 0.9),
            query_match("b.py", "two", 0.8),
        ];
        let text = assemble_context(&results, 4000);
        assert!(text.contains("```\n\n## b.py"));
    }
}
