//! Flattened-repository blob parser.
//!
//! Repository-flattening tools emit a single text artifact: a sequence of
//! file-header lines, each followed by that file's raw content. This module
//! splits the blob back into `(path, content)` records.
//!
//! Two header forms are recognized:
//!
//! - a markdown-style heading: `## src/main.py`
//! - an explicit prefix line: `File: src/main.py`
//!
//! Content lines are accumulated verbatim (no trimming) and joined by
//! newline. Lines before the first header belong to no file and are
//! discarded. A blob with no header line yields zero records.

/// A single file record recovered from a flattened blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFile {
    /// Relative path as reported by the header line, trimmed.
    pub path: String,
    /// The file's content, verbatim, lines joined by `\n`.
    pub content: String,
}

/// Split a flattened repository blob into file records, preserving the
/// order of appearance.
pub fn parse_repo_dump(blob: &str) -> Vec<ParsedFile> {
    let mut files = Vec::new();
    let mut current_path: Option<String> = None;
    let mut current_lines: Vec<&str> = Vec::new();

    for line in blob.split('\n') {
        if let Some(path) = header_path(line) {
            if let Some(prev) = current_path.take() {
                files.push(ParsedFile {
                    path: prev,
                    content: current_lines.join("\n"),
                });
            }
            current_path = Some(path.to_string());
            current_lines.clear();
        } else if current_path.is_some() {
            current_lines.push(line);
        }
    }

    if let Some(prev) = current_path {
        files.push(ParsedFile {
            path: prev,
            content: current_lines.join("\n"),
        });
    }

    files
}

/// Return the path portion of a file-header line, or `None` for content lines.
fn header_path(line: &str) -> Option<&str> {
    line.strip_prefix("## ")
        .or_else(|| line.strip_prefix("File: "))
        .map(str::trim)
}
