//! File-extension to language tag mapping.

/// Tag returned for paths with no recognized extension.
pub const UNKNOWN_LANGUAGE: &str = "unknown";

/// Extension table. Suffix comparison is case-sensitive; no entry is a
/// suffix of another, so first match wins without ordering concerns.
const EXTENSION_TABLE: &[(&str, &str)] = &[
    (".py", "python"),
    (".ts", "typescript"),
    (".tsx", "typescript"),
    (".js", "javascript"),
    (".jsx", "javascript"),
    (".java", "java"),
    (".cpp", "cpp"),
    (".c", "c"),
    (".h", "c"),
    (".cs", "csharp"),
    (".rb", "ruby"),
    (".go", "go"),
    (".rs", "rust"),
    (".php", "php"),
];

/// Detect the language tag for a file path by its extension.
///
/// Returns [`UNKNOWN_LANGUAGE`] when no entry matches.
pub fn detect_language(path: &str) -> &'static str {
    EXTENSION_TABLE
        .iter()
        .find(|(ext, _)| path.ends_with(ext))
        .map(|(_, lang)| *lang)
        .unwrap_or(UNKNOWN_LANGUAGE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_extensions() {
        assert_eq!(detect_language("src/main.py"), "python");
        assert_eq!(detect_language("app.tsx"), "typescript");
        assert_eq!(detect_language("index.js"), "javascript");
        assert_eq!(detect_language("Main.java"), "java");
        assert_eq!(detect_language("lib.rs"), "rust");
        assert_eq!(detect_language("server.go"), "go");
        assert_eq!(detect_language("header.h"), "c");
        assert_eq!(detect_language("impl.cpp"), "cpp");
        assert_eq!(detect_language("model.cs"), "csharp");
        assert_eq!(detect_language("script.rb"), "ruby");
        assert_eq!(detect_language("index.php"), "php");
    }

    #[test]
    fn test_unknown_extension() {
        assert_eq!(detect_language("README.md"), UNKNOWN_LANGUAGE);
        assert_eq!(detect_language("Makefile"), UNKNOWN_LANGUAGE);
        assert_eq!(detect_language(""), UNKNOWN_LANGUAGE);
    }

    #[test]
    fn test_case_sensitive() {
        assert_eq!(detect_language("MAIN.PY"), UNKNOWN_LANGUAGE);
    }
}
