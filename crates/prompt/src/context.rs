//! Numbered context block construction.

use sourced_core::SourceRecord;

/// Maximum characters of evidence placed in the prompt per source.
pub const MAX_EXCERPT_CHARS: usize = 2000;

/// Evidence for one source: page content when present, otherwise the
/// snippet, truncated to [`MAX_EXCERPT_CHARS`] characters.
pub fn excerpt(source: &SourceRecord) -> String {
    source.evidence().chars().take(MAX_EXCERPT_CHARS).collect()
}

/// Build the numbered context block.
///
/// Indices are 1-based and follow the order of `sources`, so the answer's
/// `[n] URL` citations line up with what the model saw.
pub fn build_context(sources: &[SourceRecord]) -> String {
    sources
        .iter()
        .enumerate()
        .map(|(i, source)| {
            format!(
                "[{}] {}\nURL: {}\nExcerpt: {}\n",
                i + 1,
                source.title,
                source.url,
                excerpt(source)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, snippet: &str, url: &str, content: &str) -> SourceRecord {
        SourceRecord::new(title, snippet, url).with_content(content.to_string())
    }

    #[test]
    fn test_context_is_numbered_in_order() {
        let sources = vec![
            record("First", "s1", "https://a.com", "alpha"),
            record("Second", "s2", "https://b.com", "beta"),
        ];

        let context = build_context(&sources);
        assert_eq!(
            context,
            "[1] First\nURL: https://a.com\nExcerpt: alpha\n\n\n[2] Second\nURL: https://b.com\nExcerpt: beta\n"
        );
    }

    #[test]
    fn test_snippet_used_when_content_empty() {
        let source = record("T", "the snippet", "https://a.com", "");
        assert_eq!(excerpt(&source), "the snippet");
    }

    #[test]
    fn test_excerpt_truncated_to_limit() {
        let long = "x".repeat(MAX_EXCERPT_CHARS + 500);
        let source = record("T", "", "https://a.com", &long);
        assert_eq!(excerpt(&source).chars().count(), MAX_EXCERPT_CHARS);

        let long_snippet = "y".repeat(MAX_EXCERPT_CHARS * 2);
        let source = record("T", &long_snippet, "https://a.com", "");
        assert_eq!(excerpt(&source).chars().count(), MAX_EXCERPT_CHARS);
    }

    #[test]
    fn test_truncation_counts_characters_not_bytes() {
        let long = "é".repeat(MAX_EXCERPT_CHARS + 1);
        let source = record("T", "", "https://a.com", &long);
        let cut = excerpt(&source);
        assert_eq!(cut.chars().count(), MAX_EXCERPT_CHARS);
        assert!(cut.chars().all(|c| c == 'é'));
    }

    #[test]
    fn test_empty_sources_give_empty_context() {
        assert_eq!(build_context(&[]), "");
    }
}
