//! Metadata extraction use case - pulls marker fields out of the post body

use regex::Regex;
use std::collections::HashMap;
use thiserror::Error;

use crate::model::{CATEGORY_TAXONOMY, PLACEHOLDER, PostDraft, TAG_TAXONOMY};

/// Separator between tags and categories in a marker line
pub const TERM_SEPARATOR: &str = ", ";

/// Metadata fields carried by markers in the source document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataField {
    Title,
    Slug,
    Excerpt,
    Tags,
    Categories,
}

impl MetadataField {
    /// All fields, in extraction and validation order
    pub const ALL: [MetadataField; 5] = [
        MetadataField::Title,
        MetadataField::Slug,
        MetadataField::Excerpt,
        MetadataField::Tags,
        MetadataField::Categories,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MetadataField::Title => "title",
            MetadataField::Slug => "slug",
            MetadataField::Excerpt => "excerpt",
            MetadataField::Tags => "tags",
            MetadataField::Categories => "categories",
        }
    }

    /// Pattern whose first capture group holds the field value
    fn pattern(&self) -> String {
        match self {
            MetadataField::Title => r"<h1>(.*?)</h1>".to_string(),
            // Marker values stop at a line break or the closing paragraph tag
            field => format!(r"@{}: ([^<\n]+)", field.name()),
        }
    }
}

/// Error type for metadata validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{} missing", .0.name())]
    MissingField(MetadataField),
}

/// Extracts marker metadata into a post draft
pub struct MetadataExtractor {
    patterns: Vec<(MetadataField, Regex)>,
    empty_paragraph: Regex,
}

impl Default for MetadataExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataExtractor {
    pub fn new() -> Self {
        let patterns = MetadataField::ALL
            .iter()
            .map(|field| (*field, Regex::new(&field.pattern()).expect("Valid regex")))
            .collect();
        let empty_paragraph = Regex::new(r"<p>\s*</p>\n*").expect("Valid regex");

        Self {
            patterns,
            empty_paragraph,
        }
    }

    /// Extract all fields from the document and build a draft whose content is
    /// the remaining body.
    ///
    /// A field that never matched is a [`ValidationError`]. A field holding the
    /// `TODO` placeholder is accepted as-is.
    pub fn extract(&self, html: &str) -> Result<PostDraft, ValidationError> {
        let (mut fields, content) = self.strip_markers(html);

        let mut take = |field: MetadataField| {
            fields
                .remove(&field)
                .ok_or(ValidationError::MissingField(field))
        };

        let mut draft = PostDraft {
            title: take(MetadataField::Title)?,
            slug: take(MetadataField::Slug)?,
            excerpt: take(MetadataField::Excerpt)?,
            content,
            ..Default::default()
        };
        draft.set_terms(TAG_TAXONOMY, split_terms(&take(MetadataField::Tags)?));
        draft.set_terms(
            CATEGORY_TAXONOMY,
            split_terms(&take(MetadataField::Categories)?),
        );

        tracing::debug!(
            title = %draft.title,
            slug = %draft.slug,
            tags = ?draft.tags(),
            categories = ?draft.categories(),
            "Extracted post metadata"
        );

        Ok(draft)
    }

    /// Remove every marker from the text, returning the matched values and the
    /// cleaned body
    pub fn strip_markers(&self, html: &str) -> (HashMap<MetadataField, String>, String) {
        let mut fields = HashMap::new();
        let mut content = html.to_string();

        for (field, pattern) in &self.patterns {
            let Some(value) = pattern
                .captures(&content)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim().to_string())
            else {
                tracing::debug!(field = field.name(), "Marker not found");
                continue;
            };

            content = pattern.replace_all(&content, "").trim().to_string();
            if value == PLACEHOLDER {
                tracing::warn!(field = field.name(), "Field still holds the placeholder");
            }
            fields.insert(*field, value);
        }

        let content = self
            .empty_paragraph
            .replace_all(&content, "")
            .trim()
            .to_string();

        (fields, content)
    }
}

fn split_terms(value: &str) -> Vec<String> {
    value.split(TERM_SEPARATOR).map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKERS: [&str; 5] = ["<h1>", "@slug:", "@excerpt:", "@tags:", "@categories:"];

    #[test]
    fn test_extract_inline_document() {
        let html = "<h1>Hello</h1><p>@slug: hello</p><p>@excerpt: greet</p><p>@tags: a, b</p><p>@categories: c</p>";

        let draft = MetadataExtractor::new().extract(html).unwrap();

        assert_eq!(draft.title, "Hello");
        assert_eq!(draft.slug, "hello");
        assert_eq!(draft.excerpt, "greet");
        assert_eq!(draft.tags(), ["a", "b"]);
        assert_eq!(draft.categories(), ["c"]);
        assert_eq!(draft.content, "");
    }

    #[test]
    fn test_extract_multiline_document_keeps_body() {
        let html = "<h1>Rust on the desk</h1>\n\
                    <p>@slug: rust-on-the-desk\n\
                    @excerpt: Notes from a week of writing Rust\n\
                    @tags: rust, notes\n\
                    @categories: Programming</p>\n\
                    <p>First paragraph.</p>\n\
                    <pre><code>fn main() {}</code></pre>\n";

        let draft = MetadataExtractor::new().extract(html).unwrap();

        assert_eq!(draft.title, "Rust on the desk");
        assert_eq!(draft.slug, "rust-on-the-desk");
        assert_eq!(draft.excerpt, "Notes from a week of writing Rust");
        assert_eq!(draft.tags(), ["rust", "notes"]);
        assert_eq!(draft.categories(), ["Programming"]);
        assert!(draft.content.starts_with("<p>First paragraph.</p>"));
        for marker in MARKERS {
            assert!(!draft.content.contains(marker), "{marker} left in body");
        }
    }

    #[test]
    fn test_missing_field_is_validation_error() {
        let html = "<h1>Hello</h1><p>@slug: hello</p><p>@tags: a</p><p>@categories: c</p>";

        let err = MetadataExtractor::new().extract(html).unwrap_err();

        assert!(matches!(
            err,
            ValidationError::MissingField(MetadataField::Excerpt)
        ));
        assert_eq!(err.to_string(), "excerpt missing");
    }

    #[test]
    fn test_missing_title_reported_first() {
        let err = MetadataExtractor::new().extract("<p>just text</p>").unwrap_err();

        assert_eq!(err.to_string(), "title missing");
    }

    #[test]
    fn test_placeholder_passes_through() {
        let html = "<h1>Draft</h1><p>@slug: TODO</p><p>@excerpt: TODO</p><p>@tags: TODO</p><p>@categories: TODO</p>";

        let draft = MetadataExtractor::new().extract(html).unwrap();

        assert_eq!(draft.slug, PLACEHOLDER);
        assert_eq!(draft.excerpt, PLACEHOLDER);
        assert_eq!(draft.tags(), [PLACEHOLDER]);
        assert_eq!(draft.categories(), [PLACEHOLDER]);
    }

    #[test]
    fn test_repeated_marker_uses_first_value_and_removes_all() {
        let html = "<h1>T</h1>\n<p>@slug: first</p>\n<p>@slug: second</p>\n<p>@excerpt: e</p>\n<p>@tags: t</p>\n<p>@categories: c</p>\n<p>body</p>";

        let draft = MetadataExtractor::new().extract(html).unwrap();

        assert_eq!(draft.slug, "first");
        assert_eq!(draft.content, "<p>body</p>");
    }

    #[test]
    fn test_marker_value_stops_at_tag() {
        let extractor = MetadataExtractor::new();
        let (fields, content) = extractor.strip_markers("<p>@slug: my-post</p><p>Body</p>");

        assert_eq!(
            fields.get(&MetadataField::Slug).map(String::as_str),
            Some("my-post")
        );
        assert_eq!(content, "<p>Body</p>");
    }

    #[test]
    fn test_strip_markers_removes_whitespace_only_paragraphs() {
        let extractor = MetadataExtractor::new();
        let (_, content) = extractor.strip_markers("<p>\n</p>\n<p>Kept</p>\n<p>  </p>");

        assert_eq!(content, "<p>Kept</p>");
    }
}
