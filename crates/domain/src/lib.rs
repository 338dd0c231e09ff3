//! autopost domain crate
//!
//! This crate contains the core domain logic following hexagonal architecture:
//! - `model`: Post draft, image and upload value objects
//! - `ports`: Trait definitions for external dependencies (adapters)
//! - `usecases`: Metadata extraction, image rewriting, code block
//!   normalization and publishing

pub mod model;
pub mod ports;
pub mod usecases;

pub use model::*;
pub use ports::*;

/// Local failures carry this code when reported next to remote fault codes
pub const LOCAL_ERROR_CODE: i64 = 666;

/// Escape text for use inside an HTML attribute or element body.
///
/// Covers `&`, `<`, `>`, `"` and `'`, so the result is safe in both single and
/// double quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html_quotes_and_brackets() {
        assert_eq!(
            escape_html(r#"Tom & "Jerry" <3 'cheese'"#),
            "Tom &amp; &quot;Jerry&quot; &lt;3 &#039;cheese&#039;"
        );
    }

    #[test]
    fn test_escape_html_plain_text_unchanged() {
        assert_eq!(escape_html("A sunset over the lake"), "A sunset over the lake");
    }
}
