//! Code block normalization - collapses `<pre><code>` into a single `<pre>`

/// Replace every `<pre><code>` / `</code></pre>` pair with a bare `<pre>`
/// wrapper. Running it again on its own output changes nothing.
pub fn normalize_code_blocks(content: &str) -> String {
    content
        .replace("<pre><code>", "<pre>")
        .replace("</code></pre>", "</pre>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_wrappers() {
        let html = "<p>Example:</p>\n<pre><code>let x = 1;\n</code></pre>\n<pre><code>let y = 2;</code></pre>";

        assert_eq!(
            normalize_code_blocks(html),
            "<p>Example:</p>\n<pre>let x = 1;\n</pre>\n<pre>let y = 2;</pre>"
        );
    }

    #[test]
    fn test_idempotent() {
        let once = normalize_code_blocks("<pre><code>fn main() {}</code></pre>");
        assert_eq!(normalize_code_blocks(&once), once);
    }

    #[test]
    fn test_inline_code_untouched() {
        let html = "<p>Use <code>cargo</code> here</p>";
        assert_eq!(normalize_code_blocks(html), html);
    }
}
