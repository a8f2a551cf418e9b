//! Markdown to HTML preview using pulldown-cmark

use pulldown_cmark::{html, Options, Parser};

/// Render markdown to an HTML fragment
pub fn preview_html(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS;

    let parser = Parser::new_ext(markdown, options);
    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);
    html_output
}

/// Wrap a fragment in a minimal standalone document
pub fn preview_document(markdown: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
</head>
<body>
{}</body>
</html>
"#,
        preview_html(markdown)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_renders_block_markers() {
        let html = preview_html("# Title\n\n> quoted\n\n---\n\nplain");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<blockquote>"));
        assert!(html.contains("<hr />"));
        assert!(html.contains("<p>plain</p>"));
    }

    #[test]
    fn test_preview_document_wraps_fragment() {
        let doc = preview_document("hello");
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<p>hello</p>"));
    }
}
