use std::borrow::Cow;

/// Escapes `&`, `<`, `>` and `"` (ampersand first, so nothing is escaped twice).
pub fn escape(text: &str) -> Cow<'_, str> {
    html_escape::encode_double_quoted_attribute(text)
}

/// Wraps a block body as `<pre><code class="...">...</code></pre>`.
///
/// The body is escaped here and must be passed raw. The `class` attribute is left
/// out when there are no labels.
pub fn code_block(labels: &[String], body: &str) -> String {
    format!(
        "<pre><code{}>{}</code></pre>",
        class_attr(labels),
        escape(body)
    )
}

/// ` class="a b c"`, or nothing for an empty label list.
pub fn class_attr(labels: &[String]) -> String {
    if labels.is_empty() {
        String::new()
    } else {
        format!(" class=\"{}\"", escape(&labels.join(" ")))
    }
}
