//! Entity escaping for attribute values, text and comments.

use std::borrow::Cow;

/// Map every line terminator other than LF to LF.
///
/// CRLF becomes two newlines; only LF and CRLF sources are expected.
pub fn normalize_newlines(value: &str) -> Cow<'_, str> {
    if value.contains(is_foreign_newline) {
        Cow::Owned(
            value
                .chars()
                .map(|c| if is_foreign_newline(c) { '\n' } else { c })
                .collect(),
        )
    } else {
        Cow::Borrowed(value)
    }
}

fn is_foreign_newline(c: char) -> bool {
    matches!(c, '\r' | '\u{0085}' | '\u{2028}' | '\u{2029}')
}

fn escape_with(value: &str, newline: Option<&str>) -> String {
    let value = normalize_newlines(value);
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&#38;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            '\n' => out.push_str(newline.unwrap_or("\n")),
            c => out.push(c),
        }
    }
    out
}

/// Escape for attribute values and ordinary text content. Newlines become
/// `&#10;` so they never count as layout whitespace.
pub fn escape_html(value: &str) -> String {
    escape_with(value, Some("&#10;"))
}

/// Escape for text inside whitespace-sensitive elements; newlines are kept.
pub fn escape_text(value: &str) -> String {
    escape_with(value, None)
}

/// Escape comment content: it may not start with `>` nor contain `--`.
pub fn escape_comment(value: &str) -> String {
    let value = normalize_newlines(value);
    let escaped = match value.strip_prefix('>') {
        Some(rest) => format!("&gt;{}", rest),
        None => value.into_owned(),
    };
    escaped.replace("--", "&#45;&#45;")
}
