/// Escape text for interpolation into an HTML message body.
///
/// Only `&`, `<` and `>` are replaced, the set chat transports parsing HTML
/// bodies require. Quotes are left alone since no attribute carries user text.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
