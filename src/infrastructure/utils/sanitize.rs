/// Replacement order matters: `&` goes first so the entities produced by
/// the later rules are not escaped a second time.
const HTML_ESCAPES: [(char, &str); 6] = [
    ('&', "&amp;"),
    ('<', "&lt;"),
    ('>', "&gt;"),
    ('"', "&quot;"),
    ('\'', "&#x27;"),
    ('/', "&#x2F;"),
];

/// Escapes the six HTML-significant characters in untrusted text before it
/// is embedded in generated markup.
pub fn sanitize_html(input: &str) -> String {
    HTML_ESCAPES
        .iter()
        .fold(input.to_string(), |text, (raw, entity)| {
            if text.contains(*raw) {
                text.replace(*raw, entity)
            } else {
                text
            }
        })
}
