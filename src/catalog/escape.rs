//! PO string quoting.

/// Escape text for use between PO double quotes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

/// Strip the surrounding quotes of a PO string token and unescape it.
///
/// Returns `None` when the token is not a complete quoted string.
pub fn unquote(token: &str) -> Option<String> {
    let token = token.trim();
    if token.len() < 2 || !token.starts_with('"') || !token.ends_with('"') {
        return None;
    }
    let body = &token[1..token.len() - 1];

    let mut result = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('t') => result.push('\t'),
                Some('r') => result.push('\r'),
                Some('"') => result.push('"'),
                Some('\\') => result.push('\\'),
                Some(other) => {
                    result.push('\\');
                    result.push(other);
                }
                // The closing quote was escaped.
                None => return None,
            }
        } else if c == '"' {
            return None;
        } else {
            result.push(c);
        }
    }
    Some(result)
}
