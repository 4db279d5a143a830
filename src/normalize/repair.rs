/// Cuts the object-looking part out of a model reply.
///
/// The span starts at the first `{` and ends at the last `}` after it that
/// is not inside a quoted string. A reply cut off by the token limit has no
/// such closing brace; in that case the span runs to the end of the input.
/// `None` when there is no `{`.
pub fn extract_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let mut end = None;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (offset, c) in raw[start..].char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '"' | '\'' => quote = Some(c),
            '}' => end = Some(start + offset),
            _ => {}
        }
    }

    match end {
        Some(end) => Some(&raw[start..=end]),
        None => Some(&raw[start..]),
    }
}

/// Appends the closers for every `{` and `[` left open in `span`.
///
/// Delimiters inside quoted strings (single or double quotes) are ignored.
/// Closers are appended innermost first. A closer that does not match the
/// innermost open delimiter is left alone for the parser to reject, and an
/// unterminated string is not repaired.
pub fn close_unbalanced(span: &str) -> String {
    let mut open: Vec<char> = Vec::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in span.chars() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '"' | '\'' => quote = Some(c),
            '{' | '[' => open.push(c),
            '}' if open.last() == Some(&'{') => {
                open.pop();
            }
            ']' if open.last() == Some(&'[') => {
                open.pop();
            }
            _ => {}
        }
    }

    let mut repaired = String::with_capacity(span.len() + open.len());
    repaired.push_str(span);
    for c in open.iter().rev() {
        repaired.push(if *c == '{' { '}' } else { ']' });
    }
    repaired
}
