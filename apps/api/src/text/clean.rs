/// Normalizes extracted document text.
///
/// Runs of horizontal whitespace collapse to a single space, runs of line
/// breaks (including any whitespace between them) collapse to a single `\n`,
/// and leading/trailing whitespace is dropped. Paragraph breaks survive so the
/// stored text stays readable; tokenization downstream ignores them anyway.
pub fn clean_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;
    let mut pending_newline = false;

    for ch in raw.chars() {
        if is_line_break(ch) {
            pending_newline = true;
            continue;
        }
        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        if !out.is_empty() {
            if pending_newline {
                out.push('\n');
            } else if pending_space {
                out.push(' ');
            }
        }
        pending_space = false;
        pending_newline = false;
        out.push(ch);
    }

    out
}

fn is_line_break(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{0b}' | '\u{0c}' | '\u{2028}' | '\u{2029}')
}
