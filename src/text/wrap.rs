//! Word wrapping that keeps ANSI styles open across line breaks.

use unicode_segmentation::UnicodeSegmentation;

use super::ansi::{escape_at, next_escape_or_end, StyleTracker};
use super::width::{grapheme_width, visible_width};

/// Wraps `text` to `width` columns.
///
/// Explicit newlines are preserved. Words longer than `width` are broken at
/// grapheme boundaries. Every continuation line re-opens the styles active at
/// the break, and trailing whitespace is trimmed.
pub fn wrap_ansi(text: &str, width: usize) -> Vec<String> {
    if text.is_empty() || width == 0 {
        return vec![String::new()];
    }

    let mut lines = Vec::new();
    let mut carried = StyleTracker::default();

    for source_line in text.split('\n') {
        let line = format!("{}{source_line}", carried.reopen());
        lines.extend(wrap_line(&line, width));
        carried.apply_all(source_line);
    }

    lines
        .into_iter()
        .map(|line| line.trim_end().to_string())
        .collect()
}

fn wrap_line(line: &str, width: usize) -> Vec<String> {
    if visible_width(line) <= width {
        return vec![line.to_string()];
    }

    let mut tracker = StyleTracker::default();
    let mut wrapped = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for token in tokenize(line) {
        let token_width = visible_width(&token);
        let is_space = token.trim().is_empty();

        if token_width > width && !is_space {
            if current_width > 0 {
                wrapped.push(close_line(&current, &tracker));
            }
            let mut pieces = break_word(&token, width, &mut tracker);
            current = pieces.pop().unwrap_or_default();
            current_width = visible_width(&current);
            wrapped.extend(pieces);
            continue;
        }

        if current_width > 0 && current_width + token_width > width {
            wrapped.push(close_line(&current, &tracker));
            current = tracker.reopen();
            current_width = 0;
            if is_space {
                tracker.apply_all(&token);
                continue;
            }
        }

        current.push_str(&token);
        current_width += token_width;
        tracker.apply_all(&token);
    }

    if !current.is_empty() {
        wrapped.push(current);
    }
    wrapped
}

fn close_line(line: &str, tracker: &StyleTracker) -> String {
    let mut closed = line.trim_end().to_string();
    closed.push_str(tracker.line_end_reset());
    closed
}

/// Splits into alternating runs of spaces and non-spaces; escape sequences
/// stick to the run that follows them.
fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut pending = String::new();
    let mut in_space = false;
    let mut idx = 0;

    while idx < text.len() {
        if let Some(escape) = escape_at(text, idx) {
            pending.push_str(escape.code);
            idx += escape.len;
            continue;
        }

        let Some(ch) = text[idx..].chars().next() else {
            break;
        };
        let is_space = ch == ' ';
        if is_space != in_space && !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
        current.push_str(&pending);
        pending.clear();
        current.push(ch);
        in_space = is_space;
        idx += ch.len_utf8();
    }

    current.push_str(&pending);
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn break_word(word: &str, width: usize, tracker: &mut StyleTracker) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = tracker.reopen();
    let mut current_width = 0;
    let mut idx = 0;

    while idx < word.len() {
        if let Some(escape) = escape_at(word, idx) {
            current.push_str(escape.code);
            tracker.apply(escape.code);
            idx += escape.len;
            continue;
        }

        let end = next_escape_or_end(word, idx);
        for grapheme in word[idx..end].graphemes(true) {
            let grapheme_cols = grapheme_width(grapheme);
            if current_width > 0 && current_width + grapheme_cols > width {
                current.push_str(tracker.line_end_reset());
                pieces.push(std::mem::replace(&mut current, tracker.reopen()));
                current_width = 0;
            }
            current.push_str(grapheme);
            current_width += grapheme_cols;
        }
        idx = end;
    }

    pieces.push(current);
    pieces
}
