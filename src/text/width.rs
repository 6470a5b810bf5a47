//! Terminal column widths for styled text.

use emojis::get as emoji_get;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthChar;

use super::ansi::{escape_at, next_escape_or_end};

const TAB_WIDTH: usize = 3;

/// Columns occupied by one grapheme cluster.
pub fn grapheme_width(grapheme: &str) -> usize {
    match grapheme {
        "" => 0,
        "\t" => TAB_WIDTH,
        _ if emoji_get(grapheme).is_some() => 2,
        _ => grapheme
            .chars()
            .map(|ch| UnicodeWidthChar::width(ch).unwrap_or(0))
            .sum(),
    }
}

/// Columns occupied by `input` once escape sequences are removed.
pub fn visible_width(input: &str) -> usize {
    let mut width = 0;
    let mut idx = 0;
    while idx < input.len() {
        if let Some(escape) = escape_at(input, idx) {
            idx += escape.len;
            continue;
        }
        let end = next_escape_or_end(input, idx);
        width += input[idx..end]
            .graphemes(true)
            .map(grapheme_width)
            .sum::<usize>();
        idx = end;
    }
    width
}

/// Pads `line` with spaces up to `width` visible columns.
pub fn pad_to_width(line: &str, width: usize) -> String {
    let missing = width.saturating_sub(visible_width(line));
    let mut padded = String::with_capacity(line.len() + missing);
    padded.push_str(line);
    padded.extend(std::iter::repeat(' ').take(missing));
    padded
}

/// Cuts `line` down to at most `width` visible columns.
///
/// Escape sequences are all kept so styles opened before the cut still close.
pub fn truncate_to_width(line: &str, width: usize) -> String {
    if visible_width(line) <= width {
        return line.to_string();
    }

    let mut kept = String::with_capacity(line.len());
    let mut used = 0;
    let mut idx = 0;
    while idx < line.len() {
        if let Some(escape) = escape_at(line, idx) {
            kept.push_str(&line[idx..idx + escape.len]);
            idx += escape.len;
            continue;
        }
        let end = next_escape_or_end(line, idx);
        for grapheme in line[idx..end].graphemes(true) {
            let cols = grapheme_width(grapheme);
            if used + cols > width {
                break;
            }
            used += cols;
            kept.push_str(grapheme);
        }
        idx = end;
    }
    kept
}
