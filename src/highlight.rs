//! Syntax highlighting for fenced code blocks.

use once_cell::sync::Lazy;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::{as_24_bit_terminal_escaped, LinesWithEndings};

const THEME_NAME: &str = "base16-ocean.dark";

static SYNTAXES: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);
static THEMES: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);

fn theme() -> Option<&'static Theme> {
    THEMES.themes.get(THEME_NAME)
}

fn syntax_for(lang: Option<&str>) -> Option<&'static SyntaxReference> {
    let token = lang?.split_whitespace().next()?;
    SYNTAXES
        .find_syntax_by_token(token)
        .or_else(|| SYNTAXES.find_syntax_by_extension(token))
}

/// Highlights `code` as `lang`, one styled string per source line.
///
/// Unknown languages and highlighter failures fall back to the raw lines.
pub fn highlight_code(code: &str, lang: Option<&str>) -> Vec<String> {
    let plain = || code.split('\n').map(str::to_string).collect::<Vec<_>>();

    let (Some(syntax), Some(theme)) = (syntax_for(lang), theme()) else {
        return plain();
    };

    let mut highlighter = HighlightLines::new(syntax, theme);
    let mut lines = Vec::new();
    for line in LinesWithEndings::from(code) {
        let Ok(ranges) = highlighter.highlight_line(line, &SYNTAXES) else {
            return plain();
        };
        let escaped = as_24_bit_terminal_escaped(&ranges, false);
        let trimmed = escaped.trim_end_matches(['\n', '\r']);
        lines.push(format!("{trimmed}\x1b[0m"));
    }
    if code.is_empty() || code.ends_with('\n') {
        lines.push(String::new());
    }
    lines
}
