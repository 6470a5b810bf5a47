//! SGR style closures and the chat palette.

use crate::config::EnvConfig;
use crate::highlight::highlight_code;
use crate::widgets::markdown::{MarkdownStyleFn, MarkdownTheme};

/// Border, title, and prompt color.
pub const ACCENT_HEX: &str = "#C5B841";
/// Panel body color.
pub const BODY_HEX: &str = "#FFFFFF";

/// Parses `#RRGGBB` (leading `#` optional).
pub fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Wraps text in `open`/`close` escape codes.
pub fn sgr(open: &'static str, close: &'static str) -> MarkdownStyleFn {
    Box::new(move |text| format!("{open}{text}{close}"))
}

/// Truecolor foreground for `#RRGGBB`; unparseable input leaves text unstyled.
pub fn fg_hex(hex: &str) -> MarkdownStyleFn {
    match parse_hex(hex) {
        Some((r, g, b)) => {
            let open = format!("\x1b[38;2;{r};{g};{b}m");
            Box::new(move |text| format!("{open}{text}\x1b[39m"))
        }
        None => identity(),
    }
}

fn identity() -> MarkdownStyleFn {
    Box::new(|text| text.to_string())
}

/// Style factory that collapses to plain text when color is disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    color: bool,
}

impl Palette {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn from_config(config: &EnvConfig) -> Self {
        Self::new(config.color_enabled())
    }

    pub fn color_enabled(&self) -> bool {
        self.color
    }

    pub fn accent(&self) -> MarkdownStyleFn {
        self.pick(|| fg_hex(ACCENT_HEX))
    }

    pub fn accent_bold(&self) -> MarkdownStyleFn {
        if !self.color {
            return identity();
        }
        let accent = fg_hex(ACCENT_HEX);
        Box::new(move |text| format!("\x1b[1m{}\x1b[22m", accent(text)))
    }

    pub fn body(&self) -> MarkdownStyleFn {
        self.pick(|| fg_hex(BODY_HEX))
    }

    pub fn error(&self) -> MarkdownStyleFn {
        self.pick(|| sgr("\x1b[1;31m", "\x1b[22;39m"))
    }

    /// Markdown styling used inside response panels.
    pub fn markdown_theme(&self) -> MarkdownTheme {
        if !self.color {
            return MarkdownTheme::plain();
        }
        MarkdownTheme {
            heading: fg_hex(ACCENT_HEX),
            link: sgr("\x1b[94m", "\x1b[39m"),
            link_url: sgr("\x1b[2m", "\x1b[22m"),
            code: sgr("\x1b[1;36m", "\x1b[22;39m"),
            code_block: sgr("\x1b[36m", "\x1b[39m"),
            code_block_border: sgr("\x1b[2m", "\x1b[22m"),
            quote: sgr("\x1b[35m", "\x1b[39m"),
            quote_border: sgr("\x1b[35m", "\x1b[39m"),
            hr: sgr("\x1b[33m", "\x1b[39m"),
            list_bullet: sgr("\x1b[1;33m", "\x1b[22;39m"),
            table_border: sgr("\x1b[2m", "\x1b[22m"),
            bold: sgr("\x1b[1m", "\x1b[22m"),
            italic: sgr("\x1b[3m", "\x1b[23m"),
            strikethrough: sgr("\x1b[9m", "\x1b[29m"),
            underline: sgr("\x1b[4m", "\x1b[24m"),
            text: Some(fg_hex(BODY_HEX)),
            highlight_code: Some(Box::new(|code, lang| highlight_code(code, lang))),
        }
    }

    fn pick(&self, styled: impl FnOnce() -> MarkdownStyleFn) -> MarkdownStyleFn {
        if self.color {
            styled()
        } else {
            identity()
        }
    }
}
