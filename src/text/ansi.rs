//! ANSI escape scanning and SGR style tracking.

/// A complete escape sequence found at some byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Escape<'a> {
    pub code: &'a str,
    pub len: usize,
}

/// Returns the escape sequence starting at `pos`, if any.
///
/// Recognizes CSI sequences (`ESC [ ... final`) and string-terminated OSC
/// sequences (`ESC ] ... BEL` or `ESC ] ... ESC \`). Incomplete sequences
/// are treated as plain text.
pub fn escape_at(input: &str, pos: usize) -> Option<Escape<'_>> {
    let bytes = input.as_bytes();
    if bytes.get(pos) != Some(&0x1b) {
        return None;
    }

    let end = match *bytes.get(pos + 1)? {
        b'[' => bytes[pos + 2..]
            .iter()
            .position(|b| (0x40..=0x7e).contains(b))
            .map(|offset| pos + 2 + offset + 1)?,
        b']' => osc_end(bytes, pos + 2)?,
        _ => return None,
    };

    Some(Escape {
        code: &input[pos..end],
        len: end - pos,
    })
}

fn osc_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut idx = start;
    while idx < bytes.len() {
        match bytes[idx] {
            0x07 => return Some(idx + 1),
            0x1b if bytes.get(idx + 1) == Some(&b'\\') => return Some(idx + 2),
            _ => idx += 1,
        }
    }
    None
}

/// Byte offset of the next escape sequence at or after `idx`, or the end of `input`.
pub fn next_escape_or_end(input: &str, mut idx: usize) -> usize {
    while idx < input.len() {
        if escape_at(input, idx).is_some() {
            break;
        }
        idx += input[idx..].chars().next().map_or(1, char::len_utf8);
    }
    idx
}

/// Strips every recognized escape sequence from `input`.
pub fn strip_ansi(input: &str) -> String {
    let mut plain = String::with_capacity(input.len());
    let mut idx = 0;
    while idx < input.len() {
        if let Some(escape) = escape_at(input, idx) {
            idx += escape.len;
            continue;
        }
        let end = next_escape_or_end(input, idx);
        plain.push_str(&input[idx..end]);
        idx = end;
    }
    plain
}

/// Tracks the SGR attributes active at some point in a styled string so a
/// wrapped continuation line can re-open them.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StyleTracker {
    bold: bool,
    dim: bool,
    italic: bool,
    underline: bool,
    inverse: bool,
    strikethrough: bool,
    fg: Option<String>,
    bg: Option<String>,
}

impl StyleTracker {
    /// Feeds one escape sequence; non-SGR sequences are ignored.
    pub fn apply(&mut self, code: &str) {
        let Some(params) = code
            .strip_prefix("\x1b[")
            .and_then(|rest| rest.strip_suffix('m'))
        else {
            return;
        };

        if params.is_empty() {
            *self = Self::default();
            return;
        }

        let parts: Vec<&str> = params.split(';').collect();
        let mut idx = 0;
        while idx < parts.len() {
            let code = parts[idx].parse::<u16>().unwrap_or(0);

            if matches!(code, 38 | 48) {
                let span = match parts.get(idx + 1) {
                    Some(&"5") => 3,
                    Some(&"2") => 5,
                    _ => 1,
                };
                if span > 1 && idx + span <= parts.len() {
                    let color = parts[idx..idx + span].join(";");
                    if code == 38 {
                        self.fg = Some(color);
                    } else {
                        self.bg = Some(color);
                    }
                    idx += span;
                    continue;
                }
            }

            match code {
                0 => *self = Self::default(),
                1 => self.bold = true,
                2 => self.dim = true,
                3 => self.italic = true,
                4 => self.underline = true,
                7 => self.inverse = true,
                9 => self.strikethrough = true,
                22 => {
                    self.bold = false;
                    self.dim = false;
                }
                23 => self.italic = false,
                24 => self.underline = false,
                27 => self.inverse = false,
                29 => self.strikethrough = false,
                39 => self.fg = None,
                49 => self.bg = None,
                30..=37 | 90..=97 => self.fg = Some(code.to_string()),
                40..=47 | 100..=107 => self.bg = Some(code.to_string()),
                _ => {}
            }
            idx += 1;
        }
    }

    /// Feeds every escape sequence contained in `text`.
    pub fn apply_all(&mut self, text: &str) {
        let mut idx = 0;
        while idx < text.len() {
            match escape_at(text, idx) {
                Some(escape) => {
                    self.apply(escape.code);
                    idx += escape.len;
                }
                None => idx = next_escape_or_end(text, idx),
            }
        }
    }

    /// A single SGR sequence re-opening all active attributes, or empty.
    pub fn reopen(&self) -> String {
        let flags = [
            (self.bold, "1"),
            (self.dim, "2"),
            (self.italic, "3"),
            (self.underline, "4"),
            (self.inverse, "7"),
            (self.strikethrough, "9"),
        ];
        let mut codes: Vec<&str> = flags
            .iter()
            .filter_map(|(on, code)| on.then_some(*code))
            .collect();
        if let Some(fg) = self.fg.as_deref() {
            codes.push(fg);
        }
        if let Some(bg) = self.bg.as_deref() {
            codes.push(bg);
        }

        if codes.is_empty() {
            String::new()
        } else {
            format!("\x1b[{}m", codes.join(";"))
        }
    }

    /// Underline bleeds into trailing padding, so it is closed at line ends.
    pub fn line_end_reset(&self) -> &'static str {
        if self.underline {
            "\x1b[24m"
        } else {
            ""
        }
    }
}
