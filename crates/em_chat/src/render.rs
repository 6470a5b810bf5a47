//! Turn presentation: assistant panels, notices, and the startup timestamp.

use std::io::{self, Write};

use em_tui::{terminal_columns, Component, EnvConfig, Markdown, Palette, Panel};
use time::macros::format_description;
use time::OffsetDateTime;

use crate::rulesets::ASSISTANT_NAME;

/// Formats like `Wed Dec 23, 1:33am`.
pub fn format_timestamp(moment: OffsetDateTime) -> String {
    let format = format_description!(
        "[weekday repr:short] [month repr:short] [day], [hour repr:12 padding:none]:[minute][period case:lower]"
    );
    moment
        .format(&format)
        .unwrap_or_else(|_| moment.unix_timestamp().to_string())
}

/// Local wall-clock time now, or UTC when the local offset cannot be determined.
pub fn startup_timestamp() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    format_timestamp(now)
}

/// Where the panel width comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderWidth {
    Fixed(usize),
    Terminal(EnvConfig),
}

impl RenderWidth {
    fn columns(&self) -> usize {
        match self {
            Self::Fixed(columns) => (*columns).max(1),
            Self::Terminal(config) => terminal_columns(config),
        }
    }
}

/// Renders decoded turns. The subtitle is fixed at construction.
#[derive(Debug, Clone)]
pub struct TurnRenderer {
    palette: Palette,
    subtitle: String,
    width: RenderWidth,
}

impl TurnRenderer {
    pub fn new(palette: Palette, subtitle: impl Into<String>, width: RenderWidth) -> Self {
        Self {
            palette,
            subtitle: subtitle.into(),
            width,
        }
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    pub fn subtitle(&self) -> &str {
        &self.subtitle
    }

    /// Panel lines for one response, without the surrounding blank lines.
    pub fn panel_lines(&self, response_text: &str) -> Vec<String> {
        let body = Markdown::new(response_text, 0, self.palette.markdown_theme());
        let mut panel = Panel::new(Box::new(body), self.palette.accent())
            .with_title(ASSISTANT_NAME)
            .with_title_style(self.palette.accent_bold())
            .with_subtitle(&self.subtitle)
            .with_padding(1, 0);
        panel.render(self.width.columns())
    }

    /// Writes a blank line, the panel, and another blank line.
    pub fn write_turn(&self, out: &mut dyn Write, response_text: &str) -> io::Result<()> {
        writeln!(out)?;
        for line in self.panel_lines(response_text) {
            writeln!(out, "{line}")?;
        }
        writeln!(out)?;
        out.flush()
    }

    pub fn write_notice(&self, out: &mut dyn Write, notice: &str) -> io::Result<()> {
        writeln!(out, "{}", (self.palette.error())(notice))?;
        out.flush()
    }

    /// Styled input prompt, e.g. `Jacob> `.
    pub fn prompt(&self, user_name: &str) -> String {
        format!("{}> ", (self.palette.accent())(user_name))
    }
}
