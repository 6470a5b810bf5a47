//! Bordered panel with a title on the top edge and a subtitle on the bottom.
//!
//! ```text
//! ╭─ Em ─────────╮
//! │              │
//! │ Hello Jacob! │
//! │              │
//! ╰──────── Mon ─╯
//! ```

use crate::component::Component;
use crate::text::{pad_to_width, truncate_to_width, visible_width};
use crate::widgets::markdown::MarkdownStyleFn;

const TOP_LEFT: &str = "╭";
const TOP_RIGHT: &str = "╮";
const BOTTOM_LEFT: &str = "╰";
const BOTTOM_RIGHT: &str = "╯";
const HORIZONTAL: &str = "─";
const VERTICAL: &str = "│";

pub struct Panel {
    child: Box<dyn Component>,
    title: Option<String>,
    subtitle: Option<String>,
    padding_x: usize,
    padding_y: usize,
    fit: bool,
    border_fn: MarkdownStyleFn,
    title_fn: MarkdownStyleFn,
    cache: Option<(usize, Vec<String>)>,
}

impl Panel {
    pub fn new(child: Box<dyn Component>, border_fn: MarkdownStyleFn) -> Self {
        Self {
            child,
            title: None,
            subtitle: None,
            padding_x: 1,
            padding_y: 1,
            fit: true,
            border_fn,
            title_fn: Box::new(|text| text.to_string()),
            cache: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn with_title_style(mut self, title_fn: MarkdownStyleFn) -> Self {
        self.title_fn = title_fn;
        self
    }

    pub fn with_padding(mut self, padding_x: usize, padding_y: usize) -> Self {
        self.padding_x = padding_x;
        self.padding_y = padding_y;
        self
    }

    /// `true` shrinks the panel to its content; `false` always fills `width`.
    pub fn with_fit(mut self, fit: bool) -> Self {
        self.fit = fit;
        self
    }

    fn label_width(label: Option<&String>) -> usize {
        label.map_or(0, |text| visible_width(text) + 2)
    }

    /// Top or bottom edge. `align_right` pushes the label to the right corner.
    fn edge(
        &self,
        left: &str,
        right: &str,
        label: Option<&String>,
        inner: usize,
        align_right: bool,
    ) -> String {
        let border = &self.border_fn;
        let Some(label) = label.filter(|_| inner >= Self::label_width(label) + 2) else {
            return border(&format!("{left}{}{right}", HORIZONTAL.repeat(inner)));
        };

        let label_cols = visible_width(label) + 2;
        let fill = inner - label_cols - 1;
        let (before, after) = if align_right { (fill, 1) } else { (1, fill) };
        format!(
            "{}{}{}",
            border(&format!("{left}{} ", HORIZONTAL.repeat(before))),
            (self.title_fn)(label),
            border(&format!(" {}{right}", HORIZONTAL.repeat(after)))
        )
    }
}

impl Component for Panel {
    fn render(&mut self, width: usize) -> Vec<String> {
        if let Some((cached_width, lines)) = self.cache.as_ref() {
            if *cached_width == width {
                return lines.clone();
            }
        }

        // Below two columns there is no room for the border.
        if width < 2 {
            let lines: Vec<String> = self
                .child
                .render(width.max(1))
                .iter()
                .map(|line| truncate_to_width(line, width))
                .collect();
            self.cache = Some((width, lines.clone()));
            return lines;
        }

        let avail = width - 2;
        let padding_x = self.padding_x.min(avail.saturating_sub(1) / 2);
        let max_content = avail - padding_x * 2;
        let body = self.child.render(max_content.max(1));

        let content_width = if self.fit {
            let labels = Self::label_width(self.title.as_ref())
                .max(Self::label_width(self.subtitle.as_ref()))
                + 2;
            body.iter()
                .map(|line| visible_width(line))
                .max()
                .unwrap_or(0)
                .max(labels.saturating_sub(padding_x * 2))
                .min(max_content)
        } else {
            max_content
        };
        let inner = content_width + padding_x * 2;

        let side = (self.border_fn)(VERTICAL);
        let margin = " ".repeat(padding_x);
        let blank = format!("{side}{}{side}", " ".repeat(inner));

        let mut lines = Vec::with_capacity(body.len() + 2 + self.padding_y * 2);
        lines.push(self.edge(TOP_LEFT, TOP_RIGHT, self.title.as_ref(), inner, false));
        lines.extend(std::iter::repeat(blank.clone()).take(self.padding_y));
        for line in &body {
            lines.push(format!(
                "{side}{margin}{}{margin}{side}",
                pad_to_width(&truncate_to_width(line, content_width), content_width)
            ));
        }
        lines.extend(std::iter::repeat(blank).take(self.padding_y));
        lines.push(self.edge(BOTTOM_LEFT, BOTTOM_RIGHT, self.subtitle.as_ref(), inner, true));

        self.cache = Some((width, lines.clone()));
        lines
    }

    fn invalidate(&mut self) {
        self.cache = None;
        self.child.invalidate();
    }
}
