//! Markdown widget.
//!
//! Parses GitHub-flavored Markdown with the `markdown` crate and renders the
//! mdast into styled terminal lines. Styling is injected through
//! [`MarkdownTheme`] closures so the widget never hardcodes escape codes.

use markdown::{mdast, to_mdast, ParseOptions};

use crate::component::Component;
use crate::text::{visible_width, wrap_ansi};

pub type MarkdownStyleFn = Box<dyn Fn(&str) -> String>;

/// Highlights a fenced code block; receives the code and its info-string language.
pub type MarkdownCodeHighlighterFn = Box<dyn Fn(&str, Option<&str>) -> Vec<String>>;

pub struct MarkdownTheme {
    pub heading: MarkdownStyleFn,
    pub link: MarkdownStyleFn,
    pub link_url: MarkdownStyleFn,
    pub code: MarkdownStyleFn,
    pub code_block: MarkdownStyleFn,
    pub code_block_border: MarkdownStyleFn,
    pub quote: MarkdownStyleFn,
    pub quote_border: MarkdownStyleFn,
    pub hr: MarkdownStyleFn,
    pub list_bullet: MarkdownStyleFn,
    pub table_border: MarkdownStyleFn,
    pub bold: MarkdownStyleFn,
    pub italic: MarkdownStyleFn,
    pub strikethrough: MarkdownStyleFn,
    pub underline: MarkdownStyleFn,
    /// Base style for body text; re-opened after every inline span.
    pub text: Option<MarkdownStyleFn>,
    pub highlight_code: Option<MarkdownCodeHighlighterFn>,
}

impl MarkdownTheme {
    /// A theme that emits no escape codes at all.
    pub fn plain() -> Self {
        fn same() -> MarkdownStyleFn {
            Box::new(|text| text.to_string())
        }
        Self {
            heading: same(),
            link: same(),
            link_url: same(),
            code: same(),
            code_block: same(),
            code_block_border: same(),
            quote: same(),
            quote_border: same(),
            hr: same(),
            list_bullet: same(),
            table_border: same(),
            bold: same(),
            italic: same(),
            strikethrough: same(),
            underline: same(),
            text: None,
            highlight_code: None,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum InlineMode {
    Body,
    Quote,
}

enum ListLine {
    Own(String),
    Nested(String),
}

pub struct Markdown {
    text: String,
    padding_x: usize,
    theme: MarkdownTheme,
    cache: Option<(usize, Vec<String>)>,
}

impl Markdown {
    pub fn new(text: impl Into<String>, padding_x: usize, theme: MarkdownTheme) -> Self {
        Self {
            text: text.into(),
            padding_x,
            theme,
            cache: None,
        }
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.invalidate();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    fn body(&self, text: &str) -> String {
        match self.theme.text.as_ref() {
            Some(style) => style(text),
            None => text.to_string(),
        }
    }

    fn styled(&self, text: &str, mode: InlineMode) -> String {
        text.split('\n')
            .map(|segment| match mode {
                InlineMode::Body => self.body(segment),
                InlineMode::Quote => (self.theme.quote)(&(self.theme.italic)(segment)),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Escape codes that re-open the surrounding style after a span closes.
    fn reopen_prefix(&self, mode: InlineMode) -> String {
        const SENTINEL: &str = "\u{0}";
        let styled = self.styled(SENTINEL, mode);
        styled
            .find(SENTINEL)
            .map(|idx| styled[..idx].to_string())
            .unwrap_or_default()
    }

    fn inline(&self, nodes: &[mdast::Node], mode: InlineMode) -> String {
        let reopen = self.reopen_prefix(mode);
        let mut out = String::new();

        for node in nodes {
            match node {
                mdast::Node::Text(text) => out.push_str(&self.styled(&text.value, mode)),
                mdast::Node::Paragraph(paragraph) => {
                    out.push_str(&self.inline(&paragraph.children, mode));
                }
                mdast::Node::Strong(strong) => {
                    out.push_str(&(self.theme.bold)(&self.inline(&strong.children, mode)));
                    out.push_str(&reopen);
                }
                mdast::Node::Emphasis(emphasis) => {
                    out.push_str(&(self.theme.italic)(&self.inline(&emphasis.children, mode)));
                    out.push_str(&reopen);
                }
                mdast::Node::Delete(delete) => {
                    out.push_str(
                        &(self.theme.strikethrough)(&self.inline(&delete.children, mode)),
                    );
                    out.push_str(&reopen);
                }
                mdast::Node::InlineCode(code) => {
                    out.push_str(&(self.theme.code)(&code.value));
                    out.push_str(&reopen);
                }
                mdast::Node::Link(link) => {
                    let label = self.inline(&link.children, mode);
                    out.push_str(&(self.theme.link)(&(self.theme.underline)(&label)));
                    let plain = plain_text(&link.children);
                    let href = link.url.as_str();
                    if plain != href && plain != href.trim_start_matches("mailto:") {
                        out.push_str(&(self.theme.link_url)(&format!(" ({href})")));
                    }
                    out.push_str(&reopen);
                }
                mdast::Node::Image(image) => {
                    let alt = if image.alt.is_empty() {
                        image.url.as_str()
                    } else {
                        image.alt.as_str()
                    };
                    out.push_str(&self.styled(alt, mode));
                }
                mdast::Node::Break(_) => out.push('\n'),
                mdast::Node::Html(html) => out.push_str(&self.styled(&html.value, mode)),
                mdast::Node::InlineMath(math) => out.push_str(&self.styled(&math.value, mode)),
                _ => {}
            }
        }

        out
    }

    fn heading(&self, heading: &mdast::Heading) -> String {
        let text = self.inline(&heading.children, InlineMode::Body);
        let styled = match heading.depth {
            1 => (self.theme.bold)(&(self.theme.underline)(&text)),
            2 => (self.theme.bold)(&text),
            depth => (self.theme.bold)(&format!("{} {text}", "#".repeat(depth as usize))),
        };
        (self.theme.heading)(&styled)
    }

    fn code_block(&self, code: &mdast::Code) -> Vec<String> {
        let lang = code.lang.as_deref();
        let mut lines = vec![(self.theme.code_block_border)(&format!(
            "```{}",
            lang.unwrap_or_default()
        ))];
        let body = match self.theme.highlight_code.as_ref() {
            Some(highlight) => highlight(&code.value, lang),
            None => code
                .value
                .split('\n')
                .map(|line| (self.theme.code_block)(line))
                .collect(),
        };
        lines.extend(body.into_iter().map(|line| format!("  {line}")));
        lines.push((self.theme.code_block_border)("```"));
        lines
    }

    fn list(&self, list: &mdast::List, depth: usize) -> Vec<String> {
        let indent = "  ".repeat(depth);
        let start = list.start.unwrap_or(1);
        let mut lines = Vec::new();

        let items = list.children.iter().filter_map(|node| match node {
            mdast::Node::ListItem(item) => Some(item),
            _ => None,
        });
        for (idx, item) in items.enumerate() {
            let marker = if list.ordered {
                format!("{}. ", start as usize + idx)
            } else {
                "- ".to_string()
            };
            let checkbox = match item.checked {
                Some(true) => "[x] ",
                Some(false) => "[ ] ",
                None => "",
            };
            let bullet = (self.theme.list_bullet)(&marker);

            let mut first = true;
            for line in self.list_item(item, depth) {
                match line {
                    ListLine::Nested(nested) => lines.push(nested),
                    ListLine::Own(text) if first => {
                        lines.push(format!("{indent}{bullet}{checkbox}{text}"));
                    }
                    ListLine::Own(text) => lines.push(format!("{indent}  {text}")),
                }
                first = false;
            }
            if first {
                lines.push(format!("{indent}{bullet}{checkbox}"));
            }
        }

        lines
    }

    fn list_item(&self, item: &mdast::ListItem, depth: usize) -> Vec<ListLine> {
        let mut lines = Vec::new();
        for child in &item.children {
            match child {
                mdast::Node::List(list) => lines.extend(
                    self.list(list, depth + 1)
                        .into_iter()
                        .map(ListLine::Nested),
                ),
                mdast::Node::Code(code) => {
                    lines.extend(self.code_block(code).into_iter().map(ListLine::Own));
                }
                other => {
                    let text = self.inline(std::slice::from_ref(other), InlineMode::Body);
                    lines.extend(text.split('\n').map(|line| ListLine::Own(line.to_string())));
                }
            }
        }
        lines
    }

    fn blockquote(&self, quote: &mdast::Blockquote, width: usize) -> Vec<String> {
        let border = (self.theme.quote_border)("│ ");
        let inner = width.saturating_sub(2).max(1);
        let paragraphs: Vec<String> = quote
            .children
            .iter()
            .map(|child| self.inline(std::slice::from_ref(child), InlineMode::Quote))
            .collect();

        paragraphs
            .join("\n")
            .split('\n')
            .flat_map(|line| wrap_ansi(line, inner))
            .map(|line| format!("{border}{line}"))
            .collect()
    }

    fn table(&self, table: &mdast::Table, width: usize) -> Vec<String> {
        let rows: Vec<Vec<String>> = table
            .children
            .iter()
            .filter_map(|node| match node {
                mdast::Node::TableRow(row) => Some(
                    row.children
                        .iter()
                        .map(|cell| match cell {
                            mdast::Node::TableCell(cell) => {
                                self.inline(&cell.children, InlineMode::Body)
                            }
                            other => self.inline(std::slice::from_ref(other), InlineMode::Body),
                        })
                        .collect(),
                ),
                _ => None,
            })
            .collect();

        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        if columns == 0 {
            return Vec::new();
        }

        let mut widths = vec![1usize; columns];
        for row in &rows {
            for (idx, cell) in row.iter().enumerate() {
                widths[idx] = widths[idx].max(visible_width(cell));
            }
        }
        fit_columns(&mut widths, width.saturating_sub(3 * columns + 1));

        let border = |left: &str, mid: &str, right: &str| {
            let runs: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
            (self.theme.table_border)(&format!("{left}─{}─{right}", runs.join(&format!("─{mid}─"))))
        };
        let bar = (self.theme.table_border)("│");

        let mut lines = vec![border("┌", "┬", "┐")];
        for (row_idx, row) in rows.iter().enumerate() {
            let wrapped: Vec<Vec<String>> = (0..columns)
                .map(|idx| wrap_ansi(row.get(idx).map_or("", String::as_str), widths[idx]))
                .collect();
            let height = wrapped.iter().map(Vec::len).max().unwrap_or(1);

            for line_idx in 0..height {
                let cells: Vec<String> = wrapped
                    .iter()
                    .enumerate()
                    .map(|(idx, cell)| {
                        let text = cell.get(line_idx).map_or("", String::as_str);
                        let padded = format!(
                            "{text}{}",
                            " ".repeat(widths[idx].saturating_sub(visible_width(text)))
                        );
                        if row_idx == 0 {
                            (self.theme.bold)(&padded)
                        } else {
                            padded
                        }
                    })
                    .collect();
                lines.push(format!("{bar} {} {bar}", cells.join(&format!(" {bar} "))));
            }

            if row_idx == 0 && rows.len() > 1 {
                lines.push(border("├", "┼", "┤"));
            }
        }
        lines.push(border("└", "┴", "┘"));
        lines
    }

    fn block(&self, node: &mdast::Node, width: usize) -> Vec<String> {
        match node {
            mdast::Node::Heading(heading) => vec![self.heading(heading)],
            mdast::Node::Paragraph(paragraph) => self
                .inline(&paragraph.children, InlineMode::Body)
                .split('\n')
                .map(str::to_string)
                .collect(),
            mdast::Node::Code(code) => self.code_block(code),
            mdast::Node::List(list) => self.list(list, 0),
            mdast::Node::Blockquote(quote) => self.blockquote(quote, width),
            mdast::Node::Table(table) => self.table(table, width),
            mdast::Node::ThematicBreak(_) => vec![(self.theme.hr)(&"─".repeat(width.min(80)))],
            mdast::Node::Html(html) => vec![self.body(html.value.trim())],
            mdast::Node::Math(math) => vec![self.body(&math.value)],
            _ => Vec::new(),
        }
    }
}

impl Component for Markdown {
    fn render(&mut self, width: usize) -> Vec<String> {
        if let Some((cached_width, lines)) = self.cache.as_ref() {
            if *cached_width == width {
                return lines.clone();
            }
        }

        let content_width = width.saturating_sub(self.padding_x * 2).max(1);
        let mut rendered: Vec<String> = Vec::new();

        if !self.text.trim().is_empty() {
            let source = self.text.replace('\t', "   ");
            let blocks = match to_mdast(&source, &ParseOptions::gfm()) {
                Ok(mdast::Node::Root(root)) => root.children,
                Ok(other) => vec![other],
                Err(_) => vec![mdast::Node::Paragraph(mdast::Paragraph {
                    children: vec![mdast::Node::Text(mdast::Text {
                        value: source.clone(),
                        position: None,
                    })],
                    position: None,
                })],
            };

            for block in &blocks {
                let lines = self.block(block, content_width);
                if lines.is_empty() {
                    continue;
                }
                if !rendered.is_empty() {
                    rendered.push(String::new());
                }
                rendered.extend(lines);
            }
        }

        let margin = " ".repeat(self.padding_x);
        let lines: Vec<String> = rendered
            .iter()
            .flat_map(|line| wrap_ansi(line, content_width))
            .map(|line| {
                if line.is_empty() {
                    line
                } else {
                    format!("{margin}{line}")
                }
            })
            .collect();

        self.cache = Some((width, lines.clone()));
        lines
    }

    fn invalidate(&mut self) {
        self.cache = None;
    }
}

/// Shrinks the widest columns one cell at a time until the row fits `budget`.
fn fit_columns(widths: &mut [usize], budget: usize) {
    let budget = budget.max(widths.len());
    while widths.iter().sum::<usize>() > budget {
        let Some(widest) = widths
            .iter()
            .enumerate()
            .max_by_key(|(_, width)| **width)
            .map(|(idx, _)| idx)
        else {
            return;
        };
        if widths[widest] <= 1 {
            return;
        }
        widths[widest] -= 1;
    }
}

fn plain_text(nodes: &[mdast::Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            mdast::Node::Text(text) => out.push_str(&text.value),
            mdast::Node::InlineCode(code) => out.push_str(&code.value),
            mdast::Node::Strong(mdast::Strong { children, .. })
            | mdast::Node::Emphasis(mdast::Emphasis { children, .. })
            | mdast::Node::Delete(mdast::Delete { children, .. })
            | mdast::Node::Link(mdast::Link { children, .. }) => {
                out.push_str(&plain_text(children));
            }
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{fit_columns, Markdown, MarkdownTheme};
    use crate::component::Component;

    fn tagged_theme() -> MarkdownTheme {
        MarkdownTheme {
            heading: Box::new(|text| format!("<h>{text}</h>")),
            link: Box::new(|text| format!("<l>{text}</l>")),
            link_url: Box::new(|text| format!("<u>{text}</u>")),
            code: Box::new(|text| format!("`{text}`")),
            bold: Box::new(|text| format!("<b>{text}</b>")),
            italic: Box::new(|text| format!("<i>{text}</i>")),
            underline: Box::new(|text| format!("<u>{text}</u>")),
            quote: Box::new(|text| format!("<q>{text}</q>")),
            list_bullet: Box::new(|text| format!("<li>{text}</li>")),
            ..MarkdownTheme::plain()
        }
    }

    #[test]
    fn bold_text_is_styled_inline() {
        let mut markdown = Markdown::new("Hello **Jacob**!", 0, tagged_theme());
        assert_eq!(markdown.render(40), vec!["Hello <b>Jacob</b>!"]);
    }

    #[test]
    fn headings_are_separated_from_following_paragraphs() {
        let mut markdown = Markdown::new("# Title\nParagraph", 0, tagged_theme());
        let lines = markdown.render(40);
        assert_eq!(lines, vec!["<h><b><u>Title</u></b></h>", "", "Paragraph"]);
    }

    #[test]
    fn link_url_is_shown_only_when_label_differs() {
        let mut markdown = Markdown::new("[x](x)\n\n[y](z)", 0, tagged_theme());
        let lines = markdown.render(80);
        assert_eq!(lines[0], "<l><u>x</u></l>");
        assert_eq!(lines[2], "<l><u>y</u></l><u> (z)</u>");
    }

    #[test]
    fn lists_nest_and_show_task_state() {
        let mut markdown = Markdown::new("- one\n  - inner\n- [x] done", 0, tagged_theme());
        let lines = markdown.render(80);
        assert_eq!(lines[0], "<li>- </li>one");
        assert_eq!(lines[1], "  <li>- </li>inner");
        assert_eq!(lines[2], "<li>- </li>[x] done");
    }

    #[test]
    fn ordered_lists_count_from_start() {
        let mut markdown = Markdown::new("3. three\n4. four", 0, MarkdownTheme::plain());
        assert_eq!(markdown.render(80), vec!["3. three", "4. four"]);
    }

    #[test]
    fn blockquotes_are_prefixed_and_wrapped() {
        let mut markdown = Markdown::new("> quoted words here", 0, MarkdownTheme::plain());
        let lines = markdown.render(10);
        assert!(lines.iter().all(|line| line.starts_with("│ ")));
        assert!(lines.len() > 1);
    }

    #[test]
    fn fenced_code_keeps_fences_and_indents_body() {
        let mut markdown = Markdown::new("```rust\nfn main() {}\n```", 0, MarkdownTheme::plain());
        assert_eq!(
            markdown.render(40),
            vec!["```rust", "  fn main() {}", "```"]
        );
    }

    #[test]
    fn tables_draw_box_borders() {
        let mut markdown = Markdown::new("| a | b |\n| - | - |\n| c | d |", 0, MarkdownTheme::plain());
        let lines = markdown.render(40);
        assert_eq!(
            lines,
            vec!["┌───┬───┐", "│ a │ b │", "├───┼───┤", "│ c │ d │", "└───┴───┘"]
        );
    }

    #[test]
    fn base_text_style_reopens_after_spans() {
        let theme = MarkdownTheme {
            text: Some(Box::new(|text| format!("\x1b[37m{text}\x1b[39m"))),
            bold: Box::new(|text| format!("<b>{text}</b>")),
            ..MarkdownTheme::plain()
        };
        let mut markdown = Markdown::new("a **b** c", 0, theme);
        let lines = markdown.render(40);
        assert_eq!(
            lines[0],
            "\x1b[37ma \x1b[39m<b>\x1b[37mb\x1b[39m</b>\x1b[37m\x1b[37m c\x1b[39m"
        );
    }

    #[test]
    fn padding_indents_and_empty_text_renders_nothing() {
        let mut markdown = Markdown::new("hi", 2, MarkdownTheme::plain());
        assert_eq!(markdown.render(10), vec!["  hi"]);

        markdown.set_text("   ");
        assert!(markdown.render(10).is_empty());
    }

    #[test]
    fn fit_columns_shrinks_widest_first() {
        let mut widths = vec![10, 4, 2];
        fit_columns(&mut widths, 12);
        assert_eq!(widths.iter().sum::<usize>(), 12);
        assert_eq!(widths[2], 2);
    }
}
