use em_tui::{strip_ansi, visible_width, Component, Markdown, MarkdownTheme, Palette, Panel};
use pretty_assertions::assert_eq;

fn plain_panel(text: &str, subtitle: &str) -> Panel {
    let body = Markdown::new(text, 0, MarkdownTheme::plain());
    Panel::new(Box::new(body), Box::new(|text| text.to_string()))
        .with_title("Em")
        .with_subtitle(subtitle)
}

#[test]
fn markdown_response_renders_inside_a_fit_panel() {
    let mut panel = plain_panel("Hello **Jacob**!\n\n- one\n- two", "Mon");
    assert_eq!(
        panel.render(80),
        vec![
            "╭─ Em ─────────╮",
            "│              │",
            "│ Hello Jacob! │",
            "│              │",
            "│ - one        │",
            "│ - two        │",
            "│              │",
            "╰──────── Mon ─╯",
        ]
    );
}

#[test]
fn soft_line_breaks_are_kept() {
    let mut panel = plain_panel("first\nsecond", "t");
    let lines = panel.render(40);
    assert!(lines.contains(&"│ first  │".to_string()));
    assert!(lines.contains(&"│ second │".to_string()));
}

#[test]
fn long_responses_wrap_to_the_terminal_width() {
    let text = "word ".repeat(40);
    let mut panel = plain_panel(text.trim_end(), "Wed Dec 23, 1:33am");
    let lines = panel.render(30);
    let panel_width = visible_width(&lines[0]);
    assert!(lines.len() > 5);
    assert!(panel_width <= 30);
    assert!(lines.iter().all(|line| visible_width(line) == panel_width));
}

#[test]
fn colored_panel_keeps_the_same_layout_as_plain() {
    let palette = Palette::new(true);
    let body = Markdown::new("# Title\n\nSome `code` here.", 0, palette.markdown_theme());
    let mut colored = Panel::new(Box::new(body), palette.accent())
        .with_title("Em")
        .with_title_style(palette.accent_bold())
        .with_subtitle("Mon");

    let body = Markdown::new("# Title\n\nSome `code` here.", 0, MarkdownTheme::plain());
    let mut plain = Panel::new(Box::new(body), Box::new(|text| text.to_string()))
        .with_title("Em")
        .with_subtitle("Mon");

    let colored_lines: Vec<String> = colored.render(60).iter().map(|l| strip_ansi(l)).collect();
    assert_eq!(colored_lines, plain.render(60));
    assert!(colored.render(60)[0].contains("\x1b[38;2;197;184;65m"));
}
