//! Line-oriented terminal rendering for chat transcripts.
//!
//! Widgets implement [`Component`] and return styled lines for a given width;
//! callers decide when and where to print them.
//!
//! # Public API Overview
//! - [`Markdown`] renders GitHub-flavored Markdown with a [`MarkdownTheme`].
//! - [`Panel`] frames any component in a rounded border with a title and subtitle.
//! - [`Loader`] animates a spinner on a background thread.
//! - [`Palette`] builds style closures and honors `NO_COLOR`.
//! - Text helpers measure and wrap ANSI-styled strings.

#![allow(clippy::type_complexity)]

pub mod component;
pub mod config;
pub mod highlight;
pub mod style;
pub mod terminal;
pub mod text;
pub mod widgets;

pub use crate::component::Component;
pub use crate::config::EnvConfig;
pub use crate::highlight::highlight_code;
pub use crate::style::{fg_hex, parse_hex, sgr, Palette, ACCENT_HEX, BODY_HEX};
pub use crate::terminal::{terminal_columns, DEFAULT_COLUMNS};
pub use crate::text::{pad_to_width, strip_ansi, truncate_to_width, visible_width, wrap_ansi};
pub use crate::widgets::{
    Loader, Markdown, MarkdownCodeHighlighterFn, MarkdownStyleFn, MarkdownTheme, Panel,
    SharedWriter, SPINNER_FRAMES, SPINNER_INTERVAL,
};
