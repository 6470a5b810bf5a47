//! Widgets that render to plain lines of styled text.

pub mod loader;
pub mod markdown;
pub mod panel;

pub use loader::{Loader, SharedWriter, SPINNER_FRAMES, SPINNER_INTERVAL};
pub use markdown::{Markdown, MarkdownCodeHighlighterFn, MarkdownStyleFn, MarkdownTheme};
pub use panel::Panel;
