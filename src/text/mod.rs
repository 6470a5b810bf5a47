//! Pure string helpers for styled terminal text: escape scanning, column
//! widths, and wrapping. Widgets depend on these; nothing here writes to a
//! terminal.

pub mod ansi;
pub mod width;
pub mod wrap;

pub use ansi::strip_ansi;
pub use width::{pad_to_width, truncate_to_width, visible_width};
pub use wrap::wrap_ansi;
