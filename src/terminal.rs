//! Terminal size probing.

use crate::config::EnvConfig;

/// Width used when neither the terminal nor `COLUMNS` reports one.
pub const DEFAULT_COLUMNS: usize = 80;

/// Current column count of stdout.
///
/// Falls back to `COLUMNS`, then [`DEFAULT_COLUMNS`], when stdout is not a
/// terminal (pipes, test harnesses).
pub fn terminal_columns(config: &EnvConfig) -> usize {
    stdout_columns()
        .or(config.columns)
        .unwrap_or(DEFAULT_COLUMNS)
}

#[cfg(unix)]
fn stdout_columns() -> Option<usize> {
    let mut size = libc::winsize {
        ws_row: 0,
        ws_col: 0,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };
    // SAFETY: TIOCGWINSZ only writes into the provided `winsize` struct.
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut size) };
    if result == 0 && size.ws_col > 0 {
        Some(usize::from(size.ws_col))
    } else {
        None
    }
}

#[cfg(not(unix))]
fn stdout_columns() -> Option<usize> {
    None
}
