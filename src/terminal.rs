//! Terminal capabilities.

use std::io::IsTerminal;

pub const DEFAULT_TERMINAL_WIDTH: usize = 80;

/// Width of the terminal stdout is attached to, or 80 when it is not a terminal.
pub fn terminal_width() -> usize {
    if !std::io::stdout().is_terminal() {
        return DEFAULT_TERMINAL_WIDTH;
    }
    match crossterm::terminal::size() {
        Ok((columns, _)) if columns > 0 => columns as usize,
        _ => DEFAULT_TERMINAL_WIDTH,
    }
}
