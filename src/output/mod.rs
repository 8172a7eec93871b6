//! Listing formatting and display
//!
//! Three encodings are supported:
//! - human-readable columns with colors and size bars
//! - JSON, one record per entry
//! - porcelain, one stable whitespace-separated line per entry
//!
//! # Module Structure
//!
//! - `format` - size, time and permission formatting
//! - `bars` - logarithmic size bar widths
//! - `human` - column output
//! - `json` - JSON output
//! - `porcelain` - script-friendly output

mod bars;
mod format;
mod human;
mod json;
mod porcelain;

use std::io;

use termcolor::WriteColor;

use crate::config::{DisplayConfig, OutputFormat};
use crate::listing::Listing;

pub use bars::{MAX_BAR_WIDTH, MIN_BAR_WIDTH, size_bar_widths};
pub use format::{format_size, format_time, octal_mode, permission_string};
pub use human::{LEGEND, decorated_name, write_human};
pub use json::{JsonEntry, write_json};
pub use porcelain::write_porcelain;

/// Render `listing` in the format selected by `config`.
pub fn render<W: WriteColor>(
    out: &mut W,
    listing: &Listing,
    config: &DisplayConfig,
    terminal_width: usize,
) -> io::Result<()> {
    match config.format {
        OutputFormat::Human => write_human(out, listing, config, terminal_width),
        OutputFormat::Json => write_json(out, &listing.entries),
        OutputFormat::Porcelain => write_porcelain(out, &listing.entries),
    }
}
