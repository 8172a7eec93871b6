//! Human-readable column output with colors and size bars.

use std::io::{self, Write};

use termcolor::{Color, ColorSpec, WriteColor};

use crate::config::{DetailLevel, DisplayConfig};
use crate::entry::{FileEntry, FileKind};
use crate::git::{Change, VcsStatus};
use crate::listing::Listing;

use super::bars::{MAX_BAR_WIDTH, size_bar_widths};
use super::format::{format_size, format_time, octal_mode, permission_string};

const SIZE_WIDTH: usize = MAX_BAR_WIDTH;
const TIME_WIDTH: usize = 12;
const MIN_ID_WIDTH: usize = 5;
const COLUMN_GAP: &str = "  ";

const FILE_BAR_FILL: char = ' ';
const DIR_BAR_FILL: char = '·';
const FILE_BAR_BG: Color = Color::Ansi256(238);
const DIR_BAR_BG: Color = Color::Ansi256(24);

pub const LEGEND: &str = "Git Status: [●]=Staged [○]=Unstaged [?]=Untracked [!]=Ignored";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Mode,
    Permissions,
    Size,
    Inode,
    Status,
    Owner,
    Group,
    Modified,
    Name,
}

impl Column {
    fn label(self) -> &'static str {
        match self {
            Column::Mode => "Mode",
            Column::Permissions => "Permissions",
            Column::Size => "Size",
            Column::Inode => "Inode",
            Column::Status => "Git",
            Column::Owner => "Owner",
            Column::Group => "Group",
            Column::Modified => "Modified",
            Column::Name => "Name",
        }
    }

    fn right_aligned(self) -> bool {
        matches!(self, Column::Size | Column::Inode)
    }
}

/// Column set and widths for one listing.
struct Layout {
    columns: Vec<(Column, usize)>,
}

impl Layout {
    fn new(listing: &Listing, config: &DisplayConfig) -> Self {
        let id_width = |value: fn(&FileEntry) -> u64| {
            listing
                .entries
                .iter()
                .map(|e| value(e).to_string().len())
                .max()
                .unwrap_or(0)
                .max(MIN_ID_WIDTH)
        };

        let mut columns = Vec::new();
        if config.detail == DetailLevel::Full {
            columns.push((Column::Mode, 4));
        }
        if config.detail != DetailLevel::Minimal {
            columns.push((Column::Permissions, Column::Permissions.label().len()));
        }
        columns.push((Column::Size, SIZE_WIDTH));
        if config.show_inodes {
            columns.push((Column::Inode, id_width(|e| e.inode)));
        }
        if listing.status_available {
            columns.push((Column::Status, 3));
        }
        if config.detail == DetailLevel::Full {
            if !config.omit_owner {
                columns.push((Column::Owner, id_width(|e| e.owner as u64)));
            }
            if !config.omit_group {
                columns.push((Column::Group, id_width(|e| e.group as u64)));
            }
        }
        columns.push((Column::Modified, TIME_WIDTH));
        columns.push((Column::Name, 0));
        Self { columns }
    }

    fn header(&self) -> String {
        let cells: Vec<String> = self
            .columns
            .iter()
            .map(|&(column, width)| pad(column.label(), width, column.right_aligned()))
            .collect();
        cells.join(COLUMN_GAP)
    }
}

fn pad(text: &str, width: usize, right: bool) -> String {
    if right {
        format!("{:>width$}", text, width = width)
    } else {
        format!("{:<width$}", text, width = width)
    }
}

/// Colors for the name column.
fn name_color(kind: FileKind) -> Option<ColorSpec> {
    let mut spec = ColorSpec::new();
    match kind {
        FileKind::Directory => spec.set_fg(Some(Color::Blue)).set_bold(true),
        FileKind::Symlink => spec.set_fg(Some(Color::Cyan)),
        FileKind::RegularFile { executable: true } => spec.set_fg(Some(Color::Green)),
        FileKind::RegularFile { executable: false } => return None,
    };
    Some(spec)
}

/// Colors for the status symbol. Unstaged changes use a dimmer shade.
fn status_color(status: VcsStatus) -> Option<ColorSpec> {
    let code = match status {
        VcsStatus::Staged(Change::Modified) => 214,
        VcsStatus::Unstaged(Change::Modified) => 178,
        VcsStatus::Staged(Change::Added) => 34,
        VcsStatus::Unstaged(Change::Added) => 28,
        VcsStatus::Staged(Change::Deleted) => 167,
        VcsStatus::Unstaged(Change::Deleted) => 131,
        VcsStatus::Staged(Change::Renamed) => 141,
        VcsStatus::Unstaged(Change::Renamed) => 97,
        VcsStatus::Staged(Change::Copied) => 73,
        VcsStatus::Unstaged(Change::Copied) => 66,
        VcsStatus::Untracked => 245,
        VcsStatus::Ignored => 240,
        VcsStatus::Clean => return None,
    };
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(Color::Ansi256(code)));
    Some(spec)
}

/// Name with its type indicator suffix.
pub fn decorated_name(entry: &FileEntry, config: &DisplayConfig) -> String {
    let mut name = entry.display_name().into_owned();
    match entry.kind {
        FileKind::Directory if config.type_indicators || config.append_slash => name.push('/'),
        FileKind::Symlink if config.type_indicators => name.push('@'),
        FileKind::RegularFile { executable: true } if config.type_indicators => name.push('*'),
        _ => {}
    }
    name
}

/// Entries belong to the same group when both are directories or both are
/// non-directories with the same extension.
fn same_group(a: &FileEntry, b: &FileEntry) -> bool {
    match (a.is_dir(), b.is_dir()) {
        (true, true) => true,
        (false, false) => a.extension() == b.extension(),
        _ => false,
    }
}

fn write_colored<W: WriteColor>(out: &mut W, text: &str, spec: Option<ColorSpec>) -> io::Result<()> {
    match spec {
        Some(spec) => {
            out.set_color(&spec)?;
            write!(out, "{}", text)?;
            out.reset()
        }
        None => write!(out, "{}", text),
    }
}

/// Write the size cell, overlaying the first `bar` characters with a highlight.
fn write_size_cell<W: WriteColor>(
    out: &mut W,
    text: &str,
    bar: Option<usize>,
    is_dir: bool,
) -> io::Result<()> {
    let cell = pad(text, SIZE_WIDTH, true);
    let bar = match bar {
        Some(width) if out.supports_color() => width.min(SIZE_WIDTH),
        _ => return write!(out, "{}", cell),
    };

    let (fill, background) = if is_dir {
        (DIR_BAR_FILL, DIR_BAR_BG)
    } else {
        (FILE_BAR_FILL, FILE_BAR_BG)
    };
    let overlay: String = cell
        .chars()
        .take(bar)
        .map(|c| if c == ' ' { fill } else { c })
        .collect();
    let rest: String = cell.chars().skip(bar).collect();

    out.set_color(ColorSpec::new().set_bg(Some(background)))?;
    write!(out, "{}", overlay)?;
    out.reset()?;
    write!(out, "{}", rest)
}

/// Write the human-readable listing.
///
/// `terminal_width` caps the rule under the header.
pub fn write_human<W: WriteColor>(
    out: &mut W,
    listing: &Listing,
    config: &DisplayConfig,
    terminal_width: usize,
) -> io::Result<()> {
    if let Some(branch) = &listing.branch {
        writeln!(out, "Branch: {}", branch)?;
        writeln!(out)?;
    }
    if config.show_legend {
        writeln!(out, "{}", LEGEND)?;
        writeln!(out)?;
    }

    let layout = Layout::new(listing, config);
    if !config.one_column {
        let header = layout.header();
        let rule_width = header.chars().count().min(terminal_width);
        writeln!(out, "{}", header)?;
        writeln!(out, "{}", "─".repeat(rule_width))?;
    }

    let bars = size_bar_widths(&listing.entries);
    let mut previous: Option<&FileEntry> = None;

    for (entry, bar) in listing.entries.iter().zip(bars) {
        if config.group_by_type && previous.is_some_and(|p| !same_group(p, entry)) {
            writeln!(out)?;
        }
        previous = Some(entry);

        for (i, &(column, width)) in layout.columns.iter().enumerate() {
            if i > 0 {
                write!(out, "{}", COLUMN_GAP)?;
            }
            match column {
                Column::Mode => write!(out, "{}", pad(&octal_mode(entry), width, false))?,
                Column::Permissions => {
                    write!(out, "{}", pad(&permission_string(entry), width, false))?
                }
                Column::Size => {
                    let text = if entry.is_dir() && !config.dir_sizes {
                        "-".to_string()
                    } else {
                        format_size(entry.size)
                    };
                    write_size_cell(out, &text, bar, entry.is_dir())?;
                }
                Column::Inode => write!(out, "{}", pad(&entry.inode.to_string(), width, true))?,
                Column::Status => {
                    write!(out, " ")?;
                    write_colored(
                        out,
                        &entry.status.symbol().to_string(),
                        status_color(entry.status),
                    )?;
                    write!(out, " ")?;
                }
                Column::Owner => write!(out, "{}", pad(&entry.owner.to_string(), width, false))?,
                Column::Group => write!(out, "{}", pad(&entry.group.to_string(), width, false))?,
                Column::Modified => {
                    write!(out, "{}", pad(&format_time(entry.modified_ns), width, false))?
                }
                Column::Name => {
                    write_colored(out, &decorated_name(entry, config), name_color(entry.kind))?
                }
            }
        }
        writeln!(out)?;
    }
    Ok(())
}
