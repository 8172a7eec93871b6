//! CLI entry point for lg

use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, ValueEnum};
use env_logger::Env;
use lg::{
    DetailLevel, DisplayConfig, OutputFormat, SystemRunner, build_listing, render, terminal_width,
};
use termcolor::{ColorChoice, StandardStream};

/// Color output mode
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum ColorMode {
    /// Auto-detect based on terminal and environment
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Determine whether to use color output based on mode and environment.
fn should_use_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            // Respect NO_COLOR environment variable (https://no-color.org/)
            if std::env::var_os("NO_COLOR").is_some() {
                return false;
            }
            if std::env::var_os("FORCE_COLOR").is_some() {
                return true;
            }
            if std::env::var("TERM").map(|t| t == "dumb").unwrap_or(false) {
                return false;
            }
            std::io::stdout().is_terminal()
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "lg")]
#[command(about = "List directory contents with git status information")]
#[command(version)]
struct Args {
    /// Directory to list
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Show hidden files
    #[arg(short, long)]
    all: bool,

    /// More detail: -l adds permissions, -ll adds octal mode, owner and group
    #[arg(short = 'l', action = ArgAction::Count)]
    long: u8,

    /// Compute recursive directory sizes (runs du)
    #[arg(short = 'd', long = "dir-sizes")]
    dir_sizes: bool,

    /// Group directories first, then files by extension
    #[arg(short = 'G', long = "group-by-type")]
    group_by_type: bool,

    /// Show inode numbers
    #[arg(short = 'i', long = "inode")]
    inode: bool,

    /// Reverse the final order
    #[arg(short = 'r', long = "reverse")]
    reverse: bool,

    /// Sort by size, largest first
    #[arg(short = 'S', long = "size-sort")]
    size_sort: bool,

    /// Sort by modification time, oldest first (the default)
    #[arg(short = 't', long = "time")]
    time: bool,

    /// Sort alphabetically by name
    #[arg(short = 'n', long = "name")]
    name: bool,

    /// Sort by extension
    #[arg(short = 'X', long = "extension")]
    extension: bool,

    /// Do not sort; list entries in directory order
    #[arg(short = 'U', long = "unsorted")]
    unsorted: bool,

    /// One entry per line, without the header
    #[arg(short = '1', long = "one-column")]
    one_column: bool,

    /// Append indicator (one of */@) to entries
    #[arg(short = 'F', long = "classify")]
    classify: bool,

    /// Append / to directories
    #[arg(short = 'p', long = "slash")]
    slash: bool,

    /// Hide the owner column
    #[arg(short = 'g', long = "no-owner")]
    no_owner: bool,

    /// Hide the group column
    #[arg(short = 'o', long = "no-group")]
    no_group: bool,

    /// Only list entries with this exact name (can be used multiple times)
    #[arg(short = 'm', long = "match", value_name = "NAME")]
    matches: Vec<String>,

    /// Output in JSON format
    #[arg(long = "json", conflicts_with = "porcelain")]
    json: bool,

    /// Machine-readable output: mode size status name
    #[arg(long = "porcelain", conflicts_with = "json")]
    porcelain: bool,

    /// Show the current git branch
    #[arg(long = "branch")]
    branch: bool,

    /// Show the git status legend
    #[arg(long = "legend")]
    legend: bool,

    /// Control color output: auto, always, never
    #[arg(long = "color", value_name = "WHEN", default_value = "auto")]
    color: ColorMode,

    /// Enable debug logging
    #[arg(long = "debug")]
    debug: bool,
}

impl Args {
    fn into_config(self) -> DisplayConfig {
        let format = if self.json {
            OutputFormat::Json
        } else if self.porcelain {
            OutputFormat::Porcelain
        } else {
            OutputFormat::Human
        };

        DisplayConfig {
            path: self.path,
            detail: DetailLevel::from_count(self.long),
            format,
            show_hidden: self.all,
            dir_sizes: self.dir_sizes,
            group_by_type: self.group_by_type,
            show_inodes: self.inode,
            reverse: self.reverse,
            sort_by_size: self.size_sort,
            sort_by_time: self.time,
            sort_alphabetical: self.name,
            sort_by_extension: self.extension,
            unsorted: self.unsorted,
            one_column: self.one_column,
            type_indicators: self.classify,
            append_slash: self.slash,
            omit_owner: self.no_owner,
            omit_group: self.no_group,
            names: if self.matches.is_empty() {
                None
            } else {
                Some(self.matches)
            },
            show_branch: self.branch,
            show_legend: self.legend,
            use_color: format == OutputFormat::Human && should_use_color(self.color),
        }
    }
}

fn main() {
    let args = Args::parse();

    let default_filter = if args.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    let config = args.into_config();

    let listing = match build_listing(&config, &SystemRunner) {
        Ok(listing) => listing,
        Err(e) => {
            eprintln!("lg: {}", e);
            process::exit(1);
        }
    };

    for warning in &listing.warnings {
        eprintln!("lg: warning: {}", warning);
    }

    let choice = if config.use_color {
        ColorChoice::Always
    } else {
        ColorChoice::Never
    };
    let mut stdout = StandardStream::stdout(choice);

    let result =
        render(&mut stdout, &listing, &config, terminal_width()).and_then(|_| stdout.flush());
    if let Err(e) = result {
        if e.kind() != std::io::ErrorKind::BrokenPipe {
            eprintln!("lg: error writing output: {}", e);
            process::exit(1);
        }
    }
}
