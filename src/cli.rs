use clap::Parser;
use std::path::PathBuf;

/// Bulk-replace sensitive literal strings across a directory tree.
///
/// `scrubber` walks a directory, picks out text files and rewrites every
/// occurrence of the configured patterns. Use `--dry-run` to see what would
/// change before touching anything.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Sanitize customer references across a directory tree",
    long_about = "scrubber - Replace sensitive literal strings in bulk.

Rules are applied in order, case-insensitively, each one seeing the output
of the rules before it. Files are rewritten atomically.

QUICK EXAMPLES:
  scrubber --dry-run .               # Preview what would change
  scrubber -c rules.yaml src/        # Use a custom rule table
  scrubber --yes -f json .           # Skip the prompt, report as JSON
  scrubber --list-rules              # Show the active rule table"
)]
pub struct Args {
    /// The directory to sanitize.
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Preview the changes without modifying any files.
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the confirmation prompt before modifying files.
    #[arg(short, long)]
    pub yes: bool,

    /// Path to a YAML configuration file with the rule table.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// A comma-separated list of extensions always treated as text. Replaces the defaults.
    #[arg(short = 'x', long = "ext", value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// A comma-separated list of directory names to skip. Replaces the defaults.
    #[arg(short = 'e', long = "exclude", value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Honour `.gitignore` files while walking.
    #[arg(long)]
    pub gitignore: bool,

    /// The number of parallel worker threads to use.
    #[arg(short, long, env = "SCRUBBER_WORKERS")]
    pub workers: Option<usize>,

    /// The report format (`text`, `json` or `csv`).
    #[arg(short = 'f', long = "format", default_value = "text")]
    pub format: String,

    /// Print the active rule table and exit.
    #[arg(long)]
    pub list_rules: bool,

    /// Enable debug logging on stderr.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parses command-line arguments and returns the populated `Args` struct.
pub fn parse_args() -> Args {
    Args::parse()
}
