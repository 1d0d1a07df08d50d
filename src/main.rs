//! The main entry point for the `scrubber` command-line application.
//!
//! This file parses arguments, asks for confirmation before destructive runs,
//! and hands the collected paths to the `scrubber` library.

use scrubber::cli::{self, Args};
use scrubber::config::{ConfigLoader, SanitizeConfig};
use scrubber::errors::Result;
use scrubber::{OutputFormat, OutputFormatter, RunAggregator, walker};
use std::io::{self, BufRead, Write};
use std::process;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    let args = cli::parse_args();
    init_logging(args.verbose);

    let config = load_config(&args)?;
    let rules = config.rule_table()?;

    if args.list_rules {
        for rule in rules.rules() {
            println!("{} → {}", rule.pattern(), rule.replacement());
        }
        return Ok(());
    }

    eprintln!("{}", "=".repeat(60));
    eprintln!("Repository Sanitization");
    eprintln!("{}", "=".repeat(60));

    if args.dry_run {
        eprintln!("DRY RUN MODE - No files will be modified");
    } else if !args.yes && !confirm()? {
        eprintln!("Please backup your repository first!");
        process::exit(1);
    }

    eprintln!("\nRules ({}):", rules.len());
    for rule in rules.rules() {
        eprintln!("  {} → {}", rule.pattern(), rule.replacement());
    }

    let files = walker::collect_files(&args.dir, &config.walk_options())?;
    eprintln!(
        "\nScanning {} ({} files found, before text filtering)\n",
        args.dir.display(),
        files.len()
    );
    debug!(dir = %args.dir.display(), found = files.len(), "walk complete");

    let workers = args.workers.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    });
    let classifier = config.classifier();
    let report = RunAggregator::new(&rules, &classifier)
        .with_workers(workers)
        .execute(&files, args.dry_run)?;
    info!(
        scanned = report.summary.files_scanned,
        modified = report.summary.files_modified,
        replacements = report.summary.total_replacements,
        "run complete"
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    OutputFormatter::new(OutputFormat::from(args.format.as_str())).write_report(&mut out, &report)?;
    out.flush()?;

    if args.dry_run {
        eprintln!("\nThis was a DRY RUN. No files were actually modified.");
        eprintln!("Run without --dry-run to apply changes.");
    } else {
        eprintln!("\nReview the changes carefully before committing (git diff).");
    }

    Ok(())
}

/// Builds the effective config: the YAML file if one was given, then CLI overrides.
fn load_config(args: &Args) -> Result<SanitizeConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let resolved = ConfigLoader::find_config(path, &args.dir)?;
            eprintln!("Using config file: {}", resolved.display());
            ConfigLoader::load(&resolved)?
        }
        None => SanitizeConfig::default(),
    };

    if !args.extensions.is_empty() {
        config.extensions = Some(args.extensions.clone());
    }
    if !args.exclude.is_empty() {
        config.skip_dirs = Some(args.exclude.clone());
    }
    if args.gitignore {
        config.respect_gitignore = true;
    }
    Ok(config)
}

/// Asks the user to confirm a destructive run. Only an explicit "yes" proceeds.
fn confirm() -> Result<bool> {
    eprintln!("⚠️  WARNING: This will modify files in place!");
    eprint!("Have you backed up your repository? (yes/no): ");
    io::stderr().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("yes"))
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "scrubber=debug" } else { "scrubber=warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}
