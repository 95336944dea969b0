//! docxfree CLI - remove editing protection from Word documents
//!
//! Writes unprotected copies of `.docx` files, either one file at a time or
//! for a whole directory tree.

use clap::{CommandFactory, Parser};
use colored::*;
use docxfree::{
    output_path_for, process_directory, process_file, BatchEvent, BatchOptions, CopyMode,
    ErrorPolicy, Outcome, ProcessOptions, DOCX_SUFFIX, OUTPUT_DIR_NAME,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};

/// Remove editing protection from Word (.docx) documents
#[derive(Parser, Debug)]
#[command(
    name = "docxfree",
    version,
    about = "Remove editing protection from Word documents",
    long_about = "docxfree - remove document protection from .docx files.\n\n\
                  Writes an unprotected copy of each document; the original is never modified.",
    after_help = "Examples:\n  \
                  docxfree -f document.docx\n  \
                  docxfree -p protected_docs/\n  \
                  docxfree -p /path/to/files -d 3 --keep-going"
)]
struct Cli {
    /// Protected .docx file
    #[arg(short = 'f', long = "file", conflicts_with = "path")]
    file: Option<PathBuf>,

    /// Directory of .docx files for batch operation
    #[arg(short = 'p', long = "path")]
    path: Option<PathBuf>,

    /// Recursion depth for batch operation (1 = given directory only)
    #[arg(short = 'd', long, default_value_t = 1)]
    depth: usize,

    /// Output directory for single-file mode
    #[arg(short = 'o', long, default_value = OUTPUT_DIR_NAME)]
    output_dir: PathBuf,

    /// Keep processing remaining files after a failure (batch mode)
    #[arg(long)]
    keep_going: bool,

    /// Recompress entries instead of copying them verbatim
    #[arg(long)]
    recompress: bool,

    /// Report protected documents without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn process_options(&self) -> ProcessOptions {
        let mode = if self.recompress {
            CopyMode::Recompress
        } else {
            CopyMode::Raw
        };
        ProcessOptions::new()
            .with_copy_mode(mode)
            .with_dry_run(self.dry_run)
    }

    fn batch_options(&self) -> BatchOptions {
        let policy = if self.keep_going {
            ErrorPolicy::Continue
        } else {
            ErrorPolicy::Abort
        };
        BatchOptions::new()
            .with_max_depth(self.depth)
            .with_error_policy(policy)
            .with_process_options(self.process_options())
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.file.is_none() && cli.path.is_none() {
        println!("{}", Cli::command().render_help());
        return;
    }

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .init();
}

fn validate(cli: &Cli) -> Result<(), String> {
    if let Some(file) = &cli.file {
        let is_docx = file
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(DOCX_SUFFIX));
        if !is_docx {
            return Err("file must be a '.docx'".to_string());
        }
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    validate(&cli)?;

    match (&cli.file, &cli.path) {
        (Some(file), _) => run_single(&cli, file),
        (None, Some(dir)) => run_batch(&cli, dir),
        (None, None) => Ok(()),
    }
}

fn run_single(cli: &Cli, file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let file_name = file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or("file name is not valid UTF-8")?;

    if !cli.dry_run {
        fs::create_dir_all(&cli.output_dir).map_err(|e| {
            format!(
                "creating output directory {}: {}",
                cli.output_dir.display(),
                e
            )
        })?;
    }
    let destination = output_path_for(&cli.output_dir, file_name);

    let pb = create_spinner("Removing document protection...");
    let result = process_file(file, &destination, &cli.process_options());
    pb.finish_and_clear();
    let outcome = result?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("{}", format_outcome(file, &outcome));
    }
    Ok(())
}

fn run_batch(cli: &Cli, dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;
    let pb = create_spinner("Scanning documents...");

    let result = process_directory(dir, &cli.batch_options(), |event| match event {
        BatchEvent::Started(path) => {
            pb.set_message(format!("Processing: {}", path.display()));
        }
        BatchEvent::Finished(path, Ok(outcome)) => {
            if !json {
                pb.println(format_outcome(path, outcome));
            }
        }
        BatchEvent::Finished(path, Err(err)) => {
            if !json {
                pb.println(format!("{} {}: {}", "✗".red().bold(), path.display(), err));
            }
        }
    });
    pb.finish_and_clear();
    let report = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "{} {} document(s) scanned, {} unprotected, {} failed",
            "Done.".cyan().bold(),
            report.files.len(),
            report.removed(),
            report.failed()
        );
    }

    if report.failed() > 0 {
        return Err(format!("{} document(s) could not be processed", report.failed()).into());
    }
    Ok(())
}

fn format_outcome(source: &Path, outcome: &Outcome) -> String {
    let marker = match outcome {
        Outcome::Removed { .. } => "✓".green().bold(),
        Outcome::ProtectionFound { .. } => "•".cyan().bold(),
        Outcome::NoSettingsPart
        | Outcome::NoProtection
        | Outcome::Encrypted
        | Outcome::LegacyFormat => "!".yellow().bold(),
    };
    format!("{} {}: {}", marker, source.display(), outcome.message())
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
