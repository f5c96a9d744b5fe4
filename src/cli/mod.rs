//! # CLI Module
//!
//! Command-line interface for the duplicate file cleaner.
//!
//! ## Usage
//! ```bash
//! # Scan and review; nothing is touched
//! file-dedup scan ~/Data --priority archive=100 --report dupes.csv
//!
//! # Scan, then move duplicates to the recycle bin
//! file-dedup clean ~/Data --priority archive=100 --yes
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use duplicate_file_cleaner::core::{
    DuplicateScanner, FileAction, PriorityEngine, ReportGenerator, SafeDeleter, ScanConfig,
    ScanOutcome, ScanResult,
};
use duplicate_file_cleaner::error::Result;
use duplicate_file_cleaner::events::{DeleteEvent, Event, EventChannel, ScanEvent};

/// Duplicate File Cleaner - find duplicates, keep the right copy
#[derive(Parser, Debug)]
#[command(name = "file-dedup")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, clap::Args)]
struct ScanArgs {
    /// Directory to scan
    root: PathBuf,

    /// Weight a path fragment for keeper selection: fragment=weight (repeatable)
    #[arg(long = "priority", value_parser = parse_priority)]
    priority: Vec<(String, i32)>,

    /// Exclude an additional folder name (repeatable)
    #[arg(long)]
    exclude_folder: Vec<String>,

    /// Minimum file size in bytes
    #[arg(long, default_value_t = 1024)]
    min_size: u64,

    /// Maximum file size in bytes
    #[arg(long, default_value_t = 5 * 1024 * 1024 * 1024)]
    max_size: u64,

    /// Wall-clock scan budget in seconds
    #[arg(long, default_value_t = 300)]
    timeout_secs: u64,

    /// Write the review report to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "pretty")]
    output: OutputFormat,

    /// Verbose output (per-file rationale)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan a directory and review duplicates; nothing is touched
    Scan {
        #[command(flatten)]
        args: ScanArgs,
    },
    /// Scan, then move duplicates to the recycle bin
    Clean {
        #[command(flatten)]
        args: ScanArgs,

        /// Actually delete; without this flag clean behaves like scan
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (delete-candidate paths only)
    Minimal,
}

fn parse_priority(s: &str) -> std::result::Result<(String, i32), String> {
    let (fragment, weight) = s
        .split_once('=')
        .ok_or_else(|| format!("expected fragment=weight, got '{s}'"))?;
    if fragment.is_empty() {
        return Err(format!("empty path fragment in '{s}'"));
    }
    let weight: i32 = weight
        .parse()
        .map_err(|_| format!("weight must be an integer in '{s}'"))?;
    Ok((fragment.to_string(), weight))
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan { args } => {
            let (_config, result) = scan_and_score(&args)?;
            present_scan(&args, &result)
        }
        Commands::Clean { args, yes } => run_clean(args, yes),
    }
}

fn build_config(args: &ScanArgs) -> Result<ScanConfig> {
    let mut builder = ScanConfig::builder(&args.root)
        .size_bounds(args.min_size, args.max_size)
        .timeout(Duration::from_secs(args.timeout_secs));
    for (fragment, weight) in &args.priority {
        builder = builder.priority_path(fragment.clone(), *weight);
    }
    for folder in &args.exclude_folder {
        builder = builder.exclude_folder(folder.clone());
    }
    Ok(builder.build()?)
}

/// Scan, then score every group. The shared front half of both commands.
fn scan_and_score(args: &ScanArgs) -> Result<(ScanConfig, ScanResult)> {
    let config = build_config(args)?;
    let scanner = DuplicateScanner::new(config.clone());

    let (sender, receiver) = EventChannel::new();

    let progress = if matches!(args.output, OutputFormat::Pretty) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        pb.set_message("Scanning...");
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            if let Event::Scan(scan_event) = event {
                match scan_event {
                    ScanEvent::Snapshot(s) => {
                        if let Some(ref pb) = progress_clone {
                            pb.set_message(format!(
                                "Scanned {} files ({} groups, {} errors)",
                                s.files_scanned, s.duplicate_groups, s.errors
                            ));
                            pb.tick();
                        }
                    }
                    ScanEvent::TimedOut { elapsed_secs } => {
                        if let Some(ref pb) = progress_clone {
                            pb.set_message(format!("Timed out after {elapsed_secs}s"));
                        }
                    }
                    _ => {}
                }
            }
        }
        if let Some(pb) = progress_clone {
            pb.finish_and_clear();
        }
    });

    let mut result = scanner.scan_with_events(&sender)?;
    drop(sender);
    event_thread.join().ok();

    let engine = PriorityEngine::new(&config);
    engine.score_result(&mut result);

    Ok((config, result))
}

/// Print scan results and write the report if requested.
fn present_scan(args: &ScanArgs, result: &ScanResult) -> Result<()> {
    if let Some(report_path) = &args.report {
        ReportGenerator.write_to_file(result, report_path)?;
    }

    match args.output {
        OutputFormat::Pretty => {
            print_pretty_results(&Term::stderr(), args, result);
        }
        OutputFormat::Json => print_json_results(result),
        OutputFormat::Minimal => print_minimal_results(result),
    }
    Ok(())
}

fn run_clean(args: ScanArgs, yes: bool) -> Result<()> {
    let (config, result) = scan_and_score(&args)?;

    if !yes {
        present_scan(&args, &result)?;
        if matches!(args.output, OutputFormat::Pretty) {
            let term = Term::stderr();
            term.write_line("").ok();
            term.write_line(&format!(
                "{}",
                style("Dry run: nothing was deleted. Re-run with --yes to move duplicates to the recycle bin.")
                    .yellow()
            ))
            .ok();
        }
        return Ok(());
    }

    if let Some(report_path) = &args.report {
        ReportGenerator.write_to_file(&result, report_path)?;
    }

    let deleter = SafeDeleter::new(&config);
    let (sender, receiver) = EventChannel::new();

    let total_candidates: usize = result
        .groups
        .iter()
        .flat_map(|g| g.files.iter())
        .filter(|f| f.action == FileAction::Delete)
        .count();

    let progress = if matches!(args.output, OutputFormat::Pretty) {
        let pb = ProgressBar::new(total_candidates as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("█▓░"),
        );
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            if let Event::Delete(delete_event) = event {
                if let Some(ref pb) = progress_clone {
                    match delete_event {
                        DeleteEvent::Deleted { path, .. } => {
                            pb.inc(1);
                            pb.set_message(
                                path.file_name()
                                    .unwrap_or_default()
                                    .to_string_lossy()
                                    .to_string(),
                            );
                        }
                        DeleteEvent::Skipped { .. } | DeleteEvent::Failed { .. } => {
                            pb.inc(1);
                        }
                        DeleteEvent::Completed { .. } | DeleteEvent::Cancelled => {
                            pb.finish_and_clear();
                        }
                        _ => {}
                    }
                }
            }
        }
    });

    let deletion = deleter.delete_with_events(&result.groups, &sender);
    drop(sender);
    event_thread.join().ok();

    match args.output {
        OutputFormat::Pretty => {
            let term = Term::stderr();
            term.write_line("").ok();
            term.write_line(&format!("{} Deletion complete", style("✓").green().bold()))
                .ok();
            term.write_line(&format!(
                "  {} files moved to the recycle bin ({})",
                style(deletion.deleted).cyan(),
                style(format_bytes(deletion.space_reclaimed_bytes)).yellow()
            ))
            .ok();
            for line in deletion.skip_summary() {
                term.write_line(&format!("  {}", style(line).dim())).ok();
            }
            if deletion.errors > 0 {
                term.write_line(&format!(
                    "  {} files could not be removed",
                    style(deletion.errors).red()
                ))
                .ok();
            }
            term.write_line(&format!(
                "{}",
                style("Deleted files can be restored from the recycle bin.").dim()
            ))
            .ok();
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&deletion).unwrap());
        }
        OutputFormat::Minimal => {
            for path in &deletion.deleted_paths {
                println!("{}", path.display());
            }
        }
    }

    Ok(())
}

fn print_pretty_results(term: &Term, args: &ScanArgs, result: &ScanResult) {
    term.write_line("").ok();
    let headline = match result.outcome {
        ScanOutcome::Completed => format!("{} Scan complete", style("✓").green().bold()),
        ScanOutcome::Cancelled => format!("{} Scan cancelled (partial results)", style("!").yellow()),
        ScanOutcome::TimedOut => format!("{} Scan timed out (partial results)", style("!").yellow()),
    };
    term.write_line(&headline).ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} files scanned",
        style(result.total_scanned).cyan()
    ))
    .ok();
    term.write_line(&format!(
        "  {} duplicate groups",
        style(result.group_count()).cyan()
    ))
    .ok();
    term.write_line(&format!(
        "  {} duplicates ({} reclaimable)",
        style(result.total_duplicates).cyan(),
        style(format_bytes(result.reclaimable_bytes)).yellow()
    ))
    .ok();
    if !result.errors.is_empty() {
        term.write_line(&format!(
            "  {} files skipped due to errors",
            style(result.errors.len()).red()
        ))
        .ok();
    }
    term.write_line("").ok();

    if result.groups.is_empty() {
        term.write_line(&format!("  {} No duplicates found!", style("🎉").green()))
            .ok();
    } else {
        term.write_line(&format!("{}", style("Duplicate groups:").bold().underlined()))
            .ok();
        term.write_line("").ok();

        for (i, group) in result.groups.iter().enumerate() {
            term.write_line(&format!(
                "  {} ({} files, {})",
                style(format!("Group {}:", i + 1)).bold(),
                group.files.len(),
                format_bytes(group.wasted_bytes())
            ))
            .ok();

            for file in &group.files {
                let marker = if file.action == FileAction::Keep {
                    style("★").green().to_string()
                } else {
                    style("○").dim().to_string()
                };
                term.write_line(&format!(
                    "    {} {} [{}]",
                    marker,
                    shorten_home(&file.path),
                    file.priority_score
                ))
                .ok();
                if args.verbose && !file.reason.is_empty() {
                    term.write_line(&format!("      {}", style(&file.reason).dim()))
                        .ok();
                }
            }
            term.write_line("").ok();
        }
    }

    term.write_line(&format!(
        "{}",
        style("No files were touched. Review the report, then run clean --yes.").dim()
    ))
    .ok();
}

fn print_json_results(result: &ScanResult) {
    println!("{}", serde_json::to_string_pretty(result).unwrap());
}

fn print_minimal_results(result: &ScanResult) {
    for group in &result.groups {
        for path in &group.to_delete {
            println!("{}", path.display());
        }
    }
}

fn shorten_home(path: &std::path::Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(rest) = path.strip_prefix(&home) {
            return format!("~/{}", rest.display());
        }
    }
    path.display().to_string()
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
