use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use smart_organizer::config::AppConfig;
use smart_organizer::error::{AppError, Result};
use smart_organizer::models::grouping::GroupSpec;
use smart_organizer::models::operation::MoveOperation;
use smart_organizer::services::{
    duplicate_service, grouping_service, organize_service, scan_service, undo_service,
};

const UNDO_LOG_FILE: &str = "undo_log.json";

#[derive(Parser)]
#[command(
    name = "smart-organizer",
    about = "Scans a directory, groups documents via Gemini, and reorganizes them into folders"
)]
struct Cli {
    /// Configuration file name without extension (e.g. `config` for
    /// config.toml / config.yaml).
    #[arg(long, default_value = "config")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan a directory and print the manifest and duplicate report.
    Scan { directory: PathBuf },

    /// Scan, request a grouping, review it, and move files into group
    /// folders.
    Organize {
        directory: PathBuf,

        /// Overrides the configured output folder.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Skip the review prompt and apply the grouping immediately.
        #[arg(long)]
        yes: bool,
    },

    /// Replay the undo log a previous organize run wrote into its
    /// output folder.
    Undo { output: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;

    match cli.command {
        Command::Scan { directory } => run_scan(&directory, &config),
        Command::Organize {
            directory,
            output,
            yes,
        } => {
            let output = output.unwrap_or_else(|| resolve_output(&directory, &config));
            run_organize(&directory, &output, &config, yes).await
        }
        Command::Undo { output } => run_undo(&output),
    }
}

/// Relative output folders resolve against the scanned root.
fn resolve_output(directory: &Path, config: &AppConfig) -> PathBuf {
    let configured = Path::new(&config.output_folder);
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        directory.join(configured)
    }
}

fn run_scan(directory: &Path, config: &AppConfig) -> Result<()> {
    let records = scan_service::scan(directory)?;
    info!("scanned {} supported files", records.len());
    for record in &records {
        println!(
            "{}  {:>8} B  {}  {}",
            &record.digest[..12],
            record.size_bytes,
            record.relative_path,
            record.summary.chars().take(60).collect::<String>()
        );
    }

    let duplicates = duplicate_service::detect_duplicates(&records, config.similarity_threshold);
    println!("\n{}", duplicate_service::describe_duplicates(&duplicates, &records));
    Ok(())
}

async fn run_organize(
    directory: &Path,
    output: &Path,
    config: &AppConfig,
    skip_review: bool,
) -> Result<()> {
    let mut records = scan_service::scan(directory)?;
    if records.is_empty() {
        info!("no supported files under {}", directory.display());
        return Ok(());
    }
    info!("scanned {} supported files", records.len());

    let duplicates = duplicate_service::detect_duplicates(&records, config.similarity_threshold);
    let report = duplicate_service::describe_duplicates(&duplicates, &records);
    println!("{report}");

    let grouping =
        grouping_service::request_grouping(&records, &report, config, |notice| info!("{notice}"))
            .await;
    if grouping.used_fallback {
        info!("grouped {} buckets via the extension fallback", grouping.groups.len());
    } else {
        info!("Gemini proposed {} groups", grouping.groups.len());
    }

    // Nothing has moved yet; the proposal is reviewed before apply.
    println!("\n{}", format_grouping_preview(&grouping.groups));
    if !skip_review && !confirm_apply()? {
        info!("apply cancelled, no files were moved");
        return Ok(());
    }

    let lookup = scan_service::build_lookup(&records);
    let operations = match organize_service::apply_grouping(
        &grouping.groups,
        &mut records,
        &lookup,
        output,
        &duplicates,
    ) {
        Ok(operations) => operations,
        Err(AppError::Move { reason, completed }) => {
            // Partial applies stay undoable: persist what completed.
            error!(
                "apply aborted after {} moves: {reason}",
                completed.len()
            );
            persist_undo_log(output, &completed)?;
            return Err(AppError::Move {
                reason,
                completed: Vec::new(),
            });
        }
        Err(err) => return Err(err),
    };

    info!("moved {} files into {}", operations.len(), output.display());
    persist_undo_log(output, &operations)?;
    Ok(())
}

fn run_undo(output: &Path) -> Result<()> {
    let log_path = output.join(UNDO_LOG_FILE);
    let raw = fs::read_to_string(&log_path)?;
    let mut operations: Vec<MoveOperation> = serde_json::from_str(&raw)?;

    let report = undo_service::undo_moves(&mut operations);
    info!(
        "restored {} files ({} skipped)",
        report.restored, report.skipped
    );

    fs::remove_file(&log_path)?;
    Ok(())
}

fn persist_undo_log(output: &Path, operations: &[MoveOperation]) -> Result<()> {
    if operations.is_empty() {
        return Ok(());
    }
    fs::create_dir_all(output)?;
    fs::write(
        output.join(UNDO_LOG_FILE),
        serde_json::to_string_pretty(operations)?,
    )?;
    Ok(())
}

fn format_grouping_preview(groups: &[GroupSpec]) -> String {
    let mut lines = vec![format!("Proposed groups ({}):", groups.len())];
    for group in groups {
        lines.push(format!("\n{}", group.group_name));
        if !group.summary.is_empty() {
            lines.push(format!("  {}", group.summary));
        }
        for file in &group.files {
            lines.push(format!("  - {file}"));
        }
    }
    lines.join("\n")
}

fn confirm_apply() -> Result<bool> {
    print!("Move files as proposed? [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(is_affirmative(&answer))
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_lists_groups_summaries_and_files() {
        let groups = vec![
            GroupSpec {
                group_name: "Invoices".to_string(),
                summary: "billing documents".to_string(),
                files: vec!["inv1.pdf".to_string(), "inv2.pdf".to_string()],
            },
            GroupSpec {
                group_name: "Notes".to_string(),
                summary: String::new(),
                files: vec!["notes.md".to_string()],
            },
        ];

        let preview = format_grouping_preview(&groups);
        assert!(preview.starts_with("Proposed groups (2):"));
        assert!(preview.contains("Invoices"));
        assert!(preview.contains("  billing documents"));
        assert!(preview.contains("  - inv1.pdf"));
        assert!(preview.contains("Notes"));
        assert!(preview.contains("  - notes.md"));
    }

    #[test]
    fn only_explicit_yes_is_affirmative() {
        assert!(is_affirmative("y\n"));
        assert!(is_affirmative("YES"));
        assert!(is_affirmative("  yes  "));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("\n"));
        assert!(!is_affirmative("n"));
        assert!(!is_affirmative("maybe"));
    }
}

